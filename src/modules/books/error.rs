use libris_http::error::AppError;
use thiserror::Error;

/// Failure kinds surfaced by the books module.
#[derive(Debug, Error)]
pub enum BookError {
    /// Input breaks a business rule; never reaches the store
    #[error("{0}")]
    Validation(String),

    /// Malformed or out-of-range identifier
    #[error("{0}")]
    InvalidArgument(String),

    #[error("book not found")]
    NotFound,

    #[error("{context}")]
    Persistence {
        context: &'static str,
        #[source]
        source: sqlx::Error,
    },
}

impl BookError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn invalid_id() -> Self {
        Self::InvalidArgument("invalid book id".to_string())
    }

    /// Wrap a store error with the operation that failed, for `map_err`.
    pub fn persistence(context: &'static str) -> impl FnOnce(sqlx::Error) -> Self {
        move |source| Self::Persistence { context, source }
    }
}

impl From<BookError> for AppError {
    fn from(err: BookError) -> Self {
        match err {
            BookError::Validation(message) => AppError::validation(message),
            BookError::InvalidArgument(message) => AppError::bad_request(message),
            err @ BookError::NotFound => AppError::not_found(err.to_string()),
            err @ BookError::Persistence { .. } => AppError::Internal(anyhow::Error::new(err)),
        }
    }
}
