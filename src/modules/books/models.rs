use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// A persisted book record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Book {
    /// Store-assigned identifier, positive once persisted
    pub id: i64,
    pub title: String,
    pub author: String,
    /// Unique across all books
    pub isbn: String,
    pub pages: i32,
    pub price: f64,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub published: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Request model for creating a new book.
///
/// Missing fields decode to their empty value so the business rules, not the
/// decoder, report what is required.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub pages: i32,
    pub price: f64,
    #[serde(with = "time::serde::rfc3339::option")]
    pub published: Option<OffsetDateTime>,
}

/// Request model for a partial update.
///
/// `None` keeps the stored value; `Some` overwrites it, even with an empty value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookPatch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub pages: Option<i32>,
    pub price: Option<f64>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub published: Option<OffsetDateTime>,
}

impl BookPatch {
    /// Overwrite the fields of `book` that this patch sets.
    pub fn apply_to(self, book: &mut Book) {
        if let Some(title) = self.title {
            book.title = title;
        }
        if let Some(author) = self.author {
            book.author = author;
        }
        if let Some(isbn) = self.isbn {
            book.isbn = isbn;
        }
        if let Some(pages) = self.pages {
            book.pages = pages;
        }
        if let Some(price) = self.price {
            book.price = price;
        }
        if let Some(published) = self.published {
            book.published = Some(published);
        }
    }
}
