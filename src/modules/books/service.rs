use std::sync::Arc;

use super::error::BookError;
use super::models::{Book, BookPatch, NewBook};
use super::repository::BookRepository;
use crate::utils;

/// Business rules for the book catalogue.
///
/// Cheap to clone; every clone shares the same repository handle.
#[derive(Clone)]
pub struct BookService {
    repo: Arc<dyn BookRepository>,
}

impl BookService {
    pub fn new(repo: Arc<dyn BookRepository>) -> Self {
        Self { repo }
    }

    /// Validate and persist a new book, stamping both timestamps with the same instant.
    pub async fn create_book(&self, input: NewBook) -> Result<Book, BookError> {
        validate(
            &input.title,
            &input.author,
            &input.isbn,
            input.pages,
            input.price,
        )?;

        let now = utils::now_utc();
        let mut book = Book {
            id: 0,
            title: input.title,
            author: input.author,
            isbn: input.isbn,
            pages: input.pages,
            price: input.price,
            published: input.published,
            created_at: now,
            updated_at: now,
        };

        self.repo.create(&mut book).await?;
        tracing::info!(book_id = book.id, isbn = %book.isbn, "book created");
        Ok(book)
    }

    pub async fn get_book(&self, id: i64) -> Result<Book, BookError> {
        ensure_valid_id(id)?;
        self.repo.get_by_id(id).await
    }

    pub async fn get_all_books(&self) -> Result<Vec<Book>, BookError> {
        self.repo.get_all().await
    }

    /// Merge `patch` into the stored record and persist the result.
    ///
    /// The fetch and the write are separate statements; concurrent updates of
    /// the same book are last-write-wins.
    pub async fn update_book(&self, id: i64, patch: BookPatch) -> Result<Book, BookError> {
        ensure_valid_id(id)?;

        let mut book = self.repo.get_by_id(id).await?;
        patch.apply_to(&mut book);
        validate(&book.title, &book.author, &book.isbn, book.pages, book.price)?;

        book.updated_at = utils::now_utc().max(book.updated_at);

        self.repo.update(id, &book).await?;
        tracing::info!(book_id = id, "book updated");
        Ok(book)
    }

    pub async fn delete_book(&self, id: i64) -> Result<(), BookError> {
        ensure_valid_id(id)?;
        self.repo.delete(id).await?;
        tracing::info!(book_id = id, "book deleted");
        Ok(())
    }
}

fn ensure_valid_id(id: i64) -> Result<(), BookError> {
    if id <= 0 {
        return Err(BookError::invalid_id());
    }
    Ok(())
}

/// First rule violation wins.
fn validate(title: &str, author: &str, isbn: &str, pages: i32, price: f64) -> Result<(), BookError> {
    if title.trim().is_empty() {
        return Err(BookError::validation("title is required"));
    }
    if author.trim().is_empty() {
        return Err(BookError::validation("author is required"));
    }
    if isbn.trim().is_empty() {
        return Err(BookError::validation("isbn is required"));
    }
    if pages <= 0 {
        return Err(BookError::validation("pages must be greater than 0"));
    }
    if price < 0.0 {
        return Err(BookError::validation("price cannot be negative"));
    }
    Ok(())
}
