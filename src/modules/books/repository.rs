use async_trait::async_trait;
use sqlx::SqlitePool;

use super::error::BookError;
use super::models::Book;

const SELECT_COLUMNS: &str =
    "SELECT id, title, author, isbn, pages, price, published, created_at, updated_at FROM books";

/// Storage seam for book records.
///
/// Each operation is a single statement; no transaction spans two calls.
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Insert `book`, writing the generated identifier back into it.
    async fn create(&self, book: &mut Book) -> Result<i64, BookError>;

    async fn get_by_id(&self, id: i64) -> Result<Book, BookError>;

    /// All books, newest first. Empty when the table is empty.
    async fn get_all(&self) -> Result<Vec<Book>, BookError>;

    /// Overwrite the mutable columns of row `id`.
    async fn update(&self, id: i64, book: &Book) -> Result<(), BookError>;

    async fn delete(&self, id: i64) -> Result<(), BookError>;
}

/// SQL-backed repository over a shared connection pool.
#[derive(Clone)]
pub struct SqlBookRepository {
    pool: SqlitePool,
}

impl SqlBookRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookRepository for SqlBookRepository {
    async fn create(&self, book: &mut Book) -> Result<i64, BookError> {
        let result = sqlx::query(
            "INSERT INTO books (title, author, isbn, pages, price, published, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.isbn)
        .bind(book.pages)
        .bind(book.price)
        .bind(book.published)
        .bind(book.created_at)
        .bind(book.updated_at)
        .execute(&self.pool)
        .await
        .map_err(BookError::persistence("failed to create book"))?;

        book.id = result.last_insert_rowid();
        tracing::debug!(book_id = book.id, "book row inserted");
        Ok(book.id)
    }

    async fn get_by_id(&self, id: i64) -> Result<Book, BookError> {
        sqlx::query_as::<_, Book>(&format!("{SELECT_COLUMNS} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(BookError::persistence("failed to get book"))?
            .ok_or(BookError::NotFound)
    }

    async fn get_all(&self) -> Result<Vec<Book>, BookError> {
        sqlx::query_as::<_, Book>(&format!(
            "{SELECT_COLUMNS} ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(BookError::persistence("failed to get books"))
    }

    async fn update(&self, id: i64, book: &Book) -> Result<(), BookError> {
        let result = sqlx::query(
            "UPDATE books SET title = ?, author = ?, isbn = ?, pages = ?, price = ?, \
             published = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.isbn)
        .bind(book.pages)
        .bind(book.price)
        .bind(book.published)
        .bind(book.updated_at)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(BookError::persistence("failed to update book"))?;

        if result.rows_affected() == 0 {
            return Err(BookError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), BookError> {
        let result = sqlx::query("DELETE FROM books WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(BookError::persistence("failed to delete book"))?;

        if result.rows_affected() == 0 {
            return Err(BookError::NotFound);
        }
        Ok(())
    }
}
