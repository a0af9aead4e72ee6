pub mod error;
pub mod models;
pub mod repository;
pub mod routes;
pub mod service;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use libris_kernel::{InitCtx, Migration, Module};
use serde_json::json;
use sqlx::SqlitePool;

use repository::SqlBookRepository;
use service::BookService;

const CREATE_BOOKS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS books (
        id         INTEGER PRIMARY KEY AUTOINCREMENT,
        title      TEXT    NOT NULL CHECK (title <> ''),
        author     TEXT    NOT NULL CHECK (author <> ''),
        isbn       TEXT    NOT NULL UNIQUE,
        pages      INTEGER NOT NULL CHECK (pages > 0),
        price      REAL    NOT NULL CHECK (price >= 0),
        published  TEXT,
        created_at TEXT    NOT NULL,
        updated_at TEXT    NOT NULL
    );
    CREATE INDEX IF NOT EXISTS books_created_at_idx ON books (created_at DESC);
"#;

/// Book catalogue module: persistence, business rules, and HTTP surface
pub struct BooksModule {
    service: BookService,
}

impl BooksModule {
    /// Wire the module's layers over the shared connection pool
    pub fn new(pool: SqlitePool) -> Self {
        let repo = SqlBookRepository::new(pool);
        Self {
            service: BookService::new(Arc::new(repo)),
        }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        libris_db::ping(ctx.db).await?;
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.service.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(openapi_fragment())
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_create_books",
            up: CREATE_BOOKS_TABLE,
        }]
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

fn error_response(description: &str) -> serde_json::Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/ErrorResponse" }
            }
        }
    })
}

fn message_response(description: &str) -> serde_json::Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/Message" }
            }
        }
    })
}

fn book_response(description: &str) -> serde_json::Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/Book" }
            }
        }
    })
}

fn json_body(schema: &str) -> serde_json::Value {
    json!({
        "required": true,
        "content": {
            "application/json": {
                "schema": { "$ref": format!("#/components/schemas/{}", schema) }
            }
        }
    })
}

fn id_parameter() -> serde_json::Value {
    json!([{
        "name": "id",
        "in": "path",
        "required": true,
        "schema": { "type": "integer", "format": "int64", "minimum": 1 }
    }])
}

fn openapi_fragment() -> serde_json::Value {
    let text = json!({ "type": "string" });
    let timestamp = json!({ "type": "string", "format": "date-time" });

    json!({
        "paths": {
            "/": {
                "get": {
                    "summary": "List books, newest first",
                    "tags": ["Books"],
                    "responses": {
                        "200": {
                            "description": "List of books",
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "type": "array",
                                        "items": { "$ref": "#/components/schemas/Book" }
                                    }
                                }
                            }
                        },
                        "500": error_response("Store failure")
                    }
                },
                "post": {
                    "summary": "Create a book",
                    "tags": ["Books"],
                    "requestBody": json_body("NewBook"),
                    "responses": {
                        "201": book_response("Created book"),
                        "400": error_response("Malformed body or rule violation"),
                        "500": error_response("Store failure, including duplicate ISBN")
                    }
                }
            },
            "/{id}": {
                "get": {
                    "summary": "Get a book",
                    "tags": ["Books"],
                    "parameters": id_parameter(),
                    "responses": {
                        "200": book_response("The book"),
                        "400": error_response("Invalid book id"),
                        "404": error_response("Book not found")
                    }
                },
                "put": {
                    "summary": "Update the fields present in the body",
                    "tags": ["Books"],
                    "parameters": id_parameter(),
                    "requestBody": json_body("BookPatch"),
                    "responses": {
                        "200": message_response("Book updated"),
                        "400": error_response("Invalid id, malformed body or rule violation"),
                        "404": error_response("Book not found"),
                        "500": error_response("Store failure")
                    }
                },
                "delete": {
                    "summary": "Delete a book",
                    "tags": ["Books"],
                    "parameters": id_parameter(),
                    "responses": {
                        "200": message_response("Book deleted"),
                        "400": error_response("Invalid book id"),
                        "404": error_response("Book not found"),
                        "500": error_response("Store failure")
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "Book": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "integer", "format": "int64" },
                        "title": text,
                        "author": text,
                        "isbn": text,
                        "pages": { "type": "integer", "minimum": 1 },
                        "price": { "type": "number", "minimum": 0 },
                        "published": timestamp,
                        "created_at": timestamp,
                        "updated_at": timestamp
                    },
                    "required": ["id", "title", "author", "isbn", "pages", "price", "created_at", "updated_at"]
                },
                "NewBook": {
                    "type": "object",
                    "properties": {
                        "title": text,
                        "author": text,
                        "isbn": text,
                        "pages": { "type": "integer", "minimum": 1 },
                        "price": { "type": "number", "minimum": 0 },
                        "published": timestamp
                    },
                    "required": ["title", "author", "isbn", "pages"]
                },
                "BookPatch": {
                    "type": "object",
                    "properties": {
                        "title": text,
                        "author": text,
                        "isbn": text,
                        "pages": { "type": "integer", "minimum": 1 },
                        "price": { "type": "number", "minimum": 0 },
                        "published": timestamp
                    }
                },
                "Message": {
                    "type": "object",
                    "properties": { "message": text },
                    "required": ["message"]
                }
            }
        }
    })
}

/// Create a new instance of the books module over `pool`
pub fn create_module(pool: SqlitePool) -> Arc<dyn Module> {
    Arc::new(BooksModule::new(pool))
}

/// Single-connection in-memory store with the books schema applied.
#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap();

    let migrations: Vec<(String, Migration)> = BooksModule::new(pool.clone())
        .migrations()
        .into_iter()
        .map(|m| ("books".to_string(), m))
        .collect();
    libris_db::run_migrations(&pool, &migrations).await.unwrap();

    pool
}
