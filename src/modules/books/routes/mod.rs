//! HTTP handlers for the books module.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use libris_http::error::AppError;
use serde_json::{json, Value};

use super::error::BookError;
use super::models::{Book, BookPatch, NewBook};
use super::service::BookService;

/// Build the books router, relative to the module mount point.
pub fn router(service: BookService) -> Router {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route(
            "/{id}",
            get(get_book).put(update_book).delete(delete_book),
        )
        .with_state(service)
}

/// Parse the `:id` path segment; non-numeric input is a client error.
fn parse_id(raw: &str) -> Result<i64, AppError> {
    raw.parse::<i64>()
        .map_err(|_| AppError::from(BookError::invalid_id()))
}

fn decode<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::bad_request(rejection.body_text()))
}

async fn create_book(
    State(service): State<BookService>,
    payload: Result<Json<NewBook>, JsonRejection>,
) -> Result<(StatusCode, Json<Book>), AppError> {
    let input = decode(payload)?;
    let book = service.create_book(input).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

async fn list_books(State(service): State<BookService>) -> Result<Json<Vec<Book>>, AppError> {
    Ok(Json(service.get_all_books().await?))
}

async fn get_book(
    State(service): State<BookService>,
    Path(raw_id): Path<String>,
) -> Result<Json<Book>, AppError> {
    let id = parse_id(&raw_id)?;
    Ok(Json(service.get_book(id).await?))
}

async fn update_book(
    State(service): State<BookService>,
    Path(raw_id): Path<String>,
    payload: Result<Json<BookPatch>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let id = parse_id(&raw_id)?;
    let patch = decode(payload)?;
    service.update_book(id, patch).await?;
    Ok(Json(json!({ "message": "book updated successfully" })))
}

async fn delete_book(
    State(service): State<BookService>,
    Path(raw_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = parse_id(&raw_id)?;
    service.delete_book(id).await?;
    Ok(Json(json!({ "message": "book deleted successfully" })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::books::{repository::SqlBookRepository, test_pool};
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request},
        response::Response,
    };
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn app() -> Router {
        let repo = SqlBookRepository::new(test_pool().await);
        Router::new().nest("/books", router(BookService::new(Arc::new(repo))))
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> Response {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        };
        app.clone().oneshot(request.unwrap()).await.unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn dune() -> Value {
        json!({
            "title": "Dune",
            "author": "Frank Herbert",
            "isbn": "978-0441013593",
            "pages": 412,
            "price": 9.99,
            "published": "1965-08-01T00:00:00Z"
        })
    }

    #[tokio::test]
    async fn create_returns_201_with_entity() {
        let app = app().await;
        let response = send(&app, Method::POST, "/books", Some(dune())).await;

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = json_body(response).await;
        assert!(body["id"].as_i64().unwrap() > 0);
        assert_eq!(body["title"], "Dune");
        assert_eq!(body["published"], "1965-08-01T00:00:00Z");
        assert_eq!(body["created_at"], body["updated_at"]);
    }

    #[tokio::test]
    async fn create_with_empty_title_is_400() {
        let app = app().await;
        let response = send(
            &app,
            Method::POST,
            "/books",
            Some(json!({ "title": "", "author": "X", "price": 5 })),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await, json!({ "error": "title is required" }));
    }

    #[tokio::test]
    async fn malformed_body_is_400() {
        let app = app().await;
        let request = Request::builder()
            .method(Method::POST)
            .uri("/books")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"title\": "))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert!(!body["error"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_on_empty_store_is_empty_array() {
        let app = app().await;
        let response = send(&app, Method::GET, "/books", None).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!([]));
    }

    #[tokio::test]
    async fn non_numeric_id_is_400() {
        let app = app().await;
        for method in [Method::GET, Method::DELETE] {
            let response = send(&app, method, "/books/abc", None).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            assert_eq!(json_body(response).await, json!({ "error": "invalid book id" }));
        }

        let response = send(&app, Method::PUT, "/books/abc", Some(json!({}))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await, json!({ "error": "invalid book id" }));
    }

    #[tokio::test]
    async fn non_positive_id_is_400() {
        let app = app().await;
        let response = send(&app, Method::GET, "/books/0", None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await, json!({ "error": "invalid book id" }));
    }

    #[tokio::test]
    async fn missing_book_is_404() {
        let app = app().await;

        let response = send(&app, Method::GET, "/books/999", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await, json!({ "error": "book not found" }));

        let response = send(&app, Method::DELETE, "/books/999", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = send(&app, Method::PUT, "/books/999", Some(json!({ "price": 1 }))).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn update_then_get_reflects_patch() {
        let app = app().await;
        let created = json_body(send(&app, Method::POST, "/books", Some(dune())).await).await;
        let uri = format!("/books/{}", created["id"]);

        let response = send(&app, Method::PUT, &uri, Some(json!({ "price": 20 }))).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({ "message": "book updated successfully" })
        );

        let fetched = json_body(send(&app, Method::GET, &uri, None).await).await;
        assert_eq!(fetched["title"], "Dune");
        assert_eq!(fetched["author"], "Frank Herbert");
        assert_eq!(fetched["price"], 20.0);
        assert_eq!(fetched["created_at"], created["created_at"]);
    }

    #[tokio::test]
    async fn delete_then_delete_again() {
        let app = app().await;
        let created = json_body(send(&app, Method::POST, "/books", Some(dune())).await).await;
        let uri = format!("/books/{}", created["id"]);

        let response = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({ "message": "book deleted successfully" })
        );

        let response = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn duplicate_isbn_is_500() {
        let app = app().await;
        send(&app, Method::POST, "/books", Some(dune())).await;

        let response = send(&app, Method::POST, "/books", Some(dune())).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(json_body(response).await["error"].is_string());
    }
}
