use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use bookshelf_http::{envelope::ApiResponse, error::AppError};

use super::models::BookPayload;
use super::store::{BookFilter, BookStore, StoreError};

/// Build the books router; mounted under `/books` by the registry.
pub fn router(store: Arc<BookStore>) -> Router {
    Router::new()
        .route("/", get(list_books).post(add_book))
        .route(
            "/{id}",
            get(get_book).put(update_book).delete(delete_book),
        )
        .with_state(store)
}

/// Query parameters accepted by the listing endpoint. The boolean filters
/// arrive as `"0"`/`"1"` strings; `"1"` means true, any other value false.
#[derive(Debug, Default, Deserialize)]
struct ListQuery {
    name: Option<String>,
    reading: Option<String>,
    finished: Option<String>,
}

impl ListQuery {
    fn into_filter(self) -> BookFilter {
        BookFilter {
            name: self.name,
            reading: self.reading.as_deref().map(|value| value == "1"),
            finished: self.finished.as_deref().map(|value| value == "1"),
        }
    }
}

async fn add_book(
    State(store): State<Arc<BookStore>>,
    Json(payload): Json<BookPayload>,
) -> Result<ApiResponse, AppError> {
    let id = store.create(payload).map_err(add_error)?;
    Ok(ApiResponse::created()
        .message("Book added successfully")
        .data(json!({ "bookId": id })))
}

async fn list_books(
    State(store): State<Arc<BookStore>>,
    Query(query): Query<ListQuery>,
) -> ApiResponse {
    let books = store.list(&query.into_filter());
    ApiResponse::ok().data(json!({ "books": books }))
}

async fn get_book(
    State(store): State<Arc<BookStore>>,
    Path(id): Path<String>,
) -> Result<ApiResponse, AppError> {
    let book = store
        .get(&id)
        .ok_or_else(|| AppError::not_found("Book not found"))?;
    Ok(ApiResponse::ok().data(json!({ "book": book })))
}

async fn update_book(
    State(store): State<Arc<BookStore>>,
    Path(id): Path<String>,
    Json(payload): Json<BookPayload>,
) -> Result<ApiResponse, AppError> {
    store.update(&id, payload).map_err(update_error)?;
    Ok(ApiResponse::ok().message("Book updated successfully"))
}

async fn delete_book(
    State(store): State<Arc<BookStore>>,
    Path(id): Path<String>,
) -> Result<ApiResponse, AppError> {
    store.delete(&id).map_err(delete_error)?;
    Ok(ApiResponse::ok().message("Book deleted successfully"))
}

fn add_error(err: StoreError) -> AppError {
    match err {
        StoreError::NameRequired => {
            AppError::validation("Failed to add book. Please provide a book name")
        }
        StoreError::PageBounds => {
            AppError::validation("Failed to add book. readPage must not be greater than pageCount")
        }
        other => AppError::not_found(other.to_string()),
    }
}

fn update_error(err: StoreError) -> AppError {
    match err {
        StoreError::NameRequired => {
            AppError::validation("Failed to update book. Please provide a book name")
        }
        StoreError::PageBounds => AppError::validation(
            "Failed to update book. readPage must not be greater than pageCount",
        ),
        StoreError::NotFound => AppError::not_found("Failed to update book. Id not found"),
    }
}

fn delete_error(err: StoreError) -> AppError {
    match err {
        StoreError::NotFound => AppError::not_found("Failed to delete book. Id not found"),
        other => AppError::validation(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    fn test_app() -> (Router, Arc<BookStore>) {
        let store = Arc::new(BookStore::new());
        let app = Router::new().nest("/books", router(store.clone()));
        (app, store)
    }

    fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn book_body(name: &str, page_count: u32, read_page: u32) -> Value {
        json!({
            "name": name,
            "year": 2005,
            "author": "Andrea Hirata",
            "summary": "A memoir",
            "publisher": "Bentang Pustaka",
            "pageCount": page_count,
            "readPage": read_page,
            "reading": true,
        })
    }

    #[tokio::test]
    async fn post_creates_a_book_and_returns_its_id() {
        let (app, store) = test_app();

        let response = app
            .oneshot(json_request(
                Method::POST,
                "/books",
                book_body("Laskar Pelangi", 529, 120),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["status"], "success");
        assert_eq!(body["message"], "Book added successfully");

        let id = body["data"]["bookId"].as_str().unwrap();
        assert!(id.len() >= 16);
        assert!(store.get(id).is_some());
    }

    #[tokio::test]
    async fn post_without_name_fails_with_400() {
        let (app, store) = test_app();

        let mut body = book_body("", 529, 120);
        body.as_object_mut().unwrap().remove("name");

        let response = app
            .oneshot(json_request(Method::POST, "/books", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["status"], "fail");
        assert_eq!(
            body["message"],
            "Failed to add book. Please provide a book name"
        );
        assert!(store.list(&BookFilter::default()).is_empty());
    }

    #[tokio::test]
    async fn post_with_read_page_beyond_page_count_fails_with_400() {
        let (app, _store) = test_app();

        let response = app
            .oneshot(json_request(
                Method::POST,
                "/books",
                book_body("Laskar Pelangi", 100, 101),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(
            body["message"],
            "Failed to add book. readPage must not be greater than pageCount"
        );
    }

    #[tokio::test]
    async fn list_returns_projections_and_honors_filters() {
        let (app, store) = test_app();

        store
            .create(serde_json::from_value(book_body("Laskar Pelangi", 529, 120)).unwrap())
            .unwrap();
        let mut finished = book_body("Bumi Manusia", 535, 535);
        finished["reading"] = json!(false);
        store
            .create(serde_json::from_value(finished).unwrap())
            .unwrap();

        let response = app
            .clone()
            .oneshot(get_request("/books"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let books = body["data"]["books"].as_array().unwrap();
        assert_eq!(books.len(), 2);
        assert_eq!(books[0]["name"], "Laskar Pelangi");
        assert_eq!(
            books[0].as_object().unwrap().keys().len(),
            3,
            "listing exposes only id, name, publisher"
        );

        let response = app
            .clone()
            .oneshot(get_request("/books?name=MANU"))
            .await
            .unwrap();
        let body = body_json(response).await;
        let books = body["data"]["books"].as_array().unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0]["name"], "Bumi Manusia");

        let response = app
            .clone()
            .oneshot(get_request("/books?reading=1"))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["data"]["books"].as_array().unwrap().len(), 1);
        assert_eq!(body["data"]["books"][0]["name"], "Laskar Pelangi");

        let response = app
            .oneshot(get_request("/books?finished=0"))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["data"]["books"][0]["name"], "Laskar Pelangi");
    }

    #[tokio::test]
    async fn get_by_id_round_trips_the_full_record() {
        let (app, store) = test_app();
        let id = store
            .create(serde_json::from_value(book_body("Laskar Pelangi", 529, 120)).unwrap())
            .unwrap();

        let response = app
            .oneshot(get_request(&format!("/books/{id}")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let book = &body["data"]["book"];
        assert_eq!(book["id"], id.as_str());
        assert_eq!(book["name"], "Laskar Pelangi");
        assert_eq!(book["pageCount"], 529);
        assert_eq!(book["finished"], false);
        assert!(book["insertedAt"].is_string());
        assert!(book["updatedAt"].is_string());
    }

    #[tokio::test]
    async fn get_unknown_id_fails_with_404() {
        let (app, _store) = test_app();

        let response = app.oneshot(get_request("/books/missing")).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["status"], "fail");
        assert_eq!(body["message"], "Book not found");
    }

    #[tokio::test]
    async fn put_updates_a_book_in_place() {
        let (app, store) = test_app();
        let id = store
            .create(serde_json::from_value(book_body("Laskar Pelangi", 529, 120)).unwrap())
            .unwrap();
        let inserted_at = store.get(&id).unwrap().inserted_at;

        let response = app
            .oneshot(json_request(
                Method::PUT,
                &format!("/books/{id}"),
                book_body("Laskar Pelangi (Revised)", 529, 529),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Book updated successfully");

        let book = store.get(&id).unwrap();
        assert_eq!(book.name, "Laskar Pelangi (Revised)");
        assert!(book.finished);
        assert_eq!(book.inserted_at, inserted_at);
    }

    #[tokio::test]
    async fn put_checks_validation_before_existence() {
        let (app, _store) = test_app();

        let mut body = book_body("x", 10, 0);
        body.as_object_mut().unwrap().remove("name");

        let response = app
            .clone()
            .oneshot(json_request(Method::PUT, "/books/missing", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(
            body["message"],
            "Failed to update book. Please provide a book name"
        );

        let response = app
            .oneshot(json_request(
                Method::PUT,
                "/books/missing",
                book_body("x", 10, 0),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Failed to update book. Id not found");
    }

    #[tokio::test]
    async fn delete_removes_exactly_one_book() {
        let (app, store) = test_app();
        let id = store
            .create(serde_json::from_value(book_body("Laskar Pelangi", 529, 120)).unwrap())
            .unwrap();
        store
            .create(serde_json::from_value(book_body("Bumi Manusia", 535, 10)).unwrap())
            .unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::DELETE)
                    .uri(format!("/books/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Book deleted successfully");

        let remaining = store.list(&BookFilter::default());
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].name, "Bumi Manusia");
    }

    #[tokio::test]
    async fn delete_unknown_id_fails_with_404() {
        let (app, _store) = test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::DELETE)
                    .uri("/books/missing")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Failed to delete book. Id not found");
    }
}
