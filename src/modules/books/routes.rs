use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use libris_db::BookId;
use libris_http::{auth::CurrentAdmin, error::AppError};
use serde_json::{json, Value};

use super::models::{
    BookDetail, BookReaderRequest, BookView, CreateBook, SearchBooksQuery, SortBooksQuery,
    UpdateBook,
};
use crate::state::AppState;
use crate::utils::{array_of, error_response, id_parameter, json_body, json_response, schema_ref};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route("/search", get(search_books))
        .route("/sort", get(sort_books))
        .route("/take", post(take_book))
        .route("/return", post(return_book))
        .route(
            "/{id}",
            get(get_book).patch(update_book).delete(delete_book),
        )
        .with_state(state)
}

async fn list_books(_admin: CurrentAdmin, State(state): State<AppState>) -> Json<Vec<BookView>> {
    Json(state.books.list().await)
}

async fn search_books(
    _admin: CurrentAdmin,
    State(state): State<AppState>,
    Query(query): Query<SearchBooksQuery>,
) -> Json<Vec<BookView>> {
    Json(state.books.search(query.into()).await)
}

async fn sort_books(
    _admin: CurrentAdmin,
    State(state): State<AppState>,
    Query(query): Query<SortBooksQuery>,
) -> Json<Vec<BookView>> {
    Json(state.books.sort(query.criterion()).await)
}

async fn get_book(
    _admin: CurrentAdmin,
    State(state): State<AppState>,
    Path(id): Path<BookId>,
) -> Result<Json<BookDetail>, AppError> {
    Ok(Json(state.books.get(id).await?))
}

async fn create_book(
    CurrentAdmin(ctx): CurrentAdmin,
    State(state): State<AppState>,
    Json(request): Json<CreateBook>,
) -> Result<(StatusCode, Json<BookView>), AppError> {
    let book = state.books.create(&ctx, request).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

async fn update_book(
    CurrentAdmin(ctx): CurrentAdmin,
    State(state): State<AppState>,
    Path(id): Path<BookId>,
    Json(patch): Json<UpdateBook>,
) -> Result<Json<BookView>, AppError> {
    Ok(Json(state.books.update(&ctx, id, patch).await?))
}

async fn delete_book(
    _admin: CurrentAdmin,
    State(state): State<AppState>,
    Path(id): Path<BookId>,
) -> Result<StatusCode, AppError> {
    state.books.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn take_book(
    _admin: CurrentAdmin,
    State(state): State<AppState>,
    Json(request): Json<BookReaderRequest>,
) -> Result<Json<BookView>, AppError> {
    Ok(Json(
        state.books.take(request.book_id, request.reader_id).await?,
    ))
}

async fn return_book(
    _admin: CurrentAdmin,
    State(state): State<AppState>,
    Json(request): Json<BookReaderRequest>,
) -> Result<Json<BookView>, AppError> {
    Ok(Json(
        state
            .books
            .return_book(request.book_id, request.reader_id)
            .await?,
    ))
}

/// OpenAPI fragment; paths are relative to `/api/books`.
pub fn openapi() -> Value {
    let unauthorized = error_response("Missing or expired session");
    let sort_flag = |name: &str| {
        json!({ "name": name, "in": "query", "schema": { "type": "boolean" } })
    };
    let lending = |summary: &str| {
        json!({
            "post": {
                "summary": summary,
                "tags": ["Books"],
                "requestBody": json_body("BookReaderRequest"),
                "responses": {
                    "200": json_response("Updated book", schema_ref("Book")),
                    "400": error_response("Missing book or reader id"),
                    "401": unauthorized,
                    "404": error_response("Book or reader not found"),
                    "409": error_response("Book is not in the required state")
                }
            }
        })
    };

    json!({
        "paths": {
            "": {
                "get": {
                    "summary": "List books",
                    "tags": ["Books"],
                    "responses": {
                        "200": json_response("All books", array_of("Book")),
                        "401": unauthorized
                    }
                },
                "post": {
                    "summary": "Create a book",
                    "tags": ["Books"],
                    "requestBody": json_body("CreateBook"),
                    "responses": {
                        "201": json_response("Created book", schema_ref("Book")),
                        "400": error_response("Required field missing"),
                        "401": unauthorized
                    }
                }
            },
            "/search": {
                "get": {
                    "summary": "Search books by text and release year",
                    "tags": ["Books"],
                    "parameters": [
                        { "name": "text", "in": "query", "schema": { "type": "string" } },
                        { "name": "year", "in": "query", "schema": { "type": "integer" } }
                    ],
                    "responses": {
                        "200": json_response("Matching books", array_of("Book")),
                        "401": unauthorized
                    }
                }
            },
            "/sort": {
                "get": {
                    "summary": "List books sorted by the first flag set",
                    "tags": ["Books"],
                    "parameters": [
                        sort_flag("sort_by_release_year_asc"),
                        sort_flag("sort_by_release_year_desc"),
                        sort_flag("sort_by_title_asc"),
                        sort_flag("sort_by_title_desc")
                    ],
                    "responses": {
                        "200": json_response("Sorted books", array_of("Book")),
                        "401": unauthorized
                    }
                }
            },
            "/take": lending("Check a book out to a reader"),
            "/return": lending("Return a book to the shelf"),
            "/{id}": {
                "get": {
                    "summary": "Book with holder details",
                    "tags": ["Books"],
                    "parameters": [id_parameter()],
                    "responses": {
                        "200": json_response("Book detail", schema_ref("BookDetail")),
                        "401": unauthorized,
                        "404": error_response("Book not found")
                    }
                },
                "patch": {
                    "summary": "Update book fields",
                    "tags": ["Books"],
                    "parameters": [id_parameter()],
                    "requestBody": json_body("UpdateBook"),
                    "responses": {
                        "200": json_response("Updated book", schema_ref("Book")),
                        "401": unauthorized,
                        "404": error_response("Book not found")
                    }
                },
                "delete": {
                    "summary": "Delete a shelved book",
                    "tags": ["Books"],
                    "parameters": [id_parameter()],
                    "responses": {
                        "204": { "description": "Deleted" },
                        "401": unauthorized,
                        "404": error_response("Book not found"),
                        "409": error_response("Book is checked out")
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "Book": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "integer" },
                        "author": { "type": "string" },
                        "title": { "type": "string" },
                        "release_year": { "type": "integer" },
                        "genre": { "type": "string" },
                        "reader_id": { "type": "integer", "nullable": true }
                    },
                    "required": ["id", "author", "title", "release_year", "genre"]
                },
                "BookDetail": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "integer" },
                        "author": { "type": "string" },
                        "title": { "type": "string" },
                        "release_year": { "type": "integer" },
                        "genre": { "type": "string" },
                        "reader_id": { "type": "integer", "nullable": true },
                        "reader_name": { "type": "string", "nullable": true },
                        "reader_last_name": { "type": "string", "nullable": true },
                        "reader_address": { "type": "string", "nullable": true },
                        "phone_number": { "type": "string", "nullable": true }
                    },
                    "required": ["id", "author", "title", "release_year", "genre"]
                },
                "CreateBook": {
                    "type": "object",
                    "properties": {
                        "author": { "type": "string" },
                        "title": { "type": "string" },
                        "release_year": { "type": "integer" },
                        "genre": { "type": "string" }
                    },
                    "required": ["author", "title", "release_year", "genre"]
                },
                "UpdateBook": {
                    "type": "object",
                    "properties": {
                        "author": { "type": "string" },
                        "title": { "type": "string" },
                        "release_year": { "type": "integer" },
                        "genre": { "type": "string" }
                    }
                },
                "BookReaderRequest": {
                    "type": "object",
                    "properties": {
                        "book_id": { "type": "integer" },
                        "reader_id": { "type": "integer" }
                    }
                }
            }
        }
    })
}
