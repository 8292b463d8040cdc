use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use libris_db::ReaderId;
use libris_http::{auth::CurrentAdmin, error::AppError};
use serde_json::{json, Value};

use super::models::{
    CreateReader, ReaderDetail, ReaderView, SearchReadersQuery, SortReadersQuery, UpdateReader,
};
use crate::state::AppState;
use crate::utils::{array_of, error_response, id_parameter, json_body, json_response, schema_ref};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_readers).post(create_reader))
        .route("/search", get(search_readers))
        .route("/sort", get(sort_readers))
        .route(
            "/{id}",
            get(get_reader).patch(update_reader).delete(delete_reader),
        )
        .with_state(state)
}

async fn list_readers(
    _admin: CurrentAdmin,
    State(state): State<AppState>,
) -> Json<Vec<ReaderView>> {
    Json(state.readers.list().await)
}

async fn search_readers(
    _admin: CurrentAdmin,
    State(state): State<AppState>,
    Query(query): Query<SearchReadersQuery>,
) -> Json<Vec<ReaderView>> {
    Json(state.readers.search(query.into()).await)
}

async fn sort_readers(
    _admin: CurrentAdmin,
    State(state): State<AppState>,
    Query(query): Query<SortReadersQuery>,
) -> Json<Vec<ReaderView>> {
    Json(state.readers.sort(query.criterion()).await)
}

async fn get_reader(
    _admin: CurrentAdmin,
    State(state): State<AppState>,
    Path(id): Path<ReaderId>,
) -> Result<Json<ReaderDetail>, AppError> {
    Ok(Json(state.readers.get(id).await?))
}

async fn create_reader(
    CurrentAdmin(ctx): CurrentAdmin,
    State(state): State<AppState>,
    Json(request): Json<CreateReader>,
) -> Result<(StatusCode, Json<ReaderView>), AppError> {
    let reader = state.readers.create(&ctx, request).await?;
    Ok((StatusCode::CREATED, Json(reader)))
}

async fn update_reader(
    CurrentAdmin(ctx): CurrentAdmin,
    State(state): State<AppState>,
    Path(id): Path<ReaderId>,
    Json(patch): Json<UpdateReader>,
) -> Result<Json<ReaderView>, AppError> {
    Ok(Json(state.readers.update(&ctx, id, patch).await?))
}

async fn delete_reader(
    _admin: CurrentAdmin,
    State(state): State<AppState>,
    Path(id): Path<ReaderId>,
) -> Result<StatusCode, AppError> {
    state.readers.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// OpenAPI fragment; paths are relative to `/api/readers`.
pub fn openapi() -> Value {
    let unauthorized = error_response("Missing or expired session");
    let sort_flag = |name: &str| {
        json!({ "name": name, "in": "query", "schema": { "type": "boolean" } })
    };
    let reader_properties = json!({
        "id": { "type": "integer" },
        "name": { "type": "string" },
        "last_name": { "type": "string" },
        "address": { "type": "string" },
        "phone_number": { "type": "string" }
    });

    let mut detail_properties = reader_properties.clone();
    detail_properties["books"] = array_of("Book");

    json!({
        "paths": {
            "": {
                "get": {
                    "summary": "List readers",
                    "tags": ["Readers"],
                    "responses": {
                        "200": json_response("All readers", array_of("Reader")),
                        "401": unauthorized
                    }
                },
                "post": {
                    "summary": "Register a reader",
                    "tags": ["Readers"],
                    "requestBody": json_body("CreateReader"),
                    "responses": {
                        "201": json_response("Created reader", schema_ref("Reader")),
                        "400": error_response("Required field missing"),
                        "401": unauthorized
                    }
                }
            },
            "/search": {
                "get": {
                    "summary": "Search readers by name, address, or phone",
                    "tags": ["Readers"],
                    "parameters": [
                        { "name": "text", "in": "query", "schema": { "type": "string" } }
                    ],
                    "responses": {
                        "200": json_response("Matching readers", array_of("Reader")),
                        "401": unauthorized
                    }
                }
            },
            "/sort": {
                "get": {
                    "summary": "List readers sorted by the first flag set",
                    "tags": ["Readers"],
                    "parameters": [
                        sort_flag("sort_by_name_asc"),
                        sort_flag("sort_by_name_desc"),
                        sort_flag("sort_by_last_name_asc"),
                        sort_flag("sort_by_last_name_desc")
                    ],
                    "responses": {
                        "200": json_response("Sorted readers", array_of("Reader")),
                        "401": unauthorized
                    }
                }
            },
            "/{id}": {
                "get": {
                    "summary": "Reader with held books",
                    "tags": ["Readers"],
                    "parameters": [id_parameter()],
                    "responses": {
                        "200": json_response("Reader detail", schema_ref("ReaderDetail")),
                        "401": unauthorized,
                        "404": error_response("Reader not found")
                    }
                },
                "patch": {
                    "summary": "Update reader fields",
                    "tags": ["Readers"],
                    "parameters": [id_parameter()],
                    "requestBody": json_body("UpdateReader"),
                    "responses": {
                        "200": json_response("Updated reader", schema_ref("Reader")),
                        "401": unauthorized,
                        "404": error_response("Reader not found")
                    }
                },
                "delete": {
                    "summary": "Delete a reader who holds no books",
                    "tags": ["Readers"],
                    "parameters": [id_parameter()],
                    "responses": {
                        "204": { "description": "Deleted" },
                        "401": unauthorized,
                        "404": error_response("Reader not found"),
                        "409": error_response("Reader still holds books")
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "Reader": {
                    "type": "object",
                    "properties": reader_properties,
                    "required": ["id", "name", "last_name", "address", "phone_number"]
                },
                "ReaderDetail": {
                    "type": "object",
                    "properties": detail_properties,
                    "required": ["id", "name", "last_name", "address", "phone_number", "books"]
                },
                "CreateReader": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string" },
                        "last_name": { "type": "string" },
                        "address": { "type": "string" },
                        "phone_number": { "type": "string" }
                    },
                    "required": ["name", "last_name", "address", "phone_number"]
                },
                "UpdateReader": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string" },
                        "last_name": { "type": "string" },
                        "address": { "type": "string" },
                        "phone_number": { "type": "string" }
                    }
                }
            }
        }
    })
}
