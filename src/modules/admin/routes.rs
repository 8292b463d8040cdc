use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use libris_http::{
    auth::{cleared_cookie, session_cookie, session_token},
    error::AppError,
};
use libris_kernel::IdentityContext;
use serde_json::{json, Value};

use super::models::{AdminView, LoginRequest, RegisterRequest};
use crate::state::AppState;
use crate::utils::{error_response, json_body, json_response, schema_ref};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .with_state(state)
}

async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AdminView>), AppError> {
    let admin = state.credentials.register(request.into()).await?;
    Ok((StatusCode::CREATED, Json(admin.into())))
}

async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let admin = state
        .credentials
        .authenticate(&request.username, &request.password)
        .await?;

    let token = state
        .sessions
        .issue(IdentityContext::new(admin.username.clone()))
        .await;
    let cookie = session_cookie(
        state.sessions.cookie_name(),
        &token,
        state.sessions.ttl().whole_seconds(),
    );

    Ok(([(header::SET_COOKIE, cookie)], Json(AdminView::from(admin))))
}

async fn logout(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let cookie_name = state.sessions.cookie_name();
    if let Some(token) = session_token(&headers, cookie_name) {
        if state.sessions.revoke(&token).await {
            tracing::info!(target: "libris-app", "session revoked");
        }
    }

    (
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, cleared_cookie(cookie_name))],
    )
}

/// OpenAPI fragment; paths are relative to `/api/admin`.
pub fn openapi() -> Value {
    json!({
        "paths": {
            "/register": {
                "post": {
                    "summary": "Register an administrator",
                    "tags": ["Admin"],
                    "requestBody": json_body("RegisterRequest"),
                    "responses": {
                        "201": json_response("Registered administrator", schema_ref("Admin")),
                        "400": error_response("Blank username or password"),
                        "409": error_response("Username already taken")
                    }
                }
            },
            "/login": {
                "post": {
                    "summary": "Sign in and receive a session cookie",
                    "tags": ["Admin"],
                    "requestBody": json_body("LoginRequest"),
                    "responses": {
                        "200": json_response("Signed-in administrator", schema_ref("Admin")),
                        "401": error_response("Invalid username or password")
                    }
                }
            },
            "/logout": {
                "post": {
                    "summary": "End the current session",
                    "tags": ["Admin"],
                    "responses": {
                        "204": { "description": "Session cookie cleared" }
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "Admin": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "integer" },
                        "username": { "type": "string" },
                        "name": { "type": "string" },
                        "last_name": { "type": "string" }
                    },
                    "required": ["id", "username", "name", "last_name"]
                },
                "RegisterRequest": {
                    "type": "object",
                    "properties": {
                        "username": { "type": "string" },
                        "password": { "type": "string", "format": "password" },
                        "name": { "type": "string" },
                        "last_name": { "type": "string" }
                    },
                    "required": ["username", "password"]
                },
                "LoginRequest": {
                    "type": "object",
                    "properties": {
                        "username": { "type": "string" },
                        "password": { "type": "string", "format": "password" }
                    },
                    "required": ["username", "password"]
                }
            }
        }
    })
}
