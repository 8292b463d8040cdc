//! Libris application library.
//!
//! Lending engine, catalog queries, and the admin/books/readers HTTP modules
//! built on the Libris framework crates.

pub mod catalog;
pub mod lending;
pub mod modules;
pub mod state;
pub mod utils;

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use libris_db::Store;
use libris_kernel::{settings::Settings, InitCtx, SystemClock};

pub use state::{build_registry, AppState};

/// Full HTTP application for `state`, without binding a socket.
pub fn app(state: &AppState, settings: &Settings) -> Router {
    let registry = build_registry(state);
    libris_http::build_router(&registry, settings)
}

/// Open the store, run the module lifecycle, and serve HTTP until Ctrl-C.
pub async fn serve(settings: Settings) -> anyhow::Result<()> {
    let store = Store::open(&settings.database)
        .await
        .context("failed to open entity store")?;
    let state = AppState::new(Arc::new(store), &settings, Arc::new(SystemClock));
    let registry = build_registry(&state);

    let ctx = InitCtx {
        settings: &settings,
    };
    registry.init_core_modules(&ctx).await?;
    registry.init_custom_modules(&ctx).await?;
    registry.start_core_modules(&ctx).await?;
    registry.start_custom_modules(&ctx).await?;

    let served = libris_http::start_server(&registry, &settings).await;

    registry.stop_custom_modules().await?;
    registry.stop_core_modules().await?;
    served
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    struct TestApp {
        router: Router,
        cookie: Option<String>,
    }

    impl TestApp {
        fn new() -> Self {
            let settings = Settings::default();
            let state = AppState::new(
                Arc::new(Store::in_memory()),
                &settings,
                Arc::new(SystemClock),
            );
            Self {
                router: app(&state, &settings),
                cookie: None,
            }
        }

        async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
            let mut request = Request::builder().method(method).uri(uri);
            if let Some(cookie) = &self.cookie {
                request = request.header(header::COOKIE, cookie);
            }
            let body = match body {
                Some(body) => {
                    request = request.header(header::CONTENT_TYPE, "application/json");
                    Body::from(body.to_string())
                }
                None => Body::empty(),
            };
            self.router
                .clone()
                .oneshot(request.body(body).unwrap())
                .await
                .unwrap()
        }

        /// Register `admin`/`pw` and keep the session cookie from login.
        async fn sign_in(&mut self) {
            let registered = self
                .send(
                    Method::POST,
                    "/api/admin/register",
                    Some(json!({
                        "username": "admin",
                        "password": "pw",
                        "name": "Ada",
                        "last_name": "L"
                    })),
                )
                .await;
            assert_eq!(registered.status(), StatusCode::CREATED);

            let login = self
                .send(
                    Method::POST,
                    "/api/admin/login",
                    Some(json!({"username": "admin", "password": "pw"})),
                )
                .await;
            assert_eq!(login.status(), StatusCode::OK);
            let set_cookie = login.headers()[header::SET_COOKIE].to_str().unwrap();
            let pair = set_cookie.split(';').next().unwrap().to_string();
            self.cookie = Some(pair);
        }
    }

    async fn json_body(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn catalog_routes_require_a_session() {
        let app = TestApp::new();
        for uri in ["/api/books", "/api/readers", "/api/books/1"] {
            let response = app.send(Method::GET, uri, None).await;
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
        }

        let forged = TestApp {
            cookie: Some("libris_session=forged".to_string()),
            ..TestApp::new()
        };
        let response = forged.send(Method::GET, "/api/books", None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn registration_and_login_failures() {
        let mut app = TestApp::new();
        app.sign_in().await;

        let duplicate = app
            .send(
                Method::POST,
                "/api/admin/register",
                Some(json!({"username": "admin", "password": "other"})),
            )
            .await;
        assert_eq!(duplicate.status(), StatusCode::CONFLICT);
        assert_eq!(json_body(duplicate).await["error"]["code"], "duplicate_user");

        let wrong = app
            .send(
                Method::POST,
                "/api/admin/login",
                Some(json!({"username": "admin", "password": "wrong"})),
            )
            .await;
        assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(wrong).await["error"]["code"], "invalid_credentials");
    }

    #[tokio::test]
    async fn lending_over_http() {
        let mut app = TestApp::new();
        app.sign_in().await;

        let book = app
            .send(
                Method::POST,
                "/api/books",
                Some(json!({
                    "author": "Ivan",
                    "title": "Dune",
                    "release_year": 1965,
                    "genre": "sci-fi"
                })),
            )
            .await;
        assert_eq!(book.status(), StatusCode::CREATED);
        assert_eq!(json_body(book).await["id"], 1);

        let reader = app
            .send(
                Method::POST,
                "/api/readers",
                Some(json!({
                    "name": "Olga",
                    "last_name": "Petrova",
                    "address": "Main 1",
                    "phone_number": "555"
                })),
            )
            .await;
        assert_eq!(reader.status(), StatusCode::CREATED);

        let take = json!({"book_id": 1, "reader_id": 1});
        let taken = app.send(Method::POST, "/api/books/take", Some(take.clone())).await;
        assert_eq!(taken.status(), StatusCode::OK);
        assert_eq!(json_body(taken).await["reader_id"], 1);

        let again = app.send(Method::POST, "/api/books/take", Some(take.clone())).await;
        assert_eq!(again.status(), StatusCode::CONFLICT);
        let error = json_body(again).await;
        assert_eq!(error["error"]["code"], "already_checked_out");
        assert_eq!(error["error"]["details"][0]["entity"], "Book");
        assert_eq!(error["error"]["details"][0]["id"], 1);

        let missing_reader = app
            .send(Method::POST, "/api/books/take", Some(json!({"book_id": 1})))
            .await;
        assert_eq!(missing_reader.status(), StatusCode::BAD_REQUEST);

        let detail = json_body(app.send(Method::GET, "/api/books/1", None).await).await;
        assert_eq!(detail["reader_name"], "Olga");
        assert_eq!(detail["phone_number"], "555");

        let held = json_body(app.send(Method::GET, "/api/readers/1", None).await).await;
        assert_eq!(held["books"][0]["title"], "Dune");

        let blocked = app.send(Method::DELETE, "/api/readers/1", None).await;
        assert_eq!(blocked.status(), StatusCode::CONFLICT);

        let returned = app.send(Method::POST, "/api/books/return", Some(take)).await;
        assert_eq!(returned.status(), StatusCode::OK);

        let deleted = app.send(Method::DELETE, "/api/books/1", None).await;
        assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

        let gone = app.send(Method::GET, "/api/books/1", None).await;
        assert_eq!(gone.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(gone).await["error"]["details"][0]["entity"], "Book");
    }

    #[tokio::test]
    async fn search_sort_and_patch_over_http() {
        let mut app = TestApp::new();
        app.sign_in().await;

        for (author, title, year) in [("Kostja", "Winter", 1999), ("Ivan", "Autumn", 2005)] {
            let created = app
                .send(
                    Method::POST,
                    "/api/books",
                    Some(json!({
                        "author": author,
                        "title": title,
                        "release_year": year,
                        "genre": "prose"
                    })),
                )
                .await;
            assert_eq!(created.status(), StatusCode::CREATED);
        }

        let hits = app.send(Method::GET, "/api/books/search?text=ivan", None).await;
        let hits = json_body(hits).await;
        assert_eq!(hits.as_array().unwrap().len(), 1);
        assert_eq!(hits[0]["author"], "Ivan");

        let sorted = json_body(
            app.send(Method::GET, "/api/books/sort?sort_by_title_asc=true", None)
                .await,
        )
        .await;
        assert_eq!(sorted[0]["title"], "Autumn");

        let patched = app
            .send(Method::PATCH, "/api/books/1", Some(json!({"title": "Summer", "genre": ""})))
            .await;
        assert_eq!(patched.status(), StatusCode::OK);
        let patched = json_body(patched).await;
        assert_eq!(patched["title"], "Summer");
        assert_eq!(patched["genre"], "prose");
    }

    #[tokio::test]
    async fn logout_ends_the_session() {
        let mut app = TestApp::new();
        app.sign_in().await;
        assert_eq!(
            app.send(Method::GET, "/api/books", None).await.status(),
            StatusCode::OK
        );

        let logout = app.send(Method::POST, "/api/admin/logout", None).await;
        assert_eq!(logout.status(), StatusCode::NO_CONTENT);
        assert!(logout.headers()[header::SET_COOKIE]
            .to_str()
            .unwrap()
            .contains("Max-Age=0"));

        assert_eq!(
            app.send(Method::GET, "/api/books", None).await.status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[tokio::test]
    async fn openapi_document_lists_module_paths() {
        let app = TestApp::new();
        let doc = json_body(app.send(Method::GET, "/docs/openapi.json", None).await).await;
        assert!(doc["paths"]["/api/books/take"].is_object());
        assert!(doc["paths"]["/api/readers/{id}"].is_object());
        assert!(doc["paths"]["/api/admin/login"].is_object());
        assert!(doc["components"]["schemas"]["Book"].is_object());
    }
}
