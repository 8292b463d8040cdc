pub mod models;
pub mod routes;
pub mod service;

pub use service::BookService;

use async_trait::async_trait;
use axum::Router;
use libris_db::Book;
use libris_kernel::{InitCtx, Module};

use crate::state::AppState;
use crate::utils::log_prefix;

/// Book catalog and lending endpoints.
pub struct BooksModule {
    state: AppState,
}

impl BooksModule {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let (books, checked_out) = self
            .state
            .store
            .read(|tables| {
                let all = crate::catalog::list_books(tables);
                let checked_out = all.iter().filter(|book: &&Book| !book.is_shelved()).count();
                (all.len(), checked_out)
            })
            .await;

        tracing::info!(
            target: "libris-app",
            module = %log_prefix(self.name()),
            environment = ?ctx.settings.environment,
            books,
            checked_out,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.state.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(routes::openapi())
    }
}
