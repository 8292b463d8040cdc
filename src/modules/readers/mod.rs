pub mod models;
pub mod routes;
pub mod service;

pub use service::ReaderService;

use async_trait::async_trait;
use axum::Router;
use libris_kernel::{InitCtx, Module};

use crate::state::AppState;
use crate::utils::log_prefix;

/// Reader registry endpoints.
pub struct ReadersModule {
    state: AppState,
}

impl ReadersModule {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

#[async_trait]
impl Module for ReadersModule {
    fn name(&self) -> &'static str {
        "readers"
    }

    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let readers = self
            .state
            .store
            .read(|tables| crate::catalog::list_readers(tables).len())
            .await;
        tracing::info!(
            target: "libris-app",
            module = %log_prefix(self.name()),
            readers,
            "readers module initialized"
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
