pub mod models;
pub mod routes;

use async_trait::async_trait;
use axum::Router;
use libris_kernel::{InitCtx, Module};

use crate::state::AppState;
use crate::utils::log_prefix;

/// Administrator registration and cookie sign-in.
pub struct AdminModule {
    state: AppState,
}

impl AdminModule {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

#[async_trait]
impl Module for AdminModule {
    fn name(&self) -> &'static str {
        "admin"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            target: "libris-app",
            module = %log_prefix(self.name()),
            cookie = %ctx.settings.auth.cookie_name,
            session_ttl_secs = ctx.settings.auth.session_ttl_secs,
            "admin module initialized"
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
