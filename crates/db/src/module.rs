use std::sync::Arc;

use async_trait::async_trait;
use libris_kernel::{InitCtx, Module};

use crate::store::Store;

/// Core module owning the entity store's lifecycle.
pub struct DbModule {
    store: Arc<Store>,
}

impl DbModule {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Module for DbModule {
    fn name(&self) -> &'static str {
        "db"
    }

    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let (books, readers, administrators) = self.store.read(|tables| tables.counts()).await;
        tracing::info!(
            module = self.name(),
            books,
            readers,
            administrators,
            persistent = self.store.snapshot_path().is_some(),
            "entity store ready"
        );
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        self.store.flush().await?;
        tracing::info!(module = self.name(), "entity store flushed");
        Ok(())
    }
}
