use std::sync::Arc;

use libris_db::{Audit, Reader, ReaderId, Repository, Store};
use libris_kernel::{EntityKind, IdentityContext, LibraryError, LibraryResult, SharedClock};

use super::models::{CreateReader, ReaderDetail, ReaderView, UpdateReader};
use crate::catalog::{self, ReaderSearch, ReaderSort};
use crate::lending;

/// Reader registry operations over the shared store.
pub struct ReaderService {
    store: Arc<Store>,
    clock: SharedClock,
}

impl ReaderService {
    pub fn new(store: Arc<Store>, clock: SharedClock) -> Self {
        Self { store, clock }
    }

    pub async fn create(
        &self,
        ctx: &IdentityContext,
        request: CreateReader,
    ) -> LibraryResult<ReaderView> {
        if !request.is_complete() {
            return Err(LibraryError::InvalidRequest);
        }

        let reader = Reader::new(
            request.name,
            request.last_name,
            request.address,
            request.phone_number,
            Audit::created(ctx, self.clock.now()),
        );
        let stored = self.store.write(move |tables| Ok(tables.add(reader))).await?;

        tracing::info!(reader_id = %stored.id, created_by = %ctx.username(), "reader created");
        Ok(stored.into())
    }

    pub async fn update(
        &self,
        ctx: &IdentityContext,
        id: ReaderId,
        patch: UpdateReader,
    ) -> LibraryResult<ReaderView> {
        let now = self.clock.now();
        let updated = self
            .store
            .write(move |tables| {
                let mut reader = Repository::<Reader>::get(tables, id)
                    .cloned()
                    .ok_or_else(|| LibraryError::not_found(EntityKind::Reader, id))?;
                patch.apply_to(&mut reader);
                reader.audit.touch(ctx, now);
                tables.update(reader.clone())?;
                Ok(reader)
            })
            .await?;

        tracing::info!(reader_id = %id, modified_by = %ctx.username(), "reader updated");
        Ok(updated.into())
    }

    pub async fn get(&self, id: ReaderId) -> LibraryResult<ReaderDetail> {
        self.store
            .read(|tables| catalog::reader_with_books(tables, id))
            .await
            .map(ReaderDetail::from)
    }

    pub async fn list(&self) -> Vec<ReaderView> {
        let readers = self.store.read(|tables| catalog::list_readers(tables)).await;
        readers.into_iter().map(ReaderView::from).collect()
    }

    pub async fn search(&self, search: ReaderSearch) -> Vec<ReaderView> {
        let readers = self
            .store
            .read(|tables| catalog::search_readers(tables, &search))
            .await;
        readers.into_iter().map(ReaderView::from).collect()
    }

    pub async fn sort(&self, criterion: Option<ReaderSort>) -> Vec<ReaderView> {
        let readers = self.store.read(|tables| catalog::list_readers(tables)).await;
        catalog::sort_readers(readers, criterion)
            .into_iter()
            .map(ReaderView::from)
            .collect()
    }

    pub async fn delete(&self, id: ReaderId) -> LibraryResult<()> {
        self.store
            .write(|tables| lending::delete_reader(tables, id))
            .await
            .map(|_| ())
    }
}
