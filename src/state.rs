//! Shared handler state and the module registry wiring.

use std::sync::Arc;

use axum::extract::FromRef;
use libris_authz::{AuthzModule, CredentialService, SessionStore};
use libris_db::{DbModule, Store};
use libris_kernel::{settings::Settings, ModuleRegistry, SharedClock};

use crate::modules::{books::BookService, readers::ReaderService};

/// Services every HTTP module reaches through `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub books: Arc<BookService>,
    pub readers: Arc<ReaderService>,
    pub credentials: Arc<CredentialService>,
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    pub fn new(store: Arc<Store>, settings: &Settings, clock: SharedClock) -> Self {
        Self {
            books: Arc::new(BookService::new(store.clone(), clock.clone())),
            readers: Arc::new(ReaderService::new(store.clone(), clock.clone())),
            credentials: Arc::new(CredentialService::new(store.clone())),
            sessions: Arc::new(SessionStore::new(&settings.auth, clock)),
            store,
        }
    }
}

impl FromRef<AppState> for Arc<SessionStore> {
    fn from_ref(state: &AppState) -> Self {
        state.sessions.clone()
    }
}

/// Registry with the store and session modules as core and the library modules as custom.
pub fn build_registry(state: &AppState) -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    registry.register_core(Arc::new(DbModule::new(state.store.clone())));
    registry.register_core(Arc::new(AuthzModule::new(state.sessions.clone())));
    crate::modules::register_all(&mut registry, state);
    registry
}
