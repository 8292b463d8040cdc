pub mod admin;
pub mod books;
pub mod readers;

use std::sync::Arc;

use libris_kernel::ModuleRegistry;

use crate::state::AppState;

/// Register all project-specific modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, state: &AppState) {
    registry.register_custom(Arc::new(admin::AdminModule::new(state.clone())));
    registry.register_custom(Arc::new(books::BooksModule::new(state.clone())));
    registry.register_custom(Arc::new(readers::ReadersModule::new(state.clone())));
}
