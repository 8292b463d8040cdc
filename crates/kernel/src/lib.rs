//! Libris kernel: settings, module lifecycle, error taxonomy, and the ambient
//! identity/clock contracts every other crate builds on.

pub mod context;
pub mod error;
pub mod module;
pub mod registry;
pub mod settings;

pub use context::{Clock, FixedClock, IdentityContext, SharedClock, SystemClock};
pub use error::{EntityKind, ErrorDescriptor, LibraryError, LibraryResult};
pub use module::{InitCtx, Module};
pub use registry::ModuleRegistry;
