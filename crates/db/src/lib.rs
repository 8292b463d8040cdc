//! Libris entity store.
//!
//! Books, readers, and administrators live in [`Tables`], which implements the
//! [`Repository`] contract for every [`Entity`]. [`Store`] wraps the tables in
//! a single lock so that each write runs as one atomic check-then-act step.

pub mod entities;
pub mod ids;
pub mod lock;
pub mod module;
pub mod repository;
pub mod store;

pub use entities::{Administrator, Audit, Book, Reader};
pub use ids::{AdminId, BookId, ReaderId};
pub use lock::SnapshotLock;
pub use module::DbModule;
pub use repository::{Entity, Repository, Table, Tables};
pub use store::Store;
