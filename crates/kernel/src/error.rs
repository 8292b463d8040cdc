//! Error taxonomy shared by every Libris component.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Kind of record held by the entity store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EntityKind {
    Book,
    Reader,
    Administrator,
}

impl EntityKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Book => "Book",
            EntityKind::Reader => "Reader",
            EntityKind::Administrator => "Administrator",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-visible failures of catalog, lending, and credential operations.
///
/// Everything except [`LibraryError::Storage`] is a recoverable condition the
/// caller is expected to report back to the user.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LibraryError {
    #[error("invalid data provided")]
    InvalidRequest,

    #[error("Object '{kind}' with id '{id}' not found")]
    NotFound { kind: EntityKind, id: u32 },

    #[error("Impossible to take the book with id: {0}. The book is already taken.")]
    AlreadyCheckedOut(u32),

    #[error("Book with id: {0} is already in the library")]
    AlreadyShelved(u32),

    #[error("Impossible to delete a book which is taken by a reader")]
    UndeletableCheckedOut,

    #[error("Impossible to delete a reader with taken books from the library")]
    UndeletableHasBooks,

    #[error("User with username '{0}' already exists")]
    DuplicateUser(String),

    #[error("Failed to login! Invalid Credentials!")]
    InvalidCredentials,

    #[error("storage failure: {0}")]
    Storage(String),
}

impl LibraryError {
    pub fn not_found(kind: EntityKind, id: impl Into<u32>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Stable machine-readable name of the error kind.
    pub const fn kind(&self) -> &'static str {
        match self {
            LibraryError::InvalidRequest => "invalid_request",
            LibraryError::NotFound { .. } => "not_found",
            LibraryError::AlreadyCheckedOut(_) => "already_checked_out",
            LibraryError::AlreadyShelved(_) => "already_shelved",
            LibraryError::UndeletableCheckedOut => "undeletable_checked_out",
            LibraryError::UndeletableHasBooks => "undeletable_has_books",
            LibraryError::DuplicateUser(_) => "duplicate_user",
            LibraryError::InvalidCredentials => "invalid_credentials",
            LibraryError::Storage(_) => "storage",
        }
    }

    /// Plain descriptor handed to presentation layers.
    pub fn descriptor(&self) -> ErrorDescriptor {
        let (entity, id) = match self {
            LibraryError::NotFound { kind, id } => (Some(*kind), Some(*id)),
            LibraryError::AlreadyCheckedOut(id) | LibraryError::AlreadyShelved(id) => {
                (Some(EntityKind::Book), Some(*id))
            }
            _ => (None, None),
        };

        ErrorDescriptor {
            kind: self.kind(),
            entity,
            id,
        }
    }
}

/// `{kind, entity?, id?}` view of a [`LibraryError`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorDescriptor {
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<EntityKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
}

pub type LibraryResult<T> = Result<T, LibraryError>;
