//! Repository contract and its in-memory table implementation.

use std::collections::BTreeMap;
use std::fmt;

use libris_kernel::{EntityKind, LibraryError, LibraryResult};
use serde::{Deserialize, Serialize};

use crate::entities::{Administrator, Book, Reader};

/// A record kind the store knows how to hold.
pub trait Entity: Clone + Send + Sync + 'static {
    type Id: Copy + Eq + From<u32> + Into<u32> + fmt::Display;

    const KIND: EntityKind;

    fn id(&self) -> Self::Id;

    fn assign_id(&mut self, id: Self::Id);

    fn table(tables: &Tables) -> &Table<Self>;

    fn table_mut(tables: &mut Tables) -> &mut Table<Self>;
}

/// Per-call storage operations the catalog, lending, and credential logic run against.
pub trait Repository<E: Entity> {
    fn get(&self, id: E::Id) -> Option<&E>;

    /// Insert a new record, assigning the next free id. Returns the stored copy.
    fn add(&mut self, entity: E) -> E;

    /// Replace an existing record. Fails with `NotFound` if the id is unknown.
    fn update(&mut self, entity: E) -> LibraryResult<()>;

    fn remove(&mut self, id: E::Id) -> Option<E>;

    /// Every record matching `predicate`, in ascending id order.
    fn query<P>(&self, predicate: P) -> Vec<E>
    where
        P: FnMut(&E) -> bool;
}

/// Rows of one entity kind keyed by raw id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table<E> {
    rows: BTreeMap<u32, E>,
    next_id: u32,
}

impl<E> Default for Table<E> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl<E> Table<E> {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// All tables of the entity store. This is the unit that is locked, staged, and snapshotted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Tables {
    #[serde(default)]
    pub(crate) books: Table<Book>,
    #[serde(default)]
    pub(crate) readers: Table<Reader>,
    #[serde(default)]
    pub(crate) administrators: Table<Administrator>,
}

impl Tables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record counts as (books, readers, administrators).
    pub fn counts(&self) -> (usize, usize, usize) {
        (
            self.books.len(),
            self.readers.len(),
            self.administrators.len(),
        )
    }
}

impl<E: Entity> Repository<E> for Tables {
    fn get(&self, id: E::Id) -> Option<&E> {
        E::table(self).rows.get(&id.into())
    }

    fn add(&mut self, mut entity: E) -> E {
        let table = E::table_mut(self);
        let raw = table.next_id;
        table.next_id += 1;
        entity.assign_id(E::Id::from(raw));
        table.rows.insert(raw, entity.clone());
        entity
    }

    fn update(&mut self, entity: E) -> LibraryResult<()> {
        let id = entity.id();
        match E::table_mut(self).rows.get_mut(&id.into()) {
            Some(row) => {
                *row = entity;
                Ok(())
            }
            None => Err(LibraryError::not_found(E::KIND, id)),
        }
    }

    fn remove(&mut self, id: E::Id) -> Option<E> {
        E::table_mut(self).rows.remove(&id.into())
    }

    fn query<P>(&self, mut predicate: P) -> Vec<E>
    where
        P: FnMut(&E) -> bool,
    {
        E::table(self)
            .rows
            .values()
            .filter(|row| predicate(row))
            .cloned()
            .collect()
    }
}
