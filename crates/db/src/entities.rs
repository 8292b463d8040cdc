//! Records held by the entity store.

use libris_kernel::{EntityKind, IdentityContext, LibraryError, LibraryResult};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::ids::{AdminId, BookId, ReaderId};
use crate::repository::{Entity, Table, Tables};

/// Who created and last modified a record, and when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Audit {
    #[serde(with = "time::serde::rfc3339")]
    pub created_on: OffsetDateTime,
    pub created_by: String,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub last_modified_on: Option<OffsetDateTime>,
    #[serde(default)]
    pub last_modified_by: Option<String>,
}

impl Audit {
    pub fn created(ctx: &IdentityContext, now: OffsetDateTime) -> Self {
        Self {
            created_on: now,
            created_by: ctx.username().to_string(),
            last_modified_on: None,
            last_modified_by: None,
        }
    }

    pub fn touch(&mut self, ctx: &IdentityContext, now: OffsetDateTime) {
        self.last_modified_on = Some(now);
        self.last_modified_by = Some(ctx.username().to_string());
    }
}

/// A catalog entry. The holder is private: it only moves through
/// [`Book::check_out`] and [`Book::shelve`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub author: String,
    pub title: String,
    pub release_year: i32,
    pub genre: String,
    #[serde(default)]
    holder: Option<ReaderId>,
    pub audit: Audit,
}

impl Book {
    /// A new, shelved book. The store assigns the id on insert.
    pub fn new(
        author: impl Into<String>,
        title: impl Into<String>,
        release_year: i32,
        genre: impl Into<String>,
        audit: Audit,
    ) -> Self {
        Self {
            id: BookId::default(),
            author: author.into(),
            title: title.into(),
            release_year,
            genre: genre.into(),
            holder: None,
            audit,
        }
    }

    pub fn holder(&self) -> Option<ReaderId> {
        self.holder
    }

    pub fn is_shelved(&self) -> bool {
        self.holder.is_none()
    }

    /// Shelved -> CheckedOut(reader).
    pub fn check_out(&mut self, reader: ReaderId) -> LibraryResult<()> {
        if self.holder.is_some() {
            return Err(LibraryError::AlreadyCheckedOut(self.id.0));
        }
        self.holder = Some(reader);
        Ok(())
    }

    /// CheckedOut(_) -> Shelved.
    pub fn shelve(&mut self) -> LibraryResult<()> {
        if self.holder.take().is_none() {
            return Err(LibraryError::AlreadyShelved(self.id.0));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reader {
    pub id: ReaderId,
    pub name: String,
    pub last_name: String,
    pub address: String,
    pub phone_number: String,
    pub audit: Audit,
}

impl Reader {
    pub fn new(
        name: impl Into<String>,
        last_name: impl Into<String>,
        address: impl Into<String>,
        phone_number: impl Into<String>,
        audit: Audit,
    ) -> Self {
        Self {
            id: ReaderId::default(),
            name: name.into(),
            last_name: last_name.into(),
            address: address.into(),
            phone_number: phone_number.into(),
            audit,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Administrator {
    pub id: AdminId,
    pub username: String,
    #[serde(with = "hex::serde")]
    pub password_hash: Vec<u8>,
    #[serde(with = "hex::serde")]
    pub password_salt: Vec<u8>,
    pub name: String,
    pub last_name: String,
}

impl Entity for Book {
    type Id = BookId;
    const KIND: EntityKind = EntityKind::Book;

    fn id(&self) -> BookId {
        self.id
    }

    fn assign_id(&mut self, id: BookId) {
        self.id = id;
    }

    fn table(tables: &Tables) -> &Table<Self> {
        &tables.books
    }

    fn table_mut(tables: &mut Tables) -> &mut Table<Self> {
        &mut tables.books
    }
}

impl Entity for Reader {
    type Id = ReaderId;
    const KIND: EntityKind = EntityKind::Reader;

    fn id(&self) -> ReaderId {
        self.id
    }

    fn assign_id(&mut self, id: ReaderId) {
        self.id = id;
    }

    fn table(tables: &Tables) -> &Table<Self> {
        &tables.readers
    }

    fn table_mut(tables: &mut Tables) -> &mut Table<Self> {
        &mut tables.readers
    }
}

impl Entity for Administrator {
    type Id = AdminId;
    const KIND: EntityKind = EntityKind::Administrator;

    fn id(&self) -> AdminId {
        self.id
    }

    fn assign_id(&mut self, id: AdminId) {
        self.id = id;
    }

    fn table(tables: &Tables) -> &Table<Self> {
        &tables.administrators
    }

    fn table_mut(tables: &mut Tables) -> &mut Table<Self> {
        &mut tables.administrators
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book() -> Book {
        let audit = Audit::created(&IdentityContext::new("admin"), OffsetDateTime::UNIX_EPOCH);
        let mut book = Book::new("Ivan", "Dune", 1965, "sci-fi", audit);
        book.id = BookId(1);
        book
    }

    #[test]
    fn new_book_is_shelved() {
        assert!(book().is_shelved());
        assert_eq!(book().holder(), None);
    }

    #[test]
    fn check_out_twice_is_rejected() {
        let mut book = book();
        book.check_out(ReaderId(2)).unwrap();
        assert_eq!(book.holder(), Some(ReaderId(2)));
        assert_eq!(
            book.check_out(ReaderId(2)),
            Err(LibraryError::AlreadyCheckedOut(1))
        );
        assert_eq!(book.holder(), Some(ReaderId(2)));
    }

    #[test]
    fn shelving_a_shelved_book_is_rejected() {
        let mut book = book();
        assert_eq!(book.shelve(), Err(LibraryError::AlreadyShelved(1)));
        book.check_out(ReaderId(3)).unwrap();
        book.shelve().unwrap();
        assert!(book.is_shelved());
    }

    #[test]
    fn touch_stamps_modification_only() {
        let created = OffsetDateTime::UNIX_EPOCH;
        let later = created + time::Duration::hours(1);
        let mut audit = Audit::created(&IdentityContext::new("alice"), created);
        audit.touch(&IdentityContext::new("bob"), later);

        assert_eq!(audit.created_by, "alice");
        assert_eq!(audit.created_on, created);
        assert_eq!(audit.last_modified_by.as_deref(), Some("bob"));
        assert_eq!(audit.last_modified_on, Some(later));
    }

    #[test]
    fn administrator_digest_round_trips_as_hex() {
        let admin = Administrator {
            id: AdminId(1),
            username: "admin".into(),
            password_hash: vec![0xde, 0xad],
            password_salt: vec![0xbe, 0xef],
            name: "Ada".into(),
            last_name: "Lovelace".into(),
        };
        let json = serde_json::to_value(&admin).unwrap();
        assert_eq!(json["password_hash"], "dead");
        let back: Administrator = serde_json::from_value(json).unwrap();
        assert_eq!(back, admin);
    }
}
