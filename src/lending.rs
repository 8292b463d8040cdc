//! Lending engine: take/return transitions and the deletion guards that keep
//! book holders pointing at existing readers.
//!
//! Every function here is a single check-then-act step over a [`Repository`].
//! Callers run them inside [`libris_db::Store::write`] so the checks and the
//! mutation are atomic with respect to other writers.

use libris_db::{Book, BookId, Reader, ReaderId, Repository};
use libris_kernel::{EntityKind, LibraryError, LibraryResult};

fn require_ids(book_id: BookId, reader_id: ReaderId) -> LibraryResult<()> {
    if book_id.is_unset() || reader_id.is_unset() {
        return Err(LibraryError::InvalidRequest);
    }
    Ok(())
}

/// Fetch the book and make sure the reader exists, book first.
fn load_pair<R>(repo: &R, book_id: BookId, reader_id: ReaderId) -> LibraryResult<Book>
where
    R: Repository<Book> + Repository<Reader>,
{
    let book = Repository::<Book>::get(repo, book_id)
        .cloned()
        .ok_or_else(|| LibraryError::not_found(EntityKind::Book, book_id))?;

    if Repository::<Reader>::get(repo, reader_id).is_none() {
        return Err(LibraryError::not_found(EntityKind::Reader, reader_id));
    }

    Ok(book)
}

/// Shelved -> CheckedOut(reader). Audit fields are left alone.
pub fn take_book<R>(repo: &mut R, book_id: BookId, reader_id: ReaderId) -> LibraryResult<Book>
where
    R: Repository<Book> + Repository<Reader>,
{
    require_ids(book_id, reader_id)?;
    let mut book = load_pair(&*repo, book_id, reader_id)?;

    book.check_out(reader_id)?;
    Repository::<Book>::update(repo, book.clone())?;

    tracing::info!(book_id = %book_id, reader_id = %reader_id, "book taken from library");
    Ok(book)
}

/// CheckedOut(reader) -> Shelved.
///
/// A reader that exists but is not the holder is reported as
/// `NotFound(Reader, reader_id)`, not as a separate conflict.
pub fn return_book<R>(repo: &mut R, book_id: BookId, reader_id: ReaderId) -> LibraryResult<Book>
where
    R: Repository<Book> + Repository<Reader>,
{
    require_ids(book_id, reader_id)?;
    let mut book = load_pair(&*repo, book_id, reader_id)?;

    match book.holder() {
        None => return Err(LibraryError::AlreadyShelved(book_id.0)),
        Some(holder) if holder != reader_id => {
            return Err(LibraryError::not_found(EntityKind::Reader, reader_id));
        }
        Some(_) => {}
    }

    book.shelve()?;
    Repository::<Book>::update(repo, book.clone())?;

    tracing::info!(book_id = %book_id, reader_id = %reader_id, "book returned to library");
    Ok(book)
}

/// Remove a book that is on the shelf.
pub fn delete_book<R>(repo: &mut R, book_id: BookId) -> LibraryResult<Book>
where
    R: Repository<Book>,
{
    let book = repo
        .get(book_id)
        .ok_or_else(|| LibraryError::not_found(EntityKind::Book, book_id))?;

    if !book.is_shelved() {
        return Err(LibraryError::UndeletableCheckedOut);
    }

    let removed = repo
        .remove(book_id)
        .ok_or_else(|| LibraryError::not_found(EntityKind::Book, book_id))?;
    tracing::info!(book_id = %book_id, "book deleted");
    Ok(removed)
}

/// Remove a reader who holds no books.
pub fn delete_reader<R>(repo: &mut R, reader_id: ReaderId) -> LibraryResult<Reader>
where
    R: Repository<Book> + Repository<Reader>,
{
    if Repository::<Reader>::get(&*repo, reader_id).is_none() {
        return Err(LibraryError::not_found(EntityKind::Reader, reader_id));
    }

    let held = held_books(&*repo, reader_id);
    if !held.is_empty() {
        tracing::debug!(reader_id = %reader_id, held = held.len(), "reader still holds books");
        return Err(LibraryError::UndeletableHasBooks);
    }

    let removed = Repository::<Reader>::remove(repo, reader_id)
        .ok_or_else(|| LibraryError::not_found(EntityKind::Reader, reader_id))?;
    tracing::info!(reader_id = %reader_id, "reader deleted");
    Ok(removed)
}

/// Books whose holder is `reader_id`.
pub fn held_books<R>(repo: &R, reader_id: ReaderId) -> Vec<Book>
where
    R: Repository<Book>,
{
    repo.query(|book: &Book| book.holder() == Some(reader_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use libris_db::{Audit, Tables};
    use libris_kernel::IdentityContext;
    use time::OffsetDateTime;

    fn audit() -> Audit {
        Audit::created(&IdentityContext::new("admin"), OffsetDateTime::UNIX_EPOCH)
    }

    /// Book 1 and Reader 1, plus Reader 2.
    fn library() -> Tables {
        let mut tables = Tables::new();
        tables.add(Book::new("Kostja", "Roadside Picnic", 1972, "sci-fi", audit()));
        tables.add(Reader::new("Ivan", "Petrov", "Main st 1", "555-01", audit()));
        tables.add(Reader::new("Olga", "Sidorova", "Main st 2", "555-02", audit()));
        tables
    }

    fn holder(tables: &Tables, id: u32) -> Option<ReaderId> {
        Repository::<Book>::get(tables, BookId(id))
            .and_then(|book| book.holder())
    }

    /// Every non-null holder must name an existing reader.
    fn assert_holders_exist(tables: &Tables) {
        for book in tables.query(|_: &Book| true) {
            if let Some(reader) = book.holder() {
                assert!(
                    Repository::<Reader>::get(tables, reader).is_some(),
                    "book {} held by missing reader {}",
                    book.id,
                    reader
                );
            }
        }
    }

    #[test]
    fn take_and_return_cycle() {
        let mut tables = library();

        let taken = take_book(&mut tables, BookId(1), ReaderId(1)).unwrap();
        assert_eq!(taken.holder(), Some(ReaderId(1)));
        assert_eq!(holder(&tables, 1), Some(ReaderId(1)));
        assert_holders_exist(&tables);

        assert_eq!(
            take_book(&mut tables, BookId(1), ReaderId(1)),
            Err(LibraryError::AlreadyCheckedOut(1))
        );

        return_book(&mut tables, BookId(1), ReaderId(1)).unwrap();
        assert_eq!(holder(&tables, 1), None);

        assert_eq!(
            return_book(&mut tables, BookId(1), ReaderId(1)),
            Err(LibraryError::AlreadyShelved(1))
        );
        assert_holders_exist(&tables);
    }

    #[test]
    fn take_of_checked_out_book_fails_for_any_reader() {
        let mut tables = library();
        take_book(&mut tables, BookId(1), ReaderId(1)).unwrap();

        assert_eq!(
            take_book(&mut tables, BookId(1), ReaderId(2)),
            Err(LibraryError::AlreadyCheckedOut(1))
        );
        assert_eq!(holder(&tables, 1), Some(ReaderId(1)));
    }

    #[test]
    fn zero_ids_are_invalid_requests() {
        let mut tables = library();

        assert_eq!(
            take_book(&mut tables, BookId(0), ReaderId(1)),
            Err(LibraryError::InvalidRequest)
        );
        assert_eq!(
            take_book(&mut tables, BookId(1), ReaderId(0)),
            Err(LibraryError::InvalidRequest)
        );
        assert_eq!(
            return_book(&mut tables, BookId(0), ReaderId(0)),
            Err(LibraryError::InvalidRequest)
        );
    }

    #[test]
    fn missing_book_is_reported_before_missing_reader() {
        let mut tables = library();

        assert_eq!(
            take_book(&mut tables, BookId(9), ReaderId(9)),
            Err(LibraryError::not_found(EntityKind::Book, 9u32))
        );
        assert_eq!(
            take_book(&mut tables, BookId(1), ReaderId(9)),
            Err(LibraryError::not_found(EntityKind::Reader, 9u32))
        );
        assert_eq!(
            return_book(&mut tables, BookId(9), ReaderId(1)),
            Err(LibraryError::not_found(EntityKind::Book, 9u32))
        );
        assert_eq!(holder(&tables, 1), None);
    }

    #[test]
    fn returning_a_shelved_book_checks_the_reader_first() {
        let mut tables = library();

        assert_eq!(
            return_book(&mut tables, BookId(1), ReaderId(9)),
            Err(LibraryError::not_found(EntityKind::Reader, 9u32))
        );
        assert_eq!(
            return_book(&mut tables, BookId(1), ReaderId(2)),
            Err(LibraryError::AlreadyShelved(1))
        );

        assert_eq!(holder(&tables, 1), None);
        assert_eq!(tables.counts(), (1, 2, 0));
        assert!(Repository::<Reader>::get(&tables, ReaderId(2)).is_some());
    }

    #[test]
    fn return_by_non_holder_is_reader_not_found() {
        let mut tables = library();
        take_book(&mut tables, BookId(1), ReaderId(1)).unwrap();

        assert_eq!(
            return_book(&mut tables, BookId(1), ReaderId(2)),
            Err(LibraryError::not_found(EntityKind::Reader, 2u32))
        );
        assert_eq!(holder(&tables, 1), Some(ReaderId(1)));
    }

    #[test]
    fn lending_does_not_touch_audit_fields() {
        let mut tables = library();
        let before = Repository::<Book>::get(&tables, BookId(1)).unwrap().audit.clone();

        take_book(&mut tables, BookId(1), ReaderId(1)).unwrap();
        return_book(&mut tables, BookId(1), ReaderId(1)).unwrap();

        let after = &Repository::<Book>::get(&tables, BookId(1)).unwrap().audit;
        assert_eq!(&before, after);
    }

    #[test]
    fn checked_out_book_cannot_be_deleted() {
        let mut tables = library();
        take_book(&mut tables, BookId(1), ReaderId(1)).unwrap();

        assert_eq!(
            delete_book(&mut tables, BookId(1)),
            Err(LibraryError::UndeletableCheckedOut)
        );
        assert!(Repository::<Book>::get(&tables, BookId(1)).is_some());

        return_book(&mut tables, BookId(1), ReaderId(1)).unwrap();
        delete_book(&mut tables, BookId(1)).unwrap();
        assert!(Repository::<Book>::get(&tables, BookId(1)).is_none());
    }

    #[test]
    fn delete_of_missing_records_is_not_found() {
        let mut tables = library();
        assert_eq!(
            delete_book(&mut tables, BookId(5)),
            Err(LibraryError::not_found(EntityKind::Book, 5u32))
        );
        assert_eq!(
            delete_reader(&mut tables, ReaderId(5)),
            Err(LibraryError::not_found(EntityKind::Reader, 5u32))
        );
    }

    #[test]
    fn reader_holding_books_cannot_be_deleted() {
        let mut tables = library();
        take_book(&mut tables, BookId(1), ReaderId(1)).unwrap();

        assert_eq!(
            delete_reader(&mut tables, ReaderId(1)),
            Err(LibraryError::UndeletableHasBooks)
        );
        assert!(Repository::<Reader>::get(&tables, ReaderId(1)).is_some());
        assert_holders_exist(&tables);

        // A reader without books goes away.
        delete_reader(&mut tables, ReaderId(2)).unwrap();
        assert!(Repository::<Reader>::get(&tables, ReaderId(2)).is_none());
        assert_holders_exist(&tables);
    }

    #[test]
    fn held_books_lists_only_the_readers_books() {
        let mut tables = library();
        tables.add(Book::new("Lem", "Solaris", 1961, "sci-fi", audit()));
        take_book(&mut tables, BookId(2), ReaderId(2)).unwrap();

        let held = held_books(&tables, ReaderId(2));
        assert_eq!(held.len(), 1);
        assert_eq!(held[0].title, "Solaris");
        assert!(held_books(&tables, ReaderId(1)).is_empty());
    }
}
