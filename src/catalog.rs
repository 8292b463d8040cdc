//! Catalog queries: listing, searching, sorting, and detail projections.
//!
//! All functions are pure reads over a [`Repository`]; callers run them inside
//! [`libris_db::Store::read`].

use libris_db::{Book, BookId, Reader, ReaderId, Repository};
use libris_kernel::{EntityKind, LibraryError, LibraryResult};

use crate::lending;

/// Book search input. Both filters are optional and combine with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookSearch {
    pub text: Option<String>,
    pub year: Option<i32>,
}

/// Reader search input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReaderSearch {
    pub text: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookSort {
    ReleaseYearAsc,
    ReleaseYearDesc,
    TitleAsc,
    TitleDesc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderSort {
    NameAsc,
    NameDesc,
    LastNameAsc,
    LastNameDesc,
}

/// Case-insensitive substring test against any of `fields`.
fn matches_text(needle: &str, fields: &[&str]) -> bool {
    let needle = needle.to_lowercase();
    fields
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

/// Empty search text counts as "not supplied".
fn normalized(text: &Option<String>) -> Option<&str> {
    text.as_deref().filter(|text| !text.is_empty())
}

pub fn list_books<R: Repository<Book>>(repo: &R) -> Vec<Book> {
    repo.query(|_: &Book| true)
}

pub fn list_readers<R: Repository<Reader>>(repo: &R) -> Vec<Reader> {
    repo.query(|_: &Reader| true)
}

pub fn search_books<R: Repository<Book>>(repo: &R, search: &BookSearch) -> Vec<Book> {
    let text = normalized(&search.text);
    repo.query(|book: &Book| {
        let text_ok = text.map_or(true, |text| {
            matches_text(text, &[&book.author, &book.title, &book.genre])
        });
        let year_ok = search.year.map_or(true, |year| book.release_year == year);
        text_ok && year_ok
    })
}

pub fn search_readers<R: Repository<Reader>>(repo: &R, search: &ReaderSearch) -> Vec<Reader> {
    let text = normalized(&search.text);
    repo.query(|reader: &Reader| {
        text.map_or(true, |text| {
            matches_text(
                text,
                &[
                    &reader.name,
                    &reader.last_name,
                    &reader.address,
                    &reader.phone_number,
                ],
            )
        })
    })
}

/// Stable sort by one criterion; `None` keeps the snapshot order.
pub fn sort_books(mut books: Vec<Book>, criterion: Option<BookSort>) -> Vec<Book> {
    let Some(criterion) = criterion else {
        return books;
    };
    books.sort_by(|a, b| match criterion {
        BookSort::ReleaseYearAsc => a.release_year.cmp(&b.release_year),
        BookSort::ReleaseYearDesc => b.release_year.cmp(&a.release_year),
        BookSort::TitleAsc => a.title.cmp(&b.title),
        BookSort::TitleDesc => b.title.cmp(&a.title),
    });
    books
}

pub fn sort_readers(mut readers: Vec<Reader>, criterion: Option<ReaderSort>) -> Vec<Reader> {
    let Some(criterion) = criterion else {
        return readers;
    };
    readers.sort_by(|a, b| match criterion {
        ReaderSort::NameAsc => a.name.cmp(&b.name),
        ReaderSort::NameDesc => b.name.cmp(&a.name),
        ReaderSort::LastNameAsc => a.last_name.cmp(&b.last_name),
        ReaderSort::LastNameDesc => b.last_name.cmp(&a.last_name),
    });
    readers
}

/// A book together with its current holder, if any.
pub fn book_with_holder<R>(repo: &R, id: BookId) -> LibraryResult<(Book, Option<Reader>)>
where
    R: Repository<Book> + Repository<Reader>,
{
    let book = Repository::<Book>::get(repo, id)
        .cloned()
        .ok_or_else(|| LibraryError::not_found(EntityKind::Book, id))?;
    let holder = book
        .holder()
        .and_then(|reader_id| Repository::<Reader>::get(repo, reader_id).cloned());
    Ok((book, holder))
}

/// A reader together with the books they currently hold.
pub fn reader_with_books<R>(repo: &R, id: ReaderId) -> LibraryResult<(Reader, Vec<Book>)>
where
    R: Repository<Book> + Repository<Reader>,
{
    let reader = Repository::<Reader>::get(repo, id)
        .cloned()
        .ok_or_else(|| LibraryError::not_found(EntityKind::Reader, id))?;
    let books = lending::held_books(repo, id);
    Ok((reader, books))
}
