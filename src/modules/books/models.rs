use libris_db::{Book, BookId, Reader, ReaderId};
use serde::{Deserialize, Serialize};

use crate::catalog::{BookSearch, BookSort};

/// Book as returned by list, search, and sort.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookView {
    pub id: BookId,
    pub author: String,
    pub title: String,
    pub release_year: i32,
    pub genre: String,
    /// Reader currently holding the book; `None` while it is on the shelf.
    pub reader_id: Option<ReaderId>,
}

impl From<&Book> for BookView {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id,
            author: book.author.clone(),
            title: book.title.clone(),
            release_year: book.release_year,
            genre: book.genre.clone(),
            reader_id: book.holder(),
        }
    }
}

impl From<Book> for BookView {
    fn from(book: Book) -> Self {
        Self::from(&book)
    }
}

/// Book with the holder's contact details denormalized in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookDetail {
    pub id: BookId,
    pub author: String,
    pub title: String,
    pub release_year: i32,
    pub genre: String,
    pub reader_id: Option<ReaderId>,
    pub reader_name: Option<String>,
    pub reader_last_name: Option<String>,
    pub reader_address: Option<String>,
    pub phone_number: Option<String>,
}

impl From<(Book, Option<Reader>)> for BookDetail {
    fn from((book, holder): (Book, Option<Reader>)) -> Self {
        let reader_id = book.holder();
        let (reader_name, reader_last_name, reader_address, phone_number) = match holder {
            Some(reader) => (
                Some(reader.name),
                Some(reader.last_name),
                Some(reader.address),
                Some(reader.phone_number),
            ),
            None => (None, None, None, None),
        };

        Self {
            id: book.id,
            author: book.author,
            title: book.title,
            release_year: book.release_year,
            genre: book.genre,
            reader_id,
            reader_name,
            reader_last_name,
            reader_address,
            phone_number,
        }
    }
}

/// Request model for creating a new book.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBook {
    pub author: String,
    pub title: String,
    pub release_year: i32,
    pub genre: String,
}

impl CreateBook {
    pub fn is_complete(&self) -> bool {
        [&self.author, &self.title, &self.genre]
            .iter()
            .all(|field| !field.trim().is_empty())
    }
}

/// Partial update. Absent or empty fields keep the stored value; the holder
/// is not part of the patch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateBook {
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub release_year: Option<i32>,
    #[serde(default)]
    pub genre: Option<String>,
}

impl UpdateBook {
    pub fn apply_to(self, book: &mut Book) {
        fn set(target: &mut String, value: Option<String>) {
            if let Some(value) = value.filter(|value| !value.is_empty()) {
                *target = value;
            }
        }

        set(&mut book.author, self.author);
        set(&mut book.title, self.title);
        set(&mut book.genre, self.genre);
        if let Some(year) = self.release_year {
            book.release_year = year;
        }
    }
}

/// `?text=&year=` query for book search.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchBooksQuery {
    pub text: Option<String>,
    pub year: Option<i32>,
}

impl From<SearchBooksQuery> for BookSearch {
    fn from(query: SearchBooksQuery) -> Self {
        Self {
            text: query.text,
            year: query.year,
        }
    }
}

/// Boolean sort flags; the first one set wins.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct SortBooksQuery {
    pub sort_by_release_year_asc: bool,
    pub sort_by_release_year_desc: bool,
    pub sort_by_title_asc: bool,
    pub sort_by_title_desc: bool,
}

impl SortBooksQuery {
    pub fn criterion(&self) -> Option<BookSort> {
        if self.sort_by_release_year_asc {
            Some(BookSort::ReleaseYearAsc)
        } else if self.sort_by_release_year_desc {
            Some(BookSort::ReleaseYearDesc)
        } else if self.sort_by_title_asc {
            Some(BookSort::TitleAsc)
        } else if self.sort_by_title_desc {
            Some(BookSort::TitleDesc)
        } else {
            None
        }
    }
}

/// Body of take/return requests. Missing ids default to zero and are rejected.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BookReaderRequest {
    pub book_id: BookId,
    pub reader_id: ReaderId,
}
