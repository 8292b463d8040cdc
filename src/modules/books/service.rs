use std::sync::Arc;

use libris_db::{Audit, Book, BookId, ReaderId, Repository, Store};
use libris_kernel::{EntityKind, IdentityContext, LibraryError, LibraryResult, SharedClock};

use super::models::{BookDetail, BookView, CreateBook, UpdateBook};
use crate::catalog::{self, BookSearch, BookSort};
use crate::lending;

/// Book catalog and lending operations over the shared store.
pub struct BookService {
    store: Arc<Store>,
    clock: SharedClock,
}

impl BookService {
    pub fn new(store: Arc<Store>, clock: SharedClock) -> Self {
        Self { store, clock }
    }

    pub async fn create(
        &self,
        ctx: &IdentityContext,
        request: CreateBook,
    ) -> LibraryResult<BookView> {
        if !request.is_complete() {
            return Err(LibraryError::InvalidRequest);
        }

        let audit = Audit::created(ctx, self.clock.now());
        let book = Book::new(
            request.author,
            request.title,
            request.release_year,
            request.genre,
            audit,
        );

        let stored = self.store.write(move |tables| Ok(tables.add(book))).await?;
        tracing::info!(book_id = %stored.id, created_by = %ctx.username(), "book created");
        Ok(stored.into())
    }

    pub async fn update(
        &self,
        ctx: &IdentityContext,
        id: BookId,
        patch: UpdateBook,
    ) -> LibraryResult<BookView> {
        let now = self.clock.now();
        let updated = self
            .store
            .write(move |tables| {
                let mut book = Repository::<Book>::get(tables, id)
                    .cloned()
                    .ok_or_else(|| LibraryError::not_found(EntityKind::Book, id))?;
                patch.apply_to(&mut book);
                book.audit.touch(ctx, now);
                tables.update(book.clone())?;
                Ok(book)
            })
            .await?;

        tracing::info!(book_id = %id, modified_by = %ctx.username(), "book updated");
        Ok(updated.into())
    }

    pub async fn get(&self, id: BookId) -> LibraryResult<BookDetail> {
        self.store
            .read(|tables| catalog::book_with_holder(tables, id))
            .await
            .map(BookDetail::from)
    }

    pub async fn list(&self) -> Vec<BookView> {
        let books = self.store.read(|tables| catalog::list_books(tables)).await;
        books.into_iter().map(BookView::from).collect()
    }

    pub async fn search(&self, search: BookSearch) -> Vec<BookView> {
        let books = self
            .store
            .read(|tables| catalog::search_books(tables, &search))
            .await;
        books.into_iter().map(BookView::from).collect()
    }

    pub async fn sort(&self, criterion: Option<BookSort>) -> Vec<BookView> {
        let books = self.store.read(|tables| catalog::list_books(tables)).await;
        catalog::sort_books(books, criterion)
            .into_iter()
            .map(BookView::from)
            .collect()
    }

    pub async fn delete(&self, id: BookId) -> LibraryResult<()> {
        self.store
            .write(|tables| lending::delete_book(tables, id))
            .await
            .map(|_| ())
    }

    pub async fn take(&self, book_id: BookId, reader_id: ReaderId) -> LibraryResult<BookView> {
        self.store
            .write(|tables| lending::take_book(tables, book_id, reader_id))
            .await
            .map(BookView::from)
    }

    pub async fn return_book(
        &self,
        book_id: BookId,
        reader_id: ReaderId,
    ) -> LibraryResult<BookView> {
        self.store
            .write(|tables| lending::return_book(tables, book_id, reader_id))
            .await
            .map(BookView::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use libris_db::Reader;
    use libris_kernel::FixedClock;
    use time::macros::datetime;
    use time::OffsetDateTime;

    fn clock_at(now: OffsetDateTime) -> SharedClock {
        Arc::new(FixedClock(now))
    }

    fn create_request(title: &str) -> CreateBook {
        CreateBook {
            author: "Ivan".into(),
            title: title.into(),
            release_year: 2001,
            genre: "novel".into(),
        }
    }

    async fn seed_reader(store: &Store) -> ReaderId {
        let audit = Audit::created(&IdentityContext::new("admin"), OffsetDateTime::UNIX_EPOCH);
        store
            .write(|tables| Ok(tables.add(Reader::new("Olga", "Petrova", "Main 1", "555", audit))))
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn create_stamps_creator_and_assigns_id() {
        let created_at = datetime!(2024-03-01 10:00 UTC);
        let service = BookService::new(Arc::new(Store::in_memory()), clock_at(created_at));
        let ctx = IdentityContext::new("alice");

        let view = service.create(&ctx, create_request("First")).await.unwrap();
        assert_eq!(view.id, BookId(1));
        assert_eq!(view.reader_id, None);

        let stored = service
            .store
            .read(|tables| Repository::<Book>::get(tables, BookId(1)).cloned())
            .await
            .unwrap();
        assert_eq!(stored.audit.created_by, "alice");
        assert_eq!(stored.audit.created_on, created_at);
        assert_eq!(stored.audit.last_modified_on, None);
    }

    #[tokio::test]
    async fn create_with_blank_title_is_rejected() {
        let service = BookService::new(
            Arc::new(Store::in_memory()),
            clock_at(OffsetDateTime::UNIX_EPOCH),
        );
        let result = service
            .create(&IdentityContext::new("alice"), create_request(""))
            .await;
        assert_eq!(result, Err(LibraryError::InvalidRequest));
        assert!(service.list().await.is_empty());
    }

    #[tokio::test]
    async fn update_patches_fields_and_stamps_modifier() {
        let store = Arc::new(Store::in_memory());
        let creator = BookService::new(store.clone(), clock_at(datetime!(2024-01-01 0:00 UTC)));
        creator
            .create(&IdentityContext::new("alice"), create_request("Draft"))
            .await
            .unwrap();

        let modified_at = datetime!(2024-02-02 12:30 UTC);
        let editor = BookService::new(store.clone(), clock_at(modified_at));
        let view = editor
            .update(
                &IdentityContext::new("bob"),
                BookId(1),
                UpdateBook {
                    title: Some("Final".into()),
                    ..UpdateBook::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(view.title, "Final");
        assert_eq!(view.author, "Ivan");

        let audit = store
            .read(|tables| Repository::<Book>::get(tables, BookId(1)).map(|b| b.audit.clone()))
            .await
            .unwrap();
        assert_eq!(audit.created_by, "alice");
        assert_eq!(audit.last_modified_by.as_deref(), Some("bob"));
        assert_eq!(audit.last_modified_on, Some(modified_at));
    }

    #[tokio::test]
    async fn update_of_missing_book_is_not_found() {
        let service = BookService::new(
            Arc::new(Store::in_memory()),
            clock_at(OffsetDateTime::UNIX_EPOCH),
        );
        let result = service
            .update(&IdentityContext::new("bob"), BookId(7), UpdateBook::default())
            .await;
        assert_eq!(result, Err(LibraryError::not_found(EntityKind::Book, 7u32)));
    }

    #[tokio::test]
    async fn lending_flow_through_the_service() {
        let store = Arc::new(Store::in_memory());
        let service = BookService::new(store.clone(), clock_at(OffsetDateTime::UNIX_EPOCH));
        let book = service
            .create(&IdentityContext::new("alice"), create_request("Loaned"))
            .await
            .unwrap();
        let reader = seed_reader(&store).await;

        let taken = service.take(book.id, reader).await.unwrap();
        assert_eq!(taken.reader_id, Some(reader));

        let detail = service.get(book.id).await.unwrap();
        assert_eq!(detail.reader_name.as_deref(), Some("Olga"));
        assert_eq!(detail.phone_number.as_deref(), Some("555"));

        assert_eq!(service.delete(book.id).await, Err(LibraryError::UndeletableCheckedOut));

        service.return_book(book.id, reader).await.unwrap();
        service.delete(book.id).await.unwrap();
        assert_eq!(
            service.get(book.id).await,
            Err(LibraryError::not_found(EntityKind::Book, book.id))
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_takes_have_exactly_one_winner() {
        let store = Arc::new(Store::in_memory());
        let service = Arc::new(BookService::new(
            store.clone(),
            clock_at(OffsetDateTime::UNIX_EPOCH),
        ));
        let book = service
            .create(&IdentityContext::new("alice"), create_request("Contested"))
            .await
            .unwrap();
        let book_id = book.id;
        let first = seed_reader(&store).await;
        let second = seed_reader(&store).await;

        let handles: Vec<_> = [first, second, first, second]
            .into_iter()
            .map(|reader| {
                let service = service.clone();
                tokio::spawn(async move { service.take(book_id, reader).await })
            })
            .collect();

        let mut winners = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => winners += 1,
                Err(err) => assert_eq!(err, LibraryError::AlreadyCheckedOut(book_id.0)),
            }
        }
        assert_eq!(winners, 1);
    }

    #[tokio::test]
    async fn sort_without_criterion_keeps_insertion_order() {
        let service = BookService::new(
            Arc::new(Store::in_memory()),
            clock_at(OffsetDateTime::UNIX_EPOCH),
        );
        let ctx = IdentityContext::new("alice");
        for title in ["b", "c", "a"] {
            service.create(&ctx, create_request(title)).await.unwrap();
        }

        let unsorted: Vec<_> = service.sort(None).await.into_iter().map(|b| b.title).collect();
        assert_eq!(unsorted, vec!["b", "c", "a"]);

        let sorted: Vec<_> = service
            .sort(Some(BookSort::TitleAsc))
            .await
            .into_iter()
            .map(|b| b.title)
            .collect();
        assert_eq!(sorted, vec!["a", "b", "c"]);
    }
}
