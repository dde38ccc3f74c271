use std::sync::RwLock;

use thiserror::Error;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use uuid::Uuid;

use super::models::{Book, BookPayload, BookSummary};

/// Errors surfaced by store operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("book name is required")]
    NameRequired,
    #[error("readPage must not be greater than pageCount")]
    PageBounds,
    #[error("no book with the given id")]
    NotFound,
}

/// Source of record identifiers, injected so tests can substitute a
/// deterministic one.
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Production identifier source: UUIDv4 in simple form, 32 hex characters
/// of cryptographic randomness.
pub struct TokenIdGenerator;

impl IdGenerator for TokenIdGenerator {
    fn generate(&self) -> String {
        Uuid::new_v4().simple().to_string()
    }
}

/// Optional listing constraints, combined with logical AND.
#[derive(Debug, Clone, Default)]
pub struct BookFilter {
    /// Case-insensitive substring match against the full name
    pub name: Option<String>,
    pub reading: Option<bool>,
    pub finished: Option<bool>,
}

impl BookFilter {
    fn matches(&self, book: &Book) -> bool {
        if let Some(needle) = &self.name {
            if !book.name.to_lowercase().contains(&needle.to_lowercase()) {
                return false;
            }
        }
        if let Some(reading) = self.reading {
            if book.reading != reading {
                return false;
            }
        }
        if let Some(finished) = self.finished {
            if book.finished != finished {
                return false;
            }
        }
        true
    }
}

/// Process-wide book collection.
///
/// One store is constructed per process and shared behind an `Arc`. The lock
/// linearizes operations so each mutation applies as a whole; insertion order
/// is preserved across updates and deletes.
pub struct BookStore {
    books: RwLock<Vec<Book>>,
    ids: Box<dyn IdGenerator>,
}

impl BookStore {
    pub fn new() -> Self {
        Self::with_id_generator(Box::new(TokenIdGenerator))
    }

    pub fn with_id_generator(ids: Box<dyn IdGenerator>) -> Self {
        Self {
            books: RwLock::new(Vec::new()),
            ids,
        }
    }

    /// Validate the payload and append a new record, returning its fresh id.
    ///
    /// Rejects a missing *or empty* name, then `read_page > page_count`.
    pub fn create(&self, payload: BookPayload) -> Result<String, StoreError> {
        let name = match payload.name {
            Some(name) if !name.is_empty() => name,
            _ => return Err(StoreError::NameRequired),
        };
        if payload.read_page > payload.page_count {
            return Err(StoreError::PageBounds);
        }

        let id = self.ids.generate();
        let now = now_rfc3339();
        let book = Book {
            id: id.clone(),
            name,
            year: payload.year,
            author: payload.author,
            summary: payload.summary,
            publisher: payload.publisher,
            page_count: payload.page_count,
            read_page: payload.read_page,
            finished: payload.page_count == payload.read_page,
            reading: payload.reading,
            inserted_at: now.clone(),
            updated_at: now,
        };

        self.books.write().expect("book store lock poisoned").push(book);
        Ok(id)
    }

    /// Project matching records to `{id, name, publisher}` in insertion order.
    pub fn list(&self, filter: &BookFilter) -> Vec<BookSummary> {
        self.books
            .read()
            .expect("book store lock poisoned")
            .iter()
            .filter(|book| filter.matches(book))
            .map(BookSummary::from)
            .collect()
    }

    /// Exact-match lookup returning the full record.
    pub fn get(&self, id: &str) -> Option<Book> {
        self.books
            .read()
            .expect("book store lock poisoned")
            .iter()
            .find(|book| book.id == id)
            .cloned()
    }

    /// Replace every field except `id` and `inserted_at`.
    ///
    /// Unlike create, only a strictly *absent* name is rejected; an empty
    /// string passes. Validation runs before the existence check.
    pub fn update(&self, id: &str, payload: BookPayload) -> Result<(), StoreError> {
        let name = payload.name.ok_or(StoreError::NameRequired)?;
        if payload.read_page > payload.page_count {
            return Err(StoreError::PageBounds);
        }

        let mut books = self.books.write().expect("book store lock poisoned");
        let book = books
            .iter_mut()
            .find(|book| book.id == id)
            .ok_or(StoreError::NotFound)?;

        book.name = name;
        book.year = payload.year;
        book.author = payload.author;
        book.summary = payload.summary;
        book.publisher = payload.publisher;
        book.page_count = payload.page_count;
        book.read_page = payload.read_page;
        book.finished = payload.page_count == payload.read_page;
        book.reading = payload.reading;
        book.updated_at = now_rfc3339();

        Ok(())
    }

    /// Remove the record with the given id, keeping the relative order of the
    /// remaining records.
    pub fn delete(&self, id: &str) -> Result<(), StoreError> {
        let mut books = self.books.write().expect("book store lock poisoned");
        let index = books
            .iter()
            .position(|book| book.id == id)
            .ok_or(StoreError::NotFound)?;
        books.remove(index);
        Ok(())
    }
}

impl Default for BookStore {
    fn default() -> Self {
        Self::new()
    }
}

fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .expect("UTC timestamps always format as RFC 3339")
}
