use serde::{Deserialize, Serialize};

/// A stored book record. Wire names stay camelCase to match the public API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Opaque unique identifier, assigned at creation and immutable
    pub id: String,
    pub name: String,
    pub year: i32,
    pub author: String,
    pub summary: String,
    pub publisher: String,
    /// Total pages
    pub page_count: u32,
    /// Pages read so far; never greater than `page_count`
    pub read_page: u32,
    /// Derived: `read_page == page_count`, recomputed on every create/update
    pub finished: bool,
    pub reading: bool,
    /// RFC 3339 creation timestamp, immutable
    pub inserted_at: String,
    /// RFC 3339 timestamp refreshed on every mutation
    pub updated_at: String,
}

/// Request body shared by create and update.
///
/// `name` stays an `Option` so the store can tell an absent field from an
/// empty one; create rejects both, update rejects only absence.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookPayload {
    pub name: Option<String>,
    #[serde(default)]
    pub year: i32,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub publisher: String,
    #[serde(default)]
    pub page_count: u32,
    #[serde(default)]
    pub read_page: u32,
    #[serde(default)]
    pub reading: bool,
}

/// The reduced listing view of a record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookSummary {
    pub id: String,
    pub name: String,
    pub publisher: String,
}

impl From<&Book> for BookSummary {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id.clone(),
            name: book.name.clone(),
            publisher: book.publisher.clone(),
        }
    }
}
