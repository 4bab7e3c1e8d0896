use async_trait::async_trait;

use crate::model::{Author, AuthorDraft, AuthorId, BookDraft, BookId, BookRecord, NewBook};

/// Storage port the catalog service is written against.
///
/// Implementations own all persisted state and id assignment. Methods return
/// `anyhow::Result`; any failure surfaces as `CatalogError::Repository`
/// upstream. No transactional guarantees: two concurrent updates to the same
/// record race, last write wins.
#[async_trait]
pub trait Repository: Send + Sync {
    /// Persist a new book and assign its id.
    async fn insert_book(&self, book: NewBook) -> anyhow::Result<BookRecord>;

    async fn fetch_book(&self, id: BookId) -> anyhow::Result<Option<BookRecord>>;

    /// All books in creation order (oldest first).
    async fn list_books(&self) -> anyhow::Result<Vec<BookRecord>>;

    /// Overwrite the draft fields of an existing book, preserving the legacy
    /// facets (`body`, `legacy_author`). Returns `None` when the id is
    /// unknown.
    async fn update_book(&self, id: BookId, fields: BookDraft)
        -> anyhow::Result<Option<BookRecord>>;

    /// Permanently delete a book. Returns whether a record existed.
    async fn delete_book(&self, id: BookId) -> anyhow::Result<bool>;

    /// Persist a new author and assign its id.
    async fn insert_author(&self, author: AuthorDraft) -> anyhow::Result<Author>;

    async fn fetch_author(&self, id: AuthorId) -> anyhow::Result<Option<Author>>;

    /// All authors in creation order (oldest first).
    async fn list_authors(&self) -> anyhow::Result<Vec<Author>>;

    /// Resolve each id in input order, silently omitting ids that no longer
    /// exist. Duplicate ids yield duplicate entries; this must never fail on
    /// a missing id.
    async fn fetch_authors(&self, ids: &[AuthorId]) -> anyhow::Result<Vec<Author>>;
}
