//! In-memory reference implementation of the catalog repository port.
//!
//! Books and authors share a single monotonically increasing id space, as a
//! single backing table would assign them. Individual operations are
//! serialized behind one lock; there are no cross-call transactions, so two
//! concurrent updates to the same record race and the last write wins.

use std::collections::BTreeMap;
use std::sync::RwLock;

use anyhow::anyhow;
use async_trait::async_trait;

use alexandria_catalog::{
    Author, AuthorDraft, AuthorId, BookDraft, BookId, BookRecord, NewBook, Repository,
};

struct Inner {
    books: BTreeMap<BookId, BookRecord>,
    authors: BTreeMap<AuthorId, Author>,
    next_id: u64,
}

pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                books: BTreeMap::new(),
                authors: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }

    fn read(&self) -> anyhow::Result<std::sync::RwLockReadGuard<'_, Inner>> {
        self.inner.read().map_err(|_| anyhow!("store lock poisoned"))
    }

    fn write(&self) -> anyhow::Result<std::sync::RwLockWriteGuard<'_, Inner>> {
        self.inner
            .write()
            .map_err(|_| anyhow!("store lock poisoned"))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Repository for MemoryStore {
    async fn insert_book(&self, book: NewBook) -> anyhow::Result<BookRecord> {
        let mut inner = self.write()?;
        let id = inner.next_id;
        inner.next_id += 1;

        let record = BookRecord {
            id,
            title: book.title,
            description: book.description,
            body: book.body,
            legacy_author: book.legacy_author,
            isbn: book.isbn,
            publication_year: book.publication_year,
            author_ids: book.author_ids,
        };
        inner.books.insert(id, record.clone());
        tracing::debug!(book_id = id, "book stored");
        Ok(record)
    }

    async fn fetch_book(&self, id: BookId) -> anyhow::Result<Option<BookRecord>> {
        Ok(self.read()?.books.get(&id).cloned())
    }

    async fn list_books(&self) -> anyhow::Result<Vec<BookRecord>> {
        // Ids are assigned monotonically, so ascending keys is creation order.
        Ok(self.read()?.books.values().cloned().collect())
    }

    async fn update_book(
        &self,
        id: BookId,
        fields: BookDraft,
    ) -> anyhow::Result<Option<BookRecord>> {
        let mut inner = self.write()?;
        let Some(record) = inner.books.get_mut(&id) else {
            return Ok(None);
        };

        record.title = fields.title;
        record.description = fields.description;
        record.isbn = fields.isbn;
        record.publication_year = fields.publication_year;
        record.author_ids = fields.author_ids;
        // body and legacy_author are deliberately untouched.

        Ok(Some(record.clone()))
    }

    async fn delete_book(&self, id: BookId) -> anyhow::Result<bool> {
        let removed = self.write()?.books.remove(&id).is_some();
        if removed {
            tracing::debug!(book_id = id, "book removed");
        }
        Ok(removed)
    }

    async fn insert_author(&self, author: AuthorDraft) -> anyhow::Result<Author> {
        let mut inner = self.write()?;
        let id = inner.next_id;
        inner.next_id += 1;

        let author = Author {
            id,
            name: author.name,
        };
        inner.authors.insert(id, author.clone());
        tracing::debug!(author_id = id, "author stored");
        Ok(author)
    }

    async fn fetch_author(&self, id: AuthorId) -> anyhow::Result<Option<Author>> {
        Ok(self.read()?.authors.get(&id).cloned())
    }

    async fn list_authors(&self) -> anyhow::Result<Vec<Author>> {
        Ok(self.read()?.authors.values().cloned().collect())
    }

    async fn fetch_authors(&self, ids: &[AuthorId]) -> anyhow::Result<Vec<Author>> {
        let inner = self.read()?;
        Ok(ids
            .iter()
            .filter_map(|id| inner.authors.get(id).cloned())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(title: &str) -> NewBook {
        NewBook {
            title: title.to_string(),
            ..Default::default()
        }
    }

    fn author(name: &str) -> AuthorDraft {
        AuthorDraft {
            name: name.to_string(),
        }
    }

    #[tokio::test]
    async fn ids_come_from_a_single_sequence() {
        let store = MemoryStore::new();

        let first = store.insert_book(book("Emma")).await.unwrap();
        let second = store.insert_author(author("Jane Austen")).await.unwrap();
        let third = store.insert_book(book("Persuasion")).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(third.id, 3);
    }

    #[tokio::test]
    async fn list_books_is_creation_order() {
        let store = MemoryStore::new();
        for title in ["A", "B", "C"] {
            store.insert_book(book(title)).await.unwrap();
        }

        let titles: Vec<String> = store
            .list_books()
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.title)
            .collect();
        assert_eq!(titles, vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn update_overwrites_draft_fields_only() {
        let store = MemoryStore::new();
        let record = store
            .insert_book(NewBook {
                title: "Emma".to_string(),
                body: "legacy body".to_string(),
                legacy_author: "J. Austen".to_string(),
                isbn: "123".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        let updated = store
            .update_book(
                record.id,
                BookDraft {
                    title: "Emma (2nd ed.)".to_string(),
                    description: "now rich".to_string(),
                    author_ids: vec![42],
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.title, "Emma (2nd ed.)");
        assert_eq!(updated.description, "now rich");
        assert_eq!(updated.isbn, "");
        assert_eq!(updated.author_ids, vec![42]);
        // Legacy facets survive full-state updates.
        assert_eq!(updated.body, "legacy body");
        assert_eq!(updated.legacy_author, "J. Austen");
    }

    #[tokio::test]
    async fn update_unknown_id_returns_none() {
        let store = MemoryStore::new();
        let result = store
            .update_book(7, BookDraft::default())
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn delete_reports_whether_a_record_existed() {
        let store = MemoryStore::new();
        let record = store.insert_book(book("Emma")).await.unwrap();

        assert!(store.delete_book(record.id).await.unwrap());
        assert!(!store.delete_book(record.id).await.unwrap());
        assert!(store.fetch_book(record.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn batch_author_lookup_omits_misses_and_keeps_order() {
        let store = MemoryStore::new();
        let jane = store.insert_author(author("Jane Austen")).await.unwrap();
        let mary = store.insert_author(author("Mary Shelley")).await.unwrap();

        let resolved = store
            .fetch_authors(&[mary.id, 99, jane.id, jane.id])
            .await
            .unwrap();

        let names: Vec<&str> = resolved.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Mary Shelley", "Jane Austen", "Jane Austen"]);
    }

    #[tokio::test]
    async fn last_write_wins_on_repeated_updates() {
        let store = MemoryStore::new();
        let record = store.insert_book(book("Emma")).await.unwrap();

        for isbn in ["111", "222"] {
            store
                .update_book(
                    record.id,
                    BookDraft {
                        title: "Emma".to_string(),
                        isbn: isbn.to_string(),
                        ..Default::default()
                    },
                )
                .await
                .unwrap();
        }

        let fetched = store.fetch_book(record.id).await.unwrap().unwrap();
        assert_eq!(fetched.isbn, "222");
    }
}
