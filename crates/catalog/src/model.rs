use serde::{Deserialize, Serialize};

pub type BookId = u64;
pub type AuthorId = u64;

/// A named entity referenced by zero or more books.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: AuthorId,
    pub name: String,
}

/// A book as persisted by the repository.
///
/// `description` is the current rich field; `body` is the original content
/// body kept as a read-time fallback. `legacy_author` is a deprecated
/// single-name field that is never written by any operation but still
/// surfaced on detail views when legacy data carries it.
#[derive(Debug, Clone, Default)]
pub struct BookRecord {
    pub id: BookId,
    pub title: String,
    pub description: String,
    pub body: String,
    pub legacy_author: String,
    pub isbn: String,
    pub publication_year: String,
    pub author_ids: Vec<AuthorId>,
}

/// Full field set for a book about to be persisted.
///
/// Distinct from [`BookDraft`]: callers of the service can only supply draft
/// fields, while repository seeding (e.g. imports of legacy data) may carry
/// the fallback facets too.
#[derive(Debug, Clone, Default)]
pub struct NewBook {
    pub title: String,
    pub description: String,
    pub body: String,
    pub legacy_author: String,
    pub isbn: String,
    pub publication_year: String,
    pub author_ids: Vec<AuthorId>,
}

impl NewBook {
    /// Lift a validated draft into a full record payload.
    /// The legacy facets start empty; nothing in the service writes them.
    pub fn from_draft(draft: BookDraft) -> Self {
        Self {
            title: draft.title,
            description: draft.description,
            body: String::new(),
            legacy_author: String::new(),
            isbn: draft.isbn,
            publication_year: draft.publication_year,
            author_ids: draft.author_ids,
        }
    }
}

/// Complete desired state for a book create or update.
///
/// Updates are full overwrites: omitted optional fields are cleared to
/// empty, not merged.
#[derive(Debug, Clone, Default)]
pub struct BookDraft {
    pub title: String,
    pub description: String,
    pub isbn: String,
    pub publication_year: String,
    pub author_ids: Vec<AuthorId>,
}

/// Input for author creation.
#[derive(Debug, Clone, Default)]
pub struct AuthorDraft {
    pub name: String,
}

/// Book projection for list views. Never carries a description.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookSummary {
    pub id: BookId,
    pub title: String,
    pub authors: Vec<Author>,
    pub author_ids: Vec<AuthorId>,
    pub isbn: String,
    pub publication_year: String,
}

impl BookSummary {
    pub fn project(record: BookRecord, authors: Vec<Author>) -> Self {
        Self {
            id: record.id,
            title: record.title,
            authors,
            author_ids: record.author_ids,
            isbn: record.isbn,
            publication_year: record.publication_year,
        }
    }
}

/// Book projection for single-record views, description included.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookDetail {
    pub id: BookId,
    pub title: String,
    pub authors: Vec<Author>,
    pub author_ids: Vec<AuthorId>,
    pub isbn: String,
    pub publication_year: String,
    pub description: String,
    #[serde(rename = "author", skip_serializing_if = "String::is_empty")]
    pub legacy_author: String,
}

impl BookDetail {
    pub fn project(record: BookRecord, authors: Vec<Author>) -> Self {
        let description = effective_description(&record).to_string();
        Self {
            id: record.id,
            title: record.title,
            authors,
            author_ids: record.author_ids,
            isbn: record.isbn,
            publication_year: record.publication_year,
            description,
            legacy_author: record.legacy_author,
        }
    }
}

/// Ordered description fallback, evaluated at read time on every call:
/// the rich field wins when non-empty, then the legacy content body,
/// then the empty string.
pub fn effective_description(record: &BookRecord) -> &str {
    if !record.description.is_empty() {
        &record.description
    } else {
        &record.body
    }
}
