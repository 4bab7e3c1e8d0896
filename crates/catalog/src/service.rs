use std::sync::Arc;

use alexandria_authz::{AccessPolicy, Actor};

use crate::error::CatalogError;
use crate::model::{
    Author, AuthorDraft, AuthorId, BookDetail, BookDraft, BookId, BookSummary, NewBook,
};
use crate::repository::Repository;

/// Stateless validation and data-shaping layer between transports and
/// storage.
///
/// Mutations consult the access policy before touching the repository; read
/// operations are always permitted. The service holds no state of its own.
pub struct CatalogService {
    repo: Arc<dyn Repository>,
    policy: Arc<dyn AccessPolicy>,
}

impl CatalogService {
    pub fn new(repo: Arc<dyn Repository>, policy: Arc<dyn AccessPolicy>) -> Self {
        Self { repo, policy }
    }

    /// All books, newest-created first, authors resolved, description
    /// omitted.
    pub async fn list_books(&self) -> Result<Vec<BookSummary>, CatalogError> {
        let mut records = self.repo.list_books().await?;
        // Repository contract is creation order; list views want newest first.
        records.reverse();

        let mut books = Vec::with_capacity(records.len());
        for record in records {
            let authors = self.repo.fetch_authors(&record.author_ids).await?;
            books.push(BookSummary::project(record, authors));
        }
        Ok(books)
    }

    /// A single book with its description resolved through the read-time
    /// fallback chain.
    pub async fn get_book(&self, id: BookId) -> Result<BookDetail, CatalogError> {
        let record = self
            .repo
            .fetch_book(id)
            .await?
            .ok_or(CatalogError::NotFound("Book"))?;
        let authors = self.repo.fetch_authors(&record.author_ids).await?;
        Ok(BookDetail::project(record, authors))
    }

    pub async fn create_book(
        &self,
        actor: &Actor,
        draft: BookDraft,
    ) -> Result<BookDetail, CatalogError> {
        self.authorize(actor, self.policy.can_create(actor))?;
        let draft = normalize_book_draft(draft)?;

        // Author ids are persisted exactly as given; order and duplicates
        // survive, dangling ids are resolved away at read time.
        let record = self.repo.insert_book(NewBook::from_draft(draft)).await?;
        tracing::info!(book_id = record.id, title = %record.title, "book created");

        let authors = self.repo.fetch_authors(&record.author_ids).await?;
        Ok(BookDetail::project(record, authors))
    }

    /// Full-state overwrite: every call supplies the complete desired state,
    /// omitted optional fields are cleared to empty.
    pub async fn update_book(
        &self,
        actor: &Actor,
        id: BookId,
        draft: BookDraft,
    ) -> Result<BookDetail, CatalogError> {
        self.authorize(actor, self.policy.can_edit(actor))?;
        let draft = normalize_book_draft(draft)?;

        let record = self
            .repo
            .update_book(id, draft)
            .await?
            .ok_or(CatalogError::NotFound("Book"))?;
        tracing::info!(book_id = record.id, "book updated");

        let authors = self.repo.fetch_authors(&record.author_ids).await?;
        Ok(BookDetail::project(record, authors))
    }

    /// Permanent deletion; there is no trash to restore from.
    pub async fn delete_book(&self, actor: &Actor, id: BookId) -> Result<BookId, CatalogError> {
        self.authorize(actor, self.policy.can_delete(actor))?;

        if !self.repo.delete_book(id).await? {
            return Err(CatalogError::NotFound("Book"));
        }
        tracing::info!(book_id = id, "book deleted");
        Ok(id)
    }

    /// All authors, name ascending (simple lexicographic, stable for ties).
    pub async fn list_authors(&self) -> Result<Vec<Author>, CatalogError> {
        let mut authors = self.repo.list_authors().await?;
        authors.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(authors)
    }

    pub async fn get_author(&self, id: AuthorId) -> Result<Author, CatalogError> {
        self.repo
            .fetch_author(id)
            .await?
            .ok_or(CatalogError::NotFound("Author"))
    }

    /// Duplicate names are allowed; identity is by id only.
    pub async fn create_author(
        &self,
        actor: &Actor,
        draft: AuthorDraft,
    ) -> Result<Author, CatalogError> {
        self.authorize(actor, self.policy.can_create(actor))?;

        let name = draft.name.trim().to_string();
        if name.is_empty() {
            return Err(CatalogError::validation("Author name is required"));
        }

        let author = self.repo.insert_author(AuthorDraft { name }).await?;
        tracing::info!(author_id = author.id, name = %author.name, "author created");
        Ok(author)
    }

    fn authorize(&self, actor: &Actor, capability: bool) -> Result<(), CatalogError> {
        if self.policy.is_authenticated(actor) && capability {
            Ok(())
        } else {
            Err(CatalogError::Forbidden)
        }
    }
}

/// Trim text fields and reject drafts without a title. Author ids pass
/// through untouched.
fn normalize_book_draft(draft: BookDraft) -> Result<BookDraft, CatalogError> {
    let title = draft.title.trim().to_string();
    if title.is_empty() {
        return Err(CatalogError::validation("Title is required"));
    }

    Ok(BookDraft {
        title,
        description: draft.description.trim().to_string(),
        isbn: draft.isbn.trim().to_string(),
        publication_year: draft.publication_year.trim().to_string(),
        author_ids: draft.author_ids,
    })
}
