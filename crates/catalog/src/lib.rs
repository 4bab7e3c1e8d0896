//! Catalog domain: books, authors, and the service that shapes them.
//!
//! The service is a stateless validation and data-shaping layer between
//! transports and storage. All persistent state lives behind the
//! [`Repository`] port; capability decisions live behind
//! [`alexandria_authz::AccessPolicy`].

pub mod error;
pub mod model;
pub mod repository;
pub mod service;

pub use error::CatalogError;
pub use model::{
    effective_description, Author, AuthorDraft, AuthorId, BookDetail, BookDraft, BookId,
    BookRecord, BookSummary, NewBook,
};
pub use repository::Repository;
pub use service::CatalogService;
