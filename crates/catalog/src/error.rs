use thiserror::Error;

/// Typed results produced by the catalog service.
///
/// Expected conditions are variants, never panics; only `Repository` carries
/// an unexpected storage failure upward.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Bad or missing input; user-correctable.
    #[error("{0}")]
    Validation(String),

    /// The referenced id does not exist or is of the wrong kind.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// The caller lacks the capability for this operation.
    #[error("Not allowed")]
    Forbidden,

    /// Underlying storage failed; not user-correctable.
    #[error("storage failure: {0}")]
    Repository(#[from] anyhow::Error),
}

impl CatalogError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_the_kind() {
        assert_eq!(CatalogError::NotFound("Book").to_string(), "Book not found");
        assert_eq!(
            CatalogError::NotFound("Author").to_string(),
            "Author not found"
        );
    }

    #[test]
    fn validation_message_passes_through() {
        let err = CatalogError::validation("Title is required");
        assert_eq!(err.to_string(), "Title is required");
    }
}
