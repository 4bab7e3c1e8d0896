use serde::Deserialize;

use alexandria_catalog::BookDraft;

/// Request model for creating or updating a book.
///
/// Every field is optional on the wire; the service decides what a valid
/// draft looks like. Updates are full overwrites, so omitted fields clear.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookPayload {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub isbn: String,
    #[serde(default)]
    pub publication_year: String,
    #[serde(default)]
    pub author_ids: Vec<i64>,
}

impl BookPayload {
    /// Negative author ids are coerced by absolute value at the adapter
    /// edge; the service persists whatever ids it receives.
    pub fn into_draft(self) -> BookDraft {
        BookDraft {
            title: self.title,
            description: self.description,
            isbn: self.isbn,
            publication_year: self.publication_year,
            author_ids: self
                .author_ids
                .into_iter()
                .map(|id| id.unsigned_abs())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_author_ids_are_coerced() {
        let payload = BookPayload {
            title: "Emma".to_string(),
            author_ids: vec![1, -3, 0],
            ..Default::default()
        };
        let draft = payload.into_draft();
        assert_eq!(draft.author_ids, vec![1, 3, 0]);
    }
}
