//! Form-encoded action-dispatch transport retained for older clients.
//!
//! One endpoint, one `action` field, `{success, data}` envelopes. Everything
//! funnels into the same catalog service as the REST transport; only the
//! wire shapes differ.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Form, Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use alexandria_authz::TokenAuthenticator;
use alexandria_catalog::{AuthorDraft, AuthorId, BookDraft, CatalogError, CatalogService};
use alexandria_http::AppError;
use alexandria_kernel::{InitCtx, Module};

use crate::modules::{bearer_token, ModuleDeps};

pub struct ActionsModule {
    state: ActionsState,
}

#[derive(Clone)]
pub struct ActionsState {
    catalog: Arc<CatalogService>,
    auth: Arc<TokenAuthenticator>,
    nonce: String,
}

impl ActionsModule {
    pub fn new(deps: &ModuleDeps) -> Self {
        Self {
            state: ActionsState {
                catalog: deps.catalog.clone(),
                auth: deps.auth.clone(),
                nonce: deps.legacy_nonce.clone(),
            },
        }
    }
}

/// One request shape for every action; fields irrelevant to an action are
/// simply ignored by it.
#[derive(Debug, Default, Deserialize)]
pub struct ActionForm {
    #[serde(default)]
    pub action: String,
    pub nonce: Option<String>,
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub isbn: Option<String>,
    pub publication_year: Option<String>,
    /// Comma-separated author ids.
    pub author_ids: Option<String>,
    pub author_name: Option<String>,
}

impl ActionForm {
    fn book_draft(&self) -> BookDraft {
        BookDraft {
            title: self.title.clone().unwrap_or_default(),
            description: self.description.clone().unwrap_or_default(),
            isbn: self.isbn.clone().unwrap_or_default(),
            publication_year: self.publication_year.clone().unwrap_or_default(),
            author_ids: parse_author_ids(self.author_ids.as_deref().unwrap_or("")),
        }
    }

    /// Record id coerced the way legacy clients expect: non-numeric input
    /// becomes 0, which no record ever has.
    fn record_id(&self) -> u64 {
        self.id
            .as_deref()
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .map(|id| id.unsigned_abs())
            .unwrap_or(0)
    }
}

/// Parse a comma-separated id list: entries that fail to parse are dropped,
/// negative entries are coerced by absolute value.
fn parse_author_ids(raw: &str) -> Vec<AuthorId> {
    raw.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .filter_map(|token| token.parse::<i64>().ok())
        .map(|id| id.unsigned_abs())
        .collect()
}

#[async_trait]
impl Module for ActionsModule {
    fn name(&self) -> &'static str {
        "actions"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        if self.state.nonce.is_empty() {
            tracing::warn!(
                module = self.name(),
                "no legacy nonce configured; every action request will be rejected"
            );
        }
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "actions module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/", post(dispatch))
            .with_state(self.state.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(json!({
            "paths": {
                "/": {
                    "post": {
                        "summary": "Form-encoded action dispatch for older clients",
                        "tags": ["Actions"],
                        "requestBody": {
                            "content": {
                                "application/x-www-form-urlencoded": {
                                    "schema": {
                                        "type": "object",
                                        "properties": {
                                            "action": {
                                                "type": "string",
                                                "enum": [
                                                    "get_books",
                                                    "create_book",
                                                    "update_book",
                                                    "delete_book",
                                                    "get_authors",
                                                    "create_author"
                                                ]
                                            },
                                            "nonce": { "type": "string" }
                                        },
                                        "required": ["action", "nonce"]
                                    }
                                }
                            }
                        },
                        "responses": {
                            "200": { "description": "Envelope with success flag and data" },
                            "401": { "description": "Missing or invalid security token" },
                            "403": { "description": "Caller lacks the required capability" }
                        }
                    }
                }
            }
        }))
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "actions module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "actions module stopped");
        Ok(())
    }
}

async fn dispatch(
    State(state): State<ActionsState>,
    headers: HeaderMap,
    Form(form): Form<ActionForm>,
) -> Result<Response, AppError> {
    // Token check happens before any dispatch; an unset nonce rejects all.
    if state.nonce.is_empty() || form.nonce.as_deref() != Some(state.nonce.as_str()) {
        return Err(AppError::unauthorized("Invalid security token"));
    }

    let actor = state.auth.authenticate(bearer_token(&headers));
    tracing::debug!(action = %form.action, "dispatching action");

    let result = match form.action.as_str() {
        "get_books" => state.catalog.list_books().await.map(|books| json!(books)),
        "create_book" => state
            .catalog
            .create_book(&actor, form.book_draft())
            .await
            .map(|book| json!({ "message": "Book created successfully", "book": book })),
        "update_book" => match form.record_id() {
            0 => Err(CatalogError::validation("Invalid book ID")),
            id => state
                .catalog
                .update_book(&actor, id, form.book_draft())
                .await
                .map(|book| json!({ "message": "Book updated successfully", "book": book })),
        },
        "delete_book" => match form.record_id() {
            0 => Err(CatalogError::validation("Invalid book ID")),
            id => state
                .catalog
                .delete_book(&actor, id)
                .await
                .map(|id| json!({ "message": "Book deleted successfully", "id": id })),
        },
        "get_authors" => state
            .catalog
            .list_authors()
            .await
            .map(|authors| json!(authors)),
        "create_author" => state
            .catalog
            .create_author(
                &actor,
                AuthorDraft {
                    name: form.author_name.clone().unwrap_or_default(),
                },
            )
            .await
            .map(|author| json!({ "message": "Author created successfully", "author": author })),
        _ => return Err(AppError::bad_request("Unknown action")),
    };

    Ok(match result {
        Ok(data) => envelope(data),
        Err(error) => envelope_error(error),
    })
}

fn envelope(data: serde_json::Value) -> Response {
    Json(json!({ "success": true, "data": data })).into_response()
}

/// Old clients read the success flag, not the status line, so only
/// authorization and storage failures surface as non-200.
fn envelope_error(error: CatalogError) -> Response {
    let (status, message) = match &error {
        CatalogError::Forbidden => (StatusCode::FORBIDDEN, error.to_string()),
        CatalogError::Repository(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string())
        }
        _ => (StatusCode::OK, error.to_string()),
    };

    (
        status,
        Json(json!({ "success": false, "data": { "message": message } })),
    )
        .into_response()
}

/// Create a new instance of the actions module
pub fn create_module(deps: &ModuleDeps) -> Arc<dyn Module> {
    Arc::new(ActionsModule::new(deps))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::tests_support::{body_json, deps_with_tokens, form_request};
    use tower::ServiceExt;

    fn router() -> Router {
        ActionsModule::new(&deps_with_tokens()).routes()
    }

    #[test]
    fn author_id_parsing_drops_garbage_and_coerces_negatives() {
        assert_eq!(parse_author_ids("1, 2,zz, -3,"), vec![1, 2, 3]);
        assert_eq!(parse_author_ids(""), Vec::<AuthorId>::new());
    }

    #[tokio::test]
    async fn requests_without_a_valid_nonce_are_rejected() {
        let response = router()
            .oneshot(form_request("/", None, "action=get_books"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = router()
            .oneshot(form_request("/", None, "action=get_books&nonce=wrong"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unknown_actions_are_bad_requests() {
        let response = router()
            .oneshot(form_request("/", None, "action=drop_tables&nonce=test-nonce"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn get_books_returns_an_envelope() {
        let response = router()
            .oneshot(form_request("/", None, "action=get_books&nonce=test-nonce"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn create_and_update_through_the_form_transport() {
        let router = router();

        let response = router
            .clone()
            .oneshot(form_request(
                "/",
                Some("editor-token"),
                "action=create_author&nonce=test-nonce&author_name=Jane+Austen",
            ))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        let author_id = body["data"]["author"]["id"].as_u64().unwrap();

        let response = router
            .clone()
            .oneshot(form_request(
                "/",
                Some("editor-token"),
                &format!(
                    "action=create_book&nonce=test-nonce&title=Emma&isbn=123\
                     &author_ids={author_id},zz,-99"
                ),
            ))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["message"], "Book created successfully");

        let book = &body["data"]["book"];
        let book_id = book["id"].as_u64().unwrap();
        // Garbage entries dropped, negatives coerced; 99 stays stored but
        // resolves to nothing.
        assert_eq!(book["author_ids"], serde_json::json!([author_id, 99]));
        assert_eq!(book["authors"][0]["name"], "Jane Austen");
        assert_eq!(book["authors"].as_array().unwrap().len(), 1);

        let response = router
            .oneshot(form_request(
                "/",
                Some("editor-token"),
                &format!("action=update_book&nonce=test-nonce&id={book_id}&title=Emma+Revised"),
            ))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["book"]["title"], "Emma Revised");
        // Full overwrite: the isbn was omitted, so it cleared.
        assert_eq!(body["data"]["book"]["isbn"], "");
    }

    #[tokio::test]
    async fn capability_failures_keep_the_envelope_shape() {
        let response = router()
            .oneshot(form_request(
                "/",
                None,
                "action=create_book&nonce=test-nonce&title=Emma",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["data"]["message"], "Not allowed");
    }

    #[tokio::test]
    async fn validation_and_missing_records_report_via_the_success_flag() {
        let router = router();

        let response = router
            .clone()
            .oneshot(form_request(
                "/",
                Some("editor-token"),
                "action=update_book&nonce=test-nonce&id=abc&title=Emma",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["data"]["message"], "Invalid book ID");

        let response = router
            .clone()
            .oneshot(form_request(
                "/",
                Some("editor-token"),
                "action=delete_book&nonce=test-nonce&id=41",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["data"]["message"], "Book not found");

        let response = router
            .oneshot(form_request(
                "/",
                Some("editor-token"),
                "action=create_book&nonce=test-nonce&title=++",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["data"]["message"], "Title is required");
    }
}
