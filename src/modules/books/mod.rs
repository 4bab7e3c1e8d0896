pub mod models;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;

use alexandria_authz::TokenAuthenticator;
use alexandria_catalog::{BookDetail, BookId, BookSummary, CatalogService};
use alexandria_http::AppError;
use alexandria_kernel::{InitCtx, Module};

use crate::modules::{bearer_token, ModuleDeps};
use self::models::BookPayload;

/// REST transport for the book catalog.
pub struct BooksModule {
    state: BooksState,
}

#[derive(Clone)]
pub struct BooksState {
    catalog: Arc<CatalogService>,
    auth: Arc<TokenAuthenticator>,
}

impl BooksModule {
    pub fn new(deps: &ModuleDeps) -> Self {
        Self {
            state: BooksState {
                catalog: deps.catalog.clone(),
                auth: deps.auth.clone(),
            },
        }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/", get(list_books).post(create_book))
            .route(
                "/{id}",
                get(get_book).put(update_book).delete(delete_book),
            )
            .with_state(self.state.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List books, newest first, without descriptions",
                        "tags": ["Books"],
                        "responses": {
                            "200": {
                                "description": "List of book summaries",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "array",
                                            "items": { "$ref": "#/components/schemas/Book" }
                                        }
                                    }
                                }
                            }
                        }
                    },
                    "post": {
                        "summary": "Create a book",
                        "tags": ["Books"],
                        "requestBody": {
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/BookInput" }
                                }
                            }
                        },
                        "responses": {
                            "201": { "description": "Book created" },
                            "400": {
                                "description": "Validation failure",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                                    }
                                }
                            },
                            "403": { "description": "Caller lacks create permission" }
                        }
                    }
                },
                "/{id}": {
                    "get": {
                        "summary": "Fetch a single book with its description",
                        "tags": ["Books"],
                        "responses": {
                            "200": { "description": "Book detail" },
                            "404": { "description": "Book not found" }
                        }
                    },
                    "put": {
                        "summary": "Replace a book's full state",
                        "tags": ["Books"],
                        "requestBody": {
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/BookInput" }
                                }
                            }
                        },
                        "responses": {
                            "200": { "description": "Book updated" },
                            "400": { "description": "Validation failure" },
                            "403": { "description": "Caller lacks edit permission" },
                            "404": { "description": "Book not found" }
                        }
                    },
                    "delete": {
                        "summary": "Permanently delete a book",
                        "tags": ["Books"],
                        "responses": {
                            "200": { "description": "Book deleted" },
                            "403": { "description": "Caller lacks delete permission" },
                            "404": { "description": "Book not found" }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer", "description": "Unique identifier for the book" },
                            "title": { "type": "string", "description": "Title of the book" },
                            "authors": {
                                "type": "array",
                                "description": "Resolved authors in selection order",
                                "items": { "$ref": "#/components/schemas/Author" }
                            },
                            "author_ids": {
                                "type": "array",
                                "items": { "type": "integer" }
                            },
                            "isbn": { "type": "string" },
                            "publication_year": { "type": "string" }
                        },
                        "required": ["id", "title", "authors", "author_ids"]
                    },
                    "BookInput": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string", "description": "Title of the book (required)" },
                            "description": { "type": "string" },
                            "isbn": { "type": "string" },
                            "publication_year": { "type": "string" },
                            "author_ids": {
                                "type": "array",
                                "items": { "type": "integer" }
                            }
                        },
                        "required": ["title"]
                    }
                }
            }
        }))
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// List books endpoint; summaries never carry a description
async fn list_books(
    State(state): State<BooksState>,
) -> Result<Json<Vec<BookSummary>>, AppError> {
    Ok(Json(state.catalog.list_books().await?))
}

/// Single book endpoint, description resolved through the fallback chain
async fn get_book(
    State(state): State<BooksState>,
    Path(id): Path<BookId>,
) -> Result<Json<BookDetail>, AppError> {
    Ok(Json(state.catalog.get_book(id).await?))
}

/// Create book endpoint
async fn create_book(
    State(state): State<BooksState>,
    headers: HeaderMap,
    Json(payload): Json<BookPayload>,
) -> Result<impl IntoResponse, AppError> {
    let actor = state.auth.authenticate(bearer_token(&headers));
    let book = state.catalog.create_book(&actor, payload.into_draft()).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Book created successfully",
            "book": book,
        })),
    ))
}

/// Update book endpoint; a full-state overwrite, not a merge
async fn update_book(
    State(state): State<BooksState>,
    Path(id): Path<BookId>,
    headers: HeaderMap,
    Json(payload): Json<BookPayload>,
) -> Result<Json<serde_json::Value>, AppError> {
    let actor = state.auth.authenticate(bearer_token(&headers));
    let book = state
        .catalog
        .update_book(&actor, id, payload.into_draft())
        .await?;

    Ok(Json(json!({
        "message": "Book updated successfully",
        "book": book,
    })))
}

/// Delete book endpoint; permanent, there is no trash
async fn delete_book(
    State(state): State<BooksState>,
    Path(id): Path<BookId>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, AppError> {
    let actor = state.auth.authenticate(bearer_token(&headers));
    let id = state.catalog.delete_book(&actor, id).await?;

    Ok(Json(json!({
        "message": "Book deleted successfully",
        "id": id,
    })))
}

/// Create a new instance of the books module
pub fn create_module(deps: &ModuleDeps) -> Arc<dyn Module> {
    Arc::new(BooksModule::new(deps))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::tests_support::{body_json, deps_with_tokens, json_request};
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn router() -> Router {
        BooksModule::new(&deps_with_tokens()).routes()
    }

    #[tokio::test]
    async fn list_starts_empty() {
        let response = router()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, serde_json::json!([]));
    }

    #[tokio::test]
    async fn create_then_fetch_roundtrip() {
        let router = router();

        let response = router
            .clone()
            .oneshot(json_request(
                "POST",
                "/",
                Some("editor-token"),
                serde_json::json!({
                    "title": "Emma",
                    "isbn": "123",
                    "publication_year": "1815"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = body_json(response).await;
        assert_eq!(body["message"], "Book created successfully");
        let id = body["book"]["id"].as_u64().unwrap();

        let response = router
            .oneshot(
                Request::builder()
                    .uri(format!("/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["title"], "Emma");
        assert_eq!(body["isbn"], "123");
        assert_eq!(body["publication_year"], "1815");
        assert_eq!(body["description"], "");
    }

    #[tokio::test]
    async fn list_omits_descriptions_on_the_wire() {
        let router = router();

        let response = router
            .clone()
            .oneshot(json_request(
                "POST",
                "/",
                Some("editor-token"),
                serde_json::json!({"title": "Emma", "description": "secret"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = router
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = body_json(response).await;
        let books = body.as_array().unwrap();
        assert_eq!(books.len(), 1);
        assert!(books[0].get("description").is_none());
    }

    #[tokio::test]
    async fn create_requires_a_capability() {
        let response = router()
            .oneshot(json_request(
                "POST",
                "/",
                None,
                serde_json::json!({"title": "Emma"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn create_rejects_blank_titles() {
        let response = router()
            .oneshot(json_request(
                "POST",
                "/",
                Some("editor-token"),
                serde_json::json!({"title": "   "}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["error"]["message"], "Title is required");
    }

    #[tokio::test]
    async fn missing_books_are_404() {
        let response = router()
            .oneshot(Request::builder().uri("/42").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn update_overwrites_and_missing_update_is_404() {
        let router = router();

        let response = router
            .clone()
            .oneshot(json_request(
                "POST",
                "/",
                Some("editor-token"),
                serde_json::json!({"title": "Emma", "isbn": "123"}),
            ))
            .await
            .unwrap();
        let id = body_json(response).await["book"]["id"].as_u64().unwrap();

        let response = router
            .clone()
            .oneshot(json_request(
                "PUT",
                &format!("/{id}"),
                Some("editor-token"),
                serde_json::json!({"title": "Emma (revised)"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["book"]["title"], "Emma (revised)");
        // Omitted fields are cleared, not merged.
        assert_eq!(body["book"]["isbn"], "");

        let response = router
            .oneshot(json_request(
                "PUT",
                "/9999",
                Some("editor-token"),
                serde_json::json!({"title": "Ghost"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_flow() {
        let router = router();

        let response = router
            .clone()
            .oneshot(json_request(
                "POST",
                "/",
                Some("editor-token"),
                serde_json::json!({"title": "Emma"}),
            ))
            .await
            .unwrap();
        let id = body_json(response).await["book"]["id"].as_u64().unwrap();

        // Contributors may not delete.
        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/{id}"))
                    .header("authorization", "Bearer contributor-token")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/{id}"))
                    .header("authorization", "Bearer editor-token")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["id"], id);

        let response = router
            .oneshot(
                Request::builder()
                    .uri(format!("/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
