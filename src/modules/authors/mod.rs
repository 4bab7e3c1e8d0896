use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use alexandria_authz::TokenAuthenticator;
use alexandria_catalog::{Author, AuthorDraft, AuthorId, CatalogService};
use alexandria_http::AppError;
use alexandria_kernel::{InitCtx, Module};

use crate::modules::{bearer_token, ModuleDeps};

/// REST transport for authors.
pub struct AuthorsModule {
    state: AuthorsState,
}

#[derive(Clone)]
pub struct AuthorsState {
    catalog: Arc<CatalogService>,
    auth: Arc<TokenAuthenticator>,
}

impl AuthorsModule {
    pub fn new(deps: &ModuleDeps) -> Self {
        Self {
            state: AuthorsState {
                catalog: deps.catalog.clone(),
                auth: deps.auth.clone(),
            },
        }
    }
}

/// Request model for creating an author.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthorPayload {
    #[serde(default)]
    pub name: String,
}

#[async_trait]
impl Module for AuthorsModule {
    fn name(&self) -> &'static str {
        "authors"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "authors module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/", get(list_authors).post(create_author))
            .route("/{id}", get(get_author))
            .with_state(self.state.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List authors, name ascending",
                        "tags": ["Authors"],
                        "responses": {
                            "200": {
                                "description": "List of authors",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "array",
                                            "items": { "$ref": "#/components/schemas/Author" }
                                        }
                                    }
                                }
                            }
                        }
                    },
                    "post": {
                        "summary": "Create an author",
                        "tags": ["Authors"],
                        "requestBody": {
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "type": "object",
                                        "properties": {
                                            "name": { "type": "string" }
                                        },
                                        "required": ["name"]
                                    }
                                }
                            }
                        },
                        "responses": {
                            "201": { "description": "Author created" },
                            "400": { "description": "Validation failure" },
                            "403": { "description": "Caller lacks create permission" }
                        }
                    }
                },
                "/{id}": {
                    "get": {
                        "summary": "Fetch a single author",
                        "tags": ["Authors"],
                        "responses": {
                            "200": { "description": "Author" },
                            "404": { "description": "Author not found" }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Author": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer", "description": "Unique identifier for the author" },
                            "name": { "type": "string", "description": "Author display name" }
                        },
                        "required": ["id", "name"]
                    }
                }
            }
        }))
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "authors module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "authors module stopped");
        Ok(())
    }
}

/// List authors endpoint, name ascending
async fn list_authors(State(state): State<AuthorsState>) -> Result<Json<Vec<Author>>, AppError> {
    Ok(Json(state.catalog.list_authors().await?))
}

/// Single author endpoint
async fn get_author(
    State(state): State<AuthorsState>,
    Path(id): Path<AuthorId>,
) -> Result<Json<Author>, AppError> {
    Ok(Json(state.catalog.get_author(id).await?))
}

/// Create author endpoint; duplicate names are allowed, identity is by id
async fn create_author(
    State(state): State<AuthorsState>,
    headers: HeaderMap,
    Json(payload): Json<AuthorPayload>,
) -> Result<impl IntoResponse, AppError> {
    let actor = state.auth.authenticate(bearer_token(&headers));
    let author = state
        .catalog
        .create_author(&actor, AuthorDraft { name: payload.name })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Author created successfully",
            "author": author,
        })),
    ))
}

/// Create a new instance of the authors module
pub fn create_module(deps: &ModuleDeps) -> Arc<dyn Module> {
    Arc::new(AuthorsModule::new(deps))
}
