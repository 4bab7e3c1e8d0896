pub mod actions;
pub mod authors;
pub mod books;

use std::sync::Arc;

use axum::http::{header, HeaderMap};

use alexandria_authz::TokenAuthenticator;
use alexandria_catalog::CatalogService;
use alexandria_kernel::ModuleRegistry;

/// Shared collaborators handed to every transport module.
#[derive(Clone)]
pub struct ModuleDeps {
    pub catalog: Arc<CatalogService>,
    pub auth: Arc<TokenAuthenticator>,
    pub legacy_nonce: String,
}

/// Register all transport modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, deps: &ModuleDeps) {
    registry.register(books::create_module(deps));
    registry.register(authors::create_module(deps));
    registry.register(actions::create_module(deps));
}

/// Extract the bearer token from an Authorization header, if any.
pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}
