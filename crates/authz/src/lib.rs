//! Actor model and capability checks.
//!
//! The catalog service consults an [`AccessPolicy`] before any mutation;
//! transport adapters only translate credentials into an [`Actor`]. Keeping
//! the decision in one place means both transports share a single check site.

use std::collections::HashMap;

/// Role granted to an authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Editor,
    Contributor,
}

impl Role {
    /// Parse a role name from configuration, case-insensitively.
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "editor" => Some(Role::Editor),
            "contributor" => Some(Role::Contributor),
            _ => None,
        }
    }
}

/// The caller on whose behalf an operation runs.
///
/// `role` is `None` for anonymous callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub role: Option<Role>,
}

impl Actor {
    pub fn anonymous() -> Self {
        Self { role: None }
    }

    pub fn with_role(role: Role) -> Self {
        Self { role: Some(role) }
    }
}

/// Capability checks consulted by the catalog service.
///
/// Read operations never consult the policy; mutations always do.
pub trait AccessPolicy: Send + Sync {
    fn is_authenticated(&self, actor: &Actor) -> bool;
    fn can_create(&self, actor: &Actor) -> bool;
    fn can_edit(&self, actor: &Actor) -> bool;
    fn can_delete(&self, actor: &Actor) -> bool;
}

/// Role-based reference policy.
///
/// Admins and editors hold every capability; contributors may create and
/// edit records but not delete them.
pub struct RolePolicy;

impl AccessPolicy for RolePolicy {
    fn is_authenticated(&self, actor: &Actor) -> bool {
        actor.role.is_some()
    }

    fn can_create(&self, actor: &Actor) -> bool {
        matches!(
            actor.role,
            Some(Role::Admin | Role::Editor | Role::Contributor)
        )
    }

    fn can_edit(&self, actor: &Actor) -> bool {
        matches!(
            actor.role,
            Some(Role::Admin | Role::Editor | Role::Contributor)
        )
    }

    fn can_delete(&self, actor: &Actor) -> bool {
        matches!(actor.role, Some(Role::Admin | Role::Editor))
    }
}

/// Resolves bearer tokens to actors using the configured token table.
///
/// Unknown or missing tokens resolve to the anonymous actor; the policy
/// decides what an anonymous actor may do.
pub struct TokenAuthenticator {
    tokens: HashMap<String, Role>,
}

impl TokenAuthenticator {
    /// Build an authenticator from a token -> role-name table.
    /// Entries with unrecognized role names are skipped with a warning.
    pub fn from_tokens(tokens: &HashMap<String, String>) -> Self {
        let mut resolved = HashMap::new();
        for (token, role_name) in tokens {
            match Role::parse(role_name) {
                Some(role) => {
                    resolved.insert(token.clone(), role);
                }
                None => {
                    tracing::warn!(role = %role_name, "ignoring token with unknown role");
                }
            }
        }
        Self { tokens: resolved }
    }

    /// Resolve an `Authorization: Bearer <token>` value to an actor.
    pub fn authenticate(&self, bearer: Option<&str>) -> Actor {
        bearer
            .and_then(|token| self.tokens.get(token))
            .map(|role| Actor::with_role(*role))
            .unwrap_or_else(Actor::anonymous)
    }
}
