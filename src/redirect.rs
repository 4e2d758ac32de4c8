//! Redirect target resolution.
//!
//! Redirect settings may hold either a named route or a literal URI. Names are
//! tried first; anything the resolver does not know is used as-is.

use crate::error::{ImpersonateError, Result};
use std::collections::HashMap;

/// Resolves route names to URIs.
pub trait RouteResolver: Send + Sync {
    /// URI for the route called `name`.
    ///
    /// Returns [`ImpersonateError::RouteNotDefined`] for unknown names.
    fn route(&self, name: &str) -> Result<String>;
}

/// Map-backed route table.
///
/// # Example
///
/// ```rust
/// use tideway_impersonate::redirect::{NamedRoutes, RouteResolver};
///
/// let routes = NamedRoutes::new()
///     .with_base_url("https://app.example.com")
///     .with_route("dashboard", "/dashboard");
///
/// assert_eq!(routes.route("dashboard").unwrap(), "https://app.example.com/dashboard");
/// ```
#[derive(Debug, Clone, Default)]
pub struct NamedRoutes {
    base_url: Option<String>,
    routes: HashMap<String, String>,
}

impl NamedRoutes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefix every resolved path with `base_url`.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        self.base_url = Some(base_url.trim_end_matches('/').to_string());
        self
    }

    /// Register `path` under `name`.
    #[must_use]
    pub fn with_route(mut self, name: impl Into<String>, path: impl Into<String>) -> Self {
        self.routes.insert(name.into(), path.into());
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, path: impl Into<String>) {
        self.routes.insert(name.into(), path.into());
    }
}

impl RouteResolver for NamedRoutes {
    fn route(&self, name: &str) -> Result<String> {
        let path = self
            .routes
            .get(name)
            .ok_or_else(|| ImpersonateError::RouteNotDefined(name.to_string()))?;

        Ok(match &self.base_url {
            Some(base) if path.starts_with('/') => format!("{base}{path}"),
            Some(base) => format!("{base}/{path}"),
            None => path.clone(),
        })
    }
}

/// Resolve `route_or_uri` as a route name, falling back to the literal value.
pub fn resolve_redirect_target(routes: &dyn RouteResolver, route_or_uri: &str) -> String {
    match routes.route(route_or_uri) {
        Ok(uri) => uri,
        Err(err) => {
            tracing::trace!(
                target: "impersonate.redirect",
                value = %route_or_uri,
                error = %err,
                "Not a route name, using value as URI"
            );
            route_or_uri.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_route_resolves() {
        let routes = NamedRoutes::new().with_route("dashboard", "/dashboard");
        assert_eq!(resolve_redirect_target(&routes, "dashboard"), "/dashboard");
    }

    #[test]
    fn test_unknown_name_falls_back_to_literal() {
        let routes = NamedRoutes::new().with_route("dashboard", "/dashboard");
        assert_eq!(resolve_redirect_target(&routes, "/admin/users"), "/admin/users");
        assert_eq!(resolve_redirect_target(&routes, "back"), "back");
    }

    #[test]
    fn test_unknown_name_errors_from_resolver() {
        let routes = NamedRoutes::new();
        assert!(matches!(
            routes.route("missing"),
            Err(ImpersonateError::RouteNotDefined(name)) if name == "missing"
        ));
    }

    #[test]
    fn test_base_url_joining() {
        let routes = NamedRoutes::new()
            .with_base_url("https://app.example.com/")
            .with_route("home", "/")
            .with_route("users", "admin/users");

        assert_eq!(routes.route("home").unwrap(), "https://app.example.com/");
        assert_eq!(
            routes.route("users").unwrap(),
            "https://app.example.com/admin/users"
        );
    }
}
