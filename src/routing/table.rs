//! Route registration and lookup.
//!
//! # Responsibilities
//! - Collect `(method, pattern, handler)` triples during startup
//! - Freeze them into an immutable table
//! - Look up the route for a request and return its parameters
//!
//! # Design Decisions
//! - Immutable after `build()` (thread-safe without locks)
//! - O(n) scan in registration order; first match wins
//! - Overlapping patterns are allowed and never reported
//! - Explicit no-match (`None`) rather than a silent default

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::routing::template::{RouteError, RouteTemplate};

/// Decoded placeholder values for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RouteParams(HashMap<String, String>);

impl RouteParams {
    /// Value captured for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for RouteParams {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

struct Route<H> {
    template: RouteTemplate,
    handler: H,
}

/// Collects routes before the table is frozen.
pub struct RouteTableBuilder<H> {
    routes: Vec<Route<H>>,
    case_insensitive_paths: bool,
}

impl<H> RouteTableBuilder<H> {
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            case_insensitive_paths: false,
        }
    }

    /// Compare literal path segments ignoring ASCII case for routes
    /// registered after this call.
    pub fn case_insensitive_paths(mut self, enabled: bool) -> Self {
        self.case_insensitive_paths = enabled;
        self
    }

    /// Compile and append a route. Earlier registrations take precedence.
    pub fn register(&mut self, method: &str, pattern: &str, handler: H) -> Result<&mut Self, RouteError> {
        let template = RouteTemplate::compile(method, pattern, self.case_insensitive_paths)?;
        tracing::debug!(route = ?template, "Route registered");
        self.routes.push(Route { template, handler });
        Ok(self)
    }

    /// Freeze the registered routes.
    pub fn build(self) -> RouteTable<H> {
        RouteTable {
            routes: self.routes.into_boxed_slice(),
        }
    }
}

impl<H> Default for RouteTableBuilder<H> {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable, ordered set of compiled routes.
pub struct RouteTable<H> {
    routes: Box<[Route<H>]>,
}

impl<H> RouteTable<H> {
    /// Find the first route whose method and pattern accept the request.
    pub fn match_route(&self, method: &str, path: &str) -> Option<RouteMatch<'_, H>> {
        self.routes.iter().find_map(|route| {
            if !route.template.matches_method(method) {
                return None;
            }
            let params = route.template.extract(path)?;
            Some(RouteMatch {
                template: &route.template,
                handler: &route.handler,
                params: params.into_iter().collect(),
            })
        })
    }

    /// Registered templates in precedence order.
    pub fn templates(&self) -> impl Iterator<Item = &RouteTemplate> {
        self.routes.iter().map(|r| &r.template)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl<H> fmt::Debug for RouteTable<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.templates()).finish()
    }
}

/// Result of a successful lookup.
pub struct RouteMatch<'a, H> {
    template: &'a RouteTemplate,
    handler: &'a H,
    params: RouteParams,
}

impl<'a, H> RouteMatch<'a, H> {
    pub fn handler(&self) -> &'a H {
        self.handler
    }

    pub fn template(&self) -> &'a RouteTemplate {
        self.template
    }

    pub fn params(&self) -> &RouteParams {
        &self.params
    }

    pub fn into_params(self) -> RouteParams {
        self.params
    }
}
