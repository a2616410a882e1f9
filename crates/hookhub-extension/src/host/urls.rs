//! Dynamic URL table that extension URL hooks add their patterns to.

use std::fmt;
use std::sync::RwLock;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

use hookhub_core::error::AppError;
use hookhub_core::result::AppResult;

use crate::ids::PatternId;

/// A single route pattern, e.g. `/ext/foo/` or `/ext/items/{item_id}/`.
///
/// Patterns carry their own identity so that a table can remove exactly the
/// patterns a hook added, even if another hook added an identical route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlPattern {
    id: PatternId,
    route: String,
    name: Option<String>,
}

impl UrlPattern {
    /// Creates an unnamed pattern.
    pub fn new(route: impl Into<String>) -> Self {
        Self {
            id: PatternId::new(),
            route: route.into(),
            name: None,
        }
    }

    /// Creates a pattern with a URL name, used for applicability checks.
    pub fn named(route: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: PatternId::new(),
            route: route.into(),
            name: Some(name.into()),
        }
    }

    /// Returns a copy of this pattern with a new identity.
    pub fn restamped(&self) -> Self {
        Self {
            id: PatternId::new(),
            ..self.clone()
        }
    }

    /// Returns the pattern's identity.
    pub fn id(&self) -> PatternId {
        self.id
    }

    /// Returns the route string.
    pub fn route(&self) -> &str {
        &self.route
    }

    /// Returns the URL name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Checks that the route is absolute and its `{param}` segments are
    /// well formed.
    pub fn validate(&self) -> AppResult<()> {
        if !self.route.starts_with('/') {
            return Err(AppError::configuration(format!(
                "URL pattern '{}' must start with '/'",
                self.route
            )));
        }

        for segment in self.route.split('/') {
            let opens = segment.starts_with('{');
            let closes = segment.ends_with('}');
            if opens != closes || (opens && segment.len() < 3) {
                return Err(AppError::configuration(format!(
                    "URL pattern '{}' has a malformed segment '{segment}'",
                    self.route
                )));
            }
        }

        Ok(())
    }
}

/// Result of resolving a path against the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolverMatch {
    /// URL name of the matched pattern.
    pub url_name: Option<String>,
    /// Full route (prefix included) that matched.
    pub route: String,
    /// Values captured by `{param}` segments.
    pub params: IndexMap<String, String>,
}

/// Routing collaborator that URL hooks mutate.
///
/// New patterns take effect on the next resolution.
pub trait RouteTable: Send + Sync + fmt::Debug {
    /// Appends patterns in order.
    fn add_patterns(&self, patterns: &[UrlPattern]);

    /// Removes exactly these patterns, by identity. Patterns that are
    /// already gone are ignored.
    fn remove_patterns(&self, patterns: &[UrlPattern]);
}

/// In-memory [`RouteTable`] mounted under a parent URL.
#[derive(Debug)]
pub struct DynamicUrls {
    /// Parent URL every pattern is mounted under.
    prefix: String,
    /// Active patterns in insertion order.
    patterns: RwLock<Vec<UrlPattern>>,
}

impl DynamicUrls {
    /// Creates an empty table mounted under `prefix`.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            patterns: RwLock::new(Vec::new()),
        }
    }

    /// Returns the parent URL.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Resolves a request path to the first matching pattern.
    pub fn resolve(&self, path: &str) -> AppResult<ResolverMatch> {
        let patterns = self.patterns.read().unwrap_or_else(|e| e.into_inner());

        for pattern in patterns.iter() {
            let route = self.full_route(pattern.route());
            if let Some(params) = match_route(&route, path) {
                return Ok(ResolverMatch {
                    url_name: pattern.name.clone(),
                    route,
                    params,
                });
            }
        }

        Err(AppError::not_found(format!("No URL pattern matches '{path}'")))
    }

    /// Returns a snapshot of the active patterns.
    pub fn patterns(&self) -> Vec<UrlPattern> {
        self.patterns
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Returns the number of active patterns.
    pub fn len(&self) -> usize {
        self.patterns.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Returns whether the table has no patterns.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn full_route(&self, route: &str) -> String {
        format!(
            "{}/{}",
            self.prefix.trim_end_matches('/'),
            route.trim_start_matches('/')
        )
    }
}

impl RouteTable for DynamicUrls {
    fn add_patterns(&self, patterns: &[UrlPattern]) {
        let mut active = self.patterns.write().unwrap_or_else(|e| e.into_inner());
        active.extend(patterns.iter().cloned());
        debug!(added = patterns.len(), active = active.len(), "URL patterns added");
    }

    fn remove_patterns(&self, patterns: &[UrlPattern]) {
        let mut active = self.patterns.write().unwrap_or_else(|e| e.into_inner());
        let before = active.len();
        active.retain(|p| !patterns.iter().any(|r| r.id == p.id));

        let removed = before - active.len();
        if removed < patterns.len() {
            debug!(
                requested = patterns.len(),
                removed = removed,
                "Some URL patterns were already removed"
            );
        }
    }
}

/// Matches `path` against `route`, capturing `{param}` segments.
fn match_route(route: &str, path: &str) -> Option<IndexMap<String, String>> {
    let route_segments: Vec<&str> = route.split('/').collect();
    let path_segments: Vec<&str> = path.split('/').collect();

    if route_segments.len() != path_segments.len() {
        return None;
    }

    let mut params = IndexMap::new();
    for (expected, actual) in route_segments.iter().zip(path_segments.iter()) {
        match expected.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            Some(name) if !actual.is_empty() => {
                params.insert(name.to_string(), (*actual).to_string());
            }
            Some(_) => return None,
            None if expected == actual => {}
            None => return None,
        }
    }

    Some(params)
}
