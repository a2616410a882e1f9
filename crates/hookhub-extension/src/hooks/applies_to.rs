//! Page applicability filtering for hooks that render on specific pages.

use serde::{Deserialize, Serialize};

use crate::host::urls::ResolverMatch;

/// Capability of a hook that only applies to some pages.
pub trait AppliesTo {
    /// Returns whether the hook should apply to the page with this URL name.
    fn applies_to(&self, url_name: Option<&str>) -> bool;

    /// Returns whether the hook applies to a resolved request.
    fn applies_to_match(&self, resolved: &ResolverMatch) -> bool {
        self.applies_to(resolved.url_name.as_deref())
    }
}

/// Allow-list of URL names. An empty list applies everywhere.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlFilter {
    apply_to: Vec<String>,
}

impl UrlFilter {
    /// A filter that applies to every page.
    pub fn any() -> Self {
        Self::default()
    }

    /// A filter restricted to the given URL names.
    pub fn only<I, S>(url_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            apply_to: url_names.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the configured URL names.
    pub fn url_names(&self) -> &[String] {
        &self.apply_to
    }
}

impl AppliesTo for UrlFilter {
    fn applies_to(&self, url_name: Option<&str>) -> bool {
        self.apply_to.is_empty()
            || url_name.is_some_and(|name| self.apply_to.iter().any(|n| n == name))
    }
}
