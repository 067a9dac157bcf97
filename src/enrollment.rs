//! Enrollment resolution and flag allow/block lists.
//!
//! Resolving a registration URI to an ad-tech enrollment id is owned by an
//! external service; the fetchers only see the [`EnrollmentResolver`] trait.

use std::collections::HashMap;

use url::Url;

use crate::config::ALLOW_ALL;
use crate::web::{registration_origin, top_private_domain_and_scheme};

/// Maps a registration URI to the enrollment id of the ad tech that owns it.
pub trait EnrollmentResolver: Send + Sync {
    /// Returns `None` when the URI belongs to no enrolled ad tech.
    fn resolve(&self, registration_uri: &Url) -> Option<String>;
}

/// In-memory resolver keyed by origin or site.
///
/// A registration URI is looked up first by its exact origin
/// (`https://ads.example.test:8443`), then by its site
/// (`https://example.test`).
#[derive(Debug, Clone, Default)]
pub struct StaticEnrollmentResolver {
    enrollments: HashMap<String, String>,
}

impl StaticEnrollmentResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `enrollment_id` for an origin or site string.
    pub fn with_enrollment(mut self, origin: impl Into<String>, enrollment_id: impl Into<String>) -> Self {
        self.enrollments.insert(origin.into(), enrollment_id.into());
        self
    }
}

impl EnrollmentResolver for StaticEnrollmentResolver {
    fn resolve(&self, registration_uri: &Url) -> Option<String> {
        let by_origin = registration_origin(registration_uri)
            .and_then(|origin| self.enrollments.get(&origin));
        by_origin
            .or_else(|| {
                top_private_domain_and_scheme(registration_uri)
                    .and_then(|site| self.enrollments.get(&site))
            })
            .cloned()
    }
}

/// A comma-joined allow or block list as delivered by the flag service.
///
/// Entries are trimmed; empty entries are ignored. A `*` entry matches
/// everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowList {
    matches_all: bool,
    entries: Vec<String>,
}

impl AllowList {
    pub fn parse(list: &str) -> Self {
        let entries: Vec<String> = list
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(str::to_string)
            .collect();
        let matches_all = entries.iter().any(|entry| entry == ALLOW_ALL);
        Self {
            matches_all,
            entries,
        }
    }

    /// Whether the list contains `*`.
    pub fn matches_all(&self) -> bool {
        self.matches_all
    }

    /// Wildcard-aware membership.
    pub fn allows(&self, value: &str) -> bool {
        self.matches_all || self.contains_exact(value)
    }

    /// Literal membership; `*` is not expanded.
    pub fn contains_exact(&self, value: &str) -> bool {
        self.entries.iter().any(|entry| entry == value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_list_parse_trims_and_skips_empty() {
        let list = AllowList::parse(" a , b,,c ");
        assert!(list.contains_exact("a"));
        assert!(list.contains_exact("b"));
        assert!(list.contains_exact("c"));
        assert!(!list.contains_exact(""));
        assert!(!list.matches_all());
    }

    #[test]
    fn test_allow_list_wildcard() {
        let list = AllowList::parse("*");
        assert!(list.matches_all());
        assert!(list.allows("anything"));
        assert!(!list.contains_exact("anything"));
    }

    #[test]
    fn test_allow_list_empty() {
        let list = AllowList::parse("");
        assert!(!list.allows("a"));
        assert!(!list.matches_all());
    }

    #[test]
    fn test_static_resolver_prefers_origin_then_site() {
        let resolver = StaticEnrollmentResolver::new()
            .with_enrollment("https://ads.example.test:8443", "enrollment-origin")
            .with_enrollment("https://example.test", "enrollment-site");

        let exact = Url::parse("https://ads.example.test:8443/register").unwrap();
        assert_eq!(resolver.resolve(&exact).as_deref(), Some("enrollment-origin"));

        let other = Url::parse("https://other.example.test/register").unwrap();
        assert_eq!(resolver.resolve(&other).as_deref(), Some("enrollment-site"));

        let unknown = Url::parse("https://unknown.test/").unwrap();
        assert_eq!(resolver.resolve(&unknown), None);
    }
}
