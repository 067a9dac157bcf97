//! Redirect extraction.
//!
//! Registration responses announce follow-up fetches through two channels:
//! `Attribution-Reporting-Redirect` (any number of values) and `Location`.
//! Redirects are never followed here; they are collected for the caller, who
//! schedules each target as its own registration.

use std::collections::BTreeMap;

use super::headers::ResponseHeaders;
use crate::config::{HEADER_LOCATION, HEADER_REDIRECT};

/// Which header a redirect came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RedirectKind {
    /// `Attribution-Reporting-Redirect`
    List,
    /// `Location`
    Location,
}

/// Extracts the redirects of one response.
///
/// Both kinds are always present in the result, possibly empty. Values are
/// passed through as opaque strings.
///
/// # Arguments
///
/// * `headers` - The response headers
///
/// # Returns
///
/// A map from each redirect kind to its values in header order.
pub fn parse_redirects(headers: &ResponseHeaders) -> BTreeMap<RedirectKind, Vec<String>> {
    let collect = |name: &str| -> Vec<String> {
        headers
            .get_all(name)
            .into_iter()
            .map(str::to_string)
            .collect()
    };
    BTreeMap::from([
        (RedirectKind::List, collect(HEADER_REDIRECT)),
        (RedirectKind::Location, collect(HEADER_LOCATION)),
    ])
}

/// Redirects collected across every hop of one registration chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedirectAccumulator {
    list: Vec<String>,
    location: Vec<String>,
}

impl RedirectAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the redirects of one response.
    pub fn extend_from(&mut self, redirects: BTreeMap<RedirectKind, Vec<String>>) {
        for (kind, uris) in redirects {
            match kind {
                RedirectKind::List => self.list.extend(uris),
                RedirectKind::Location => self.location.extend(uris),
            }
        }
    }

    pub fn get(&self, kind: RedirectKind) -> &[String] {
        match kind {
            RedirectKind::List => &self.list,
            RedirectKind::Location => &self.location,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty() && self.location.is_empty()
    }
}
