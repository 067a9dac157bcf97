//! Response header access.

use reqwest::header::HeaderMap;

/// Response headers as an ordered list of names with their value lists.
///
/// Lookups ignore ASCII case. A header may carry no value list at all; such
/// entries still count towards [`ResponseHeaders::characters_len`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseHeaders {
    entries: Vec<(String, Option<Vec<String>>)>,
}

impl ResponseHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds values under `name`, appending to an existing entry of the same
    /// name.
    pub fn with_values<I, V>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.append(name, Some(values.into_iter().map(Into::into).collect()));
        self
    }

    /// Adds a header name with no value list.
    pub fn with_name_only(mut self, name: impl Into<String>) -> Self {
        self.append(name, None);
        self
    }

    fn append(&mut self, name: impl Into<String>, values: Option<Vec<String>>) {
        let name = name.into();
        let existing = self
            .entries
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(&name));
        match (existing, values) {
            (Some((_, Some(current))), Some(values)) => current.extend(values),
            (Some((_, current @ None)), Some(values)) => *current = Some(values),
            (Some(_), None) => {}
            (None, values) => self.entries.push((name, values)),
        }
    }

    /// Every value under `name`, in order.
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .filter_map(|(_, values)| values.as_ref())
            .flatten()
            .map(String::as_str)
            .collect()
    }

    /// The first value under `name`.
    pub fn first(&self, name: &str) -> Option<&str> {
        self.get_all(name).into_iter().next()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total characters across header names and values.
    ///
    /// This is the response size reported to telemetry. Characters are
    /// Unicode scalar values (`char`s), not UTF-16 code units, so a
    /// character outside the Basic Multilingual Plane counts once.
    pub fn characters_len(&self) -> u64 {
        self.entries
            .iter()
            .map(|(name, values)| {
                let values_len: usize = values
                    .iter()
                    .flatten()
                    .map(|value| value.chars().count())
                    .sum();
                (name.chars().count() + values_len) as u64
            })
            .sum()
    }
}

impl From<&HeaderMap> for ResponseHeaders {
    fn from(map: &HeaderMap) -> Self {
        let mut headers = ResponseHeaders::new();
        for name in map.keys() {
            let values: Vec<String> = map
                .get_all(name)
                .iter()
                .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
                .collect();
            headers.append(name.as_str(), Some(values));
        }
        headers
    }
}
