use http::HeaderMap;
use http::header::{HeaderName, HeaderValue};
use indexmap::IndexMap;
use serde::Serialize;
use tracing::warn;

use super::to_param_string;
use crate::client::error::ApiClientError;

/// Represents HTTP headers for an API call, or for the service defaults.
///
/// Header names compare case-insensitively: adding `content-type` replaces a previous
/// `Content-Type`, keeping the spelling of the last writer. Insertion order is preserved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallHeaders {
    headers: IndexMap<String, String>,
}

impl CallHeaders {
    /// Creates a new empty CallHeaders instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a header to the collection.
    ///
    /// Absent values (`None`) leave the collection unchanged. Arrays are joined with commas.
    ///
    /// # Example
    ///
    /// ```rust
    /// use cloudbind_core::CallHeaders;
    ///
    /// let headers = CallHeaders::new()
    ///     .add_header("Accept", "application/json")
    ///     .add_header("X-Watson-Learning-Opt-Out", true)
    ///     .add_header("X-Request-ID", None::<String>);
    ///
    /// assert_eq!(headers.len(), 2);
    /// ```
    pub fn add_header<T: Serialize>(mut self, name: impl Into<String>, value: T) -> Self {
        let name = name.into();
        match to_param_string(&value) {
            Ok(Some(value)) => self.insert(name, value),
            Ok(None) => {}
            Err(err) => {
                warn!(?name, error = %err, "skip header");
            }
        }
        self
    }

    fn insert(&mut self, name: String, value: String) {
        self.headers
            .retain(|existing, _| !existing.eq_ignore_ascii_case(&name));
        self.headers.insert(name, value);
    }

    /// Merges another CallHeaders instance into this one.
    ///
    /// Headers from the other instance override headers with the same name in this instance;
    /// headers that are not overridden are preserved.
    pub fn merge(mut self, other: Self) -> Self {
        for (name, value) in other.headers {
            self.insert(name, value);
        }
        self
    }

    /// Returns the value of a header, comparing names case-insensitively.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Returns true if the header is set.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Checks if the headers collection is empty.
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Returns the number of headers.
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    /// Iterates over the headers in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.headers
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Converts headers to an `http` header map.
    pub(in crate::client) fn to_header_map(&self) -> Result<HeaderMap, ApiClientError> {
        let mut result = HeaderMap::with_capacity(self.headers.len());
        for (name, value) in &self.headers {
            result.insert(
                HeaderName::from_bytes(name.as_bytes())?,
                HeaderValue::from_str(value)?,
            );
        }
        Ok(result)
    }
}
