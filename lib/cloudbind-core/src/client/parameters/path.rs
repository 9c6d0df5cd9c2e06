use std::collections::BTreeSet;
use std::sync::LazyLock;

use indexmap::IndexMap;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use regex::{Captures, Regex};
use serde::Serialize;
use tracing::warn;

use super::to_param_string;
use crate::client::ApiClientError;

/// Regular expression for matching path parameters in the format `{param_name}`.
static RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(?<name>[^{}/]+)}").expect("a valid regex"));

/// Everything but the RFC 3986 unreserved characters is escaped in a path segment.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// URL-encode a path parameter value so it stays inside a single path segment.
fn encode_path_param_value(value: &str) -> String {
    utf8_percent_encode(value, PATH_SEGMENT).to_string()
}

fn is_dot_segment(value: &str) -> bool {
    value == "." || value == ".."
}

/// Substitutes every `{name}` placeholder of `template` with the percent-encoded value.
///
/// The same placeholder may appear several times. Template text outside placeholders is left
/// untouched; values are always escaped, so they cannot introduce `/`, `?`, `#` or braces.
///
/// # Errors
///
/// Returns [`ApiClientError::PathUnresolved`] listing every placeholder without a value, and
/// [`ApiClientError::UnsupportedParameterValue`] for a `.` or `..` value: URL parsing treats
/// those as dot segments, even percent-encoded, and would move the request to another resource.
///
/// # Example
///
/// ```rust
/// use cloudbind_core::expand_path;
/// use indexmap::IndexMap;
///
/// let params = IndexMap::from([("collection_id".to_string(), "a b".to_string())]);
/// let path = expand_path("/v1/collections/{collection_id}", &params)?;
///
/// assert_eq!(path, "/v1/collections/a%20b");
/// # Ok::<(), cloudbind_core::ApiClientError>(())
/// ```
pub fn expand_path(
    template: &str,
    params: &IndexMap<String, String>,
) -> Result<String, ApiClientError> {
    let mut missings = BTreeSet::new();
    let mut used = BTreeSet::new();
    let mut dot_segment = None;

    let path = RE.replace_all(template, |caps: &Captures<'_>| {
        let name = &caps["name"];
        if let Some(value) = params.get(name) {
            used.insert(name.to_string());
            if is_dot_segment(value) && dot_segment.is_none() {
                dot_segment = Some((name.to_string(), value.clone()));
            }
            encode_path_param_value(value)
        } else {
            missings.insert(name.to_string());
            String::new()
        }
    });

    if !missings.is_empty() {
        return Err(ApiClientError::PathUnresolved {
            path: template.to_string(),
            missings: missings.into_iter().collect(),
        });
    }

    if let Some((name, value)) = dot_segment {
        return Err(ApiClientError::UnsupportedParameterValue {
            message: format!("path parameter '{name}' cannot be a dot segment"),
            value: value.into(),
        });
    }

    for name in params.keys().filter(|name| !used.contains(name.as_str())) {
        warn!(?name, %template, "argument name not found");
    }

    Ok(path.into_owned())
}

/// A parameterized HTTP path.
///
/// `CallPath` holds a path template with named `{placeholder}` tokens and the values to
/// substitute. Values are converted to their string form when added; arrays are joined with
/// commas. Absent values (`None`) are not recorded, so the placeholder stays unresolved and the
/// call fails before anything is sent.
///
/// # Examples
///
/// ```rust
/// use cloudbind_core::CallPath;
///
/// let path = CallPath::from("/v1/environments/{environment_id}/collections/{collection_id}")
///     .add_param("environment_id", "my-env")
///     .add_param("collection_id", 42);
///
/// assert_eq!(path.resolve()?, "/v1/environments/my-env/collections/42");
/// # Ok::<(), cloudbind_core::ApiClientError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, derive_more::Display)]
#[display("{path}")]
pub struct CallPath {
    /// The path template with parameter placeholders
    pub(in crate::client) path: String,
    /// Parameter values indexed by parameter name
    args: IndexMap<String, String>,
}

impl CallPath {
    /// Adds a path parameter with the given name and value.
    ///
    /// Adding the same name twice keeps the last value. Values that serialize to `null` or to
    /// an object are ignored with a warning.
    pub fn add_param<T: Serialize>(mut self, name: impl Into<String>, value: T) -> Self {
        let name = name.into();
        match to_param_string(&value) {
            Ok(Some(value)) => {
                self.args.insert(name, value);
            }
            Ok(None) => {}
            Err(err) => {
                warn!(?name, error = %err, "failed to serialize path parameter value");
            }
        }
        self
    }

    /// Returns the path template.
    pub fn template(&self) -> &str {
        &self.path
    }

    /// Returns the recorded parameter values.
    pub fn params(&self) -> &IndexMap<String, String> {
        &self.args
    }

    /// Expands the template with the recorded values.
    ///
    /// # Errors
    ///
    /// Fails with [`ApiClientError::PathUnresolved`] if a placeholder has no value.
    pub fn resolve(&self) -> Result<String, ApiClientError> {
        expand_path(&self.path, &self.args)
    }
}

impl From<&str> for CallPath {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<String> for CallPath {
    fn from(value: String) -> Self {
        Self {
            path: value,
            args: IndexMap::default(),
        }
    }
}
