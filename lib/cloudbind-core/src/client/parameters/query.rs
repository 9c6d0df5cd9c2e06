use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use super::scalar_to_string;
use crate::client::ApiClientError;

/// How array values are written in the query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryStyle {
    /// Form style (default): arrays are repeated as separate parameters.
    ///
    /// Example: `?tags=rust&tags=web&tags=api`
    #[default]
    Form,
    /// Comma separated: `?tags=rust%2Cweb%2Capi`
    CommaDelimited,
    /// Space delimited: `?tags=rust+web+api`
    SpaceDelimited,
    /// Pipe delimited: `?tags=rust%7Cweb%7Capi`
    PipeDelimited,
}

impl QueryStyle {
    fn delimiter(self) -> Option<&'static str> {
        match self {
            Self::Form => None,
            Self::CommaDelimited => Some(","),
            Self::SpaceDelimited => Some(" "),
            Self::PipeDelimited => Some("|"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct QueryValue {
    values: Vec<String>,
    style: QueryStyle,
}

impl QueryValue {
    fn pairs<'a>(&'a self, name: &'a str) -> Vec<(&'a str, String)> {
        match self.style.delimiter() {
            None => self
                .values
                .iter()
                .map(|value| (name, value.clone()))
                .collect(),
            Some(delimiter) => vec![(name, self.values.join(delimiter))],
        }
    }
}

/// A collection of query parameters for one call, or for the service defaults.
///
/// Absent values (`None`, `null`) are never recorded, so they never appear in the query
/// string, not even as an empty value.
///
/// # Example
///
/// ```rust
/// use cloudbind_core::CallQuery;
///
/// let query = CallQuery::new()
///     .add_param("x", None::<String>)
///     .add_param("y", "v");
///
/// assert_eq!(query.to_query_string()?, "y=v");
/// # Ok::<(), cloudbind_core::ApiClientError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallQuery {
    params: IndexMap<String, QueryValue>,
}

impl CallQuery {
    /// Creates an empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a query parameter using the default [`QueryStyle::Form`] style.
    pub fn add_param<T: Serialize>(self, name: impl Into<String>, value: T) -> Self {
        self.add_param_with_style(name, value, QueryStyle::default())
    }

    /// Adds a query parameter with an explicit array style.
    ///
    /// Objects are not supported and are skipped with a warning; calls report them as errors
    /// instead, see [`ServiceCall::with_query_param`](crate::ServiceCall::with_query_param).
    pub fn add_param_with_style<T: Serialize>(
        mut self,
        name: impl Into<String>,
        value: T,
        style: QueryStyle,
    ) -> Self {
        let name = name.into();
        if let Err(err) = self.try_insert(name.clone(), value, style) {
            warn!(?name, error = %err, "skip query parameter");
        }
        self
    }

    /// Sets a query parameter, or removes it when the value is absent.
    ///
    /// On error the query is left unchanged.
    pub(in crate::client) fn try_insert<T: Serialize>(
        &mut self,
        name: impl Into<String>,
        value: T,
        style: QueryStyle,
    ) -> Result<(), ApiClientError> {
        let name = name.into();
        let value = serde_json::to_value(value)?;
        match query_values(value)? {
            Some(values) => {
                self.params.insert(name, QueryValue { values, style });
            }
            None => {
                self.params.shift_remove(&name);
            }
        }
        Ok(())
    }

    /// Overlays `other` on top of this query; parameters of `other` win.
    pub fn merge(mut self, other: Self) -> Self {
        for (name, value) in other.params {
            self.params.insert(name, value);
        }
        self
    }

    /// Returns true if the query has no parameter.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Returns the number of parameters.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Returns true if a parameter with this name is set.
    pub fn contains(&self, name: &str) -> bool {
        self.params.contains_key(name)
    }

    /// Serializes the query as `application/x-www-form-urlencoded`.
    ///
    /// # Errors
    ///
    /// Fails if `serde_urlencoded` rejects the pairs.
    pub fn to_query_string(&self) -> Result<String, ApiClientError> {
        let pairs: Vec<(&str, String)> = self
            .params
            .iter()
            .flat_map(|(name, value)| value.pairs(name))
            .collect();
        let result = serde_urlencoded::to_string(pairs)?;
        Ok(result)
    }
}

fn query_values(value: Value) -> Result<Option<Vec<String>>, ApiClientError> {
    match value {
        Value::Null => Ok(None),
        Value::Array(items) => {
            let values = items
                .into_iter()
                .filter(|item| !item.is_null())
                .map(|item| {
                    scalar_to_string(&item).ok_or_else(|| {
                        ApiClientError::UnsupportedParameterValue {
                            message: "nested arrays and objects are not supported in query arrays"
                                .to_string(),
                            value: item.clone(),
                        }
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Some(values))
        }
        Value::Object(_) => Err(ApiClientError::UnsupportedParameterValue {
            message: "objects are not supported for query parameters".to_string(),
            value,
        }),
        scalar => Ok(scalar_to_string(&scalar).map(|value| vec![value])),
    }
}
