use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::client::ApiClientError;

/// The parameter bag handed to a generated binding method.
///
/// Values are kept as JSON values so a binding can accept loosely shaped input, either built
/// field by field or converted from any `Serialize` struct. A key holding `null` is treated
/// exactly like an absent key. A value that fails to serialize is remembered as a failure, not
/// as an absent key: calls built from the bag report it when they run.
///
/// # Example
///
/// ```rust
/// use cloudbind_core::Params;
///
/// let params = Params::new()
///     .with("text", vec!["Hello"])
///     .with("model_id", "en-es")
///     .with("source", None::<String>);
///
/// assert!(params.is_present("text"));
/// assert!(!params.is_present("source"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    values: IndexMap<String, Value>,
    /// Serialization failures, by parameter name.
    failures: IndexMap<String, String>,
}

impl Params {
    /// Creates an empty parameter bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a parameter bag from a serializable struct or map.
    ///
    /// # Errors
    ///
    /// Fails if the value does not serialize to a JSON object.
    pub fn from_serialize<T: Serialize>(value: &T) -> Result<Self, ApiClientError> {
        match serde_json::to_value(value)? {
            Value::Object(map) => Ok(map.into_iter().collect()),
            Value::Null => Ok(Self::default()),
            other => Err(ApiClientError::UnsupportedParameterValue {
                message: "parameters must serialize to an object".to_string(),
                value: other,
            }),
        }
    }

    /// Adds a parameter, replacing any previous value with the same name.
    ///
    /// A value that fails to serialize is recorded as a failure, see [`Self::check`].
    pub fn with<T: Serialize>(mut self, name: impl Into<String>, value: T) -> Self {
        self.insert(name, value);
        self
    }

    /// Inserts a parameter in place, recording a serialization failure.
    pub fn insert<T: Serialize>(&mut self, name: impl Into<String>, value: T) {
        let name = name.into();
        if let Err(err) = self.try_insert(name.clone(), value) {
            self.failures.insert(name, err.to_string());
        }
    }

    /// Inserts a parameter in place.
    ///
    /// # Errors
    ///
    /// Fails if the value cannot be serialized; the previous value is removed.
    pub fn try_insert<T: Serialize>(
        &mut self,
        name: impl Into<String>,
        value: T,
    ) -> Result<(), ApiClientError> {
        let name = name.into();
        self.failures.shift_remove(&name);
        match serde_json::to_value(value) {
            Ok(value) => {
                self.values.insert(name, value);
                Ok(())
            }
            Err(err) => {
                self.values.shift_remove(&name);
                Err(err.into())
            }
        }
    }

    /// Checks that every inserted value was serialized.
    ///
    /// # Errors
    ///
    /// Fails with [`ApiClientError::UnsupportedParameterValue`] for the first failed value.
    pub fn check(&self) -> Result<(), ApiClientError> {
        match self.failures.first() {
            Some((name, error)) => Err(ApiClientError::UnsupportedParameterValue {
                message: format!("parameter '{name}' cannot be serialized: {error}"),
                value: Value::Null,
            }),
            None => Ok(()),
        }
    }

    /// Returns the value of a parameter, `None` when absent or null.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name).filter(|value| !value.is_null())
    }

    /// Returns true if the parameter exists with a non-null value.
    ///
    /// `""`, `0` and `false` are present values.
    pub fn is_present(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Removes a parameter and returns its non-null value.
    pub fn take(&mut self, name: &str) -> Option<Value> {
        self.values.shift_remove(name).filter(|value| !value.is_null())
    }

    /// Iterates over the non-null parameters, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        self.values
            .iter()
            .filter(|(_, value)| !value.is_null())
            .map(|(name, value)| (name.as_str(), value))
    }

    /// Returns true if no non-null parameter is set.
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

impl FromIterator<(String, Value)> for Params {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
            failures: IndexMap::new(),
        }
    }
}

/// Returns the required parameter names that are absent or null, in the order given.
///
/// An absent bag is treated as empty. An empty result means every required parameter is present.
/// A value that failed to serialize is not missing: [`Params::check`] reports it.
///
/// ```rust
/// use cloudbind_core::{Params, validate_required};
///
/// let params = Params::new().with("text", "").with("count", 0).with("force", false);
/// assert!(validate_required(Some(&params), &["text", "count", "force"]).is_empty());
///
/// assert_eq!(validate_required(None, &["text"]), vec!["text".to_string()]);
/// ```
pub fn validate_required(params: Option<&Params>, required: &[&str]) -> Vec<String> {
    required
        .iter()
        .filter(|name| {
            !params.is_some_and(|params| {
                params.is_present(name) || params.failures.contains_key(**name)
            })
        })
        .map(|name| (*name).to_string())
        .collect()
}

/// Fails with [`ApiClientError::MissingRequiredParameters`] when a required parameter is missing.
///
/// # Errors
///
/// Returns the ordered list of missing names.
pub fn ensure_required(params: Option<&Params>, required: &[&str]) -> Result<(), ApiClientError> {
    let missing = validate_required(params, required);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ApiClientError::MissingRequiredParameters { missing })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;
    use std::collections::BTreeMap;

    #[derive(Debug, Serialize)]
    struct TranslateParams {
        text: Option<Vec<String>>,
        model_id: Option<String>,
        target: Option<String>,
    }

    #[test]
    fn should_report_missing_when_bag_is_absent() {
        let missing = validate_required(None, &["text", "model_id"]);

        assert_eq!(missing, vec!["text", "model_id"]);
    }

    #[test]
    fn should_report_missing_for_empty_bag() {
        let params = Params::new();

        let missing = validate_required(Some(&params), &["text"]);

        assert_eq!(missing, vec!["text"]);
    }

    #[test]
    fn should_accept_empty_required_list() {
        let missing = validate_required(None, &[]);

        assert!(missing.is_empty());
    }

    #[rstest]
    #[case::empty_string(json!(""))]
    #[case::zero(json!(0))]
    #[case::false_value(json!(false))]
    #[case::empty_array(json!([]))]
    #[case::empty_object(json!({}))]
    fn should_keep_falsy_values_as_present(#[case] value: Value) {
        let params = Params::new().with("field", value);

        let missing = validate_required(Some(&params), &["field"]);

        assert!(missing.is_empty(), "falsy value reported missing: {missing:?}");
    }

    #[test]
    fn should_treat_null_as_missing() {
        let params = Params::new()
            .with("collection_id", Value::Null)
            .with("environment_id", "env");

        let missing = validate_required(Some(&params), &["environment_id", "collection_id"]);

        assert_eq!(missing, vec!["collection_id"]);
    }

    #[test]
    fn should_preserve_required_order() {
        let params = Params::new().with("b", 1);

        let missing = validate_required(Some(&params), &["c", "b", "a"]);

        assert_eq!(missing, vec!["c", "a"]);
    }

    #[test]
    fn should_build_from_struct_with_options() {
        let input = TranslateParams {
            text: Some(vec!["Hello".to_string()]),
            model_id: None,
            target: Some("es".to_string()),
        };

        let params = Params::from_serialize(&input).expect("object params");

        assert!(params.is_present("text"));
        assert!(!params.is_present("model_id"));
        let missing = validate_required(Some(&params), &["text", "model_id"]);
        assert_eq!(missing, vec!["model_id"]);
    }

    #[test]
    fn should_reject_non_object_params() {
        let result = Params::from_serialize(&vec![1, 2, 3]);

        insta::assert_snapshot!(
            result.expect_err("arrays are not parameter bags"),
            @"Unsupported parameter value: parameters must serialize to an object. Got: [1,2,3]"
        );
    }

    #[test]
    fn should_ensure_required() {
        let params = Params::new().with("text", "Hello");

        assert!(ensure_required(Some(&params), &["text"]).is_ok());

        let error = ensure_required(Some(&params), &["text", "model_id"]).expect_err("missing");
        assert_eq!(error.missing_parameters(), Some(["model_id".to_string()].as_slice()));
    }

    #[test]
    fn should_take_and_iterate_non_null_values() {
        let mut params = Params::new()
            .with("a", 1)
            .with("b", None::<u32>)
            .with("c", "three");

        let names: Vec<_> = params.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["a", "c"]);

        assert_eq!(params.take("b"), None);
        assert_eq!(params.take("a"), Some(json!(1)));
        assert!(!params.is_present("a"));
        assert!(!params.is_empty());
    }

    #[test]
    fn should_record_serialization_failures() {
        let bad_keys = BTreeMap::from([((1, 2), "tuple keys")]);
        let params = Params::new()
            .with("text", "Hello")
            .with("filter", &bad_keys)
            .with("options", &bad_keys);

        assert!(!params.is_present("filter"));
        assert!(validate_required(Some(&params), &["text", "filter"]).is_empty());
        insta::assert_snapshot!(
            params.check().expect_err("unserializable value"),
            @"Unsupported parameter value: parameter 'filter' cannot be serialized: key must be a string. Got: null"
        );
    }

    #[test]
    fn should_clear_failure_when_value_is_replaced() {
        let bad_keys = BTreeMap::from([((1, 2), "tuple keys")]);
        let mut params = Params::new().with("filter", &bad_keys);

        assert!(params.try_insert("other", &bad_keys).is_err());
        params.insert("filter", "status:ready");
        params.insert("other", None::<String>);

        assert!(params.check().is_ok());
        assert_eq!(params.get("filter"), Some(&json!("status:ready")));
    }
}
