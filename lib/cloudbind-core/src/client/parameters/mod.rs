//! Request parameter types for building service calls.
//!
//! This module provides types for handling the different parts of a request:
//!
//! - [`Params`] - The loosely typed parameter bag of a binding method, and its validator
//! - [`CallPath`] - Path templates (e.g., `/v1/collections/{collection_id}`)
//! - [`CallQuery`] - Query string parameters
//! - [`CallHeaders`] - HTTP headers
//! - [`CallBody`] - Request body content
//! - [`MultipartForm`] - Multipart form fields

use serde::Serialize;
use serde_json::Value;

use crate::client::ApiClientError;

mod params;
pub use self::params::{Params, ensure_required, validate_required};

mod path;
pub use self::path::{CallPath, expand_path};

mod query;
pub use self::query::{CallQuery, QueryStyle};

mod headers;
pub use self::headers::CallHeaders;

mod body;
pub use self::body::CallBody;

mod multipart;
pub use self::multipart::{FieldData, FieldStream, MultipartField, MultipartForm};

/// String form of a scalar JSON value; `None` for null, arrays and objects.
pub(in crate::client) fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// String form of a path or header parameter.
///
/// `null` means absent; arrays are joined with commas; objects are rejected.
pub(in crate::client) fn to_param_string<T: Serialize>(
    value: &T,
) -> Result<Option<String>, ApiClientError> {
    let value = serde_json::to_value(value)?;
    json_to_param_string(value)
}

pub(in crate::client) fn json_to_param_string(
    value: Value,
) -> Result<Option<String>, ApiClientError> {
    match value {
        Value::Null => Ok(None),
        Value::Array(items) => {
            let mut parts = Vec::with_capacity(items.len());
            for item in items.iter().filter(|item| !item.is_null()) {
                let Some(part) = scalar_to_string(item) else {
                    return Err(ApiClientError::UnsupportedParameterValue {
                        message: "nested arrays and objects are not supported".to_string(),
                        value: Value::Array(items.clone()),
                    });
                };
                parts.push(part);
            }
            Ok(Some(parts.join(",")))
        }
        Value::Object(_) => Err(ApiClientError::UnsupportedParameterValue {
            message: "objects are not supported for path or header parameters".to_string(),
            value,
        }),
        scalar => Ok(scalar_to_string(&scalar)),
    }
}
