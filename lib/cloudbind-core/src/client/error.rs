use std::fmt::Debug;

use http::{HeaderMap, StatusCode};

use super::auth::AuthenticationError;
use super::response::ResponseBody;
use crate::transport::TransportError;

/// Errors that can occur when using the `ServiceClient`.
///
/// Every failure of a call is reported through this type, whatever the stage it happened at:
/// parameter validation, request construction, transport, or remote status.
/// All variants implement `std::error::Error` and provide detailed context for debugging.
#[derive(Debug, derive_more::Error, derive_more::Display, derive_more::From)]
pub enum ApiClientError {
    /// Network, timeout, or connection failure reported by the transport.
    ///
    /// Surfaced verbatim, never retried by this crate.
    Transport(TransportError),

    /// URL parsing error when constructing request URLs.
    ///
    /// Occurs when the base URL or the expanded path create an invalid URL.
    UrlError(url::ParseError),

    /// Invalid HTTP header name.
    ///
    /// Occurs when attempting to create headers with invalid names.
    InvalidHeaderName(http::header::InvalidHeaderName),

    /// Invalid HTTP header value.
    ///
    /// Occurs when header values contain invalid characters.
    InvalidHeaderValue(http::header::InvalidHeaderValue),

    /// JSON serialization error.
    ///
    /// Occurs when working with JSON request bodies or parameter bags.
    JsonValueError(serde_json::Error),

    /// Query parameter serialization error.
    ///
    /// Occurs when converting query parameters to a URL query string.
    QuerySerializationError(serde_urlencoded::ser::Error),

    /// Authentication data cannot be rendered as a header.
    Authentication(AuthenticationError),

    /// Required parameters are absent or null.
    ///
    /// Detected before any request is built; nothing was sent.
    #[display("Missing required parameters: {}", missing.join(", "))]
    #[from(skip)]
    MissingRequiredParameters {
        /// Names of the missing parameters, in declaration order.
        missing: Vec<String>,
    },

    /// Path template contains unresolved parameters.
    ///
    /// Indicates a defect in the calling binding: a declared placeholder was not supplied.
    #[display("Path '{path}' is missing required arguments: {missings:?}")]
    #[from(skip)]
    PathUnresolved {
        /// The path template that couldn't be resolved.
        path: String,
        /// List of missing parameter names.
        missings: Vec<String>,
    },

    /// Invalid base URL configuration.
    #[display("Invalid base URL: {error}")]
    #[from(skip)]
    InvalidBaseUrl {
        /// Description of why the base URL is invalid.
        error: String,
    },

    /// Parameter value cannot be converted to the required format.
    #[display("Unsupported parameter value: {message}. Got: {value}")]
    #[from(skip)]
    UnsupportedParameterValue {
        /// Specific error message describing the conversion failure.
        message: String,
        /// The value that failed to convert.
        value: serde_json::Value,
    },

    /// JSON response deserialization failure.
    ///
    /// Occurs when the response body cannot be parsed as the expected JSON structure.
    #[display("Failed to deserialize JSON at '{path}': {error}\n{body}")]
    #[from(skip)]
    JsonError {
        /// The JSON path where the error occurred.
        path: String,
        /// The underlying JSON parsing error.
        error: serde_json::Error,
        /// The response body that failed to parse.
        body: String,
    },

    /// Response body is not JSON.
    #[display("Unsupported output for {name} as JSON:\n{body:?}")]
    #[from(skip)]
    UnsupportedJsonOutput {
        /// The actual response body received.
        body: ResponseBody,
        /// Name of the target type.
        name: &'static str,
    },

    /// The remote endpoint answered with a non-2xx status.
    ///
    /// The parsed error body is attached; this is never raised as a panic.
    #[display("Remote error {status}: {message}")]
    #[from(skip)]
    Remote {
        /// The HTTP status code received.
        status: StatusCode,
        /// Error message extracted from the body, or the status reason.
        message: String,
        /// The parsed error body.
        body: ResponseBody,
        /// The response headers.
        headers: HeaderMap,
    },
}

impl ApiClientError {
    /// Returns the remote status code, if the error comes from a remote response.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the missing parameter names, if the error comes from validation.
    pub fn missing_parameters(&self) -> Option<&[String]> {
        match self {
            Self::MissingRequiredParameters { missing } => Some(missing),
            _ => None,
        }
    }
}
