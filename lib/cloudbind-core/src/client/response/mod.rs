//! Response handling: parsed bodies, typed access, and remote error adaptation.

use std::any::type_name;

use http::{HeaderMap, StatusCode};
use mime::Mime;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::ApiClientError;
use crate::transport::RawResponse;

mod body;
pub use self::body::ResponseBody;

/// A successful response: status, headers and parsed body.
///
/// This is the `(body, rawResponse)` pair delivered once per call.
#[derive(Debug, Clone)]
pub struct ServiceResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: ResponseBody,
}

impl ServiceResponse {
    /// Creates a response from its parts.
    pub fn new(status: StatusCode, headers: HeaderMap, body: ResponseBody) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// The HTTP status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The parsed `Content-Type` header.
    pub fn content_type(&self) -> Option<Mime> {
        body::content_type(&self.headers)
    }

    /// The parsed body.
    pub fn body(&self) -> &ResponseBody {
        &self.body
    }

    /// Gives up status and headers, keeping the body.
    pub fn into_body(self) -> ResponseBody {
        self.body
    }

    /// Deserializes the JSON body.
    ///
    /// # Errors
    ///
    /// Fails with [`ApiClientError::UnsupportedJsonOutput`] when the body is not JSON, and with
    /// [`ApiClientError::JsonError`] (naming the failing path) when it does not match `T`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use cloudbind_core::{ResponseBody, ServiceResponse};
    /// use http::{HeaderMap, StatusCode};
    /// use serde::Deserialize;
    ///
    /// #[derive(Deserialize)]
    /// struct IdentifiedLanguages {
    ///     languages: Vec<IdentifiedLanguage>,
    /// }
    ///
    /// #[derive(Deserialize)]
    /// struct IdentifiedLanguage {
    ///     language: String,
    ///     confidence: f64,
    /// }
    ///
    /// let body = serde_json::json!({"languages": [{"language": "fr", "confidence": 0.98}]});
    /// let response = ServiceResponse::new(StatusCode::OK, HeaderMap::new(), ResponseBody::Json(body));
    ///
    /// let result = response.as_json::<IdentifiedLanguages>()?;
    /// assert_eq!(result.languages[0].language, "fr");
    /// # Ok::<(), cloudbind_core::ApiClientError>(())
    /// ```
    pub fn as_json<T>(&self) -> Result<T, ApiClientError>
    where
        T: DeserializeOwned,
    {
        let ResponseBody::Json(json) = &self.body else {
            return Err(ApiClientError::UnsupportedJsonOutput {
                body: self.body.clone(),
                name: type_name::<T>(),
            });
        };

        serde_path_to_error::deserialize(json).map_err(|err| ApiClientError::JsonError {
            path: err.path().to_string(),
            error: err.into_inner(),
            body: json.to_string(),
        })
    }

    /// Returns the text body, if any.
    pub fn as_text(&self) -> Option<&str> {
        self.body.as_text()
    }
}

impl From<RawResponse> for ServiceResponse {
    fn from(value: RawResponse) -> Self {
        let (status, headers, body) = value.into_parts();
        let body = ResponseBody::parse(status, &headers, body);
        Self::new(status, headers, body)
    }
}

/// Keeps 2xx responses, turns any other status into [`ApiClientError::Remote`].
pub(in crate::client) fn check_status(
    response: ServiceResponse,
) -> Result<ServiceResponse, ApiClientError> {
    if response.status.is_success() {
        return Ok(response);
    }

    let ServiceResponse {
        status,
        headers,
        body,
    } = response;
    let message = remote_message(status, &body);
    Err(ApiClientError::Remote {
        status,
        message,
        body,
        headers,
    })
}

/// Error message of a remote failure.
///
/// Looks up `error`, `message`, `errorMessage`, then `errors[0].message` in a JSON body, and
/// falls back to the status reason.
fn remote_message(status: StatusCode, body: &ResponseBody) -> String {
    body.as_json()
        .and_then(|json| {
            ["/error", "/message", "/errorMessage", "/errors/0/message"]
                .into_iter()
                .find_map(|pointer| json.pointer(pointer).and_then(Value::as_str))
        })
        .map_or_else(
            || {
                status
                    .canonical_reason()
                    .unwrap_or("Unknown status")
                    .to_string()
            },
            ToString::to_string,
        )
}
