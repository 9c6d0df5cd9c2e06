//! # Cloudbind Core
//!
//! Request construction and dispatch for generated cloud service bindings.
//!
//! Each generated binding method is a thin typed wrapper: it checks that the required
//! parameters are present, then hands the call to this crate, which
//!
//! - expands the path template with percent-encoded values ([`expand_path`], [`CallPath`]),
//! - merges the call headers and query over the service-wide [`DefaultOptions`],
//! - builds a single [`RequestDescriptor`] (URL, headers, JSON or multipart body),
//! - sends it through a [`Transport`](transport::Transport) and adapts the outcome.
//!
//! A call completes exactly once, either awaited, through a callback
//! ([`ServiceCall::send_with`]), or as a raw byte stream ([`ServiceCall::into_stream`]).
//! When required parameters are missing, the transport is never invoked.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cloudbind_core::{Authentication, ServiceClient};
//! # use serde::Deserialize;
//! # #[derive(Deserialize)]
//! # struct Models { models: Vec<serde_json::Value> }
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ServiceClient::builder()
//!     .with_base_url("https://translator.example.com/instances/42")
//!     .with_authentication(Authentication::api_key("my-service-key"))
//!     .with_version("2018-05-01")
//!     .build()?;
//!
//! // Direct await using IntoFuture
//! let models: Models = client
//!     .get("/v3/models")
//!     .with_query_param("source", "en")
//!     .with_query_param("target", None::<String>)
//!     .await?
//!     .as_json()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Declarative endpoints
//!
//! Generated methods describe their endpoint once and route a [`Params`] bag through
//! [`ServiceClient::invoke_with`]:
//!
//! ```rust,no_run
//! use cloudbind_core::{Endpoint, EndpointParam, ServiceClient, params};
//! use http::Method;
//!
//! const TRANSLATE: Endpoint = Endpoint {
//!     method: Method::POST,
//!     path: "/v3/translate",
//!     required: &["text"],
//!     params: &[
//!         EndpointParam::body_field("text"),
//!         EndpointParam::body_field("model_id"),
//!         EndpointParam::body_field("source"),
//!         EndpointParam::body_field("target"),
//!     ],
//! };
//!
//! # async fn example(client: ServiceClient) -> Result<(), cloudbind_core::ApiClientError> {
//! let response = client
//!     .invoke_with(&TRANSLATE, params! { "text" => ["Hello"], "model_id" => "en-es" })
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! All commonly used types are re-exported from the crate root for convenience.

mod client;

pub mod transport;

pub use self::client::{
    APIKEY_USERNAME, ApiClientError, Authentication, AuthenticationError, AuthenticationOverride,
    CallBody, CallHeaders, CallOptions, CallParts, CallPath, CallQuery, DefaultOptions,
    Dispatcher, Endpoint, EndpointParam, FieldData, FieldStream, MultipartField, MultipartForm,
    ParamLocation, Params, QueryStyle, RequestBody, RequestDescriptor, RequestOptions,
    ResponseBody, SecureString, ServiceCall, ServiceClient, ServiceClientBuilder,
    ServiceResponse, StreamingCall, VERSION_PARAM, ensure_required, expand_path,
    validate_required,
};

/// Creates a [`Params`] bag from `name => value` pairs.
///
/// Values can be anything implementing `serde::Serialize`; `None` values are recorded as
/// absent.
///
/// # Examples
///
/// ```rust
/// use cloudbind_core::params;
///
/// let params = params! {
///     "environment_id" => "env",
///     "collection_id" => "col",
///     "count" => 10,
///     "filter" => None::<String>,
/// };
///
/// assert!(params.is_present("count"));
/// assert!(!params.is_present("filter"));
///
/// let empty = params! {};
/// assert!(empty.is_empty());
/// ```
#[macro_export]
macro_rules! params {
    () => {
        $crate::Params::new()
    };

    ($($name:expr => $value:expr),+ $(,)?) => {
        $crate::Params::new()
            $(.with($name, $value))+
    };
}

#[cfg(test)]
mod macro_tests {
    use serde_json::json;

    #[test]
    fn test_params_macro_keeps_order() {
        let params = params! { "b" => 1, "a" => "two", "c" => [3] };

        let names: Vec<_> = params.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
        assert_eq!(params.get("c"), Some(&json!([3])));
    }

    #[test]
    fn test_params_macro_trailing_comma() {
        let params = params! {
            "text" => "Hello",
        };

        assert!(params.is_present("text"));
    }
}
