use std::sync::Arc;

use http::Method;

mod builder;
pub use self::builder::{ServiceClientBuilder, VERSION_PARAM};

mod call;
pub use self::call::{ServiceCall, StreamingCall};

mod parameters;
pub use self::parameters::{
    CallBody, CallHeaders, CallPath, CallQuery, FieldData, FieldStream, MultipartField,
    MultipartForm, Params, QueryStyle, ensure_required, expand_path, validate_required,
};

mod options;
pub use self::options::{AuthenticationOverride, CallOptions, DefaultOptions, RequestOptions};

mod descriptor;
pub use self::descriptor::{CallParts, RequestBody, RequestDescriptor};

mod dispatch;
pub use self::dispatch::Dispatcher;

mod endpoint;
pub use self::endpoint::{Endpoint, EndpointParam, ParamLocation};

mod response;
pub use self::response::{ResponseBody, ServiceResponse};

mod auth;
pub use self::auth::{APIKEY_USERNAME, Authentication, AuthenticationError, SecureString};

mod error;
pub use self::error::ApiClientError;

/// Client of one service instance, shared by the generated binding methods.
///
/// `ServiceClient` holds the service-wide [`DefaultOptions`] and the [`Dispatcher`]. It is cheap
/// to clone and can be used from concurrent tasks: every call owns its own parameters, and the
/// defaults are never mutated after [`ServiceClientBuilder::build`].
///
/// # Example
///
/// ```rust,no_run
/// use cloudbind_core::{Authentication, Params, ServiceClient};
/// # use serde::Deserialize;
/// # #[derive(Deserialize)]
/// # struct TranslationResult { word_count: u32 }
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ServiceClient::builder()
///     .with_base_url("https://translator.example.com")
///     .with_authentication(Authentication::api_key("my-service-key"))
///     .with_version("2018-05-01")
///     .build()?;
///
/// let params = Params::new().with("text", vec!["Hello"]).with("model_id", "en-es");
/// let result: TranslationResult = client
///     .post("/v3/translate")
///     .with_required(Some(&params), &["text"])
///     .json(&params.get("text"))?
///     .await?
///     .as_json()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ServiceClient {
    defaults: Arc<DefaultOptions>,
    dispatcher: Dispatcher,
}

// Create
impl ServiceClient {
    /// Creates a builder with the default configuration.
    pub fn builder() -> ServiceClientBuilder {
        ServiceClientBuilder::default()
    }

    pub(in crate::client) fn new(defaults: DefaultOptions, dispatcher: Dispatcher) -> Self {
        Self {
            defaults: Arc::new(defaults),
            dispatcher,
        }
    }

    /// The service-wide options.
    pub fn defaults(&self) -> &DefaultOptions {
        &self.defaults
    }

    /// The dispatcher used by every call.
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }
}

// Calls
impl ServiceClient {
    /// Starts a call with any method.
    pub fn call(&self, method: Method, path: impl Into<CallPath>) -> ServiceCall {
        ServiceCall::new(
            self.dispatcher.clone(),
            Arc::clone(&self.defaults),
            method,
            path.into(),
        )
    }

    /// Starts a `GET` call.
    pub fn get(&self, path: impl Into<CallPath>) -> ServiceCall {
        self.call(Method::GET, path)
    }

    /// Starts a `POST` call.
    pub fn post(&self, path: impl Into<CallPath>) -> ServiceCall {
        self.call(Method::POST, path)
    }

    /// Starts a `PUT` call.
    pub fn put(&self, path: impl Into<CallPath>) -> ServiceCall {
        self.call(Method::PUT, path)
    }

    /// Starts a `DELETE` call.
    pub fn delete(&self, path: impl Into<CallPath>) -> ServiceCall {
        self.call(Method::DELETE, path)
    }

    /// Starts a `PATCH` call.
    pub fn patch(&self, path: impl Into<CallPath>) -> ServiceCall {
        self.call(Method::PATCH, path)
    }

    /// Starts a `HEAD` call.
    pub fn head(&self, path: impl Into<CallPath>) -> ServiceCall {
        self.call(Method::HEAD, path)
    }

    /// Starts a call of an endpoint that takes no parameters.
    ///
    /// Endpoints with required parameters fail when the call runs, listing all of them.
    pub fn invoke(&self, endpoint: &Endpoint) -> ServiceCall {
        self.invoke_with(endpoint, Params::new())
    }

    /// Starts a call of an endpoint, validating and routing the parameter bag.
    ///
    /// Every declared parameter goes to its [`ParamLocation`]. Further options (extra headers,
    /// streamed multipart fields, credentials) can still be set on the returned call.
    ///
    /// ```rust,no_run
    /// use cloudbind_core::{Endpoint, EndpointParam, Params, ServiceClient};
    /// use http::Method;
    ///
    /// const DELETE_MODEL: Endpoint = Endpoint {
    ///     method: Method::DELETE,
    ///     path: "/v3/models/{model_id}",
    ///     required: &["model_id"],
    ///     params: &[EndpointParam::path("model_id")],
    /// };
    ///
    /// # async fn example(client: ServiceClient) -> Result<(), cloudbind_core::ApiClientError> {
    /// let params = Params::new().with("model_id", "custom-en-es");
    /// let response = client.invoke_with(&DELETE_MODEL, params).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn invoke_with(&self, endpoint: &Endpoint, params: Params) -> ServiceCall {
        self.call(endpoint.method.clone(), endpoint.path)
            .route(endpoint, params)
    }
}
