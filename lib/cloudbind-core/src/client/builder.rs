use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;
use url::Url;

use super::dispatch::Dispatcher;
use super::options::DefaultOptions;
use super::{ApiClientError, Authentication, CallHeaders, CallQuery, ServiceClient};
use crate::transport::{ReqwestTransport, Transport};

/// Query parameter holding the API version date of a service.
pub const VERSION_PARAM: &str = "version";

/// Builder for creating `ServiceClient` instances.
///
/// # Default Configuration
///
/// - **Base URL**: `http://127.0.0.1/`
/// - **Authentication**: None
/// - **User-Agent**: `cloudbind/<crate version>`
/// - **Transport**: [`ReqwestTransport`] over a default `reqwest::Client`
///
/// # Example
///
/// ```rust
/// use cloudbind_core::{Authentication, ServiceClient};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ServiceClient::builder()
///     .with_base_url("https://api.us-south.language-translator.example.com/instances/42")
///     .with_authentication(Authentication::api_key("my-service-key"))
///     .with_version("2018-05-01")
///     .with_header("X-Watson-Learning-Opt-Out", true)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ServiceClientBuilder {
    base_url: String,
    authentication: Option<Authentication>,
    headers: CallHeaders,
    query: CallQuery,
    user_agent: String,
    transport: Option<Arc<dyn Transport>>,
    client: Option<reqwest::Client>,
}

impl ServiceClientBuilder {
    /// Reads the configuration of `service_name` from the environment.
    ///
    /// See [`from_lookup`](Self::from_lookup) for the variables.
    pub fn from_env(service_name: &str) -> Self {
        Self::from_lookup(service_name, |key| std::env::var(key).ok())
    }

    /// Reads the configuration of `service_name` from a key lookup.
    ///
    /// The service name is upper-cased with `-` replaced by `_`, then these keys are read:
    ///
    /// - `<NAME>_URL`: the base URL
    /// - `<NAME>_BEARER_TOKEN`: bearer credentials
    /// - `<NAME>_APIKEY`: API key credentials, used when no bearer token is set
    /// - `<NAME>_USERNAME` and `<NAME>_PASSWORD`: basic credentials, used when neither of
    ///   the above is set
    ///
    /// ```rust
    /// use std::collections::HashMap;
    /// use cloudbind_core::ServiceClientBuilder;
    ///
    /// let env = HashMap::from([
    ///     ("LANGUAGE_TRANSLATOR_URL", "https://translator.example.com"),
    ///     ("LANGUAGE_TRANSLATOR_APIKEY", "my-key"),
    /// ]);
    /// let builder = ServiceClientBuilder::from_lookup("language-translator", |key| {
    ///     env.get(key).map(ToString::to_string)
    /// });
    /// ```
    pub fn from_lookup<F>(service_name: &str, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let prefix = service_name.to_uppercase().replace('-', "_");
        let read = |suffix: &str| {
            lookup(&format!("{prefix}_{suffix}")).filter(|value| !value.trim().is_empty())
        };

        let mut result = Self::default();
        if let Some(base_url) = read("URL") {
            result.base_url = base_url;
        }

        let authentication = if let Some(token) = read("BEARER_TOKEN") {
            Some(Authentication::Bearer(token.into()))
        } else if let Some(key) = read("APIKEY") {
            Some(Authentication::api_key(key))
        } else if let (Some(username), Some(password)) = (read("USERNAME"), read("PASSWORD")) {
            Some(Authentication::Basic {
                username,
                password: password.into(),
            })
        } else {
            None
        };
        debug!(service = %prefix, ?authentication, base_url = %result.base_url, "configuration from environment");
        result.authentication = authentication;
        result
    }

    /// Builds the final `ServiceClient`.
    ///
    /// # Errors
    ///
    /// Fails with [`ApiClientError::InvalidBaseUrl`] when the base URL cannot be used, and
    /// with [`ApiClientError::Authentication`] when the credentials cannot be rendered.
    pub fn build(self) -> Result<ServiceClient, ApiClientError> {
        let Self {
            base_url,
            authentication,
            headers,
            query,
            user_agent,
            transport,
            client,
        } = self;

        let base_url = parse_base_url(&base_url)?;
        if let Some(authentication) = &authentication {
            authentication.to_header()?;
        }

        let headers = CallHeaders::new()
            .add_header("User-Agent", user_agent)
            .merge(headers);
        // Invalid default headers are rejected at build time.
        headers.to_header_map()?;

        let transport = transport.unwrap_or_else(|| {
            Arc::new(ReqwestTransport::new(client.unwrap_or_default())) as Arc<dyn Transport>
        });

        let defaults = DefaultOptions {
            base_url,
            authentication,
            headers,
            query,
        };

        Ok(ServiceClient::new(defaults, Dispatcher::new(transport)))
    }

    /// Sets the service instance URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the default credentials.
    pub fn with_authentication(mut self, authentication: Authentication) -> Self {
        self.authentication = Some(authentication);
        self
    }

    /// Adds a header sent with every call. `None` values are ignored.
    pub fn with_header<T: Serialize>(mut self, name: impl Into<String>, value: T) -> Self {
        self.headers = self.headers.add_header(name, value);
        self
    }

    /// Adds a query parameter sent with every call. `None` values are ignored.
    pub fn with_query<T: Serialize>(mut self, name: impl Into<String>, value: T) -> Self {
        self.query = self.query.add_param(name, value);
        self
    }

    /// Sets the API version date, sent as the `version` query parameter.
    pub fn with_version(self, version: impl Into<String>) -> Self {
        self.with_query(VERSION_PARAM, version.into())
    }

    /// Replaces the default `User-Agent`.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Uses a custom transport, for instance a test double.
    pub fn with_transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Uses a configured reqwest client (timeouts, proxies, TLS) for the default transport.
    pub fn with_reqwest_client(mut self, client: reqwest::Client) -> Self {
        self.client = Some(client);
        self
    }
}

impl Default for ServiceClientBuilder {
    fn default() -> Self {
        Self {
            base_url: format!("http://{}/", IpAddr::V4(Ipv4Addr::LOCALHOST)),
            authentication: None,
            headers: CallHeaders::new(),
            query: CallQuery::new(),
            user_agent: format!("cloudbind/{}", env!("CARGO_PKG_VERSION")),
            transport: None,
            client: None,
        }
    }
}

fn parse_base_url(base_url: &str) -> Result<Url, ApiClientError> {
    let invalid = |error: String| ApiClientError::InvalidBaseUrl { error };

    if base_url.contains(['{', '}', '"']) {
        return Err(invalid(format!(
            "'{base_url}' contains braces or quotes, check the service URL"
        )));
    }
    let url = Url::parse(base_url.trim()).map_err(|err| invalid(format!("'{base_url}': {err}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!(
            "unsupported scheme '{}', expected http or https",
            url.scheme()
        )));
    }
    if url.cannot_be_a_base() || url.query().is_some() || url.fragment().is_some() {
        return Err(invalid(format!(
            "'{base_url}' must be a base URL without query or fragment"
        )));
    }
    Ok(url)
}
