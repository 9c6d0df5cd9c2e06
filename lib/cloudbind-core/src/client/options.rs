use url::Url;

use super::auth::{Authentication, AuthenticationError};
use super::{ApiClientError, CallHeaders, CallQuery};

/// Service-wide configuration shared by every call of a client.
///
/// Built and validated once by [`ServiceClientBuilder`](super::ServiceClientBuilder), then
/// shared read-only between calls. Per-call overlays never mutate it.
#[derive(Debug, Clone)]
pub struct DefaultOptions {
    pub(in crate::client) base_url: Url,
    pub(in crate::client) authentication: Option<Authentication>,
    pub(in crate::client) headers: CallHeaders,
    pub(in crate::client) query: CallQuery,
}

impl DefaultOptions {
    /// Default options for a service at the given base URL.
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            authentication: None,
            headers: CallHeaders::new(),
            query: CallQuery::new(),
        }
    }

    /// The base URL of the service instance.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The default credentials.
    pub fn authentication(&self) -> Option<&Authentication> {
        self.authentication.as_ref()
    }

    /// Headers sent with every call.
    pub fn headers(&self) -> &CallHeaders {
        &self.headers
    }

    /// Query parameters sent with every call, like the service `version` date.
    pub fn query(&self) -> &CallQuery {
        &self.query
    }
}

/// How a call treats the default credentials.
#[derive(Debug, Clone, Default)]
pub enum AuthenticationOverride {
    /// Use the client credentials.
    #[default]
    Inherit,
    /// Use these credentials for this call only.
    Replace(Authentication),
    /// Send this call without credentials.
    Disabled,
}

/// The per-call overlay merged on top of [`DefaultOptions`].
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    /// Call headers, winning over default headers and the credential header.
    pub headers: CallHeaders,
    /// Call query parameters, winning over default query parameters.
    pub query: CallQuery,
    /// Credential override.
    pub authentication: AuthenticationOverride,
}

/// The effective headers and query of one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOptions {
    /// Final headers.
    pub headers: CallHeaders,
    /// Final query parameters.
    pub query: CallQuery,
}

impl RequestOptions {
    /// Merges a call overlay on top of the defaults.
    ///
    /// Headers are layered as default headers, then the credential header, then call headers.
    /// Query parameters of the call win over the defaults. Merging is pure: the defaults are
    /// left untouched and the same inputs always give the same result.
    ///
    /// # Errors
    ///
    /// Fails if the effective credentials cannot be rendered as a header.
    pub fn merge(defaults: &DefaultOptions, call: &CallOptions) -> Result<Self, ApiClientError> {
        let authentication = match &call.authentication {
            AuthenticationOverride::Inherit => defaults.authentication.as_ref(),
            AuthenticationOverride::Replace(authentication) => Some(authentication),
            AuthenticationOverride::Disabled => None,
        };

        let mut headers = defaults.headers.clone();
        if let Some(authentication) = authentication {
            let (name, value) = authentication.to_header()?;
            let value = value
                .to_str()
                .map_err(|err| AuthenticationError::InvalidCredential {
                    message: err.to_string(),
                })?;
            headers = headers.merge(CallHeaders::new().add_header(name.as_str(), value));
        }
        let headers = headers.merge(call.headers.clone());

        let query = defaults.query.clone().merge(call.query.clone());

        Ok(Self { headers, query })
    }
}
