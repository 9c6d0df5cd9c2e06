use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use http::HeaderValue;
use http::header::{AUTHORIZATION, HeaderName};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// User name sent with an API key through basic authentication.
pub const APIKEY_USERNAME: &str = "apikey";

/// Errors raised while rendering credentials into a request header.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Error, derive_more::Display)]
pub enum AuthenticationError {
    /// Bearer token contains invalid characters for HTTP headers.
    #[display("Bearer token contains invalid characters: {message}")]
    InvalidBearerToken {
        /// Description of the invalid characters or format issue.
        message: String,
    },

    /// Basic authentication username contains invalid characters.
    #[display("Basic auth username contains invalid characters: {message}")]
    InvalidUsername {
        /// Description of the invalid characters or format issue.
        message: String,
    },

    /// Basic authentication password contains invalid characters.
    #[display("Basic auth password contains invalid characters: {message}")]
    InvalidPassword {
        /// Description of the invalid characters or format issue.
        message: String,
    },

    /// Credential header name is invalid.
    #[display("Invalid credential header name '{header_name}': {message}")]
    InvalidHeaderName {
        /// The invalid header name that was provided.
        header_name: String,
        /// Description of why the header name is invalid.
        message: String,
    },

    /// Credential value contains invalid characters for HTTP headers.
    #[display("Credential contains invalid characters: {message}")]
    InvalidCredential {
        /// Description of the invalid characters or format issue.
        message: String,
    },

    /// A credential is configured but empty.
    #[display("Empty credential: {field}")]
    EmptyCredential {
        /// The empty field.
        field: &'static str,
    },
}

/// Secret string wiped from memory on drop, and never printed in full.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SecureString(String);

impl SecureString {
    /// Wraps a secret value.
    pub fn new(value: String) -> Self {
        Self(value)
    }

    /// Returns the secret value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the secret is empty or only whitespace.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    fn masked(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        if chars.len() <= 8 {
            return "***".to_string();
        }
        let head: String = chars.iter().take(4).collect();
        let tail: String = chars.iter().skip(chars.len() - 4).collect();
        format!("{head}...{tail}")
    }
}

impl fmt::Debug for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecureString")
            .field("value", &"[REDACTED]")
            .finish()
    }
}

impl fmt::Display for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.masked())
    }
}

impl From<String> for SecureString {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for SecureString {
    fn from(value: &str) -> Self {
        Self::new(value.to_string())
    }
}

impl Serialize for SecureString {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SecureString {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        String::deserialize(deserializer).map(Self::new)
    }
}

/// Credentials of a service instance.
///
/// Configured once on the client and rendered into a single request header. A call may
/// replace them or drop them (see `ServiceCall::with_authentication`).
///
/// # Examples
///
/// ```rust
/// use cloudbind_core::Authentication;
///
/// // Service API key, sent as basic auth with the `apikey` user
/// let auth = Authentication::api_key("my-service-key");
///
/// // Pre-acquired access token
/// let auth = Authentication::Bearer("eyJhbGciOi...".into());
///
/// // Custom header
/// let auth = Authentication::Header {
///     header_name: "X-Api-Key".to_string(),
///     value: "secret-key".into(),
/// };
/// ```
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Authentication {
    /// `Authorization: Bearer <token>`
    Bearer(SecureString),

    /// `Authorization: Basic <base64(username:password)>`
    Basic {
        /// The user name, must not contain `:`.
        username: String,
        /// The password.
        password: SecureString,
    },

    /// `<header_name>: <value>`
    Header {
        /// The header name.
        header_name: String,
        /// The header value.
        value: SecureString,
    },
}

impl Authentication {
    /// API key credentials: basic authentication with the [`APIKEY_USERNAME`] user.
    pub fn api_key(key: impl Into<SecureString>) -> Self {
        Self::Basic {
            username: APIKEY_USERNAME.to_string(),
            password: key.into(),
        }
    }

    /// Renders the credentials as a request header.
    ///
    /// # Errors
    ///
    /// Fails when a credential is empty or cannot be carried by an HTTP header.
    pub fn to_header(&self) -> Result<(HeaderName, HeaderValue), AuthenticationError> {
        match self {
            Self::Bearer(token) => {
                if token.is_blank() {
                    return Err(AuthenticationError::EmptyCredential { field: "token" });
                }
                let value = HeaderValue::from_str(&format!("Bearer {}", token.as_str()))
                    .map_err(|err| AuthenticationError::InvalidBearerToken {
                        message: err.to_string(),
                    })?;
                Ok((AUTHORIZATION, value))
            }

            Self::Basic { username, password } => {
                if username.contains(':') {
                    return Err(AuthenticationError::InvalidUsername {
                        message: "Username cannot contain colon (:) character".to_string(),
                    });
                }
                if password.is_blank() {
                    return Err(AuthenticationError::EmptyCredential { field: "password" });
                }
                let credentials = STANDARD.encode(format!("{username}:{}", password.as_str()));
                let value = HeaderValue::from_str(&format!("Basic {credentials}")).map_err(
                    |err| AuthenticationError::InvalidPassword {
                        message: err.to_string(),
                    },
                )?;
                Ok((AUTHORIZATION, value))
            }

            Self::Header { header_name, value } => {
                let name = HeaderName::from_bytes(header_name.as_bytes()).map_err(|err| {
                    AuthenticationError::InvalidHeaderName {
                        header_name: header_name.clone(),
                        message: err.to_string(),
                    }
                })?;
                let value = HeaderValue::from_str(value.as_str()).map_err(|err| {
                    AuthenticationError::InvalidCredential {
                        message: err.to_string(),
                    }
                })?;
                Ok((name, value))
            }
        }
    }
}

impl fmt::Debug for Authentication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bearer(_) => f.debug_tuple("Bearer").field(&"[REDACTED]").finish(),
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"[REDACTED]")
                .finish(),
            Self::Header { header_name, .. } => f
                .debug_struct("Header")
                .field("header_name", header_name)
                .field("value", &"[REDACTED]")
                .finish(),
        }
    }
}

impl fmt::Display for Authentication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bearer(token) => write!(f, "Bearer {token}"),
            Self::Basic { username, .. } => write!(f, "Basic (username: {username})"),
            Self::Header { header_name, value } => write!(f, "Header ({header_name}: {value})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_render_bearer_header() {
        let auth = Authentication::Bearer("my-secret-token".into());

        let (name, value) = auth.to_header().expect("valid token");

        assert_eq!(name, AUTHORIZATION);
        assert_eq!(value, "Bearer my-secret-token");
    }

    #[test]
    fn should_render_api_key_as_basic() {
        let auth = Authentication::api_key("key");

        let (name, value) = auth.to_header().expect("valid key");

        assert_eq!(name, AUTHORIZATION);
        // base64("apikey:key")
        assert_eq!(value, "Basic YXBpa2V5OmtleQ==");
    }

    #[test]
    fn should_render_custom_header() {
        let auth = Authentication::Header {
            header_name: "X-Api-Key".to_string(),
            value: "secret-key-123".into(),
        };

        let (name, value) = auth.to_header().expect("valid header");

        assert_eq!(name, "x-api-key");
        assert_eq!(value, "secret-key-123");
    }

    #[test]
    fn should_mask_secrets_in_display() {
        let auth = Authentication::Bearer("very-secret-token-12345".into());
        assert_eq!(auth.to_string(), "Bearer very...2345");

        let auth = Authentication::api_key("short");
        assert_eq!(auth.to_string(), "Basic (username: apikey)");

        let auth = Authentication::Header {
            header_name: "X-Api-Key".to_string(),
            value: "clé-secrète-éèà".into(),
        };
        assert_eq!(auth.to_string(), "Header (X-Api-Key: clé-...-éèà)");
    }

    #[test]
    fn should_redact_debug() {
        let auth = Authentication::api_key("secret-password");

        let debug = format!("{auth:?}");

        insta::assert_snapshot!(debug, @r#"Basic { username: "apikey", password: "[REDACTED]" }"#);
    }

    #[test]
    fn should_reject_invalid_credentials() {
        let result = Authentication::Bearer("\0invalid".into()).to_header();
        assert!(matches!(
            result,
            Err(AuthenticationError::InvalidBearerToken { .. })
        ));

        let result = Authentication::Basic {
            username: "user:invalid".to_string(),
            password: "password".into(),
        }
        .to_header();
        assert!(matches!(
            result,
            Err(AuthenticationError::InvalidUsername { .. })
        ));

        let result = Authentication::Header {
            header_name: "Invalid Header".to_string(),
            value: "key".into(),
        }
        .to_header();
        assert!(matches!(
            result,
            Err(AuthenticationError::InvalidHeaderName { .. })
        ));
    }

    #[test]
    fn should_reject_empty_credentials() {
        let result = Authentication::api_key("  ").to_header();

        insta::assert_snapshot!(result.expect_err("empty key"), @"Empty credential: password");
    }

    #[test]
    fn should_serialize_credentials() {
        let auth = Authentication::api_key("key");

        let json = serde_json::to_string(&auth).expect("serialize");

        assert_eq!(json, r#"{"basic":{"username":"apikey","password":"key"}}"#);
    }
}
