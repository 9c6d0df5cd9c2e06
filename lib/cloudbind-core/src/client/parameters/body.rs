use bytes::Bytes;
use headers::ContentType;
use serde::Serialize;

use crate::client::ApiClientError;

/// A serialized request body with its content type.
///
/// Multipart payloads are described by [`MultipartForm`](super::MultipartForm) instead, because
/// their fields may be streams that are only read by the transport.
#[derive(Clone, PartialEq, derive_more::Debug)]
pub struct CallBody {
    content_type: ContentType,
    #[debug(ignore)]
    data: Bytes,
}

impl CallBody {
    /// Creates an `application/json` body.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use cloudbind_core::CallBody;
    /// # use serde::Serialize;
    /// #[derive(Serialize)]
    /// struct TranslateRequest {
    ///     text: Vec<String>,
    ///     model_id: String,
    /// }
    ///
    /// let body = CallBody::json(&TranslateRequest {
    ///     text: vec!["Hello".to_string()],
    ///     model_id: "en-es".to_string(),
    /// })?;
    /// # Ok::<(), cloudbind_core::ApiClientError>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Fails if the value cannot be serialized.
    pub fn json<T>(value: &T) -> Result<Self, ApiClientError>
    where
        T: Serialize + ?Sized,
    {
        let data = serde_json::to_vec(value)?;
        Ok(Self::raw(data, ContentType::json()))
    }

    /// Creates an `application/x-www-form-urlencoded` body.
    ///
    /// # Errors
    ///
    /// Fails if the value is not a flat map or struct.
    pub fn form<T>(value: &T) -> Result<Self, ApiClientError>
    where
        T: Serialize + ?Sized,
    {
        let data = serde_urlencoded::to_string(value)?;
        Ok(Self::raw(data, ContentType::form_url_encoded()))
    }

    /// Creates a body with a custom content type.
    ///
    /// ```rust
    /// use cloudbind_core::CallBody;
    /// use headers::ContentType;
    ///
    /// let body = CallBody::raw(vec![0xFF, 0xFE], ContentType::octet_stream());
    /// ```
    pub fn raw(data: impl Into<Bytes>, content_type: ContentType) -> Self {
        Self {
            content_type,
            data: data.into(),
        }
    }

    /// Creates a `text/plain` body.
    pub fn text(text: impl Into<String>) -> Self {
        Self::raw(text.into(), ContentType::text())
    }

    /// The default content type of the body.
    pub fn content_type(&self) -> &ContentType {
        &self.content_type
    }

    /// The serialized payload.
    pub fn data(&self) -> &Bytes {
        &self.data
    }
}
