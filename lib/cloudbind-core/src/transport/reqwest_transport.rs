use async_trait::async_trait;
use futures::TryStreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Request};

use super::{RawResponse, StreamingResponse, Transport, TransportError};
use crate::client::{FieldData, MultipartField, MultipartForm, RequestBody, RequestDescriptor};

/// Production transport over a [`reqwest::Client`].
///
/// Timeouts, proxies, TLS and connection pooling are configured on the reqwest client.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Wraps a configured reqwest client.
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// The underlying reqwest client.
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    fn build_request(&self, request: RequestDescriptor) -> Result<Request, TransportError> {
        let (method, url, headers, body) = request.into_parts();
        let builder = self.client.request(method, url).headers(headers);

        let builder = match body {
            RequestBody::Empty => builder,
            RequestBody::Payload(payload) => builder.body(Body::from(payload.data().clone())),
            RequestBody::Multipart(form) => builder.multipart(to_form(form)?),
        };

        Ok(builder.build()?)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: RequestDescriptor) -> Result<RawResponse, TransportError> {
        let request = self.build_request(request)?;
        let response = self.client.execute(request).await?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        Ok(RawResponse::new(status, headers, body))
    }

    async fn send_streaming(
        &self,
        request: RequestDescriptor,
    ) -> Result<StreamingResponse, TransportError> {
        let request = self.build_request(request)?;
        let response = self.client.execute(request).await?;

        let status = response.status();
        let headers = response.headers().clone();
        let stream = response.bytes_stream().map_err(TransportError::from);

        Ok(StreamingResponse::new(status, headers, Box::pin(stream)))
    }
}

fn to_form(form: MultipartForm) -> Result<Form, TransportError> {
    let mut result = Form::new();
    for (name, field) in form {
        if let Some(part) = to_part(field)? {
            result = result.part(name, part);
        }
    }
    Ok(result)
}

fn to_part(field: MultipartField) -> Result<Option<Part>, TransportError> {
    let (data, content_type, filename) = field.into_parts();
    let Some(data) = data else {
        return Ok(None);
    };

    let (part, default_content_type) = match data {
        FieldData::Stream(stream) => (Part::stream(Body::wrap_stream(stream)), None),
        FieldData::Json(json) => (Part::text(json.to_string()), Some(mime::APPLICATION_JSON)),
        FieldData::Text(text) => (Part::text(text), None),
        FieldData::Bytes(bytes) => (Part::bytes(bytes.to_vec()), None),
    };

    let part = match content_type.or(default_content_type) {
        Some(content_type) => part.mime_str(content_type.as_ref())?,
        None => part,
    };
    let part = match filename {
        Some(filename) => part.file_name(filename),
        None => part,
    };

    Ok(Some(part))
}
