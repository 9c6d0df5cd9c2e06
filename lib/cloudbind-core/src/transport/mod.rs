//! The transport seam between request descriptors and network I/O.
//!
//! The core never performs I/O itself: a [`RequestDescriptor`](crate::RequestDescriptor) is
//! handed to a [`Transport`] which completes exactly once, either with a [`RawResponse`] or a
//! [`TransportError`]. [`ReqwestTransport`] is the production implementation.

use std::fmt::Debug;
use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use http::{HeaderMap, StatusCode};

use crate::client::RequestDescriptor;

mod reqwest_transport;
pub use self::reqwest_transport::ReqwestTransport;

/// A stream of response body chunks.
pub type ResponseStream = Pin<Box<dyn Stream<Item = Result<Bytes, TransportError>> + Send>>;

/// Failures of the transport collaborator.
#[derive(Debug, derive_more::Error, derive_more::Display, derive_more::From)]
pub enum TransportError {
    /// Error from the underlying reqwest client.
    Reqwest(reqwest::Error),

    /// Failure reported by a custom transport.
    #[display("Transport failure: {message}")]
    #[from(skip)]
    Other {
        /// Description of the failure.
        message: String,
    },
}

impl TransportError {
    /// Creates a failure for transports that are not backed by reqwest.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Returns true if the failure is a timeout.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Reqwest(error) => error.is_timeout(),
            Self::Other { .. } => false,
        }
    }

    /// Returns true if the failure happened while connecting.
    pub fn is_connect(&self) -> bool {
        match self {
            Self::Reqwest(error) => error.is_connect(),
            Self::Other { .. } => false,
        }
    }
}

/// A fully received HTTP response, before any content negotiation.
#[derive(Debug, Clone)]
pub struct RawResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl RawResponse {
    /// Creates a raw response.
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// Returns the HTTP status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the raw body bytes.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub(crate) fn into_parts(self) -> (StatusCode, HeaderMap, Bytes) {
        (self.status, self.headers, self.body)
    }
}

/// A response whose body is still being received.
///
/// The caller is responsible for consuming the stream.
#[derive(derive_more::Debug)]
pub struct StreamingResponse {
    status: StatusCode,
    headers: HeaderMap,
    #[debug(skip)]
    stream: ResponseStream,
}

impl StreamingResponse {
    /// Creates a streaming response.
    pub fn new(status: StatusCode, headers: HeaderMap, stream: ResponseStream) -> Self {
        Self {
            status,
            headers,
            stream,
        }
    }

    /// Returns the HTTP status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Gives up the status and headers, keeping the body stream.
    pub fn into_stream(self) -> ResponseStream {
        self.stream
    }
}

/// Performs the network I/O for request descriptors.
///
/// Implementations must complete each call exactly once. They own cancellation, timeouts and
/// connection management; the core adds none of these.
#[async_trait]
pub trait Transport: Debug + Send + Sync {
    /// Sends the request and waits for the full response body.
    async fn send(&self, request: RequestDescriptor) -> Result<RawResponse, TransportError>;

    /// Sends the request and returns as soon as the response head is available.
    async fn send_streaming(
        &self,
        request: RequestDescriptor,
    ) -> Result<StreamingResponse, TransportError>;
}
