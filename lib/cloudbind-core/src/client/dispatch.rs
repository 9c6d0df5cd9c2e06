use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::debug;

use super::response::check_status;
use super::{ApiClientError, RequestDescriptor, ServiceResponse};
use crate::transport::{StreamingResponse, Transport};

/// Sends request descriptors through the transport and adapts the completion.
///
/// Cloning a dispatcher shares the transport.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    transport: Arc<dyn Transport>,
}

impl Dispatcher {
    /// Creates a dispatcher over the given transport.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// The underlying transport.
    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Sends the request and waits for the parsed response.
    ///
    /// # Errors
    ///
    /// Fails with [`ApiClientError::Transport`] when the transport fails, and with
    /// [`ApiClientError::Remote`] for any non-2xx status.
    pub async fn dispatch(
        &self,
        request: RequestDescriptor,
    ) -> Result<ServiceResponse, ApiClientError> {
        debug!(method = %request.method(), url = %request.url(), "sending...");
        let raw = self.transport.send(request).await?;
        debug!(status = %raw.status(), "...receiving");

        check_status(ServiceResponse::from(raw))
    }

    /// Sends the request and returns the response head with the body stream.
    ///
    /// The status is not checked: the caller owns the stream and its interpretation.
    ///
    /// # Errors
    ///
    /// Fails with [`ApiClientError::Transport`] when the transport fails.
    pub async fn dispatch_streaming(
        &self,
        request: RequestDescriptor,
    ) -> Result<StreamingResponse, ApiClientError> {
        debug!(method = %request.method(), url = %request.url(), "streaming...");
        let response = self.transport.send_streaming(request).await?;
        debug!(status = %response.status(), "...streaming");
        Ok(response)
    }

    /// Runs the request on a spawned task and hands the outcome to `callback`.
    ///
    /// The callback runs exactly once, on the spawned task and never on the caller's stack,
    /// including when `request` is already an error. Nothing is sent in that case.
    pub fn dispatch_with<F>(
        &self,
        request: Result<RequestDescriptor, ApiClientError>,
        callback: F,
    ) -> JoinHandle<()>
    where
        F: FnOnce(Result<ServiceResponse, ApiClientError>) + Send + 'static,
    {
        let dispatcher = self.clone();
        tokio::spawn(async move {
            let result = match request {
                Ok(request) => dispatcher.dispatch(request).await,
                Err(err) => {
                    debug!(error = %err, "request not sent");
                    Err(err)
                }
            };
            callback(result);
        })
    }
}
