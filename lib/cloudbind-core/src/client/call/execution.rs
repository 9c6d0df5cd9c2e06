use std::future::{Future, IntoFuture};
use std::pin::Pin;

use tokio::task::JoinHandle;

use super::ServiceCall;
use crate::client::dispatch::Dispatcher;
use crate::client::{ApiClientError, RequestDescriptor, ServiceResponse};
use crate::transport::StreamingResponse;

impl ServiceCall {
    async fn exchange(self) -> Result<ServiceResponse, ApiClientError> {
        let (dispatcher, request) = self.prepare()?;
        dispatcher.dispatch(request).await
    }

    /// Runs the call on a spawned tokio task and hands the outcome to `callback`.
    ///
    /// The callback is invoked exactly once with either the response or the error, and always
    /// from the spawned task, even when validation fails before anything is sent.
    /// Must be called from within a tokio runtime.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// # use cloudbind_core::{Params, ServiceClient};
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = ServiceClient::builder().build()?;
    /// let params = Params::new().with("text", "Bonjour");
    ///
    /// let handle = client
    ///     .post("/v3/identify")
    ///     .with_required(Some(&params), &["text"])
    ///     .send_with(|result| match result {
    ///         Ok(response) => tracing::info!(status = %response.status(), "identified"),
    ///         Err(err) => tracing::warn!(%err, "identify failed"),
    ///     });
    /// handle.await?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn send_with<F>(self, callback: F) -> JoinHandle<()>
    where
        F: FnOnce(Result<ServiceResponse, ApiClientError>) + Send + 'static,
    {
        let dispatcher = self.dispatcher.clone();
        let request = self.prepare().map(|(_, request)| request);
        dispatcher.dispatch_with(request, callback)
    }

    /// Switches the call to streaming mode.
    ///
    /// Validation, path expansion and request construction happen right away, so their errors
    /// are returned here instead of being lost in a stream. Awaiting the [`StreamingCall`] gives
    /// the response head and the body stream, whatever the status.
    ///
    /// # Errors
    ///
    /// Fails with [`ApiClientError::MissingRequiredParameters`] or any request construction error.
    pub fn into_stream(self) -> Result<StreamingCall, ApiClientError> {
        let (dispatcher, request) = self.prepare()?;
        Ok(StreamingCall {
            dispatcher,
            request,
        })
    }
}

/// Implement `IntoFuture` for `ServiceCall` to enable direct `.await` syntax.
///
/// ```rust,no_run
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// # let client = cloudbind_core::ServiceClient::builder().build()?;
/// let response = client.get("/v3/models").await?;
/// # Ok(())
/// # }
/// ```
impl IntoFuture for ServiceCall {
    type Output = Result<ServiceResponse, ApiClientError>;
    type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.exchange())
    }
}

/// A validated call waiting to be sent in streaming mode.
#[derive(Debug)]
pub struct StreamingCall {
    dispatcher: Dispatcher,
    request: RequestDescriptor,
}

impl StreamingCall {
    /// The request that will be sent.
    pub fn request(&self) -> &RequestDescriptor {
        &self.request
    }
}

impl IntoFuture for StreamingCall {
    type Output = Result<StreamingResponse, ApiClientError>;
    type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send>>;

    fn into_future(self) -> Self::IntoFuture {
        let Self {
            dispatcher,
            request,
        } = self;
        Box::pin(async move { dispatcher.dispatch_streaming(request).await })
    }
}
