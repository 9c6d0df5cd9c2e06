use std::sync::Arc;

use http::Method;

use super::descriptor::{CallParts, RequestBody};
use super::dispatch::Dispatcher;
use super::options::DefaultOptions;
use super::{ApiClientError, CallPath, RequestDescriptor};

mod builder;
mod execution;

pub use self::execution::StreamingCall;

/// One pending call of a service client.
///
/// `ServiceCall` collects the call parameters with a fluent interface, then runs in one of three
/// ways. Nothing is sent before that, and nothing at all when required parameters are missing.
///
/// # Method Groups
///
/// ## Validation
/// - [`with_required(params, names)`](Self::with_required) - Check required parameters
///
/// ## Parameter Methods
/// - [`with_path_param(name, value)`](Self::with_path_param) - Set a path placeholder value
/// - [`with_query(query)`](Self::with_query) - Merge query parameters
/// - [`with_query_param(name, value)`](Self::with_query_param) - Add single query parameter
/// - [`with_headers(headers)`](Self::with_headers) - Merge request headers
/// - [`with_header(name, value)`](Self::with_header) - Add single header
/// - [`with_authentication(auth)`](Self::with_authentication) - Replace credentials
/// - [`with_authentication_none()`](Self::with_authentication_none) - Drop credentials
///
/// ## Request Body Methods
/// - [`json(data)`](Self::json) - Set JSON request body
/// - [`with_body(body)`](Self::with_body) - Set a prepared body
/// - [`multipart(form)`](Self::multipart) - Set multipart form request body
/// - [`with_multipart_field(name, field)`](Self::with_multipart_field) - Add a multipart field
///
/// ## Execution
/// - `.await` - Run and get `Result<ServiceResponse, ApiClientError>`
/// - [`send_with(callback)`](Self::send_with) - Run on a spawned task, calling back once
/// - [`into_stream()`](Self::into_stream) - Get the raw response stream
#[derive(derive_more::Debug)]
pub struct ServiceCall {
    #[debug(skip)]
    pub(super) dispatcher: Dispatcher,
    #[debug(skip)]
    pub(super) defaults: Arc<DefaultOptions>,
    pub(super) parts: CallParts,
    pub(super) missing: Vec<String>,
    /// First error met while collecting parameters, reported when the call runs.
    pub(super) deferred: Option<ApiClientError>,
}

impl ServiceCall {
    pub(in crate::client) fn new(
        dispatcher: Dispatcher,
        defaults: Arc<DefaultOptions>,
        method: Method,
        path: CallPath,
    ) -> Self {
        Self {
            dispatcher,
            defaults,
            parts: CallParts::new(method, path),
            missing: Vec::new(),
            deferred: None,
        }
    }

    /// The HTTP method.
    pub fn method(&self) -> &Method {
        &self.parts.method
    }

    /// The path with its recorded parameters.
    pub fn path(&self) -> &CallPath {
        &self.parts.path
    }

    /// The current body slot.
    pub fn body(&self) -> &RequestBody {
        &self.parts.body
    }

    /// Missing required parameters recorded so far.
    pub fn missing_parameters(&self) -> &[String] {
        &self.missing
    }

    /// Checks the call, then builds its request descriptor.
    ///
    /// Missing required parameters win over any other error, and stop before any construction.
    ///
    /// # Errors
    ///
    /// Fails with [`ApiClientError::MissingRequiredParameters`], the first deferred parameter
    /// error, or any [`RequestDescriptor::build`] error.
    pub fn prepare(self) -> Result<(Dispatcher, RequestDescriptor), ApiClientError> {
        let Self {
            dispatcher,
            defaults,
            parts,
            missing,
            deferred,
        } = self;

        if !missing.is_empty() {
            return Err(ApiClientError::MissingRequiredParameters { missing });
        }
        if let Some(err) = deferred {
            return Err(err);
        }

        let request = RequestDescriptor::build(&defaults, parts)?;
        Ok((dispatcher, request))
    }

    pub(super) fn defer(&mut self, err: ApiClientError) {
        if self.deferred.is_none() {
            self.deferred = Some(err);
        }
    }
}
