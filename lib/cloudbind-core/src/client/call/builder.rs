use serde::Serialize;

use super::ServiceCall;
use crate::client::descriptor::RequestBody;
use crate::client::options::AuthenticationOverride;
use crate::client::{
    ApiClientError, Authentication, CallBody, CallHeaders, CallQuery, MultipartField,
    MultipartForm, Params, QueryStyle, validate_required,
};

impl ServiceCall {
    // =============================================================================
    // Validation
    // =============================================================================

    /// Records the required parameters that are absent or null in `params`.
    ///
    /// When any is missing, running the call reports
    /// [`ApiClientError::MissingRequiredParameters`] and the transport is never invoked.
    /// A value of the bag that failed to serialize fails the call the same way.
    ///
    /// ```rust
    /// # use cloudbind_core::{Params, ServiceClient};
    /// # fn example() -> Result<(), cloudbind_core::ApiClientError> {
    /// let client = ServiceClient::builder().build()?;
    /// let params = Params::new().with("model_id", "en-es");
    ///
    /// let call = client
    ///     .post("/v3/translate")
    ///     .with_required(Some(&params), &["text", "model_id"]);
    ///
    /// assert_eq!(call.missing_parameters(), ["text"]);
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    pub fn with_required(mut self, params: Option<&Params>, required: &[&str]) -> Self {
        for name in validate_required(params, required) {
            if !self.missing.contains(&name) {
                self.missing.push(name);
            }
        }
        if let Some(Err(err)) = params.map(Params::check) {
            self.defer(err);
        }
        self
    }

    // =============================================================================
    // Request Configuration Methods
    // =============================================================================

    /// Sets the value of a path placeholder.
    #[must_use]
    pub fn with_path_param<T: Serialize>(mut self, name: impl Into<String>, value: T) -> Self {
        self.parts.path = self.parts.path.add_param(name, value);
        self
    }

    /// Merges query parameters; later values win.
    #[must_use]
    pub fn with_query(mut self, query: CallQuery) -> Self {
        let current = std::mem::take(&mut self.parts.options.query);
        self.parts.options.query = current.merge(query);
        self
    }

    /// Adds a single query parameter. `None` values are left out of the query string.
    ///
    /// Values that cannot be written in a query string (objects, nested arrays) fail the call
    /// when it runs.
    #[must_use]
    pub fn with_query_param<T: Serialize>(mut self, name: impl Into<String>, value: T) -> Self {
        let mut query = CallQuery::new();
        match query.try_insert(name, value, QueryStyle::default()) {
            Ok(()) => self.with_query(query),
            Err(err) => {
                self.defer(err);
                self
            }
        }
    }

    /// Merges headers; later values win, names compare case-insensitively.
    #[must_use]
    pub fn with_headers(mut self, headers: CallHeaders) -> Self {
        let current = std::mem::take(&mut self.parts.options.headers);
        self.parts.options.headers = current.merge(headers);
        self
    }

    /// Adds a single header, overriding default headers with the same name.
    ///
    /// ```rust
    /// # use cloudbind_core::ServiceClient;
    /// # fn example() -> Result<(), cloudbind_core::ApiClientError> {
    /// let client = ServiceClient::builder().build()?;
    /// let call = client
    ///     .get("/v3/models")
    ///     .with_header("X-Watson-Learning-Opt-Out", true)
    ///     .with_header("Accept", "application/json");
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    pub fn with_header<T: Serialize>(self, name: impl Into<String>, value: T) -> Self {
        self.with_headers(CallHeaders::new().add_header(name, value))
    }

    /// Uses other credentials for this call only.
    #[must_use]
    pub fn with_authentication(mut self, authentication: Authentication) -> Self {
        self.parts.options.authentication = AuthenticationOverride::Replace(authentication);
        self
    }

    /// Sends this call without credentials, even if the client has some.
    #[must_use]
    pub fn with_authentication_none(mut self) -> Self {
        self.parts.options.authentication = AuthenticationOverride::Disabled;
        self
    }

    // =============================================================================
    // Request Body Methods
    // =============================================================================

    /// Sets a JSON body, replacing any previous body.
    ///
    /// # Errors
    ///
    /// Fails if the value cannot be serialized.
    pub fn json<T>(self, value: &T) -> Result<Self, ApiClientError>
    where
        T: Serialize + ?Sized,
    {
        let body = CallBody::json(value)?;
        Ok(self.with_body(body))
    }

    /// Sets a prepared body, replacing any previous body.
    #[must_use]
    pub fn with_body(mut self, body: CallBody) -> Self {
        self.parts.body = RequestBody::Payload(body);
        self
    }

    /// Sets a multipart body, replacing any previous body.
    #[must_use]
    pub fn multipart(mut self, form: MultipartForm) -> Self {
        self.parts.body = RequestBody::Multipart(form);
        self
    }

    /// Adds a multipart field, switching the body to multipart if needed.
    ///
    /// Absent fields are dropped.
    #[must_use]
    pub fn with_multipart_field(
        mut self,
        name: impl Into<String>,
        field: impl Into<MultipartField>,
    ) -> Self {
        if let RequestBody::Multipart(form) = &mut self.parts.body {
            form.push(name, field);
        } else {
            self.parts.body = RequestBody::Multipart(MultipartForm::new().add_field(name, field));
        }
        self
    }
}
