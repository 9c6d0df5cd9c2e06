use headers::HeaderMapExt;
use http::header::CONTENT_TYPE;
use http::{HeaderMap, Method};
use url::Url;

use super::options::{CallOptions, DefaultOptions, RequestOptions};
use super::{ApiClientError, CallBody, CallPath, MultipartForm};

/// The body slot of a request: nothing, a serialized payload, or a multipart form.
///
/// A call holds a single body, so setting a JSON payload replaces a multipart form and the
/// other way around.
#[derive(Debug, Default)]
pub enum RequestBody {
    /// No body.
    #[default]
    Empty,
    /// A serialized payload with its content type.
    Payload(CallBody),
    /// Multipart form fields, encoded by the transport.
    Multipart(MultipartForm),
}

impl RequestBody {
    /// Returns true if there is no body.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// Everything a call contributes to a request, before merging with the defaults.
#[derive(Debug)]
pub struct CallParts {
    /// HTTP method.
    pub method: Method,
    /// Path template and its parameters.
    pub path: CallPath,
    /// Headers, query and credential overlay.
    pub options: CallOptions,
    /// The body.
    pub body: RequestBody,
}

impl CallParts {
    /// Call parts without parameters or body.
    pub fn new(method: Method, path: impl Into<CallPath>) -> Self {
        Self {
            method,
            path: path.into(),
            options: CallOptions::default(),
            body: RequestBody::Empty,
        }
    }
}

/// A fully assembled outbound request, independent of the transport sending it.
#[derive(Debug)]
pub struct RequestDescriptor {
    method: Method,
    template: String,
    url: Url,
    headers: HeaderMap,
    body: RequestBody,
}

impl RequestDescriptor {
    /// Builds the request from the service defaults and the call parts.
    ///
    /// The URL is the base URL followed by the expanded path, plus the merged query string when
    /// not empty. Payload bodies set their content type unless the call already provides one.
    /// Multipart bodies never carry a content type header here: the transport writes it along
    /// with the boundary.
    ///
    /// # Errors
    ///
    /// Fails on unresolved path placeholders, invalid URL, invalid header, or credentials
    /// that cannot be rendered.
    pub fn build(defaults: &DefaultOptions, call: CallParts) -> Result<Self, ApiClientError> {
        let CallParts {
            method,
            path,
            options,
            body,
        } = call;

        let RequestOptions { headers, query } = RequestOptions::merge(defaults, &options)?;
        let url = build_url(&defaults.base_url, &path, &query.to_query_string()?)?;

        let mut headers = headers.to_header_map()?;
        match &body {
            RequestBody::Payload(payload) if !headers.contains_key(CONTENT_TYPE) => {
                headers.typed_insert(payload.content_type().clone());
            }
            RequestBody::Multipart(_) => {
                headers.remove(CONTENT_TYPE);
            }
            RequestBody::Payload(_) | RequestBody::Empty => {}
        }

        Ok(Self {
            method,
            template: path.path,
            url,
            headers,
            body,
        })
    }

    /// The HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The path template the request was built from.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// The resolved URL, query string included.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The final headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The body.
    pub fn body(&self) -> &RequestBody {
        &self.body
    }

    /// Splits the descriptor into method, URL, headers and body.
    pub fn into_parts(self) -> (Method, Url, HeaderMap, RequestBody) {
        (self.method, self.url, self.headers, self.body)
    }
}

fn build_url(base_url: &Url, path: &CallPath, query: &str) -> Result<Url, ApiClientError> {
    let path = path.resolve()?;
    let url = format!(
        "{}/{}",
        base_url.as_str().trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    let mut url = url.parse::<Url>()?;

    if !query.is_empty() {
        url.set_query(Some(query));
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::auth::Authentication;
    use crate::client::{CallHeaders, CallQuery, MultipartField};
    use headers::ContentType;
    use serde_json::json;

    fn defaults() -> DefaultOptions {
        let mut defaults = DefaultOptions::new(
            "https://api.example.com/instances/42/"
                .parse()
                .expect("valid url"),
        );
        defaults.authentication = Some(Authentication::api_key("key"));
        defaults.query = CallQuery::new().add_param("version", "2018-05-01");
        defaults
    }

    #[test]
    fn should_build_get_descriptor() {
        let mut call = CallParts::new(
            Method::GET,
            CallPath::from("/v1/collections/{collection_id}").add_param("collection_id", "a b"),
        );
        call.options.query = CallQuery::new()
            .add_param("x", None::<String>)
            .add_param("y", "v");

        let descriptor = RequestDescriptor::build(&defaults(), call).expect("valid request");

        insta::assert_snapshot!(
            descriptor.url(),
            @"https://api.example.com/instances/42/v1/collections/a%20b?version=2018-05-01&y=v"
        );
        assert_eq!(descriptor.template(), "/v1/collections/{collection_id}");
        assert_eq!(descriptor.method(), &Method::GET);
        assert!(descriptor.body().is_empty());
        assert!(!descriptor.headers().contains_key(CONTENT_TYPE));
        assert_eq!(
            descriptor.headers()["authorization"],
            "Basic YXBpa2V5OmtleQ=="
        );
    }

    #[test]
    fn should_fail_on_unresolved_path() {
        let call = CallParts::new(Method::GET, "/v1/collections/{collection_id}");

        let result = RequestDescriptor::build(&defaults(), call);

        assert!(matches!(
            result,
            Err(ApiClientError::PathUnresolved { .. })
        ));
    }

    #[test]
    fn should_set_json_content_type() {
        let mut call = CallParts::new(Method::POST, "/v3/translate");
        call.body = RequestBody::Payload(
            CallBody::json(&json!({"text": ["Hello"], "model_id": "en-es"})).expect("json"),
        );

        let descriptor = RequestDescriptor::build(&defaults(), call).expect("valid request");

        assert_eq!(
            descriptor.headers().typed_get::<ContentType>(),
            Some(ContentType::json())
        );
    }

    #[test]
    fn should_keep_caller_content_type() {
        let mut call = CallParts::new(Method::POST, "/v3/translate");
        call.options.headers = CallHeaders::new().add_header("content-type", "text/plain");
        call.body = RequestBody::Payload(CallBody::json("Hello").expect("json"));

        let descriptor = RequestDescriptor::build(&defaults(), call).expect("valid request");

        assert_eq!(descriptor.headers()[CONTENT_TYPE], "text/plain");
    }

    #[test]
    fn should_not_set_content_type_for_multipart() {
        let mut call = CallParts::new(Method::POST, "/v3/documents");
        call.options.headers = CallHeaders::new().add_header("Content-Type", "application/json");
        call.body = RequestBody::Multipart(
            MultipartForm::new().add_field("file", MultipartField::bytes(&b"Hello"[..])),
        );

        let descriptor = RequestDescriptor::build(&defaults(), call).expect("valid request");

        assert!(!descriptor.headers().contains_key(CONTENT_TYPE));
        let (_, _, _, body) = descriptor.into_parts();
        assert!(matches!(body, RequestBody::Multipart(form) if form.len() == 1));
    }

    #[test]
    fn should_join_base_url_and_path() {
        let mut defaults = defaults();
        defaults.base_url = "https://api.example.com".parse().expect("valid url");
        defaults.query = CallQuery::new();
        let mut call = CallParts::new(Method::DELETE, "v3/models/{model_id}");
        call.path = call.path.add_param("model_id", "en-es");

        let descriptor = RequestDescriptor::build(&defaults, call).expect("valid request");

        assert_eq!(
            descriptor.url().as_str(),
            "https://api.example.com/v3/models/en-es"
        );
    }
}
