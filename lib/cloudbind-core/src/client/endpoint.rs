use http::Method;
use serde_json::{Map, Value};
use tracing::warn;

use super::parameters::json_to_param_string;
use super::{
    CallBody, CallHeaders, CallQuery, MultipartField, Params, QueryStyle, ServiceCall,
};

/// Where an endpoint parameter goes in the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamLocation {
    /// A `{placeholder}` of the path template.
    Path,
    /// A query string parameter.
    Query,
    /// A request header.
    Header,
    /// A member of the JSON body object.
    BodyField,
    /// The whole JSON body.
    Body,
    /// A multipart form field.
    FormField,
}

/// One declared parameter of an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointParam {
    /// Name in the parameter bag.
    pub name: &'static str,
    /// Name on the wire, when it differs from `name`.
    pub wire_name: Option<&'static str>,
    /// Where the value goes.
    pub location: ParamLocation,
}

impl EndpointParam {
    /// A parameter sent under its own name.
    pub const fn new(name: &'static str, location: ParamLocation) -> Self {
        Self {
            name,
            wire_name: None,
            location,
        }
    }

    /// A path placeholder.
    pub const fn path(name: &'static str) -> Self {
        Self::new(name, ParamLocation::Path)
    }

    /// A query string parameter.
    pub const fn query(name: &'static str) -> Self {
        Self::new(name, ParamLocation::Query)
    }

    /// A header, with its HTTP name.
    pub const fn header(name: &'static str, header_name: &'static str) -> Self {
        Self::new(name, ParamLocation::Header).renamed(header_name)
    }

    /// A member of the JSON body.
    pub const fn body_field(name: &'static str) -> Self {
        Self::new(name, ParamLocation::BodyField)
    }

    /// The whole JSON body.
    pub const fn body(name: &'static str) -> Self {
        Self::new(name, ParamLocation::Body)
    }

    /// A multipart form field.
    pub const fn form_field(name: &'static str) -> Self {
        Self::new(name, ParamLocation::FormField)
    }

    /// Sends the parameter under another name.
    #[must_use]
    pub const fn renamed(mut self, wire_name: &'static str) -> Self {
        self.wire_name = Some(wire_name);
        self
    }

    /// The name used on the wire.
    pub fn wire_name(&self) -> &'static str {
        self.wire_name.unwrap_or(self.name)
    }
}

/// Static description of one generated binding method.
///
/// # Example
///
/// ```rust
/// use cloudbind_core::{Endpoint, EndpointParam};
/// use http::Method;
///
/// const GET_DOCUMENT: Endpoint = Endpoint {
///     method: Method::GET,
///     path: "/v1/environments/{environment_id}/collections/{collection_id}/documents/{document_id}",
///     required: &["environment_id", "collection_id", "document_id"],
///     params: &[
///         EndpointParam::path("environment_id"),
///         EndpointParam::path("collection_id"),
///         EndpointParam::path("document_id"),
///     ],
/// };
/// ```
#[derive(Debug, Clone)]
pub struct Endpoint {
    /// HTTP method.
    pub method: Method,
    /// Path template.
    pub path: &'static str,
    /// Names that must be present and non-null.
    pub required: &'static [&'static str],
    /// Declared parameters.
    pub params: &'static [EndpointParam],
}

impl Endpoint {
    /// Looks up a declared parameter.
    pub fn param(&self, name: &str) -> Option<&EndpointParam> {
        self.params.iter().find(|param| param.name == name)
    }
}

impl ServiceCall {
    /// Validates `params` against the endpoint, then routes each value to its location.
    ///
    /// Parameters the endpoint does not declare are ignored with a warning. Values that cannot
    /// be routed fail the call when it runs.
    pub(in crate::client) fn route(mut self, endpoint: &Endpoint, mut params: Params) -> Self {
        self = self.with_required(Some(&params), endpoint.required);

        let mut query = CallQuery::new();
        let mut headers = CallHeaders::new();
        let mut body_fields = Map::new();

        for param in endpoint.params {
            let Some(value) = params.take(param.name) else {
                continue;
            };
            let wire_name = param.wire_name();
            match param.location {
                ParamLocation::Path => match json_to_param_string(value) {
                    Ok(value) => self = self.with_path_param(wire_name, value),
                    Err(err) => self.defer(err),
                },
                ParamLocation::Query => {
                    if let Err(err) = query.try_insert(wire_name, value, QueryStyle::default()) {
                        self.defer(err);
                    }
                }
                ParamLocation::Header => match json_to_param_string(value) {
                    Ok(value) => headers = headers.add_header(wire_name, value),
                    Err(err) => self.defer(err),
                },
                ParamLocation::BodyField => {
                    body_fields.insert(wire_name.to_string(), value);
                }
                ParamLocation::Body => match CallBody::json(&value) {
                    Ok(body) => self = self.with_body(body),
                    Err(err) => self.defer(err),
                },
                ParamLocation::FormField => {
                    self = self.with_multipart_field(wire_name, MultipartField::from(value));
                }
            }
        }

        for (name, _) in params.iter() {
            warn!(?name, path = endpoint.path, "unknown parameter ignored");
        }

        if !body_fields.is_empty() {
            match CallBody::json(&Value::Object(body_fields)) {
                Ok(body) => self = self.with_body(body),
                Err(err) => self.defer(err),
            }
        }

        self.with_query(query).with_headers(headers)
    }
}
