use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{HeaderMap, StatusCode};
use mime::Mime;
use serde_json::Value;
use tracing::debug;

/// The parsed body of a response, chosen from its content type.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ResponseBody {
    /// No body, or a `204 No Content` response.
    Empty,
    /// A JSON document.
    Json(Value),
    /// A text document, or a JSON document that failed to parse.
    Text(String),
    /// Binary content.
    Bytes(Bytes),
}

impl ResponseBody {
    /// Parses the body according to the `Content-Type` header.
    ///
    /// JSON content types (`application/json` and `+json` suffixes) are parsed, falling back to
    /// text when the document is malformed. `text/*` and XML content are text. Other content
    /// is kept as bytes; a missing content type gives text when the body is valid UTF-8.
    pub fn parse(status: StatusCode, headers: &HeaderMap, body: Bytes) -> Self {
        if body.is_empty() || status == StatusCode::NO_CONTENT {
            return Self::Empty;
        }

        match content_type(headers) {
            Some(mime) if is_json(&mime) => match serde_json::from_slice(&body) {
                Ok(json) => Self::Json(json),
                Err(err) => {
                    debug!(error = %err, "malformed JSON body, keep it as text");
                    Self::text_or_bytes(body)
                }
            },
            Some(mime) if is_text(&mime) => Self::text_or_bytes(body),
            Some(_) => Self::Bytes(body),
            None => Self::text_or_bytes(body),
        }
    }

    fn text_or_bytes(body: Bytes) -> Self {
        match String::from_utf8(body.to_vec()) {
            Ok(text) => Self::Text(text),
            Err(_) => Self::Bytes(body),
        }
    }

    /// Returns the JSON document, if any.
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(json) => Some(json),
            _ => None,
        }
    }

    /// Returns the text, if any.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Returns true if there is no body.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

pub(super) fn content_type(headers: &HeaderMap) -> Option<Mime> {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<Mime>().ok())
}

fn is_json(mime: &Mime) -> bool {
    mime.subtype() == mime::JSON || mime.suffix() == Some(mime::JSON)
}

fn is_text(mime: &Mime) -> bool {
    mime.type_() == mime::TEXT || mime.subtype() == mime::XML || mime.suffix() == Some(mime::XML)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;
    use rstest::rstest;
    use serde_json::json;

    fn headers(content_type: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        headers
    }

    #[rstest]
    #[case::json("application/json")]
    #[case::json_with_charset("application/json; charset=utf-8")]
    #[case::problem_json("application/problem+json")]
    fn should_parse_json(#[case] content_type: &'static str) {
        let body = ResponseBody::parse(
            StatusCode::OK,
            &headers(content_type),
            Bytes::from_static(br#"{"translations":[{"translation":"Hola"}]}"#),
        );

        assert_eq!(
            body,
            ResponseBody::Json(json!({"translations": [{"translation": "Hola"}]}))
        );
    }

    #[test]
    fn should_fall_back_to_text_on_malformed_json() {
        let body = ResponseBody::parse(
            StatusCode::BAD_GATEWAY,
            &headers("application/json"),
            Bytes::from_static(b"<html>Bad Gateway</html>"),
        );

        assert_eq!(body.as_text(), Some("<html>Bad Gateway</html>"));
    }

    #[rstest]
    #[case::plain("text/plain")]
    #[case::html("text/html; charset=utf-8")]
    #[case::xml("application/xml")]
    fn should_parse_text(#[case] content_type: &'static str) {
        let body = ResponseBody::parse(
            StatusCode::OK,
            &headers(content_type),
            Bytes::from_static(b"Hola"),
        );

        assert_eq!(body, ResponseBody::Text("Hola".to_string()));
    }

    #[test]
    fn should_keep_binary_content() {
        let body = ResponseBody::parse(
            StatusCode::OK,
            &headers("application/octet-stream"),
            Bytes::from_static(&[0xFF, 0xFE]),
        );

        assert_eq!(body, ResponseBody::Bytes(Bytes::from_static(&[0xFF, 0xFE])));
    }

    #[test]
    fn should_detect_empty_bodies() {
        let body = ResponseBody::parse(StatusCode::OK, &headers("application/json"), Bytes::new());
        assert!(body.is_empty());

        let body = ResponseBody::parse(
            StatusCode::NO_CONTENT,
            &HeaderMap::new(),
            Bytes::from_static(b"ignored"),
        );
        assert!(body.is_empty());
    }

    #[test]
    fn should_guess_text_without_content_type() {
        let body = ResponseBody::parse(StatusCode::OK, &HeaderMap::new(), Bytes::from_static(b"ok"));
        assert_eq!(body.as_text(), Some("ok"));

        let body = ResponseBody::parse(
            StatusCode::OK,
            &HeaderMap::new(),
            Bytes::from_static(&[0xC3, 0x28]),
        );
        assert!(matches!(body, ResponseBody::Bytes(_)));
    }
}
