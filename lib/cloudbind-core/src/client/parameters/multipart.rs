use std::pin::Pin;

use bytes::Bytes;
use futures::Stream;
use mime::Mime;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::client::ApiClientError;

/// A byte stream feeding a multipart field, polled only by the transport.
pub type FieldStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send + Sync>>;

/// The content of a multipart field.
#[derive(derive_more::Debug)]
pub enum FieldData {
    /// Bytes produced lazily, typically a file being uploaded.
    Stream(#[debug(skip)] FieldStream),
    /// A structured value, sent as `application/json`.
    Json(Value),
    /// A text value.
    Text(String),
    /// An in-memory binary value.
    Bytes(Bytes),
}

/// One field of a multipart form: data, optional content type and optional filename.
///
/// A field without data is absent and is never sent, not even as an empty part.
#[derive(Debug, Default)]
pub struct MultipartField {
    data: Option<FieldData>,
    content_type: Option<Mime>,
    filename: Option<String>,
}

impl MultipartField {
    /// A text field.
    pub fn text(text: impl Into<String>) -> Self {
        Self::with_data(FieldData::Text(text.into()))
    }

    /// A binary field.
    pub fn bytes(data: impl Into<Bytes>) -> Self {
        Self::with_data(FieldData::Bytes(data.into()))
    }

    /// A field holding a structured JSON value.
    ///
    /// A value serializing to `null` gives an absent field.
    ///
    /// # Errors
    ///
    /// Fails if the value cannot be serialized.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, ApiClientError> {
        let value = serde_json::to_value(value)?;
        Ok(Self::from(value))
    }

    /// A field streamed from the given bytes.
    pub fn stream<S>(stream: S) -> Self
    where
        S: Stream<Item = Result<Bytes, std::io::Error>> + Send + Sync + 'static,
    {
        Self::with_data(FieldData::Stream(Box::pin(stream)))
    }

    /// A field without data, dropped from the form.
    pub fn absent() -> Self {
        Self::default()
    }

    fn with_data(data: FieldData) -> Self {
        Self {
            data: Some(data),
            ..Self::default()
        }
    }

    /// Sets the content type of the part.
    #[must_use]
    pub fn with_content_type(mut self, content_type: Mime) -> Self {
        self.content_type = Some(content_type);
        self
    }

    /// Sets the filename of the part.
    #[must_use]
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Returns true if the field has no data.
    pub fn is_absent(&self) -> bool {
        self.data.is_none()
    }

    /// The field data.
    pub fn data(&self) -> Option<&FieldData> {
        self.data.as_ref()
    }

    /// The explicit content type, if any.
    pub fn content_type(&self) -> Option<&Mime> {
        self.content_type.as_ref()
    }

    /// The filename, if any.
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// Splits the field into data, content type and filename.
    pub fn into_parts(self) -> (Option<FieldData>, Option<Mime>, Option<String>) {
        (self.data, self.content_type, self.filename)
    }
}

impl From<Value> for MultipartField {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::absent(),
            Value::String(text) => Self::text(text),
            other => Self::with_data(FieldData::Json(other)),
        }
    }
}

impl<T> From<Option<T>> for MultipartField
where
    T: Into<MultipartField>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or_else(Self::absent, Into::into)
    }
}

impl From<String> for MultipartField {
    fn from(value: String) -> Self {
        Self::text(value)
    }
}

impl From<&str> for MultipartField {
    fn from(value: &str) -> Self {
        Self::text(value)
    }
}

impl From<Bytes> for MultipartField {
    fn from(value: Bytes) -> Self {
        Self::bytes(value)
    }
}

/// An ordered set of multipart fields.
///
/// # Example
///
/// ```rust
/// use cloudbind_core::{MultipartField, MultipartForm};
///
/// let form = MultipartForm::new()
///     .add_field("file", MultipartField::bytes(&b"Hello"[..]).with_filename("hello.txt"))
///     .add_field("model_id", "en-es")
///     .add_field("source", None::<String>);
///
/// assert_eq!(form.len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct MultipartForm {
    fields: Vec<(String, MultipartField)>,
}

impl MultipartForm {
    /// Creates an empty form.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a field; absent fields are dropped.
    #[must_use]
    pub fn add_field(mut self, name: impl Into<String>, field: impl Into<MultipartField>) -> Self {
        self.push(name, field);
        self
    }

    /// Appends a field in place; absent fields are dropped.
    pub fn push(&mut self, name: impl Into<String>, field: impl Into<MultipartField>) {
        let name = name.into();
        let field = field.into();
        if field.is_absent() {
            debug!(?name, "drop absent multipart field");
            return;
        }
        self.fields.push((name, field));
    }

    /// The number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the form has no field.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates over the field names and fields.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MultipartField)> + '_ {
        self.fields.iter().map(|(name, field)| (name.as_str(), field))
    }
}

impl IntoIterator for MultipartForm {
    type Item = (String, MultipartField);
    type IntoIter = std::vec::IntoIter<(String, MultipartField)>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn should_drop_absent_fields() {
        let form = MultipartForm::new()
            .add_field("text", "Hello")
            .add_field("source", None::<String>)
            .add_field("options", Value::Null)
            .add_field("empty", MultipartField::absent());

        let names: Vec<_> = form.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["text"]);
    }

    #[test]
    fn should_keep_empty_but_present_fields() {
        let form = MultipartForm::new()
            .add_field("text", "")
            .add_field("data", Bytes::new());

        assert_eq!(form.len(), 2);
    }

    #[test]
    fn should_convert_json_values() {
        let field = MultipartField::json(&json!({"name": "doc"}))
            .expect("serializable")
            .with_filename("metadata.json");

        insta::assert_debug_snapshot!(field, @r#"
        MultipartField {
            data: Some(
                Json(
                    Object {
                        "name": String("doc"),
                    },
                ),
            ),
            content_type: None,
            filename: Some(
                "metadata.json",
            ),
        }
        "#);
    }

    #[test]
    fn should_not_print_stream_content() {
        let chunks: [Result<Bytes, std::io::Error>; 1] = [Ok(Bytes::from_static(b"secret"))];
        let stream = futures::stream::iter(chunks);
        let field = MultipartField::stream(stream).with_content_type(mime::TEXT_PLAIN);

        let debug = format!("{field:?}");

        assert!(debug.contains("Stream(..)"));
        assert!(!debug.contains("secret"));
        assert_eq!(field.content_type(), Some(&mime::TEXT_PLAIN));
    }
}
