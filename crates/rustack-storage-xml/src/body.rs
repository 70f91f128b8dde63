//! Request body normalization.
//!
//! Callers hand over whatever they want to send; these helpers turn it into
//! the bytes written on the wire.

use std::fmt;

use bytes::Bytes;
use rustack_core::BodyPolicy;

use crate::error::XmlError;
use crate::record::XmlFragment;
use crate::serialize::to_xml;

/// A request body before conversion to bytes.
#[derive(Default)]
pub enum RequestBody<'a> {
    /// No body.
    #[default]
    Empty,
    /// A record (or list of records), serialized as an XML document.
    Record(&'a dyn XmlFragment),
    /// Raw bytes, sent unchanged.
    Bytes(Bytes),
    /// Text, sent as UTF-8.
    Text(&'a str),
    /// Any other value, sent as the UTF-8 of its `Display` form.
    Display(&'a dyn fmt::Display),
}

impl RequestBody<'_> {
    fn kind(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Record(_) => "record",
            Self::Bytes(_) => "bytes",
            Self::Text(_) => "text",
            Self::Display(_) => "display",
        }
    }
}

impl fmt::Debug for RequestBody<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bytes(bytes) => f.debug_tuple("Bytes").field(&bytes.len()).finish(),
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            other => write!(f, "{}", other.kind()),
        }
    }
}

impl From<Bytes> for RequestBody<'_> {
    fn from(bytes: Bytes) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<Vec<u8>> for RequestBody<'_> {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(Bytes::from(bytes))
    }
}

impl<'a> From<&'a str> for RequestBody<'a> {
    fn from(text: &'a str) -> Self {
        Self::Text(text)
    }
}

impl<'a, T: XmlFragment> From<&'a T> for RequestBody<'a> {
    fn from(record: &'a T) -> Self {
        Self::Record(record)
    }
}

impl<'a, T> From<Option<T>> for RequestBody<'a>
where
    T: Into<RequestBody<'a>>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Empty, Into::into)
    }
}

/// Convert a request body to bytes.
///
/// Records are serialized with the XML declaration; text and display values
/// are UTF-8 encoded.
#[must_use]
pub fn to_request_bytes(body: RequestBody<'_>) -> Bytes {
    match body {
        RequestBody::Empty => Bytes::new(),
        RequestBody::Record(record) => Bytes::from(to_xml(record, true)),
        RequestBody::Bytes(bytes) => bytes,
        RequestBody::Text(text) => Bytes::copy_from_slice(text.as_bytes()),
        RequestBody::Display(value) => Bytes::from(value.to_string()),
    }
}

/// Convert a body for a parameter that only accepts bytes.
///
/// Empty and byte bodies pass through. Anything else is rejected under
/// [`BodyPolicy::BytesOnly`], or converted with a warning under
/// [`BodyPolicy::Legacy`].
///
/// # Errors
///
/// Returns `XmlError::InvalidArgumentType` naming `param_name` when the body
/// is not bytes and the policy is `BytesOnly`.
pub fn to_request_bytes_strict(
    param_name: &str,
    body: RequestBody<'_>,
    policy: BodyPolicy,
) -> Result<Bytes, XmlError> {
    match body {
        RequestBody::Empty => Ok(Bytes::new()),
        RequestBody::Bytes(bytes) => Ok(bytes),
        other => match policy {
            BodyPolicy::BytesOnly => Err(XmlError::InvalidArgumentType(param_name.to_owned())),
            BodyPolicy::Legacy => {
                tracing::warn!(
                    param = param_name,
                    kind = other.kind(),
                    "{param_name} should be of type bytes; converting for compatibility"
                );
                Ok(to_request_bytes(other))
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    crate::xml_record! {
        #[derive(Debug, Clone, Default, PartialEq)]
        struct QueueMessage {
            message_text: Option<String> = text,
        }
    }

    fn message() -> QueueMessage {
        QueueMessage {
            message_text: Some("hi".to_owned()),
        }
    }

    #[test]
    fn test_should_convert_each_body_kind() {
        assert!(to_request_bytes(RequestBody::Empty).is_empty());
        assert_eq!(
            to_request_bytes(RequestBody::from(&message())),
            Bytes::from_static(
                b"<?xml version=\"1.0\" encoding=\"utf-8\"?>\
                  <QueueMessage><MessageText>hi</MessageText></QueueMessage>"
            )
        );
        assert_eq!(
            to_request_bytes(Bytes::from_static(b"\x00\xff").into()),
            Bytes::from_static(b"\x00\xff")
        );
        assert_eq!(to_request_bytes("h\u{e9}".into()), Bytes::from("h\u{e9}"));
        assert_eq!(to_request_bytes(RequestBody::Display(&42)), Bytes::from("42"));
    }

    #[test]
    fn test_should_treat_none_as_empty() {
        let body: RequestBody<'_> = None::<&str>.into();
        assert!(matches!(body, RequestBody::Empty));
        assert!(to_request_bytes(body).is_empty());
    }

    #[test]
    fn test_should_pass_bytes_under_strict_policy() {
        let body = to_request_bytes_strict("blob", vec![1u8, 2, 3].into(), BodyPolicy::BytesOnly);
        assert_eq!(body.unwrap(), Bytes::from_static(&[1, 2, 3]));
        let empty = to_request_bytes_strict("blob", RequestBody::Empty, BodyPolicy::BytesOnly);
        assert!(empty.unwrap().is_empty());
    }

    #[test]
    fn test_should_reject_text_under_strict_policy() {
        let err = to_request_bytes_strict("blob", "text".into(), BodyPolicy::BytesOnly)
            .unwrap_err();
        assert!(matches!(&err, XmlError::InvalidArgumentType(name) if name == "blob"));
        assert_eq!(err.to_string(), "blob should be of type bytes.");
    }

    #[test]
    fn test_should_convert_text_under_legacy_policy() {
        let body = to_request_bytes_strict("blob", "text".into(), BodyPolicy::Legacy).unwrap();
        assert_eq!(body, Bytes::from("text"));
        let body =
            to_request_bytes_strict("message", (&message()).into(), BodyPolicy::Legacy).unwrap();
        assert!(body.starts_with(b"<?xml"));
    }
}
