//! Record parsing: filling records from XML response bodies.
//!
//! The body is parsed into an [`Element`] tree, then a default record is
//! filled field by field according to its [`FieldKind`] descriptors. Missing
//! elements and attributes are never errors; the field keeps (or is reset to)
//! its absent value.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::NaiveDateTime;
use rustack_core::HttpResponse;

use crate::dom::Element;
use crate::error::XmlError;
use crate::record::{Field, FieldKind, Slot, XmlRecord};

/// Datetime layout accepted on read: fractional seconds, no zone suffix.
const DATETIME_PARSE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";
const MAX_FRACTION_DIGITS: usize = 6;

/// Parse a response body into a record of type `T`.
///
/// Returns `Ok(None)` when the document root is not `T::XML_NAME`.
///
/// # Errors
///
/// Returns `XmlError` if the body is not well-formed XML or a field cannot be
/// converted.
pub fn parse_response<T: XmlRecord>(response: &HttpResponse) -> Result<Option<T>, XmlError> {
    from_xml(&response.body)
}

/// Parse an XML document into a record of type `T`.
///
/// Returns `Ok(None)` when the document root is not `T::XML_NAME`.
///
/// # Errors
///
/// Returns `XmlError` if the body is not well-formed XML or a field cannot be
/// converted.
pub fn from_xml<T: XmlRecord>(xml: &[u8]) -> Result<Option<T>, XmlError> {
    let root = Element::parse(xml)?;
    if !root.is(None, T::XML_NAME) {
        tracing::debug!(
            expected = T::XML_NAME,
            found = root.name(),
            "document root does not match record"
        );
        return Ok(None);
    }
    fill_instance(&root).map(Some)
}

/// Build a new `T` and fill it from `element`.
///
/// # Errors
///
/// Returns `XmlError` if a field cannot be converted or uses an unsupported
/// kind.
pub fn fill_instance<T: XmlRecord>(element: &Element) -> Result<T, XmlError> {
    let mut record = T::default();
    for field in T::FIELDS {
        fill_field(element, field, &mut record)?;
    }
    Ok(record)
}

/// Parse an enumeration result such as a container or queue listing.
///
/// `resp_type` is the plural wrapper element (for example `Containers`). Its
/// items are the children named by `resp_type` without its last character,
/// and land in the list field whose identifier is `resp_type` lowercased.
/// All other fields of `T` are filled from the document root.
///
/// ```text
/// <EnumerationResults>
///   <Prefix>p</Prefix>
///   <Containers>
///     <Container>...</Container>
///   </Containers>
///   <NextMarker/>
/// </EnumerationResults>
/// ```
///
/// # Errors
///
/// Returns `XmlError` if the body is not well-formed XML, a field cannot be
/// converted, or `T` has no list field for `resp_type`.
pub fn parse_enum_results_list<T: XmlRecord>(
    response: &HttpResponse,
    resp_type: &str,
) -> Result<T, XmlError> {
    let root = Element::parse(&response.body)?;
    let list_id = resp_type.to_lowercase();
    let item_tag = without_last_char(resp_type);

    let mut record = T::default();
    for field in T::FIELDS {
        if field.id == list_id {
            continue;
        }
        fill_field(&root, field, &mut record)?;
    }

    let Some(Slot::List(items)) = record.slot(&list_id) else {
        return Err(XmlError::MissingElement(format!(
            "{} has no list field `{list_id}`",
            T::TYPE_NAME
        )));
    };
    items.clear();
    for container in root.find_all(resp_type) {
        for item in container.find_all(item_tag) {
            items.push_from(item)?;
        }
    }
    Ok(record)
}

/// Parse a document whose root holds a flat sequence of same-named items.
///
/// The items are the root's children named after the item type of the list
/// field `list_name`.
///
/// # Errors
///
/// Returns `XmlError` if the body is not well-formed XML, an item cannot be
/// filled, or `T` has no list field `list_name`.
pub fn parse_simple_list<T: XmlRecord>(
    response: &HttpResponse,
    list_name: &str,
) -> Result<T, XmlError> {
    let root = Element::parse(&response.body)?;

    let mut record = T::default();
    let Some(Slot::List(items)) = record.slot(list_name) else {
        return Err(XmlError::MissingElement(format!(
            "{} has no list field `{list_name}`",
            T::TYPE_NAME
        )));
    };
    items.clear();
    let item_name = items.item_type_name();
    for item in root.find_all(item_name) {
        items.push_from(item)?;
    }
    Ok(record)
}

/// Parse a wire datetime (`YYYY-MM-DDTHH:MM:SS.ffffff`).
///
/// The fractional part is required and holds one to six digits.
///
/// # Errors
///
/// Returns `XmlError::ParseError` if the text does not match.
pub fn parse_datetime(text: &str) -> Result<NaiveDateTime, XmlError> {
    let invalid = |reason: &dyn std::fmt::Display| {
        XmlError::ParseError(format!("invalid datetime '{text}': {reason}"))
    };

    let fraction = text.rsplit_once('.').map(|(_, fraction)| fraction);
    match fraction {
        Some(f)
            if (1..=MAX_FRACTION_DIGITS).contains(&f.len())
                && f.bytes().all(|b| b.is_ascii_digit()) => {}
        _ => return Err(invalid(&"expected a fraction of 1 to 6 digits")),
    }
    NaiveDateTime::parse_from_str(text, DATETIME_PARSE_FORMAT).map_err(|e| invalid(&e))
}

/// Fill one field of `record` from `node`, dispatching on the field kind.
fn fill_field<T: XmlRecord>(node: &Element, field: &Field, record: &mut T) -> Result<(), XmlError> {
    let mismatch = |expected: &'static str| XmlError::SlotMismatch {
        record: T::TYPE_NAME,
        field: field.id,
        expected,
    };
    let slot = record.slot(field.id).ok_or_else(|| mismatch(field.kind.as_str()))?;

    match field.kind {
        FieldKind::ListOf { item_tag } => {
            let Slot::List(items) = slot else {
                return Err(mismatch("list"));
            };
            items.clear();
            for item in node.find_all(item_tag) {
                items.push_from(item)?;
            }
        }
        FieldKind::ScalarListOf { .. } => return Err(XmlError::Unsupported("scalar list")),
        FieldKind::DictOf { .. } => return Err(XmlError::Unsupported("dict of pairs")),
        FieldKind::Attribute { name } => {
            let Slot::Text(value) = slot else {
                return Err(mismatch("attribute"));
            };
            if let Some(attr) = node.attribute(name) {
                *value = Some(attr.to_owned());
            }
        }
        FieldKind::Record => {
            let Slot::Record(nested) = slot else {
                return Err(mismatch("record"));
            };
            match node.find(&field.wire_name()) {
                Some(child) => nested.fill_from(child)?,
                None => nested.clear(),
            }
        }
        FieldKind::Dict => {
            let Slot::Dict(map) = slot else {
                return Err(mismatch("dict"));
            };
            *map = node.find(&field.wire_name()).map(|container| {
                container
                    .children()
                    .iter()
                    .map(|item| (item.name().to_owned(), item.text().to_owned()))
                    .collect()
            });
        }
        FieldKind::Base64Text => {
            let Slot::Text(value) = slot else {
                return Err(mismatch("base64 text"));
            };
            *value = match node.find_text(&field.wire_name()) {
                Some(text) => Some(decode_base64_to_text(text)?),
                None => None,
            };
        }
        FieldKind::Scalar => {
            if let Some(text) = node.find_text(&field.wire_name()) {
                assign_scalar(slot, text).map_err(|e| match e {
                    ScalarError::NotScalar => mismatch("scalar"),
                    ScalarError::Invalid(err) => err,
                })?;
            }
        }
    }
    Ok(())
}

enum ScalarError {
    NotScalar,
    Invalid(XmlError),
}

/// Convert scalar text into the slot's own type.
fn assign_scalar(slot: Slot<'_>, text: &str) -> Result<(), ScalarError> {
    match slot {
        Slot::Text(value) => *value = Some(text.to_owned()),
        Slot::Bool(value) => *value = Some(!text.eq_ignore_ascii_case("false")),
        Slot::Int(value) => {
            let parsed = text.trim().parse::<i64>().map_err(|e| {
                ScalarError::Invalid(XmlError::ParseError(format!("invalid integer '{text}': {e}")))
            })?;
            *value = Some(parsed);
        }
        Slot::DateTime(value) => {
            *value = Some(parse_datetime(text).map_err(ScalarError::Invalid)?);
        }
        Slot::Record(_) | Slot::List(_) | Slot::Scalars(_) | Slot::Dict(_) => {
            return Err(ScalarError::NotScalar);
        }
    }
    Ok(())
}

fn decode_base64_to_text(text: &str) -> Result<String, XmlError> {
    let bytes = STANDARD
        .decode(text.trim())
        .map_err(|e| XmlError::ParseError(format!("invalid base64: {e}")))?;
    String::from_utf8(bytes).map_err(|e| XmlError::ParseError(format!("invalid UTF-8: {e}")))
}

fn without_last_char(s: &str) -> &str {
    let mut chars = s.chars();
    chars.next_back();
    chars.as_str()
}
