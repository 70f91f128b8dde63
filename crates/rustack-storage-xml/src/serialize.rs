//! Record serialization: converting records to XML request bodies.
//!
//! A record is written as an element named after its type, holding one
//! element per present field. Nested records and lists are written in place
//! under their own type names, with no wrapper element. Absent fields are
//! omitted.

use std::io;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use quick_xml::events::{BytesDecl, BytesText, Event};

pub use quick_xml::Writer;

use crate::record::{FieldKind, FieldValue, XmlFragment, XmlRecord};

/// The XML declaration written at the start of a document.
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="utf-8"?>"#;

/// Datetime layout used on the wire, six fractional digits and no zone.
pub(crate) const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Serialize a record, optional record or list of records to XML text.
///
/// With `declaration` set, the output starts with [`XML_DECLARATION`]. An
/// absent value produces an empty string without a declaration.
///
/// This never fails. Writing to memory cannot fail in practice; if it does,
/// the error is logged and an empty string is returned.
#[must_use]
pub fn to_xml<S: XmlFragment + ?Sized>(source: &S, declaration: bool) -> String {
    if source.is_absent() {
        return String::new();
    }

    let mut writer = Writer::new(Vec::with_capacity(512));
    if let Err(e) = write_document(&mut writer, source, declaration) {
        tracing::error!(error = %e, "failed to serialize record XML");
        return String::new();
    }

    match String::from_utf8(writer.into_inner()) {
        Ok(xml) => xml,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    }
}

fn write_document<S: XmlFragment + ?Sized>(
    writer: &mut Writer<Vec<u8>>,
    source: &S,
    declaration: bool,
) -> io::Result<()> {
    if declaration {
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    }
    source.write_fragment(writer)
}

/// Write a record element with all of its present fields.
///
/// Attribute fields go on the record's start tag; every other kind is written
/// as child content in declaration order.
pub fn write_record<T: XmlRecord>(writer: &mut Writer<Vec<u8>>, record: &T) -> io::Result<()> {
    let mut element = writer.create_element(T::TYPE_NAME);
    for field in T::FIELDS {
        if let FieldKind::Attribute { name } = field.kind {
            if let Some(FieldValue::Text(value)) = record.value(field.id) {
                element = element.with_attribute((name, value));
            }
        }
    }

    element.write_inner_content(|w| {
        for field in T::FIELDS {
            let Some(value) = record.value(field.id) else {
                continue;
            };
            match (field.kind, value) {
                (FieldKind::Attribute { .. }, _) => {}
                // Neither has a defined write shape.
                (FieldKind::ScalarListOf { .. } | FieldKind::DictOf { .. }, _) => {
                    tracing::debug!(
                        record = T::TYPE_NAME,
                        field = field.id,
                        kind = field.kind.as_str(),
                        "skipping field without a write shape"
                    );
                }
                (_, FieldValue::Nested(nested)) => nested.write_fragment(w)?,
                (_, FieldValue::Dict(map)) => {
                    w.create_element(field.wire_name()).write_inner_content(|w| {
                        for (key, text) in map {
                            write_text_element(w, key, text)?;
                        }
                        Ok(())
                    })?;
                }
                (_, FieldValue::Scalars(_)) => {}
                (_, scalar) => {
                    let text = scalar_text(scalar);
                    write_text_element(w, &field.wire_name(), &text)?;
                }
            }
        }
        Ok(())
    })?;
    Ok(())
}

/// Write a simple `<tag>text</tag>` element, escaping only `&`, `<` and `>`.
fn write_text_element(writer: &mut Writer<Vec<u8>>, tag: &str, text: &str) -> io::Result<()> {
    writer
        .create_element(tag)
        .write_text_content(BytesText::from_escaped(quick_xml::escape::partial_escape(
            text,
        )))?;
    Ok(())
}

/// Text form of a scalar value.
fn scalar_text(value: FieldValue<'_>) -> String {
    match value {
        FieldValue::Text(s) => s.to_owned(),
        FieldValue::Bool(b) => b.to_string(),
        FieldValue::Int(n) => n.to_string(),
        FieldValue::DateTime(dt) => dt.format(DATETIME_FORMAT).to_string(),
        FieldValue::Base64(s) => STANDARD.encode(s.as_bytes()),
        FieldValue::Nested(_) | FieldValue::Scalars(_) | FieldValue::Dict(_) => String::new(),
    }
}
