//! Table service records carried in Atom entries.
//!
//! Tables and entities arrive as Atom entries whose `content` element holds
//! an `m:properties` block of typed `d:` elements. The converters here are
//! meant to be handed to [`convert_response_to_feeds`]:
//!
//! ```
//! use rustack_core::HttpResponse;
//! use rustack_storage_model::table_from_entry;
//! use rustack_storage_xml::convert_response_to_feeds;
//!
//! let body = r#"<feed xmlns="http://www.w3.org/2005/Atom"
//!     xmlns:m="http://schemas.microsoft.com/ado/2007/08/dataservices/metadata"
//!     xmlns:d="http://schemas.microsoft.com/ado/2007/08/dataservices">
//!   <entry><content type="application/xml">
//!     <m:properties><d:TableName>orders</d:TableName></m:properties>
//!   </content></entry>
//! </feed>"#;
//! let response = HttpResponse::new(200, Vec::new(), body.as_bytes().to_vec());
//! let tables = convert_response_to_feeds(&response, table_from_entry).unwrap();
//! assert_eq!(tables.entries()[0].name.as_deref(), Some("orders"));
//! ```
//!
//! [`convert_response_to_feeds`]: rustack_storage_xml::convert_response_to_feeds

use std::collections::BTreeMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, SecondsFormat, Utc};
use quick_xml::Writer;
use quick_xml::events::BytesText;
use rustack_storage_xml::{
    ATOM_NAMESPACE, DATA_SERVICES_NAMESPACE, Element, EntryIdentity, EntryProperties,
    METADATA_NAMESPACE, XmlError, create_entry, entry_properties,
};

/// A table, as listed by the table service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    /// `TableName` property.
    pub name: Option<String>,
    /// Atom properties of the entry; `name` is the shortened entry id.
    pub entry: EntryProperties,
}

/// A typed entity property value.
#[derive(Debug, Clone, PartialEq)]
pub enum EdmValue {
    String(String),
    Int32(i32),
    Int64(i64),
    Double(f64),
    Boolean(bool),
    DateTime(DateTime<Utc>),
    Guid(String),
    Binary(Vec<u8>),
}

impl EdmValue {
    /// The `m:type` name, `None` for strings which are sent untyped.
    #[must_use]
    pub fn edm_type(&self) -> Option<&'static str> {
        match self {
            Self::String(_) => None,
            Self::Int32(_) => Some("Edm.Int32"),
            Self::Int64(_) => Some("Edm.Int64"),
            Self::Double(_) => Some("Edm.Double"),
            Self::Boolean(_) => Some("Edm.Boolean"),
            Self::DateTime(_) => Some("Edm.DateTime"),
            Self::Guid(_) => Some("Edm.Guid"),
            Self::Binary(_) => Some("Edm.Binary"),
        }
    }

    /// Element text of the value.
    #[must_use]
    pub fn to_wire_text(&self) -> String {
        match self {
            Self::String(s) | Self::Guid(s) => s.clone(),
            Self::Int32(n) => n.to_string(),
            Self::Int64(n) => n.to_string(),
            Self::Double(n) => n.to_string(),
            Self::Boolean(b) => b.to_string(),
            Self::DateTime(dt) => dt.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            Self::Binary(bytes) => STANDARD.encode(bytes),
        }
    }

    /// Parse element text according to its `m:type`.
    ///
    /// Unknown types are kept as strings.
    ///
    /// # Errors
    ///
    /// Returns `XmlError::ParseError` when the text does not fit the type.
    pub fn parse(edm_type: Option<&str>, text: &str) -> Result<Self, XmlError> {
        let invalid = |e: &dyn std::fmt::Display| {
            XmlError::ParseError(format!(
                "invalid {} value '{text}': {e}",
                edm_type.unwrap_or("Edm.String")
            ))
        };

        let value = match edm_type {
            None | Some("Edm.String") => Self::String(text.to_owned()),
            Some("Edm.Int32") => Self::Int32(text.trim().parse().map_err(|e| invalid(&e))?),
            Some("Edm.Int64") => Self::Int64(text.trim().parse().map_err(|e| invalid(&e))?),
            Some("Edm.Double") => Self::Double(text.trim().parse().map_err(|e| invalid(&e))?),
            Some("Edm.Boolean") => Self::Boolean(text.trim().eq_ignore_ascii_case("true")),
            Some("Edm.DateTime") => Self::DateTime(
                DateTime::parse_from_rfc3339(text.trim())
                    .map_err(|e| invalid(&e))?
                    .with_timezone(&Utc),
            ),
            Some("Edm.Guid") => Self::Guid(text.to_owned()),
            Some("Edm.Binary") => {
                Self::Binary(STANDARD.decode(text.trim()).map_err(|e| invalid(&e))?)
            }
            Some(other) => {
                tracing::debug!(edm_type = other, "keeping unknown entity property type as text");
                Self::String(text.to_owned())
            }
        };
        Ok(value)
    }
}

impl From<&str> for EdmValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for EdmValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i32> for EdmValue {
    fn from(n: i32) -> Self {
        Self::Int32(n)
    }
}

impl From<i64> for EdmValue {
    fn from(n: i64) -> Self {
        Self::Int64(n)
    }
}

impl From<f64> for EdmValue {
    fn from(n: f64) -> Self {
        Self::Double(n)
    }
}

impl From<bool> for EdmValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<DateTime<Utc>> for EdmValue {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::DateTime(dt)
    }
}

/// One entity property; a `None` value is an explicit null.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityProperty {
    /// Declared `m:type`, if any.
    pub edm_type: Option<String>,
    pub value: Option<EdmValue>,
}

impl From<EdmValue> for EntityProperty {
    fn from(value: EdmValue) -> Self {
        Self {
            edm_type: value.edm_type().map(str::to_owned),
            value: Some(value),
        }
    }
}

/// A table entity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Entity {
    /// `m:etag` of the entry.
    pub etag: Option<String>,
    /// Properties by name, including `PartitionKey`, `RowKey` and `Timestamp`.
    pub properties: BTreeMap<String, EntityProperty>,
}

impl Entity {
    /// Create an entity with its keys.
    #[must_use]
    pub fn new(partition_key: &str, row_key: &str) -> Self {
        let mut entity = Self::default();
        entity.insert("PartitionKey", partition_key);
        entity.insert("RowKey", row_key);
        entity
    }

    /// Set a typed property value, returning the previous property.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<EdmValue>,
    ) -> Option<EntityProperty> {
        self.insert_property(name, EntityProperty::from(value.into()))
    }

    /// Set a property as-is, returning the previous one.
    pub fn insert_property(
        &mut self,
        name: impl Into<String>,
        property: EntityProperty,
    ) -> Option<EntityProperty> {
        self.properties.insert(name.into(), property)
    }

    /// The value of a property, `None` when missing or null.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&EdmValue> {
        self.properties.get(name).and_then(|p| p.value.as_ref())
    }

    #[must_use]
    pub fn partition_key(&self) -> Option<&str> {
        self.string_property("PartitionKey")
    }

    #[must_use]
    pub fn row_key(&self) -> Option<&str> {
        self.string_property("RowKey")
    }

    fn string_property(&self, name: &str) -> Option<&str> {
        match self.get(name) {
            Some(EdmValue::String(s)) => Some(s),
            _ => None,
        }
    }
}

/// Convert a table entry.
///
/// # Errors
///
/// Never fails; the signature matches the feed converter contract.
#[allow(clippy::unnecessary_wraps)]
pub fn table_from_entry(entry: &Element) -> Result<Table, XmlError> {
    let name = properties_element(entry)
        .and_then(|properties| properties.find_ns(DATA_SERVICES_NAMESPACE, "TableName"))
        .map(|name| name.text().to_owned());
    Ok(Table {
        name,
        entry: entry_properties(entry, EntryIdentity::Id { prefix_to_skip: None }),
    })
}

/// Convert an entity entry.
///
/// # Errors
///
/// Returns `XmlError::MissingElement` when the entry has no `m:properties`
/// block, or `XmlError::ParseError` when a typed value is malformed.
pub fn entity_from_entry(entry: &Element) -> Result<Entity, XmlError> {
    let properties = properties_element(entry)
        .ok_or_else(|| XmlError::MissingElement("content/m:properties".to_owned()))?;

    let mut entity = Entity {
        etag: entry_properties(entry, EntryIdentity::None).etag,
        properties: BTreeMap::new(),
    };
    for property in properties.children() {
        if property.namespace() != Some(DATA_SERVICES_NAMESPACE) {
            continue;
        }
        let edm_type = property.attribute_ns(METADATA_NAMESPACE, "type");
        let is_null = property.attribute_ns(METADATA_NAMESPACE, "null") == Some("true");
        let value = if is_null {
            None
        } else {
            Some(EdmValue::parse(edm_type, property.text())?)
        };
        entity.properties.insert(
            property.name().to_owned(),
            EntityProperty {
                edm_type: edm_type.map(str::to_owned),
                value,
            },
        );
    }
    Ok(entity)
}

/// Build the Atom entry document used to insert or update an entity.
///
/// # Errors
///
/// Returns `XmlError::Io` if writing the properties block fails.
pub fn entity_to_entry(entity: &Entity) -> Result<String, XmlError> {
    let mut writer = Writer::new(Vec::new());
    writer
        .create_element("m:properties")
        .write_inner_content(|w| {
            for (name, property) in &entity.properties {
                let mut element = w.create_element(format!("d:{name}"));
                if let Some(edm_type) = &property.edm_type {
                    element = element.with_attribute(("m:type", edm_type.as_str()));
                }
                match &property.value {
                    Some(value) => {
                        element.write_text_content(BytesText::new(&value.to_wire_text()))?;
                    }
                    None => {
                        element.with_attribute(("m:null", "true")).write_empty()?;
                    }
                }
            }
            Ok(())
        })?;
    let body = String::from_utf8(writer.into_inner())
        .map_err(|e| XmlError::ParseError(e.to_string()))?;
    Ok(create_entry(&body))
}

fn properties_element(entry: &Element) -> Option<&Element> {
    entry
        .find_ns(ATOM_NAMESPACE, "content")
        .and_then(|content| content.find_ns(METADATA_NAMESPACE, "properties"))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rustack_core::HttpResponse;
    use rustack_storage_xml::convert_response_to_feeds;

    use super::*;

    const ENTITY_FEED: &str = r#"<?xml version="1.0" encoding="utf-8" standalone="yes"?>
<feed xml:base="https://acct.table.core.windows.net/"
      xmlns:d="http://schemas.microsoft.com/ado/2007/08/dataservices"
      xmlns:m="http://schemas.microsoft.com/ado/2007/08/dataservices/metadata"
      xmlns="http://www.w3.org/2005/Atom">
  <id>https://acct.table.core.windows.net/orders</id>
  <entry m:etag="W/&quot;datetime'2024-01-02T03%3A04%3A05.1234567Z'&quot;">
    <id>https://acct.table.core.windows.net/orders(PartitionKey='p',RowKey='1')</id>
    <content type="application/xml">
      <m:properties>
        <d:PartitionKey>p</d:PartitionKey>
        <d:RowKey>1</d:RowKey>
        <d:Timestamp m:type="Edm.DateTime">2024-01-02T03:04:05.1234567Z</d:Timestamp>
        <d:Quantity m:type="Edm.Int32">12</d:Quantity>
        <d:Total m:type="Edm.Double">9.5</d:Total>
        <d:Shipped m:type="Edm.Boolean">false</d:Shipped>
        <d:Note m:null="true" />
        <d:Blob m:type="Edm.Binary">AQID</d:Blob>
      </m:properties>
    </content>
  </entry>
</feed>"#;

    #[test]
    fn test_should_convert_entity_feed() {
        let response = HttpResponse::new(
            200,
            vec![("x-ms-continuation-NextPartitionKey".to_owned(), "p2".to_owned())],
            ENTITY_FEED.as_bytes().to_vec(),
        );
        let feed = convert_response_to_feeds(&response, entity_from_entry).unwrap();
        assert_eq!(feed.continuation().unwrap().get("NextPartitionKey"), Some("p2"));

        let entity = &feed.entries()[0];
        assert!(entity.etag.as_deref().unwrap().starts_with("W/\"datetime"));
        assert_eq!(entity.partition_key(), Some("p"));
        assert_eq!(entity.row_key(), Some("1"));
        assert_eq!(entity.get("Quantity"), Some(&EdmValue::Int32(12)));
        assert_eq!(entity.get("Total"), Some(&EdmValue::Double(9.5)));
        assert_eq!(entity.get("Shipped"), Some(&EdmValue::Boolean(false)));
        assert_eq!(entity.get("Blob"), Some(&EdmValue::Binary(vec![1, 2, 3])));
        assert!(entity.properties.contains_key("Note"));
        assert!(entity.get("Note").is_none());
        match entity.get("Timestamp") {
            Some(EdmValue::DateTime(ts)) => {
                assert_eq!(ts.to_rfc3339_opts(SecondsFormat::Secs, true), "2024-01-02T03:04:05Z");
            }
            other => panic!("unexpected timestamp: {other:?}"),
        }
    }

    #[test]
    fn test_should_reject_entry_without_properties() {
        let body = r#"<entry xmlns="http://www.w3.org/2005/Atom"><title/></entry>"#;
        let response = HttpResponse::new(200, Vec::new(), body.as_bytes().to_vec());
        let result = convert_response_to_feeds(&response, entity_from_entry);
        assert!(matches!(result, Err(XmlError::MissingElement(_))));
    }

    #[test]
    fn test_should_reject_malformed_typed_value() {
        let err = EdmValue::parse(Some("Edm.Int32"), "twelve").unwrap_err();
        assert!(err.to_string().contains("Edm.Int32"));
    }

    #[test]
    fn test_should_keep_unknown_types_as_text() {
        let value = EdmValue::parse(Some("Edm.Decimal"), "1.0").unwrap();
        assert_eq!(value, EdmValue::String("1.0".to_owned()));
    }

    #[test]
    fn test_should_convert_table_entry() {
        let body = r#"<entry xmlns="http://www.w3.org/2005/Atom"
    xmlns:m="http://schemas.microsoft.com/ado/2007/08/dataservices/metadata"
    xmlns:d="http://schemas.microsoft.com/ado/2007/08/dataservices">
  <id>https://acct.table.core.windows.net/Tables('orders')</id>
  <updated>2024-01-01T00:00:00Z</updated>
  <content type="application/xml"><m:properties><d:TableName>orders</d:TableName></m:properties></content>
</entry>"#;
        let table = table_from_entry(&Element::parse(body.as_bytes()).unwrap()).unwrap();
        assert_eq!(table.name.as_deref(), Some("orders"));
        assert_eq!(table.entry.name.as_deref(), Some("Tables('orders')"));
        assert_eq!(table.entry.updated.as_deref(), Some("2024-01-01T00:00:00Z"));
    }

    #[test]
    fn test_should_round_trip_entity_through_entry() {
        let mut entity = Entity::new("p", "r & 1");
        entity.insert("Count", 7_i64);
        entity.insert("Ratio", 0.25);
        entity.insert("Active", true);
        entity.insert(
            "Created",
            Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap(),
        );
        entity.insert_property(
            "Missing",
            EntityProperty {
                edm_type: Some("Edm.Int32".to_owned()),
                value: None,
            },
        );

        let xml = entity_to_entry(&entity).unwrap();
        assert!(xml.contains("<d:Count m:type=\"Edm.Int64\">7</d:Count>"));
        assert!(xml.contains("<d:RowKey>r &amp; 1</d:RowKey>"));
        assert!(xml.contains("<d:Missing m:type=\"Edm.Int32\" m:null=\"true\"/>"));

        let root = Element::parse(xml.as_bytes()).unwrap();
        let parsed = entity_from_entry(&root).unwrap();
        assert_eq!(parsed, entity);
    }
}
