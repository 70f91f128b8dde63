//! Record schema: static field descriptors and typed field slots.
//!
//! Every record type lists its fields once, in declaration order, as
//! [`Field`] descriptors. The descriptor's [`FieldKind`] decides how the
//! parser fills the field and how the serializer writes it. Field storage is
//! reached through [`XmlRecord::slot`] (for filling) and
//! [`XmlRecord::value`] (for writing), both keyed by the field identifier.
//!
//! Records are normally declared with [`xml_record!`](crate::xml_record),
//! which emits the struct, its descriptor list and both accessors:
//!
//! ```
//! use rustack_storage_xml::{xml_record, from_xml};
//!
//! xml_record! {
//!     #[derive(Debug, Clone, Default, PartialEq)]
//!     pub struct RetentionPolicy {
//!         pub enabled: Option<bool> = bool,
//!         pub days: Option<i64> = int,
//!     }
//! }
//!
//! let xml = b"<RetentionPolicy><Enabled>true</Enabled><Days>7</Days></RetentionPolicy>";
//! let policy = from_xml::<RetentionPolicy>(xml).unwrap().unwrap();
//! assert_eq!(policy.days, Some(7));
//! ```
//!
//! Field kinds accepted by the macro:
//!
//! | Keyword | Storage | Kind |
//! |---|---|---|
//! | `text` | `Option<String>` | [`FieldKind::Scalar`] |
//! | `bool` | `Option<bool>` | [`FieldKind::Scalar`] |
//! | `int` | `Option<i64>` | [`FieldKind::Scalar`] |
//! | `datetime` | `Option<NaiveDateTime>` | [`FieldKind::Scalar`] |
//! | `record` | `Option<R>` | [`FieldKind::Record`] |
//! | `list("Tag")` | `Vec<R>` | [`FieldKind::ListOf`] |
//! | `scalars("Tag")` | `Vec<String>` | [`FieldKind::ScalarListOf`] |
//! | `dict_of("Pair", "Key", "Value")` | `Option<BTreeMap<String, String>>` | [`FieldKind::DictOf`] |
//! | `attr("Name")` | `Option<String>` | [`FieldKind::Attribute`] |
//! | `dict` | `Option<BTreeMap<String, String>>` | [`FieldKind::Dict`] |
//! | `base64` | `Option<String>` | [`FieldKind::Base64Text`] |

use std::collections::BTreeMap;
use std::io;

use chrono::NaiveDateTime;
use quick_xml::Writer;

use crate::deserialize::fill_instance;
use crate::dom::Element;
use crate::error::XmlError;
use crate::naming::serialization_name;
use crate::serialize::write_record;

/// How a field is marshalled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// A single text-convertible value in a child element.
    Scalar,
    /// A nested record in a child element.
    Record,
    /// Repeated child elements, each a record.
    ListOf {
        /// Element name of each item.
        item_tag: &'static str,
    },
    /// A container element holding repeated scalar elements.
    ScalarListOf {
        /// Element name of each item.
        item_tag: &'static str,
    },
    /// A container element holding key/value pair elements.
    DictOf {
        /// Element name of each pair.
        pair_tag: &'static str,
        /// Element name of the key inside a pair.
        key_tag: &'static str,
        /// Element name of the value inside a pair.
        value_tag: &'static str,
    },
    /// A plain attribute of the record's own element.
    Attribute {
        /// Attribute name.
        name: &'static str,
    },
    /// A container element whose children map tag name to text.
    Dict,
    /// A child element holding base64-encoded UTF-8 text.
    Base64Text,
}

impl FieldKind {
    /// Short name used in diagnostics.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scalar => "scalar",
            Self::Record => "record",
            Self::ListOf { .. } => "list",
            Self::ScalarListOf { .. } => "scalar list",
            Self::DictOf { .. } => "dict of pairs",
            Self::Attribute { .. } => "attribute",
            Self::Dict => "dict",
            Self::Base64Text => "base64 text",
        }
    }
}

/// Static descriptor of one record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    /// Field identifier (snake_case).
    pub id: &'static str,
    /// Marshalling kind.
    pub kind: FieldKind,
}

impl Field {
    /// Create a field descriptor.
    #[must_use]
    pub const fn new(id: &'static str, kind: FieldKind) -> Self {
        Self { id, kind }
    }

    /// Wire element name derived from the identifier.
    #[must_use]
    pub fn wire_name(&self) -> String {
        serialization_name(self.id)
    }
}

/// Mutable access to a field's storage, used while filling a record.
pub enum Slot<'a> {
    /// Text scalar, attribute or base64 text.
    Text(&'a mut Option<String>),
    /// Boolean scalar.
    Bool(&'a mut Option<bool>),
    /// Integer scalar.
    Int(&'a mut Option<i64>),
    /// Datetime scalar.
    DateTime(&'a mut Option<NaiveDateTime>),
    /// Nested record.
    Record(&'a mut dyn RecordSlot),
    /// List of records.
    List(&'a mut dyn ListSlot),
    /// List of scalars.
    Scalars(&'a mut Vec<String>),
    /// Dictionary.
    Dict(&'a mut Option<BTreeMap<String, String>>),
}

impl Slot<'_> {
    /// Short name used in diagnostics.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::DateTime(_) => "datetime",
            Self::Record(_) => "record",
            Self::List(_) => "list",
            Self::Scalars(_) => "scalar list",
            Self::Dict(_) => "dict",
        }
    }
}

impl std::fmt::Debug for Slot<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Slot").field(&self.as_str()).finish()
    }
}

/// Read access to a present field value, used while serializing a record.
#[derive(Clone, Copy)]
pub enum FieldValue<'a> {
    /// Text scalar or attribute.
    Text(&'a str),
    /// Boolean scalar.
    Bool(bool),
    /// Integer scalar.
    Int(i64),
    /// Datetime scalar.
    DateTime(&'a NaiveDateTime),
    /// Decoded text of a base64 field.
    Base64(&'a str),
    /// Nested record or list of records.
    Nested(&'a dyn XmlFragment),
    /// List of scalars.
    Scalars(&'a [String]),
    /// Dictionary.
    Dict(&'a BTreeMap<String, String>),
}

impl std::fmt::Debug for FieldValue<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(v) => f.debug_tuple("Text").field(v).finish(),
            Self::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            Self::Int(v) => f.debug_tuple("Int").field(v).finish(),
            Self::DateTime(v) => f.debug_tuple("DateTime").field(v).finish(),
            Self::Base64(v) => f.debug_tuple("Base64").field(v).finish(),
            Self::Nested(_) => f.write_str("Nested(..)"),
            Self::Scalars(v) => f.debug_tuple("Scalars").field(v).finish(),
            Self::Dict(v) => f.debug_tuple("Dict").field(v).finish(),
        }
    }
}

/// Anything that serializes to an XML fragment: records, optional records and
/// lists of records.
pub trait XmlFragment {
    /// Write this value as XML elements.
    ///
    /// # Errors
    ///
    /// Returns `io::Error` if writing to the underlying writer fails.
    fn write_fragment(&self, writer: &mut Writer<Vec<u8>>) -> io::Result<()>;

    /// Whether the value is absent; absent values serialize to nothing at all.
    fn is_absent(&self) -> bool {
        false
    }
}

/// A record type the marshalling engine can fill and serialize.
pub trait XmlRecord: XmlFragment + Default {
    /// Type identifier; also the element name when serialized.
    const TYPE_NAME: &'static str;

    /// Expected root element name when parsed as a whole document.
    const XML_NAME: &'static str = Self::TYPE_NAME;

    /// Field descriptors in declaration order.
    const FIELDS: &'static [Field];

    /// Mutable access to the storage of field `id`.
    fn slot(&mut self, id: &str) -> Option<Slot<'_>>;

    /// The value of field `id`, `None` when the field is absent.
    fn value(&self, id: &str) -> Option<FieldValue<'_>>;
}

/// Storage of a nested record field.
pub trait RecordSlot {
    /// Replace the field with a new record filled from `element`.
    ///
    /// # Errors
    ///
    /// Returns `XmlError` if the nested record cannot be filled.
    fn fill_from(&mut self, element: &Element) -> Result<(), XmlError>;

    /// Reset the field to absent.
    fn clear(&mut self);
}

impl<T: XmlRecord> RecordSlot for Option<T> {
    fn fill_from(&mut self, element: &Element) -> Result<(), XmlError> {
        *self = Some(fill_instance(element)?);
        Ok(())
    }

    fn clear(&mut self) {
        *self = None;
    }
}

/// Storage of a list-of-records field.
pub trait ListSlot {
    /// Append a new item filled from `element`.
    ///
    /// # Errors
    ///
    /// Returns `XmlError` if the item cannot be filled.
    fn push_from(&mut self, element: &Element) -> Result<(), XmlError>;

    /// Remove all items.
    fn clear(&mut self);

    /// Type identifier of the item record.
    fn item_type_name(&self) -> &'static str;
}

impl<T: XmlRecord> ListSlot for Vec<T> {
    fn push_from(&mut self, element: &Element) -> Result<(), XmlError> {
        self.push(fill_instance(element)?);
        Ok(())
    }

    fn clear(&mut self) {
        Vec::clear(self);
    }

    fn item_type_name(&self) -> &'static str {
        T::TYPE_NAME
    }
}

impl<T: XmlRecord> XmlFragment for Option<T> {
    fn write_fragment(&self, writer: &mut Writer<Vec<u8>>) -> io::Result<()> {
        match self {
            Some(record) => write_record(writer, record),
            None => Ok(()),
        }
    }

    fn is_absent(&self) -> bool {
        self.is_none()
    }
}

impl<T: XmlRecord> XmlFragment for [T] {
    fn write_fragment(&self, writer: &mut Writer<Vec<u8>>) -> io::Result<()> {
        for record in self {
            write_record(writer, record)?;
        }
        Ok(())
    }
}

impl<T: XmlRecord> XmlFragment for Vec<T> {
    fn write_fragment(&self, writer: &mut Writer<Vec<u8>>) -> io::Result<()> {
        self.as_slice().write_fragment(writer)
    }
}

/// Declare a record struct together with its [`XmlRecord`] schema.
///
/// See the [module documentation](crate::record) for the field kinds.
/// `struct Name as "Wire"` sets [`XmlRecord::XML_NAME`].
#[macro_export]
macro_rules! xml_record {
    (@kind text) => { $crate::FieldKind::Scalar };
    (@kind bool) => { $crate::FieldKind::Scalar };
    (@kind int) => { $crate::FieldKind::Scalar };
    (@kind datetime) => { $crate::FieldKind::Scalar };
    (@kind record) => { $crate::FieldKind::Record };
    (@kind list($tag:literal)) => { $crate::FieldKind::ListOf { item_tag: $tag } };
    (@kind scalars($tag:literal)) => { $crate::FieldKind::ScalarListOf { item_tag: $tag } };
    (@kind dict_of($pair:literal, $key:literal, $value:literal)) => {
        $crate::FieldKind::DictOf { pair_tag: $pair, key_tag: $key, value_tag: $value }
    };
    (@kind attr($name:literal)) => { $crate::FieldKind::Attribute { name: $name } };
    (@kind dict) => { $crate::FieldKind::Dict };
    (@kind base64) => { $crate::FieldKind::Base64Text };

    (@slot text $place:expr) => { $crate::Slot::Text(&mut $place) };
    (@slot attr $place:expr) => { $crate::Slot::Text(&mut $place) };
    (@slot base64 $place:expr) => { $crate::Slot::Text(&mut $place) };
    (@slot bool $place:expr) => { $crate::Slot::Bool(&mut $place) };
    (@slot int $place:expr) => { $crate::Slot::Int(&mut $place) };
    (@slot datetime $place:expr) => { $crate::Slot::DateTime(&mut $place) };
    (@slot record $place:expr) => { $crate::Slot::Record(&mut $place) };
    (@slot list $place:expr) => { $crate::Slot::List(&mut $place) };
    (@slot scalars $place:expr) => { $crate::Slot::Scalars(&mut $place) };
    (@slot dict_of $place:expr) => { $crate::Slot::Dict(&mut $place) };
    (@slot dict $place:expr) => { $crate::Slot::Dict(&mut $place) };

    (@value text $place:expr) => { $place.as_deref().map($crate::FieldValue::Text) };
    (@value attr $place:expr) => { $place.as_deref().map($crate::FieldValue::Text) };
    (@value base64 $place:expr) => { $place.as_deref().map($crate::FieldValue::Base64) };
    (@value bool $place:expr) => { $place.map($crate::FieldValue::Bool) };
    (@value int $place:expr) => { $place.map($crate::FieldValue::Int) };
    (@value datetime $place:expr) => { $place.as_ref().map($crate::FieldValue::DateTime) };
    (@value record $place:expr) => {
        if $place.is_some() { Some($crate::FieldValue::Nested(&$place)) } else { None }
    };
    (@value list $place:expr) => { Some($crate::FieldValue::Nested(&$place)) };
    (@value scalars $place:expr) => { Some($crate::FieldValue::Scalars(&$place)) };
    (@value dict_of $place:expr) => { $place.as_ref().map($crate::FieldValue::Dict) };
    (@value dict $place:expr) => { $place.as_ref().map($crate::FieldValue::Dict) };

    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident $(as $xml_name:literal)? {
            $(
                $(#[$field_meta:meta])*
                $field_vis:vis $field:ident : $ty:ty = $kind:ident $(($($arg:literal),+))?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[$field_meta])*
                $field_vis $field: $ty,
            )*
        }

        impl $crate::XmlRecord for $name {
            const TYPE_NAME: &'static str = stringify!($name);
            $(const XML_NAME: &'static str = $xml_name;)?
            const FIELDS: &'static [$crate::Field] = &[
                $(
                    $crate::Field::new(
                        stringify!($field),
                        $crate::xml_record!(@kind $kind $(($($arg),+))?),
                    ),
                )*
            ];

            fn slot(&mut self, id: &str) -> Option<$crate::Slot<'_>> {
                match id {
                    $(stringify!($field) => Some($crate::xml_record!(@slot $kind self.$field)),)*
                    _ => None,
                }
            }

            fn value(&self, id: &str) -> Option<$crate::FieldValue<'_>> {
                match id {
                    $(stringify!($field) => $crate::xml_record!(@value $kind self.$field),)*
                    _ => None,
                }
            }
        }

        impl $crate::XmlFragment for $name {
            fn write_fragment(
                &self,
                writer: &mut $crate::serialize::Writer<Vec<u8>>,
            ) -> std::io::Result<()> {
                $crate::serialize::write_record(writer, self)
            }
        }
    };
}
