//! XML and Atom marshalling for the legacy storage API generation.
//!
//! This crate converts between typed records and the XML wire format used by
//! the older blob/queue/table storage APIs, and extracts data from Atom feeds
//! returned by the table service.
//!
//! # Key components
//!
//! - [`serialization_name`] derives wire element names from field identifiers
//! - [`xml_record!`] declares a record together with its static field schema
//! - [`to_xml`] and [`to_request_bytes`] build outbound request bodies
//! - [`from_xml`], [`parse_enum_results_list`] and [`parse_simple_list`] fill
//!   records from response bodies
//! - [`convert_response_to_feeds`] and [`entry_properties`] handle Atom feeds
//!
//! # Wire conventions
//!
//! - XML declaration: `<?xml version="1.0" encoding="utf-8"?>`
//! - Booleans: anything other than a case-insensitive `false` reads as true
//! - Timestamps: `YYYY-MM-DDTHH:MM:SS.ffffff` without a zone suffix
//! - Continuation tokens: response headers containing `x-ms-continuation`

pub mod body;
pub mod deserialize;
pub mod dom;
pub mod error;
pub mod feed;
pub mod headers;
pub mod naming;
pub mod record;
pub mod serialize;

pub use body::{RequestBody, to_request_bytes, to_request_bytes_strict};
pub use deserialize::{
    fill_instance, from_xml, parse_datetime, parse_enum_results_list, parse_response,
    parse_simple_list,
};
pub use dom::{Element, XmlAttribute};
pub use error::XmlError;
pub use feed::{
    ATOM_NAMESPACE, DATA_SERVICES_NAMESPACE, EntryIdentity, EntryProperties, Feed,
    METADATA_NAMESPACE, continuation_from_headers, convert_response_to_feeds, create_entry,
    create_entry_at, entry_properties, readable_id,
};
pub use headers::{headers_in, headers_to_dict, headers_with_prefix};
pub use naming::serialization_name;
pub use record::{Field, FieldKind, FieldValue, ListSlot, RecordSlot, Slot, XmlFragment, XmlRecord};
pub use serialize::{XML_DECLARATION, to_xml};
