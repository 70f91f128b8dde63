//! Record types for the legacy storage XML APIs.
//!
//! Blob, queue, access policy and service property records are declared with
//! [`rustack_storage_xml::xml_record!`] and marshalled by that crate. Table
//! service tables and entities travel in Atom entries and have their own
//! converters in [`table`].
#![allow(missing_docs)]

pub mod table;
pub mod types;

pub use table::{
    EdmValue, Entity, EntityProperty, Table, entity_from_entry, entity_to_entry, table_from_entry,
};
pub use types::{
    AccessPolicy, Blob, BlobEnumResults, BlobProperties, Container, ContainerEnumResults, Logging,
    Metrics, Properties, Queue, QueueEnumResults, QueueMessage, QueueMessagesList,
    RetentionPolicy, SignedIdentifier, SignedIdentifiers, StorageError, StorageServiceProperties,
};
