//! Blob, queue, access policy and service property records.

use std::collections::BTreeMap;

use rustack_storage_xml::xml_record;
use serde::{Deserialize, Serialize};

xml_record! {
    /// Container properties from a container listing.
    #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Properties {
        pub last_modified: Option<String> = text,
        pub etag: Option<String> = text,
        pub lease_status: Option<String> = text,
        pub lease_state: Option<String> = text,
        pub lease_duration: Option<String> = text,
    }
}

xml_record! {
    /// A blob container.
    #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Container {
        pub name: Option<String> = text,
        pub url: Option<String> = text,
        pub properties: Option<Properties> = record,
        pub metadata: Option<BTreeMap<String, String>> = dict,
    }
}

xml_record! {
    /// Result of listing containers.
    #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ContainerEnumResults as "EnumerationResults" {
        pub prefix: Option<String> = text,
        pub marker: Option<String> = text,
        pub max_results: Option<i64> = int,
        pub containers: Vec<Container> = list("Container"),
        pub next_marker: Option<String> = text,
    }
}

xml_record! {
    /// Blob properties from a blob listing.
    #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct BlobProperties {
        pub last_modified: Option<String> = text,
        pub etag: Option<String> = text,
        pub content_length: Option<i64> = int,
        pub content_type: Option<String> = text,
        pub content_encoding: Option<String> = text,
        pub content_language: Option<String> = text,
        pub content_md5: Option<String> = text,
        pub cache_control: Option<String> = text,
        pub x_ms_blob_sequence_number: Option<i64> = int,
        pub blob_type: Option<String> = text,
        pub lease_status: Option<String> = text,
        pub lease_state: Option<String> = text,
        pub lease_duration: Option<String> = text,
        pub copy_id: Option<String> = text,
        pub copy_source: Option<String> = text,
        pub copy_status: Option<String> = text,
        pub copy_progress: Option<String> = text,
        pub copy_completion_time: Option<String> = text,
        pub copy_status_description: Option<String> = text,
    }
}

xml_record! {
    /// A blob.
    #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Blob {
        pub name: Option<String> = text,
        pub snapshot: Option<String> = text,
        pub url: Option<String> = text,
        pub properties: Option<BlobProperties> = record,
        pub metadata: Option<BTreeMap<String, String>> = dict,
    }
}

xml_record! {
    /// Result of listing the blobs of a container.
    #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct BlobEnumResults as "EnumerationResults" {
        pub container_name: Option<String> = attr("ContainerName"),
        pub prefix: Option<String> = text,
        pub marker: Option<String> = text,
        pub max_results: Option<i64> = int,
        pub delimiter: Option<String> = text,
        pub blobs: Vec<Blob> = list("Blob"),
        pub next_marker: Option<String> = text,
    }
}

xml_record! {
    /// A queue.
    #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Queue {
        pub name: Option<String> = text,
        pub url: Option<String> = text,
        pub metadata: Option<BTreeMap<String, String>> = dict,
    }
}

xml_record! {
    /// Result of listing queues.
    #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct QueueEnumResults as "EnumerationResults" {
        pub prefix: Option<String> = text,
        pub marker: Option<String> = text,
        pub max_results: Option<i64> = int,
        pub queues: Vec<Queue> = list("Queue"),
        pub next_marker: Option<String> = text,
    }
}

xml_record! {
    /// A queue message. The text travels base64-encoded.
    #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct QueueMessage {
        pub message_id: Option<String> = text,
        pub insertion_time: Option<String> = text,
        pub expiration_time: Option<String> = text,
        pub pop_receipt: Option<String> = text,
        pub time_next_visible: Option<String> = text,
        pub dequeue_count: Option<i64> = int,
        pub message_text: Option<String> = base64,
    }
}

impl QueueMessage {
    /// A message carrying only `text`, as sent when putting a message.
    #[must_use]
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            message_text: Some(text.into()),
            ..Self::default()
        }
    }
}

xml_record! {
    /// Messages returned by a get or peek.
    #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct QueueMessagesList {
        pub queue_messages: Vec<QueueMessage> = list("QueueMessage"),
    }
}

xml_record! {
    /// Validity window and permissions of a stored access policy.
    #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct AccessPolicy {
        pub start: Option<String> = text,
        pub expiry: Option<String> = text,
        pub permission: Option<String> = text,
    }
}

xml_record! {
    /// A named stored access policy.
    #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SignedIdentifier {
        pub id: Option<String> = text,
        pub access_policy: Option<AccessPolicy> = record,
    }
}

xml_record! {
    /// The stored access policies of a container, queue or table.
    #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SignedIdentifiers {
        pub signed_identifiers: Vec<SignedIdentifier> = list("SignedIdentifier"),
    }
}

xml_record! {
    #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RetentionPolicy {
        pub enabled: Option<bool> = bool,
        pub days: Option<i64> = int,
    }
}

xml_record! {
    /// Analytics logging settings.
    #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Logging {
        pub version: Option<String> = text,
        pub delete: Option<bool> = bool,
        pub read: Option<bool> = bool,
        pub write: Option<bool> = bool,
        pub retention_policy: Option<RetentionPolicy> = record,
    }
}

xml_record! {
    /// Analytics metrics settings.
    #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Metrics {
        pub version: Option<String> = text,
        pub enabled: Option<bool> = bool,
        pub include_apis: Option<bool> = bool,
        pub retention_policy: Option<RetentionPolicy> = record,
    }
}

xml_record! {
    /// Service-wide analytics settings.
    #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct StorageServiceProperties {
        pub logging: Option<Logging> = record,
        pub metrics: Option<Metrics> = record,
        pub default_service_version: Option<String> = text,
    }
}

xml_record! {
    /// Error body returned with a failed request.
    #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct StorageError as "Error" {
        pub code: Option<String> = text,
        pub message: Option<String> = text,
        pub authentication_error_detail: Option<String> = text,
    }
}
