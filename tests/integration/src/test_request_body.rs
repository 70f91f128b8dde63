//! Request body normalization integration tests.

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use rustack_core::{BodyPolicy, RustackConfig};
    use rustack_storage_model::{Logging, Metrics, RetentionPolicy, StorageServiceProperties};
    use rustack_storage_xml::{
        RequestBody, XML_DECLARATION, XmlError, to_request_bytes, to_request_bytes_strict,
    };

    use crate::init_tracing;

    fn service_properties() -> StorageServiceProperties {
        StorageServiceProperties {
            logging: Some(Logging {
                version: Some("1.0".to_owned()),
                delete: Some(false),
                read: Some(false),
                write: Some(true),
                retention_policy: Some(RetentionPolicy {
                    enabled: Some(false),
                    days: None,
                }),
            }),
            metrics: Some(Metrics {
                version: Some("1.0".to_owned()),
                enabled: Some(true),
                include_apis: Some(true),
                retention_policy: None,
            }),
            default_service_version: None,
        }
    }

    #[test]
    fn test_should_serialize_record_bodies_as_documents() {
        init_tracing();
        let properties = service_properties();
        let body = to_request_bytes(RequestBody::from(&properties));
        let text = std::str::from_utf8(&body).unwrap();

        assert!(text.starts_with(XML_DECLARATION));
        assert_eq!(text.matches("<?xml").count(), 1);
        assert!(text.contains(
            "<Logging><Version>1.0</Version><Delete>false</Delete><Read>false</Read>\
             <Write>true</Write><RetentionPolicy><Enabled>false</Enabled></RetentionPolicy>\
             </Logging>"
        ));
        assert!(text.contains("<IncludeAPIs>true</IncludeAPIs>"));
        assert!(!text.contains("DefaultServiceVersion"));
    }

    #[test]
    fn test_should_enforce_bytes_only_policy() {
        init_tracing();
        let err = to_request_bytes_strict("blob", "not bytes".into(), BodyPolicy::BytesOnly)
            .unwrap_err();
        assert!(matches!(err, XmlError::InvalidArgumentType(_)));
        assert_eq!(err.to_string(), "blob should be of type bytes.");

        let raw = Bytes::from_static(b"\x89PNG");
        let body = to_request_bytes_strict("blob", raw.clone().into(), BodyPolicy::BytesOnly);
        assert_eq!(body.unwrap(), raw);
    }

    #[test]
    fn test_should_convert_under_legacy_policy() {
        init_tracing();
        let body = to_request_bytes_strict("blob", "text".into(), BodyPolicy::Legacy).unwrap();
        assert_eq!(body, Bytes::from_static(b"text"));
    }

    #[test]
    fn test_should_default_to_bytes_only_policy() {
        let config = RustackConfig::default();
        assert_eq!(config.body_policy, BodyPolicy::BytesOnly);
        let result = to_request_bytes_strict("blob", RequestBody::Display(&7), config.body_policy);
        assert!(result.is_err());
    }
}
