//! Enumeration, simple list and record round-trip integration tests.

#[cfg(test)]
mod tests {
    use rustack_storage_model::{
        AccessPolicy, QueueEnumResults, QueueMessage, QueueMessagesList, RetentionPolicy,
        SignedIdentifier, SignedIdentifiers, StorageError,
    };
    use rustack_storage_xml::{
        from_xml, parse_enum_results_list, parse_response, parse_simple_list, to_xml,
    };

    use crate::xml_response;

    #[test]
    fn test_should_list_queues_with_metadata() {
        let response = xml_response(
            r#"<?xml version="1.0" encoding="utf-8"?>
<EnumerationResults ServiceEndpoint="https://acct.queue.core.windows.net/">
  <Prefix>jobs</Prefix>
  <MaxResults>3</MaxResults>
  <Queues>
    <Queue>
      <Name>jobs-high</Name>
      <Url>https://acct.queue.core.windows.net/jobs-high</Url>
      <Metadata><tier>gold</tier></Metadata>
    </Queue>
    <Queue><Name>jobs-low</Name></Queue>
  </Queues>
  <NextMarker />
</EnumerationResults>"#,
        );

        let results: QueueEnumResults = parse_enum_results_list(&response, "Queues").unwrap();
        assert_eq!(results.prefix.as_deref(), Some("jobs"));
        assert_eq!(results.max_results, Some(3));
        let names: Vec<_> = results
            .queues
            .iter()
            .filter_map(|q| q.name.as_deref())
            .collect();
        assert_eq!(names, ["jobs-high", "jobs-low"]);
        assert_eq!(results.queues[0].metadata.as_ref().unwrap()["tier"], "gold");
        assert!(results.queues[1].url.is_none());
    }

    #[test]
    fn test_should_list_nothing_from_empty_enumeration() {
        let response = xml_response("<EnumerationResults><Queues /></EnumerationResults>");
        let results: QueueEnumResults = parse_enum_results_list(&response, "Queues").unwrap();
        assert!(results.queues.is_empty());
        assert!(results.prefix.is_none());
        assert!(results.next_marker.is_none());
    }

    #[test]
    fn test_should_read_messages_from_simple_list() {
        let response = xml_response(
            "<QueueMessagesList>\
               <QueueMessage><MessageId>1</MessageId><MessageText>Zmlyc3Q=</MessageText></QueueMessage>\
               <QueueMessage><MessageId>2</MessageId><MessageText>c2Vjb25k</MessageText></QueueMessage>\
             </QueueMessagesList>",
        );
        let list: QueueMessagesList = parse_simple_list(&response, "queue_messages").unwrap();
        let texts: Vec<_> = list
            .queue_messages
            .iter()
            .filter_map(|m| m.message_text.as_deref())
            .collect();
        assert_eq!(texts, ["first", "second"]);
    }

    #[test]
    fn test_should_round_trip_message_text_through_base64() {
        let message = QueueMessage::with_text("payload <with> & markup");
        let xml = to_xml(&message, true);
        let parsed = from_xml::<QueueMessage>(xml.as_bytes()).unwrap().unwrap();
        assert_eq!(parsed, message);
    }

    #[test]
    fn test_should_round_trip_access_policies() {
        let identifiers = SignedIdentifiers {
            signed_identifiers: vec![
                SignedIdentifier {
                    id: Some("read-only".to_owned()),
                    access_policy: Some(AccessPolicy {
                        start: Some("2024-01-01".to_owned()),
                        expiry: Some("2025-01-01".to_owned()),
                        permission: Some("r".to_owned()),
                    }),
                },
                SignedIdentifier {
                    id: Some("no-policy".to_owned()),
                    access_policy: None,
                },
            ],
        };

        let response = xml_response(&to_xml(&identifiers, true));
        let parsed: Option<SignedIdentifiers> = parse_response(&response).unwrap();
        assert_eq!(parsed, Some(identifiers));
    }

    #[test]
    fn test_should_read_only_false_as_false() {
        for (text, expected) in [
            ("false", false),
            ("False", false),
            ("FALSE", false),
            ("true", true),
            ("0", true),
            ("False ", true),
        ] {
            let body = format!("<RetentionPolicy><Enabled>{text}</Enabled></RetentionPolicy>");
            let policy = from_xml::<RetentionPolicy>(body.as_bytes()).unwrap().unwrap();
            assert_eq!(policy.enabled, Some(expected), "text {text:?}");
        }
    }

    #[test]
    fn test_should_leave_absent_elements_unset() {
        let policy = from_xml::<RetentionPolicy>(b"<RetentionPolicy />")
            .unwrap()
            .unwrap();
        assert_eq!(policy, RetentionPolicy::default());
    }

    #[test]
    fn test_should_not_match_error_body_as_record() {
        let response = xml_response("<Error><Code>QueueNotFound</Code></Error>");
        assert!(parse_response::<QueueMessagesList>(&response).unwrap().is_none());
        let error = parse_response::<StorageError>(&response).unwrap().unwrap();
        assert_eq!(error.code.as_deref(), Some("QueueNotFound"));
    }

    #[test]
    fn test_should_fail_on_malformed_body() {
        let response = xml_response("<QueueMessagesList><QueueMessage>");
        assert!(parse_response::<QueueMessagesList>(&response).is_err());
    }
}
