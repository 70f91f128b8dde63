//! Atom feed integration tests for the table service converters.

#[cfg(test)]
mod tests {
    use rustack_storage_model::{
        EdmValue, Entity, entity_from_entry, entity_to_entry, table_from_entry,
    };
    use rustack_storage_xml::{
        Element, EntryIdentity, XmlError, convert_response_to_feeds, entry_properties,
        headers_to_dict, readable_id,
    };

    use crate::{atom_feed, response_with_headers, table_entry, xml_response};

    #[test]
    fn test_should_list_tables_from_feed() {
        let body = atom_feed(&[&table_entry("orders"), &table_entry("customers")]);
        let feed = convert_response_to_feeds(&xml_response(&body), table_from_entry).unwrap();

        let names: Vec<_> = feed.iter().filter_map(|t| t.name.as_deref()).collect();
        assert_eq!(names, ["orders", "customers"]);
        assert_eq!(feed.entries()[0].entry.name.as_deref(), Some("Tables('orders')"));
        assert!(feed.continuation().is_none());
    }

    #[test]
    fn test_should_read_single_entry_document() {
        let body = format!(
            r#"<?xml version="1.0" encoding="utf-8" standalone="yes"?>
<entry xmlns:d="http://schemas.microsoft.com/ado/2007/08/dataservices"
       xmlns:m="http://schemas.microsoft.com/ado/2007/08/dataservices/metadata"
       xmlns="http://www.w3.org/2005/Atom">{}</entry>"#,
            // reuse the inner markup of a listed entry
            table_entry("single")
                .trim_start_matches("<entry>")
                .trim_end_matches("</entry>")
        );
        let feed = convert_response_to_feeds(&xml_response(&body), table_from_entry).unwrap();
        assert_eq!(feed.len(), 1);
        assert_eq!(feed.entries()[0].name.as_deref(), Some("single"));
    }

    #[test]
    fn test_should_reject_unknown_document_root() {
        let result = convert_response_to_feeds(
            &xml_response("<EnumerationResults />"),
            table_from_entry,
        );
        assert!(matches!(result, Err(XmlError::UnrecognizedDocument(_))));
    }

    #[test]
    fn test_should_attach_only_continuation_headers() {
        let response = response_with_headers(
            &[
                ("x-ms-continuation-NextTableName", "t-next"),
                ("x-ms-request-id", "req"),
                ("Date", "Mon, 01 Jan 2024 00:00:00 GMT"),
            ],
            &atom_feed(&[&table_entry("orders")]),
        );

        let feed = convert_response_to_feeds(&response, table_from_entry).unwrap();
        let continuation = feed.continuation().unwrap();
        assert_eq!(continuation.len(), 1);
        assert_eq!(continuation.get("NextTableName"), Some("t-next"));

        let headers = headers_to_dict(&response);
        assert!(headers.contains_key("x-ms-request-id"));
        assert!(!headers.contains_key("date"));
    }

    #[test]
    fn test_should_name_entries_by_title_or_id() {
        let body = atom_feed(&[&table_entry("orders")]);
        let root = Element::parse(body.as_bytes()).unwrap();
        let entry = root
            .find_ns(rustack_storage_xml::ATOM_NAMESPACE, "entry")
            .unwrap();

        let by_id = entry_properties(entry, EntryIdentity::Id { prefix_to_skip: None });
        assert_eq!(by_id.name.as_deref(), Some("Tables('orders')"));
        assert_eq!(by_id.updated.as_deref(), Some("2024-01-01T00:00:00Z"));
        assert!(by_id.author.is_none());

        let by_title = entry_properties(entry, EntryIdentity::Title);
        assert!(by_title.name.is_none());
    }

    #[test]
    fn test_should_shorten_ids() {
        assert_eq!(readable_id("https://host.suffix/name", None), "name");
        assert_eq!(
            readable_id("https://host.suffix/acct/sub/name", Some("acct/")),
            "name"
        );
        assert_eq!(
            readable_id("https://host.suffix/acct/sub/name", Some("host.suffix/")),
            "sub/name"
        );
        assert_eq!(readable_id("name-without-scheme", None), "name-without-scheme");
    }

    #[test]
    fn test_should_write_and_read_back_entity() {
        let mut entity = Entity::new("customers", "0001");
        entity.insert("Age", 42);
        entity.insert("Email", "a@example.com");
        entity.insert("Vip", false);

        let entry = entity_to_entry(&entity).unwrap();
        assert!(entry.starts_with(
            "<?xml version=\"1.0\" encoding=\"utf-8\" standalone=\"yes\"?>"
        ));

        let feed = convert_response_to_feeds(&xml_response(&entry), entity_from_entry).unwrap();
        let parsed = &feed.entries()[0];
        assert_eq!(parsed, &entity);
        assert_eq!(parsed.get("Age"), Some(&EdmValue::Int32(42)));
        assert_eq!(parsed.row_key(), Some("0001"));
    }
}
