//! Integration tests for the Rustack legacy storage marshalling layers.
//!
//! The tests drive canned service responses through the public entry points
//! of `rustack-storage-xml` and `rustack-storage-model`, the way a transport
//! layer would hand them over.
//!
//! Run them with:
//! ```text
//! cargo test -p rustack-storage-integration
//! ```

use std::sync::Once;

use rustack_core::{HttpResponse, RustackConfig};
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Initialize tracing (once).
///
/// Uses `RUST_LOG` if set, otherwise the `LOG_LEVEL` config value.
pub fn init_tracing() {
    INIT.call_once(|| {
        let config = RustackConfig::from_env();
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&config.log_level))
            .unwrap_or_else(|_| EnvFilter::new("warn"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .init();
    });
}

/// Build a `200 OK` response with the given body and no headers.
#[must_use]
pub fn xml_response(body: &str) -> HttpResponse {
    response_with_headers(&[], body)
}

/// Build a `200 OK` response with the given headers and body.
#[must_use]
pub fn response_with_headers(headers: &[(&str, &str)], body: &str) -> HttpResponse {
    init_tracing();

    let headers = headers
        .iter()
        .map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
        .collect();
    HttpResponse::new(200, headers, body.as_bytes().to_vec())
}

/// Wrap table entry bodies in an Atom feed document.
#[must_use]
pub fn atom_feed(entries: &[&str]) -> String {
    let mut feed = String::from(
        r#"<?xml version="1.0" encoding="utf-8" standalone="yes"?>
<feed xml:base="https://acct.table.core.windows.net/"
      xmlns:d="http://schemas.microsoft.com/ado/2007/08/dataservices"
      xmlns:m="http://schemas.microsoft.com/ado/2007/08/dataservices/metadata"
      xmlns="http://www.w3.org/2005/Atom">
  <title type="text">Tables</title>
  <id>https://acct.table.core.windows.net/Tables</id>
  <updated>2024-01-01T00:00:00Z</updated>
"#,
    );
    for entry in entries {
        feed.push_str(entry);
        feed.push('\n');
    }
    feed.push_str("</feed>");
    feed
}

/// A table entry as listed by the table service.
#[must_use]
pub fn table_entry(name: &str) -> String {
    format!(
        r#"<entry>
    <id>https://acct.table.core.windows.net/Tables('{name}')</id>
    <title type="text"></title>
    <updated>2024-01-01T00:00:00Z</updated>
    <author><name /></author>
    <content type="application/xml">
      <m:properties><d:TableName>{name}</d:TableName></m:properties>
    </content>
  </entry>"#
    )
}

mod test_enum_results;
mod test_feed;
mod test_request_body;
