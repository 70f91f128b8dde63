//! Atom feed handling for the table service.
//!
//! Table responses are either an Atom `feed` holding `entry` elements or a
//! single bare `entry`. [`convert_response_to_feeds`] dispatches on the root
//! and hands every entry to a caller-supplied converter; continuation tokens
//! travel in `x-ms-continuation-*` response headers and are attached to the
//! resulting [`Feed`].

use chrono::{DateTime, Timelike, Utc};
use rustack_core::{HeaderDict, HttpResponse};

use crate::dom::Element;
use crate::error::XmlError;

/// Atom syndication namespace.
pub const ATOM_NAMESPACE: &str = "http://www.w3.org/2005/Atom";

/// Data services metadata namespace (`m:` prefix).
pub const METADATA_NAMESPACE: &str =
    "http://schemas.microsoft.com/ado/2007/08/dataservices/metadata";

/// Data services namespace (`d:` prefix).
pub const DATA_SERVICES_NAMESPACE: &str = "http://schemas.microsoft.com/ado/2007/08/dataservices";

/// Substring marking a continuation header.
const CONTINUATION_MARKER: &str = "x-ms-continuation";

/// Converted entries of a feed response plus its continuation token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feed<T> {
    entries: Vec<T>,
    continuation: Option<HeaderDict>,
}

impl<T> Default for Feed<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            continuation: None,
        }
    }
}

impl<T> Feed<T> {
    /// Create a feed from converted entries and an optional continuation.
    #[must_use]
    pub fn new(entries: Vec<T>, continuation: Option<HeaderDict>) -> Self {
        Self {
            entries,
            continuation,
        }
    }

    /// Entries in document order.
    #[must_use]
    pub fn entries(&self) -> &[T] {
        &self.entries
    }

    /// Continuation headers, keyed by the part after `x-ms-continuation-`.
    #[must_use]
    pub fn continuation(&self) -> Option<&HeaderDict> {
        self.continuation.as_ref()
    }

    /// Iterate over the entries.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.entries.iter()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the feed has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Take the entries, dropping the continuation.
    #[must_use]
    pub fn into_entries(self) -> Vec<T> {
        self.entries
    }
}

impl<T> IntoIterator for Feed<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Feed<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Harvest continuation headers from a response.
///
/// Every header whose name contains `x-ms-continuation` is kept, keyed by the
/// name past `x-ms-continuation-`. Returns `None` when there are none.
#[must_use]
pub fn continuation_from_headers(response: &HttpResponse) -> Option<HeaderDict> {
    let mut continuation = HeaderDict::new();
    for (name, value) in response.headers() {
        if name.to_ascii_lowercase().contains(CONTINUATION_MARKER) {
            let key = name.get(CONTINUATION_MARKER.len() + 1..).unwrap_or_default();
            continuation.insert(key, value);
        }
    }
    if continuation.is_empty() {
        return None;
    }
    tracing::debug!(tokens = continuation.len(), "harvested continuation headers");
    Some(continuation)
}

/// Convert a feed or single-entry response with `convert`.
///
/// A `feed` root yields each of its Atom `entry` children in order; an
/// `entry` root yields itself. Root names are compared without namespace.
///
/// # Errors
///
/// Returns `XmlError::UnrecognizedDocument` for any other root, or whatever
/// error parsing the body or `convert` produces.
pub fn convert_response_to_feeds<T, F>(
    response: &HttpResponse,
    mut convert: F,
) -> Result<Feed<T>, XmlError>
where
    F: FnMut(&Element) -> Result<T, XmlError>,
{
    let continuation = continuation_from_headers(response);
    let root = Element::parse(&response.body)?;

    let entries = match root.name() {
        "feed" => root
            .find_all_ns(ATOM_NAMESPACE, "entry")
            .map(&mut convert)
            .collect::<Result<Vec<_>, _>>()?,
        "entry" => vec![convert(&root)?],
        other => return Err(XmlError::UnrecognizedDocument(other.to_owned())),
    };
    tracing::debug!(root = root.name(), entries = entries.len(), "converted feed response");

    Ok(Feed::new(entries, continuation))
}

/// Common Atom properties of an entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryProperties {
    /// `m:etag` attribute of the entry.
    pub etag: Option<String>,
    /// Text of `updated`.
    pub updated: Option<String>,
    /// Text of `author/name`.
    pub author: Option<String>,
    /// Readable entry name, see [`EntryIdentity`].
    pub name: Option<String>,
}

/// Where an entry's name comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EntryIdentity<'a> {
    /// The entry has no name.
    #[default]
    None,
    /// The shortened `id` URL, see [`readable_id`].
    Id {
        /// Path prefix skipped before taking the name.
        prefix_to_skip: Option<&'a str>,
    },
    /// The `title` text.
    Title,
}

/// Read the common Atom properties of an entry element.
///
/// Empty `updated`, `author/name`, `id` and `title` texts count as absent.
#[must_use]
pub fn entry_properties(element: &Element, identity: EntryIdentity<'_>) -> EntryProperties {
    let atom_text = |name: &str| {
        element
            .find_ns(ATOM_NAMESPACE, name)
            .map(Element::text)
            .filter(|text| !text.is_empty())
    };

    let author = element
        .find_ns(ATOM_NAMESPACE, "author")
        .and_then(|author| author.find_ns(ATOM_NAMESPACE, "name"))
        .map(Element::text)
        .filter(|text| !text.is_empty());

    let name = match identity {
        EntryIdentity::None => None,
        EntryIdentity::Id { prefix_to_skip } => {
            atom_text("id").map(|id| readable_id(id, prefix_to_skip))
        }
        EntryIdentity::Title => atom_text("title"),
    };

    EntryProperties {
        etag: element
            .attribute_ns(METADATA_NAMESPACE, "etag")
            .map(str::to_owned),
        updated: atom_text("updated").map(str::to_owned),
        author: author.map(str::to_owned),
        name: name.map(str::to_owned),
    }
}

/// Shorten an entry id URL to the part people care about.
///
/// Ids look like `https://account.host.suffix/name`, where the name may
/// itself contain `/`. Everything after the first `/` past the `//` is
/// returned; with `prefix_to_skip`, the search for that `/` starts after the
/// first occurrence of the prefix. If any step fails the id is returned
/// unchanged.
///
/// # Examples
///
/// ```
/// use rustack_storage_xml::readable_id;
///
/// assert_eq!(readable_id("https://acct.table.core/Tables('t')", None), "Tables('t')");
/// assert_eq!(readable_id("https://acct.host/acct/sub/name", Some("acct/")), "name");
/// assert_eq!(readable_id("no-scheme", None), "no-scheme");
/// ```
#[must_use]
pub fn readable_id<'a>(id: &'a str, prefix_to_skip: Option<&str>) -> &'a str {
    let Some(scheme_end) = id.find("//") else {
        return id;
    };
    let mut pos = scheme_end + 2;

    if let Some(prefix) = prefix_to_skip.filter(|p| !p.is_empty()) {
        match id[pos..].find(prefix) {
            Some(offset) => pos += offset + prefix.len(),
            None => return id,
        }
    }

    match id[pos..].find('/') {
        Some(offset) => &id[pos + offset + 1..],
        None => id,
    }
}

/// Wrap an entry body in the Atom envelope used for table writes, stamped
/// with the current time.
#[must_use]
pub fn create_entry(body: &str) -> String {
    create_entry_at(body, Utc::now())
}

/// Wrap an entry body in the Atom envelope used for table writes.
#[must_use]
pub fn create_entry_at(body: &str, updated: DateTime<Utc>) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\" standalone=\"yes\"?>\n\
         <entry xmlns:d=\"{DATA_SERVICES_NAMESPACE}\" xmlns:m=\"{METADATA_NAMESPACE}\" \
         xmlns=\"{ATOM_NAMESPACE}\" >\n\
         <title /><updated>{updated}</updated><author><name /></author><id />\n\
         <content type=\"application/xml\">\n    {body}</content></entry>",
        updated = format_updated(updated),
    )
}

/// ISO-8601 UTC timestamp; fractional seconds only when non-zero.
fn format_updated(updated: DateTime<Utc>) -> String {
    let seconds = updated.format("%Y-%m-%dT%H:%M:%S");
    match updated.nanosecond() / 1_000 {
        0 => format!("{seconds}+00:00"),
        micros => format!("{seconds}.{micros:06}+00:00"),
    }
}
