//! Wire names for record fields.
//!
//! Field identifiers are snake_case. The wire name is resolved in three
//! tiers: a fixed override table, then the extension/suffix/header rewrite
//! rules, then a PascalCase join of the identifier's parts.

/// Fixed identifier to wire name overrides. Checked before any rule.
pub const KNOWN_SERIALIZATION_NAMES: &[(&str, &str)] = &[
    ("include_apis", "IncludeAPIs"),
    ("message_id", "MessageId"),
    ("content_md5", "Content-MD5"),
    ("last_modified", "Last-Modified"),
    ("cache_control", "Cache-Control"),
    ("copy_id", "CopyId"),
];

/// Vendor extension prefix; such identifiers keep their header spelling.
const EXTENSION_PREFIX: &str = "x_ms_";

/// Identifier suffix rewritten to the `ID` token.
const ID_SUFFIX: &str = "_id";

/// Leading tokens of HTTP header style names, whose parts are joined by `-`.
const HEADER_PREFIXES: [&str; 4] = ["content_", "last_modified", "if_", "cache_control"];

/// Get the wire name for a field identifier.
///
/// # Examples
///
/// ```
/// use rustack_storage_xml::serialization_name;
///
/// assert_eq!(serialization_name("friendly_name"), "FriendlyName");
/// assert_eq!(serialization_name("content_type"), "Content-Type");
/// assert_eq!(serialization_name("x_ms_meta_color"), "x-ms-meta-color");
/// assert_eq!(serialization_name("lease_id"), "LeaseID");
/// ```
#[must_use]
pub fn serialization_name(field_id: &str) -> String {
    if let Some(known) = known_name(field_id) {
        return known.to_owned();
    }

    if field_id.starts_with(EXTENSION_PREFIX) {
        return field_id.replace('_', "-");
    }

    let (stem, suffix) = match field_id.strip_suffix(ID_SUFFIX) {
        Some(stem) => (stem, "ID"),
        None => (field_id, ""),
    };
    let dashed = HEADER_PREFIXES.iter().any(|prefix| stem.starts_with(prefix));

    let mut name = String::with_capacity(field_id.len() + 2);
    for (i, part) in stem.split('_').enumerate() {
        if dashed && i > 0 {
            name.push('-');
        }
        push_capitalized(&mut name, part);
    }
    name.push_str(suffix);
    name
}

fn known_name(field_id: &str) -> Option<&'static str> {
    KNOWN_SERIALIZATION_NAMES
        .iter()
        .find(|(id, _)| *id == field_id)
        .map(|(_, name)| *name)
}

/// Append `part` with its first character uppercased and the rest lowercased.
fn push_capitalized(out: &mut String, part: &str) {
    let mut chars = part.chars();
    if let Some(first) = chars.next() {
        out.extend(first.to_uppercase());
        out.extend(chars.flat_map(char::to_lowercase));
    }
}
