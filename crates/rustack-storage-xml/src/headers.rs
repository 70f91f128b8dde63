//! Response header extraction into [`HeaderDict`]s.

use rustack_core::{HeaderDict, HttpResponse};

/// Transport-level headers that never carry service data.
const STANDARD_HEADERS: [&str; 7] = [
    "server",
    "date",
    "location",
    "host",
    "via",
    "proxy-connection",
    "connection",
];

/// Collect every response header except the standard transport headers.
#[must_use]
pub fn headers_to_dict(response: &HttpResponse) -> HeaderDict {
    response
        .headers()
        .filter(|(name, _)| {
            !STANDARD_HEADERS
                .iter()
                .any(|standard| name.eq_ignore_ascii_case(standard))
        })
        .collect()
}

/// Collect the non-standard response headers whose name starts with any of
/// `prefixes`.
///
/// Matching ignores ASCII case.
#[must_use]
pub fn headers_with_prefix(response: &HttpResponse, prefixes: &[&str]) -> HeaderDict {
    let prefixes: Vec<String> = prefixes.iter().map(|p| p.to_ascii_lowercase()).collect();
    headers_to_dict(response)
        .iter()
        .filter(|(name, _)| prefixes.iter().any(|prefix| name.starts_with(prefix.as_str())))
        .collect()
}

/// Collect the non-standard response headers named in `names`.
///
/// Matching ignores ASCII case.
#[must_use]
pub fn headers_in(response: &HttpResponse, names: &[&str]) -> HeaderDict {
    headers_to_dict(response)
        .iter()
        .filter(|(name, _)| names.iter().any(|n| n.eq_ignore_ascii_case(name)))
        .collect()
}
