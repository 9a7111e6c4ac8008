//! URL query-string parsing.
//!
//! Trusted-origin derivation reads `sfdcIFrameOrigin` / `nonce` out of
//! the page's query string before the wire channel exists, so this
//! parser is deliberately lax: keys are taken verbatim, values are
//! percent-decoded, and a key with no value maps to `None`.

use std::collections::HashMap;

/// Parses a query string (with or without the leading `?`) into a map.
///
/// A parameter without a value (`?flag` or `?flag=`) maps to `None`.
/// Duplicate keys keep the last occurrence.
pub fn parse_query_string(query: &str) -> HashMap<String, Option<String>> {
    let mut params = HashMap::new();
    let query = query.strip_prefix('?').unwrap_or(query);
    if query.is_empty() {
        return params;
    }

    for pair in query.split('&') {
        let (key, value) = match pair.split_once('=') {
            Some((key, value)) => (key, value),
            None => (pair, ""),
        };
        let value = if value.is_empty() {
            None
        } else {
            Some(
                urlencoding::decode(value)
                    .map(|v| v.into_owned())
                    .unwrap_or_else(|_| value.to_string()),
            )
        };
        params.insert(key.to_string(), value);
    }
    params
}
