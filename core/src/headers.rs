//! Header names used by the minion signing protocol.
//!
//! # Design
//! `CANONICAL_HEADERS` is the ordered list both sides walk when rebuilding
//! the canonical string. Reordering it changes every signature and breaks
//! interoperability with any server validating the same scheme.

/// Hex HMAC-SHA256 of the canonical string.
pub const HEADER_AUTH_REQUEST: &str = "X-PARA-AUTH-REQUEST";

/// Time of the request, RFC 3339 in UTC.
pub const HEADER_TIMESTAMP: &str = "X-PARA-TIMESTAMP";

/// `POST` for every call this client makes.
pub const HEADER_METHOD: &str = "X-PARA-METHOD";

/// `/path/to/api/call`
pub const HEADER_PATH: &str = "X-PARA-PATH";

/// `api.example.com:8080`
pub const HEADER_HOST: &str = "X-PARA-HOST";

pub const HEADER_QUERY_STRING: &str = "X-PARA-QUERY";

pub const HEADER_CONTENT_TYPE: &str = "Content-Type";

/// Media type sent on every request and required on every response.
pub const CONTENT_TYPE_JSON: &str = "application/json; charset=utf-8";

/// Headers covered by the signature, in signing order.
pub const CANONICAL_HEADERS: [&str; 5] = [
    HEADER_HOST,
    HEADER_PATH,
    HEADER_METHOD,
    HEADER_QUERY_STRING,
    HEADER_TIMESTAMP,
];

/// Case-insensitive lookup in an ordered header list.
pub fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}
