// src/proxy/cors.rs
pub const ALLOW_METHODS: &str = "GET, OPTIONS";
pub const ALLOW_HEADERS: &str = "Authorization, Content-Type, X-Requested-With";
pub const MAX_AGE: &str = "86400";

/// Value sent as the literal `Access-Control-Allow-Origin` when the caller
/// is not the allowed origin.
pub const NULL_ORIGIN: &str = "null";

/// Echo `origin` if it is exactly `allowed`, otherwise `"null"`.
///
/// No case folding and no scheme/port normalisation.
pub fn resolve_allow_origin<'a>(origin: Option<&'a str>, allowed: &str) -> &'a str {
    match origin {
        Some(origin) if origin == allowed => origin,
        _ => NULL_ORIGIN,
    }
}

/// Headers answered to a preflight request.
pub fn preflight_headers(allow_origin: &str) -> Vec<(&'static str, String)> {
    vec![
        ("Access-Control-Allow-Origin", allow_origin.to_string()),
        ("Access-Control-Allow-Methods", ALLOW_METHODS.to_string()),
        ("Access-Control-Allow-Headers", ALLOW_HEADERS.to_string()),
        ("Access-Control-Max-Age", MAX_AGE.to_string()),
    ]
}
