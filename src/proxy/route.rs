// src/proxy/route.rs
// Inbound path -> upstream URL rewriting.

/// Strip `prefix` from `path` when it matches on a segment boundary, then
/// drop any leading slashes from what remains.
///
/// `/api/lemlist/campaigns` and `/api/lemlist` strip; `/api/lemlistfoo` does not.
pub fn relative_path<'a>(path: &'a str, prefix: &str) -> &'a str {
    let prefix = prefix.trim_end_matches('/');
    let rest = match path.strip_prefix(prefix) {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
        _ => path,
    };
    rest.trim_start_matches('/')
}

/// Build the upstream URL. `base` must end with `/`. The query is appended
/// verbatim when non-empty; nothing is decoded or re-encoded.
pub fn upstream_url(base: &str, prefix: &str, path: &str, query: Option<&str>) -> String {
    let relative = relative_path(path, prefix);
    let mut url = String::with_capacity(base.len() + relative.len() + 1);
    url.push_str(base);
    url.push_str(relative);

    if let Some(query) = query.filter(|q| !q.is_empty()) {
        url.push('?');
        url.push_str(query);
    }
    url
}
