// tabrules-core/src/normalize.rs
// ============================================================================
// Module: URL Normalizer
// Description: Canonical dedup key derivation and domain extraction.
// Purpose: Define tab identity for deduplication without destroying
//          semantically distinct URLs.
// Dependencies: url
// ============================================================================

//! ## Overview
//! `dupe_key` drives whether a tab gets closed as a duplicate, so the
//! normalizer is conservative: it only strips a fixed set of tracking
//! parameters and otherwise preserves the query string verbatim, sorted for
//! stability. It never special-cases "this looks like a video id" — the
//! conservative stripping policy already protects those by construction.

use url::Url;

/// Query parameters stripped on every host, regardless of path.
const ALWAYS_STRIP: &[&str] = &[
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "fbclid",
    "gclid",
];

/// Host-class-aware tracking parameters: `(host_suffix, param_name)`.
/// Stripped only when the host matches the suffix.
const HOST_CLASS_STRIP: &[(&str, &str)] = &[("amazon.", "tag"), ("amazon.", "ref"), ("amazon.", "linkCode")];

/// Produces the canonical dedup key for a URL.
///
/// On parse failure, returns the lowercased input verbatim: a malformed URL
/// must still produce a usable dedup key rather than aborting the caller.
#[must_use]
pub fn normalize(raw_url: &str) -> String {
    let Ok(mut parsed) = Url::parse(raw_url) else {
        return raw_url.to_lowercase();
    };

    let host = parsed.host_str().unwrap_or_default().to_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host).to_string();

    let mut pairs: Vec<(String, String)> = parsed
        .query_pairs()
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .filter(|(key, _)| !should_strip(&host, key))
        .collect();
    pairs.sort();

    if parsed.set_host(Some(&host)).is_err() {
        return raw_url.to_lowercase();
    }

    if pairs.is_empty() {
        parsed.set_query(None);
    } else {
        let query = pairs
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join("&");
        parsed.set_query(Some(&query));
    }

    parsed.set_fragment(None);
    strip_default_port(&mut parsed);
    strip_trailing_slash(&mut parsed);

    parsed.as_str().to_lowercase()
}

/// Extracts the lowercase hostname (with `www.` stripped) from a URL.
///
/// On parse failure, or if the URL has no host, returns an empty string.
#[must_use]
pub fn domain(raw_url: &str) -> String {
    Url::parse(raw_url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(str::to_lowercase))
        .map(|host| host.strip_prefix("www.").map(str::to_string).unwrap_or(host))
        .unwrap_or_default()
}

fn should_strip(host: &str, key: &str) -> bool {
    if ALWAYS_STRIP.contains(&key) {
        return true;
    }
    HOST_CLASS_STRIP
        .iter()
        .any(|(suffix, param)| host.contains(suffix) && key == *param)
}

fn strip_default_port(parsed: &mut Url) {
    let is_default = matches!(
        (parsed.scheme(), parsed.port()),
        ("http", Some(80)) | ("https", Some(443))
    );
    if is_default {
        let _ = parsed.set_port(None);
    }
}

fn strip_trailing_slash(parsed: &mut Url) {
    let path = parsed.path();
    if path.len() > 1 && path.ends_with('/') {
        let trimmed = path.trim_end_matches('/').to_string();
        parsed.set_path(&trimmed);
    }
}

#[cfg(test)]
mod tests {
    use super::domain;
    use super::normalize;

    #[test]
    fn strips_always_tracking_params() {
        let a = normalize("https://ex.com/a");
        let b = normalize("https://ex.com/a?utm_source=t&fbclid=x");
        assert_eq!(a, b);
    }

    #[test]
    fn preserves_youtube_video_id() {
        let a = normalize("https://www.youtube.com/watch?v=abc123");
        let b = normalize("https://www.youtube.com/watch?v=xyz789");
        assert_ne!(a, b);
    }

    #[test]
    fn preserves_search_query_identity() {
        let a = normalize("https://www.google.com/search?q=cats");
        let b = normalize("https://www.google.com/search?q=dogs");
        assert_ne!(a, b);
    }

    #[test]
    fn is_idempotent() {
        let raw = "https://WWW.Example.com:443/Path/?b=2&utm_source=t&a=1#frag";
        let once = normalize(raw);
        let twice = normalize(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn invalid_url_falls_back_to_lowercase_input() {
        assert_eq!(normalize("not a url"), "not a url");
        assert_eq!(domain("not a url"), "");
    }

    #[test]
    fn domain_strips_www_prefix() {
        assert_eq!(domain("https://www.example.com/a"), "example.com");
    }

    #[test]
    fn strips_default_port_and_trailing_slash() {
        assert_eq!(normalize("https://example.com:443/a/"), normalize("https://example.com/a"));
    }
}
