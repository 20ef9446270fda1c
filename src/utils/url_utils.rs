//! URL utilities shared by the registry, the extractor and the assembler.
//!
//! Every URL that is compared against another goes through
//! [`normalize_url`] first, so "already visited" and "already assembled"
//! questions are answered on the same canonical form.

use url::Url;

/// Normalize URL for consistent identity comparisons
///
/// - Lowercases scheme and host
/// - Omits default ports (80 for http, 443 for https)
/// - Removes trailing slash from the path unless it is the root
/// - Drops the fragment, keeps the query
///
/// Input that does not parse as an absolute URL is returned lowercased.
#[must_use]
pub fn normalize_url(url: &str) -> String {
    let parsed = match Url::parse(url) {
        Ok(u) => u,
        Err(_) => return url.to_lowercase(),
    };

    let mut normalized = String::with_capacity(url.len());

    normalized.push_str(parsed.scheme());
    normalized.push_str("://");

    // Url::parse already lowercases the host
    if let Some(host) = parsed.host_str() {
        normalized.push_str(host);
    }

    // `Url::port()` is None for the scheme's default port
    if let Some(port) = parsed.port() {
        normalized.push(':');
        normalized.push_str(&port.to_string());
    }

    let path = parsed.path();
    if path.len() > 1 && path.ends_with('/') {
        normalized.push_str(&path[..path.len() - 1]);
    } else if path.is_empty() {
        normalized.push('/');
    } else {
        normalized.push_str(path);
    }

    if let Some(query) = parsed.query() {
        normalized.push('?');
        normalized.push_str(query);
    }

    normalized
}

/// True for hrefs that never denote a fetchable document.
#[must_use]
pub fn is_special_href(href: &str) -> bool {
    let lower = href.trim_start().to_ascii_lowercase();
    lower.starts_with("mailto:")
        || lower.starts_with("javascript:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
}

/// Resolve an href found on `page_url` into an absolute http(s) URL.
///
/// Returns `None` for empty hrefs, pure in-page fragments, special schemes
/// and anything that does not resolve to http or https.
#[must_use]
pub fn resolve_href(page_url: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') || is_special_href(href) {
        return None;
    }

    let resolved = page_url.join(href).ok()?;
    matches!(resolved.scheme(), "http" | "https").then_some(resolved)
}

/// Path prefix a URL must share with `base` to count as in scope.
///
/// For `https://host/view/DOC/2024/ENU/` this is `/view/DOC/2024/ENU/`; for a
/// base without trailing slash the last segment is treated as a document and
/// dropped.
fn scope_prefix(base: &Url) -> &str {
    let path = base.path();
    match path.rfind('/') {
        Some(idx) => &path[..=idx],
        None => "/",
    }
}

/// Whether `url` lives under the documentation site rooted at `base`.
#[must_use]
pub fn is_in_scope(url: &Url, base: &Url) -> bool {
    url.scheme() == base.scheme()
        && url.host_str().map(str::to_ascii_lowercase) == base.host_str().map(str::to_ascii_lowercase)
        && url.port_or_known_default() == base.port_or_known_default()
        && url.path().starts_with(scope_prefix(base))
}

/// Check if a URL is an absolute http(s) URL
#[must_use]
pub fn is_valid_url(url: &str) -> bool {
    if url.is_empty() || is_special_href(url) {
        return false;
    }

    match Url::parse(url) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://help.example.com/view/DOC/2024/ENU/").unwrap()
    }

    #[test]
    fn normalize_drops_fragment_and_default_port() {
        assert_eq!(
            normalize_url("HTTPS://Help.Example.com:443/view/?guid=A#section"),
            "https://help.example.com/view?guid=A"
        );
        assert_eq!(normalize_url("http://example.com:8080/"), "http://example.com:8080/");
        assert_eq!(normalize_url("https://example.com"), "https://example.com/");
    }

    #[test]
    fn normalize_keeps_query_significant() {
        assert_ne!(
            normalize_url("https://example.com/view/?guid=A"),
            normalize_url("https://example.com/view/?guid=B")
        );
    }

    #[test]
    fn resolve_skips_special_and_fragment_hrefs() {
        let page = base();
        assert!(resolve_href(&page, "#top").is_none());
        assert!(resolve_href(&page, "mailto:docs@example.com").is_none());
        assert!(resolve_href(&page, "javascript:void(0)").is_none());
        assert!(resolve_href(&page, "  ").is_none());
        assert!(resolve_href(&page, "ftp://example.com/file").is_none());
    }

    #[test]
    fn resolve_handles_query_references() {
        let resolved = resolve_href(&base(), "?guid=GUID-123").unwrap();
        assert_eq!(
            resolved.as_str(),
            "https://help.example.com/view/DOC/2024/ENU/?guid=GUID-123"
        );
    }

    #[test]
    fn scope_requires_same_host_and_prefix() {
        let base = base();
        let inside = Url::parse("https://help.example.com/view/DOC/2024/ENU/?guid=X").unwrap();
        let other_product = Url::parse("https://help.example.com/view/OTHER/2024/ENU/").unwrap();
        let other_host = Url::parse("https://www.example.com/view/DOC/2024/ENU/").unwrap();
        let other_scheme = Url::parse("http://help.example.com/view/DOC/2024/ENU/").unwrap();

        assert!(is_in_scope(&inside, &base));
        assert!(!is_in_scope(&other_product, &base));
        assert!(!is_in_scope(&other_host, &base));
        assert!(!is_in_scope(&other_scheme, &base));
    }

    #[test]
    fn scope_of_document_base_uses_its_directory() {
        let base = Url::parse("https://docs.example.com/guide/index.html").unwrap();
        let sibling = Url::parse("https://docs.example.com/guide/install.html").unwrap();
        assert!(is_in_scope(&sibling, &base));
    }
}
