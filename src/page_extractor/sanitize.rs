//! Streaming cleanup of an extracted content region.
//!
//! Scripts, styles and hidden elements are dropped; resource references are
//! made absolute against the page URL so the fragment renders the same once
//! it is moved into the composite document.

use anyhow::Result;
use lol_html::{HtmlRewriter, Settings, element};
use url::Url;

/// Elements removed together with their content.
const REMOVED_ELEMENTS: &[&str] = &["script", "style", "noscript", "template", "[hidden]"];

/// (selector, attribute) pairs holding a single URL.
const URL_ATTRIBUTES: &[(&str, &str)] = &[
    ("img[src]", "src"),
    ("source[src]", "src"),
    ("video[src]", "src"),
    ("video[poster]", "poster"),
    ("audio[src]", "src"),
    ("iframe[src]", "src"),
    ("link[href]", "href"),
    ("script[src]", "src"),
];

/// (selector, attribute) pairs holding a `srcset` candidate list.
const SRCSET_ATTRIBUTES: &[(&str, &str)] = &[("img[srcset]", "srcset"), ("source[srcset]", "srcset")];

/// Resolve a single resource reference. Data URIs and unparsable values are
/// kept as they are.
fn absolutize(page_url: &Url, value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.starts_with("data:") || trimmed.starts_with('#') {
        return None;
    }
    let resolved = page_url.join(trimmed).ok()?;
    (resolved.as_str() != trimmed).then(|| resolved.to_string())
}

/// Resolve every URL of a `srcset` list, keeping the descriptors.
fn absolutize_srcset(page_url: &Url, value: &str) -> String {
    value
        .split(',')
        .map(str::trim)
        .filter(|candidate| !candidate.is_empty())
        .map(|candidate| {
            let mut parts = candidate.splitn(2, char::is_whitespace);
            let url = parts.next().unwrap_or_default();
            let descriptor = parts.next().map(str::trim).unwrap_or_default();
            let url = absolutize(page_url, url).unwrap_or_else(|| url.to_string());
            if descriptor.is_empty() {
                url
            } else {
                format!("{url} {descriptor}")
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Remove non-content elements and absolutize resource URLs.
pub fn sanitize_fragment(html: &str, page_url: &Url) -> Result<String> {
    let mut output = Vec::with_capacity(html.len());

    let mut handlers = Vec::new();
    for selector in REMOVED_ELEMENTS {
        handlers.push(element!(*selector, |el| {
            el.remove();
            Ok(())
        }));
    }
    for (selector, attribute) in URL_ATTRIBUTES {
        let page_url = page_url.clone();
        handlers.push(element!(*selector, move |el| {
            if let Some(value) = el.get_attribute(attribute)
                && let Some(absolute) = absolutize(&page_url, &value)
            {
                el.set_attribute(attribute, &absolute)?;
            }
            Ok(())
        }));
    }
    for (selector, attribute) in SRCSET_ATTRIBUTES {
        let page_url = page_url.clone();
        handlers.push(element!(*selector, move |el| {
            if let Some(value) = el.get_attribute(attribute) {
                el.set_attribute(attribute, &absolutize_srcset(&page_url, &value))?;
            }
            Ok(())
        }));
    }

    let mut rewriter = HtmlRewriter::new(
        Settings {
            element_content_handlers: handlers,
            ..Settings::default()
        },
        |c: &[u8]| output.extend_from_slice(c),
    );

    rewriter
        .write(html.as_bytes())
        .map_err(|e| anyhow::anyhow!("HtmlRewriter error: {e}"))?;
    rewriter
        .end()
        .map_err(|e| anyhow::anyhow!("HtmlRewriter end error: {e}"))?;

    String::from_utf8(output).map_err(|e| anyhow::anyhow!("Invalid UTF-8 in sanitized HTML: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> Url {
        Url::parse("https://help.example.com/view/DOC/2024/ENU/files/page.htm").unwrap()
    }

    #[test]
    fn removes_scripts_styles_and_hidden() {
        let html = r#"<div class="body"><script>alert(1)</script><style>p{}</style><p hidden>secret</p><noscript>js</noscript><p>kept</p></div>"#;
        let out = sanitize_fragment(html, &page()).unwrap();
        assert_eq!(out, r#"<div class="body"><p>kept</p></div>"#);
    }

    #[test]
    fn absolutizes_resource_urls() {
        let html = r#"<p><img src="images/a.png" srcset="images/a.png 1x, /img/b.png 2x"><img src="data:image/png;base64,AA"></p>"#;
        let out = sanitize_fragment(html, &page()).unwrap();
        assert!(out.contains(r#"src="https://help.example.com/view/DOC/2024/ENU/files/images/a.png""#), "{out}");
        assert!(out.contains("https://help.example.com/img/b.png 2x"), "{out}");
        assert!(out.contains(r#"src="data:image/png;base64,AA""#), "{out}");
    }

    #[test]
    fn leaves_anchors_untouched() {
        let html = r#"<p><a href="other.htm">Other</a></p>"#;
        let out = sanitize_fragment(html, &page()).unwrap();
        assert_eq!(out, html);
    }
}
