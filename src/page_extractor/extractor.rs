//! Page fetch and content region extraction

use std::sync::LazyLock;

use log::{debug, warn};
use scraper::{Html, Selector};
use url::Url;

use super::links::{collapse_whitespace, discover_links};
use super::sanitize::sanitize_fragment;
use super::schema::ContentFragment;
use super::ExtractError;
use crate::browsing::{BrowsingEngine, BrowsingSession};
use crate::config::{HarvestConfig, RegionSelectors};
use crate::navigator::LeafRef;
use crate::utils::UNKNOWN_TITLE;

static EMBEDDED_MEDIA: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("img, svg, video, audio, iframe, object, embed, canvas, picture, math")
        .expect("EMBEDDED_MEDIA: hardcoded selector is valid")
});

/// True when a sanitized region still shows something: text or media.
fn has_visible_content(html: &str) -> bool {
    let fragment = Html::parse_fragment(html);
    fragment
        .root_element()
        .text()
        .any(|t| !t.trim().is_empty())
        || fragment.select(&EMBEDDED_MEDIA).next().is_some()
}

/// First element matching any candidate, tried in order.
fn first_match<'d>(
    document: &'d Html,
    region: &RegionSelectors,
) -> Result<Option<scraper::ElementRef<'d>>, String> {
    for candidate in region.candidates() {
        let selector =
            Selector::parse(candidate).map_err(|e| format!("invalid selector '{candidate}': {e}"))?;
        if let Some(element) = document.select(&selector).next() {
            return Ok(Some(element));
        }
    }
    Ok(None)
}

/// Build a fragment from a fully rendered page.
///
/// The content region is the first match of the content selector table;
/// the title comes from the page heading, falling back to the title the
/// navigation tree gave the page.
pub fn fragment_from_html(
    html: &str,
    target: &LeafRef,
    config: &HarvestConfig,
    base: &Url,
) -> Result<ContentFragment, ExtractError> {
    let url = target.url.as_str();
    let selectors = config.selectors();
    let document = Html::parse_document(html);

    let region = first_match(&document, &selectors.content)
        .map_err(|reason| ExtractError::markup(url, reason))?
        .ok_or_else(|| ExtractError::ContentNotFound {
            url: url.to_string(),
            tried: selectors.content.describe(),
        })?;

    let heading = first_match(&document, &selectors.page_title)
        .map_err(|reason| ExtractError::markup(url, reason))?
        .map(|h| collapse_whitespace(&h.text().collect::<String>()))
        .filter(|t| !t.is_empty());
    let title = heading.or_else(|| {
        let nav_title = target.title.trim();
        (!nav_title.is_empty() && nav_title != UNKNOWN_TITLE).then(|| nav_title.to_string())
    });

    let sanitized = sanitize_fragment(&region.html(), &target.url)
        .map_err(|e| ExtractError::markup(url, format!("{e:#}")))?;
    if !has_visible_content(&sanitized) {
        warn!("Content region of {url} matched but is empty once hidden elements are removed");
        return Err(ExtractError::EmptyContent {
            url: url.to_string(),
        });
    }
    let links = discover_links(&sanitized, &target.url, base);

    debug!(
        "Extracted {} bytes and {} links from {url}",
        sanitized.len(),
        links.len()
    );

    Ok(ContentFragment {
        source_url: target.url.clone(),
        html: sanitized,
        title,
        depth: target.depth,
        links,
        anchor: None,
    })
}

async fn load_and_extract<S: BrowsingSession>(
    session: &S,
    target: &LeafRef,
    config: &HarvestConfig,
    base: &Url,
) -> Result<ContentFragment, ExtractError> {
    let url = target.url.as_str();
    let timeouts = config.timeouts();

    session
        .navigate(url, timeouts.page_load)
        .await
        .map_err(|e| ExtractError::from_browse(url, e))?;
    session
        .wait_stable(timeouts.settle)
        .await
        .map_err(|e| ExtractError::from_browse(url, e))?;

    let html = session
        .content()
        .await
        .map_err(|e| ExtractError::from_browse(url, e))?;

    fragment_from_html(&html, target, config, base)
}

/// Fetch `target` in a fresh browsing context and extract its content.
///
/// The context is closed on every path, including timeouts and
/// `ContentNotFound`.
pub async fn extract<E: BrowsingEngine>(
    engine: &E,
    target: &LeafRef,
    config: &HarvestConfig,
    base: &Url,
) -> Result<ContentFragment, ExtractError> {
    let url = target.url.as_str();
    let session = engine
        .open_session()
        .await
        .map_err(|e| ExtractError::from_browse(url, e))?;

    let outcome = load_and_extract(&session, target, config, base).await;

    if let Err(e) = session.close().await {
        warn!("Failed to close page for {url}: {e}");
    }

    outcome
}
