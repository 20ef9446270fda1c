//! Composite assembly: anchors, link rewriting and the final document

use std::collections::HashSet;

use docweave::assembler::DocumentAssembler;
use docweave::page_extractor::{ContentFragment, discover_links};
use proptest::prelude::*;
use url::Url;

fn base() -> Url {
    Url::parse("https://docs.example.com/docs/index.html").unwrap()
}

fn fragment(path: &str, title: Option<&str>, html: &str, depth: usize) -> ContentFragment {
    let source_url = base().join(path).unwrap();
    ContentFragment {
        links: discover_links(html, &source_url, &base()),
        source_url,
        html: html.to_string(),
        title: title.map(str::to_string),
        depth,
        anchor: None,
    }
}

#[test]
fn test_getting_started_links_become_local() {
    let mut assembler = DocumentAssembler::new(base(), "Docs");
    assembler.add(fragment(
        "overview.html",
        Some("Overview"),
        r#"<div class="body conbody"><p>Next: <a href="install.html">Install</a></p></div>"#,
        1,
    ));
    assembler.add(fragment(
        "install.html",
        Some("Install"),
        r#"<div class="body conbody"><p>Back to <a href="overview.html#intro">the overview</a></p></div>"#,
        1,
    ));

    let composite = assembler.finalize();

    assert_eq!(composite.anchors_in_order(), vec!["Overview", "Install"]);
    let overview = composite.fragment("Overview").unwrap();
    assert!(overview.html.contains(r##"href="#Install""##), "{}", overview.html);
    assert!(overview.html.contains(r#"id="Overview""#));
    let install = composite.fragment("Install").unwrap();
    assert!(install.html.contains(r##"href="#Overview""##), "{}", install.html);
}

#[test]
fn test_duplicate_titles_get_suffixes_and_urls_decide() {
    let mut assembler = DocumentAssembler::new(base(), "Docs");
    let first = assembler.add(fragment(
        "faq1.html",
        Some("FAQ"),
        r#"<div><a href="faq2.html">FAQ</a> <a href="faq3.html">FAQ</a></div>"#,
        1,
    ));
    let second = assembler.add(fragment("faq2.html", Some("FAQ"), "<div>second</div>", 1));

    assert_eq!(first, "FAQ");
    assert_eq!(second, "FAQ_2");

    let composite = assembler.finalize();
    let html = &composite.fragment("FAQ").unwrap().html;
    assert!(html.contains(r##"href="#FAQ_2""##), "{html}");
    // Shared title: text alone does not pick a target
    assert!(html.contains(r#"href="faq3.html""#), "{html}");
}

#[test]
fn test_unique_title_text_resolves_unassembled_url() {
    let mut assembler = DocumentAssembler::new(base(), "Docs");
    assembler.add(fragment(
        "a.html",
        Some("Alpha"),
        r#"<div><a href="legacy/setup.html">Setup Guide</a></div>"#,
        0,
    ));
    assembler.add(fragment("setup.html", Some("Setup Guide"), "<div>setup</div>", 0));

    let composite = assembler.finalize();
    let html = &composite.fragment("Alpha").unwrap().html;
    assert!(html.contains(r##"href="#Setup_Guide""##), "{html}");
}

#[test]
fn test_query_links_become_absolute_and_foreign_links_stay() {
    let mut assembler = DocumentAssembler::new(base(), "Docs");
    assembler.add(fragment(
        "a.html",
        Some("Alpha"),
        r##"<div>
            <a href="?topic=unknown">Elsewhere</a>
            <a href="https://other.example.org/">Other</a>
            <a href="#local">Local</a>
            <a href="mailto:docs@example.com">Mail</a>
        </div>"##,
        0,
    ));

    let composite = assembler.finalize();
    let html = &composite.fragment("Alpha").unwrap().html;
    assert!(
        html.contains(r#"href="https://docs.example.com/docs/index.html?topic=unknown""#),
        "{html}"
    );
    assert!(html.contains(r#"href="https://other.example.org/""#));
    assert!(html.contains(r##"href="#local""##));
    assert!(html.contains(r#"href="mailto:docs@example.com""#));
}

#[test]
fn test_existing_root_id_is_preserved_as_data_attribute() {
    let mut assembler = DocumentAssembler::new(base(), "Docs");
    assembler.add(fragment(
        "a.html",
        Some("Alpha"),
        r#"<div id="content-main"><p>x</p></div>"#,
        0,
    ));

    let composite = assembler.finalize();
    let html = &composite.fragment("Alpha").unwrap().html;
    assert!(html.contains(r#"id="Alpha""#), "{html}");
    assert!(html.contains(r#"data-source-id="content-main""#), "{html}");
}

#[test]
fn test_inner_ids_stay_unique_across_fragments() {
    let mut assembler = DocumentAssembler::new(base(), "Docs");
    assembler.add(fragment(
        "overview.html",
        Some("Overview"),
        r##"<div class="body conbody">
            <h2 id="Install">Install</h2>
            <p id="notes">Overview notes</p>
            <a href="#notes">notes</a>
            <a href="install.html">Install page</a>
        </div>"##,
        1,
    ));
    assembler.add(fragment(
        "install.html",
        Some("Install"),
        r##"<div class="body conbody"><p id="notes">Install notes</p><a href="#notes">notes</a></div>"##,
        1,
    ));

    let html = assembler.finalize().to_html();

    for id in ["Overview", "Install", "notes", "Overview_Install", "Install_notes"] {
        assert_eq!(
            html.matches(&format!("id=\"{id}\"")).count(),
            1,
            "id {id} in {html}"
        );
    }
    // The first page keeps its id, the second follows its renamed target
    let overview = html.find(r#"id="Overview""#).unwrap();
    let install = html.find(r#"id="Install""#).unwrap();
    assert_eq!(html[overview..install].matches(r##"href="#notes""##).count(), 1);
    assert!(html[install..].contains(r##"href="#Install_notes""##), "{html}");
    assert!(html[overview..install].contains(r##"href="#Install""##));
}

#[test]
fn test_anchor_target_starts_with_the_title() {
    let mut assembler = DocumentAssembler::new(base(), "Docs");
    assembler.add(fragment(
        "overview.html",
        Some("Overview"),
        r#"<div class="body conbody"><p>body</p></div>"#,
        1,
    ));
    assembler.add(fragment(
        "steps.html",
        Some("Steps"),
        r#"<ol><li>one</li></ol>"#,
        1,
    ));

    let composite = assembler.finalize();
    let html = composite.to_html();

    // The heading is the first child of the element carrying the anchor
    let root = html.find(r#"id="Overview""#).unwrap();
    let after_tag = root + html[root..].find('>').unwrap() + 1;
    assert!(
        html[after_tag..].starts_with(r#"<h2 class="docweave-title">Overview</h2>"#),
        "{html}"
    );
    assert!(
        html.contains(r#"<div id="Steps"><h2 class="docweave-title">Steps</h2><ol>"#),
        "{html}"
    );
    assert_eq!(html.matches("docweave-title").count(), 2);
}

#[test]
fn test_untitled_fragment_gets_url_anchor() {
    let mut assembler = DocumentAssembler::new(base(), "Docs");
    let anchor = assembler.add(fragment("setup-guide.html", None, "<div>x</div>", 0));
    assert_eq!(anchor, "page_setup-guide");
}

#[test]
fn test_composite_html_has_toc_and_sections_in_order() {
    let mut assembler = DocumentAssembler::new(base(), "Product <Docs>");
    assembler.add(fragment("gs.html", Some("Getting Started"), "<div>gs</div>", 0));
    assembler.add(fragment("ov.html", Some("Overview"), "<div>ov</div>", 1));

    let html = assembler.finalize().to_html();

    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("<title>Product &lt;Docs&gt;</title>"));
    assert!(html.contains(r##"<a href="#Getting_Started">Getting Started</a>"##));
    assert!(html.contains(r##"<a href="#Overview">Overview</a>"##));
    let gs = html.find(r#"id="Getting_Started""#).unwrap();
    let ov = html.find(r#"id="Overview""#).unwrap();
    assert!(gs < ov);
    assert!(html.contains(r#"<h2 class="docweave-title">Overview</h2>"#));
}

proptest! {
    #[test]
    fn prop_anchors_unique_after_finalize(
        titles in prop::collection::vec(
            prop::option::of(prop::sample::select(vec!["FAQ", "Install", "FAQ_2", "Über", "?!", "Set up"])),
            1..12,
        )
    ) {
        let mut assembler = DocumentAssembler::new(base(), "Docs");
        for (i, title) in titles.iter().enumerate() {
            assembler.add(fragment(&format!("p{i}.html"), *title, "<div>x</div>", 0));
        }

        let composite = assembler.finalize();
        let anchors = composite.anchors_in_order();
        let unique: HashSet<_> = anchors.iter().collect();
        prop_assert_eq!(anchors.len(), titles.len());
        prop_assert_eq!(unique.len(), anchors.len());
        for fragment in &composite.fragments {
            let anchor = fragment.anchor.as_deref().unwrap();
            let expected = format!("id=\"{anchor}\"");
            prop_assert!(fragment.html.contains(&expected));
        }
    }
}
