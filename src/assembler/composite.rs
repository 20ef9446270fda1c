//! The assembled document and its HTML serialization

use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::Path;

use chrono::{DateTime, Utc};
use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::crawl_engine::crawl_types::{HarvestError, HarvestResult};
use crate::page_extractor::ContentFragment;

const PRINT_STYLE: &str = r"
body { font-family: sans-serif; line-height: 1.45; margin: 0 2em; }
img { max-width: 100%; height: auto; }
pre, code { white-space: pre-wrap; }
table { border-collapse: collapse; }
td, th { border: 1px solid #ccc; padding: 0.25em 0.5em; }
nav.docweave-toc ol { list-style: none; padding-left: 0; }
nav.docweave-toc li { margin: 0.15em 0; }
section.docweave-fragment { break-before: page; }
";

/// Ordered fragments with their anchors, links already rewritten.
#[derive(Debug, Clone)]
pub struct CompositeDocument {
    pub title: String,
    pub generated_at: DateTime<Utc>,
    pub fragments: Vec<ContentFragment>,
    /// anchor → index into `fragments`
    pub anchors: HashMap<String, usize>,
}

impl CompositeDocument {
    #[must_use]
    pub fn fragment(&self, anchor: &str) -> Option<&ContentFragment> {
        self.anchors.get(anchor).and_then(|&i| self.fragments.get(i))
    }

    /// Anchors in document order.
    #[must_use]
    pub fn anchors_in_order(&self) -> Vec<&str> {
        self.fragments
            .iter()
            .filter_map(|f| f.anchor.as_deref())
            .collect()
    }

    fn write_toc(&self, out: &mut String) {
        out.push_str("<nav class=\"docweave-toc\">\n<h1>");
        out.push_str(&encode_text(&self.title));
        out.push_str("</h1>\n<ol>\n");
        for fragment in &self.fragments {
            let Some(anchor) = fragment.anchor.as_deref() else {
                continue;
            };
            let label = fragment.title.as_deref().unwrap_or(anchor);
            let _ = writeln!(
                out,
                "<li class=\"toc-depth-{depth}\" style=\"margin-left: {indent}em\"><a href=\"#{anchor}\">{label}</a></li>",
                depth = fragment.depth,
                indent = fragment.depth * 2,
                anchor = encode_double_quoted_attribute(anchor),
                label = encode_text(label),
            );
        }
        out.push_str("</ol>\n</nav>\n");
    }

    /// Full standalone HTML document: table of contents followed by every
    /// fragment in order.
    #[must_use]
    pub fn to_html(&self) -> String {
        let body_len: usize = self.fragments.iter().map(|f| f.html.len()).sum();
        let mut out = String::with_capacity(body_len + 4096);

        out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
        let _ = writeln!(out, "<title>{}</title>", encode_text(&self.title));
        out.push_str("<meta name=\"generator\" content=\"docweave\">\n");
        let _ = writeln!(
            out,
            "<meta name=\"docweave:generated\" content=\"{}\">",
            self.generated_at.to_rfc3339()
        );
        let _ = writeln!(out, "<style>{PRINT_STYLE}</style>");
        out.push_str("</head>\n<body>\n");

        self.write_toc(&mut out);

        // Title headings live inside each fragment's anchored root
        for fragment in &self.fragments {
            let _ = writeln!(
                out,
                "<section class=\"docweave-fragment\" data-source-url=\"{}\">",
                encode_double_quoted_attribute(fragment.source_url.as_str())
            );
            out.push_str(&fragment.html);
            out.push_str("\n</section>\n");
        }

        out.push_str("</body>\n</html>\n");
        out
    }

    /// Persist the composite, creating parent directories.
    pub fn write_to(&self, path: &Path) -> HarvestResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| HarvestError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(path, self.to_html()).map_err(|source| HarvestError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
