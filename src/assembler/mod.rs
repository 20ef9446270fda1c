//! Document assembler
//!
//! Folds extracted fragments into one composite document. Every fragment
//! gets a unique anchor on arrival; links are rewritten and inner ids made
//! unique once, in [`DocumentAssembler::finalize`], when every possible
//! target is known.

pub mod anchors;
pub mod composite;
pub mod link_rewriter;

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use log::{debug, warn};
use url::Url;

use crate::page_extractor::ContentFragment;

pub use anchors::{derive_anchor, disambiguate};
pub use composite::CompositeDocument;
pub use link_rewriter::{AnchorIndex, FragmentPlacement, LinkTarget, classify_link, rewrite_fragment};

#[derive(Debug)]
pub struct DocumentAssembler {
    base: Url,
    title: String,
    fragments: Vec<ContentFragment>,
    /// anchor → index into `fragments`
    anchors: HashMap<String, usize>,
    index: AnchorIndex,
}

impl DocumentAssembler {
    pub fn new(base: Url, title: impl Into<String>) -> Self {
        Self {
            base,
            title: title.into(),
            fragments: Vec::new(),
            anchors: HashMap::new(),
            index: AnchorIndex::default(),
        }
    }

    /// Append `fragment` and return the anchor it was given.
    ///
    /// The anchor derives from the title (or the URL when untitled); a taken
    /// anchor gets `_2`, `_3`, ... appended.
    pub fn add(&mut self, mut fragment: ContentFragment) -> String {
        let derived = derive_anchor(fragment.title.as_deref(), &fragment.source_url);
        let anchor = disambiguate(derived, |candidate| self.anchors.contains_key(candidate));

        debug!("Assembling {} as #{anchor}", fragment.source_url);
        self.index
            .insert(&fragment.source_url, fragment.title.as_deref(), &anchor);
        self.anchors.insert(anchor.clone(), self.fragments.len());
        fragment.anchor = Some(anchor.clone());
        self.fragments.push(fragment);
        anchor
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Anchor already given to the fragment from `url`, if any.
    #[must_use]
    pub fn anchor_for_url(&self, url: &Url) -> Option<&str> {
        self.index.anchor_for_url(url)
    }

    /// Run the link rewrite pass and produce the composite.
    #[must_use]
    pub fn finalize(self) -> CompositeDocument {
        let Self {
            base,
            title,
            fragments,
            anchors,
            index,
        } = self;

        // Element ids across the whole composite
        let mut taken_ids: HashSet<String> = anchors.keys().cloned().collect();

        let fragments = fragments
            .into_iter()
            .map(|mut fragment| {
                let anchor = fragment.anchor.clone().unwrap_or_default();
                let placement = FragmentPlacement {
                    anchor: &anchor,
                    title: fragment.title.as_deref(),
                    level: fragment.depth + 1,
                };
                match rewrite_fragment(
                    &fragment.html,
                    &placement,
                    &index,
                    &mut taken_ids,
                    &fragment.source_url,
                    &base,
                ) {
                    Ok(html) => fragment.html = html,
                    Err(e) => {
                        warn!(
                            "Link rewrite failed for {}, keeping links as extracted: {e:#}",
                            fragment.source_url
                        );
                        fragment.html = placement.wrap(&fragment.html);
                    }
                }
                fragment
            })
            .collect();

        CompositeDocument {
            title,
            generated_at: Utc::now(),
            fragments,
            anchors,
        }
    }
}
