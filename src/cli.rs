//! Command line interface for the `docweave` binary.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};

use crate::config::{ConfigFile, HarvestConfig, NavigationMode, RenderFormat};

/// Output directory used when neither the command line nor the config
/// file names one.
pub const DEFAULT_OUTPUT_DIR: &str = "docweave-output";

#[derive(Parser, Debug)]
#[command(
    name = "docweave",
    version,
    about = "Harvest a tree-navigated documentation site into one cross-linked document",
    long_about = "docweave walks the collapsible navigation tree of a documentation site, \
                  extracts each page's content panel, stitches the pages into one HTML \
                  document with working internal links and renders it to PDF."
)]
pub struct Cli {
    /// Root page of the documentation site (may come from --config instead)
    pub base_url: Option<String>,

    /// JSON config file; flags given on the command line take precedence
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory for the composite HTML, the PDF and report.json
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Identifier of a navigation sub-tree to harvest (repeatable)
    #[arg(short = 'r', long = "root", value_name = "ID")]
    pub roots: Vec<String>,

    /// Skip nodes whose title contains this phrase (repeatable)
    #[arg(short = 'x', long = "exclude-title", value_name = "PHRASE")]
    pub exclude_titles: Vec<String>,

    /// Skip URLs matching this glob, e.g. `*/videos/*` (repeatable)
    #[arg(long = "exclude-url", value_name = "GLOB")]
    pub exclude_urls: Vec<String>,

    /// How work items are discovered
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Final artifact format
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,

    /// Also extract in-scope pages linked from harvested pages, up to N hops
    #[arg(long, value_name = "N")]
    pub follow_depth: Option<u8>,

    /// Stop after extracting N pages
    #[arg(long, value_name = "N")]
    pub limit: Option<usize>,

    /// Title of the composite document (defaults to the site host)
    #[arg(long)]
    pub title: Option<String>,

    /// Write patterns.json describing every extracted page
    #[arg(long)]
    pub dump_patterns: bool,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Seconds to wait for each page load
    #[arg(long, value_name = "SECS")]
    pub page_timeout: Option<u64>,

    /// Do not print the section outline
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModeArg {
    /// Walk the collapsible navigation tree
    Tree,
    /// Take every link under the sub-tree roots
    LinkList,
}

impl From<ModeArg> for NavigationMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Tree => Self::Tree,
            ModeArg::LinkList => Self::LinkList,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormatArg {
    Pdf,
    Html,
}

impl From<FormatArg> for RenderFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Pdf => Self::Pdf,
            FormatArg::Html => Self::Html,
        }
    }
}

impl Cli {
    /// Merge the optional config file with the command line into a
    /// validated configuration.
    pub fn into_config(self) -> Result<HarvestConfig> {
        let mut file = match &self.config {
            Some(path) => ConfigFile::load(path)?,
            None => ConfigFile::default(),
        };

        let Some(base_url) = self.base_url.or(file.base_url.take()) else {
            bail!("no base URL given on the command line or in the config file");
        };
        let output_dir = self
            .output_dir
            .or(file.output_dir.take())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));

        // List flags replace the file's lists rather than extending them.
        if !self.roots.is_empty() {
            file.subtree_roots.clear();
        }
        if !self.exclude_titles.is_empty() {
            file.excluded_titles.clear();
        }
        if !self.exclude_urls.is_empty() {
            file.excluded_url_patterns.clear();
        }

        let mut builder = file
            .apply(HarvestConfig::builder().base_url(base_url).output_dir(output_dir))
            .subtree_roots(self.roots)
            .excluded_titles(self.exclude_titles)
            .excluded_url_patterns(self.exclude_urls);

        if let Some(mode) = self.mode {
            builder = builder.navigation_mode(mode.into());
        }
        if let Some(format) = self.format {
            builder = builder.render_format(format.into());
        }
        if let Some(hops) = self.follow_depth {
            builder = builder.follow_depth(hops);
        }
        if self.limit.is_some() {
            builder = builder.limit(self.limit);
        }
        if let Some(title) = self.title {
            builder = builder.document_title(title);
        }
        if self.dump_patterns {
            builder = builder.dump_patterns(true);
        }
        if self.headed {
            builder = builder.headless(false);
        }
        if let Some(secs) = self.page_timeout {
            builder = builder.page_load_timeout_secs(secs);
        }

        builder.build().context("invalid configuration")
    }
}
