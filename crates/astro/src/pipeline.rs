//! The ordered transform pipeline.
//!
//! A document goes through frontmatter extraction, markdown parsing, the
//! markdown-stage passes, conversion to hast, and the HTML-stage passes, each
//! list in its declared order.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use markdown::mdast::Node as MdNode;
use neohome_core::hast::Node;
use neohome_core::{
    Diagnostics, Frontmatter, IncludeContext, ParseOptions, PipelineError, extract_frontmatter,
    parse_mdast,
};
use serde::Deserialize;

use crate::highlight::{HighlightAdapter, Highlighter};
use crate::renderer::hast::{Options as RenderOptions, to_hast};
use crate::transform::{
    anchors, code_copy, heading_ids, highlight, include, reading_time, sections, title, title_check,
};

pub use crate::transform::heading_ids::HeadingEntry;

/// Default highlighter timeout in milliseconds.
pub const DEFAULT_HIGHLIGHT_TIMEOUT_MS: u64 = 10_000;

/// Pipeline configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Options {
    /// Upper bound for a single highlighter call.
    #[serde(default = "default_highlight_timeout_ms")]
    pub highlight_timeout_ms: u64,
    /// Includes must resolve inside this directory when set.
    #[serde(default)]
    pub include_root: Option<PathBuf>,
    /// mdast → hast conversion options.
    #[serde(default)]
    pub render: RenderOptions,
}

fn default_highlight_timeout_ms() -> u64 {
    DEFAULT_HIGHLIGHT_TIMEOUT_MS
}

impl Default for Options {
    fn default() -> Self {
        Self {
            highlight_timeout_ms: default_highlight_timeout_ms(),
            include_root: None,
            render: RenderOptions::default(),
        }
    }
}

/// Passes over the markdown-level tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkdownPass {
    /// Splice `file` includes into code blocks.
    IncludeFiles,
    /// Warn about level-1 headings in the body.
    WarnLevelOneHeadings,
    /// Fill the frontmatter's reading time.
    EstimateReadingTime,
}

impl MarkdownPass {
    /// Every markdown pass, in the order the site runs them.
    pub const ALL: [MarkdownPass; 3] = [
        MarkdownPass::IncludeFiles,
        MarkdownPass::WarnLevelOneHeadings,
        MarkdownPass::EstimateReadingTime,
    ];

    /// Name used in logs and errors.
    pub fn name(self) -> &'static str {
        match self {
            MarkdownPass::IncludeFiles => "include-files",
            MarkdownPass::WarnLevelOneHeadings => "warn-level-one-headings",
            MarkdownPass::EstimateReadingTime => "estimate-reading-time",
        }
    }
}

/// Passes over the HTML-level tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HtmlPass {
    /// Assign heading ids.
    HeadingIds,
    /// Wrap heading content in self links.
    HeadingAnchors,
    /// Highlight code blocks.
    Highlight,
    /// Add copy buttons to code blocks.
    CodeCopy,
    /// Nest content into sections.
    Sections,
    /// Insert the frontmatter title.
    Title,
}

impl HtmlPass {
    /// Every HTML pass, in the order the site runs them.
    pub const ALL: [HtmlPass; 6] = [
        HtmlPass::HeadingIds,
        HtmlPass::HeadingAnchors,
        HtmlPass::Highlight,
        HtmlPass::CodeCopy,
        HtmlPass::Sections,
        HtmlPass::Title,
    ];

    /// Name used in logs and errors.
    pub fn name(self) -> &'static str {
        match self {
            HtmlPass::HeadingIds => "heading-ids",
            HtmlPass::HeadingAnchors => "heading-anchors",
            HtmlPass::Highlight => "highlight",
            HtmlPass::CodeCopy => "code-copy",
            HtmlPass::Sections => "sections",
            HtmlPass::Title => "title",
        }
    }

    /// Pass that must have run before this one.
    pub fn requires(self) -> Option<HtmlPass> {
        match self {
            HtmlPass::HeadingAnchors => Some(HtmlPass::HeadingIds),
            _ => None,
        }
    }

    /// Pass that must run earlier when both are listed.
    pub fn after(self) -> Option<HtmlPass> {
        match self {
            HtmlPass::CodeCopy => Some(HtmlPass::Highlight),
            HtmlPass::Title => Some(HtmlPass::Sections),
            _ => None,
        }
    }
}

/// Everything a transform produces.
#[derive(Debug, Clone)]
pub struct TransformOutput {
    /// Enriched hast root.
    pub tree: Node,
    /// Typed frontmatter, with reading time filled in when estimated.
    pub frontmatter: Option<Frontmatter>,
    /// Headings in document order.
    pub headings: Vec<HeadingEntry>,
    /// Non-fatal warnings.
    pub diagnostics: Diagnostics,
}

/// Ordered pass lists plus the collaborators they need.
#[derive(Debug, Clone)]
pub struct Pipeline {
    markdown: Vec<MarkdownPass>,
    html: Vec<HtmlPass>,
    options: Options,
    highlighter: Option<HighlightAdapter>,
}

impl Pipeline {
    /// The full site pipeline.
    pub fn new(options: Options) -> Self {
        Self {
            markdown: MarkdownPass::ALL.to_vec(),
            html: HtmlPass::ALL.to_vec(),
            options,
            highlighter: None,
        }
    }

    /// A pipeline with custom pass lists.
    ///
    /// Fails with [`PipelineError::PassOrder`] when a pass is listed without,
    /// or before, a pass it depends on. Heading anchors need heading ids.
    pub fn with_passes(
        markdown: Vec<MarkdownPass>,
        html: Vec<HtmlPass>,
        options: Options,
    ) -> Result<Self, PipelineError> {
        validate_order(&html)?;
        Ok(Self {
            markdown,
            html,
            options,
            highlighter: None,
        })
    }

    /// Uses `highlighter` for the highlight pass. Without one the pass is skipped.
    pub fn with_highlighter(mut self, highlighter: Arc<dyn Highlighter>) -> Self {
        let timeout = Duration::from_millis(self.options.highlight_timeout_ms);
        self.highlighter = Some(HighlightAdapter::new(highlighter, timeout));
        self
    }

    /// Pipeline options.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Transforms markdown source with a frontmatter block.
    pub fn transform(
        &self,
        source: &str,
        document: &Path,
    ) -> Result<TransformOutput, PipelineError> {
        let extraction = extract_frontmatter(source).map_err(|source| PipelineError::Frontmatter {
            document: document.to_path_buf(),
            source,
        })?;
        let frontmatter = if extraction.present {
            let frontmatter = Frontmatter::from_value(&extraction.value).map_err(|source| {
                PipelineError::Frontmatter {
                    document: document.to_path_buf(),
                    source,
                }
            })?;
            Some(frontmatter)
        } else {
            None
        };
        let tree = parse_mdast(source, document, &ParseOptions::post())?;
        self.run(tree, frontmatter, document)
    }

    /// Runs the passes over an already parsed document.
    pub fn run(
        &self,
        mut tree: MdNode,
        mut frontmatter: Option<Frontmatter>,
        document: &Path,
    ) -> Result<TransformOutput, PipelineError> {
        let mut diagnostics = Diagnostics::new();

        for pass in &self.markdown {
            log::debug!("{}: {}", document.display(), pass.name());
            match pass {
                MarkdownPass::IncludeFiles => {
                    let context = IncludeContext {
                        document,
                        root: self.options.include_root.as_deref(),
                    };
                    include::include_files(&mut tree, context)?;
                }
                MarkdownPass::WarnLevelOneHeadings => {
                    title_check::warn_level_one_headings(&tree, document, &mut diagnostics);
                }
                MarkdownPass::EstimateReadingTime => {
                    if let Some(frontmatter) = frontmatter.as_mut() {
                        reading_time::estimate_reading_time(&tree, frontmatter);
                    }
                }
            }
        }

        let mut root = to_hast(&tree, &self.options.render);
        let mut headings = Vec::new();

        for &pass in &self.html {
            log::debug!("{}: {}", document.display(), pass.name());
            match pass {
                HtmlPass::HeadingIds => headings = heading_ids::assign_heading_ids(&mut root),
                HtmlPass::HeadingAnchors => {
                    anchors::inject_heading_anchors(&mut root);
                }
                HtmlPass::Highlight => {
                    if let Some(adapter) = &self.highlighter {
                        highlight::highlight_code_blocks(
                            &mut root,
                            adapter,
                            document,
                            &mut diagnostics,
                        )?;
                    }
                }
                HtmlPass::CodeCopy => {
                    code_copy::wrap_code_blocks(&mut root);
                }
                HtmlPass::Sections => sections::nest_sections(&mut root),
                HtmlPass::Title => title::inject_title(&mut root, frontmatter.as_ref(), document)?,
            }
        }

        Ok(TransformOutput {
            tree: root,
            frontmatter,
            headings,
            diagnostics,
        })
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(Options::default())
    }
}

fn validate_order(passes: &[HtmlPass]) -> Result<(), PipelineError> {
    for (index, pass) in passes.iter().enumerate() {
        if let Some(required) = pass.requires() {
            if !passes[..index].contains(&required) {
                return Err(PipelineError::PassOrder {
                    pass: pass.name(),
                    requires: required.name(),
                });
            }
        }
        if let Some(earlier) = pass.after() {
            if passes[index + 1..].contains(&earlier) {
                return Err(PipelineError::PassOrder {
                    pass: pass.name(),
                    requires: earlier.name(),
                });
            }
        }
    }
    Ok(())
}

/// Transforms one document with the full pipeline and no highlighter.
pub fn transform_document(
    source: &str,
    document: &Path,
    options: Options,
) -> Result<TransformOutput, PipelineError> {
    Pipeline::new(options).transform(source, document)
}
