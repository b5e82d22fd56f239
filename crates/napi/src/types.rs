//! NAPI-exposed data structures.

use std::path::PathBuf;

use napi_derive::napi;
use neohome_astro::{Options, RenderOptions, TransformOutput};
use neohome_core::Warning;
use serde_json::Value as JsonValue;

/// Parsed frontmatter document plus any parser errors.
#[napi(object)]
#[derive(Debug, Clone)]
pub struct FrontmatterResult {
    /// Structured frontmatter data represented as JSON.
    pub frontmatter: JsonValue,
    /// Any syntax or parsing errors surfaced by the extractor.
    pub errors: Vec<String>,
}

/// Options accepted by the transform entry points.
#[napi(object)]
#[derive(Debug, Clone, Default)]
pub struct TransformConfig {
    /// Upper bound for a single highlighter call in milliseconds.
    pub highlight_timeout_ms: Option<u32>,
    /// Directory that `file` includes must stay inside.
    pub include_root: Option<String>,
    /// Parse raw HTML into elements (default: true).
    pub allow_raw_html: Option<bool>,
    /// Add `loading="lazy"` to images (default: false).
    pub lazy_images: Option<bool>,
}

impl TransformConfig {
    /// Pipeline options with unset fields at their defaults.
    pub fn to_options(&self) -> Options {
        let defaults = Options::default();
        let render_defaults = RenderOptions::default();
        Options {
            highlight_timeout_ms: self
                .highlight_timeout_ms
                .map(u64::from)
                .unwrap_or(defaults.highlight_timeout_ms),
            include_root: self.include_root.as_ref().map(PathBuf::from),
            render: RenderOptions {
                allow_raw_html: self.allow_raw_html.unwrap_or(render_defaults.allow_raw_html),
                lazy_images: self.lazy_images.unwrap_or(render_defaults.lazy_images),
            },
        }
    }
}

/// Heading metadata returned from the transform.
#[napi(object)]
#[derive(Debug, Clone)]
pub struct HeadingEntry {
    /// Heading level (1-6).
    pub depth: u8,
    /// Slug identifier.
    pub slug: String,
    /// Heading text content.
    pub text: String,
}

/// A non-fatal warning.
#[napi(object)]
#[derive(Debug, Clone)]
pub struct WarningEntry {
    /// Warning kind: `level-one-heading` or `unsupported-language`.
    pub warning_type: String,
    /// Line of the offending node, when known.
    pub line: Option<u32>,
    /// Human readable message.
    pub message: String,
}

impl From<&Warning> for WarningEntry {
    fn from(warning: &Warning) -> Self {
        let (warning_type, location) = match warning {
            Warning::LevelOneHeading { location, .. } => ("level-one-heading", location.as_ref()),
            Warning::UnsupportedLanguage { .. } => ("unsupported-language", None),
        };
        Self {
            warning_type: warning_type.to_string(),
            line: location.map(|location| location.line as u32),
            message: warning.to_string(),
        }
    }
}

/// Diagnostics returned alongside a transform.
#[napi(object)]
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    /// Warnings in the order they were raised.
    pub warnings: Vec<WarningEntry>,
}

/// Result of transforming one document.
#[napi(object)]
#[derive(Debug, Clone)]
pub struct TransformResult {
    /// Enriched document as a hast root.
    pub tree: JsonValue,
    /// Typed frontmatter, including the reading time estimate.
    pub frontmatter: Option<JsonValue>,
    /// Headings in document order.
    pub headings: Vec<HeadingEntry>,
    /// Non-fatal warnings.
    pub diagnostics: Diagnostics,
}

impl TryFrom<TransformOutput> for TransformResult {
    type Error = serde_json::Error;

    fn try_from(output: TransformOutput) -> Result<Self, Self::Error> {
        let frontmatter = output
            .frontmatter
            .as_ref()
            .map(serde_json::to_value)
            .transpose()?;
        Ok(Self {
            tree: serde_json::to_value(&output.tree)?,
            frontmatter,
            headings: output
                .headings
                .into_iter()
                .map(|heading| HeadingEntry {
                    depth: heading.depth,
                    slug: heading.slug,
                    text: heading.text,
                })
                .collect(),
            diagnostics: Diagnostics {
                warnings: output.diagnostics.warnings.iter().map(WarningEntry::from).collect(),
            },
        })
    }
}
