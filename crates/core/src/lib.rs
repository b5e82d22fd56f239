#![deny(missing_docs)]
//! neohome core: the HTML-level node model, frontmatter, code block meta,
//! file includes, heading slugs and markdown parsing.

/// Core error and diagnostic types.
pub mod error;
/// YAML frontmatter extraction and the post schema.
pub mod frontmatter;
/// HTML-level tree.
pub mod hast;
/// `file` include resolution.
pub mod include;
/// Code block meta string parsing.
pub mod meta;
/// Markdown parsing utilities.
pub mod parse;
/// Slug generation utilities.
pub mod slug;

pub use error::{Diagnostics, HighlightError, PipelineError, SourceLocation, Warning};
pub use frontmatter::{
    Frontmatter, FrontmatterError, FrontmatterExtraction, ReadingTime, extract_frontmatter,
};
pub use hast::{Element, Node, Properties, PropertyValue};
pub use include::{IncludeContext, append_include, normalize_path, read_include, resolve_include};
pub use meta::{CodeMeta, MetaError, MetaValue};
pub use parse::{ParseOptions, parse_mdast};
pub use slug::{Slugger, extract_custom_id};
