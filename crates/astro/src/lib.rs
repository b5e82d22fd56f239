#![deny(missing_docs)]
//! neohome Astro engine: mdast → hast conversion, the highlighter boundary,
//! and the ordered markdown- and HTML-stage passes behind the site's posts.

/// External syntax highlighter boundary.
pub mod highlight;
/// Copy button icons.
pub mod icons;
/// Ordered pass lists and the document transform entry points.
pub mod pipeline;
/// Rendering layer (mdast → hast, HTML fragments).
pub mod renderer;
/// Individual tree passes.
pub mod transform;

pub use highlight::{CallError, Highlight, HighlightAdapter, Highlighter};
pub use pipeline::{
    HeadingEntry, HtmlPass, MarkdownPass, Options, Pipeline, TransformOutput, transform_document,
};
pub use renderer::{RenderOptions, parse_fragment, to_hast};
