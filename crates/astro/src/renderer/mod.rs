//! Rendering layer: markdown-level tree to HTML-level tree.

/// HTML fragment parsing.
pub mod fragment;
/// mdast → hast conversion.
pub mod hast;

pub use fragment::parse_fragment;
pub use hast::{Options as RenderOptions, to_hast};
