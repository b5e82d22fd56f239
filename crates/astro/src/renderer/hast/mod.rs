//! mdast → hast conversion.
//!
//! Mirrors what `mdast-util-to-hast` produces for the constructs the site
//! uses, so the HTML-stage passes see the tree Astro's rehype plugins saw:
//! headings without ids, code blocks as `pre > code.language-*`, GFM tables,
//! task lists and footnotes.
//!
//! # Module Structure
//!
//! - `context` - conversion state (scopes, definitions, footnotes)
//! - `render` - per-node conversion functions

mod context;
pub mod render;

pub use context::{Context, Definition, Scope};

use markdown::mdast::Node as MdNode;
use neohome_core::hast::Node;
use serde::Deserialize;

/// Options for the mdast → hast conversion.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Options {
    /// Parse raw HTML into elements; when false it is kept as literal text.
    #[serde(default = "default_allow_raw_html")]
    pub allow_raw_html: bool,
    /// Add `loading="lazy"` to images.
    #[serde(default)]
    pub lazy_images: bool,
}

fn default_allow_raw_html() -> bool {
    true
}

impl Default for Options {
    fn default() -> Self {
        Self {
            allow_raw_html: default_allow_raw_html(),
            lazy_images: false,
        }
    }
}

/// Converts a markdown-level tree into an HTML-level root.
///
/// ```
/// use neohome_astro::renderer::hast::{to_hast, Options};
/// use neohome_core::{parse_mdast, ParseOptions};
/// use std::path::Path;
///
/// let mdast = parse_mdast("## Hi", Path::new("post.md"), &ParseOptions::default()).unwrap();
/// let root = to_hast(&mdast, &Options::default());
/// assert_eq!(root.children()[0].as_element().unwrap().tag_name, "h2");
/// ```
pub fn to_hast(tree: &MdNode, options: &Options) -> Node {
    let mut ctx = Context::new(options, tree);
    let top_level = tree.children().map_or(&[][..], |c| c.as_slice());
    let mut children = render::render_children(top_level, &mut ctx);
    if let Some(footnotes) = render::render_footnote_section(&mut ctx) {
        children.push(footnotes);
    }
    Node::root(children)
}
