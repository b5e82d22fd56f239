//! Tree-rewriting passes.
//!
//! Markdown-stage passes work on the mdast before conversion:
//! - `include`: splices `file` includes into code blocks.
//! - `title_check`: warns about level-1 headings in the body.
//! - `reading_time`: fills in the frontmatter's reading time.
//!
//! HTML-stage passes work on the hast root, in this order:
//! - `heading_ids`: github-slugger ids and the heading list.
//! - `anchors`: wraps heading content in a self link.
//! - `highlight`: replaces code text with highlighter markup.
//! - `code_copy`: wraps `pre` blocks with a copy button.
//! - `sections`: nests content under `section` elements per heading.
//! - `title`: injects the frontmatter title as the first `h1`.

/// Heading self links.
pub mod anchors;
/// Copy button enrichment for code blocks.
pub mod code_copy;
/// Heading id assignment.
pub mod heading_ids;
/// Syntax highlighting of code blocks.
pub mod highlight;
/// `file` includes in code block meta.
pub mod include;
/// Reading time estimation.
pub mod reading_time;
/// Section nesting.
pub mod sections;
/// Frontmatter title injection.
pub mod title;
/// Level-1 heading diagnostics.
pub mod title_check;

use markdown::mdast::Node as MdNode;

/// Plain text of an mdast subtree, code included, like `mdast-util-to-string`.
pub(crate) fn mdast_text(node: &MdNode) -> String {
    let mut buffer = String::new();
    collect_mdast_text(node, &mut buffer);
    buffer
}

fn collect_mdast_text(node: &MdNode, buffer: &mut String) {
    match node {
        MdNode::Text(text) => buffer.push_str(&text.value),
        MdNode::InlineCode(code) => buffer.push_str(&code.value),
        MdNode::Code(code) => buffer.push_str(&code.value),
        MdNode::Image(image) => buffer.push_str(&image.alt),
        MdNode::Yaml(_) | MdNode::Toml(_) | MdNode::Html(_) => {}
        _ => {
            if let Some(children) = node.children() {
                for child in children {
                    if is_block(child) && !buffer.is_empty() && !buffer.ends_with('\n') {
                        buffer.push('\n');
                    }
                    collect_mdast_text(child, buffer);
                }
            }
        }
    }
}

fn is_block(node: &MdNode) -> bool {
    matches!(
        node,
        MdNode::Paragraph(_)
            | MdNode::Heading(_)
            | MdNode::Code(_)
            | MdNode::List(_)
            | MdNode::ListItem(_)
            | MdNode::Blockquote(_)
            | MdNode::Table(_)
    )
}
