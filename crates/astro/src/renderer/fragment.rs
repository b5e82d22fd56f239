//! HTML fragment parsing into hast nodes.

use neohome_core::hast::{Element, Node};

/// Parses an HTML fragment with `tl`.
///
/// Comments are dropped and entities in text and attribute values are
/// decoded, so the resulting text nodes hold plain text. Whitespace-only text
/// is kept because highlighted code depends on it. Returns `None` when `tl`
/// rejects the input.
pub fn parse_fragment(html: &str) -> Option<Vec<Node>> {
    let dom = tl::parse(html, tl::ParserOptions::default()).ok()?;
    let parser = dom.parser();
    Some(
        dom.children()
            .iter()
            .filter_map(|handle| convert(*handle, parser))
            .collect(),
    )
}

fn convert(handle: tl::NodeHandle, parser: &tl::Parser) -> Option<Node> {
    match handle.get(parser)? {
        tl::Node::Tag(tag) => {
            let mut element = Element::new(tag.name().as_utf8_str().to_lowercase());
            for (key, value) in tag.attributes().iter() {
                let key = key.to_lowercase();
                let value = value
                    .map(|value| html_escape::decode_html_entities(&value).into_owned())
                    .unwrap_or_default();
                if key == "class" {
                    let classes = value.split_whitespace().map(str::to_string).collect::<Vec<_>>();
                    element.properties.set(key, classes);
                } else {
                    element.properties.set(key, value);
                }
            }
            for child in tag.children().top().iter() {
                if let Some(node) = convert(*child, parser) {
                    element.children.push(node);
                }
            }
            Some(Node::Element(element))
        }
        tl::Node::Raw(bytes) => {
            let raw = bytes.as_utf8_str();
            if raw.is_empty() {
                return None;
            }
            Some(Node::text(html_escape::decode_html_entities(&raw).into_owned()))
        }
        tl::Node::Comment(_) => None,
    }
}
