use std::convert::Infallible;

use neohome_core::hast::{Node, Text, visit_elements, visit_elements_mut};
use neohome_core::{Slugger, extract_custom_id};
use serde::Serialize;

/// A heading found in the document, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeadingEntry {
    /// Heading level (1-6).
    pub depth: u8,
    /// The heading's `id`.
    pub slug: String,
    /// Plain heading text.
    pub text: String,
}

/// Gives every `h1`..`h6` an `id` and returns the headings in order.
///
/// Existing ids are kept and reserved before any slug is generated. A
/// trailing `{#custom-id}` in the heading text becomes the id and is removed
/// from the text; otherwise the id is the github-slugger slug of the text.
pub fn assign_heading_ids(root: &mut Node) -> Vec<HeadingEntry> {
    let Some(children) = root.children_mut() else {
        return Vec::new();
    };
    let mut slugger = Slugger::new();
    visit_elements(children, &mut |element| {
        if element.heading_level().is_some() {
            if let Some(id) = element.id() {
                slugger.reserve(id);
            }
        }
    });
    let mut headings = Vec::new();
    visit_elements_mut(children, &mut |element| {
        let Some(depth) = element.heading_level() else {
            return Ok::<_, Infallible>(());
        };
        let slug = match element.id().map(str::to_string) {
            Some(id) => id,
            None => {
                let slug = match strip_custom_id(&mut element.children) {
                    Some(id) => {
                        slugger.reserve(&id);
                        id
                    }
                    None => slugger.slug(&element.text_content()),
                };
                element.properties.set("id", slug.clone());
                slug
            }
        };
        headings.push(HeadingEntry {
            depth,
            slug,
            text: element.text_content().trim().to_string(),
        });
        Ok(())
    })
    .unwrap_or_else(|never| match never {});
    headings
}

/// Removes a `{#id}` suffix from the last text node and returns the id.
fn strip_custom_id(children: &mut [Node]) -> Option<String> {
    let text = last_text_mut(children)?;
    let (rest, id) = extract_custom_id(&text.value);
    let id = id?.to_string();
    text.value = rest.to_string();
    Some(id)
}

fn last_text_mut(children: &mut [Node]) -> Option<&mut Text> {
    for child in children.iter_mut().rev() {
        match child {
            Node::Text(text) => return Some(text),
            Node::Element(element) => {
                if let Some(text) = last_text_mut(&mut element.children) {
                    return Some(text);
                }
            }
            Node::Root(_) => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use neohome_core::hast::Element;

    fn heading(tag: &str, text: &str) -> Node {
        Element::new(tag).with_child(Node::text(text)).into()
    }

    fn ids(root: &Node) -> Vec<Option<String>> {
        root.children()
            .iter()
            .map(|node| node.as_element().and_then(|el| el.id()).map(str::to_string))
            .collect()
    }

    #[test]
    fn slugs_and_deduplicates() {
        let mut root = Node::root(vec![
            heading("h2", "Getting Started"),
            heading("h3", "Getting Started"),
            Element::new("p").with_child(Node::text("Getting Started")).into(),
        ]);
        let headings = assign_heading_ids(&mut root);
        assert_eq!(
            ids(&root),
            vec![
                Some("getting-started".to_string()),
                Some("getting-started-1".to_string()),
                None,
            ]
        );
        assert_eq!(headings.len(), 2);
        assert_eq!(headings[1].depth, 3);
        assert_eq!(headings[1].text, "Getting Started");
    }

    #[test]
    fn honors_custom_id_suffix() {
        let mut root = Node::root(vec![
            Element::new("h2")
                .with_child(Node::text("Setup "))
                .with_child(Element::new("em").with_child(Node::text("now {#install}")))
                .into(),
        ]);
        let headings = assign_heading_ids(&mut root);
        assert_eq!(headings[0].slug, "install");
        assert_eq!(headings[0].text, "Setup now");
        assert_eq!(ids(&root), vec![Some("install".to_string())]);
    }

    #[test]
    fn keeps_existing_ids_and_avoids_them() {
        let mut root = Node::root(vec![
            Element::new("h2")
                .with_property("id", "intro")
                .with_child(Node::text("Hello"))
                .into(),
            heading("h2", "Intro"),
        ]);
        assign_heading_ids(&mut root);
        assert_eq!(
            ids(&root),
            vec![Some("intro".to_string()), Some("intro-1".to_string())]
        );
    }

    #[test]
    fn generated_ids_never_repeat() {
        let mut root = Node::root(vec![
            heading("h2", "A"),
            heading("h2", "A"),
            heading("h2", "A-1"),
            heading("h2", "Intro"),
            Element::new("h2")
                .with_property("id", "intro")
                .with_child(Node::text("Later"))
                .into(),
        ]);
        assign_heading_ids(&mut root);
        assert_eq!(
            ids(&root),
            vec![
                Some("a".to_string()),
                Some("a-1".to_string()),
                Some("a-1-1".to_string()),
                Some("intro-1".to_string()),
                Some("intro".to_string()),
            ]
        );
    }

    #[test]
    fn finds_nested_headings() {
        let mut root = Node::root(vec![
            Element::new("blockquote")
                .with_child(heading("h4", "Deep"))
                .into(),
        ]);
        let headings = assign_heading_ids(&mut root);
        assert_eq!(headings[0].slug, "deep");
    }
}
