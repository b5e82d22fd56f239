use neohome_core::hast::{Element, Node};

/// Groups the root's children into nested `section` elements.
///
/// A heading of level L closes every open section of level L or deeper and
/// opens a new one tagged with `data-heading-id`. Other nodes join the
/// innermost open section; nodes before the first heading stay at the root.
/// Only top-level headings open sections, so running the pass again on its
/// own output changes nothing.
pub fn nest_sections(root: &mut Node) {
    let Some(children) = root.children_mut() else {
        return;
    };
    let mut output = Vec::with_capacity(children.len());
    let mut open: Vec<(u8, Element)> = Vec::new();

    for node in std::mem::take(children) {
        let level = node.as_element().and_then(Element::heading_level);
        match level {
            Some(level) => {
                while open.last().is_some_and(|(depth, _)| *depth >= level) {
                    close(&mut open, &mut output);
                }
                open.push((level, section_for(node)));
            }
            None => match open.last_mut() {
                Some((_, section)) => section.children.push(node),
                None => output.push(node),
            },
        }
    }
    while !open.is_empty() {
        close(&mut open, &mut output);
    }
    *children = output;
}

fn section_for(heading: Node) -> Element {
    let mut section = Element::new("section");
    if let Some(id) = heading.as_element().and_then(Element::id) {
        section.properties.set("data-heading-id", id);
    }
    section.with_child(heading)
}

/// Pops the innermost section into its parent, or into the root.
fn close(open: &mut Vec<(u8, Element)>, output: &mut Vec<Node>) {
    let Some((_, section)) = open.pop() else {
        return;
    };
    match open.last_mut() {
        Some((_, parent)) => parent.children.push(section.into()),
        None => output.push(section.into()),
    }
}
