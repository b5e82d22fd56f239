use crate::icons::{COPIED_ICON, COPY_ICON};
use neohome_core::hast::{Element, Node};

const CONTAINER_CLASS: &str = "code-block";
const BUTTON_CLASS: &str = "code-copy";

/// Moves every `pre` into a `div.code-block` next to a copy button.
///
/// `pre` blocks already sitting in a `div.code-block` are left alone, so the
/// pass can run more than once. Returns the number of blocks wrapped.
pub fn wrap_code_blocks(root: &mut Node) -> usize {
    match root.children_mut() {
        Some(children) => wrap_in(children, false),
        None => 0,
    }
}

fn wrap_in(children: &mut [Node], inside_container: bool) -> usize {
    let mut wrapped = 0;
    for child in children.iter_mut() {
        let Node::Element(element) = child else {
            continue;
        };
        if element.tag_name == "pre" {
            if !inside_container {
                let pre = std::mem::replace(element, Element::new("div"));
                *element = container(pre);
                wrapped += 1;
            }
            continue;
        }
        let is_container = element.tag_name == "div" && element.has_class(CONTAINER_CLASS);
        wrapped += wrap_in(&mut element.children, is_container);
    }
    wrapped
}

fn container(pre: Element) -> Element {
    Element::new("div")
        .with_classes(&[CONTAINER_CLASS])
        .with_child(pre)
        .with_child(copy_button())
}

fn copy_button() -> Element {
    Element::new("button")
        .with_property("type", "button")
        .with_property("aria-label", "Copy code")
        .with_classes(&[BUTTON_CLASS])
        .with_child(COPY_ICON.clone())
        .with_child(COPIED_ICON.clone())
}
