use std::convert::Infallible;

use neohome_core::hast::{Element, Node, visit_elements_mut};

/// Wraps the content of every `h1`..`h5` that has an `id` in a self link.
///
/// `<h2 id="x">Text</h2>` becomes `<h2 id="x"><a href="#x">Text</a></h2>`.
/// Headings without an id are left alone, so ids must be assigned first.
/// Returns the number of headings wrapped.
pub fn inject_heading_anchors(root: &mut Node) -> usize {
    let Some(children) = root.children_mut() else {
        return 0;
    };
    let mut wrapped = 0;
    visit_elements_mut(children, &mut |element| {
        if !matches!(element.heading_level(), Some(1..=5)) {
            return Ok::<_, Infallible>(());
        }
        let Some(id) = element.id().map(str::to_string) else {
            return Ok(());
        };
        let mut link = Element::new("a").with_property("href", format!("#{id}"));
        link.children = std::mem::take(&mut element.children);
        element.children.push(link.into());
        wrapped += 1;
        Ok(())
    })
    .unwrap_or_else(|never| match never {});
    wrapped
}
