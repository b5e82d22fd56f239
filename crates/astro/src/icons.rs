//! SVG icons used by the copy button, built once and cloned per code block.

use neohome_core::hast::{Element, Node};
use once_cell::sync::Lazy;

/// An icon outline in Font Awesome's `[width, height, path]` form.
struct IconDefinition {
    width: u32,
    height: u32,
    path: &'static str,
}

/// Font Awesome regular `copy`.
const COPY: IconDefinition = IconDefinition {
    width: 448,
    height: 512,
    path: "M384 336H192c-8.8 0-16-7.2-16-16V64c0-8.8 7.2-16 16-16l140.1 0L400 115.9V320c0 8.8-7.2 16-16 16zM192 384H384c35.3 0 64-28.7 64-64V115.9c0-12.7-5.1-24.9-14.1-33.9L366.1 14.1c-9-9-21.2-14.1-33.9-14.1H192c-35.3 0-64 28.7-64 64V320c0 35.3 28.7 64 64 64zM64 128c-35.3 0-64 28.7-64 64V448c0 35.3 28.7 64 64 64H256c35.3 0 64-28.7 64-64V416H272v32c0 8.8-7.2 16-16 16H64c-8.8 0-16-7.2-16-16V192c0-8.8 7.2-16 16-16H96V128H64z",
};

/// Font Awesome solid `check`.
const CHECK: IconDefinition = IconDefinition {
    width: 448,
    height: 512,
    path: "M438.6 105.4c12.5 12.5 12.5 32.8 0 45.3l-256 256c-12.5 12.5-32.8 12.5-45.3 0l-128-128c-12.5-12.5-12.5-32.8 0-45.3s32.8-12.5 45.3 0L160 338.7 393.4 105.4c12.5-12.5 32.8-12.5 45.3 0z",
};

fn icon_node(icon: &IconDefinition, class: &str) -> Node {
    Element::new("svg")
        .with_property("xmlns", "http://www.w3.org/2000/svg")
        .with_property("viewBox", format!("0 0 {} {}", icon.width, icon.height))
        .with_property("aria-hidden", "true")
        .with_property("focusable", "false")
        .with_property("role", "img")
        .with_classes(&[class])
        .with_child(
            Element::new("path")
                .with_property("fill", "currentColor")
                .with_property("d", icon.path),
        )
        .into()
}

/// Shown while the button is idle.
pub static COPY_ICON: Lazy<Node> = Lazy::new(|| icon_node(&COPY, "copy-icon-idle"));

/// Shown after the code was copied; the site's CSS swaps the two.
pub static COPIED_ICON: Lazy<Node> = Lazy::new(|| icon_node(&CHECK, "copy-icon-done"));
