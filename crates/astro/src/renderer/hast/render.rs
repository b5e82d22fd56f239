//! Conversion functions for individual mdast nodes.

use super::context::{Context, Scope};
use crate::renderer::fragment::parse_fragment;
use markdown::mdast::{self, AlignKind, Node as MdNode};
use neohome_core::hast::{Element, Node};

/// Placeholder element standing in for markdown nodes inside inline HTML.
const SLOT_TAG: &str = "neohome-slot";

/// Converts a sibling list.
pub fn render_children(nodes: &[MdNode], ctx: &mut Context) -> Vec<Node> {
    if ctx.raw_html_allowed() && is_mixed_phrasing(nodes) {
        if let Some(merged) = render_inline_html(nodes, ctx) {
            return merged;
        }
    }
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        render_node(node, ctx, &mut out);
    }
    out
}

/// Converts a node, appending the result to `out`.
///
/// Some nodes expand to several siblings (tight-list paragraphs, raw HTML
/// fragments) and some produce nothing (definitions, frontmatter).
pub fn render_node(node: &MdNode, ctx: &mut Context, out: &mut Vec<Node>) {
    match node {
        MdNode::Root(root) => out.extend(render_children(&root.children, ctx)),
        MdNode::Text(text) => out.push(Node::text(&text.value)),
        MdNode::Paragraph(para) => {
            let children = render_children(&para.children, ctx);
            if ctx.is_in_tight_list() {
                out.extend(children);
            } else {
                out.push(element("p", children));
            }
        }
        MdNode::Heading(heading) => {
            let tag = format!("h{}", heading.depth.clamp(1, 6));
            out.push(element(&tag, render_children(&heading.children, ctx)));
        }
        MdNode::Emphasis(em) => out.push(element("em", render_children(&em.children, ctx))),
        MdNode::Strong(strong) => {
            out.push(element("strong", render_children(&strong.children, ctx)))
        }
        MdNode::Delete(del) => out.push(element("del", render_children(&del.children, ctx))),
        MdNode::InlineCode(code) => out.push(element("code", vec![Node::text(&code.value)])),
        MdNode::Break(_) => {
            out.push(Element::new("br").into());
            out.push(Node::text("\n"));
        }
        MdNode::ThematicBreak(_) => out.push(Element::new("hr").into()),
        MdNode::Link(link) => out.push(render_link(
            &link.url,
            link.title.as_deref(),
            render_children(&link.children, ctx),
        )),
        MdNode::LinkReference(reference) => {
            let children = render_children(&reference.children, ctx);
            match ctx.definition(&reference.identifier).cloned() {
                Some(def) => out.push(render_link(&def.url, def.title.as_deref(), children)),
                None => out.extend(children),
            }
        }
        MdNode::Image(img) => {
            out.push(render_image(&img.url, &img.alt, img.title.as_deref(), ctx))
        }
        MdNode::ImageReference(reference) => match ctx.definition(&reference.identifier).cloned() {
            Some(def) => {
                let title = def.title.as_deref();
                out.push(render_image(&def.url, &reference.alt, title, ctx))
            }
            None => out.push(Node::text(&reference.alt)),
        },
        MdNode::Code(code) => out.push(render_code(code)),
        MdNode::Blockquote(quote) => {
            out.push(element("blockquote", render_children(&quote.children, ctx)))
        }
        MdNode::List(list) => out.push(render_list(list, ctx)),
        MdNode::ListItem(item) => out.push(render_list_item(item, ctx)),
        MdNode::Table(table) => out.push(render_table(table, ctx)),
        MdNode::Html(html) => render_html(&html.value, ctx, out),
        MdNode::FootnoteReference(reference) => {
            out.push(render_footnote_reference(&reference.identifier, ctx))
        }
        MdNode::Definition(_)
        | MdNode::FootnoteDefinition(_)
        | MdNode::Yaml(_)
        | MdNode::Toml(_) => {}
        _ => {
            log::warn!("Unhandled markdown node type: {:?}", node);
        }
    }
}

fn element(tag: &str, children: Vec<Node>) -> Node {
    let mut el = Element::new(tag);
    el.children = children;
    el.into()
}

fn render_link(url: &str, title: Option<&str>, children: Vec<Node>) -> Node {
    let mut link = Element::new("a").with_property("href", url);
    if let Some(title) = title {
        link.properties.set("title", title);
    }
    link.children = children;
    link.into()
}

fn render_image(url: &str, alt: &str, title: Option<&str>, ctx: &Context) -> Node {
    let mut img = Element::new("img")
        .with_property("src", url)
        .with_property("alt", alt);
    if let Some(title) = title {
        img.properties.set("title", title);
    }
    if ctx.lazy_images_enabled() {
        img.properties.set("loading", "lazy");
    }
    img.into()
}

/// Renders a fenced code block as `pre > code`, tagging the language class.
fn render_code(code: &mdast::Code) -> Node {
    let mut inner = Element::new("code");
    if let Some(lang) = code.lang.as_deref().filter(|lang| !lang.is_empty()) {
        inner.properties.set("class", vec![format!("language-{}", lang)]);
    }
    let mut value = code.value.clone();
    if !value.is_empty() {
        value.push('\n');
    }
    inner.children.push(Node::text(value));
    Element::new("pre").with_child(inner).into()
}

fn render_list(list: &mdast::List, ctx: &mut Context) -> Node {
    let tag = if list.ordered { "ol" } else { "ul" };
    let mut el = Element::new(tag);
    if let Some(start) = list.start.filter(|start| list.ordered && *start != 1) {
        el.properties.set("start", start.to_string());
    }
    let is_task_list = list
        .children
        .iter()
        .any(|child| matches!(child, MdNode::ListItem(item) if item.checked.is_some()));
    if is_task_list {
        el.properties.set("class", vec!["contains-task-list".to_string()]);
    }

    ctx.enter(Scope::List {
        spread: list.spread,
    });
    el.children = render_children(&list.children, ctx);
    ctx.exit();
    el.into()
}

/// Renders a list item; GFM task items get a disabled checkbox.
fn render_list_item(item: &mdast::ListItem, ctx: &mut Context) -> Node {
    let mut li = Element::new("li");
    if let Some(checked) = item.checked {
        li.properties.set("class", vec!["task-list-item".to_string()]);
        let mut input = Element::new("input")
            .with_property("type", "checkbox")
            .with_property("disabled", true);
        if checked {
            input.properties.set("checked", true);
        }
        li.children.push(input.into());
        li.children.push(Node::text(" "));
    }
    li.children.extend(render_children(&item.children, ctx));
    li.into()
}

fn render_table(table: &mdast::Table, ctx: &mut Context) -> Node {
    let mut el = Element::new("table");
    let mut rows = table.children.iter();

    if let Some(MdNode::TableRow(head)) = rows.next() {
        ctx.enter(Scope::TableHead);
        let row = render_table_row(head, &table.align, ctx);
        ctx.exit();
        el.children.push(Element::new("thead").with_child(row).into());
    }

    let mut body = Element::new("tbody");
    ctx.enter(Scope::TableBody);
    for row in rows {
        if let MdNode::TableRow(row) = row {
            body.children.push(render_table_row(row, &table.align, ctx));
        }
    }
    ctx.exit();
    if !body.children.is_empty() {
        el.children.push(body.into());
    }
    el.into()
}

fn render_table_row(row: &mdast::TableRow, aligns: &[AlignKind], ctx: &mut Context) -> Node {
    let tag = if ctx.current_scope() == Scope::TableHead {
        "th"
    } else {
        "td"
    };
    let mut tr = Element::new("tr");
    for (index, cell) in row.children.iter().enumerate() {
        let MdNode::TableCell(cell) = cell else {
            continue;
        };
        let mut el = Element::new(tag);
        match aligns.get(index) {
            Some(AlignKind::Left) => el.properties.set("align", "left"),
            Some(AlignKind::Right) => el.properties.set("align", "right"),
            Some(AlignKind::Center) => el.properties.set("align", "center"),
            _ => {}
        }
        el.children = render_children(&cell.children, ctx);
        tr.children.push(el.into());
    }
    tr.into()
}

fn is_phrasing(node: &MdNode) -> bool {
    matches!(
        node,
        MdNode::Text(_)
            | MdNode::Emphasis(_)
            | MdNode::Strong(_)
            | MdNode::Delete(_)
            | MdNode::InlineCode(_)
            | MdNode::Break(_)
            | MdNode::Link(_)
            | MdNode::LinkReference(_)
            | MdNode::Image(_)
            | MdNode::ImageReference(_)
            | MdNode::FootnoteReference(_)
            | MdNode::Html(_)
    )
}

/// Inline content where markdown-rs split raw HTML into separate tag nodes.
fn is_mixed_phrasing(nodes: &[MdNode]) -> bool {
    nodes.len() > 1
        && nodes.iter().any(|node| matches!(node, MdNode::Html(_)))
        && nodes.iter().all(is_phrasing)
}

/// Parses a run of inline HTML pieces as one fragment.
///
/// Markdown siblings are rendered first and stand in as slot elements, so an
/// opening tag, the text after it and the closing tag end up nested. Returns
/// `None` when the joined markup does not parse.
fn render_inline_html(nodes: &[MdNode], ctx: &mut Context) -> Option<Vec<Node>> {
    let mut html = String::new();
    let mut slots = Vec::new();
    for node in nodes {
        match node {
            MdNode::Html(raw) => html.push_str(&raw.value),
            other => {
                let mut rendered = Vec::new();
                render_node(other, ctx, &mut rendered);
                html.push_str(&format!(
                    "<{SLOT_TAG} data-slot=\"{}\"></{SLOT_TAG}>",
                    slots.len()
                ));
                slots.push(Some(rendered));
            }
        }
    }
    let parsed = parse_fragment(&html)?;
    Some(fill_slots(parsed, &mut slots))
}

fn fill_slots(nodes: Vec<Node>, slots: &mut [Option<Vec<Node>>]) -> Vec<Node> {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            Node::Element(element) if element.tag_name == SLOT_TAG => {
                let rendered = element
                    .property_str("data-slot")
                    .and_then(|index| index.parse::<usize>().ok())
                    .and_then(|index| slots.get_mut(index))
                    .and_then(Option::take);
                out.extend(rendered.unwrap_or_default());
            }
            Node::Element(mut element) => {
                element.children = fill_slots(std::mem::take(&mut element.children), slots);
                out.push(element.into());
            }
            other => out.push(other),
        }
    }
    out
}

/// Raw HTML: parsed into elements when allowed, otherwise kept as text.
fn render_html(html: &str, ctx: &Context, out: &mut Vec<Node>) {
    if !ctx.raw_html_allowed() {
        log::debug!("Raw HTML in markdown kept as text: {}", html);
        out.push(Node::text(html));
        return;
    }
    match parse_fragment(html) {
        Some(nodes) => out.extend(nodes),
        None => {
            log::warn!("Could not parse raw HTML, keeping it as text: {}", html);
            out.push(Node::text(html));
        }
    }
}

fn footnote_id(identifier: &str) -> String {
    identifier
        .chars()
        .map(|ch| if ch.is_whitespace() { '-' } else { ch })
        .collect()
}

/// Renders `<sup><a href="#user-content-fn-id">n</a></sup>`.
fn render_footnote_reference(identifier: &str, ctx: &mut Context) -> Node {
    let (ordinal, occurrence) = ctx.reference_footnote(identifier);
    let id = footnote_id(&identifier.to_lowercase());
    let ref_id = if occurrence == 1 {
        format!("user-content-fnref-{}", id)
    } else {
        format!("user-content-fnref-{}-{}", id, occurrence)
    };
    let link = Element::new("a")
        .with_property("href", format!("#user-content-fn-{}", id))
        .with_property("id", ref_id)
        .with_property("data-footnote-ref", true)
        .with_property("aria-describedby", "footnote-label")
        .with_child(Node::text(ordinal.to_string()));
    Element::new("sup").with_child(link).into()
}

/// Renders the GFM footnote section, if any footnote was referenced.
pub fn render_footnote_section(ctx: &mut Context) -> Option<Node> {
    let footnotes = ctx.take_footnotes();
    if footnotes.is_empty() {
        return None;
    }

    let mut list = Element::new("ol");
    for (identifier, refs, children) in footnotes {
        let id = footnote_id(&identifier);
        let mut content = render_children(&children, ctx);
        let backrefs: Vec<Node> = (1..=refs)
            .map(|occurrence| {
                let href = if occurrence == 1 {
                    format!("#user-content-fnref-{}", id)
                } else {
                    format!("#user-content-fnref-{}-{}", id, occurrence)
                };
                Element::new("a")
                    .with_property("href", href)
                    .with_property("data-footnote-backref", true)
                    .with_property("aria-label", "Back to reference")
                    .with_classes(&["data-footnote-backref"])
                    .with_child(Node::text("↩"))
                    .into()
            })
            .collect();

        match content.last_mut().and_then(Node::as_element_mut) {
            Some(last) if last.tag_name == "p" => {
                for backref in backrefs {
                    last.children.push(Node::text(" "));
                    last.children.push(backref);
                }
            }
            _ => content.extend(backrefs),
        }

        let mut li = Element::new("li").with_property("id", format!("user-content-fn-{}", id));
        li.children = content;
        list.children.push(li.into());
    }

    let label = Element::new("h2")
        .with_property("id", "footnote-label")
        .with_classes(&["sr-only"])
        .with_child(Node::text("Footnotes"));
    Some(
        Element::new("section")
            .with_property("data-footnotes", true)
            .with_classes(&["footnotes"])
            .with_child(label)
            .with_child(list)
            .into(),
    )
}

#[cfg(test)]
mod tests {
    use crate::renderer::hast::{Options, to_hast};
    use neohome_core::hast::Node;
    use neohome_core::{ParseOptions, parse_mdast};
    use std::path::Path;

    fn convert(input: &str) -> Node {
        let mdast = parse_mdast(input, Path::new("post.md"), &ParseOptions::default()).unwrap();
        to_hast(&mdast, &Options::default())
    }

    fn first(root: &Node) -> &neohome_core::hast::Element {
        root.children()[0].as_element().unwrap()
    }

    #[test]
    fn code_block_carries_language_class() {
        let root = convert("```rust\nfn main() {}\n```\n");
        let pre = first(&root);
        assert_eq!(pre.tag_name, "pre");
        let code = pre.children[0].as_element().unwrap();
        assert_eq!(code.tag_name, "code");
        assert!(code.has_class("language-rust"));
        assert_eq!(code.text_content(), "fn main() {}\n");
    }

    #[test]
    fn code_block_without_language_has_no_class() {
        let root = convert("```\nplain\n```\n");
        let code = first(&root).children[0].as_element().unwrap();
        assert!(code.classes().is_empty());
    }

    #[test]
    fn headings_have_no_ids_yet() {
        let root = convert("## Install *now*");
        let heading = first(&root);
        assert_eq!(heading.tag_name, "h2");
        assert_eq!(heading.id(), None);
        assert_eq!(heading.text_content(), "Install now");
    }

    #[test]
    fn frontmatter_is_not_rendered() {
        let root = convert("---\ntitle: x\n---\n\nBody\n");
        assert_eq!(root.children().len(), 1);
        assert_eq!(first(&root).tag_name, "p");
    }

    #[test]
    fn tight_list_unwraps_paragraphs() {
        let root = convert("- one\n- two\n");
        let list = first(&root);
        assert_eq!(list.tag_name, "ul");
        let item = list.children[0].as_element().unwrap();
        assert!(matches!(item.children[0], Node::Text(_)));
    }

    #[test]
    fn task_items_get_checkboxes() {
        let root = convert("- [x] done\n- [ ] todo\n");
        let list = first(&root);
        assert!(list.has_class("contains-task-list"));
        let done = list.children[0].as_element().unwrap();
        let input = done.children[0].as_element().unwrap();
        assert_eq!(input.tag_name, "input");
        assert!(input.properties.get("checked").is_some());
    }

    #[test]
    fn footnotes_collect_at_the_end() {
        let root = convert("Text[^a].\n\n[^a]: Note.\n");
        let section = root.children().last().unwrap().as_element().unwrap();
        assert_eq!(section.tag_name, "section");
        assert!(section.has_class("footnotes"));
        assert!(section.text_content().contains("Note."));
    }

    #[test]
    fn raw_html_becomes_elements() {
        let root = convert("<div class=\"note\">hi</div>\n");
        let div = first(&root);
        assert_eq!(div.tag_name, "div");
        assert!(div.has_class("note"));
    }

    #[test]
    fn inline_html_wraps_the_text_between_its_tags() {
        let root = convert("Press <kbd>Ctrl</kbd> and <em>*C*</em> now\n");
        let para = first(&root);
        assert_eq!(para.tag_name, "p");
        let tags: Vec<_> = para
            .children
            .iter()
            .filter_map(Node::as_element)
            .map(|el| el.tag_name.as_str())
            .collect();
        assert_eq!(tags, vec!["kbd", "em"]);
        let kbd = para.children[1].as_element().unwrap();
        assert_eq!(kbd.text_content(), "Ctrl");
        let em = para.children[3].as_element().unwrap();
        assert_eq!(em.children[0].as_element().unwrap().tag_name, "em");
        assert_eq!(para.text_content(), "Press Ctrl and C now");
    }

    #[test]
    fn inline_html_stays_text_when_raw_html_is_off() {
        let mdast = parse_mdast("a <b>x</b>\n", Path::new("post.md"), &ParseOptions::default())
            .unwrap();
        let options = Options {
            allow_raw_html: false,
            ..Options::default()
        };
        let root = to_hast(&mdast, &options);
        assert_eq!(first(&root).text_content(), "a <b>x</b>");
    }

    #[test]
    fn reference_links_resolve() {
        let root = convert("See [docs][d].\n\n[d]: https://example.com \"Docs\"\n");
        let para = first(&root);
        let link = para.children[1].as_element().unwrap();
        assert_eq!(link.property_str("href"), Some("https://example.com"));
        assert_eq!(link.property_str("title"), Some("Docs"));
    }
}
