//! Conversion state for the mdast → hast renderer.

use super::Options;
use markdown::mdast::Node as MdNode;
use std::collections::HashMap;

/// Represents the kind of block currently being converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Document root.
    Root,
    /// Inside a list; `spread` lists keep `<p>` around item paragraphs.
    List {
        /// Whether the list is loose.
        spread: bool,
    },
    /// Inside a table header row.
    TableHead,
    /// Inside a table body row.
    TableBody,
}

/// A link reference definition (`[id]: url "title"`).
#[derive(Debug, Clone)]
pub struct Definition {
    /// Destination URL.
    pub url: String,
    /// Optional title.
    pub title: Option<String>,
}

/// Tracks scopes, link definitions and footnotes while converting.
pub struct Context<'a> {
    options: &'a Options,
    scopes: Vec<Scope>,
    definitions: HashMap<String, Definition>,
    footnote_order: Vec<String>,
    footnote_refs: HashMap<String, usize>,
    footnotes: HashMap<String, Vec<MdNode>>,
}

impl<'a> Context<'a> {
    /// Creates a context and collects definitions from the whole tree.
    pub fn new(options: &'a Options, tree: &MdNode) -> Self {
        let mut ctx = Self {
            options,
            scopes: vec![Scope::Root],
            definitions: HashMap::new(),
            footnote_order: Vec::new(),
            footnote_refs: HashMap::new(),
            footnotes: HashMap::new(),
        };
        ctx.collect_definitions(tree);
        ctx
    }

    fn collect_definitions(&mut self, node: &MdNode) {
        match node {
            MdNode::Definition(def) => {
                self.definitions
                    .entry(def.identifier.to_lowercase())
                    .or_insert_with(|| Definition {
                        url: def.url.clone(),
                        title: def.title.clone(),
                    });
            }
            MdNode::FootnoteDefinition(def) => {
                self.footnotes
                    .entry(def.identifier.to_lowercase())
                    .or_insert_with(|| def.children.clone());
            }
            _ => {
                if let Some(children) = node.children() {
                    for child in children {
                        self.collect_definitions(child);
                    }
                }
            }
        }
    }

    /// Whether raw HTML is parsed into elements instead of escaped as text.
    pub fn raw_html_allowed(&self) -> bool {
        self.options.allow_raw_html
    }

    /// Whether images get `loading="lazy"`.
    pub fn lazy_images_enabled(&self) -> bool {
        self.options.lazy_images
    }

    /// Enters a scope.
    pub fn enter(&mut self, scope: Scope) {
        self.scopes.push(scope);
    }

    /// Leaves the innermost scope.
    pub fn exit(&mut self) -> Option<Scope> {
        if self.scopes.len() > 1 {
            self.scopes.pop()
        } else {
            None
        }
    }

    /// Returns the innermost scope.
    pub fn current_scope(&self) -> Scope {
        self.scopes.last().copied().unwrap_or(Scope::Root)
    }

    /// Whether paragraphs are unwrapped because the enclosing list is tight.
    pub fn is_in_tight_list(&self) -> bool {
        matches!(self.current_scope(), Scope::List { spread: false })
    }

    /// Looks up a link reference definition.
    pub fn definition(&self, identifier: &str) -> Option<&Definition> {
        self.definitions.get(&identifier.to_lowercase())
    }

    /// Registers a footnote reference and returns `(ordinal, occurrence)`.
    ///
    /// Ordinals follow the order of first reference; occurrences count
    /// repeated references to the same footnote starting at 1.
    pub fn reference_footnote(&mut self, identifier: &str) -> (usize, usize) {
        let key = identifier.to_lowercase();
        let ordinal = match self.footnote_order.iter().position(|id| *id == key) {
            Some(index) => index + 1,
            None => {
                self.footnote_order.push(key.clone());
                self.footnote_order.len()
            }
        };
        let occurrence = self.footnote_refs.entry(key).or_insert(0);
        *occurrence += 1;
        (ordinal, *occurrence)
    }

    /// Footnotes in reference order with their reference counts.
    pub fn take_footnotes(&mut self) -> Vec<(String, usize, Vec<MdNode>)> {
        let order = std::mem::take(&mut self.footnote_order);
        order
            .into_iter()
            .filter_map(|id| {
                let children = self.footnotes.remove(&id)?;
                let refs = self.footnote_refs.get(&id).copied().unwrap_or(1);
                Some((id, refs, children))
            })
            .collect()
    }
}
