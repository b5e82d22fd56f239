use std::fs;
use std::path::Path;
use std::sync::Arc;

use neohome_astro::{Highlight, HtmlPass, MarkdownPass, Options, Pipeline, transform_document};
use neohome_core::hast::{Element, Node, visit_elements};
use neohome_core::{HighlightError, PipelineError, Warning};
use tempfile::TempDir;

const FRONTMATTER: &str =
    "---\ntitle: Building a blog\npubDate: 2024-02-10\nsummary: Notes\n---\n\n";

fn post(body: &str) -> String {
    format!("{FRONTMATTER}{body}")
}

fn tree_sitter(source: &str, language: &str) -> Result<Highlight, HighlightError> {
    if language != "rust" {
        return Ok(Highlight::Unsupported);
    }
    let spans = source
        .split_whitespace()
        .map(|word| format!("<span class=\"ts-word\">{word}</span>"))
        .collect::<Vec<_>>()
        .join(" ");
    Ok(Highlight::Markup(format!("<code class=\"tree-sitter-code\">{spans}</code>")))
}

fn elements<'a>(root: &'a Node, tag: &str) -> Vec<&'a Element> {
    let mut found = Vec::new();
    visit_elements(root.children(), &mut |element| {
        if element.tag_name == tag {
            found.push(element);
        }
    });
    found
}

/// `h1 p section#id[...]`: elements by tag, sections with their heading id.
fn outline(nodes: &[Node]) -> String {
    nodes
        .iter()
        .filter_map(Node::as_element)
        .map(|element| match element.tag_name.as_str() {
            "section" => format!(
                "section#{}[{}]",
                element.property_str("data-heading-id").unwrap_or(""),
                outline(&element.children)
            ),
            "div" if element.has_class("code-block") => "code-block".to_string(),
            tag => tag.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[test]
fn full_pipeline_outline() {
    let source = post(
        "Lead paragraph.\n\n## Install\n\n```rust\nfn main() {}\n```\n\n\
         ### From source\n\nBuild it.\n\n## Usage\n\nRun it.\n",
    );
    let output = Pipeline::default()
        .with_highlighter(Arc::new(tree_sitter))
        .transform(&source, Path::new("/site/posts/blog.md"))
        .unwrap();

    insta::assert_snapshot!(
        outline(output.tree.children()),
        @"h1 p section#install[h2 code-block section#from-source[h3 p]] section#usage[h2 p]"
    );

    let slugs: Vec<_> = output.headings.iter().map(|heading| heading.slug.as_str()).collect();
    assert_eq!(slugs, vec!["install", "from-source", "usage"]);
    assert!(!output.diagnostics.has_warnings());
}

#[test]
fn anchors_wrap_heading_content() {
    let output = transform_document(
        &post("## Hello *world*\n"),
        Path::new("post.md"),
        Options::default(),
    )
    .unwrap();
    let heading = elements(&output.tree, "h2")[0];
    assert_eq!(heading.id(), Some("hello-world"));
    assert_eq!(heading.children.len(), 1);
    let link = heading.children[0].as_element().unwrap();
    assert_eq!(link.tag_name, "a");
    assert_eq!(link.property_str("href"), Some("#hello-world"));
    assert_eq!(link.text_content(), "Hello world");
}

#[test]
fn every_pre_gets_exactly_one_copy_button() {
    let output = transform_document(
        &post("```\nplain text\n```\n\n> ```sh\n> echo hi\n> ```\n"),
        Path::new("post.md"),
        Options::default(),
    )
    .unwrap();
    let containers = elements(&output.tree, "div");
    assert_eq!(containers.len(), 2);
    for container in containers {
        assert!(container.has_class("code-block"));
        let pres: Vec<_> = container
            .children
            .iter()
            .filter_map(Node::as_element)
            .filter(|el| el.tag_name == "pre")
            .collect();
        let buttons: Vec<_> = container
            .children
            .iter()
            .filter_map(Node::as_element)
            .filter(|el| el.has_class("code-copy"))
            .collect();
        assert_eq!(pres.len(), 1);
        assert_eq!(buttons.len(), 1);
    }
    let texts: Vec<_> = elements(&output.tree, "pre")
        .into_iter()
        .map(Element::text_content)
        .collect();
    assert_eq!(texts, vec!["plain text\n".to_string(), "echo hi\n".to_string()]);
}

#[test]
fn sectioning_twice_changes_nothing() {
    let pipeline = Pipeline::with_passes(
        Vec::new(),
        vec![HtmlPass::HeadingIds, HtmlPass::Sections, HtmlPass::Sections],
        Options::default(),
    )
    .unwrap();
    let once = Pipeline::with_passes(
        Vec::new(),
        vec![HtmlPass::HeadingIds, HtmlPass::Sections],
        Options::default(),
    )
    .unwrap();
    let body = "Intro\n\n## A\n\nx\n\n### A.1\n\ny\n\n## B\n\nz\n";
    let twice = pipeline.transform(body, Path::new("post.md")).unwrap();
    let single = once.transform(body, Path::new("post.md")).unwrap();
    assert_eq!(twice.tree, single.tree);
}

#[test]
fn include_resolves_relative_to_document() {
    let dir = TempDir::new().unwrap();
    let posts = dir.path().join("a/b");
    fs::create_dir_all(&posts).unwrap();
    fs::write(dir.path().join("a/c.rs"), "fn included() {}\n").unwrap();
    let document = posts.join("doc.md");

    let output = transform_document(
        &post("```rust file: \"../c.rs\"\n```\n"),
        &document,
        Options::default(),
    )
    .unwrap();
    let code = elements(&output.tree, "code")[0];
    assert_eq!(code.text_content(), "fn included() {}\n");
}

#[test]
fn missing_include_names_path_and_meta() {
    let err = transform_document(
        &post("```rust file: \"../c.rs\"\n```\n"),
        Path::new("/a/b/doc.md"),
        Options::default(),
    )
    .unwrap_err();
    match &err {
        PipelineError::MissingInclude { path, meta, .. } => {
            assert_eq!(path, Path::new("/a/c.rs"));
            assert_eq!(meta, "file: \"../c.rs\"");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    let message = err.to_string();
    assert!(message.contains("/a/c.rs"), "{message}");
    assert!(message.contains("file: \"../c.rs\""), "{message}");
}

#[test]
fn include_root_confines_paths() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("secret.txt"), "nope").unwrap();
    let content = dir.path().join("content");
    fs::create_dir_all(&content).unwrap();
    let options = Options {
        include_root: Some(content.clone()),
        ..Options::default()
    };
    let err = transform_document(
        &post("```txt file=../secret.txt\n```\n"),
        &content.join("doc.md"),
        options,
    )
    .unwrap_err();
    assert!(matches!(err, PipelineError::IncludeOutsideRoot { .. }));
}

#[test]
fn unsupported_language_is_left_as_text() {
    let output = Pipeline::default()
        .with_highlighter(Arc::new(tree_sitter))
        .transform(&post("```unknownlang\nsome code\n```\n"), Path::new("post.md"))
        .unwrap();
    let code = elements(&output.tree, "code")[0];
    assert!(code.has_class("language-unknownlang"));
    assert_eq!(code.children, vec![Node::text("some code\n")]);
    assert_eq!(
        output.diagnostics.warnings,
        vec![Warning::UnsupportedLanguage {
            language: "unknownlang".into()
        }]
    );
}

#[test]
fn highlighted_markup_replaces_code_text() {
    let output = Pipeline::default()
        .with_highlighter(Arc::new(tree_sitter))
        .transform(&post("```rust\nlet x\n```\n"), Path::new("post.md"))
        .unwrap();
    let spans = elements(&output.tree, "span");
    assert_eq!(spans.len(), 2);
    assert!(spans.iter().all(|span| span.has_class("ts-word")));
}

#[test]
fn body_level_one_heading_is_reported() {
    let output = transform_document(
        &post("# Duplicate title\n\nBody\n"),
        Path::new("post.md"),
        Options::default(),
    )
    .unwrap();
    assert_eq!(output.diagnostics.count(), 1);
    assert_eq!(
        output.diagnostics.warnings[0].to_string(),
        "Level 1 heading: Duplicate title @ post.md:7:1"
    );
    let titles: Vec<_> = elements(&output.tree, "h1")
        .into_iter()
        .map(Element::text_content)
        .collect();
    assert_eq!(titles[0], "Building a blog");
}

#[test]
fn markdown_passes_can_be_disabled() {
    let pipeline = Pipeline::with_passes(
        vec![MarkdownPass::WarnLevelOneHeadings],
        HtmlPass::ALL.to_vec(),
        Options::default(),
    )
    .unwrap();
    let output = pipeline.transform(&post("Body\n"), Path::new("post.md")).unwrap();
    assert!(output.frontmatter.unwrap().estimation.is_none());
}

#[test]
fn tree_serializes_to_hast_json() {
    let output =
        transform_document(&post("Hi\n"), Path::new("post.md"), Options::default()).unwrap();
    let json = serde_json::to_value(&output.tree).unwrap();
    assert_eq!(json["type"], "root");
    assert_eq!(json["children"][0]["tagName"], "h1");
    assert_eq!(json["children"][0]["children"][0]["value"], "Building a blog");
}

#[test]
fn heading_ids_stay_unique_across_suffix_collisions() {
    let output = transform_document(
        &post("## A\n\n## A\n\n## A-1\n"),
        Path::new("post.md"),
        Options::default(),
    )
    .unwrap();
    let slugs: Vec<_> = output.headings.iter().map(|heading| heading.slug.as_str()).collect();
    assert_eq!(slugs, vec!["a", "a-1", "a-1-1"]);
    insta::assert_snapshot!(
        outline(output.tree.children()),
        @"h1 section#a[h2] section#a-1[h2] section#a-1-1[h2]"
    );
}

#[test]
fn unrelated_fence_meta_does_not_fail_the_post() {
    let output = transform_document(
        &post(
            "```rust showLineNumbers {1-3}\nfn main() {}\n```\n\n\
             ```js /x/ \"title\"\nlet x;\n```\n",
        ),
        Path::new("/a/b/doc.md"),
        Options::default(),
    )
    .unwrap();
    let texts: Vec<_> = elements(&output.tree, "code")
        .into_iter()
        .map(Element::text_content)
        .collect();
    assert_eq!(texts, vec!["fn main() {}\n".to_string(), "let x;\n".to_string()]);
}

#[test]
fn inline_html_keeps_its_content() {
    let output = transform_document(
        &post("Press <kbd>Ctrl</kbd> now\n"),
        Path::new("post.md"),
        Options::default(),
    )
    .unwrap();
    let keys = elements(&output.tree, "kbd");
    assert_eq!(keys.len(), 1);
    assert_eq!(keys[0].text_content(), "Ctrl");
    let paragraph = elements(&output.tree, "p")[0];
    assert_eq!(paragraph.text_content(), "Press Ctrl now");
}
