use markdown::mdast::Node as MdNode;
use neohome_core::{IncludeContext, PipelineError, SourceLocation, append_include, read_include};

/// Appends the file named by each code block's `file` meta to its value.
///
/// Returns the number of blocks that received an include.
pub fn include_files(
    tree: &mut MdNode,
    context: IncludeContext<'_>,
) -> Result<usize, PipelineError> {
    let mut included = 0;
    walk(tree, context, &mut included)?;
    Ok(included)
}

fn walk(
    node: &mut MdNode,
    context: IncludeContext<'_>,
    included: &mut usize,
) -> Result<(), PipelineError> {
    if let MdNode::Code(code) = node {
        let Some(meta) = code.meta.as_deref() else {
            return Ok(());
        };
        let location = SourceLocation::of_position(code.position.as_ref())
            .map(|location| with_document(location, context));
        if let Some(text) = read_include(meta, context, location)? {
            append_include(&mut code.value, &text);
            *included += 1;
        }
        return Ok(());
    }
    if let Some(children) = node.children_mut() {
        for child in children {
            walk(child, context, included)?;
        }
    }
    Ok(())
}

fn with_document(location: SourceLocation, context: IncludeContext<'_>) -> SourceLocation {
    SourceLocation::with_file(
        context.document.display().to_string(),
        location.line,
        location.column,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use neohome_core::{ParseOptions, parse_mdast};
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn first_code(tree: &MdNode) -> &markdown::mdast::Code {
        tree.children()
            .unwrap()
            .iter()
            .find_map(|node| match node {
                MdNode::Code(code) => Some(code),
                _ => None,
            })
            .unwrap()
    }

    #[test]
    fn appends_file_after_existing_text() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("b")).unwrap();
        fs::write(dir.path().join("c.rs"), "fn c() {}\n\n").unwrap();
        let document = dir.path().join("b/doc.md");

        let source = "```rust file=\"../c.rs\"\n// header\n```\n";
        let mut tree = parse_mdast(source, &document, &ParseOptions::default()).unwrap();
        let context = IncludeContext {
            document: &document,
            root: None,
        };
        assert_eq!(include_files(&mut tree, context).unwrap(), 1);
        assert_eq!(first_code(&tree).value, "// header\nfn c() {}");
    }

    #[test]
    fn empty_block_takes_the_whole_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("snippet.py"), "print(1)\n").unwrap();
        let document = dir.path().join("doc.md");

        let source = "```py file: snippet.py\n```\n";
        let mut tree = parse_mdast(source, &document, &ParseOptions::default()).unwrap();
        let context = IncludeContext {
            document: &document,
            root: None,
        };
        include_files(&mut tree, context).unwrap();
        assert_eq!(first_code(&tree).value, "print(1)");
    }

    #[test]
    fn blocks_without_file_are_untouched() {
        let document = Path::new("/nonexistent-neohome/doc.md");
        let source = "```rust title=\"x\"\nfn main() {}\n```\n\n```\nplain\n```\n";
        let mut tree = parse_mdast(source, document, &ParseOptions::default()).unwrap();
        let context = IncludeContext {
            document,
            root: None,
        };
        assert_eq!(include_files(&mut tree, context).unwrap(), 0);
        assert_eq!(first_code(&tree).value, "fn main() {}");
    }

    #[test]
    fn missing_file_reports_location() {
        let document = Path::new("/nonexistent-neohome/b/doc.md");
        let source = "Intro\n\n```rust file: \"../c.rs\"\n```\n";
        let mut tree = parse_mdast(source, document, &ParseOptions::default()).unwrap();
        let context = IncludeContext {
            document,
            root: None,
        };
        match include_files(&mut tree, context) {
            Err(PipelineError::MissingInclude { path, location, .. }) => {
                assert_eq!(path, Path::new("/nonexistent-neohome/c.rs"));
                assert_eq!(location.map(|location| location.line), Some(3));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn nested_blocks_are_visited() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("x.sh"), "echo hi").unwrap();
        let document = dir.path().join("doc.md");

        let source = "> ```sh file=x.sh\n> ```\n";
        let mut tree = parse_mdast(source, &document, &ParseOptions::default()).unwrap();
        let context = IncludeContext {
            document: &document,
            root: None,
        };
        assert_eq!(include_files(&mut tree, context).unwrap(), 1);
    }
}
