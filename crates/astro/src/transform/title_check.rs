use std::path::Path;

use super::mdast_text;
use markdown::mdast::Node as MdNode;
use neohome_core::{Diagnostics, SourceLocation, Warning};

/// Warns about level-1 headings at the top level of the body.
///
/// The page title comes from frontmatter, so a `# Heading` in the body would
/// produce a second `h1`. The document is left unchanged.
pub fn warn_level_one_headings(tree: &MdNode, document: &Path, diagnostics: &mut Diagnostics) {
    let Some(children) = tree.children() else {
        return;
    };
    for child in children {
        let MdNode::Heading(heading) = child else {
            continue;
        };
        if heading.depth != 1 {
            continue;
        }
        let location = heading.position.as_ref().map(|position| {
            SourceLocation::with_file(
                document.display().to_string(),
                position.start.line,
                position.start.column,
            )
        });
        diagnostics.warn(Warning::LevelOneHeading {
            text: mdast_text(child),
            location,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use neohome_core::{ParseOptions, parse_mdast};

    fn check(source: &str) -> Diagnostics {
        let tree = parse_mdast(source, Path::new("post.md"), &ParseOptions::default()).unwrap();
        let mut diagnostics = Diagnostics::new();
        warn_level_one_headings(&tree, Path::new("post.md"), &mut diagnostics);
        diagnostics
    }

    #[test]
    fn reports_each_top_level_h1() {
        let diagnostics = check("# One\n\ntext\n\n## Two\n\n# Three *x*\n");
        let rendered: Vec<String> = diagnostics.warnings.iter().map(ToString::to_string).collect();
        assert_eq!(
            rendered,
            vec![
                "Level 1 heading: One @ post.md:1:1".to_string(),
                "Level 1 heading: Three x @ post.md:7:1".to_string(),
            ]
        );
    }

    #[test]
    fn nested_h1_is_ignored() {
        let diagnostics = check("> # Quoted\n");
        assert!(!diagnostics.has_warnings());
    }
}
