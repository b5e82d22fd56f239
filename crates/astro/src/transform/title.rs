use std::path::Path;

use neohome_core::hast::{Element, Node};
use neohome_core::{Frontmatter, PipelineError};

/// Inserts the frontmatter title as an `h1` at the start of the document.
pub fn inject_title(
    root: &mut Node,
    frontmatter: Option<&Frontmatter>,
    document: &Path,
) -> Result<(), PipelineError> {
    let frontmatter = frontmatter.ok_or_else(|| PipelineError::MissingFrontmatter {
        document: document.to_path_buf(),
    })?;
    let children = root
        .children_mut()
        .ok_or_else(|| PipelineError::InternalError("title target is a text node".into()))?;
    let heading = Element::new("h1").with_child(Node::text(&frontmatter.title));
    children.insert(0, heading.into());
    Ok(())
}
