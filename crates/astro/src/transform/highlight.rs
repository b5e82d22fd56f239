use std::path::Path;

use crate::highlight::{CallError, Highlight, HighlightAdapter};
use crate::renderer::fragment::parse_fragment;
use neohome_core::hast::{Element, Node, visit_elements_mut};
use neohome_core::{Diagnostics, HighlightError, PipelineError, Warning};

const LANGUAGE_PREFIX: &str = "language-";

/// Language tag of a `code` element, from its `language-*` class.
pub fn code_language(code: &Element) -> Option<&str> {
    code.classes()
        .into_iter()
        .find_map(|class| class.strip_prefix(LANGUAGE_PREFIX))
        .filter(|language| !language.is_empty())
}

/// Replaces the text of every tagged `pre > code` block with highlighter markup.
///
/// Blocks without a language are skipped. A language the highlighter does
/// not know leaves the block as is and records a warning. Highlighter errors
/// and timeouts abort the document. Returns the number of blocks highlighted.
pub fn highlight_code_blocks(
    root: &mut Node,
    adapter: &HighlightAdapter,
    document: &Path,
    diagnostics: &mut Diagnostics,
) -> Result<usize, PipelineError> {
    let Some(children) = root.children_mut() else {
        return Ok(0);
    };
    let mut highlighted = 0;
    visit_elements_mut(children, &mut |element| {
        if element.tag_name != "pre" {
            return Ok(());
        }
        let Some(code) = element
            .children
            .iter_mut()
            .filter_map(Node::as_element_mut)
            .find(|child| child.tag_name == "code")
        else {
            return Ok(());
        };
        let Some(language) = code_language(code).map(str::to_string) else {
            return Ok(());
        };

        let source = code.text_content();
        match adapter.call(&source, &language) {
            Ok(Highlight::Markup(markup)) => {
                let nodes = parse_fragment(&markup).ok_or_else(|| PipelineError::Highlight {
                    language: language.clone(),
                    document: document.to_path_buf(),
                    source: HighlightError::new("highlighter returned unparseable markup"),
                })?;
                code.children = nodes;
                highlighted += 1;
                Ok(())
            }
            Ok(Highlight::Unsupported) => {
                diagnostics.warn(Warning::UnsupportedLanguage { language });
                Ok(())
            }
            Err(CallError::Failed(source)) => Err(PipelineError::Highlight {
                language,
                document: document.to_path_buf(),
                source,
            }),
            Err(CallError::TimedOut(timeout)) => Err(PipelineError::HighlightTimeout {
                language,
                document: document.to_path_buf(),
                timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            }),
        }
    })?;
    log::debug!("highlighted {highlighted} code blocks in {}", document.display());
    Ok(highlighted)
}
