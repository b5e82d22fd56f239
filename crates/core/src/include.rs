//! Resolution of `file` includes requested from code block meta strings.

use std::path::{Component, Path, PathBuf};

use crate::error::{PipelineError, SourceLocation};
use crate::meta::CodeMeta;

/// Where includes are looked up and how far they may reach.
#[derive(Debug, Clone, Copy)]
pub struct IncludeContext<'a> {
    /// Absolute path of the document being transformed.
    pub document: &'a Path,
    /// Includes must resolve inside this directory when set.
    pub root: Option<&'a Path>,
}

/// Lexically normalizes a path, dropping `.` and folding `..` into the parent.
///
/// The filesystem is not consulted, so symlinks are not followed.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = matches!(
                    normalized.components().next_back(),
                    Some(Component::Normal(_))
                ) && normalized.pop();
                if !popped && !normalized.has_root() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Resolves `reference` against the directory that contains `document`.
pub fn resolve_include(document: &Path, reference: &str) -> PathBuf {
    let base = document.parent().unwrap_or_else(|| Path::new(""));
    normalize_path(&base.join(reference))
}

/// Reads the include requested by `meta`, if any.
///
/// Returns `Ok(None)` when the meta string names no file. The text is
/// returned with trailing whitespace trimmed.
pub fn read_include(
    meta: &str,
    context: IncludeContext<'_>,
    location: Option<SourceLocation>,
) -> Result<Option<String>, PipelineError> {
    let parsed = CodeMeta::parse(meta).map_err(|err| PipelineError::InvalidMeta {
        document: context.document.to_path_buf(),
        meta: meta.to_string(),
        message: err.to_string(),
        location: location.clone(),
    })?;
    let Some(reference) = parsed.file() else {
        return Ok(None);
    };

    let path = resolve_include(context.document, reference);
    if let Some(root) = context.root {
        let root = normalize_path(root);
        if !path.starts_with(&root) {
            return Err(PipelineError::IncludeOutsideRoot {
                path,
                root,
                meta: meta.to_string(),
                document: context.document.to_path_buf(),
            });
        }
    }

    if !path.exists() {
        return Err(PipelineError::MissingInclude {
            path,
            meta: meta.to_string(),
            document: context.document.to_path_buf(),
            location,
        });
    }

    log::debug!("including {} into {}", path.display(), context.document.display());
    let text = std::fs::read_to_string(&path)
        .map_err(|source| PipelineError::IncludeRead { path, source })?;
    Ok(Some(text.trim_end().to_string()))
}

/// Appends included text to a code block's existing value.
pub fn append_include(value: &mut String, included: &str) {
    if !value.is_empty() {
        value.push('\n');
    }
    value.push_str(included);
}
