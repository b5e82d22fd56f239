use std::path::PathBuf;
use thiserror::Error;

use crate::frontmatter::FrontmatterError;

/// Source location information for error reporting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    /// Optional file path
    pub file: Option<String>,
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
}

impl SourceLocation {
    /// Create a new source location
    pub fn new(line: usize, column: usize) -> Self {
        Self {
            file: None,
            line,
            column,
        }
    }

    /// Create a source location with file information
    pub fn with_file(file: String, line: usize, column: usize) -> Self {
        Self {
            file: Some(file),
            line,
            column,
        }
    }

    /// Location of an mdast node, if the parser recorded one.
    pub fn of_position(position: Option<&markdown::unist::Position>) -> Option<Self> {
        position.map(|p| Self::new(p.start.line, p.start.column))
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(file) = &self.file {
            write!(f, "{}:{}:{}", file, self.line, self.column)
        } else {
            write!(f, "{}:{}", self.line, self.column)
        }
    }
}

fn at(location: &Option<SourceLocation>) -> String {
    match location {
        Some(location) => format!(" at {location}"),
        None => String::new(),
    }
}

/// Failures reported by an external highlighter.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct HighlightError {
    /// Description provided by the highlighter.
    pub message: String,
}

impl HighlightError {
    /// Create a highlighter error from any message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors that abort the transform of the current document.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// IO error while reading the document or an include.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    /// markdown-rs parser error surfaced through the adapter.
    #[error("Parse error in {} at {location}: {message}", .document.display())]
    MarkdownAdapter {
        /// Document being parsed.
        document: PathBuf,
        /// Error message
        message: String,
        /// Source location
        location: SourceLocation,
    },
    /// The document has no frontmatter block.
    #[error("Missing frontmatter in {}", .document.display())]
    MissingFrontmatter {
        /// Document being transformed.
        document: PathBuf,
    },
    /// Frontmatter was present but could not be read into the expected shape.
    #[error("Invalid frontmatter in {}: {source}", .document.display())]
    Frontmatter {
        /// Document being transformed.
        document: PathBuf,
        /// Underlying frontmatter failure.
        #[source]
        source: FrontmatterError,
    },
    /// A code block meta string could not be parsed.
    #[error("Invalid code block meta `{meta}` in {}{}: {message}", .document.display(), at(.location))]
    InvalidMeta {
        /// Document being transformed.
        document: PathBuf,
        /// Raw meta string.
        meta: String,
        /// Parser message.
        message: String,
        /// Location of the code block.
        location: Option<SourceLocation>,
    },
    /// A `file` include points at a path that does not exist.
    #[error("Included file {} does not exist (from `{meta}` in {}{})", .path.display(), .document.display(), at(.location))]
    MissingInclude {
        /// Resolved include path.
        path: PathBuf,
        /// Raw meta string that requested the include.
        meta: String,
        /// Document being transformed.
        document: PathBuf,
        /// Location of the code block.
        location: Option<SourceLocation>,
    },
    /// A `file` include resolves outside the configured include root.
    #[error("Included file {} escapes {} (from `{meta}` in {})", .path.display(), .root.display(), .document.display())]
    IncludeOutsideRoot {
        /// Resolved include path.
        path: PathBuf,
        /// Configured root.
        root: PathBuf,
        /// Raw meta string that requested the include.
        meta: String,
        /// Document being transformed.
        document: PathBuf,
    },
    /// The include exists but could not be read.
    #[error("Failed to read included file {}: {source}", .path.display())]
    IncludeRead {
        /// Resolved include path.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// The highlighter raised an error.
    #[error("Highlighter failed for `{language}` in {}: {source}", .document.display())]
    Highlight {
        /// Language tag of the block.
        language: String,
        /// Document being transformed.
        document: PathBuf,
        /// Error raised by the highlighter.
        #[source]
        source: HighlightError,
    },
    /// The highlighter did not answer in time.
    #[error("Highlighter timed out after {timeout_ms}ms for `{language}` in {}", .document.display())]
    HighlightTimeout {
        /// Language tag of the block.
        language: String,
        /// Document being transformed.
        document: PathBuf,
        /// Configured timeout.
        timeout_ms: u64,
    },
    /// A pass ran before a pass it depends on.
    #[error("Pass `{pass}` requires `{requires}` to run first")]
    PassOrder {
        /// Pass that was invoked.
        pass: &'static str,
        /// Pass that must have completed.
        requires: &'static str,
    },
    /// Internal logic error (unexpected state).
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl PipelineError {
    /// Create a parse error with location
    pub fn parse_error(
        document: impl Into<PathBuf>,
        message: impl Into<String>,
        line: usize,
        column: usize,
    ) -> Self {
        Self::MarkdownAdapter {
            document: document.into(),
            message: message.into(),
            location: SourceLocation::new(line, column),
        }
    }
}

/// Non-fatal conditions recorded while transforming a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// The body carries its own level-1 heading next to the frontmatter title.
    LevelOneHeading {
        /// Heading text
        text: String,
        /// Source location of the heading
        location: Option<SourceLocation>,
    },
    /// The highlighter has no grammar for a code block's language.
    UnsupportedLanguage {
        /// Language tag of the block
        language: String,
    },
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::LevelOneHeading { text, location } => {
                write!(f, "Level 1 heading: {}", text)?;
                if let Some(location) = location {
                    write!(f, " @ {}", location)?;
                }
                Ok(())
            }
            Warning::UnsupportedLanguage { language } => {
                write!(f, "No highlighting available for `{}`", language)
            }
        }
    }
}

/// Collection of warnings produced by a single document transform.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    /// List of non-fatal warnings
    pub warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Create a new empty diagnostics collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning and forward it to the log.
    pub fn warn(&mut self, warning: Warning) {
        log::warn!("{}", warning);
        self.warnings.push(warning);
    }

    /// Check if there are any warnings
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Get total count of all diagnostics
    pub fn count(&self) -> usize {
        self.warnings.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_include_names_path_and_meta() {
        let err = PipelineError::MissingInclude {
            path: PathBuf::from("/a/c.rs"),
            meta: r#"file: "../c.rs""#.to_string(),
            document: PathBuf::from("/a/b/doc.md"),
            location: Some(SourceLocation::new(3, 1)),
        };
        let message = err.to_string();
        assert!(message.contains("/a/c.rs"), "{message}");
        assert!(message.contains(r#"file: "../c.rs""#), "{message}");
        assert!(message.contains("at 3:1"), "{message}");
    }

    #[test]
    fn warning_display_includes_location() {
        let warning = Warning::LevelOneHeading {
            text: "Intro".into(),
            location: Some(SourceLocation::with_file("post.md".into(), 4, 1)),
        };
        assert_eq!(warning.to_string(), "Level 1 heading: Intro @ post.md:4:1");
    }

    #[test]
    fn diagnostics_collects_warnings() {
        let mut diagnostics = Diagnostics::new();
        assert!(!diagnostics.has_warnings());
        diagnostics.warn(Warning::UnsupportedLanguage {
            language: "unknownlang".into(),
        });
        assert_eq!(diagnostics.count(), 1);
    }
}
