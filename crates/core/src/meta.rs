//! Code block meta string parsing.
//!
//! A fence such as ```` ```rust {file: "../src/main.rs", title=Main} ```` carries
//! everything after the language as its meta string. The parser accepts
//! `key=value`, `key: value` and bare `flag` entries separated by whitespace or
//! commas, optionally wrapped in braces. Values may be single or double quoted.
//! Nothing is evaluated.
//!
//! Tokens meant for other tools, such as line ranges `{1-3}`, `/regex/`
//! markers or a bare `"title"`, are skipped. Only a malformed `file` entry is
//! an error.

use thiserror::Error;

/// A parsed meta value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaValue {
    /// `key=value`, `key: "value"`.
    String(String),
    /// Bare `key`.
    Flag,
}

/// Errors emitted while parsing a meta string.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MetaError {
    /// A quoted value was not closed.
    #[error("unterminated {quote} quote in value of `{key}`")]
    UnterminatedQuote {
        /// Key whose value was being read.
        key: String,
        /// Quote character.
        quote: char,
    },
    /// A key was followed by `=` or `:` but no value.
    #[error("missing value for `{key}`")]
    MissingValue {
        /// Key without a value.
        key: String,
    },
}

/// Ordered key/value entries of a code block meta string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeMeta {
    entries: Vec<(String, MetaValue)>,
}

impl CodeMeta {
    /// Parses a meta string.
    pub fn parse(input: &str) -> Result<Self, MetaError> {
        let trimmed = input.trim();
        let body = trimmed
            .strip_prefix('{')
            .and_then(|rest| rest.strip_suffix('}'))
            .unwrap_or(trimmed);
        Parser::new(body).parse()
    }

    /// The string value for `key`; the last occurrence wins.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|(name, _)| name == key)
            .and_then(|(_, value)| match value {
                MetaValue::String(value) => Some(value.as_str()),
                MetaValue::Flag => None,
            })
    }

    /// Whether `key` appears at all.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|(name, _)| name == key)
    }

    /// Entries in source order.
    pub fn entries(&self) -> &[(String, MetaValue)] {
        &self.entries
    }

    /// The include path requested through the `file` key.
    pub fn file(&self) -> Option<&str> {
        self.get("file").filter(|path| !path.is_empty())
    }
}

/// Keys whose malformed values fail the parse.
const STRICT_KEYS: &[&str] = &["file"];

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn parse(mut self) -> Result<CodeMeta, MetaError> {
        let mut entries = Vec::new();
        loop {
            self.skip_separators();
            if self.pos >= self.input.len() {
                break;
            }
            let Some(key) = self.read_key() else {
                self.skip_opaque();
                continue;
            };
            self.skip_whitespace();
            match self.peek() {
                Some('=') | Some(':') => {
                    self.pos += 1;
                    self.skip_whitespace();
                    match self.read_value(&key) {
                        Ok(value) => entries.push((key, MetaValue::String(value))),
                        Err(err) if STRICT_KEYS.contains(&key.as_str()) => return Err(err),
                        Err(err) => log::debug!("skipping code meta entry: {err}"),
                    }
                }
                _ => entries.push((key, MetaValue::Flag)),
            }
        }
        Ok(CodeMeta { entries })
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if !ch.is_whitespace() {
                break;
            }
            self.pos += ch.len_utf8();
        }
    }

    fn skip_separators(&mut self) {
        while let Some(ch) = self.peek() {
            if !(ch.is_whitespace() || ch == ',') {
                break;
            }
            self.pos += ch.len_utf8();
        }
    }

    fn read_key(&mut self) -> Option<String> {
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if ch.is_alphanumeric() || matches!(ch, '-' | '_' | '.') {
                self.pos += ch.len_utf8();
            } else {
                break;
            }
        }
        (self.pos > start).then(|| self.input[start..self.pos].to_string())
    }

    /// Skips a token that is not a key: a bracketed or quoted run up to its
    /// closing character, then anything up to the next separator.
    fn skip_opaque(&mut self) {
        let start = self.pos;
        if let Some(open @ ('"' | '\'' | '/' | '{' | '[' | '(')) = self.peek() {
            let close = match open {
                '{' => '}',
                '[' => ']',
                '(' => ')',
                quote => quote,
            };
            self.pos += 1;
            while let Some(ch) = self.peek() {
                self.pos += ch.len_utf8();
                if ch == close {
                    break;
                }
            }
        }
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() || ch == ',' {
                break;
            }
            self.pos += ch.len_utf8();
        }
        log::debug!("skipping code meta token `{}`", &self.input[start..self.pos]);
    }

    fn read_value(&mut self, key: &str) -> Result<String, MetaError> {
        match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.pos += 1;
                let mut value = String::new();
                let mut escaped = false;
                while let Some(ch) = self.peek() {
                    self.pos += ch.len_utf8();
                    if escaped {
                        value.push(ch);
                        escaped = false;
                    } else if ch == '\\' {
                        escaped = true;
                    } else if ch == quote {
                        return Ok(value);
                    } else {
                        value.push(ch);
                    }
                }
                Err(MetaError::UnterminatedQuote {
                    key: key.to_string(),
                    quote,
                })
            }
            Some(ch) if ch != ',' => {
                let start = self.pos;
                while let Some(ch) = self.peek() {
                    if ch.is_whitespace() || ch == ',' {
                        break;
                    }
                    self.pos += ch.len_utf8();
                }
                Ok(self.input[start..self.pos].to_string())
            }
            _ => Err(MetaError::MissingValue {
                key: key.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_colon_form_with_quotes() {
        let meta = CodeMeta::parse(r#"file: "../c.rs""#).unwrap();
        assert_eq!(meta.file(), Some("../c.rs"));
    }

    #[test]
    fn parses_object_literal_form() {
        let meta = CodeMeta::parse(r#"{ file: '../src/lib.rs', title: "Library" }"#).unwrap();
        assert_eq!(meta.file(), Some("../src/lib.rs"));
        assert_eq!(meta.get("title"), Some("Library"));
    }

    #[test]
    fn parses_equals_and_flags() {
        let meta = CodeMeta::parse("title=main.rs showLineNumbers file=./main.rs").unwrap();
        assert_eq!(meta.get("title"), Some("main.rs"));
        assert!(meta.contains("showLineNumbers"));
        assert_eq!(meta.get("showLineNumbers"), None);
        assert_eq!(meta.file(), Some("./main.rs"));
    }

    #[test]
    fn empty_meta_has_no_entries() {
        let meta = CodeMeta::parse("   ").unwrap();
        assert!(meta.entries().is_empty());
        assert_eq!(meta.file(), None);
    }

    #[test]
    fn quoted_values_do_not_evaluate() {
        let meta = CodeMeta::parse(r#"file="${process.env.HOME}/x""#).unwrap();
        assert_eq!(meta.file(), Some("${process.env.HOME}/x"));
    }

    #[test]
    fn reports_unterminated_quote() {
        let err = CodeMeta::parse(r#"file: "oops"#).unwrap_err();
        assert_eq!(
            err,
            MetaError::UnterminatedQuote {
                key: "file".into(),
                quote: '"'
            }
        );
    }

    #[test]
    fn reports_missing_value() {
        let err = CodeMeta::parse("file=, title=x").unwrap_err();
        assert_eq!(err, MetaError::MissingValue { key: "file".into() });
    }

    #[test]
    fn skips_line_ranges_and_markers() {
        let meta = CodeMeta::parse("showLineNumbers {1-3}").unwrap();
        assert!(meta.contains("showLineNumbers"));
        assert_eq!(meta.entries().len(), 1);

        let meta = CodeMeta::parse(r#"/x/ "My title" {4,7-9} file=../a.rs ;"#).unwrap();
        assert_eq!(meta.file(), Some("../a.rs"));
        assert_eq!(meta.entries().len(), 1);
    }

    #[test]
    fn malformed_values_of_other_keys_are_dropped() {
        let meta = CodeMeta::parse("title=, file=x.rs").unwrap();
        assert_eq!(meta.file(), Some("x.rs"));
        assert!(!meta.contains("title"));

        let meta = CodeMeta::parse(r#"title="never closed"#).unwrap();
        assert!(meta.entries().is_empty());
    }
}
