use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

/// Result returned after extracting frontmatter from a Markdown document.
#[derive(Debug)]
pub struct FrontmatterExtraction {
    /// Parsed frontmatter as a JSON value.
    pub value: JsonValue,
    /// Byte offset inside the original document where Markdown content begins.
    pub body_start: usize,
    /// Whether a `---` block was found at all.
    pub present: bool,
}

impl FrontmatterExtraction {
    fn empty() -> Self {
        Self {
            value: JsonValue::Object(Default::default()),
            body_start: 0,
            present: false,
        }
    }
}

/// Errors emitted while parsing or extracting frontmatter.
#[derive(Debug, Error)]
pub enum FrontmatterError {
    /// Unclosed YAML fence (e.g., missing terminating `---`).
    #[error("Unterminated YAML frontmatter block: expected closing '---'")]
    Unterminated,
    /// YAML failed to parse.
    #[error("Frontmatter parse error: {0}")]
    Parse(String),
    /// Top-level YAML node was not a mapping.
    #[error("Frontmatter must be a YAML mapping at the top level")]
    InvalidRootType,
    /// The mapping does not have the fields a post requires.
    #[error("Frontmatter does not match the post schema: {0}")]
    Schema(String),
}

/// Reading time metric attached to a post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadingTime {
    /// Human readable summary, e.g. `3 min read`.
    pub text: String,
    /// Fractional minutes.
    pub minutes: f64,
    /// Milliseconds.
    pub time: f64,
    /// Word count.
    pub words: usize,
}

/// Words per minute used by [`ReadingTime::estimate`].
pub const WORDS_PER_MINUTE: f64 = 200.0;

impl ReadingTime {
    /// Estimate the reading time of a plain text body.
    pub fn estimate(text: &str) -> Self {
        let words = text.split_whitespace().count();
        let minutes = words as f64 / WORDS_PER_MINUTE;
        let rounded = minutes.ceil().max(1.0) as u64;
        Self {
            text: format!("{} min read", rounded),
            minutes,
            time: (minutes * 60_000.0).round(),
            words,
        }
    }
}

/// Typed frontmatter of a blog post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frontmatter {
    /// Post title, injected as the page's level-1 heading.
    pub title: String,
    /// Publication date.
    #[serde(deserialize_with = "deserialize_pub_date")]
    pub pub_date: NaiveDate,
    /// Short summary used in listings and feeds.
    pub summary: String,
    /// Drafts are excluded from listings by the site.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draft: Option<bool>,
    /// Reading time, computed when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimation: Option<ReadingTime>,
}

impl Frontmatter {
    /// Read the post schema out of extracted frontmatter.
    pub fn from_value(value: &JsonValue) -> Result<Self, FrontmatterError> {
        Frontmatter::deserialize(value).map_err(|err| FrontmatterError::Schema(err.to_string()))
    }

    /// Whether the post is a draft.
    pub fn is_draft(&self) -> bool {
        self.draft.unwrap_or(false)
    }
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp.
fn deserialize_pub_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|datetime| datetime.date_naive())
        .map_err(|err| serde::de::Error::custom(format!("invalid pubDate `{raw}`: {err}")))
}

/// Extracts YAML frontmatter from an input document.
pub fn extract_frontmatter(input: &str) -> Result<FrontmatterExtraction, FrontmatterError> {
    match find_yaml_block(input)? {
        Some((block, body_start)) => {
            let value = parse_yaml_block(&block)?;
            Ok(FrontmatterExtraction {
                value,
                body_start,
                present: true,
            })
        }
        None => Ok(FrontmatterExtraction::empty()),
    }
}

fn parse_yaml_block(block: &str) -> Result<JsonValue, FrontmatterError> {
    if block.trim().is_empty() {
        return Ok(JsonValue::Object(Default::default()));
    }

    let yaml_value: serde_yaml::Value =
        serde_yaml::from_str(block).map_err(|err| FrontmatterError::Parse(err.to_string()))?;
    let json_value =
        serde_json::to_value(yaml_value).map_err(|err| FrontmatterError::Parse(err.to_string()))?;

    match json_value {
        JsonValue::Null => Ok(JsonValue::Object(Default::default())),
        JsonValue::Object(_) => Ok(json_value),
        _ => Err(FrontmatterError::InvalidRootType),
    }
}

fn find_yaml_block(input: &str) -> Result<Option<(String, usize)>, FrontmatterError> {
    let (without_bom, bom_len) = strip_bom(input);
    let mut cursor = 0usize;

    loop {
        match next_line(without_bom, cursor) {
            Some((line, next_cursor)) => {
                if line.trim().is_empty() {
                    cursor = next_cursor;
                    continue;
                }

                if !is_yaml_fence(line) {
                    return Ok(None);
                }

                let block_start = next_cursor;
                let mut scan_cursor = next_cursor;

                loop {
                    match next_line(without_bom, scan_cursor) {
                        Some((block_line, next_line_cursor)) => {
                            if is_yaml_fence(block_line) {
                                let raw_block = &without_bom[block_start..scan_cursor];
                                let trimmed = raw_block.trim_end_matches(['\r', '\n']);
                                let body_index = bom_len + next_line_cursor;
                                return Ok(Some((trimmed.to_string(), body_index)));
                            }
                            scan_cursor = next_line_cursor;
                        }
                        None => return Err(FrontmatterError::Unterminated),
                    }
                }
            }
            None => return Ok(None),
        }
    }
}

fn strip_bom(input: &str) -> (&str, usize) {
    if let Some(stripped) = input.strip_prefix('\u{feff}') {
        (stripped, '\u{feff}'.len_utf8())
    } else {
        (input, 0)
    }
}

fn next_line(input: &str, start: usize) -> Option<(&str, usize)> {
    if start >= input.len() {
        return None;
    }

    let bytes = &input.as_bytes()[start..];
    if let Some(pos) = bytes.iter().position(|b| *b == b'\n') {
        let line_end = start + pos;
        let line = &input[start..line_end];
        Some((line, line_end + 1))
    } else {
        Some((&input[start..], input.len()))
    }
}

fn is_yaml_fence(line: &str) -> bool {
    normalize_line(line) == "---"
}

fn normalize_line(line: &str) -> &str {
    line.trim_end_matches('\r')
}
