//! Heading identifiers compatible with `github-slugger`, the slugger Astro
//! uses for `rehypeHeadingIds`, so links written against the live site keep
//! working.

use std::collections::HashMap;

/// Splits a trailing `{#custom-id}` off heading text.
///
/// The id may only contain ASCII alphanumerics, `-` and `_`.
///
/// ```
/// use neohome_core::slug::extract_custom_id;
///
/// assert_eq!(extract_custom_id("Setup {#setup}"), ("Setup", Some("setup")));
/// assert_eq!(extract_custom_id("Setup"), ("Setup", None));
/// ```
pub fn extract_custom_id(text: &str) -> (&str, Option<&str>) {
    let trimmed = text.trim_end();
    let Some(inner_end) = trimmed.strip_suffix('}') else {
        return (text, None);
    };
    let Some(open) = inner_end.rfind("{#") else {
        return (text, None);
    };
    let id = &inner_end[open + 2..];
    let valid = !id.is_empty()
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
    if valid {
        (trimmed[..open].trim_end(), Some(id))
    } else {
        (text, None)
    }
}

/// Stateful slug generator; repeated headings get `-1`, `-2`, ... suffixes.
#[derive(Debug, Default)]
pub struct Slugger {
    counts: HashMap<String, usize>,
}

impl Slugger {
    /// Creates a new slugger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Generates the next unique slug for the given heading text.
    ///
    /// Every returned slug is recorded, so a heading whose own slug matches
    /// an earlier generated suffix is suffixed again.
    pub fn slug(&mut self, text: &str) -> String {
        let base = base_slug(text);
        let mut slug = base.clone();
        while self.counts.contains_key(&slug) {
            let count = self.counts.entry(base.clone()).or_insert(0);
            *count += 1;
            slug = format!("{base}-{count}");
        }
        self.counts.insert(slug.clone(), 0);
        slug
    }

    /// Marks an id as taken so generated slugs avoid it.
    pub fn reserve(&mut self, id: &str) {
        self.counts.entry(id.to_string()).or_insert(0);
    }
}

/// Lowercases, keeps letters, digits, `-`, `_` and combining marks, turns
/// spaces into hyphens and drops everything else. Hyphens are neither
/// collapsed nor trimmed.
fn base_slug(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
            slug.push(ch.to_ascii_lowercase());
        } else if ch == ' ' {
            slug.push('-');
        } else if !ch.is_ascii() && (ch.is_alphanumeric() || is_combining_mark(ch)) {
            slug.extend(ch.to_lowercase());
        }
    }
    if slug.is_empty() {
        slug.push_str("heading");
    }
    slug
}

fn is_combining_mark(ch: char) -> bool {
    matches!(
        ch as u32,
        0x0300..=0x036F
            | 0x0483..=0x0489
            | 0x0591..=0x05C7
            | 0x0610..=0x061A
            | 0x064B..=0x065F
            | 0x0900..=0x0903
            | 0x093A..=0x094F
            | 0x0951..=0x0957
            | 0x0962..=0x0963
            | 0x0E31..=0x0E3A
            | 0x0E47..=0x0E4E
            | 0x1AB0..=0x1AFF
            | 0x1DC0..=0x1DFF
            | 0x20D0..=0x20FF
            | 0x3099..=0x309A
            | 0xFE20..=0xFE2F
    )
}
