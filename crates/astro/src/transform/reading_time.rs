use super::mdast_text;
use markdown::mdast::Node as MdNode;
use neohome_core::{Frontmatter, ReadingTime};

/// Fills `frontmatter.estimation` from the body text unless the author set it.
pub fn estimate_reading_time(tree: &MdNode, frontmatter: &mut Frontmatter) {
    if frontmatter.estimation.is_some() {
        return;
    }
    let estimate = ReadingTime::estimate(&mdast_text(tree));
    log::debug!("estimated {} ({} words)", estimate.text, estimate.words);
    frontmatter.estimation = Some(estimate);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use neohome_core::{ParseOptions, parse_mdast};
    use std::path::Path;

    fn frontmatter() -> Frontmatter {
        Frontmatter {
            title: "Post".into(),
            pub_date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            summary: "s".into(),
            draft: None,
            estimation: None,
        }
    }

    #[test]
    fn counts_body_words() {
        let body = "word ".repeat(450);
        let tree = parse_mdast(&body, Path::new("post.md"), &ParseOptions::default()).unwrap();
        let mut frontmatter = frontmatter();
        estimate_reading_time(&tree, &mut frontmatter);
        let estimation = frontmatter.estimation.unwrap();
        assert_eq!(estimation.words, 450);
        assert_eq!(estimation.text, "3 min read");
    }

    #[test]
    fn keeps_author_estimation() {
        let tree = parse_mdast("one two", Path::new("post.md"), &ParseOptions::default()).unwrap();
        let mut frontmatter = frontmatter();
        frontmatter.estimation = Some(ReadingTime::estimate(&"x ".repeat(1000)));
        estimate_reading_time(&tree, &mut frontmatter);
        assert_eq!(frontmatter.estimation.unwrap().words, 1000);
    }
}
