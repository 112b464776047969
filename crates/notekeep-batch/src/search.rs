//! Text search and replace over whole note contents.
//!
//! Pure `text -> text` functions; callers handle reading and writing.

use notekeep_core::{Document, Error, Result};
use notekeep_frontmatter::FrontMatter;
use regex::{Captures, Regex};
use std::sync::LazyLock;

/// `YYYY-MM-DD HH:MM` timestamps
static TIMED_ISO_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9]{4}-[0-9]{2}-[0-9]{2}) [0-9]{2}:[0-9]{2}").expect("timed date pattern is valid")
});

/// A literal or regular-expression search pattern
#[derive(Debug, Clone)]
pub enum Pattern {
    Literal(String),
    Regex(Regex),
}

impl Pattern {
    pub fn literal(text: impl Into<String>) -> Self {
        Pattern::Literal(text.into())
    }

    pub fn regex(pattern: &str) -> Result<Self> {
        Regex::new(pattern)
            .map(Pattern::Regex)
            .map_err(|e| Error::parse_error(format!("Invalid pattern {:?}: {}", pattern, e)))
    }

    /// Literal unless `is_regex`
    pub fn new(pattern: &str, is_regex: bool) -> Result<Self> {
        if is_regex {
            Self::regex(pattern)
        } else {
            if pattern.is_empty() {
                return Err(Error::invalid_input("Literal pattern cannot be empty"));
            }
            Ok(Self::literal(pattern))
        }
    }

    pub fn contains(&self, content: &str) -> bool {
        match self {
            Pattern::Literal(text) => content.contains(text.as_str()),
            Pattern::Regex(re) => re.is_match(content),
        }
    }

    /// Every matched substring, in order
    pub fn matches(&self, content: &str) -> Vec<String> {
        match self {
            Pattern::Literal(text) => content
                .match_indices(text.as_str())
                .map(|(_, m)| m.to_string())
                .collect(),
            Pattern::Regex(re) => re.find_iter(content).map(|m| m.as_str().to_string()).collect(),
        }
    }

    /// Replace up to `count` matches (0 = all). Regex replacements may use `$1`/`${name}`.
    pub fn replace(&self, content: &str, replacement: &str, count: usize) -> String {
        match self {
            Pattern::Literal(text) if count == 0 => content.replace(text.as_str(), replacement),
            Pattern::Literal(text) => content.replacen(text.as_str(), replacement, count),
            Pattern::Regex(re) => re.replacen(content, count, replacement).into_owned(),
        }
    }

    pub fn remove(&self, content: &str, count: usize) -> String {
        match self {
            Pattern::Regex(re) => re
                .replacen(content, count, regex::NoExpand(""))
                .into_owned(),
            literal => literal.replace(content, "", count),
        }
    }

    /// Replace up to `count` matches (0 = all) with `f(matched)`
    pub fn replace_with<F>(&self, content: &str, count: usize, mut f: F) -> String
    where
        F: FnMut(&str) -> String,
    {
        match self {
            Pattern::Regex(re) => re
                .replacen(content, count, |caps: &Captures| f(&caps[0]))
                .into_owned(),
            Pattern::Literal(text) => {
                let mut out = String::with_capacity(content.len());
                let mut last = 0;
                for (n, (start, m)) in content.match_indices(text.as_str()).enumerate() {
                    if count != 0 && n == count {
                        break;
                    }
                    out.push_str(&content[last..start]);
                    out.push_str(&f(m));
                    last = start + m.len();
                }
                out.push_str(&content[last..]);
                out
            }
        }
    }
}

/// Remove the pattern from every line, dropping lines left blank
pub fn remove_in_lines(content: &str, pattern: &Pattern) -> String {
    Document::from_text(content)
        .into_lines()
        .into_iter()
        .filter_map(|line| {
            if !pattern.contains(&line) {
                return Some(line);
            }
            let removed = pattern.remove(&line, 0);
            (!removed.trim().is_empty()).then_some(removed)
        })
        .collect()
}

/// Shorten `YYYY-MM-DD HH:MM` timestamps to their date
pub fn truncate_timed_dates(content: &str) -> String {
    TIMED_ISO_DATE.replace_all(content, "$1").into_owned()
}

/// Append `addition` after the content with trailing whitespace trimmed
pub fn append_text(content: &str, addition: &str) -> String {
    let mut out = content.trim_end().to_string();
    out.push_str(addition);
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out
}

/// Replace the first match found inside the front matter block only.
///
/// `None` when the content has no block.
pub fn replace_in_block(
    front_matter: &FrontMatter,
    content: &str,
    pattern: &Pattern,
    replacement: &str,
) -> Option<String> {
    let doc = Document::from_text(content);
    let (open, close) = front_matter.block_bounds(&doc)?;

    let lines = doc.lines();
    let region_start: usize = lines[..=open].iter().map(String::len).sum();
    let region_end: usize = region_start + lines[open + 1..close].iter().map(String::len).sum::<usize>();

    let region = &content[region_start..region_end];
    let replaced = pattern.replace(region, replacement, 1);
    Some(format!(
        "{}{}{}",
        &content[..region_start],
        replaced,
        &content[region_end..]
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_replace_count() {
        let p = Pattern::literal("a");
        assert_eq!(p.replace("a a a", "b", 0), "b b b");
        assert_eq!(p.replace("a a a", "b", 2), "b b a");
    }

    #[test]
    fn test_regex_replace_groups() {
        let p = Pattern::regex(r"(\w+)@example\.com").unwrap();
        assert_eq!(
            p.replace("mail bob@example.com", "$1 at example", 0),
            "mail bob at example"
        );
    }

    #[test]
    fn test_invalid_regex() {
        assert!(matches!(Pattern::regex("(unclosed"), Err(Error::ParseError { .. })));
        assert!(Pattern::new("", false).is_err());
    }

    #[test]
    fn test_contains_and_matches() {
        let p = Pattern::new(r"\d{4}", true).unwrap();
        assert!(p.contains("year 2024"));
        assert_eq!(p.matches("2024 and 2025"), vec!["2024", "2025"]);
        assert!(!Pattern::literal("zzz").contains("abc"));
    }

    #[test]
    fn test_remove_regex_does_not_expand() {
        let p = Pattern::regex(r"\$\d+").unwrap();
        assert_eq!(p.remove("cost $10 and $20", 1), "cost  and $20");
    }

    #[test]
    fn test_replace_with_literal_and_regex() {
        let lit = Pattern::literal("x");
        assert_eq!(lit.replace_with("x-x-x", 2, |m| m.to_uppercase()), "X-X-x");

        let re = Pattern::regex(r"[a-z]+").unwrap();
        assert_eq!(re.replace_with("ab 12 cd", 0, |m| m.len().to_string()), "2 12 2");
    }

    #[test]
    fn test_remove_in_lines_drops_emptied_lines() {
        let p = Pattern::literal("TODO");
        let out = remove_in_lines("keep\nTODO\nfix TODO now\n", &p);
        assert_eq!(out, "keep\nfix  now\n");
    }

    #[test]
    fn test_truncate_timed_dates() {
        let out = truncate_timed_dates("created: 2024-12-31 09:15\nday: 2024-12-31\n");
        assert_eq!(out, "created: 2024-12-31\nday: 2024-12-31\n");
    }

    #[test]
    fn test_append_text() {
        assert_eq!(append_text("body\n\n\n", "\n\n## Meetings"), "body\n\n## Meetings\n");
    }

    #[test]
    fn test_replace_in_block_only_touches_block() {
        let fm = FrontMatter::default();
        let content = "---\ntitle: Alice\n---\ntitle: in body\n";
        let out = replace_in_block(&fm, content, &Pattern::literal("title"), "link").unwrap();
        assert_eq!(out, "---\nlink: Alice\n---\ntitle: in body\n");

        let body_only = "---\na: 1\n---\ntitle: x\n";
        let unchanged = replace_in_block(&fm, body_only, &Pattern::literal("title"), "link");
        assert_eq!(unchanged.as_deref(), Some(body_only));

        assert!(replace_in_block(&fm, "no block\n", &Pattern::literal("a"), "b").is_none());
    }
}
