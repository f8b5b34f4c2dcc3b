//! Outline Parser
//!
//! Line-based: a heading is a run of `*` at column 0 followed by whitespace
//! or end of line. Everything else is body text of the most recent heading.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{HeadingNode, Outline};
use crate::error::{Result, SnipbookError};

static HEADING_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\*+)(?:[ \t]+(.*))?$").expect("valid heading regex"));

static TRAILING_TAGS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|[ \t]+)(:[\w@#%:]+:)[ \t]*$").expect("valid tag regex")
});

/// Parse outline text. Never fails; odd depth sequences are kept as declared.
pub fn parse(text: &str) -> Outline {
    let mut builder = TreeBuilder::default();

    for line in text.lines() {
        match parse_heading_line(line) {
            Some(node) => builder.open(node),
            None => builder.body_line(line),
        }
    }

    let outline = builder.finish();
    tracing::debug!(
        headings = outline.heading_count(),
        top_level = outline.headings.len(),
        "parsed outline"
    );
    outline
}

/// Parse raw bytes; fails only when they are not valid UTF-8.
pub fn parse_bytes(bytes: &[u8]) -> Result<Outline> {
    let text = std::str::from_utf8(bytes).map_err(|e| SnipbookError::Parse {
        message: e.to_string(),
    })?;
    Ok(parse(text.strip_prefix('\u{feff}').unwrap_or(text)))
}

fn parse_heading_line(line: &str) -> Option<HeadingNode> {
    let caps = HEADING_LINE.captures(line)?;
    let level = caps.get(1).map_or(0, |m| m.as_str().len());
    let rest = caps.get(2).map_or("", |m| m.as_str());

    let (title, tags) = match TRAILING_TAGS.captures(rest) {
        Some(tag_caps) => {
            let whole = tag_caps.get(0).map_or(rest.len(), |m| m.start());
            let tags = tag_caps
                .get(1)
                .map(|m| split_tags(m.as_str()))
                .unwrap_or_default();
            (&rest[..whole], tags)
        }
        None => (rest, Vec::new()),
    };

    Some(HeadingNode::new(level, title.trim(), tags))
}

fn split_tags(run: &str) -> Vec<String> {
    run.split(':')
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
        .collect()
}

/// Turn collected body lines into a body string. Leading and trailing blank
/// lines are dropped; a present body ends with exactly one newline.
fn finish_body(lines: &[&str]) -> Option<String> {
    let start = lines.iter().position(|l| !l.trim().is_empty())?;
    let end = lines.iter().rposition(|l| !l.trim().is_empty())?;
    let mut body = lines[start..=end].join("\n");
    body.push('\n');
    Some(body)
}

#[derive(Default)]
struct TreeBuilder<'a> {
    preamble: Option<String>,
    roots: Vec<HeadingNode>,
    /// Open headings, outermost first
    stack: Vec<HeadingNode>,
    pending: Vec<&'a str>,
}

impl<'a> TreeBuilder<'a> {
    fn body_line(&mut self, line: &'a str) {
        self.pending.push(line);
    }

    fn flush_body(&mut self) {
        let body = finish_body(&self.pending);
        self.pending.clear();
        match self.stack.last_mut() {
            Some(node) => node.body = body,
            None => self.preamble = body,
        }
    }

    fn close_top(&mut self) {
        if let Some(node) = self.stack.pop() {
            match self.stack.last_mut() {
                Some(parent) => parent.children.push(node),
                None => self.roots.push(node),
            }
        }
    }

    fn open(&mut self, node: HeadingNode) {
        self.flush_body();
        while self.stack.last().is_some_and(|top| top.level >= node.level) {
            self.close_top();
        }
        self.stack.push(node);
    }

    fn finish(mut self) -> Outline {
        self.flush_body();
        while !self.stack.is_empty() {
            self.close_top();
        }
        Outline {
            preamble: self.preamble,
            headings: self.roots,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_levels_and_titles() {
        let outline = parse("* One\n** Two\n*** Three\n");
        let one = &outline.headings[0];
        assert_eq!(one.level, 1);
        assert_eq!(one.title, "One");
        assert_eq!(one.children[0].level, 2);
        assert_eq!(one.children[0].children[0].title, "Three");
    }

    #[test]
    fn test_trailing_tags() {
        let outline = parse("* Prog\n** Greet   :func:indent_nil:m:\n");
        let greet = &outline.headings[0].children[0];
        assert_eq!(greet.title, "Greet");
        assert_eq!(greet.tags, vec!["func", "indent_nil", "m"]);
    }

    #[test]
    fn test_colon_inside_title_is_not_a_tag() {
        let outline = parse("* key: value\n* Time 10:30\n");
        assert_eq!(outline.headings[0].title, "key: value");
        assert!(outline.headings[0].tags.is_empty());
        assert_eq!(outline.headings[1].title, "Time 10:30");
        assert!(outline.headings[1].tags.is_empty());
    }

    #[test]
    fn test_tags_only_heading() {
        let outline = parse("* :solo:\n");
        assert_eq!(outline.headings[0].title, "");
        assert_eq!(outline.headings[0].tags, vec!["solo"]);
    }

    #[test]
    fn test_non_ascii_tags() {
        let outline = parse("* Cat\n** Café :é:日本:\n");
        let cafe = &outline.headings[0].children[0];
        assert_eq!(cafe.title, "Café");
        assert_eq!(cafe.tags, vec!["é", "日本"]);
    }

    #[test]
    fn test_body_excludes_children_and_trailing_blanks() {
        let text = "* Cat\nintro\n** Snip\nline one\n  line two\n\n\n** Empty\n* Next\n";
        let outline = parse(text);
        let cat = &outline.headings[0];
        assert_eq!(cat.body.as_deref(), Some("intro\n"));
        assert_eq!(
            cat.children[0].body.as_deref(),
            Some("line one\n  line two\n")
        );
        assert_eq!(cat.children[1].body, None);
        assert_eq!(outline.headings[1].title, "Next");
    }

    #[test]
    fn test_body_skips_leading_blank_lines() {
        let outline = parse("* Cat\n** Snip\n\n  \n    indented\nWorld\n");
        let snip = &outline.headings[0].children[0];
        assert_eq!(snip.body.as_deref(), Some("    indented\nWorld\n"));
    }

    #[test]
    fn test_bold_text_is_not_a_heading() {
        let outline = parse("* Cat\n** Snip\n*bold* text\n");
        let snip = &outline.headings[0].children[0];
        assert_eq!(snip.body.as_deref(), Some("*bold* text\n"));
        assert!(snip.children.is_empty());
    }

    #[test]
    fn test_escaped_heading_stays_in_body() {
        let outline = parse("* Cat\n** Tree\n\\*child\n");
        let tree = &outline.headings[0].children[0];
        assert_eq!(tree.body.as_deref(), Some("\\*child\n"));
    }

    #[test]
    fn test_skipped_depth_is_not_repaired() {
        let outline = parse("* Top\n*** Deep\n** Mid\n");
        let top = &outline.headings[0];
        assert_eq!(top.children.len(), 2);
        assert_eq!(top.children[0].level, 3);
        assert_eq!(top.children[1].level, 2);
    }

    #[test]
    fn test_preamble() {
        let outline = parse("#+TITLE: Snippets\n\n* Cat\n");
        assert_eq!(outline.preamble.as_deref(), Some("#+TITLE: Snippets\n"));
        assert_eq!(outline.headings.len(), 1);
    }

    #[test]
    fn test_crlf_input() {
        let outline = parse("* Cat\r\n** Snip :x:\r\nbody\r\n");
        let snip = &outline.headings[0].children[0];
        assert_eq!(snip.tags, vec!["x"]);
        assert_eq!(snip.body.as_deref(), Some("body\n"));
    }

    #[test]
    fn test_parse_is_pure() {
        let text = "* A :t:\nx\n** B\ny\n* C\n";
        assert_eq!(parse(text), parse(text));
    }

    #[test]
    fn test_parse_bytes_rejects_invalid_utf8() {
        let result = parse_bytes(&[b'*', b' ', 0xff, 0xfe]);
        assert!(matches!(result, Err(SnipbookError::Parse { .. })));
    }

    #[test]
    fn test_parse_bytes_strips_bom() {
        let outline = parse_bytes("\u{feff}* Cat\n".as_bytes()).unwrap();
        assert_eq!(outline.headings[0].title, "Cat");
    }
}
