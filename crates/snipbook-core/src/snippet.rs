//! Snippet model and reserved tag vocabulary.

use serde::Serialize;

/// Tag: invoke the snippet as a function, discard the result.
pub const TAG_FUNC: &str = "func";
/// Tag: invoke the snippet as a function, insert the result.
pub const TAG_RESULTS: &str = "results";
pub const TAG_INDENT_NIL: &str = "indent_nil";
pub const TAG_INDENT_FIXED: &str = "indent_fixed";
pub const TAG_INDENT_AUTO: &str = "indent_auto";

/// Prefix shared by the indentation tags.
pub const INDENT_TAG_PREFIX: &str = "indent_";

/// Tags with a fixed meaning. Matched exactly, case-sensitive.
pub const RESERVED_TAGS: &[&str] = &[
    TAG_FUNC,
    TAG_RESULTS,
    TAG_INDENT_NIL,
    TAG_INDENT_FIXED,
    TAG_INDENT_AUTO,
];

pub fn is_reserved_tag(tag: &str) -> bool {
    RESERVED_TAGS.contains(&tag)
}

/// A snippet heading from the active category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snippet {
    pub name: String,
    pub tags: Vec<String>,
    /// Body text; `None` means the heading had no text at all
    pub content: Option<String>,
}

/// What dispatching a snippet does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SnippetKind {
    PlainText,
    FunctionCall,
    FunctionCallWithInsertedResult,
}

/// How inserted text gets indented by the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IndentMode {
    /// Insert verbatim
    None,
    /// Indent to a fixed column
    Fixed,
    /// Syntax-aware indentation
    Auto,
    /// Let the template engine pick
    TemplateDefault,
    /// Insert, then reindent the inserted region
    Reindent,
}

impl Snippet {
    pub fn new(name: impl Into<String>, tags: Vec<String>, content: Option<String>) -> Self {
        Self {
            name: name.into(),
            tags,
            content,
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn last_tag(&self) -> Option<&str> {
        self.tags.last().map(|s| s.as_str())
    }

    /// `results` takes precedence over `func`.
    pub fn kind(&self) -> SnippetKind {
        if self.has_tag(TAG_RESULTS) {
            SnippetKind::FunctionCallWithInsertedResult
        } else if self.has_tag(TAG_FUNC) {
            SnippetKind::FunctionCall
        } else {
            SnippetKind::PlainText
        }
    }

    /// Indentation requested by an `indent_*` tag, checked in fixed order.
    pub fn indent_tag(&self) -> Option<IndentMode> {
        if self.has_tag(TAG_INDENT_NIL) {
            Some(IndentMode::None)
        } else if self.has_tag(TAG_INDENT_FIXED) {
            Some(IndentMode::Fixed)
        } else if self.has_tag(TAG_INDENT_AUTO) {
            Some(IndentMode::Auto)
        } else {
            None
        }
    }

    /// First line of content for listings.
    pub fn summary(&self) -> String {
        self.content
            .as_deref()
            .and_then(|c| c.lines().find(|l| !l.trim().is_empty()))
            .unwrap_or("(no text)")
            .chars()
            .take(60)
            .collect()
    }
}
