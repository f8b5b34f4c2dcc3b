//! Category Index
//!
//! Walks a parsed outline and extracts categories and their snippets.

use crate::outline::Outline;
use crate::snippet::Snippet;

/// Heading levels used for categories and snippets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexLevels {
    pub category: usize,
    pub snippet: usize,
}

impl Default for IndexLevels {
    fn default() -> Self {
        Self {
            category: 1,
            snippet: 2,
        }
    }
}

/// All heading titles at `level`, in document order. Duplicates are kept.
pub fn list_categories(outline: &Outline, level: usize) -> Vec<String> {
    let mut names = Vec::new();
    outline.walk(|node, _| {
        if node.level == level {
            names.push(node.title.clone());
        }
    });
    names
}

/// Snippet-level headings with an ancestor titled `category`, in document order.
///
/// Any ancestor title counts, so with malformed nesting a snippet can belong
/// to several categories.
pub fn snippets_of(outline: &Outline, category: &str, levels: IndexLevels) -> Vec<Snippet> {
    let mut snippets = Vec::new();
    outline.walk(|node, ancestors| {
        if node.level == levels.snippet && ancestors.iter().any(|a| a.title == category) {
            snippets.push(Snippet::new(
                node.title.clone(),
                node.tags.clone(),
                node.body.clone(),
            ));
        }
    });
    tracing::debug!(category, count = snippets.len(), "indexed snippets");
    snippets
}
