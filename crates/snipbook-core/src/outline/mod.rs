//! # Outline Module
//!
//! Parses org-style outline text into a tree of headings.
//!
//! Only what the snippet index needs is extracted: heading depth, title,
//! trailing `:tag:` annotations and the body text directly under a heading.
//! Deeper headings become children instead of body text.
//!
//! ## Example
//!
//! ```rust
//! use snipbook_core::outline::parse;
//!
//! let outline = parse("* Prog\n** Hello :m:\nWorld\n");
//! let prog = &outline.headings[0];
//! assert_eq!(prog.title, "Prog");
//!
//! let hello = &prog.children[0];
//! assert_eq!(hello.level, 2);
//! assert_eq!(hello.tags, vec!["m"]);
//! assert_eq!(hello.body.as_deref(), Some("World\n"));
//! ```

mod parser;

use std::fs;
use std::path::Path;

use crate::error::Result;

pub use parser::{parse, parse_bytes};

/// A single heading with everything nested under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingNode {
    /// Number of leading stars (1 for top-level)
    pub level: usize,
    /// Heading text without stars and tags
    pub title: String,
    /// Trailing tags in declaration order
    pub tags: Vec<String>,
    /// Text up to the next heading; `None` when there is none
    pub body: Option<String>,
    pub children: Vec<HeadingNode>,
}

impl HeadingNode {
    pub fn new(level: usize, title: impl Into<String>, tags: Vec<String>) -> Self {
        Self {
            level,
            title: title.into(),
            tags,
            body: None,
            children: Vec::new(),
        }
    }
}

/// Parsed outline document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outline {
    /// Text before the first heading
    pub preamble: Option<String>,
    /// Top-level headings in document order
    pub headings: Vec<HeadingNode>,
}

impl Outline {
    /// Read and parse an outline file.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)?;
        parse_bytes(&bytes)
    }

    /// Visit every heading in document preorder together with its strict
    /// ancestors (outermost first).
    pub fn walk<'a, F>(&'a self, mut visit: F)
    where
        F: FnMut(&'a HeadingNode, &[&'a HeadingNode]),
    {
        let mut ancestors: Vec<&'a HeadingNode> = Vec::new();
        for heading in &self.headings {
            walk_node(heading, &mut ancestors, &mut visit);
        }
    }

    /// Total number of headings at any depth.
    pub fn heading_count(&self) -> usize {
        let mut count = 0;
        self.walk(|_, _| count += 1);
        count
    }
}

fn walk_node<'a, F>(node: &'a HeadingNode, ancestors: &mut Vec<&'a HeadingNode>, visit: &mut F)
where
    F: FnMut(&'a HeadingNode, &[&'a HeadingNode]),
{
    visit(node, ancestors);
    ancestors.push(node);
    for child in &node.children {
        walk_node(child, ancestors, visit);
    }
    ancestors.pop();
}
