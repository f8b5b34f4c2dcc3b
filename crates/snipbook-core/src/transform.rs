//! Text transformation applied to plain-text snippets before insertion.

use crate::snippet::{IndentMode, Snippet};

/// Escape for a heading star inside snippet bodies.
pub const HEADING_ESCAPE: &str = "\\*";
const HEADING_MARKER: char = '*';

/// Destination facts the transformation depends on.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransformContext {
    /// Nesting depth reported by the destination, if any
    pub depth: Option<usize>,
    /// Expand escaped stars to the destination depth
    pub respect_depth: bool,
    /// A template engine will receive the text
    pub template_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transformed {
    pub text: String,
    pub indent: IndentMode,
}

/// Prepare snippet `body` for insertion.
pub fn transform(body: &str, snippet: &Snippet, ctx: &TransformContext) -> Transformed {
    let body = body.strip_suffix('\n').unwrap_or(body);
    Transformed {
        text: expand_heading_escapes(body, marker_count(ctx)),
        indent: select_indent(snippet, ctx),
    }
}

fn marker_count(ctx: &TransformContext) -> usize {
    match ctx.depth {
        Some(depth) if ctx.respect_depth && depth > 0 => depth,
        _ => 1,
    }
}

/// Replace `\*` at the start of each line with `count` stars.
pub fn expand_heading_escapes(text: &str, count: usize) -> String {
    let markers: String = std::iter::repeat(HEADING_MARKER).take(count).collect();
    text.split('\n')
        .map(|line| match line.strip_prefix(HEADING_ESCAPE) {
            Some(rest) => format!("{}{}", markers, rest),
            None => line.to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Indent tags first, then template engine default, then reindent.
pub fn select_indent(snippet: &Snippet, ctx: &TransformContext) -> IndentMode {
    match snippet.indent_tag() {
        Some(mode) => mode,
        None if ctx.template_active => IndentMode::TemplateDefault,
        None => IndentMode::Reindent,
    }
}
