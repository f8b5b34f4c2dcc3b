//! Snippet lookup over the active snippet list.

use crate::snippet::Snippet;

/// First snippet whose name equals `name`.
pub fn exact<'a>(snippets: &'a [Snippet], name: &str) -> Option<&'a Snippet> {
    snippets.iter().find(|s| s.name == name)
}

/// First snippet whose name starts with `word` followed by `separator`.
///
/// Used for expand-at-point: a snippet named `for: loop over items` is found
/// with the word `for` and separator `:`.
pub fn prefix_match<'a>(
    snippets: &'a [Snippet],
    word: &str,
    separator: &str,
) -> Option<&'a Snippet> {
    snippets.iter().find(|s| {
        s.name
            .strip_prefix(word)
            .is_some_and(|rest| rest.starts_with(separator))
    })
}
