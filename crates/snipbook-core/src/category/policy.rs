//! Category selection policy.

/// Pick the category whose name equals `context_id` exactly.
///
/// `context_id` is whatever the host uses to describe where the user is
/// (an editor mode name, a project name).
pub fn resolve_category<'a, S: AsRef<str>>(context_id: &str, known: &'a [S]) -> Option<&'a str> {
    known
        .iter()
        .map(|name| name.as_ref())
        .find(|name| *name == context_id)
}
