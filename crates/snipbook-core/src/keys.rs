//! One-shot key binding table built from snippet tags.
//!
//! The last tag of a snippet doubles as its key unless it is `func`,
//! `results` or an `indent_*` tag.

use std::collections::BTreeMap;

use crate::dispatch::{Destination, Dispatched, SnippetDispatcher};
use crate::error::Result;
use crate::snippet::{Snippet, INDENT_TAG_PREFIX, TAG_FUNC, TAG_RESULTS};

/// Key token to snippet. Each binding owns a copy of its snippet, so firing
/// it does not depend on the category that is active at that time.
#[derive(Debug, Clone, Default)]
pub struct KeyTable {
    bindings: BTreeMap<String, Snippet>,
}

impl KeyTable {
    /// Later snippets overwrite earlier ones with the same key.
    pub fn build(snippets: &[Snippet]) -> Self {
        let mut bindings = BTreeMap::new();
        for snippet in snippets {
            if let Some(key) = binding_key(snippet) {
                bindings.insert(key.to_string(), snippet.clone());
            }
        }
        tracing::debug!(keys = bindings.len(), "built key table");
        Self { bindings }
    }

    pub fn get(&self, key: &str) -> Option<&Snippet> {
        self.bindings.get(key)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Bindings sorted by key.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Snippet)> {
        self.bindings.iter().map(|(k, s)| (k.as_str(), s))
    }

    /// Dispatch the snippet bound to `key`. `Ok(None)` when the key is unbound.
    pub fn fire(
        &self,
        key: &str,
        dispatcher: &mut SnippetDispatcher,
        destination: &mut dyn Destination,
    ) -> Result<Option<Dispatched>> {
        match self.bindings.get(key) {
            Some(snippet) => dispatcher.dispatch(snippet, destination).map(Some),
            None => Ok(None),
        }
    }
}

fn binding_key(snippet: &Snippet) -> Option<&str> {
    let key = snippet.last_tag()?;
    if key == TAG_FUNC || key == TAG_RESULTS || key.starts_with(INDENT_TAG_PREFIX) {
        return None;
    }
    Some(key)
}
