//! Active category cache.
//!
//! Holds the selected category name and, once computed, its snippet list.
//! The list is dropped whenever the name changes so a reader never sees
//! snippets of a previously selected category.

use crate::error::Result;
use crate::snippet::Snippet;

#[derive(Debug, Default)]
pub struct ActiveCategory {
    category: Option<String>,
    snippets: Option<Vec<Snippet>>,
}

impl ActiveCategory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// Cached list, if populated.
    pub fn snippets(&self) -> Option<&[Snippet]> {
        self.snippets.as_deref()
    }

    pub fn is_populated(&self) -> bool {
        self.snippets.is_some()
    }

    /// Select `name` and drop any cached list. Returns whether the name changed.
    pub fn set_category(&mut self, name: &str) -> bool {
        let changed = self.category.as_deref() != Some(name);
        self.category = Some(name.to_string());
        self.snippets = None;
        changed
    }

    /// Drop the cached list but keep the selected name.
    pub fn invalidate(&mut self) {
        self.snippets = None;
    }

    /// Drop both name and list.
    pub fn clear(&mut self) {
        self.category = None;
        self.snippets = None;
    }

    /// Return the cached list, filling it with `load` first if needed.
    ///
    /// `load` receives the current category name (possibly `None`) and
    /// returns the name it resolved together with that category's snippets.
    /// On error nothing is stored.
    pub fn get_or_populate<F>(&mut self, load: F) -> Result<&[Snippet]>
    where
        F: FnOnce(Option<&str>) -> Result<(String, Vec<Snippet>)>,
    {
        if self.snippets.is_none() {
            let (name, snippets) = load(self.category.as_deref())?;
            self.category = Some(name);
            self.snippets = Some(snippets);
        }
        Ok(self.snippets.as_deref().unwrap_or_default())
    }
}
