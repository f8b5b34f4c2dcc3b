//! Snippet repository: the host-facing command surface.
//!
//! Ties the outline source, the active category cache and the dispatcher
//! together. Every command either gets its input from the caller or asks the
//! host through a [`Prompt`].

use std::path::{Path, PathBuf};

use crate::category::{
    list_categories, resolve_category, snippets_of, ActiveCategory, IndexLevels,
};
use crate::config::Config;
use crate::dispatch::{
    CapabilityRegistry, Destination, Dispatched, SnippetDispatcher, TemplateEngine,
};
use crate::error::{Result, SnipbookError};
use crate::keys::KeyTable;
use crate::outline::{parse, Outline};
use crate::resolver;
use crate::snippet::Snippet;

/// Interactive choice provided by the host.
pub trait Prompt {
    /// Pick one of `options`; `None` when the user cancels.
    fn choose(&mut self, prompt: &str, options: &[String]) -> Option<String>;
}

/// Where the outline text comes from. Read fresh on every (re)population.
#[derive(Debug, Clone)]
pub enum SnippetSource {
    File(PathBuf),
    Text(String),
}

impl SnippetSource {
    pub fn read(&self) -> Result<Outline> {
        match self {
            Self::File(path) => Outline::load(path),
            Self::Text(text) => Ok(parse(text)),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::File(path) => Some(path),
            Self::Text(_) => None,
        }
    }
}

type SwitchListener = Box<dyn FnMut(&str)>;

pub struct SnippetRepository {
    source: SnippetSource,
    levels: IndexLevels,
    separator: String,
    default_category: Option<String>,
    /// Last context id raised by the host
    context: Option<String>,
    active: ActiveCategory,
    dispatcher: SnippetDispatcher,
    listeners: Vec<SwitchListener>,
}

impl SnippetRepository {
    pub fn new(source: SnippetSource, config: &Config, registry: CapabilityRegistry) -> Self {
        let dispatcher =
            SnippetDispatcher::new(registry).respect_depth(config.expand.respect_context_depth);
        Self {
            source,
            levels: config.index_levels(),
            separator: config.expand.separator.clone(),
            default_category: config.category.default.clone(),
            context: None,
            active: ActiveCategory::new(),
            dispatcher,
            listeners: Vec::new(),
        }
    }

    /// Repository over the configured source file below `base_dir`.
    pub fn open(base_dir: &Path, config: &Config, registry: CapabilityRegistry) -> Result<Self> {
        let path = config.source_path(base_dir)?;
        Ok(Self::new(SnippetSource::File(path), config, registry))
    }

    pub fn with_template_engine(mut self, engine: impl TemplateEngine + 'static) -> Self {
        self.dispatcher = self.dispatcher.with_template_engine(engine);
        self
    }

    /// Called with the new name after every category switch.
    pub fn on_switch(&mut self, listener: impl FnMut(&str) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn source(&self) -> &SnippetSource {
        &self.source
    }

    pub fn active_category(&self) -> Option<&str> {
        self.active.category()
    }

    pub fn dispatcher_mut(&mut self) -> &mut SnippetDispatcher {
        &mut self.dispatcher
    }

    // ------------------------------------------------------------------------
    // Categories
    // ------------------------------------------------------------------------

    /// Category names in document order, read fresh from the source.
    pub fn categories(&self) -> Result<Vec<String>> {
        let outline = self.source.read()?;
        Ok(list_categories(&outline, self.levels.category))
    }

    /// Switch to `name`, or ask the host when no name is given.
    pub fn select_category(
        &mut self,
        name: Option<&str>,
        prompt: &mut dyn Prompt,
    ) -> Result<String> {
        let known = self.categories()?;
        let name = match name {
            Some(name) => name.to_string(),
            None => prompt
                .choose("Category", &known)
                .ok_or(SnipbookError::Cancelled)?,
        };

        if !known.contains(&name) {
            return Err(SnipbookError::CategoryNotFound { name });
        }

        self.set_category(&name);
        Ok(name)
    }

    /// Switch without checking the source. The snippet list is recomputed on
    /// next access and listeners are told even when the name is unchanged.
    pub fn set_category(&mut self, name: &str) {
        self.active.set_category(name);
        self.notify_switch(name);
    }

    /// Host event: the editing context changed (mode, project, ...).
    /// Switches when a category with exactly that name exists.
    pub fn context_changed(&mut self, context_id: &str) -> Result<Option<String>> {
        self.context = Some(context_id.to_string());

        let known = self.categories()?;
        let Some(name) = resolve_category(context_id, &known).map(str::to_string) else {
            tracing::debug!(context = context_id, "no category for context");
            return Ok(None);
        };

        if self.active.category() != Some(name.as_str()) {
            self.set_category(&name);
        }
        Ok(Some(name))
    }

    /// Drop the cached list so the next access re-reads the source.
    pub fn reload(&mut self) {
        self.active.invalidate();
    }

    // ------------------------------------------------------------------------
    // Snippets
    // ------------------------------------------------------------------------

    /// Snippets of the active category, computed on first access.
    ///
    /// Without a selected category the last context id is tried, then the
    /// configured default.
    pub fn snippets(&mut self) -> Result<&[Snippet]> {
        self.populate()?;
        Ok(self.active.snippets().unwrap_or_default())
    }

    fn populate(&mut self) -> Result<()> {
        if self.active.is_populated() {
            return Ok(());
        }

        let before = self.active.category().map(str::to_string);
        let source = &self.source;
        let levels = self.levels;
        let context = self.context.as_deref();
        let fallback = self.default_category.as_deref();

        self.active.get_or_populate(|current| {
            let outline = source.read()?;
            let known = list_categories(&outline, levels.category);

            let name = match current {
                Some(name) => name,
                None => context
                    .and_then(|c| resolve_category(c, &known))
                    .or(fallback)
                    .ok_or(SnipbookError::NoCategorySelected)?,
            };
            if !known.iter().any(|k| k == name) {
                return Err(SnipbookError::CategoryNotFound {
                    name: name.to_string(),
                });
            }

            let snippets = snippets_of(&outline, name, levels);
            Ok((name.to_string(), snippets))
        })?;

        if let Some(after) = self.active.category().map(str::to_string) {
            if before.as_deref() != Some(after.as_str()) {
                self.notify_switch(&after);
            }
        }
        Ok(())
    }

    /// Insert the snippet called `name`, or ask the host to pick one.
    pub fn insert_snippet(
        &mut self,
        name: Option<&str>,
        prompt: &mut dyn Prompt,
        destination: &mut dyn Destination,
    ) -> Result<Dispatched> {
        let snippet = {
            let snippets = self.snippets()?;
            let name = match name {
                Some(name) => name.to_string(),
                None => {
                    let names: Vec<String> = snippets.iter().map(|s| s.name.clone()).collect();
                    prompt
                        .choose("Snippet", &names)
                        .ok_or(SnipbookError::Cancelled)?
                }
            };
            resolver::exact(snippets, &name)
                .cloned()
                .ok_or(SnipbookError::SnippetNotFound { name })?
        };

        self.dispatch(&snippet, destination)
    }

    /// Expand the snippet named `<word><separator>...`.
    pub fn expand_at_point(
        &mut self,
        word: &str,
        destination: &mut dyn Destination,
    ) -> Result<Dispatched> {
        let separator = self.separator.clone();
        let snippet = resolver::prefix_match(self.snippets()?, word, &separator)
            .cloned()
            .ok_or_else(|| SnipbookError::SnippetNotFound {
                name: format!("{}{}", word, separator),
            })?;

        self.dispatch(&snippet, destination)
    }

    pub fn dispatch(
        &mut self,
        snippet: &Snippet,
        destination: &mut dyn Destination,
    ) -> Result<Dispatched> {
        self.dispatcher
            .dispatch(snippet, destination)
            .map_err(|e| {
                tracing::warn!(snippet = %snippet.name, error = %e, "dispatch failed");
                e
            })
    }

    /// Source file for the host to open. The cached list is dropped since
    /// the file is about to change.
    pub fn edit_source_file(&mut self) -> Result<PathBuf> {
        let path = self
            .source
            .path()
            .map(Path::to_path_buf)
            .ok_or(SnipbookError::NoSourceFile)?;
        self.active.invalidate();
        Ok(path)
    }

    pub fn build_keybinding_table(&mut self) -> Result<KeyTable> {
        Ok(KeyTable::build(self.snippets()?))
    }

    /// Fire a binding from a table built earlier.
    pub fn fire_key(
        &mut self,
        table: &KeyTable,
        key: &str,
        destination: &mut dyn Destination,
    ) -> Result<Option<Dispatched>> {
        table.fire(key, &mut self.dispatcher, destination)
    }

    fn notify_switch(&mut self, name: &str) {
        tracing::info!(category = name, "switched category");
        for listener in &mut self.listeners {
            listener(name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snippet::IndentMode;
    use std::cell::RefCell;
    use std::fs;
    use std::rc::Rc;
    use tempfile::TempDir;

    const SOURCE: &str = "\
* Prog
** Hello
World
** for: loop
for x in xs {
}
** ping :func:
** now :results:m:
* Prose
** Hello
Dear reader
";

    #[derive(Default)]
    struct Buffer {
        text: String,
        notices: Vec<String>,
    }

    impl Destination for Buffer {
        fn insert(&mut self, text: &str, _indent: IndentMode) -> Result<()> {
            self.text.push_str(text);
            Ok(())
        }

        fn notify(&mut self, message: &str) {
            self.notices.push(message.to_string());
        }
    }

    /// Picks a fixed answer and records what it was offered.
    struct Scripted {
        answer: Option<String>,
        offered: Vec<String>,
    }

    impl Scripted {
        fn answer(answer: &str) -> Self {
            Self {
                answer: Some(answer.to_string()),
                offered: Vec::new(),
            }
        }

        fn cancel() -> Self {
            Self {
                answer: None,
                offered: Vec::new(),
            }
        }
    }

    impl Prompt for Scripted {
        fn choose(&mut self, _prompt: &str, options: &[String]) -> Option<String> {
            self.offered = options.to_vec();
            self.answer.clone()
        }
    }

    fn repo() -> SnippetRepository {
        let mut registry = CapabilityRegistry::new();
        registry.register("now", || Ok("12:00".to_string()));
        SnippetRepository::new(
            SnippetSource::Text(SOURCE.to_string()),
            &Config::default(),
            registry,
        )
    }

    #[test]
    fn test_categories() {
        assert_eq!(repo().categories().unwrap(), vec!["Prog", "Prose"]);
    }

    #[test]
    fn test_no_category_selected() {
        let mut r = repo();
        assert!(matches!(
            r.snippets(),
            Err(SnipbookError::NoCategorySelected)
        ));
        assert_eq!(r.active_category(), None);
    }

    #[test]
    fn test_insert_after_select() {
        let mut r = repo();
        r.select_category(Some("Prog"), &mut Scripted::cancel())
            .unwrap();

        let mut buf = Buffer::default();
        let out = r
            .insert_snippet(Some("Hello"), &mut Scripted::cancel(), &mut buf)
            .unwrap();
        assert_eq!(buf.text, "World");
        assert!(matches!(
            out,
            Dispatched::Inserted {
                indent: IndentMode::Reindent,
                ..
            }
        ));
    }

    #[test]
    fn test_switch_changes_served_snippets() {
        let mut r = repo();
        r.set_category("Prog");
        assert_eq!(r.snippets().unwrap().len(), 4);

        r.set_category("Prose");
        let snippets = r.snippets().unwrap();
        assert_eq!(snippets.len(), 1);
        assert_eq!(snippets[0].content.as_deref(), Some("Dear reader\n"));
    }

    #[test]
    fn test_select_unknown_category() {
        let mut r = repo();
        let result = r.select_category(Some("Nope"), &mut Scripted::cancel());
        assert!(matches!(result, Err(SnipbookError::CategoryNotFound { .. })));
        assert_eq!(r.active_category(), None);
    }

    #[test]
    fn test_select_prompts_when_name_missing() {
        let mut r = repo();
        let mut prompt = Scripted::answer("Prose");
        let name = r.select_category(None, &mut prompt).unwrap();
        assert_eq!(name, "Prose");
        assert_eq!(prompt.offered, vec!["Prog", "Prose"]);

        let result = r.select_category(None, &mut Scripted::cancel());
        assert!(matches!(result, Err(SnipbookError::Cancelled)));
        assert_eq!(r.active_category(), Some("Prose"));
    }

    #[test]
    fn test_insert_prompts_for_snippet() {
        let mut r = repo();
        r.set_category("Prog");
        let mut prompt = Scripted::answer("for: loop");
        let mut buf = Buffer::default();
        r.insert_snippet(None, &mut prompt, &mut buf).unwrap();
        assert_eq!(buf.text, "for x in xs {\n}");
        assert_eq!(prompt.offered, vec!["Hello", "for: loop", "ping", "now"]);
    }

    #[test]
    fn test_insert_missing_snippet() {
        let mut r = repo();
        r.set_category("Prog");
        let mut buf = Buffer::default();
        let result = r.insert_snippet(Some("Nope"), &mut Scripted::cancel(), &mut buf);
        assert!(matches!(result, Err(SnipbookError::SnippetNotFound { .. })));
    }

    #[test]
    fn test_expand_at_point() {
        let mut r = repo();
        r.set_category("Prog");
        let mut buf = Buffer::default();
        r.expand_at_point("for", &mut buf).unwrap();
        assert_eq!(buf.text, "for x in xs {\n}");

        let result = r.expand_at_point("while", &mut buf);
        assert!(matches!(result, Err(SnipbookError::SnippetNotFound { .. })));
    }

    #[test]
    fn test_func_failure_keeps_cache() {
        let mut r = repo();
        r.set_category("Prog");
        let mut buf = Buffer::default();
        let result = r.insert_snippet(Some("ping"), &mut Scripted::cancel(), &mut buf);
        assert!(matches!(result, Err(SnipbookError::FunctionNotFound { .. })));
        assert_eq!(r.active_category(), Some("Prog"));
        assert_eq!(r.snippets().unwrap().len(), 4);
    }

    #[test]
    fn test_results_snippet_and_keys() {
        let mut r = repo();
        r.set_category("Prog");
        let table = r.build_keybinding_table().unwrap();
        assert_eq!(table.len(), 1);

        r.set_category("Prose");
        let mut buf = Buffer::default();
        let out = r.fire_key(&table, "m", &mut buf).unwrap();
        assert_eq!(
            out,
            Some(Dispatched::InsertedResult {
                text: "12:00".to_string()
            })
        );
        assert_eq!(buf.text, "12:00");
    }

    #[test]
    fn test_context_changed() {
        let mut r = repo();
        assert_eq!(r.context_changed("rust-mode").unwrap(), None);
        assert_eq!(r.active_category(), None);

        assert_eq!(
            r.context_changed("Prose").unwrap().as_deref(),
            Some("Prose")
        );
        assert_eq!(r.active_category(), Some("Prose"));
    }

    #[test]
    fn test_lazy_selection_from_default() {
        let mut config = Config::default();
        config.category.default = Some("Prose".to_string());
        let mut r = SnippetRepository::new(
            SnippetSource::Text(SOURCE.to_string()),
            &config,
            CapabilityRegistry::new(),
        );
        assert_eq!(r.snippets().unwrap()[0].name, "Hello");
        assert_eq!(r.active_category(), Some("Prose"));
    }

    #[test]
    fn test_unknown_default_category() {
        let mut config = Config::default();
        config.category.default = Some("Gone".to_string());
        let mut r = SnippetRepository::new(
            SnippetSource::Text(SOURCE.to_string()),
            &config,
            CapabilityRegistry::new(),
        );
        assert!(matches!(
            r.snippets(),
            Err(SnipbookError::CategoryNotFound { .. })
        ));
    }

    #[test]
    fn test_switch_listeners() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut r = repo();
        let sink = seen.clone();
        r.on_switch(move |name| sink.borrow_mut().push(name.to_string()));

        r.set_category("Prog");
        r.set_category("Prog");
        r.set_category("Prose");
        assert_eq!(*seen.borrow(), vec!["Prog", "Prog", "Prose"]);

        r.snippets().unwrap();
        assert_eq!(seen.borrow().len(), 3);
    }

    #[test]
    fn test_edit_source_file_invalidates() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("snippets.org");
        fs::write(&path, "* Prog\n** Hello\nWorld\n").unwrap();

        let mut r =
            SnippetRepository::open(temp.path(), &Config::default(), CapabilityRegistry::new())
                .unwrap();
        r.set_category("Prog");
        assert_eq!(r.snippets().unwrap().len(), 1);

        let edited = r.edit_source_file().unwrap();
        assert_eq!(edited, path);
        fs::write(&path, "* Prog\n** Hello\nWorld\n** Bye\nCiao\n").unwrap();

        assert_eq!(r.snippets().unwrap().len(), 2);
        assert_eq!(r.active_category(), Some("Prog"));
    }

    #[test]
    fn test_edit_in_memory_source() {
        let mut r = repo();
        assert!(matches!(
            r.edit_source_file(),
            Err(SnipbookError::NoSourceFile)
        ));
    }
}
