//! Snippet dispatch.
//!
//! A snippet either inserts its text, calls a function, or calls a function
//! and inserts what it returned. Functions are looked up in a
//! [`CapabilityRegistry`] supplied by the host; a snippet whose body is a
//! single `#+begin_src` block runs that block instead.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Result, SnipbookError};
use crate::snippet::{IndentMode, Snippet, SnippetKind};
use crate::transform::{transform, TransformContext};

static BLOCK_BEGIN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[ \t]*#\+begin_src[ \t]+(\S+)(.*)$").expect("valid block regex")
});
static BLOCK_END: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^[ \t]*#\+end_src[ \t]*$").expect("valid block regex"));

// ============================================================================
// Host collaborators
// ============================================================================

/// Where snippet text ends up (an editor buffer, stdout, ...).
pub trait Destination {
    /// Outline depth at the insertion point, if the destination has one.
    fn depth(&self) -> Option<usize> {
        None
    }

    fn insert(&mut self, text: &str, indent: IndentMode) -> Result<()>;

    /// Show a non-fatal message to the user.
    fn notify(&mut self, message: &str);
}

/// Optional templating engine that takes over plain-text insertion.
pub trait TemplateEngine {
    fn expand(&mut self, text: &str, indent: IndentMode) -> Result<()>;
}

/// Outcome of a capability or block run; the error is a message for the user.
pub type CapabilityResult = std::result::Result<String, String>;

/// A zero-argument function a `func`/`results` snippet can name.
pub trait Capability {
    fn call(&self) -> CapabilityResult;
}

impl<F> Capability for F
where
    F: Fn() -> CapabilityResult,
{
    fn call(&self) -> CapabilityResult {
        self()
    }
}

/// Executes source blocks of one language.
pub trait BlockRunner {
    fn run(&self, block: &ExecutableBlock) -> CapabilityResult;
}

// ============================================================================
// Executable blocks
// ============================================================================

/// A `#+begin_src <language> ... #+end_src` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutableBlock {
    pub language: String,
    /// Header arguments after the language, trimmed
    pub arguments: String,
    pub code: String,
}

impl ExecutableBlock {
    /// Recognize `content` as exactly one block, surrounding blank lines allowed.
    pub fn parse(content: &str) -> Option<Self> {
        let lines: Vec<&str> = content.lines().collect();
        let first = lines.iter().position(|l| !l.trim().is_empty())?;
        let last = lines.iter().rposition(|l| !l.trim().is_empty())?;
        if first >= last {
            return None;
        }

        let caps = BLOCK_BEGIN.captures(lines[first])?;
        if !BLOCK_END.is_match(lines[last]) {
            return None;
        }

        let inner = &lines[first + 1..last];
        if inner
            .iter()
            .any(|l| BLOCK_BEGIN.is_match(l) || BLOCK_END.is_match(l))
        {
            return None;
        }

        let mut code = inner.join("\n");
        if !code.is_empty() {
            code.push('\n');
        }

        Some(Self {
            language: caps.get(1).map_or("", |m| m.as_str()).to_string(),
            arguments: caps.get(2).map_or("", |m| m.as_str()).trim().to_string(),
            code,
        })
    }
}

// ============================================================================
// Registry
// ============================================================================

/// Name to capability mapping injected by the host.
#[derive(Default)]
pub struct CapabilityRegistry {
    functions: HashMap<String, Box<dyn Capability>>,
    runners: HashMap<String, Box<dyn BlockRunner>>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, name: impl Into<String>, function: F)
    where
        F: Fn() -> CapabilityResult + 'static,
    {
        self.register_capability(name, function);
    }

    pub fn register_capability(
        &mut self,
        name: impl Into<String>,
        capability: impl Capability + 'static,
    ) {
        self.functions.insert(name.into(), Box::new(capability));
    }

    /// Languages are matched case-insensitively.
    pub fn register_runner(&mut self, language: &str, runner: impl BlockRunner + 'static) {
        self.runners
            .insert(language.to_lowercase(), Box::new(runner));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Registered function names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    fn function(&self, name: &str) -> Option<&dyn Capability> {
        self.functions.get(name).map(|c| c.as_ref())
    }

    fn runner(&self, language: &str) -> Option<&dyn BlockRunner> {
        self.runners
            .get(&language.to_lowercase())
            .map(|r| r.as_ref())
    }
}

// ============================================================================
// Dispatcher
// ============================================================================

/// What a dispatch did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatched {
    /// Text handed to the destination
    Inserted { text: String, indent: IndentMode },
    /// Text handed to the template engine
    Expanded { text: String, indent: IndentMode },
    /// Function ran, result discarded
    Invoked,
    /// Function ran, result inserted
    InsertedResult { text: String },
    /// Plain-text snippet without text; only a notice was shown
    EmptyBody,
}

pub struct SnippetDispatcher {
    registry: CapabilityRegistry,
    template: Option<Box<dyn TemplateEngine>>,
    respect_depth: bool,
}

impl SnippetDispatcher {
    pub fn new(registry: CapabilityRegistry) -> Self {
        Self {
            registry,
            template: None,
            respect_depth: true,
        }
    }

    pub fn with_template_engine(mut self, engine: impl TemplateEngine + 'static) -> Self {
        self.template = Some(Box::new(engine));
        self
    }

    pub fn respect_depth(mut self, respect: bool) -> Self {
        self.respect_depth = respect;
        self
    }

    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut CapabilityRegistry {
        &mut self.registry
    }

    pub fn dispatch(
        &mut self,
        snippet: &Snippet,
        destination: &mut dyn Destination,
    ) -> Result<Dispatched> {
        let kind = snippet.kind();
        tracing::debug!(snippet = %snippet.name, ?kind, "dispatching snippet");

        match kind {
            SnippetKind::FunctionCall => {
                self.invoke(snippet)?;
                Ok(Dispatched::Invoked)
            }
            SnippetKind::FunctionCallWithInsertedResult => {
                let text = self.invoke(snippet)?;
                destination.insert(&text, IndentMode::None)?;
                Ok(Dispatched::InsertedResult { text })
            }
            SnippetKind::PlainText => self.insert_text(snippet, destination),
        }
    }

    fn insert_text(
        &mut self,
        snippet: &Snippet,
        destination: &mut dyn Destination,
    ) -> Result<Dispatched> {
        let Some(body) = snippet.content.as_deref() else {
            destination.notify(&format!("Snippet '{}' has no text", snippet.name));
            return Ok(Dispatched::EmptyBody);
        };

        let ctx = TransformContext {
            depth: destination.depth(),
            respect_depth: self.respect_depth,
            template_active: self.template.is_some(),
        };
        let out = transform(body, snippet, &ctx);

        match self.template.as_mut() {
            Some(engine) => {
                engine.expand(&out.text, out.indent)?;
                Ok(Dispatched::Expanded {
                    text: out.text,
                    indent: out.indent,
                })
            }
            None => {
                destination.insert(&out.text, out.indent)?;
                Ok(Dispatched::Inserted {
                    text: out.text,
                    indent: out.indent,
                })
            }
        }
    }

    /// Run the snippet's block if it has content, otherwise its named function.
    fn invoke(&self, snippet: &Snippet) -> Result<String> {
        let result = match snippet.content.as_deref() {
            Some(content) => {
                let block =
                    ExecutableBlock::parse(content).ok_or_else(|| SnipbookError::NoExecutableBlock {
                        name: snippet.name.clone(),
                    })?;
                let runner = self.registry.runner(&block.language).ok_or_else(|| {
                    SnipbookError::NoBlockRunner {
                        language: block.language.clone(),
                    }
                })?;
                runner.run(&block)
            }
            None => self
                .registry
                .function(&snippet.name)
                .ok_or_else(|| SnipbookError::FunctionNotFound {
                    name: snippet.name.clone(),
                })?
                .call(),
        };

        result.map_err(|message| SnipbookError::CapabilityFailed {
            name: snippet.name.clone(),
            message,
        })
    }
}
