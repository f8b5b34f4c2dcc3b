pub mod category;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod keys;
pub mod outline;
pub mod repository;
pub mod resolver;
pub mod snippet;
pub mod transform;

pub use config::Config;
pub use error::{Result, SnipbookError};
pub use outline::{parse, parse_bytes, HeadingNode, Outline};
pub use repository::{Prompt, SnippetRepository, SnippetSource};
pub use snippet::{is_reserved_tag, IndentMode, Snippet, SnippetKind, RESERVED_TAGS};
pub use transform::{transform, TransformContext, Transformed};

// Dispatch
pub use dispatch::{
    BlockRunner, Capability, CapabilityRegistry, CapabilityResult, Destination, Dispatched,
    ExecutableBlock, SnippetDispatcher, TemplateEngine,
};
pub use keys::KeyTable;

// Category system
pub use category::{list_categories, resolve_category, snippets_of, ActiveCategory, IndexLevels};
