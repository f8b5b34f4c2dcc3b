//! # Category Module
//!
//! Groups outline headings into categories and their snippets.
//!
//! A category is a heading at the configured category level; its snippets
//! are the headings at the snippet level anywhere below it.
//!
//! ## Module layout
//!
//! - `index`: category listing and snippet extraction
//! - `policy`: context identifier to category name
//! - `cache`: the active category and its snippet list
//!
//! ## Example
//!
//! ```rust
//! use snipbook_core::category::{list_categories, snippets_of, IndexLevels};
//! use snipbook_core::outline::parse;
//!
//! let outline = parse("* Prog\n** Hello\nWorld\n* Prose\n** Sign\nBye\n");
//! assert_eq!(list_categories(&outline, 1), vec!["Prog", "Prose"]);
//!
//! let snippets = snippets_of(&outline, "Prog", IndexLevels::default());
//! assert_eq!(snippets.len(), 1);
//! assert_eq!(snippets[0].name, "Hello");
//! ```

mod cache;
mod index;
mod policy;

pub use cache::ActiveCategory;
pub use index::{list_categories, snippets_of, IndexLevels};
pub use policy::resolve_category;
