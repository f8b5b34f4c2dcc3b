use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "snipbook")]
#[command(about = "Snippet repository backed by an org-style outline")]
#[command(version)]
pub struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet output (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Base directory (default: ~/.snipbook)
    #[arg(long, global = true)]
    pub base_dir: Option<PathBuf>,

    /// Use this category for this invocation only
    #[arg(short, long, global = true)]
    pub category: Option<String>,

    /// Context identifier (editor mode, project) used to pick a category
    #[arg(long, global = true)]
    pub context: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List categories in the snippet file
    Categories {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Select the active category (prompts when no name is given)
    Select {
        /// Category name
        name: Option<String>,
    },

    /// React to a context change (e.g. a mode name); selects a category with that exact name
    Context {
        /// Context identifier
        id: String,
    },

    /// List snippets of the active category
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a snippet's tags and text
    Show {
        /// Snippet name
        name: String,
    },

    /// Insert a snippet (prompts when no name is given)
    Insert {
        /// Snippet name
        name: Option<String>,

        /// Outline depth at the insertion point
        #[arg(short, long)]
        depth: Option<usize>,
    },

    /// Expand the snippet whose name starts with WORD and the separator
    Expand {
        /// Word before the cursor
        word: String,

        /// Outline depth at the insertion point
        #[arg(short, long)]
        depth: Option<usize>,
    },

    /// Open the snippet file in $EDITOR
    Edit,

    /// Show key bindings derived from snippet tags
    Keys {
        /// Fire the binding for this key
        #[arg(short, long)]
        fire: Option<String>,

        /// Outline depth at the insertion point
        #[arg(short, long)]
        depth: Option<usize>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (e.g., outline.source)
        key: String,
    },

    /// Set a config value
    Set {
        /// Config key (e.g., expand.separator)
        key: String,

        /// Value to set
        value: String,
    },

    /// List all config values
    List,

    /// Show config file path
    Path,

    /// Create config file with commented defaults
    Init,
}
