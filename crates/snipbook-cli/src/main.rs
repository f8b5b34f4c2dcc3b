use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitCode};

use clap::{CommandFactory, Parser};
use clap_complete::generate;
use colored::Colorize;

use snipbook_core::config::Config;
use snipbook_core::resolver;
use snipbook_core::{Dispatched, Result, SnipbookError, SnippetRepository};

mod args;
use args::{Cli, Commands, ConfigAction, Shell};

mod host;
use host::{builtin_registry, StdinPrompt, StdoutDestination};

/// Written by `edit` when the snippet file does not exist yet
const SOURCE_TEMPLATE: &str = r#"#+TITLE: Snippets

* Prog
** Hello
World
** for: loop over items
for item in items {
    todo!()
}
* Org
** task :indent_nil:t:
\* TODO
** date :results:d:
** stamp :results:
#+begin_src sh
date +%s
#+end_src
"#;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let base_dir = resolve_base_dir(cli.base_dir);

    let result = match cli.command {
        Some(Commands::Config { action }) => handle_config(action, &base_dir),
        Some(Commands::Completions { shell }) => {
            handle_completions(shell);
            Ok(())
        }
        Some(command) => {
            handle_snippets(command, &base_dir, cli.category.as_deref(), cli.context.as_deref())
        }
        None => {
            Cli::command().print_help().ok();
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "[ERROR]".red().bold(), e);
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

fn init_tracing(verbose: bool, quiet: bool) {
    let default_level = if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn handle_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let shell = match shell {
        Shell::Bash => clap_complete::Shell::Bash,
        Shell::Zsh => clap_complete::Shell::Zsh,
        Shell::Fish => clap_complete::Shell::Fish,
        Shell::PowerShell => clap_complete::Shell::PowerShell,
        Shell::Elvish => clap_complete::Shell::Elvish,
    };
    generate(shell, &mut cmd, "snipbook", &mut io::stdout());
}

fn resolve_base_dir(cli_base: Option<PathBuf>) -> PathBuf {
    if let Some(base) = cli_base {
        return base;
    }

    if let Ok(base) = std::env::var("SNIPBOOK_BASE") {
        return PathBuf::from(base);
    }

    dirs::home_dir()
        .map(|h| h.join(".snipbook"))
        .unwrap_or_else(|| PathBuf::from(".snipbook"))
}

fn handle_config(action: ConfigAction, base_dir: &Path) -> Result<()> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load(base_dir)?;
            match config.get(&key) {
                Some(value) => {
                    println!("{}", value);
                }
                None => {
                    return Err(SnipbookError::ConfigKeyNotFound { key });
                }
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load(base_dir)?;
            config.set(&key, &value)?;
            config.save(base_dir)?;
            println!("{} {} = {}", "Set:".green(), key, value);
        }
        ConfigAction::List => {
            let config = Config::load(base_dir)?;
            println!();
            for (key, value) in config.list() {
                println!("{} = {}", key.cyan(), value);
            }
            println!();
        }
        ConfigAction::Path => {
            let path = Config::path(base_dir);
            println!("{}", path.display());
        }
        ConfigAction::Init => {
            let path = Config::init(base_dir)?;
            println!("{} {}", "Initialized:".green(), path.display());
        }
    }

    Ok(())
}

fn handle_snippets(
    command: Commands,
    base_dir: &Path,
    category: Option<&str>,
    context: Option<&str>,
) -> Result<()> {
    let mut config = Config::load(base_dir)?;
    let mut repo = SnippetRepository::open(base_dir, &config, builtin_registry())?;

    if let Some(context) = context {
        repo.context_changed(context)?;
    }
    if let Some(category) = category {
        repo.set_category(category);
    }

    match command {
        Commands::Categories { json } => {
            let categories = repo.categories()?;
            if json {
                println!("{}", to_json(&categories)?);
                return Ok(());
            }

            if categories.is_empty() {
                println!("No categories found.");
                println!();
                println!("Add one with: snipbook edit");
                return Ok(());
            }

            let active = repo.active_category().map(str::to_string).or(config.category.default);
            println!();
            for name in categories {
                if active.as_deref() == Some(name.as_str()) {
                    println!("  {} {}", "*".green(), name.cyan().bold());
                } else {
                    println!("    {}", name);
                }
            }
            println!();
        }
        Commands::Select { name } => {
            let name = repo.select_category(name.as_deref(), &mut StdinPrompt)?;
            config.set("category.default", &name)?;
            config.save(base_dir)?;
            println!("{} {}", "Selected:".green(), name.cyan());
        }
        Commands::Context { id } => match repo.context_changed(&id)? {
            Some(name) => {
                config.set("category.default", &name)?;
                config.save(base_dir)?;
                println!("{} {}", "Selected:".green(), name.cyan());
            }
            None => {
                println!("No category named '{}'.", id.yellow());
            }
        },
        Commands::List { json } => {
            let snippets = repo.snippets()?;
            if json {
                println!("{}", to_json(&snippets)?);
                return Ok(());
            }

            if snippets.is_empty() {
                println!("No snippets in this category.");
                return Ok(());
            }

            println!();
            for snippet in snippets {
                let tags = if snippet.tags.is_empty() {
                    String::new()
                } else {
                    format!(":{}:", snippet.tags.join(":"))
                };
                println!("  {} {}", snippet.name.cyan().bold(), tags.dimmed());
                println!("    {}", snippet.summary());
            }
            println!();
        }
        Commands::Show { name } => {
            let snippet = resolver::exact(repo.snippets()?, &name)
                .cloned()
                .ok_or(SnipbookError::SnippetNotFound { name })?;

            println!();
            println!("Snippet: {}", snippet.name.cyan().bold());
            println!("Kind: {:?}", snippet.kind());
            if !snippet.tags.is_empty() {
                println!("Tags: {}", snippet.tags.join(", "));
            }
            println!();
            match snippet.content {
                Some(content) => {
                    println!("--- Content ---");
                    print!("{}", content);
                }
                None => println!("{}", "(no text)".dimmed()),
            }
        }
        Commands::Insert { name, depth } => {
            let mut out = StdoutDestination::new(depth);
            let dispatched = repo.insert_snippet(name.as_deref(), &mut StdinPrompt, &mut out)?;
            report(&dispatched);
        }
        Commands::Expand { word, depth } => {
            let mut out = StdoutDestination::new(depth);
            let dispatched = repo.expand_at_point(&word, &mut out)?;
            report(&dispatched);
        }
        Commands::Edit => {
            let path = repo.edit_source_file()?;
            if !path.exists() {
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(&path, SOURCE_TEMPLATE)?;
                println!("{} {}", "Created:".green(), path.display());
            }

            let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vim".to_string());
            println!("Opening {} in {}...", path.display(), editor);

            Command::new(&editor)
                .arg(&path)
                .status()
                .map_err(SnipbookError::Io)?;
        }
        Commands::Keys { fire, depth } => {
            let table = repo.build_keybinding_table()?;
            match fire {
                Some(key) => {
                    let mut out = StdoutDestination::new(depth);
                    match repo.fire_key(&table, &key, &mut out)? {
                        Some(dispatched) => report(&dispatched),
                        None => {
                            return Err(SnipbookError::SnippetNotFound {
                                name: format!("key '{}'", key),
                            })
                        }
                    }
                }
                None => {
                    if table.is_empty() {
                        println!("No key bindings in this category.");
                        println!();
                        println!("Tag a snippet with a key as its last tag, e.g. ** Hello :h:");
                        return Ok(());
                    }

                    println!();
                    for (key, snippet) in table.iter() {
                        println!("  {}  {}", key.yellow().bold(), snippet.name.cyan());
                    }
                    println!();
                }
            }
        }
        Commands::Config { .. } | Commands::Completions { .. } => {}
    }

    Ok(())
}

/// Status line for the non-insertion outcomes; inserted text already went to stdout.
fn report(dispatched: &Dispatched) {
    match dispatched {
        Dispatched::Invoked => eprintln!("{}", "Done.".green()),
        Dispatched::Inserted { .. }
        | Dispatched::Expanded { .. }
        | Dispatched::InsertedResult { .. }
        | Dispatched::EmptyBody => {}
    }
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| SnipbookError::Io(io::Error::other(e)))
}
