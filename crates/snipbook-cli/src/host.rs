//! Terminal implementations of the host collaborators.

use std::io::{self, BufRead, Write};
use std::process::{Command, Stdio};

use colored::Colorize;

use snipbook_core::{
    BlockRunner, CapabilityRegistry, CapabilityResult, Destination, ExecutableBlock, IndentMode,
    Prompt, Result,
};

/// Writes inserted text to stdout.
pub struct StdoutDestination {
    depth: Option<usize>,
}

impl StdoutDestination {
    pub fn new(depth: Option<usize>) -> Self {
        Self { depth }
    }
}

impl Destination for StdoutDestination {
    fn depth(&self) -> Option<usize> {
        self.depth
    }

    fn insert(&mut self, text: &str, indent: IndentMode) -> Result<()> {
        tracing::debug!(?indent, "inserting to stdout");
        let mut out = io::stdout().lock();
        writeln!(out, "{}", text)?;
        out.flush()?;
        Ok(())
    }

    fn notify(&mut self, message: &str) {
        eprintln!("{} {}", "[NOTE]".yellow().bold(), message);
    }
}

/// Numbered menu on stderr, answer read from stdin.
pub struct StdinPrompt;

impl Prompt for StdinPrompt {
    fn choose(&mut self, prompt: &str, options: &[String]) -> Option<String> {
        if options.is_empty() {
            eprintln!("{} nothing to choose from", "[NOTE]".yellow().bold());
            return None;
        }

        eprintln!();
        for (i, option) in options.iter().enumerate() {
            eprintln!("  {}. {}", (i + 1).to_string().bold(), option.cyan());
        }
        eprintln!();
        eprint!("{} (number or name, empty to cancel): ", prompt);
        io::stderr().flush().ok()?;

        let mut input = String::new();
        io::stdin().lock().read_line(&mut input).ok()?;
        pick(input.trim(), options)
    }
}

fn pick(answer: &str, options: &[String]) -> Option<String> {
    if answer.is_empty() {
        return None;
    }
    if let Ok(n) = answer.parse::<usize>() {
        return n.checked_sub(1).and_then(|i| options.get(i)).cloned();
    }
    options.iter().find(|o| o.as_str() == answer).cloned()
}

/// Runs source blocks through a shell, returning trimmed stdout.
pub struct ShellRunner {
    shell: &'static str,
}

impl ShellRunner {
    pub fn new(shell: &'static str) -> Self {
        Self { shell }
    }
}

impl BlockRunner for ShellRunner {
    fn run(&self, block: &ExecutableBlock) -> CapabilityResult {
        let output = Command::new(self.shell)
            .arg("-c")
            .arg(&block.code)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| format!("failed to spawn {}: {}", self.shell, e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(format!("{} exited with error: {}", self.shell, stderr.trim()));
        }

        Ok(String::from_utf8_lossy(&output.stdout)
            .trim_end_matches('\n')
            .to_string())
    }
}

/// Functions available to `func`/`results` snippets from the terminal.
pub fn builtin_registry() -> CapabilityRegistry {
    let mut registry = CapabilityRegistry::new();
    registry.register("date", || {
        Ok(chrono::Local::now().format("%Y-%m-%d").to_string())
    });
    registry.register("time", || Ok(chrono::Local::now().format("%H:%M").to_string()));
    registry.register("timestamp", || Ok(chrono::Local::now().to_rfc3339()));
    registry.register("cwd", || {
        std::env::current_dir()
            .map(|p| p.display().to_string())
            .map_err(|e| e.to_string())
    });
    registry.register("home", || {
        dirs::home_dir()
            .map(|p| p.display().to_string())
            .ok_or_else(|| "home directory not found".to_string())
    });

    registry.register_runner("sh", ShellRunner::new("sh"));
    registry.register_runner("shell", ShellRunner::new("sh"));
    registry.register_runner("bash", ShellRunner::new("bash"));
    registry
}
