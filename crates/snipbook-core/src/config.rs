use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::category::IndexLevels;
use crate::error::{Result, SnipbookError};

const CONFIG_FILE: &str = "config.toml";
const DEFAULT_SOURCE_FILE: &str = "snippets.org";

/// Default config template with rich comments
const DEFAULT_CONFIG_TEMPLATE: &str = r#"# snipbook configuration file
# Location: ~/.snipbook/config.toml

[outline]
# Snippet source file (org-style outline)
# Default: <base dir>/snippets.org
# Example: source = "~/notes/snippets.org"

# Heading level of categories and snippets
category_level = 1
snippet_level = 2

[expand]
# Turn a leading "\*" in snippet text into as many stars as the
# insertion point is deep
respect_context_depth = true

# Separator between the expansion word and the rest of a snippet name
# ("for: loop" is expanded from "for")
separator = ":"

[category]
# Category used when none is selected and no context matches
# Example: default = "Prog"
"#;

/// Global configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub outline: OutlineConfig,

    #[serde(default)]
    pub expand: ExpandConfig,

    #[serde(default)]
    pub category: CategoryConfig,
}

/// Where snippets come from and which headings count
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutlineConfig {
    /// Outline file; `~` is expanded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(default = "default_category_level")]
    pub category_level: usize,

    #[serde(default = "default_snippet_level")]
    pub snippet_level: usize,
}

fn default_category_level() -> usize {
    1
}

fn default_snippet_level() -> usize {
    2
}

impl Default for OutlineConfig {
    fn default() -> Self {
        Self {
            source: None,
            category_level: default_category_level(),
            snippet_level: default_snippet_level(),
        }
    }
}

/// Expansion behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpandConfig {
    #[serde(default = "default_true")]
    pub respect_context_depth: bool,

    #[serde(default = "default_separator")]
    pub separator: String,
}

fn default_true() -> bool {
    true
}

fn default_separator() -> String {
    ":".to_string()
}

impl Default for ExpandConfig {
    fn default() -> Self {
        Self {
            respect_context_depth: true,
            separator: default_separator(),
        }
    }
}

/// Category selection fallback
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CategoryConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

impl Config {
    /// Load config from base directory
    pub fn load(base_dir: &Path) -> Result<Self> {
        let path = base_dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&content).map_err(|e| SnipbookError::ConfigParse {
            path: path.clone(),
            message: e.to_string(),
        })?;

        if config.outline.category_level == 0 {
            return Err(SnipbookError::InvalidConfigValue {
                key: "outline.category_level".to_string(),
                message: "expected a heading level >= 1, got '0'".to_string(),
            });
        }
        check_levels(config.outline.category_level, config.outline.snippet_level)?;

        Ok(config)
    }

    /// Save config to base directory
    pub fn save(&self, base_dir: &Path) -> Result<()> {
        let path = base_dir.join(CONFIG_FILE);
        fs::create_dir_all(base_dir)?;

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    /// Get config file path
    pub fn path(base_dir: &Path) -> PathBuf {
        base_dir.join(CONFIG_FILE)
    }

    /// Initialize config with default template (rich comments)
    pub fn init(base_dir: &Path) -> Result<PathBuf> {
        let path = base_dir.join(CONFIG_FILE);
        fs::create_dir_all(base_dir)?;

        if !path.exists() {
            fs::write(&path, DEFAULT_CONFIG_TEMPLATE)?;
        }

        Ok(path)
    }

    /// Resolve the outline file, relative paths against `base_dir`
    pub fn source_path(&self, base_dir: &Path) -> Result<PathBuf> {
        let Some(source) = self.outline.source.as_deref() else {
            return Ok(base_dir.join(DEFAULT_SOURCE_FILE));
        };

        let path = if source == "~" {
            dirs::home_dir().ok_or(SnipbookError::HomeNotFound)?
        } else if let Some(rest) = source.strip_prefix("~/") {
            dirs::home_dir()
                .ok_or(SnipbookError::HomeNotFound)?
                .join(rest)
        } else {
            PathBuf::from(source)
        };

        if path.is_absolute() {
            Ok(path)
        } else {
            Ok(base_dir.join(path))
        }
    }

    pub fn index_levels(&self) -> IndexLevels {
        IndexLevels {
            category: self.outline.category_level,
            snippet: self.outline.snippet_level,
        }
    }

    /// Get a config value by dot-notation key
    pub fn get(&self, key: &str) -> Option<String> {
        self.list()
            .into_iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Set a config value by dot-notation key
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "outline.source" => {
                self.outline.source = non_empty(value);
            }
            "outline.category_level" => {
                let level = parse_level(key, value)?;
                check_levels(level, self.outline.snippet_level)?;
                self.outline.category_level = level;
            }
            "outline.snippet_level" => {
                let level = parse_level(key, value)?;
                check_levels(self.outline.category_level, level)?;
                self.outline.snippet_level = level;
            }
            "expand.respect_context_depth" => {
                self.expand.respect_context_depth = parse_bool(key, value)?;
            }
            "expand.separator" => {
                self.expand.separator = value.to_string();
            }
            "category.default" => {
                self.category.default = non_empty(value);
            }
            _ => {
                return Err(SnipbookError::ConfigKeyNotFound {
                    key: key.to_string(),
                })
            }
        }
        Ok(())
    }

    /// List all config keys with their current values
    pub fn list(&self) -> Vec<(String, String)> {
        vec![
            (
                "outline.source".to_string(),
                self.outline.source.clone().unwrap_or_default(),
            ),
            (
                "outline.category_level".to_string(),
                self.outline.category_level.to_string(),
            ),
            (
                "outline.snippet_level".to_string(),
                self.outline.snippet_level.to_string(),
            ),
            (
                "expand.respect_context_depth".to_string(),
                self.expand.respect_context_depth.to_string(),
            ),
            (
                "expand.separator".to_string(),
                self.expand.separator.clone(),
            ),
            (
                "category.default".to_string(),
                self.category.default.clone().unwrap_or_default(),
            ),
        ]
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_level(key: &str, value: &str) -> Result<usize> {
    match value.trim().parse::<usize>() {
        Ok(level) if level >= 1 => Ok(level),
        _ => Err(SnipbookError::InvalidConfigValue {
            key: key.to_string(),
            message: format!("expected a heading level >= 1, got '{}'", value),
        }),
    }
}

fn check_levels(category: usize, snippet: usize) -> Result<()> {
    if snippet <= category {
        return Err(SnipbookError::InvalidConfigValue {
            key: "outline.snippet_level".to_string(),
            message: format!(
                "snippet level ({}) must be deeper than category level ({})",
                snippet, category
            ),
        });
    }
    Ok(())
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(SnipbookError::InvalidConfigValue {
            key: key.to_string(),
            message: format!("expected true or false, got '{}'", value),
        }),
    }
}
