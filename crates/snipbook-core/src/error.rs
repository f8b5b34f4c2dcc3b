use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SnipbookError {
    #[error("Cannot read outline source: {message}")]
    Parse { message: String },

    #[error("Snippet not found: {name}")]
    SnippetNotFound { name: String },

    #[error("Category not found: {name}")]
    CategoryNotFound { name: String },

    #[error("No category selected - run `select` or set category.default")]
    NoCategorySelected,

    #[error("Function not registered: {name}")]
    FunctionNotFound { name: String },

    #[error("Snippet '{name}' has content but no executable block")]
    NoExecutableBlock { name: String },

    #[error("No runner registered for block language: {language}")]
    NoBlockRunner { language: String },

    #[error("Function '{name}' failed: {message}")]
    CapabilityFailed { name: String, message: String },

    #[error("Selection cancelled")]
    Cancelled,

    #[error("Snippet source is not backed by a file")]
    NoSourceFile,

    #[error("Config parse error in {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    #[error("Config key not found: {key}")]
    ConfigKeyNotFound { key: String },

    #[error("Invalid value for {key}: {message}")]
    InvalidConfigValue { key: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("Home directory not found")]
    HomeNotFound,
}

pub type Result<T> = std::result::Result<T, SnipbookError>;

impl SnipbookError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::SnippetNotFound { .. } => 2,
            Self::CategoryNotFound { .. } | Self::NoCategorySelected => 3,
            Self::FunctionNotFound { .. }
            | Self::NoExecutableBlock { .. }
            | Self::NoBlockRunner { .. } => 4,
            Self::CapabilityFailed { .. } => 5,
            Self::Parse { .. } => 6,
            Self::Cancelled => 130,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let err = SnipbookError::SnippetNotFound {
            name: "x".to_string(),
        };
        assert_eq!(err.exit_code(), 2);
        assert_eq!(SnipbookError::NoCategorySelected.exit_code(), 3);
        assert_eq!(SnipbookError::HomeNotFound.exit_code(), 1);
    }

    #[test]
    fn test_error_messages() {
        let err = SnipbookError::FunctionNotFound {
            name: "ping".to_string(),
        };
        assert_eq!(err.to_string(), "Function not registered: ping");
    }
}
