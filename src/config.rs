//! Configuration System
//!
//! Layered editor configuration: built-in defaults, then the user's global file, then the
//! workspace file, then `FRAMETREE__*` environment variables. Tests included.

use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Indentation unit emitted per body level
    #[serde(default = "default_indent")]
    pub indent: String,

    /// Descendant count at which a deletion raises a warning
    #[serde(default = "default_large_deletion_threshold")]
    pub large_deletion_threshold: usize,

    /// Import behaviour
    #[serde(default)]
    pub import: ImportConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Importer settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Replace statements without a frame variant by a placeholder comment instead of
    /// dropping them
    #[serde(default = "default_true")]
    pub unsupported_placeholders: bool,
}

pub(crate) fn default_indent() -> String {
    crate::emit::DEFAULT_INDENT.to_string()
}

pub(crate) fn default_large_deletion_threshold() -> usize {
    3
}

fn default_true() -> bool {
    true
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            unsupported_placeholders: default_true(),
        }
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            indent: default_indent(),
            large_deletion_threshold: default_large_deletion_threshold(),
            import: ImportConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Indent(String),
    Threshold(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Indent(msg) => write!(f, "Indent: {}", msg),
            ValidationError::Threshold(msg) => write!(f, "Large deletion threshold: {}", msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl EditorConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.indent.is_empty() {
            errors.push(ValidationError::Indent("cannot be empty".to_string()));
        } else if !self.indent.chars().all(|c| c == ' ' || c == '\t') {
            errors.push(ValidationError::Indent(format!(
                "{:?} must contain only spaces or tabs",
                self.indent
            )));
        }

        if self.large_deletion_threshold == 0 {
            errors.push(ValidationError::Threshold("must be at least 1".to_string()));
        }

        if let Err(e) = self.logging.validate() {
            errors.push(ValidationError::Logging(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
