//! Error types for bundler-compose
//!
//! All modules use `ComposeResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for bundler-compose operations
pub type ComposeResult<T> = Result<T, ComposeError>;

/// All errors that can occur in bundler-compose
#[derive(Error, Debug)]
pub enum ComposeError {
    // Project errors
    #[error("Could not locate Gemfile or gems.rb (searched upward from {0})")]
    GemfileNotFound(PathBuf),

    #[error("Gemfile to compose not found: {0}")]
    ExtraGemfileNotFound(PathBuf),

    #[error("Lockfile not found: {0}")]
    LockfileNotFound(PathBuf),

    #[error("Failed to parse lockfile at line {line}: {reason}")]
    LockfileParse { line: usize, reason: String },

    #[error("Failed to load bundle definition: {0}")]
    DefinitionLoad(String),

    // Composition errors
    #[error("Unhandled source type {0}")]
    UnhandledSource(String),

    #[error("Invalid gem argument '{arg}': {reason}")]
    InvalidGemArgument { arg: String, reason: String },

    // Cache errors
    #[error("Compose cache entry not found: {0}")]
    CacheEntryNotFound(String),

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Invalid value for {key}: {reason}")]
    InvalidConfigValue { key: String, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Process errors
    #[error("Command failed: {command}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Process terminated by signal")]
    ProcessSignaled,

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ComposeError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a command failed error
    pub fn command_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandFailed {
            command: command.into(),
            source,
        }
    }

    /// Create a lockfile parse error for a 1-based line number
    pub fn lockfile_parse(line: usize, reason: impl Into<String>) -> Self {
        Self::LockfileParse {
            line,
            reason: reason.into(),
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::GemfileNotFound(_) => {
                Some("Run inside a Bundler project or set BUNDLE_GEMFILE")
            }
            Self::LockfileNotFound(_) => Some("Run: bundle install"),
            Self::DefinitionLoad(_) => {
                Some("Set definition.loader = \"lockfile\" to compose without Ruby")
            }
            Self::UnhandledSource(_) => {
                Some("Only rubygems, git, path and gemspec sources can be composed")
            }
            Self::CacheEntryNotFound(_) => Some("Run: bundler-compose cache list"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ComposeError::UnhandledSource("#<Bundler::Source::Metadata>".to_string());
        assert_eq!(
            err.to_string(),
            "Unhandled source type #<Bundler::Source::Metadata>"
        );
    }

    #[test]
    fn error_hint() {
        let err = ComposeError::LockfileNotFound(PathBuf::from("Gemfile.lock"));
        assert_eq!(err.hint(), Some("Run: bundle install"));
    }

    #[test]
    fn lockfile_parse_display() {
        let err = ComposeError::lockfile_parse(12, "unexpected indentation");
        assert_eq!(
            err.to_string(),
            "Failed to parse lockfile at line 12: unexpected indentation"
        );
        assert!(err.hint().is_none());
    }
}
