//! Configuration schema for bundler-compose
//!
//! Configuration is stored at `~/.config/bundler-compose/config.toml`

use crate::error::{ComposeError, ComposeResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Keys accepted by [`Config::set`]
pub const SETTABLE_KEYS: &[&str] = &[
    "general.verbose",
    "general.log_format",
    "cache.dir",
    "exec.bundle_command",
    "exec.ruby_command",
    "exec.auto_install",
    "exec.bundle_path",
    "definition.loader",
];

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Compose cache settings
    pub cache: CacheConfig,

    /// `bundle exec` settings
    pub exec: ExecConfig,

    /// How the base bundle is read
    pub definition: DefinitionConfig,
}

impl Config {
    /// Set a dot-separated key from its command-line text.
    /// An empty value unsets optional paths.
    pub fn set(&mut self, key: &str, value: &str) -> ComposeResult<()> {
        let invalid = |reason: String| ComposeError::InvalidConfigValue {
            key: key.to_string(),
            reason,
        };

        match key {
            "general.verbose" => {
                self.general.verbose = parse_bool(value).ok_or_else(|| invalid(bool_reason(value)))?
            }
            "general.log_format" => match value {
                "text" | "json" => self.general.log_format = value.to_string(),
                _ => return Err(invalid("expected text or json".to_string())),
            },
            "cache.dir" => self.cache.dir = optional_path(value),
            "exec.bundle_command" => self.exec.bundle_command = value.to_string(),
            "exec.ruby_command" => self.exec.ruby_command = value.to_string(),
            "exec.auto_install" => {
                self.exec.auto_install = parse_bool(value).ok_or_else(|| invalid(bool_reason(value)))?
            }
            "exec.bundle_path" => self.exec.bundle_path = optional_path(value),
            "definition.loader" => {
                self.definition.loader = match value {
                    "bundler" => LoaderKind::Bundler,
                    "lockfile" => LoaderKind::Lockfile,
                    _ => return Err(invalid("expected bundler or lockfile".to_string())),
                }
            }
            _ => {
                return Err(invalid(format!(
                    "unknown key, valid keys are {}",
                    SETTABLE_KEYS.join(", ")
                )))
            }
        }
        Ok(())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

fn bool_reason(value: &str) -> String {
    format!("invalid boolean {}, use true/false", value)
}

fn optional_path(value: &str) -> Option<PathBuf> {
    (!value.is_empty()).then(|| PathBuf::from(value))
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Enable verbose logging
    pub verbose: bool,

    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            log_format: "text".to_string(),
        }
    }
}

/// Compose cache configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache directory, relative paths resolve against the project root.
    /// Defaults to `<BUNDLE_APP_CONFIG or .bundle>/bundler-compose`.
    pub dir: Option<PathBuf>,
}

/// Command execution configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecConfig {
    /// Program invoked as `<bundle_command> exec ...`
    pub bundle_command: String,

    /// Ruby interpreter used by the bundler definition loader
    pub ruby_command: String,

    /// Let `bundle exec` install missing gems (`BUNDLE_AUTO_INSTALL`)
    pub auto_install: bool,

    /// Install path passed as `BUNDLE_PATH`
    pub bundle_path: Option<PathBuf>,
}

impl Default for ExecConfig {
    fn default() -> Self {
        Self {
            bundle_command: "bundle".to_string(),
            ruby_command: "ruby".to_string(),
            auto_install: true,
            bundle_path: None,
        }
    }
}

/// Definition loader configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DefinitionConfig {
    pub loader: LoaderKind,
}

/// Where the base definition comes from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoaderKind {
    /// Ask Bundler itself through `ruby`
    #[default]
    Bundler,
    /// Read `Gemfile.lock` directly
    Lockfile,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("[general]"));
        assert!(toml.contains("[exec]"));
        assert!(toml.contains("loader = \"bundler\""));
    }

    #[test]
    fn partial_config_uses_defaults() {
        let toml = r#"
[exec]
bundle_command = "bin/bundle"

[definition]
loader = "lockfile"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.exec.bundle_command, "bin/bundle");
        assert_eq!(config.exec.ruby_command, "ruby");
        assert!(config.exec.auto_install);
        assert_eq!(config.definition.loader, LoaderKind::Lockfile);
        assert_eq!(config.general.log_format, "text");
        assert!(config.cache.dir.is_none());
    }

    #[test]
    fn set_known_keys() {
        let mut config = Config::default();
        config.set("definition.loader", "lockfile").unwrap();
        config.set("exec.auto_install", "no").unwrap();
        config.set("exec.bundle_path", "vendor/bundle").unwrap();
        config.set("cache.dir", "/tmp/composed").unwrap();
        config.set("general.log_format", "json").unwrap();

        assert_eq!(config.definition.loader, LoaderKind::Lockfile);
        assert!(!config.exec.auto_install);
        assert_eq!(config.exec.bundle_path, Some(PathBuf::from("vendor/bundle")));
        assert_eq!(config.cache.dir, Some(PathBuf::from("/tmp/composed")));
        assert_eq!(config.general.log_format, "json");

        config.set("cache.dir", "").unwrap();
        assert!(config.cache.dir.is_none());
    }

    #[test]
    fn set_rejects_bad_input() {
        let mut config = Config::default();
        for (key, value) in [
            ("vm.name", "x"),
            ("definition.loader", "gemstash"),
            ("general.log_format", "yaml"),
            ("exec.auto_install", "maybe"),
        ] {
            match config.set(key, value) {
                Err(ComposeError::InvalidConfigValue { key: k, .. }) => assert_eq!(k, key),
                other => panic!("unexpected result {:?}", other),
            }
        }
    }

    #[test]
    fn unknown_loader_rejected() {
        let result: Result<Config, _> = toml::from_str("[definition]\nloader = \"magic\"\n");
        assert!(result.is_err());
    }
}
