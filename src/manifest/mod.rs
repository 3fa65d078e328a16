//! Dependency data model
//!
//! These types mirror what Bundler knows about a project after resolution:
//! the dependencies declared in the gemfile, the packages pinned in the
//! lockfile, and the platforms and global sources the bundle was locked for.
//! A [`Definition`] is passed explicitly to the composer instead of being
//! read from ambient host state.

pub mod requirement;
pub mod source;

pub use requirement::{is_version, Clause, Requirement};
pub use source::{suppress_credentials, Source};

use crate::error::{ComposeError, ComposeResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Bundler's implicit group
pub const DEFAULT_GROUP: &str = "default";

/// Marker group for lockfile-only packages in composed gemfiles
pub const COMPOSE_GROUP: &str = "bundler_compose";

/// Environment gate on a dependency (`env: "VAR"` or `env: {"VAR" => "value"}`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnvGate {
    Name(String),
    Values(BTreeMap<String, String>),
}

/// A named package requirement as declared in a gemfile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub name: String,

    #[serde(default)]
    pub requirement: Requirement,

    #[serde(default)]
    pub source: Option<Source>,

    #[serde(default = "default_groups")]
    pub groups: Vec<String>,

    /// DSL platform tags (`:mri`, `:jruby`, ...); empty means all
    #[serde(default)]
    pub platforms: Vec<String>,

    #[serde(default)]
    pub env: Option<EnvGate>,

    /// `require:` override; an empty list is `require: false`
    #[serde(default)]
    pub autorequire: Option<Vec<String>>,
}

fn default_groups() -> Vec<String> {
    vec![DEFAULT_GROUP.to_string()]
}

impl Dependency {
    /// Create a dependency in the default group
    pub fn new(name: impl Into<String>, requirement: Requirement) -> Self {
        Self {
            name: name.into(),
            requirement,
            source: None,
            groups: default_groups(),
            platforms: Vec::new(),
            env: None,
            autorequire: None,
        }
    }

    /// Parse a command-line gem argument: `NAME` or `NAME:REQUIREMENT`.
    ///
    /// The suffix is only treated as a requirement when it is one valid
    /// clause, so `foo:bar` stays a (strange) gem name.
    pub fn parse_argument(arg: &str) -> ComposeResult<Self> {
        let parsed = arg
            .rsplit_once(':')
            .and_then(|(name, suffix)| Clause::parse(suffix).ok().map(|clause| (name, clause)));
        let (name, requirement) = match parsed {
            Some((name, clause)) => (name, Requirement::from(clause)),
            None => (arg, Requirement::none()),
        };

        if name.trim().is_empty() {
            return Err(ComposeError::InvalidGemArgument {
                arg: arg.to_string(),
                reason: "gem name cannot be empty".to_string(),
            });
        }
        if name.chars().any(char::is_whitespace) {
            return Err(ComposeError::InvalidGemArgument {
                arg: arg.to_string(),
                reason: "gem name cannot contain whitespace".to_string(),
            });
        }
        // `+` marks gemfile cache entries, and separators would split the slug
        if name.contains(['/', '\\', '+']) {
            return Err(ComposeError::InvalidGemArgument {
                arg: arg.to_string(),
                reason: "gem name cannot contain '/', '\\' or '+'".to_string(),
            });
        }

        Ok(Self::new(name, requirement))
    }

    pub fn with_source(mut self, source: Source) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups = groups.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_platforms<I, S>(mut self, platforms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.platforms = platforms.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_env(mut self, env: EnvGate) -> Self {
        self.env = Some(env);
        self
    }

    pub fn with_autorequire<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.autorequire = Some(paths.into_iter().map(Into::into).collect());
        self
    }

    /// Sorted, de-duplicated group list used as the grouping key
    pub fn group_key(&self) -> Vec<String> {
        let mut key = self.groups.clone();
        key.sort();
        key.dedup();
        key
    }
}

/// One package as pinned by the resolver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedPackage {
    pub name: String,
    pub version: String,
    #[serde(default = "default_platform")]
    pub platform: String,
    pub source: Source,
}

fn default_platform() -> String {
    "ruby".to_string()
}

impl ResolvedPackage {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        platform: impl Into<String>,
        source: Source,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            platform: platform.into(),
            source,
        }
    }

    /// Synthesize a dependency pinned to this package, tagged with the
    /// compose marker group so it is available but not auto-activated
    pub fn to_implicit_dependency(&self) -> Dependency {
        Dependency::new(self.name.clone(), Requirement::pinned(&self.version))
            .with_source(self.source.clone())
            .with_groups([COMPOSE_GROUP])
    }
}

/// Explicit context describing a resolved bundle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Definition {
    /// Dependencies declared in the base gemfile
    pub dependencies: Vec<Dependency>,

    /// Every package pinned in the base lockfile
    pub resolved: Vec<ResolvedPackage>,

    /// Platforms found in the lockfile
    pub platforms: Vec<String>,

    /// Remotes of the global rubygems source
    pub global_sources: Vec<String>,

    /// `BUNDLED WITH` version of the base lockfile
    pub bundler_version: Option<String>,
}

impl Definition {
    /// The version the resolver pinned for `name`, if any
    pub fn pinned(&self, name: &str) -> Option<&ResolvedPackage> {
        self.resolved.iter().find(|p| p.name == name)
    }

    /// Resolved packages named neither by an explicit dependency nor by
    /// one of the `requested` additions.
    ///
    /// Platform variants of the same gem collapse to the first entry.
    pub fn implicit_packages(&self, requested: &[Dependency]) -> Vec<ResolvedPackage> {
        let explicit: HashSet<&str> = self
            .dependencies
            .iter()
            .chain(requested)
            .map(|d| d.name.as_str())
            .collect();
        let mut seen = HashSet::new();

        self.resolved
            .iter()
            .filter(|p| p.name != "bundler" && !explicit.contains(p.name.as_str()))
            .filter(|p| seen.insert(p.name.clone()))
            .cloned()
            .collect()
    }
}
