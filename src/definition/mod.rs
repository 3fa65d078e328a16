//! Base bundle definitions
//!
//! A [`Definition`] can come from Bundler itself (accurate, needs Ruby) or
//! straight from the lockfile (no Ruby, loses gemfile-only details such as
//! groups). The loader is picked by `definition.loader` in the config.

pub mod bundler;
pub mod lockfile;

pub use bundler::BundlerLoader;
pub use lockfile::LockfileLoader;

use crate::config::{Config, LoaderKind};
use crate::error::ComposeResult;
use crate::manifest::Definition;
use crate::project::Project;
use async_trait::async_trait;

/// Source of the resolved base bundle
#[async_trait]
pub trait DefinitionLoader: Send + Sync {
    /// Load the definition for `project`'s gemfile and lockfile
    async fn load(&self, project: &Project) -> ComposeResult<Definition>;

    /// Human-readable loader name for logs
    fn loader_name(&self) -> &'static str;
}

/// Create the loader selected in `config`
pub fn create_loader(config: &Config) -> Box<dyn DefinitionLoader> {
    match config.definition.loader {
        LoaderKind::Bundler => Box::new(BundlerLoader::new(config.exec.ruby_command.clone())),
        LoaderKind::Lockfile => Box::new(LockfileLoader),
    }
}
