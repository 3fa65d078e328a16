//! Definition built from `Gemfile.lock` alone

use crate::definition::DefinitionLoader;
use crate::error::ComposeResult;
use crate::lockfile::{self, LockState};
use crate::manifest::{Definition, Dependency, Source};
use crate::project::Project;
use async_trait::async_trait;
use tracing::debug;

/// Reads the lockfile without running Ruby.
///
/// Every `DEPENDENCIES` entry lands in the default group. Entries marked
/// `!` carry the source of their locked spec.
pub struct LockfileLoader;

#[async_trait]
impl DefinitionLoader for LockfileLoader {
    async fn load(&self, project: &Project) -> ComposeResult<Definition> {
        let state = lockfile::load(&project.lockfile, &project.root).await?;
        debug!(
            "Loaded {} dependencies from {}",
            state.dependencies.len(),
            project.lockfile.display()
        );
        Ok(definition_from_lock(state))
    }

    fn loader_name(&self) -> &'static str {
        "lockfile"
    }
}

/// Convert parsed lockfile contents into a definition
pub fn definition_from_lock(state: LockState) -> Definition {
    let dependencies = state
        .dependencies
        .iter()
        .map(|locked| {
            let dep = Dependency::new(locked.name.clone(), locked.requirement.clone());
            if !locked.pinned {
                return dep;
            }
            match state.package(&locked.name) {
                Some(package) => dep.with_source(package.source.clone()),
                None => dep.with_source(Source::Unhandled {
                    description: format!("unlocked source for {}", locked.name),
                }),
            }
        })
        .collect();

    Definition {
        dependencies,
        resolved: state.packages,
        platforms: state.platforms,
        global_sources: state.global_sources,
        bundler_version: state.bundler_version,
    }
}
