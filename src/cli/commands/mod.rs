//! Command implementations

mod cache;
mod config;
mod gemfiles;
mod gems;

pub use cache::execute as cache;
pub use config::execute as config;
pub use gemfiles::execute as gemfiles;
pub use gems::execute as gems;

use crate::cache::ComposeCache;
use crate::config::Config;
use crate::definition::create_loader;
use crate::error::{ComposeError, ComposeResult};
use crate::orchestration::{prepare, BundleRunner, ComposeRequest};
use crate::paths::relative_display;
use crate::project::Project;
use crate::ui::{self, TaskSpinner, UiContext};
use std::path::PathBuf;

fn current_dir() -> ComposeResult<PathBuf> {
    std::env::current_dir().map_err(|e| ComposeError::io("getting current directory", e))
}

/// Project and cache for the working directory
fn open_project(config: &Config) -> ComposeResult<(Project, ComposeCache)> {
    let project = Project::discover(&current_dir()?)?;
    let cache = ComposeCache::new(project.cache_dir(config.cache.dir.as_deref()));
    Ok((project, cache))
}

/// Bring the cache entry for `request` up to date, then hand over to
/// `bundle exec` and return its exit code
async fn compose_and_exec(
    project: &Project,
    cache: &ComposeCache,
    request: ComposeRequest,
    command: &str,
    args: &[String],
    config: &Config,
    ctx: &UiContext,
) -> ComposeResult<i32> {
    let loader = create_loader(config);

    let mut spinner = TaskSpinner::new(ctx);
    spinner.start(&format!("Composing {}...", request.slug()));
    let prepared = match prepare(project, cache, loader.as_ref(), &request).await {
        Ok(prepared) => prepared,
        Err(e) => {
            spinner.stop_error("Composition failed");
            return Err(e);
        }
    };

    let shown = relative_display(&prepared.entry.gemfile, &project.root);
    if prepared.reused {
        spinner.clear();
        ui::step_info(ctx, &format!("Using {}", shown));
    } else {
        spinner.stop(&format!("Composed {}", shown));
    }

    BundleRunner::new(&config.exec)
        .exec(
            &prepared.entry.gemfile,
            prepared.bundler_version.as_deref(),
            command,
            args,
        )
        .await
}
