//! Compose-and-run orchestration
//!
//! Ties the pieces together: fingerprint the base lockfile, check the cache
//! entry, and only when it is stale load the definition, compose a new
//! gemfile, write it and copy the lockfile next to it.

pub mod runner;

pub use runner::{unbundled_env, BundleRunner};

use crate::cache::{slug, CacheEntry, ComposeCache, Fingerprint, GEMFILES_SLUG_PREFIX};
use crate::compose::{compose, ComposeInput};
use crate::definition::DefinitionLoader;
use crate::error::{ComposeError, ComposeResult};
use crate::lockfile;
use crate::manifest::Dependency;
use crate::paths::{normalize, relative_display};
use crate::project::Project;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// What to compose on top of the base bundle
#[derive(Debug, Clone, Default)]
pub struct ComposeRequest {
    /// Extra gems (`gems` subcommand)
    pub gems: Vec<Dependency>,

    /// Extra gemfiles, absolute (`gemfiles` subcommand)
    pub gemfiles: Vec<PathBuf>,

    /// Gem arguments as typed, or gemfile paths relative to the project
    /// root; used for the cache slug
    pub identifiers: Vec<String>,

    /// Regenerate even when the cache entry is fresh
    pub refresh: bool,
}

impl ComposeRequest {
    /// Request for `NAME[:REQ]` arguments
    pub fn for_gems(args: &[String]) -> ComposeResult<Self> {
        let gems = args
            .iter()
            .map(|arg| Dependency::parse_argument(arg))
            .collect::<ComposeResult<Vec<_>>>()?;
        Ok(Self {
            gems,
            identifiers: args.to_vec(),
            ..Self::default()
        })
    }

    /// Request for gemfile paths resolved against `cwd`, identified by
    /// their location relative to `project_root`
    pub fn for_gemfiles(paths: &[PathBuf], cwd: &Path, project_root: &Path) -> ComposeResult<Self> {
        let mut gemfiles = Vec::with_capacity(paths.len());
        let mut identifiers = Vec::with_capacity(paths.len());
        for path in paths {
            let absolute = normalize(&cwd.join(path));
            if !absolute.is_file() {
                return Err(ComposeError::ExtraGemfileNotFound(absolute));
            }
            identifiers.push(relative_display(&absolute, project_root));
            gemfiles.push(absolute);
        }
        Ok(Self {
            gemfiles,
            identifiers,
            ..Self::default()
        })
    }

    pub fn with_refresh(mut self, refresh: bool) -> Self {
        self.refresh = refresh;
        self
    }

    pub fn slug(&self) -> String {
        if self.gemfiles.is_empty() {
            slug(&self.identifiers)
        } else {
            format!("{}{}", GEMFILES_SLUG_PREFIX, slug(&self.identifiers))
        }
    }
}

/// A composed gemfile ready for `bundle exec`
#[derive(Debug, Clone)]
pub struct PreparedCompose {
    pub entry: CacheEntry,
    /// The cached gemfile was fresh and left untouched
    pub reused: bool,
    /// `BUNDLED WITH` of the base lockfile
    pub bundler_version: Option<String>,
}

/// Make sure the cache entry for `request` matches the current lockfile
pub async fn prepare(
    project: &Project,
    cache: &ComposeCache,
    loader: &dyn DefinitionLoader,
    request: &ComposeRequest,
) -> ComposeResult<PreparedCompose> {
    let entry = cache.entry(&request.slug());
    let lock_contents = lockfile::read(&project.lockfile).await?;
    let fingerprint = Fingerprint::for_manifest_dir(&project.gemfile, &entry.dir, &lock_contents);
    let bundler_version = lockfile::bundler_version(&String::from_utf8_lossy(&lock_contents));

    if !request.refresh && entry.is_fresh(&fingerprint)? {
        info!("Reusing composed gemfile {}", entry.gemfile.display());
        return Ok(PreparedCompose {
            entry,
            reused: true,
            bundler_version,
        });
    }

    debug!(
        "Composing {} with the {} loader",
        entry.slug,
        loader.loader_name()
    );
    let definition = loader.load(project).await?;
    let implicit = definition.implicit_packages(&request.gems);

    let manifest = compose(ComposeInput {
        fingerprint: &fingerprint,
        definition: &definition,
        implicit: &implicit,
        gems: &request.gems,
        gemfiles: &request.gemfiles,
        manifest_dir: &entry.dir,
    })?;

    // The manifest carries the fingerprint, so it is written last
    entry.write_lockfile(&lock_contents).await?;
    entry.write_manifest(&manifest).await?;
    info!("Composed {}", entry.gemfile.display());

    Ok(PreparedCompose {
        entry,
        reused: false,
        bundler_version: bundler_version.or(definition.bundler_version),
    })
}
