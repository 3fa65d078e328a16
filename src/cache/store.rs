//! On-disk layout of composed gemfiles
//!
//! Each combination of requested gems or gemfiles gets its own directory:
//!
//! ```text
//! <cache-dir>/<slug>/gems.<slug>.rb        composed gemfile
//! <cache-dir>/<slug>/gems.<slug>.rb.lock   copy of the base lockfile
//! ```

use crate::cache::{gate, Fingerprint};
use crate::compose::ComposedManifest;
use crate::error::{ComposeError, ComposeResult};
use chrono::{DateTime, Local};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Directory/file name for a set of requested identifiers.
///
/// Identifiers keep their insertion order; `:` becomes `@` and path
/// separators become `+` so gemfile paths stay a single path component.
pub fn slug<S: AsRef<str>>(identifiers: &[S]) -> String {
    identifiers
        .iter()
        .map(|id| id.as_ref())
        .collect::<Vec<_>>()
        .join("_")
        .replace(':', "@")
        .replace(['/', '\\'], "+")
}

/// Slug prefix of gemfile compositions; gem slugs never contain `+`
pub const GEMFILES_SLUG_PREFIX: &str = "gemfiles+";

/// Root of the compose cache for one project
#[derive(Debug, Clone)]
pub struct ComposeCache {
    root: PathBuf,
}

/// One cached composition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub slug: String,
    pub dir: PathBuf,
    pub gemfile: PathBuf,
    pub lockfile: PathBuf,
}

impl ComposeCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Entry paths for `slug` (nothing is created)
    pub fn entry(&self, slug: &str) -> CacheEntry {
        let dir = self.root.join(slug);
        let gemfile = dir.join(format!("gems.{}.rb", slug));
        let lockfile = dir.join(format!("gems.{}.rb.lock", slug));
        CacheEntry {
            slug: slug.to_string(),
            dir,
            gemfile,
            lockfile,
        }
    }

    /// Every entry that has a composed gemfile, sorted by slug
    pub async fn list(&self) -> ComposeResult<Vec<CacheEntry>> {
        let mut dir = match tokio::fs::read_dir(&self.root).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(ComposeError::io(
                    format!("reading compose cache {}", self.root.display()),
                    e,
                ))
            }
        };

        let mut entries = Vec::new();
        while let Some(item) = dir
            .next_entry()
            .await
            .map_err(|e| ComposeError::io("reading compose cache entry", e))?
        {
            let Some(slug) = item.file_name().to_str().map(str::to_string) else {
                continue;
            };
            let entry = self.entry(&slug);
            if tokio::fs::try_exists(&entry.gemfile).await.unwrap_or(false) {
                entries.push(entry);
            }
        }

        entries.sort_by(|a, b| a.slug.cmp(&b.slug));
        Ok(entries)
    }

    /// Remove one entry
    pub async fn remove(&self, slug: &str) -> ComposeResult<()> {
        // Slugs are single path components
        if slug.is_empty() || slug == "." || slug == ".." || slug.contains(['/', '\\']) {
            return Err(ComposeError::CacheEntryNotFound(slug.to_string()));
        }
        let entry = self.entry(slug);
        match tokio::fs::remove_dir_all(&entry.dir).await {
            Ok(()) => {
                info!("Removed compose cache entry {}", slug);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(ComposeError::CacheEntryNotFound(slug.to_string()))
            }
            Err(e) => Err(ComposeError::io(
                format!("removing {}", entry.dir.display()),
                e,
            )),
        }
    }

    /// Remove every entry, returning how many were removed
    pub async fn clear(&self) -> ComposeResult<usize> {
        let entries = self.list().await?;
        for entry in &entries {
            self.remove(&entry.slug).await?;
        }
        Ok(entries.len())
    }
}

impl CacheEntry {
    /// Whether the composed gemfile starts with `fingerprint`
    pub fn is_fresh(&self, fingerprint: &Fingerprint) -> ComposeResult<bool> {
        gate::is_fresh(fingerprint, &self.gemfile)
    }

    /// Atomically replace the composed gemfile
    pub async fn write_manifest(&self, manifest: &ComposedManifest) -> ComposeResult<()> {
        self.write_atomic(&self.gemfile, manifest.as_str().as_bytes().to_vec())
            .await?;
        debug!("Wrote {}", self.gemfile.display());
        Ok(())
    }

    /// Store the base lockfile bytes next to the composed gemfile, verbatim
    pub async fn write_lockfile(&self, lock_contents: &[u8]) -> ComposeResult<()> {
        self.write_atomic(&self.lockfile, lock_contents.to_vec())
            .await?;
        debug!("Wrote {}", self.lockfile.display());
        Ok(())
    }

    async fn write_atomic(&self, target: &Path, contents: Vec<u8>) -> ComposeResult<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| ComposeError::io(format!("creating {}", self.dir.display()), e))?;

        let dir = self.dir.clone();
        let target = target.to_path_buf();

        tokio::task::spawn_blocking(move || -> ComposeResult<()> {
            let mut tmp = tempfile::NamedTempFile::new_in(&dir)
                .map_err(|e| ComposeError::io(format!("creating temp file in {}", dir.display()), e))?;
            tmp.write_all(&contents)
                .map_err(|e| ComposeError::io(format!("writing {}", target.display()), e))?;
            tmp.persist(&target).map_err(|e| {
                ComposeError::io(format!("replacing {}", target.display()), e.error)
            })?;
            Ok(())
        })
        .await
        .map_err(|e| ComposeError::Internal(format!("cache writer panicked: {}", e)))?
    }

    /// Last modification time of the composed gemfile
    pub async fn modified(&self) -> Option<DateTime<Local>> {
        let metadata = tokio::fs::metadata(&self.gemfile).await.ok()?;
        metadata.modified().ok().map(DateTime::<Local>::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn slug_keeps_insertion_order() {
        assert_eq!(slug(&["rails", "rack-obama:1"]), "rails_rack-obama@1");
        assert_eq!(slug(&["rack-obama:1", "rails"]), "rack-obama@1_rails");
    }

    #[test]
    fn slug_flattens_paths() {
        assert_eq!(slug(&["extra/gems.rb"]), "extra+gems.rb");
    }

    #[test]
    fn entry_layout() {
        let cache = ComposeCache::new("/app/.bundle/bundler-compose");
        let entry = cache.entry("rake");
        assert_eq!(entry.dir, PathBuf::from("/app/.bundle/bundler-compose/rake"));
        assert_eq!(
            entry.gemfile,
            PathBuf::from("/app/.bundle/bundler-compose/rake/gems.rake.rb")
        );
        assert_eq!(
            entry.lockfile,
            PathBuf::from("/app/.bundle/bundler-compose/rake/gems.rake.rb.lock")
        );
    }

    #[tokio::test]
    async fn write_copy_list_and_clear() {
        let dir = TempDir::new().unwrap();
        let base_lock = dir.path().join("Gemfile.lock");
        std::fs::write(&base_lock, "GEM\n  specs:\n").unwrap();

        let cache = ComposeCache::new(dir.path().join("cache"));
        assert!(cache.list().await.unwrap().is_empty());

        let fp = Fingerprint::new("../../Gemfile", b"GEM\n  specs:\n");
        let entry = cache.entry("rake");
        assert!(!entry.is_fresh(&fp).unwrap());

        let manifest = crate::compose::compose(crate::compose::ComposeInput {
            fingerprint: &fp,
            definition: &Default::default(),
            implicit: &[],
            gems: &[],
            gemfiles: &[],
            manifest_dir: &entry.dir,
        })
        .unwrap();
        entry
            .write_lockfile(&std::fs::read(&base_lock).unwrap())
            .await
            .unwrap();
        entry.write_manifest(&manifest).await.unwrap();

        assert!(entry.is_fresh(&fp).unwrap());
        assert_eq!(
            std::fs::read(&entry.lockfile).unwrap(),
            std::fs::read(&base_lock).unwrap()
        );
        assert!(entry.modified().await.is_some());

        let listed = cache.list().await.unwrap();
        assert_eq!(listed, vec![entry.clone()]);

        assert_eq!(cache.clear().await.unwrap(), 1);
        assert!(!entry.dir.exists());
    }

    #[tokio::test]
    async fn remove_missing_entry() {
        let dir = TempDir::new().unwrap();
        let cache = ComposeCache::new(dir.path());
        let err = cache.remove("nope").await.unwrap_err();
        assert!(matches!(err, ComposeError::CacheEntryNotFound(_)));

        let err = cache.remove("..").await.unwrap_err();
        assert!(matches!(err, ComposeError::CacheEntryNotFound(_)));
        assert!(dir.path().exists());
    }

    #[tokio::test]
    async fn list_skips_directories_without_gemfile() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("stray")).unwrap();
        let cache = ComposeCache::new(dir.path());
        assert!(cache.list().await.unwrap().is_empty());
    }
}
