//! Bundler project discovery

use crate::error::{ComposeError, ComposeResult};
use crate::paths::normalize;
use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Gemfile names Bundler looks for, in priority order
const GEMFILE_NAMES: &[&str] = &["gems.rb", "Gemfile"];

/// Location of a base gemfile and its lockfile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub root: PathBuf,
    pub gemfile: PathBuf,
    pub lockfile: PathBuf,
}

impl Project {
    /// Find the project for `cwd`, honouring `BUNDLE_GEMFILE`
    pub fn discover(cwd: &Path) -> ComposeResult<Self> {
        match env::var_os("BUNDLE_GEMFILE").filter(|v| !v.is_empty()) {
            Some(gemfile) => {
                let gemfile = normalize(&cwd.join(gemfile));
                if !gemfile.is_file() {
                    return Err(ComposeError::GemfileNotFound(gemfile));
                }
                Ok(Self::from_gemfile(gemfile))
            }
            None => Self::search(cwd),
        }
    }

    /// Search `start` and its ancestors for a gemfile
    pub fn search(start: &Path) -> ComposeResult<Self> {
        for dir in start.ancestors() {
            for name in GEMFILE_NAMES {
                let candidate = dir.join(name);
                if candidate.is_file() {
                    debug!("Found gemfile at {}", candidate.display());
                    return Ok(Self::from_gemfile(candidate));
                }
            }
        }
        Err(ComposeError::GemfileNotFound(start.to_path_buf()))
    }

    /// Project rooted at the gemfile's directory
    pub fn from_gemfile(gemfile: PathBuf) -> Self {
        let root = gemfile
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let lockfile = lockfile_for(&gemfile);
        Self {
            root,
            gemfile,
            lockfile,
        }
    }

    /// Bundler's app config directory (`BUNDLE_APP_CONFIG` or `.bundle`)
    pub fn app_config_dir(&self) -> PathBuf {
        match env::var_os("BUNDLE_APP_CONFIG").filter(|v| !v.is_empty()) {
            Some(dir) => normalize(&self.root.join(dir)),
            None => self.root.join(".bundle"),
        }
    }

    /// Root of the compose cache; `configured` wins when set
    pub fn cache_dir(&self, configured: Option<&Path>) -> PathBuf {
        match configured {
            Some(dir) => normalize(&self.root.join(dir)),
            None => self.app_config_dir().join("bundler-compose"),
        }
    }
}

/// `gems.rb` locks to `gems.locked`; anything else to `<gemfile>.lock`
fn lockfile_for(gemfile: &Path) -> PathBuf {
    if gemfile.file_name().is_some_and(|n| n == "gems.rb") {
        return gemfile.with_file_name("gems.locked");
    }
    let mut name = gemfile.as_os_str().to_owned();
    name.push(".lock");
    PathBuf::from(name)
}
