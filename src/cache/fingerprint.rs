//! Lockfile fingerprints
//!
//! A composed gemfile starts with `# lockfile:<relative-path>:<sha256>`,
//! naming the base gemfile relative to the composed file's directory and the
//! digest of the base lockfile bytes. Same lock bytes at the same relative
//! location give the same line; any byte change gives a different one.

use crate::paths::relative_display;
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::Path;

/// Freshness marker written as the first line of a composed gemfile
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    line: String,
}

impl Fingerprint {
    /// Build from the relative gemfile path and the raw lockfile bytes
    pub fn new(relative_gemfile: &str, lock_contents: &[u8]) -> Self {
        Self {
            line: format!("# lockfile:{}:{}", relative_gemfile, digest(lock_contents)),
        }
    }

    /// Fingerprint for a composed gemfile written to `manifest_dir`
    pub fn for_manifest_dir(gemfile: &Path, manifest_dir: &Path, lock_contents: &[u8]) -> Self {
        Self::new(&relative_display(gemfile, manifest_dir), lock_contents)
    }

    pub fn as_str(&self) -> &str {
        &self.line
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.line.as_bytes()
    }

    pub fn len(&self) -> usize {
        self.line.len()
    }

    pub fn is_empty(&self) -> bool {
        self.line.is_empty()
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.line)
    }
}

/// Full SHA-256 of `contents`, lowercase hex
fn digest(contents: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(contents);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_format() {
        let fp = Fingerprint::new("../../../Gemfile", b"");
        assert_eq!(
            fp.as_str(),
            "# lockfile:../../../Gemfile:e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn deterministic() {
        assert_eq!(
            Fingerprint::new("../Gemfile", b"GEM\n"),
            Fingerprint::new("../Gemfile", b"GEM\n")
        );
    }

    #[test]
    fn changes_with_contents_and_location() {
        let base = Fingerprint::new("../Gemfile", b"GEM\n");
        assert_ne!(base, Fingerprint::new("../Gemfile", b"GEM\n\n"));
        assert_ne!(base, Fingerprint::new("../../Gemfile", b"GEM\n"));
    }

    #[test]
    fn relative_to_manifest_dir() {
        let fp = Fingerprint::for_manifest_dir(
            Path::new("/app/Gemfile"),
            Path::new("/app/.bundle/bundler-compose/rake"),
            b"GEM\n",
        );
        assert_eq!(fp, Fingerprint::new("../../../Gemfile", b"GEM\n"));
    }
}
