//! Freshness probe for composed gemfiles

use crate::cache::Fingerprint;
use crate::error::{ComposeError, ComposeResult};
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;
use tracing::trace;

/// Whether the composed gemfile at `path` starts with `expected`.
///
/// Only `expected.len()` bytes are read. A missing or short file, or a
/// differing prefix, is stale. Any other read failure is returned as
/// [`ComposeError::Io`] rather than guessed at.
pub fn is_fresh(expected: &Fingerprint, path: &Path) -> ComposeResult<bool> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            trace!("No composed gemfile at {}", path.display());
            return Ok(false);
        }
        Err(e) => {
            return Err(ComposeError::io(
                format!("opening composed gemfile {}", path.display()),
                e,
            ))
        }
    };

    let mut prefix = Vec::with_capacity(expected.len());
    file.take(expected.len() as u64)
        .read_to_end(&mut prefix)
        .map_err(|e| ComposeError::io(format!("reading composed gemfile {}", path.display()), e))?;

    let fresh = prefix == expected.as_bytes();
    trace!("Composed gemfile {} fresh: {}", path.display(), fresh);
    Ok(fresh)
}
