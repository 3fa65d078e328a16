//! Compose cache
//!
//! Composed gemfiles are keyed by the requested identifiers and validated
//! against a fingerprint of the base lockfile. A composed gemfile is reused
//! only while its first line matches the current fingerprint; otherwise it
//! is regenerated wholesale and the lockfile copy is refreshed.
//!
//! # Entry States
//!
//! | State | Description |
//! |-------|-------------|
//! | Missing | No composed gemfile yet |
//! | Stale | Fingerprint differs (base lockfile changed or moved) |
//! | Fresh | Fingerprint matches, reused as is |

pub mod fingerprint;
pub mod gate;
pub mod store;

pub use fingerprint::Fingerprint;
pub use gate::is_fresh;
pub use store::{slug, CacheEntry, ComposeCache, GEMFILES_SLUG_PREFIX};
