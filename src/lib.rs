//! bundler-compose - layer extra gems onto a locked Bundler project
//!
//! Renders a synthetic gemfile from an existing lock state plus requested
//! gems or gemfiles, caches it keyed by a fingerprint of the base lockfile,
//! and runs `bundle exec` against it.

pub mod cache;
pub mod cli;
pub mod compose;
pub mod config;
pub mod definition;
pub mod error;
pub mod lockfile;
pub mod manifest;
pub mod orchestration;
pub mod paths;
pub mod project;
pub mod ui;

pub use error::{ComposeError, ComposeResult};
