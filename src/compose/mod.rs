//! Gemfile composition
//!
//! Turns a resolved [`Definition`] plus the requested gems or gemfiles back
//! into gemfile source. The output is split into commented sections in a
//! fixed order:
//!
//! 1. the lockfile fingerprint
//! 2. platforms from the lockfile
//! 3. global sources
//! 4. composed dependencies
//! 5. composed gemfiles (`eval_gemfile`)
//! 6. original dependencies from the base gemfile
//! 7. lockfile-only packages in an optional group
//!
//! Empty sections are left out. Composition is pure: the same inputs give
//! byte-identical text regardless of input ordering.

mod render;
pub mod ruby;
pub mod section;

pub use section::ManifestSection;

use crate::cache::Fingerprint;
use crate::error::ComposeResult;
use crate::manifest::{Definition, Dependency, ResolvedPackage};
use crate::paths::relative_display;
use render::DependencyRenderer;
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Everything the composer reads
#[derive(Debug, Clone, Copy)]
pub struct ComposeInput<'a> {
    /// First line of the output
    pub fingerprint: &'a Fingerprint,

    /// Explicit dependencies, pins, platforms and global sources
    pub definition: &'a Definition,

    /// Lockfile packages to expose in the optional group
    pub implicit: &'a [ResolvedPackage],

    /// Gems added on top of the base gemfile
    pub gems: &'a [Dependency],

    /// Gemfiles evaluated on top of the base gemfile
    pub gemfiles: &'a [PathBuf],

    /// Directory the composed gemfile will be written to
    pub manifest_dir: &'a Path,
}

/// Rendered gemfile text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedManifest {
    text: String,
}

impl ComposedManifest {
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for ComposedManifest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Render the composed gemfile.
///
/// Fails with [`crate::ComposeError::UnhandledSource`] when any rendered
/// dependency has a source that cannot be written back as gemfile DSL.
pub fn compose(input: ComposeInput<'_>) -> ComposeResult<ComposedManifest> {
    let definition = input.definition;
    let renderer = DependencyRenderer::new(definition, input.manifest_dir);

    let platforms = definition
        .platforms
        .iter()
        .map(|p| format!("platform({}) {{}}", ruby::dump(p)))
        .collect();

    let sources = definition
        .global_sources
        .iter()
        .map(|s| format!("source {}", ruby::dump(s)))
        .collect();

    let gemfiles = input
        .gemfiles
        .iter()
        .map(|g| format!("eval_gemfile {}", ruby::dump(&gemfile_path(g, input.manifest_dir))))
        .collect();

    let sections = [
        ManifestSection::new("Platforms found in the lockfile", platforms),
        ManifestSection::new("Global sources from gemfile", sources),
        ManifestSection::new("Composed dependencies", renderer.render(input.gems)?),
        ManifestSection::new("", gemfiles),
        ManifestSection::new(
            "Original deps from gemfile",
            renderer.render(&definition.dependencies)?,
        ),
        ManifestSection::new(
            "Deps from Gemfile.lock",
            renderer.render(&implicit_dependencies(definition, input.implicit))?,
        ),
    ];

    let mut parts = vec![input.fingerprint.to_string()];
    parts.extend(sections.iter().filter_map(ManifestSection::render));

    let mut text = parts.join("\n\n");
    text.push('\n');

    debug!(
        "Composed gemfile: {} sections, {} bytes",
        parts.len() - 1,
        text.len()
    );
    Ok(ComposedManifest { text })
}

/// Pinned, marker-grouped dependencies for packages the base gemfile does
/// not name itself
fn implicit_dependencies(definition: &Definition, implicit: &[ResolvedPackage]) -> Vec<Dependency> {
    let mut seen: HashSet<&str> = definition
        .dependencies
        .iter()
        .map(|d| d.name.as_str())
        .collect();

    implicit
        .iter()
        .filter(|p| seen.insert(p.name.as_str()))
        .map(ResolvedPackage::to_implicit_dependency)
        .collect()
}

fn gemfile_path(path: &Path, manifest_dir: &Path) -> String {
    if path.is_absolute() {
        relative_display(path, manifest_dir)
    } else {
        path.to_string_lossy().replace('\\', "/")
    }
}
