//! Bundler lockfile parsing
//!
//! Reads the parts of `Gemfile.lock` that composition needs: pinned specs
//! with their sources, lock platforms, top-level dependencies and the
//! `BUNDLED WITH` version. Sections that carry nothing useful here
//! (`RUBY VERSION`, `CHECKSUMS`, `PLUGIN SOURCE`) are skipped.

use crate::error::{ComposeError, ComposeResult};
use crate::manifest::{Requirement, ResolvedPackage, Source};
use crate::paths::normalize;
use std::path::Path;
use tracing::{debug, trace};

/// A `DEPENDENCIES` entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockedDependency {
    pub name: String,
    pub requirement: Requirement,
    /// Trailing `!`: the dependency comes from a non-default source
    pub pinned: bool,
}

/// Parsed lockfile contents
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LockState {
    /// Remotes of the first `GEM` section
    pub global_sources: Vec<String>,
    pub packages: Vec<ResolvedPackage>,
    pub platforms: Vec<String>,
    pub dependencies: Vec<LockedDependency>,
    pub bundler_version: Option<String>,
}

impl LockState {
    /// Locked spec for `name`, preferring the generic `ruby` platform
    pub fn package(&self, name: &str) -> Option<&ResolvedPackage> {
        let mut matches = self.packages.iter().filter(|p| p.name == name);
        let first = matches.next()?;
        if first.platform == "ruby" {
            return Some(first);
        }
        matches.find(|p| p.platform == "ruby").or(Some(first))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Gem,
    Git,
    Path,
    Plugin,
    Platforms,
    Dependencies,
    BundledWith,
    Other,
}

impl Section {
    fn from_header(header: &str) -> Self {
        match header {
            "GEM" => Self::Gem,
            "GIT" => Self::Git,
            "PATH" => Self::Path,
            "PLUGIN SOURCE" => Self::Plugin,
            "PLATFORMS" => Self::Platforms,
            "DEPENDENCIES" => Self::Dependencies,
            "BUNDLED WITH" => Self::BundledWith,
            _ => Self::Other,
        }
    }

    fn is_source(self) -> bool {
        matches!(self, Self::Gem | Self::Git | Self::Path | Self::Plugin)
    }
}

/// Options collected from a source section before its `specs:` line
#[derive(Debug, Default)]
struct SourceOptions {
    remotes: Vec<String>,
    branch: Option<String>,
    reference: Option<String>,
    tag: Option<String>,
    submodules: bool,
    glob: Option<String>,
    kind: Option<String>,
}

impl SourceOptions {
    fn build(self, section: Section, root: &Path, line: usize) -> ComposeResult<Source> {
        match section {
            Section::Gem => Ok(Source::Registry {
                remotes: self.remotes,
            }),
            Section::Git => {
                let uri = self.remotes.into_iter().next().ok_or_else(|| {
                    ComposeError::lockfile_parse(line, "GIT section without remote")
                })?;
                Ok(Source::Git {
                    uri,
                    branch: self.branch,
                    reference: self.reference,
                    tag: self.tag,
                    submodules: self.submodules,
                    glob: self.glob,
                })
            }
            Section::Path => {
                let remote = self.remotes.into_iter().next().ok_or_else(|| {
                    ComposeError::lockfile_parse(line, "PATH section without remote")
                })?;
                Ok(Source::Path {
                    path: normalize(&root.join(remote)),
                })
            }
            // Kept so its specs stay visible; composition rejects them
            Section::Plugin => Ok(Source::Unhandled {
                description: format!(
                    "plugin source {} ({})",
                    self.remotes.first().map(String::as_str).unwrap_or("?"),
                    self.kind.as_deref().unwrap_or("unknown type")
                ),
            }),
            _ => Err(ComposeError::lockfile_parse(line, "specs outside a source section")),
        }
    }
}

/// Parse lockfile text; relative `PATH` remotes are resolved against `root`
pub fn parse(contents: &str, root: &Path) -> ComposeResult<LockState> {
    let mut state = LockState::default();
    let mut section = Section::Other;
    let mut options = SourceOptions::default();
    let mut current_source: Option<Source> = None;
    let mut seen_gem = false;

    for (index, raw) in contents.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }

        let indent = line.len() - line.trim_start_matches(' ').len();
        let text = line.trim();

        if indent == 0 {
            section = Section::from_header(text);
            options = SourceOptions::default();
            current_source = None;
            trace!("Lockfile section {:?} at line {}", section, line_no);
            continue;
        }

        match section {
            s if s.is_source() => match indent {
                2 if text == "specs:" => {
                    let source = std::mem::take(&mut options).build(section, root, line_no)?;
                    if section == Section::Gem && !seen_gem {
                        if let Source::Registry { remotes } = &source {
                            state.global_sources = remotes.clone();
                        }
                        seen_gem = true;
                    }
                    current_source = Some(source);
                }
                2 => apply_option(&mut options, text, line_no)?,
                4 => {
                    let source = current_source.clone().ok_or_else(|| {
                        ComposeError::lockfile_parse(line_no, "spec before 'specs:'")
                    })?;
                    let (name, version, platform) = parse_spec(text, line_no)?;
                    state
                        .packages
                        .push(ResolvedPackage::new(name, version, platform, source));
                }
                // spec dependencies; the resolver already flattened them
                6 => {}
                _ => {
                    return Err(ComposeError::lockfile_parse(
                        line_no,
                        format!("unexpected indentation {}", indent),
                    ))
                }
            },
            Section::Platforms => state.platforms.push(text.to_string()),
            Section::Dependencies => state.dependencies.push(parse_dependency(text, line_no)?),
            Section::BundledWith => state.bundler_version = Some(text.to_string()),
            _ => {}
        }
    }

    debug!(
        "Parsed lockfile: {} specs, {} dependencies, {} platforms",
        state.packages.len(),
        state.dependencies.len(),
        state.platforms.len()
    );
    Ok(state)
}

/// Read the raw lockfile bytes
pub async fn read(path: &Path) -> ComposeResult<Vec<u8>> {
    tokio::fs::read(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ComposeError::LockfileNotFound(path.to_path_buf())
        } else {
            ComposeError::io(format!("reading lockfile {}", path.display()), e)
        }
    })
}

/// Read and parse the lockfile at `path`
pub async fn load(path: &Path, root: &Path) -> ComposeResult<LockState> {
    let contents = read(path).await?;
    parse(&String::from_utf8_lossy(&contents), root)
}

/// The `BUNDLED WITH` version, without parsing anything else
pub fn bundler_version(contents: &str) -> Option<String> {
    contents
        .lines()
        .skip_while(|line| line.trim_end() != "BUNDLED WITH")
        .nth(1)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn apply_option(options: &mut SourceOptions, text: &str, line: usize) -> ComposeResult<()> {
    let (key, value) = text
        .split_once(':')
        .map(|(k, v)| (k.trim(), v.trim().to_string()))
        .ok_or_else(|| ComposeError::lockfile_parse(line, format!("expected 'key: value', got '{}'", text)))?;

    match key {
        "remote" => options.remotes.push(value),
        "branch" => options.branch = Some(value),
        "ref" => options.reference = Some(value),
        "tag" => options.tag = Some(value),
        "submodules" => options.submodules = value == "true",
        "glob" => options.glob = Some(value),
        "type" => options.kind = Some(value),
        // revision, ref pins and other bookkeeping
        _ => {}
    }
    Ok(())
}

/// `name (version)` or `name (version-platform)`
fn parse_spec(text: &str, line: usize) -> ComposeResult<(&str, &str, &str)> {
    let (name, rest) = text
        .split_once(" (")
        .ok_or_else(|| ComposeError::lockfile_parse(line, format!("expected 'name (version)', got '{}'", text)))?;
    let inner = rest
        .strip_suffix(')')
        .ok_or_else(|| ComposeError::lockfile_parse(line, "unterminated version"))?;

    let (version, platform) = inner.split_once('-').unwrap_or((inner, "ruby"));
    if name.is_empty() || version.is_empty() {
        return Err(ComposeError::lockfile_parse(line, format!("malformed spec '{}'", text)));
    }
    Ok((name, version, platform))
}

/// `name`, `name!`, `name (reqs)` or `name (reqs)!`
fn parse_dependency(text: &str, line: usize) -> ComposeResult<LockedDependency> {
    let (text, pinned) = match text.strip_suffix('!') {
        Some(rest) => (rest, true),
        None => (text, false),
    };

    let (name, requirement) = match text.split_once(" (") {
        Some((name, rest)) => {
            let reqs = rest
                .strip_suffix(')')
                .ok_or_else(|| ComposeError::lockfile_parse(line, "unterminated requirement"))?;
            let requirement = Requirement::parse(reqs)
                .map_err(|reason| ComposeError::lockfile_parse(line, reason))?;
            (name, requirement)
        }
        None => (text, Requirement::none()),
    };

    Ok(LockedDependency {
        name: name.to_string(),
        requirement,
        pinned,
    })
}
