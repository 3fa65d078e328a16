//! Lexical path helpers
//!
//! Generated gemfiles refer back to project files with paths relative to the
//! cache entry directory, so everything here works on path components only
//! and never touches the file system.

use std::path::{Component, Path, PathBuf};

/// Resolve `.` and `..` components without consulting the file system
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = matches!(
                    out.components().next_back(),
                    Some(Component::Normal(_))
                ) && out.pop();
                if !popped && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }

    out
}

/// Express `path` relative to `base`, using `/` separators.
///
/// Falls back to the normalized `path` when no relative form exists
/// (e.g. different Windows drive prefixes).
pub fn relative_display(path: &Path, base: &Path) -> String {
    let path = normalize(path);
    let base = normalize(base);

    let relative = pathdiff::diff_paths(&path, &base).unwrap_or(path);
    let rendered = to_slash(&relative);

    if rendered.is_empty() {
        ".".to_string()
    } else {
        rendered
    }
}

fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
        .replacen("//", "/", 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_parent_dirs() {
        assert_eq!(
            normalize(Path::new("/app/vendor/../lib/./foo")),
            PathBuf::from("/app/lib/foo")
        );
    }

    #[test]
    fn normalize_keeps_leading_parent_on_relative_paths() {
        assert_eq!(
            normalize(Path::new("../../gems.rb")),
            PathBuf::from("../../gems.rb")
        );
    }

    #[test]
    fn relative_display_walks_up_from_cache_entry() {
        let rel = relative_display(
            Path::new("/app/Gemfile"),
            Path::new("/app/.bundle/bundler-compose/rails"),
        );
        assert_eq!(rel, "../../../Gemfile");
    }

    #[test]
    fn relative_display_of_same_dir_is_dot() {
        assert_eq!(relative_display(Path::new("/app"), Path::new("/app")), ".");
    }
}
