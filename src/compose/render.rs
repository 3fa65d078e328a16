//! Dependency grouping and `gem` line rendering

use crate::compose::ruby;
use crate::error::{ComposeError, ComposeResult};
use crate::manifest::{
    suppress_credentials, Definition, Dependency, EnvGate, Source, COMPOSE_GROUP, DEFAULT_GROUP,
};
use crate::paths::relative_display;
use std::collections::BTreeMap;
use std::path::Path;

/// Renders dependency lists against a resolved definition
pub(crate) struct DependencyRenderer<'a> {
    definition: &'a Definition,
    manifest_dir: &'a Path,
}

impl<'a> DependencyRenderer<'a> {
    pub(crate) fn new(definition: &'a Definition, manifest_dir: &'a Path) -> Self {
        Self {
            definition,
            manifest_dir,
        }
    }

    /// Render dependencies grouped by their (sorted) group set.
    ///
    /// Groups are ordered by their sorted tag list and members by name, so
    /// the output does not depend on input order.
    pub(crate) fn render(&self, dependencies: &[Dependency]) -> ComposeResult<Vec<String>> {
        let mut groups: BTreeMap<Vec<String>, Vec<&Dependency>> = BTreeMap::new();
        for dep in dependencies {
            groups.entry(dep.group_key()).or_default().push(dep);
        }

        let mut lines = Vec::new();
        for (key, members) in groups {
            let wrapped = !(key.is_empty() || key == [DEFAULT_GROUP]);

            if wrapped {
                let optional = if key == [COMPOSE_GROUP] {
                    ", optional: true"
                } else {
                    ""
                };
                lines.push(format!(
                    "group {}{} do",
                    key.iter()
                        .map(|g| ruby::symbol(g))
                        .collect::<Vec<_>>()
                        .join(", "),
                    optional
                ));
            }

            let mut rendered = members
                .into_iter()
                .map(|dep| Ok((dep.name.as_str(), self.render_dependency(dep, wrapped)?)))
                .collect::<ComposeResult<Vec<_>>>()?;
            rendered.sort();
            lines.extend(rendered.into_iter().map(|(_, line)| line));

            if wrapped {
                lines.push("end".to_string());
            }
        }

        Ok(lines)
    }

    fn render_dependency(&self, dep: &Dependency, indent: bool) -> ComposeResult<String> {
        let pinned = self.definition.pinned(&dep.name);
        let source = dep.source.as_ref().or(pinned.map(|p| &p.source));

        let mut line = String::new();
        if indent {
            line.push_str("  ");
        }

        // gemspec declarations stand in for the gem line entirely
        if !source.is_some_and(Source::is_gemspec) {
            line.push_str("gem ");
            line.push_str(&ruby::dump(&dep.name));

            let requirement = match pinned {
                Some(package) => vec![format!("= {}", package.version)],
                None if !dep.requirement.is_none() => dep.requirement.as_list(),
                None => Vec::new(),
            };
            for clause in requirement {
                line.push_str(", ");
                line.push_str(&ruby::dump(&clause));
            }
        }

        if let Some(source) = source {
            line.push_str(&self.source_options(source)?);
        }

        if !dep.platforms.is_empty() {
            line.push_str(", platforms: ");
            line.push_str(&ruby::symbol_array(&dep.platforms));
        }

        match &dep.env {
            Some(EnvGate::Name(var)) => {
                line.push_str(", env: ");
                line.push_str(&ruby::dump(var));
            }
            Some(EnvGate::Values(values)) => {
                line.push_str(", env: ");
                line.push_str(&ruby::string_hash(values));
            }
            None => {}
        }

        match dep.autorequire.as_deref() {
            Some([single]) => {
                line.push_str(", require: ");
                line.push_str(&ruby::dump(single));
            }
            Some(paths) if !paths.is_empty() => {
                line.push_str(", require: ");
                line.push_str(&ruby::string_array(paths));
            }
            _ => {}
        }

        Ok(line)
    }

    fn source_options(&self, source: &Source) -> ComposeResult<String> {
        let options = match source {
            Source::Registry { remotes } => match remotes.as_slice() {
                [remote] if self.definition.global_sources != [remote.as_str()] => {
                    format!(", source: {}", ruby::dump(&suppress_credentials(remote)))
                }
                _ => String::new(),
            },
            Source::Path { path } => {
                format!(", path: {}", ruby::dump(&self.relative(path)))
            }
            Source::Gemspec { path, name, glob } => {
                let mut s = format!(
                    "gemspec path: {}, name: {}",
                    ruby::dump(&self.relative(path)),
                    ruby::dump(name)
                );
                if let Some(glob) = glob {
                    s.push_str(", glob: ");
                    s.push_str(&ruby::dump(glob));
                }
                s
            }
            Source::Git {
                uri,
                branch,
                reference,
                tag,
                submodules,
                glob,
            } => {
                let mut s = format!(", git: {}", ruby::dump(uri));
                for (key, value) in [("branch", branch), ("ref", reference), ("tag", tag)] {
                    if let Some(value) = value {
                        s.push_str(&format!(", {}: {}", key, ruby::dump(value)));
                    }
                }
                if *submodules {
                    s.push_str(", submodules: true");
                }
                if let Some(glob) = glob {
                    s.push_str(", glob: ");
                    s.push_str(&ruby::dump(glob));
                }
                s
            }
            Source::Unhandled { description } => {
                return Err(ComposeError::UnhandledSource(description.clone()));
            }
        };

        Ok(options)
    }

    fn relative(&self, path: &Path) -> String {
        if path.is_absolute() {
            relative_display(path, self.manifest_dir)
        } else {
            path.to_string_lossy().replace('\\', "/")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{Requirement, ResolvedPackage};
    use std::path::PathBuf;

    const REMOTE: &str = "https://rubygems.org/";

    fn definition(resolved: Vec<ResolvedPackage>) -> Definition {
        Definition {
            resolved,
            platforms: vec!["ruby".to_string()],
            global_sources: vec![REMOTE.to_string()],
            ..Definition::default()
        }
    }

    fn render(definition: &Definition, deps: &[Dependency]) -> Vec<String> {
        let dir = PathBuf::from("/app/.bundle/bundler-compose/x");
        DependencyRenderer::new(definition, &dir)
            .render(deps)
            .unwrap()
    }

    #[test]
    fn default_group_renders_unwrapped() {
        let def = definition(vec![]);
        let lines = render(&def, &[Dependency::new("rake", Requirement::none())]);
        assert_eq!(lines, vec!["gem \"rake\""]);
    }

    #[test]
    fn explicit_empty_group_renders_unwrapped() {
        let def = definition(vec![]);
        let dep = Dependency::new("rake", Requirement::none()).with_groups(Vec::<String>::new());
        assert_eq!(render(&def, &[dep]), vec!["gem \"rake\""]);
    }

    #[test]
    fn named_groups_wrap_and_indent() {
        let def = definition(vec![]);
        let dep = Dependency::new("rspec", Requirement::none()).with_groups(["test", "dev"]);
        assert_eq!(
            render(&def, &[dep]),
            vec!["group :dev, :test do", "  gem \"rspec\"", "end"]
        );
    }

    #[test]
    fn compose_group_is_optional() {
        let def = definition(vec![]);
        let dep = Dependency::new("rake", Requirement::none()).with_groups([COMPOSE_GROUP]);
        assert_eq!(
            render(&def, &[dep]),
            vec![
                "group :bundler_compose, optional: true do",
                "  gem \"rake\"",
                "end"
            ]
        );
    }

    #[test]
    fn resolved_version_wins_over_declared_requirement() {
        let def = definition(vec![ResolvedPackage::new(
            "rails",
            "2.3.2",
            "ruby",
            Source::registry(REMOTE),
        )]);
        let dep = Dependency::new("rails", Requirement::parse("~> 2.2").unwrap());
        assert_eq!(render(&def, &[dep]), vec!["gem \"rails\", \"= 2.3.2\""]);
    }

    #[test]
    fn unresolved_dependency_keeps_its_requirement() {
        let def = definition(vec![]);
        let dep = Dependency::new("rack", Requirement::parse(">= 1.0, < 3").unwrap());
        assert_eq!(
            render(&def, &[dep]),
            vec!["gem \"rack\", \">= 1.0\", \"< 3\""]
        );
    }

    #[test]
    fn registry_source_annotated_only_when_not_the_global_source() {
        let def = definition(vec![
            ResolvedPackage::new("rails", "2.3.2", "ruby", Source::registry(REMOTE)),
            ResolvedPackage::new(
                "secret",
                "1.0.0",
                "ruby",
                Source::registry("https://user:pw@gems.example.com/"),
            ),
        ]);
        let deps = [
            Dependency::new("secret", Requirement::none()),
            Dependency::new("rails", Requirement::none()),
        ];
        assert_eq!(
            render(&def, &deps),
            vec![
                "gem \"rails\", \"= 2.3.2\"",
                "gem \"secret\", \"= 1.0.0\", source: \"https://gems.example.com/\"",
            ]
        );
    }

    #[test]
    fn registry_source_annotated_with_several_global_sources() {
        let mut def = definition(vec![ResolvedPackage::new(
            "rails",
            "2.3.2",
            "ruby",
            Source::registry(REMOTE),
        )]);
        def.global_sources.push("https://gems.example.com/".to_string());
        let lines = render(&def, &[Dependency::new("rails", Requirement::none())]);
        assert_eq!(
            lines,
            vec!["gem \"rails\", \"= 2.3.2\", source: \"https://rubygems.org/\""]
        );
    }

    #[test]
    fn git_source_options() {
        let def = definition(vec![]);
        let dep = Dependency::new("rack", Requirement::none()).with_source(Source::Git {
            uri: "https://github.com/rack/rack".to_string(),
            branch: Some("main".to_string()),
            reference: None,
            tag: None,
            submodules: true,
            glob: None,
        });
        assert_eq!(
            render(&def, &[dep]),
            vec![
                "gem \"rack\", git: \"https://github.com/rack/rack\", branch: \"main\", submodules: true"
            ]
        );
    }

    #[test]
    fn path_source_is_relative_to_manifest() {
        let def = definition(vec![]);
        let dep = Dependency::new("local", Requirement::none()).with_source(Source::Path {
            path: PathBuf::from("/app/vendor/local"),
        });
        assert_eq!(
            render(&def, &[dep]),
            vec!["gem \"local\", path: \"../../../vendor/local\""]
        );
    }

    #[test]
    fn gemspec_source_replaces_gem_line() {
        let def = definition(vec![]);
        let dep = Dependency::new("myapp", Requirement::none())
            .with_groups(["development"])
            .with_source(Source::Gemspec {
                path: PathBuf::from("/app"),
                name: "myapp".to_string(),
                glob: Some("{,*/}*.gemspec".to_string()),
            });
        assert_eq!(
            render(&def, &[dep]),
            vec![
                "group :development do",
                "  gemspec path: \"../../..\", name: \"myapp\", glob: \"{,*/}*.gemspec\"",
                "end",
            ]
        );
    }

    #[test]
    fn unhandled_source_fails() {
        let def = definition(vec![]);
        let dep = Dependency::new("weird", Requirement::none()).with_source(Source::Unhandled {
            description: "#<Bundler::Plugin::API::Source>".to_string(),
        });
        let err = DependencyRenderer::new(&def, Path::new("/app"))
            .render(&[dep])
            .unwrap_err();
        assert!(matches!(err, ComposeError::UnhandledSource(_)));
    }

    #[test]
    fn platform_env_and_require_options() {
        let def = definition(vec![]);
        let mut env = BTreeMap::new();
        env.insert("CI".to_string(), "true".to_string());
        let deps = [
            Dependency::new("a", Requirement::none())
                .with_platforms(["mri", "windows"])
                .with_autorequire(["a/core"]),
            Dependency::new("b", Requirement::none())
                .with_env(EnvGate::Values(env))
                .with_autorequire(["b", "b/ext"]),
            Dependency::new("c", Requirement::none())
                .with_env(EnvGate::Name("WITH_C".to_string()))
                .with_autorequire(Vec::<String>::new()),
        ];
        assert_eq!(
            render(&def, &deps),
            vec![
                "gem \"a\", platforms: [:mri, :windows], require: \"a/core\"",
                "gem \"b\", env: {\"CI\" => \"true\"}, require: [\"b\", \"b/ext\"]",
                "gem \"c\", env: \"WITH_C\"",
            ]
        );
    }

    #[test]
    fn groups_sorted_by_tag_list() {
        let def = definition(vec![]);
        let deps = [
            Dependency::new("z", Requirement::none()).with_groups(["test"]),
            Dependency::new("y", Requirement::none()).with_groups(["development", "test"]),
            Dependency::new("x", Requirement::none()),
        ];
        assert_eq!(
            render(&def, &deps),
            vec![
                "gem \"x\"",
                "group :development, :test do",
                "  gem \"y\"",
                "end",
                "group :test do",
                "  gem \"z\"",
                "end",
            ]
        );
    }
}
