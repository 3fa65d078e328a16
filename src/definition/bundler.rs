//! Definition read from Bundler through Ruby
//!
//! An embedded script loads `Bundler.definition` for the project gemfile and
//! prints it as JSON:
//!
//! ```json
//! {
//!   "dependencies": [{"name": "rails", "requirement": ["~> 7.1"],
//!                     "source": null, "groups": ["default"],
//!                     "platforms": [], "env": null, "autorequire": null}],
//!   "resolved": [{"name": "rails", "version": "7.1.3", "platform": "ruby",
//!                 "source": {"type": "registry", "remotes": ["https://rubygems.org/"]}}],
//!   "platforms": ["ruby", "x86_64-linux"],
//!   "global_sources": ["https://rubygems.org/"],
//!   "bundler_version": "2.5.3"
//! }
//! ```
//!
//! Sources Bundler has but composition cannot express come back as
//! `{"type": "unhandled", "description": ...}`.

use crate::definition::DefinitionLoader;
use crate::error::{ComposeError, ComposeResult};
use crate::manifest::Definition;
use crate::orchestration::runner::unbundled_env;
use crate::project::Project;
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

const DUMP_DEFINITION: &str = include_str!("../../scripts/dump_definition.rb");

/// Loads the definition by asking Bundler
pub struct BundlerLoader {
    ruby_command: String,
}

impl BundlerLoader {
    pub fn new(ruby_command: impl Into<String>) -> Self {
        Self {
            ruby_command: ruby_command.into(),
        }
    }
}

#[async_trait]
impl DefinitionLoader for BundlerLoader {
    async fn load(&self, project: &Project) -> ComposeResult<Definition> {
        if !project.lockfile.exists() {
            return Err(ComposeError::LockfileNotFound(project.lockfile.clone()));
        }

        debug!(
            "Dumping bundler definition for {} with {}",
            project.gemfile.display(),
            self.ruby_command
        );

        let output = Command::new(&self.ruby_command)
            .arg("-e")
            .arg(DUMP_DEFINITION)
            .current_dir(&project.root)
            .env_clear()
            .envs(unbundled_env(std::env::vars_os()))
            .env("BUNDLE_GEMFILE", &project.gemfile)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| ComposeError::command_failed(format!("{} -e <dump definition>", self.ruby_command), e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let reason = match stderr.trim() {
                "" => format!("{} exited with {}", self.ruby_command, output.status),
                message => message.to_string(),
            };
            return Err(ComposeError::DefinitionLoad(reason));
        }

        parse_output(&output.stdout)
    }

    fn loader_name(&self) -> &'static str {
        "bundler"
    }
}

/// Decode the dump script's JSON
pub fn parse_output(stdout: &[u8]) -> ComposeResult<Definition> {
    let definition: Definition = serde_json::from_slice(stdout)?;
    debug!(
        "Bundler reported {} dependencies, {} resolved specs",
        definition.dependencies.len(),
        definition.resolved.len()
    );
    Ok(definition)
}
