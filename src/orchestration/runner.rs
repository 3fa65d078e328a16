//! `bundle exec` against a composed gemfile

use crate::config::schema::ExecConfig;
use crate::error::{ComposeError, ComposeResult};
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

/// `-r` flags Bundler injects into `RUBYOPT` for child processes
const BUNDLER_SETUP_FLAGS: &[&str] = &["-rbundler/setup", "-rbundler/setup.rb"];

/// Environment without the variables a surrounding `bundle exec` injects.
///
/// `BUNDLE_*` and `BUNDLER_*` are dropped; `RUBYOPT` keeps everything but
/// the bundler setup require and is dropped when nothing else remains.
pub fn unbundled_env<I>(vars: I) -> Vec<(OsString, OsString)>
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    vars.into_iter()
        .filter_map(|(key, value)| {
            let name = key.to_string_lossy().into_owned();
            if name.starts_with("BUNDLE_") || name.starts_with("BUNDLER_") {
                return None;
            }
            if name == "RUBYOPT" {
                let kept: Vec<&str> = value
                    .to_str()?
                    .split_whitespace()
                    .filter(|flag| !BUNDLER_SETUP_FLAGS.contains(flag))
                    .collect();
                if kept.is_empty() {
                    return None;
                }
                return Some((key, OsString::from(kept.join(" "))));
            }
            Some((key, value))
        })
        .collect()
}

/// Runs commands through `bundle exec` with a composed gemfile
pub struct BundleRunner {
    bundle_command: String,
    auto_install: bool,
    bundle_path: Option<PathBuf>,
}

impl BundleRunner {
    pub fn new(config: &ExecConfig) -> Self {
        Self {
            bundle_command: config.bundle_command.clone(),
            auto_install: config.auto_install,
            bundle_path: config.bundle_path.clone(),
        }
    }

    /// Variables set on top of the unbundled environment
    pub fn exec_env(
        &self,
        gemfile: &Path,
        bundler_version: Option<&str>,
    ) -> Vec<(&'static str, OsString)> {
        let mut env = vec![
            ("BUNDLE_GEMFILE", gemfile.as_os_str().to_owned()),
            ("BUNDLE_DISABLE_EXEC_LOAD", OsString::from("true")),
        ];
        if self.auto_install {
            env.push(("BUNDLE_AUTO_INSTALL", OsString::from("true")));
        }
        if let Some(version) = bundler_version {
            env.push(("BUNDLER_VERSION", OsString::from(version)));
        }
        if let Some(path) = &self.bundle_path {
            env.push(("BUNDLE_PATH", path.as_os_str().to_owned()));
        }
        env
    }

    /// Run `<bundle> exec <command> <args...>` with inherited stdio and
    /// return the child's exit code
    pub async fn exec(
        &self,
        gemfile: &Path,
        bundler_version: Option<&str>,
        command: &str,
        args: &[String],
    ) -> ComposeResult<i32> {
        let shown = format!("{} exec {} {}", self.bundle_command, command, args.join(" "));
        info!("Running: {}", shown.trim_end());
        debug!("BUNDLE_GEMFILE={}", gemfile.display());

        let status = Command::new(&self.bundle_command)
            .arg("exec")
            .arg(command)
            .args(args)
            .env_clear()
            .envs(unbundled_env(std::env::vars_os()))
            .envs(
                self.exec_env(gemfile, bundler_version)
                    .into_iter()
                    .map(|(k, v)| (OsStr::new(k).to_owned(), v)),
            )
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| ComposeError::command_failed(shown.trim_end(), e))?;

        match status.code() {
            Some(code) => Ok(code),
            None => Err(ComposeError::ProcessSignaled),
        }
    }
}
