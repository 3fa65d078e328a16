//! Gemfiles command - compose extra gemfiles and run a command

use super::{compose_and_exec, current_dir, open_project};
use crate::cli::args::GemfilesArgs;
use crate::config::Config;
use crate::error::ComposeResult;
use crate::orchestration::ComposeRequest;
use crate::ui::UiContext;

/// Execute the gemfiles command, returning the child's exit code
pub async fn execute(args: GemfilesArgs, config: &Config, ctx: &UiContext) -> ComposeResult<i32> {
    let (project, cache) = open_project(config)?;
    let request = ComposeRequest::for_gemfiles(&args.gemfiles, &current_dir()?, &project.root)?
        .with_refresh(args.refresh);
    compose_and_exec(&project, &cache, request, &args.exec, &args.args, config, ctx).await
}
