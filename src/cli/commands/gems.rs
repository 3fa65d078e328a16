//! Gems command - compose extra gems and run a command

use super::{compose_and_exec, open_project};
use crate::cli::args::GemsArgs;
use crate::config::Config;
use crate::error::{ComposeError, ComposeResult};
use crate::orchestration::ComposeRequest;
use crate::ui::UiContext;

/// Execute the gems command, returning the child's exit code
pub async fn execute(args: GemsArgs, config: &Config, ctx: &UiContext) -> ComposeResult<i32> {
    let request = ComposeRequest::for_gems(&args.gems)?.with_refresh(args.refresh);

    // Without --exec, run the executable named after the first gem
    let command = args
        .exec
        .or_else(|| request.gems.first().map(|gem| gem.name.clone()))
        .ok_or_else(|| ComposeError::Internal("no gems requested".to_string()))?;

    let (project, cache) = open_project(config)?;
    compose_and_exec(&project, &cache, request, &command, &args.args, config, ctx).await
}
