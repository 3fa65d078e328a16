//! bundler-compose - run commands with extra gems on top of a locked bundle
//!
//! CLI entry point that dispatches to subcommands.

use bundler_compose::cli::{commands, Cli, Commands};
use bundler_compose::config::{Config, ConfigManager};
use bundler_compose::error::ComposeResult;
use bundler_compose::ui::UiContext;
use clap::Parser;
use console::style;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> ComposeResult<i32> {
    let cli = Cli::parse();

    let config_manager = ConfigManager::new(cli.config.clone());
    let config = config_manager.load().await?;

    init_logging(&cli, &config);
    debug!("Using config {}", config_manager.path().display());

    let ctx = UiContext::detect().with_quiet(cli.quiet);

    match cli.command {
        Commands::Gems(args) => commands::gems(args, &config, &ctx).await,
        Commands::Gemfiles(args) => commands::gemfiles(args, &config, &ctx).await,
        Commands::Cache(args) => commands::cache(args, &config, &ctx).await.map(|()| 0),
        Commands::Config(args) => commands::config(args, &config_manager, &config, &ctx)
            .await
            .map(|()| 0),
    }
}

/// Logs go to stderr: 0 = warn (spinners only), 1 = info, 2+ = debug
fn init_logging(cli: &Cli, config: &Config) {
    let level = match cli.verbose {
        0 if config.general.verbose => 1,
        n => n,
    };
    let filter = match level {
        0 => EnvFilter::new("bundler_compose=warn"),
        1 => EnvFilter::new("bundler_compose=info"),
        _ => EnvFilter::new("bundler_compose=debug"),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time();

    if config.general.log_format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}
