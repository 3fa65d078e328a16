//! Cache command - list and clear composed gemfiles

use super::open_project;
use crate::cache::{CacheEntry, Fingerprint};
use crate::cli::args::{CacheAction, CacheArgs, OutputFormat};
use crate::config::Config;
use crate::error::{ComposeError, ComposeResult};
use crate::lockfile;
use crate::ui::{self, UiContext};
use console::style;
use serde::Serialize;

/// Freshness of an entry against the current base lockfile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
enum EntryState {
    Fresh,
    Stale,
    /// The base lockfile is missing
    Unknown,
}

impl EntryState {
    fn as_str(self) -> &'static str {
        match self {
            Self::Fresh => "fresh",
            Self::Stale => "stale",
            Self::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Serialize)]
struct EntryRow {
    slug: String,
    gemfile: String,
    state: EntryState,
    modified: Option<String>,
}

/// Execute the cache command
pub async fn execute(args: CacheArgs, config: &Config, ctx: &UiContext) -> ComposeResult<()> {
    match args.action {
        CacheAction::List { format } => list(format, config, ctx).await,
        CacheAction::Clear { slug, all } => clear(slug, all, config, ctx).await,
    }
}

async fn list(format: OutputFormat, config: &Config, ctx: &UiContext) -> ComposeResult<()> {
    let (project, cache) = open_project(config)?;
    let entries = cache.list().await?;

    if entries.is_empty() {
        match format {
            OutputFormat::Json => println!("[]"),
            OutputFormat::Plain => {}
            OutputFormat::Table => ui::step_info(ctx, "No composed gemfiles"),
        }
        return Ok(());
    }

    let lock_contents = match lockfile::read(&project.lockfile).await {
        Ok(contents) => Some(contents),
        Err(ComposeError::LockfileNotFound(_)) => None,
        Err(e) => return Err(e),
    };

    let mut rows = Vec::with_capacity(entries.len());
    for entry in &entries {
        let state = entry_state(entry, &project.gemfile, lock_contents.as_deref())?;
        rows.push(EntryRow {
            slug: entry.slug.clone(),
            gemfile: entry.gemfile.display().to_string(),
            state,
            modified: entry
                .modified()
                .await
                .map(|time| time.format("%Y-%m-%d %H:%M").to_string()),
        });
    }

    match format {
        OutputFormat::Table => print_table(&rows),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
        OutputFormat::Plain => {
            for row in &rows {
                println!("{}", row.slug);
            }
        }
    }

    Ok(())
}

fn entry_state(
    entry: &CacheEntry,
    gemfile: &std::path::Path,
    lock_contents: Option<&[u8]>,
) -> ComposeResult<EntryState> {
    let Some(contents) = lock_contents else {
        return Ok(EntryState::Unknown);
    };
    let fingerprint = Fingerprint::for_manifest_dir(gemfile, &entry.dir, contents);
    Ok(if entry.is_fresh(&fingerprint)? {
        EntryState::Fresh
    } else {
        EntryState::Stale
    })
}

fn print_table(rows: &[EntryRow]) {
    let width = rows
        .iter()
        .map(|row| row.slug.len())
        .max()
        .unwrap_or(0)
        .max(4);

    println!(
        "{:<width$}  {:<8}  {}",
        style("SLUG").bold(),
        style("STATE").bold(),
        style("MODIFIED").bold(),
        width = width
    );

    for row in rows {
        let state = match row.state {
            EntryState::Fresh => style(row.state.as_str()).green(),
            EntryState::Stale => style(row.state.as_str()).yellow(),
            EntryState::Unknown => style(row.state.as_str()).dim(),
        };
        println!(
            "{:<width$}  {:<8}  {}",
            row.slug,
            state,
            row.modified.as_deref().unwrap_or("-"),
            width = width
        );
    }
}

async fn clear(
    slug: Option<String>,
    all: bool,
    config: &Config,
    ctx: &UiContext,
) -> ComposeResult<()> {
    let (_project, cache) = open_project(config)?;

    if all {
        let removed = cache.clear().await?;
        ui::step_ok(ctx, &format!("Removed {} composed gemfile(s)", removed));
        return Ok(());
    }

    if let Some(slug) = slug {
        cache.remove(&slug).await?;
        ui::step_ok(ctx, &format!("Removed {}", slug));
    }
    Ok(())
}
