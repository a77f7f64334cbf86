//! Url command — print the changelog URL for each version argument.

use anyhow::Context;
use clap::Args;
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::{debug, instrument};

use changelink_core::config::Config;
use changelink_core::{ChangelogUrl, Comparison, VersionLinkFormatter};

/// Arguments for the `url` subcommand.
#[derive(Args, Debug, Default)]
pub struct UrlArgs {
    /// Versions to link (e.g. 1.5.0 or 1.5.0+ent)
    #[arg(required = true, value_name = "VERSION", allow_hyphen_values = true)]
    pub versions: Vec<String>,

    /// Override the configured comparison mode
    #[arg(long, value_enum)]
    pub comparison: Option<Comparison>,
}

#[derive(Serialize)]
struct LinkedVersion<'a> {
    version: &'a str,
    url: ChangelogUrl,
    anchored: bool,
}

/// Build the formatter from config, applying the CLI comparison override.
fn build_formatter(
    config: &Config,
    comparison: Option<Comparison>,
) -> anyhow::Result<VersionLinkFormatter> {
    let mut link = config.link_settings();
    if comparison.is_some() {
        link.comparison = comparison;
    }
    link.formatter()
        .with_context(|| format!("invalid anchor floor `{}`", link.anchor_floor()))
}

/// Print one changelog URL per version.
///
/// Malformed versions print the bare changelog URL; they are logged but do
/// not fail the command.
#[instrument(name = "cmd_url", skip_all, fields(count = args.versions.len()))]
pub fn cmd_url(args: UrlArgs, global_json: bool, config: &Config) -> anyhow::Result<()> {
    let formatter = build_formatter(config, args.comparison)?;
    debug!(
        json_output = global_json,
        comparison = %formatter.comparison(),
        "executing url command"
    );

    let linked: Vec<LinkedVersion<'_>> = args
        .versions
        .iter()
        .map(|version| {
            let url = formatter.format(Some(version.as_str()));
            LinkedVersion {
                version: version.as_str(),
                anchored: url.is_anchored(),
                url,
            }
        })
        .collect();

    if global_json {
        println!("{}", serde_json::to_string_pretty(&linked)?);
    } else if linked.len() == 1 {
        println!("{}", linked[0].url);
    } else {
        for entry in &linked {
            let marker = if entry.anchored {
                "✓".green().to_string()
            } else {
                "○".yellow().to_string()
            };
            println!("{marker} {}\t{}", entry.version.bold(), entry.url.cyan());
        }
    }

    Ok(())
}
