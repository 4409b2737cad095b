//! errnotify - error-report notification dispatch
//!
//! Reads a captured error report as JSON, formats it, and delivers it to
//! administrator email and the team-chat errors stream.

use anyhow::{Context, Result};
use clap::Parser;
use errnotify::{
    channels::{ChatChannel, ChatPoster, EmailChannel},
    cli::Cli,
    config::Config,
    Dispatcher, Report, ReportKind,
};
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration by layering sources: defaults, file, environment,
    // and CLI args.
    let config = match Config::load(&cli) {
        Ok(config) => config,
        Err(err) => {
            // Manually initialize logging for this specific error.
            tracing_subscriber::fmt().init();
            error!("Failed to load configuration: {err}");
            // Exit if configuration fails, as it's a critical step.
            std::process::exit(1);
        }
    };

    // Initialize logging.
    let filter =
        EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let kind: ReportKind = cli.kind.parse()?;
    let report = read_report(cli.report.as_deref())?;

    info!(deployment = %config.deployment, "Dispatching error report");

    let mailer = Arc::new(EmailChannel::new(config.email.clone()));
    let chat: Option<Arc<dyn ChatPoster>> = config
        .chat
        .as_ref()
        .filter(|chat| chat.enabled)
        .map(|chat| Arc::new(ChatChannel::new(chat)) as Arc<dyn ChatPoster>);

    let dispatcher = Dispatcher::new(mailer, chat, cli.skip_chat);
    dispatcher
        .report_error(&config.deployment, kind, report)
        .await?;

    Ok(())
}

/// Reads the report JSON from a file, or from stdin for `-`/no path.
fn read_report(path: Option<&Path>) -> Result<Report> {
    let raw = match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("reading report from {}", path.display()))?,
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading report from stdin")?;
            buf
        }
    };
    serde_json::from_str(&raw).context("parsing report JSON")
}
