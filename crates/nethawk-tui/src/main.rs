//! `nethawk-tui`: terminal dashboard for a NetHawk backend.
//!
//! Built on [ratatui](https://ratatui.rs) with reactive data from
//! `nethawk-core`'s [`PanelStream`](nethawk_core::PanelStream)s. Screens
//! are reachable with number keys (1-6): Overview, Network, Bandwidth,
//! Ports, FTP and Mail.
//!
//! Logs go to a file under the data directory so they never touch the
//! terminal. A background data bridge relays panel changes, notifications
//! and connection transitions into the action loop.

mod action;
mod app;
mod component;
mod data_bridge;
mod event;
mod screen;
mod screens;
mod theme;
mod tui;
mod widgets;

use std::path::{Path, PathBuf};

use clap::Parser;
use color_eyre::eyre::Result;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use nethawk_config::Profile;
use nethawk_core::{Dashboard, DashboardConfig};

use crate::app::App;

/// Terminal dashboard for network scans, bandwidth, FTP and mail sessions.
#[derive(Parser, Debug)]
#[command(name = "nethawk-tui", version, about)]
struct Cli {
    /// Config profile to use
    #[arg(short = 'p', long, env = "NETHAWK_PROFILE")]
    profile: Option<String>,

    /// Backend URL (overrides the profile), e.g. http://localhost:5000
    #[arg(short = 'b', long, env = "NETHAWK_BACKEND")]
    backend: Option<String>,

    /// Accept self-signed TLS certificates
    #[arg(short = 'k', long)]
    insecure: bool,

    /// Log file path (defaults to nethawk-tui.log in the data directory)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// File-based tracing; stdout belongs to the terminal UI. Hold the guard
/// for the lifetime of the app so buffered lines are flushed.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("nethawk_tui={log_level},nethawk_core={log_level}"))
    });

    let log_file = cli
        .log_file
        .clone()
        .unwrap_or_else(|| nethawk_config::data_dir().join("nethawk-tui.log"));
    let log_dir = log_file.parent().unwrap_or(Path::new("."));
    let log_filename = log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("nethawk-tui.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true),
        )
        .init();

    guard
}

/// Profile plus flag overrides. Priority: flags > env > profile > defaults.
fn resolve(cli: &Cli) -> Result<(Profile, DashboardConfig)> {
    let cfg = nethawk_config::load_config()?;
    let name = cfg.active_profile_name(cli.profile.as_deref());
    let mut profile = cfg.profile(&name)?;

    if let Some(ref url) = cli.backend {
        profile.backend_url = Some(url.clone());
    }
    if cli.insecure {
        profile.insecure = Some(true);
    }

    let config = cfg.dashboard_config(&profile)?;
    info!(profile = %name, backend = %config.backend_url, "resolved dashboard config");
    Ok((profile, config))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Hooks before the terminal enters raw mode.
    tui::install_hooks()?;

    let _log_guard = setup_tracing(&cli);

    let (profile, config) = resolve(&cli)?;
    info!("starting nethawk-tui");

    let mut app = App::new(Dashboard::new(config), profile);
    app.run().await?;

    Ok(())
}
