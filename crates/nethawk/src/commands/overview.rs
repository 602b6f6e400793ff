//! Overview handler: stats, traffic, device mix and recent activity.

use std::fmt::Write as _;

use nethawk_core::{Command as CoreCommand, CommandResult, OverviewState};

use crate::cli::GlobalOpts;
use crate::config;
use crate::error::CliError;
use crate::output;

use super::util;

fn detail(state: &OverviewState) -> String {
    let mut out = String::new();
    if let Some(stats) = state.stats {
        let _ = writeln!(out, "System");
        let _ = writeln!(out, "  CPU      {:>5.1}%", stats.cpu);
        let _ = writeln!(out, "  Memory   {:>5.1}%", stats.memory);
        let _ = writeln!(out, "  Disk     {:>5.1}%", stats.disk);
        let _ = writeln!(out, "  Network  {:>5.1}%", stats.network);
    }
    if let Some(last) = state.traffic.last() {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Traffic ({} points, latest {}): down {:.1} / up {:.1}",
            state.traffic.len(),
            last.time,
            last.download,
            last.upload
        );
    }
    if !state.devices.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Devices ({} total)", state.total_devices());
        for share in &state.devices {
            let _ = writeln!(out, "  {:<16} {}", share.name, share.value);
        }
    }
    if !state.activity.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Recent activity");
        for item in &state.activity {
            let _ = writeln!(
                out,
                "  {:<10} {:<8} {} ({})",
                item.time, item.status, item.message, item.kind
            );
        }
    }
    if out.is_empty() {
        out.push_str("No overview data available");
    }
    out.trim_end().to_owned()
}

pub async fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let resolved = config::resolve(global, false)?;

    let (state, failed) = util::with_dashboard(resolved.dashboard, |dashboard| async move {
        let failed = match dashboard.execute(CoreCommand::RefreshOverview).await? {
            CommandResult::Overview { failed } => failed,
            _ => 0,
        };
        let state = dashboard.overview().borrow().clone();
        Ok((state, failed))
    })
    .await?;

    if failed > 0 {
        tracing::warn!(failed, "some overview endpoints failed");
        if let Some(ref err) = state.last_error {
            if state.is_empty() {
                return Err(CliError::ApiError {
                    message: err.clone(),
                    status: None,
                });
            }
            eprintln!("warning: {failed} overview endpoint(s) failed: {err}");
        }
    }

    let out = output::render_single(&global.output, &*state, detail, |s| {
        s.stats.map_or_else(String::new, |st| {
            format!("{} {} {} {}", st.cpu, st.memory, st.disk, st.network)
        })
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}
