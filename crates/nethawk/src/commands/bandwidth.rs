//! Bandwidth monitor handler.

use tabled::Tabled;

use nethawk_core::{BandwidthSample, Command as CoreCommand, PanelKind};

use crate::cli::{BandwidthArgs, BandwidthCommand, GlobalOpts, OutputFormat};
use crate::config;
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct SampleRow {
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Download (Mbps)")]
    download: String,
    #[tabled(rename = "Upload (Mbps)")]
    upload: String,
    #[tabled(rename = "Ping (ms)")]
    ping: String,
}

impl From<&BandwidthSample> for SampleRow {
    fn from(s: &BandwidthSample) -> Self {
        Self {
            time: s.timestamp.clone(),
            download: format!("{:.1}", s.download),
            upload: format!("{:.1}", s.upload),
            ping: format!("{:.0}", s.ping),
        }
    }
}

fn sample_line(s: &BandwidthSample) -> String {
    format!(
        "{}  down {:>7.1} Mbps  up {:>7.1} Mbps  ping {:>4.0} ms",
        s.timestamp, s.download, s.upload, s.ping
    )
}

pub async fn handle(args: BandwidthArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let BandwidthCommand::Watch { samples: wanted } = args.command;
    let resolved = config::resolve(global, true)?;
    // Table output streams line by line; structured formats print at the end.
    let streaming = matches!(global.output, OutputFormat::Table) && !global.quiet;

    let collected = util::with_dashboard(resolved.dashboard, |dashboard| async move {
        let _bandwidth_handler = dashboard.subscribe(PanelKind::Bandwidth);
        let mut rx = dashboard.bandwidth();
        dashboard.execute(CoreCommand::StartBandwidth).await?;

        let mut seen: Vec<BandwidthSample> = Vec::new();
        let watch = async {
            loop {
                if rx.changed().await.is_err() {
                    return Err(CliError::NotConnected);
                }
                let state = rx.borrow_and_update().clone();
                if let Some(message) = state.last_error.clone() {
                    return Err(CliError::SessionFailed {
                        what: "Bandwidth monitor".into(),
                        message,
                    });
                }
                if let Some(sample) = state.current.clone() {
                    if seen.last() != Some(&sample) {
                        if streaming {
                            println!("{}", sample_line(&sample));
                        }
                        seen.push(sample);
                    }
                }
                if wanted.is_some_and(|n| seen.len() >= n) {
                    return Ok(());
                }
                if !state.monitoring {
                    return Ok(());
                }
            }
        };

        let outcome = tokio::select! {
            outcome = watch => outcome,
            _ = tokio::signal::ctrl_c() => Ok(()),
        };
        if let Err(e) = dashboard.execute(CoreCommand::StopBandwidth).await {
            tracing::debug!(error = %e, "stop bandwidth failed");
        }
        outcome?;
        Ok(seen)
    })
    .await?;

    if streaming {
        if let Some(summary) = summary(&collected) {
            eprintln!("{summary}");
        }
        return Ok(());
    }
    let out = output::render_list(&global.output, &collected, |x| SampleRow::from(x), |s| {
        format!("{} {} {} {}", s.timestamp, s.download, s.upload, s.ping)
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}

/// Peak and average line over the collected samples.
#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
fn summary(samples: &[BandwidthSample]) -> Option<String> {
    if samples.is_empty() {
        return None;
    }
    let n = samples.len() as f64;
    let peak_down = samples.iter().map(|s| s.download).fold(0.0, f64::max);
    let peak_up = samples.iter().map(|s| s.upload).fold(0.0, f64::max);
    let avg_down = samples.iter().map(|s| s.download).sum::<f64>() / n;
    let avg_up = samples.iter().map(|s| s.upload).sum::<f64>() / n;
    let avg_ping = samples.iter().map(|s| s.ping).sum::<f64>() / n;
    Some(format!(
        "{} samples: down avg {avg_down:.1} / peak {peak_down:.1} Mbps, \
         up avg {avg_up:.1} / peak {peak_up:.1} Mbps, ping avg {avg_ping:.0} ms",
        samples.len()
    ))
}
