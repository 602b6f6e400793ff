//! Port and network scan handlers.

use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};
use tabled::Tabled;
use tokio::sync::watch;

use nethawk_core::util::{COMMON_PORTS, merge_ports, parse_ports};
use nethawk_core::{
    Command as CoreCommand, Dashboard, Device, NetworkScanState, NetworkScanType, PanelKind,
    PortResult, PortScanState, Progress, ScanType,
};

use crate::cli::{GlobalOpts, NetworkScanKind, PortScanKind, ScanArgs, ScanCommand};
use crate::config;
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct PortRow {
    #[tabled(rename = "Port")]
    number: u16,
    #[tabled(rename = "Proto")]
    protocol: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Service")]
    service: String,
    #[tabled(rename = "Description")]
    description: String,
}

fn port_row(p: &PortResult, color: bool) -> PortRow {
    PortRow {
        number: p.number,
        protocol: p.protocol.clone(),
        status: output::paint_status(&p.status.to_string(), p.is_open(), false, color),
        service: p.service.clone(),
        description: p.details.clone().unwrap_or_else(|| p.description.clone()),
    }
}

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "Hostname")]
    hostname: String,
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "Vendor")]
    vendor: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Open ports")]
    open_ports: String,
    #[tabled(rename = "Risk")]
    risk: String,
}

fn device_row(d: &Device, color: bool) -> DeviceRow {
    DeviceRow {
        ip: d.ip.to_string(),
        hostname: d.hostname.clone(),
        mac: d.mac.clone(),
        vendor: d.vendor.clone(),
        kind: d.kind.to_string(),
        status: output::paint_status(&d.status.to_string(), d.is_online(), !d.is_online(), color),
        open_ports: nethawk_core::util::join_ports(&d.open_ports),
        risk: d.vulnerability.map_or_else(|| "-".into(), |v| v.to_string()),
    }
}

impl From<PortScanKind> for ScanType {
    fn from(kind: PortScanKind) -> Self {
        match kind {
            PortScanKind::TcpConnect => Self::TcpConnect,
            PortScanKind::TcpSyn => Self::TcpSyn,
            PortScanKind::Udp => Self::Udp,
            PortScanKind::TcpFin => Self::TcpFin,
            PortScanKind::TcpNull => Self::TcpNull,
        }
    }
}

impl From<NetworkScanKind> for NetworkScanType {
    fn from(kind: NetworkScanKind) -> Self {
        match kind {
            NetworkScanKind::Quick => Self::Quick,
            NetworkScanKind::Full => Self::Full,
            NetworkScanKind::Stealth => Self::Stealth,
        }
    }
}

/// Ports requested on the command line; the well-known set when none.
fn requested_ports(spec: Option<&str>, common: bool) -> Result<Vec<u16>, CliError> {
    let known: Vec<u16> = COMMON_PORTS.iter().map(|p| p.number).collect();
    let Some(spec) = spec else {
        return Ok(known);
    };
    let parsed = parse_ports(spec).map_err(|e| CliError::Validation {
        field: "ports".into(),
        reason: e.to_string(),
    })?;
    let ports = if common {
        merge_ports(&parsed, &known)
    } else {
        parsed
    };
    if ports.is_empty() {
        return Err(CliError::Validation {
            field: "ports".into(),
            reason: "no ports to scan".into(),
        });
    }
    Ok(ports)
}

// ── Progress ────────────────────────────────────────────────────────

fn progress_bar(visible: bool, label: &str) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(100);
    if let Ok(style) =
        ProgressStyle::with_template("{spinner} {prefix} [{bar:32}] {pos:>3}% {wide_msg}")
    {
        bar.set_style(style.progress_chars("=> "));
    }
    bar.set_prefix(label.to_owned());
    bar
}

/// Follow a running scan until `running` turns false, driving `bar`.
///
/// Ctrl-C asks the backend to stop and keeps what arrived so far.
async fn follow<S>(
    dashboard: &Dashboard,
    rx: &mut watch::Receiver<Arc<S>>,
    bar: &ProgressBar,
    stop: CoreCommand,
    view: impl Fn(&S) -> (bool, Progress, usize),
) -> Result<(), CliError> {
    let finished = async {
        loop {
            let (running, progress, found) = view(&rx.borrow_and_update());
            bar.set_position(u64::from(progress.percent()));
            bar.set_message(format!("{found} found"));
            if !running || rx.changed().await.is_err() {
                break;
            }
        }
    };

    tokio::select! {
        () = finished => Ok(()),
        _ = tokio::signal::ctrl_c() => {
            bar.set_message("stopping");
            dashboard.execute(stop).await?;
            Ok(())
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: ScanArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let color = output::should_color(&global.color);
    let interactive = output::interactive(&global.output, global.quiet);

    match args.command {
        ScanCommand::Ports {
            host,
            ports,
            common,
            scan_type,
            all,
        } => {
            let ports = requested_ports(ports.as_deref(), common)?;
            let resolved = config::resolve(global, true)?;

            let state = util::with_dashboard(resolved.dashboard, |dashboard| async move {
                let _ports_handler = dashboard.subscribe(PanelKind::Ports);
                let mut rx = dashboard.ports();
                let bar = progress_bar(interactive, &host);

                dashboard
                    .execute(CoreCommand::StartPortScan {
                        host,
                        ports,
                        scan_type: scan_type.into(),
                    })
                    .await?;

                let followed = follow(
                    &dashboard,
                    &mut rx,
                    &bar,
                    CoreCommand::StopPortScan,
                    |s: &PortScanState| (s.scanning, s.progress, s.open_count()),
                )
                .await;
                bar.finish_and_clear();
                followed?;
                let state = rx.borrow().clone();
                Ok(state)
            })
            .await?;

            if let Some(ref message) = state.last_error {
                return Err(CliError::SessionFailed {
                    what: "Port scan".into(),
                    message: message.clone(),
                });
            }

            let mut results: Vec<PortResult> = if all {
                state.ports.values()
            } else {
                state.open_ports().cloned().collect()
            };
            results.sort_by_key(|p| p.number);

            if interactive {
                eprintln!(
                    "{} of {} ports open on {}",
                    state.open_count(),
                    state.total_requested,
                    state.target.as_deref().unwrap_or("target")
                );
            }
            let out = output::render_list(
                &global.output,
                &results,
                |p| port_row(p, color),
                |p| p.number.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ScanCommand::Network { range, scan_type } => {
            let resolved = config::resolve(global, true)?;

            let state = util::with_dashboard(resolved.dashboard, |dashboard| async move {
                let _network_handler = dashboard.subscribe(PanelKind::Network);
                let mut rx = dashboard.network();
                let bar = progress_bar(interactive, &range);

                dashboard
                    .execute(CoreCommand::StartNetworkScan {
                        ip_range: range,
                        scan_type: scan_type.into(),
                    })
                    .await?;

                let followed = follow(
                    &dashboard,
                    &mut rx,
                    &bar,
                    CoreCommand::StopNetworkScan,
                    |s: &NetworkScanState| (s.scanning, s.progress, s.devices.len()),
                )
                .await;
                bar.finish_and_clear();
                followed?;
                let state = rx.borrow().clone();
                Ok(state)
            })
            .await?;

            if let Some(ref message) = state.last_error {
                return Err(CliError::SessionFailed {
                    what: "Network scan".into(),
                    message: message.clone(),
                });
            }

            let mut devices = state.devices.values();
            devices.sort_by_key(|d| d.ip);

            if interactive {
                eprintln!(
                    "{} devices ({} online, {} vulnerable) in {}",
                    devices.len(),
                    state.online_count(),
                    state.vulnerable_count(),
                    state.ip_range
                );
            }
            let out = output::render_list(
                &global.output,
                &devices,
                |d| device_row(d, color),
                |d| d.ip.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn no_spec_scans_well_known_ports() {
        let ports = requested_ports(None, false).unwrap();
        assert!(ports.contains(&22));
        assert!(ports.contains(&443));
    }

    #[test]
    fn common_merges_into_explicit_ports() {
        let ports = requested_ports(Some("8080"), true).unwrap();
        assert!(ports.contains(&8080));
        assert!(ports.contains(&21));
        assert!(ports.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn bad_fragment_is_a_usage_error() {
        let err = requested_ports(Some("22,abc"), false).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::exit_code::USAGE);
    }
}
