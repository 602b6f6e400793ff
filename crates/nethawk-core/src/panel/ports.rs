use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use super::PanelKind;
use crate::error::CoreError;
use crate::model::{Notification, PortResult, ScanType};
use crate::sync::{Effect, KeyedSet, PanelEvent, Progress, Reducer};
use crate::util::is_valid_host;

/// Port scanner panel.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PortScanState {
    pub target: Option<String>,
    pub scan_type: ScanType,
    pub ports: KeyedSet<PortResult>,
    pub progress: Progress,
    pub scanning: bool,
    /// Ports requested at start; the denominator for found-count displays.
    pub total_requested: usize,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Last informational or terminal message from the backend.
    pub last_message: Option<String>,
    pub last_error: Option<String>,
}

impl PortScanState {
    /// Reset to a fresh scan of `ports` on `host`.
    pub fn start(&mut self, host: &str, ports: &[u16], scan_type: ScanType) -> Result<(), CoreError> {
        if self.scanning {
            return Err(CoreError::AlreadyActive {
                panel: PanelKind::Ports,
            });
        }
        let host = host.trim();
        if !is_valid_host(host) {
            return Err(CoreError::validation(format!("invalid scan target: {host}")));
        }
        if ports.is_empty() {
            return Err(CoreError::validation("no ports to scan"));
        }
        *self = Self {
            target: Some(host.to_owned()),
            scan_type,
            scanning: true,
            total_requested: ports.len(),
            started_at: Some(Utc::now()),
            ..Self::default()
        };
        Ok(())
    }

    /// Stop listening. Returns whether a scan was running.
    pub fn stop(&mut self) -> bool {
        let was = self.scanning;
        self.scanning = false;
        if was {
            self.finished_at = Some(Utc::now());
        }
        was
    }

    pub fn open_count(&self) -> usize {
        self.ports.iter().filter(|p| p.is_open()).count()
    }

    pub fn open_ports(&self) -> impl Iterator<Item = &PortResult> {
        self.ports.iter().filter(|p| p.is_open())
    }

    fn finish(&mut self) {
        self.scanning = false;
        self.finished_at = Some(Utc::now());
    }
}

impl Reducer for PortScanState {
    type Item = PortResult;

    fn apply(&mut self, event: PanelEvent<PortResult>) -> Vec<Effect> {
        match event {
            PanelEvent::Item(port) => {
                if self.scanning {
                    self.ports.upsert(port);
                } else {
                    debug!(port = port.number, "late port result, ignoring");
                }
                Vec::new()
            }
            PanelEvent::Progress(value) => {
                if self.scanning {
                    self.progress.observe(value);
                }
                Vec::new()
            }
            PanelEvent::Listing { items, .. } => {
                self.ports.replace_all(items);
                Vec::new()
            }
            PanelEvent::Complete { message } => {
                if !self.scanning {
                    return Vec::new();
                }
                self.progress.complete();
                self.finish();
                let text = message.unwrap_or_else(|| "Port scan finished".into());
                self.last_message = Some(text.clone());
                vec![Effect::Notify(Notification::success(
                    "Scan complete",
                    format!("{text} ({} open)", self.open_count()),
                ))]
            }
            PanelEvent::Stopped { message } => {
                if !self.scanning {
                    return Vec::new();
                }
                self.finish();
                self.last_message = message.or_else(|| Some("Scan stopped".into()));
                Vec::new()
            }
            PanelEvent::Error { message, .. } => {
                if !self.scanning {
                    debug!(%message, "scan error after the scan ended, ignoring");
                    return Vec::new();
                }
                self.finish();
                self.last_error = Some(message.clone());
                vec![Effect::Notify(Notification::error("Scan error", message))]
            }
            PanelEvent::Notice { message, target } => {
                if self.scanning {
                    if let Some(target) = target {
                        self.target = Some(target);
                    }
                }
                self.last_message = Some(message);
                Vec::new()
            }
            PanelEvent::Status { .. } => Vec::new(),
            PanelEvent::Reset => {
                *self = Self::default();
                Vec::new()
            }
        }
    }

    fn transport_lost(&mut self) {
        if self.scanning {
            self.finish();
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::PortStatus;

    fn port(number: u16, status: PortStatus) -> PortResult {
        PortResult {
            number,
            status,
            protocol: "TCP".into(),
            service: "svc".into(),
            description: "N/A".into(),
            details: None,
        }
    }

    #[test]
    fn start_validates_target_and_ports() {
        let mut state = PortScanState::default();
        assert!(state.start("bad host!", &[22], ScanType::default()).is_err());
        assert!(state.start("10.0.0.1", &[], ScanType::default()).is_err());
        assert!(!state.scanning);
        state.start("10.0.0.1", &[22, 80], ScanType::TcpSyn).unwrap();
        assert!(state.scanning);
        assert_eq!(state.total_requested, 2);
        assert_eq!(state.scan_type, ScanType::TcpSyn);
    }

    #[test]
    fn start_discards_previous_results() {
        let mut state = PortScanState::default();
        state.start("10.0.0.1", &[22], ScanType::default()).unwrap();
        state.apply(PanelEvent::Item(port(22, PortStatus::Open)));
        state.apply(PanelEvent::Progress(80.0));
        state.apply(PanelEvent::Complete { message: None });
        state.start("10.0.0.2", &[80], ScanType::default()).unwrap();
        assert!(state.ports.is_empty());
        assert_eq!(state.progress.percent(), 0);
    }

    #[test]
    fn second_start_while_scanning_is_refused() {
        let mut state = PortScanState::default();
        state.start("10.0.0.1", &[22, 80], ScanType::default()).unwrap();
        state.apply(PanelEvent::Item(port(22, PortStatus::Open)));
        assert!(matches!(
            state.start("10.0.0.2", &[443], ScanType::default()),
            Err(CoreError::AlreadyActive { panel: PanelKind::Ports })
        ));
        assert_eq!(state.target.as_deref(), Some("10.0.0.1"));
        assert_eq!(state.ports.len(), 1);
        assert!(state.scanning);
    }

    #[test]
    fn late_terminal_events_after_stop_are_ignored() {
        let mut state = PortScanState::default();
        state.start("10.0.0.1", &[22], ScanType::default()).unwrap();
        assert!(state.stop());
        let stopped = state.apply(PanelEvent::Stopped {
            message: Some("Scan stopped by backend".into()),
        });
        let failed = state.apply(PanelEvent::Error {
            message: "nmap killed".into(),
            target: None,
        });
        assert!(stopped.is_empty());
        assert!(failed.is_empty());
        assert_eq!(state.last_message, None);
        assert_eq!(state.last_error, None);
    }

    #[test]
    fn late_events_after_stop_are_ignored() {
        let mut state = PortScanState::default();
        state.start("10.0.0.1", &[22, 80], ScanType::default()).unwrap();
        state.apply(PanelEvent::Item(port(22, PortStatus::Open)));
        assert!(state.stop());
        state.apply(PanelEvent::Item(port(80, PortStatus::Open)));
        state.apply(PanelEvent::Progress(90.0));
        let effects = state.apply(PanelEvent::Complete { message: None });
        assert!(effects.is_empty());
        assert_eq!(state.ports.len(), 1);
        assert_eq!(state.progress.percent(), 0);
        assert!(!state.stop());
    }

    #[test]
    fn error_keeps_partial_results() {
        let mut state = PortScanState::default();
        state.start("10.0.0.1", &[22, 80], ScanType::default()).unwrap();
        state.apply(PanelEvent::Item(port(22, PortStatus::Open)));
        let effects = state.apply(PanelEvent::Error {
            message: "nmap exited".into(),
            target: None,
        });
        assert_eq!(effects.len(), 1);
        assert!(!state.scanning);
        assert_eq!(state.ports.len(), 1);
        assert_eq!(state.last_error.as_deref(), Some("nmap exited"));
    }

    #[test]
    fn transport_loss_ends_scan_but_keeps_rows() {
        let mut state = PortScanState::default();
        state.start("10.0.0.1", &[22], ScanType::default()).unwrap();
        state.apply(PanelEvent::Item(port(22, PortStatus::Open)));
        state.transport_lost();
        assert!(!state.scanning);
        assert_eq!(state.open_count(), 1);
    }
}
