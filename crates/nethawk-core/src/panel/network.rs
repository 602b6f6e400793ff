use chrono::{DateTime, Utc};
use serde::Serialize;

use super::PanelKind;
use crate::error::CoreError;
use crate::model::{Device, NetworkScanType, Notification};
use crate::sync::{Effect, KeyedSet, PanelEvent, Progress, Reducer};
use crate::util::is_valid_ip_range;

const DEFAULT_RANGE: &str = "192.168.1.1-254";

/// Network discovery panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkScanState {
    pub devices: KeyedSet<Device>,
    pub ip_range: String,
    pub scan_type: NetworkScanType,
    pub progress: Progress,
    pub scanning: bool,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub last_message: Option<String>,
    pub last_error: Option<String>,
}

impl Default for NetworkScanState {
    fn default() -> Self {
        Self {
            devices: KeyedSet::new(),
            ip_range: DEFAULT_RANGE.to_owned(),
            scan_type: NetworkScanType::default(),
            progress: Progress::default(),
            scanning: false,
            started_at: None,
            finished_at: None,
            last_message: None,
            last_error: None,
        }
    }
}

impl NetworkScanState {
    pub fn start(&mut self, ip_range: &str, scan_type: NetworkScanType) -> Result<(), CoreError> {
        if self.scanning {
            return Err(CoreError::AlreadyActive {
                panel: PanelKind::Network,
            });
        }
        let ip_range = ip_range.trim();
        if !is_valid_ip_range(ip_range) {
            return Err(CoreError::validation(format!("invalid IP range: {ip_range}")));
        }
        *self = Self {
            ip_range: ip_range.to_owned(),
            scan_type,
            scanning: true,
            started_at: Some(Utc::now()),
            ..Self::default()
        };
        Ok(())
    }

    pub fn stop(&mut self) -> bool {
        let was = self.scanning;
        if was {
            self.finish();
        }
        was
    }

    fn finish(&mut self) {
        self.scanning = false;
        self.finished_at = Some(Utc::now());
    }

    pub fn online_count(&self) -> usize {
        self.devices.iter().filter(|d| d.is_online()).count()
    }

    pub fn offline_count(&self) -> usize {
        self.devices.len() - self.online_count()
    }

    pub fn vulnerable_count(&self) -> usize {
        self.devices
            .iter()
            .filter(|d| d.vulnerability.is_some())
            .count()
    }

    pub fn with_open_ports(&self) -> impl Iterator<Item = &Device> {
        self.devices.iter().filter(|d| !d.open_ports.is_empty())
    }
}

impl Reducer for NetworkScanState {
    type Item = Device;

    fn apply(&mut self, event: PanelEvent<Device>) -> Vec<Effect> {
        match event {
            PanelEvent::Item(device) => {
                if self.scanning {
                    self.devices.upsert(device);
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
                self.devices.replace_all(items);
                Vec::new()
            }
            PanelEvent::Complete { message } => {
                if !self.scanning {
                    return Vec::new();
                }
                self.progress.complete();
                self.finish();
                self.last_message = message;
                vec![Effect::Notify(Notification::success(
                    "Network scan complete",
                    format!(
                        "Found {} devices, {} online",
                        self.devices.len(),
                        self.online_count()
                    ),
                ))]
            }
            PanelEvent::Stopped { message } => {
                if self.scanning {
                    self.finish();
                    self.last_message = message;
                }
                Vec::new()
            }
            PanelEvent::Error { message, .. } => {
                if !self.scanning {
                    return Vec::new();
                }
                self.finish();
                self.last_error = Some(message.clone());
                vec![Effect::Notify(Notification::error("Network scan", message))]
            }
            PanelEvent::Notice { message, .. } => {
                self.last_message = Some(message);
                Vec::new()
            }
            PanelEvent::Reset => {
                *self = Self::default();
                Vec::new()
            }
            PanelEvent::Status { .. } => Vec::new(),
        }
    }

    fn transport_lost(&mut self) {
        if self.scanning {
            self.finish();
        }
    }
}
