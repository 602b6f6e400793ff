use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::{ActivityItem, DeviceShare, Notification, OverviewStats, TrafficPoint};
use crate::sync::{Effect, PanelEvent, Reducer};

/// One overview endpoint's fresh payload.
#[derive(Debug, Clone, PartialEq)]
pub enum OverviewUpdate {
    Stats(OverviewStats),
    Traffic(Vec<TrafficPoint>),
    Devices(Vec<DeviceShare>),
    Activity(Vec<ActivityItem>),
}

/// Read-through cache of the overview endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OverviewState {
    pub stats: Option<OverviewStats>,
    pub traffic: Vec<TrafficPoint>,
    pub devices: Vec<DeviceShare>,
    pub activity: Vec<ActivityItem>,
    pub loading: bool,
    pub refreshed_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

impl OverviewState {
    pub fn begin_refresh(&mut self) {
        self.loading = true;
    }

    pub fn total_devices(&self) -> u64 {
        self.devices.iter().map(|d| d.value).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_none()
            && self.traffic.is_empty()
            && self.devices.is_empty()
            && self.activity.is_empty()
    }
}

impl Reducer for OverviewState {
    type Item = OverviewUpdate;

    fn apply(&mut self, event: PanelEvent<OverviewUpdate>) -> Vec<Effect> {
        match event {
            PanelEvent::Item(update) => {
                match update {
                    OverviewUpdate::Stats(stats) => self.stats = Some(stats),
                    OverviewUpdate::Traffic(points) => self.traffic = points,
                    OverviewUpdate::Devices(devices) => self.devices = devices,
                    OverviewUpdate::Activity(items) => self.activity = items,
                }
                self.refreshed_at = Some(Utc::now());
                Vec::new()
            }
            PanelEvent::Complete { .. } => {
                self.loading = false;
                Vec::new()
            }
            // Previous data stays visible.
            PanelEvent::Error { message, target } => {
                self.loading = false;
                let title = target.map_or_else(
                    || "Overview".to_owned(),
                    |endpoint| format!("Overview: {endpoint}"),
                );
                self.last_error = Some(message.clone());
                vec![Effect::Notify(Notification::error(title, message))]
            }
            PanelEvent::Reset => {
                *self = Self::default();
                Vec::new()
            }
            PanelEvent::Status { .. }
            | PanelEvent::Progress(_)
            | PanelEvent::Listing { .. }
            | PanelEvent::Stopped { .. }
            | PanelEvent::Notice { .. } => Vec::new(),
        }
    }

    fn transport_lost(&mut self) {
        self.loading = false;
    }
}
