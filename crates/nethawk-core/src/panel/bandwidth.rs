use serde::Serialize;

use crate::model::{BandwidthSample, Notification};
use crate::sync::{Effect, PanelEvent, Reducer};

/// Link capacity that utilization is measured against, in Mbps.
pub const LINK_CAPACITY_MBPS: f64 = 200.0;

/// Utilization above this is flagged as high.
pub const HIGH_UTILIZATION: f64 = 80.0;

/// Bandwidth monitor panel: a ring of recent samples plus the latest one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BandwidthState {
    /// Oldest first.
    pub samples: Vec<BandwidthSample>,
    pub capacity: usize,
    pub current: Option<BandwidthSample>,
    pub monitoring: bool,
    pub last_message: Option<String>,
    pub last_error: Option<String>,
}

impl Default for BandwidthState {
    fn default() -> Self {
        Self::new(30)
    }
}

impl BandwidthState {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: Vec::with_capacity(capacity),
            capacity,
            current: None,
            monitoring: false,
            last_message: None,
            last_error: None,
        }
    }

    /// Returns `false` if monitoring was already on.
    pub fn start(&mut self) -> bool {
        let was = self.monitoring;
        self.monitoring = true;
        self.last_error = None;
        !was
    }

    /// Returns whether monitoring was on.
    pub fn stop(&mut self) -> bool {
        std::mem::replace(&mut self.monitoring, false)
    }

    fn push(&mut self, sample: BandwidthSample) {
        if self.samples.len() >= self.capacity {
            let excess = self.samples.len() + 1 - self.capacity;
            self.samples.drain(..excess);
        }
        self.samples.push(sample.clone());
        self.current = Some(sample);
    }

    /// Combined current throughput as a share of link capacity, 0-100.
    pub fn utilization(&self) -> f64 {
        self.current.as_ref().map_or(0.0, |s| {
            ((s.upload + s.download) / LINK_CAPACITY_MBPS * 100.0).clamp(0.0, 100.0)
        })
    }

    pub fn is_high_utilization(&self) -> bool {
        self.utilization() > HIGH_UTILIZATION
    }

    pub fn peak_download(&self) -> f64 {
        self.samples.iter().map(|s| s.download).fold(0.0, f64::max)
    }

    pub fn peak_upload(&self) -> f64 {
        self.samples.iter().map(|s| s.upload).fold(0.0, f64::max)
    }

    pub fn avg_download(&self) -> f64 {
        self.average(|s| s.download)
    }

    pub fn avg_upload(&self) -> f64 {
        self.average(|s| s.upload)
    }

    pub fn avg_ping(&self) -> f64 {
        self.average(|s| s.ping)
    }

    /// Percent the current download deviates from the window average.
    pub fn download_trend(&self) -> f64 {
        Self::trend(self.current.as_ref().map(|s| s.download), self.avg_download())
    }

    pub fn upload_trend(&self) -> f64 {
        Self::trend(self.current.as_ref().map(|s| s.upload), self.avg_upload())
    }

    fn trend(current: Option<f64>, avg: f64) -> f64 {
        match current {
            Some(value) if avg > 0.0 => (value - avg) / avg * 100.0,
            _ => 0.0,
        }
    }

    #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
    fn average(&self, f: impl Fn(&BandwidthSample) -> f64) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().map(f).sum::<f64>() / self.samples.len() as f64
    }
}

impl Reducer for BandwidthState {
    type Item = BandwidthSample;

    fn apply(&mut self, event: PanelEvent<BandwidthSample>) -> Vec<Effect> {
        match event {
            PanelEvent::Item(sample) => {
                if self.monitoring {
                    self.push(sample);
                }
                Vec::new()
            }
            PanelEvent::Listing { items, .. } => {
                self.samples.clear();
                self.current = None;
                for sample in items {
                    self.push(sample);
                }
                Vec::new()
            }
            PanelEvent::Error { message, .. } => {
                self.monitoring = false;
                self.last_error = Some(message.clone());
                vec![Effect::Notify(Notification::error("Bandwidth monitor", message))]
            }
            PanelEvent::Notice { message, .. } => {
                self.last_message = Some(message);
                Vec::new()
            }
            PanelEvent::Stopped { message } | PanelEvent::Complete { message } => {
                self.monitoring = false;
                self.last_message = message;
                Vec::new()
            }
            PanelEvent::Reset => {
                *self = Self::new(self.capacity);
                Vec::new()
            }
            PanelEvent::Status { .. } | PanelEvent::Progress(_) => Vec::new(),
        }
    }

    fn transport_lost(&mut self) {
        self.monitoring = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(up: f64, down: f64) -> BandwidthSample {
        BandwidthSample {
            timestamp: "12:00:00".into(),
            upload: up,
            download: down,
            ping: 10.0,
        }
    }

    #[test]
    fn keeps_only_the_last_n_samples() {
        let mut state = BandwidthState::new(3);
        state.start();
        for i in 0..5 {
            state.apply(PanelEvent::Item(sample(1.0, f64::from(i))));
        }
        assert_eq!(state.samples.len(), 3);
        assert!((state.samples[0].download - 2.0).abs() < f64::EPSILON);
        assert!((state.peak_download() - 4.0).abs() < f64::EPSILON);
        assert!((state.avg_download() - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn ignores_samples_while_stopped() {
        let mut state = BandwidthState::default();
        state.apply(PanelEvent::Item(sample(1.0, 1.0)));
        assert!(state.samples.is_empty());
        assert!(state.current.is_none());
    }

    #[test]
    fn utilization_is_clamped() {
        let mut state = BandwidthState::default();
        state.start();
        state.apply(PanelEvent::Item(sample(20.0, 80.0)));
        assert!((state.utilization() - 50.0).abs() < f64::EPSILON);
        state.apply(PanelEvent::Item(sample(150.0, 150.0)));
        assert!((state.utilization() - 100.0).abs() < f64::EPSILON);
        assert!(state.is_high_utilization());
    }

    #[test]
    fn error_stops_monitoring() {
        let mut state = BandwidthState::default();
        state.start();
        let effects = state.apply(PanelEvent::Error {
            message: "speedtest failed".into(),
            target: None,
        });
        assert_eq!(effects.len(), 1);
        assert!(!state.monitoring);
    }
}
