// ── Render projection ──
//
// Pure functions from panel state to what a result table should show.
// Each result set is empty, loading, failed (with whatever was already
// fetched) or populated, and renderers match on exactly that.

use crate::model::{BandwidthSample, Device, FileEntry, MailMessage, PortResult};
use crate::panel::{BandwidthState, FtpState, MailState, NetworkScanState, PortScanState};

/// Display state of one result set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResultView<'a, T> {
    Empty,
    /// Waiting on the backend. `progress` when it reports one.
    Loading { progress: Option<f64> },
    /// Failed; earlier results stay visible.
    Error { message: &'a str, items: &'a [T] },
    Populated { items: &'a [T], total: usize },
}

impl<'a, T> ResultView<'a, T> {
    /// Rows to draw, empty for `Empty` and `Loading`.
    pub fn items(&self) -> &'a [T] {
        match *self {
            Self::Error { items, .. } | Self::Populated { items, .. } => items,
            Self::Empty | Self::Loading { .. } => &[],
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }

    pub fn error(&self) -> Option<&'a str> {
        match *self {
            Self::Error { message, .. } => Some(message),
            _ => None,
        }
    }
}

fn project<'a, T>(
    items: &'a [T],
    total: usize,
    loading: bool,
    progress: Option<f64>,
    error: Option<&'a str>,
) -> ResultView<'a, T> {
    if let Some(message) = error {
        return ResultView::Error { message, items };
    }
    if items.is_empty() {
        return if loading {
            ResultView::Loading { progress }
        } else {
            ResultView::Empty
        };
    }
    ResultView::Populated {
        items,
        total: total.max(items.len()),
    }
}

pub fn project_ports(state: &PortScanState) -> ResultView<'_, PortResult> {
    let error = if state.scanning {
        None
    } else {
        state.last_error.as_deref()
    };
    project(
        state.ports.as_slice(),
        state.ports.len(),
        state.scanning,
        Some(state.progress.value()),
        error,
    )
}

pub fn project_files(state: &FtpState) -> ResultView<'_, FileEntry> {
    let error = if state.is_connected() {
        None
    } else {
        state.last_error.as_deref()
    };
    project(
        state.files.as_slice(),
        state.files.len(),
        state.loading,
        None,
        error,
    )
}

/// Inbox rows oldest UID first; renderers reverse for newest-first.
pub fn project_inbox(state: &MailState) -> ResultView<'_, MailMessage> {
    let error = if state.is_connected() {
        None
    } else {
        state.last_error.as_deref()
    };
    project(
        state.inbox.as_slice(),
        state.total_count,
        state.loading,
        None,
        error,
    )
}

pub fn project_devices(state: &NetworkScanState) -> ResultView<'_, Device> {
    let error = if state.scanning {
        None
    } else {
        state.last_error.as_deref()
    };
    project(
        state.devices.as_slice(),
        state.devices.len(),
        state.scanning,
        Some(state.progress.value()),
        error,
    )
}

pub fn project_bandwidth(state: &BandwidthState) -> ResultView<'_, BandwidthSample> {
    project(
        &state.samples,
        state.samples.len(),
        state.monitoring,
        None,
        state.last_error.as_deref(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PortStatus, ScanType};
    use crate::sync::{PanelEvent, Reducer};

    fn port(number: u16) -> PortResult {
        PortResult {
            number,
            status: PortStatus::Open,
            protocol: "TCP".into(),
            service: "svc".into(),
            description: "N/A".into(),
            details: None,
        }
    }

    #[test]
    fn port_views_cover_each_state() {
        let mut state = PortScanState::default();
        assert_eq!(project_ports(&state), ResultView::Empty);

        state.start("10.0.0.1", &[22, 80], ScanType::default()).unwrap();
        state.apply(PanelEvent::Progress(10.0));
        assert_eq!(
            project_ports(&state),
            ResultView::Loading {
                progress: Some(10.0)
            }
        );

        state.apply(PanelEvent::Item(port(22)));
        assert!(matches!(
            project_ports(&state),
            ResultView::Populated { total: 1, .. }
        ));

        state.apply(PanelEvent::Error {
            message: "boom".into(),
            target: None,
        });
        let view = project_ports(&state);
        assert_eq!(view.error(), Some("boom"));
        assert_eq!(view.items().len(), 1);
    }

    #[test]
    fn idle_bandwidth_is_empty() {
        let state = BandwidthState::default();
        assert_eq!(project_bandwidth(&state), ResultView::Empty);
        assert!(project_bandwidth(&state).items().is_empty());
    }
}
