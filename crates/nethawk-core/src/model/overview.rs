use serde::Serialize;

/// Host utilisation percentages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct OverviewStats {
    pub cpu: f64,
    pub memory: f64,
    pub disk: f64,
    pub network: f64,
}

/// Upload/download totals at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrafficPoint {
    pub time: String,
    pub upload: f64,
    pub download: f64,
}

/// Slice of the device-type breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceShare {
    pub name: String,
    pub value: u64,
    pub color: String,
}

/// Recent activity feed entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityItem {
    pub id: u64,
    pub kind: String,
    pub message: String,
    pub time: String,
    pub status: String,
}
