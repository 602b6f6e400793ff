use serde::Serialize;

/// One throughput sample pushed by the bandwidth monitor (Mbps, ms).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BandwidthSample {
    pub timestamp: String,
    pub upload: f64,
    pub download: f64,
    pub ping: f64,
}
