use serde::Serialize;

use crate::sync::Keyed;

/// Reported state of one scanned port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PortStatus {
    Open,
    Closed,
    Filtered,
    Unknown,
}

/// Scan technique requested from the backend.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ScanType {
    #[default]
    TcpConnect,
    TcpSyn,
    Udp,
    TcpFin,
    TcpNull,
}

/// One row of the port table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortResult {
    pub number: u16,
    pub status: PortStatus,
    pub protocol: String,
    pub service: String,
    pub description: String,
    /// Banner or version text when the backend probed one.
    pub details: Option<String>,
}

impl PortResult {
    pub fn is_open(&self) -> bool {
        self.status == PortStatus::Open
    }
}

impl Keyed for PortResult {
    type Key = u16;

    fn key(&self) -> u16 {
        self.number
    }
}
