// ── Discovered network devices ──

use std::net::Ipv4Addr;

use serde::Serialize;

use crate::sync::Keyed;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display, strum::EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DeviceKind {
    Computer,
    Phone,
    Server,
    Router,
    Iot,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DeviceStatus {
    Online,
    Offline,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Vulnerability {
    Low,
    Medium,
    High,
}

/// Network discovery depth.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum NetworkScanType {
    #[default]
    Quick,
    Full,
    Stealth,
}

/// A host found on the local network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Device {
    pub ip: Ipv4Addr,
    pub mac: String,
    pub hostname: String,
    pub vendor: String,
    pub kind: DeviceKind,
    pub status: DeviceStatus,
    pub last_seen: String,
    pub open_ports: Vec<u16>,
    pub vulnerability: Option<Vulnerability>,
}

impl Device {
    pub fn is_online(&self) -> bool {
        self.status == DeviceStatus::Online
    }
}

impl Keyed for Device {
    type Key = Ipv4Addr;

    fn key(&self) -> Ipv4Addr {
        self.ip
    }
}
