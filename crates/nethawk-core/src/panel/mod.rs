// ── Per-panel synchronizers ──
//
// One state type per dashboard panel, each a `Reducer` over its slice of
// the push-channel traffic plus the user intents that panel accepts.

mod bandwidth;
mod ftp;
mod mail;
mod network;
mod overview;
mod ports;

use serde::Serialize;

pub use bandwidth::BandwidthState;
pub use ftp::FtpState;
pub use mail::{InboxRequest, MailState};
pub use network::NetworkScanState;
pub use overview::{OverviewState, OverviewUpdate};
pub use ports::PortScanState;

/// Dashboard panels, in screen order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    strum::Display,
    strum::EnumIter,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum PanelKind {
    Overview,
    Network,
    Bandwidth,
    #[strum(serialize = "Ports", serialize = "port-scan")]
    Ports,
    #[strum(serialize = "FTP", serialize = "ftp")]
    Ftp,
    Mail,
}
