//! Screen implementations. Each screen is a top-level Component.

pub mod bandwidth;
pub mod ftp;
pub mod mail;
pub mod network;
pub mod overview;
pub mod ports;

use crate::component::Component;
use crate::screen::ScreenId;

/// One component per tab, in tab-bar order.
pub fn create_screens() -> Vec<(ScreenId, Box<dyn Component>)> {
    vec![
        (ScreenId::Overview, Box::new(overview::OverviewScreen::new())),
        (ScreenId::Network, Box::new(network::NetworkScreen::new())),
        (ScreenId::Bandwidth, Box::new(bandwidth::BandwidthScreen::new())),
        (ScreenId::Ports, Box::new(ports::PortsScreen::new())),
        (ScreenId::Ftp, Box::new(ftp::FtpScreen::new())),
        (ScreenId::Mail, Box::new(mail::MailScreen::new())),
    ]
}
