//! Screen identifiers and tab order.

use std::fmt;

/// One per dashboard panel, reachable with number keys 1-6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScreenId {
    #[default]
    Overview,
    Network,
    Bandwidth,
    Ports,
    Ftp,
    Mail,
}

impl ScreenId {
    /// Tab-bar order.
    pub const ALL: [ScreenId; 6] = [
        Self::Overview,
        Self::Network,
        Self::Bandwidth,
        Self::Ports,
        Self::Ftp,
        Self::Mail,
    ];

    pub fn number(self) -> u8 {
        match self {
            Self::Overview => 1,
            Self::Network => 2,
            Self::Bandwidth => 3,
            Self::Ports => 4,
            Self::Ftp => 5,
            Self::Mail => 6,
        }
    }

    pub fn from_number(n: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.number() == n)
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|&s| s == self).unwrap_or(0)
    }

    /// Next screen in tab order, wrapping.
    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    /// Previous screen in tab order, wrapping.
    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Overview => "Overview",
            Self::Network => "Network",
            Self::Bandwidth => "Bandwidth",
            Self::Ports => "Ports",
            Self::Ftp => "FTP",
            Self::Mail => "Mail",
        }
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_round_trip() {
        for id in ScreenId::ALL {
            assert_eq!(ScreenId::from_number(id.number()), Some(id));
        }
        assert_eq!(ScreenId::from_number(0), None);
        assert_eq!(ScreenId::from_number(7), None);
    }

    #[test]
    fn tab_order_wraps() {
        assert_eq!(ScreenId::Mail.next(), ScreenId::Overview);
        assert_eq!(ScreenId::Overview.prev(), ScreenId::Mail);
        assert_eq!(ScreenId::Bandwidth.next(), ScreenId::Ports);
    }
}
