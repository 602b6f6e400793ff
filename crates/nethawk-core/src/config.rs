// ── Runtime dashboard configuration ──
//
// Describes *how* to reach the backend and how the panels are tuned.
// Never touches disk: the CLI/TUI build a `DashboardConfig` from their
// own config layer and hand it in.

use std::time::Duration;

use url::Url;

/// Push-channel reconnection policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    /// `None` retries forever.
    pub max_retries: Option<u32>,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            max_retries: None,
        }
    }
}

/// Configuration for a [`Dashboard`](crate::Dashboard).
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Backend root, e.g. `http://localhost:5000`.
    pub backend_url: Url,
    /// HTTP timeout, also the upper bound on waiting for the push channel.
    pub timeout: Duration,
    /// Accept self-signed certificates on `https` backends.
    pub insecure: bool,
    pub reconnect: ReconnectPolicy,
    /// Open the push channel on connect. The CLI turns this off for
    /// commands that only need HTTP.
    pub push_enabled: bool,
    /// Bandwidth samples kept for charts.
    pub bandwidth_history: usize,
    pub mail_per_page: u32,
    pub mailbox: String,
}

impl DashboardConfig {
    /// Configuration with stock tuning for `backend_url`.
    pub fn new(backend_url: Url) -> Self {
        Self {
            backend_url,
            timeout: Duration::from_secs(30),
            insecure: false,
            reconnect: ReconnectPolicy::default(),
            push_enabled: true,
            bandwidth_history: 30,
            mail_per_page: 10,
            mailbox: "INBOX".into(),
        }
    }

    pub(crate) fn transport(&self) -> nethawk_api::TransportConfig {
        nethawk_api::TransportConfig {
            timeout: self.timeout,
            accept_invalid_certs: self.insecure,
        }
    }

    pub(crate) fn reconnect_config(&self) -> nethawk_api::ReconnectConfig {
        nethawk_api::ReconnectConfig {
            initial_delay: self.reconnect.initial_delay,
            max_delay: self.reconnect.max_delay,
            max_retries: self.reconnect.max_retries,
        }
    }
}
