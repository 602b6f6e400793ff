// ── Connection profiles ──
//
// Read-through copies of backend-held configuration. The backend owns
// them; panels cache whatever the last bulk fetch returned.

use secrecy::SecretString;
use serde::Serialize;

use crate::sync::Keyed;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display, strum::EnumString)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum FtpProtocol {
    Ftp,
    Ftps,
    Sftp,
}

/// A stored FTP server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FtpProfile {
    pub id: String,
    pub name: String,
    pub host: String,
    pub port: u16,
    pub username: String,
    pub protocol: FtpProtocol,
}

impl FtpProfile {
    /// `host:port` as shown in listings and status badges.
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Keyed for FtpProfile {
    type Key = String;

    fn key(&self) -> String {
        self.id.clone()
    }
}

/// A stored IMAP/SMTP account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MailProfile {
    pub id: String,
    pub name: String,
    pub imap_host: String,
    pub imap_port: u16,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub username: String,
}

impl Keyed for MailProfile {
    type Key = String;

    fn key(&self) -> String {
        self.id.clone()
    }
}

/// Input for creating a mail profile. The password only travels to the
/// backend; it is never cached.
#[derive(Debug, Clone)]
pub struct NewMailProfile {
    pub name: String,
    pub imap_host: String,
    pub imap_port: u16,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub username: String,
    pub password: SecretString,
}
