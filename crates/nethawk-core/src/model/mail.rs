// ── Mailbox types ──

use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;

use crate::sync::Keyed;

/// IMAP UID as the backend reports it.
///
/// UIDs are digit strings, so ordering is numeric when both sides parse
/// and falls back to text otherwise. Any non-numeric UID sorts before
/// every numeric one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct MailUid(String);

impl MailUid {
    pub fn new(uid: impl Into<String>) -> Self {
        Self(uid.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn numeric(&self) -> Option<u64> {
        self.0.parse().ok()
    }
}

impl Ord for MailUid {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.numeric(), &self.0).cmp(&(other.numeric(), &other.0))
    }
}

impl PartialOrd for MailUid {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for MailUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MailUid {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// Inbox row (headers only).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MailMessage {
    pub uid: MailUid,
    pub subject: String,
    pub from: String,
    pub date: String,
    pub message_id: String,
}

impl Keyed for MailMessage {
    type Key = MailUid;

    fn key(&self) -> MailUid {
        self.uid.clone()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct InboxSummary {
    pub unread: u64,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attachment {
    pub filename: String,
    pub content_type: String,
    pub size: u64,
}

/// A fully fetched message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailContent {
    pub uid: MailUid,
    pub subject: String,
    pub from: String,
    pub to: String,
    pub cc: String,
    pub bcc: String,
    pub date: String,
    pub message_id: String,
    pub body: String,
    pub plain_text_body: String,
    pub html_body: String,
    pub attachments: Vec<Attachment>,
}

impl EmailContent {
    /// Best body for a terminal: plain text, then the generic body,
    /// then the HTML source.
    pub fn display_body(&self) -> &str {
        [&self.plain_text_body, &self.body, &self.html_body]
            .into_iter()
            .find(|b| !b.trim().is_empty())
            .map_or("", String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uids_order_numerically() {
        let mut uids: Vec<MailUid> = ["100", "9", "17", "2"].into_iter().map(MailUid::from).collect();
        uids.sort();
        let ordered: Vec<&str> = uids.iter().map(MailUid::as_str).collect();
        assert_eq!(ordered, vec!["2", "9", "17", "100"]);
    }

    #[test]
    fn non_numeric_uids_sort_first() {
        assert!(MailUid::from("abc") < MailUid::from("1"));
        assert!(MailUid::from("abc") < MailUid::from("abd"));
    }
}
