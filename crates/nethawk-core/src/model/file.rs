use serde::Serialize;

use crate::sync::Keyed;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FileKind {
    File,
    Directory,
    Symlink,
}

/// One entry of a remote directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    pub name: String,
    pub kind: FileKind,
    pub size: u64,
    pub modified: String,
    pub permissions: String,
    pub owner: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_target: Option<String>,
}

impl FileEntry {
    pub fn is_dir(&self) -> bool {
        self.kind == FileKind::Directory
    }
}

impl Keyed for FileEntry {
    type Key = String;

    fn key(&self) -> String {
        self.name.clone()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TransferDirection {
    Upload,
    Download,
}

/// Latest progress report for an in-flight FTP transfer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransferProgress {
    pub direction: TransferDirection,
    pub file_name: String,
    pub progress: f64,
    pub status: String,
    pub total_size: Option<u64>,
    pub transferred_size: Option<u64>,
}

impl TransferProgress {
    pub fn is_active(&self) -> bool {
        self.status == "transferring"
    }
}
