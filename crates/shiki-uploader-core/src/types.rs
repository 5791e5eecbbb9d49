//! Core upload types: file identity, metadata, byte progress, and task status.
//!
//! These types are framework-agnostic; the browser layer fills them from
//! `web_sys::File` and XHR progress events.

use std::fmt::{self, Write as _};

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Opaque identifier of an upload task, assigned by the transport.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(SmolStr);

impl FileId {
    pub fn new(id: impl Into<SmolStr>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Derive an identifier from file metadata.
    ///
    /// The same file (name, type, size, modification time) always maps to the
    /// same id, which is what makes duplicate detection possible. Characters
    /// outside `[a-z0-9]` are escaped as `_<hex code>_`, so names differing only
    /// in punctuation stay distinct.
    pub fn from_meta(meta: &FileMeta) -> Self {
        let mut id = String::from("shiki");
        for part in [meta.name.as_str(), meta.mime_type.as_str()] {
            id.push('-');
            for c in part.chars().map(|c| c.to_ascii_lowercase()) {
                if c.is_ascii_alphanumeric() {
                    id.push(c);
                } else {
                    let _ = write!(id, "_{:x}_", c as u32);
                }
            }
        }
        id.push('-');
        id.push_str(&meta.size.to_string());
        if let Some(modified) = meta.last_modified {
            id.push('-');
            id.push_str(&modified.to_string());
        }
        Self(SmolStr::from(id))
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FileId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// What the transport knows about a file before it is uploaded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMeta {
    pub name: SmolStr,
    /// MIME type as reported by the platform. May be empty.
    pub mime_type: SmolStr,
    /// Size in bytes.
    pub size: u64,
    /// Milliseconds since the epoch, when the platform reports it.
    pub last_modified: Option<u64>,
}

impl FileMeta {
    pub fn new(name: impl Into<SmolStr>, mime_type: impl Into<SmolStr>, size: u64) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            size,
            last_modified: None,
        }
    }

    pub fn with_last_modified(mut self, last_modified: u64) -> Self {
        self.last_modified = Some(last_modified);
        self
    }

    /// Size rounded up to whole kilobytes.
    pub fn size_kb(&self) -> u64 {
        kilobytes(self.size)
    }
}

/// Round a byte count up to whole kilobytes.
pub fn kilobytes(bytes: u64) -> u64 {
    bytes.div_ceil(1024)
}

/// Byte-level progress of a single task.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadProgress {
    pub bytes_uploaded: u64,
    pub bytes_total: u64,
    /// Whole percent, 0..=100.
    pub percentage: u8,
}

impl UploadProgress {
    /// Progress of a file that has not started uploading.
    pub fn pending(bytes_total: u64) -> Self {
        Self {
            bytes_uploaded: 0,
            bytes_total,
            percentage: 0,
        }
    }

    /// Build progress from raw counters.
    ///
    /// `bytes_uploaded` is clamped to `bytes_total`, and the percentage is
    /// floored so a task only reads 100 once every byte is accounted for.
    pub fn new(bytes_uploaded: u64, bytes_total: u64) -> Self {
        let bytes_uploaded = bytes_uploaded.min(bytes_total);
        let percentage = if bytes_total == 0 {
            0
        } else {
            (bytes_uploaded * 100 / bytes_total) as u8
        };
        Self {
            bytes_uploaded,
            bytes_total,
            percentage,
        }
    }

    /// Progress of a finished upload.
    pub fn complete(bytes_total: u64) -> Self {
        Self {
            bytes_uploaded: bytes_total,
            bytes_total,
            percentage: 100,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.percentage == 100
    }
}

/// Terminal status of an upload task.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    #[default]
    Pending,
    Succeeded,
    Failed,
}

impl UploadStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, UploadStatus::Pending)
    }
}

/// A file known to the transport, with its progress and status.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadTask {
    pub id: FileId,
    pub meta: FileMeta,
    pub progress: UploadProgress,
    pub status: UploadStatus,
    /// Whether the task has been handed to an upload run.
    pub started: bool,
    /// Acceptance order; runs upload files in this order.
    pub sequence: u64,
}

impl UploadTask {
    pub fn new(id: FileId, meta: FileMeta) -> Self {
        let progress = UploadProgress::pending(meta.size);
        Self {
            id,
            meta,
            progress,
            status: UploadStatus::Pending,
            started: false,
            sequence: 0,
        }
    }

    pub fn with_sequence(mut self, sequence: u64) -> Self {
        self.sequence = sequence;
        self
    }

    /// A task is settled once it either reached 100% or ended in a terminal status.
    pub fn is_settled(&self) -> bool {
        self.progress.is_complete() || self.status.is_terminal()
    }
}
