//! Transport events consumed by the controller, and the uploader events
//! emitted to host listeners.

use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use serde_json::Value;

use crate::error::{RestrictionError, TransportError};
use crate::types::{FileId, FileMeta, UploadProgress};

/// Events reported by the upload transport.
#[derive(Clone, Debug, PartialEq)]
pub enum TransportEvent {
    /// An upload run started with these files.
    Start { file_ids: Vec<FileId> },
    /// Byte progress for one file.
    Progress {
        file_id: FileId,
        progress: UploadProgress,
    },
    /// One file finished; `response` is the parsed response body.
    Success { file_id: FileId, response: Value },
    /// One file failed.
    Error {
        file_id: FileId,
        error: TransportError,
    },
    /// A file was refused before it was queued.
    RestrictionFailed {
        file: Option<FileMeta>,
        error: RestrictionError,
    },
    /// Every file of a run has settled.
    Complete {
        successful: Vec<FileId>,
        failed: Vec<FileId>,
    },
}

/// Kinds of events hosts can subscribe to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UploaderEventKind {
    FileSuccess,
    Complete,
    Failure,
}

impl UploaderEventKind {
    pub fn name(self) -> &'static str {
        match self {
            UploaderEventKind::FileSuccess => "upload:file:success",
            UploaderEventKind::Complete => "upload:complete",
            UploaderEventKind::Failure => "upload:failure",
        }
    }
}

impl fmt::Display for UploaderEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unknown event name passed to `on`.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown uploader event {0:?}")]
pub struct UnknownEvent(pub String);

impl FromStr for UploaderEventKind {
    type Err = UnknownEvent;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upload:file:success" => Ok(UploaderEventKind::FileSuccess),
            "upload:complete" => Ok(UploaderEventKind::Complete),
            "upload:failure" => Ok(UploaderEventKind::Failure),
            other => Err(UnknownEvent(other.to_string())),
        }
    }
}

/// Events emitted to host listeners.
#[derive(Clone, Debug, PartialEq)]
pub enum UploaderEvent {
    /// A single file uploaded; carries the server's response body.
    FileSuccess(Value),
    /// A batch finished and at least one file in it succeeded.
    Complete,
    /// A batch finished and nothing in it succeeded.
    Failure,
}

impl UploaderEvent {
    pub fn kind(&self) -> UploaderEventKind {
        match self {
            UploaderEvent::FileSuccess(_) => UploaderEventKind::FileSuccess,
            UploaderEvent::Complete => UploaderEventKind::Complete,
            UploaderEvent::Failure => UploaderEventKind::Failure,
        }
    }
}

/// Handle returned by `EventEmitter::on`, used to detach the listener again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u32);

pub type Listener = Rc<dyn Fn(&UploaderEvent)>;

/// Registry of host listeners.
///
/// Dispatch happens through `listeners_for`, which hands out clones of the
/// callbacks. Callers release whatever borrow guards the emitter before
/// invoking them, so a listener may register, detach, or queue more files.
#[derive(Default)]
pub struct EventEmitter {
    next_id: u32,
    listeners: Vec<(ListenerId, UploaderEventKind, Listener)>,
}

impl EventEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(&mut self, kind: UploaderEventKind, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, kind, listener));
        id
    }

    /// Detach a listener. Returns false if it was not registered.
    pub fn off(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _, _)| *listener_id != id);
        self.listeners.len() != before
    }

    pub fn listeners_for(&self, kind: UploaderEventKind) -> Vec<Listener> {
        self.listeners
            .iter()
            .filter(|(_, listener_kind, _)| *listener_kind == kind)
            .map(|(_, _, listener)| listener.clone())
            .collect()
    }

    pub fn clear(&mut self) {
        self.listeners.clear();
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventEmitter")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
