//! shiki-uploader-core: drag-and-drop upload coordination without framework
//! dependencies.
//!
//! This crate provides:
//! - `DragSentinel` - debounced file-drag detection driving the `DropOverlay`
//! - `TaskStore` - transport bookkeeping with restriction checks
//! - `UploadQueue` and `report` - batch aggregates and the progress line
//! - `UploadController` - the upload lifecycle state machine
//! - `EventEmitter` - host listeners for `upload:*` events
//!
//! Drawing, timers and I/O live behind the traits in `platform`.

pub mod config;
pub mod controller;
pub mod drag;
pub mod error;
pub mod events;
pub mod i18n;
pub mod overlay;
pub mod platform;
pub mod progress;
pub mod queue;
pub mod restrictions;
pub mod store;
pub mod types;

pub use config::{Restrictions, UploaderConfig};
pub use controller::{Effect, Notice, Phase, UploadController};
pub use drag::{DeferredLeave, DragPayload, DragResponse, DragSentinel, DragState, LeaveTicket};
pub use error::{
    ConfigError, PlatformError, RestrictionError, TransportError, UploaderError, format_size,
};
pub use events::{
    EventEmitter, Listener, ListenerId, TransportEvent, UnknownEvent, UploaderEvent,
    UploaderEventKind,
};
pub use i18n::{I18nKey, Locale, StaticTranslator, Translator, interpolate};
pub use overlay::{DropOverlay, OverlayStyle};
pub use platform::{Notifier, OverlaySurface, ProgressView, TargetBox};
pub use progress::{ProgressFrame, ProgressReport, ProgressSnapshot, report};
pub use queue::UploadQueue;
pub use smol_str::SmolStr;
pub use store::{TaskLookup, TaskStore};
pub use types::{FileId, FileMeta, UploadProgress, UploadStatus, UploadTask, kilobytes};
