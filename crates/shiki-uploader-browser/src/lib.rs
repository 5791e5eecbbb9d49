//! Browser DOM layer for the shiki upload coordinator.
//!
//! This crate binds the platform traits of `shiki-uploader-core` to the DOM.
//! It assumes a `wasm32-unknown-unknown` target environment.
//!
//! # Architecture
//!
//! - `drag`: drag event decoding and default-prevention
//! - `visibility`: drop target visibility probe
//! - `overlay`: DOM implementation of `OverlaySurface`
//! - `progress`: DOM implementation of `ProgressView`
//! - `transport`: XHR multipart upload transport
//! - `uploader`: the `FileUploader` facade wiring everything to a page
//!
//! # Re-exports
//!
//! This crate re-exports `shiki-uploader-core` for convenience, so consumers
//! only need to depend on `shiki-uploader-browser`.

// Re-export core crate
pub use shiki_uploader_core;
pub use shiki_uploader_core::*;

pub mod drag;
pub mod overlay;
pub mod progress;
pub mod transport;
pub mod uploader;
pub mod visibility;

pub use drag::{drop_effect_for, payload_from_event};
pub use overlay::{DomOverlaySurface, DropHandler, OverlayElement};
pub use progress::DomProgressBar;
pub use transport::{
    HeaderSource, TransportOptions, TransportSink, XhrTransport, rejection, response_outcome,
};
pub use uploader::{FileUploader, UploaderOptions};
pub use visibility::{is_visible, target_box};
