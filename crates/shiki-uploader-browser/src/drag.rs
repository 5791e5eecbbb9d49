//! Drag event decoding.
//!
//! Turns `DragEvent`s into the payload the sentinel understands and applies
//! the sentinel's response back onto the event.

use shiki_uploader_core::{DragPayload, DragResponse};
use wasm_bindgen::JsCast;
use web_sys::{DragEvent, Event, File};

/// Inspect `DataTransfer.types` for a file payload.
pub fn payload_from_event(evt: &DragEvent) -> DragPayload {
    let Some(data_transfer) = evt.data_transfer() else {
        return DragPayload::other();
    };
    DragPayload::from_types(data_transfer.types().iter().filter_map(|ty| ty.as_string()))
}

/// Like `payload_from_event`, for listeners that only get an `Event`.
pub fn payload_from_any(evt: &Event) -> DragPayload {
    evt.dyn_ref::<DragEvent>()
        .map(payload_from_event)
        .unwrap_or_else(DragPayload::other)
}

/// `dropEffect` Chromium needs to accept a drop for a given `effectAllowed`.
pub fn drop_effect_for(effect_allowed: &str) -> &'static str {
    match effect_allowed {
        "move" | "linkMove" => "move",
        _ => "copy",
    }
}

/// Chromium refuses drops unless `dropEffect` matches `effectAllowed`.
pub fn fix_chrome_drop_effect(evt: &DragEvent) {
    if let Some(data_transfer) = evt.data_transfer() {
        data_transfer.set_drop_effect(drop_effect_for(&data_transfer.effect_allowed()));
    }
}

/// Prevent the default action and stop propagation if the sentinel handled
/// the event.
pub fn apply_response(evt: &Event, response: &DragResponse) {
    if response.handled {
        evt.prevent_default();
        evt.stop_propagation();
    }
}

/// Files carried by a drop.
pub fn dropped_files(evt: &DragEvent) -> Vec<File> {
    let Some(files) = evt.data_transfer().and_then(|dt| dt.files()) else {
        return Vec::new();
    };
    (0..files.length()).filter_map(|i| files.get(i)).collect()
}
