//! DOM drop overlay.
//!
//! Implements `OverlaySurface` by inserting a placeholder element right
//! before the drop target. Each element owns its hover and drop listeners;
//! they go away together when the element is removed after its fade.

use std::rc::Rc;

use gloo_events::{EventListener, EventListenerOptions};
use gloo_timers::callback::Timeout;
use shiki_uploader_core::{OverlayStyle, OverlaySurface, PlatformError, TargetBox};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{DragEvent, HtmlElement};

pub const OVERLAY_CLASS: &str = "shiki-file_drop-placeholder";
pub const HOVERED_CLASS: &str = "hovered";

/// Called for a `drop` on the overlay.
pub type DropHandler = Rc<dyn Fn(&DragEvent)>;

/// One overlay element and the listeners bound to it.
pub struct OverlayElement {
    element: HtmlElement,
    _listeners: [EventListener; 3],
}

impl OverlayElement {
    pub fn element(&self) -> &HtmlElement {
        &self.element
    }

    fn remove(self) {
        self.element.remove();
    }
}

pub struct DomOverlaySurface {
    target: HtmlElement,
    on_drop: DropHandler,
}

impl DomOverlaySurface {
    pub fn new(target: HtmlElement, on_drop: DropHandler) -> Self {
        Self { target, on_drop }
    }

    fn build(&self, target: TargetBox, style: &OverlayStyle) -> Result<OverlayElement, PlatformError> {
        let document = self
            .target
            .owner_document()
            .ok_or("drop target has no document")?;
        let element = document
            .create_element("div")
            .map_err(|e| format!("create_element failed: {:?}", e))?
            .dyn_into::<HtmlElement>()
            .map_err(|_| "overlay is not an HtmlElement")?;

        element.set_class_name(OVERLAY_CLASS);
        element
            .set_attribute("data-text", &style.text)
            .map_err(|e| format!("set data-text failed: {:?}", e))?;
        element
            .set_attribute("style", &target.overlay_style(style.min_line_height))
            .map_err(|e| format!("set style failed: {:?}", e))?;

        let hovered = element.clone();
        let enter = EventListener::new(&element, "dragenter", move |_| {
            let _ = hovered.class_list().add_1(HOVERED_CLASS);
        });
        let hovered = element.clone();
        let leave = EventListener::new(&element, "dragleave", move |_| {
            let _ = hovered.class_list().remove_1(HOVERED_CLASS);
        });
        let on_drop = self.on_drop.clone();
        let drop = EventListener::new_with_options(
            &element,
            "drop",
            EventListenerOptions::enable_prevent_default(),
            move |evt| {
                if let Some(evt) = evt.dyn_ref::<DragEvent>() {
                    on_drop(evt);
                }
            },
        );

        let parent = self
            .target
            .parent_node()
            .ok_or("drop target is detached")?;
        parent
            .insert_before(&element, Some(&self.target))
            .map_err(|e| format!("insert_before failed: {:?}", e))?;

        Ok(OverlayElement {
            element,
            _listeners: [enter, leave, drop],
        })
    }
}

impl OverlaySurface for DomOverlaySurface {
    type Handle = OverlayElement;

    fn target_box(&self) -> Option<TargetBox> {
        crate::visibility::target_box(&self.target)
    }

    fn create(&mut self, target: TargetBox, style: &OverlayStyle) -> Option<OverlayElement> {
        match self.build(target, style) {
            Ok(overlay) => Some(overlay),
            Err(e) => {
                tracing::warn!("Drop overlay creation failed: {}", e);
                None
            }
        }
    }

    fn fade_in(&mut self, handle: &OverlayElement, opacity: f64) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let element = handle.element.clone();
        let closure = Closure::once(move || {
            if let Err(e) = element.style().set_property("opacity", &opacity.to_string()) {
                tracing::debug!("Overlay fade-in failed: {:?}", e);
            }
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn fade_out(&mut self, handle: OverlayElement, fade_ms: u32) {
        let _ = handle.element.style().set_property("opacity", "0");
        // The overlay may be the element whose drop listener is running, so
        // its listeners are only released once the timeout fires.
        Timeout::new(fade_ms, move || handle.remove()).forget();
    }
}
