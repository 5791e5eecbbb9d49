//! Drop overlay lifecycle.
//!
//! `show` and `hide` are both idempotent. Hiding hands the current element to
//! the surface for its fade-out, so a `show` during that fade creates a
//! fresh element instead of reviving or double-removing the old one.

use crate::config::UploaderConfig;
use crate::i18n::{I18nKey, Translator};
use crate::platform::OverlaySurface;

/// Visual parameters of the overlay.
#[derive(Clone, Debug, PartialEq)]
pub struct OverlayStyle {
    /// Localized text shown on the overlay.
    pub text: String,
    pub opacity: f64,
    pub fade_ms: u32,
    pub min_line_height: f64,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            text: String::new(),
            opacity: 0.75,
            fade_ms: 350,
            min_line_height: 75.0,
        }
    }
}

impl OverlayStyle {
    pub fn from_config(config: &UploaderConfig, translator: &dyn Translator) -> Self {
        Self {
            text: translator.translate(I18nKey::DROP_PICTURES_HERE, &[]),
            opacity: config.overlay_opacity,
            fade_ms: config.fade_ms,
            min_line_height: config.overlay_min_line_height,
        }
    }
}

pub struct DropOverlay<S: OverlaySurface> {
    surface: S,
    style: OverlayStyle,
    current: Option<S::Handle>,
}

impl<S: OverlaySurface> DropOverlay<S> {
    pub fn new(surface: S, style: OverlayStyle) -> Self {
        Self {
            surface,
            style,
            current: None,
        }
    }

    pub fn is_shown(&self) -> bool {
        self.current.is_some()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Show the overlay. Returns whether it is shown afterwards.
    ///
    /// No-op when already shown, and when the target is hidden or has no size.
    pub fn show(&mut self) -> bool {
        if self.current.is_some() {
            return true;
        }

        let Some(target) = self.surface.target_box().filter(|b| !b.is_empty()) else {
            tracing::trace!("drop target not visible, overlay skipped");
            return false;
        };

        let Some(handle) = self.surface.create(target, &self.style) else {
            tracing::warn!("failed to create drop overlay");
            return false;
        };
        self.surface.fade_in(&handle, self.style.opacity);
        self.current = Some(handle);
        true
    }

    /// Hide the overlay. Returns whether anything was hidden.
    pub fn hide(&mut self) -> bool {
        let Some(handle) = self.current.take() else {
            return false;
        };
        self.surface.fade_out(handle, self.style.fade_ms);
        true
    }
}
