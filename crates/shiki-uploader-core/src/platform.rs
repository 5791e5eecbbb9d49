//! Platform abstraction traits for the upload coordinator.
//!
//! These traits define the interface between the coordination logic and the
//! platform that actually draws things (browser DOM, native UI, test doubles).

use crate::overlay::OverlayStyle;
use crate::progress::ProgressReport;

/// Rendered size of the drop target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetBox {
    pub width: f64,
    pub height: f64,
}

impl TargetBox {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Inline style for an overlay covering this box. The overlay starts
    /// transparent and is faded in on the next frame.
    pub fn overlay_style(&self, min_line_height: f64) -> String {
        format!(
            "width: {}px !important;height: {}px;line-height: {}px;opacity: 0",
            self.width,
            self.height,
            self.height.max(min_line_height)
        )
    }
}

/// Where the drop overlay is drawn.
///
/// `Handle` identifies one overlay element. A handle passed to `fade_out`
/// belongs to the surface from then on, so a removal scheduled for it can
/// never touch an overlay created later.
pub trait OverlaySurface {
    type Handle;

    /// Current rendered box of the drop target, or `None` when the target is
    /// hidden.
    fn target_box(&self) -> Option<TargetBox>;

    /// Create an overlay element covering `target`, fully transparent.
    fn create(&mut self, target: TargetBox, style: &OverlayStyle) -> Option<Self::Handle>;

    /// Animate the overlay to `opacity` on the next paint frame.
    fn fade_in(&mut self, handle: &Self::Handle, opacity: f64);

    /// Fade the overlay out and remove it once `fade_ms` has elapsed.
    fn fade_out(&mut self, handle: Self::Handle, fade_ms: u32);
}

/// The progress bar shown while a batch uploads.
pub trait ProgressView {
    /// Show the bar, creating it if needed, and reset it to 0%.
    fn activate(&mut self);

    fn update(&mut self, report: &ProgressReport);

    /// Remove the bar entirely.
    fn remove(&mut self);
}

/// User-visible, fire-and-forget notifications.
pub trait Notifier {
    fn error(&self, message: &str);
}

impl<F> Notifier for F
where
    F: Fn(&str),
{
    fn error(&self, message: &str) {
        self(message)
    }
}
