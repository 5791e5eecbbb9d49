//! Drop target visibility probe.

use shiki_uploader_core::TargetBox;
use web_sys::HtmlElement;

/// Rendered box of `element`, or `None` if it is detached, has no layout
/// boxes, or is hidden with `visibility: hidden`.
pub fn target_box(element: &HtmlElement) -> Option<TargetBox> {
    if !element.is_connected() {
        return None;
    }

    let width = element.offset_width();
    let height = element.offset_height();
    if width == 0 && height == 0 && element.get_client_rects().length() == 0 {
        return None;
    }

    let hidden = web_sys::window()
        .and_then(|window| window.get_computed_style(element).ok().flatten())
        .and_then(|style| style.get_property_value("visibility").ok())
        .is_some_and(|visibility| visibility == "hidden");
    if hidden {
        return None;
    }

    Some(TargetBox::new(width as f64, height as f64))
}

pub fn is_visible(element: &HtmlElement) -> bool {
    target_box(element).is_some_and(|b| !b.is_empty())
}
