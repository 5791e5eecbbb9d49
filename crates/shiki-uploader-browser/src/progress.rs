//! DOM progress bar.

use shiki_uploader_core::{PlatformError, ProgressReport, ProgressView};
use wasm_bindgen::JsCast;
use web_sys::HtmlElement;

pub const PROGRESS_CLASS: &str = "shiki-file_drop-upload_progress";
pub const BAR_CLASS: &str = "bar";
pub const ACTIVE_CLASS: &str = "active";

struct ProgressNode {
    container: HtmlElement,
    bar: HtmlElement,
}

/// Progress node inserted before the drop target while a batch uploads.
///
/// Nothing is drawn for a hidden target; updates are then dropped silently.
pub struct DomProgressBar {
    target: HtmlElement,
    node: Option<ProgressNode>,
}

impl DomProgressBar {
    pub fn new(target: HtmlElement) -> Self {
        Self { target, node: None }
    }

    pub fn container(&self) -> Option<&HtmlElement> {
        self.node.as_ref().map(|node| &node.container)
    }

    pub fn bar(&self) -> Option<&HtmlElement> {
        self.node.as_ref().map(|node| &node.bar)
    }

    fn ensure_node(&mut self) -> Result<Option<&ProgressNode>, PlatformError> {
        if self.node.is_none() {
            if !crate::visibility::is_visible(&self.target) {
                return Ok(None);
            }
            self.node = Some(self.build()?);
        }
        Ok(self.node.as_ref())
    }

    fn build(&self) -> Result<ProgressNode, PlatformError> {
        let document = self
            .target
            .owner_document()
            .ok_or("drop target has no document")?;
        let create = |class: &str| -> Result<HtmlElement, PlatformError> {
            let element = document
                .create_element("div")
                .map_err(|e| format!("create_element failed: {:?}", e))?
                .dyn_into::<HtmlElement>()
                .map_err(|_| "progress node is not an HtmlElement")?;
            element.set_class_name(class);
            Ok(element)
        };

        let container = create(PROGRESS_CLASS)?;
        let bar = create(BAR_CLASS)?;
        container
            .append_child(&bar)
            .map_err(|e| format!("append_child failed: {:?}", e))?;

        let parent = self
            .target
            .parent_node()
            .ok_or("drop target is detached")?;
        parent
            .insert_before(&container, Some(&self.target))
            .map_err(|e| format!("insert_before failed: {:?}", e))?;

        Ok(ProgressNode { container, bar })
    }
}

impl ProgressView for DomProgressBar {
    fn activate(&mut self) {
        match self.ensure_node() {
            Ok(Some(node)) => {
                let _ = node.container.class_list().add_1(ACTIVE_CLASS);
                let _ = node.bar.style().set_property("width", "0%");
            }
            Ok(None) => tracing::trace!("drop target hidden, progress bar skipped"),
            Err(e) => tracing::warn!("Progress bar creation failed: {}", e),
        }
    }

    fn update(&mut self, report: &ProgressReport) {
        let Some(node) = &self.node else {
            return;
        };
        node.bar.set_inner_text(&report.text);
        let _ = node.bar.style().set_property("width", &report.css_width());
    }

    fn remove(&mut self) {
        if let Some(node) = self.node.take() {
            node.container.remove();
        }
    }
}
