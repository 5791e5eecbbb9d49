//! WASM browser tests for shiki-uploader-browser.
//!
//! Run with: `wasm-pack test --headless --firefox` or `--chrome`

use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::future::TimeoutFuture;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_test::*;
use web_sys::{DataTransfer, DragEvent, DragEventInit, File, HtmlElement};

wasm_bindgen_test_configure!(run_in_browser);

use serde_json::{Value, json};
use shiki_uploader_browser::{
    DomOverlaySurface, DomProgressBar, DropOverlay, Effect, FileMeta, FileUploader,
    OverlayStyle, ProgressReport, ProgressView, Restrictions, StaticTranslator, TaskStore,
    TransportError, UploadController, UploaderConfig, UploaderError, UploaderEvent,
    UploaderOptions, drop_effect_for, is_visible, payload_from_event, rejection,
    response_outcome, target_box,
};

fn document() -> web_sys::Document {
    web_sys::window().unwrap().document().unwrap()
}

/// A sized target inside its own wrapper, attached to the body.
fn make_target(style: &str) -> HtmlElement {
    let doc = document();
    let wrapper = doc.create_element("div").unwrap();
    let target: HtmlElement = doc.create_element("div").unwrap().dyn_into().unwrap();
    target.set_attribute("style", style).unwrap();
    wrapper.append_child(&target).unwrap();
    doc.body().unwrap().append_child(&wrapper).unwrap();
    target
}

/// A file without a MIME type, which the default restrictions refuse.
fn untyped_file(name: &str) -> File {
    let parts = js_sys::Array::of1(&JsValue::from_str("png bytes"));
    File::new_with_str_sequence(&parts, name).unwrap()
}

fn drag_event(event_type: &str, with_file: bool) -> DragEvent {
    let data_transfer = DataTransfer::new().unwrap();
    if with_file {
        data_transfer
            .items()
            .add_with_file(&untyped_file("a.png"))
            .unwrap();
    } else {
        data_transfer.set_data("text/plain", "hello").unwrap();
    }
    let init = DragEventInit::new();
    init.set_bubbles(true);
    init.set_cancelable(true);
    init.set_data_transfer(Some(&data_transfer));
    DragEvent::new_with_event_init_dict(event_type, &init).unwrap()
}

fn placeholders() -> u32 {
    document()
        .get_elements_by_class_name("shiki-file_drop-placeholder")
        .length()
}

// === Drag decoding ===

#[wasm_bindgen_test]
fn test_file_payload_detected() {
    assert!(payload_from_event(&drag_event("dragenter", true)).has_files);
}

#[wasm_bindgen_test]
fn test_text_payload_ignored() {
    assert!(!payload_from_event(&drag_event("dragenter", false)).has_files);
}

#[wasm_bindgen_test]
fn test_drop_effect() {
    assert_eq!(drop_effect_for("move"), "move");
    assert_eq!(drop_effect_for("linkMove"), "move");
    assert_eq!(drop_effect_for("all"), "copy");
    assert_eq!(drop_effect_for("uninitialized"), "copy");
}

#[wasm_bindgen_test]
fn test_rejection_messages() {
    assert_eq!(
        rejection(r#"{"error":"Image is too wide"}"#),
        TransportError::Rejected("Image is too wide".into())
    );
    assert_eq!(
        rejection(r#"{"message":"Nope"}"#),
        TransportError::Rejected("Nope".into())
    );
    assert_eq!(rejection("<html>502</html>"), TransportError::Generic);
    assert_eq!(rejection(r#"{"error":""}"#), TransportError::Generic);
}

#[wasm_bindgen_test]
fn test_response_outcome() {
    assert_eq!(
        response_outcome(200, r#"{"url":"/uploads/a.png"}"#.into()),
        Ok(json!({"url": "/uploads/a.png"}))
    );
    assert_eq!(
        response_outcome(201, "done".into()),
        Ok(Value::String("done".into()))
    );
    assert_eq!(
        response_outcome(422, r#"{"error":"Image is too wide"}"#.into()),
        Err(TransportError::Rejected("Image is too wide".into()))
    );
    assert_eq!(response_outcome(0, String::new()), Err(TransportError::Generic));
}

#[wasm_bindgen_test]
fn test_loaded_response_is_emitted() {
    let mut store = TaskStore::new(Restrictions::default());
    let mut controller = UploadController::new();
    let id = store
        .accept(FileMeta::new("a.png", "image/png", 10))
        .unwrap();
    let (_, start) = store.begin_run().unwrap();
    controller.handle(&start, &store);

    let response = response_outcome(200, r#"{"url":"/uploads/a.png"}"#.into()).unwrap();
    let effects: Vec<Effect> = store
        .record_success(&id, response)
        .iter()
        .flat_map(|event| controller.handle(event, &store))
        .collect();

    let emitted: Vec<&UploaderEvent> = effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::Emit(event) => Some(event),
            _ => None,
        })
        .collect();
    assert_eq!(
        emitted,
        vec![
            &UploaderEvent::FileSuccess(json!({"url": "/uploads/a.png"})),
            &UploaderEvent::Complete,
        ]
    );
}

// === Visibility ===

#[wasm_bindgen_test]
fn test_visible_target_box() {
    let target = make_target("width: 300px; height: 40px");
    let b = target_box(&target).expect("visible");
    assert_eq!((b.width, b.height), (300.0, 40.0));
    assert!(is_visible(&target));
}

#[wasm_bindgen_test]
fn test_hidden_targets() {
    assert!(!is_visible(&make_target("display: none")));
    assert!(!is_visible(&make_target(
        "width: 300px; height: 40px; visibility: hidden"
    )));

    let detached: HtmlElement = document()
        .create_element("div")
        .unwrap()
        .dyn_into()
        .unwrap();
    assert!(target_box(&detached).is_none());
}

// === Progress bar ===

#[wasm_bindgen_test]
fn test_progress_bar_lifecycle() {
    let target = make_target("width: 300px; height: 40px");
    let mut bar = DomProgressBar::new(target.clone());

    bar.activate();
    let container = bar.container().expect("created").clone();
    assert!(container.class_list().contains("shiki-file_drop-upload_progress"));
    assert!(container.class_list().contains("active"));
    assert_eq!(
        target.previous_element_sibling().map(|e| e.class_name()),
        Some("shiki-file_drop-upload_progress active".to_string())
    );

    bar.update(&ProgressReport {
        text: "Uploading a.png, 2 KB".into(),
        percent: 42.5,
    });
    let inner = bar.bar().expect("bar");
    assert_eq!(inner.inner_text(), "Uploading a.png, 2 KB");
    assert_eq!(inner.style().get_property_value("width").unwrap(), "42.5%");

    bar.remove();
    assert!(bar.container().is_none());
    assert!(!container.is_connected());
}

#[wasm_bindgen_test]
fn test_progress_bar_skipped_for_hidden_target() {
    let mut bar = DomProgressBar::new(make_target("display: none"));
    bar.activate();
    assert!(bar.container().is_none());
}

// === Overlay ===

#[wasm_bindgen_test]
async fn test_overlay_show_and_fade() {
    let target = make_target("width: 320px; height: 40px");
    let drops = Rc::new(RefCell::new(0));
    let counter = drops.clone();
    let surface = DomOverlaySurface::new(
        target.clone(),
        Rc::new(move |_: &DragEvent| *counter.borrow_mut() += 1),
    );
    let mut overlay = DropOverlay::new(
        surface,
        OverlayStyle {
            text: "Drop pictures here".into(),
            fade_ms: 20,
            ..OverlayStyle::default()
        },
    );

    assert!(overlay.show());
    let element: HtmlElement = target
        .previous_element_sibling()
        .expect("overlay inserted")
        .dyn_into()
        .unwrap();
    assert_eq!(element.class_name(), "shiki-file_drop-placeholder");
    assert_eq!(
        element.get_attribute("data-text").as_deref(),
        Some("Drop pictures here")
    );
    assert_eq!(element.style().get_property_value("line-height").unwrap(), "75px");

    element.dispatch_event(&drag_event("dragenter", true)).unwrap();
    assert!(element.class_list().contains("hovered"));
    element.dispatch_event(&drag_event("dragleave", true)).unwrap();
    assert!(!element.class_list().contains("hovered"));

    element.dispatch_event(&drag_event("drop", true)).unwrap();
    assert_eq!(*drops.borrow(), 1);

    assert!(overlay.hide());
    assert_eq!(element.style().get_property_value("opacity").unwrap(), "0");
    assert!(element.is_connected());

    TimeoutFuture::new(60).await;
    assert!(!element.is_connected());
}

// === FileUploader ===

fn options(endpoint: &str) -> UploaderOptions {
    options_with_notifier(endpoint, Rc::new(|_: &str| {}))
}

fn options_with_notifier(
    endpoint: &str,
    notifier: Rc<dyn shiki_uploader_browser::Notifier>,
) -> UploaderOptions {
    UploaderOptions {
        config: UploaderConfig {
            leave_debounce_ms: 20,
            fade_ms: 10,
            ..UploaderConfig::new(endpoint)
        },
        notifier,
        translator: Rc::new(StaticTranslator::default()),
        headers: None,
        input: None,
    }
}

#[wasm_bindgen_test]
fn test_uploader_requires_endpoint() {
    let target = make_target("width: 300px; height: 40px");
    assert!(matches!(
        FileUploader::new(target, options("")),
        Err(UploaderError::Config(_))
    ));
}

#[wasm_bindgen_test]
async fn test_uploader_drag_cycle() {
    let target = make_target("width: 300px; height: 40px");
    let uploader = FileUploader::new(target, options("/api/user_images")).unwrap();
    let before = placeholders();

    let enter = drag_event("dragenter", true);
    document().dispatch_event(&enter).unwrap();
    assert!(enter.default_prevented());
    assert!(uploader.is_drag_active());
    assert_eq!(placeholders(), before + 1);

    let over = drag_event("dragover", true);
    document().dispatch_event(&over).unwrap();
    assert!(over.default_prevented());

    document()
        .dispatch_event(&drag_event("dragleave", true))
        .unwrap();
    // Re-entering a sibling before the debounce ran out keeps the overlay.
    document()
        .dispatch_event(&drag_event("dragenter", true))
        .unwrap();
    TimeoutFuture::new(50).await;
    assert!(uploader.is_drag_active());

    document()
        .dispatch_event(&drag_event("dragleave", true))
        .unwrap();
    TimeoutFuture::new(50).await;
    assert!(!uploader.is_drag_active());
    assert_eq!(placeholders(), before);

    uploader.destroy();
}

#[wasm_bindgen_test]
fn test_uploader_ignores_text_drags() {
    let target = make_target("width: 300px; height: 40px");
    let uploader = FileUploader::new(target, options("/api/user_images")).unwrap();

    let enter = drag_event("dragenter", false);
    document().dispatch_event(&enter).unwrap();
    assert!(!enter.default_prevented());
    assert!(!uploader.is_drag_active());

    uploader.destroy();
}

#[wasm_bindgen_test]
fn test_destroy_detaches_listeners() {
    let target = make_target("width: 300px; height: 40px");
    let uploader = FileUploader::new(target, options("/api/user_images")).unwrap();
    uploader.destroy();

    let enter = drag_event("dragenter", true);
    document().dispatch_event(&enter).unwrap();
    assert!(!enter.default_prevented());
    assert!(!uploader.is_drag_active());
}

#[wasm_bindgen_test]
fn test_overlay_drop_queues_files() {
    let target = make_target("width: 300px; height: 40px");
    let flashes = Rc::new(RefCell::new(Vec::<String>::new()));
    let recorded = flashes.clone();
    let uploader = FileUploader::new(
        target.clone(),
        options_with_notifier(
            "/api/user_images",
            Rc::new(move |message: &str| recorded.borrow_mut().push(message.to_owned())),
        ),
    )
    .unwrap();

    document()
        .dispatch_event(&drag_event("dragenter", true))
        .unwrap();
    let overlay = target.previous_element_sibling().expect("overlay shown");

    let drop = drag_event("drop", true);
    overlay.dispatch_event(&drop).unwrap();
    assert!(drop.default_prevented());
    // Idle straight away, without waiting out the leave debounce.
    assert!(!uploader.is_drag_active());
    // The untyped file reached the store and was refused there.
    assert_eq!(
        *flashes.borrow(),
        vec!["You can only upload: image/jpg, image/jpeg, image/png".to_owned()]
    );

    uploader.destroy();
}

#[wasm_bindgen_test]
async fn test_document_drop_closes_overlay() {
    let target = make_target("width: 300px; height: 40px");
    let flashes = Rc::new(RefCell::new(Vec::<String>::new()));
    let recorded = flashes.clone();
    let uploader = FileUploader::new(
        target,
        options_with_notifier(
            "/api/user_images",
            Rc::new(move |message: &str| recorded.borrow_mut().push(message.to_owned())),
        ),
    )
    .unwrap();
    let before = placeholders();

    document()
        .dispatch_event(&drag_event("dragenter", true))
        .unwrap();
    assert_eq!(placeholders(), before + 1);

    let drop = drag_event("drop", true);
    document().dispatch_event(&drop).unwrap();
    assert!(drop.default_prevented());
    assert!(!uploader.is_drag_active());

    TimeoutFuture::new(50).await;
    assert_eq!(placeholders(), before);
    assert!(flashes.borrow().is_empty());

    uploader.destroy();
}

#[wasm_bindgen_test]
fn test_notifier_may_call_back_into_uploader() {
    let target = make_target("width: 300px; height: 40px");
    let slot: Rc<RefCell<Option<FileUploader>>> = Rc::new(RefCell::new(None));
    let flashes = Rc::new(RefCell::new(Vec::<String>::new()));
    let notifier = {
        let (slot, flashes) = (slot.clone(), flashes.clone());
        Rc::new(move |message: &str| {
            flashes.borrow_mut().push(message.to_owned());
            let uploader = slot.borrow().clone();
            if let Some(uploader) = uploader {
                assert!(!uploader.is_drag_active());
                uploader.add_files(Vec::new());
            }
        })
    };
    let uploader = FileUploader::new(target, options_with_notifier("/api/user_images", notifier))
        .unwrap();
    *slot.borrow_mut() = Some(uploader.clone());

    uploader.add_files(vec![untyped_file("a.png")]);
    assert_eq!(flashes.borrow().len(), 1);

    slot.borrow_mut().take();
    uploader.destroy();
}
