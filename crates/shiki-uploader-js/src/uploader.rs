//! JsFileUploader: the uploader as a JavaScript class.

use std::rc::Rc;

use js_sys::{Array, Function, Object, Reflect};
use serde::Serialize;
use shiki_uploader_browser::{
    FileUploader, HeaderSource, ListenerId, Notifier, StaticTranslator, Translator,
    UploaderEvent, UploaderEventKind, UploaderOptions as BrowserOptions,
};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{FileList, HtmlElement, HtmlInputElement};

use crate::types::UploaderOptions;

/// Drag-and-drop file uploader bound to a drop target.
#[wasm_bindgen]
pub struct JsFileUploader {
    uploader: FileUploader,
}

#[wasm_bindgen]
impl JsFileUploader {
    /// Attach an uploader to `node`.
    ///
    /// - `flash`: object with an `error(message)` method for user-visible errors
    /// - `input`: file input to bind; defaults to the first one inside `node`
    /// - `xhrHeaders`: called before every request, returns a header object
    /// - `translate`: `(key, params) => string` overriding the built-in strings
    #[wasm_bindgen(constructor)]
    pub fn new(
        node: HtmlElement,
        options: UploaderOptions,
        flash: JsValue,
        input: Option<HtmlInputElement>,
        xhr_headers: Option<Function>,
        translate: Option<Function>,
    ) -> Result<JsFileUploader, JsError> {
        let config = options
            .into_config()
            .map_err(|e| JsError::new(&format!("Invalid uploader options: {}", e)))?;
        let fallback = StaticTranslator::new(config.locale);

        let translator: Rc<dyn Translator> = match translate {
            Some(function) => Rc::new(JsTranslator { function, fallback }),
            None => Rc::new(fallback),
        };
        let headers = xhr_headers.map(|function| -> HeaderSource {
            Rc::new(move || headers_from_js(&function))
        });

        let uploader = FileUploader::new(
            node,
            BrowserOptions {
                config,
                notifier: Rc::new(JsNotifier { flash }),
                translator,
                headers,
                input,
            },
        )
        .map_err(|e| JsError::new(&format!("Failed to attach uploader: {}", e)))?;

        Ok(Self { uploader })
    }

    /// Subscribe to `upload:file:success`, `upload:complete` or
    /// `upload:failure`. Returns an id for `off`.
    pub fn on(&self, event: &str, callback: Function) -> Result<u32, JsError> {
        let kind: UploaderEventKind = event
            .parse()
            .map_err(|e| JsError::new(&format!("{}", e)))?;

        let listener = Rc::new(move |event: &UploaderEvent| {
            let arg = match event {
                UploaderEvent::FileSuccess(response) => response_to_js(response),
                _ => JsValue::undefined(),
            };
            if let Err(e) = callback.call1(&JsValue::null(), &arg) {
                tracing::warn!("Upload listener threw: {:?}", e);
            }
        });
        Ok(self.uploader.on(kind, listener).0)
    }

    /// Detach a listener registered with `on`.
    pub fn off(&self, id: u32) -> bool {
        self.uploader.off(ListenerId(id))
    }

    #[wasm_bindgen(js_name = addFiles)]
    pub fn add_files(&self, files: FileList) {
        let files = (0..files.length()).filter_map(|i| files.get(i)).collect();
        self.uploader.add_files(files);
    }

    #[wasm_bindgen(js_name = isDragActive)]
    pub fn is_drag_active(&self) -> bool {
        self.uploader.is_drag_active()
    }

    pub fn destroy(&self) {
        self.uploader.destroy();
    }
}

/// Calls `flash.error(message)` on the host's flash object.
struct JsNotifier {
    flash: JsValue,
}

impl Notifier for JsNotifier {
    fn error(&self, message: &str) {
        let method = Reflect::get(&self.flash, &JsValue::from_str("error"))
            .ok()
            .and_then(|value| value.dyn_into::<Function>().ok());
        let Some(method) = method else {
            tracing::warn!(message, "No flash.error, dropping message");
            return;
        };
        if let Err(e) = method.call1(&self.flash, &JsValue::from_str(message)) {
            tracing::warn!("flash.error threw: {:?}", e);
        }
    }
}

/// Host-provided lookup; keys it does not know fall back to the built-in
/// tables.
struct JsTranslator {
    function: Function,
    fallback: StaticTranslator,
}

impl Translator for JsTranslator {
    fn translate(&self, key: &str, params: &[(&str, String)]) -> String {
        let object = Object::new();
        for (name, value) in params {
            let _ = Reflect::set(&object, &JsValue::from_str(name), &JsValue::from_str(value));
        }

        match self
            .function
            .call2(&JsValue::null(), &JsValue::from_str(key), &object)
        {
            Ok(value) => match value.as_string() {
                Some(text) if !text.is_empty() && text != key => text,
                _ => self.fallback.translate(key, params),
            },
            Err(e) => {
                tracing::debug!("Host translate threw for {}: {:?}", key, e);
                self.fallback.translate(key, params)
            }
        }
    }
}

/// Read `{ name: value }` pairs from the host's header callback.
fn headers_from_js(function: &Function) -> Vec<(String, String)> {
    let value = match function.call0(&JsValue::null()) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("xhrHeaders threw: {:?}", e);
            return Vec::new();
        }
    };
    let Some(object) = value.dyn_ref::<Object>() else {
        return Vec::new();
    };

    Object::entries(object)
        .iter()
        .filter_map(|entry| {
            let pair = entry.dyn_into::<Array>().ok()?;
            Some((pair.get(0).as_string()?, pair.get(1).as_string()?))
        })
        .collect()
}

/// Plain JS objects rather than `Map`s, so hosts can read `response.url`.
fn response_to_js(response: &serde_json::Value) -> JsValue {
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    response.serialize(&serializer).unwrap_or_else(|e| {
        tracing::warn!("Response conversion failed: {}", e);
        JsValue::undefined()
    })
}
