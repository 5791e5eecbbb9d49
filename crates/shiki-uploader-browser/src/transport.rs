//! XHR upload transport.
//!
//! Accepts files into a `TaskStore`, POSTs each one as multipart form data
//! and reports every outcome as a `TransportEvent`. The sink is always
//! invoked with no store borrow held, so it may read the store through
//! `tasks()` or queue more files.

use std::cell::{Ref, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use gloo_events::EventListener;
use serde_json::Value;
use shiki_uploader_core::{
    FileId, FileMeta, PlatformError, Restrictions, TaskLookup, TaskStore, TransportError,
    TransportEvent,
};
use wasm_bindgen::JsCast;
use web_sys::{File, FormData, ProgressEvent, XmlHttpRequest};

/// Per-request headers, computed when each request is sent.
pub type HeaderSource = Rc<dyn Fn() -> Vec<(String, String)>>;

/// Receives every transport event.
pub type TransportSink = Rc<dyn Fn(TransportEvent)>;

/// Where and how files are sent.
#[derive(Clone)]
pub struct TransportOptions {
    pub endpoint: String,
    pub field_name: String,
    pub restrictions: Restrictions,
    pub headers: Option<HeaderSource>,
}

/// An in-flight request and the listeners bound to it.
struct Request {
    xhr: XmlHttpRequest,
    _listeners: Vec<EventListener>,
}

struct Shared {
    endpoint: String,
    field_name: String,
    headers: Option<HeaderSource>,
    sink: TransportSink,
    store: RefCell<TaskStore>,
    files: RefCell<HashMap<FileId, File>>,
    requests: RefCell<HashMap<FileId, Request>>,
}

#[derive(Clone)]
pub struct XhrTransport {
    shared: Rc<Shared>,
}

impl XhrTransport {
    pub fn new(options: TransportOptions, sink: TransportSink) -> Self {
        Self {
            shared: Rc::new(Shared {
                endpoint: options.endpoint,
                field_name: options.field_name,
                headers: options.headers,
                sink,
                store: RefCell::new(TaskStore::new(options.restrictions)),
                files: RefCell::new(HashMap::new()),
                requests: RefCell::new(HashMap::new()),
            }),
        }
    }

    /// Read access to the task store.
    pub fn tasks(&self) -> Ref<'_, TaskStore> {
        self.shared.store.borrow()
    }

    /// Forget settled tasks once their batch has been reported.
    pub fn prune_settled(&self) -> usize {
        self.shared.store.borrow_mut().prune_settled()
    }

    /// Validate and upload `files`. Refused files are reported as
    /// `RestrictionFailed`; the rest start uploading right away.
    pub fn add_files(&self, files: impl IntoIterator<Item = File>) {
        let mut events = Vec::new();
        for file in files {
            let meta = file_meta(&file);
            let accepted = self.shared.store.borrow_mut().accept(meta.clone());
            match accepted {
                Ok(id) => {
                    self.shared.files.borrow_mut().insert(id, file);
                }
                Err(error) => events.push(TransportEvent::RestrictionFailed {
                    file: Some(meta),
                    error,
                }),
            }
        }
        self.shared.emit_all(events);
        Shared::start_run(&self.shared);
    }
}

impl Shared {
    fn emit_all(&self, events: Vec<TransportEvent>) {
        for event in events {
            (self.sink)(event);
        }
    }

    fn start_run(this: &Rc<Self>) {
        let run = this.store.borrow_mut().begin_run();
        let ids = match run {
            Ok((ids, event)) => {
                if ids.is_empty() {
                    return;
                }
                (this.sink)(event);
                ids
            }
            Err(event) => {
                this.forget_dropped_files();
                (this.sink)(event);
                return;
            }
        };

        for id in ids {
            if let Err(e) = Self::send(this, &id) {
                tracing::warn!(%id, "Upload could not be started: {}", e);
                this.requests.borrow_mut().remove(&id);
                let events = this
                    .store
                    .borrow_mut()
                    .record_error(&id, TransportError::Network(e.0));
                this.files.borrow_mut().remove(&id);
                this.emit_all(events);
            }
        }
    }

    fn send(this: &Rc<Self>, id: &FileId) -> Result<(), PlatformError> {
        let file = this
            .files
            .borrow()
            .get(id)
            .cloned()
            .ok_or("file handle missing")?;

        let form = FormData::new().map_err(|e| format!("FormData failed: {:?}", e))?;
        form.append_with_blob_and_filename(&this.field_name, &file, &file.name())
            .map_err(|e| format!("FormData append failed: {:?}", e))?;

        let xhr = XmlHttpRequest::new().map_err(|e| format!("XMLHttpRequest failed: {:?}", e))?;
        xhr.open_with_async("POST", &this.endpoint, true)
            .map_err(|e| format!("open failed: {:?}", e))?;
        xhr.set_request_header("x-requested-with", "XMLHttpRequest")
            .map_err(|e| format!("set_request_header failed: {:?}", e))?;
        if let Some(headers) = &this.headers {
            for (name, value) in headers() {
                xhr.set_request_header(&name, &value)
                    .map_err(|e| format!("set_request_header {name} failed: {:?}", e))?;
            }
        }

        let upload = xhr.upload().map_err(|e| format!("upload target failed: {:?}", e))?;
        let weak = Rc::downgrade(this);
        let listeners = vec![
            {
                let (weak, id) = (weak.clone(), id.clone());
                EventListener::new(&upload, "progress", move |evt| {
                    let Some(evt) = evt.dyn_ref::<ProgressEvent>() else {
                        return;
                    };
                    if evt.length_computable() {
                        with_shared(&weak, |shared| {
                            shared.on_progress(&id, evt.loaded() as u64, evt.total() as u64)
                        });
                    }
                })
            },
            {
                let (weak, id) = (weak.clone(), id.clone());
                EventListener::new(&xhr, "load", move |_| {
                    with_shared(&weak, |shared| shared.on_load(&id));
                })
            },
            {
                let (weak, id) = (weak.clone(), id.clone());
                EventListener::new(&xhr, "error", move |_| {
                    with_shared(&weak, |shared| {
                        shared.on_failure(&id, TransportError::Network("request failed".into()))
                    });
                })
            },
            {
                let id = id.clone();
                EventListener::new(&xhr, "abort", move |_| {
                    with_shared(&weak, |shared| {
                        shared.on_failure(&id, TransportError::Network("request aborted".into()))
                    });
                })
            },
        ];

        this.requests.borrow_mut().insert(
            id.clone(),
            Request {
                xhr: xhr.clone(),
                _listeners: listeners,
            },
        );
        xhr.send_with_opt_form_data(Some(&form))
            .map_err(|e| format!("send failed: {:?}", e))?;

        tracing::debug!(%id, endpoint = %this.endpoint, "upload sent");
        Ok(())
    }

    fn on_progress(&self, id: &FileId, loaded: u64, total: u64) {
        let event = self.store.borrow_mut().record_progress(id, loaded, total);
        if let Some(event) = event {
            (self.sink)(event);
        }
    }

    fn on_load(&self, id: &FileId) {
        let Some(request) = self.finish(id) else {
            return;
        };
        let status = request.xhr.status().unwrap_or(0);
        let body = request
            .xhr
            .response_text()
            .ok()
            .flatten()
            .unwrap_or_default();
        release(request);

        let events = match response_outcome(status, body) {
            Ok(response) => self.store.borrow_mut().record_success(id, response),
            Err(error) => {
                tracing::debug!(%id, status, "upload rejected");
                self.store.borrow_mut().record_error(id, error)
            }
        };
        self.emit_all(events);
    }

    fn on_failure(&self, id: &FileId, error: TransportError) {
        let Some(request) = self.finish(id) else {
            return;
        };
        release(request);
        let events = self.store.borrow_mut().record_error(id, error);
        self.emit_all(events);
    }

    fn finish(&self, id: &FileId) -> Option<Request> {
        self.files.borrow_mut().remove(id);
        self.requests.borrow_mut().remove(id)
    }

    /// Drop file handles whose tasks the store no longer knows.
    fn forget_dropped_files(&self) {
        let store = self.store.borrow();
        self.files
            .borrow_mut()
            .retain(|id, _| store.task(id).is_some());
    }
}

fn with_shared(weak: &Weak<Shared>, f: impl FnOnce(&Shared)) {
    if let Some(shared) = weak.upgrade() {
        f(&shared);
    }
}

/// The request's listeners may be the ones running right now, so they are
/// dropped on a later tick.
fn release(request: Request) {
    wasm_bindgen_futures::spawn_local(async move {
        drop(request);
    });
}

/// Interpret a finished request. A 2xx body is parsed as JSON, falling back
/// to the raw text; anything else is a rejection.
pub fn response_outcome(status: u16, body: String) -> Result<Value, TransportError> {
    if (200..300).contains(&status) {
        Ok(serde_json::from_str(&body).unwrap_or(Value::String(body)))
    } else {
        Err(rejection(&body))
    }
}

/// Error for a non-2xx response. A JSON body with an `error` or `message`
/// string carries the server's explanation.
pub fn rejection(body: &str) -> TransportError {
    let message = serde_json::from_str::<Value>(body).ok().and_then(|value| {
        ["error", "message"]
            .iter()
            .find_map(|key| value.get(key).and_then(Value::as_str).map(str::to_owned))
    });
    match message {
        Some(message) if !message.trim().is_empty() => TransportError::Rejected(message),
        _ => TransportError::Generic,
    }
}

pub fn file_meta(file: &File) -> FileMeta {
    FileMeta::new(file.name(), file.type_(), file.size() as u64)
        .with_last_modified(file.last_modified() as u64)
}
