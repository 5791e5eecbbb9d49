//! `FileUploader`: the drag-and-drop upload coordinator bound to a page.
//!
//! Wires the document drag listeners into the `DragSentinel`, transport
//! events into the `UploadController`, and controller output into host
//! listeners. All state sits behind `RefCell`s that are released before any
//! host callback runs (listeners, the notifier and the translator), so host
//! code may call back into the uploader.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use gloo_events::{EventListener, EventListenerOptions};
use gloo_timers::callback::Timeout;
use shiki_uploader_core::{
    DragResponse, DragSentinel, DropOverlay, Effect, EventEmitter, LeaveTicket, Listener,
    ListenerId, Notifier, OverlayStyle, Phase, PlatformError, ProgressView, TransportEvent,
    Translator, UploadController, UploaderConfig, UploaderError, UploaderEvent,
    UploaderEventKind,
};
use wasm_bindgen::JsCast;
use web_sys::{DragEvent, Event, File, HtmlElement, HtmlInputElement};

use crate::drag::{
    apply_response, dropped_files, fix_chrome_drop_effect, payload_from_any, payload_from_event,
};
use crate::overlay::DomOverlaySurface;
use crate::progress::DomProgressBar;
use crate::transport::{HeaderSource, TransportOptions, XhrTransport};

/// Host collaborators for a `FileUploader`.
pub struct UploaderOptions {
    pub config: UploaderConfig,
    pub notifier: Rc<dyn Notifier>,
    pub translator: Rc<dyn Translator>,
    pub headers: Option<HeaderSource>,
    /// File input feeding the uploader. Defaults to the first
    /// `input[type=file]` inside the target.
    pub input: Option<HtmlInputElement>,
}

struct State {
    sentinel: DragSentinel<DomOverlaySurface>,
    controller: UploadController,
    progress: DomProgressBar,
}

struct Inner {
    config: UploaderConfig,
    state: RefCell<State>,
    emitter: RefCell<EventEmitter>,
    transport: XhrTransport,
    notifier: Rc<dyn Notifier>,
    translator: Rc<dyn Translator>,
    listeners: RefCell<Vec<EventListener>>,
    leave_timer: RefCell<Option<Timeout>>,
    destroyed: Cell<bool>,
}

#[derive(Clone)]
pub struct FileUploader {
    inner: Rc<Inner>,
}

impl FileUploader {
    pub fn new(target: HtmlElement, options: UploaderOptions) -> Result<Self, UploaderError> {
        options.config.validate()?;
        let document = target
            .owner_document()
            .ok_or_else(|| PlatformError::from("drop target has no document"))?;

        let UploaderOptions {
            config,
            notifier,
            translator,
            headers,
            input,
        } = options;
        let style = OverlayStyle::from_config(&config, &*translator);

        let inner = Rc::new_cyclic(|weak: &Weak<Inner>| {
            let on_drop = {
                let weak = weak.clone();
                Rc::new(move |evt: &DragEvent| {
                    if let Some(inner) = weak.upgrade() {
                        inner.overlay_drop(evt);
                    }
                })
            };
            let sink = {
                let weak = weak.clone();
                Rc::new(move |event: TransportEvent| {
                    if let Some(inner) = weak.upgrade() {
                        inner.on_transport(event);
                    }
                })
            };

            let surface = DomOverlaySurface::new(target.clone(), on_drop);
            let transport = XhrTransport::new(
                TransportOptions {
                    endpoint: config.endpoint.clone(),
                    field_name: config.field_name.clone(),
                    restrictions: config.restrictions.clone(),
                    headers,
                },
                sink,
            );

            Inner {
                state: RefCell::new(State {
                    sentinel: DragSentinel::new(DropOverlay::new(surface, style)),
                    controller: UploadController::new(),
                    progress: DomProgressBar::new(target.clone()),
                }),
                config,
                emitter: RefCell::new(EventEmitter::new()),
                transport,
                notifier,
                translator,
                listeners: RefCell::new(Vec::new()),
                leave_timer: RefCell::new(None),
                destroyed: Cell::new(false),
            }
        });

        let input = input.or_else(|| {
            target
                .query_selector("input[type=file]")
                .ok()
                .flatten()
                .and_then(|element| element.dyn_into::<HtmlInputElement>().ok())
        });
        Inner::attach(&inner, &document, input.as_ref());

        tracing::debug!(endpoint = %inner.config.endpoint, "file uploader attached");
        Ok(Self { inner })
    }

    /// Upload files picked outside of drag and drop.
    pub fn add_files(&self, files: Vec<File>) {
        if self.inner.destroyed.get() {
            return;
        }
        self.inner.transport.add_files(files);
    }

    pub fn on(&self, kind: UploaderEventKind, listener: Listener) -> ListenerId {
        self.inner.emitter.borrow_mut().on(kind, listener)
    }

    pub fn off(&self, id: ListenerId) -> bool {
        self.inner.emitter.borrow_mut().off(id)
    }

    pub fn is_drag_active(&self) -> bool {
        self.inner.state.borrow().sentinel.is_active()
    }

    /// Detach every listener, close the overlay and remove the progress bar.
    /// Uploads already in flight finish silently.
    pub fn destroy(&self) {
        let inner = &self.inner;
        if inner.destroyed.replace(true) {
            return;
        }

        inner.listeners.borrow_mut().clear();
        inner.leave_timer.borrow_mut().take();
        {
            let mut state = inner.state.borrow_mut();
            let State {
                sentinel,
                controller,
                progress,
            } = &mut *state;
            sentinel.reset();
            controller.abandon(progress);
        }
        inner.emitter.borrow_mut().clear();
        tracing::debug!("file uploader destroyed");
    }
}

impl Inner {
    fn attach(this: &Rc<Self>, document: &web_sys::Document, input: Option<&HtmlInputElement>) {
        let mut listeners = Vec::with_capacity(5);

        for event_type in ["dragenter", "dragover", "dragleave", "drop"] {
            let weak = Rc::downgrade(this);
            listeners.push(EventListener::new_with_options(
                document,
                event_type,
                EventListenerOptions::enable_prevent_default(),
                move |evt| {
                    if let Some(inner) = weak.upgrade() {
                        inner.document_drag(event_type, evt);
                    }
                },
            ));
        }

        if let Some(input) = input {
            let weak = Rc::downgrade(this);
            let target = input.clone();
            listeners.push(EventListener::new(input, "change", move |_| {
                let Some(inner) = weak.upgrade() else {
                    return;
                };
                let files: Vec<File> = target
                    .files()
                    .map(|list| (0..list.length()).filter_map(|i| list.get(i)).collect())
                    .unwrap_or_default();
                inner.transport.add_files(files);
            }));
        }

        *this.listeners.borrow_mut() = listeners;
    }

    fn document_drag(self: &Rc<Self>, event_type: &str, evt: &Event) {
        let payload = payload_from_any(evt);
        let response = {
            let mut state = self.state.borrow_mut();
            match event_type {
                "dragenter" => state.sentinel.enter(payload),
                "dragover" => state.sentinel.over(payload),
                "dragleave" => state.sentinel.leave(),
                "drop" => state.sentinel.document_drop(payload),
                _ => DragResponse::ignored(),
            }
        };

        if event_type == "dragover" && response.handled {
            if let Some(evt) = evt.dyn_ref::<DragEvent>() {
                fix_chrome_drop_effect(evt);
            }
        }
        self.apply(evt, &response);
    }

    fn overlay_drop(self: &Rc<Self>, evt: &DragEvent) {
        let response = self
            .state
            .borrow_mut()
            .sentinel
            .overlay_drop(payload_from_event(evt));
        self.apply(evt, &response);

        if response.accept_files {
            let files = dropped_files(evt);
            tracing::debug!(count = files.len(), "files dropped");
            self.transport.add_files(files);
        }
    }

    fn apply(self: &Rc<Self>, evt: &Event, response: &DragResponse) {
        apply_response(evt, response);

        if response.cancel_leave {
            self.leave_timer.borrow_mut().take();
        }
        if let Some(ticket) = response.schedule_leave {
            let weak = Rc::downgrade(self);
            let timer = Timeout::new(self.config.leave_debounce_ms, move || {
                if let Some(inner) = weak.upgrade() {
                    inner.leave_elapsed(ticket);
                }
            });
            *self.leave_timer.borrow_mut() = Some(timer);
        }
    }

    /// Runs inside the leave timer's own callback, so the timer is left in
    /// place; the next schedule or cancel replaces it.
    fn leave_elapsed(&self, ticket: LeaveTicket) {
        self.state.borrow_mut().sentinel.leave_elapsed(ticket);
    }

    fn on_transport(&self, event: TransportEvent) {
        if self.destroyed.get() {
            return;
        }
        let (effects, idle) = {
            let tasks = self.transport.tasks();
            let mut state = self.state.borrow_mut();
            let effects = state.controller.handle(&event, &*tasks);
            (effects, state.controller.phase() == Phase::Idle)
        };

        // The translator and notifier are host code and may call back in.
        for effect in effects {
            if self.destroyed.get() {
                return;
            }
            match effect {
                Effect::Activate => self.state.borrow_mut().progress.activate(),
                Effect::Render(frame) => {
                    let report = frame.render(&*self.translator);
                    self.state.borrow_mut().progress.update(&report);
                }
                Effect::Remove => self.state.borrow_mut().progress.remove(),
                Effect::Notify(notice) => {
                    let message = notice.message(&*self.translator);
                    self.notifier.error(&message);
                }
                Effect::Emit(event) => self.emit(event),
            }
        }

        if idle && matches!(event, TransportEvent::Complete { .. }) {
            self.transport.prune_settled();
        }
    }

    fn emit(&self, event: UploaderEvent) {
        let listeners = self.emitter.borrow().listeners_for(event.kind());
        for listener in listeners {
            listener(&event);
        }
    }
}
