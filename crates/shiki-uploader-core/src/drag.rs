//! Drag sentinel: collapses noisy, bubbling document drag events into a
//! single idle/active signal.
//!
//! Leaving a child element fires `dragleave` right before the sibling's
//! `dragenter`, so a leave only takes effect after a short debounce that any
//! later enter/over cancels. The debounce is a `DeferredLeave`: the sentinel
//! arms it and hands out a `LeaveTicket`, the platform runs a timer and
//! reports the ticket back through `leave_elapsed`. Stale tickets do nothing,
//! which keeps the sentinel correct even if a platform timer can't be
//! cancelled in time.
//!
//! Drags that don't carry files are ignored at every stage so ordinary text
//! drag and drop keeps working.

use crate::overlay::DropOverlay;
use crate::platform::OverlaySurface;

/// Whether a file is being dragged over the page.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    Active,
}

/// What the sentinel needs to know about a drag event's data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DragPayload {
    pub has_files: bool,
}

impl DragPayload {
    pub fn files() -> Self {
        Self { has_files: true }
    }

    pub fn other() -> Self {
        Self { has_files: false }
    }

    /// Build from the `DataTransfer.types` list.
    pub fn from_types<I, T>(types: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        Self {
            has_files: types.into_iter().any(|ty| ty.as_ref() == "Files"),
        }
    }
}

/// Identifies one armed leave debounce.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LeaveTicket(u64);

/// A cancellable deferred leave.
#[derive(Clone, Debug, Default)]
pub struct DeferredLeave {
    generation: u64,
    armed: Option<u64>,
}

impl DeferredLeave {
    /// Arm the leave, replacing any earlier one.
    pub fn arm(&mut self) -> LeaveTicket {
        self.generation += 1;
        self.armed = Some(self.generation);
        LeaveTicket(self.generation)
    }

    /// Cancel the armed leave. Returns whether one was armed.
    pub fn cancel(&mut self) -> bool {
        self.armed.take().is_some()
    }

    /// Consume `ticket` if it is still the armed one.
    pub fn fire(&mut self, ticket: LeaveTicket) -> bool {
        if self.armed == Some(ticket.0) {
            self.armed = None;
            true
        } else {
            false
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }
}

/// Side effects the platform has to carry out for one drag event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DragResponse {
    /// Prevent the default action and stop propagation.
    pub handled: bool,
    /// Start the leave debounce timer for this ticket.
    pub schedule_leave: Option<LeaveTicket>,
    /// Drop any running leave debounce timer.
    pub cancel_leave: bool,
    /// Extract the dropped files and queue them.
    pub accept_files: bool,
}

impl DragResponse {
    pub fn ignored() -> Self {
        Self::default()
    }

    fn handled() -> Self {
        Self {
            handled: true,
            ..Self::default()
        }
    }
}

pub struct DragSentinel<S: OverlaySurface> {
    state: DragState,
    overlay: DropOverlay<S>,
    leave: DeferredLeave,
}

impl<S: OverlaySurface> DragSentinel<S> {
    pub fn new(overlay: DropOverlay<S>) -> Self {
        Self {
            state: DragState::Idle,
            overlay,
            leave: DeferredLeave::default(),
        }
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == DragState::Active
    }

    pub fn overlay(&self) -> &DropOverlay<S> {
        &self.overlay
    }

    pub fn overlay_mut(&mut self) -> &mut DropOverlay<S> {
        &mut self.overlay
    }

    /// Document `dragenter`.
    pub fn enter(&mut self, payload: DragPayload) -> DragResponse {
        if !payload.has_files {
            return DragResponse::ignored();
        }

        let cancel_leave = self.leave.cancel();
        let was_active = self.is_active();
        self.state = if self.overlay.show() {
            DragState::Active
        } else {
            DragState::Idle
        };
        if !was_active && self.is_active() {
            tracing::debug!("file drag entered");
        }

        DragResponse {
            cancel_leave,
            ..DragResponse::handled()
        }
    }

    /// Document `dragover`. Must be handled on every event while active or
    /// the browser treats the drop as a navigation.
    pub fn over(&mut self, payload: DragPayload) -> DragResponse {
        if !self.is_active() || !payload.has_files {
            return DragResponse::ignored();
        }

        DragResponse {
            cancel_leave: self.leave.cancel(),
            ..DragResponse::handled()
        }
    }

    /// Document `dragleave`: arm the debounce.
    pub fn leave(&mut self) -> DragResponse {
        if !self.is_active() {
            return DragResponse::ignored();
        }

        DragResponse {
            schedule_leave: Some(self.leave.arm()),
            ..DragResponse::handled()
        }
    }

    /// The leave debounce for `ticket` ran out. Returns whether the sentinel
    /// went idle.
    pub fn leave_elapsed(&mut self, ticket: LeaveTicket) -> bool {
        if !self.leave.fire(ticket) {
            return false;
        }
        self.deactivate();
        true
    }

    /// Document `drop`. Closes the overlay without extracting files; only a
    /// drop on the overlay itself uploads.
    pub fn document_drop(&mut self, payload: DragPayload) -> DragResponse {
        if !self.is_active() || !payload.has_files {
            return DragResponse::ignored();
        }

        let cancel_leave = self.leave.cancel();
        self.deactivate();
        DragResponse {
            cancel_leave,
            ..DragResponse::handled()
        }
    }

    /// `drop` on the overlay: accept the files and go idle immediately.
    pub fn overlay_drop(&mut self, payload: DragPayload) -> DragResponse {
        if !payload.has_files {
            return DragResponse::ignored();
        }

        let cancel_leave = self.leave.cancel();
        self.deactivate();
        DragResponse {
            cancel_leave,
            accept_files: true,
            ..DragResponse::handled()
        }
    }

    /// Drop all drag state, e.g. on teardown.
    pub fn reset(&mut self) {
        self.leave.cancel();
        self.deactivate();
    }

    fn deactivate(&mut self) {
        if self.overlay.hide() {
            tracing::debug!("file drag ended");
        }
        self.state = DragState::Idle;
    }
}
