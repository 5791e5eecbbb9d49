//! Upload lifecycle state machine.
//!
//! The controller owns the batch queue, turns transport events into progress
//! updates and notifications, and decides when a batch is over. It never
//! calls out itself: `handle` returns the `Effect`s to perform, so callers
//! can release their borrows before any host code runs.

use smol_str::SmolStr;

use crate::error::{RestrictionError, TransportError};
use crate::events::{TransportEvent, UploaderEvent};
use crate::i18n::{I18nKey, Translator};
use crate::platform::ProgressView;
use crate::progress::ProgressFrame;
use crate::queue::UploadQueue;
use crate::store::TaskLookup;
use crate::types::FileId;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Uploading,
}

/// Work the caller performs, in order, once its borrows are released.
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    /// Show the progress bar.
    Activate,
    /// Redraw the progress bar.
    Render(ProgressFrame),
    /// Remove the progress bar.
    Remove,
    /// Flash an error to the user.
    Notify(Notice),
    /// Dispatch to host listeners.
    Emit(UploaderEvent),
}

/// A user-facing error, translated only when it is shown.
#[derive(Clone, Debug, PartialEq)]
pub enum Notice {
    FailedToUpload { file: SmolStr },
    /// Message supplied by the server, shown as is.
    Server(String),
    Restriction(RestrictionError),
}

impl Notice {
    pub fn message(&self, translator: &dyn Translator) -> String {
        match self {
            Notice::FailedToUpload { file } => {
                translator.translate(I18nKey::FAILED_TO_UPLOAD, &[("file", file.to_string())])
            }
            Notice::Server(message) => message.clone(),
            Notice::Restriction(error) => error.localized(translator),
        }
    }
}

#[derive(Debug, Default)]
pub struct UploadController {
    queue: UploadQueue,
    phase: Phase,
}

impl UploadController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn queue(&self) -> &UploadQueue {
        &self.queue
    }

    /// Apply one transport event. Returns the effects to perform, in order.
    pub fn handle(&mut self, event: &TransportEvent, tasks: &impl TaskLookup) -> Vec<Effect> {
        match event {
            TransportEvent::Start { file_ids } => self.start(file_ids, tasks),
            TransportEvent::Progress { file_id, progress } => {
                tracing::trace!(%file_id, percentage = progress.percentage, "upload progress");
                self.render(tasks).into_iter().collect()
            }
            TransportEvent::Success { file_id, response } => {
                tracing::debug!(%file_id, "file uploaded");
                let mut effects: Vec<Effect> = self.render(tasks).into_iter().collect();
                effects.push(Effect::Emit(UploaderEvent::FileSuccess(response.clone())));
                effects
            }
            TransportEvent::Error { file_id, error } => {
                tracing::warn!(%file_id, %error, "file upload failed");
                vec![Effect::Notify(failure_notice(file_id, error, tasks))]
            }
            TransportEvent::RestrictionFailed { file, error } => {
                tracing::debug!(
                    file = file.as_ref().map(|meta| meta.name.as_str()),
                    %error,
                    "file refused"
                );
                vec![Effect::Notify(Notice::Restriction(error.clone()))]
            }
            TransportEvent::Complete { successful, .. } => self.complete(successful, tasks),
        }
    }

    /// Tear the batch down without emitting anything.
    pub fn abandon(&mut self, view: &mut impl ProgressView) {
        if self.phase == Phase::Uploading {
            view.remove();
        }
        self.queue.reset();
        self.phase = Phase::Idle;
    }

    fn start(&mut self, file_ids: &[FileId], tasks: &impl TaskLookup) -> Vec<Effect> {
        if file_ids.is_empty() {
            return Vec::new();
        }

        self.queue.add(file_ids.iter().cloned());
        if self.phase == Phase::Idle {
            tracing::debug!(count = file_ids.len(), "batch started");
            self.phase = Phase::Uploading;
            vec![Effect::Activate]
        } else {
            tracing::debug!(count = file_ids.len(), "files joined running batch");
            self.render(tasks).into_iter().collect()
        }
    }

    fn render(&self, tasks: &impl TaskLookup) -> Option<Effect> {
        if self.queue.is_empty() {
            return None;
        }
        Some(Effect::Render(ProgressFrame::capture(&self.queue, tasks)))
    }

    fn complete(&mut self, successful: &[FileId], tasks: &impl TaskLookup) -> Vec<Effect> {
        if self.phase == Phase::Idle || self.queue.is_empty() {
            tracing::trace!("complete without a running batch ignored");
            return Vec::new();
        }
        if !self.queue.all_settled(tasks) {
            tracing::debug!("complete before batch settled, waiting");
            return Vec::new();
        }

        self.queue.reset();
        self.phase = Phase::Idle;

        let event = if successful.is_empty() {
            UploaderEvent::Failure
        } else {
            UploaderEvent::Complete
        };
        tracing::debug!(event = %event.kind(), "batch finished");
        vec![Effect::Remove, Effect::Emit(event)]
    }
}

fn failure_notice(file_id: &FileId, error: &TransportError, tasks: &impl TaskLookup) -> Notice {
    if !error.is_generic() {
        return Notice::Server(error.to_string());
    }
    let file = tasks
        .task(file_id)
        .map(|task| task.meta.name.clone())
        .unwrap_or_else(|| SmolStr::from(file_id.as_str()));
    Notice::FailedToUpload { file }
}
