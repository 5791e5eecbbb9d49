//! Transport-side task bookkeeping.
//!
//! `TaskStore` is the keyed store the transport keeps for every file it has
//! accepted. The transport feeds it raw I/O outcomes and forwards the
//! `TransportEvent`s it returns; the queue and controller only read from it
//! through `TaskLookup`.

use std::collections::HashMap;

use serde_json::Value;

use crate::config::Restrictions;
use crate::error::{RestrictionError, TransportError};
use crate::events::TransportEvent;
use crate::types::{FileId, FileMeta, UploadProgress, UploadStatus, UploadTask};

/// Read access to tasks by identifier.
pub trait TaskLookup {
    fn task(&self, id: &FileId) -> Option<&UploadTask>;

    fn progress(&self, id: &FileId) -> Option<UploadProgress> {
        self.task(id).map(|task| task.progress)
    }
}

impl TaskLookup for HashMap<FileId, UploadTask> {
    fn task(&self, id: &FileId) -> Option<&UploadTask> {
        self.get(id)
    }
}

/// Every task the transport knows about, plus the run currently in flight.
#[derive(Debug, Default)]
pub struct TaskStore {
    restrictions: Restrictions,
    tasks: HashMap<FileId, UploadTask>,
    /// Files of the running upload, in start order.
    run: Vec<FileId>,
    next_sequence: u64,
}

impl TaskStore {
    pub fn new(restrictions: Restrictions) -> Self {
        Self {
            restrictions,
            tasks: HashMap::new(),
            run: Vec::new(),
            next_sequence: 0,
        }
    }

    /// Number of tasks held, settled ones included.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Files accepted but without a terminal status yet.
    pub fn pending_count(&self) -> usize {
        self.tasks
            .values()
            .filter(|task| !task.status.is_terminal())
            .count()
    }

    /// Validate a file and add it to the store.
    ///
    /// A file identical to one that is still pending is refused as a
    /// duplicate. A file identical to a settled one replaces it, which is
    /// how a user retries a failed upload.
    pub fn accept(&mut self, meta: FileMeta) -> Result<FileId, RestrictionError> {
        let id = FileId::from_meta(&meta);

        if self.tasks.get(&id).is_some_and(|task| !task.status.is_terminal()) {
            return Err(RestrictionError::Duplicate { name: meta.name });
        }

        self.restrictions.check_file(&meta)?;
        self.restrictions.check_capacity(self.pending_count())?;

        tracing::debug!(%id, name = %meta.name, size = meta.size, "file accepted");
        let task = UploadTask::new(id.clone(), meta).with_sequence(self.next_sequence);
        self.next_sequence += 1;
        self.tasks.insert(id.clone(), task);
        Ok(id)
    }

    /// Drop settled tasks that no run refers to any more.
    ///
    /// Call once the batch that owned them has been reported complete; until
    /// then lookups still need their progress. Returns how many were dropped.
    pub fn prune_settled(&mut self) -> usize {
        let before = self.tasks.len();
        let run = &self.run;
        self.tasks
            .retain(|id, task| !task.status.is_terminal() || run.contains(id));
        let pruned = before - self.tasks.len();
        if pruned > 0 {
            tracing::debug!(pruned, "settled tasks pruned");
        }
        pruned
    }

    /// Start a run with every accepted file that has not been started yet,
    /// in the order the files were accepted.
    ///
    /// Returns the ids to upload and the `Start` event, or the restriction
    /// event if the run is too small. Files of a run that never starts are
    /// dropped from the store.
    pub fn begin_run(&mut self) -> Result<(Vec<FileId>, TransportEvent), TransportEvent> {
        let mut queued: Vec<&UploadTask> = self
            .tasks
            .values()
            .filter(|task| !task.started && !task.status.is_terminal())
            .collect();
        queued.sort_by_key(|task| task.sequence);
        let ids: Vec<FileId> = queued.into_iter().map(|task| task.id.clone()).collect();

        if ids.is_empty() {
            return Ok((ids, TransportEvent::Start { file_ids: Vec::new() }));
        }

        if let Err(error) = self.restrictions.check_run_size(ids.len()) {
            for id in &ids {
                self.tasks.remove(id);
            }
            return Err(TransportEvent::RestrictionFailed { file: None, error });
        }

        for id in &ids {
            if let Some(task) = self.tasks.get_mut(id) {
                task.started = true;
            }
        }
        self.run.extend(ids.iter().cloned());

        tracing::debug!(count = ids.len(), "upload run started");
        let event = TransportEvent::Start {
            file_ids: ids.clone(),
        };
        Ok((ids, event))
    }

    /// Record byte progress. Ignored for unknown or already settled files.
    pub fn record_progress(
        &mut self,
        id: &FileId,
        bytes_uploaded: u64,
        bytes_total: u64,
    ) -> Option<TransportEvent> {
        let task = self.tasks.get_mut(id)?;
        if task.status.is_terminal() {
            return None;
        }

        task.progress = UploadProgress::new(bytes_uploaded, bytes_total);

        Some(TransportEvent::Progress {
            file_id: id.clone(),
            progress: task.progress,
        })
    }

    /// Record a successful upload. The `Success` event always precedes the
    /// `Complete` event it may trigger.
    pub fn record_success(&mut self, id: &FileId, response: Value) -> Vec<TransportEvent> {
        let Some(task) = self.tasks.get_mut(id) else {
            return Vec::new();
        };
        task.status = UploadStatus::Succeeded;
        task.progress = UploadProgress::complete(task.progress.bytes_total.max(task.meta.size));

        let mut events = vec![TransportEvent::Success {
            file_id: id.clone(),
            response,
        }];
        events.extend(self.finish_run_if_settled());
        events
    }

    /// Record a failed upload.
    pub fn record_error(&mut self, id: &FileId, error: TransportError) -> Vec<TransportEvent> {
        let Some(task) = self.tasks.get_mut(id) else {
            return Vec::new();
        };
        task.status = UploadStatus::Failed;

        let mut events = vec![TransportEvent::Error {
            file_id: id.clone(),
            error,
        }];
        events.extend(self.finish_run_if_settled());
        events
    }

    fn finish_run_if_settled(&mut self) -> Option<TransportEvent> {
        if self.run.is_empty() {
            return None;
        }
        let all_settled = self
            .run
            .iter()
            .all(|id| self.tasks.get(id).is_none_or(|task| task.status.is_terminal()));
        if !all_settled {
            return None;
        }

        let mut successful = Vec::new();
        let mut failed = Vec::new();
        for id in self.run.drain(..) {
            match self.tasks.get(&id).map(|task| task.status) {
                Some(UploadStatus::Succeeded) => successful.push(id),
                _ => failed.push(id),
            }
        }

        tracing::debug!(
            successful = successful.len(),
            failed = failed.len(),
            "upload run complete"
        );
        Some(TransportEvent::Complete { successful, failed })
    }
}

impl TaskLookup for TaskStore {
    fn task(&self, id: &FileId) -> Option<&UploadTask> {
        self.tasks.get(id)
    }
}
