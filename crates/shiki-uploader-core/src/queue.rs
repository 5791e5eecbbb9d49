//! The set of files tracked by the current batch.
//!
//! The queue only holds identifiers. Every aggregate is recomputed from the
//! task store on demand, so nothing here can go stale.

use crate::store::TaskLookup;
use crate::types::FileId;

/// Identifiers of the current batch, in the order they were started.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UploadQueue {
    ids: Vec<FileId>,
}

impl UploadQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track more files. Ids already tracked are skipped.
    pub fn add<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = FileId>,
    {
        for id in ids {
            if !self.ids.contains(&id) {
                self.ids.push(id);
            }
        }
    }

    pub fn reset(&mut self) {
        self.ids.clear();
    }

    pub fn ids(&self) -> &[FileId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Tracked files whose progress reached 100%.
    pub fn uploaded_count(&self, tasks: &impl TaskLookup) -> usize {
        self.ids
            .iter()
            .filter(|id| tasks.progress(id).is_some_and(|p| p.is_complete()))
            .count()
    }

    pub fn bytes_total(&self, tasks: &impl TaskLookup) -> u64 {
        self.ids
            .iter()
            .filter_map(|id| tasks.progress(id))
            .map(|p| p.bytes_total)
            .sum()
    }

    pub fn bytes_uploaded(&self, tasks: &impl TaskLookup) -> u64 {
        self.ids
            .iter()
            .filter_map(|id| tasks.progress(id))
            .map(|p| p.bytes_uploaded)
            .sum()
    }

    /// Whether every tracked file is at 100% or ended in a terminal status.
    pub fn all_settled(&self, tasks: &impl TaskLookup) -> bool {
        self.ids
            .iter()
            .all(|id| tasks.task(id).is_none_or(|task| task.is_settled()))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::types::{FileMeta, UploadProgress, UploadStatus, UploadTask};

    fn tasks(entries: &[(&str, u64, u64)]) -> HashMap<FileId, UploadTask> {
        entries
            .iter()
            .map(|&(id, uploaded, total)| {
                let mut task = UploadTask::new(id.into(), FileMeta::new(id, "image/png", total));
                task.progress = UploadProgress::new(uploaded, total);
                (FileId::from(id), task)
            })
            .collect()
    }

    #[test]
    fn test_add_skips_duplicates() {
        let mut queue = UploadQueue::new();
        queue.add(["a".into(), "b".into()]);
        queue.add(["a".into()]);
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.ids(), &[FileId::from("a"), FileId::from("b")]);
    }

    #[test]
    fn test_aggregates() {
        let store = tasks(&[("a", 100, 100), ("b", 50, 200), ("c", 0, 300)]);
        let mut queue = UploadQueue::new();
        queue.add(["a".into(), "b".into(), "c".into()]);

        assert_eq!(queue.uploaded_count(&store), 1);
        assert_eq!(queue.bytes_total(&store), 600);
        assert_eq!(queue.bytes_uploaded(&store), 150);
        assert!(queue.bytes_uploaded(&store) <= queue.bytes_total(&store));
    }

    #[test]
    fn test_aggregates_only_cover_tracked_ids() {
        let store = tasks(&[("a", 100, 100), ("b", 50, 200)]);
        let mut queue = UploadQueue::new();
        queue.add(["b".into(), "missing".into()]);

        assert_eq!(queue.uploaded_count(&store), 0);
        assert_eq!(queue.bytes_total(&store), 200);
    }

    #[test]
    fn test_all_settled() {
        let mut store = tasks(&[("a", 100, 100), ("b", 10, 100)]);
        let mut queue = UploadQueue::new();
        queue.add(["a".into(), "b".into()]);
        assert!(!queue.all_settled(&store));

        if let Some(task) = store.get_mut(&FileId::from("b")) {
            task.status = UploadStatus::Failed;
        }
        assert!(queue.all_settled(&store));
    }

    #[test]
    fn test_reset() {
        let mut queue = UploadQueue::new();
        queue.add(["a".into()]);
        queue.reset();
        assert!(queue.is_empty());
    }
}
