//! Human-readable progress derived from the upload queue.

use crate::i18n::{I18nKey, Translator};
use crate::queue::UploadQueue;
use crate::store::TaskLookup;
use crate::types::{FileMeta, kilobytes};

/// Aggregates of the current batch. Never stored, always recomputed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub uploaded_count: usize,
    pub total_count: usize,
    pub bytes_uploaded: u64,
    pub bytes_total: u64,
}

impl ProgressSnapshot {
    pub fn capture(queue: &UploadQueue, tasks: &impl TaskLookup) -> Self {
        Self {
            uploaded_count: queue.uploaded_count(tasks),
            total_count: queue.len(),
            bytes_uploaded: queue.bytes_uploaded(tasks),
            bytes_total: queue.bytes_total(tasks),
        }
    }

    /// Uploaded share in percent, rounded to two decimals. Zero while the
    /// total is still unknown.
    pub fn percent(&self) -> f64 {
        if self.bytes_total == 0 {
            return 0.0;
        }
        let raw = self.bytes_uploaded as f64 * 100.0 / self.bytes_total as f64;
        (raw * 100.0).round() / 100.0
    }
}

/// What the progress bar shows.
#[derive(Clone, Debug, PartialEq)]
pub struct ProgressReport {
    pub text: String,
    pub percent: f64,
}

impl ProgressReport {
    /// Bar width as a CSS length.
    pub fn css_width(&self) -> String {
        format!("{}%", self.percent)
    }
}

/// Untranslated progress of the batch, captured while the task store is
/// borrowed and rendered once it is released.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProgressFrame {
    pub snapshot: ProgressSnapshot,
    /// The only file of a single-file batch.
    pub single: Option<FileMeta>,
}

impl ProgressFrame {
    pub fn capture(queue: &UploadQueue, tasks: &impl TaskLookup) -> Self {
        let single = match queue.ids() {
            [only] => tasks.task(only).map(|task| task.meta.clone()),
            _ => None,
        };
        Self {
            snapshot: ProgressSnapshot::capture(queue, tasks),
            single,
        }
    }

    /// A single-file batch names the file and its size; larger batches show
    /// file and kilobyte counters.
    pub fn render(&self, translator: &dyn Translator) -> ProgressReport {
        let snapshot = &self.snapshot;
        let text = match &self.single {
            Some(meta) => translator.translate(
                I18nKey::UPLOADING_FILE,
                &[
                    ("filename", meta.name.to_string()),
                    ("filesize", meta.size_kb().to_string()),
                ],
            ),
            None => translator.translate(
                I18nKey::UPLOADING_FILES,
                &[
                    ("uploadedCount", snapshot.uploaded_count.to_string()),
                    ("totalCount", snapshot.total_count.to_string()),
                    ("kbUploaded", kilobytes(snapshot.bytes_uploaded).to_string()),
                    ("kbTotal", kilobytes(snapshot.bytes_total).to_string()),
                ],
            ),
        };

        ProgressReport {
            text,
            percent: snapshot.percent(),
        }
    }
}

/// Project the queue into a status line and percentage.
pub fn report(
    queue: &UploadQueue,
    tasks: &impl TaskLookup,
    translator: &dyn Translator,
) -> ProgressReport {
    ProgressFrame::capture(queue, tasks).render(translator)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::i18n::{Locale, StaticTranslator};
    use crate::types::{FileId, UploadProgress, UploadTask};

    fn store(files: &[(&str, u64, u64)]) -> HashMap<FileId, UploadTask> {
        files
            .iter()
            .map(|&(name, uploaded, size)| {
                let mut task = UploadTask::new(name.into(), FileMeta::new(name, "image/png", size));
                task.progress = UploadProgress::new(uploaded, size);
                (FileId::from(name), task)
            })
            .collect()
    }

    fn queue(ids: &[&str]) -> UploadQueue {
        let mut queue = UploadQueue::new();
        queue.add(ids.iter().map(|id| FileId::from(*id)));
        queue
    }

    #[test]
    fn test_single_file_message() {
        let tasks = store(&[("a.png", 1024, 2048)]);
        let report = report(&queue(&["a.png"]), &tasks, &StaticTranslator::new(Locale::En));
        assert_eq!(report.text, "Uploading a.png, 2 KB");
        assert_eq!(report.percent, 50.0);
        assert_eq!(report.css_width(), "50%");
    }

    #[test]
    fn test_multi_file_message() {
        let tasks = store(&[("a.png", 2048, 2048), ("b.png", 100, 3000)]);
        let report = report(
            &queue(&["a.png", "b.png"]),
            &tasks,
            &StaticTranslator::new(Locale::En),
        );
        assert_eq!(report.text, "Uploading 1/2 files, 3/5 KB");
        assert_eq!(report.percent, 42.55);
    }

    #[test]
    fn test_zero_total_is_zero_percent() {
        let snapshot = ProgressSnapshot::default();
        assert_eq!(snapshot.percent(), 0.0);

        let tasks = store(&[("empty.png", 0, 0)]);
        let report = report(&queue(&["empty.png"]), &tasks, &StaticTranslator::default());
        assert_eq!(report.percent, 0.0);
        assert!(!report.percent.is_nan());
    }

    #[test]
    fn test_percent_rounds_to_two_decimals() {
        let snapshot = ProgressSnapshot {
            bytes_uploaded: 1,
            bytes_total: 3,
            ..ProgressSnapshot::default()
        };
        assert_eq!(snapshot.percent(), 33.33);
    }

    #[test]
    fn test_frame_renders_after_store_is_gone() {
        let frame = {
            let tasks = store(&[("a.png", 512, 2048)]);
            ProgressFrame::capture(&queue(&["a.png"]), &tasks)
        };
        let report = frame.render(&StaticTranslator::new(Locale::Ru));
        assert_eq!(report.percent, 25.0);
        assert!(report.text.contains("a.png"));
    }
}
