//! Batch export orchestrator.
//!
//! Drives the single-file transform over an ordered list of files on one
//! dedicated background thread, emitting a progress event after each file
//! and a completion event at the end. A failure on one file never aborts
//! the run: every file is attempted exactly once, in input order, with no
//! retries. There is no cancellation; a spawned batch runs to completion.
//!
//! The worker owns a snapshot of the settings, moved in at spawn time. The
//! caller keeps its own mutable copies and may keep editing them while the
//! batch runs — isolation comes from copying, not locking.

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};
use std::thread;

use tracing::{error, info};

use crate::settings::{ExportSettings, WatermarkSettings};

use super::single::export_single;

/// Notification emitted by a running batch.
#[derive(Debug, Clone)]
pub enum BatchEvent {
    /// One file was attempted. `index` is 1-based in input order.
    Progress {
        index: usize,
        total: usize,
        path: PathBuf,
        ok: bool,
        /// Output path on success, error message on failure.
        detail: String,
    },
    /// The whole list was attempted.
    Finished { success_count: usize, total: usize },
}

/// Aggregate result of a completed batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub success_count: usize,
    pub total: usize,
}

/// Handle to a running batch: an event receiver plus the worker join handle.
pub struct BatchHandle {
    events: Receiver<BatchEvent>,
    worker: thread::JoinHandle<BatchSummary>,
}

impl BatchHandle {
    /// The event stream, in emission order. Iterating it to exhaustion
    /// yields every progress event followed by the final completion event.
    pub fn events(&self) -> &Receiver<BatchEvent> {
        &self.events
    }

    /// Wait for the batch to finish and return its summary.
    pub fn join(self) -> BatchSummary {
        match self.worker.join() {
            Ok(summary) => summary,
            Err(_) => {
                error!("batch worker panicked");
                BatchSummary {
                    success_count: 0,
                    total: 0,
                }
            }
        }
    }
}

/// Start a batch export on a dedicated worker thread.
///
/// The settings are captured by value: the worker only ever reads this
/// snapshot, so later mutation of the caller's settings cannot race the
/// running batch.
pub fn spawn_batch(
    files: Vec<PathBuf>,
    wm: WatermarkSettings,
    exp: ExportSettings,
) -> BatchHandle {
    let (tx, rx) = mpsc::channel();

    let worker = thread::spawn(move || {
        let total = files.len();
        let mut success_count = 0usize;

        for (i, path) in files.iter().enumerate() {
            let outcome = export_single(path, &wm, &exp);
            if outcome.ok {
                success_count += 1;
            }
            // A dropped receiver must not stop the run
            let _ = tx.send(BatchEvent::Progress {
                index: i + 1,
                total,
                path: path.clone(),
                ok: outcome.ok,
                detail: outcome.detail,
            });
        }

        info!(success_count, total, "batch finished");
        let _ = tx.send(BatchEvent::Finished {
            success_count,
            total,
        });

        BatchSummary {
            success_count,
            total,
        }
    });

    BatchHandle { events: rx, worker }
}

/// Run a batch to completion, forwarding each event to `on_event`, and
/// return the summary. Blocks the calling thread; the work itself still
/// happens on the dedicated worker.
pub fn run_batch(
    files: Vec<PathBuf>,
    wm: WatermarkSettings,
    exp: ExportSettings,
    mut on_event: impl FnMut(&BatchEvent),
) -> BatchSummary {
    let handle = spawn_batch(files, wm, exp);
    for event in handle.events().iter() {
        on_event(&event);
    }
    handle.join()
}
