//! Back-to-back printing with a pause between slips.

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;

use super::{ConnectionManager, JobOutcome};
use crate::document::PrintDocument;

impl ConnectionManager {
    /// Print `docs` in order on a background task, waiting
    /// `inter_job_delay` between jobs so each slip can be torn off.
    ///
    /// One [`JobOutcome`] per job arrives on the returned channel, in job
    /// order. A failed job does not stop the batch. Dropping the receiver
    /// stops the batch before the next job; a job already writing finishes.
    pub fn print_batch(self: &Arc<Self>, docs: Vec<PrintDocument>) -> mpsc::Receiver<JobOutcome> {
        let (tx, rx) = mpsc::channel(docs.len().max(1));
        let manager = Arc::clone(self);
        let delay = self.options.inter_job_delay;

        tokio::spawn(async move {
            let total = docs.len();
            for (index, doc) in docs.into_iter().enumerate() {
                if index > 0 {
                    tokio::time::sleep(delay).await;
                }
                if tx.is_closed() {
                    info!(done = index, total, "Batch cancelled");
                    return;
                }

                let error = manager.print_document(&doc).await.err().map(|e| e.to_string());
                let outcome = JobOutcome {
                    index,
                    template: doc.template().to_string(),
                    error,
                };
                if tx.send(outcome).await.is_err() {
                    info!(done = index + 1, total, "Batch cancelled");
                    return;
                }
            }
            info!(total, "Batch finished");
        });

        rx
    }
}
