use std::fmt;
use std::sync::Arc;

use exam_core::exam::FinishReason;
use exam_core::model::{Score, SubmissionRecord};
use tokio::task::JoinHandle;

use super::guard::SubmissionTicket;
use crate::error::ReportError;
use crate::reporting::SubmissionReporter;

/// What the student sees once an exam is finalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExamResult {
    pub score: Score,
    pub correct: usize,
    pub total: usize,
    pub passed: bool,
    pub finish_reason: FinishReason,
}

/// Outcome of the local, authoritative part of finalize.
///
/// The score is already stored when this is returned; `report` is the remaining
/// best-effort notification.
#[derive(Debug)]
pub struct Finalized {
    pub result: ExamResult,
    pub report: PendingReport,
}

/// The remote notification for one finalized exam. Sent at most once; failures are
/// logged and never retried.
pub struct PendingReport {
    record: SubmissionRecord,
    reporter: Arc<dyn SubmissionReporter>,
    ticket: SubmissionTicket,
}

impl PendingReport {
    pub(crate) fn new(
        record: SubmissionRecord,
        reporter: Arc<dyn SubmissionReporter>,
        ticket: SubmissionTicket,
    ) -> Self {
        Self {
            record,
            reporter,
            ticket,
        }
    }

    #[must_use]
    pub fn record(&self) -> &SubmissionRecord {
        &self.record
    }

    /// Deliver the record and release the submission lock, whatever the outcome.
    pub async fn send(self) {
        let Self {
            record,
            reporter,
            ticket,
        } = self;

        match reporter.report(&record).await {
            Ok(()) => tracing::info!(
                student_id = %record.student_id,
                chapter_id = %record.chapter_id,
                score = record.score.value(),
                "exam result reported"
            ),
            Err(ReportError::Disabled) => {
                tracing::debug!("submission reporting disabled; result kept locally");
            }
            Err(err) => tracing::warn!(
                error = %err,
                student_id = %record.student_id,
                chapter_id = %record.chapter_id,
                "failed to report exam result"
            ),
        }
        ticket.release();
    }

    /// Send in the background. The returned handle only matters to callers that
    /// want to wait for the lock to be released.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.send())
    }
}

impl fmt::Debug for PendingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingReport")
            .field("record", &self.record)
            .finish_non_exhaustive()
    }
}
