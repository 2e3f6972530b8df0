//! Starting, running and finalizing chapter exams.

mod attempt;
mod finalize;
mod guard;
mod runner;
mod service;

pub use attempt::ExamAttempt;
pub use finalize::{ExamResult, Finalized, PendingReport};
pub use guard::{SubmissionGuard, SubmissionTicket};
pub use runner::{CompletedExam, DEFAULT_FEEDBACK_DELAY, ExamCommand, ExamEvent, ExamRunner};
pub use service::ExamService;
