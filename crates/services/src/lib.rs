#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod exams;
pub mod progression;
pub mod reporting;

pub use exam_core::Clock;

pub use app_services::AppServices;
pub use error::{AppServicesError, ExamError, ProgressError, ReportError};
pub use exams::{
    CompletedExam, ExamAttempt, ExamCommand, ExamEvent, ExamResult, ExamRunner, ExamService,
    Finalized, PendingReport, SubmissionGuard,
};
pub use progression::ProgressionService;
pub use reporting::{
    HttpSubmissionReporter, REPORT_TIMEOUT, ReportingConfig, SubmissionReporter,
};
