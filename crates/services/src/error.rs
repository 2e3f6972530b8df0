//! Shared error types for the services crate.

use chrono::{DateTime, Utc};
use thiserror::Error;

use exam_core::exam::TransitionError;
use exam_core::model::{ChapterId, CourseId, ScoreError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `HttpSubmissionReporter`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReportError {
    #[error("submission reporting is not configured")]
    Disabled,
    #[error("submission endpoint responded with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted by `ExamService` and the exam runner.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExamError {
    #[error("course {0} not found")]
    CourseNotFound(CourseId),
    #[error("chapter {chapter_id} not found in course {course_id}")]
    ChapterNotFound {
        course_id: CourseId,
        chapter_id: ChapterId,
    },
    #[error("no questions available for chapter {chapter_id} of course {course_id}")]
    NoQuestions {
        course_id: CourseId,
        chapter_id: ChapterId,
    },
    #[error("exam is not available before {starts_at}")]
    NotYetAvailable { starts_at: DateTime<Utc> },
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error(transparent)]
    Score(#[from] ScoreError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ExamError {
    /// True for failures that prevent an exam from starting at all; callers should
    /// send the student back to the course view.
    #[must_use]
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            ExamError::CourseNotFound(_)
                | ExamError::ChapterNotFound { .. }
                | ExamError::NoQuestions { .. }
                | ExamError::NotYetAvailable { .. }
        )
    }
}

/// Errors emitted by `ProgressionService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressError {
    #[error("course {0} not found")]
    CourseNotFound(CourseId),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Reporting(#[from] ReportError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use exam_core::time::fixed_now;

    #[test]
    fn precondition_failures_are_classified() {
        assert!(ExamError::CourseNotFound(CourseId::new(1)).is_precondition());
        assert!(
            ExamError::NotYetAvailable {
                starts_at: fixed_now()
            }
            .is_precondition()
        );
        assert!(!ExamError::Transition(TransitionError::NoSelection).is_precondition());
        assert!(
            !ExamError::Storage(StorageError::Connection("closed".into())).is_precondition()
        );
    }
}
