use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::ids::{ChapterId, CourseId};

/// Question count used when a chapter has no configured exam.
pub const DEFAULT_TOTAL_QUESTIONS: u32 = 10;
/// Time limit (minutes) used when a chapter has no configured exam.
pub const DEFAULT_TIME_LIMIT_MINUTES: u32 = 15;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ExamMetaError {
    #[error("total questions must be > 0")]
    InvalidTotalQuestions,

    #[error("time limit must be > 0 minutes")]
    InvalidTimeLimit,
}

/// Exam configuration for one course chapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterExamMeta {
    course_id: CourseId,
    chapter_id: ChapterId,
    total_questions: u32,
    time_limit_minutes: u32,
    starts_at: Option<DateTime<Utc>>,
}

impl ChapterExamMeta {
    /// Creates exam configuration for a chapter.
    ///
    /// # Errors
    ///
    /// Returns `ExamMetaError` if the question count or time limit is zero.
    pub fn new(
        course_id: CourseId,
        chapter_id: ChapterId,
        total_questions: u32,
        time_limit_minutes: u32,
        starts_at: Option<DateTime<Utc>>,
    ) -> Result<Self, ExamMetaError> {
        if total_questions == 0 {
            return Err(ExamMetaError::InvalidTotalQuestions);
        }
        if time_limit_minutes == 0 {
            return Err(ExamMetaError::InvalidTimeLimit);
        }
        Ok(Self {
            course_id,
            chapter_id,
            total_questions,
            time_limit_minutes,
            starts_at,
        })
    }

    /// Fallback configuration: 10 questions, 15 minutes, always available.
    #[must_use]
    pub fn defaults_for(course_id: CourseId, chapter_id: ChapterId) -> Self {
        Self {
            course_id,
            chapter_id,
            total_questions: DEFAULT_TOTAL_QUESTIONS,
            time_limit_minutes: DEFAULT_TIME_LIMIT_MINUTES,
            starts_at: None,
        }
    }

    #[must_use]
    pub fn course_id(&self) -> CourseId {
        self.course_id
    }

    #[must_use]
    pub fn chapter_id(&self) -> ChapterId {
        self.chapter_id
    }

    #[must_use]
    pub fn total_questions(&self) -> u32 {
        self.total_questions
    }

    #[must_use]
    pub fn time_limit_minutes(&self) -> u32 {
        self.time_limit_minutes
    }

    /// Countdown length in seconds.
    #[must_use]
    pub fn time_limit_secs(&self) -> u32 {
        self.time_limit_minutes.saturating_mul(60)
    }

    #[must_use]
    pub fn starts_at(&self) -> Option<DateTime<Utc>> {
        self.starts_at
    }

    /// Returns true if a session may be created at `now`.
    #[must_use]
    pub fn is_available_at(&self, now: DateTime<Utc>) -> bool {
        self.starts_at.is_none_or(|start| now >= start)
    }
}
