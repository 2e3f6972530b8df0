use std::sync::Arc;

use exam_core::model::{ChapterId, ChapterProgress, CourseId, Score, StudentId};
use exam_core::progression::{self, CourseProgress};
use storage::repository::{CourseRepository, ProgressKey, ProgressStore, StorageError};

use crate::error::ProgressError;

/// Records chapter scores and answers unlock/certificate questions for a student.
#[derive(Clone)]
pub struct ProgressionService {
    courses: Arc<dyn CourseRepository>,
    progress: Arc<dyn ProgressStore>,
}

impl ProgressionService {
    #[must_use]
    pub fn new(courses: Arc<dyn CourseRepository>, progress: Arc<dyn ProgressStore>) -> Self {
        Self { courses, progress }
    }

    /// Overwrite the chapter's stored score and return the updated progress.
    ///
    /// Passing and failing scores are both stored; the latest attempt wins.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the score cannot be written or read back.
    pub async fn apply_result(
        &self,
        student_id: StudentId,
        course_id: CourseId,
        chapter_id: ChapterId,
        score: Score,
    ) -> Result<ChapterProgress, StorageError> {
        let key = ProgressKey::new(student_id, course_id);
        self.progress.set(key, chapter_id, score).await?;
        let progress = self.progress.get(key).await?;
        tracing::info!(
            student_id = %student_id,
            course_id = %course_id,
            chapter_id = %chapter_id,
            score = score.value(),
            passed = score.is_passing(),
            "chapter result recorded"
        );
        Ok(progress)
    }

    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    pub async fn chapter_progress(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> Result<ChapterProgress, StorageError> {
        self.progress
            .get(ProgressKey::new(student_id, course_id))
            .await
    }

    /// Chapter statuses, unlock flags, completion and certificate state.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::CourseNotFound` for unknown courses, or storage failures.
    pub async fn course_progress(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> Result<CourseProgress, ProgressError> {
        let course = self
            .courses
            .get_course(course_id)
            .await?
            .ok_or(ProgressError::CourseNotFound(course_id))?;
        let progress = self.chapter_progress(student_id, course_id).await?;
        Ok(progression::course_progress(&course, &progress))
    }

    /// # Errors
    ///
    /// Returns `ProgressError::CourseNotFound` for unknown courses, or storage failures.
    pub async fn is_chapter_unlocked(
        &self,
        student_id: StudentId,
        course_id: CourseId,
        chapter_id: ChapterId,
    ) -> Result<bool, ProgressError> {
        let course = self
            .courses
            .get_course(course_id)
            .await?
            .ok_or(ProgressError::CourseNotFound(course_id))?;
        let progress = self.chapter_progress(student_id, course_id).await?;
        Ok(progression::is_chapter_unlocked(&course, &progress, chapter_id))
    }
}
