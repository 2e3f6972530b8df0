use std::sync::Arc;

use exam_core::exam::{ExamSession, ExamTimer, FinishReason, draw_session_questions};
use exam_core::model::{
    ChapterExamMeta, ChapterId, Course, CourseId, Question, Student, SubmissionRecord,
};
use rand::Rng;
use storage::repository::{CourseRepository, ExamMetaRepository, QuestionBank, Storage};

use super::attempt::ExamAttempt;
use super::finalize::{ExamResult, Finalized, PendingReport};
use crate::Clock;
use crate::error::ExamError;
use crate::progression::ProgressionService;
use crate::reporting::SubmissionReporter;

/// Everything needed to draw a session, loaded and checked before any randomness
/// is involved.
struct PreparedExam {
    course: Course,
    chapter_id: ChapterId,
    chapter_title: String,
    meta: ChapterExamMeta,
    bank: Vec<Question>,
}

/// Starts chapter exams and finalizes them.
#[derive(Clone)]
pub struct ExamService {
    clock: Clock,
    courses: Arc<dyn CourseRepository>,
    questions: Arc<dyn QuestionBank>,
    exam_meta: Arc<dyn ExamMetaRepository>,
    progression: Arc<ProgressionService>,
    reporter: Arc<dyn SubmissionReporter>,
}

impl ExamService {
    #[must_use]
    pub fn new(
        clock: Clock,
        courses: Arc<dyn CourseRepository>,
        questions: Arc<dyn QuestionBank>,
        exam_meta: Arc<dyn ExamMetaRepository>,
        progression: Arc<ProgressionService>,
        reporter: Arc<dyn SubmissionReporter>,
    ) -> Self {
        Self {
            clock,
            courses,
            questions,
            exam_meta,
            progression,
            reporter,
        }
    }

    /// Wire the service to every repository of a `Storage`.
    #[must_use]
    pub fn from_storage(
        clock: Clock,
        storage: &Storage,
        reporter: Arc<dyn SubmissionReporter>,
    ) -> Self {
        let progression = Arc::new(ProgressionService::new(
            Arc::clone(&storage.courses),
            Arc::clone(&storage.progress),
        ));
        Self::new(
            clock,
            Arc::clone(&storage.courses),
            Arc::clone(&storage.questions),
            Arc::clone(&storage.exam_meta),
            progression,
            reporter,
        )
    }

    #[must_use]
    pub fn progression(&self) -> Arc<ProgressionService> {
        Arc::clone(&self.progression)
    }

    /// Start an exam using the thread-local entropy source.
    ///
    /// # Errors
    ///
    /// Returns a precondition `ExamError` when the course or chapter is unknown, the
    /// exam has a start time in the future, or the chapter has no questions.
    pub async fn start_exam(
        &self,
        student: Student,
        course_id: CourseId,
        chapter_id: ChapterId,
    ) -> Result<ExamAttempt, ExamError> {
        let prepared = self.prepare(course_id, chapter_id).await?;
        let mut rng = rand::rng();
        self.draw(student, prepared, &mut rng)
    }

    /// Same as `start_exam` with a caller-supplied random source.
    ///
    /// # Errors
    ///
    /// See `start_exam`.
    pub async fn start_exam_with_rng<R: Rng + Send + ?Sized>(
        &self,
        student: Student,
        course_id: CourseId,
        chapter_id: ChapterId,
        rng: &mut R,
    ) -> Result<ExamAttempt, ExamError> {
        let prepared = self.prepare(course_id, chapter_id).await?;
        self.draw(student, prepared, rng)
    }

    async fn prepare(
        &self,
        course_id: CourseId,
        chapter_id: ChapterId,
    ) -> Result<PreparedExam, ExamError> {
        let course = self
            .courses
            .get_course(course_id)
            .await?
            .ok_or(ExamError::CourseNotFound(course_id))?;
        let chapter_title = course
            .chapter(chapter_id)
            .ok_or(ExamError::ChapterNotFound {
                course_id,
                chapter_id,
            })?
            .title()
            .to_string();

        let meta = self
            .exam_meta
            .get_exam_meta(course_id, chapter_id)
            .await?
            .unwrap_or_else(|| ChapterExamMeta::defaults_for(course_id, chapter_id));

        if let Some(starts_at) = meta.starts_at().filter(|at| !self.clock.has_reached(*at)) {
            tracing::info!(
                course_id = %course_id,
                chapter_id = %chapter_id,
                %starts_at,
                "exam start refused: not yet available"
            );
            return Err(ExamError::NotYetAvailable { starts_at });
        }

        let bank = self
            .questions
            .chapter_questions(course_id, chapter_id)
            .await?;

        Ok(PreparedExam {
            course,
            chapter_id,
            chapter_title,
            meta,
            bank,
        })
    }

    fn draw<R: Rng + ?Sized>(
        &self,
        student: Student,
        prepared: PreparedExam,
        rng: &mut R,
    ) -> Result<ExamAttempt, ExamError> {
        let PreparedExam {
            course,
            chapter_id,
            chapter_title,
            meta,
            bank,
        } = prepared;
        let course_id = course.id();
        let desired = usize::try_from(meta.total_questions()).unwrap_or(usize::MAX);

        let questions = draw_session_questions(&bank, course_id, chapter_id, desired, rng);
        if questions.is_empty() {
            return Err(ExamError::NoQuestions {
                course_id,
                chapter_id,
            });
        }

        let session = ExamSession::new(questions, ExamTimer::for_exam(&meta))?;
        tracing::info!(
            student_id = %student.id(),
            course_id = %course_id,
            chapter_id = %chapter_id,
            questions = session.questions().len(),
            time_limit_minutes = meta.time_limit_minutes(),
            "exam started"
        );

        Ok(ExamAttempt::new(
            student,
            course_id,
            course.title().to_string(),
            chapter_id,
            chapter_title,
            meta,
            self.clock.now(),
            session,
        ))
    }

    /// Finalize an attempt: finish the session, score it and store the score.
    ///
    /// Returns `Ok(None)` when the attempt was already finalized; racing triggers
    /// (manual finish and timer expiry) are resolved here before any await. The
    /// returned `PendingReport` carries the remote notification, which the caller
    /// sends or spawns without waiting on it for the result.
    ///
    /// # Errors
    ///
    /// Returns `ExamError::Storage` if the score cannot be stored. The attempt stays
    /// finalized in that case.
    pub async fn finalize(
        &self,
        attempt: &mut ExamAttempt,
        reason: FinishReason,
    ) -> Result<Option<Finalized>, ExamError> {
        let Some(ticket) = attempt.guard().try_acquire() else {
            tracing::debug!(
                student_id = %attempt.student().id(),
                chapter_id = %attempt.chapter_id(),
                "duplicate finalize ignored"
            );
            return Ok(None);
        };

        let session = attempt.session_mut();
        session.finish(reason);
        let finish_reason = session.finish_reason().unwrap_or(reason);
        let exam_score = session.score()?;

        let student_id = attempt.student().id();
        if let Err(err) = self
            .progression
            .apply_result(
                student_id,
                attempt.course_id(),
                attempt.chapter_id(),
                exam_score.score,
            )
            .await
        {
            tracing::error!(
                error = %err,
                student_id = %student_id,
                chapter_id = %attempt.chapter_id(),
                "failed to store exam result"
            );
            return Err(err.into());
        }

        let result = ExamResult {
            score: exam_score.score,
            correct: exam_score.correct,
            total: exam_score.total,
            passed: exam_score.passed(),
            finish_reason,
        };
        tracing::info!(
            student_id = %student_id,
            course_id = %attempt.course_id(),
            chapter_id = %attempt.chapter_id(),
            score = result.score.value(),
            passed = result.passed,
            reason = %finish_reason,
            elapsed_secs = (self.clock.now() - attempt.started_at()).num_seconds(),
            "exam finalized"
        );

        let record = SubmissionRecord {
            student_id,
            student_name: attempt.student().display_name().to_string(),
            course_id: attempt.course_id(),
            course_title: attempt.course_title().to_string(),
            chapter_id: attempt.chapter_id(),
            chapter_title: attempt.chapter_title().to_string(),
            score: result.score,
            submitted_at: self.clock.now(),
        };

        Ok(Some(Finalized {
            result,
            report: PendingReport::new(record, Arc::clone(&self.reporter), ticket),
        }))
    }
}
