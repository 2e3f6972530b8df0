use std::fmt;

use chrono::{DateTime, Utc};
use exam_core::exam::{
    AdvanceOutcome, ExamSession, Feedback, SessionPhase, SessionProgress, SessionQuestion,
    TimerTick, TransitionError,
};
use exam_core::model::{ChapterExamMeta, ChapterId, CourseId, QuestionId, Student};

use super::guard::SubmissionGuard;

/// A started chapter exam: who takes it, what it covers, and its live session.
///
/// The session is exclusively owned by the attempt; only finalize needs the
/// `SubmissionGuard`.
pub struct ExamAttempt {
    student: Student,
    course_id: CourseId,
    course_title: String,
    chapter_id: ChapterId,
    chapter_title: String,
    meta: ChapterExamMeta,
    started_at: DateTime<Utc>,
    session: ExamSession,
    guard: SubmissionGuard,
}

impl ExamAttempt {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        student: Student,
        course_id: CourseId,
        course_title: String,
        chapter_id: ChapterId,
        chapter_title: String,
        meta: ChapterExamMeta,
        started_at: DateTime<Utc>,
        session: ExamSession,
    ) -> Self {
        Self {
            student,
            course_id,
            course_title,
            chapter_id,
            chapter_title,
            meta,
            started_at,
            session,
            guard: SubmissionGuard::new(),
        }
    }

    #[must_use]
    pub fn student(&self) -> &Student {
        &self.student
    }

    #[must_use]
    pub fn course_id(&self) -> CourseId {
        self.course_id
    }

    #[must_use]
    pub fn course_title(&self) -> &str {
        &self.course_title
    }

    #[must_use]
    pub fn chapter_id(&self) -> ChapterId {
        self.chapter_id
    }

    #[must_use]
    pub fn chapter_title(&self) -> &str {
        &self.chapter_title
    }

    #[must_use]
    pub fn meta(&self) -> &ChapterExamMeta {
        &self.meta
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn session(&self) -> &ExamSession {
        &self.session
    }

    pub(crate) fn session_mut(&mut self) -> &mut ExamSession {
        &mut self.session
    }

    /// Handle on the finalize lock; clones share state.
    #[must_use]
    pub fn guard(&self) -> SubmissionGuard {
        self.guard.clone()
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.session.phase()
    }

    #[must_use]
    pub fn current_question(&self) -> &SessionQuestion {
        self.session.current_question()
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        self.session.progress()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.session.is_finished()
    }

    /// # Errors
    ///
    /// See `ExamSession::select_option`.
    pub fn select_option(
        &mut self,
        question_id: QuestionId,
        option_index: usize,
    ) -> Result<(), TransitionError> {
        self.session.select_option(question_id, option_index)
    }

    /// # Errors
    ///
    /// See `ExamSession::submit_current`.
    pub fn submit_current(&mut self) -> Result<Feedback, TransitionError> {
        let feedback = self.session.submit_current()?;
        tracing::debug!(
            question_id = %feedback.question_id,
            correct = feedback.is_correct,
            "question graded"
        );
        Ok(feedback)
    }

    /// # Errors
    ///
    /// See `ExamSession::advance`.
    pub fn advance(&mut self) -> Result<AdvanceOutcome, TransitionError> {
        self.session.advance()
    }

    /// # Errors
    ///
    /// See `ExamSession::jump_to`.
    pub fn jump_to(&mut self, index: usize) -> Result<(), TransitionError> {
        self.session.jump_to(index)
    }

    pub fn tick(&mut self) -> TimerTick {
        self.session.tick()
    }
}

impl fmt::Debug for ExamAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExamAttempt")
            .field("student_id", &self.student.id())
            .field("course_id", &self.course_id)
            .field("chapter_id", &self.chapter_id)
            .field("phase", &self.session.phase())
            .field("guard", &self.guard)
            .finish_non_exhaustive()
    }
}
