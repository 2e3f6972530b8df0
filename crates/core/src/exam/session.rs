use std::fmt;
use thiserror::Error;

use crate::exam::answers::AnswerSheet;
use crate::exam::scoring::{self, ExamScore};
use crate::exam::shuffle::SessionQuestion;
use crate::exam::timer::{ExamTimer, TimerTick};
use crate::model::{QuestionId, ScoreError};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Rejected session transitions. A rejected call leaves the session unchanged.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TransitionError {
    #[error("session has no questions")]
    NoQuestions,

    #[error("session is already finished")]
    Finished,

    #[error("question {0} is not the current question")]
    NotCurrent(QuestionId),

    #[error("question {0} is already graded")]
    AlreadyGraded(QuestionId),

    #[error("option {index} is out of range for {count} options")]
    OptionOutOfRange { index: usize, count: usize },

    #[error("current question has no selection")]
    NoSelection,

    #[error("current question is not graded yet")]
    NotGraded,

    #[error("question {index} has not been reached (furthest is {furthest})")]
    NotReached { index: usize, furthest: usize },
}

//
// ─── STATES ────────────────────────────────────────────────────────────────────
//

/// Where the session stands for the question at the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Answering(usize),
    Graded(usize),
    Finished,
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    /// The last question was graded and advanced past.
    Completed,
    /// The student finished early.
    Manual,
    TimedOut,
}

impl fmt::Display for FinishReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FinishReason::Completed => "completed",
            FinishReason::Manual => "manual",
            FinishReason::TimedOut => "timed out",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    Moved(usize),
    /// The graded question was the last one; the session is now finished.
    Completed,
}

/// Presentation hint for one option after grading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionMark {
    Correct,
    ChosenIncorrect,
    Neutral,
}

/// Per-question feedback revealed once a question is graded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub question_id: QuestionId,
    pub selected: usize,
    pub correct_index: usize,
    pub is_correct: bool,
    pub explanation: Option<String>,
    pub marks: Vec<OptionMark>,
}

impl Feedback {
    fn for_question(question: &SessionQuestion, selected: usize) -> Self {
        let correct_index = question.correct_index();
        let marks = (0..question.options().len())
            .map(|i| {
                if i == correct_index {
                    OptionMark::Correct
                } else if i == selected {
                    OptionMark::ChosenIncorrect
                } else {
                    OptionMark::Neutral
                }
            })
            .collect();

        Self {
            question_id: question.id(),
            selected,
            correct_index,
            is_correct: question.is_correct(selected),
            explanation: question.explanation().map(ToString::to_string),
            marks,
        }
    }
}

/// Snapshot of session progress for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionProgress {
    pub total: usize,
    /// 1-based position of the question at the pointer.
    pub position: usize,
    pub answered: usize,
    pub graded: usize,
    pub correct: usize,
    pub remaining_secs: u32,
    pub running_low: bool,
    pub is_finished: bool,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// State machine for one timed chapter exam attempt.
///
/// The question list is fixed at construction. The pointer moves through
/// `Answering(i) -> Graded(i) -> Answering(i + 1)` until the last question is
/// advanced past or the session is finished early. Already reached questions can
/// be revisited with `jump_to`; questions past the furthest reached index cannot.
pub struct ExamSession {
    questions: Vec<SessionQuestion>,
    current: usize,
    furthest: usize,
    answers: AnswerSheet,
    timer: ExamTimer,
    finished: Option<FinishReason>,
}

impl ExamSession {
    /// # Errors
    ///
    /// Returns `TransitionError::NoQuestions` for an empty question list.
    pub fn new(questions: Vec<SessionQuestion>, timer: ExamTimer) -> Result<Self, TransitionError> {
        if questions.is_empty() {
            return Err(TransitionError::NoQuestions);
        }
        Ok(Self {
            questions,
            current: 0,
            furthest: 0,
            answers: AnswerSheet::new(),
            timer,
            finished: None,
        })
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        if self.finished.is_some() {
            SessionPhase::Finished
        } else if self.answers.is_graded(self.questions[self.current].id()) {
            SessionPhase::Graded(self.current)
        } else {
            SessionPhase::Answering(self.current)
        }
    }

    #[must_use]
    pub fn questions(&self) -> &[SessionQuestion] {
        &self.questions
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn furthest_index(&self) -> usize {
        self.furthest
    }

    #[must_use]
    pub fn current_question(&self) -> &SessionQuestion {
        &self.questions[self.current]
    }

    #[must_use]
    pub fn answers(&self) -> &AnswerSheet {
        &self.answers
    }

    #[must_use]
    pub fn timer(&self) -> &ExamTimer {
        &self.timer
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished.is_some()
    }

    #[must_use]
    pub fn finish_reason(&self) -> Option<FinishReason> {
        self.finished
    }

    /// Selects an option for the current, ungraded question. Replaces any earlier
    /// selection.
    ///
    /// # Errors
    ///
    /// Returns `TransitionError` if the session is finished, `question_id` is not the
    /// current question, the question is graded, or the option does not exist.
    pub fn select_option(
        &mut self,
        question_id: QuestionId,
        option_index: usize,
    ) -> Result<(), TransitionError> {
        self.ensure_open()?;
        let question = &self.questions[self.current];
        if question.id() != question_id {
            return Err(TransitionError::NotCurrent(question_id));
        }
        let count = question.options().len();
        if option_index >= count {
            return Err(TransitionError::OptionOutOfRange {
                index: option_index,
                count,
            });
        }
        if !self.answers.select(question_id, option_index) {
            return Err(TransitionError::AlreadyGraded(question_id));
        }
        Ok(())
    }

    /// Grades the current question and returns its feedback.
    ///
    /// # Errors
    ///
    /// Returns `TransitionError` if the session is finished, the question is already
    /// graded, or nothing is selected.
    pub fn submit_current(&mut self) -> Result<Feedback, TransitionError> {
        self.ensure_open()?;
        let question = &self.questions[self.current];
        let id = question.id();
        if self.answers.is_graded(id) {
            return Err(TransitionError::AlreadyGraded(id));
        }
        let selected = self
            .answers
            .selection(id)
            .ok_or(TransitionError::NoSelection)?;
        self.answers.grade(id);
        Ok(Feedback::for_question(question, selected))
    }

    /// Feedback for a graded question, e.g. when reviewing.
    #[must_use]
    pub fn feedback_for(&self, index: usize) -> Option<Feedback> {
        let question = self.questions.get(index)?;
        let selected = self.answers.graded_selection(question.id())?;
        Some(Feedback::for_question(question, selected))
    }

    /// Moves past a graded question. Advancing past the last question finishes
    /// the session.
    ///
    /// # Errors
    ///
    /// Returns `TransitionError::NotGraded` if the current question is not graded.
    pub fn advance(&mut self) -> Result<AdvanceOutcome, TransitionError> {
        match self.phase() {
            SessionPhase::Finished => Err(TransitionError::Finished),
            SessionPhase::Answering(_) => Err(TransitionError::NotGraded),
            SessionPhase::Graded(index) if index + 1 == self.questions.len() => {
                self.finish(FinishReason::Completed);
                Ok(AdvanceOutcome::Completed)
            }
            SessionPhase::Graded(index) => {
                self.current = index + 1;
                self.furthest = self.furthest.max(self.current);
                Ok(AdvanceOutcome::Moved(self.current))
            }
        }
    }

    /// Moves the pointer to an already reached question.
    ///
    /// # Errors
    ///
    /// Returns `TransitionError::NotReached` for indices beyond the furthest reached
    /// question.
    pub fn jump_to(&mut self, index: usize) -> Result<(), TransitionError> {
        self.ensure_open()?;
        if index > self.furthest {
            return Err(TransitionError::NotReached {
                index,
                furthest: self.furthest,
            });
        }
        self.current = index;
        Ok(())
    }

    /// Advances the timer by one second. Expiry finishes the session.
    pub fn tick(&mut self) -> TimerTick {
        if self.is_finished() {
            return TimerTick::Stopped;
        }
        let tick = self.timer.tick();
        if tick == TimerTick::Expired {
            self.finish(FinishReason::TimedOut);
        }
        tick
    }

    /// Ends the session and stops the timer. Returns false if it had already ended.
    pub fn finish(&mut self, reason: FinishReason) -> bool {
        if self.finished.is_some() {
            return false;
        }
        self.timer.cancel();
        self.finished = Some(reason);
        true
    }

    /// Running tally of graded-correct questions.
    #[must_use]
    pub fn correct_count(&self) -> usize {
        scoring::correct_count(&self.questions, &self.answers)
    }

    /// Score over all session questions; ungraded ones count as incorrect.
    ///
    /// # Errors
    ///
    /// Propagates `ScoreError` from the scorer.
    pub fn score(&self) -> Result<ExamScore, ScoreError> {
        scoring::score(&self.questions, &self.answers)
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress {
            total: self.questions.len(),
            position: self.current + 1,
            answered: self.answers.answered_count(),
            graded: self.answers.graded_count(),
            correct: self.correct_count(),
            remaining_secs: self.timer.remaining_secs(),
            running_low: self.timer.is_running_low(),
            is_finished: self.is_finished(),
        }
    }

    fn ensure_open(&self) -> Result<(), TransitionError> {
        if self.is_finished() {
            Err(TransitionError::Finished)
        } else {
            Ok(())
        }
    }
}

impl fmt::Debug for ExamSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExamSession")
            .field("questions_len", &self.questions.len())
            .field("current", &self.current)
            .field("furthest", &self.furthest)
            .field("graded", &self.answers.graded_count())
            .field("remaining_secs", &self.timer.remaining_secs())
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
