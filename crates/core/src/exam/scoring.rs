use crate::exam::answers::AnswerSheet;
use crate::exam::shuffle::SessionQuestion;
use crate::model::{Score, ScoreError};

/// Final tally of an exam session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExamScore {
    pub correct: usize,
    pub total: usize,
    pub score: Score,
}

impl ExamScore {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.score.is_passing()
    }
}

/// Number of graded questions whose locked selection is the correct option.
#[must_use]
pub fn correct_count(questions: &[SessionQuestion], answers: &AnswerSheet) -> usize {
    questions
        .iter()
        .filter(|q| {
            answers
                .graded_selection(q.id())
                .is_some_and(|selected| q.is_correct(selected))
        })
        .count()
}

/// Scores a session. Ungraded and unanswered questions count as incorrect.
///
/// # Errors
///
/// Returns `ScoreError::NoQuestions` for an empty question list.
pub fn score(questions: &[SessionQuestion], answers: &AnswerSheet) -> Result<ExamScore, ScoreError> {
    let correct = correct_count(questions, answers);
    let total = questions.len();
    Ok(ExamScore {
        correct,
        total,
        score: Score::from_fraction(correct, total)?,
    })
}
