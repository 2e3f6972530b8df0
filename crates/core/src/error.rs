use thiserror::Error;

use crate::exam::TransitionError;
use crate::model::{CourseError, ExamMetaError, QuestionError, ScoreError};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    ExamMeta(#[from] ExamMetaError),
    #[error(transparent)]
    Course(#[from] CourseError),
    #[error(transparent)]
    Score(#[from] ScoreError),
    #[error(transparent)]
    Transition(#[from] TransitionError),
}
