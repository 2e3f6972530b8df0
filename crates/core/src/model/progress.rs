use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

use crate::model::ids::ChapterId;

/// Minimum chapter score that counts as a pass.
pub const PASS_THRESHOLD: u8 = 70;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ScoreError {
    #[error("score must be within 0..=100, got {0}")]
    OutOfRange(i64),

    #[error("cannot score an exam without questions")]
    NoQuestions,

    #[error("correct count {correct} exceeds total {total}")]
    CorrectExceedsTotal { correct: usize, total: usize },
}

//
// ─── SCORE ─────────────────────────────────────────────────────────────────────
//

/// Integer percentage in `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Score(u8);

impl Score {
    pub const ZERO: Score = Score(0);
    pub const FULL: Score = Score(100);

    /// # Errors
    ///
    /// Returns `ScoreError::OutOfRange` for values above 100.
    pub fn new(value: u8) -> Result<Self, ScoreError> {
        Self::try_from(i64::from(value))
    }

    /// Rounded percentage of `correct` out of `total`, rounding halves up.
    ///
    /// # Errors
    ///
    /// Returns `ScoreError::NoQuestions` when `total` is zero and
    /// `ScoreError::CorrectExceedsTotal` when `correct > total`.
    pub fn from_fraction(correct: usize, total: usize) -> Result<Self, ScoreError> {
        if total == 0 {
            return Err(ScoreError::NoQuestions);
        }
        if correct > total {
            return Err(ScoreError::CorrectExceedsTotal { correct, total });
        }
        // round(100 * c / t) with halves rounded up, in integers
        let percentage = (200 * correct + total) / (2 * total);
        Self::try_from(i64::try_from(percentage).unwrap_or(i64::MAX))
    }

    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }

    #[must_use]
    pub fn is_passing(self) -> bool {
        self.0 >= PASS_THRESHOLD
    }
}

impl TryFrom<i64> for Score {
    type Error = ScoreError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .ok()
            .filter(|v| *v <= 100)
            .map(Self)
            .ok_or(ScoreError::OutOfRange(value))
    }
}

impl From<Score> for u8 {
    fn from(score: Score) -> Self {
        score.0
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

//
// ─── CHAPTER STATUS ────────────────────────────────────────────────────────────
//

/// Attempt status of a chapter for one student.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChapterStatus {
    NotAttempted,
    Passed(Score),
    /// Failed attempts can be retaken.
    Failed(Score),
}

impl ChapterStatus {
    #[must_use]
    pub fn from_score(score: Option<Score>) -> Self {
        match score {
            None => Self::NotAttempted,
            Some(s) if s.is_passing() => Self::Passed(s),
            Some(s) => Self::Failed(s),
        }
    }

    #[must_use]
    pub fn is_passed(self) -> bool {
        matches!(self, Self::Passed(_))
    }
}

//
// ─── CHAPTER PROGRESS ──────────────────────────────────────────────────────────
//

/// Last recorded score per chapter for one student in one course.
///
/// Absent chapters have not been attempted. Recording overwrites: only the most
/// recent attempt is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterProgress {
    scores: BTreeMap<ChapterId, Score>,
}

impl ChapterProgress {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `score` for `chapter_id`, returning the previous score if any.
    pub fn record(&mut self, chapter_id: ChapterId, score: Score) -> Option<Score> {
        self.scores.insert(chapter_id, score)
    }

    #[must_use]
    pub fn score_for(&self, chapter_id: ChapterId) -> Option<Score> {
        self.scores.get(&chapter_id).copied()
    }

    #[must_use]
    pub fn status_for(&self, chapter_id: ChapterId) -> ChapterStatus {
        ChapterStatus::from_score(self.score_for(chapter_id))
    }

    #[must_use]
    pub fn has_passed(&self, chapter_id: ChapterId) -> bool {
        self.status_for(chapter_id).is_passed()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ChapterId, Score)> + '_ {
        self.scores.iter().map(|(id, score)| (*id, *score))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

impl FromIterator<(ChapterId, Score)> for ChapterProgress {
    fn from_iter<T: IntoIterator<Item = (ChapterId, Score)>>(iter: T) -> Self {
        Self {
            scores: iter.into_iter().collect(),
        }
    }
}
