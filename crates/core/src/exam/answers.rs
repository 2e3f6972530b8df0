use std::collections::{HashMap, HashSet};

use crate::model::QuestionId;

/// Selections and grading locks for one exam attempt.
///
/// Once a question is graded its selection can no longer change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerSheet {
    selections: HashMap<QuestionId, usize>,
    graded: HashSet<QuestionId>,
}

impl AnswerSheet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `option` for an ungraded question. Returns false if the question is graded.
    pub fn select(&mut self, question_id: QuestionId, option: usize) -> bool {
        if self.graded.contains(&question_id) {
            return false;
        }
        self.selections.insert(question_id, option);
        true
    }

    /// Locks the current selection. Returns false when nothing is selected.
    pub fn grade(&mut self, question_id: QuestionId) -> bool {
        if !self.selections.contains_key(&question_id) {
            return false;
        }
        self.graded.insert(question_id);
        true
    }

    #[must_use]
    pub fn selection(&self, question_id: QuestionId) -> Option<usize> {
        self.selections.get(&question_id).copied()
    }

    #[must_use]
    pub fn is_graded(&self, question_id: QuestionId) -> bool {
        self.graded.contains(&question_id)
    }

    /// The locked selection of a graded question.
    #[must_use]
    pub fn graded_selection(&self, question_id: QuestionId) -> Option<usize> {
        if self.is_graded(question_id) {
            self.selection(question_id)
        } else {
            None
        }
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.selections.len()
    }

    #[must_use]
    pub fn graded_count(&self) -> usize {
        self.graded.len()
    }
}
