use rand::Rng;
use rand::seq::SliceRandom;

use crate::model::{Difficulty, Question, QuestionId};

/// A question as presented in one session: options reordered, correct index remapped.
///
/// `options()[correct_index()]` is always the source question's correct option text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionQuestion {
    source: Question,
    options: Vec<String>,
    /// `original_positions[i]` is the source index of presented option `i`.
    original_positions: Vec<usize>,
    correct_index: usize,
}

/// Randomly permutes a question's options, keeping track of the correct one.
pub fn shuffle_options<R: Rng + ?Sized>(question: Question, rng: &mut R) -> SessionQuestion {
    let mut order: Vec<usize> = (0..question.options().len()).collect();
    order.shuffle(rng);
    SessionQuestion::arrange(question, order)
}

impl SessionQuestion {
    /// Presents `source` options in `order` (a permutation of source indices).
    pub(crate) fn arrange(source: Question, order: Vec<usize>) -> Self {
        let options = order
            .iter()
            .map(|&original| source.options()[original].clone())
            .collect();
        let mut correct_index = 0;
        for (position, &original) in order.iter().enumerate() {
            if original == source.correct_index() {
                correct_index = position;
            }
        }

        Self {
            source,
            options,
            original_positions: order,
            correct_index,
        }
    }

    /// Presents the source question without reordering.
    #[must_use]
    pub fn unshuffled(source: Question) -> Self {
        let order = (0..source.options().len()).collect();
        Self::arrange(source, order)
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.source.id()
    }

    #[must_use]
    pub fn text(&self) -> &str {
        self.source.text()
    }

    /// Options in presentation order.
    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// Index of the correct option in presentation order.
    #[must_use]
    pub fn correct_index(&self) -> usize {
        self.correct_index
    }

    #[must_use]
    pub fn correct_option(&self) -> &str {
        &self.options[self.correct_index]
    }

    #[must_use]
    pub fn explanation(&self) -> Option<&str> {
        self.source.explanation()
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.source.difficulty()
    }

    /// The authored question this was derived from.
    #[must_use]
    pub fn source(&self) -> &Question {
        &self.source
    }

    /// Source index of the option presented at `position`.
    #[must_use]
    pub fn original_index(&self, position: usize) -> Option<usize> {
        self.original_positions.get(position).copied()
    }

    #[must_use]
    pub fn is_correct(&self, selected: usize) -> bool {
        selected == self.correct_index
    }
}
