use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::HashSet;

use crate::exam::shuffle::{SessionQuestion, shuffle_options};
use crate::model::{ChapterId, CourseId, Question};

/// Draws up to `desired` questions for a course chapter in random order.
///
/// The bank is filtered to the exact `(course_id, chapter_id)` pair, uniformly
/// permuted and truncated to `min(desired, matching)`. Records repeating an already
/// seen question id are skipped. An empty result means the chapter has no questions;
/// callers must not start a session from it.
pub fn sample_questions<'a, I, R>(
    bank: I,
    course_id: CourseId,
    chapter_id: ChapterId,
    desired: usize,
    rng: &mut R,
) -> Vec<Question>
where
    I: IntoIterator<Item = &'a Question>,
    R: Rng + ?Sized,
{
    let mut seen = HashSet::new();
    let mut matching: Vec<Question> = bank
        .into_iter()
        .filter(|q| q.belongs_to(course_id, chapter_id))
        .filter(|q| seen.insert(q.id()))
        .cloned()
        .collect();

    matching.shuffle(rng);
    matching.truncate(desired);
    matching
}

/// Samples questions and shuffles every question's options independently.
///
/// The returned list is the fixed question order for one exam session.
pub fn draw_session_questions<'a, I, R>(
    bank: I,
    course_id: CourseId,
    chapter_id: ChapterId,
    desired: usize,
    rng: &mut R,
) -> Vec<SessionQuestion>
where
    I: IntoIterator<Item = &'a Question>,
    R: Rng + ?Sized,
{
    sample_questions(bank, course_id, chapter_id, desired, rng)
        .into_iter()
        .map(|q| shuffle_options(q, rng))
        .collect()
}
