//! Pass/fail gating between chapters and course certification.
//!
//! Everything here is derived from a course's chapter order and the student's
//! recorded scores on every call; nothing is cached.

use crate::model::{ChapterId, ChapterProgress, ChapterStatus, Course, Score};

/// Status of a single chapter as seen by course navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterOverview {
    pub chapter_id: ChapterId,
    pub title: String,
    pub status: ChapterStatus,
    pub unlocked: bool,
}

/// Course-level view of a student's progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseProgress {
    pub chapters: Vec<ChapterOverview>,
    pub passed_chapters: usize,
    pub completion_percent: u8,
    pub certificate_earned: bool,
    /// Rounded mean of chapter scores, present once the certificate is earned.
    pub certificate_score: Option<Score>,
}

/// A chapter is unlocked if it is the first chapter of the course, or the chapter
/// right before it (by order) has a passing score. Unknown chapters are locked.
#[must_use]
pub fn is_chapter_unlocked(course: &Course, progress: &ChapterProgress, chapter_id: ChapterId) -> bool {
    if course.chapter(chapter_id).is_none() {
        return false;
    }
    match course.previous_chapter(chapter_id) {
        None => true,
        Some(previous) => progress.has_passed(previous.id()),
    }
}

/// True when every chapter of the course has a passing score.
///
/// A course without chapters never awards a certificate.
#[must_use]
pub fn certificate_earned(course: &Course, progress: &ChapterProgress) -> bool {
    !course.chapters().is_empty()
        && course
            .chapters()
            .iter()
            .all(|chapter| progress.has_passed(chapter.id()))
}

/// Number of chapters of this course with a passing score.
#[must_use]
pub fn passed_chapters(course: &Course, progress: &ChapterProgress) -> usize {
    course
        .chapters()
        .iter()
        .filter(|chapter| progress.has_passed(chapter.id()))
        .count()
}

/// Share of passed chapters as a rounded percentage; 0 for a course without chapters.
#[must_use]
pub fn completion_percent(course: &Course, progress: &ChapterProgress) -> u8 {
    Score::from_fraction(passed_chapters(course, progress), course.chapters().len())
        .map_or(0, Score::value)
}

/// Rounded mean of the course's chapter scores once the certificate is earned.
#[must_use]
pub fn certificate_score(course: &Course, progress: &ChapterProgress) -> Option<Score> {
    if !certificate_earned(course, progress) {
        return None;
    }
    let scores: Vec<usize> = course
        .chapters()
        .iter()
        .filter_map(|chapter| progress.score_for(chapter.id()))
        .map(|score| usize::from(score.value()))
        .collect();
    let count = scores.len();
    let sum: usize = scores.iter().sum();
    // round(sum / count), halves up
    let mean = (2 * sum + count) / (2 * count);
    Score::try_from(i64::try_from(mean).ok()?).ok()
}

#[must_use]
pub fn course_progress(course: &Course, progress: &ChapterProgress) -> CourseProgress {
    let chapters = course
        .chapters()
        .iter()
        .map(|chapter| ChapterOverview {
            chapter_id: chapter.id(),
            title: chapter.title().to_string(),
            status: progress.status_for(chapter.id()),
            unlocked: is_chapter_unlocked(course, progress, chapter.id()),
        })
        .collect();

    CourseProgress {
        chapters,
        passed_chapters: passed_chapters(course, progress),
        completion_percent: completion_percent(course, progress),
        certificate_earned: certificate_earned(course, progress),
        certificate_score: certificate_score(course, progress),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Chapter, CourseId};

    fn course() -> Course {
        Course::new(
            CourseId::new(1),
            "Firefighter I",
            (1..=3)
                .map(|i| Chapter::new(ChapterId::new(i), format!("Chapter {i}"), i as u32).unwrap())
                .collect(),
        )
        .unwrap()
    }

    fn score(v: u8) -> Score {
        Score::new(v).unwrap()
    }

    #[test]
    fn unlock_propagates_through_chapter_order() {
        let course = course();
        let mut progress = ChapterProgress::new();
        let (c1, c2, c3) = (ChapterId::new(1), ChapterId::new(2), ChapterId::new(3));

        assert!(is_chapter_unlocked(&course, &progress, c1));
        assert!(!is_chapter_unlocked(&course, &progress, c2));

        progress.record(c1, score(80));
        assert!(is_chapter_unlocked(&course, &progress, c2));
        assert!(!is_chapter_unlocked(&course, &progress, c3));
        assert!(!certificate_earned(&course, &progress));

        progress.record(c2, score(75));
        assert!(is_chapter_unlocked(&course, &progress, c3));
        assert!(!certificate_earned(&course, &progress));

        progress.record(c3, score(70));
        assert!(certificate_earned(&course, &progress));
    }

    #[test]
    fn failing_score_keeps_next_chapter_locked() {
        let course = course();
        let mut progress = ChapterProgress::new();
        progress.record(ChapterId::new(1), score(69));
        assert!(!is_chapter_unlocked(&course, &progress, ChapterId::new(2)));
        assert!(!is_chapter_unlocked(&course, &progress, ChapterId::new(99)));
    }

    #[test]
    fn certificate_is_revoked_by_a_later_failing_attempt() {
        let course = course();
        let mut progress: ChapterProgress = (1..=3)
            .map(|i| (ChapterId::new(i), score(90)))
            .collect();
        assert!(certificate_earned(&course, &progress));

        progress.record(ChapterId::new(2), score(40));
        assert!(!certificate_earned(&course, &progress));
    }

    #[test]
    fn course_overview_reports_completion_and_average() {
        let course = course();
        let mut progress = ChapterProgress::new();
        progress.record(ChapterId::new(1), score(80));
        progress.record(ChapterId::new(2), score(50));

        let overview = course_progress(&course, &progress);
        assert_eq!(overview.passed_chapters, 1);
        assert_eq!(overview.completion_percent, 33);
        assert_eq!(overview.chapters[1].status, ChapterStatus::Failed(score(50)));
        assert!(overview.chapters[1].unlocked);
        assert!(!overview.chapters[2].unlocked);
        assert_eq!(overview.certificate_score, None);

        progress.record(ChapterId::new(2), score(71));
        progress.record(ChapterId::new(3), score(100));
        let overview = course_progress(&course, &progress);
        assert_eq!(overview.completion_percent, 100);
        assert!(overview.certificate_earned);
        assert_eq!(overview.certificate_score, Some(score(84)));
    }

    #[test]
    fn empty_course_has_no_certificate() {
        let course = Course::new(CourseId::new(5), "Empty", Vec::new()).unwrap();
        let progress = ChapterProgress::new();
        assert!(!certificate_earned(&course, &progress));
        assert_eq!(completion_percent(&course, &progress), 0);
    }
}
