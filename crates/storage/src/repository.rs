use async_trait::async_trait;
use exam_core::model::{
    ChapterExamMeta, ChapterId, ChapterProgress, Course, CourseId, Question, QuestionId, Score,
    StudentId,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Composite key for a student's progress within one course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgressKey {
    pub student_id: StudentId,
    pub course_id: CourseId,
}

impl ProgressKey {
    #[must_use]
    pub fn new(student_id: StudentId, course_id: CourseId) -> Self {
        Self {
            student_id,
            course_id,
        }
    }
}

/// Read access to the course catalog, plus upsert for seeding/authoring.
#[async_trait]
pub trait CourseRepository: Send + Sync {
    /// Persist or replace a course and its chapter list.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the course cannot be stored.
    async fn upsert_course(&self, course: &Course) -> Result<(), StorageError>;

    /// Fetch a course by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures; a missing course is `Ok(None)`.
    async fn get_course(&self, id: CourseId) -> Result<Option<Course>, StorageError>;

    /// List all courses ordered by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_courses(&self) -> Result<Vec<Course>, StorageError>;
}

/// The shared question bank.
#[async_trait]
pub trait QuestionBank: Send + Sync {
    /// Persist or replace a question.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the question cannot be stored.
    async fn upsert_question(&self, question: &Question) -> Result<(), StorageError>;

    /// All questions authored for a course chapter, in no particular order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn chapter_questions(
        &self,
        course_id: CourseId,
        chapter_id: ChapterId,
    ) -> Result<Vec<Question>, StorageError>;
}

/// Per-chapter exam configuration.
#[async_trait]
pub trait ExamMetaRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the configuration cannot be stored.
    async fn upsert_exam_meta(&self, meta: &ChapterExamMeta) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures; unconfigured chapters are `Ok(None)`.
    async fn get_exam_meta(
        &self,
        course_id: CourseId,
        chapter_id: ChapterId,
    ) -> Result<Option<ChapterExamMeta>, StorageError>;
}

/// Last recorded chapter scores per student and course.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Current progress; empty if the student never attempted the course.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get(&self, key: ProgressKey) -> Result<ChapterProgress, StorageError>;

    /// Overwrite the stored score of a single chapter.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the score cannot be stored.
    async fn set(
        &self,
        key: ProgressKey,
        chapter_id: ChapterId,
        score: Score,
    ) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    courses: Arc<Mutex<HashMap<CourseId, Course>>>,
    questions: Arc<Mutex<HashMap<QuestionId, Question>>>,
    exam_meta: Arc<Mutex<HashMap<(CourseId, ChapterId), ChapterExamMeta>>>,
    progress: Arc<Mutex<HashMap<ProgressKey, ChapterProgress>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait]
impl CourseRepository for InMemoryRepository {
    async fn upsert_course(&self, course: &Course) -> Result<(), StorageError> {
        let mut guard = self.courses.lock().map_err(poisoned)?;
        guard.insert(course.id(), course.clone());
        Ok(())
    }

    async fn get_course(&self, id: CourseId) -> Result<Option<Course>, StorageError> {
        let guard = self.courses.lock().map_err(poisoned)?;
        Ok(guard.get(&id).cloned())
    }

    async fn list_courses(&self) -> Result<Vec<Course>, StorageError> {
        let guard = self.courses.lock().map_err(poisoned)?;
        let mut courses: Vec<Course> = guard.values().cloned().collect();
        courses.sort_by_key(Course::id);
        Ok(courses)
    }
}

#[async_trait]
impl QuestionBank for InMemoryRepository {
    async fn upsert_question(&self, question: &Question) -> Result<(), StorageError> {
        let mut guard = self.questions.lock().map_err(poisoned)?;
        guard.insert(question.id(), question.clone());
        Ok(())
    }

    async fn chapter_questions(
        &self,
        course_id: CourseId,
        chapter_id: ChapterId,
    ) -> Result<Vec<Question>, StorageError> {
        let guard = self.questions.lock().map_err(poisoned)?;
        let mut found: Vec<Question> = guard
            .values()
            .filter(|q| q.belongs_to(course_id, chapter_id))
            .cloned()
            .collect();
        found.sort_by_key(Question::id);
        Ok(found)
    }
}

#[async_trait]
impl ExamMetaRepository for InMemoryRepository {
    async fn upsert_exam_meta(&self, meta: &ChapterExamMeta) -> Result<(), StorageError> {
        let mut guard = self.exam_meta.lock().map_err(poisoned)?;
        guard.insert((meta.course_id(), meta.chapter_id()), meta.clone());
        Ok(())
    }

    async fn get_exam_meta(
        &self,
        course_id: CourseId,
        chapter_id: ChapterId,
    ) -> Result<Option<ChapterExamMeta>, StorageError> {
        let guard = self.exam_meta.lock().map_err(poisoned)?;
        Ok(guard.get(&(course_id, chapter_id)).cloned())
    }
}

#[async_trait]
impl ProgressStore for InMemoryRepository {
    async fn get(&self, key: ProgressKey) -> Result<ChapterProgress, StorageError> {
        let guard = self.progress.lock().map_err(poisoned)?;
        Ok(guard.get(&key).cloned().unwrap_or_default())
    }

    async fn set(
        &self,
        key: ProgressKey,
        chapter_id: ChapterId,
        score: Score,
    ) -> Result<(), StorageError> {
        let mut guard = self.progress.lock().map_err(poisoned)?;
        guard.entry(key).or_default().record(chapter_id, score);
        Ok(())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub courses: Arc<dyn CourseRepository>,
    pub questions: Arc<dyn QuestionBank>,
    pub exam_meta: Arc<dyn ExamMetaRepository>,
    pub progress: Arc<dyn ProgressStore>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        Self {
            courses: Arc::new(repo.clone()),
            questions: Arc::new(repo.clone()),
            exam_meta: Arc::new(repo.clone()),
            progress: Arc::new(repo),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exam_core::model::{Chapter, Difficulty};

    fn build_question(id: u64, course: u64, chapter: u64) -> Question {
        Question::new(
            QuestionId::new(id),
            CourseId::new(course),
            ChapterId::new(chapter),
            "Q",
            vec!["a".into(), "b".into()],
            0,
            None,
            Difficulty::Easy,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn chapter_questions_are_filtered_by_course_and_chapter() {
        let repo = InMemoryRepository::new();
        for (id, course, chapter) in [(1, 1, 1), (2, 1, 1), (3, 1, 2), (4, 2, 1)] {
            repo.upsert_question(&build_question(id, course, chapter))
                .await
                .unwrap();
        }

        let found = repo
            .chapter_questions(CourseId::new(1), ChapterId::new(1))
            .await
            .unwrap();
        let ids: Vec<_> = found.iter().map(Question::id).collect();
        assert_eq!(ids, vec![QuestionId::new(1), QuestionId::new(2)]);
    }

    #[tokio::test]
    async fn progress_is_keyed_by_student_and_course() {
        let repo = InMemoryRepository::new();
        let alice = ProgressKey::new(StudentId::new(1), CourseId::new(1));
        let bob = ProgressKey::new(StudentId::new(2), CourseId::new(1));

        repo.set(alice, ChapterId::new(1), Score::new(55).unwrap())
            .await
            .unwrap();
        repo.set(alice, ChapterId::new(1), Score::new(85).unwrap())
            .await
            .unwrap();

        let progress = repo.get(alice).await.unwrap();
        assert_eq!(progress.score_for(ChapterId::new(1)), Some(Score::new(85).unwrap()));
        assert!(repo.get(bob).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_course_is_none() {
        let repo = InMemoryRepository::new();
        let course = Course::new(
            CourseId::new(3),
            "Ropes",
            vec![Chapter::new(ChapterId::new(1), "Knots", 1).unwrap()],
        )
        .unwrap();
        repo.upsert_course(&course).await.unwrap();

        assert_eq!(repo.get_course(CourseId::new(3)).await.unwrap(), Some(course));
        assert!(repo.get_course(CourseId::new(4)).await.unwrap().is_none());
    }
}
