#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Duration;
use exam_core::model::{
    Chapter, ChapterExamMeta, ChapterId, ChapterProgress, Course, CourseId, Difficulty, Question,
    QuestionId, Score, Student, StudentId, SubmissionRecord,
};
use exam_core::time::fixed_now;
use services::{Clock, ExamService, ReportError, SubmissionReporter};
use storage::repository::{
    CourseRepository, ExamMetaRepository, InMemoryRepository, ProgressKey, ProgressStore,
    QuestionBank, Storage, StorageError,
};

pub const COURSE: CourseId = CourseId::new(1);
/// 12 questions, 10 per exam, 1 minute.
pub const TIMED: ChapterId = ChapterId::new(1);
/// Opens one day after `fixed_now()`.
pub const GATED: ChapterId = ChapterId::new(2);
/// 15 questions, no configured meta.
pub const DEFAULTS: ChapterId = ChapterId::new(3);
/// No questions at all.
pub const EMPTY: ChapterId = ChapterId::new(4);

/// Counts report attempts and optionally fails them or never answers.
#[derive(Default)]
pub struct RecordingReporter {
    pub records: Mutex<Vec<SubmissionRecord>>,
    fail: bool,
    stall: bool,
}

impl RecordingReporter {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Records the attempt, then hangs like an unresponsive endpoint.
    pub fn stalled() -> Self {
        Self {
            stall: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}

#[async_trait]
impl SubmissionReporter for RecordingReporter {
    async fn report(&self, record: &SubmissionRecord) -> Result<(), ReportError> {
        self.records.lock().unwrap().push(record.clone());
        if self.stall {
            std::future::pending::<()>().await;
        }
        if self.fail {
            return Err(ReportError::HttpStatus(
                reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            ));
        }
        Ok(())
    }
}

/// Progress store that counts writes and can be made to fail them.
pub struct CountingProgress {
    inner: InMemoryRepository,
    writes: AtomicUsize,
    fail_writes: bool,
}

impl CountingProgress {
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProgressStore for CountingProgress {
    async fn get(&self, key: ProgressKey) -> Result<ChapterProgress, StorageError> {
        self.inner.get(key).await
    }

    async fn set(
        &self,
        key: ProgressKey,
        chapter_id: ChapterId,
        score: Score,
    ) -> Result<(), StorageError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes {
            return Err(StorageError::Connection("disk full".into()));
        }
        self.inner.set(key, chapter_id, score).await
    }
}

pub struct Fixture {
    pub storage: Storage,
    pub progress: Arc<CountingProgress>,
    pub reporter: Arc<RecordingReporter>,
    pub service: Arc<ExamService>,
}

impl Fixture {
    pub async fn stored_progress(&self) -> ChapterProgress {
        self.progress
            .get(ProgressKey::new(student().id(), COURSE))
            .await
            .unwrap()
    }
}

pub fn student() -> Student {
    Student::new(StudentId::new(7), Some("Ada".into()))
}

/// Options are "Option 1".."Option 4"; the correct one rotates with the id.
pub fn build_question(id: u64, chapter_id: ChapterId) -> Question {
    Question::new(
        QuestionId::new(id),
        COURSE,
        chapter_id,
        format!("Question {id}"),
        (1..=4).map(|n| format!("Option {n}")).collect(),
        usize::try_from(id % 4).unwrap(),
        Some(format!("Explanation {id}")),
        Difficulty::Medium,
    )
    .unwrap()
}

pub async fn fixture() -> Fixture {
    fixture_with(Clock::fixed(fixed_now()), RecordingReporter::default(), false).await
}

pub async fn fixture_with(clock: Clock, reporter: RecordingReporter, fail_writes: bool) -> Fixture {
    let repo = InMemoryRepository::new();

    let course = Course::new(
        COURSE,
        "Firefighter I",
        vec![
            Chapter::new(TIMED, "Fire Behavior", 1).unwrap(),
            Chapter::new(GATED, "Ventilation", 2).unwrap(),
            Chapter::new(DEFAULTS, "Ladders", 3).unwrap(),
            Chapter::new(EMPTY, "Rescue", 4).unwrap(),
        ],
    )
    .unwrap();
    repo.upsert_course(&course).await.unwrap();

    for id in 1..=12 {
        repo.upsert_question(&build_question(id, TIMED)).await.unwrap();
    }
    for id in 101..=105 {
        repo.upsert_question(&build_question(id, GATED)).await.unwrap();
    }
    for id in 201..=215 {
        repo.upsert_question(&build_question(id, DEFAULTS)).await.unwrap();
    }

    repo.upsert_exam_meta(&ChapterExamMeta::new(COURSE, TIMED, 10, 1, None).unwrap())
        .await
        .unwrap();
    repo.upsert_exam_meta(
        &ChapterExamMeta::new(COURSE, GATED, 5, 10, Some(fixed_now() + Duration::days(1)))
            .unwrap(),
    )
    .await
    .unwrap();

    let progress = Arc::new(CountingProgress {
        inner: repo.clone(),
        writes: AtomicUsize::new(0),
        fail_writes,
    });
    let storage = Storage {
        courses: Arc::new(repo.clone()),
        questions: Arc::new(repo.clone()),
        exam_meta: Arc::new(repo),
        progress: progress.clone(),
    };
    let reporter = Arc::new(reporter);
    let service = Arc::new(ExamService::from_storage(clock, &storage, reporter.clone()));

    Fixture {
        storage,
        progress,
        reporter,
        service,
    }
}
