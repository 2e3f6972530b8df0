use chrono::Duration;
use exam_core::model::{
    Chapter, ChapterExamMeta, ChapterId, Course, CourseId, Difficulty, Question, QuestionId, Score,
    StudentId,
};
use exam_core::time::fixed_now;
use storage::repository::{
    CourseRepository, ExamMetaRepository, ProgressKey, ProgressStore, QuestionBank, Storage,
};
use storage::sqlite::SqliteRepository;

async fn connect(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

fn build_question(id: u64, chapter: u64, options: &[&str], correct: usize) -> Question {
    Question::new(
        QuestionId::new(id),
        CourseId::new(1),
        ChapterId::new(chapter),
        format!("Question {id}"),
        options.iter().map(ToString::to_string).collect(),
        correct,
        Some("Because.".into()),
        Difficulty::Hard,
    )
    .unwrap()
}

#[tokio::test]
async fn course_and_chapters_roundtrip_in_order() {
    let repo = connect("memdb_courses").await;

    let course = Course::new(
        CourseId::new(1),
        "Hazmat Awareness",
        vec![
            Chapter::new(ChapterId::new(20), "Containment", 2).unwrap(),
            Chapter::new(ChapterId::new(10), "Identification", 1).unwrap(),
        ],
    )
    .unwrap();
    repo.upsert_course(&course).await.unwrap();

    let fetched = repo.get_course(CourseId::new(1)).await.unwrap().expect("course");
    assert_eq!(fetched, course);
    assert_eq!(fetched.chapters()[0].id(), ChapterId::new(10));

    // replacing the chapter list drops removed chapters
    let trimmed = Course::new(
        CourseId::new(1),
        "Hazmat Awareness",
        vec![Chapter::new(ChapterId::new(10), "Identification", 1).unwrap()],
    )
    .unwrap();
    repo.upsert_course(&trimmed).await.unwrap();
    let fetched = repo.get_course(CourseId::new(1)).await.unwrap().expect("course");
    assert_eq!(fetched.chapters().len(), 1);

    assert!(repo.get_course(CourseId::new(2)).await.unwrap().is_none());
    assert_eq!(repo.list_courses().await.unwrap().len(), 1);
}

#[tokio::test]
async fn question_options_survive_json_storage() {
    let repo = connect("memdb_questions").await;

    let q1 = build_question(1, 1, &["Water", "Foam", "CO2", "Dry powder"], 2);
    let q2 = build_question(2, 1, &["Yes", "No"], 1);
    let other = build_question(3, 2, &["A", "B", "C"], 0);
    for q in [&q1, &q2, &other] {
        repo.upsert_question(q).await.unwrap();
    }

    let found = repo
        .chapter_questions(CourseId::new(1), ChapterId::new(1))
        .await
        .unwrap();
    assert_eq!(found, vec![q1.clone(), q2]);
    assert_eq!(found[0].correct_option(), "CO2");
    assert_eq!(found[0].difficulty(), Difficulty::Hard);
}

#[tokio::test]
async fn exam_meta_roundtrip_with_and_without_start_time() {
    let repo = connect("memdb_meta").await;

    let gated = ChapterExamMeta::new(
        CourseId::new(1),
        ChapterId::new(1),
        5,
        20,
        Some(fixed_now() + Duration::hours(2)),
    )
    .unwrap();
    let open = ChapterExamMeta::new(CourseId::new(1), ChapterId::new(2), 10, 15, None).unwrap();
    repo.upsert_exam_meta(&gated).await.unwrap();
    repo.upsert_exam_meta(&open).await.unwrap();

    let fetched = repo
        .get_exam_meta(CourseId::new(1), ChapterId::new(1))
        .await
        .unwrap()
        .expect("meta");
    assert_eq!(fetched, gated);
    assert!(!fetched.is_available_at(fixed_now()));

    let fetched = repo
        .get_exam_meta(CourseId::new(1), ChapterId::new(2))
        .await
        .unwrap()
        .expect("meta");
    assert_eq!(fetched.starts_at(), None);

    assert!(
        repo.get_exam_meta(CourseId::new(1), ChapterId::new(3))
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn chapter_scores_overwrite_per_student() {
    let storage = Storage::sqlite("sqlite:file:memdb_progress?mode=memory&cache=shared")
        .await
        .expect("storage");
    let key = ProgressKey::new(StudentId::new(7), CourseId::new(1));
    let other = ProgressKey::new(StudentId::new(8), CourseId::new(1));

    storage
        .progress
        .set(key, ChapterId::new(1), Score::new(90).unwrap())
        .await
        .unwrap();
    storage
        .progress
        .set(key, ChapterId::new(1), Score::new(40).unwrap())
        .await
        .unwrap();
    storage
        .progress
        .set(key, ChapterId::new(2), Score::new(70).unwrap())
        .await
        .unwrap();

    let progress = storage.progress.get(key).await.unwrap();
    assert_eq!(progress.score_for(ChapterId::new(1)), Some(Score::new(40).unwrap()));
    assert!(!progress.has_passed(ChapterId::new(1)));
    assert!(progress.has_passed(ChapterId::new(2)));

    assert!(storage.progress.get(other).await.unwrap().is_empty());
}
