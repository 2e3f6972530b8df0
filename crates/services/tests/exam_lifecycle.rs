mod support;

use chrono::Duration;
use exam_core::exam::{AdvanceOutcome, FinishReason, TimerTick};
use exam_core::model::{ChapterId, CourseId, Score};
use exam_core::time::fixed_now;
use rand::SeedableRng;
use rand::rngs::StdRng;
use services::{Clock, ExamAttempt, ExamError};

use support::{
    COURSE, DEFAULTS, EMPTY, GATED, RecordingReporter, TIMED, fixture, fixture_with, student,
};

/// Grades the current question, picking the correct option when `correct` is set.
fn grade_current(attempt: &mut ExamAttempt, correct: bool) {
    let question = attempt.current_question().clone();
    let choice = if correct {
        question.correct_index()
    } else {
        (question.correct_index() + 1) % question.options().len()
    };
    attempt.select_option(question.id(), choice).unwrap();
    attempt.submit_current().unwrap();
}

#[tokio::test]
async fn duplicate_finalize_records_one_score_and_one_report() {
    let fx = fixture().await;
    let mut rng = StdRng::seed_from_u64(11);
    let mut attempt = fx
        .service
        .start_exam_with_rng(student(), COURSE, TIMED, &mut rng)
        .await
        .unwrap();
    assert_eq!(attempt.session().questions().len(), 10);
    assert_eq!(attempt.started_at(), fixed_now());

    for i in 0..10 {
        grade_current(&mut attempt, i < 7);
        let outcome = attempt.advance().unwrap();
        if i == 9 {
            assert_eq!(outcome, AdvanceOutcome::Completed);
        }
    }

    let first = fx
        .service
        .finalize(&mut attempt, FinishReason::Manual)
        .await
        .unwrap()
        .expect("first finalize wins");
    let second = fx
        .service
        .finalize(&mut attempt, FinishReason::TimedOut)
        .await
        .unwrap();
    assert!(second.is_none());

    assert_eq!(first.result.score, Score::new(70).unwrap());
    assert_eq!(first.result.correct, 7);
    assert!(first.result.passed);
    assert_eq!(first.result.finish_reason, FinishReason::Completed);

    let record = first.report.record().clone();
    assert_eq!(record.student_name, "Ada");
    assert_eq!(record.course_title, "Firefighter I");
    assert_eq!(record.chapter_title, "Fire Behavior");
    assert_eq!(record.submitted_at, fixed_now());

    assert!(attempt.guard().is_in_flight());
    first.report.send().await;
    assert!(!attempt.guard().is_in_flight());
    assert!(attempt.guard().is_spent());

    assert_eq!(fx.progress.writes(), 1);
    assert_eq!(fx.reporter.calls(), 1);
    assert!(fx.stored_progress().await.has_passed(TIMED));
}

#[tokio::test]
async fn timeout_counts_ungraded_questions_as_incorrect() {
    let fx = fixture().await;
    let mut rng = StdRng::seed_from_u64(5);
    let mut attempt = fx
        .service
        .start_exam_with_rng(student(), COURSE, TIMED, &mut rng)
        .await
        .unwrap();

    for _ in 0..6 {
        grade_current(&mut attempt, true);
        attempt.advance().unwrap();
    }
    // selected but never submitted
    let question = attempt.current_question().clone();
    attempt
        .select_option(question.id(), question.correct_index())
        .unwrap();

    let ticks: Vec<_> = (0..60).map(|_| attempt.tick()).collect();
    assert_eq!(ticks.last(), Some(&TimerTick::Expired));
    assert!(attempt.is_finished());

    // manual finish racing the expiry loses to the recorded timeout
    let finalized = fx
        .service
        .finalize(&mut attempt, FinishReason::Manual)
        .await
        .unwrap()
        .expect("finalize");
    assert!(
        fx.service
            .finalize(&mut attempt, FinishReason::TimedOut)
            .await
            .unwrap()
            .is_none()
    );

    assert_eq!(finalized.result.finish_reason, FinishReason::TimedOut);
    assert_eq!(finalized.result.score, Score::new(60).unwrap());
    assert!(!finalized.result.passed);

    finalized.report.send().await;
    assert_eq!(fx.progress.writes(), 1);
    assert_eq!(fx.reporter.calls(), 1);
    assert_eq!(
        fx.stored_progress().await.score_for(TIMED),
        Some(Score::new(60).unwrap())
    );
}

#[tokio::test]
async fn future_start_time_refuses_to_start() {
    let fx = fixture().await;

    let err = fx
        .service
        .start_exam(student(), COURSE, GATED)
        .await
        .unwrap_err();
    assert!(err.is_precondition());
    assert!(
        matches!(err, ExamError::NotYetAvailable { starts_at } if starts_at == fixed_now() + Duration::days(1))
    );

    let later = fixture_with(
        Clock::fixed(fixed_now() + Duration::days(1)),
        RecordingReporter::default(),
        false,
    )
    .await;
    let attempt = later
        .service
        .start_exam(student(), COURSE, GATED)
        .await
        .unwrap();
    assert_eq!(attempt.session().questions().len(), 5);
}

#[tokio::test]
async fn unresolvable_requests_are_preconditions() {
    let fx = fixture().await;

    let err = fx
        .service
        .start_exam(student(), COURSE, EMPTY)
        .await
        .unwrap_err();
    assert!(matches!(err, ExamError::NoQuestions { chapter_id, .. } if chapter_id == EMPTY));

    let err = fx
        .service
        .start_exam(student(), COURSE, ChapterId::new(99))
        .await
        .unwrap_err();
    assert!(matches!(err, ExamError::ChapterNotFound { .. }));

    let err = fx
        .service
        .start_exam(student(), CourseId::new(42), TIMED)
        .await
        .unwrap_err();
    assert!(matches!(err, ExamError::CourseNotFound(_)));
    assert!(err.is_precondition());
}

#[tokio::test]
async fn missing_meta_falls_back_to_defaults() {
    let fx = fixture().await;
    let attempt = fx
        .service
        .start_exam(student(), COURSE, DEFAULTS)
        .await
        .unwrap();

    assert_eq!(attempt.session().questions().len(), 10);
    assert_eq!(attempt.session().timer().remaining_secs(), 15 * 60);
    assert_eq!(attempt.session().timer().display(), "15:00");
}

#[tokio::test]
async fn failed_report_keeps_the_local_result() {
    let fx = fixture_with(
        Clock::fixed(fixed_now()),
        RecordingReporter::failing(),
        false,
    )
    .await;
    let mut attempt = fx
        .service
        .start_exam(student(), COURSE, TIMED)
        .await
        .unwrap();
    grade_current(&mut attempt, true);

    let finalized = fx
        .service
        .finalize(&mut attempt, FinishReason::Manual)
        .await
        .unwrap()
        .expect("finalize");
    assert_eq!(finalized.result.score, Score::new(10).unwrap());
    assert_eq!(finalized.result.finish_reason, FinishReason::Manual);

    finalized.report.send().await;
    assert_eq!(fx.reporter.calls(), 1);
    assert!(!attempt.guard().is_in_flight());
    assert_eq!(
        fx.stored_progress().await.score_for(TIMED),
        Some(Score::new(10).unwrap())
    );
}

#[tokio::test]
async fn storage_failure_surfaces_and_spends_the_guard() {
    let fx = fixture_with(Clock::fixed(fixed_now()), RecordingReporter::default(), true).await;
    let mut attempt = fx
        .service
        .start_exam(student(), COURSE, TIMED)
        .await
        .unwrap();

    let err = fx
        .service
        .finalize(&mut attempt, FinishReason::Manual)
        .await
        .unwrap_err();
    assert!(matches!(err, ExamError::Storage(_)));
    assert!(attempt.guard().is_spent());

    assert!(
        fx.service
            .finalize(&mut attempt, FinishReason::Manual)
            .await
            .unwrap()
            .is_none()
    );
    assert_eq!(fx.progress.writes(), 1);
    assert_eq!(fx.reporter.calls(), 0);
}

#[tokio::test]
async fn progression_follows_recorded_results() {
    let fx = fixture().await;
    let progression = fx.service.progression();
    let student_id = student().id();

    assert!(
        !progression
            .is_chapter_unlocked(student_id, COURSE, GATED)
            .await
            .unwrap()
    );

    let mut attempt = fx
        .service
        .start_exam(student(), COURSE, TIMED)
        .await
        .unwrap();
    for _ in 0..10 {
        grade_current(&mut attempt, true);
        attempt.advance().unwrap();
    }
    let finalized = fx
        .service
        .finalize(&mut attempt, FinishReason::Manual)
        .await
        .unwrap()
        .expect("finalize");
    assert_eq!(finalized.result.score, Score::FULL);

    let overview = progression.course_progress(student_id, COURSE).await.unwrap();
    assert_eq!(overview.passed_chapters, 1);
    assert_eq!(overview.completion_percent, 25);
    assert!(overview.chapters[1].unlocked);
    assert!(!overview.chapters[2].unlocked);
    assert!(!overview.certificate_earned);
}
