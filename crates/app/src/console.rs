//! Terminal front end for taking exams and viewing course progress.

use exam_core::exam::{Feedback, OptionMark, SessionQuestion, format_remaining};
use exam_core::model::{ChapterId, ChapterStatus, CourseId, Student, StudentId};
use services::{AppServices, ExamCommand, ExamEvent, ExamResult};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

const LABELS: [char; 4] = ['A', 'B', 'C', 'D'];

pub async fn take(
    services: &AppServices,
    student_id: StudentId,
    student_name: Option<String>,
    course_id: CourseId,
    chapter_id: ChapterId,
) -> Result<(), Box<dyn std::error::Error>> {
    let progression = services.progression();
    match progression
        .is_chapter_unlocked(student_id, course_id, chapter_id)
        .await
    {
        Ok(false) => println!("Note: the previous chapter has not been passed yet."),
        Ok(true) => {}
        Err(err) => tracing::debug!(error = %err, "unlock check skipped"),
    }

    let student = Student::new(student_id, student_name);
    let attempt = match services
        .exams()
        .start_exam(student, course_id, chapter_id)
        .await
    {
        Ok(attempt) => attempt,
        Err(err) if err.is_precondition() => {
            println!("Cannot start this exam: {err}");
            return progress(services, student_id, course_id).await;
        }
        Err(err) => return Err(err.into()),
    };

    let total = attempt.session().questions().len();
    println!(
        "{} / {} ({} questions, {} minutes)",
        attempt.course_title(),
        attempt.chapter_title(),
        total,
        attempt.meta().time_limit_minutes()
    );
    println!("Answer with a-d, then 's' to submit. 'n' next, 'g <n>' go to question, 'f' finish.");

    let (command_tx, command_rx) = mpsc::channel(16);
    let (event_tx, mut events) = mpsc::channel(64);
    let runner = services.runner();
    let handle = tokio::spawn(async move { runner.run(attempt, command_rx, event_tx).await });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let mut current: Option<SessionQuestion> = None;
    let mut warned = false;

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                match event {
                    ExamEvent::Presented { index, question } => {
                        print_question(index, total, &question);
                        current = Some(question);
                    }
                    ExamEvent::Tick { remaining_secs, running_low } => {
                        if running_low && !warned {
                            warned = true;
                            println!("Less than 5 minutes remaining ({}).", format_remaining(remaining_secs));
                        } else if remaining_secs % 60 == 0 {
                            println!("[{} left]", format_remaining(remaining_secs));
                        }
                    }
                    ExamEvent::Graded(feedback) => print_feedback(&feedback, current.as_ref()),
                    ExamEvent::Rejected(err) => println!("! {err}"),
                    ExamEvent::Finished(result) => print_result(&result),
                }
            }
            line = lines.next_line(), if stdin_open => {
                let command = match line {
                    Ok(Some(line)) => parse_command(&line, current.as_ref()),
                    Ok(None) | Err(_) => {
                        stdin_open = false;
                        Some(ExamCommand::Finish)
                    }
                };
                match command {
                    Some(command) => {
                        if command_tx.send(command).await.is_err() {
                            stdin_open = false;
                        }
                    }
                    None => println!("?"),
                }
            }
        }
    }

    let completed = handle.await??;
    progress(services, student_id, course_id).await?;

    // the result is already on screen; only let the report finish before exit
    if let Some(completed) = completed {
        if let Err(err) = completed.report.await {
            tracing::warn!(error = %err, "exam report task failed");
        }
    }
    Ok(())
}

pub async fn progress(
    services: &AppServices,
    student_id: StudentId,
    course_id: CourseId,
) -> Result<(), Box<dyn std::error::Error>> {
    let overview = services
        .progression()
        .course_progress(student_id, course_id)
        .await?;

    println!();
    for chapter in &overview.chapters {
        let status = match chapter.status {
            ChapterStatus::Passed(score) => format!("passed ({score})"),
            ChapterStatus::Failed(score) => format!("failed ({score}), retake available"),
            ChapterStatus::NotAttempted if chapter.unlocked => "available".to_string(),
            ChapterStatus::NotAttempted => "locked".to_string(),
        };
        println!("  [{}] {}: {}", chapter.chapter_id, chapter.title, status);
    }
    println!(
        "Progress: {}% ({} of {} chapters passed)",
        overview.completion_percent,
        overview.passed_chapters,
        overview.chapters.len()
    );
    if let Some(score) = overview.certificate_score {
        println!("Certificate earned. Average score: {score}");
    }
    Ok(())
}

fn parse_command(line: &str, current: Option<&SessionQuestion>) -> Option<ExamCommand> {
    let line = line.trim().to_ascii_lowercase();
    match line.as_str() {
        "s" | "submit" => return Some(ExamCommand::Submit),
        "n" | "next" => return Some(ExamCommand::Advance),
        "f" | "finish" => return Some(ExamCommand::Finish),
        _ => {}
    }
    if let Some(rest) = line.strip_prefix("g ") {
        let position: usize = rest.trim().parse().ok()?;
        return Some(ExamCommand::JumpTo(position.checked_sub(1)?));
    }

    let question = current?;
    let mut chars = line.chars();
    let (Some(letter), None) = (chars.next(), chars.next()) else {
        return None;
    };
    let option_index = LABELS
        .iter()
        .position(|label| label.eq_ignore_ascii_case(&letter))?;
    Some(ExamCommand::Select {
        question_id: question.id(),
        option_index,
    })
}

fn print_question(index: usize, total: usize, question: &SessionQuestion) {
    println!();
    println!("Question {} of {} [{}]", index + 1, total, question.difficulty());
    println!("{}", question.text());
    for (label, option) in LABELS.iter().zip(question.options()) {
        println!("  {label}) {option}");
    }
}

fn print_feedback(feedback: &Feedback, question: Option<&SessionQuestion>) {
    if feedback.is_correct {
        println!("Correct.");
    } else {
        let answer = question.map_or("", |q| q.correct_option());
        println!("Incorrect. The answer is {}) {answer}", LABELS[feedback.correct_index]);
    }
    for (label, mark) in LABELS.iter().zip(&feedback.marks) {
        match mark {
            OptionMark::Correct => println!("  {label} ✓"),
            OptionMark::ChosenIncorrect => println!("  {label} ✗"),
            OptionMark::Neutral => {}
        }
    }
    if let Some(explanation) = &feedback.explanation {
        println!("  {explanation}");
    }
}

fn print_result(result: &ExamResult) {
    println!();
    println!(
        "Exam {}: {} ({} of {} correct), {}",
        result.finish_reason,
        result.score,
        result.correct,
        result.total,
        if result.passed { "passed" } else { "not passed" }
    );
}
