use std::env;
use std::future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use exam_core::exam::{
    AdvanceOutcome, Feedback, FinishReason, SessionQuestion, TimerTick, TransitionError,
};
use exam_core::model::QuestionId;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior, Sleep};

use super::attempt::ExamAttempt;
use super::finalize::{ExamResult, Finalized};
use super::service::ExamService;
use crate::error::ExamError;

/// How long graded feedback stays on screen before the runner advances.
pub const DEFAULT_FEEDBACK_DELAY: Duration = Duration::from_millis(3500);

const TICK: Duration = Duration::from_secs(1);

/// Student input for a running exam.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExamCommand {
    Select {
        question_id: QuestionId,
        option_index: usize,
    },
    Submit,
    /// Skip the remaining feedback delay.
    Advance,
    JumpTo(usize),
    Finish,
}

/// Output of a running exam, in the order things happen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExamEvent {
    Presented {
        index: usize,
        question: SessionQuestion,
    },
    Tick {
        remaining_secs: u32,
        running_low: bool,
    },
    Graded(Feedback),
    Rejected(TransitionError),
    Finished(ExamResult),
}

/// A finished run: the result the student saw, and the background task delivering
/// the remote report.
#[derive(Debug)]
pub struct CompletedExam {
    pub result: ExamResult,
    pub report: JoinHandle<()>,
}

/// Drives an `ExamAttempt` on the tokio clock: one timer tick per second, and an
/// automatic advance once feedback has been shown for `feedback_delay`.
#[derive(Clone)]
pub struct ExamRunner {
    service: Arc<ExamService>,
    feedback_delay: Duration,
}

impl ExamRunner {
    #[must_use]
    pub fn new(service: Arc<ExamService>) -> Self {
        Self {
            service,
            feedback_delay: DEFAULT_FEEDBACK_DELAY,
        }
    }

    #[must_use]
    pub fn with_feedback_delay(mut self, feedback_delay: Duration) -> Self {
        self.feedback_delay = feedback_delay;
        self
    }

    /// Reads `LMS_FEEDBACK_DELAY_MS`, falling back to `DEFAULT_FEEDBACK_DELAY`.
    #[must_use]
    pub fn feedback_delay_from_env() -> Duration {
        env::var("LMS_FEEDBACK_DELAY_MS")
            .ok()
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .map_or(DEFAULT_FEEDBACK_DELAY, Duration::from_millis)
    }

    #[must_use]
    pub fn feedback_delay(&self) -> Duration {
        self.feedback_delay
    }

    /// Run the attempt until it is finished, then finalize it and hand the report to
    /// a background task.
    ///
    /// Returns as soon as the score is stored and `Finished` is emitted; the report
    /// never holds the run open. Returns `Ok(None)` if the command channel closes
    /// first; an abandoned attempt records nothing.
    ///
    /// # Errors
    ///
    /// Returns `ExamError` if finalize fails to store the score.
    pub async fn run(
        &self,
        mut attempt: ExamAttempt,
        mut commands: mpsc::Receiver<ExamCommand>,
        events: mpsc::Sender<ExamEvent>,
    ) -> Result<Option<CompletedExam>, ExamError> {
        let mut ticker = time::interval_at(Instant::now() + TICK, TICK);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut pending_advance: Option<Pin<Box<Sleep>>> = None;

        emit(&events, presented(&attempt)).await;

        let reason = loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match attempt.tick() {
                        TimerTick::Running { remaining_secs } => {
                            let running_low = attempt.session().timer().is_running_low();
                            emit(&events, ExamEvent::Tick { remaining_secs, running_low }).await;
                        }
                        TimerTick::Expired => break FinishReason::TimedOut,
                        TimerTick::Stopped => {
                            break attempt
                                .session()
                                .finish_reason()
                                .unwrap_or(FinishReason::Manual);
                        }
                    }
                }
                () = wait_for(&mut pending_advance) => {
                    pending_advance = None;
                    if let Some(reason) = advance(&mut attempt, &events, false).await {
                        break reason;
                    }
                }
                command = commands.recv() => {
                    let Some(command) = command else {
                        tracing::info!(
                            student_id = %attempt.student().id(),
                            chapter_id = %attempt.chapter_id(),
                            "exam abandoned"
                        );
                        return Ok(None);
                    };
                    match command {
                        ExamCommand::Select { question_id, option_index } => {
                            if let Err(err) = attempt.select_option(question_id, option_index) {
                                emit(&events, ExamEvent::Rejected(err)).await;
                            }
                        }
                        ExamCommand::Submit => match attempt.submit_current() {
                            Ok(feedback) => {
                                emit(&events, ExamEvent::Graded(feedback)).await;
                                pending_advance = Some(Box::pin(time::sleep(self.feedback_delay)));
                            }
                            Err(err) => emit(&events, ExamEvent::Rejected(err)).await,
                        },
                        ExamCommand::Advance => {
                            pending_advance = None;
                            if let Some(reason) = advance(&mut attempt, &events, true).await {
                                break reason;
                            }
                        }
                        ExamCommand::JumpTo(index) => match attempt.jump_to(index) {
                            Ok(()) => {
                                pending_advance = None;
                                emit(&events, presented(&attempt)).await;
                            }
                            Err(err) => emit(&events, ExamEvent::Rejected(err)).await,
                        },
                        ExamCommand::Finish => break FinishReason::Manual,
                    }
                }
            }
        };

        let Some(Finalized { result, report }) = self.service.finalize(&mut attempt, reason).await?
        else {
            return Ok(None);
        };
        emit(&events, ExamEvent::Finished(result)).await;
        Ok(Some(CompletedExam {
            result,
            report: report.spawn(),
        }))
    }
}

fn presented(attempt: &ExamAttempt) -> ExamEvent {
    ExamEvent::Presented {
        index: attempt.session().current_index(),
        question: attempt.current_question().clone(),
    }
}

/// Returns the finish reason when advancing completed the exam.
async fn advance(
    attempt: &mut ExamAttempt,
    events: &mpsc::Sender<ExamEvent>,
    requested: bool,
) -> Option<FinishReason> {
    match attempt.advance() {
        Ok(AdvanceOutcome::Moved(_)) => {
            emit(events, presented(attempt)).await;
            None
        }
        Ok(AdvanceOutcome::Completed) => Some(FinishReason::Completed),
        Err(err) if requested => {
            emit(events, ExamEvent::Rejected(err)).await;
            None
        }
        Err(err) => {
            tracing::debug!(error = %err, "scheduled advance skipped");
            None
        }
    }
}

async fn wait_for(sleep: &mut Option<Pin<Box<Sleep>>>) {
    match sleep {
        Some(sleep) => sleep.as_mut().await,
        None => future::pending().await,
    }
}

async fn emit(events: &mpsc::Sender<ExamEvent>, event: ExamEvent) {
    if events.send(event).await.is_err() {
        tracing::debug!("exam event receiver dropped");
    }
}
