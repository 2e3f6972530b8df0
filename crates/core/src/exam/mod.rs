//! Chapter exam engine: question sampling, option shuffling, the session state
//! machine, its countdown and scoring.

mod answers;
mod sampler;
mod scoring;
mod session;
mod shuffle;
mod timer;

pub use answers::AnswerSheet;
pub use sampler::{draw_session_questions, sample_questions};
pub use scoring::{ExamScore, correct_count, score};
pub use session::{
    AdvanceOutcome, ExamSession, Feedback, FinishReason, OptionMark, SessionPhase,
    SessionProgress, TransitionError,
};
pub use shuffle::{SessionQuestion, shuffle_options};
pub use timer::{ExamTimer, LOW_TIME_WARNING_SECS, TimerTick, format_remaining};
