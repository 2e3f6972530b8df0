use crate::model::ChapterExamMeta;

/// Below this many seconds the remaining time is shown as a warning.
pub const LOW_TIME_WARNING_SECS: u32 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerState {
    Running,
    Expired,
    Cancelled,
}

/// Result of one timer tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerTick {
    Running { remaining_secs: u32 },
    /// Reported exactly once, on the tick that reaches zero.
    Expired,
    /// The timer already expired or was cancelled.
    Stopped,
}

/// One-second countdown for an exam session.
///
/// Runs independently of question progress. Cancelling is idempotent and a stopped
/// timer never reports `Expired` again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamTimer {
    remaining_secs: u32,
    state: TimerState,
}

impl ExamTimer {
    #[must_use]
    pub fn new(limit_secs: u32) -> Self {
        Self {
            remaining_secs: limit_secs,
            state: TimerState::Running,
        }
    }

    #[must_use]
    pub fn for_exam(meta: &ChapterExamMeta) -> Self {
        Self::new(meta.time_limit_secs())
    }

    /// Advances the countdown by one second.
    pub fn tick(&mut self) -> TimerTick {
        if self.state != TimerState::Running {
            return TimerTick::Stopped;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            self.state = TimerState::Expired;
            return TimerTick::Expired;
        }
        TimerTick::Running {
            remaining_secs: self.remaining_secs,
        }
    }

    pub fn cancel(&mut self) {
        if self.state == TimerState::Running {
            self.state = TimerState::Cancelled;
        }
    }

    #[must_use]
    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.state == TimerState::Expired
    }

    #[must_use]
    pub fn is_running_low(&self) -> bool {
        self.remaining_secs < LOW_TIME_WARNING_SECS
    }

    /// Remaining time as `m:ss`.
    #[must_use]
    pub fn display(&self) -> String {
        format_remaining(self.remaining_secs)
    }
}

/// Formats a second count as `m:ss`.
#[must_use]
pub fn format_remaining(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}
