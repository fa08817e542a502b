//! Countdown session and its published snapshot

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use super::format::format_remaining;

/// Lifecycle phase of the countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerPhase {
    Idle,
    Running,
    Expired,
    Cancelled,
}

/// One countdown, from start until expiry or cancellation
#[derive(Debug, Clone)]
pub struct TimerSession {
    pub id: u64,
    pub total_seconds: u64,
    pub start_instant: Instant,
    pub active: bool,
    /// Scheduled ticks processed so far; the render at start is tick 0
    pub ticks: u64,
    pub remaining_seconds: u64,
}

impl TimerSession {
    /// Create an active session. Callers guarantee `total_seconds > 0`.
    pub fn new(id: u64, total_seconds: u64, start_instant: Instant) -> Self {
        Self {
            id,
            total_seconds,
            start_instant,
            active: true,
            ticks: 0,
            remaining_seconds: total_seconds,
        }
    }

    /// Whole seconds left at `now`, measured from the start instant
    pub fn remaining_at(&self, now: Instant) -> u64 {
        let elapsed = now.saturating_duration_since(self.start_instant).as_secs();
        self.total_seconds.saturating_sub(elapsed)
    }

    pub fn phase(&self) -> TimerPhase {
        if self.active {
            TimerPhase::Running
        } else if self.remaining_seconds == 0 {
            TimerPhase::Expired
        } else {
            TimerPhase::Cancelled
        }
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            phase: self.phase(),
            session_id: Some(self.id),
            total_seconds: self.total_seconds,
            remaining_seconds: self.remaining_seconds,
            display: format_remaining(self.remaining_seconds),
            ticks: self.ticks,
        }
    }
}

/// Serializable view of the countdown pushed to the display surface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub phase: TimerPhase,
    pub session_id: Option<u64>,
    pub total_seconds: u64,
    pub remaining_seconds: u64,
    pub display: String,
    pub ticks: u64,
}

impl TimerSnapshot {
    /// Snapshot before any session has been started
    pub fn idle() -> Self {
        Self {
            phase: TimerPhase::Idle,
            session_id: None,
            total_seconds: 0,
            remaining_seconds: 0,
            display: format_remaining(0),
            ticks: 0,
        }
    }

    pub fn is_running(&self) -> bool {
        self.phase == TimerPhase::Running
    }
}

impl Default for TimerSnapshot {
    fn default() -> Self {
        Self::idle()
    }
}
