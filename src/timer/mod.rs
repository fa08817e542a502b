//! Countdown timer
//!
//! Session bookkeeping, display formatting, input parsing and the
//! self-rescheduling tick loop.

pub mod countdown;
pub mod format;
pub mod input;
pub mod session;

// Re-export main types
pub use countdown::{Countdown, ExpiryEvent, TickOutcome, TICK_INTERVAL};
pub use format::format_remaining;
pub use input::{DurationField, DurationInput};
pub use session::{TimerPhase, TimerSession, TimerSnapshot};
