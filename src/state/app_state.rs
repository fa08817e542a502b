//! Main application state management

use std::{
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};
use chrono::{DateTime, Utc};
use tracing::info;

use crate::{
    error::{PocketError, Result},
    timer::{Countdown, DurationInput, TimerSnapshot},
};
use super::{BubbleLevel, Flashlight, FlashlightState, LevelCalibration, LevelSnapshot,
            NotificationFeed, TiltReading};

/// Application state shared by the HTTP handlers and background tasks
#[derive(Debug)]
pub struct AppState {
    /// The single countdown session owner
    pub countdown: Arc<Countdown>,
    pub flashlight: Flashlight,
    pub level: BubbleLevel,
    /// Expiry alerts shown to the user
    pub notifications: NotificationFeed,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Mutex<Option<(String, DateTime<Utc>)>>,
}

/// Outcome of a start request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartResult {
    Started(TimerSnapshot),
    Ignored { reason: String, current: TimerSnapshot },
}

impl AppState {
    pub fn new(
        port: u16,
        host: String,
        tick_interval: Duration,
        calibration: LevelCalibration,
    ) -> Self {
        Self {
            countdown: Arc::new(Countdown::new(tick_interval)),
            flashlight: Flashlight::new(),
            level: BubbleLevel::new(calibration),
            notifications: NotificationFeed::default(),
            start_time: Instant::now(),
            port,
            host,
            last_action: Mutex::new(None),
        }
    }

    /// Validate the user's input and start the countdown.
    ///
    /// Invalid input leaves the current session untouched.
    pub fn start_timer(&self, input: &DurationInput) -> Result<StartResult> {
        let total_seconds = match input.total_seconds() {
            Ok(total) => total,
            Err(e @ PocketError::InvalidDuration(_)) => {
                info!("Timer start ignored: {}", e);
                return Ok(StartResult::Ignored {
                    reason: e.to_string(),
                    current: self.countdown.snapshot(),
                });
            }
            Err(e) => return Err(e),
        };

        let total_seconds = i64::try_from(total_seconds)
            .map_err(|_| PocketError::InvalidDuration("duration overflows".to_string()))?;

        match self.countdown.start(total_seconds)? {
            Some(snapshot) => {
                self.record_action("timer-start");
                Ok(StartResult::Started(snapshot))
            }
            None => Ok(StartResult::Ignored {
                reason: "duration must be greater than zero".to_string(),
                current: self.countdown.snapshot(),
            }),
        }
    }

    pub fn cancel_timer(&self) -> Result<TimerSnapshot> {
        let snapshot = self.countdown.cancel()?;
        self.record_action("timer-cancel");
        Ok(snapshot)
    }

    pub fn toggle_flashlight(&self) -> Result<FlashlightState> {
        let state = self.flashlight.toggle()?;
        self.record_action(if state.on { "flashlight-on" } else { "flashlight-off" });
        Ok(state)
    }

    pub fn publish_tilt(&self, reading: TiltReading) -> Result<LevelSnapshot> {
        self.level.publish(reading)
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        match self.last_action.lock().ok().and_then(|a| a.clone()) {
            Some((action, time)) => (Some(action), Some(time)),
            None => (None, None),
        }
    }

    fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some((action.to_string(), Utc::now()));
        }
    }
}
