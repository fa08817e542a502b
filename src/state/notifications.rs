//! Notification feed for one-shot user alerts

use std::{collections::VecDeque, sync::Mutex};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{PocketError, Result};

/// Most recent notifications kept in the feed
pub const FEED_CAPACITY: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    TimerExpired,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl Notification {
    pub fn timer_expired(timestamp: DateTime<Utc>) -> Self {
        Self {
            kind: NotificationKind::TimerExpired,
            message: "Time's up!".to_string(),
            timestamp,
        }
    }
}

/// Bounded, oldest-first notification list
#[derive(Debug)]
pub struct NotificationFeed {
    entries: Mutex<VecDeque<Notification>>,
    capacity: usize,
}

impl NotificationFeed {
    /// Create a feed keeping at most `capacity` entries (at least one)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    pub fn push(&self, notification: Notification) -> Result<()> {
        let mut entries = self.entries.lock().map_err(|_| PocketError::lock("notification feed"))?;
        info!("Notification: {}", notification.message);
        while entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(notification);
        Ok(())
    }

    pub fn list(&self) -> Result<Vec<Notification>> {
        self.entries
            .lock()
            .map(|entries| entries.iter().cloned().collect())
            .map_err(|_| PocketError::lock("notification feed"))
    }
}

impl Default for NotificationFeed {
    fn default() -> Self {
        Self::new(FEED_CAPACITY)
    }
}
