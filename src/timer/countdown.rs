//! Countdown timer driven by self-rescheduling ticks
//!
//! Each tick recomputes the remaining time from the session's start instant
//! rather than decrementing a counter, so a late tick collapses the missed
//! seconds instead of drifting. A tick that still has time left spawns
//! exactly one follow-up tick one interval later. Ticks carry the id of the
//! session that scheduled them and do nothing once that session is no longer
//! the active one.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};
use chrono::{DateTime, Utc};
use tokio::{
    sync::{broadcast, watch},
    time::{sleep, Instant},
};
use tracing::{debug, error, info, warn};

use crate::error::{PocketError, Result};
use super::session::{TimerSession, TimerSnapshot};

/// Default spacing between ticks
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Emitted once when a session reaches zero
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpiryEvent {
    pub session_id: u64,
    pub total_seconds: u64,
    pub expired_at: DateTime<Utc>,
}

/// Result of processing one tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// No matching active session; nothing happened
    Inactive,
    /// Time remains; the next tick should be scheduled
    Running { remaining_seconds: u64, display: String },
    /// Remaining time hit zero on this tick
    Expired,
}

#[derive(Debug, Default)]
struct Slot {
    next_id: u64,
    session: Option<TimerSession>,
}

/// Owner of the single countdown session
#[derive(Debug)]
pub struct Countdown {
    slot: Mutex<Slot>,
    tick_interval: Duration,
    snapshot_tx: watch::Sender<TimerSnapshot>,
    expired_tx: broadcast::Sender<ExpiryEvent>,
}

impl Countdown {
    pub fn new(tick_interval: Duration) -> Self {
        let (snapshot_tx, _) = watch::channel(TimerSnapshot::idle());
        let (expired_tx, _) = broadcast::channel(16);

        Self {
            slot: Mutex::new(Slot::default()),
            tick_interval,
            snapshot_tx,
            expired_tx,
        }
    }

    /// Start a new session of `total_seconds`.
    ///
    /// Non-positive durations are ignored and return `None` without touching
    /// the current session. A running session is cancelled and replaced.
    pub fn start(self: &Arc<Self>, total_seconds: i64) -> Result<Option<TimerSnapshot>> {
        let total_seconds = match u64::try_from(total_seconds) {
            Ok(secs) if secs > 0 => secs,
            _ => {
                debug!("Ignoring countdown start with non-positive duration {}", total_seconds);
                return Ok(None);
            }
        };

        // Publish under the session lock so a stale tick cannot overwrite it
        let (id, snapshot) = {
            let mut slot = self.slot.lock().map_err(|_| PocketError::lock("countdown session"))?;
            if let Some(previous) = slot.session.as_mut().filter(|s| s.active) {
                info!("Replacing running countdown session {}", previous.id);
                previous.active = false;
            }
            slot.next_id += 1;
            let id = slot.next_id;
            let session = TimerSession::new(id, total_seconds, Instant::now());
            let snapshot = session.snapshot();
            slot.session = Some(session);
            self.snapshot_tx.send_replace(snapshot.clone());
            (id, snapshot)
        };

        info!("Countdown session {} started for {}s", id, total_seconds);

        self.schedule_tick(id);
        Ok(Some(snapshot))
    }

    /// Cancel the current session. Safe to call in any state.
    pub fn cancel(&self) -> Result<TimerSnapshot> {
        let mut slot = self.slot.lock().map_err(|_| PocketError::lock("countdown session"))?;
        match slot.session.as_mut() {
            Some(session) if session.active => {
                session.active = false;
                info!("Countdown session {} cancelled at {}s remaining",
                      session.id, session.remaining_seconds);
                let snapshot = session.snapshot();
                self.snapshot_tx.send_replace(snapshot.clone());
                Ok(snapshot)
            }
            _ => {
                debug!("Cancel requested with no running countdown");
                Ok(self.snapshot())
            }
        }
    }

    /// Process one tick for session `id` at the current instant
    pub fn tick(&self, id: u64) -> Result<TickOutcome> {
        self.tick_at(id, Instant::now())
    }

    /// Process one tick for session `id` as if the clock read `now`
    pub fn tick_at(&self, id: u64, now: Instant) -> Result<TickOutcome> {
        let (outcome, expiry) = {
            let mut slot = self.slot.lock().map_err(|_| PocketError::lock("countdown session"))?;
            let session = match slot.session.as_mut() {
                Some(session) if session.id == id && session.active => session,
                _ => {
                    debug!("Tick for session {} ignored, no longer active", id);
                    return Ok(TickOutcome::Inactive);
                }
            };

            session.ticks += 1;
            session.remaining_seconds = session.remaining_at(now);
            let snapshot = session.snapshot();

            // Sends happen under the lock so a concurrent cancel or restart
            // always publishes last
            if session.remaining_seconds == 0 {
                session.active = false;
                let expiry = ExpiryEvent {
                    session_id: session.id,
                    total_seconds: session.total_seconds,
                    expired_at: Utc::now(),
                };
                let snapshot = session.snapshot();
                debug!("Countdown session {} tick {}: {}", id, snapshot.ticks, snapshot.display);
                self.snapshot_tx.send_replace(snapshot);
                (TickOutcome::Expired, Some(expiry))
            } else {
                debug!("Countdown session {} tick {}: {}", id, snapshot.ticks, snapshot.display);
                let outcome = TickOutcome::Running {
                    remaining_seconds: snapshot.remaining_seconds,
                    display: snapshot.display.clone(),
                };
                self.snapshot_tx.send_replace(snapshot);
                (outcome, None)
            }
        };

        if let Some(expiry) = expiry {
            info!("Countdown session {} expired after {}s", expiry.session_id, expiry.total_seconds);
            if let Err(e) = self.expired_tx.send(expiry) {
                warn!("No listeners for countdown expiry: {}", e);
            }
        }

        Ok(outcome)
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> TimerSnapshot {
        self.snapshot_tx.borrow().clone()
    }

    /// Receiver for every published snapshot
    pub fn watch(&self) -> watch::Receiver<TimerSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Receiver for expiry events
    pub fn subscribe_expired(&self) -> broadcast::Receiver<ExpiryEvent> {
        self.expired_tx.subscribe()
    }

    fn schedule_tick(self: &Arc<Self>, id: u64) {
        let countdown = Arc::clone(self);
        tokio::spawn(async move {
            sleep(countdown.tick_interval).await;
            match countdown.tick(id) {
                Ok(TickOutcome::Running { .. }) => countdown.schedule_tick(id),
                Ok(_) => {}
                Err(e) => error!("Countdown tick failed: {}", e),
            }
        });
    }
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new(TICK_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::TimerPhase;
    use tokio::sync::broadcast::error::TryRecvError;

    fn countdown() -> Arc<Countdown> {
        Arc::new(Countdown::default())
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_positive_start_is_ignored() {
        let countdown = countdown();

        assert_eq!(countdown.start(0).unwrap(), None);
        assert_eq!(countdown.start(-5).unwrap(), None);
        assert_eq!(countdown.snapshot().phase, TimerPhase::Idle);

        // Ticking without a session has no effect
        assert_eq!(countdown.tick(1).unwrap(), TickOutcome::Inactive);
        assert_eq!(countdown.snapshot(), TimerSnapshot::idle());
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_renders_full_duration() {
        let countdown = countdown();
        let snapshot = countdown.start(65).unwrap().unwrap();

        assert_eq!(snapshot.phase, TimerPhase::Running);
        assert_eq!(snapshot.display, "01:05");
        assert_eq!(snapshot.ticks, 0);
        assert_eq!(countdown.snapshot(), snapshot);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expires_once_on_final_tick() {
        let countdown = countdown();
        let mut expired = countdown.subscribe_expired();
        let mut display = countdown.watch();
        let started = Instant::now();

        countdown.start(300).unwrap();

        let mut previous = 300;
        loop {
            display.changed().await.unwrap();
            let snapshot = display.borrow_and_update().clone();
            assert!(snapshot.remaining_seconds <= previous);
            previous = snapshot.remaining_seconds;
            if snapshot.phase == TimerPhase::Expired {
                assert_eq!(snapshot.display, "00:00");
                assert_eq!(snapshot.ticks, 300);
                break;
            }
        }

        let event = expired.recv().await.unwrap();
        assert_eq!(event.total_seconds, 300);
        assert_eq!(started.elapsed(), Duration::from_secs(300));

        // Nothing further is scheduled or signalled
        sleep(Duration::from_secs(30)).await;
        assert!(matches!(expired.try_recv(), Err(TryRecvError::Empty)));
        assert_eq!(countdown.snapshot().ticks, 300);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_after_first_tick_stops_countdown() {
        let countdown = countdown();
        let mut expired = countdown.subscribe_expired();
        let mut display = countdown.watch();

        countdown.start(65).unwrap();
        display.borrow_and_update();
        display.changed().await.unwrap();
        assert_eq!(display.borrow_and_update().display, "01:04");

        let cancelled = countdown.cancel().unwrap();
        assert_eq!(cancelled.phase, TimerPhase::Cancelled);
        assert_eq!(cancelled.ticks, 1);

        sleep(Duration::from_secs(120)).await;
        assert!(matches!(expired.try_recv(), Err(TryRecvError::Empty)));
        assert_eq!(countdown.snapshot().ticks, 1);
        assert_eq!(countdown.snapshot().display, "01:04");
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_is_idempotent() {
        let countdown = countdown();

        // Never started
        assert_eq!(countdown.cancel().unwrap().phase, TimerPhase::Idle);

        countdown.start(10).unwrap();
        let first = countdown.cancel().unwrap();
        let second = countdown.cancel().unwrap();
        assert_eq!(first, second);
        assert_eq!(second.phase, TimerPhase::Cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_tick_collapses_missed_seconds() {
        let countdown = countdown();
        let snapshot = countdown.start(10).unwrap().unwrap();
        let id = snapshot.session_id.unwrap();
        let start = Instant::now();

        let outcome = countdown.tick_at(id, start + Duration::from_millis(4200)).unwrap();
        assert_eq!(outcome, TickOutcome::Running {
            remaining_seconds: 6,
            display: "00:06".to_string(),
        });

        let outcome = countdown.tick_at(id, start + Duration::from_secs(25)).unwrap();
        assert_eq!(outcome, TickOutcome::Expired);
        assert_eq!(countdown.tick_at(id, start + Duration::from_secs(26)).unwrap(), TickOutcome::Inactive);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_racing_tick_publishes_last() {
        let countdown = countdown();

        for _ in 0..2000 {
            let id = countdown.start(100).unwrap().unwrap().session_id.unwrap();
            let at = Instant::now() + TICK_INTERVAL;
            std::thread::scope(|s| {
                s.spawn(|| countdown.tick_at(id, at).unwrap());
                s.spawn(|| countdown.cancel().unwrap());
            });

            let snapshot = countdown.snapshot();
            assert_eq!(snapshot.phase, TimerPhase::Cancelled);
            assert_eq!(snapshot.session_id, Some(id));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_racing_stale_tick_publishes_new_session() {
        let countdown = countdown();
        let runtime = tokio::runtime::Handle::current();

        for _ in 0..2000 {
            let stale = countdown.start(100).unwrap().unwrap().session_id.unwrap();
            let at = Instant::now() + TICK_INTERVAL;
            std::thread::scope(|s| {
                s.spawn(|| countdown.tick_at(stale, at).unwrap());
                s.spawn(|| {
                    let _guard = runtime.enter();
                    countdown.start(50).unwrap()
                });
            });

            let snapshot = countdown.snapshot();
            assert_eq!(snapshot.session_id, Some(stale + 1));
            assert_eq!(snapshot.total_seconds, 50);
            assert_eq!(snapshot.phase, TimerPhase::Running);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_ignores_stale_ticks() {
        let countdown = countdown();
        let first = countdown.start(5).unwrap().unwrap().session_id.unwrap();
        let second = countdown.start(20).unwrap().unwrap().session_id.unwrap();
        assert_ne!(first, second);

        assert_eq!(countdown.tick(first).unwrap(), TickOutcome::Inactive);

        sleep(Duration::from_millis(6500)).await;
        let snapshot = countdown.snapshot();
        assert_eq!(snapshot.session_id, Some(second));
        assert_eq!(snapshot.phase, TimerPhase::Running);
        assert_eq!(snapshot.remaining_seconds, 14);
    }
}
