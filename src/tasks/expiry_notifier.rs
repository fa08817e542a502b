//! Countdown expiry notifier background task

use std::sync::Arc;
use tokio::{
    sync::broadcast::{self, error::RecvError},
    task::JoinHandle,
};
use tracing::{debug, error, info, warn};

use crate::{
    state::{AppState, Notification},
    timer::ExpiryEvent,
};

/// Background task that turns countdown expiries into user notifications
pub async fn expiry_notifier_task(state: Arc<AppState>, mut expired_rx: broadcast::Receiver<ExpiryEvent>) {
    info!("Starting expiry notifier task");

    loop {
        match expired_rx.recv().await {
            Ok(event) => {
                debug!("Expiry received for session {}", event.session_id);
                if let Err(e) = state.notifications.push(Notification::timer_expired(event.expired_at)) {
                    error!("Failed to record expiry notification: {}", e);
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!("Expiry notifier lagged, {} events skipped", skipped);
            }
            Err(RecvError::Closed) => {
                info!("Expiry channel closed, stopping notifier");
                break;
            }
        }
    }
}

/// Subscribe to expiries, then spawn the notifier on the subscription
pub fn spawn_expiry_notifier(state: Arc<AppState>) -> JoinHandle<()> {
    let expired_rx = state.countdown.subscribe_expired();
    tokio::spawn(expiry_notifier_task(state, expired_rx))
}
