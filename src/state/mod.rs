//! State management module
//!
//! This module contains the tool states and the shared application state.

pub mod app_state;
pub mod flashlight;
pub mod level;
pub mod notifications;

// Re-export main types
pub use app_state::{AppState, StartResult};
pub use flashlight::{Flashlight, FlashlightState};
pub use level::{BubbleLevel, BubbleOffset, LevelCalibration, LevelSnapshot, TiltReading};
pub use notifications::{Notification, NotificationFeed, NotificationKind};
