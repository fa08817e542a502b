//! Pocket Tools - A state-managed HTTP server for small handheld utilities
//!
//! This library provides a self-correcting countdown timer together with a
//! flashlight toggle and a bubble level fed by tilt readings.

pub mod api;
pub mod config;
pub mod error;
pub mod state;
pub mod tasks;
pub mod timer;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use error::PocketError;
pub use state::AppState;
pub use timer::Countdown;
pub use utils::signals::shutdown_signal;
