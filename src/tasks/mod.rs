//! Background tasks module
//!
//! This module contains background tasks that run alongside the HTTP server.

pub mod expiry_notifier;

// Re-export main functions
pub use expiry_notifier::{expiry_notifier_task, spawn_expiry_notifier};
