//! Flashlight toggle state

use std::sync::Mutex;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{PocketError, Result};

/// Serializable torch state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashlightState {
    pub on: bool,
}

/// Torch switch, off until toggled
#[derive(Debug, Default)]
pub struct Flashlight {
    state: Mutex<FlashlightState>,
}

impl Flashlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the torch and return the new state
    pub fn toggle(&self) -> Result<FlashlightState> {
        let mut state = self.state.lock().map_err(|_| PocketError::lock("flashlight state"))?;
        state.on = !state.on;
        info!("Flashlight turned {}", if state.on { "on" } else { "off" });
        Ok(*state)
    }

    pub fn set(&self, on: bool) -> Result<FlashlightState> {
        let mut state = self.state.lock().map_err(|_| PocketError::lock("flashlight state"))?;
        if state.on != on {
            info!("Flashlight turned {}", if on { "on" } else { "off" });
        }
        state.on = on;
        Ok(*state)
    }

    pub fn get(&self) -> Result<FlashlightState> {
        self.state
            .lock()
            .map(|state| *state)
            .map_err(|_| PocketError::lock("flashlight state"))
    }

    pub fn is_on(&self) -> bool {
        self.get().map(|state| state.on).unwrap_or(false)
    }
}
