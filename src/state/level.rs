//! Bubble level fed by an external tilt sensor
//!
//! Readings arrive as `{x, y}` tilt angles in degrees. Each axis is clamped
//! to the calibrated maximum and mapped linearly onto the bubble radius.

use std::{fmt, sync::Mutex};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{PocketError, Result};

/// Tilt angles reported by the sensor, in degrees
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TiltReading {
    pub x: f64,
    pub y: f64,
}

/// Bubble position relative to the vial centre, in pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BubbleOffset {
    pub x_px: f64,
    pub y_px: f64,
    pub level: bool,
}

/// Mapping parameters from tilt to bubble offset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelCalibration {
    pub max_tilt_degrees: f64,
    pub radius_px: f64,
    pub level_tolerance_degrees: f64,
}

impl LevelCalibration {
    pub fn new(max_tilt_degrees: f64, radius_px: f64) -> Self {
        Self {
            max_tilt_degrees,
            radius_px,
            ..Self::default()
        }
    }

    /// Map a reading onto the bubble. The bubble moves away from the low side.
    pub fn map(&self, reading: TiltReading) -> Result<BubbleOffset> {
        if !reading.x.is_finite() || !reading.y.is_finite() {
            return Err(PocketError::InvalidReading(format!(
                "non-finite tilt ({}, {})", reading.x, reading.y
            )));
        }

        let max = self.max_tilt_degrees.abs().max(f64::EPSILON);
        let axis = |tilt: f64| -(tilt.clamp(-max, max) / max) * self.radius_px;

        Ok(BubbleOffset {
            x_px: axis(reading.x),
            y_px: axis(reading.y),
            level: reading.x.abs() <= self.level_tolerance_degrees
                && reading.y.abs() <= self.level_tolerance_degrees,
        })
    }
}

impl Default for LevelCalibration {
    fn default() -> Self {
        Self {
            max_tilt_degrees: 45.0,
            radius_px: 100.0,
            level_tolerance_degrees: 1.0,
        }
    }
}

/// Latest reading together with its mapped offset
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelSnapshot {
    pub reading: TiltReading,
    pub offset: BubbleOffset,
}

type ReadingCallback = Box<dyn Fn(&LevelSnapshot) + Send + Sync>;

/// Consumer of sensor readings
pub struct BubbleLevel {
    calibration: LevelCalibration,
    latest: Mutex<Option<LevelSnapshot>>,
    callbacks: Mutex<Vec<ReadingCallback>>,
}

impl BubbleLevel {
    pub fn new(calibration: LevelCalibration) -> Self {
        Self {
            calibration,
            latest: Mutex::new(None),
            callbacks: Mutex::new(Vec::new()),
        }
    }

    pub fn calibration(&self) -> LevelCalibration {
        self.calibration
    }

    /// Register a callback invoked for every accepted reading
    pub fn on_reading<F>(&self, callback: F) -> Result<()>
    where
        F: Fn(&LevelSnapshot) + Send + Sync + 'static,
    {
        self.callbacks
            .lock()
            .map_err(|_| PocketError::lock("level callbacks"))?
            .push(Box::new(callback));
        Ok(())
    }

    /// Accept a sensor reading, store it and notify callbacks
    pub fn publish(&self, reading: TiltReading) -> Result<LevelSnapshot> {
        let offset = match self.calibration.map(reading) {
            Ok(offset) => offset,
            Err(e) => {
                warn!("Rejected tilt reading: {}", e);
                return Err(e);
            }
        };
        let snapshot = LevelSnapshot { reading, offset };

        *self.latest.lock().map_err(|_| PocketError::lock("level reading"))? = Some(snapshot);
        debug!("Tilt ({:.1}, {:.1}) -> bubble ({:.1}px, {:.1}px)",
               reading.x, reading.y, offset.x_px, offset.y_px);

        let callbacks = self.callbacks.lock().map_err(|_| PocketError::lock("level callbacks"))?;
        for callback in callbacks.iter() {
            callback(&snapshot);
        }

        Ok(snapshot)
    }

    pub fn latest(&self) -> Result<Option<LevelSnapshot>> {
        self.latest
            .lock()
            .map(|latest| *latest)
            .map_err(|_| PocketError::lock("level reading"))
    }
}

impl Default for BubbleLevel {
    fn default() -> Self {
        Self::new(LevelCalibration::default())
    }
}

impl fmt::Debug for BubbleLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BubbleLevel")
            .field("calibration", &self.calibration)
            .field("latest", &self.latest)
            .finish_non_exhaustive()
    }
}
