//! Configuration and CLI argument handling

use std::time::Duration;
use clap::Parser;

use crate::state::LevelCalibration;

/// CLI argument parsing structure
#[derive(Debug, Parser)]
#[command(name = "pocket-tools")]
#[command(about = "A state-managed HTTP server for a countdown timer, flashlight and bubble level")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, env = "PORT", default_value = "8000")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Milliseconds between countdown ticks
    #[arg(long, default_value = "1000", value_parser = clap::value_parser!(u64).range(1..))]
    pub tick_ms: u64,

    /// Tilt angle in degrees that pushes the bubble to the edge of the vial
    #[arg(long, default_value = "45", value_parser = parse_positive_finite)]
    pub max_tilt: f64,

    /// Bubble travel from centre to edge, in pixels
    #[arg(long, default_value = "100", value_parser = parse_positive_finite)]
    pub level_radius: f64,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Accept only finite numbers greater than zero
fn parse_positive_finite(value: &str) -> Result<f64, String> {
    let parsed: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("`{}` is not a number", value))?;
    if parsed.is_finite() && parsed > 0.0 {
        Ok(parsed)
    } else {
        Err(format!("`{}` must be a finite number greater than zero", value))
    }
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn level_calibration(&self) -> LevelCalibration {
        LevelCalibration::new(self.max_tilt, self.level_radius)
    }
}
