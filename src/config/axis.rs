//! Axis configuration from TOML.

use heapless::String;
use serde::Deserialize;

use super::limits::StepLimits;
use super::units::Microsteps;

/// Configuration of one stepper axis.
#[derive(Debug, Clone, Deserialize)]
pub struct AxisConfig {
    /// Human-readable name (max 32 chars).
    pub name: String<32>,

    /// Base steps per revolution (typically 200 for 1.8° motors).
    pub steps_per_revolution: u16,

    /// Microstep setting (1, 2, 4, 8, 16, 32, etc.).
    #[serde(default = "default_microsteps")]
    pub microsteps: Microsteps,

    /// Invert direction pin logic.
    #[serde(default)]
    pub invert_direction: bool,

    /// Optional travel limits.
    #[serde(default)]
    pub limits: Option<StepLimits>,

    /// Axis has no fixed origin and may take the shorter way around.
    #[serde(default)]
    pub wraps: bool,
}

fn default_microsteps() -> Microsteps {
    Microsteps::SIXTEENTH
}

impl AxisConfig {
    /// Calculate total steps per output shaft revolution.
    pub fn total_steps_per_revolution(&self) -> u32 {
        self.steps_per_revolution as u32 * self.microsteps.value() as u32
    }
}
