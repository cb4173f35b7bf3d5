//! Engine constants derived from machine configuration.

use super::machine::MachineConfig;
use super::units::StepsPerSec;

/// Immutable motion engine parameters.
///
/// Computed once at startup and handed to the engine constructor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Initial speed ceiling in steps per second.
    pub max_speed: StepsPerSec,

    /// Steps per revolution of the x axis when it wraps.
    pub x_steps_per_revolution: Option<u32>,

    /// Per-step software overhead subtracted from every inter-step delay.
    pub step_overhead_us: u32,
}

impl EngineConfig {
    /// Derive engine parameters from the machine configuration.
    pub fn from_machine(config: &MachineConfig) -> Self {
        let x_steps_per_revolution = if config.rotation.wraps {
            Some(config.rotation.total_steps_per_revolution())
        } else {
            None
        };

        Self {
            max_speed: config.motion.max_feedrate,
            x_steps_per_revolution,
            step_overhead_us: config.motion.step_overhead_us,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::from_machine(&MachineConfig::default())
    }
}
