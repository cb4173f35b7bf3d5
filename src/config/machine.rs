//! Machine configuration - root configuration structure.

use heapless::String;
use serde::Deserialize;

use super::axis::AxisConfig;
use super::limits::{LimitPolicy, StepLimits};
use super::units::{Microsteps, Steps, StepsPerSec};

/// Root configuration structure from TOML.
///
/// The rotation axis is the engine's x axis, the pen arm its y axis.
#[derive(Debug, Clone, Deserialize)]
pub struct MachineConfig {
    /// Object rotation axis (wraps).
    #[serde(default = "default_rotation")]
    pub rotation: AxisConfig,

    /// Pen arm axis (limited travel).
    #[serde(default = "default_pen_arm")]
    pub pen_arm: AxisConfig,

    /// Feedrates and timing.
    #[serde(default)]
    pub motion: MotionConfig,

    /// Pen servo.
    #[serde(default)]
    pub pen: PenConfig,
}

/// Feedrate and timing configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Feedrate used until a block sets `F`.
    #[serde(rename = "default_feedrate_steps_per_sec")]
    pub default_feedrate: StepsPerSec,

    /// Speed ceiling of the hardware; faster requests are clamped.
    #[serde(rename = "max_feedrate_steps_per_sec")]
    pub max_feedrate: StepsPerSec,

    /// Fixed feedrate that overrides every `F` word when set.
    #[serde(rename = "preset_feedrate_steps_per_sec")]
    pub preset_feedrate: Option<StepsPerSec>,

    /// Measured cost of one step-loop iteration without delay.
    pub step_overhead_us: u32,

    /// Scale from G-code units to steps.
    pub zoom_factor: f32,

    /// Skip blocks starting with `/`.
    pub block_delete: bool,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            default_feedrate: StepsPerSec(400.0),
            // Adafruit Motor Shield v2: a no-delay loop takes 1.29 ms per step.
            max_feedrate: StepsPerSec(775.0),
            preset_feedrate: None,
            step_overhead_us: 1290,
            zoom_factor: 1.0,
            block_delete: true,
        }
    }
}

/// Which G-code words move the pen servo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PenControl {
    /// `M300 S<pos>` moves the pen, `Z` words are ignored.
    #[default]
    #[serde(rename = "m")]
    M300,
    /// The `Z` word of `G0`/`G1` moves the pen, `M300` is ignored.
    #[serde(rename = "z")]
    ZWord,
}

/// Pen servo configuration, positions in servo degrees.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PenConfig {
    /// Lowest servo position a command may reach.
    pub min_position: u8,
    /// Highest servo position a command may reach.
    pub max_position: u8,
    /// Pen lifted.
    pub up_position: u8,
    /// Pen on the surface.
    pub down_position: u8,
    /// Servo mounted mirrored.
    pub reverse: bool,
    /// Which words drive the pen.
    pub control: PenControl,
    /// Pen speed until `M300 F` sets one.
    #[serde(rename = "feedrate_deg_per_sec")]
    pub feedrate: f32,
    /// Fixed pen speed that overrides every `F` on `M300` when set.
    #[serde(rename = "preset_feedrate_deg_per_sec")]
    pub preset_feedrate: Option<f32>,
}

impl Default for PenConfig {
    fn default() -> Self {
        Self {
            min_position: 100,
            max_position: 160,
            up_position: 145,
            down_position: 115,
            reverse: true,
            control: PenControl::M300,
            feedrate: 200.0,
            preset_feedrate: None,
        }
    }
}

impl PenConfig {
    /// Clamp a requested position into `[min_position, max_position]`.
    pub fn clamp(&self, position: f64) -> u8 {
        if position.is_nan() || position < self.min_position as f64 {
            self.min_position
        } else if position > self.max_position as f64 {
            self.max_position
        } else {
            position as u8
        }
    }
}

fn default_rotation() -> AxisConfig {
    AxisConfig {
        name: String::try_from("rotation").unwrap_or_default(),
        steps_per_revolution: 200,
        microsteps: Microsteps::SIXTEENTH,
        invert_direction: false,
        limits: None,
        wraps: true,
    }
}

fn default_pen_arm() -> AxisConfig {
    AxisConfig {
        name: String::try_from("pen_arm").unwrap_or_default(),
        steps_per_revolution: 200,
        microsteps: Microsteps::SIXTEENTH,
        invert_direction: false,
        // Most drawings are 800 steps tall, leave some margin.
        limits: Some(StepLimits::new(Steps(-480), Steps(480), LimitPolicy::Clamp)),
        wraps: false,
    }
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            rotation: default_rotation(),
            pen_arm: default_pen_arm(),
            motion: MotionConfig::default(),
            pen: PenConfig::default(),
        }
    }
}
