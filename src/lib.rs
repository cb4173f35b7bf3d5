//! # spherebot-motion
//!
//! Coordinated two-axis stepper motion for sphere and egg plotters, with
//! embedded-hal 1.0 support.
//!
//! ## Features
//!
//! - **Straight lines**: Bresenham rasterization after an octant transform
//! - **Constant speed**: One inter-step delay per move, clamped to a ceiling
//! - **Wrap-around**: The rotation axis takes the shorter way round
//! - **G-code**: Line buffering, comment stripping and a small command set
//! - **Settings**: Typed little-endian records in EEPROM-like memory
//! - **no_std compatible**: Core library works without standard library
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use spherebot_motion::{step_dir_axis, MachineConfig, Plotter, ServoPen};
//!
//! // Load configuration from TOML
//! let config: MachineConfig = spherebot_motion::load_config("spherebot.toml")?;
//!
//! // One axis per stepper driver
//! let rotation = step_dir_axis(&config.rotation, step_x, dir_x, pulse_delay_x)?;
//! let pen_arm = step_dir_axis(&config.pen_arm, step_y, dir_y, pulse_delay_y)?;
//! let pen = ServoPen::from_config(pwm, &config.pen);
//!
//! let mut plotter = Plotter::new(rotation, pen_arm, delay, pen, config)?;
//!
//! // Feed G-code as it arrives
//! for byte in serial.bytes() {
//!     plotter.feed(byte?)?;
//! }
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): Enables file I/O and TOML parsing
//! - `defmt`: Enables defmt logging for embedded targets

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]
// Allow large error types - necessary for no_std with heapless strings
#![allow(clippy::result_large_err)]

// Logging macros, must come first
#[macro_use]
mod fmt;

// Core modules
pub mod axis;
pub mod config;
pub mod error;
pub mod gcode;
pub mod motion;
pub mod pen;
pub mod plotter;
pub mod storage;

// Re-exports for ergonomic API
pub use axis::{step_dir_axis, Actuator, Axis, AxisBuilder, AxisDriver, Direction};
pub use config::{validate_config, EngineConfig, MachineConfig};
pub use error::{Error, Result};
pub use gcode::{Block, Command, LineBuffer};
pub use motion::{LinePlan, MotionEngine, MoveReport, Octant};
pub use pen::{Pen, ServoPen};
pub use plotter::Plotter;
pub use storage::{ByteStore, Record, StoredSettings, TypedStore};

// Configuration loading (std only)
#[cfg(feature = "std")]
pub use config::{load_config, parse_config};

// Unit types
pub use config::units::{Microsteps, Steps, StepsPerSec};
