//! Configuration module for spherebot-motion.
//!
//! Provides types for loading and validating machine configuration from TOML
//! files (with `std` feature) or from compiled-in defaults.

mod axis;
mod limits;
mod machine;
mod mechanical;
pub mod units;
#[cfg(feature = "std")]
mod loader;
mod validation;

pub use axis::AxisConfig;
pub use limits::{LimitPolicy, StepLimits};
pub use machine::{MachineConfig, MotionConfig, PenConfig, PenControl};
pub use mechanical::EngineConfig;
pub use validation::validate_config;

#[cfg(feature = "std")]
pub use loader::{load_config, parse_config};

// Re-export unit types at config level
pub use units::{Microsteps, Steps, StepsPerSec};
