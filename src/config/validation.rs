//! Configuration validation.

use crate::error::{ConfigError, Error, Result};

use super::{AxisConfig, MachineConfig, MotionConfig, PenConfig};

/// Validate a machine configuration.
///
/// Checks:
/// - Both axes have a non-zero step count and sane limits
/// - Feedrates (presets included) and zoom factor are positive
/// - Pen presets lie inside the servo range
pub fn validate_config(config: &MachineConfig) -> Result<()> {
    validate_axis(&config.rotation)?;
    validate_axis(&config.pen_arm)?;
    validate_motion(&config.motion)?;
    validate_pen(&config.pen)?;

    Ok(())
}

fn validate_axis(config: &AxisConfig) -> Result<()> {
    if config.steps_per_revolution == 0 {
        return Err(Error::Config(ConfigError::InvalidStepsPerRevolution(
            config.steps_per_revolution,
        )));
    }

    // Limits: min must be < max
    if let Some(ref limits) = config.limits {
        if !limits.is_valid() {
            return Err(Error::Config(ConfigError::InvalidStepLimits {
                min: limits.min.0,
                max: limits.max.0,
            }));
        }
    }

    Ok(())
}

fn validate_motion(config: &MotionConfig) -> Result<()> {
    let rates = [config.default_feedrate, config.max_feedrate];
    for rate in rates.into_iter().chain(config.preset_feedrate) {
        if !rate.is_valid() {
            return Err(Error::Config(ConfigError::InvalidFeedrate(rate.0)));
        }
    }

    if !(config.zoom_factor.is_finite() && config.zoom_factor > 0.0) {
        return Err(Error::Config(ConfigError::InvalidZoomFactor(config.zoom_factor)));
    }

    Ok(())
}

fn validate_pen(config: &PenConfig) -> Result<()> {
    if config.min_position >= config.max_position || config.max_position > 180 {
        return Err(Error::Config(ConfigError::InvalidPenRange {
            min: config.min_position,
            max: config.max_position,
        }));
    }

    for rate in core::iter::once(config.feedrate).chain(config.preset_feedrate) {
        if !(rate.is_finite() && rate > 0.0) {
            return Err(Error::Config(ConfigError::InvalidFeedrate(rate)));
        }
    }

    for position in [config.up_position, config.down_position] {
        if position < config.min_position || position > config.max_position {
            return Err(Error::Config(ConfigError::PenPresetOutOfRange {
                position,
                min: config.min_position,
                max: config.max_position,
            }));
        }
    }

    Ok(())
}
