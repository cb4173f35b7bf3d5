//! Builder pattern for AxisDriver.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::config::units::Steps;
use crate::config::AxisConfig;
use crate::error::{ConfigError, Error, Result};

use super::driver::AxisDriver;
use super::stepdir::StepDirActuator;
use super::{Actuator, Axis};

/// Builder for creating AxisDriver instances.
pub struct AxisBuilder<A>
where
    A: Actuator,
{
    actuator: Option<A>,
    name: Option<heapless::String<32>>,
    position: Steps,
}

impl<A> Default for AxisBuilder<A>
where
    A: Actuator,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<A> AxisBuilder<A>
where
    A: Actuator,
{
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            actuator: None,
            name: None,
            position: Steps::ZERO,
        }
    }

    /// Set the hardware actuator.
    pub fn actuator(mut self, actuator: A) -> Self {
        self.actuator = Some(actuator);
        self
    }

    /// Set the axis name.
    pub fn name(mut self, name: &str) -> Self {
        self.name = heapless::String::try_from(name).ok();
        self
    }

    /// Set the starting position.
    pub fn position(mut self, position: Steps) -> Self {
        self.position = position;
        self
    }

    /// Configure from an AxisConfig.
    ///
    /// Travel limits stay in the configuration; the plotter applies them to
    /// targets before any move.
    pub fn from_axis_config(mut self, config: &AxisConfig) -> Self {
        self.name = Some(config.name.clone());
        self
    }

    /// Build the AxisDriver.
    ///
    /// # Errors
    ///
    /// Returns an error if no actuator was given.
    pub fn build(self) -> Result<AxisDriver<A>> {
        let actuator = self.actuator.ok_or_else(|| {
            Error::Config(ConfigError::ParseError(
                heapless::String::try_from("actuator is required").unwrap_or_default(),
            ))
        })?;

        let name = match self.name {
            Some(name) => name,
            None => heapless::String::try_from("axis").unwrap_or_default(),
        };

        let mut axis = AxisDriver::new(actuator, name);
        axis.set_position(self.position);
        Ok(axis)
    }
}

/// Build a STEP/DIR axis straight from its configuration.
///
/// # Errors
///
/// Never fails today; kept fallible like [`AxisBuilder::build`].
pub fn step_dir_axis<STEP, DIR, DELAY>(
    config: &AxisConfig,
    step_pin: STEP,
    dir_pin: DIR,
    delay: DELAY,
) -> Result<AxisDriver<StepDirActuator<STEP, DIR, DELAY>>>
where
    STEP: OutputPin,
    DIR: OutputPin,
    DELAY: DelayNs,
{
    let actuator =
        StepDirActuator::new(step_pin, dir_pin, delay).invert_direction(config.invert_direction);

    AxisBuilder::new()
        .actuator(actuator)
        .from_axis_config(config)
        .build()
}
