//! STEP/DIR stepper driver actuator.
//!
//! Generic over embedded-hal 1.0 pin types, for A4988/DRV8825 style drivers.

use core::convert::Infallible;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, OutputPin};

use crate::error::AxisError;

use super::{Actuator, Direction};

/// Default STEP pulse width in microseconds.
const DEFAULT_PULSE_WIDTH_US: u32 = 2;

/// Placeholder for drivers without an enable line.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEnable;

impl ErrorType for NoEnable {
    type Error = Infallible;
}

impl OutputPin for NoEnable {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Stepper driver controlled through STEP, DIR and an optional active-low
/// ENABLE pin.
///
/// Generic over:
/// - `STEP`: STEP pin type (must implement `OutputPin`)
/// - `DIR`: DIR pin type (must implement `OutputPin`)
/// - `DELAY`: Delay provider for the pulse width (must implement `DelayNs`)
/// - `EN`: ENABLE pin type, [`NoEnable`] when the line is not wired
pub struct StepDirActuator<STEP, DIR, DELAY, EN = NoEnable>
where
    STEP: OutputPin,
    DIR: OutputPin,
    DELAY: DelayNs,
    EN: OutputPin,
{
    /// STEP pin (pulse to move one step).
    step_pin: STEP,

    /// DIR pin (high = forward, low = backward, or inverted).
    dir_pin: DIR,

    /// ENABLE pin, low energizes the coils.
    enable_pin: EN,

    /// Delay provider for the pulse width.
    delay: DELAY,

    /// Current direction (cached to avoid unnecessary pin writes).
    current_direction: Option<Direction>,

    /// Whether direction pin logic is inverted.
    invert_direction: bool,

    /// Whether the coils are known to be energized.
    energized: bool,

    /// STEP high time.
    pulse_width_us: u32,
}

impl<STEP, DIR, DELAY> StepDirActuator<STEP, DIR, DELAY, NoEnable>
where
    STEP: OutputPin,
    DIR: OutputPin,
    DELAY: DelayNs,
{
    /// Create an actuator without an enable line.
    pub fn new(step_pin: STEP, dir_pin: DIR, delay: DELAY) -> Self {
        Self {
            step_pin,
            dir_pin,
            enable_pin: NoEnable,
            delay,
            current_direction: None,
            invert_direction: false,
            energized: false,
            pulse_width_us: DEFAULT_PULSE_WIDTH_US,
        }
    }

    /// Attach an active-low ENABLE pin.
    pub fn with_enable<E: OutputPin>(self, enable_pin: E) -> StepDirActuator<STEP, DIR, DELAY, E> {
        StepDirActuator {
            step_pin: self.step_pin,
            dir_pin: self.dir_pin,
            enable_pin,
            delay: self.delay,
            current_direction: self.current_direction,
            invert_direction: self.invert_direction,
            energized: false,
            pulse_width_us: self.pulse_width_us,
        }
    }
}

impl<STEP, DIR, DELAY, EN> StepDirActuator<STEP, DIR, DELAY, EN>
where
    STEP: OutputPin,
    DIR: OutputPin,
    DELAY: DelayNs,
    EN: OutputPin,
{
    /// Set direction inversion.
    pub fn invert_direction(mut self, invert: bool) -> Self {
        self.invert_direction = invert;
        self
    }

    /// Set the STEP pulse width in microseconds.
    pub fn pulse_width_us(mut self, width: u32) -> Self {
        self.pulse_width_us = width;
        self
    }

    /// Give back the pins and delay.
    pub fn release_pins(self) -> (STEP, DIR, EN, DELAY) {
        (self.step_pin, self.dir_pin, self.enable_pin, self.delay)
    }

    fn set_direction(&mut self, direction: Direction) -> Result<(), AxisError> {
        if self.current_direction == Some(direction) {
            return Ok(());
        }

        let pin_high = match direction {
            Direction::Forward => !self.invert_direction,
            Direction::Backward => self.invert_direction,
        };

        if pin_high {
            self.dir_pin.set_high().map_err(|_| AxisError::PinError)?;
        } else {
            self.dir_pin.set_low().map_err(|_| AxisError::PinError)?;
        }

        self.current_direction = Some(direction);
        Ok(())
    }

    fn energize(&mut self) -> Result<(), AxisError> {
        if !self.energized {
            self.enable_pin.set_low().map_err(|_| AxisError::PinError)?;
            self.energized = true;
        }
        Ok(())
    }
}

impl<STEP, DIR, DELAY, EN> Actuator for StepDirActuator<STEP, DIR, DELAY, EN>
where
    STEP: OutputPin,
    DIR: OutputPin,
    DELAY: DelayNs,
    EN: OutputPin,
{
    fn step(&mut self, direction: Direction) -> Result<(), AxisError> {
        self.energize()?;
        self.set_direction(direction)?;

        // Generate step pulse
        self.step_pin.set_high().map_err(|_| AxisError::PinError)?;
        self.delay.delay_us(self.pulse_width_us);
        self.step_pin.set_low().map_err(|_| AxisError::PinError)?;

        Ok(())
    }

    fn release(&mut self) -> Result<(), AxisError> {
        self.enable_pin.set_high().map_err(|_| AxisError::PinError)?;
        self.energized = false;
        Ok(())
    }
}
