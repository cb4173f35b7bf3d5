//! Pen lift servo.

use embedded_hal::pwm::SetDutyCycle;

use crate::config::PenConfig;
use crate::error::{AxisError, Result};

/// Servo frame length in microseconds (50 Hz).
pub const SERVO_FRAME_US: u32 = 20_000;

/// Pulse width at 0 degrees.
const MIN_PULSE_US: u32 = 1_000;

/// Pulse width at 180 degrees.
const MAX_PULSE_US: u32 = 2_000;

/// Something that can raise and lower the pen.
pub trait Pen {
    /// Move the pen servo to `degrees` (0..=180).
    fn set_position(&mut self, degrees: u8) -> Result<()>;
}

impl<T: Pen + ?Sized> Pen for &mut T {
    fn set_position(&mut self, degrees: u8) -> Result<()> {
        (**self).set_position(degrees)
    }
}

/// Hobby servo on a PWM channel running at 50 Hz.
pub struct ServoPen<PWM>
where
    PWM: SetDutyCycle,
{
    pwm: PWM,
    reverse: bool,
    position: Option<u8>,
}

impl<PWM> ServoPen<PWM>
where
    PWM: SetDutyCycle,
{
    /// Wrap a PWM channel already configured for a 20 ms period.
    pub fn new(pwm: PWM, reverse: bool) -> Self {
        Self {
            pwm,
            reverse,
            position: None,
        }
    }

    /// Wrap a PWM channel using the pen configuration.
    pub fn from_config(pwm: PWM, config: &PenConfig) -> Self {
        Self::new(pwm, config.reverse)
    }

    /// Last commanded position, before reversal.
    #[inline]
    pub fn position(&self) -> Option<u8> {
        self.position
    }

    /// Give back the PWM channel.
    pub fn release(self) -> PWM {
        self.pwm
    }

    /// Pulse width for `degrees`, reversal applied.
    pub fn pulse_width_us(&self, degrees: u8) -> u32 {
        let degrees = u32::from(degrees.min(180));
        let angle = if self.reverse { 180 - degrees } else { degrees };
        MIN_PULSE_US + angle * (MAX_PULSE_US - MIN_PULSE_US) / 180
    }
}

impl<PWM> Pen for ServoPen<PWM>
where
    PWM: SetDutyCycle,
{
    fn set_position(&mut self, degrees: u8) -> Result<()> {
        let pulse = self.pulse_width_us(degrees);
        let duty = pulse * u32::from(self.pwm.max_duty_cycle()) / SERVO_FRAME_US;

        debug!("pen to {} deg, pulse {} us", degrees, pulse);

        // duty <= max_duty_cycle, so it fits in u16.
        self.pwm
            .set_duty_cycle(duty as u16)
            .map_err(|_| AxisError::PinError)?;
        self.position = Some(degrees);
        Ok(())
    }
}

/// Pen without hardware; remembers where it was sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimulatedPen {
    position: Option<u8>,
    moves: u32,
}

impl SimulatedPen {
    /// Create a pen that has never moved.
    pub fn new() -> Self {
        Self::default()
    }

    /// Last commanded position.
    #[inline]
    pub fn position(&self) -> Option<u8> {
        self.position
    }

    /// Number of commands received.
    #[inline]
    pub fn moves(&self) -> u32 {
        self.moves
    }
}

impl Pen for SimulatedPen {
    fn set_position(&mut self, degrees: u8) -> Result<()> {
        self.position = Some(degrees);
        self.moves += 1;
        Ok(())
    }
}
