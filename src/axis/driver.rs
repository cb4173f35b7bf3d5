//! Axis driver.
//!
//! Owns one actuator and the position bookkeeping that goes with it.

use crate::config::units::Steps;
use crate::error::Result;

use super::position::Position;
use super::{Actuator, Axis, Direction};

/// One physical stepper axis.
///
/// Generic over the hardware `A` (must implement [`Actuator`]). The position
/// changes by exactly one step per successful pulse, and only after the pulse.
pub struct AxisDriver<A>
where
    A: Actuator,
{
    /// Hardware handle, owned exclusively.
    actuator: A,

    /// Current and target position.
    position: Position,

    /// Axis name for logging/debugging.
    name: heapless::String<32>,
}

impl<A> AxisDriver<A>
where
    A: Actuator,
{
    /// Create a new axis at the origin.
    pub(crate) fn new(actuator: A, name: heapless::String<32>) -> Self {
        Self {
            actuator,
            position: Position::new(),
            name,
        }
    }

    /// Get the axis name.
    #[inline]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Get current position in steps.
    #[inline]
    pub fn position(&self) -> Steps {
        self.position.current()
    }

    /// Get the last commanded target in steps.
    #[inline]
    pub fn target(&self) -> Steps {
        self.position.target()
    }

    /// Borrow the actuator.
    #[inline]
    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    /// Give back the actuator.
    pub fn into_actuator(self) -> A {
        self.actuator
    }
}

impl<A> Axis for AxisDriver<A>
where
    A: Actuator,
{
    #[inline]
    fn position(&self) -> Steps {
        self.position.current()
    }

    #[inline]
    fn target(&self) -> Steps {
        self.position.target()
    }

    #[inline]
    fn set_target(&mut self, target: Steps) {
        self.position.set_target(target);
    }

    fn step(&mut self, direction: Direction) -> Result<()> {
        self.actuator.step(direction)?;
        self.position.advance(direction);
        Ok(())
    }

    fn rebase(&mut self, offset: Steps) {
        self.position.rebase(offset);
    }

    fn set_position(&mut self, position: Steps) {
        self.position.set(position);
    }

    fn release(&mut self) -> Result<()> {
        self.actuator.release()?;
        Ok(())
    }
}
