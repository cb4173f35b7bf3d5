//! Axis module for spherebot-motion.
//!
//! One [`AxisDriver`] wraps one physical stepper. The hardware side is the
//! [`Actuator`] seam; the motion engine talks to axes through [`Axis`].

mod builder;
mod driver;
mod position;
mod simulated;
mod stepdir;

pub use builder::{step_dir_axis, AxisBuilder};
pub use driver::AxisDriver;
pub use position::Position;
pub use simulated::SimulatedActuator;
pub use stepdir::{NoEnable, StepDirActuator};

use crate::config::units::Steps;
use crate::error::{AxisError, Result};

/// Direction of a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Positive step count.
    Forward,
    /// Negative step count.
    Backward,
}

impl Direction {
    /// Get direction from a signed step count.
    #[inline]
    pub fn from_steps(steps: i64) -> Self {
        if steps >= 0 {
            Direction::Forward
        } else {
            Direction::Backward
        }
    }

    /// Get the sign multiplier.
    #[inline]
    pub fn sign(self) -> i64 {
        match self {
            Direction::Forward => 1,
            Direction::Backward => -1,
        }
    }
}

/// Hardware that can move a motor by exactly one step.
///
/// A failed pulse is a hardware fault; callers abort and do not retry.
pub trait Actuator {
    /// Emit one step pulse in `direction`.
    fn step(&mut self, direction: Direction) -> core::result::Result<(), AxisError>;

    /// De-energize the motor coils (best effort).
    fn release(&mut self) -> core::result::Result<(), AxisError> {
        Ok(())
    }
}

impl<T: Actuator + ?Sized> Actuator for &mut T {
    fn step(&mut self, direction: Direction) -> core::result::Result<(), AxisError> {
        (**self).step(direction)
    }

    fn release(&mut self) -> core::result::Result<(), AxisError> {
        (**self).release()
    }
}

/// Position-tracking axis as seen by the motion engine.
///
/// Only the engine should call the mutating methods; everything else reads.
pub trait Axis {
    /// Current position in steps.
    fn position(&self) -> Steps;

    /// Last commanded destination.
    fn target(&self) -> Steps;

    /// Record the destination of the next move.
    fn set_target(&mut self, target: Steps);

    /// Emit one step, then account for it.
    fn step(&mut self, direction: Direction) -> Result<()>;

    /// Shift the position reference by `offset` without stepping.
    fn rebase(&mut self, offset: Steps);

    /// Redefine the current position without stepping.
    fn set_position(&mut self, position: Steps);

    /// De-energize the motor.
    fn release(&mut self) -> Result<()>;
}

impl<T: Axis + ?Sized> Axis for &mut T {
    fn position(&self) -> Steps {
        (**self).position()
    }

    fn target(&self) -> Steps {
        (**self).target()
    }

    fn set_target(&mut self, target: Steps) {
        (**self).set_target(target)
    }

    fn step(&mut self, direction: Direction) -> Result<()> {
        (**self).step(direction)
    }

    fn rebase(&mut self, offset: Steps) {
        (**self).rebase(offset)
    }

    fn set_position(&mut self, position: Steps) {
        (**self).set_position(position)
    }

    fn release(&mut self) -> Result<()> {
        (**self).release()
    }
}
