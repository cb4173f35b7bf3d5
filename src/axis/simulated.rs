//! Actuator without hardware, for dry runs.

use crate::error::AxisError;

use super::{Actuator, Direction};

/// Counts the pulses it is asked to emit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimulatedActuator {
    forward: u64,
    backward: u64,
    releases: u32,
    last: Option<Direction>,
}

impl SimulatedActuator {
    /// Create a fresh counter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pulses emitted forward.
    pub fn forward_steps(&self) -> u64 {
        self.forward
    }

    /// Pulses emitted backward.
    pub fn backward_steps(&self) -> u64 {
        self.backward
    }

    /// All pulses emitted.
    pub fn total_steps(&self) -> u64 {
        self.forward + self.backward
    }

    /// Times the motor was released.
    pub fn releases(&self) -> u32 {
        self.releases
    }

    /// Direction of the most recent pulse.
    pub fn last_direction(&self) -> Option<Direction> {
        self.last
    }
}

impl Actuator for SimulatedActuator {
    fn step(&mut self, direction: Direction) -> Result<(), AxisError> {
        match direction {
            Direction::Forward => self.forward += 1,
            Direction::Backward => self.backward += 1,
        }
        self.last = Some(direction);
        Ok(())
    }

    fn release(&mut self) -> Result<(), AxisError> {
        self.releases += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_by_direction() {
        let mut actuator = SimulatedActuator::new();
        assert_eq!(actuator.last_direction(), None);

        actuator.step(Direction::Forward).unwrap();
        actuator.step(Direction::Forward).unwrap();
        actuator.step(Direction::Backward).unwrap();
        actuator.release().unwrap();

        assert_eq!(actuator.forward_steps(), 2);
        assert_eq!(actuator.backward_steps(), 1);
        assert_eq!(actuator.total_steps(), 3);
        assert_eq!(actuator.releases(), 1);
        assert_eq!(actuator.last_direction(), Some(Direction::Backward));
    }
}
