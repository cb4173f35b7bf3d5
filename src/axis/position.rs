//! Position tracking for one axis.

use crate::config::units::Steps;

use super::Direction;

/// Axis position tracker.
///
/// Holds the current position in steps and the last commanded target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Position {
    /// Current position in steps (from origin)
    current: Steps,
    /// Last commanded destination
    target: Steps,
}

impl Position {
    /// Create a new position tracker at the origin.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get current position in steps.
    #[inline]
    pub fn current(&self) -> Steps {
        self.current
    }

    /// Get the last commanded target.
    #[inline]
    pub fn target(&self) -> Steps {
        self.target
    }

    /// Record a new target.
    #[inline]
    pub fn set_target(&mut self, target: Steps) {
        self.target = target;
    }

    /// Account for one emitted step.
    #[inline]
    pub fn advance(&mut self, direction: Direction) {
        self.current = Steps(self.current.0 + direction.sign());
    }

    /// Shift the reference frame without moving.
    #[inline]
    pub fn rebase(&mut self, offset: Steps) {
        self.current = self.current + offset;
    }

    /// Redefine the current position; the target follows.
    #[inline]
    pub fn set(&mut self, steps: Steps) {
        self.current = steps;
        self.target = steps;
    }
}
