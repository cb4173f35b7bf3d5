//! Axis travel limits.

use serde::Deserialize;

use crate::error::{AxisError, Result};

use super::units::Steps;

/// Policy for handling limit violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "snake_case")]
pub enum LimitPolicy {
    /// Reject moves that would exceed limits.
    Reject,
    /// Clamp target to nearest limit.
    #[default]
    Clamp,
}

/// Travel limits in steps.
///
/// The pen arm is clamped to these to keep it from hitting the frame.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct StepLimits {
    /// Minimum position in steps.
    #[serde(rename = "min_steps")]
    pub min: Steps,
    /// Maximum position in steps.
    #[serde(rename = "max_steps")]
    pub max: Steps,
    /// What to do when a target falls outside.
    #[serde(default)]
    pub policy: LimitPolicy,
}

impl StepLimits {
    /// Create new step limits.
    pub fn new(min: Steps, max: Steps, policy: LimitPolicy) -> Self {
        Self { min, max, policy }
    }

    /// Check if limits are valid (min < max).
    pub fn is_valid(&self) -> bool {
        self.min < self.max
    }

    /// Check if a position is within limits.
    pub fn contains(&self, steps: Steps) -> bool {
        steps >= self.min && steps <= self.max
    }

    /// Apply limit policy to a target position.
    ///
    /// Returns `Some(steps)` if valid or clamped, `None` if rejected.
    pub fn apply(&self, target: Steps) -> Option<Steps> {
        if self.contains(target) {
            Some(target)
        } else {
            match self.policy {
                LimitPolicy::Reject => None,
                LimitPolicy::Clamp => {
                    if target < self.min {
                        Some(self.min)
                    } else {
                        Some(self.max)
                    }
                }
            }
        }
    }

    /// The limit a rejected target ran into.
    pub fn violated_limit(&self, target: Steps) -> Steps {
        if target < self.min {
            self.min
        } else {
            self.max
        }
    }

    /// Like [`apply`](Self::apply), with a rejection turned into an error.
    ///
    /// # Errors
    ///
    /// Returns `LimitExceeded` when the policy rejects `target`.
    pub fn enforce(&self, target: Steps) -> Result<Steps> {
        self.apply(target).ok_or_else(|| {
            AxisError::LimitExceeded {
                position: target.0,
                limit: self.violated_limit(target).0,
            }
            .into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_limits_reject() {
        let limits = StepLimits::new(Steps(-480), Steps(480), LimitPolicy::Reject);

        assert!(limits.apply(Steps(0)).is_some());
        assert!(limits.apply(Steps(480)).is_some());
        assert!(limits.apply(Steps(-480)).is_some());
        assert!(limits.apply(Steps(481)).is_none());
        assert!(limits.apply(Steps(-481)).is_none());
        assert_eq!(limits.violated_limit(Steps(-500)), Steps(-480));
    }

    #[test]
    fn test_step_limits_clamp() {
        let limits = StepLimits::new(Steps(-480), Steps(480), LimitPolicy::Clamp);

        assert_eq!(limits.apply(Steps(12)), Some(Steps(12)));
        assert_eq!(limits.apply(Steps(900)), Some(Steps(480)));
        assert_eq!(limits.apply(Steps(-900)), Some(Steps(-480)));
        assert_eq!(limits.enforce(Steps(-900)), Ok(Steps(-480)));
    }

    #[test]
    fn test_enforce_reject() {
        let limits = StepLimits::new(Steps(-480), Steps(480), LimitPolicy::Reject);

        assert_eq!(limits.enforce(Steps(100)), Ok(Steps(100)));
        assert_eq!(
            limits.enforce(Steps(481)),
            Err(crate::Error::Axis(AxisError::LimitExceeded {
                position: 481,
                limit: 480,
            }))
        );
    }
}
