//! Constant-speed timing for a coordinated move.
//!
//! The requested linear speed is clamped to the ceiling, then converted to
//! the step rate of the major axis and finally to a fixed inter-step delay.

use libm::sqrtf;

use crate::config::units::StepsPerSec;
use crate::error::{MotionError, Result};

/// Microseconds per second.
const MICROS_PER_SEC: f32 = 1_000_000.0;

/// Clamp a requested speed to the ceiling.
///
/// # Errors
///
/// Returns `InvalidSpeed` when `requested` is not finite or not positive.
pub fn clamp_speed(requested: StepsPerSec, max: StepsPerSec) -> Result<StepsPerSec> {
    if !requested.is_valid() {
        return Err(MotionError::InvalidSpeed(requested.value()).into());
    }
    Ok(requested.min(max))
}

/// Timing of one move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepTiming {
    /// Linear speed after clamping.
    pub effective_speed: StepsPerSec,

    /// Step rate of the major axis.
    pub major_axis_speed: StepsPerSec,

    /// Delay between iterations after the overhead is taken off.
    pub interval_us: u32,

    /// True when the requested speed was above the ceiling.
    pub clamped: bool,
}

impl StepTiming {
    /// Compute the timing for a move by `(dx, dy)`.
    ///
    /// Returns `Ok(None)` for the zero vector, which needs no timing.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSpeed` when `requested` is not finite or not positive.
    pub fn for_move(
        requested: StepsPerSec,
        max: StepsPerSec,
        dx: i64,
        dy: i64,
        overhead_us: u32,
    ) -> Result<Option<Self>> {
        let effective_speed = clamp_speed(requested, max)?;

        if dx == 0 && dy == 0 {
            return Ok(None);
        }

        let fx = dx as f32;
        let fy = dy as f32;
        let major = dx.unsigned_abs().max(dy.unsigned_abs()) as f32;
        let length = sqrtf(fx * fx + fy * fy);

        let major_axis_speed = effective_speed * (major / length);

        // Float to int `as` saturates, so a tiny speed cannot wrap around.
        let raw_interval = (MICROS_PER_SEC / major_axis_speed.value()) as u32;

        Ok(Some(Self {
            effective_speed,
            major_axis_speed,
            interval_us: raw_interval.saturating_sub(overhead_us),
            clamped: effective_speed != requested,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX: StepsPerSec = StepsPerSec(775.0);

    #[test]
    fn test_clamp() {
        assert_eq!(clamp_speed(StepsPerSec(1000.0), MAX), Ok(MAX));
        assert_eq!(clamp_speed(StepsPerSec(100.0), MAX), Ok(StepsPerSec(100.0)));
        assert_eq!(clamp_speed(MAX, MAX), Ok(MAX));
    }

    #[test]
    fn test_invalid_speed() {
        for bad in [0.0, -5.0, f32::NAN, f32::INFINITY] {
            let result = StepTiming::for_move(StepsPerSec(bad), MAX, 10, 0, 0);
            assert!(result.is_err(), "{bad}");
        }
    }

    #[test]
    fn test_zero_move() {
        assert_eq!(StepTiming::for_move(StepsPerSec(100.0), MAX, 0, 0, 1290), Ok(None));
    }

    #[test]
    fn test_axis_aligned_move() {
        let timing = StepTiming::for_move(StepsPerSec(500.0), MAX, 0, -250, 0)
            .unwrap()
            .unwrap();

        assert!((timing.major_axis_speed.value() - 500.0).abs() < 1e-3);
        assert_eq!(timing.interval_us, 2000);
        assert!(!timing.clamped);
    }

    #[test]
    fn test_diagonal_speeds_up_major_axis() {
        // (400, 100): length 412.31, major rate 100 * 400 / 412.31 = 97.01.
        let timing = StepTiming::for_move(StepsPerSec(100.0), MAX, 400, 100, 1290)
            .unwrap()
            .unwrap();

        assert!((timing.major_axis_speed.value() - 97.014).abs() < 0.01);
        // 1e6 / 97.014 = 10307, minus overhead.
        assert!((9010..=9025).contains(&timing.interval_us), "{}", timing.interval_us);
    }

    #[test]
    fn test_overhead_floors_at_zero() {
        let timing = StepTiming::for_move(StepsPerSec(2000.0), MAX, 10, 10, 5000)
            .unwrap()
            .unwrap();

        assert!(timing.clamped);
        assert_eq!(timing.effective_speed, MAX);
        assert_eq!(timing.interval_us, 0);
    }
}
