//! Bresenham line rasterization.
//!
//! Works in the first octant only. [`LinePlan`](super::LinePlan) maps the
//! result back onto the physical axes.

/// Runtime state of one rasterized line.
///
/// Each call to [`advance`](Self::advance) is one iteration: the major axis
/// steps, and the minor axis steps when the error term is positive.
#[derive(Debug, Clone)]
pub struct LineRaster {
    /// Major axis step count (`dx'`).
    major_steps: u64,

    /// Minor axis step count (`dy'`).
    minor_steps: u64,

    /// Iterations done so far.
    current_step: u64,

    /// Bresenham decision variable.
    error: i64,
}

impl LineRaster {
    /// Create a raster for first-octant `(dx', dy')`, `dx' >= dy'`.
    ///
    /// Counts up to [`MAX_MOVE_STEPS`](super::MAX_MOVE_STEPS) keep the
    /// error term inside `i64`.
    pub fn new(major_steps: u64, minor_steps: u64) -> Self {
        debug_assert!(minor_steps <= major_steps);
        Self {
            major_steps,
            minor_steps,
            current_step: 0,
            error: 2 * minor_steps as i64 - major_steps as i64,
        }
    }

    /// Check if the line is complete.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.current_step >= self.major_steps
    }

    /// Get iterations remaining.
    #[inline]
    pub fn steps_remaining(&self) -> u64 {
        self.major_steps.saturating_sub(self.current_step)
    }

    /// Run one iteration.
    ///
    /// Returns `None` once complete, otherwise whether the minor axis steps
    /// alongside the major axis on this iteration.
    pub fn advance(&mut self) -> Option<bool> {
        if self.is_complete() {
            return None;
        }

        self.current_step += 1;

        let dx = self.major_steps as i64;
        let dy = self.minor_steps as i64;

        if self.error > 0 {
            self.error += 2 * dy - 2 * dx;
            Some(true)
        } else {
            self.error += 2 * dy;
            Some(false)
        }
    }
}

impl Iterator for LineRaster {
    type Item = bool;

    fn next(&mut self) -> Option<bool> {
        self.advance()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::try_from(self.steps_remaining()).unwrap_or(usize::MAX);
        (remaining, Some(remaining))
    }
}
