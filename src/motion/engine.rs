//! Coordinated two-axis motion engine.

use embedded_hal::delay::DelayNs;

use crate::axis::Axis;
use crate::config::units::{Steps, StepsPerSec};
use crate::config::EngineConfig;
use crate::error::{MotionError, Result};

use super::octant::{AxisId, LinePlan};
use super::raster::LineRaster;
use super::speed::{clamp_speed, StepTiming};

/// Longest distance, in steps per axis, a single move may cover.
///
/// Keeps the rasterization arithmetic inside `i64`.
pub const MAX_MOVE_STEPS: u64 = 1 << 48;

/// What a completed move did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveReport {
    /// Rasterization plan, `None` for a zero-length move.
    pub plan: Option<LinePlan>,

    /// Timing used, `None` for a zero-length move.
    pub timing: Option<StepTiming>,
}

impl MoveReport {
    const NOOP: Self = Self {
        plan: None,
        timing: None,
    };

    /// True when nothing moved.
    #[inline]
    pub fn is_noop(&self) -> bool {
        self.plan.is_none()
    }

    /// Iterations of the rasterization loop.
    #[inline]
    pub fn major_steps(&self) -> u64 {
        self.plan.map_or(0, |plan| plan.major_steps)
    }

    /// Steps taken by the minor axis.
    #[inline]
    pub fn minor_steps(&self) -> u64 {
        self.plan.map_or(0, |plan| plan.minor_steps)
    }
}

/// Straight-line, constant-speed motion over two axes.
///
/// Generic over:
/// - `X`: rotation axis (wraps when the config gives it a revolution length)
/// - `Y`: pen-arm axis
/// - `D`: inter-step delay provider (must implement `DelayNs`)
///
/// Every move takes `&mut self` and blocks until the last step, so no other
/// code can step either axis while a move runs.
pub struct MotionEngine<X, Y, D>
where
    X: Axis,
    Y: Axis,
    D: DelayNs,
{
    /// Rotation axis.
    x: X,

    /// Pen-arm axis.
    y: Y,

    /// Delay provider for inter-step timing.
    delay: D,

    /// Linear speed ceiling.
    max_speed: StepsPerSec,

    /// Revolution length of the x axis, if it wraps.
    x_steps_per_revolution: Option<u32>,

    /// Per-step overhead taken off every delay.
    step_overhead_us: u32,
}

impl<X, Y, D> MotionEngine<X, Y, D>
where
    X: Axis,
    Y: Axis,
    D: DelayNs,
{
    /// Create an engine over two axes.
    pub fn new(x: X, y: Y, delay: D, config: EngineConfig) -> Self {
        Self {
            x,
            y,
            delay,
            max_speed: config.max_speed,
            x_steps_per_revolution: config.x_steps_per_revolution,
            step_overhead_us: config.step_overhead_us,
        }
    }

    /// Get the speed ceiling.
    #[inline]
    pub fn max_speed(&self) -> StepsPerSec {
        self.max_speed
    }

    /// Change the speed ceiling.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSpeed` when `speed` is not finite or not positive.
    pub fn set_max_speed(&mut self, speed: StepsPerSec) -> Result<()> {
        if !speed.is_valid() {
            return Err(MotionError::InvalidSpeed(speed.value()).into());
        }
        self.max_speed = speed;
        Ok(())
    }

    /// Revolution length of the x axis, if it wraps.
    #[inline]
    pub fn x_steps_per_revolution(&self) -> Option<u32> {
        self.x_steps_per_revolution
    }

    /// Borrow the x axis.
    #[inline]
    pub fn x(&self) -> &X {
        &self.x
    }

    /// Borrow the y axis.
    #[inline]
    pub fn y(&self) -> &Y {
        &self.y
    }

    /// Current position as `(x, y)`.
    #[inline]
    pub fn position(&self) -> (Steps, Steps) {
        (self.x.position(), self.y.position())
    }

    /// Last commanded target as `(x, y)`.
    #[inline]
    pub fn target(&self) -> (Steps, Steps) {
        (self.x.target(), self.y.target())
    }

    /// Borrow the delay provider, e.g. for dwell commands.
    #[inline]
    pub fn delay_mut(&mut self) -> &mut D {
        &mut self.delay
    }

    /// Give back the axes and delay provider.
    pub fn into_parts(self) -> (X, Y, D) {
        (self.x, self.y, self.delay)
    }

    /// Redefine the current position without stepping.
    pub fn set_position(&mut self, x: Steps, y: Steps) {
        debug!("set position ({}, {})", x.0, y.0);
        self.x.set_position(x);
        self.y.set_position(y);
    }

    /// De-energize both motors.
    ///
    /// Both axes are released even when the first one fails.
    pub fn release(&mut self) -> Result<()> {
        let x = self.x.release();
        let y = self.y.release();
        x?;
        y
    }

    /// Move in a straight line to `(x, y)` at `speed`.
    ///
    /// The speed is clamped to the ceiling. Blocks until the move is done.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSpeed` before any step for a non-finite or
    /// non-positive speed, `DistanceOutOfRange` when either axis would
    /// travel more than [`MAX_MOVE_STEPS`], or the first actuator failure,
    /// which aborts the move where it stands.
    pub fn move_to(&mut self, x: Steps, y: Steps, speed: StepsPerSec) -> Result<MoveReport> {
        let dx = distance(self.x.position(), x)?;
        let dy = distance(self.y.position(), y)?;

        let timing =
            StepTiming::for_move(speed, self.max_speed, dx, dy, self.step_overhead_us)?;

        self.x.set_target(x);
        self.y.set_target(y);

        let (plan, timing) = match (LinePlan::new(dx, dy), timing) {
            (Some(plan), Some(timing)) => (plan, timing),
            _ => {
                trace!("move to ({}, {}): already there", x.0, y.0);
                return Ok(MoveReport::NOOP);
            }
        };

        if timing.clamped {
            debug!(
                "speed {} clamped to {}",
                speed.value(),
                timing.effective_speed.value()
            );
        }

        info!(
            "move to ({}, {}) octant {} interval {} us",
            x.0,
            y.0,
            plan.octant.index(),
            timing.interval_us
        );

        let (major, minor): (&mut dyn Axis, &mut dyn Axis) = match plan.major {
            AxisId::X => (&mut self.x, &mut self.y),
            AxisId::Y => (&mut self.y, &mut self.x),
        };

        for minor_step in LineRaster::new(plan.major_steps, plan.minor_steps) {
            major.step(plan.major_dir)?;
            if minor_step {
                minor.step(plan.minor_dir)?;
            }
            if timing.interval_us > 0 {
                self.delay.delay_us(timing.interval_us);
            }
        }

        Ok(MoveReport {
            plan: Some(plan),
            timing: Some(timing),
        })
    }

    /// Like [`move_to`](Self::move_to), but the x axis takes the shorter way
    /// round when it wraps.
    ///
    /// When the naive distance exceeds half a revolution the stored x
    /// position is shifted by one revolution toward the target first. The
    /// speed and both distances are checked before the shift, so a failed
    /// request leaves the position untouched.
    ///
    /// # Errors
    ///
    /// Same as [`move_to`](Self::move_to).
    pub fn travel_to(&mut self, x: Steps, y: Steps, speed: StepsPerSec) -> Result<MoveReport> {
        clamp_speed(speed, self.max_speed)?;
        distance(self.y.position(), y)?;

        if let Some(revolution) = self.x_steps_per_revolution {
            let revolution = i64::from(revolution);
            let pos = self.x.position();
            let delta = distance(pos, x)?;

            if delta.unsigned_abs() > (revolution / 2).unsigned_abs() {
                let offset = if delta > 0 { revolution } else { -revolution };
                pos.0
                    .checked_add(offset)
                    .ok_or(MotionError::DistanceOutOfRange)?;
                debug!("wrap x {} by {}", pos.0, offset);
                self.x.rebase(Steps(offset));
            }
        }

        self.move_to(x, y, speed)
    }
}

/// Signed steps from `from` to `to`, bounded by [`MAX_MOVE_STEPS`].
fn distance(from: Steps, to: Steps) -> Result<i64> {
    to.0.checked_sub(from.0)
        .filter(|delta| delta.unsigned_abs() <= MAX_MOVE_STEPS)
        .ok_or_else(|| MotionError::DistanceOutOfRange.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::{Actuator, AxisBuilder, AxisDriver, Direction, SimulatedActuator};
    use crate::error::{AxisError, Error};
    use crate::motion::Octant;

    /// Adds up every requested delay.
    #[derive(Default)]
    struct TotalDelay {
        ns: u64,
        calls: u32,
    }

    impl DelayNs for TotalDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.ns += u64::from(ns);
            self.calls += 1;
        }
    }

    /// Fails after a fixed number of pulses.
    struct Brittle {
        left: u32,
    }

    impl Actuator for Brittle {
        fn step(&mut self, _direction: Direction) -> core::result::Result<(), AxisError> {
            if self.left == 0 {
                return Err(AxisError::PinError);
            }
            self.left -= 1;
            Ok(())
        }
    }

    type SimAxis = AxisDriver<SimulatedActuator>;

    fn axis(name: &str) -> SimAxis {
        AxisBuilder::new()
            .actuator(SimulatedActuator::new())
            .name(name)
            .build()
            .unwrap()
    }

    fn config(revolution: Option<u32>, overhead: u32) -> EngineConfig {
        EngineConfig {
            max_speed: StepsPerSec(775.0),
            x_steps_per_revolution: revolution,
            step_overhead_us: overhead,
        }
    }

    fn engine(revolution: Option<u32>) -> MotionEngine<SimAxis, SimAxis, TotalDelay> {
        MotionEngine::new(axis("x"), axis("y"), TotalDelay::default(), config(revolution, 0))
    }

    #[test]
    fn test_first_octant_move() {
        let mut engine = MotionEngine::new(
            axis("x"),
            axis("y"),
            TotalDelay::default(),
            config(None, 1290),
        );

        let report = engine
            .move_to(Steps(400), Steps(100), StepsPerSec(100.0))
            .unwrap();

        let plan = report.plan.unwrap();
        assert_eq!(plan.octant, Octant::Zero);
        assert_eq!(report.major_steps(), 400);
        assert_eq!(report.minor_steps(), 100);

        assert_eq!(engine.position(), (Steps(400), Steps(100)));
        assert_eq!(engine.x().actuator().forward_steps(), 400);
        assert_eq!(engine.y().actuator().forward_steps(), 100);

        let interval = report.timing.unwrap().interval_us;
        assert!((9010..=9025).contains(&interval), "{interval}");
        assert_eq!(engine.delay_mut().calls, 400);
    }

    #[test]
    fn test_zero_move_is_noop() {
        let mut engine = engine(None);
        let report = engine.move_to(Steps(0), Steps(0), StepsPerSec(100.0)).unwrap();

        assert!(report.is_noop());
        assert_eq!(engine.x().actuator().total_steps(), 0);
        assert_eq!(engine.y().actuator().total_steps(), 0);
        assert_eq!(engine.delay_mut().calls, 0);
    }

    #[test]
    fn test_every_direction_reaches_target() {
        let targets = [
            (7, 3),
            (3, 7),
            (-3, 7),
            (-7, 3),
            (-7, -3),
            (-3, -7),
            (3, -7),
            (7, -3),
            (0, 5),
            (5, 0),
            (-5, 0),
            (0, -5),
            (6, 6),
            (-6, -6),
        ];

        for (tx, ty) in targets {
            let mut engine = engine(None);
            engine
                .move_to(Steps(tx), Steps(ty), StepsPerSec(500.0))
                .unwrap();
            assert_eq!(engine.position(), (Steps(tx), Steps(ty)), "({tx}, {ty})");
            assert_eq!(engine.target(), (Steps(tx), Steps(ty)));

            let (x, y, _) = engine.into_parts();
            assert_eq!(x.actuator().total_steps(), tx.unsigned_abs());
            assert_eq!(y.actuator().total_steps(), ty.unsigned_abs());
        }
    }

    #[test]
    fn test_speed_clamped_to_ceiling() {
        let mut engine = engine(None);
        let report = engine.move_to(Steps(100), Steps(0), StepsPerSec(5000.0)).unwrap();

        let timing = report.timing.unwrap();
        assert!(timing.clamped);
        assert_eq!(timing.effective_speed, StepsPerSec(775.0));
        // 1e6 / 775 = 1290
        assert_eq!(timing.interval_us, 1290);
    }

    #[test]
    fn test_invalid_speed_moves_nothing() {
        let mut engine = engine(None);
        let result = engine.move_to(Steps(10), Steps(10), StepsPerSec(0.0));

        assert_eq!(result, Err(Error::Motion(MotionError::InvalidSpeed(0.0))));
        assert_eq!(engine.position(), (Steps(0), Steps(0)));
        assert_eq!(engine.target(), (Steps(0), Steps(0)));
    }

    #[test]
    fn test_set_max_speed() {
        let mut engine = engine(None);
        engine.set_max_speed(StepsPerSec(200.0)).unwrap();
        assert_eq!(engine.max_speed(), StepsPerSec(200.0));
        assert!(engine.set_max_speed(StepsPerSec(-1.0)).is_err());
        assert_eq!(engine.max_speed(), StepsPerSec(200.0));
    }

    #[test]
    fn test_travel_takes_short_way() {
        let mut engine = engine(Some(200));
        engine.set_position(Steps(190), Steps(0));

        let report = engine.travel_to(Steps(10), Steps(0), StepsPerSec(100.0)).unwrap();

        assert_eq!(report.major_steps(), 20);
        assert_eq!(engine.position(), (Steps(10), Steps(0)));
        assert_eq!(engine.x().actuator().forward_steps(), 20);
        assert_eq!(engine.x().actuator().backward_steps(), 0);
    }

    #[test]
    fn test_travel_backward_across_origin() {
        let mut engine = engine(Some(200));
        engine.set_position(Steps(10), Steps(0));

        engine.travel_to(Steps(190), Steps(0), StepsPerSec(100.0)).unwrap();

        assert_eq!(engine.position(), (Steps(190), Steps(0)));
        assert_eq!(engine.x().actuator().backward_steps(), 20);
    }

    #[test]
    fn test_travel_within_half_turn_is_direct() {
        let mut engine = engine(Some(200));
        let report = engine.travel_to(Steps(100), Steps(0), StepsPerSec(100.0)).unwrap();
        assert_eq!(report.major_steps(), 100);
    }

    #[test]
    fn test_travel_without_wrap_is_move() {
        let mut engine = engine(None);
        engine.set_position(Steps(190), Steps(0));
        let report = engine.travel_to(Steps(10), Steps(0), StepsPerSec(100.0)).unwrap();
        assert_eq!(report.major_steps(), 180);
    }

    #[test]
    fn test_invalid_speed_leaves_wrap_alone() {
        let mut engine = engine(Some(200));
        engine.set_position(Steps(190), Steps(0));

        let result = engine.travel_to(Steps(10), Steps(0), StepsPerSec(f32::NAN));

        assert!(matches!(result, Err(Error::Motion(MotionError::InvalidSpeed(_)))));
        assert_eq!(engine.position(), (Steps(190), Steps(0)));
        assert_eq!(engine.x().actuator().total_steps(), 0);
    }

    #[test]
    fn test_distance_out_of_range() {
        let mut engine = engine(Some(200));
        engine.set_position(Steps(i64::MIN), Steps(0));

        let result = engine.move_to(Steps(0), Steps(0), StepsPerSec(100.0));
        assert_eq!(result, Err(Error::Motion(MotionError::DistanceOutOfRange)));

        let result = engine.travel_to(Steps(i64::MAX), Steps(0), StepsPerSec(100.0));
        assert_eq!(result, Err(Error::Motion(MotionError::DistanceOutOfRange)));
        assert_eq!(engine.position(), (Steps(i64::MIN), Steps(0)));

        engine.set_position(Steps(0), Steps(0));
        let too_far = Steps(MAX_MOVE_STEPS as i64 + 1);
        let result = engine.move_to(Steps(0), too_far, StepsPerSec(100.0));
        assert_eq!(result, Err(Error::Motion(MotionError::DistanceOutOfRange)));
        assert_eq!(engine.target(), (Steps(0), Steps(0)));
    }

    #[test]
    fn test_pin_failure_aborts_move() {
        let x = AxisBuilder::new()
            .actuator(Brittle { left: 3 })
            .name("x")
            .build()
            .unwrap();
        let mut engine = MotionEngine::new(x, axis("y"), TotalDelay::default(), config(None, 0));

        let result = engine.move_to(Steps(10), Steps(0), StepsPerSec(100.0));

        assert_eq!(result, Err(Error::Axis(AxisError::PinError)));
        assert_eq!(engine.position(), (Steps(3), Steps(0)));
        assert_eq!(engine.target(), (Steps(10), Steps(0)));
    }

    #[test]
    fn test_release_both_axes() {
        let mut engine = engine(None);
        engine.release().unwrap();
        assert_eq!(engine.x().actuator().releases(), 1);
        assert_eq!(engine.y().actuator().releases(), 1);
    }
}
