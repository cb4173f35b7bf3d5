//! Plotter facade.
//!
//! Ties the G-code decoder, the motion engine and the pen servo together.

use embedded_hal::delay::DelayNs;
use libm::round;

use crate::axis::Axis;
use crate::config::units::{Steps, StepsPerSec};
use crate::config::{validate_config, EngineConfig, MachineConfig, PenControl};
use crate::error::{MotionError, Result};
use crate::gcode::{Block, Command, LineBuffer};
use crate::motion::{MotionEngine, MoveReport};
use crate::pen::Pen;

/// Largest coordinate, in steps, a G-code word may address.
pub const MAX_COORDINATE_STEPS: i64 = 1 << 40;

/// A sphere plotter driven by G-code.
///
/// Generic over the two axes, the delay provider and the pen. `x` is the
/// rotation axis and takes the short way round, `y` is the pen arm and is
/// kept inside its travel limits.
///
/// # Example
///
/// ```rust,ignore
/// use spherebot_motion::{MachineConfig, Plotter};
///
/// let config = spherebot_motion::load_config("spherebot.toml")?;
/// let mut plotter = Plotter::new(rotation, pen_arm, delay, pen, config)?;
///
/// for byte in b"G1 X100 Y20 F300\nM300 S115\n" {
///     plotter.feed(*byte)?;
/// }
/// ```
pub struct Plotter<X, Y, D, P>
where
    X: Axis,
    Y: Axis,
    D: DelayNs,
    P: Pen,
{
    /// Coordinated motion over both axes.
    engine: MotionEngine<X, Y, D>,

    /// Pen lift servo.
    pen: P,

    /// Validated machine configuration.
    config: MachineConfig,

    /// Modal feedrate.
    feedrate: StepsPerSec,

    /// Modal pen feedrate in degrees per second.
    pen_feedrate: f32,

    /// Last commanded servo position, unknown until the first pen move.
    pen_position: Option<u8>,

    /// Coordinates are relative to the current target (`G91`).
    relative: bool,

    /// Bytes of the line being received.
    line: LineBuffer,
}

impl<X, Y, D, P> Plotter<X, Y, D, P>
where
    X: Axis,
    Y: Axis,
    D: DelayNs,
    P: Pen,
{
    /// Create a plotter from its parts.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration does not validate.
    pub fn new(x: X, y: Y, delay: D, pen: P, config: MachineConfig) -> Result<Self> {
        validate_config(&config)?;

        let engine = MotionEngine::new(x, y, delay, EngineConfig::from_machine(&config));
        let feedrate = config.motion.default_feedrate;
        let pen_feedrate = config.pen.feedrate;

        Ok(Self {
            engine,
            pen,
            config,
            feedrate,
            pen_feedrate,
            pen_position: None,
            relative: false,
            line: LineBuffer::new(),
        })
    }

    /// Get the configuration.
    #[inline]
    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    /// Borrow the motion engine.
    #[inline]
    pub fn engine(&self) -> &MotionEngine<X, Y, D> {
        &self.engine
    }

    /// Mutably borrow the motion engine.
    #[inline]
    pub fn engine_mut(&mut self) -> &mut MotionEngine<X, Y, D> {
        &mut self.engine
    }

    /// Borrow the pen.
    #[inline]
    pub fn pen(&self) -> &P {
        &self.pen
    }

    /// Current modal feedrate.
    #[inline]
    pub fn feedrate(&self) -> StepsPerSec {
        self.feedrate
    }

    /// Feedrate moves actually run at: the preset when one is configured,
    /// the modal feedrate otherwise.
    #[inline]
    pub fn effective_feedrate(&self) -> StepsPerSec {
        self.config.motion.preset_feedrate.unwrap_or(self.feedrate)
    }

    /// Current modal pen feedrate in degrees per second.
    #[inline]
    pub fn pen_feedrate(&self) -> f32 {
        self.pen_feedrate
    }

    /// True in relative mode (`G91`).
    #[inline]
    pub fn is_relative(&self) -> bool {
        self.relative
    }

    /// Give back the engine and the pen.
    pub fn into_parts(self) -> (MotionEngine<X, Y, D>, P) {
        (self.engine, self.pen)
    }

    /// Lift the pen to its configured up position.
    pub fn pen_up(&mut self) -> Result<()> {
        self.move_pen(self.config.pen.up_position)
    }

    /// Lower the pen to its configured down position.
    pub fn pen_down(&mut self) -> Result<()> {
        self.move_pen(self.config.pen.down_position)
    }

    /// Feed one received byte.
    ///
    /// When the byte completes a line, the line is decoded and executed.
    ///
    /// # Errors
    ///
    /// Returns decoder errors (including line overflow) and any error from
    /// executing the line.
    pub fn feed(&mut self, byte: u8) -> Result<Option<MoveReport>> {
        if !self.line.push(byte)? {
            return Ok(None);
        }

        let block = Block::parse(self.line.line())?;
        self.handle_block(&block)
    }

    /// Decode and execute one block.
    ///
    /// Block-delete lines are skipped when the configuration enables it.
    ///
    /// # Errors
    ///
    /// Returns decoder errors and any error from [`execute`](Self::execute).
    pub fn handle_block(&mut self, block: &Block) -> Result<Option<MoveReport>> {
        if block.is_block_delete() && self.config.motion.block_delete {
            debug!("block delete, skipped");
            return Ok(None);
        }

        let command = Command::from_block(block)?;
        self.execute(&command)
    }

    /// Execute one command.
    ///
    /// Returns the move report for motion commands.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSpeed` for a non-positive feedrate,
    /// `CoordinateOutOfRange` for a coordinate beyond
    /// [`MAX_COORDINATE_STEPS`], `LimitExceeded` for a pen-arm target outside
    /// reject-policy limits, and actuator failures.
    pub fn execute(&mut self, command: &Command) -> Result<Option<MoveReport>> {
        match *command {
            Command::Move { x, y, z, feedrate } => {
                if let Some(feedrate) = feedrate {
                    self.set_feedrate(feedrate)?;
                }
                if let Some(z) = z {
                    match self.config.pen.control {
                        PenControl::ZWord => self.move_pen(self.config.pen.clamp(z))?,
                        PenControl::M300 => trace!("z word ignored"),
                    }
                }
                self.move_axes(x, y).map(Some)
            }
            Command::Dwell { millis } => {
                self.engine.delay_mut().delay_ms(millis);
                Ok(None)
            }
            Command::Absolute => {
                self.relative = false;
                Ok(None)
            }
            Command::Relative => {
                self.relative = true;
                Ok(None)
            }
            Command::SetPosition { x, y } => {
                let (current_x, current_y) = self.engine.position();
                let (x, y) = match (x, y) {
                    (None, None) => (Steps::ZERO, Steps::ZERO),
                    (x, y) => (
                        x.map_or(Ok(current_x), |v| self.to_steps(v))?,
                        y.map_or(Ok(current_y), |v| self.to_steps(v))?,
                    ),
                };
                self.engine.set_position(x, y);
                Ok(None)
            }
            Command::ReleaseMotors => {
                self.engine.release()?;
                Ok(None)
            }
            Command::Pen { position, feedrate } => {
                if self.config.pen.control != PenControl::M300 {
                    debug!("M300 ignored, pen follows Z");
                    return Ok(None);
                }
                if let Some(feedrate) = feedrate {
                    self.set_pen_feedrate(feedrate)?;
                }
                self.move_pen(self.config.pen.clamp(position))?;
                Ok(None)
            }
            Command::Empty => Ok(None),
            Command::Unsupported { letter, number } => {
                debug!("ignored {}{}", letter, number.unwrap_or(0));
                Ok(None)
            }
        }
    }

    fn set_feedrate(&mut self, feedrate: f64) -> Result<()> {
        let feedrate = StepsPerSec(feedrate as f32);
        if !feedrate.is_valid() {
            return Err(MotionError::InvalidSpeed(feedrate.value()).into());
        }
        self.feedrate = feedrate;
        Ok(())
    }

    fn set_pen_feedrate(&mut self, feedrate: f64) -> Result<()> {
        let feedrate = feedrate as f32;
        if !(feedrate.is_finite() && feedrate > 0.0) {
            return Err(MotionError::InvalidSpeed(feedrate).into());
        }
        self.pen_feedrate = feedrate;
        Ok(())
    }

    /// Command the servo, then wait for it to travel at the pen feedrate.
    fn move_pen(&mut self, degrees: u8) -> Result<()> {
        self.pen.set_position(degrees)?;
        let previous = self.pen_position.replace(degrees);

        if let Some(previous) = previous {
            let rate = self.config.pen.preset_feedrate.unwrap_or(self.pen_feedrate);
            let travel = f32::from(previous.abs_diff(degrees));
            let wait_us = travel * 1_000_000.0 / rate;
            if wait_us >= 1.0 {
                // Saturating cast; a pen never needs more than u32::MAX us.
                self.engine.delay_mut().delay_us(wait_us as u32);
            }
        }
        Ok(())
    }

    fn move_axes(&mut self, x: Option<f64>, y: Option<f64>) -> Result<MoveReport> {
        let (target_x, target_y) = self.engine.target();

        let x = self.resolve(x, target_x)?;
        let mut y = self.resolve(y, target_y)?;

        if let Some(limits) = &self.config.pen_arm.limits {
            y = limits.enforce(y)?;
        }

        self.engine.travel_to(x, y, self.effective_feedrate())
    }

    /// Target for one axis word, absolute or relative to `current`.
    fn resolve(&self, value: Option<f64>, current: Steps) -> Result<Steps> {
        let Some(value) = value else {
            return Ok(current);
        };

        let steps = self.to_steps(value)?;
        if !self.relative {
            return Ok(steps);
        }

        current
            .0
            .checked_add(steps.0)
            .filter(|target| target.unsigned_abs() <= MAX_COORDINATE_STEPS.unsigned_abs())
            .map(Steps)
            .ok_or_else(|| MotionError::CoordinateOutOfRange(value).into())
    }

    /// Scale a G-code coordinate to steps.
    fn to_steps(&self, value: f64) -> Result<Steps> {
        let scaled = round(value * f64::from(self.config.motion.zoom_factor));
        if !scaled.is_finite() || scaled.abs() > MAX_COORDINATE_STEPS as f64 {
            warn!("coordinate {} out of range", value);
            return Err(MotionError::CoordinateOutOfRange(value).into());
        }
        Ok(Steps(scaled as i64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::{AxisBuilder, AxisDriver, SimulatedActuator};
    use crate::config::LimitPolicy;
    use crate::error::{AxisError, DecodeError, Error};
    use crate::pen::SimulatedPen;
    use embedded_hal_mock::eh1::delay::NoopDelay;

    type TestPlotter =
        Plotter<AxisDriver<SimulatedActuator>, AxisDriver<SimulatedActuator>, NoopDelay, SimulatedPen>;

    fn plotter_with(config: MachineConfig) -> TestPlotter {
        let x = AxisBuilder::new()
            .actuator(SimulatedActuator::new())
            .from_axis_config(&config.rotation)
            .build()
            .unwrap();
        let y = AxisBuilder::new()
            .actuator(SimulatedActuator::new())
            .from_axis_config(&config.pen_arm)
            .build()
            .unwrap();
        Plotter::new(x, y, NoopDelay::new(), SimulatedPen::new(), config).unwrap()
    }

    fn plotter() -> TestPlotter {
        plotter_with(MachineConfig::default())
    }

    fn run(plotter: &mut TestPlotter, program: &str) -> Result<()> {
        for &byte in program.as_bytes() {
            plotter.feed(byte)?;
        }
        Ok(())
    }

    #[test]
    fn test_move_and_modal_feedrate() {
        let mut plotter = plotter();
        assert_eq!(plotter.feedrate(), StepsPerSec(400.0));

        run(&mut plotter, "G1 X100 Y20 F300\nG1 X150\n").unwrap();

        assert_eq!(plotter.feedrate(), StepsPerSec(300.0));
        assert_eq!(plotter.engine().position(), (Steps(150), Steps(20)));
    }

    #[test]
    fn test_zoom_factor_rounds() {
        let mut config = MachineConfig::default();
        config.motion.zoom_factor = 1.5;
        let mut plotter = plotter_with(config);

        run(&mut plotter, "G1 X3 Y-3\n").unwrap();
        // 4.5 rounds away from zero.
        assert_eq!(plotter.engine().position(), (Steps(5), Steps(-5)));
    }

    #[test]
    fn test_relative_mode() {
        let mut plotter = plotter();
        run(&mut plotter, "G1 X10 Y10\nG91\nG1 X5 Y-20\nG1 Y-1\n").unwrap();

        assert!(plotter.is_relative());
        assert_eq!(plotter.engine().position(), (Steps(15), Steps(-11)));

        run(&mut plotter, "G90\nG1 X0\n").unwrap();
        assert!(!plotter.is_relative());
        assert_eq!(plotter.engine().position(), (Steps(0), Steps(-11)));
    }

    #[test]
    fn test_pen_arm_clamped() {
        let mut plotter = plotter();
        run(&mut plotter, "G1 Y900\n").unwrap();
        assert_eq!(plotter.engine().position(), (Steps(0), Steps(480)));
    }

    #[test]
    fn test_pen_arm_rejected() {
        let mut config = MachineConfig::default();
        if let Some(limits) = config.pen_arm.limits.as_mut() {
            limits.policy = LimitPolicy::Reject;
        }
        let mut plotter = plotter_with(config);

        let result = run(&mut plotter, "G1 X10 Y-500\n");
        assert_eq!(
            result,
            Err(Error::Axis(AxisError::LimitExceeded {
                position: -500,
                limit: -480,
            }))
        );
        assert_eq!(plotter.engine().position(), (Steps(0), Steps(0)));
    }

    #[test]
    fn test_rotation_takes_short_way() {
        let mut plotter = plotter();
        // One revolution is 3200 steps.
        run(&mut plotter, "G92 X3100\nG1 X100\n").unwrap();

        let (engine, _) = plotter.into_parts();
        let (x, _, _) = engine.into_parts();
        assert_eq!(x.position(), Steps(100));
        assert_eq!(x.actuator().forward_steps(), 200);
    }

    #[test]
    fn test_set_position() {
        let mut plotter = plotter();
        run(&mut plotter, "G1 X40 Y30\nG92 Y0\n").unwrap();
        assert_eq!(plotter.engine().position(), (Steps(40), Steps(0)));

        run(&mut plotter, "G92\n").unwrap();
        assert_eq!(plotter.engine().position(), (Steps(0), Steps(0)));
    }

    #[test]
    fn test_pen_commands() {
        let mut plotter = plotter();
        run(&mut plotter, "M300 S130\n").unwrap();
        assert_eq!(plotter.pen().position(), Some(130));

        // Clamped to the configured range.
        run(&mut plotter, "M300 S20\n").unwrap();
        assert_eq!(plotter.pen().position(), Some(100));

        plotter.pen_up().unwrap();
        assert_eq!(plotter.pen().position(), Some(145));
        plotter.pen_down().unwrap();
        assert_eq!(plotter.pen().position(), Some(115));
    }

    #[test]
    fn test_block_delete() {
        let mut plotter = plotter();
        run(&mut plotter, "/G1 X50\n").unwrap();
        assert_eq!(plotter.engine().position(), (Steps(0), Steps(0)));

        let mut config = MachineConfig::default();
        config.motion.block_delete = false;
        let mut plotter = plotter_with(config);
        run(&mut plotter, "/G1 X50\n").unwrap();
        assert_eq!(plotter.engine().position(), (Steps(50), Steps(0)));
    }

    #[test]
    fn test_release_and_unsupported() {
        let mut plotter = plotter();
        run(&mut plotter, "G21\nM84\n(comment only)\n\n").unwrap();

        let (engine, _) = plotter.into_parts();
        let (x, y, _) = engine.into_parts();
        assert_eq!(x.actuator().releases(), 1);
        assert_eq!(y.actuator().releases(), 1);
    }

    #[test]
    fn test_bad_feedrate_keeps_previous() {
        let mut plotter = plotter();
        let result = run(&mut plotter, "G1 X10 F0\n");
        assert_eq!(result, Err(Error::Motion(MotionError::InvalidSpeed(0.0))));
        assert_eq!(plotter.feedrate(), StepsPerSec(400.0));
        assert_eq!(plotter.engine().position(), (Steps(0), Steps(0)));
    }

    #[test]
    fn test_crlf_runs_line_once() {
        let mut plotter = plotter();
        run(&mut plotter, "G91\r\nG1 X10\r\n").unwrap();
        assert_eq!(plotter.engine().position(), (Steps(10), Steps(0)));
    }

    #[test]
    fn test_huge_coordinates_rejected() {
        let mut plotter = plotter();
        run(&mut plotter, "G1 X10\n").unwrap();

        let result = run(&mut plotter, "G1 X-1e30\n");
        assert_eq!(
            result,
            Err(Error::Motion(MotionError::CoordinateOutOfRange(-1e30)))
        );
        assert_eq!(plotter.engine().position(), (Steps(10), Steps(0)));

        let result = run(&mut plotter, "G92 X-1e30\n");
        assert_eq!(
            result,
            Err(Error::Motion(MotionError::CoordinateOutOfRange(-1e30)))
        );
        run(&mut plotter, "G1 X0\n").unwrap();
        assert_eq!(plotter.engine().position(), (Steps(0), Steps(0)));

        let result = run(&mut plotter, "G1 Y1e400\n");
        assert_eq!(
            result,
            Err(Error::Motion(MotionError::CoordinateOutOfRange(f64::INFINITY)))
        );
    }

    #[test]
    fn test_relative_move_past_range_rejected() {
        let mut plotter = plotter();
        plotter
            .engine_mut()
            .set_position(Steps(MAX_COORDINATE_STEPS), Steps(0));

        let result = run(&mut plotter, "G91\nG1 X1\n");
        assert_eq!(
            result,
            Err(Error::Motion(MotionError::CoordinateOutOfRange(1.0)))
        );
        assert_eq!(
            plotter.engine().position(),
            (Steps(MAX_COORDINATE_STEPS), Steps(0))
        );
    }

    #[test]
    fn test_preset_feedrate_overrides_f() {
        let mut config = MachineConfig::default();
        config.motion.preset_feedrate = Some(StepsPerSec(250.0));
        let mut plotter = plotter_with(config);

        let report = plotter
            .execute(&Command::Move {
                x: Some(10.0),
                y: None,
                z: None,
                feedrate: Some(500.0),
            })
            .unwrap()
            .unwrap();

        assert_eq!(plotter.feedrate(), StepsPerSec(500.0));
        assert_eq!(plotter.effective_feedrate(), StepsPerSec(250.0));
        assert_eq!(report.timing.unwrap().effective_speed, StepsPerSec(250.0));
    }

    #[test]
    fn test_pen_follows_z_word() {
        let mut config = MachineConfig::default();
        config.pen.control = PenControl::ZWord;
        let mut plotter = plotter_with(config);

        run(&mut plotter, "G1 X10 Z130\n").unwrap();
        assert_eq!(plotter.pen().position(), Some(130));
        assert_eq!(plotter.engine().position(), (Steps(10), Steps(0)));

        // M300 does not move the pen in this mode.
        run(&mut plotter, "M300 S145\n").unwrap();
        assert_eq!(plotter.pen().position(), Some(130));

        // Clamped like M300.
        run(&mut plotter, "G0 Z170\n").unwrap();
        assert_eq!(plotter.pen().position(), Some(160));
    }

    #[test]
    fn test_z_word_ignored_in_m300_mode() {
        let mut plotter = plotter();
        run(&mut plotter, "G1 X5 Z150\n").unwrap();
        assert_eq!(plotter.pen().position(), None);
        assert_eq!(plotter.engine().position(), (Steps(5), Steps(0)));
    }

    /// Adds up every requested delay.
    #[derive(Default)]
    struct TotalDelay {
        ns: u64,
    }

    impl DelayNs for TotalDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.ns += u64::from(ns);
        }
    }

    fn timed_plotter(
        config: MachineConfig,
    ) -> Plotter<AxisDriver<SimulatedActuator>, AxisDriver<SimulatedActuator>, TotalDelay, SimulatedPen>
    {
        let axis = || {
            AxisBuilder::new()
                .actuator(SimulatedActuator::new())
                .build()
                .unwrap()
        };
        Plotter::new(axis(), axis(), TotalDelay::default(), SimulatedPen::new(), config).unwrap()
    }

    #[test]
    fn test_pen_waits_at_pen_feedrate() {
        let mut plotter = timed_plotter(MachineConfig::default());
        assert_eq!(plotter.pen_feedrate(), 200.0);

        for &byte in b"M300 S145\nM300 S115 F60\nM300 S100\n" {
            plotter.feed(byte).unwrap();
        }
        assert_eq!(plotter.pen_feedrate(), 60.0);
        plotter.pen_up().unwrap();

        let (mut engine, pen) = plotter.into_parts();
        assert_eq!(pen.position(), Some(145));
        // First move has no known start. Then 30, 15 and 45 degrees at 60 deg/s.
        assert_eq!(engine.delay_mut().ns, 1_500_000_000);
    }

    #[test]
    fn test_preset_pen_feedrate() {
        let mut config = MachineConfig::default();
        config.pen.preset_feedrate = Some(100.0);
        let mut plotter = timed_plotter(config);

        for &byte in b"M300 S145\nM300 S115 F60\n" {
            plotter.feed(byte).unwrap();
        }

        let (mut engine, _) = plotter.into_parts();
        assert_eq!(engine.delay_mut().ns, 300_000_000);
    }

    #[test]
    fn test_bad_pen_feedrate() {
        let mut plotter = plotter();
        let result = run(&mut plotter, "M300 S120 F-5\n");
        assert_eq!(result, Err(Error::Motion(MotionError::InvalidSpeed(-5.0))));
        assert_eq!(plotter.pen_feedrate(), 200.0);
        assert_eq!(plotter.pen().position(), None);
    }

    #[test]
    fn test_decode_error_surfaces() {
        let mut plotter = plotter();
        let result = run(&mut plotter, "G1 X?\n");
        assert_eq!(result, Err(Error::Decode(DecodeError::InvalidNumber('X'))));
    }
}
