//! Interpretation of a block as a plotter command.
//!
//! Only the handful of words a sphere plotter understands. No expressions,
//! no arcs, no modal groups beyond distance mode.

use crate::error::DecodeError;

use super::block::Block;

/// A decoded plotter command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Nothing but comments or whitespace.
    Empty,

    /// `G0`/`G1`: straight move. Absent axes keep their target.
    Move {
        /// Target on the rotation axis.
        x: Option<f64>,
        /// Target on the pen-arm axis.
        y: Option<f64>,
        /// Pen servo position, used when the pen follows `Z`.
        z: Option<f64>,
        /// Feedrate in steps per second, modal.
        feedrate: Option<f64>,
    },

    /// `G4 P<ms>`: dwell.
    Dwell {
        /// Pause in milliseconds.
        millis: u32,
    },

    /// `G90`: absolute coordinates.
    Absolute,

    /// `G91`: relative coordinates.
    Relative,

    /// `G92`: redefine the current position. An absent axis keeps its
    /// position, a bare `G92` zeroes both.
    SetPosition {
        /// New rotation axis position.
        x: Option<f64>,
        /// New pen-arm axis position.
        y: Option<f64>,
    },

    /// `M18`/`M84`: de-energize the motors.
    ReleaseMotors,

    /// `M300 S<pos> [F<deg/s>]`: move the pen servo.
    Pen {
        /// Servo position in degrees.
        position: f64,
        /// Pen feedrate in degrees per second, modal.
        feedrate: Option<f64>,
    },

    /// Anything else, ignored by the plotter.
    Unsupported {
        /// Command letter (`G`, `M`, or the first letter of the code).
        letter: char,
        /// Command number, if it was an integer.
        number: Option<u32>,
    },
}

impl Command {
    /// Decode a block.
    ///
    /// A `G` word takes precedence over an `M` word on the same line.
    ///
    /// # Errors
    ///
    /// Returns `InvalidNumber` for a malformed value and `MissingWord` when a
    /// command lacks a required argument (`P` for `G4`, `S` for `M300`).
    pub fn from_block(block: &Block) -> Result<Self, DecodeError> {
        if block.is_empty() {
            return Ok(Command::Empty);
        }

        if let Some(g) = block.value('G')? {
            return Self::from_g(block, g);
        }

        if let Some(m) = block.value('M')? {
            return Self::from_m(block, m);
        }

        let letter = block
            .code()
            .chars()
            .find(|c| c.is_ascii_alphabetic())
            .unwrap_or('?');

        Ok(Command::Unsupported {
            letter,
            number: None,
        })
    }

    fn from_g(block: &Block, value: f64) -> Result<Self, DecodeError> {
        let number = command_number(value);

        let command = match number {
            Some(0) | Some(1) => Command::Move {
                x: block.value('X')?,
                y: block.value('Y')?,
                z: block.value('Z')?,
                feedrate: block.value('F')?,
            },
            Some(4) => {
                let millis = block.value('P')?.ok_or(DecodeError::MissingWord('P'))?;
                Command::Dwell {
                    // Saturating cast, negative waits are no wait.
                    millis: millis as u32,
                }
            }
            Some(90) => Command::Absolute,
            Some(91) => Command::Relative,
            Some(92) => Command::SetPosition {
                x: block.value('X')?,
                y: block.value('Y')?,
            },
            _ => Command::Unsupported {
                letter: 'G',
                number,
            },
        };

        Ok(command)
    }

    fn from_m(block: &Block, value: f64) -> Result<Self, DecodeError> {
        let number = command_number(value);

        let command = match number {
            Some(18) | Some(84) => Command::ReleaseMotors,
            Some(300) => Command::Pen {
                position: block.value('S')?.ok_or(DecodeError::MissingWord('S'))?,
                feedrate: block.value('F')?,
            },
            _ => Command::Unsupported {
                letter: 'M',
                number,
            },
        };

        Ok(command)
    }
}

/// Whole non-negative command numbers only; `G1.5` has none.
fn command_number(value: f64) -> Option<u32> {
    let whole = value as u32;
    (value >= 0.0 && f64::from(whole) == value).then_some(whole)
}
