//! Error types for spherebot-motion.
//!
//! Provides unified error handling across configuration, axis hardware, motion
//! planning, command decoding and settings persistence.

use core::fmt;

/// Result type alias using the library's Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for all spherebot-motion operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Configuration parsing or validation error
    Config(ConfigError),
    /// Axis hardware or limit error
    Axis(AxisError),
    /// Motion request error
    Motion(MotionError),
    /// Command decoding error
    Decode(DecodeError),
    /// Persistent settings error
    Storage(StorageError),
}

/// Configuration-related errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Failed to parse TOML configuration
    ParseError(heapless::String<128>),
    /// Invalid microstep value (must be power of 2: 1, 2, 4, 8, 16, 32, 64, 128, 256)
    InvalidMicrosteps(u16),
    /// Steps per revolution must be non-zero
    InvalidStepsPerRevolution(u16),
    /// Feedrate must be finite and > 0
    InvalidFeedrate(f32),
    /// Zoom factor must be finite and > 0
    InvalidZoomFactor(f32),
    /// Invalid step limits (min must be < max)
    InvalidStepLimits {
        /// Minimum limit value
        min: i64,
        /// Maximum limit value
        max: i64,
    },
    /// Invalid pen servo range (min must be < max, max <= 180)
    InvalidPenRange {
        /// Minimum servo position
        min: u8,
        /// Maximum servo position
        max: u8,
    },
    /// Pen preset lies outside the servo range
    PenPresetOutOfRange {
        /// Preset position
        position: u8,
        /// Minimum servo position
        min: u8,
        /// Maximum servo position
        max: u8,
    },
    /// File I/O error (std only)
    #[cfg(feature = "std")]
    IoError(heapless::String<128>),
}

/// Axis hardware errors.
#[derive(Debug, Clone, PartialEq)]
pub enum AxisError {
    /// Pin operation failed
    PinError,
    /// Target exceeds a reject-policy limit
    LimitExceeded {
        /// Requested position in steps
        position: i64,
        /// Limit that was exceeded (min or max)
        limit: i64,
    },
}

/// Motion request errors.
#[derive(Debug, Clone, PartialEq)]
pub enum MotionError {
    /// Requested speed is not finite or not positive
    InvalidSpeed(f32),
    /// Coordinate is not finite or scales beyond the addressable step range
    CoordinateOutOfRange(f64),
    /// Distance to the target does not fit the step counters
    DistanceOutOfRange,
}

/// Command decoding errors.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeError {
    /// Line exceeded the buffer capacity and was discarded
    LineOverflow {
        /// Buffer capacity in bytes
        capacity: usize,
    },
    /// Text after a word letter is not a decimal number
    InvalidNumber(char),
    /// A required word is missing from the block
    MissingWord(char),
}

/// Persistent settings errors.
#[derive(Debug, Clone, PartialEq)]
pub enum StorageError {
    /// Access past the end of the store
    OutOfBounds {
        /// First address of the access
        address: usize,
        /// Access length in bytes
        len: usize,
        /// Store capacity in bytes
        capacity: usize,
    },
    /// Stored record signature does not match
    BadSignature {
        /// Signature found in the store
        found: u16,
        /// Expected signature
        expected: u16,
    },
    /// Underlying memory reported a failure
    DeviceError,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "Configuration error: {}", e),
            Error::Axis(e) => write!(f, "Axis error: {}", e),
            Error::Motion(e) => write!(f, "Motion error: {}", e),
            Error::Decode(e) => write!(f, "Decode error: {}", e),
            Error::Storage(e) => write!(f, "Storage error: {}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::InvalidMicrosteps(v) => {
                write!(f, "Invalid microsteps: {}. Valid values: 1, 2, 4, 8, 16, 32, 64, 128, 256", v)
            }
            ConfigError::InvalidStepsPerRevolution(v) => {
                write!(f, "Invalid steps per revolution: {}. Must be > 0", v)
            }
            ConfigError::InvalidFeedrate(v) => write!(f, "Invalid feedrate: {}. Must be > 0", v),
            ConfigError::InvalidZoomFactor(v) => write!(f, "Invalid zoom factor: {}. Must be > 0", v),
            ConfigError::InvalidStepLimits { min, max } => {
                write!(f, "Invalid step limits: min ({}) must be < max ({})", min, max)
            }
            ConfigError::InvalidPenRange { min, max } => {
                write!(f, "Invalid pen range: min ({}) must be < max ({}) <= 180", min, max)
            }
            ConfigError::PenPresetOutOfRange { position, min, max } => {
                write!(f, "Pen preset {} outside range [{}, {}]", position, min, max)
            }
            #[cfg(feature = "std")]
            ConfigError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl fmt::Display for AxisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AxisError::PinError => write!(f, "GPIO pin operation failed"),
            AxisError::LimitExceeded { position, limit } => {
                write!(f, "Position {} exceeds limit {}", position, limit)
            }
        }
    }
}

impl fmt::Display for MotionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotionError::InvalidSpeed(v) => {
                write!(f, "Invalid speed {} steps/s. Must be finite and > 0", v)
            }
            MotionError::CoordinateOutOfRange(v) => {
                write!(f, "Coordinate {} is outside the addressable step range", v)
            }
            MotionError::DistanceOutOfRange => {
                write!(f, "Move distance exceeds the step counter range")
            }
        }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::LineOverflow { capacity } => {
                write!(f, "Line longer than {} bytes discarded", capacity)
            }
            DecodeError::InvalidNumber(letter) => {
                write!(f, "Value after '{}' is not a number", letter)
            }
            DecodeError::MissingWord(letter) => write!(f, "Missing '{}' word", letter),
        }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::OutOfBounds { address, len, capacity } => write!(
                f,
                "Access of {} bytes at {} exceeds capacity {}",
                len, address, capacity
            ),
            StorageError::BadSignature { found, expected } => write!(
                f,
                "Settings signature {:#06x} does not match {:#06x}",
                found, expected
            ),
            StorageError::DeviceError => write!(f, "Non-volatile memory operation failed"),
        }
    }
}

// Conversion impls
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<AxisError> for Error {
    fn from(e: AxisError) -> Self {
        Error::Axis(e)
    }
}

impl From<MotionError> for Error {
    fn from(e: MotionError) -> Self {
        Error::Motion(e)
    }
}

impl From<DecodeError> for Error {
    fn from(e: DecodeError) -> Self {
        Error::Decode(e)
    }
}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Error::Storage(e)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(feature = "std")]
impl std::error::Error for AxisError {}

#[cfg(feature = "std")]
impl std::error::Error for MotionError {}

#[cfg(feature = "std")]
impl std::error::Error for DecodeError {}

#[cfg(feature = "std")]
impl std::error::Error for StorageError {}
