//! Error types for stepper-tracer.
//!
//! Provides unified error handling across configuration, movement queueing,
//! motion planning and the stepper driver.

use core::fmt;

/// Result type alias using the library's Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for all stepper-tracer operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Configuration parsing or validation error
    Config(ConfigError),
    /// Movement or sub-movement queue error
    Queue(QueueError),
    /// Motion planning error
    Motion(MotionError),
    /// Stepper driver (pin) error
    Driver(DriverError),
}

/// Configuration-related errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Failed to parse TOML configuration
    ParseError(heapless::String<128>),
    /// Configuration declares a different number of axes than the engine
    AxisCountMismatch {
        /// Axis count the engine was built for
        expected: usize,
        /// Axis count found in the configuration
        found: usize,
    },
    /// Steps per unit must be > 0
    InvalidStepsPerUnit(f32),
    /// Max speed must be > 0
    InvalidMaxSpeed(f32),
    /// Max acceleration must be > 0
    InvalidMaxAcceleration(f32),
    /// Max jerk must be >= 0
    InvalidMaxJerk(f32),
    /// Processing steps must be in 1..=255
    InvalidProcessingSteps(u8),
    /// A speed group has no axis
    EmptySpeedGroup(heapless::String<32>),
    /// A speed group references an axis index that does not exist
    SpeedGroupAxisOutOfRange {
        /// Speed group name
        group: heapless::String<32>,
        /// Offending axis index
        axis: u8,
    },
    /// Speed group target speed must be > 0
    InvalidGroupSpeed(f32),
    /// No speed group is configured
    NoSpeedGroups,
    /// More speed groups than the planner can hold
    TooManySpeedGroups,
    /// The default speed group index does not exist
    UnknownDefaultSpeedGroup(u8),
    /// File I/O error (std only)
    #[cfg(feature = "std")]
    IoError(heapless::String<128>),
}

/// Movement queue errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    /// The queue has no free slot
    Full,
    /// Enqueueing is locked while the stream is being stopped
    Locked,
    /// The queue holds no element
    Empty,
}

/// Motion planning errors.
#[derive(Debug, Clone, PartialEq)]
pub enum MotionError {
    /// No speed group covers any axis moving during the movement
    NoSpeedGroup,
    /// The trajectory parameter increment is not finite and positive
    InvalidIncrement(f32),
    /// The trajectory parameter bounds are empty or not finite
    InvalidBounds {
        /// Lower bound
        min: f32,
        /// Upper bound
        max: f32,
    },
    /// A sub-movement would need more steps per axis than one window holds
    DistanceOverflow(u32),
    /// The movement would need infinite or zero speed
    InvalidSpeed(f32),
    /// The tracer could not start because no movement is queued
    NothingToTrace,
    /// The arc geometry is degenerate (zero radius, bad plane)
    InvalidArc,
    /// The speed group index does not exist
    UnknownSpeedGroup(u8),
    /// The operation requires a stopped tracer
    TracerRunning,
    /// The movement does not start where the previous one ends
    DiscontinuousStart {
        /// First axis off the planned position
        axis: u8,
        /// Step offset on that axis
        offset: i32,
    },
}

/// Stepper driver errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverError {
    /// STEP pin operation failed
    StepPin(u8),
    /// DIR pin operation failed
    DirectionPin(u8),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "Configuration error: {}", e),
            Error::Queue(e) => write!(f, "Queue error: {}", e),
            Error::Motion(e) => write!(f, "Motion error: {}", e),
            Error::Driver(e) => write!(f, "Driver error: {}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::AxisCountMismatch { expected, found } => {
                write!(f, "Expected {} axes, configuration declares {}", expected, found)
            }
            ConfigError::InvalidStepsPerUnit(v) => write!(f, "Invalid steps per unit: {}. Must be > 0", v),
            ConfigError::InvalidMaxSpeed(v) => write!(f, "Invalid max speed: {}. Must be > 0", v),
            ConfigError::InvalidMaxAcceleration(v) => write!(f, "Invalid max acceleration: {}. Must be > 0", v),
            ConfigError::InvalidMaxJerk(v) => write!(f, "Invalid max jerk: {}. Must be >= 0", v),
            ConfigError::InvalidProcessingSteps(v) => {
                write!(f, "Invalid processing steps: {}. Must be 1-255", v)
            }
            ConfigError::EmptySpeedGroup(name) => write!(f, "Speed group '{}' has no axis", name),
            ConfigError::SpeedGroupAxisOutOfRange { group, axis } => {
                write!(f, "Speed group '{}' references unknown axis {}", group, axis)
            }
            ConfigError::InvalidGroupSpeed(v) => write!(f, "Invalid speed group speed: {}. Must be > 0", v),
            ConfigError::NoSpeedGroups => write!(f, "At least one speed group is required"),
            ConfigError::TooManySpeedGroups => write!(f, "Too many speed groups"),
            ConfigError::UnknownDefaultSpeedGroup(g) => write!(f, "Default speed group {} does not exist", g),
            #[cfg(feature = "std")]
            ConfigError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl fmt::Display for QueueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueError::Full => write!(f, "Queue is full"),
            QueueError::Locked => write!(f, "Movement queue is locked while the stream stops"),
            QueueError::Empty => write!(f, "Queue is empty"),
        }
    }
}

impl fmt::Display for MotionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotionError::NoSpeedGroup => write!(f, "No speed group covers the moving axes"),
            MotionError::InvalidIncrement(v) => write!(f, "Invalid trajectory increment {}", v),
            MotionError::InvalidBounds { min, max } => {
                write!(f, "Invalid trajectory bounds [{}, {}]", min, max)
            }
            MotionError::DistanceOverflow(d) => {
                write!(f, "Sub-movement distance {} exceeds the 255 steps window limit", d)
            }
            MotionError::InvalidSpeed(v) => write!(f, "Invalid regulation speed {}", v),
            MotionError::NothingToTrace => write!(f, "No movement is queued"),
            MotionError::InvalidArc => write!(f, "Degenerate arc geometry"),
            MotionError::UnknownSpeedGroup(g) => write!(f, "Unknown speed group {}", g),
            MotionError::TracerRunning => write!(f, "The tracer is running"),
            MotionError::DiscontinuousStart { axis, offset } => write!(
                f,
                "Movement starts {} steps away from the planned position on axis {}",
                offset, axis
            ),
        }
    }
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverError::StepPin(axis) => write!(f, "STEP pin of axis {} failed", axis),
            DriverError::DirectionPin(axis) => write!(f, "DIR pin of axis {} failed", axis),
        }
    }
}

// Conversion impls
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<QueueError> for Error {
    fn from(e: QueueError) -> Self {
        Error::Queue(e)
    }
}

impl From<MotionError> for Error {
    fn from(e: MotionError) -> Self {
        Error::Motion(e)
    }
}

impl From<DriverError> for Error {
    fn from(e: DriverError) -> Self {
        Error::Driver(e)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(feature = "std")]
impl std::error::Error for QueueError {}

#[cfg(feature = "std")]
impl std::error::Error for MotionError {}

#[cfg(feature = "std")]
impl std::error::Error for DriverError {}
