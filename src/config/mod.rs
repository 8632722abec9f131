//! Configuration module for stepper-tracer.
//!
//! Provides types for loading and validating the machine configuration
//! (axes, speed groups and tracer settings) from TOML files (with `std`
//! feature) or pre-built data.

mod axis;
mod constraints;
mod machine;
mod speed_group;
pub mod units;
#[cfg(feature = "std")]
mod loader;
mod validation;

/// Maximum number of axes a configuration can declare.
pub const MAX_AXES: usize = 16;

/// Maximum number of speed groups a configuration can declare.
pub const MAX_SPEED_GROUPS: usize = 4;

pub use axis::AxisConfig;
pub use constraints::{AxisConstraints, AxisTable};
pub use machine::{MachineConfig, TracerConfig};
pub use speed_group::SpeedGroupConfig;
pub use validation::validate_config;

#[cfg(feature = "std")]
pub use loader::{load_config, parse_config};

// Re-export unit types at config level
pub use units::{ProcessingSteps, UnitsPerSec, UnitsPerSecSquared};
