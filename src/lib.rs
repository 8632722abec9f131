//! # stepper-tracer
//!
//! Interrupt-driven multi-axis stepper trajectory tracer with speed and jerk
//! planning, on top of embedded-hal 1.0.
//!
//! ## Features
//!
//! - **Trajectory tracing**: Lines and circular/helical arcs sampled into
//!   short sub-movements, with no step drift
//! - **Speed groups**: Feed rates projected onto the moving axes and clamped
//!   to every axis' maximum speed
//! - **Jerk-limited junctions**: Consecutive movements linked at the highest
//!   speed each axis tolerates
//! - **Even pulse spreading**: A binary step encoder interleaves the axes
//!   of each window
//! - **Pluggable time functions**: Speed-integrating or step-delay kinematics
//! - **no_std compatible**: Fixed-capacity queues, no allocation
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stepper_tracer::{load_config, Machine, SpeedKinematics, TrajectoryTracer};
//!
//! // Load configuration from TOML
//! let config = load_config("machine.toml")?;
//!
//! let machine = Machine::new(timer, driver, tools, telemetry, delay);
//! let mut tracer = TrajectoryTracer::<3, _, _>::from_config(machine, SpeedKinematics::new(), &config)?;
//!
//! // Queue movements from the foreground
//! tracer.line_to([10.0, 0.0, 0.0])?;
//! tracer.arc_to([0.0, 10.0, 0.0], [0.0, 0.0], ArcPlane::XY, false)?;
//!
//! // ... and run the stepper interrupt
//! tracer.on_interrupt();
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): Enables file I/O and TOML parsing
//! - `alloc`: Enables heap allocation for no_std with allocator
//! - `defmt`: Enables defmt logging for embedded targets
//! - `log`: Enables logging through the `log` facade on hosts

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]
// Allow large error types - necessary for no_std with heapless strings
#![allow(clippy::result_large_err)]

#[cfg(feature = "alloc")]
extern crate alloc;

// Must come first: the logging macros are textually scoped
#[macro_use]
mod fmt;

// Core modules
pub mod config;
pub mod error;
pub mod hal;
pub mod kinematics;
pub mod motion;
pub mod planner;
pub mod ring;
pub mod tracer;
pub mod trajectory;

// Re-exports for ergonomic API
pub use config::{validate_config, AxisConfig, AxisTable, MachineConfig, SpeedGroupConfig, TracerConfig};
pub use error::{Error, Result};
pub use hal::{Machine, MotionHardware, NoTelemetry, NoTools, PinStepperDriver};
pub use kinematics::{DelayKinematics, Kinematics, SpeedKinematics};
pub use motion::{MovementRequest, Signature, StepPattern, ToolData};
pub use planner::SpeedPlanner;
pub use tracer::{Enqueued, TracerState, TrajectoryTracer, MOVEMENT_QUEUE_CAPACITY};
pub use trajectory::{Arc, ArcPlane, Line, Path, Trajectory};

// Configuration loading (std only)
#[cfg(feature = "std")]
pub use config::{load_config, parse_config};

// Unit types
pub use config::units::{ProcessingSteps, UnitsPerSec, UnitsPerSecSquared};
