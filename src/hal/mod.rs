//! Hardware boundary of the tracer.
//!
//! The tracer never touches registers. It drives the machine through the
//! traits below, which a board support crate implements on top of its
//! timer, GPIO and PWM peripherals. [`PinStepperDriver`] and [`Machine`]
//! cover the common case of `embedded-hal` STEP/DIR pins.

mod critical;
mod machine;
mod pins;

use embedded_hal::delay::DelayNs;

use crate::error::DriverError;
use crate::motion::Signature;

pub use critical::CriticalSection;
pub use machine::{Machine, NoTelemetry, NoTools};
pub use pins::{PinStepperDriver, DEFAULT_DIRECTION_SETTLE_NS, DEFAULT_PULSE_WIDTH_NS};

/// The periodic timer whose interrupt runs the stepping routine.
pub trait StepperTimer {
    /// Set the interrupt period in microseconds.
    fn set_interrupt_period(&mut self, period_us: f32);

    /// Unmask the stepper interrupt.
    fn enable_interrupt(&mut self);

    /// Mask the stepper interrupt.
    fn disable_interrupt(&mut self);

    /// Check whether the stepper interrupt is unmasked.
    fn interrupt_enabled(&self) -> bool;

    /// Start the timer.
    fn enable_timer(&mut self);

    /// Stop the timer.
    fn disable_timer(&mut self);
}

/// STEP/DIR outputs of all axes.
pub trait StepperDriver {
    /// Latch directions. Axes set in `negative` move toward negative
    /// positions.
    fn set_directions(&mut self, negative: Signature) -> Result<(), DriverError>;

    /// Emit one pulse on every axis set in `axes`.
    fn step(&mut self, axes: Signature) -> Result<(), DriverError>;
}

/// Continuous actions (spindle, laser, extruder heater fan...) whose power
/// follows the feed rate.
pub trait ToolOutputs {
    /// Set the power of one tool.
    fn set_power(&mut self, tool: u8, power: f32);

    /// Switch off every tool set in `tools`.
    fn stop_tools(&mut self, tools: Signature);
}

/// Receiver of position telemetry.
pub trait PositionSink<const N: usize> {
    /// Report the current position in units.
    fn send_position(&mut self, position: &[f32; N]);
}

/// Everything the tracer needs from the machine, as one bound.
pub trait MotionHardware<const N: usize>:
    StepperTimer + StepperDriver + ToolOutputs + PositionSink<N> + DelayNs
{
}

impl<const N: usize, T> MotionHardware<N> for T where
    T: StepperTimer + StepperDriver + ToolOutputs + PositionSink<N> + DelayNs
{
}
