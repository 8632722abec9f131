//! Composite hardware value.

use embedded_hal::delay::DelayNs;

use crate::error::DriverError;
use crate::motion::Signature;

use super::{PositionSink, StepperDriver, StepperTimer, ToolOutputs};

/// Bundles the separate peripherals of a board into one value implementing
/// [`MotionHardware`](super::MotionHardware).
pub struct Machine<T, D, O, P, W> {
    /// Stepper timer.
    pub timer: T,
    /// STEP/DIR driver.
    pub driver: D,
    /// Tool outputs.
    pub tools: O,
    /// Position telemetry sink.
    pub sink: P,
    /// Delay used by the stop sequence.
    pub delay: W,
}

impl<T, D, O, P, W> Machine<T, D, O, P, W> {
    /// Bundle the peripherals.
    pub fn new(timer: T, driver: D, tools: O, sink: P, delay: W) -> Self {
        Self {
            timer,
            driver,
            tools,
            sink,
            delay,
        }
    }
}

impl<T: StepperTimer, D, O, P, W> StepperTimer for Machine<T, D, O, P, W> {
    fn set_interrupt_period(&mut self, period_us: f32) {
        self.timer.set_interrupt_period(period_us);
    }

    fn enable_interrupt(&mut self) {
        self.timer.enable_interrupt();
    }

    fn disable_interrupt(&mut self) {
        self.timer.disable_interrupt();
    }

    fn interrupt_enabled(&self) -> bool {
        self.timer.interrupt_enabled()
    }

    fn enable_timer(&mut self) {
        self.timer.enable_timer();
    }

    fn disable_timer(&mut self) {
        self.timer.disable_timer();
    }
}

impl<T, D: StepperDriver, O, P, W> StepperDriver for Machine<T, D, O, P, W> {
    fn set_directions(&mut self, negative: Signature) -> Result<(), DriverError> {
        self.driver.set_directions(negative)
    }

    fn step(&mut self, axes: Signature) -> Result<(), DriverError> {
        self.driver.step(axes)
    }
}

impl<T, D, O: ToolOutputs, P, W> ToolOutputs for Machine<T, D, O, P, W> {
    fn set_power(&mut self, tool: u8, power: f32) {
        self.tools.set_power(tool, power);
    }

    fn stop_tools(&mut self, tools: Signature) {
        self.tools.stop_tools(tools);
    }
}

impl<const N: usize, T, D, O, P: PositionSink<N>, W> PositionSink<N> for Machine<T, D, O, P, W> {
    fn send_position(&mut self, position: &[f32; N]) {
        self.sink.send_position(position);
    }
}

impl<T, D, O, P, W: DelayNs> DelayNs for Machine<T, D, O, P, W> {
    fn delay_ns(&mut self, ns: u32) {
        self.delay.delay_ns(ns);
    }
}

/// Tool outputs for machines without tools.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTools;

impl ToolOutputs for NoTools {
    fn set_power(&mut self, _tool: u8, _power: f32) {}

    fn stop_tools(&mut self, _tools: Signature) {}
}

/// Position sink that drops every report.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTelemetry;

impl<const N: usize> PositionSink<N> for NoTelemetry {
    fn send_position(&mut self, _position: &[f32; N]) {}
}
