//! Simulated machine shared by the integration tests.

#![allow(dead_code)]

use embedded_hal::delay::DelayNs;
use stepper_tracer::error::DriverError;
use stepper_tracer::hal::{PositionSink, StepperDriver, StepperTimer, ToolOutputs};
use stepper_tracer::{Kinematics, Signature, TrajectoryTracer};

/// Hardware double recording everything the tracer drives.
#[derive(Debug, Clone)]
pub struct SimMachine<const N: usize> {
    pub interrupt: bool,
    pub timer: bool,
    pub period_us: f32,

    /// Pulses per axis.
    pub pulses: [u32; N],
    /// Net steps per axis, signed by the latched direction.
    pub steps: [i64; N],
    pub directions: Signature,
    pub direction_changes: u32,

    /// Time elapsed, summing the period of every interrupt.
    pub elapsed_us: f64,
    pub interrupts: u64,

    pub tool_powers: [f32; 4],
    pub peak_tool_powers: [f32; 4],
    pub stopped_tools: Signature,

    pub positions: Vec<[f32; N]>,

    /// Fail the STEP output after this many pulses.
    pub fail_after: Option<u32>,
}

impl<const N: usize> Default for SimMachine<N> {
    fn default() -> Self {
        Self {
            interrupt: false,
            timer: false,
            period_us: 0.0,
            pulses: [0; N],
            steps: [0; N],
            directions: Signature::EMPTY,
            direction_changes: 0,
            elapsed_us: 0.0,
            interrupts: 0,
            tool_powers: [0.0; 4],
            peak_tool_powers: [0.0; 4],
            stopped_tools: Signature::EMPTY,
            positions: Vec::new(),
            fail_after: None,
        }
    }
}

impl<const N: usize> SimMachine<N> {
    pub fn running(&self) -> bool {
        self.timer && self.interrupt
    }

    pub fn total_pulses(&self) -> u32 {
        self.pulses.iter().sum()
    }
}

impl<const N: usize> StepperTimer for SimMachine<N> {
    fn set_interrupt_period(&mut self, period_us: f32) {
        self.period_us = period_us;
    }

    fn enable_interrupt(&mut self) {
        self.interrupt = true;
    }

    fn disable_interrupt(&mut self) {
        self.interrupt = false;
    }

    fn interrupt_enabled(&self) -> bool {
        self.interrupt
    }

    fn enable_timer(&mut self) {
        self.timer = true;
    }

    fn disable_timer(&mut self) {
        self.timer = false;
    }
}

impl<const N: usize> StepperDriver for SimMachine<N> {
    fn set_directions(&mut self, negative: Signature) -> Result<(), DriverError> {
        if negative != self.directions {
            self.direction_changes += 1;
        }
        self.directions = negative;
        Ok(())
    }

    fn step(&mut self, axes: Signature) -> Result<(), DriverError> {
        if let Some(limit) = self.fail_after {
            if self.total_pulses() >= limit {
                return Err(DriverError::StepPin(axes.axes().next().unwrap_or(0) as u8));
            }
        }
        for axis in axes.axes() {
            self.pulses[axis] += 1;
            self.steps[axis] += if self.directions.contains(axis) { -1 } else { 1 };
        }
        Ok(())
    }
}

impl<const N: usize> ToolOutputs for SimMachine<N> {
    fn set_power(&mut self, tool: u8, power: f32) {
        let tool = usize::from(tool);
        self.tool_powers[tool] = power;
        self.peak_tool_powers[tool] = self.peak_tool_powers[tool].max(power);
    }

    fn stop_tools(&mut self, tools: Signature) {
        self.stopped_tools |= tools;
        for tool in tools.axes() {
            self.tool_powers[tool] = 0.0;
        }
    }
}

impl<const N: usize> PositionSink<N> for SimMachine<N> {
    fn send_position(&mut self, position: &[f32; N]) {
        self.positions.push(*position);
    }
}

impl<const N: usize> DelayNs for SimMachine<N> {
    fn delay_ns(&mut self, _ns: u32) {}
}

/// Fire the stepper interrupt until the tracer stops the timer.
///
/// Returns the number of interrupts run.
pub fn run_to_completion<const N: usize, K: Kinematics<N>>(
    tracer: &mut TrajectoryTracer<N, SimMachine<N>, K>,
) -> u64 {
    run_for(tracer, u64::MAX)
}

/// Fire at most `limit` interrupts.
pub fn run_for<const N: usize, K: Kinematics<N>>(
    tracer: &mut TrajectoryTracer<N, SimMachine<N>, K>,
    limit: u64,
) -> u64 {
    let mut count = 0;
    while tracer.hardware().running() && count < limit {
        let period = f64::from(tracer.hardware().period_us);
        let hw = tracer.hardware_mut();
        hw.elapsed_us += period;
        hw.interrupts += 1;

        tracer.on_interrupt();
        count += 1;
        assert!(count < 50_000_000, "tracer never stopped");
    }
    count
}

/// Three-axis machine: 100 steps per unit, 200 units/s, 1000 units/s²,
/// an XY group at 50 units/s and a Z group at 10 units/s.
pub const MACHINE_TOML: &str = r#"
[tracer]
processing_steps = 7
position_report_period = 5

[[axes]]
name = "x"
steps_per_unit = 100.0
max_speed = 200.0
max_acceleration = 1000.0
max_jerk = 5.0

[[axes]]
name = "y"
steps_per_unit = 100.0
max_speed = 200.0
max_acceleration = 1000.0
max_jerk = 5.0

[[axes]]
name = "z"
steps_per_unit = 100.0
max_speed = 200.0
max_acceleration = 1000.0
max_jerk = 5.0

[[speed_groups]]
name = "xy"
axes = [0, 1]
speed = 50.0

[[speed_groups]]
name = "z"
axes = [2]
speed = 10.0
"#;
