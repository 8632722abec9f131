//! Example: Tracing a small laser engraving on a simulated board.
//!
//! This example demonstrates how to:
//! - Load the machine description from TOML
//! - Assemble a `Machine` from a timer, STEP/DIR pins, a laser and telemetry
//! - Queue lines and arcs with a feed-rate proportional laser power
//! - Drive the stepper interrupt until the stream ends
//!
//! Run with: `cargo run --example simulated_print --features std`

use stepper_tracer::{
    error::Result,
    hal::{PositionSink, StepperTimer, ToolOutputs},
    parse_config, AxisTable, ArcPlane, Machine, PinStepperDriver, Signature, SpeedKinematics, ToolData,
    TrajectoryTracer,
};

/// Mock STEP/DIR pin for demonstration.
struct MockPin;

impl embedded_hal::digital::ErrorType for MockPin {
    type Error = core::convert::Infallible;
}

impl embedded_hal::digital::OutputPin for MockPin {
    fn set_low(&mut self) -> core::result::Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> core::result::Result<(), Self::Error> {
        Ok(())
    }
}

/// Mock delay for demonstration.
struct MockDelay;

impl embedded_hal::delay::DelayNs for MockDelay {
    fn delay_ns(&mut self, _ns: u32) {
        // In real code, this would actually delay
    }
}

/// Timer that only records its period; `main` plays the interrupt.
#[derive(Default)]
struct SimulatedTimer {
    period_us: f32,
    interrupt: bool,
    running: bool,
}

impl StepperTimer for SimulatedTimer {
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
        self.running = true;
    }

    fn disable_timer(&mut self) {
        self.running = false;
    }
}

/// Laser on tool output 0.
#[derive(Default)]
struct Laser {
    power: f32,
    peak: f32,
}

impl ToolOutputs for Laser {
    fn set_power(&mut self, tool: u8, power: f32) {
        if tool == 0 {
            self.power = power;
            self.peak = self.peak.max(power);
        }
    }

    fn stop_tools(&mut self, tools: Signature) {
        if tools.contains(0) {
            self.power = 0.0;
        }
    }
}

/// Prints every position report.
struct Console;

impl PositionSink<2> for Console {
    fn send_position(&mut self, position: &[f32; 2]) {
        println!("  position: x = {:7.3}  y = {:7.3}", position[0], position[1]);
    }
}

const MACHINE: &str = r#"
[tracer]
processing_steps = 15
position_report_period = 40

[[axes]]
name = "x"
steps_per_unit = 80.0
max_speed = 120.0
max_acceleration = 1200.0
max_jerk = 3.0

[[axes]]
name = "y"
steps_per_unit = 80.0
max_speed = 120.0
max_acceleration = 1200.0
max_jerk = 3.0

[[speed_groups]]
name = "travel"
axes = [0, 1]
speed = 100.0

[[speed_groups]]
name = "engrave"
axes = [0, 1]
speed = 25.0
"#;

type Board = Machine<SimulatedTimer, PinStepperDriver<MockPin, MockPin, MockDelay, 2>, Laser, Console, MockDelay>;

fn run(tracer: &mut TrajectoryTracer<2, Board, SpeedKinematics>) -> f64 {
    let mut elapsed_us = 0.0;
    while tracer.hardware().timer.running {
        elapsed_us += f64::from(tracer.hardware().timer.period_us);
        tracer.on_interrupt();
    }
    elapsed_us
}

fn main() -> Result<()> {
    println!("=== Simulated Laser Engraving ===\n");

    let config = parse_config(MACHINE)?;
    let axes = AxisTable::<2>::from_config(&config)?;

    let driver = PinStepperDriver::new([MockPin, MockPin], [MockPin, MockPin], MockDelay).with_axis_table(&axes);
    let board = Machine::new(SimulatedTimer::default(), driver, Laser::default(), Console, MockDelay);
    let mut tracer = TrajectoryTracer::from_config(board, SpeedKinematics::new(), &config)?;

    // Rapid travel to the start of the drawing, laser off
    println!("Travel to (10, 10):");
    tracer.line_to([10.0, 10.0])?;
    let travel = run(&mut tracer);
    println!("  took {:.1} ms\n", travel / 1000.0);

    // Engrave a rounded slot: two straight edges joined by half circles
    let engrave = tracer
        .planner()
        .speed_groups()
        .iter()
        .position(|g| g.name.as_str() == "engrave")
        .unwrap_or(0) as u8;
    tracer.set_speed_group(engrave)?;
    let laser = ToolData::NONE.with_tool(0, 0.04);

    println!("Engrave slot:");
    tracer.line_to_with_tools([30.0, 10.0], laser)?;
    tracer.arc_to_with_tools([30.0, 20.0], [30.0, 15.0], ArcPlane::XY, false, laser)?;
    tracer.line_to_with_tools([10.0, 20.0], laser)?;
    tracer.arc_to_with_tools([10.0, 10.0], [10.0, 15.0], ArcPlane::XY, false, laser)?;
    let engraving = run(&mut tracer);

    println!("  took {:.1} ms", engraving / 1000.0);
    println!("  laser peak power: {:.2}", tracer.hardware().tools.peak);
    println!("  laser power after stop: {:.2}", tracer.hardware().tools.power);
    println!("  final steps: {:?}", tracer.step_position());
    println!("  underruns: {}", tracer.underruns());

    Ok(())
}
