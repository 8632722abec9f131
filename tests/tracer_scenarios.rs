//! End-to-end tracer scenarios on a simulated machine.

mod common;

use std::sync::Mutex;

use common::{run_for, run_to_completion, SimMachine, MACHINE_TOML};
use stepper_tracer::error::{DriverError, Error, MotionError, QueueError};
use stepper_tracer::{
    parse_config, ArcPlane, DelayKinematics, Enqueued, Kinematics, Line, MachineConfig, MovementRequest,
    SpeedKinematics, ToolData, TracerState, TrajectoryTracer, MOVEMENT_QUEUE_CAPACITY,
};

type Tracer<K = SpeedKinematics> = TrajectoryTracer<3, SimMachine<3>, K>;

fn config() -> MachineConfig {
    parse_config(MACHINE_TOML).expect("machine config should parse")
}

fn tracer() -> Tracer {
    TrajectoryTracer::from_config(SimMachine::default(), SpeedKinematics::new(), &config())
        .expect("tracer should build")
}

fn tracer_with<K: Kinematics<3>>(kinematics: K) -> Tracer<K> {
    TrajectoryTracer::from_config(SimMachine::default(), kinematics, &config()).expect("tracer should build")
}

fn assert_close(actual: [f32; 3], expected: [f32; 3]) {
    for (a, e) in actual.iter().zip(expected.iter()) {
        assert!((a - e).abs() < 1e-3, "{:?} != {:?}", actual, expected);
    }
}

// =============================================================================
// Reference scenarios
// =============================================================================

#[test]
fn single_axis_move_emits_every_step() {
    let mut tracer = tracer();

    let speed = tracer
        .planner()
        .compute_regulation_speed(&[10.0, 0.0, 0.0], 10.0)
        .unwrap();
    assert!((speed - 50.0).abs() < 1e-4);

    assert_eq!(tracer.line_to([10.0, 0.0, 0.0]).unwrap(), Enqueued::Queued(0));
    assert_eq!(tracer.state(), TracerState::Running);
    run_to_completion(&mut tracer);

    let hw = tracer.hardware();
    assert_eq!(hw.pulses, [1000, 0, 0]);
    assert_eq!(hw.steps, [1000, 0, 0]);
    assert_eq!(tracer.step_position(), [1000, 0, 0]);
    assert_eq!(tracer.state(), TracerState::Stopped);
    assert_eq!(tracer.underruns(), 0);
    assert!(!hw.timer && !hw.interrupt);

    // 0.05 s ramps on both ends and 0.15 s cruising, plus the window activations
    assert!(hw.elapsed_us > 200_000.0 && hw.elapsed_us < 500_000.0, "{}", hw.elapsed_us);
}

#[test]
fn diagonal_move_is_clamped_by_slow_axis() {
    let mut config = config();
    config.axes[1].max_speed.0 = 30.0;
    let mut tracer: Tracer =
        TrajectoryTracer::from_config(SimMachine::default(), SpeedKinematics::new(), &config).unwrap();

    let speed = tracer
        .planner()
        .compute_regulation_speed(&[10.0, 10.0, 0.0], libm::sqrtf(200.0))
        .unwrap();
    assert!((speed - 42.426).abs() < 0.01);

    tracer.line_to([10.0, 10.0, 0.0]).unwrap();
    run_to_completion(&mut tracer);
    assert_eq!(tracer.hardware().pulses, [1000, 1000, 0]);
}

#[test]
fn null_movement_is_a_no_op() {
    let mut tracer = tracer();
    assert_eq!(tracer.line_to([0.0, 0.0, 0.0]).unwrap(), Enqueued::NullMovement);

    assert_eq!(tracer.state(), TracerState::Stopped);
    assert_eq!(tracer.queued_movements(), 0);
    assert!(!tracer.hardware().timer);
}

#[test]
fn locked_queue_rejects_without_mutation() {
    let mut tracer = tracer();
    tracer.line_to([1.0, 0.0, 0.0]).unwrap();

    while !tracer.enqueue_unauthorised() {
        assert!(tracer.hardware().running(), "stream ended before the queue locked");
        run_for(&mut tracer, 1);
    }

    assert_eq!(
        tracer.line_to([2.0, 0.0, 0.0]),
        Err(Error::Queue(QueueError::Locked))
    );
    assert_eq!(tracer.queued_movements(), 0);
    assert_close(tracer.planned_position(), [1.0, 0.0, 0.0]);

    run_to_completion(&mut tracer);
    assert_eq!(tracer.step_position(), [100, 0, 0]);

    // Unlocked again once stopped
    assert!(!tracer.enqueue_unauthorised());
    assert!(tracer.line_to([2.0, 0.0, 0.0]).is_ok());
}

// =============================================================================
// Queue behaviour
// =============================================================================

static STARTED: Mutex<Vec<u32>> = Mutex::new(Vec::new());
static FINISHED: Mutex<Vec<u32>> = Mutex::new(Vec::new());

fn record_start(id: u32) {
    STARTED.lock().unwrap().push(id);
}

fn record_finish(id: u32) {
    FINISHED.lock().unwrap().push(id);
}

#[test]
fn movements_run_in_fifo_order_and_overflow_is_rejected() {
    let mut tracer = tracer();

    let mut expected = [0.0f32; 3];
    for i in 0..=MOVEMENT_QUEUE_CAPACITY {
        let target = if i % 2 == 0 {
            [expected[0] + 1.0, 0.5, 0.0]
        } else {
            [expected[0] + 1.0, 0.0, 0.0]
        };
        let request = MovementRequest::new(Line::new(tracer.planned_position(), target))
            .with_hooks(Some(record_start), Some(record_finish));
        assert_eq!(tracer.enqueue_movement(request).unwrap(), Enqueued::Queued(i as u32));
        expected = target;
    }
    assert_eq!(tracer.queued_movements(), MOVEMENT_QUEUE_CAPACITY);

    assert_eq!(
        tracer.line_to([0.0, 0.0, 0.0]),
        Err(Error::Queue(QueueError::Full))
    );
    assert_close(tracer.planned_position(), expected);

    run_to_completion(&mut tracer);

    let ids: Vec<u32> = (0..=MOVEMENT_QUEUE_CAPACITY as u32).collect();
    assert_eq!(*STARTED.lock().unwrap(), ids);
    assert_eq!(*FINISHED.lock().unwrap(), ids);
    assert_close(tracer.current_position(), expected);
    assert_eq!(tracer.underruns(), 0);
}

#[test]
fn late_arrival_cancels_programmed_stop() {
    let mut tracer = tracer();
    tracer.line_to([1.0, 0.0, 0.0]).unwrap();

    while tracer.state() != TracerState::StopProgrammed {
        run_for(&mut tracer, 1);
    }
    assert!(!tracer.enqueue_unauthorised());

    tracer.line_to([2.0, 0.0, 0.0]).unwrap();
    run_to_completion(&mut tracer);

    assert_eq!(tracer.step_position(), [200, 0, 0]);
    assert_eq!(tracer.hardware().pulses, [200, 0, 0]);
    assert_eq!(tracer.underruns(), 0);
}

#[test]
fn detached_movement_is_rejected_before_queueing() {
    let mut tracer = tracer();
    tracer.line_to([1.0, 0.0, 0.0]).unwrap();

    let detached = MovementRequest::new(Line::new([50.0, 0.0, 0.0], [51.0, 0.0, 0.0]));
    assert_eq!(
        tracer.enqueue_movement(detached),
        Err(Error::Motion(MotionError::DiscontinuousStart { axis: 0, offset: 4900 }))
    );
    assert_eq!(tracer.queued_movements(), 0);
    assert_close(tracer.planned_position(), [1.0, 0.0, 0.0]);

    // The running movement is not disturbed
    run_to_completion(&mut tracer);
    assert_eq!(tracer.step_position(), [100, 0, 0]);
    assert_eq!(tracer.fault(), None);
    assert_eq!(tracer.state(), TracerState::Stopped);
}

#[test]
fn arc_ending_off_its_circle_is_rejected() {
    let mut tracer = tracer();
    tracer.line_to([10.0, 0.0, 0.0]).unwrap();

    assert_eq!(
        tracer.arc_to([0.0, 14.0, 0.0], [0.0, 0.0], ArcPlane::XY, false),
        Err(Error::Motion(MotionError::InvalidArc))
    );
    assert_eq!(tracer.queued_movements(), 0);
    assert_close(tracer.planned_position(), [10.0, 0.0, 0.0]);

    run_to_completion(&mut tracer);
    assert_eq!(tracer.step_position(), [1000, 0, 0]);
}

#[test]
fn back_and_forth_returns_home() {
    let mut tracer = tracer();
    tracer.line_to([1.0, 0.3, 0.0]).unwrap();
    tracer.line_to([0.0, 0.0, 0.0]).unwrap();
    run_to_completion(&mut tracer);

    let hw = tracer.hardware();
    assert_eq!(hw.steps, [0, 0, 0]);
    assert_eq!(hw.pulses, [200, 60, 0]);
    assert!(hw.direction_changes >= 1);
}

// =============================================================================
// Trajectories and kinematics
// =============================================================================

#[test]
fn full_circle_returns_to_start_without_drift() {
    let mut tracer = tracer();
    tracer.line_to([10.0, 0.0, 0.0]).unwrap();
    tracer
        .arc_to([10.0, 0.0, 0.0], [0.0, 0.0], ArcPlane::XY, false)
        .unwrap();
    run_to_completion(&mut tracer);

    assert_eq!(tracer.step_position(), [1000, 0, 0]);
    let pulses = tracer.hardware().pulses;
    // A full turn of radius 10 sweeps 40 units on each plane axis
    assert!(pulses[0].abs_diff(5000) <= 8, "{:?}", pulses);
    assert!(pulses[1].abs_diff(4000) <= 8, "{:?}", pulses);
}

#[test]
fn helical_arc_reaches_its_end() {
    let mut tracer = tracer();
    tracer.set_position([5.0, 0.0, 0.0]).unwrap();
    tracer
        .arc_to([-5.0, 0.0, 2.0], [0.0, 0.0], ArcPlane::XY, true)
        .unwrap();
    run_to_completion(&mut tracer);

    assert_eq!(tracer.step_position(), [-500, 0, 200]);
    assert_eq!(tracer.hardware().pulses[2], 200);
}

#[test]
fn delay_kinematics_trace_the_same_steps() {
    let mut tracer = tracer_with(DelayKinematics::new());
    tracer.line_to([10.0, 0.0, 0.0]).unwrap();
    tracer.line_to([10.0, 5.0, 0.0]).unwrap();
    run_to_completion(&mut tracer);

    assert_eq!(tracer.hardware().pulses, [1000, 500, 0]);
    assert_eq!(tracer.step_position(), [1000, 500, 0]);
    assert!(tracer.hardware().elapsed_us > 200_000.0);
}

#[test]
fn speed_group_selection_changes_the_feed_rate() {
    let mut slow = tracer();
    slow.set_speed_for_group(0, 10.0).unwrap();
    slow.line_to([5.0, 0.0, 0.0]).unwrap();
    run_to_completion(&mut slow);

    let mut fast = tracer();
    fast.line_to([5.0, 0.0, 0.0]).unwrap();
    run_to_completion(&mut fast);

    assert!(slow.hardware().elapsed_us > 2.0 * fast.hardware().elapsed_us);
    assert!(fast.set_speed_group(7).is_err());
}

// =============================================================================
// Tools, telemetry and faults
// =============================================================================

#[test]
fn tool_power_follows_speed_and_stops_with_the_stream() {
    let mut tracer = tracer();
    let tools = ToolData::NONE.with_tool(0, 2.0);
    tracer.line_to_with_tools([10.0, 0.0, 0.0], tools).unwrap();
    run_to_completion(&mut tracer);

    let hw = tracer.hardware();
    // 2.0 per unit/s at a 50 units/s cruise
    assert!(hw.peak_tool_powers[0] > 90.0 && hw.peak_tool_powers[0] <= 100.01);
    assert_eq!(hw.tool_powers[0], 0.0);
    assert!(hw.stopped_tools.contains(0));
    assert_eq!(hw.peak_tool_powers[1], 0.0);
}

#[test]
fn position_is_reported_while_tracing_and_on_stop() {
    let mut tracer = tracer();
    tracer.line_to([10.0, 0.0, 0.0]).unwrap();
    run_to_completion(&mut tracer);

    let positions = &tracer.hardware().positions;
    assert!(positions.len() > 2);
    assert!(positions.windows(2).all(|w| w[0][0] <= w[1][0]));
    assert_close(*positions.last().unwrap(), [10.0, 0.0, 0.0]);
}

#[test]
fn external_stop_drops_queue_and_resyncs() {
    let mut tracer = tracer();
    tracer.line_to([10.0, 0.0, 0.0]).unwrap();
    tracer.line_to([10.0, 10.0, 0.0]).unwrap();
    run_for(&mut tracer, 500);

    tracer.stop();
    assert_eq!(tracer.state(), TracerState::Stopped);
    assert_eq!(tracer.queued_movements(), 0);
    assert!(!tracer.hardware().timer);

    let here = tracer.current_position();
    assert_eq!(tracer.planned_position(), here);
    assert_eq!(tracer.hardware().positions.last().copied(), Some(here));

    // The next movement starts where the machine stopped
    tracer.line_to([0.0, 0.0, 0.0]).unwrap();
    run_to_completion(&mut tracer);
    assert_eq!(tracer.step_position(), [0, 0, 0]);
}

#[test]
fn driver_fault_stops_the_stream() {
    let mut tracer = tracer();
    tracer.hardware_mut().fail_after = Some(50);
    tracer.line_to([10.0, 0.0, 0.0]).unwrap();
    run_to_completion(&mut tracer);

    assert_eq!(tracer.state(), TracerState::Stopped);
    assert!(matches!(tracer.fault(), Some(DriverError::StepPin(0))));
    assert_eq!(tracer.hardware().pulses[0], 50);
    assert_eq!(tracer.step_position(), [50, 0, 0]);
}
