//! The trajectory tracer: movement queue, producer API and window pipeline.

use crate::config::{validate_config, AxisTable, MachineConfig, ProcessingSteps, TracerConfig};
use crate::error::{DriverError, Error, MotionError, QueueError, Result};
use crate::hal::{CriticalSection, MotionHardware};
use crate::kinematics::{Kinematics, IDLE_WINDOW_US};
use crate::motion::{
    compute_increments, MovementDescriptor, MovementHook, MovementRequest, StepPattern, SubMovementManager,
    ToolData, LOOKAHEAD_CAPACITY,
};
use crate::planner::{JerkLink, JerkPlanner, SpeedPlanner};
use crate::ring::RingBuffer;
use crate::trajectory::{norm, Arc, ArcPlane, Line, Trajectory};

use super::state::{Handler, TracerState};
use super::tools;
use super::{Enqueued, MOVEMENT_QUEUE_CAPACITY};

/// Movements bound for pre-processing but not executing yet.
const SWITCH_CAPACITY: usize = 4;

/// Period of the interrupt that activates the first window.
const FIRST_INTERRUPT_US: f32 = 10.0;

/// A movement waiting for the interrupt to reach its first sub-movement.
#[derive(Debug, Clone, Copy)]
pub(super) struct PendingSwitch<const N: usize> {
    /// Sub-movements of earlier movements left before this one starts.
    pub(super) countdown: u8,
    pub(super) movement: MovementDescriptor<N>,
}

/// Multi-axis trajectory tracer.
///
/// Owns the movement queue, the planners, the sub-movement pipeline and the
/// machine. The foreground calls [`enqueue_movement`](Self::enqueue_movement)
/// (or [`line_to`](Self::line_to) / [`arc_to`](Self::arc_to)); the stepper
/// interrupt calls [`on_interrupt`](Self::on_interrupt), which alternates
/// between preparing a window and emitting its pulses.
///
/// # Example
///
/// ```rust,ignore
/// use stepper_tracer::{load_config, SpeedKinematics, TrajectoryTracer};
///
/// let config = load_config("machine.toml")?;
/// let mut tracer = TrajectoryTracer::<3, _, _>::from_config(machine, SpeedKinematics::new(), &config)?;
///
/// tracer.line_to([10.0, 0.0, 0.0])?;
///
/// // From the timer interrupt:
/// tracer.on_interrupt();
/// ```
pub struct TrajectoryTracer<const N: usize, H, K>
where
    H: MotionHardware<N>,
    K: Kinematics<N>,
{
    pub(super) hw: H,
    pub(super) kinematics: K,
    pub(super) planner: SpeedPlanner<N>,
    pub(super) jerk: JerkPlanner<N>,
    pub(super) axes: AxisTable<N>,
    pub(super) processing_steps: ProcessingSteps,

    pub(super) queue: RingBuffer<MovementDescriptor<N>, MOVEMENT_QUEUE_CAPACITY>,
    pub(super) switches: RingBuffer<PendingSwitch<N>, SWITCH_CAPACITY>,
    pub(super) executing: Option<MovementDescriptor<N>>,
    pub(super) sub: SubMovementManager<N>,

    pub(super) state: TracerState,
    pub(super) locked: bool,
    pub(super) handler: Handler,

    /// Window whose pulses are being emitted.
    pub(super) current: StepPattern,
    /// Window prepared for the next activation.
    pub(super) next: StepPattern,
    pub(super) next_delay: f32,
    /// Pulse period of `current`, in µs.
    pub(super) delay_us: f32,
    pub(super) pulses_remaining: u16,

    pub(super) finalise: Option<(MovementHook, u32)>,
    pub(super) current_tools: ToolData,

    /// End of the last queued movement, in units.
    pub(super) planned_position: [f32; N],
    /// Steps actually emitted.
    pub(super) step_position: [i32; N],

    pub(super) report_countdown: u16,
    pub(super) position_report_period: u16,
    pub(super) underruns: u32,
    pub(super) fault: Option<DriverError>,
    pub(super) next_id: u32,
}

impl<const N: usize, H, K> TrajectoryTracer<N, H, K>
where
    H: MotionHardware<N>,
    K: Kinematics<N>,
{
    /// Create a stopped tracer at the origin.
    pub fn new(hw: H, kinematics: K, planner: SpeedPlanner<N>, settings: &TracerConfig) -> Self {
        let axes = *planner.axes();
        Self {
            hw,
            kinematics,
            jerk: JerkPlanner::new(&axes),
            sub: SubMovementManager::new(&axes, settings.processing_steps),
            planner,
            axes,
            processing_steps: settings.processing_steps,
            queue: RingBuffer::new(),
            switches: RingBuffer::new(),
            executing: None,
            state: TracerState::Stopped,
            locked: false,
            handler: Handler::Prepare,
            current: StepPattern::EMPTY,
            next: StepPattern::EMPTY,
            next_delay: IDLE_WINDOW_US,
            delay_us: 0.0,
            pulses_remaining: 0,
            finalise: None,
            current_tools: ToolData::NONE,
            planned_position: [0.0; N],
            step_position: [0; N],
            report_countdown: settings.position_report_period,
            position_report_period: settings.position_report_period,
            underruns: 0,
            fault: None,
            next_id: 0,
        }
    }

    /// Create a tracer from a machine configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the configuration is invalid or
    /// does not declare `N` axes.
    pub fn from_config(hw: H, kinematics: K, config: &MachineConfig) -> Result<Self> {
        validate_config(config)?;
        let planner = SpeedPlanner::from_config(config)?;
        Ok(Self::new(hw, kinematics, planner, &config.tracer))
    }

    // ------------------------------------------------------------------
    // Producer API
    // ------------------------------------------------------------------

    /// Plan a movement and append it to the queue.
    ///
    /// Starts the tracer when it is stopped. A movement too short to produce
    /// a step is accepted without being queued.
    ///
    /// # Errors
    ///
    /// - `QueueError::Locked` while the stream is being stopped
    /// - `QueueError::Full` when no slot is free
    /// - `MotionError::DiscontinuousStart` when the trajectory does not start
    ///   at the planned position
    /// - `MotionError` when the movement cannot be planned
    pub fn enqueue_movement(&mut self, request: MovementRequest<N>) -> Result<Enqueued> {
        if self.locked {
            warn!("movement rejected, the queue is locked");
            return Err(QueueError::Locked.into());
        }
        if self.queue.is_full() {
            warn!("movement rejected, the queue is full");
            return Err(QueueError::Full.into());
        }

        let MovementRequest {
            min,
            max,
            trajectory,
            initialise,
            finalise,
            tools,
        } = request;
        if !min.is_finite() || !max.is_finite() || max < min {
            return Err(MotionError::InvalidBounds { min, max }.into());
        }

        let start = self.axes.to_steps(&trajectory.position(min));
        let planned = self.axes.to_steps(&self.planned_position);
        if let Some(axis) = (0..N).find(|&i| start[i] != planned[i]) {
            warn!("movement rejected, it does not start at the planned position");
            return Err(MotionError::DiscontinuousStart {
                axis: axis as u8,
                offset: start[axis] - planned[axis],
            }
            .into());
        }

        let path_length = trajectory.path_length(min, max);
        let steps_per_unit = self.axes.steps_per_unit();
        let densest = steps_per_unit.iter().copied().fold(0.0, f32::max);
        let end = self.axes.to_steps(&trajectory.position(max));
        if start == end && path_length * densest < 1.0 {
            debug!("null movement ignored");
            return Ok(Enqueued::NullMovement);
        }

        let processing_steps = self.processing_steps.value();
        let increments = compute_increments(&trajectory, min, max, &steps_per_unit, processing_steps)?;

        let distances = trajectory.planning_distances();
        let speed = self.planner.plan(
            &distances,
            norm(&distances),
            &trajectory.peak_fractions(),
            processing_steps,
        )?;

        let id = self.next_id;
        let mut movement = MovementDescriptor {
            id,
            min,
            max,
            trajectory,
            initialise,
            finalise,
            tools,
            increments,
            speed,
            entry_direction: trajectory.direction_at(min),
            exit_direction: trajectory.direction_at(max),
            entry_speed: 0.0,
            exit_speed: 0.0,
            jerk_point: false,
            path_length,
        };

        let checking = !self.queue.is_empty() || self.state.is_active();
        let link = match self.last_planned() {
            Some(previous) => {
                self.jerk
                    .control_and_initialise_jerk(&movement.entry_side(), &previous.exit_side(), checking)
            }
            None => JerkLink::STANDSTILL,
        };
        movement.entry_speed = link.junction_speed;
        movement.jerk_point = link.jerk_point;

        {
            let _cs = CriticalSection::enter(&mut self.hw);

            // The interrupt may have locked the queue since the first check
            if self.locked {
                warn!("movement rejected, the queue is locked");
                return Err(QueueError::Locked.into());
            }

            if let Some(previous) = self.queue.last_mut() {
                previous.exit_speed = link.junction_speed;
            } else if let Some(pending) = self.switches.last_mut() {
                pending.movement.exit_speed = link.junction_speed;
            } else if let Some(executing) = self.executing.as_mut() {
                executing.exit_speed = link.junction_speed;
                self.kinematics.load_real_time_jerk_data(&link);
            }

            self.queue.try_push(movement).map_err(|_| QueueError::Full)?;
            self.sub.add_end_distance(path_length);
        }

        self.planned_position = trajectory.position(max);
        self.next_id = self.next_id.wrapping_add(1);
        debug!(
            "movement {} queued, {} units at {} units/s",
            id, path_length, speed.regulation_speed
        );

        if self.state == TracerState::Stopped {
            self.start()?;
        }
        Ok(Enqueued::Queued(id))
    }

    /// Check whether [`enqueue_movement`](Self::enqueue_movement) would be
    /// rejected for capacity reasons.
    pub fn enqueue_unauthorised(&self) -> bool {
        self.locked || self.queue.is_full()
    }

    /// Queue a straight move from the planned position to `target`.
    pub fn line_to(&mut self, target: [f32; N]) -> Result<Enqueued> {
        self.line_to_with_tools(target, ToolData::NONE)
    }

    /// Queue a straight move driving tools.
    pub fn line_to_with_tools(&mut self, target: [f32; N], tools: ToolData) -> Result<Enqueued> {
        let line = Line::new(self.planned_position, target);
        self.enqueue_movement(MovementRequest::new(line).with_tools(tools))
    }

    /// Queue a circular move from the planned position to `target` around
    /// `center`, given in the plane's coordinates.
    ///
    /// # Errors
    ///
    /// Returns `MotionError::InvalidArc` for a degenerate arc, and the
    /// errors of [`enqueue_movement`](Self::enqueue_movement).
    pub fn arc_to(&mut self, target: [f32; N], center: [f32; 2], plane: ArcPlane, clockwise: bool) -> Result<Enqueued> {
        self.arc_to_with_tools(target, center, plane, clockwise, ToolData::NONE)
    }

    /// Queue a circular move driving tools.
    pub fn arc_to_with_tools(
        &mut self,
        target: [f32; N],
        center: [f32; 2],
        plane: ArcPlane,
        clockwise: bool,
        tools: ToolData,
    ) -> Result<Enqueued> {
        let arc = Arc::new(self.planned_position, target, center, plane, clockwise)?;
        self.enqueue_movement(MovementRequest::new(arc).with_tools(tools))
    }

    /// Most recently planned movement still known to the tracer.
    fn last_planned(&self) -> Option<&MovementDescriptor<N>> {
        self.queue
            .last()
            .or_else(|| self.switches.last().map(|pending| &pending.movement))
            .or(self.executing.as_ref())
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Start tracing the queued movements.
    ///
    /// Called by [`enqueue_movement`](Self::enqueue_movement) on the first
    /// movement of a stream.
    ///
    /// # Errors
    ///
    /// Returns `MotionError::NothingToTrace` when the queue is empty and
    /// `MotionError::TracerRunning` when a stream is already running. The
    /// tracer is stopped again if the first window cannot be prepared.
    pub fn start(&mut self) -> Result<()> {
        if self.queue.is_empty() {
            warn!("start requested without a queued movement");
            return Err(MotionError::NothingToTrace.into());
        }
        if self.state.is_active() {
            return Err(MotionError::TracerRunning.into());
        }

        if let Err(e) = self.begin_stream() {
            error!("first window could not be prepared");
            self.stop();
            return Err(e);
        }

        self.hw.set_interrupt_period(FIRST_INTERRUPT_US);
        self.hw.enable_timer();
        self.hw.enable_interrupt();
        info!("tracer started");
        Ok(())
    }

    fn begin_stream(&mut self) -> Result<()> {
        self.kinematics.initialise_tracing();
        self.state = TracerState::Running;
        self.locked = false;
        self.handler = Handler::Prepare;
        self.fault = None;

        self.process_next_movement()?;
        self.sub.push_new_position()?;
        self.compute_next_window(true)?;
        self.top_up_lookahead(LOOKAHEAD_CAPACITY)
    }

    /// Stop the stream immediately.
    ///
    /// Waits half a pulse period so an interrupt already latched cannot run
    /// after the timer is disabled, switches the tools off, drops the queued
    /// movements and reports the position.
    pub fn stop(&mut self) {
        self.halt(true);
    }

    pub(super) fn halt(&mut self, resync: bool) {
        self.hw.disable_interrupt();
        self.hw.delay_us((self.delay_us * 0.5) as u32);
        self.hw.disable_interrupt();
        self.hw.disable_timer();

        self.hw.stop_tools(self.current_tools.tools);
        self.current_tools = ToolData::NONE;

        if self.sub.movement_processed() {
            self.run_finalise();
        }
        self.finalise = None;

        self.state = TracerState::Stopped;
        self.locked = false;
        self.handler = Handler::Prepare;

        self.queue.clear();
        self.switches.clear();
        self.executing = None;
        self.current = StepPattern::EMPTY;
        self.next = StepPattern::EMPTY;
        self.pulses_remaining = 0;

        self.sub.reset(self.step_position);
        if resync {
            self.planned_position = self.axes.to_units(&self.step_position);
        }
        self.report_countdown = self.position_report_period;

        self.send_position();
        info!("tracer stopped");
    }

    // ------------------------------------------------------------------
    // Position and speed
    // ------------------------------------------------------------------

    /// Position reached by the emitted steps, in units.
    pub fn current_position(&self) -> [f32; N] {
        self.axes.to_units(&self.step_position)
    }

    /// Position at the end of the last queued movement, in units.
    pub fn planned_position(&self) -> [f32; N] {
        self.planned_position
    }

    /// Steps emitted per axis since the origin.
    pub fn step_position(&self) -> [i32; N] {
        self.step_position
    }

    /// Redefine the current position.
    ///
    /// # Errors
    ///
    /// Returns `MotionError::TracerRunning` unless the tracer is stopped.
    pub fn set_position(&mut self, position: [f32; N]) -> Result<()> {
        if self.state.is_active() {
            return Err(MotionError::TracerRunning.into());
        }
        self.step_position = self.axes.to_steps(&position);
        self.planned_position = position;
        self.sub.reset(self.step_position);
        Ok(())
    }

    /// Report the current position to the position sink.
    pub fn send_position(&mut self) {
        let position = self.current_position();
        self.hw.send_position(&position);
    }

    /// Select the speed group of the next movements.
    pub fn set_speed_group(&mut self, group: u8) -> Result<()> {
        Ok(self.planner.set_speed_group(group)?)
    }

    /// Change the feed rate of a speed group for the next movements.
    pub fn set_speed_for_group(&mut self, group: u8, speed: f32) -> Result<()> {
        Ok(self.planner.set_speed_for_group(group, speed)?)
    }

    /// Speed planner.
    pub fn planner(&self) -> &SpeedPlanner<N> {
        &self.planner
    }

    // ------------------------------------------------------------------
    // Status
    // ------------------------------------------------------------------

    /// Lifecycle state.
    #[inline]
    pub fn state(&self) -> TracerState {
        self.state
    }

    /// Number of movements waiting in the queue.
    #[inline]
    pub fn queued_movements(&self) -> usize {
        self.queue.len()
    }

    /// Id of the movement whose sub-movements are being emitted.
    pub fn executing_movement(&self) -> Option<u32> {
        self.executing.as_ref().map(|m| m.id)
    }

    /// Windows that found the lookahead empty.
    #[inline]
    pub fn underruns(&self) -> u32 {
        self.underruns
    }

    /// Driver fault that stopped the last stream.
    #[inline]
    pub fn fault(&self) -> Option<DriverError> {
        self.fault
    }

    /// Machine.
    pub fn hardware(&self) -> &H {
        &self.hw
    }

    /// Machine, mutably.
    pub fn hardware_mut(&mut self) -> &mut H {
        &mut self.hw
    }

    // ------------------------------------------------------------------
    // Window pipeline
    // ------------------------------------------------------------------

    /// Bind the next queued movement for pre-processing.
    pub(super) fn process_next_movement(&mut self) -> Result<()> {
        self.run_finalise();

        let movement = self.queue.pop().ok_or(QueueError::Empty)?;
        let id = movement.id;
        if let Some(initialise) = movement.initialise {
            initialise(id);
        }
        self.finalise = movement.finalise.map(|hook| (hook, id));

        let countdown = self.sub.update_current_movement(&movement);
        self.kinematics.load_pre_process_data(&movement);
        self.switches
            .try_push(PendingSwitch { countdown, movement })
            .map_err(|_| QueueError::Full)?;

        trace!("movement {} bound, switch in {} windows", id, countdown);
        Ok(())
    }

    pub(super) fn run_finalise(&mut self) {
        if let Some((hook, id)) = self.finalise.take() {
            hook(id);
        }
    }

    /// Start executing the movements whose first sub-movement comes next.
    fn run_switchovers(&mut self) {
        while self.switches.peek().is_some_and(|pending| pending.countdown == 0) {
            if let Some(pending) = self.switches.pop() {
                self.apply_switch(pending.movement);
            }
        }
        for pending in self.switches.iter_mut() {
            pending.countdown = pending.countdown.saturating_sub(1);
        }
    }

    fn apply_switch(&mut self, movement: MovementDescriptor<N>) {
        tools::switch_tools(&mut self.hw, &self.current_tools, &movement.tools);
        self.current_tools = movement.tools;

        {
            let _cs = CriticalSection::enter(&mut self.hw);
            self.sub.set_jerk_distance(movement.path_length);
        }
        self.kinematics.load_real_time_data(&movement);

        debug!("movement {} executing", movement.id);
        self.executing = Some(movement);
    }

    /// Push up to `budget` sub-movements, binding the next queued movement
    /// once the current one is processed.
    pub(super) fn top_up_lookahead(&mut self, budget: usize) -> Result<()> {
        for _ in 0..budget {
            if self.sub.available_sub_movements() >= LOOKAHEAD_CAPACITY {
                break;
            }
            if self.sub.movement_processed() {
                if self.state != TracerState::Running || self.queue.is_empty() {
                    break;
                }
                self.process_next_movement()?;
            }
            self.sub.push_new_position()?;
        }
        Ok(())
    }

    /// Read the next sub-movement into the `next` window.
    pub(super) fn compute_next_window(&mut self, first: bool) -> Result<()> {
        if self.sub.available_sub_movements() == 0 {
            if self.sub.movement_processed() && self.state == TracerState::Running && !self.queue.is_empty() {
                self.process_next_movement()?;
            }
            if !self.sub.movement_processed() {
                self.underruns = self.underruns.saturating_add(1);
                error!("sub-movement lookahead underrun, {} so far", self.underruns);
                self.sub.push_new_position()?;
            }
        }

        self.run_switchovers();

        let Some(sub_movement) = self.sub.read_next_sub_movement().copied() else {
            self.next = StepPattern::EMPTY;
            self.next_delay = IDLE_WINDOW_US;
            return Ok(());
        };

        {
            let _cs = CriticalSection::enter(&mut self.hw);
            self.sub.update_end_jerk_distances(&sub_movement);
        }
        let trackers = self.sub.trackers();

        let time = if first {
            self.kinematics
                .compute_time_for_first_sub_movement(&sub_movement, &trackers)
        } else {
            self.kinematics.compute_time_for_sub_movement(&sub_movement, &trackers)
        };

        self.next = StepPattern::encode(&sub_movement.distances, sub_movement.direction);
        self.next_delay = time / f32::from(self.next.pulse_count().max(1));
        self.sub.discard();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AxisConstraints;
    use crate::hal::{PositionSink, StepperDriver, StepperTimer, ToolOutputs};
    use crate::kinematics::SpeedKinematics;
    use crate::motion::Signature;
    use embedded_hal::delay::DelayNs;

    #[derive(Default)]
    struct Bench {
        pub interrupt: bool,
        pub timer: bool,
        pub steps: [u32; 2],
        pub reports: u32,
    }

    impl StepperTimer for Bench {
        fn set_interrupt_period(&mut self, _period_us: f32) {}
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

    impl StepperDriver for Bench {
        fn set_directions(&mut self, _negative: Signature) -> core::result::Result<(), DriverError> {
            Ok(())
        }
        fn step(&mut self, axes: Signature) -> core::result::Result<(), DriverError> {
            for axis in axes.axes() {
                self.steps[axis] += 1;
            }
            Ok(())
        }
    }

    impl ToolOutputs for Bench {
        fn set_power(&mut self, _tool: u8, _power: f32) {}
        fn stop_tools(&mut self, _tools: Signature) {}
    }

    impl PositionSink<2> for Bench {
        fn send_position(&mut self, _position: &[f32; 2]) {
            self.reports += 1;
        }
    }

    impl DelayNs for Bench {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    fn tracer() -> TrajectoryTracer<2, Bench, SpeedKinematics> {
        let axis = AxisConstraints {
            steps_per_unit: 100.0,
            max_speed: 200.0,
            max_acceleration: 1000.0,
            max_jerk: 5.0,
            invert_direction: false,
        };
        let mut planner = SpeedPlanner::new(AxisTable::new([axis; 2]));
        planner.add_speed_group("xy", Signature::first(2), 50.0).unwrap();
        TrajectoryTracer::new(Bench::default(), SpeedKinematics::new(), planner, &TracerConfig::default())
    }

    fn run(tracer: &mut TrajectoryTracer<2, Bench, SpeedKinematics>) {
        let mut guard = 0;
        while tracer.hardware().timer && tracer.hardware().interrupt {
            tracer.on_interrupt();
            guard += 1;
            assert!(guard < 1_000_000);
        }
    }

    #[test]
    fn test_enqueue_starts_tracer() {
        let mut tracer = tracer();
        assert_eq!(tracer.line_to([1.0, 0.0]).unwrap(), Enqueued::Queued(0));
        assert_eq!(tracer.state(), TracerState::Running);
        assert!(tracer.hardware().timer && tracer.hardware().interrupt);
        assert_eq!(tracer.executing_movement(), Some(0));
    }

    #[test]
    fn test_null_movement_is_not_queued() {
        let mut tracer = tracer();
        assert_eq!(tracer.line_to([0.0, 0.001]).unwrap(), Enqueued::NullMovement);
        assert_eq!(tracer.state(), TracerState::Stopped);
        assert_eq!(tracer.queued_movements(), 0);
        assert!(!tracer.hardware().timer);
    }

    #[test]
    fn test_start_without_movement() {
        let mut tracer = tracer();
        assert_eq!(tracer.start(), Err(Error::Motion(MotionError::NothingToTrace)));
        assert_eq!(tracer.state(), TracerState::Stopped);
    }

    #[test]
    fn test_locked_queue_rejects() {
        let mut tracer = tracer();
        tracer.line_to([1.0, 0.0]).unwrap();
        tracer.locked = true;

        assert!(tracer.enqueue_unauthorised());
        assert_eq!(
            tracer.line_to([2.0, 0.0]),
            Err(Error::Queue(QueueError::Locked))
        );
        assert_eq!(tracer.queued_movements(), 0);
        assert_eq!(tracer.planned_position(), [1.0, 0.0]);
    }

    #[test]
    fn test_set_position_requires_stopped() {
        let mut tracer = tracer();
        tracer.set_position([3.0, 4.0]).unwrap();
        assert_eq!(tracer.step_position(), [300, 400]);

        tracer.line_to([5.0, 4.0]).unwrap();
        assert_eq!(
            tracer.set_position([0.0, 0.0]),
            Err(Error::Motion(MotionError::TracerRunning))
        );
    }

    #[test]
    fn test_stream_runs_to_completion() {
        let mut tracer = tracer();
        tracer.line_to([1.0, 0.5]).unwrap();
        tracer.line_to([1.0, 1.0]).unwrap();
        run(&mut tracer);

        assert_eq!(tracer.state(), TracerState::Stopped);
        assert_eq!(tracer.hardware().steps, [100, 100]);
        assert_eq!(tracer.step_position(), [100, 100]);
        assert_eq!(tracer.underruns(), 0);
        assert!(tracer.hardware().reports > 0);
    }

    #[test]
    fn test_back_to_back_short_movements_switch_in_order() {
        let mut tracer = tracer();
        for i in 1..=6 {
            tracer.line_to([0.03 * i as f32, 0.0]).unwrap();
        }
        run(&mut tracer);
        assert_eq!(tracer.step_position(), [18, 0]);
        assert_eq!(tracer.executing_movement(), None);
    }

    #[test]
    fn test_late_arrival_on_drained_lookahead_is_not_an_underrun() {
        let mut tracer = tracer();
        tracer.line_to([0.01, 0.0]).unwrap();

        let mut guard = 0;
        while !(tracer.state == TracerState::StopProgrammed
            && tracer.sub.available_sub_movements() == 0
            && !tracer.locked)
        {
            assert!(tracer.hardware().timer, "stream ended before draining");
            tracer.on_interrupt();
            guard += 1;
            assert!(guard < 10_000);
        }

        tracer.line_to([1.01, 0.0]).unwrap();
        run(&mut tracer);

        assert_eq!(tracer.step_position(), [101, 0]);
        assert_eq!(tracer.hardware().steps, [101, 0]);
        assert_eq!(tracer.underruns(), 0);
        assert_eq!(tracer.state(), TracerState::Stopped);
    }

    #[test]
    fn test_stop_clears_queue_and_resyncs() {
        let mut tracer = tracer();
        tracer.line_to([5.0, 0.0]).unwrap();
        tracer.line_to([5.0, 5.0]).unwrap();
        for _ in 0..200 {
            tracer.on_interrupt();
        }
        tracer.stop();

        assert_eq!(tracer.state(), TracerState::Stopped);
        assert_eq!(tracer.queued_movements(), 0);
        assert_eq!(tracer.planned_position(), tracer.current_position());
        assert!(!tracer.hardware().timer);
    }
}
