//! Interrupt handlers.
//!
//! The stepper interrupt alternates between two handlers. `Prepare` runs
//! once per window: it activates the window computed during the previous
//! one, computes the next and tops the lookahead up. `Finish` runs once per
//! pulse and sequences the end of the stream.

use crate::error::{Error, Result};
use crate::hal::MotionHardware;
use crate::kinematics::Kinematics;
use crate::motion::LOOKAHEAD_CAPACITY;

use super::engine::TrajectoryTracer;
use super::state::{Handler, TracerState};
use super::tools;

impl<const N: usize, H, K> TrajectoryTracer<N, H, K>
where
    H: MotionHardware<N>,
    K: Kinematics<N>,
{
    /// Stepper interrupt entry point.
    ///
    /// A failing handler stops the stream; a driver fault is kept in
    /// [`fault`](Self::fault).
    pub fn on_interrupt(&mut self) {
        let result = match self.handler {
            Handler::Prepare => self.prepare_next_sub_movement(),
            Handler::Finish => self.finish_sub_movement(),
        };

        if let Err(e) = result {
            error!("stepper interrupt failed, stopping the stream");
            if let Error::Driver(fault) = e {
                self.fault = Some(fault);
            }
            self.stop();
        }
    }

    /// Activate the prepared window and prepare the following one.
    fn prepare_next_sub_movement(&mut self) -> Result<()> {
        self.hw.disable_interrupt();

        self.activate_next()?;
        tools::update_powers(&mut self.hw, &self.current_tools, self.kinematics.current_speed());

        self.compute_next_window(false)?;
        self.top_up_lookahead(LOOKAHEAD_CAPACITY)?;

        self.handler = Handler::Finish;
        self.hw.enable_interrupt();
        Ok(())
    }

    /// Emit one pulse of the active window.
    fn finish_sub_movement(&mut self) -> Result<()> {
        self.pulses_remaining = self.pulses_remaining.saturating_sub(1);

        if !self.current.is_empty() {
            let axes = self.current.signature_for_pulse(self.pulses_remaining);
            if !axes.is_empty() {
                self.hw.step(axes)?;
                let negative = self.current.direction();
                for axis in axes.axes().filter(|&a| a < N) {
                    self.step_position[axis] += if negative.contains(axis) { -1 } else { 1 };
                }
            }
        }

        if self.pulses_remaining > 0 {
            return Ok(());
        }

        self.report_position_if_due();

        match self.state {
            TracerState::FinalSubMovement => {
                self.halt(false);
                return Ok(());
            }
            TracerState::StopProgrammed => {
                if !self.queue.is_empty() {
                    // Late arrival, the lookahead may already be drained
                    self.process_next_movement()?;
                    self.state = TracerState::Running;
                    self.top_up_lookahead(LOOKAHEAD_CAPACITY)?;
                    self.handler = Handler::Prepare;
                } else if self.sub.available_sub_movements() == 0 {
                    self.activate_next()?;
                    self.state = TracerState::FinalSubMovement;
                    self.locked = true;
                } else {
                    if self.sub.available_sub_movements() == 1 {
                        self.locked = true;
                    }
                    self.handler = Handler::Prepare;
                }
            }
            TracerState::Running => {
                if self.sub.movement_processed() {
                    if self.queue.is_empty() {
                        self.run_finalise();
                        self.state = TracerState::StopProgrammed;
                        debug!("movement queue exhausted, stop programmed");
                    } else {
                        self.process_next_movement()?;
                    }
                }
                self.handler = Handler::Prepare;
            }
            TracerState::Stopped => self.handler = Handler::Prepare,
        }

        self.hw.enable_interrupt();
        Ok(())
    }

    /// Make the prepared window the active one and latch its directions.
    fn activate_next(&mut self) -> Result<()> {
        self.current = self.next;
        self.delay_us = self.next_delay;
        self.pulses_remaining = self.current.pulse_count().max(1);

        self.hw.set_directions(self.current.direction())?;
        self.hw.set_interrupt_period(self.delay_us);
        Ok(())
    }

    fn report_position_if_due(&mut self) {
        if self.position_report_period == 0 {
            return;
        }
        self.report_countdown = self.report_countdown.saturating_sub(1);
        if self.report_countdown == 0 {
            self.report_countdown = self.position_report_period;
            self.send_position();
        }
    }
}

