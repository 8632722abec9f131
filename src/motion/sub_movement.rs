//! Sub-movement pre-computation.
//!
//! The manager samples the trajectory of the movement being pre-processed
//! and keeps up to [`LOOKAHEAD_CAPACITY`] sub-movements ready for the
//! interrupt. Each sub-movement is the step difference between two
//! consecutive samples, so the step position never drifts from the
//! trajectory, whatever the increments.

use crate::config::{AxisTable, ProcessingSteps};
use crate::error::{Error, MotionError, QueueError};
use crate::ring::RingBuffer;
use crate::trajectory::{Path, Trajectory};

use super::descriptor::MovementDescriptor;
use super::signature::Signature;

/// Sub-movements computed ahead of the interrupt.
pub const LOOKAHEAD_CAPACITY: usize = 2;

/// Largest per-axis distance one window can hold.
pub const MAX_WINDOW_DISTANCE: u32 = u8::MAX as u32;

/// Shrink attempts before a window overflow is reported.
const MAX_SHRINKS: u8 = 8;

/// One window of stepping work.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubMovement<const N: usize> {
    /// Axes moving toward negative positions.
    pub direction: Signature,
    /// Steps per axis.
    pub distances: [u8; N],
    /// Distance travelled along the path, in units.
    pub path_length: f32,
}

impl<const N: usize> SubMovement<N> {
    /// Steps of the busiest axis.
    pub fn max_distance(&self) -> u8 {
        self.distances.iter().copied().max().unwrap_or(0)
    }
}

/// Remaining path lengths used by the kinematics to brake in time.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DistanceTrackers {
    /// Distance to the end of the executing movement.
    pub jerk_distance: f32,
    /// Distance to the end of all queued motion.
    pub end_distance: f32,
}

#[derive(Debug, Clone, Copy)]
struct Cursor<const N: usize> {
    trajectory: Path<N>,
    position: f32,
    max: f32,
    increment: f32,
    min_increment: f32,
    max_increment: f32,
}

/// Pre-computes sub-movements of the movement being processed.
#[derive(Debug)]
pub struct SubMovementManager<const N: usize> {
    lookahead: RingBuffer<SubMovement<N>, LOOKAHEAD_CAPACITY>,
    cursor: Option<Cursor<N>>,
    processed: bool,

    /// Step position of the last pushed sample.
    step_position: [i32; N],
    /// Direction bits of the last pushed sub-movement.
    direction: Signature,

    steps_per_unit: [f32; N],
    processing_steps: u8,
    trackers: DistanceTrackers,
}

impl<const N: usize> SubMovementManager<N> {
    /// Create an idle manager.
    pub fn new(axes: &AxisTable<N>, processing_steps: ProcessingSteps) -> Self {
        Self {
            lookahead: RingBuffer::new(),
            cursor: None,
            processed: true,
            step_position: [0; N],
            direction: Signature::EMPTY,
            steps_per_unit: axes.steps_per_unit(),
            processing_steps: processing_steps.value(),
            trackers: DistanceTrackers::default(),
        }
    }

    /// Drop all pre-computed work and restart from a step position.
    pub fn reset(&mut self, step_position: [i32; N]) {
        self.lookahead.clear();
        self.cursor = None;
        self.processed = true;
        self.step_position = step_position;
        self.trackers = DistanceTrackers::default();
    }

    /// Bind a new movement for pre-processing.
    ///
    /// Returns the number of sub-movements of the previous movement still
    /// waiting in the lookahead: the interrupt switches to the new movement
    /// after consuming that many.
    pub fn update_current_movement(&mut self, movement: &MovementDescriptor<N>) -> u8 {
        self.cursor = Some(Cursor {
            trajectory: movement.trajectory,
            position: movement.min,
            max: movement.max,
            increment: movement.increments.initial,
            min_increment: movement.increments.min,
            max_increment: movement.increments.max,
        });
        self.processed = false;
        self.lookahead.len() as u8
    }

    /// Sample the next position and append its sub-movement.
    ///
    /// Does nothing once the movement is processed.
    ///
    /// # Errors
    ///
    /// Returns `QueueError::Full` when the lookahead is full and
    /// `MotionError::DistanceOverflow` when no increment keeps every axis
    /// within one window.
    pub fn push_new_position(&mut self) -> Result<(), Error> {
        if self.processed {
            return Ok(());
        }
        if self.lookahead.is_full() {
            return Err(QueueError::Full.into());
        }
        let cursor = self.cursor.as_mut().ok_or(MotionError::NothingToTrace)?;
        let target = u32::from(self.processing_steps);

        let mut shrinks = 0;
        let (next, steps, max_distance) = loop {
            let next = (cursor.position + cursor.increment).min(cursor.max);
            let position = cursor.trajectory.position(next);
            let steps: [i32; N] =
                core::array::from_fn(|i| libm::roundf(position[i] * self.steps_per_unit[i]) as i32);
            let max_distance = steps
                .iter()
                .zip(self.step_position.iter())
                .map(|(s, p)| s.abs_diff(*p))
                .max()
                .unwrap_or(0);

            if max_distance <= MAX_WINDOW_DISTANCE {
                break (next, steps, max_distance);
            }

            shrinks += 1;
            let shrunk = cursor.increment * target as f32 / max_distance as f32;
            if shrinks > MAX_SHRINKS || shrunk.is_nan() || shrunk <= 0.0 {
                error!("sub-movement needs {} steps on one axis", max_distance);
                return Err(MotionError::DistanceOverflow(max_distance).into());
            }
            cursor.increment = shrunk;
        };

        let mut distances = [0u8; N];
        for i in 0..N {
            let delta = steps[i] - self.step_position[i];
            if delta != 0 {
                self.direction.set(i, delta < 0);
            }
            distances[i] = delta.unsigned_abs() as u8;
        }

        let sub_movement = SubMovement {
            direction: self.direction,
            distances,
            path_length: cursor.trajectory.path_length(cursor.position, next),
        };
        if self.lookahead.try_push(sub_movement).is_err() {
            return Err(QueueError::Full.into());
        }

        self.step_position = steps;
        cursor.position = next;

        if next >= cursor.max {
            self.processed = true;
        } else if max_distance == 0 {
            cursor.increment = (cursor.increment * 2.0).min(cursor.max_increment);
        } else if max_distance + 1 < target || max_distance > target + 1 {
            let retuned = cursor.increment * target as f32 / max_distance as f32;
            cursor.increment = retuned.clamp(cursor.min_increment, cursor.max_increment);
        }

        Ok(())
    }

    /// Push sub-movements until the lookahead is full or the movement is
    /// processed.
    pub fn fill_sub_movement_queue(&mut self) -> Result<(), Error> {
        while !self.processed && !self.lookahead.is_full() {
            self.push_new_position()?;
        }
        Ok(())
    }

    /// Oldest pre-computed sub-movement.
    #[inline]
    pub fn read_next_sub_movement(&self) -> Option<&SubMovement<N>> {
        self.lookahead.peek()
    }

    /// Release the oldest sub-movement.
    #[inline]
    pub fn discard(&mut self) -> bool {
        self.lookahead.discard()
    }

    /// Check whether the last position of the movement has been pushed.
    #[inline]
    pub fn movement_processed(&self) -> bool {
        self.processed
    }

    /// Number of sub-movements ready.
    #[inline]
    pub fn available_sub_movements(&self) -> usize {
        self.lookahead.len()
    }

    /// Current trajectory increment, if a movement is bound.
    pub fn increment(&self) -> Option<f32> {
        self.cursor.as_ref().map(|c| c.increment)
    }

    /// Step position of the last pushed sample.
    pub fn step_position(&self) -> [i32; N] {
        self.step_position
    }

    /// Current distance trackers.
    #[inline]
    pub fn trackers(&self) -> DistanceTrackers {
        self.trackers
    }

    /// Account for a newly queued movement.
    ///
    /// Shared with the interrupt: call inside a critical section.
    pub fn add_end_distance(&mut self, distance: f32) {
        self.trackers.end_distance += distance;
    }

    /// Start tracking a newly executing movement.
    pub fn set_jerk_distance(&mut self, distance: f32) {
        self.trackers.jerk_distance = distance;
    }

    /// Account for a sub-movement about to execute.
    ///
    /// Shared with the producer: call inside a critical section.
    pub fn update_end_jerk_distances(&mut self, sub_movement: &SubMovement<N>) {
        let length = sub_movement.path_length;
        self.trackers.end_distance = (self.trackers.end_distance - length).max(0.0);
        self.trackers.jerk_distance = (self.trackers.jerk_distance - length).max(0.0);
    }
}
