//! Trajectory parameter increments.
//!
//! The sub-movement manager advances the trajectory parameter by an
//! increment per window. The first increment must already produce about
//! `processing_steps` steps on the busiest axis, so it is searched at both
//! ends of the parameter range by halving then bisecting.

use crate::error::MotionError;
use crate::trajectory::Trajectory;

/// Bisection rounds after the halving search.
const REFINE_ROUNDS: usize = 12;

/// Halvings before giving up on a range that never gets short enough.
const MAX_HALVINGS: usize = 48;

/// Slack given to the governor around the increments found at the bounds.
const GOVERNOR_SLACK: f32 = 4.0;

/// Increment limits of one movement.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct IncrementBounds {
    /// Increment of the first window.
    pub initial: f32,
    /// Smallest increment the governor may use.
    pub min: f32,
    /// Largest increment the governor may use.
    pub max: f32,
}

/// Largest step count any axis travels between two parameter values.
fn step_distance<T: Trajectory<N>, const N: usize>(
    trajectory: &T,
    steps_per_unit: &[f32; N],
    from: f32,
    to: f32,
) -> f32 {
    let a = trajectory.position(from);
    let b = trajectory.position(to);
    (0..N)
        .map(|i| ((b[i] - a[i]) * steps_per_unit[i]).abs())
        .fold(0.0, f32::max)
}

/// Increment leaving `point` toward `sign` that yields `target` steps.
fn extract_increment<T: Trajectory<N>, const N: usize>(
    trajectory: &T,
    steps_per_unit: &[f32; N],
    point: f32,
    sign: f32,
    span: f32,
    target: f32,
) -> f32 {
    let distance = |increment: f32| step_distance(trajectory, steps_per_unit, point, point + sign * increment);

    let mut increment = span;
    let mut halvings = 0;
    while distance(increment) > target && halvings < MAX_HALVINGS {
        increment *= 0.5;
        halvings += 1;
    }

    if halvings == 0 {
        return increment;
    }

    let (mut low, mut high) = (increment, (increment * 2.0).min(span));
    for _ in 0..REFINE_ROUNDS {
        let mid = 0.5 * (low + high);
        if distance(mid) <= target {
            low = mid;
        } else {
            high = mid;
        }
    }
    low
}

/// Compute the increment bounds of a movement over `[min, max]`.
///
/// # Errors
///
/// Returns `MotionError::InvalidBounds` for an empty or non-finite range and
/// `MotionError::InvalidIncrement` when no finite positive increment exists.
pub fn compute_increments<T: Trajectory<N>, const N: usize>(
    trajectory: &T,
    min: f32,
    max: f32,
    steps_per_unit: &[f32; N],
    processing_steps: u8,
) -> Result<IncrementBounds, MotionError> {
    if !min.is_finite() || !max.is_finite() || max <= min {
        return Err(MotionError::InvalidBounds { min, max });
    }

    let span = max - min;
    let target = f32::from(processing_steps);

    let at_min = extract_increment(trajectory, steps_per_unit, min, 1.0, span, target);
    let at_max = extract_increment(trajectory, steps_per_unit, max, -1.0, span, target);

    for increment in [at_min, at_max] {
        if !increment.is_finite() || increment <= 0.0 {
            return Err(MotionError::InvalidIncrement(increment));
        }
    }

    Ok(IncrementBounds {
        initial: at_min,
        min: at_min.min(at_max) / GOVERNOR_SLACK,
        max: (at_min.max(at_max) * GOVERNOR_SLACK).min(span),
    })
}
