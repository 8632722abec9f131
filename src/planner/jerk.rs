//! Junction speed between consecutive movements.

use crate::config::AxisTable;

/// One side of a movement boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JunctionSide<const N: usize> {
    /// Unit direction at the boundary.
    pub direction: [f32; N],
    /// Regulation speed of the movement.
    pub speed: f32,
}

/// Result of linking a movement to its predecessor.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct JerkLink {
    /// Path speed at the boundary.
    pub junction_speed: f32,
    /// The boundary speed is limited by an axis jerk, not by the
    /// regulation speeds.
    pub jerk_point: bool,
}

impl JerkLink {
    /// Boundary of a movement starting from rest.
    pub const STANDSTILL: Self = Self {
        junction_speed: 0.0,
        jerk_point: false,
    };
}

/// Checks per-axis speed changes at movement boundaries.
#[derive(Debug, Clone, Copy)]
pub struct JerkPlanner<const N: usize> {
    max_jerk: [f32; N],
}

impl<const N: usize> JerkPlanner<N> {
    /// Create a planner from the axis jerk limits.
    pub fn new(axes: &AxisTable<N>) -> Self {
        Self {
            max_jerk: axes.max_jerk(),
        }
    }

    /// Junction speed between `previous` and `current`.
    ///
    /// Crossing the boundary at speed `v` changes the speed of axis `i` by
    /// `v * |previous.direction[i] - current.direction[i]|`. The junction
    /// speed is the largest `v` keeping every change within the axis jerk,
    /// capped by both regulation speeds. Without `checking` (no predecessor
    /// is moving) the movement starts from rest.
    pub fn control_and_initialise_jerk(
        &self,
        current: &JunctionSide<N>,
        previous: &JunctionSide<N>,
        checking: bool,
    ) -> JerkLink {
        if !checking {
            return JerkLink::STANDSTILL;
        }

        let cruise = previous.speed.min(current.speed).max(0.0);
        let mut limit = f32::INFINITY;
        for i in 0..N {
            let delta = (previous.direction[i] - current.direction[i]).abs();
            if delta > 0.0 {
                limit = limit.min(self.max_jerk[i] / delta);
            }
        }

        if limit < cruise {
            JerkLink {
                junction_speed: limit,
                jerk_point: true,
            }
        } else {
            JerkLink {
                junction_speed: cruise,
                jerk_point: false,
            }
        }
    }
}
