//! Speed and jerk planning.
//!
//! Runs in the producer context when a movement is enqueued. The speed
//! planner turns a speed group's feed rate into a regulation speed the axes
//! can sustain and derives the speed environment the kinematics backends
//! consume. The jerk planner links consecutive movements.

mod jerk;
mod speed;

pub use jerk::{JerkLink, JerkPlanner, JunctionSide};
pub use speed::{SpeedEnvironment, SpeedGroup, SpeedPlanner, MICROS_PER_SECOND};
