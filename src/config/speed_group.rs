//! Speed group configuration.

use heapless::{String, Vec};
use serde::Deserialize;

use super::units::UnitsPerSec;
use super::MAX_AXES;

/// A named subset of axes sharing one feed rate.
///
/// The regulation speed of a movement is the group speed projected onto the
/// part of the movement that happens on the group's axes.
#[derive(Debug, Clone, Deserialize)]
pub struct SpeedGroupConfig {
    /// Group name (max 32 chars).
    pub name: String<32>,

    /// Indices of the axes in the group.
    pub axes: Vec<u8, MAX_AXES>,

    /// Feed rate in units per second.
    pub speed: UnitsPerSec,
}

impl SpeedGroupConfig {
    /// Create a group from a name, axis indices and a speed.
    pub fn new(name: &str, axes: &[u8], speed: f32) -> Self {
        Self {
            name: String::try_from(name).unwrap_or_default(),
            axes: Vec::from_slice(axes).unwrap_or_default(),
            speed: UnitsPerSec(speed),
        }
    }

    /// Check whether the group contains an axis.
    pub fn contains(&self, axis: u8) -> bool {
        self.axes.contains(&axis)
    }
}
