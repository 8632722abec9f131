//! Axis configuration from TOML.

use heapless::String;
use serde::Deserialize;

use super::units::{UnitsPerSec, UnitsPerSecSquared};

/// Complete axis configuration from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct AxisConfig {
    /// Human-readable name (max 32 chars).
    pub name: String<32>,

    /// Motor steps (including microsteps) per machine unit.
    pub steps_per_unit: f32,

    /// Maximum speed in units per second.
    pub max_speed: UnitsPerSec,

    /// Maximum acceleration in units per second squared.
    pub max_acceleration: UnitsPerSecSquared,

    /// Maximum instantaneous speed change at a movement boundary.
    #[serde(default)]
    pub max_jerk: UnitsPerSec,

    /// Invert direction pin logic.
    #[serde(default)]
    pub invert_direction: bool,
}

impl AxisConfig {
    /// Create an axis configuration with no jerk allowance and normal
    /// direction logic.
    pub fn new(
        name: &str,
        steps_per_unit: f32,
        max_speed: f32,
        max_acceleration: f32,
    ) -> Self {
        Self {
            name: String::try_from(name).unwrap_or_default(),
            steps_per_unit,
            max_speed: UnitsPerSec(max_speed),
            max_acceleration: UnitsPerSecSquared(max_acceleration),
            max_jerk: UnitsPerSec(0.0),
            invert_direction: false,
        }
    }

    /// Set the jerk allowance.
    pub fn with_jerk(mut self, max_jerk: f32) -> Self {
        self.max_jerk = UnitsPerSec(max_jerk);
        self
    }

    /// Calculate the step rate at maximum speed.
    pub fn max_step_rate(&self) -> f32 {
        self.max_speed.0 * self.steps_per_unit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_step_rate() {
        let axis = AxisConfig::new("x", 80.0, 250.0, 3000.0);

        // 80 steps/mm * 250 mm/s = 20000 steps/s
        assert!((axis.max_step_rate() - 20_000.0).abs() < 0.01);
        assert_eq!(axis.max_jerk.0, 0.0);
    }
}
