//! Machine configuration - root configuration structure.

use heapless::Vec;
use serde::Deserialize;

use super::axis::AxisConfig;
use super::speed_group::SpeedGroupConfig;
use super::units::ProcessingSteps;
use super::{MAX_AXES, MAX_SPEED_GROUPS};

/// Tracer settings, the `[tracer]` table.
#[derive(Debug, Clone, Deserialize)]
pub struct TracerConfig {
    /// Target steps on the busiest axis per sub-movement window.
    #[serde(default)]
    pub processing_steps: ProcessingSteps,

    /// Report the position every this many sub-movements (0 disables).
    #[serde(default = "default_position_report_period")]
    pub position_report_period: u16,

    /// Speed group selected at startup.
    #[serde(default)]
    pub default_speed_group: u8,
}

fn default_position_report_period() -> u16 {
    5
}

impl Default for TracerConfig {
    fn default() -> Self {
        Self {
            processing_steps: ProcessingSteps::DEFAULT,
            position_report_period: default_position_report_period(),
            default_speed_group: 0,
        }
    }
}

/// Root configuration structure from TOML.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MachineConfig {
    /// Tracer settings.
    #[serde(default)]
    pub tracer: TracerConfig,

    /// Axes, indexed by position in the list.
    pub axes: Vec<AxisConfig, MAX_AXES>,

    /// Speed groups, indexed by position in the list.
    #[serde(default)]
    pub speed_groups: Vec<SpeedGroupConfig, MAX_SPEED_GROUPS>,
}

impl MachineConfig {
    /// Get an axis configuration by name.
    pub fn axis(&self, name: &str) -> Option<&AxisConfig> {
        self.axes.iter().find(|a| a.name.as_str() == name)
    }

    /// Get the index of an axis by name.
    pub fn axis_index(&self, name: &str) -> Option<usize> {
        self.axes.iter().position(|a| a.name.as_str() == name)
    }

    /// Get a speed group by name.
    pub fn speed_group(&self, name: &str) -> Option<&SpeedGroupConfig> {
        self.speed_groups.iter().find(|g| g.name.as_str() == name)
    }

    /// List all axis names.
    pub fn axis_names(&self) -> impl Iterator<Item = &str> {
        self.axes.iter().map(|a| a.name.as_str())
    }
}
