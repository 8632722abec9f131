//! Movement requests and queued movement descriptors.

use crate::planner::{JunctionSide, SpeedEnvironment};
use crate::trajectory::{Path, Trajectory};

use super::increment::IncrementBounds;
use super::signature::Signature;

/// Maximum number of tools a movement can drive.
pub const MAX_TOOLS: usize = 4;

/// Callback run when a movement starts or ends pre-processing. Receives the
/// movement id.
pub type MovementHook = fn(u32);

/// Tools driven during a movement, with power proportional to the feed
/// rate.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ToolData {
    /// Tools switched on.
    pub tools: Signature,
    /// Power per unit of speed, per tool.
    pub linear_powers: [f32; MAX_TOOLS],
}

impl ToolData {
    /// No tool.
    pub const NONE: Self = Self {
        tools: Signature::EMPTY,
        linear_powers: [0.0; MAX_TOOLS],
    };

    /// Switch a tool on with a power proportional to the speed.
    ///
    /// Tools beyond [`MAX_TOOLS`] are ignored.
    pub fn with_tool(mut self, tool: u8, linear_power: f32) -> Self {
        let index = usize::from(tool);
        if index < MAX_TOOLS {
            self.tools.set(index, true);
            self.linear_powers[index] = linear_power;
        }
        self
    }

    /// Power of a tool at a path speed.
    #[inline]
    pub fn power(&self, tool: usize, speed: f32) -> f32 {
        self.linear_powers.get(tool).map_or(0.0, |p| p * speed)
    }
}

/// What a producer asks the tracer to move.
#[derive(Debug, Clone, Copy)]
pub struct MovementRequest<const N: usize> {
    /// Lower trajectory parameter bound.
    pub min: f32,
    /// Upper trajectory parameter bound.
    pub max: f32,
    /// Position function.
    pub trajectory: Path<N>,
    /// Run when pre-processing of the movement starts.
    pub initialise: Option<MovementHook>,
    /// Run when the last sub-movement has been pre-processed.
    pub finalise: Option<MovementHook>,
    /// Tools driven during the movement.
    pub tools: ToolData,
}

impl<const N: usize> MovementRequest<N> {
    /// Request the whole trajectory, without hooks or tools.
    pub fn new(trajectory: impl Into<Path<N>>) -> Self {
        let trajectory = trajectory.into();
        let (min, max) = trajectory.bounds();
        Self {
            min,
            max,
            trajectory,
            initialise: None,
            finalise: None,
            tools: ToolData::NONE,
        }
    }

    /// Restrict the trajectory parameter range.
    pub fn with_bounds(mut self, min: f32, max: f32) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    /// Attach initialisation and finalisation hooks.
    pub fn with_hooks(mut self, initialise: Option<MovementHook>, finalise: Option<MovementHook>) -> Self {
        self.initialise = initialise;
        self.finalise = finalise;
        self
    }

    /// Drive tools during the movement.
    pub fn with_tools(mut self, tools: ToolData) -> Self {
        self.tools = tools;
        self
    }
}

/// A planned movement waiting in the queue or executing.
#[derive(Debug, Clone, Copy)]
pub struct MovementDescriptor<const N: usize> {
    /// Sequence id, increasing with every enqueued movement.
    pub id: u32,
    /// Lower trajectory parameter bound.
    pub min: f32,
    /// Upper trajectory parameter bound.
    pub max: f32,
    /// Position function.
    pub trajectory: Path<N>,
    /// Run when pre-processing starts.
    pub initialise: Option<MovementHook>,
    /// Run when pre-processing ends.
    pub finalise: Option<MovementHook>,
    /// Tools driven during the movement.
    pub tools: ToolData,
    /// Trajectory parameter increments.
    pub increments: IncrementBounds,
    /// Speed constants.
    pub speed: SpeedEnvironment,
    /// Unit direction at `min`.
    pub entry_direction: [f32; N],
    /// Unit direction at `max`.
    pub exit_direction: [f32; N],
    /// Path speed when entering the movement.
    pub entry_speed: f32,
    /// Path speed when leaving the movement, zero until a successor links.
    pub exit_speed: f32,
    /// The entry speed is limited by an axis jerk.
    pub jerk_point: bool,
    /// Distance travelled between `min` and `max`.
    pub path_length: f32,
}

impl<const N: usize> MovementDescriptor<N> {
    /// Boundary data at the start of the movement.
    pub fn entry_side(&self) -> JunctionSide<N> {
        JunctionSide {
            direction: self.entry_direction,
            speed: self.speed.regulation_speed,
        }
    }

    /// Boundary data at the end of the movement.
    pub fn exit_side(&self) -> JunctionSide<N> {
        JunctionSide {
            direction: self.exit_direction,
            speed: self.speed.regulation_speed,
        }
    }
}
