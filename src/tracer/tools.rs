//! Tool power bookkeeping.

use crate::hal::ToolOutputs;
use crate::motion::ToolData;

/// Drive every active tool at a power proportional to `speed`.
pub(super) fn update_powers<O: ToolOutputs>(outputs: &mut O, tools: &ToolData, speed: f32) {
    for tool in tools.tools.axes() {
        outputs.set_power(tool as u8, tools.power(tool, speed));
    }
}

/// Switch off the tools `previous` drives and `next` does not.
pub(super) fn switch_tools<O: ToolOutputs>(outputs: &mut O, previous: &ToolData, next: &ToolData) {
    let released = previous.tools & !next.tools;
    if !released.is_empty() {
        outputs.stop_tools(released);
    }
}
