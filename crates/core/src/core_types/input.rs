//! Per-frame input snapshot.
//!
//! The simulation never polls the OS. The host samples keyboard and mouse
//! once per frame and hands the result to [`crate::GameSimulation::step`].

use serde::{Deserialize, Serialize};

/// Raw input state for a single frame.
///
/// Mouse deltas are the cursor displacement since the previous frame, in
/// pixels. They are consumed by exactly one `step` call.
#[expect(
    clippy::struct_excessive_bools,
    reason = "mirrors the host's key-down table"
)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InputSnapshot {
    /// W
    pub forward: bool,
    /// S
    pub backward: bool,
    /// A
    pub left: bool,
    /// D
    pub right: bool,
    /// Reload key held this frame
    pub reload: bool,
    /// Fire button held this frame
    pub fire: bool,
    /// Horizontal mouse displacement (pixels, +right)
    pub mouse_dx: f32,
    /// Vertical mouse displacement (pixels, +down)
    pub mouse_dy: f32,
}

impl InputSnapshot {
    /// Snapshot with nothing pressed and no mouse motion.
    pub fn idle() -> Self {
        Self::default()
    }
}
