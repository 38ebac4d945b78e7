use serde::{Deserialize, Serialize};
use tracing::warn;

/// What the player's weapon rig is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum PlayerState {
    #[default]
    Idle = 0,
    Run = 1,
    Fire = 2,
    Reload = 3,
}

impl PlayerState {
    pub const ALL: [PlayerState; 4] = [
        PlayerState::Idle,
        PlayerState::Run,
        PlayerState::Fire,
        PlayerState::Reload,
    ];

    /// Slot in an [`ActionTable`]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            PlayerState::Idle => "idle",
            PlayerState::Run => "run",
            PlayerState::Fire => "fire",
            PlayerState::Reload => "reload",
        }
    }
}

/// Clip and optional lock duration for one state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionSpec {
    pub clip: String,
    /// Seconds the state is locked once entered. `None` means untimed.
    pub duration: Option<f32>,
}

impl ActionSpec {
    pub fn untimed(clip: &str) -> Self {
        ActionSpec {
            clip: clip.to_owned(),
            duration: None,
        }
    }

    pub fn timed(clip: &str, duration: f32) -> Self {
        ActionSpec {
            clip: clip.to_owned(),
            duration: Some(duration),
        }
    }
}

/// Per-state clip names and durations, indexed by [`PlayerState`].
///
/// A fixed array means every state always has an entry; there is no lookup
/// that can miss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionTable {
    /// In [`PlayerState::ALL`] order
    pub specs: [ActionSpec; 4],
    /// Playback of a locked state holds at `duration - hold_epsilon`
    pub hold_epsilon: f32,
}

impl Default for ActionTable {
    fn default() -> Self {
        ActionTable {
            specs: [
                ActionSpec::untimed("04 idle"),
                ActionSpec::untimed("07 run"),
                ActionSpec::timed("08 fire", 0.25),
                ActionSpec::timed("17 reload", 1.8),
            ],
            hold_epsilon: 0.01,
        }
    }
}

impl ActionTable {
    pub fn spec(&self, state: PlayerState) -> &ActionSpec {
        &self.specs[state.index()]
    }

    pub fn clip(&self, state: PlayerState) -> &str {
        &self.spec(state).clip
    }

    /// Lock duration in seconds, 0 for untimed states.
    pub fn duration(&self, state: PlayerState) -> f32 {
        self.spec(state).duration.unwrap_or(0.0)
    }

    pub fn is_timed(&self, state: PlayerState) -> bool {
        self.duration(state) > 0.0
    }

    /// Copy with unusable durations dropped (made untimed) and the hold
    /// epsilon reset if it is not a small positive number.
    pub fn validated(&self) -> Self {
        let mut table = self.clone();
        for state in PlayerState::ALL {
            let spec = &mut table.specs[state.index()];
            if let Some(d) = spec.duration {
                if !d.is_finite() || d <= 0.0 {
                    warn!(
                        "Action {} has invalid duration {}, treating as untimed",
                        state.name(),
                        d
                    );
                    spec.duration = None;
                }
            }
        }
        if !table.hold_epsilon.is_finite() || table.hold_epsilon <= 0.0 {
            warn!(
                "Action hold epsilon {} is invalid, using 0.01",
                table.hold_epsilon
            );
            table.hold_epsilon = 0.01;
        }
        table
    }
}
