//! Magazine and reserve bookkeeping.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmmoState {
    /// Rounds in the current clip
    pub clip: u32,
    /// Clip capacity
    pub clip_capacity: u32,
    /// Rounds carried outside the clip
    pub reserve: u32,
}

impl AmmoState {
    /// Full clip plus `reserve` spare rounds.
    pub fn new(clip_capacity: u32, reserve: u32) -> Self {
        AmmoState {
            clip: clip_capacity,
            clip_capacity,
            reserve,
        }
    }

    /// Rounds missing from the clip
    pub fn needed(&self) -> u32 {
        self.clip_capacity.saturating_sub(self.clip)
    }

    pub fn is_clip_full(&self) -> bool {
        self.clip >= self.clip_capacity
    }

    pub fn is_clip_empty(&self) -> bool {
        self.clip == 0
    }

    /// Remove one round from the clip. Returns false when the clip is empty.
    pub fn consume_round(&mut self) -> bool {
        if self.clip == 0 {
            return false;
        }
        self.clip -= 1;
        true
    }

    /// Move `min(needed, reserve)` rounds from reserve into the clip.
    ///
    /// Returns the number of rounds moved.
    pub fn refill(&mut self) -> u32 {
        let moved = self.needed().min(self.reserve);
        self.clip += moved;
        self.reserve -= moved;
        moved
    }
}
