//! Animation playback handle.
//!
//! Skeletal sampling lives in the renderer. The simulation only ever picks
//! which clip is active and moves its playback time, so that is the whole
//! contract of [`AnimationPlayback`].

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Minimal contract the simulation needs from an animation instance.
pub trait AnimationPlayback {
    /// Name of the clip currently playing
    fn active_clip(&self) -> &str;

    /// Switch clips. Does not touch playback time.
    fn set_active_clip(&mut self, name: &str);

    /// Current playback time in seconds
    fn time(&self) -> f32;

    /// Set playback time in seconds
    fn set_time(&mut self, t: f32);

    /// Advance playback by `dt` seconds
    fn advance(&mut self, dt: f32);
}

/// In-core animation instance: clip name plus playback time.
///
/// Clips with a registered positive length loop; unknown clips accumulate
/// time without wrapping.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClipPlayer {
    clip: String,
    time: f32,
    clip_lengths: FxHashMap<String, f32>,
}

impl ClipPlayer {
    /// Create a player with `clip` active at time zero.
    pub fn new(clip: &str) -> Self {
        ClipPlayer {
            clip: clip.to_owned(),
            time: 0.0,
            clip_lengths: FxHashMap::default(),
        }
    }

    /// Register (or replace) the length of a clip in seconds.
    ///
    /// Non-finite or non-positive lengths are ignored.
    pub fn with_clip_length(mut self, clip: &str, length: f32) -> Self {
        self.set_clip_length(clip, length);
        self
    }

    /// Register (or replace) the length of a clip in seconds.
    pub fn set_clip_length(&mut self, clip: &str, length: f32) {
        if length.is_finite() && length > 0.0 {
            self.clip_lengths.insert(clip.to_owned(), length);
        }
    }

    /// Length of `clip` if known
    pub fn clip_length(&self, clip: &str) -> Option<f32> {
        self.clip_lengths.get(clip).copied()
    }

    /// Playback time as a fraction of the active clip's length.
    ///
    /// `None` when the active clip has no registered length.
    pub fn normalized_time(&self) -> Option<f32> {
        self.clip_length(&self.clip)
            .map(|len| (self.time / len).clamp(0.0, 1.0))
    }
}

impl AnimationPlayback for ClipPlayer {
    fn active_clip(&self) -> &str {
        &self.clip
    }

    fn set_active_clip(&mut self, name: &str) {
        if self.clip != name {
            name.clone_into(&mut self.clip);
        }
    }

    fn time(&self) -> f32 {
        self.time
    }

    fn set_time(&mut self, t: f32) {
        self.time = if t.is_finite() { t.max(0.0) } else { 0.0 };
    }

    fn advance(&mut self, dt: f32) {
        if !dt.is_finite() {
            return;
        }
        self.time = (self.time + dt).max(0.0);
        if let Some(len) = self.clip_length(&self.clip) {
            self.time %= len;
        }
    }
}
