//! Audio and particle cues produced by block destruction.
//!
//! Cues are collected per tick and handed to whatever plays them; the
//! session never plays anything itself.

use vantage_world::SoundProfile;

/// A single feedback event.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FeedbackCue {
    /// The actor started hitting a block.
    Attack,
    /// Periodic hit sound while breaking.
    Hit {
        /// Playback volume.
        volume: f32,
        /// Playback pitch.
        pitch: f32,
    },
    /// A block broke locally.
    Broken,
    /// The crack overlay changed. `-1` clears it.
    CrackStage(i32),
}

impl FeedbackCue {
    /// Hit cue for a material's sound profile. Hits are quieter and lower
    /// than the base sound.
    pub fn hit(sound: SoundProfile) -> Self {
        Self::Hit {
            volume: (sound.volume + 1.0) / 8.0,
            pitch: sound.pitch * 0.5,
        }
    }
}
