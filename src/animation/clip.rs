use std::path::PathBuf;

use indexmap::IndexMap;

use crate::animation::tracks::BoneTrack;

/// Decoded content of one `.anm` file: tracks of the bones known to the
/// skeleton, in file order.
#[derive(Debug, Clone, Default)]
pub struct TrackSet {
    pub frame_count: u32,
    pub frame_rate: u32,
    pub tracks: IndexMap<String, BoneTrack>,
}

impl TrackSet {
    #[must_use]
    pub fn track(&self, bone: &str) -> Option<&BoneTrack> {
        self.tracks.get(bone)
    }

    /// Inclusive frame range `[0, frame_count - 1]`.
    #[must_use]
    pub fn frame_range(&self) -> (u32, u32) {
        (0, self.frame_count.saturating_sub(1))
    }

    /// Length in seconds; zero when the frame rate is zero.
    #[must_use]
    pub fn duration(&self) -> f32 {
        if self.frame_rate == 0 {
            return 0.0;
        }
        self.frame_range().1 as f32 / self.frame_rate as f32
    }
}

/// A named take bound to the unit skeleton.
#[derive(Debug, Clone)]
pub struct AnimationClip {
    pub name: String,
    /// The `.anm` file the clip was decoded from.
    pub source: PathBuf,
    pub frame_range: (u32, u32),
    pub tracks: TrackSet,
}

impl AnimationClip {
    #[must_use]
    pub fn new(name: String, source: PathBuf, tracks: TrackSet) -> Self {
        Self {
            name,
            source,
            frame_range: tracks.frame_range(),
            tracks,
        }
    }

    #[must_use]
    pub fn duration(&self) -> f32 {
        self.tracks.duration()
    }
}
