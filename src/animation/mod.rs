//! Decoded animation data: per-bone pose tracks and named clips.

pub mod clip;
pub mod tracks;

pub use clip::{AnimationClip, TrackSet};
pub use tracks::{BoneTrack, PoseSample};
