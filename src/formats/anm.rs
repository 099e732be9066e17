//! ANM Animation Decoder
//!
//! ```text
//! magic        cstring  "ANM1.0"
//! header       u8 bone_count, u32 frame_count, u32 frame_rate
//! per bone     name: cstring,
//!              frame_count x (pos: 3 x f32, rot: 4 x f32 (xyzw), scale: 3 x f32)
//! ```
//!
//! Frames store deltas against the bone's bind pose. The decoder composes
//! them into skeleton-space poses, see [`PoseSample::compose`]. Bones the
//! skeleton does not know are reported and skipped without losing stream
//! alignment.

use glam::{Quat, Vec3};
use indexmap::IndexMap;

use crate::animation::{BoneTrack, PoseSample, TrackSet};
use crate::diagnostics::Diagnostics;
use crate::errors::Result;
use crate::formats::expect_magic;
use crate::io::{ByteCursor, FormatSpec};
use crate::skeleton::Skeleton;

pub const ANM_MAGIC: &str = "ANM1.0";

/// Floats per frame record: position, rotation, scale.
const FRAME_FLOATS: usize = 3 + 4 + 3;

#[derive(Debug, Clone, Copy, Default)]
pub struct AnimationDecoder;

impl AnimationDecoder {
    /// Decodes an animation against `skeleton`. `label` names the file in
    /// diagnostics.
    pub fn decode(
        bytes: &[u8],
        skeleton: &Skeleton,
        label: &str,
        diagnostics: &mut Diagnostics,
    ) -> Result<TrackSet> {
        let mut cursor = ByteCursor::new(bytes);
        expect_magic(&mut cursor, ANM_MAGIC)?;

        let header = cursor.read_struct("<BLL")?;
        let bone_count = header[0].as_usize();
        let frame_count = header[1].as_u32();
        let frame_rate = header[2].as_u32();
        let frame_spec = FormatSpec::parse("<10f")?;
        log::debug!(
            "Animation {label}: {bone_count} bones, {frame_count} frames at {frame_rate} fps"
        );

        let mut tracks = IndexMap::with_capacity(bone_count);
        for _ in 0..bone_count {
            let name = cursor.read_cstring()?;
            let Some(bone) = skeleton.bone(&name) else {
                diagnostics.warning(format!(
                    "Animation {label} contains an unknown bone {name}."
                ));
                cursor.read_bytes(frame_count as usize * FRAME_FLOATS * 4)?;
                continue;
            };

            let (position, rotation, scale) = bone.bind_pose();
            let bind = PoseSample {
                position,
                rotation,
                scale,
            };

            let mut samples = Vec::with_capacity(frame_count as usize);
            for _ in 0..frame_count {
                let v = cursor.read_spec(&frame_spec)?;
                let delta = PoseSample {
                    position: Vec3::new(v[0].as_f32(), v[1].as_f32(), v[2].as_f32()),
                    rotation: Quat::from_xyzw(
                        v[3].as_f32(),
                        v[4].as_f32(),
                        v[5].as_f32(),
                        v[6].as_f32(),
                    ),
                    scale: Vec3::new(v[7].as_f32(), v[8].as_f32(), v[9].as_f32()),
                };
                samples.push(PoseSample::compose(&delta, &bind));
            }
            tracks.insert(name, BoneTrack { samples });
        }

        Ok(TrackSet {
            frame_count,
            frame_rate,
            tracks,
        })
    }
}
