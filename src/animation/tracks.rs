use glam::{Mat4, Quat, Vec3};

/// One decoded frame of one bone, already composed with the bind pose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseSample {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl PoseSample {
    /// Skeleton-space pose matrix.
    #[must_use]
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Composes a file-stored delta onto a bind pose:
    /// `position + bind_position`, `rotation ∘ bind_rotation`, `scale ⊙ bind_scale`.
    #[must_use]
    pub fn compose(delta: &PoseSample, bind: &PoseSample) -> Self {
        Self {
            position: delta.position + bind.position,
            rotation: delta.rotation * bind.rotation,
            scale: delta.scale * bind.scale,
        }
    }

    #[must_use]
    pub fn interpolate_linear(a: &Self, b: &Self, t: f32) -> Self {
        Self {
            position: a.position.lerp(b.position, t),
            rotation: a.rotation.slerp(b.rotation, t),
            scale: a.scale.lerp(b.scale, t),
        }
    }
}

/// Per-frame samples of one bone. Frame `i` is at time `i / frame_rate`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoneTrack {
    pub samples: Vec<PoseSample>,
}

impl BoneTrack {
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Samples at a fractional frame, clamped to the track, interpolating
    /// linearly between neighbouring frames. `None` for an empty track.
    #[must_use]
    pub fn sample(&self, frame: f32) -> Option<PoseSample> {
        let last = self.samples.len().checked_sub(1)?;
        let frame = frame.clamp(0.0, last as f32);
        let index = (frame.floor() as usize).min(last);
        if index == last {
            return Some(self.samples[last]);
        }
        let t = frame - index as f32;
        Some(PoseSample::interpolate_linear(
            &self.samples[index],
            &self.samples[index + 1],
            t,
        ))
    }
}
