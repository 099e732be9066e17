//! Skeleton
//!
//! One shared bone hierarchy per unit. Bones are stored in insertion order
//! with a name index beside them; a bone's parent always precedes it in the
//! list. Bones are never removed once added, so indices handed out by
//! [`SkeletonBuilder::merge`] stay valid for the whole load.
//!
//! Bind matrices are kept in skeleton (armature) space. The parent-relative
//! matrix is derived on demand with [`Skeleton::local_matrix`].

use glam::{Mat4, Quat, Vec3};
use rustc_hash::FxHashMap;

use crate::errors::{ImportError, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct Bone {
    pub name: String,
    /// Rest pose in skeleton space.
    pub bind_matrix: Mat4,
    pub parent: Option<usize>,
}

impl Bone {
    /// Splits the bind matrix into `(translation, rotation, scale)`.
    #[must_use]
    pub fn bind_pose(&self) -> (Vec3, Quat, Vec3) {
        let (scale, rotation, translation) = self.bind_matrix.to_scale_rotation_translation();
        (translation, rotation, scale)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Skeleton {
    bones: Vec<Bone>,
    by_name: FxHashMap<String, usize>,
}

impl Skeleton {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bones.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    #[must_use]
    pub fn bone(&self, name: &str) -> Option<&Bone> {
        self.index_of(name).map(|i| &self.bones[i])
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Bone> {
        self.bones.get(index)
    }

    /// Bind pose relative to the parent bone (skeleton space for roots).
    #[must_use]
    pub fn local_matrix(&self, index: usize) -> Option<Mat4> {
        let bone = self.bones.get(index)?;
        Some(match bone.parent {
            Some(parent) => self.bones[parent].bind_matrix.inverse() * bone.bind_matrix,
            None => bone.bind_matrix,
        })
    }

    /// Bones without a parent, in insertion order.
    pub fn roots(&self) -> impl Iterator<Item = (usize, &Bone)> {
        self.bones
            .iter()
            .enumerate()
            .filter(|(_, bone)| bone.parent.is_none())
    }

    /// Direct children of `index`, in insertion order.
    pub fn children(&self, index: usize) -> impl Iterator<Item = (usize, &Bone)> {
        self.bones
            .iter()
            .enumerate()
            .filter(move |(_, bone)| bone.parent == Some(index))
    }
}

// ============================================================================
// Skeleton fragments
// ============================================================================

/// A bone as decoded from one mesh file, before it joins the shared skeleton.
#[derive(Debug, Clone, PartialEq)]
pub struct FragmentBone {
    pub name: String,
    /// Skeleton-space bind matrix. Ignored when `reuses_parent` is set.
    pub bind_matrix: Mat4,
    /// The file bone has the attachment bone's name and stands for it.
    pub reuses_parent: bool,
}

/// The bone table of one mesh file, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkeletonFragment {
    pub bones: Vec<FragmentBone>,
}

impl SkeletonFragment {
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bones.iter().map(|b| b.name.as_str())
    }
}

// ============================================================================
// SkeletonBuilder
// ============================================================================

/// Accumulates fragments from successive mesh decodes into one skeleton.
#[derive(Debug, Default)]
pub struct SkeletonBuilder {
    skeleton: Skeleton,
}

impl SkeletonBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    /// Resolves an attachment bone by name.
    pub fn attachment(&self, name: &str) -> Result<usize> {
        self.skeleton
            .index_of(name)
            .ok_or_else(|| ImportError::UnknownBone(name.to_string()))
    }

    /// Adds a bone unless one with the same name exists, returning the
    /// bone's index either way. An existing bone is left untouched.
    pub fn insert_or_reuse(&mut self, name: &str, bind_matrix: Mat4, parent: Option<usize>) -> usize {
        if let Some(index) = self.skeleton.index_of(name) {
            log::debug!("Reusing existing bone {name:?}");
            return index;
        }
        debug_assert!(parent.is_none_or(|p| p < self.skeleton.bones.len()));

        let index = self.skeleton.bones.len();
        self.skeleton.bones.push(Bone {
            name: name.to_string(),
            bind_matrix,
            parent,
        });
        self.skeleton.by_name.insert(name.to_string(), index);
        index
    }

    /// Merges a decoded fragment. New bones are parented to `attach_to`
    /// (or left as roots). Returns, for every file bone, its index in the
    /// shared skeleton.
    pub fn merge(&mut self, fragment: &SkeletonFragment, attach_to: Option<usize>) -> Vec<usize> {
        let before = self.skeleton.len();
        let mapping: Vec<usize> = fragment
            .bones
            .iter()
            .map(|bone| match (bone.reuses_parent, attach_to) {
                (true, Some(parent)) => parent,
                _ => self.insert_or_reuse(&bone.name, bone.bind_matrix, attach_to),
            })
            .collect();
        log::debug!(
            "Merged skeleton fragment: {} file bones, {} new",
            fragment.bones.len(),
            self.skeleton.len() - before
        );
        mapping
    }

    #[must_use]
    pub fn build(self) -> Skeleton {
        self.skeleton
    }
}
