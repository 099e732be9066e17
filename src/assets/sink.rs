//! Output Sinks
//!
//! The loader hands every decoded artifact to a [`UnitSink`] as soon as it is
//! ready: materials first (to get a handle back), then meshes and clips. A
//! host that builds a scene implements the trait; [`CollectingSink`] simply
//! keeps everything and yields a [`UnitAsset`].

use crate::animation::AnimationClip;
use crate::assets::material::MaterialDescriptor;
use crate::formats::msh::{AttachmentBox, MeshMetadata};
use crate::mesh::WeldedMesh;
use crate::skeleton::Skeleton;

/// A mesh ready for scene construction.
#[derive(Debug, Clone)]
pub struct MeshOutput<M> {
    pub mesh: WeldedMesh,
    pub material: Option<M>,
    pub attachment_box: Option<AttachmentBox>,
    pub metadata: MeshMetadata,
    /// Skeleton index of each bone in the mesh file's own table.
    pub skeleton_bones: Vec<usize>,
    /// The bone the mesh is attached to, if any.
    pub parent_bone: Option<usize>,
}

pub trait UnitSink {
    /// Host-side material handle.
    type Material;

    fn bind_material(&mut self, material: &MaterialDescriptor) -> Self::Material;

    /// Called once per mesh. `skeleton` already contains the mesh's bones.
    fn add_mesh(&mut self, skeleton: &Skeleton, mesh: MeshOutput<Self::Material>);

    fn add_clip(&mut self, skeleton: &Skeleton, clip: AnimationClip);
}

/// Everything a unit load produced.
#[derive(Debug, Clone, Default)]
pub struct UnitAsset {
    pub skeleton: Skeleton,
    pub meshes: Vec<MeshOutput<MaterialDescriptor>>,
    pub clips: Vec<AnimationClip>,
    /// Uniform rig scale from the import settings.
    pub scale: f32,
}

impl UnitAsset {
    #[must_use]
    pub fn clip(&self, name: &str) -> Option<&AnimationClip> {
        self.clips.iter().find(|c| c.name == name)
    }

    #[must_use]
    pub fn mesh(&self, name: &str) -> Option<&MeshOutput<MaterialDescriptor>> {
        self.meshes.iter().find(|m| m.mesh.name == name)
    }

    pub fn clip_names(&self) -> impl Iterator<Item = &str> {
        self.clips.iter().map(|c| c.name.as_str())
    }
}

#[derive(Debug, Default)]
pub struct CollectingSink {
    pub meshes: Vec<MeshOutput<MaterialDescriptor>>,
    pub clips: Vec<AnimationClip>,
}

impl CollectingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn into_asset(self, skeleton: Skeleton, scale: f32) -> UnitAsset {
        UnitAsset {
            skeleton,
            meshes: self.meshes,
            clips: self.clips,
            scale,
        }
    }
}

impl UnitSink for CollectingSink {
    type Material = MaterialDescriptor;

    fn bind_material(&mut self, material: &MaterialDescriptor) -> MaterialDescriptor {
        material.clone()
    }

    fn add_mesh(&mut self, _skeleton: &Skeleton, mesh: MeshOutput<MaterialDescriptor>) {
        self.meshes.push(mesh);
    }

    fn add_clip(&mut self, _skeleton: &Skeleton, clip: AnimationClip) {
        self.clips.push(clip);
    }
}
