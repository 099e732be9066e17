//! Indexed Meshes
//!
//! [`WeldedMesh`] is the indexed form of a decoded triangle soup, produced by
//! [`VertexWelder`]. It is immutable once built.

pub mod weld;

pub use weld::{VertexWelder, WeldStats};

use glam::{Vec2, Vec3};
use indexmap::IndexMap;

use crate::formats::layout::BoneLinks;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexWeight {
    pub vertex: u32,
    pub weight: f32,
}

#[derive(Debug, Clone, Default)]
pub struct WeldedMesh {
    pub name: String,

    // === Vertex buffer ===
    pub positions: Vec<Vec3>,
    /// Normal of each vertex's representative; zero when the file has none.
    pub normals: Vec<Vec3>,
    /// Skin links per vertex, indexing `bone_names`.
    pub skin: Vec<BoneLinks>,

    /// Bone table of the source file.
    pub bone_names: Vec<String>,

    // === Faces ===
    /// Every index is valid and the three indices of a triangle are distinct.
    pub triangles: Vec<[u32; 3]>,
    /// Three per triangle, taken from the raw corners before welding.
    pub corner_normals: Vec<Vec3>,
    /// Three per triangle, or empty when the file has no texture coordinates.
    pub corner_uvs: Vec<Vec2>,

    /// One group per file bone, in bone table order, possibly empty.
    pub vertex_groups: IndexMap<String, Vec<VertexWeight>>,

    pub stats: WeldStats,
}

impl WeldedMesh {
    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    #[must_use]
    pub fn has_uvs(&self) -> bool {
        !self.corner_uvs.is_empty()
    }

    #[must_use]
    pub fn vertex_group(&self, bone: &str) -> Option<&[VertexWeight]> {
        self.vertex_groups.get(bone).map(Vec::as_slice)
    }

    /// Rebuilds the per-bone groups from the per-vertex skin links.
    pub(crate) fn rebuild_vertex_groups(&mut self) {
        let mut groups: IndexMap<String, Vec<VertexWeight>> = self
            .bone_names
            .iter()
            .map(|name| (name.clone(), Vec::new()))
            .collect();

        for (vertex, links) in self.skin.iter().enumerate() {
            for link in links {
                let Some(name) = self.bone_names.get(usize::from(link.bone)) else {
                    continue;
                };
                if let Some(group) = groups.get_mut(name) {
                    group.push(VertexWeight {
                        vertex: vertex as u32,
                        weight: link.weight,
                    });
                }
            }
        }
        self.vertex_groups = groups;
    }
}
