//! Vertex Welding
//!
//! Collapses an exploded triangle soup into an indexed mesh.
//!
//! 1. All positions go into a kd-tree.
//! 2. Each vertex, in file order, looks up its neighbours within the
//!    position tolerance. It joins the group of the lowest-index neighbour
//!    that already leads a group, or starts a group of its own. This is a
//!    deterministic first-match policy, not a nearest-neighbour one.
//! 3. Inside a group a vertex merges into the first representative whose
//!    normal is within the normal tolerance, whose bone set is identical and
//!    whose weight vector is within the weight tolerance. Otherwise it
//!    becomes a new representative, which is a new output vertex.
//! 4. Triangles are remapped; degenerate ones and repeats of an already
//!    emitted index set (any winding) are dropped.
//!
//! With welding disabled the soup passes through unchanged, three fresh
//! vertices per triangle.

use glam::{Vec2, Vec3};
use kdtree::KdTree;
use kdtree::distance::squared_euclidean;
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

use crate::formats::layout::{RawMeshData, RawVertex};
use crate::mesh::WeldedMesh;
use crate::settings::WeldSettings;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WeldStats {
    pub input_vertices: usize,
    pub output_vertices: usize,
    pub input_triangles: usize,
    pub degenerate_triangles: usize,
    pub duplicate_triangles: usize,
}

/// A representative already accepted inside a position group.
struct Representative {
    output: u32,
    normal: Vec3,
    bones: SmallVec<[u16; 4]>,
    weights: SmallVec<[f32; 4]>,
}

impl Representative {
    fn of(output: u32, vertex: &RawVertex) -> Self {
        Self {
            output,
            normal: vertex.normal.unwrap_or(Vec3::ZERO),
            bones: vertex.links.iter().map(|l| l.bone).collect(),
            weights: vertex.links.iter().map(|l| l.weight).collect(),
        }
    }

    fn accepts(&self, candidate: &Representative, settings: &WeldSettings) -> bool {
        if (self.normal - candidate.normal).length() >= settings.normal_tolerance {
            return false;
        }
        if self.bones != candidate.bones {
            return false;
        }
        let distance = self
            .weights
            .iter()
            .zip(&candidate.weights)
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f32>()
            .sqrt();
        distance < settings.weight_tolerance
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct VertexWelder {
    settings: WeldSettings,
}

impl VertexWelder {
    #[must_use]
    pub fn new(settings: WeldSettings) -> Self {
        Self { settings }
    }

    #[inline]
    #[must_use]
    pub fn settings(&self) -> &WeldSettings {
        &self.settings
    }

    #[must_use]
    pub fn weld(&self, raw: &RawMeshData) -> WeldedMesh {
        let mesh = if self.settings.enabled {
            self.weld_soup(raw)
        } else {
            pass_through(raw)
        };
        log::debug!(
            "Mesh {}: {} -> {} vertices, {} -> {} triangles ({} degenerate, {} duplicate)",
            mesh.name,
            mesh.stats.input_vertices,
            mesh.stats.output_vertices,
            mesh.stats.input_triangles,
            mesh.triangles.len(),
            mesh.stats.degenerate_triangles,
            mesh.stats.duplicate_triangles
        );
        mesh
    }

    /// Maps every raw vertex to its output vertex. Returns the map and the
    /// raw index chosen for each output vertex.
    fn merge_map(&self, vertices: &[RawVertex]) -> (Vec<u32>, Vec<usize>) {
        let mut tree: KdTree<f32, usize, [f32; 3]> = KdTree::new(3);
        for (index, vertex) in vertices.iter().enumerate() {
            if tree.add(vertex.position.to_array(), index).is_err() {
                log::warn!("Vertex {index} has a non-finite position and will not be welded");
            }
        }

        let radius = self.settings.position_tolerance * self.settings.position_tolerance;
        let mut leaders: FxHashSet<usize> = FxHashSet::default();
        let mut groups: FxHashMap<usize, Vec<Representative>> = FxHashMap::default();
        let mut remap = Vec::with_capacity(vertices.len());
        let mut kept = Vec::new();

        for (index, vertex) in vertices.iter().enumerate() {
            let leader = tree
                .within(&vertex.position.to_array(), radius, &squared_euclidean)
                .unwrap_or_default()
                .into_iter()
                .map(|(_, &other)| other)
                .filter(|&other| other != index && leaders.contains(&other))
                .min();
            let group = match leader {
                Some(group) => group,
                None => {
                    leaders.insert(index);
                    index
                }
            };

            let candidate = Representative::of(kept.len() as u32, vertex);
            let representatives = groups.entry(group).or_default();
            let output = match representatives
                .iter()
                .find(|rep| rep.accepts(&candidate, &self.settings))
            {
                Some(rep) => rep.output,
                None => {
                    let output = candidate.output;
                    representatives.push(candidate);
                    kept.push(index);
                    output
                }
            };
            remap.push(output);
        }
        (remap, kept)
    }

    fn weld_soup(&self, raw: &RawMeshData) -> WeldedMesh {
        let vertices = &raw.vertices;
        let (remap, kept) = self.merge_map(vertices);
        let has_uvs = vertices.iter().any(|v| v.texture_coordinate.is_some());

        let mut stats = WeldStats {
            input_vertices: vertices.len(),
            output_vertices: kept.len(),
            input_triangles: raw.triangle_count(),
            ..WeldStats::default()
        };

        let mut triangles = Vec::with_capacity(raw.triangle_count());
        let mut corner_normals = Vec::with_capacity(raw.triangle_count() * 3);
        let mut corner_uvs = Vec::new();
        let mut seen: FxHashSet<[u32; 3]> = FxHashSet::default();

        for (face, corners) in raw.triangles().enumerate() {
            let base = face * 3;
            let triangle = [remap[base], remap[base + 1], remap[base + 2]];
            if triangle[0] == triangle[1] || triangle[1] == triangle[2] || triangle[0] == triangle[2] {
                stats.degenerate_triangles += 1;
                continue;
            }
            let mut key = triangle;
            key.sort_unstable();
            if !seen.insert(key) {
                stats.duplicate_triangles += 1;
                continue;
            }

            triangles.push(triangle);
            corner_normals.extend(corners.iter().map(|v| v.normal.unwrap_or(Vec3::ZERO)));
            if has_uvs {
                corner_uvs.extend(corners.iter().map(corner_uv));
            }
        }

        let mut mesh = WeldedMesh {
            name: raw.name.clone(),
            positions: kept.iter().map(|&i| vertices[i].position).collect(),
            normals: kept
                .iter()
                .map(|&i| vertices[i].normal.unwrap_or(Vec3::ZERO))
                .collect(),
            skin: kept.iter().map(|&i| vertices[i].links.clone()).collect(),
            bone_names: raw.bone_names.clone(),
            triangles,
            corner_normals,
            corner_uvs,
            vertex_groups: Default::default(),
            stats,
        };
        mesh.rebuild_vertex_groups();
        mesh
    }
}

fn corner_uv(vertex: &RawVertex) -> Vec2 {
    vertex.texture_coordinate.unwrap_or(Vec2::ZERO)
}

fn pass_through(raw: &RawMeshData) -> WeldedMesh {
    let vertices = &raw.vertices;
    let has_uvs = vertices.iter().any(|v| v.texture_coordinate.is_some());
    let normals: Vec<Vec3> = vertices
        .iter()
        .map(|v| v.normal.unwrap_or(Vec3::ZERO))
        .collect();

    let mut mesh = WeldedMesh {
        name: raw.name.clone(),
        positions: vertices.iter().map(|v| v.position).collect(),
        corner_normals: normals.clone(),
        normals,
        skin: vertices.iter().map(|v| v.links.clone()).collect(),
        bone_names: raw.bone_names.clone(),
        triangles: (0..raw.triangle_count() as u32)
            .map(|t| [3 * t, 3 * t + 1, 3 * t + 2])
            .collect(),
        corner_uvs: if has_uvs {
            vertices.iter().map(corner_uv).collect()
        } else {
            Vec::new()
        },
        vertex_groups: Default::default(),
        stats: WeldStats {
            input_vertices: vertices.len(),
            output_vertices: vertices.len(),
            input_triangles: raw.triangle_count(),
            ..WeldStats::default()
        },
    };
    mesh.rebuild_vertex_groups();
    mesh
}
