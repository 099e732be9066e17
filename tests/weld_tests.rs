//! Vertex Welding Tests
//!
//! Tests for:
//! - Merging of coincident corners with matching normal and skin
//! - Normal and skin-weight tolerances keeping corners apart
//! - Duplicate (any winding) and degenerate triangle removal
//! - Lowest-index tie-break between neighbouring groups
//! - Idempotence on an already welded mesh
//! - Pass-through mode, per-corner attributes and vertex groups

use glam::{Vec2, Vec3};

use gladius::formats::layout::{
    BoneLink, BoneLinks, LayoutEntry, RawMeshData, RawVertex, VertexLayout, attribute,
};
use gladius::mesh::{VertexWelder, WeldedMesh};
use gladius::settings::WeldSettings;

fn links(pairs: &[(u16, f32)]) -> BoneLinks {
    pairs
        .iter()
        .map(|&(bone, weight)| BoneLink { bone, weight })
        .collect()
}

fn vtx(x: f32, y: f32, z: f32) -> RawVertex {
    RawVertex {
        position: Vec3::new(x, y, z),
        normal: Some(Vec3::Z),
        texture_coordinate: Some(Vec2::new(x, y)),
        links: links(&[(0, 1.0)]),
    }
}

fn soup(vertices: Vec<RawVertex>) -> RawMeshData {
    let layout = VertexLayout::new(vec![
        LayoutEntry {
            name: attribute::POSITION.to_string(),
            components: 3,
        },
        LayoutEntry {
            name: attribute::NORMAL.to_string(),
            components: 3,
        },
    ])
    .unwrap();
    RawMeshData {
        name: "soup".to_string(),
        layout,
        bone_names: vec!["a".to_string(), "b".to_string()],
        vertices,
    }
}

/// Two triangles sharing the edge (1,0,0)-(0,1,0).
fn quad(second_corner: RawVertex) -> RawMeshData {
    soup(vec![
        vtx(0.0, 0.0, 0.0),
        vtx(1.0, 0.0, 0.0),
        vtx(0.0, 1.0, 0.0),
        second_corner,
        vtx(1.0, 1.0, 0.0),
        vtx(0.0, 1.0, 0.0),
    ])
}

fn weld(raw: &RawMeshData) -> WeldedMesh {
    VertexWelder::new(WeldSettings::default()).weld(raw)
}

fn assert_valid(mesh: &WeldedMesh) {
    for t in &mesh.triangles {
        assert!(t.iter().all(|&i| (i as usize) < mesh.vertex_count()));
        assert!(t[0] != t[1] && t[1] != t[2] && t[0] != t[2], "degenerate {t:?}");
    }
    assert_eq!(mesh.corner_normals.len(), mesh.triangles.len() * 3);
}

// ============================================================================
// Merging
// ============================================================================

#[test]
fn shared_edge_merges() {
    let mesh = weld(&quad(vtx(1.0, 0.0, 0.0)));

    assert_eq!(mesh.vertex_count(), 4);
    assert_eq!(mesh.triangle_count(), 2);
    assert_eq!(mesh.triangles[0], [0, 1, 2]);
    assert_eq!(mesh.triangles[1], [1, 3, 2]);
    assert_valid(&mesh);
}

#[test]
fn corners_within_position_tolerance_merge() {
    let mesh = weld(&quad(vtx(1.0005, 0.0, 0.0)));
    assert_eq!(mesh.vertex_count(), 4);
    // The first corner seen is the representative
    assert!((mesh.positions[1].x - 1.0).abs() < 1e-6);
}

#[test]
fn skin_weight_difference_prevents_merge() {
    let mut near = vtx(1.0, 0.0, 0.0);
    near.links = links(&[(0, 0.501), (1, 0.499)]);
    let mut far = vtx(1.0, 0.0, 0.0);
    far.links = links(&[(0, 0.6), (1, 0.4)]);

    let mut raw = quad(near);
    raw.vertices[1].links = links(&[(0, 0.5), (1, 0.5)]);
    assert_eq!(weld(&raw).vertex_count(), 4);

    let mut raw = quad(far);
    raw.vertices[1].links = links(&[(0, 0.5), (1, 0.5)]);
    assert_eq!(weld(&raw).vertex_count(), 5);
}

#[test]
fn different_bone_sets_never_merge() {
    let mut other = vtx(1.0, 0.0, 0.0);
    other.links = links(&[(1, 1.0)]);
    assert_eq!(weld(&quad(other)).vertex_count(), 5);
}

#[test]
fn opposite_normals_stay_apart() {
    let mut flipped = vtx(1.0, 0.0, 0.0);
    flipped.normal = Some(Vec3::NEG_Z);
    let mesh = weld(&quad(flipped));

    assert_eq!(mesh.vertex_count(), 5);
    assert_eq!(mesh.triangle_count(), 2);
}

#[test]
fn tight_normal_tolerance_splits_hard_edges() {
    let mut tilted = vtx(1.0, 0.0, 0.0);
    tilted.normal = Some(Vec3::X);
    let settings = WeldSettings {
        normal_tolerance: 0.5,
        ..WeldSettings::default()
    };
    let mesh = VertexWelder::new(settings).weld(&quad(tilted.clone()));
    assert_eq!(mesh.vertex_count(), 5);

    // The default tolerance merges the same corners
    assert_eq!(weld(&quad(tilted)).vertex_count(), 4);
}

#[test]
fn lowest_index_leader_wins() {
    let raw = soup(vec![
        vtx(0.0, 0.0, 0.0),
        vtx(5.0, 0.0, 0.0),
        vtx(0.0, 5.0, 0.0),
        vtx(0.0018, 0.0, 0.0),
        vtx(5.0, 5.0, 0.0),
        vtx(6.0, 5.0, 0.0),
        // Within tolerance of both vertex 0 and vertex 3
        vtx(0.0009, 0.0, 0.0),
        vtx(7.0, 7.0, 0.0),
        vtx(8.0, 7.0, 0.0),
    ]);
    let mesh = weld(&raw);

    assert_eq!(mesh.vertex_count(), 8);
    assert_eq!(mesh.triangles[2][0], mesh.triangles[0][0]);
    assert_ne!(mesh.triangles[1][0], mesh.triangles[0][0]);
}

// ============================================================================
// Triangles
// ============================================================================

#[test]
fn duplicate_triangles_any_winding_are_dropped() {
    let raw = soup(vec![
        vtx(0.0, 0.0, 0.0),
        vtx(1.0, 0.0, 0.0),
        vtx(0.0, 1.0, 0.0),
        vtx(0.0, 1.0, 0.0),
        vtx(1.0, 0.0, 0.0),
        vtx(0.0, 0.0, 0.0),
    ]);
    let mesh = weld(&raw);

    assert_eq!(mesh.vertex_count(), 3);
    assert_eq!(mesh.triangle_count(), 1);
    assert_eq!(mesh.stats.duplicate_triangles, 1);
    assert_valid(&mesh);
}

#[test]
fn collapsed_triangles_are_dropped() {
    let raw = soup(vec![
        vtx(0.0, 0.0, 0.0),
        vtx(0.0005, 0.0, 0.0),
        vtx(0.0, 1.0, 0.0),
    ]);
    let mesh = weld(&raw);

    assert_eq!(mesh.triangle_count(), 0);
    assert_eq!(mesh.stats.degenerate_triangles, 1);
    assert!(mesh.corner_normals.is_empty());
}

// ============================================================================
// Idempotence
// ============================================================================

/// Expands a welded mesh back into a triangle soup.
fn explode(mesh: &WeldedMesh) -> RawMeshData {
    let vertices = mesh
        .triangles
        .iter()
        .flatten()
        .map(|&i| {
            let i = i as usize;
            RawVertex {
                position: mesh.positions[i],
                normal: Some(mesh.normals[i]),
                texture_coordinate: None,
                links: mesh.skin[i].clone(),
            }
        })
        .collect();
    soup(vertices)
}

#[test]
fn welding_is_idempotent() {
    let mut flipped = vtx(1.0, 0.0, 0.0);
    flipped.normal = Some(Vec3::NEG_Z);
    let once = weld(&quad(flipped));
    let twice = weld(&explode(&once));

    assert_eq!(twice.vertex_count(), once.vertex_count());
    assert_eq!(twice.triangle_count(), once.triangle_count());
    assert_eq!(twice.triangles, once.triangles);
}

#[test]
fn distinct_positions_are_untouched() {
    let raw = soup(vec![
        vtx(0.0, 0.0, 0.0),
        vtx(1.0, 0.0, 0.0),
        vtx(0.0, 1.0, 0.0),
        vtx(3.0, 0.0, 0.0),
        vtx(4.0, 0.0, 0.0),
        vtx(3.0, 1.0, 0.0),
    ]);
    let mesh = weld(&raw);
    assert_eq!(mesh.vertex_count(), 6);
    assert_eq!(mesh.triangles, vec![[0, 1, 2], [3, 4, 5]]);
}

// ============================================================================
// Outputs
// ============================================================================

#[test]
fn corner_attributes_follow_raw_corners() {
    let mut tilted = vtx(1.0, 0.0, 0.0);
    tilted.normal = Some(Vec3::X);
    tilted.texture_coordinate = Some(Vec2::new(0.9, 0.1));
    let mesh = weld(&quad(tilted));

    // Merged into vertex 1, but the corner keeps its own attributes
    assert_eq!(mesh.vertex_count(), 4);
    assert_eq!(mesh.corner_normals[3], Vec3::X);
    assert_eq!(mesh.corner_uvs[3], Vec2::new(0.9, 0.1));
    assert_eq!(mesh.normals[1], Vec3::Z);
    assert!(mesh.has_uvs());
}

#[test]
fn vertex_groups_cover_every_file_bone() {
    let mut raw = quad(vtx(1.0, 0.0, 0.0));
    raw.vertices[4].links = links(&[(0, 0.25), (1, 0.75)]);
    let mesh = weld(&raw);

    let keys: Vec<_> = mesh.vertex_groups.keys().map(String::as_str).collect();
    assert_eq!(keys, ["a", "b"]);
    assert_eq!(mesh.vertex_group("a").unwrap().len(), 4);

    let b = mesh.vertex_group("b").unwrap();
    assert_eq!(b.len(), 1);
    assert_eq!(b[0].vertex, 3);
    assert!((b[0].weight - 0.75).abs() < 1e-6);
}

#[test]
fn unused_bones_get_empty_groups() {
    let mesh = weld(&quad(vtx(1.0, 0.0, 0.0)));
    assert!(mesh.vertex_group("b").unwrap().is_empty());
}

#[test]
fn disabled_welding_passes_through() {
    let settings = WeldSettings {
        enabled: false,
        ..WeldSettings::default()
    };
    let mesh = VertexWelder::new(settings).weld(&quad(vtx(1.0, 0.0, 0.0)));

    assert_eq!(mesh.vertex_count(), 6);
    assert_eq!(mesh.triangles, vec![[0, 1, 2], [3, 4, 5]]);
    assert_eq!(mesh.corner_normals.len(), 6);
    assert_eq!(mesh.corner_uvs.len(), 6);
    assert_eq!(mesh.vertex_group("a").unwrap().len(), 6);
}
