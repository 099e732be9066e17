//! Skeleton Tests
//!
//! Tests for:
//! - Fragment merging (reuse by name, parenting to the attachment bone)
//! - Attachment lookup
//! - Hierarchy queries and parent-relative matrices

use glam::{Mat4, Vec3};

use gladius::errors::ImportError;
use gladius::skeleton::{FragmentBone, SkeletonBuilder, SkeletonFragment};

const EPSILON: f32 = 1e-5;

fn bone(name: &str, bind_matrix: Mat4) -> FragmentBone {
    FragmentBone {
        name: name.to_string(),
        bind_matrix,
        reuses_parent: false,
    }
}

fn body() -> SkeletonFragment {
    SkeletonFragment {
        bones: vec![
            bone("pelvis", Mat4::from_translation(Vec3::new(0.0, 0.0, 1.0))),
            bone("hand", Mat4::from_translation(Vec3::new(0.5, 0.0, 1.5))),
        ],
    }
}

fn sword() -> SkeletonFragment {
    SkeletonFragment {
        bones: vec![
            FragmentBone {
                reuses_parent: true,
                ..bone("hand", Mat4::IDENTITY)
            },
            bone("blade", Mat4::from_translation(Vec3::new(0.5, 0.0, 2.0))),
        ],
    }
}

// ============================================================================
// Merging
// ============================================================================

#[test]
fn first_fragment_becomes_roots() {
    let mut builder = SkeletonBuilder::new();
    let mapping = builder.merge(&body(), None);
    let skeleton = builder.build();

    assert_eq!(mapping, vec![0, 1]);
    assert_eq!(skeleton.len(), 2);
    assert_eq!(skeleton.roots().count(), 2);
    assert_eq!(skeleton.index_of("hand"), Some(1));
}

#[test]
fn attached_fragment_parents_to_attachment() {
    let mut builder = SkeletonBuilder::new();
    builder.merge(&body(), None);
    let hand = builder.attachment("hand").unwrap();
    let mapping = builder.merge(&sword(), Some(hand));
    let skeleton = builder.build();

    assert_eq!(mapping, vec![hand, 2]);
    assert_eq!(skeleton.len(), 3);
    assert_eq!(skeleton.bone("blade").unwrap().parent, Some(hand));

    let children: Vec<_> = skeleton.children(hand).map(|(_, b)| b.name.as_str()).collect();
    assert_eq!(children, ["blade"]);
}

#[test]
fn existing_bones_are_not_overwritten() {
    let mut builder = SkeletonBuilder::new();
    builder.merge(&body(), None);
    let moved = SkeletonFragment {
        bones: vec![bone("pelvis", Mat4::from_translation(Vec3::splat(9.0)))],
    };
    let mapping = builder.merge(&moved, None);
    let skeleton = builder.build();

    assert_eq!(mapping, vec![0]);
    assert_eq!(skeleton.len(), 2);
    let origin = skeleton.bones()[0].bind_matrix.transform_point3(Vec3::ZERO);
    assert!((origin - Vec3::new(0.0, 0.0, 1.0)).length() < EPSILON);
}

#[test]
fn unknown_attachment_bone() {
    let builder = SkeletonBuilder::new();
    match builder.attachment("hand") {
        Err(ImportError::UnknownBone(name)) => assert_eq!(name, "hand"),
        other => panic!("Expected UnknownBone, got {other:?}"),
    }
}

// ============================================================================
// Hierarchy
// ============================================================================

#[test]
fn local_matrix_is_parent_relative() {
    let mut builder = SkeletonBuilder::new();
    builder.merge(&body(), None);
    let hand = builder.attachment("hand").unwrap();
    builder.merge(&sword(), Some(hand));
    let skeleton = builder.build();

    let blade = skeleton.index_of("blade").unwrap();
    let local = skeleton.local_matrix(blade).unwrap();
    let offset = local.transform_point3(Vec3::ZERO);
    assert!((offset - Vec3::new(0.0, 0.0, 0.5)).length() < EPSILON);

    // Roots keep their skeleton-space matrix
    let pelvis = skeleton.local_matrix(0).unwrap();
    assert!(pelvis.abs_diff_eq(skeleton.bones()[0].bind_matrix, EPSILON));
    assert!(skeleton.local_matrix(42).is_none());
}

#[test]
fn parents_precede_children() {
    let mut builder = SkeletonBuilder::new();
    builder.merge(&body(), None);
    let hand = builder.attachment("hand").unwrap();
    builder.merge(&sword(), Some(hand));
    let skeleton = builder.build();

    for (index, bone) in skeleton.bones().iter().enumerate() {
        if let Some(parent) = bone.parent {
            assert!(parent < index, "{} precedes its parent", bone.name);
        }
    }
}
