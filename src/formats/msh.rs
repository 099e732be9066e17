//! MSH Mesh Decoder
//!
//! Decodes one `MSH1.0` file into a skeleton fragment, an exploded triangle
//! soup and an optional attachment box.
//!
//! # Layout
//!
//! ```text
//! magic            cstring  "MSH1.0"
//! bone_count       u8
//! bones            bone_count x (name: cstring, matrix: 16 x f32, row-major)
//! block 1          tag: u8, 9 x f32
//! block 2          tag: u8, 12 x f32
//!   [tag == 2]     name: cstring, pos: 3 x f32, f32, quat: 4 x f32 (xyzw), scale: 3 x f32
//! block 3          tag: u8, 6 x f32
//! layout_count     u8
//! layout           layout_count x (name: cstring, components: u8)
//! data_size        u32, in f32 words
//! vertex data      data_size x f32, triangle-major
//! ```
//!
//! # Coordinate fix
//!
//! File bones are rotated by the decoder's `coordinate_fix` (−90° about Z by
//! default). For attached meshes every position is moved into the parent
//! bone's space with `parent.bind_matrix × coordinate_fix⁻¹`.

use glam::{Mat4, Quat, Vec2, Vec3};
use smallvec::SmallVec;

use crate::errors::{ImportError, Result};
use crate::formats::expect_magic;
use crate::formats::layout::{
    BoneLink, BoneLinks, LayoutBindings, LayoutEntry, RawMeshData, RawVertex, VertexLayout,
};
use crate::io::ByteCursor;
use crate::skeleton::{Bone, FragmentBone, SkeletonFragment};

pub const MSH_MAGIC: &str = "MSH1.0";

/// Tag of the second metadata block that announces an attachment box.
const ATTACHMENT_BOX_TAG: u8 = 2;

// ============================================================================
// Output types
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct MetadataBlock {
    pub tag: u8,
    pub values: Vec<f32>,
}

/// The three opaque blocks between the bone table and the vertex layout.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshMetadata {
    pub blocks: [MetadataBlock; 3],
}

/// Named box carried by some meshes (hit volumes, attachment markers).
#[derive(Debug, Clone, PartialEq)]
pub struct AttachmentBox {
    pub name: String,
    pub position: Vec3,
    /// Unused scalar stored between position and rotation (usually 1.0).
    pub placeholder: f32,
    pub rotation: Quat,
    pub scale: Vec3,
    /// `global × LocRotScale(position, rotation, scale)`.
    pub world_transform: Mat4,
}

#[derive(Debug, Clone)]
pub struct DecodedMesh {
    pub skeleton: SkeletonFragment,
    pub mesh: RawMeshData,
    pub attachment_box: Option<AttachmentBox>,
    pub metadata: MeshMetadata,
    /// Transform applied to all geometry of this file.
    pub global_transform: Mat4,
}

// ============================================================================
// Decoder
// ============================================================================

#[derive(Debug, Clone, Copy)]
pub struct MeshDecoder {
    pub coordinate_fix: Mat4,
}

impl Default for MeshDecoder {
    fn default() -> Self {
        Self {
            coordinate_fix: Mat4::from_rotation_z((-90.0f32).to_radians()),
        }
    }
}

impl MeshDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_coordinate_fix(coordinate_fix: Mat4) -> Self {
        Self { coordinate_fix }
    }

    /// Decodes `bytes` as a mesh file named `name`. When `parent` is given
    /// the mesh is attached to that bone.
    pub fn decode(&self, bytes: &[u8], name: &str, parent: Option<&Bone>) -> Result<DecodedMesh> {
        let mut cursor = ByteCursor::new(bytes);
        expect_magic(&mut cursor, MSH_MAGIC)?;

        let global = match parent {
            Some(bone) => bone.bind_matrix * self.coordinate_fix.inverse(),
            None => Mat4::IDENTITY,
        };

        let skeleton = self.read_bones(&mut cursor, global, parent)?;
        let (metadata, attachment_box) = read_metadata(&mut cursor, global)?;
        let layout = read_layout(&mut cursor)?;
        let vertices = read_vertices(&mut cursor, &layout, skeleton.bones.len(), global)?;

        if !cursor.is_at_end() {
            log::warn!(
                "Mesh {name}: {} trailing bytes after vertex data",
                cursor.remaining()
            );
        }
        log::debug!(
            "Decoded mesh {name}: {} bones, {} vertices, {} triangles",
            skeleton.bones.len(),
            vertices.len(),
            vertices.len() / 3
        );

        let bone_names = skeleton.names().map(str::to_owned).collect();
        Ok(DecodedMesh {
            skeleton,
            mesh: RawMeshData {
                name: name.to_string(),
                layout,
                bone_names,
                vertices,
            },
            attachment_box,
            metadata,
            global_transform: global,
        })
    }

    fn read_bones(
        &self,
        cursor: &mut ByteCursor<'_>,
        global: Mat4,
        parent: Option<&Bone>,
    ) -> Result<SkeletonFragment> {
        let count = cursor.read_u8()?;
        let mut bones = Vec::with_capacity(usize::from(count));
        for _ in 0..count {
            let name = cursor.read_cstring()?;
            let file_matrix = Mat4::from_cols_array(&cursor.read_f32_array::<16>()?);

            let reuses_parent = parent.is_some_and(|p| p.name == name);
            let bind_matrix = match parent {
                Some(p) if reuses_parent => p.bind_matrix,
                _ => global * file_matrix * self.coordinate_fix,
            };
            log::trace!("Bone {name:?} (reuses parent: {reuses_parent})");
            bones.push(FragmentBone {
                name,
                bind_matrix,
                reuses_parent,
            });
        }
        Ok(SkeletonFragment { bones })
    }
}

fn read_block(cursor: &mut ByteCursor<'_>, len: usize) -> Result<MetadataBlock> {
    let tag = cursor.read_u8()?;
    let mut values = Vec::with_capacity(len);
    cursor.read_f32_into(len, &mut values)?;
    Ok(MetadataBlock { tag, values })
}

fn read_metadata(
    cursor: &mut ByteCursor<'_>,
    global: Mat4,
) -> Result<(MeshMetadata, Option<AttachmentBox>)> {
    let first = read_block(cursor, 9)?;
    let second = read_block(cursor, 12)?;

    let attachment_box = if second.tag == ATTACHMENT_BOX_TAG {
        let name = cursor.read_cstring()?;
        let position = Vec3::from_array(cursor.read_f32_array()?);
        let placeholder = cursor.read_f32()?;
        let rotation = Quat::from_array(cursor.read_f32_array()?);
        let scale = Vec3::from_array(cursor.read_f32_array()?);
        let world_transform =
            global * Mat4::from_scale_rotation_translation(scale, rotation, position);
        Some(AttachmentBox {
            name,
            position,
            placeholder,
            rotation,
            scale,
            world_transform,
        })
    } else {
        None
    };

    let third = read_block(cursor, 6)?;
    Ok((
        MeshMetadata {
            blocks: [first, second, third],
        },
        attachment_box,
    ))
}

fn read_layout(cursor: &mut ByteCursor<'_>) -> Result<VertexLayout> {
    let count = cursor.read_u8()?;
    let mut entries = Vec::with_capacity(usize::from(count));
    for _ in 0..count {
        let name = cursor.read_cstring()?;
        let components = cursor.read_u8()?;
        entries.push(LayoutEntry { name, components });
    }
    VertexLayout::new(entries)
}

fn read_vertices(
    cursor: &mut ByteCursor<'_>,
    layout: &VertexLayout,
    bone_count: usize,
    global: Mat4,
) -> Result<Vec<RawVertex>> {
    let data_size = cursor.read_u32()? as usize;
    let stride = layout.stride();
    if data_size % (3 * stride) != 0 {
        return Err(ImportError::CorruptLayout(format!(
            "data size {data_size} is not a multiple of 3 x stride {stride}"
        )));
    }
    let vertex_count = data_size / stride;
    if vertex_count * stride * 4 > cursor.remaining() {
        return Err(ImportError::TruncatedStream {
            offset: cursor.position(),
            needed: vertex_count * stride * 4,
            available: cursor.remaining(),
        });
    }

    let bindings = LayoutBindings::resolve(layout)?;
    let mut record = Vec::with_capacity(stride);
    let mut vertices = Vec::with_capacity(vertex_count);
    for _ in 0..vertex_count {
        cursor.read_f32_into(stride, &mut record)?;

        let position = Vec3::from_slice(bindings.position.slice(&record));
        let normal = bindings
            .normal
            .map(|slot| global.transform_vector3(Vec3::from_slice(slot.slice(&record))));
        let texture_coordinate = bindings.texture_coordinate.map(|slot| {
            let uv = slot.slice(&record);
            Vec2::new(uv[0], 1.0 - uv[1])
        });
        let links = match (bindings.bone_indices, bindings.bone_weights) {
            (Some(indices), Some(weights)) => {
                read_links(indices.slice(&record), weights.slice(&record), bone_count)?
            }
            _ => SmallVec::new(),
        };

        vertices.push(RawVertex {
            position: global.transform_point3(position),
            normal,
            texture_coordinate,
            links,
        });
    }
    Ok(vertices)
}

fn read_links(indices: &[f32], weights: &[f32], bone_count: usize) -> Result<BoneLinks> {
    let mut links = BoneLinks::new();
    for (&index, &weight) in indices.iter().zip(weights) {
        if weight <= 0.0 {
            continue;
        }
        if !(index >= 0.0 && (index as usize) < bone_count) {
            return Err(ImportError::CorruptLayout(format!(
                "bone index {index} outside a table of {bone_count} bones"
            )));
        }
        links.push(BoneLink {
            bone: index as u16,
            weight,
        });
    }
    links.sort_by_key(|link| link.bone);
    Ok(links)
}
