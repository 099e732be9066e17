//! Data-driven Vertex Layout
//!
//! Every `.msh` file declares its own per-vertex schema as an ordered list of
//! `(attribute name, float component count)` pairs. Nothing about the vertex
//! record is fixed at compile time: the decoder reads a record of
//! [`VertexLayout::stride`] floats and then asks the layout where each known
//! attribute lives inside it.
//!
//! Only `vertexPosition` is required. Normals, skin links and texture
//! coordinates are optional capabilities of a given file.

use glam::{Vec2, Vec3};
use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use crate::errors::{ImportError, Result};

/// Attribute names as they appear in the file layout table.
pub mod attribute {
    pub const POSITION: &str = "vertexPosition";
    pub const NORMAL: &str = "vertexNormal";
    pub const BONE_INDICES: &str = "vertexBoneIndices";
    pub const BONE_WEIGHTS: &str = "vertexBoneWeights";
    pub const TEXTURE_COORDINATE: &str = "vertexTextureCoordinate";
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutEntry {
    pub name: String,
    pub components: u8,
}

/// Ordered attribute schema of one mesh file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexLayout {
    entries: Vec<LayoutEntry>,
    stride: usize,
}

impl VertexLayout {
    /// Validates and builds a layout.
    ///
    /// Fails with `CorruptLayout` on duplicate names, a zero stride, or a
    /// missing / non 3-component `vertexPosition`.
    pub fn new(entries: Vec<LayoutEntry>) -> Result<Self> {
        let mut seen = FxHashSet::default();
        for entry in &entries {
            if !seen.insert(entry.name.as_str()) {
                return Err(ImportError::CorruptLayout(format!(
                    "attribute {:?} declared twice",
                    entry.name
                )));
            }
        }

        let stride = entries.iter().map(|e| usize::from(e.components)).sum();
        if stride == 0 {
            return Err(ImportError::CorruptLayout(
                "vertex layout has a zero stride".to_string(),
            ));
        }

        let layout = Self { entries, stride };
        match layout.find(attribute::POSITION) {
            None => Err(ImportError::CorruptLayout(format!(
                "layout has no {:?} attribute",
                attribute::POSITION
            ))),
            Some(slot) if slot.components != 3 => Err(ImportError::CorruptLayout(format!(
                "{:?} has {} components, expected 3",
                attribute::POSITION,
                slot.components
            ))),
            Some(_) => Ok(layout),
        }
    }

    #[inline]
    #[must_use]
    pub fn entries(&self) -> &[LayoutEntry] {
        &self.entries
    }

    /// Number of floats per vertex record.
    #[inline]
    #[must_use]
    pub fn stride(&self) -> usize {
        self.stride
    }

    #[must_use]
    pub fn find(&self, name: &str) -> Option<AttributeSlot> {
        let mut offset = 0;
        for entry in &self.entries {
            let components = usize::from(entry.components);
            if entry.name == name {
                return Some(AttributeSlot { offset, components });
            }
            offset += components;
        }
        None
    }

    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.find(name).is_some()
    }
}

/// Location of one attribute inside a vertex record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeSlot {
    pub offset: usize,
    pub components: usize,
}

impl AttributeSlot {
    #[inline]
    #[must_use]
    pub fn slice<'r>(&self, record: &'r [f32]) -> &'r [f32] {
        &record[self.offset..self.offset + self.components]
    }
}

/// Slots of the attributes the importer understands, resolved once per file.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LayoutBindings {
    pub position: AttributeSlot,
    pub normal: Option<AttributeSlot>,
    pub bone_indices: Option<AttributeSlot>,
    pub bone_weights: Option<AttributeSlot>,
    pub texture_coordinate: Option<AttributeSlot>,
}

impl LayoutBindings {
    pub fn resolve(layout: &VertexLayout) -> Result<Self> {
        let position = layout
            .find(attribute::POSITION)
            .ok_or_else(|| ImportError::CorruptLayout("missing vertexPosition".to_string()))?;

        let normal = layout.find(attribute::NORMAL);
        if let Some(slot) = normal
            && slot.components != 3
        {
            return Err(ImportError::CorruptLayout(format!(
                "{:?} has {} components, expected 3",
                attribute::NORMAL,
                slot.components
            )));
        }

        let texture_coordinate = layout.find(attribute::TEXTURE_COORDINATE);
        if let Some(slot) = texture_coordinate
            && slot.components < 2
        {
            return Err(ImportError::CorruptLayout(format!(
                "{:?} has {} components, expected at least 2",
                attribute::TEXTURE_COORDINATE,
                slot.components
            )));
        }

        Ok(Self {
            position,
            normal,
            bone_indices: layout.find(attribute::BONE_INDICES),
            bone_weights: layout.find(attribute::BONE_WEIGHTS),
            texture_coordinate,
        })
    }
}

// ============================================================================
// Raw (exploded) mesh data
// ============================================================================

/// One skin influence, indexing the mesh file's own bone table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoneLink {
    pub bone: u16,
    pub weight: f32,
}

pub type BoneLinks = SmallVec<[BoneLink; 4]>;

#[derive(Debug, Clone, PartialEq)]
pub struct RawVertex {
    pub position: Vec3,
    pub normal: Option<Vec3>,
    /// Already flipped to `(u, 1 - v)`.
    pub texture_coordinate: Option<Vec2>,
    /// Links with a positive weight, sorted by bone index.
    pub links: BoneLinks,
}

/// Triangle soup decoded from one mesh file. Vertices come in consecutive
/// triples, one per triangle, with no sharing.
#[derive(Debug, Clone)]
pub struct RawMeshData {
    pub name: String,
    pub layout: VertexLayout,
    /// The file's bone table, indexed by [`BoneLink::bone`].
    pub bone_names: Vec<String>,
    pub vertices: Vec<RawVertex>,
}

impl RawMeshData {
    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }

    pub fn triangles(&self) -> std::slice::ChunksExact<'_, RawVertex> {
        self.vertices.chunks_exact(3)
    }
}
