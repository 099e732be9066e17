//! Binary fixture builders shared by the integration tests.

#![allow(dead_code)]

use glam::{Mat4, Quat, Vec3};

/// Routes importer logs to the test output. Safe to call from every test.
pub fn init_logging() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init();
}

pub fn put_cstring(out: &mut Vec<u8>, text: &str) {
    out.extend_from_slice(text.as_bytes());
    out.push(0);
}

pub fn put_f32s(out: &mut Vec<u8>, values: &[f32]) {
    for v in values {
        out.extend_from_slice(&v.to_le_bytes());
    }
}

// ============================================================================
// MSH
// ============================================================================

pub const POSITION: &str = "vertexPosition";
pub const NORMAL: &str = "vertexNormal";
pub const UV: &str = "vertexTextureCoordinate";
pub const BONE_INDICES: &str = "vertexBoneIndices";
pub const BONE_WEIGHTS: &str = "vertexBoneWeights";

/// One vertex of the default layout:
/// position(3) normal(3) uv(2) bone indices(2) bone weights(2).
#[derive(Debug, Clone, Copy)]
pub struct V {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    pub bones: [f32; 2],
    pub weights: [f32; 2],
}

impl V {
    pub fn at(x: f32, y: f32, z: f32) -> Self {
        Self {
            position: [x, y, z],
            normal: [0.0, 0.0, 1.0],
            uv: [0.0, 0.0],
            bones: [0.0, 0.0],
            weights: [1.0, 0.0],
        }
    }

    pub fn normal(mut self, n: [f32; 3]) -> Self {
        self.normal = n;
        self
    }

    pub fn uv(mut self, u: f32, v: f32) -> Self {
        self.uv = [u, v];
        self
    }

    pub fn skin(mut self, bones: [f32; 2], weights: [f32; 2]) -> Self {
        self.bones = bones;
        self.weights = weights;
        self
    }

    pub fn record(&self) -> Vec<f32> {
        let mut r = Vec::with_capacity(12);
        r.extend_from_slice(&self.position);
        r.extend_from_slice(&self.normal);
        r.extend_from_slice(&self.uv);
        r.extend_from_slice(&self.bones);
        r.extend_from_slice(&self.weights);
        r
    }
}

pub fn default_layout() -> Vec<(String, u8)> {
    vec![
        (POSITION.to_string(), 3),
        (NORMAL.to_string(), 3),
        (UV.to_string(), 2),
        (BONE_INDICES.to_string(), 2),
        (BONE_WEIGHTS.to_string(), 2),
    ]
}

pub struct AttachmentBoxFixture {
    pub name: String,
    pub position: [f32; 3],
    pub rotation_xyzw: [f32; 4],
    pub scale: [f32; 3],
}

pub struct MshBuilder {
    pub magic: String,
    pub bones: Vec<(String, Mat4)>,
    pub attachment: Option<AttachmentBoxFixture>,
    pub layout: Vec<(String, u8)>,
    pub data: Vec<f32>,
    pub data_size: Option<u32>,
    pub metadata_values: f32,
}

impl Default for MshBuilder {
    fn default() -> Self {
        Self {
            magic: "MSH1.0".to_string(),
            bones: vec![("root".to_string(), Mat4::IDENTITY)],
            attachment: None,
            layout: default_layout(),
            data: Vec::new(),
            data_size: None,
            metadata_values: 0.5,
        }
    }
}

impl MshBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bones(mut self, bones: &[(&str, Mat4)]) -> Self {
        self.bones = bones.iter().map(|(n, m)| ((*n).to_string(), *m)).collect();
        self
    }

    pub fn layout(mut self, layout: &[(&str, u8)]) -> Self {
        self.layout = layout.iter().map(|(n, c)| ((*n).to_string(), *c)).collect();
        self
    }

    pub fn triangle(mut self, a: V, b: V, c: V) -> Self {
        for v in [a, b, c] {
            self.data.extend(v.record());
        }
        self
    }

    pub fn raw_data(mut self, data: Vec<f32>) -> Self {
        self.data = data;
        self
    }

    pub fn data_size(mut self, size: u32) -> Self {
        self.data_size = Some(size);
        self
    }

    pub fn attachment(mut self, fixture: AttachmentBoxFixture) -> Self {
        self.attachment = Some(fixture);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut out = Vec::new();
        put_cstring(&mut out, &self.magic);

        out.push(self.bones.len() as u8);
        for (name, matrix) in &self.bones {
            put_cstring(&mut out, name);
            put_f32s(&mut out, &matrix.to_cols_array());
        }

        out.push(1);
        put_f32s(&mut out, &[self.metadata_values; 9]);
        if let Some(bbox) = &self.attachment {
            out.push(2);
            put_f32s(&mut out, &[0.0; 12]);
            put_cstring(&mut out, &bbox.name);
            put_f32s(&mut out, &bbox.position);
            put_f32s(&mut out, &[1.0]);
            put_f32s(&mut out, &bbox.rotation_xyzw);
            put_f32s(&mut out, &bbox.scale);
        } else {
            out.push(0);
            put_f32s(&mut out, &[0.0; 12]);
        }
        out.push(3);
        put_f32s(&mut out, &[0.0; 6]);

        out.push(self.layout.len() as u8);
        for (name, components) in &self.layout {
            put_cstring(&mut out, name);
            out.push(*components);
        }

        let size = self.data_size.unwrap_or(self.data.len() as u32);
        out.extend_from_slice(&size.to_le_bytes());
        put_f32s(&mut out, &self.data);
        out
    }
}

/// A single-bone mesh with one triangle.
pub fn simple_msh() -> Vec<u8> {
    MshBuilder::new()
        .triangle(V::at(0.0, 0.0, 0.0), V::at(1.0, 0.0, 0.0), V::at(0.0, 1.0, 0.0))
        .build()
}

// ============================================================================
// ANM
// ============================================================================

#[derive(Debug, Clone, Copy)]
pub struct Frame {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Frame {
    pub fn identity() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }

    pub fn moved(x: f32, y: f32, z: f32) -> Self {
        Self {
            position: Vec3::new(x, y, z),
            ..Self::identity()
        }
    }
}

pub struct AnmBuilder {
    pub magic: String,
    pub frame_count: u32,
    pub frame_rate: u32,
    pub bones: Vec<(String, Vec<Frame>)>,
}

impl AnmBuilder {
    pub fn new(frame_count: u32, frame_rate: u32) -> Self {
        Self {
            magic: "ANM1.0".to_string(),
            frame_count,
            frame_rate,
            bones: Vec::new(),
        }
    }

    pub fn bone(mut self, name: &str, frames: Vec<Frame>) -> Self {
        self.bones.push((name.to_string(), frames));
        self
    }

    /// A bone holding the identity delta for every frame.
    pub fn still_bone(self, name: &str) -> Self {
        let frames = vec![Frame::identity(); self.frame_count as usize];
        self.bone(name, frames)
    }

    pub fn build(&self) -> Vec<u8> {
        let mut out = Vec::new();
        put_cstring(&mut out, &self.magic);
        out.push(self.bones.len() as u8);
        out.extend_from_slice(&self.frame_count.to_le_bytes());
        out.extend_from_slice(&self.frame_rate.to_le_bytes());
        for (name, frames) in &self.bones {
            put_cstring(&mut out, name);
            for frame in frames {
                put_f32s(&mut out, &frame.position.to_array());
                put_f32s(&mut out, &frame.rotation.to_array());
                put_f32s(&mut out, &frame.scale.to_array());
            }
        }
        out
    }
}

/// A one-frame animation moving `root`.
pub fn simple_anm() -> Vec<u8> {
    AnmBuilder::new(1, 30).still_bone("root").build()
}

// ============================================================================
// XML
// ============================================================================

pub fn material_xml(textures: &[&str]) -> String {
    let mut xml = String::from("<material><textures>");
    for t in textures {
        xml.push_str(&format!(r#"<texture name="{t}"/>"#));
    }
    xml.push_str("</textures></material>");
    xml
}
