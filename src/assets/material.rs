//! Material Descriptor
//!
//! A material XML lists texture names; the importer only resolves them to
//! files and sorts them into slots by the suffix of the file stem. Building
//! a shading network from them is left to the [`UnitSink`](super::UnitSink).

use std::path::{Path, PathBuf};

use roxmltree::Document;

use crate::assets::descriptor::{child, children, expect_root};
use crate::assets::io::{AssetReader, stem_of, texture_path};
use crate::diagnostics::Diagnostics;
use crate::errors::{ImportError, Result};

pub const MATERIAL_ROOT: &str = "material";

/// Texture names that never map to a material slot.
const IGNORED_TEXTURES: &[&str] = &["ShadowMapColor"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureSlot {
    Diffuse,
    Normal,
    /// Packed surface info: metallic, emission strength and team colour mask.
    SurfaceInfo,
}

impl TextureSlot {
    /// Classifies a texture by the end of its file stem.
    #[must_use]
    pub fn classify(stem: &str) -> Option<Self> {
        if stem.ends_with("Diffuse") {
            Some(Self::Diffuse)
        } else if stem.ends_with("Normal") {
            Some(Self::Normal)
        } else if stem.ends_with("SIC") {
            Some(Self::SurfaceInfo)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaterialDescriptor {
    /// Stem of the material file.
    pub name: String,
    pub path: PathBuf,
    pub diffuse: Option<PathBuf>,
    pub normal: Option<PathBuf>,
    pub surface_info: Option<PathBuf>,
    /// Textures whose stem matches no slot.
    pub other: Vec<PathBuf>,
}

impl MaterialDescriptor {
    #[must_use]
    pub fn texture(&self, slot: TextureSlot) -> Option<&Path> {
        match slot {
            TextureSlot::Diffuse => self.diffuse.as_deref(),
            TextureSlot::Normal => self.normal.as_deref(),
            TextureSlot::SurfaceInfo => self.surface_info.as_deref(),
        }
    }

    /// Parses a material document at `path` (relative to the data root) and
    /// checks that every referenced texture exists.
    pub fn parse(
        text: &str,
        path: &Path,
        reader: &impl AssetReader,
        diagnostics: &mut Diagnostics,
    ) -> Result<Self> {
        let shown = reader.display_path(path);
        let document = Document::parse(text)?;
        let root = expect_root(&document, &shown, MATERIAL_ROOT)?;
        let textures = child(root, "textures").ok_or_else(|| ImportError::MissingElement {
            path: shown.clone(),
            element: "textures",
        })?;

        let mut material = Self {
            name: stem_of(path),
            path: path.to_path_buf(),
            ..Self::default()
        };

        for texture in children(textures, "texture") {
            let name = texture
                .attribute("name")
                .ok_or_else(|| ImportError::MissingAttribute {
                    element: "texture".to_string(),
                    attribute: "name",
                })?;
            if IGNORED_TEXTURES.contains(&name) {
                continue;
            }

            let file = texture_path(name);
            if !reader.exists(&file) {
                diagnostics.warning(format!(
                    "Cannot find a file {}",
                    reader.display_path(&file).display()
                ));
            }

            let slot = match TextureSlot::classify(&stem_of(&file)) {
                Some(TextureSlot::Diffuse) => &mut material.diffuse,
                Some(TextureSlot::Normal) => &mut material.normal,
                Some(TextureSlot::SurfaceInfo) => &mut material.surface_info,
                None => {
                    diagnostics.info(format!(
                        "Material {} has a texture {name} with no known role",
                        material.name
                    ));
                    material.other.push(file);
                    continue;
                }
            };
            *slot = Some(file);
        }

        log::debug!(
            "Material {}: diffuse {}, normal {}, surface info {}, {} other",
            material.name,
            material.diffuse.is_some(),
            material.normal.is_some(),
            material.surface_info.is_some(),
            material.other.len()
        );
        Ok(material)
    }

    /// Reads and parses the material named by a descriptor attribute.
    pub fn load(
        reader: &impl AssetReader,
        material: &str,
        diagnostics: &mut Diagnostics,
    ) -> Result<Self> {
        let path = crate::assets::io::material_path(material);
        let bytes = reader.read_bytes(&path)?;
        let text = String::from_utf8_lossy(&bytes);
        Self::parse(&text, &path, reader, diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::io::MemoryAssetReader;
    use crate::diagnostics::Severity;

    #[test]
    fn test_classify() {
        assert_eq!(TextureSlot::classify("MarineDiffuse"), Some(TextureSlot::Diffuse));
        assert_eq!(TextureSlot::classify("MarineNormal"), Some(TextureSlot::Normal));
        assert_eq!(TextureSlot::classify("MarineSIC"), Some(TextureSlot::SurfaceInfo));
        assert_eq!(TextureSlot::classify("MarineGlow"), None);
    }

    #[test]
    fn test_parse_slots_and_missing_files() {
        let reader = MemoryAssetReader::new().with_file("Video/Textures/MarineDiffuse.dds", vec![0u8]);
        let xml = r#"<material><textures>
            <texture name="MarineDiffuse"/>
            <texture name="MarineNormal"/>
            <texture name="ShadowMapColor"/>
            <texture name="MarineGlow"/>
        </textures></material>"#;
        let mut diagnostics = Diagnostics::new();
        let material = MaterialDescriptor::parse(
            xml,
            Path::new("Video/Materials/Units/Marine.xml"),
            &reader,
            &mut diagnostics,
        )
        .unwrap();

        assert_eq!(material.name, "Marine");
        assert_eq!(material.diffuse.as_deref(), Some(Path::new("Video/Textures/MarineDiffuse.dds")));
        assert!(material.normal.is_some());
        assert!(material.surface_info.is_none());
        assert_eq!(material.other.len(), 1);
        // MarineNormal and MarineGlow are not on disk
        assert_eq!(diagnostics.count(Severity::Warning), 2);
        assert_eq!(diagnostics.count(Severity::Info), 1);
    }
}
