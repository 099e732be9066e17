//! Unit Loader
//!
//! Walks a unit descriptor and drives the decoders:
//!
//! 1. **Primary model**: material, mesh and idle animation of every child
//!    of `<model>`. Any failure here aborts the load.
//! 2. **Weapons**: each `weapons/weapon/model/*` variant with both a mesh
//!    and a material is decoded onto its attachment bone. A failing variant
//!    is reported and skipped.
//! 3. **Actions**: every `*Animation` attribute of every
//!    `actions/<category>/model/action` registers a clip named
//!    `<category><Prefix>`. Move and levitate clips pull in optional
//!    `Begin`/`End` companions.
//! 4. **Suffix replay**: every registered clip is loaded again for each
//!    weapon animation suffix.
//!
//! A source path already in the [`AnimationRegistry`] is not loaded again
//! by a later action, so each path is loaded once per suffix. Diagnostics
//! are returned in a [`LoadReport`] whether the load succeeds or not.

use std::path::Path;

use crate::animation::AnimationClip;
use crate::assets::descriptor::{Record, UnitDescriptor};
use crate::assets::io::{AssetReader, FileAssetReader, animation_path, mesh_path, stem_of};
use crate::assets::material::MaterialDescriptor;
use crate::assets::registry::AnimationRegistry;
use crate::assets::sink::{CollectingSink, MeshOutput, UnitAsset, UnitSink};
use crate::diagnostics::Diagnostics;
use crate::errors::{ImportError, Result};
use crate::formats::anm::AnimationDecoder;
use crate::formats::msh::MeshDecoder;
use crate::mesh::VertexWelder;
use crate::settings::ImportSettings;
use crate::skeleton::{Skeleton, SkeletonBuilder};

const IDLE_CLIP: &str = "idle";
const ANIMATION_KEY: &str = "animation";
/// Clips whose path ends with one of these get `Begin`/`End` companions.
const LOOPED_SUFFIXES: &[&str] = &["move", "levitate"];

/// Result of a load plus every diagnostic collected on the way.
#[derive(Debug)]
pub struct LoadReport<T> {
    pub result: Result<T>,
    pub diagnostics: Diagnostics,
}

impl<T> LoadReport<T> {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> LoadReport<U> {
        LoadReport {
            result: self.result.map(f),
            diagnostics: self.diagnostics,
        }
    }
}

pub struct UnitLoader<R> {
    reader: R,
    settings: ImportSettings,
    mesh_decoder: MeshDecoder,
}

impl UnitLoader<FileAssetReader> {
    /// Loader reading from a data directory on disk.
    pub fn from_data_root(root: impl AsRef<Path>, settings: ImportSettings) -> Self {
        Self::new(FileAssetReader::new(root), settings)
    }
}

impl<R: AssetReader> UnitLoader<R> {
    pub fn new(reader: R, settings: ImportSettings) -> Self {
        Self {
            reader,
            settings,
            mesh_decoder: MeshDecoder::default(),
        }
    }

    #[must_use]
    pub fn with_mesh_decoder(mut self, mesh_decoder: MeshDecoder) -> Self {
        self.mesh_decoder = mesh_decoder;
        self
    }

    #[inline]
    pub fn reader(&self) -> &R {
        &self.reader
    }

    #[inline]
    pub fn settings(&self) -> &ImportSettings {
        &self.settings
    }

    /// Loads the unit described by `descriptor`, feeding `sink`, and returns
    /// the assembled skeleton.
    pub fn load_unit<S: UnitSink>(&self, descriptor: &Path, sink: &mut S) -> LoadReport<Skeleton> {
        let mut session = LoadSession::new(self, sink);
        let result = session.run(descriptor);
        session.finish(result)
    }

    /// [`load_unit`](Self::load_unit) into a [`CollectingSink`].
    pub fn load_unit_asset(&self, descriptor: &Path) -> LoadReport<UnitAsset> {
        let mut sink = CollectingSink::new();
        let scale = self.settings.scale;
        self.load_unit(descriptor, &mut sink)
            .map(|skeleton| sink.into_asset(skeleton, scale))
    }

    /// Imports a single `.msh` file with no descriptor, material or
    /// attachment.
    pub fn load_mesh_file<S: UnitSink>(&self, path: &Path, sink: &mut S) -> LoadReport<Skeleton> {
        let mut session = LoadSession::new(self, sink);
        let result = session.load_mesh(path, None, None);
        if let Err(err) = &result {
            session.diagnostics.error(err.to_string());
        }
        session.finish(result)
    }
}

// ============================================================================
// Load session
// ============================================================================

/// Mutable state of one load.
struct LoadSession<'l, R, S> {
    loader: &'l UnitLoader<R>,
    sink: &'l mut S,
    welder: VertexWelder,
    skeleton: SkeletonBuilder,
    registry: AnimationRegistry,
    suffixes: Vec<String>,
    diagnostics: Diagnostics,
}

impl<'l, R: AssetReader, S: UnitSink> LoadSession<'l, R, S> {
    fn new(loader: &'l UnitLoader<R>, sink: &'l mut S) -> Self {
        Self {
            loader,
            sink,
            welder: VertexWelder::new(loader.settings.weld),
            skeleton: SkeletonBuilder::new(),
            registry: AnimationRegistry::new(),
            suffixes: Vec::new(),
            diagnostics: Diagnostics::new(),
        }
    }

    fn finish(self, result: Result<()>) -> LoadReport<Skeleton> {
        LoadReport {
            result: result.map(|()| self.skeleton.build()),
            diagnostics: self.diagnostics,
        }
    }

    fn run(&mut self, descriptor: &Path) -> Result<()> {
        let result = self.run_unit(descriptor);
        if let Err(err) = &result {
            self.diagnostics.error(err.to_string());
        }
        result
    }

    fn run_unit(&mut self, descriptor: &Path) -> Result<()> {
        let reader = &self.loader.reader;
        let bytes = reader.read_bytes(descriptor)?;
        let text = String::from_utf8_lossy(&bytes);
        let unit = UnitDescriptor::parse(&text, &reader.display_path(descriptor))?;
        log::info!(
            "Loading unit {}: {} models, {} weapon variants, {} action categories",
            descriptor.display(),
            unit.models.len(),
            unit.weapons.len(),
            unit.actions.len()
        );

        for model in &unit.models {
            self.load_primary(model)?;
        }
        for variant in &unit.weapons {
            self.load_weapon(variant)?;
        }
        self.load_actions(&unit);
        self.replay_suffixes();
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Models
    // ------------------------------------------------------------------------

    fn load_primary(&mut self, model: &Record) -> Result<()> {
        let material = required(model, "material")?;
        let material = self.load_material(material)?;
        let mesh = required(model, "mesh")?;
        self.load_mesh(&mesh_path(mesh), Some(material), None)?;

        if let Some(idle) = model.attributes.non_empty("idleAnimation") {
            let count = self.parse_count(model.get("idleAnimationCount"), "idleAnimationCount");
            self.load_animations(IDLE_CLIP, idle, count, "");
            self.registry.register(idle, IDLE_CLIP, count);
        }
        Ok(())
    }

    /// Returns `Err` only for "stop parsing" errors; everything else is
    /// reported and the variant skipped.
    fn load_weapon(&mut self, variant: &Record) -> Result<()> {
        let Some(mesh) = variant.get("mesh") else {
            return Ok(());
        };

        let Some(material) = variant.attributes.non_empty("material").filter(|_| !mesh.is_empty())
        else {
            log::debug!("Weapon {} has no mesh/material pair", variant.tag);
            return Ok(());
        };

        let parent = match variant.attributes.non_empty("bone") {
            Some(bone) => match self.skeleton.attachment(bone) {
                Ok(index) => Some(index),
                Err(err) => {
                    self.diagnostics
                        .error(format!("Weapon {} skipped: {err}", variant.tag));
                    return Ok(());
                }
            },
            None => None,
        };

        let loaded = self
            .load_material(material)
            .and_then(|material| self.load_mesh(&mesh_path(mesh), Some(material), parent));
        match loaded {
            Ok(()) => {
                if let Some(suffix) = variant.attributes.non_empty("animationSuffix")
                    && !self.suffixes.iter().any(|s| s == suffix)
                {
                    self.suffixes.push(suffix.to_string());
                }
                Ok(())
            }
            Err(err) if err.is_stop_parsing() => Err(err),
            Err(err) => {
                self.diagnostics
                    .error(format!("Weapon {} skipped: {err}", variant.tag));
                Ok(())
            }
        }
    }

    fn load_material(&mut self, material: &str) -> Result<S::Material> {
        let descriptor =
            MaterialDescriptor::load(&self.loader.reader, material, &mut self.diagnostics)?;
        Ok(self.sink.bind_material(&descriptor))
    }

    /// Decodes, merges and welds one mesh file. The skeleton is only
    /// touched once the file decoded successfully.
    fn load_mesh(
        &mut self,
        path: &Path,
        material: Option<S::Material>,
        parent: Option<usize>,
    ) -> Result<()> {
        let bytes = self.loader.reader.read_bytes(path)?;
        let parent_bone = parent.and_then(|i| self.skeleton.skeleton().get(i));
        let decoded = self
            .loader
            .mesh_decoder
            .decode(&bytes, &stem_of(path), parent_bone)?;

        let skeleton_bones = self.skeleton.merge(&decoded.skeleton, parent);
        let mesh = self.welder.weld(&decoded.mesh);
        self.sink.add_mesh(
            self.skeleton.skeleton(),
            MeshOutput {
                mesh,
                material,
                attachment_box: decoded.attachment_box,
                metadata: decoded.metadata,
                skeleton_bones,
                parent_bone: parent,
            },
        );
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Actions
    // ------------------------------------------------------------------------

    fn load_actions(&mut self, unit: &UnitDescriptor) {
        for category in &unit.actions {
            for model in &category.models {
                let mut companions: Vec<(String, String)> = Vec::new();
                for action in &model.actions {
                    for (key, path) in action.attributes.iter() {
                        let Some(prefix) = animation_prefix(key) else {
                            continue;
                        };
                        if self.registry.contains(path) {
                            continue;
                        }
                        let clip_name = format!("{}{}", category.tag, capitalize(prefix));
                        let count_key = format!("{key}Count");
                        let count = self.parse_count(action.get(&count_key), &count_key);
                        self.load_animations(&clip_name, path, count, "");
                        self.registry.register(path, clip_name.as_str(), count);

                        let lower = path.to_lowercase();
                        if LOOPED_SUFFIXES.iter().any(|s| lower.ends_with(s)) {
                            companions.push((format!("{clip_name}Begin"), format!("{path}Begin")));
                            companions.push((format!("{clip_name}End"), format!("{path}End")));
                        }
                    }
                }

                for (clip_name, path) in companions {
                    if !self.loader.reader.exists(&animation_path(&path, None, "")) {
                        continue;
                    }
                    self.load_animations(&clip_name, &path, Some(1), "");
                    self.registry.register(&path, clip_name, Some(1));
                }
            }
        }
    }

    fn replay_suffixes(&mut self) {
        let entries: Vec<(String, String, Option<u32>)> = self
            .registry
            .iter()
            .map(|(path, entry)| (path.to_string(), entry.clip_name.clone(), entry.count))
            .collect();
        for suffix in std::mem::take(&mut self.suffixes) {
            for (path, clip_name, count) in &entries {
                self.load_animations(clip_name, path, *count, &suffix);
            }
        }
    }

    // ------------------------------------------------------------------------
    // Animations
    // ------------------------------------------------------------------------

    /// A count of `None` or 1 loads `<name><suffix>` from `<path><suffix>.anm`;
    /// otherwise `<name><suffix><i>` from `<path><i><suffix>.anm` for each `i`.
    fn load_animations(&mut self, name: &str, path: &str, count: Option<u32>, suffix: &str) {
        match count {
            None | Some(1) => {
                self.load_clip(format!("{name}{suffix}"), &animation_path(path, None, suffix));
            }
            Some(count) => {
                for index in 0..count {
                    self.load_clip(
                        format!("{name}{suffix}{index}"),
                        &animation_path(path, Some(index), suffix),
                    );
                }
            }
        }
    }

    fn load_clip(&mut self, name: String, path: &Path) {
        let reader = &self.loader.reader;
        let shown = reader.display_path(path);
        if !reader.exists(path) {
            self.diagnostics
                .warning(format!("Cannot find a file {}", shown.display()));
            return;
        }

        let label = shown.display().to_string();
        let skeleton = self.skeleton.skeleton();
        let decoded = reader.read_bytes(path).and_then(|bytes| {
            AnimationDecoder::decode(&bytes, skeleton, &label, &mut self.diagnostics)
        });
        match decoded {
            Ok(tracks) => {
                let clip = AnimationClip::new(name, path.to_path_buf(), tracks);
                self.sink.add_clip(self.skeleton.skeleton(), clip);
            }
            Err(err) => {
                self.diagnostics
                    .error(format!("Animation {label} skipped: {err}"));
            }
        }
    }

    fn parse_count(&mut self, raw: Option<&str>, key: &str) -> Option<u32> {
        let raw = raw?.trim();
        match raw.parse::<u32>() {
            Ok(count) => Some(count),
            Err(_) => {
                self.diagnostics.warning(format!(
                    "Invalid {key} value {raw:?}, loading a single clip"
                ));
                None
            }
        }
    }
}

fn required<'r>(record: &'r Record, attribute: &'static str) -> Result<&'r str> {
    record
        .attributes
        .non_empty(attribute)
        .ok_or_else(|| ImportError::MissingAttribute {
            element: record.tag.clone(),
            attribute,
        })
}

/// `"idleAnimation"` -> `Some("idle")`, matching the suffix case-insensitively.
fn animation_prefix(key: &str) -> Option<&str> {
    let split = key.len().checked_sub(ANIMATION_KEY.len())?;
    let tail = key.get(split..)?;
    tail.eq_ignore_ascii_case(ANIMATION_KEY).then(|| &key[..split])
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
