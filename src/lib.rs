#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

//! Importer for Gladius unit assets: `.msh` meshes with their skeleton
//! fragments, `.anm` animations and the XML descriptors that tie them
//! together.
//!
//! ```rust,ignore
//! use std::path::Path;
//!
//! use gladius::{ImportSettings, UnitLoader};
//!
//! let loader = UnitLoader::from_data_root("Data", ImportSettings::default());
//! let report = loader.load_unit_asset(Path::new("Units/SpaceMarine.xml"));
//! for diagnostic in &report.diagnostics {
//!     println!("{diagnostic}");
//! }
//! let unit = report.result?;
//! ```

pub mod animation;
pub mod assets;
pub mod diagnostics;
pub mod errors;
pub mod formats;
pub mod io;
pub mod mesh;
pub mod settings;
pub mod skeleton;

pub use animation::{AnimationClip, BoneTrack, PoseSample, TrackSet};
pub use assets::{
    AssetReader, CollectingSink, FileAssetReader, LoadReport, MaterialDescriptor, MemoryAssetReader,
    UnitAsset, UnitLoader, UnitSink,
};
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use errors::{ImportError, Result};
pub use formats::{AnimationDecoder, MeshDecoder};
pub use mesh::{VertexWelder, WeldedMesh};
pub use settings::{ImportSettings, WeldSettings};
pub use skeleton::{Bone, Skeleton, SkeletonBuilder};
