//! Unit Assets
//!
//! XML descriptors, data-root file access and the [`UnitLoader`] that ties
//! the decoders together into one unit.

pub mod descriptor;
pub mod io;
pub mod loader;
pub mod material;
pub mod registry;
pub mod sink;

pub use descriptor::{ActionCategory, ActionModel, Attributes, Record, UnitDescriptor};
pub use io::{AssetReader, FileAssetReader, MemoryAssetReader};
pub use loader::{LoadReport, UnitLoader};
pub use material::{MaterialDescriptor, TextureSlot};
pub use registry::{AnimationRegistry, RegisteredAnimation};
pub use sink::{CollectingSink, MeshOutput, UnitAsset, UnitSink};
