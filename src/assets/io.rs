use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;

use crate::errors::{ImportError, Result};

pub const MESH_DIR: &str = "Video/Meshes";
pub const MATERIAL_DIR: &str = "Video/Materials";
pub const TEXTURE_DIR: &str = "Video/Textures";
pub const ANIMATION_DIR: &str = "Video/Animations";

/// Access to files under a data root. All paths are relative to that root.
pub trait AssetReader {
    fn read_bytes(&self, path: &Path) -> Result<Vec<u8>>;

    fn exists(&self, path: &Path) -> bool;

    /// The path as shown in diagnostics.
    fn display_path(&self, path: &Path) -> PathBuf {
        path.to_path_buf()
    }
}

impl<R: AssetReader + ?Sized> AssetReader for &R {
    fn read_bytes(&self, path: &Path) -> Result<Vec<u8>> {
        (**self).read_bytes(path)
    }

    fn exists(&self, path: &Path) -> bool {
        (**self).exists(path)
    }

    fn display_path(&self, path: &Path) -> PathBuf {
        (**self).display_path(path)
    }
}

/// Reads from a directory on disk.
#[derive(Debug, Clone)]
pub struct FileAssetReader {
    root_path: PathBuf,
}

impl FileAssetReader {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root_path: root.as_ref().to_path_buf(),
        }
    }

    #[inline]
    #[must_use]
    pub fn root_path(&self) -> &Path {
        &self.root_path
    }
}

impl AssetReader for FileAssetReader {
    fn read_bytes(&self, path: &Path) -> Result<Vec<u8>> {
        let full = self.root_path.join(path);
        std::fs::read(&full).map_err(|e| ImportError::io(full, e))
    }

    fn exists(&self, path: &Path) -> bool {
        self.root_path.join(path).is_file()
    }

    fn display_path(&self, path: &Path) -> PathBuf {
        self.root_path.join(path)
    }
}

/// In-memory file table, for tests and for hosts that embed their data.
#[derive(Debug, Clone, Default)]
pub struct MemoryAssetReader {
    files: FxHashMap<PathBuf, Vec<u8>>,
}

impl MemoryAssetReader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, bytes: impl Into<Vec<u8>>) {
        self.files.insert(path.into(), bytes.into());
    }

    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(path, bytes);
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl AssetReader for MemoryAssetReader {
    fn read_bytes(&self, path: &Path) -> Result<Vec<u8>> {
        self.files.get(path).cloned().ok_or_else(|| {
            ImportError::io(
                path,
                std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
            )
        })
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }
}

// ============================================================================
// Data-root layout
// ============================================================================

/// `Video/Meshes/<mesh>` with the extension replaced by `.msh`.
#[must_use]
pub fn mesh_path(mesh: &str) -> PathBuf {
    Path::new(MESH_DIR).join(mesh).with_extension("msh")
}

/// `Video/Materials/<material>` with the extension replaced by `.xml`.
#[must_use]
pub fn material_path(material: &str) -> PathBuf {
    Path::new(MATERIAL_DIR).join(material).with_extension("xml")
}

/// `Video/Textures/<name>.dds`.
#[must_use]
pub fn texture_path(name: &str) -> PathBuf {
    Path::new(TEXTURE_DIR).join(format!("{name}.dds"))
}

/// `Video/Animations/<base><index><suffix>.anm`, built by string append.
#[must_use]
pub fn animation_path(base: &str, index: Option<u32>, suffix: &str) -> PathBuf {
    let file = match index {
        Some(index) => format!("{base}{index}{suffix}.anm"),
        None => format!("{base}{suffix}.anm"),
    };
    Path::new(ANIMATION_DIR).join(file)
}

/// File stem as an owned string, or the whole path when it has none.
pub(crate) fn stem_of(path: &Path) -> String {
    path.file_stem()
        .map_or_else(|| path.to_string_lossy(), |s| s.to_string_lossy())
        .into_owned()
}
