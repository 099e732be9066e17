//! Binary File Formats
//!
//! Decoders for the two binary formats of a unit:
//!
//! - [`msh`]: bone table, metadata blocks and a triangle soup whose vertex
//!   schema is declared by the file itself (see [`layout`])
//! - [`anm`]: per-bone, per-frame pose deltas
//!
//! Both decoders take a complete in-memory buffer and never perform I/O.

pub mod anm;
pub mod layout;
pub mod msh;

pub use anm::{ANM_MAGIC, AnimationDecoder};
pub use layout::{BoneLink, LayoutEntry, RawMeshData, RawVertex, VertexLayout};
pub use msh::{AttachmentBox, DecodedMesh, MSH_MAGIC, MeshDecoder, MeshMetadata, MetadataBlock};

use crate::errors::{ImportError, Result};
use crate::io::ByteCursor;

/// Reads a zero-terminated magic string and checks it against `expected`.
/// Any failure to read the string counts as a bad magic.
pub(crate) fn expect_magic(cursor: &mut ByteCursor<'_>, expected: &'static str) -> Result<()> {
    let mut lookahead = cursor.clone();
    match cursor.read_cstring() {
        Ok(magic) if magic == expected => Ok(()),
        Ok(magic) => Err(ImportError::BadMagic {
            expected,
            found: magic,
        }),
        Err(_) => {
            let available = lookahead.remaining().min(expected.len() + 2);
            let head = lookahead.read_bytes(available).unwrap_or_default();
            Err(ImportError::BadMagic {
                expected,
                found: String::from_utf8_lossy(head).into_owned(),
            })
        }
    }
}
