//! Error Types
//!
//! This module defines the error types used throughout the importer.
//!
//! # Overview
//!
//! The main error type [`ImportError`] covers all failure modes including:
//! - Binary stream failures while decoding `.msh` / `.anm` files
//! - XML documents of the wrong kind (the "stop parsing" signal)
//! - Missing files, elements, attributes and attachment bones
//! - Settings deserialization
//!
//! # Usage
//!
//! All public APIs return [`Result<T>`] which is an alias for
//! `std::result::Result<T, ImportError>`.
//!
//! ```rust,ignore
//! use gladius::errors::{ImportError, Result};
//!
//! fn decode() -> Result<()> {
//!     Ok(())
//! }
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// The main error type for the importer.
#[derive(Error, Debug)]
pub enum ImportError {
    // ========================================================================
    // Binary Stream Errors (fatal for the file being decoded)
    // ========================================================================
    /// The file does not start with the expected magic literal.
    #[error("Bad magic: expected {expected:?}, found {found:?}")]
    BadMagic {
        /// The magic literal the decoder expects
        expected: &'static str,
        /// What was actually read (lossy)
        found: String,
    },

    /// The vertex layout or data block size is inconsistent.
    #[error("Corrupt vertex layout: {0}")]
    CorruptLayout(String),

    /// The stream ended before a complete value could be read.
    #[error("Truncated stream at offset {offset}: needed {needed} bytes, {available} available")]
    TruncatedStream {
        /// Cursor position when the read was attempted
        offset: usize,
        /// Bytes the read required
        needed: usize,
        /// Bytes left in the buffer
        available: usize,
    },

    /// A format spec or decoded value did not have the expected shape.
    #[error("Malformed format: {0}")]
    MalformedFormat(String),

    // ========================================================================
    // Document Errors
    // ========================================================================
    /// An XML document has the wrong root tag. Loading of that document stops.
    #[error("File {path} contains a wrong kind of data: expected {expected}, got {found}")]
    UnexpectedRoot {
        /// Document path
        path: PathBuf,
        /// Expected root tag
        expected: &'static str,
        /// Actual root tag
        found: String,
    },

    /// XML syntax error.
    #[error("XML parse error: {0}")]
    Xml(#[from] roxmltree::Error),

    /// A required child element is absent.
    #[error("File {path} has no <{element}> element")]
    MissingElement {
        /// Document path
        path: PathBuf,
        /// Element tag that was expected
        element: &'static str,
    },

    /// A required attribute is absent.
    #[error("Element <{element}> is missing the \"{attribute}\" attribute")]
    MissingAttribute {
        /// Element tag
        element: String,
        /// Attribute name
        attribute: &'static str,
    },

    /// An attachment bone named in a descriptor is not part of the skeleton.
    #[error("Unknown bone: {0}")]
    UnknownBone(String),

    // ========================================================================
    // I/O Errors
    // ========================================================================
    /// File I/O error.
    #[error("IO error on {path}: {source}")]
    Io {
        /// The file being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Settings could not be deserialized.
    #[error("Settings error: {0}")]
    Settings(#[from] serde_json::Error),
}

impl ImportError {
    /// Whether this error aborts decoding of a single binary file
    /// (`BadMagic`, `CorruptLayout`, `TruncatedStream`, `MalformedFormat`).
    #[must_use]
    pub fn is_fatal_for_file(&self) -> bool {
        matches!(
            self,
            Self::BadMagic { .. }
                | Self::CorruptLayout(_)
                | Self::TruncatedStream { .. }
                | Self::MalformedFormat(_)
        )
    }

    /// Whether this error is the "stop parsing this document" signal.
    #[must_use]
    pub fn is_stop_parsing(&self) -> bool {
        matches!(self, Self::UnexpectedRoot { .. })
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Alias for `Result<T, ImportError>`.
pub type Result<T> = std::result::Result<T, ImportError>;
