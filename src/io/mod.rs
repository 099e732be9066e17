//! Binary input helpers.

pub mod cursor;

pub use cursor::{ByteCursor, FormatSpec, Scalar, ScalarKind};
