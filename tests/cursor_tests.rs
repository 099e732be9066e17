//! Byte Cursor Tests
//!
//! Tests for:
//! - Zero-terminated strings
//! - Little-endian scalars and struct-style records
//! - Truncation and malformed format specs

use gladius::errors::ImportError;
use gladius::io::{ByteCursor, Scalar};

fn bytes() -> Vec<u8> {
    let mut out = b"bone\0".to_vec();
    out.push(7);
    out.extend_from_slice(&42u32.to_le_bytes());
    out.extend_from_slice(&1.5f32.to_le_bytes());
    out
}

// ============================================================================
// Reads
// ============================================================================

#[test]
fn reads_strings_and_scalars_in_order() {
    let data = bytes();
    let mut cursor = ByteCursor::new(&data);

    assert_eq!(cursor.read_cstring().unwrap(), "bone");
    assert_eq!(cursor.position(), 5);
    assert_eq!(cursor.read_u8().unwrap(), 7);
    assert_eq!(cursor.read_u32().unwrap(), 42);
    assert!((cursor.read_f32().unwrap() - 1.5).abs() < f32::EPSILON);
    assert!(cursor.is_at_end());
}

#[test]
fn reads_struct_records() {
    let data = bytes();
    let mut cursor = ByteCursor::new(&data);
    cursor.read_cstring().unwrap();

    let values = cursor.read_struct("<BLf").unwrap();
    assert_eq!(values.len(), 3);
    assert_eq!(values[0].as_usize(), 7);
    assert_eq!(values[1].as_u32(), 42);
    assert!((values[2].as_f32() - 1.5).abs() < f32::EPSILON);
}

#[test]
fn reads_single_scalar() {
    let data = 9u32.to_le_bytes();
    let mut cursor = ByteCursor::new(&data);
    assert_eq!(cursor.read_scalar("<L").unwrap(), Scalar::U32(9));
}

#[test]
fn empty_string_is_valid() {
    let mut cursor = ByteCursor::new(b"\0x");
    assert_eq!(cursor.read_cstring().unwrap(), "");
    assert_eq!(cursor.remaining(), 1);
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn unterminated_string_is_truncated() {
    let mut cursor = ByteCursor::new(b"bone");
    match cursor.read_cstring() {
        Err(ImportError::TruncatedStream { offset, available, .. }) => {
            assert_eq!(offset, 0);
            assert_eq!(available, 4);
        }
        other => panic!("Expected TruncatedStream, got {other:?}"),
    }
    // A failed read does not move the cursor
    assert_eq!(cursor.position(), 0);
}

#[test]
fn short_record_is_truncated() {
    let data = [1u8, 2, 3];
    let mut cursor = ByteCursor::new(&data);
    assert!(matches!(
        cursor.read_struct("<BL"),
        Err(ImportError::TruncatedStream { needed: 5, available: 3, .. })
    ));
    assert!(matches!(
        cursor.read_f32_array::<1>(),
        Err(ImportError::TruncatedStream { .. })
    ));
}

#[test]
fn scalar_spec_must_decode_one_value() {
    let data = [0u8; 8];
    let mut cursor = ByteCursor::new(&data);
    assert!(matches!(
        cursor.read_scalar("<2f"),
        Err(ImportError::MalformedFormat(_))
    ));
    assert!(matches!(
        cursor.read_scalar("<z"),
        Err(ImportError::MalformedFormat(_))
    ));
}
