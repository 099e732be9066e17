//! Little-endian Byte Cursor
//!
//! Sequential reader over an in-memory byte buffer. All decoders in
//! [`crate::formats`] are written against this type: the whole file is read
//! once, then walked front to back without seeking.
//!
//! Besides typed helpers (`read_u8`, `read_f32_array`, ...) the cursor
//! understands a small `struct`-style format string, e.g. `"<BLL"` or
//! `"<16f"`, for reading several scalars at once:
//!
//! ```rust,ignore
//! let header = cursor.read_struct("<BLL")?;
//! let bone_count = header[0].as_usize();
//! ```

use smallvec::SmallVec;

use crate::errors::{ImportError, Result};

// ============================================================================
// Format Specs
// ============================================================================

/// Kind of a scalar in a format spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    F32,
}

impl ScalarKind {
    fn from_code(code: char) -> Option<Self> {
        Some(match code {
            'B' => Self::U8,
            'b' => Self::I8,
            'H' => Self::U16,
            'h' => Self::I16,
            'I' | 'L' => Self::U32,
            'i' | 'l' => Self::I32,
            'f' => Self::F32,
            _ => return None,
        })
    }

    #[must_use]
    pub fn size(self) -> usize {
        match self {
            Self::U8 | Self::I8 => 1,
            Self::U16 | Self::I16 => 2,
            Self::U32 | Self::I32 | Self::F32 => 4,
        }
    }
}

/// A decoded scalar value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    U8(u8),
    I8(i8),
    U16(u16),
    I16(i16),
    U32(u32),
    I32(i32),
    F32(f32),
}

impl Scalar {
    #[must_use]
    pub fn as_f32(self) -> f32 {
        match self {
            Self::U8(v) => f32::from(v),
            Self::I8(v) => f32::from(v),
            Self::U16(v) => f32::from(v),
            Self::I16(v) => f32::from(v),
            Self::U32(v) => v as f32,
            Self::I32(v) => v as f32,
            Self::F32(v) => v,
        }
    }

    /// Integer view of the scalar. Negative values clamp to zero, floats truncate.
    #[must_use]
    pub fn as_u32(self) -> u32 {
        match self {
            Self::U8(v) => u32::from(v),
            Self::I8(v) => v.max(0) as u32,
            Self::U16(v) => u32::from(v),
            Self::I16(v) => v.max(0) as u32,
            Self::U32(v) => v,
            Self::I32(v) => v.max(0) as u32,
            Self::F32(v) => v.max(0.0) as u32,
        }
    }

    #[must_use]
    pub fn as_usize(self) -> usize {
        self.as_u32() as usize
    }
}

/// A parsed `struct`-style format string. Only little-endian (`<`, or no
/// prefix) layouts are accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatSpec {
    items: SmallVec<[(ScalarKind, usize); 4]>,
}

impl FormatSpec {
    pub fn parse(spec: &str) -> Result<Self> {
        let body = match spec.chars().next() {
            Some('<') => &spec[1..],
            Some('>' | '!') => {
                return Err(ImportError::MalformedFormat(format!(
                    "big-endian format spec {spec:?} is not supported"
                )));
            }
            _ => spec,
        };

        let mut items = SmallVec::new();
        let mut repeat: Option<usize> = None;
        for c in body.chars() {
            if c.is_whitespace() {
                continue;
            }
            if let Some(digit) = c.to_digit(10) {
                let current = repeat.unwrap_or(0);
                repeat = Some(current * 10 + digit as usize);
                continue;
            }
            let kind = ScalarKind::from_code(c).ok_or_else(|| {
                ImportError::MalformedFormat(format!("unknown format code {c:?} in {spec:?}"))
            })?;
            items.push((kind, repeat.take().unwrap_or(1)));
        }
        if repeat.is_some() {
            return Err(ImportError::MalformedFormat(format!(
                "format spec {spec:?} ends with a dangling repeat count"
            )));
        }
        Ok(Self { items })
    }

    /// Size in bytes of one record.
    #[must_use]
    pub fn size(&self) -> usize {
        self.items.iter().map(|(kind, n)| kind.size() * n).sum()
    }

    /// Number of scalars one record decodes to.
    #[must_use]
    pub fn value_count(&self) -> usize {
        self.items.iter().map(|(_, n)| n).sum()
    }
}

// ============================================================================
// ByteCursor
// ============================================================================

#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> ByteCursor<'a> {
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    #[inline]
    #[must_use]
    pub fn position(&self) -> usize {
        self.offset
    }

    #[inline]
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    #[inline]
    #[must_use]
    pub fn is_at_end(&self) -> bool {
        self.remaining() == 0
    }

    /// Takes the next `len` bytes, failing with `TruncatedStream` on a short buffer.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(ImportError::TruncatedStream {
                offset: self.offset,
                needed: len,
                available: self.remaining(),
            });
        }
        let bytes = &self.data[self.offset..self.offset + len];
        self.offset += len;
        Ok(bytes)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    /// Reads bytes up to a zero byte and decodes them as UTF-8.
    /// The terminator is consumed but not returned.
    pub fn read_cstring(&mut self) -> Result<String> {
        let rest = &self.data[self.offset..];
        let Some(len) = rest.iter().position(|&b| b == 0) else {
            return Err(ImportError::TruncatedStream {
                offset: self.offset,
                needed: rest.len() + 1,
                available: rest.len(),
            });
        };
        let start = self.offset;
        let text = std::str::from_utf8(&rest[..len]).map_err(|e| {
            ImportError::MalformedFormat(format!("invalid UTF-8 in string at offset {start}: {e}"))
        })?;
        self.offset += len + 1;
        Ok(text.to_owned())
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(f32::from_le_bytes(self.read_array()?))
    }

    pub fn read_f32_array<const N: usize>(&mut self) -> Result<[f32; N]> {
        let bytes = self.read_bytes(N * 4)?;
        let mut out = [0.0f32; N];
        for (value, chunk) in out.iter_mut().zip(bytes.chunks_exact(4)) {
            *value = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        Ok(out)
    }

    /// Reads `count` floats into `out`, replacing its contents.
    pub fn read_f32_into(&mut self, count: usize, out: &mut Vec<f32>) -> Result<()> {
        let bytes = self.read_bytes(count * 4)?;
        out.clear();
        out.extend(
            bytes
                .chunks_exact(4)
                .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]])),
        );
        Ok(())
    }

    /// Reads one record described by a format spec such as `"<BLL"`.
    pub fn read_struct(&mut self, spec: &str) -> Result<SmallVec<[Scalar; 16]>> {
        let spec = FormatSpec::parse(spec)?;
        self.read_spec(&spec)
    }

    /// Reads a record with a pre-parsed spec.
    pub fn read_spec(&mut self, spec: &FormatSpec) -> Result<SmallVec<[Scalar; 16]>> {
        let bytes = self.read_bytes(spec.size())?;
        let mut values = SmallVec::with_capacity(spec.value_count());
        let mut at = 0;
        for &(kind, count) in &spec.items {
            for _ in 0..count {
                let b = &bytes[at..at + kind.size()];
                values.push(match kind {
                    ScalarKind::U8 => Scalar::U8(b[0]),
                    ScalarKind::I8 => Scalar::I8(i8::from_le_bytes([b[0]])),
                    ScalarKind::U16 => Scalar::U16(u16::from_le_bytes([b[0], b[1]])),
                    ScalarKind::I16 => Scalar::I16(i16::from_le_bytes([b[0], b[1]])),
                    ScalarKind::U32 => Scalar::U32(u32::from_le_bytes([b[0], b[1], b[2], b[3]])),
                    ScalarKind::I32 => Scalar::I32(i32::from_le_bytes([b[0], b[1], b[2], b[3]])),
                    ScalarKind::F32 => Scalar::F32(f32::from_le_bytes([b[0], b[1], b[2], b[3]])),
                });
                at += kind.size();
            }
        }
        Ok(values)
    }

    /// Reads a record that must decode to exactly one scalar.
    pub fn read_scalar(&mut self, spec: &str) -> Result<Scalar> {
        let spec_parsed = FormatSpec::parse(spec)?;
        if spec_parsed.value_count() != 1 {
            return Err(ImportError::MalformedFormat(format!(
                "format spec {spec:?} decodes {} values, expected exactly one",
                spec_parsed.value_count()
            )));
        }
        Ok(self.read_spec(&spec_parsed)?[0])
    }
}
