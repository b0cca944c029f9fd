use crate::layout::{self, FIELDS, Field, FieldKind, HEADER_SIZE};
use crate::{Error, Result};
use std::collections::BTreeMap;

/// Decoded value of a single header field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    U32(u32),
    I32(i32),
    Str(String),
    U32Array(Vec<u32>),
    I32Array(Vec<i32>),
    /// Reserved bytes, verbatim.
    Bytes(Vec<u8>),
}

impl FieldValue {
    #[inline]
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Self::U32(v) => Some(*v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Self::I32(v) => Some(*v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }
}

/// Byte-exact copy of the 3072-byte frame header.
///
/// Fields that are never rewritten survive a read/write cycle unchanged;
/// updates splice only the bytes of the field being set.
#[derive(Clone, PartialEq, Eq)]
pub struct RawHeader {
    bytes: Box<[u8; HEADER_SIZE]>,
}

impl Default for RawHeader {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl core::fmt::Debug for RawHeader {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RawHeader")
            .field("nfast", &self.nfast())
            .field("nslow", &self.nslow())
            .field("acquire_timestamp", &self.cstring(layout::ACQUIRE_TIMESTAMP, 32))
            .finish_non_exhaustive()
    }
}

impl RawHeader {
    /// A header with every byte set to zero.
    #[inline]
    pub fn zeroed() -> Self {
        Self {
            bytes: Box::new([0u8; HEADER_SIZE]),
        }
    }

    #[inline]
    pub fn from_bytes(bytes: &[u8; HEADER_SIZE]) -> Self {
        Self {
            bytes: Box::new(*bytes),
        }
    }

    /// Copies the header out of the front of `bytes`.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let block: &[u8; HEADER_SIZE] = bytes
            .get(..HEADER_SIZE)
            .and_then(|b| b.try_into().ok())
            .ok_or(Error::Truncated {
                expected: HEADER_SIZE,
                found: bytes.len(),
            })?;
        Ok(Self::from_bytes(block))
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8; HEADER_SIZE] {
        &self.bytes
    }

    #[inline]
    pub fn nfast(&self) -> u32 {
        self.read_u32(layout::NFAST)
    }

    #[inline]
    pub fn nslow(&self) -> u32 {
        self.read_u32(layout::NSLOW)
    }

    #[inline]
    pub(crate) fn read_u32(&self, offset: usize) -> u32 {
        u32::from_le_bytes(self.word(offset))
    }

    #[inline]
    pub(crate) fn read_i32(&self, offset: usize) -> i32 {
        i32::from_le_bytes(self.word(offset))
    }

    #[inline]
    pub(crate) fn write_u32(&mut self, offset: usize, value: u32) {
        self.bytes[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
    }

    #[inline]
    pub(crate) fn write_i32(&mut self, offset: usize, value: i32) {
        self.bytes[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
    }

    #[inline]
    fn word(&self, offset: usize) -> [u8; 4] {
        let b = &self.bytes;
        [b[offset], b[offset + 1], b[offset + 2], b[offset + 3]]
    }

    /// Reads a null-padded ASCII string, dropping trailing nulls and any
    /// non-ASCII bytes.
    pub(crate) fn cstring(&self, offset: usize, len: usize) -> String {
        let raw = &self.bytes[offset..offset + len];
        let end = raw.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
        raw[..end]
            .iter()
            .filter(|b| b.is_ascii())
            .map(|&b| b as char)
            .collect()
    }

    fn decode_field(&self, field: &Field) -> FieldValue {
        let words = move |count: usize| (0..count).map(move |i| field.offset + 4 * i);
        match field.kind {
            FieldKind::U32 => FieldValue::U32(self.read_u32(field.offset)),
            FieldKind::I32 => FieldValue::I32(self.read_i32(field.offset)),
            FieldKind::CString(len) => FieldValue::Str(self.cstring(field.offset, len)),
            FieldKind::U32Array(n) => {
                FieldValue::U32Array(words(n).map(|o| self.read_u32(o)).collect())
            }
            FieldKind::I32Array(n) => {
                FieldValue::I32Array(words(n).map(|o| self.read_i32(o)).collect())
            }
            FieldKind::Reserved(_) => FieldValue::Bytes(self.bytes[field.range()].to_vec()),
        }
    }

    /// Decodes a single field by name.
    pub fn field(&self, name: &str) -> Result<FieldValue> {
        let field = layout::field(name).ok_or_else(|| Error::UnknownField(name.into()))?;
        Ok(self.decode_field(field))
    }

    /// Every field of the header in layout order.
    pub fn fields(&self) -> impl Iterator<Item = (&'static str, FieldValue)> + '_ {
        FIELDS.iter().map(|f| (f.name, self.decode_field(f)))
    }

    /// Name to value map covering the whole header.
    pub fn decode(&self) -> BTreeMap<&'static str, FieldValue> {
        self.fields().collect()
    }

    /// Overwrites a `U32` field by name.
    pub fn set_u32(&mut self, name: &str, value: u32) -> Result<()> {
        let field = Self::lookup(name, FieldKind::U32, "u32")?;
        self.write_u32(field.offset, value);
        Ok(())
    }

    /// Overwrites an `I32` field by name.
    pub fn set_i32(&mut self, name: &str, value: i32) -> Result<()> {
        let field = Self::lookup(name, FieldKind::I32, "i32")?;
        self.write_i32(field.offset, value);
        Ok(())
    }

    /// Overwrites a string field, null-padding it to the field width.
    ///
    /// Values longer than the field are truncated.
    pub fn set_str(&mut self, name: &str, value: &str) -> Result<()> {
        let field = layout::field(name).ok_or_else(|| Error::UnknownField(name.into()))?;
        let FieldKind::CString(len) = field.kind else {
            return Err(Error::FieldKind {
                name: field.name,
                expected: "string",
            });
        };
        let dst = &mut self.bytes[field.range()];
        dst.fill(0);
        let n = value.len().min(len);
        dst[..n].copy_from_slice(&value.as_bytes()[..n]);
        Ok(())
    }

    fn lookup(name: &str, kind: FieldKind, expected: &'static str) -> Result<&'static Field> {
        let field = layout::field(name).ok_or_else(|| Error::UnknownField(name.into()))?;
        if field.kind != kind {
            return Err(Error::FieldKind {
                name: field.name,
                expected,
            });
        }
        Ok(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeroed_header_decodes_to_zero_values() {
        let header = RawHeader::zeroed();
        assert_eq!(header.nfast(), 0);
        assert_eq!(header.field("beam_x").unwrap(), FieldValue::I32(0));
        assert_eq!(header.field("filename").unwrap(), FieldValue::Str(String::new()));
        assert_eq!(
            header.field("reserve3").unwrap(),
            FieldValue::Bytes(vec![0u8; 12])
        );
    }

    #[test]
    fn test_signed_and_unsigned_decoding() {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[80..84].copy_from_slice(&0xFFFF_FFFFu32.to_le_bytes());
        bytes[644..648].copy_from_slice(&(-1500i32).to_le_bytes());
        let header = RawHeader::from_bytes(&bytes);

        assert_eq!(header.field("nfast").unwrap().as_u32(), Some(u32::MAX));
        assert_eq!(header.field("beam_x").unwrap().as_i32(), Some(-1500));
    }

    #[test]
    fn test_cstring_strips_nulls_and_non_ascii() {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[1280..1287].copy_from_slice(b"ab\xffc.mc");
        let header = RawHeader::from_bytes(&bytes);
        assert_eq!(header.field("filename").unwrap().as_str(), Some("abc.mc"));
    }

    #[test]
    fn test_array_fields() {
        let mut header = RawHeader::zeroed();
        header.write_i32(788, 7);
        header.write_i32(788 + 8 * 4, -7);
        let FieldValue::I32Array(values) = header.field("measured_bias").unwrap() else {
            panic!("expected i32 array");
        };
        assert_eq!(values.len(), 9);
        assert_eq!(values[0], 7);
        assert_eq!(values[8], -7);
    }

    #[test]
    fn test_fields_cover_whole_header() {
        let header = RawHeader::zeroed();
        assert_eq!(header.fields().count(), FIELDS.len());
        assert_eq!(header.decode().len(), FIELDS.len());
    }

    #[test]
    fn test_setters_splice_only_their_field() {
        let mut header = RawHeader::from_bytes(&[0xABu8; HEADER_SIZE]);
        header.set_i32("beam_y", 123_456).unwrap();
        header.set_u32("nslow", 2048).unwrap();

        let bytes = header.as_bytes();
        assert_eq!(&bytes[648..652], &123_456i32.to_le_bytes());
        assert_eq!(&bytes[84..88], &2048u32.to_le_bytes());
        assert_eq!(bytes[647], 0xAB);
        assert_eq!(bytes[652], 0xAB);
        assert_eq!(bytes[83], 0xAB);
        assert_eq!(bytes[88], 0xAB);
    }

    #[test]
    fn test_set_str_pads_and_truncates() {
        let mut header = RawHeader::from_bytes(&[0xFFu8; HEADER_SIZE]);
        header.set_str("header_name", "MMX").unwrap();
        assert_eq!(header.field("header_name").unwrap().as_str(), Some("MMX"));
        assert!(header.as_bytes()[7..20].iter().all(|&b| b == 0));

        header.set_str("header_name", "0123456789abcdefXYZ").unwrap();
        assert_eq!(
            header.field("header_name").unwrap().as_str(),
            Some("0123456789abcdef")
        );
    }

    #[test]
    fn test_setter_errors() {
        let mut header = RawHeader::zeroed();
        assert!(matches!(
            header.set_u32("beam_x", 1),
            Err(Error::FieldKind { name: "beam_x", .. })
        ));
        assert!(matches!(
            header.set_i32("bogus", 1),
            Err(Error::UnknownField(_))
        ));
        assert!(matches!(
            header.set_str("nfast", "x"),
            Err(Error::FieldKind { .. })
        ));
        assert!(matches!(header.field("bogus"), Err(Error::UnknownField(_))));
    }

    #[test]
    fn test_from_slice_requires_full_block() {
        assert!(matches!(
            RawHeader::from_slice(&[0u8; 100]),
            Err(Error::Truncated { expected: HEADER_SIZE, found: 100 })
        ));
        let header = RawHeader::from_slice(&[1u8; HEADER_SIZE + 10]).unwrap();
        assert_eq!(header.as_bytes().len(), HEADER_SIZE);
    }
}
