use crate::layout::PREAMBLE_SIZE;

// Baseline TIFF IFD written by the detector software; the remainder is zero.
const PREFIX: [u8; 185] = [
    0x49, 0x49, 0x2a, 0x00, 0x08, 0x00, 0x00, 0x00, 0x0d, 0x00, 0x00, 0x01,
    0x04, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x0f, 0x00, 0x00, 0x01, 0x01,
    0x04, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x0f, 0x00, 0x00, 0x02, 0x01,
    0x03, 0x00, 0x01, 0x00, 0x00, 0x00, 0x10, 0x00, 0x00, 0x00, 0x03, 0x01,
    0x03, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x06, 0x01,
    0x03, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x11, 0x01,
    0x04, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x10, 0x00, 0x00, 0x12, 0x01,
    0x03, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x16, 0x01,
    0x04, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x0f, 0x00, 0x00, 0x17, 0x01,
    0x04, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0xc2, 0x01, 0x1a, 0x01,
    0x05, 0x00, 0x01, 0x00, 0x00, 0x00, 0xaa, 0x00, 0x00, 0x00, 0x1b, 0x01,
    0x05, 0x00, 0x01, 0x00, 0x00, 0x00, 0xb2, 0x00, 0x00, 0x00, 0x28, 0x01,
    0x03, 0x00, 0x01, 0x00, 0x00, 0x00, 0x03, 0x00, 0x00, 0x00, 0x96, 0x87,
    0x04, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x80, 0x96, 0x98, 0x00, 0x18, 0x5a, 0x01, 0x00, 0x80, 0x96,
    0x98, 0x00, 0x18, 0x5a, 0x01,
];

/// The fixed TIFF preamble emitted at the start of every written file.
///
/// On read these bytes are skipped without validation.
pub static TIFF_PREAMBLE: [u8; PREAMBLE_SIZE] = {
    let mut out = [0u8; PREAMBLE_SIZE];
    let mut i = 0;
    while i < PREFIX.len() {
        out[i] = PREFIX[i];
        i += 1;
    }
    out
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preamble_is_little_endian_tiff() {
        assert_eq!(TIFF_PREAMBLE.len(), 1024);
        assert_eq!(&TIFF_PREAMBLE[..4], b"II*\0");
        // first IFD at offset 8 with 13 entries
        assert_eq!(u32::from_le_bytes(TIFF_PREAMBLE[4..8].try_into().unwrap()), 8);
        assert_eq!(TIFF_PREAMBLE[8], 0x0d);
        assert!(TIFF_PREAMBLE[185..].iter().all(|&b| b == 0));
    }
}
