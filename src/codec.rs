use crate::header::RawHeader;
use crate::layout::{DATA_OFFSET, HEADER_SIZE, PREAMBLE_SIZE};
use crate::metadata::{Metadata, Overrides};
use crate::pixels::Pixels;
use crate::preamble::TIFF_PREAMBLE;
use crate::{Error, Result};

/// Decodes a frame header block into its raw form and derived metadata.
pub fn decode_header(bytes: &[u8; HEADER_SIZE]) -> Result<(RawHeader, Metadata)> {
    let header = RawHeader::from_bytes(bytes);
    let metadata = Metadata::from_header(&header)?;
    Ok((header, metadata))
}

/// Re-encodes `base` with `overrides` spliced in.
///
/// Every byte not covered by a set override is copied from `base`. There is
/// no way to synthesise a header from nothing: a missing base is an error.
pub fn encode_header(base: Option<&RawHeader>, overrides: &Overrides) -> Result<RawHeader> {
    let mut header = base.cloned().ok_or(Error::MissingHeader)?;
    overrides.apply(&mut header)?;
    Ok(header)
}

/// Splits a whole `.mccd` file into header, metadata and pixels.
pub(crate) fn decode_file(bytes: &[u8]) -> Result<(RawHeader, Metadata, Pixels)> {
    if bytes.len() < DATA_OFFSET {
        return Err(Error::Truncated {
            expected: DATA_OFFSET,
            found: bytes.len(),
        });
    }
    let header = RawHeader::from_slice(&bytes[PREAMBLE_SIZE..])?;
    let metadata = Metadata::from_header(&header)?;
    let (nfast, nslow) = metadata.dimensions;
    let pixels = Pixels::decode(&bytes[DATA_OFFSET..], nfast, nslow)?;
    Ok((header, metadata, pixels))
}

/// Writes preamble, header and pixels to `out`, in that order.
pub(crate) fn write_parts<W: std::io::Write>(
    out: &mut W,
    header: &RawHeader,
    pixels: &Pixels,
) -> Result<()> {
    out.write_all(&TIFF_PREAMBLE)?;
    out.write_all(header.as_bytes())?;
    out.write_all(&pixels.encode())?;
    Ok(())
}
