//! Reader and writer for MarCCD X-ray diffraction images.
//!
//! A `.mccd` file is a 1024-byte TIFF preamble, a 3072-byte little-endian
//! frame header and a row-major block of `u16` pixels. The header codec
//! ([`decode_header`], [`encode_header`]) and the pixel codec ([`Pixels`])
//! work on byte slices; [`MarCcd`] ties them together into an image.

mod codec;
mod header;
mod image;
pub mod layout;
mod metadata;
mod pixels;
mod preamble;

#[cfg(test)]
#[path = "../test/tests.rs"]
mod tests;

pub use codec::{decode_header, encode_header};
pub use header::{FieldValue, RawHeader};
pub use image::{ImageOptions, MarCcd};
pub use layout::{DATA_OFFSET, HEADER_SIZE, PREAMBLE_SIZE};
pub use metadata::{Metadata, Overrides, parse_timestamp};
pub use pixels::{PixelValue, Pixels};
pub use preamble::TIFF_PREAMBLE;

// Optional file features
#[cfg(feature = "file")]
mod mccdfile;
#[cfg(test)]
#[cfg(feature = "file")]
#[path = "../test/mccdfile_test.rs"]
mod mccdfile_test;

#[cfg(feature = "mmap")]
pub use mccdfile::MarCcdMmap;

#[cfg(feature = "file")]
pub use mccdfile::{read_image, write_image};

// Error type

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("{} does not exist", .0.display())]
    NotFound(std::path::PathBuf),
    #[error("no MarCCD header to encode against")]
    MissingHeader,
    #[error("malformed acquire timestamp {0:?}")]
    Format(String),
    #[error("pixel data of {len} bytes does not fit a {nfast}x{nslow} u16 image")]
    Shape { nfast: usize, nslow: usize, len: usize },
    #[error("dimension {0} does not fit in a 32-bit header field")]
    DimensionOverflow(usize),
    #[error("{value} does not fit the fixed-point header field {field}")]
    ValueOverflow { field: &'static str, value: f64 },
    #[error("file too short: expected at least {expected} bytes, found {found}")]
    Truncated { expected: usize, found: usize },
    #[error("unknown header field {0:?}")]
    UnknownField(String),
    #[error("header field {name:?} is not a {expected} field")]
    FieldKind {
        name: &'static str,
        expected: &'static str,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[cfg(feature = "mmap")]
    #[error("memory mapping error: {0}")]
    Mmap(#[source] std::io::Error),
}

pub type Result<T> = core::result::Result<T, Error>;
