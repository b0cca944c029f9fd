use crate::codec;
use crate::image::{ImageOptions, MarCcd};
use crate::{Error, Result};
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;
use tracing::debug;

#[cfg(feature = "mmap")]
use crate::{DATA_OFFSET, HEADER_SIZE, Metadata, PREAMBLE_SIZE, RawHeader};

fn ensure_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(Error::NotFound(path.to_path_buf()));
    }
    Ok(())
}

fn display_name(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().into_owned())
}

impl MarCcd {
    /// Reads a `.mccd` file. The image is named after the file.
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        ensure_exists(path)?;

        let mut bytes = Vec::new();
        File::open(path)?.read_to_end(&mut bytes)?;
        debug!(path = %path.display(), len = bytes.len(), "read MarCCD file");

        let mut image = Self::from_bytes(&bytes)?;
        image.name = display_name(path);
        Ok(image)
    }

    /// Reads a `.mccd` file, then applies `options` over the header values.
    pub fn read_with(path: impl AsRef<Path>, options: ImageOptions) -> Result<Self> {
        Ok(Self::read(path)?.with_options(options))
    }

    /// Writes the image as a `.mccd` file.
    ///
    /// Fails with [`Error::MissingHeader`] before touching the filesystem
    /// when the image has no base header.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let header = self.encoded_header()?;

        let mut out = BufWriter::new(File::create(path)?);
        codec::write_parts(&mut out, &header, self.pixels())?;
        out.flush()?;
        debug!(
            path = %path.display(),
            nfast = self.dimensions().0,
            nslow = self.dimensions().1,
            "wrote MarCCD file"
        );
        Ok(())
    }
}

pub fn read_image(path: impl AsRef<Path>) -> Result<MarCcd> {
    MarCcd::read(path)
}

pub fn write_image(image: &MarCcd, path: impl AsRef<Path>) -> Result<()> {
    image.write(path)
}

#[cfg(feature = "mmap")]
/// Read-only memory-mapped view of a `.mccd` file.
///
/// The header is decoded eagerly; pixels stay in the mapping until
/// [`MarCcdMmap::to_image`] copies them out.
pub struct MarCcdMmap {
    mmap: memmap2::Mmap,
    header: RawHeader,
    metadata: Metadata,
    name: Option<String>,
}

#[cfg(feature = "mmap")]
impl MarCcdMmap {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        ensure_exists(path)?;

        let file = File::open(path)?;
        // SAFETY: the mapping is read-only and owned by the returned value;
        // concurrent truncation of the file by another process is not guarded.
        let mmap = unsafe { memmap2::Mmap::map(&file).map_err(Error::Mmap)? };

        if mmap.len() < DATA_OFFSET {
            return Err(Error::Truncated {
                expected: DATA_OFFSET,
                found: mmap.len(),
            });
        }

        let header = RawHeader::from_slice(&mmap[PREAMBLE_SIZE..PREAMBLE_SIZE + HEADER_SIZE])?;
        let metadata = Metadata::from_header(&header)?;

        let (nfast, nslow) = metadata.dimensions;
        let pixel_len = mmap.len() - DATA_OFFSET;
        if nfast.checked_mul(nslow).and_then(|n| n.checked_mul(2)) != Some(pixel_len) {
            return Err(Error::Shape {
                nfast,
                nslow,
                len: pixel_len,
            });
        }

        Ok(Self {
            mmap,
            header,
            metadata,
            name: display_name(path),
        })
    }

    #[inline]
    pub fn header(&self) -> &RawHeader {
        &self.header
    }

    #[inline]
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    #[inline]
    pub fn dimensions(&self) -> (usize, usize) {
        self.metadata.dimensions
    }

    /// Raw little-endian pixel bytes.
    #[inline]
    pub fn pixel_bytes(&self) -> &[u8] {
        &self.mmap[DATA_OFFSET..]
    }

    pub fn pixel(&self, row: usize, col: usize) -> Option<u16> {
        let (nfast, nslow) = self.dimensions();
        if row >= nfast || col >= nslow {
            return None;
        }
        let at = 2 * (row * nslow + col);
        let bytes = self.pixel_bytes();
        Some(u16::from_le_bytes([bytes[at], bytes[at + 1]]))
    }

    /// Copies the mapped file into an owned [`MarCcd`].
    pub fn to_image(&self) -> Result<MarCcd> {
        let mut image = MarCcd::from_bytes(&self.mmap)?;
        image.name = self.name.clone();
        Ok(image)
    }
}
