use crate::Result;
use crate::codec;
use crate::header::{FieldValue, RawHeader};
use crate::metadata::Overrides;
use crate::pixels::{PixelValue, Pixels};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Explicit metadata supplied at construction time.
///
/// Every `Some` value takes precedence over whatever the file header says.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ImageOptions {
    pub name: Option<String>,
    pub distance: Option<f64>,
    pub center: Option<(f64, f64)>,
    pub pixelsize: Option<(f64, f64)>,
    pub wavelength: Option<f64>,
}

/// A MarCCD image: pixels, the base header they were read with, and the
/// metadata fields that are written back on save.
#[derive(Debug, Clone, PartialEq)]
pub struct MarCcd {
    pixels: Pixels,
    header: Option<RawHeader>,
    /// Display name, the file name when read from disk.
    pub name: Option<String>,
    /// Crystal-to-detector distance in millimetres.
    pub distance: Option<f64>,
    /// Beam center in pixels.
    pub center: Option<(f64, f64)>,
    /// Pixel size in microns.
    pub pixelsize: Option<(f64, f64)>,
    /// X-ray wavelength in ångströms.
    pub wavelength: Option<f64>,
    /// Acquisition time, `YYYY-MMDD-HHMM-SS-nanoseconds`. Read-only on disk.
    pub timestamp: Option<String>,
}

impl Default for MarCcd {
    fn default() -> Self {
        Self::new()
    }
}

impl MarCcd {
    /// An empty 0×0 image with a zeroed header and no metadata.
    pub fn new() -> Self {
        Self {
            header: Some(RawHeader::zeroed()),
            ..Self::from_pixels(Pixels::default())
        }
    }

    /// Wraps an existing pixel array. There is no base header, so the image
    /// cannot be written until one is attached with [`Self::with_zeroed_header`].
    pub fn from_pixels(pixels: Pixels) -> Self {
        Self {
            pixels,
            header: None,
            name: None,
            distance: None,
            center: None,
            pixelsize: None,
            wavelength: None,
            timestamp: None,
        }
    }

    /// Builds an image from `rows × cols` values of any numeric type.
    ///
    /// Non-`u16` input is coerced with wrapping truncation and logged as a
    /// warning.
    pub fn from_array<T: PixelValue>(rows: usize, cols: usize, data: &[T]) -> Result<Self> {
        if !T::IS_U16 {
            warn!(
                element_type = core::any::type_name::<T>(),
                "coercing pixel data to u16; out-of-range values wrap"
            );
        }
        Ok(Self::from_pixels(Pixels::from_coerced(rows, cols, data)?))
    }

    /// Decodes a complete `.mccd` byte stream.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let (header, metadata, pixels) = codec::decode_file(bytes)?;
        debug!(
            nfast = pixels.rows(),
            nslow = pixels.cols(),
            timestamp = metadata.timestamp.as_deref(),
            "decoded MarCCD image"
        );
        Ok(Self {
            pixels,
            header: Some(header),
            name: None,
            distance: Some(metadata.distance),
            center: Some(metadata.center),
            pixelsize: Some(metadata.pixelsize),
            wavelength: Some(metadata.wavelength),
            timestamp: metadata.timestamp,
        })
    }

    /// Installs a 3072-byte zeroed base header. Unknown header fields are
    /// then written as literal zeros.
    pub fn with_zeroed_header(mut self) -> Self {
        self.header = Some(RawHeader::zeroed());
        self
    }

    /// Applies every set option over the current values.
    pub fn with_options(mut self, options: ImageOptions) -> Self {
        self.apply_options(options);
        self
    }

    pub fn apply_options(&mut self, options: ImageOptions) {
        if options.name.is_some() {
            self.name = options.name;
        }
        if options.distance.is_some() {
            self.distance = options.distance;
        }
        if options.center.is_some() {
            self.center = options.center;
        }
        if options.pixelsize.is_some() {
            self.pixelsize = options.pixelsize;
        }
        if options.wavelength.is_some() {
            self.wavelength = options.wavelength;
        }
    }

    #[inline]
    pub fn pixels(&self) -> &Pixels {
        &self.pixels
    }

    #[inline]
    pub fn pixels_mut(&mut self) -> &mut Pixels {
        &mut self.pixels
    }

    /// Replaces the pixel array; the header dimensions follow on write.
    #[inline]
    pub fn set_pixels(&mut self, pixels: Pixels) {
        self.pixels = pixels;
    }

    /// `(nfast, nslow)`, always taken from the pixel array.
    #[inline]
    pub fn dimensions(&self) -> (usize, usize) {
        self.pixels.shape()
    }

    /// The base header captured on read, if any.
    #[inline]
    pub fn raw_header(&self) -> Option<&RawHeader> {
        self.header.as_ref()
    }

    /// Every field of the base header, decoded.
    pub fn header_fields(&self) -> Option<BTreeMap<&'static str, FieldValue>> {
        self.header.as_ref().map(RawHeader::decode)
    }

    /// Current values to splice into the base header on write.
    pub fn overrides(&self) -> Overrides {
        Overrides {
            dimensions: Some(self.dimensions()),
            distance: self.distance,
            center: self.center,
            pixelsize: self.pixelsize,
            wavelength: self.wavelength,
        }
    }

    /// The header as it would be written now.
    pub fn encoded_header(&self) -> Result<RawHeader> {
        codec::encode_header(self.header.as_ref(), &self.overrides())
    }

    /// Serialises the image to a complete `.mccd` byte stream.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let header = self.encoded_header()?;
        let mut out = Vec::with_capacity(crate::DATA_OFFSET + self.pixels.len() * 2);
        codec::write_parts(&mut out, &header, &self.pixels)?;
        Ok(out)
    }

    /// True when a base header is present and the image can be written.
    #[inline]
    pub fn has_header(&self) -> bool {
        self.header.is_some()
    }
}
