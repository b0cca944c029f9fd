//! Byte layout of the 3072-byte MarCCD frame header.
//!
//! The header is described by a static table rather than a `#[repr(C, packed)]`
//! struct: every entry names a field, its offset within the block and how the
//! bytes are interpreted. Decoding and encoding are driven entirely by this table.

/// Size of the opaque TIFF preamble that precedes the frame header.
pub const PREAMBLE_SIZE: usize = 1024;

/// Size of the MarCCD frame header block.
pub const HEADER_SIZE: usize = 3072;

/// Offset of the first pixel value from the start of the file.
pub const DATA_OFFSET: usize = PREAMBLE_SIZE + HEADER_SIZE;

/// How the bytes of a [`Field`] are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// 32-bit unsigned little-endian integer.
    U32,
    /// 32-bit signed little-endian integer.
    I32,
    /// Null-padded ASCII string of the given byte length.
    CString(usize),
    /// Fixed number of consecutive `U32` values.
    U32Array(usize),
    /// Fixed number of consecutive `I32` values.
    I32Array(usize),
    /// Reserved or padding bytes, kept verbatim.
    Reserved(usize),
}

impl FieldKind {
    #[inline]
    pub const fn byte_size(&self) -> usize {
        match *self {
            Self::U32 | Self::I32 => 4,
            Self::CString(n) | Self::Reserved(n) => n,
            Self::U32Array(n) | Self::I32Array(n) => n * 4,
        }
    }

    #[inline]
    pub fn is_reserved(&self) -> bool {
        matches!(self, Self::Reserved(_))
    }
}

/// A named region of the frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub offset: usize,
    pub kind: FieldKind,
}

impl Field {
    const fn new(name: &'static str, offset: usize, kind: FieldKind) -> Self {
        Self { name, offset, kind }
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.kind.byte_size()
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub const fn end(&self) -> usize {
        self.offset + self.len()
    }

    #[inline]
    pub const fn range(&self) -> core::ops::Range<usize> {
        self.offset..self.end()
    }
}

/// Looks up a field by its on-disk name.
pub fn field(name: &str) -> Option<&'static Field> {
    FIELDS.iter().find(|f| f.name == name)
}

// Offsets of the fields the codec rewrites.
pub(crate) const NFAST: usize = 80;
pub(crate) const NSLOW: usize = 84;
pub(crate) const XTAL_TO_DETECTOR: usize = 640;
pub(crate) const BEAM_X: usize = 644;
pub(crate) const BEAM_Y: usize = 648;
pub(crate) const START_XTAL_TO_DETECTOR: usize = 696;
pub(crate) const PIXELSIZE_X: usize = 772;
pub(crate) const PIXELSIZE_Y: usize = 776;
pub(crate) const SOURCE_WAVELENGTH: usize = 908;
pub(crate) const ACQUIRE_TIMESTAMP: usize = 1344;

/// Every field of the frame header, in layout order.
pub static FIELDS: [Field; 146] = [
    // File and header format parameters (256 bytes)
    Field::new("header_type", 0, FieldKind::U32),
    Field::new("header_name", 4, FieldKind::CString(16)),
    Field::new("header_major_version", 20, FieldKind::U32),
    Field::new("header_minor_version", 24, FieldKind::U32),
    Field::new("header_byte_order", 28, FieldKind::U32),
    Field::new("data_byte_order", 32, FieldKind::U32),
    Field::new("header_size", 36, FieldKind::U32),
    Field::new("frame_type", 40, FieldKind::U32),
    Field::new("magic_number", 44, FieldKind::I32),
    Field::new("compression_type", 48, FieldKind::U32),
    Field::new("compression1", 52, FieldKind::U32),
    Field::new("compression2", 56, FieldKind::U32),
    Field::new("compression3", 60, FieldKind::U32),
    Field::new("compression4", 64, FieldKind::U32),
    Field::new("compression5", 68, FieldKind::U32),
    Field::new("compression6", 72, FieldKind::U32),
    Field::new("nheaders", 76, FieldKind::U32),
    Field::new("nfast", 80, FieldKind::U32),
    Field::new("nslow", 84, FieldKind::U32),
    Field::new("depth", 88, FieldKind::U32),
    Field::new("record_length", 92, FieldKind::U32),
    Field::new("signif_bits", 96, FieldKind::U32),
    Field::new("data_type", 100, FieldKind::U32),
    Field::new("saturated_value", 104, FieldKind::U32),
    Field::new("sequence", 108, FieldKind::U32),
    Field::new("nimages", 112, FieldKind::U32),
    Field::new("origin", 116, FieldKind::U32),
    Field::new("orientation", 120, FieldKind::U32),
    Field::new("view_direction", 124, FieldKind::U32),
    Field::new("overflow_location", 128, FieldKind::U32),
    Field::new("over_8_bits", 132, FieldKind::U32),
    Field::new("over_16_bits", 136, FieldKind::U32),
    Field::new("multiplexed", 140, FieldKind::U32),
    Field::new("nfastimages", 144, FieldKind::U32),
    Field::new("nslowimages", 148, FieldKind::U32),
    Field::new("darkcurrent_applied", 152, FieldKind::U32),
    Field::new("bias_applied", 156, FieldKind::U32),
    Field::new("flatfield_applied", 160, FieldKind::U32),
    Field::new("distortion_applied", 164, FieldKind::U32),
    Field::new("original_header_type", 168, FieldKind::U32),
    Field::new("file_saved", 172, FieldKind::U32),
    Field::new("n_valid_pixels", 176, FieldKind::U32),
    Field::new("defectmap_applied", 180, FieldKind::U32),
    Field::new("subimage_nfast", 184, FieldKind::U32),
    Field::new("subimage_nslow", 188, FieldKind::U32),
    Field::new("subimage_origin_fast", 192, FieldKind::U32),
    Field::new("subimage_origin_slow", 196, FieldKind::U32),
    Field::new("readout_pattern", 200, FieldKind::U32),
    Field::new("saturation_level", 204, FieldKind::U32),
    Field::new("orientation_code", 208, FieldKind::U32),
    Field::new("frameshift_multiplexed", 212, FieldKind::U32),
    Field::new("prescan_nfast", 216, FieldKind::U32),
    Field::new("prescan_nslow", 220, FieldKind::U32),
    Field::new("postscan_nfast", 224, FieldKind::U32),
    Field::new("postscan_nslow", 228, FieldKind::U32),
    Field::new("prepost_trimmed", 232, FieldKind::U32),
    Field::new("reserve1", 236, FieldKind::Reserved(20)),

    // Data statistics (128 bytes)
    Field::new("total_counts", 256, FieldKind::U32Array(2)),
    Field::new("special_counts1", 264, FieldKind::U32Array(2)),
    Field::new("special_counts2", 272, FieldKind::U32Array(2)),
    Field::new("min", 280, FieldKind::U32),
    Field::new("max", 284, FieldKind::U32),
    Field::new("mean", 288, FieldKind::I32),
    Field::new("rms", 292, FieldKind::U32),
    Field::new("n_zeros", 296, FieldKind::U32),
    Field::new("n_saturated", 300, FieldKind::U32),
    Field::new("stats_uptodate", 304, FieldKind::U32),
    Field::new("pixel_noise", 308, FieldKind::U32Array(9)),
    Field::new("reserve2", 344, FieldKind::Reserved(40)),

    // Sample changer (256 bytes)
    Field::new("barcode", 384, FieldKind::CString(16)),
    Field::new("barcode_angle", 400, FieldKind::U32),
    Field::new("barcode_status", 404, FieldKind::U32),
    Field::new("reserve2a", 408, FieldKind::Reserved(232)),

    // Goniostat parameters (128 bytes)
    Field::new("xtal_to_detector", 640, FieldKind::I32),
    Field::new("beam_x", 644, FieldKind::I32),
    Field::new("beam_y", 648, FieldKind::I32),
    Field::new("integration_time", 652, FieldKind::I32),
    Field::new("exposure_time", 656, FieldKind::I32),
    Field::new("readout_time", 660, FieldKind::I32),
    Field::new("nreads", 664, FieldKind::I32),
    Field::new("start_twotheta", 668, FieldKind::I32),
    Field::new("start_omega", 672, FieldKind::I32),
    Field::new("start_chi", 676, FieldKind::I32),
    Field::new("start_kappa", 680, FieldKind::I32),
    Field::new("start_phi", 684, FieldKind::I32),
    Field::new("start_delta", 688, FieldKind::I32),
    Field::new("start_gamma", 692, FieldKind::I32),
    Field::new("start_xtal_to_detector", 696, FieldKind::I32),
    Field::new("end_twotheta", 700, FieldKind::I32),
    Field::new("end_omega", 704, FieldKind::I32),
    Field::new("end_chi", 708, FieldKind::I32),
    Field::new("end_kappa", 712, FieldKind::I32),
    Field::new("end_phi", 716, FieldKind::I32),
    Field::new("end_delta", 720, FieldKind::I32),
    Field::new("end_gamma", 724, FieldKind::I32),
    Field::new("end_xtal_to_detector", 728, FieldKind::I32),
    Field::new("rotation_axis", 732, FieldKind::I32),
    Field::new("rotation_range", 736, FieldKind::I32),
    Field::new("detector_rotx", 740, FieldKind::I32),
    Field::new("detector_roty", 744, FieldKind::I32),
    Field::new("detector_rotz", 748, FieldKind::I32),
    Field::new("total_dose", 752, FieldKind::I32),
    Field::new("reserve3", 756, FieldKind::Reserved(12)),

    // Detector parameters (128 bytes)
    Field::new("detector_type", 768, FieldKind::I32),
    Field::new("pixelsize_x", 772, FieldKind::I32),
    Field::new("pixelsize_y", 776, FieldKind::I32),
    Field::new("mean_bias", 780, FieldKind::I32),
    Field::new("photons_per_100adu", 784, FieldKind::I32),
    Field::new("measured_bias", 788, FieldKind::I32Array(9)),
    Field::new("measured_temperature", 824, FieldKind::I32Array(9)),
    Field::new("measured_pressure", 860, FieldKind::I32Array(9)),

    // X-ray source parameters (64 bytes)
    Field::new("source_type", 896, FieldKind::I32),
    Field::new("source_dx", 900, FieldKind::I32),
    Field::new("source_dy", 904, FieldKind::I32),
    Field::new("source_wavelength", 908, FieldKind::I32),
    Field::new("source_power", 912, FieldKind::I32),
    Field::new("source_voltage", 916, FieldKind::I32),
    Field::new("source_current", 920, FieldKind::I32),
    Field::new("source_bias", 924, FieldKind::I32),
    Field::new("source_polarization_x", 928, FieldKind::I32),
    Field::new("source_polarization_y", 932, FieldKind::I32),
    Field::new("source_intensity_0", 936, FieldKind::I32),
    Field::new("source_intensity_1", 940, FieldKind::I32),
    Field::new("reserve_source", 944, FieldKind::Reserved(8)),

    // X-ray optics parameters (128 bytes)
    Field::new("optics_type", 952, FieldKind::I32),
    Field::new("optics_dx", 956, FieldKind::I32),
    Field::new("optics_dy", 960, FieldKind::I32),
    Field::new("optics_wavelength", 964, FieldKind::I32),
    Field::new("optics_dispersion", 968, FieldKind::I32),
    Field::new("optics_crossfire_x", 972, FieldKind::I32),
    Field::new("optics_crossfire_y", 976, FieldKind::I32),
    Field::new("optics_angle", 980, FieldKind::I32),
    Field::new("optics_polarization_x", 984, FieldKind::I32),
    Field::new("optics_polarization_y", 988, FieldKind::I32),
    Field::new("reserve_optics", 992, FieldKind::Reserved(16)),
    Field::new("reserve5", 1008, FieldKind::Reserved(16)),

    // File parameters (1024 bytes)
    Field::new("filetitle", 1024, FieldKind::CString(128)),
    Field::new("filepath", 1152, FieldKind::CString(128)),
    Field::new("filename", 1280, FieldKind::CString(64)),
    Field::new("acquire_timestamp", 1344, FieldKind::CString(32)),
    Field::new("header_timestamp", 1376, FieldKind::CString(32)),
    Field::new("save_timestamp", 1408, FieldKind::CString(32)),
    Field::new("file_comment", 1440, FieldKind::CString(512)),
    Field::new("reserve6", 1952, FieldKind::Reserved(96)),

    // Dataset parameters (512 bytes)
    Field::new("dataset_comment", 2048, FieldKind::CString(512)),

    // User-definable data (512 bytes)
    Field::new("user_data", 2560, FieldKind::CString(512)),
];
