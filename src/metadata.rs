use crate::header::RawHeader;
use crate::layout;
use crate::{Error, Result};

/// Fixed-point scale of `xtal_to_detector` (mm).
pub const DISTANCE_SCALE: f64 = 1e3;
/// Fixed-point scale of `beam_x` / `beam_y` (pixels).
pub const CENTER_SCALE: f64 = 1e3;
/// Fixed-point scale of `pixelsize_x` / `pixelsize_y` (µm).
pub const PIXELSIZE_SCALE: f64 = 1e3;
/// Fixed-point scale of `source_wavelength` (Å).
pub const WAVELENGTH_SCALE: f64 = 1e5;

/// Physical quantities derived from a [`RawHeader`].
///
/// Always recomputed from the header bytes; never stored in the file on its own.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Metadata {
    /// `(nfast, nslow)`, the shape of the pixel array.
    pub dimensions: (usize, usize),
    /// Crystal-to-detector distance in millimetres.
    pub distance: f64,
    /// Beam center in pixels.
    pub center: (f64, f64),
    /// Pixel size in microns.
    pub pixelsize: (f64, f64),
    /// X-ray wavelength in ångströms.
    pub wavelength: f64,
    /// Acquisition time as `YYYY-MMDD-HHMM-SS-nanoseconds`, `None` when the
    /// header carries no timestamp.
    pub timestamp: Option<String>,
}

impl Metadata {
    pub fn from_header(header: &RawHeader) -> Result<Self> {
        let scaled = |offset: usize, scale: f64| f64::from(header.read_i32(offset)) / scale;

        let raw_timestamp = header.cstring(layout::ACQUIRE_TIMESTAMP, 32);
        let timestamp = if raw_timestamp.is_empty() {
            None
        } else {
            Some(parse_timestamp(&raw_timestamp)?)
        };

        Ok(Self {
            dimensions: (header.nfast() as usize, header.nslow() as usize),
            distance: scaled(layout::XTAL_TO_DETECTOR, DISTANCE_SCALE),
            center: (
                scaled(layout::BEAM_X, CENTER_SCALE),
                scaled(layout::BEAM_Y, CENTER_SCALE),
            ),
            pixelsize: (
                scaled(layout::PIXELSIZE_X, PIXELSIZE_SCALE),
                scaled(layout::PIXELSIZE_Y, PIXELSIZE_SCALE),
            ),
            wavelength: scaled(layout::SOURCE_WAVELENGTH, WAVELENGTH_SCALE),
            timestamp,
        })
    }
}

/// Values to splice into a base header on encode. `None` leaves the
/// corresponding bytes untouched.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Overrides {
    pub dimensions: Option<(usize, usize)>,
    pub distance: Option<f64>,
    pub center: Option<(f64, f64)>,
    pub pixelsize: Option<(f64, f64)>,
    pub wavelength: Option<f64>,
}

impl Overrides {
    /// Writes every set value into `header`.
    ///
    /// The distance goes to both `xtal_to_detector` and
    /// `start_xtal_to_detector`.
    pub fn apply(&self, header: &mut RawHeader) -> Result<()> {
        // Convert everything first so a rejected value leaves `header` untouched.
        let dimensions = self
            .dimensions
            .map(|(nfast, nslow)| Ok::<_, Error>((dimension(nfast)?, dimension(nslow)?)))
            .transpose()?;
        let distance = self
            .distance
            .map(|d| to_fixed("xtal_to_detector", d, DISTANCE_SCALE))
            .transpose()?;
        let center = self
            .center
            .map(|(x, y)| {
                Ok::<_, Error>((
                    to_fixed("beam_x", x, CENTER_SCALE)?,
                    to_fixed("beam_y", y, CENTER_SCALE)?,
                ))
            })
            .transpose()?;
        let pixelsize = self
            .pixelsize
            .map(|(x, y)| {
                Ok::<_, Error>((
                    to_fixed("pixelsize_x", x, PIXELSIZE_SCALE)?,
                    to_fixed("pixelsize_y", y, PIXELSIZE_SCALE)?,
                ))
            })
            .transpose()?;
        let wavelength = self
            .wavelength
            .map(|w| to_fixed("source_wavelength", w, WAVELENGTH_SCALE))
            .transpose()?;

        if let Some((nfast, nslow)) = dimensions {
            header.write_u32(layout::NFAST, nfast);
            header.write_u32(layout::NSLOW, nslow);
        }
        if let Some(v) = distance {
            header.write_i32(layout::XTAL_TO_DETECTOR, v);
            header.write_i32(layout::START_XTAL_TO_DETECTOR, v);
        }
        if let Some((x, y)) = center {
            header.write_i32(layout::BEAM_X, x);
            header.write_i32(layout::BEAM_Y, y);
        }
        if let Some((x, y)) = pixelsize {
            header.write_i32(layout::PIXELSIZE_X, x);
            header.write_i32(layout::PIXELSIZE_Y, y);
        }
        if let Some(v) = wavelength {
            header.write_i32(layout::SOURCE_WAVELENGTH, v);
        }
        Ok(())
    }
}

/// Rounds `value * scale` to the nearest integer, rejecting NaN, infinities
/// and anything outside the `i32` range.
#[inline]
fn to_fixed(field: &'static str, value: f64, scale: f64) -> Result<i32> {
    let scaled = (value * scale).round();
    if !scaled.is_finite() || scaled < f64::from(i32::MIN) || scaled > f64::from(i32::MAX) {
        return Err(Error::ValueOverflow { field, value });
    }
    Ok(scaled as i32)
}

#[inline]
fn dimension(n: usize) -> Result<u32> {
    u32::try_from(n).map_err(|_| Error::DimensionOverflow(n))
}

/// Reformats a MarCCD `acquire_timestamp` (`MMDDhhmmYYYY.SS` followed by
/// nanoseconds) as `YYYY-MMDD-hhmm-SS-nanoseconds`.
///
/// A single separator is tolerated after the `MMDDhhmm` group and between
/// seconds and nanoseconds. Without that second separator the nanoseconds are
/// taken greedily from the digit right after the seconds. Anything after the
/// nanoseconds is ignored.
pub fn parse_timestamp(raw: &str) -> Result<String> {
    let malformed = || Error::Format(raw.to_owned());
    let mut cur = Cursor { s: raw, pos: 0 };

    let mmdd = cur.digits(4).ok_or_else(malformed)?;
    let hhmm = cur.digits(4).ok_or_else(malformed)?;
    cur.eat(b'.');
    let yyyy = cur.digits(4).ok_or_else(malformed)?;
    if !cur.eat(b'.') {
        return Err(malformed());
    }
    let ss = cur.digits(2).ok_or_else(malformed)?;
    cur.skip_separator();
    let ns = cur.digits(9).ok_or_else(malformed)?;

    Ok(format!("{yyyy}-{mmdd}-{hhmm}-{ss}-{ns}"))
}

struct Cursor<'a> {
    s: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn digits(&mut self, n: usize) -> Option<&'a str> {
        let chunk = self.s.get(self.pos..self.pos + n)?;
        if !chunk.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        self.pos += n;
        Some(chunk)
    }

    fn eat(&mut self, byte: u8) -> bool {
        let hit = self.s.as_bytes().get(self.pos) == Some(&byte);
        if hit {
            self.pos += 1;
        }
        hit
    }

    fn skip_separator(&mut self) {
        if let Some(b) = self.s.as_bytes().get(self.pos) {
            if !b.is_ascii_digit() {
                self.pos += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp_compact() {
        assert_eq!(
            parse_timestamp("111015532019.20765444000").unwrap(),
            "2019-1110-1553-20-765444000"
        );
    }

    #[test]
    fn test_parse_timestamp_with_separators() {
        assert_eq!(
            parse_timestamp("111015532019.20.765444000").unwrap(),
            "2019-1110-1553-20-765444000"
        );
        assert_eq!(
            parse_timestamp("11101553.2019.20765444000").unwrap(),
            "2019-1110-1553-20-765444000"
        );
    }

    #[test]
    fn test_parse_timestamp_rejects_malformed() {
        for bad in [
            "",
            "not a timestamp",
            "11101553201920765444000",
            "111015532019.2",
            "111015532019.20.7654",
            "1110155a2019.20765444000",
        ] {
            assert!(
                matches!(parse_timestamp(bad), Err(Error::Format(ref s)) if s == bad),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_from_header_scales_values() {
        let mut header = RawHeader::zeroed();
        header.write_u32(layout::NFAST, 2048);
        header.write_u32(layout::NSLOW, 1024);
        header.write_i32(layout::XTAL_TO_DETECTOR, 199_995);
        header.write_i32(layout::BEAM_X, 1_024_500);
        header.write_i32(layout::BEAM_Y, -250);
        header.write_i32(layout::PIXELSIZE_X, 79_346);
        header.write_i32(layout::PIXELSIZE_Y, 79_346);
        header.write_i32(layout::SOURCE_WAVELENGTH, 103_320);

        let meta = Metadata::from_header(&header).unwrap();
        assert_eq!(meta.dimensions, (2048, 1024));
        assert!((meta.distance - 199.995).abs() < 1e-9);
        assert!((meta.center.0 - 1024.5).abs() < 1e-9);
        assert!((meta.center.1 + 0.25).abs() < 1e-9);
        assert!((meta.pixelsize.0 - 79.346).abs() < 1e-9);
        assert!((meta.wavelength - 1.0332).abs() < 1e-12);
        assert_eq!(meta.timestamp, None);
    }

    #[test]
    fn test_from_header_propagates_timestamp_error() {
        let mut header = RawHeader::zeroed();
        header.set_str("acquire_timestamp", "yesterday").unwrap();
        assert!(matches!(
            Metadata::from_header(&header),
            Err(Error::Format(_))
        ));
    }

    #[test]
    fn test_distance_written_twice() {
        let mut header = RawHeader::zeroed();
        let overrides = Overrides {
            distance: Some(199.995),
            ..Default::default()
        };
        overrides.apply(&mut header).unwrap();
        assert_eq!(header.read_i32(640), 199_995);
        assert_eq!(header.read_i32(696), 199_995);
    }

    #[test]
    fn test_unset_overrides_leave_bytes_alone() {
        let mut header = RawHeader::from_bytes(&[0x5Au8; crate::HEADER_SIZE]);
        let before = header.clone();
        Overrides::default().apply(&mut header).unwrap();
        assert_eq!(header, before);
    }

    #[test]
    fn test_out_of_range_values_are_rejected() {
        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY, 1e10, -1e10] {
            let mut header = RawHeader::from_bytes(&[0x11u8; crate::HEADER_SIZE]);
            let before = header.clone();
            let overrides = Overrides {
                dimensions: Some((8, 8)),
                distance: Some(value),
                ..Default::default()
            };
            let result = overrides.apply(&mut header);
            assert!(
                matches!(result, Err(Error::ValueOverflow { field: "xtal_to_detector", .. })),
                "{value} should be rejected"
            );
            assert_eq!(header, before, "{value} must not touch the header");
        }

        let mut header = RawHeader::zeroed();
        let overrides = Overrides {
            wavelength: Some(f64::NAN),
            ..Default::default()
        };
        assert!(matches!(
            overrides.apply(&mut header),
            Err(Error::ValueOverflow { field: "source_wavelength", .. })
        ));
        let overrides = Overrides {
            center: Some((0.0, 3e6)),
            ..Default::default()
        };
        assert!(matches!(
            overrides.apply(&mut header),
            Err(Error::ValueOverflow { field: "beam_y", .. })
        ));
    }

    #[test]
    fn test_extreme_values_in_range_are_kept() {
        let mut header = RawHeader::zeroed();
        let overrides = Overrides {
            distance: Some(-2_147_483.648),
            center: Some((2_147_483.647, 0.0)),
            ..Default::default()
        };
        overrides.apply(&mut header).unwrap();
        assert_eq!(header.read_i32(layout::XTAL_TO_DETECTOR), i32::MIN);
        assert_eq!(header.read_i32(layout::BEAM_X), i32::MAX);
    }

    #[test]
    fn test_parse_timestamp_greedy_nanoseconds() {
        assert_eq!(
            parse_timestamp("111015532019.201765444000").unwrap(),
            "2019-1110-1553-20-176544400"
        );
    }

    #[test]
    fn test_wavelength_rounds() {
        let mut header = RawHeader::zeroed();
        let overrides = Overrides {
            wavelength: Some(0.979_499_999_9),
            ..Default::default()
        };
        overrides.apply(&mut header).unwrap();
        assert_eq!(header.read_i32(layout::SOURCE_WAVELENGTH), 97_950);
    }
}
