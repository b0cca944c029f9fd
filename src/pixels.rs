use crate::{Error, Result};

/// Row-major `u16` pixel array with shape `(nfast, nslow)`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Pixels {
    rows: usize,
    cols: usize,
    data: Vec<u16>,
}

impl Pixels {
    /// Wraps `data` as a `rows × cols` array.
    pub fn new(rows: usize, cols: usize, data: Vec<u16>) -> Result<Self> {
        let expected = rows.checked_mul(cols).ok_or(Error::Shape {
            nfast: rows,
            nslow: cols,
            len: data.len() * 2,
        })?;
        if data.len() != expected {
            return Err(Error::Shape {
                nfast: rows,
                nslow: cols,
                len: data.len() * 2,
            });
        }
        Ok(Self { rows, cols, data })
    }

    /// A `rows × cols` array of zeros.
    pub fn zeros(rows: usize, cols: usize) -> Result<Self> {
        let count = rows.checked_mul(cols).ok_or(Error::Shape {
            nfast: rows,
            nslow: cols,
            len: 0,
        })?;
        Ok(Self {
            rows,
            cols,
            data: vec![0; count],
        })
    }

    /// Builds a `u16` array from any primitive numeric type.
    ///
    /// Values are reinterpreted with wrapping truncation; nothing is clamped.
    pub fn from_coerced<T: PixelValue>(rows: usize, cols: usize, data: &[T]) -> Result<Self> {
        Self::new(rows, cols, data.iter().map(|v| v.wrap_to_u16()).collect())
    }

    /// Decodes little-endian `u16` pixels into an `nfast × nslow` array.
    pub fn decode(bytes: &[u8], nfast: usize, nslow: usize) -> Result<Self> {
        let shape_error = || Error::Shape {
            nfast,
            nslow,
            len: bytes.len(),
        };
        let count = nfast.checked_mul(nslow).ok_or_else(shape_error)?;
        if count.checked_mul(2) != Some(bytes.len()) {
            return Err(shape_error());
        }

        let mut data = vec![0u16; count];
        bytemuck::cast_slice_mut::<u16, u8>(&mut data).copy_from_slice(bytes);
        for v in data.iter_mut() {
            *v = u16::from_le(*v);
        }
        Ok(Self {
            rows: nfast,
            cols: nslow,
            data,
        })
    }

    /// Flattens the array to little-endian bytes.
    pub fn encode(&self) -> Vec<u8> {
        let le: Vec<u16> = self.data.iter().map(|v| v.to_le()).collect();
        bytemuck::cast_slice::<u16, u8>(&le).to_vec()
    }

    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<u16> {
        self.index(row, col).map(|i| self.data[i])
    }

    #[inline]
    pub fn get_mut(&mut self, row: usize, col: usize) -> Option<&mut u16> {
        self.index(row, col).map(|i| &mut self.data[i])
    }

    pub fn row(&self, row: usize) -> Option<&[u16]> {
        if row >= self.rows {
            return None;
        }
        let start = row * self.cols;
        Some(&self.data[start..start + self.cols])
    }

    #[inline]
    pub fn as_slice(&self) -> &[u16] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u16] {
        &mut self.data
    }

    #[inline]
    pub fn into_vec(self) -> Vec<u16> {
        self.data
    }

    #[inline]
    fn index(&self, row: usize, col: usize) -> Option<usize> {
        (row < self.rows && col < self.cols).then_some(row * self.cols + col)
    }
}

/// Element types that can be coerced into `u16` pixels.
pub trait PixelValue: Copy {
    /// True only for `u16`, where coercion is the identity.
    const IS_U16: bool = false;

    fn wrap_to_u16(self) -> u16;
}

impl PixelValue for u16 {
    const IS_U16: bool = true;

    #[inline]
    fn wrap_to_u16(self) -> u16 {
        self
    }
}

macro_rules! int_pixel {
    ($($t:ty),*) => {
        $(
            impl PixelValue for $t {
                #[inline]
                fn wrap_to_u16(self) -> u16 {
                    self as u16
                }
            }
        )*
    };
}

int_pixel!(u8, i8, i16, u32, i32, u64, i64, usize, isize);

macro_rules! float_pixel {
    ($($t:ty),*) => {
        $(
            impl PixelValue for $t {
                // Truncate toward zero first, then wrap like an integer.
                #[inline]
                fn wrap_to_u16(self) -> u16 {
                    (self as i64) as u16
                }
            }
        )*
    };
}

float_pixel!(f32, f64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_little_endian_row_major() {
        let bytes = [0x01, 0x00, 0x02, 0x00, 0x03, 0x00, 0xff, 0xff, 0x00, 0x01, 0x34, 0x12];
        let pixels = Pixels::decode(&bytes, 2, 3).unwrap();
        assert_eq!(pixels.shape(), (2, 3));
        assert_eq!(pixels.row(0).unwrap(), &[1, 2, 3]);
        assert_eq!(pixels.row(1).unwrap(), &[0xffff, 0x0100, 0x1234]);
        assert_eq!(pixels.get(1, 2), Some(0x1234));
        assert_eq!(pixels.get(2, 0), None);
        assert_eq!(pixels.encode(), bytes);
    }

    #[test]
    fn test_decode_shape_mismatch() {
        assert!(matches!(
            Pixels::decode(&[0u8; 10], 2, 3),
            Err(Error::Shape { nfast: 2, nslow: 3, len: 10 })
        ));
        // two full frames are still rejected
        assert!(matches!(
            Pixels::decode(&[0u8; 24], 2, 3),
            Err(Error::Shape { .. })
        ));
        assert!(matches!(
            Pixels::decode(&[0u8; 13], 2, 3),
            Err(Error::Shape { .. })
        ));
    }

    #[test]
    fn test_decode_empty() {
        let pixels = Pixels::decode(&[], 0, 0).unwrap();
        assert!(pixels.is_empty());
        assert!(pixels.encode().is_empty());
    }

    #[test]
    fn test_new_checks_length() {
        assert!(Pixels::new(2, 2, vec![0; 4]).is_ok());
        assert!(matches!(
            Pixels::new(2, 2, vec![0; 3]),
            Err(Error::Shape { .. })
        ));
    }

    #[test]
    fn test_coercion_wraps() {
        let pixels = Pixels::from_coerced(1, 4, &[-1i32, 65_536, 70_000, 42]).unwrap();
        assert_eq!(pixels.as_slice(), &[65_535, 0, 4_464, 42]);

        let pixels = Pixels::from_coerced(1, 3, &[1.9f64, -1.0, 65_537.5]).unwrap();
        assert_eq!(pixels.as_slice(), &[1, 65_535, 1]);

        assert!(u16::IS_U16);
        assert!(!i32::IS_U16);
    }

    #[test]
    fn test_get_mut() {
        let mut pixels = Pixels::zeros(2, 2).unwrap();
        *pixels.get_mut(1, 0).unwrap() = 9;
        assert_eq!(pixels.as_slice(), &[0, 0, 9, 0]);
        assert!(pixels.get_mut(0, 2).is_none());
    }

    #[test]
    fn test_zeros_rejects_overflowing_shape() {
        assert!(matches!(
            Pixels::zeros(usize::MAX, 2),
            Err(Error::Shape { nfast: usize::MAX, nslow: 2, .. })
        ));
        let empty = Pixels::zeros(0, usize::MAX).unwrap();
        assert!(empty.as_slice().is_empty());
    }
}
