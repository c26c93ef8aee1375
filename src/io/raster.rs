//! Headerless binary rasters stored row-major with a fixed element type.

use crate::types::{SarError, SarResult};
use ndarray::Array2;
use std::fs;
use std::path::Path;

/// Byte order of raster samples on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Little,
    Big,
    Native,
}

/// Fixed-size sample type that can be decoded from and encoded to raw bytes
pub trait RasterElement: Copy + Send + Sync + 'static {
    const SIZE: usize;

    fn decode(bytes: &[u8], order: ByteOrder) -> Self;

    fn encode(self, order: ByteOrder, out: &mut Vec<u8>);
}

macro_rules! impl_raster_element {
    ($($t:ty),* $(,)?) => {
        $(
            impl RasterElement for $t {
                const SIZE: usize = std::mem::size_of::<$t>();

                fn decode(bytes: &[u8], order: ByteOrder) -> Self {
                    let mut raw = [0u8; std::mem::size_of::<$t>()];
                    raw.copy_from_slice(&bytes[..Self::SIZE]);
                    match order {
                        ByteOrder::Little => <$t>::from_le_bytes(raw),
                        ByteOrder::Big => <$t>::from_be_bytes(raw),
                        ByteOrder::Native => <$t>::from_ne_bytes(raw),
                    }
                }

                fn encode(self, order: ByteOrder, out: &mut Vec<u8>) {
                    let raw = match order {
                        ByteOrder::Little => self.to_le_bytes(),
                        ByteOrder::Big => self.to_be_bytes(),
                        ByteOrder::Native => self.to_ne_bytes(),
                    };
                    out.extend_from_slice(&raw);
                }
            }
        )*
    };
}

impl_raster_element!(u8, i16, u16, i32, u32, f32, f64);

/// Read a `height x width` raster; the file size must match exactly
pub fn read_image<T: RasterElement, P: AsRef<Path>>(
    path: P,
    width: usize,
    height: usize,
    order: ByteOrder,
) -> SarResult<Array2<T>> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    let expected = width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(T::SIZE))
        .ok_or_else(|| {
            SarError::InvalidFormat(format!(
                "{}: raster of {}x{} samples of {} bytes overflows the address space",
                path.display(),
                width,
                height,
                T::SIZE
            ))
        })?;
    if bytes.len() != expected {
        return Err(SarError::InvalidFormat(format!(
            "{}: expected {} bytes for {}x{} samples of {} bytes, found {}",
            path.display(),
            expected,
            width,
            height,
            T::SIZE,
            bytes.len()
        )));
    }

    let samples: Vec<T> = bytes.chunks_exact(T::SIZE).map(|chunk| T::decode(chunk, order)).collect();
    log::debug!("Read {}x{} raster from {}", width, height, path.display());

    Array2::from_shape_vec((height, width), samples)
        .map_err(|e| SarError::InvalidFormat(format!("Failed to shape raster: {}", e)))
}

/// Write a raster row-major with the given byte order
pub fn write_image<T: RasterElement, P: AsRef<Path>>(
    path: P,
    image: &Array2<T>,
    order: ByteOrder,
) -> SarResult<()> {
    let path = path.as_ref();
    let mut bytes = Vec::with_capacity(image.len() * T::SIZE);
    // iter() walks in logical row-major order regardless of memory layout
    for &sample in image.iter() {
        sample.encode(order, &mut bytes);
    }
    fs::write(path, bytes)?;
    log::debug!("Wrote {}x{} raster to {}", image.ncols(), image.nrows(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use tempfile::TempDir;

    #[test]
    fn test_oversized_shape_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tiny.f8");
        fs::write(&path, [0u8; 16]).unwrap();

        match read_image::<f64, _>(&path, usize::MAX, 2, ByteOrder::Native) {
            Err(SarError::InvalidFormat(msg)) => assert!(msg.contains("overflows"), "{}", msg),
            other => panic!("expected InvalidFormat, got {:?}", other),
        }
    }

    #[test]
    fn test_big_endian_layout_on_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("be.f4");
        write_image(&path, &array![[1.0f32, -2.0]], ByteOrder::Big).unwrap();

        let bytes = fs::read(&path).unwrap();
        assert_eq!(&bytes[..4], &1.0f32.to_be_bytes());
        assert_eq!(&bytes[4..], &(-2.0f32).to_be_bytes());

        let back: Array2<f32> = read_image(&path, 2, 1, ByteOrder::Big).unwrap();
        assert_eq!(back, array![[1.0f32, -2.0]]);
    }

    #[test]
    fn test_read_shape_is_height_by_width() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mask.u1");
        fs::write(&path, [0u8, 1, 2, 3, 4, 5]).unwrap();

        let mask: Array2<u8> = read_image(&path, 3, 2, ByteOrder::Native).unwrap();
        assert_eq!(mask.dim(), (2, 3));
        assert_eq!(mask[[1, 0]], 3);
    }

    #[test]
    fn test_size_mismatch_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("short.i2");
        fs::write(&path, [0u8; 6]).unwrap();

        let result = read_image::<i16, _>(&path, 2, 2, ByteOrder::Little);
        assert!(matches!(result, Err(SarError::InvalidFormat(_))));
    }
}
