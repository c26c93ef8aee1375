//! File I/O: geodat records and raw binary rasters

pub mod geodat;
pub mod raster;

pub use geodat::{GeodatReader, GeodatWriter};
pub use raster::{read_image, write_image, ByteOrder, RasterElement};
