//! Core geocoding modules

pub mod ellipsoid;
pub mod orbit;
pub mod geocoding;
pub mod unwrapped;

// Re-export main types
pub use orbit::{CubicSpline, OrbitInterpolator};
pub use geocoding::{DerivedGeometry, GeocodingConfig, GeocodingEngine, MapCorners};
pub use unwrapped::{convert_unwrapped, extract_phase, mask_phase, NO_DATA};
