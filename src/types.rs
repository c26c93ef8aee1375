use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Geodetic point (degrees, degrees, meters above the ellipsoid)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub height: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64, height: f64) -> Self {
        Self { latitude, longitude, height }
    }

    /// Point on the ellipsoid surface
    pub fn surface(latitude: f64, longitude: f64) -> Self {
        Self::new(latitude, longitude, 0.0)
    }
}

/// Orbit pass direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PassDirection {
    Ascending,
    Descending,
}

impl PassDirection {
    /// Match a geodat keyword, ignoring case
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.to_ascii_lowercase().as_str() {
            "ascending" => Some(PassDirection::Ascending),
            "descending" => Some(PassDirection::Descending),
            _ => None,
        }
    }
}

impl std::fmt::Display for PassDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PassDirection::Ascending => write!(f, "ascending"),
            PassDirection::Descending => write!(f, "descending"),
        }
    }
}

/// Radar look direction relative to the flight track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LookDirection {
    Left,
    Right,
}

impl LookDirection {
    /// Match a geodat keyword, ignoring case
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.to_ascii_lowercase().as_str() {
            "left" => Some(LookDirection::Left),
            "right" => Some(LookDirection::Right),
            _ => None,
        }
    }
}

impl std::fmt::Display for LookDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LookDirection::Left => write!(f, "left"),
            LookDirection::Right => write!(f, "right"),
        }
    }
}

/// Image dimensions in multilook pixels plus the look factors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    pub range_samples: usize,
    pub azimuth_lines: usize,
    pub range_looks: usize,
    pub azimuth_looks: usize,
}

/// Reference ellipsoid axes in meters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ellipsoid {
    pub semi_major: f64,
    pub semi_minor: f64,
}

/// Scene-center geometry as carried in the legacy header
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CenterGeometry {
    pub slant_range_km: f64,
    pub incidence_deg: f64,
    pub altitude_km: f64,
    pub range_skew_seconds: Option<f64>,
}

/// Single-look pixel spacing in meters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelSpacing {
    pub range: f64,
    pub azimuth: f64,
}

/// Skew offset and squint from the `Skew` header comment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkewSquint {
    pub skew_seconds: f64,
    pub squint_deg: f64,
}

/// Scene corners, in the fixed order they appear in a geodat record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    EarlyNear = 0,
    EarlyFar = 1,
    LateFar = 2,
    LateNear = 3,
    Centroid = 4,
}

impl Corner {
    pub const ALL: [Corner; 5] = [
        Corner::EarlyNear,
        Corner::EarlyFar,
        Corner::LateFar,
        Corner::LateNear,
        Corner::Centroid,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Orbit state vector in ECEF; `time` is seconds after the image-date midnight
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StateVector {
    pub time: f64,
    pub position: [f64; 3],  // [x, y, z] in meters
    pub velocity: [f64; 3],  // [vx, vy, vz] in m/s
}

/// Parsed geodat record describing one multilooked SAR scene.
///
/// A record is never modified after parsing. Everything derived from it
/// (near/far range, image time window, orbit interpolants) lives in
/// [`crate::core::geocoding::DerivedGeometry`], which is built once per engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneGeometryRecord {
    pub image_name: Option<String>,
    pub image: ImageSize,
    pub ellipsoid: Ellipsoid,
    pub center: CenterGeometry,
    pub corners: [GeoPoint; 5],
    pub pixel_spacing: PixelSpacing,
    pub pass_direction: Option<PassDirection>,
    pub look_direction: Option<LookDirection>,
    pub skew: Option<SkewSquint>,
    /// Midnight reference for every time in the record
    pub image_date: NaiveDate,
    /// Absolute time of the first azimuth line
    pub start_time: NaiveDateTime,
    /// `start_time` as seconds after `image_date` midnight (t0)
    pub start_seconds: f64,
    pub prf: f64,
    pub wavelength: f64,
    pub state_vector_start: f64,
    pub state_vector_interval: f64,
    pub state_vectors: Vec<StateVector>,
    pub delta_t: Option<f64>,
}

impl SceneGeometryRecord {
    pub fn state_vector_count(&self) -> usize {
        self.state_vectors.len()
    }

    pub fn corner(&self, corner: Corner) -> GeoPoint {
        self.corners[corner.index()]
    }

    /// Single-look image size (range, azimuth)
    pub fn single_look_size(&self) -> (usize, usize) {
        (
            self.image.range_samples * self.image.range_looks,
            self.image.azimuth_lines * self.image.azimuth_looks,
        )
    }

    /// Single-look resolution (range, azimuth) in meters
    pub fn single_look_resolution(&self) -> (f64, f64) {
        (self.pixel_spacing.range, self.pixel_spacing.azimuth)
    }

    pub fn center_range_m(&self) -> f64 {
        self.center.slant_range_km * 1000.0
    }

    pub fn satellite_altitude_m(&self) -> f64 {
        self.center.altitude_km * 1000.0
    }

    pub fn is_descending(&self) -> SarResult<bool> {
        Ok(self.pass()? == PassDirection::Descending)
    }

    pub fn is_ascending(&self) -> SarResult<bool> {
        Ok(self.pass()? == PassDirection::Ascending)
    }

    pub fn is_right_looking(&self) -> SarResult<bool> {
        Ok(self.look()? == LookDirection::Right)
    }

    /// Southern-hemisphere scene, judged by the first corner
    pub fn is_south(&self) -> bool {
        self.corners[Corner::EarlyNear.index()].latitude < 0.0
    }

    pub fn pass(&self) -> SarResult<PassDirection> {
        self.pass_direction.ok_or_else(|| {
            SarError::GeometryConfiguration("record has no pass direction".to_string())
        })
    }

    pub fn look(&self) -> SarResult<LookDirection> {
        self.look_direction.ok_or_else(|| {
            SarError::GeometryConfiguration("record has no look direction".to_string())
        })
    }

    /// Check the structural invariants a parsed record always satisfies.
    ///
    /// Records built by hand go through this before an engine accepts them.
    pub fn validate(&self) -> SarResult<()> {
        let invalid = |reason: String| Err(SarError::MalformedRecord { line: 0, reason });

        let image = &self.image;
        if image.range_samples == 0 || image.azimuth_lines == 0
            || image.range_looks == 0 || image.azimuth_looks == 0
        {
            return invalid(format!("image size must be positive: {:?}", image));
        }
        if image.range_samples < 2 || image.azimuth_lines < 2 {
            return invalid(format!(
                "image needs at least 2 range samples and 2 azimuth lines: {:?}",
                image
            ));
        }
        if !(self.ellipsoid.semi_major > self.ellipsoid.semi_minor && self.ellipsoid.semi_minor > 0.0) {
            return invalid(format!(
                "ellipsoid axes must satisfy major > minor > 0: {:?}",
                self.ellipsoid
            ));
        }
        if !(self.pixel_spacing.range > 0.0 && self.pixel_spacing.azimuth > 0.0) {
            return invalid(format!("pixel spacing must be positive: {:?}", self.pixel_spacing));
        }
        if !(self.prf > 0.0) {
            return invalid(format!("PRF must be positive: {}", self.prf));
        }
        if !(self.wavelength > 0.0) {
            return invalid(format!("wavelength must be positive: {}", self.wavelength));
        }
        if !(self.state_vector_interval > 0.0) {
            return invalid(format!(
                "state vector interval must be positive: {}",
                self.state_vector_interval
            ));
        }
        if self.state_vectors.len() < 2 {
            return invalid(format!(
                "at least 2 state vectors are required, found {}",
                self.state_vectors.len()
            ));
        }
        for (i, sv) in self.state_vectors.iter().enumerate() {
            let expected = self.state_vector_start + i as f64 * self.state_vector_interval;
            if (sv.time - expected).abs() > 1e-6 * self.state_vector_interval.max(1.0) {
                return invalid(format!(
                    "state vector {} at t={} is off the uniform grid (expected {})",
                    i, sv.time, expected
                ));
            }
        }
        Ok(())
    }
}

/// Sensor coordinates of a ground point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadarCoordinate {
    /// Single-look range sample measured from the first single-look sample
    pub range_pixel: f64,
    /// Single-look azimuth line measured from t0
    pub azimuth_line: f64,
    /// Zero-Doppler time, seconds after midnight
    pub azimuth_time: f64,
    /// Slant range in meters
    pub slant_range: f64,
    pub iterations: usize,
}

/// Error types for geodat parsing and geocoding
#[derive(Debug, thiserror::Error)]
pub enum SarError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Geodat record not found: {}", .0.display())]
    RecordNotFound(PathBuf),

    #[error("Malformed geodat record (line {line}): {reason}")]
    MalformedRecord { line: usize, reason: String },

    #[error("Geometry configuration error: {0}")]
    GeometryConfiguration(String),

    /// `residual` is the last Newton correction (seconds for the azimuth
    /// solve, meters for the ground solve); NaN when the orbit window was left.
    #[error("Solver did not converge after {iterations} iterations (last correction {residual:e})")]
    NonConvergence { iterations: usize, residual: f64 },

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("Processing error: {0}")]
    Processing(String),
}

/// Result type for geodat operations
pub type SarResult<T> = Result<T, SarError>;
