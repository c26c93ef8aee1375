//! Synthetic scenes shared by the integration tests.
//!
//! The orbit is a circle in the x-z plane with no earth rotation, so the
//! zero-Doppler time of any target is where the orbit angle equals the
//! target's `atan2(z, x)`, and the slant range follows directly.
#![allow(dead_code)]

use chrono::NaiveDate;
use geodat::types::{
    CenterGeometry, Ellipsoid, GeoPoint, ImageSize, LookDirection, PassDirection, PixelSpacing,
    SceneGeometryRecord, StateVector,
};

pub const ORBIT_RADIUS: f64 = 7_078_000.0;
pub const ORBIT_SPEED: f64 = 7_500.0;

/// Time at which the satellite is over the reference target
pub const T_STAR: f64 = 3650.0;
/// First azimuth line of the synthetic record
pub const T0: f64 = 3648.0;
pub const SV_START: f64 = 3600.0;
pub const SV_INTERVAL: f64 = 10.0;
pub const SV_COUNT: usize = 12;

pub const PRF: f64 = 1717.13;
pub const RANGE_SPACING: f64 = 2.33;
pub const AZIMUTH_SPACING: f64 = 13.89;

pub fn ellipsoid() -> Ellipsoid {
    Ellipsoid { semi_major: 6_378_137.0, semi_minor: 6_356_752.0 }
}

/// Target directly under the satellite at `T_STAR`
pub fn nadir_target() -> GeoPoint {
    GeoPoint::surface(70.0, 0.0)
}

/// Target on the right-hand side of the track, inside the synthetic swath
pub fn right_target() -> GeoPoint {
    GeoPoint::surface(70.0, 4.0)
}

/// Circular polar orbit passing over `nadir_target()` at `T_STAR`
#[derive(Debug, Clone, Copy)]
pub struct CircularOrbit {
    pub radius: f64,
    pub omega: f64,
    pub theta_star: f64,
}

impl CircularOrbit {
    pub fn new() -> Self {
        let p = ellipsoid().geodetic_to_ecef(&nadir_target());
        Self {
            radius: ORBIT_RADIUS,
            omega: ORBIT_SPEED / ORBIT_RADIUS,
            theta_star: p.z.atan2(p.x),
        }
    }

    pub fn angle(&self, t: f64) -> f64 {
        self.theta_star + self.omega * (t - T_STAR)
    }

    pub fn position(&self, t: f64) -> [f64; 3] {
        let theta = self.angle(t);
        [self.radius * theta.cos(), 0.0, self.radius * theta.sin()]
    }

    pub fn velocity(&self, t: f64) -> [f64; 3] {
        let theta = self.angle(t);
        let speed = self.radius * self.omega;
        [-speed * theta.sin(), 0.0, speed * theta.cos()]
    }

    /// Exact zero-Doppler time of a target
    pub fn zero_doppler_time(&self, target: &GeoPoint) -> f64 {
        let p = ellipsoid().geodetic_to_ecef(target);
        T_STAR + (p.z.atan2(p.x) - self.theta_star) / self.omega
    }

    /// Exact slant range from the satellite at `t` to a target
    pub fn slant_range(&self, t: f64, target: &GeoPoint) -> f64 {
        let p = ellipsoid().geodetic_to_ecef(target);
        let s = self.position(t);
        ((p.x - s[0]).powi(2) + (p.y - s[1]).powi(2) + (p.z - s[2]).powi(2)).sqrt()
    }

    pub fn state_vectors(&self, start: f64, count: usize) -> Vec<StateVector> {
        (0..count)
            .map(|i| {
                let time = start + i as f64 * SV_INTERVAL;
                StateVector { time, position: self.position(time), velocity: self.velocity(time) }
            })
            .collect()
    }
}

/// Record flying the circular orbit; t0 is 2 s before the pass over the nadir target
pub fn synthetic_record() -> SceneGeometryRecord {
    let orbit = CircularOrbit::new();
    let image_date = NaiveDate::from_ymd_opt(2018, 11, 15).unwrap();
    let start_time = image_date.and_hms_opt(1, 0, 48).unwrap();

    SceneGeometryRecord {
        image_name: Some("synthetic".to_string()),
        image: ImageSize { range_samples: 1000, azimuth_lines: 2000, range_looks: 2, azimuth_looks: 4 },
        ellipsoid: ellipsoid(),
        center: CenterGeometry {
            slant_range_km: 737.0,
            incidence_deg: 13.5,
            altitude_km: 718.0,
            range_skew_seconds: None,
        },
        corners: [
            GeoPoint::surface(69.98, 3.9),
            GeoPoint::surface(69.98, 4.1),
            GeoPoint::surface(70.02, 4.1),
            GeoPoint::surface(70.02, 3.9),
            GeoPoint::surface(70.0, 4.0),
        ],
        pixel_spacing: PixelSpacing { range: RANGE_SPACING, azimuth: AZIMUTH_SPACING },
        pass_direction: Some(PassDirection::Ascending),
        look_direction: Some(LookDirection::Right),
        skew: None,
        image_date,
        start_time,
        start_seconds: T0,
        prf: PRF,
        wavelength: 0.055465,
        state_vector_start: SV_START,
        state_vector_interval: SV_INTERVAL,
        state_vectors: orbit.state_vectors(SV_START, SV_COUNT),
        delta_t: None,
    }
}

/// Seconds after midnight of the scenario start time (10:15:32.123456)
pub const SCENARIO_T0: f64 = 36_932.123456;
pub const SCENARIO_SV_START: f64 = 36_920.0;

/// Geodat text for the reference scenario with a chosen image size.
///
/// State vectors sample the circular orbit shifted so that they bracket the
/// scenario start time.
pub fn geodat_text(nr: usize, na: usize) -> String {
    let orbit = CircularOrbit::new();
    let shift = SV_START - SCENARIO_SV_START;
    let mut vectors = String::new();
    for i in 0..4 {
        let t = SCENARIO_SV_START + i as f64 * SV_INTERVAL;
        let p = orbit.position(t + shift);
        let v = orbit.velocity(t + shift);
        vectors.push_str(&format!("{} {} {}\n{} {} {}\n", p[0], p[1], p[2], v[0], v[1], v[2]));
    }

    format!(
        "; Image name: S1B_IW_SLC__1SDV_20181115T101532\n\
         ; Image date: 15 NOV 2018\n\
         ; Image time: 10 15 32.123456\n\
         ; Skew offset (s), squint (deg) : 0.000000  0.000000\n\
         ;\n\
         ; rangesize,azimuthsize,nrangelooks,nazimuthlooks\n\
         ;\n\
         {nr}  {na}  2  4\n\
         ;\n\
         ; ReMajor, ReMinor, Rc, phic, h\n\
         ;\n\
         6378137.0    6356752.0   850.0  35.0   700.0\n\
         ;\n\
         69.1 -50.2\n\
         69.3 -49.1\n\
         70.1 -49.5\n\
         69.9 -50.6\n\
         69.6 -49.85\n\
         ;\n\
         ; Range/azimuth single look pixel sizes\n\
         ;\n\
         2.33  13.89\n\
         ;\n\
         ascending\n\
         ;\n\
         ; Look direction\n\
         ;\n\
         right\n\
         ;\n\
         state\n\
         ; time after squint and skew corrections\n\
         10 15 32.123456\n\
         ; prf\n\
         1717.13\n\
         ; wavelength\n\
         0.055465\n\
         ; number of state vectors\n\
         4\n\
         ; time of first vector\n\
         36920.0\n\
         ; state vector interval\n\
         10.0\n\
         ; state vectors\n\
         {vectors}"
    )
}

/// Reference scenario text
pub fn scenario_text() -> String {
    geodat_text(1000, 2000)
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
