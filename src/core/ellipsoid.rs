use crate::types::{Ellipsoid, GeoPoint, SarError, SarResult};
use nalgebra::Vector3;

impl Ellipsoid {
    /// WGS84 reference ellipsoid
    pub const WGS84: Ellipsoid = Ellipsoid {
        semi_major: 6_378_137.0,
        semi_minor: 6_356_752.314_245,
    };

    /// Create an ellipsoid from axes in meters
    pub fn new(semi_major: f64, semi_minor: f64) -> SarResult<Self> {
        if !(semi_major > semi_minor && semi_minor > 0.0) {
            return Err(SarError::Processing(format!(
                "Invalid ellipsoid axes: major={} minor={}",
                semi_major, semi_minor
            )));
        }
        Ok(Self { semi_major, semi_minor })
    }

    /// First eccentricity squared
    pub fn eccentricity_squared(&self) -> f64 {
        1.0 - (self.semi_minor / self.semi_major).powi(2)
    }

    /// Prime-vertical radius of curvature N at a geodetic latitude (radians)
    pub fn prime_vertical_radius(&self, latitude_rad: f64) -> f64 {
        let (a, b) = (self.semi_major, self.semi_minor);
        a * a / ((a * latitude_rad.cos()).powi(2) + (b * latitude_rad.sin()).powi(2)).sqrt()
    }

    /// Distance from the earth center to the ellipsoid surface at a geodetic
    /// latitude in degrees.
    ///
    /// The surface point is built from N and projected onto the meridian
    /// plane, so the result is `a` at the equator and `b` at the poles.
    pub fn earth_radius_at(&self, latitude_deg: f64) -> f64 {
        let lat = latitude_deg.to_radians();
        let n = self.prime_vertical_radius(lat);
        let x = n * lat.cos();
        let z = (self.semi_minor / self.semi_major).powi(2) * n * lat.sin();
        (x * x + z * z).sqrt()
    }

    /// Ellipsoid radius along the direction of an ECEF vector
    pub fn radius_along(&self, direction: &Vector3<f64>) -> f64 {
        let unit = direction.normalize();
        let (a, b) = (self.semi_major, self.semi_minor);
        1.0 / ((unit.x * unit.x + unit.y * unit.y) / (a * a) + unit.z * unit.z / (b * b)).sqrt()
    }

    /// Ellipsoid with both axes grown by `height` meters
    pub fn inflated(&self, height: f64) -> Ellipsoid {
        Ellipsoid {
            semi_major: self.semi_major + height,
            semi_minor: self.semi_minor + height,
        }
    }

    /// Convert a geodetic point to ECEF meters
    pub fn geodetic_to_ecef(&self, point: &GeoPoint) -> Vector3<f64> {
        let lat = point.latitude.to_radians();
        let lon = point.longitude.to_radians();
        let e2 = self.eccentricity_squared();
        let n = self.semi_major / (1.0 - e2 * lat.sin().powi(2)).sqrt();

        Vector3::new(
            (n + point.height) * lat.cos() * lon.cos(),
            (n + point.height) * lat.cos() * lon.sin(),
            (n * (1.0 - e2) + point.height) * lat.sin(),
        )
    }

    /// Convert ECEF meters to a geodetic point by fixed-point iteration on latitude
    pub fn ecef_to_geodetic(&self, ecef: &Vector3<f64>) -> GeoPoint {
        let a = self.semi_major;
        let e2 = self.eccentricity_squared();
        let p = ecef.x.hypot(ecef.y);
        let longitude = ecef.y.atan2(ecef.x);

        let mut lat = ecef.z.atan2(p * (1.0 - e2));
        let mut height = 0.0;
        for _ in 0..20 {
            let sin_lat = lat.sin();
            let n = a / (1.0 - e2 * sin_lat * sin_lat).sqrt();
            height = if lat.cos().abs() > 1e-10 {
                p / lat.cos() - n
            } else {
                ecef.z.abs() - n * (1.0 - e2)
            };
            let next = ecef.z.atan2(p * (1.0 - e2 * n / (n + height)));
            let delta = (next - lat).abs();
            lat = next;
            if delta < 1e-14 {
                break;
            }
        }

        GeoPoint::new(lat.to_degrees(), longitude.to_degrees(), height)
    }
}
