use crate::core::orbit::OrbitInterpolator;
use crate::types::{
    Corner, Ellipsoid, GeoPoint, LookDirection, PassDirection, RadarCoordinate, SarError, SarResult,
    SceneGeometryRecord,
};
use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Solver configuration for geocoding queries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    /// Newton iteration cap for the zero-Doppler azimuth solve
    pub max_iterations: usize,
    /// Convergence threshold on the azimuth time correction (seconds)
    pub time_tolerance_seconds: f64,
    /// Newton iteration cap for the sensor-to-ground intersection
    pub ground_max_iterations: usize,
    /// Convergence threshold on the ground position correction (meters)
    pub ground_tolerance_meters: f64,
    /// Cap on the outer loop that corrects the surface height of a ground point
    pub height_max_iterations: usize,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            time_tolerance_seconds: 1e-5,
            ground_max_iterations: 20,
            ground_tolerance_meters: 1e-4,
            height_max_iterations: 5,
        }
    }
}

/// Scene geometry derived from a record, computed once per engine
#[derive(Debug, Clone)]
pub struct DerivedGeometry {
    /// Slant range to the center of the first multilook sample (m)
    pub near_range_m: f64,
    /// Slant range to the center of the last multilook sample (m)
    pub far_range_m: f64,
    pub center_range_m: f64,
    /// Slant range to the first single-look sample (m)
    pub near_range_single_look_m: f64,
    /// Time of the first azimuth line, seconds after midnight
    pub t0: f64,
    /// Time of the last azimuth line, seconds after midnight
    pub t1: f64,
    /// Local earth radius at the scene centroid (m)
    pub earth_radius_m: f64,
}

impl DerivedGeometry {
    pub fn build(record: &SceneGeometryRecord) -> Self {
        let image = &record.image;
        let slp_rg = record.pixel_spacing.range;
        let center_range_m = record.center_range_m();
        let half_swath = (image.range_samples as f64 - 1.0) * image.range_looks as f64 * slp_rg * 0.5;

        let near_range_single_look_m = center_range_m
            - ((image.range_samples as f64 - 1.0) / 2.0) * image.range_looks as f64 * slp_rg
            - (image.range_looks as f64 - 1.0) * slp_rg / 2.0;

        let t0 = record.start_seconds;
        let t1 = t0 + (image.azimuth_lines as f64 - 1.0) * image.azimuth_looks as f64 / record.prf;

        Self {
            near_range_m: center_range_m - half_swath,
            far_range_m: center_range_m + half_swath,
            center_range_m,
            near_range_single_look_m,
            t0,
            t1,
            earth_radius_m: record
                .ellipsoid
                .earth_radius_at(record.corner(Corner::Centroid).latitude),
        }
    }

    pub fn mid_time(&self) -> f64 {
        0.5 * (self.t0 + self.t1)
    }
}

/// Map-oriented corner assignment used by the legacy geodat layout.
///
/// Ascending passes put the early/near corner lower left; descending passes
/// flip both axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapCorners {
    pub lower_left: GeoPoint,
    pub lower_right: GeoPoint,
    pub upper_left: GeoPoint,
    pub upper_right: GeoPoint,
    pub center: GeoPoint,
}

impl MapCorners {
    pub fn oriented(corners: &[GeoPoint; 5], pass: PassDirection) -> Self {
        let early_near = corners[Corner::EarlyNear.index()];
        let early_far = corners[Corner::EarlyFar.index()];
        let late_far = corners[Corner::LateFar.index()];
        let late_near = corners[Corner::LateNear.index()];
        let center = corners[Corner::Centroid.index()];

        match pass {
            PassDirection::Ascending => Self {
                lower_left: early_near,
                lower_right: early_far,
                upper_right: late_far,
                upper_left: late_near,
                center,
            },
            PassDirection::Descending => Self {
                upper_right: early_near,
                upper_left: early_far,
                lower_left: late_far,
                lower_right: late_near,
                center,
            },
        }
    }
}

/// Orbit-state-vector geocoder for a single geodat scene.
///
/// The record, derived geometry and orbit splines are all fixed at
/// construction, so an engine can be shared across threads and queried
/// concurrently.
#[derive(Debug, Clone)]
pub struct GeocodingEngine {
    record: SceneGeometryRecord,
    derived: DerivedGeometry,
    orbit: OrbitInterpolator,
    config: GeocodingConfig,
}

impl GeocodingEngine {
    /// Create an engine with the default solver configuration
    pub fn new(record: SceneGeometryRecord) -> SarResult<Self> {
        Self::with_config(record, GeocodingConfig::default())
    }

    pub fn with_config(record: SceneGeometryRecord, config: GeocodingConfig) -> SarResult<Self> {
        record.validate()?;
        let derived = DerivedGeometry::build(&record);
        if !(derived.near_range_m > 0.0
            && derived.far_range_m > derived.near_range_m
            && derived.t1 > derived.t0)
        {
            return Err(SarError::MalformedRecord {
                line: 0,
                reason: format!(
                    "degenerate image geometry: range {}-{} m, t=[{}, {}] s",
                    derived.near_range_m, derived.far_range_m, derived.t0, derived.t1
                ),
            });
        }
        let orbit = OrbitInterpolator::from_state_vectors(&record.state_vectors)?;

        log::info!(
            "Geocoding engine ready: {}x{} pixels, range {:.1}-{:.1} m, t=[{:.4}, {:.4}] s",
            record.image.range_samples,
            record.image.azimuth_lines,
            derived.near_range_m,
            derived.far_range_m,
            derived.t0,
            derived.t1
        );

        Ok(Self { record, derived, orbit, config })
    }

    pub fn record(&self) -> &SceneGeometryRecord {
        &self.record
    }

    pub fn derived(&self) -> &DerivedGeometry {
        &self.derived
    }

    pub fn config(&self) -> &GeocodingConfig {
        &self.config
    }

    pub fn orbit(&self) -> &OrbitInterpolator {
        &self.orbit
    }

    pub fn near_range_m(&self) -> f64 {
        self.derived.near_range_m
    }

    pub fn far_range_m(&self) -> f64 {
        self.derived.far_range_m
    }

    /// Image time window (t0, t1) in seconds after midnight
    pub fn image_window(&self) -> (f64, f64) {
        (self.derived.t0, self.derived.t1)
    }

    /// Interpolated satellite position; `None` outside the state-vector window
    pub fn interp_position(&self, t: f64) -> Option<Vector3<f64>> {
        self.orbit.position(t)
    }

    /// Interpolated satellite velocity; `None` outside the state-vector window
    pub fn interp_velocity(&self, t: f64) -> Option<Vector3<f64>> {
        self.orbit.velocity(t)
    }

    pub fn is_time_in_image(&self, t: f64) -> bool {
        t >= self.derived.t0 && t <= self.derived.t1
    }

    pub fn is_range_in_image(&self, range_m: f64) -> bool {
        range_m >= self.derived.near_range_m && range_m <= self.derived.far_range_m
    }

    /// Local earth radius at the scene centroid
    pub fn earth_radius_m(&self) -> f64 {
        self.derived.earth_radius_m
    }

    pub fn earth_radius_at(&self, latitude_deg: f64) -> f64 {
        self.record.ellipsoid.earth_radius_at(latitude_deg)
    }

    /// Distance from the earth center to the satellite at time `t`
    pub fn satellite_radius(&self, t: f64) -> Option<f64> {
        self.orbit.position(t).map(|p| p.norm())
    }

    /// Solve for the sensor coordinates of a ground point.
    ///
    /// Newton iteration on the zero-Doppler condition `(P - S(t)) . V(t) = 0`,
    /// seeded at mid-scene unless `initial_time` is given.
    pub fn solve_range_azimuth(
        &self,
        point: &GeoPoint,
        initial_time: Option<f64>,
    ) -> SarResult<RadarCoordinate> {
        let target = self.record.ellipsoid.geodetic_to_ecef(point);
        let image = &self.record.image;
        let mut time = initial_time.unwrap_or(
            self.derived.t0 + 0.5 * image.azimuth_lines as f64 * image.azimuth_looks as f64 / self.record.prf,
        );

        let mut last_step = f64::NAN;
        for iteration in 1..=self.config.max_iterations {
            let (sat_pos, sat_vel) = match self.orbit.state(time) {
                Some(state) => state,
                None => {
                    log::warn!(
                        "Zero-Doppler solve left the orbit window at t={:.6} s (iteration {})",
                        time, iteration
                    );
                    return Err(SarError::NonConvergence { iterations: iteration, residual: f64::NAN });
                }
            };

            let line_of_sight = target - sat_pos;
            let doppler = line_of_sight.dot(&sat_vel);
            // Zero-Doppler geometry: no squint term in the derivative
            let c1 = -sat_vel.dot(&sat_vel);
            let step = doppler / c1;
            if !step.is_finite() {
                break;
            }
            time -= step;
            last_step = step;

            if step.abs() < self.config.time_tolerance_seconds {
                let slant_range = line_of_sight.norm();
                let coordinate = RadarCoordinate {
                    range_pixel: (slant_range - self.derived.near_range_single_look_m) / self.record.pixel_spacing.range,
                    azimuth_line: (time - self.derived.t0) * self.record.prf,
                    azimuth_time: time,
                    slant_range,
                    iterations: iteration,
                };
                log::debug!(
                    "Zero-Doppler solve converged in {} iterations (|dt|={:.2e} s): range {:.3}, azimuth {:.3}",
                    iteration, step.abs(), coordinate.range_pixel, coordinate.azimuth_line
                );
                return Ok(coordinate);
            }
        }

        log::warn!(
            "Zero-Doppler solve failed to converge for ({:.6}, {:.6}, {:.1}) after {} iterations",
            point.latitude, point.longitude, point.height, self.config.max_iterations
        );
        Err(SarError::NonConvergence {
            iterations: self.config.max_iterations,
            residual: last_step.abs(),
        })
    }

    /// Geocode many ground points; each result is independent of the others
    pub fn geocode_points(&self, points: &[GeoPoint]) -> Vec<SarResult<RadarCoordinate>> {
        #[cfg(feature = "parallel")]
        let results: Vec<_> = points
            .par_iter()
            .map(|point| self.solve_range_azimuth(point, None))
            .collect();

        #[cfg(not(feature = "parallel"))]
        let results: Vec<_> = points
            .iter()
            .map(|point| self.solve_range_azimuth(point, None))
            .collect();

        let failures = results.iter().filter(|r| r.is_err()).count();
        log::info!("Geocoded {} points ({} failed)", points.len(), failures);
        results
    }

    /// Solve for the ground point seen at a sensor coordinate.
    ///
    /// `range_pixel` and `azimuth_line` use the same single-look convention as
    /// [`RadarCoordinate`]. The point is found on the look side of the track,
    /// at `height` meters above the ellipsoid.
    pub fn solve_ground_point(
        &self,
        range_pixel: f64,
        azimuth_line: f64,
        height: f64,
    ) -> SarResult<GeoPoint> {
        let time = self.derived.t0 + azimuth_line / self.record.prf;
        let slant_range = self.derived.near_range_single_look_m + range_pixel * self.record.pixel_spacing.range;
        self.ground_point_at(time, slant_range, height)
    }

    /// Ground point at an absolute azimuth time and slant range
    pub fn ground_point_at(&self, time: f64, slant_range: f64, height: f64) -> SarResult<GeoPoint> {
        let look = self.record.look()?;
        let (sat_pos, sat_vel) = self.orbit.state(time).ok_or_else(|| {
            log::warn!("Ground solve requested outside the orbit window at t={:.6} s", time);
            SarError::NonConvergence { iterations: 0, residual: f64::NAN }
        })?;

        let ellipsoid = self.record.ellipsoid;
        let mut surface_height = height;
        let mut point = GeoPoint::new(f64::NAN, f64::NAN, f64::NAN);
        let mut error = f64::INFINITY;
        for _ in 0..self.config.height_max_iterations {
            let ecef = self.intersect_range_doppler(
                &sat_pos,
                &sat_vel,
                slant_range,
                &ellipsoid.inflated(surface_height),
                look,
            )?;
            point = ellipsoid.ecef_to_geodetic(&ecef);
            error = height - point.height;
            if error.abs() < self.config.ground_tolerance_meters {
                break;
            }
            surface_height += error;
        }
        if !(error.abs() < self.config.ground_tolerance_meters) {
            log::warn!(
                "Height correction did not converge at t={:.6} s: residual {:.3e} m after {} iterations",
                time, error, self.config.height_max_iterations
            );
            return Err(SarError::NonConvergence {
                iterations: self.config.height_max_iterations,
                residual: error.abs(),
            });
        }

        log::debug!(
            "Ground point at t={:.6} s, R={:.3} m: ({:.6}, {:.6}, {:.2})",
            time, slant_range, point.latitude, point.longitude, point.height
        );
        Ok(point)
    }

    /// Intersect the range sphere, zero-Doppler plane and a surface ellipsoid
    fn intersect_range_doppler(
        &self,
        sat_pos: &Vector3<f64>,
        sat_vel: &Vector3<f64>,
        slant_range: f64,
        surface: &Ellipsoid,
        look: LookDirection,
    ) -> SarResult<Vector3<f64>> {
        let sat_radius = sat_pos.norm();
        let up = sat_pos / sat_radius;
        let local_radius = surface.radius_along(sat_pos);

        // Seed from the spherical law of cosines on the look side of the track
        let cos_look = ((sat_radius * sat_radius + slant_range * slant_range - local_radius * local_radius)
            / (2.0 * sat_radius * slant_range))
            .clamp(-1.0, 1.0);
        let right = sat_vel.cross(sat_pos).normalize();
        let side = match look {
            LookDirection::Right => right,
            LookDirection::Left => -right,
        };
        let mut x = sat_pos + slant_range * (-cos_look * up + (1.0 - cos_look * cos_look).sqrt() * side);

        let a2 = surface.semi_major * surface.semi_major;
        let b2 = surface.semi_minor * surface.semi_minor;
        let mut correction = f64::NAN;
        for iteration in 1..=self.config.ground_max_iterations {
            let d = x - sat_pos;
            let residual = Vector3::new(
                (d.dot(&d) - slant_range * slant_range) / (2.0 * slant_range),
                d.dot(sat_vel) / sat_vel.norm(),
                (x.x * x.x + x.y * x.y) / a2 + x.z * x.z / b2 - 1.0,
            );
            let jacobian = Matrix3::new(
                d.x / slant_range, d.y / slant_range, d.z / slant_range,
                sat_vel.x / sat_vel.norm(), sat_vel.y / sat_vel.norm(), sat_vel.z / sat_vel.norm(),
                2.0 * x.x / a2, 2.0 * x.y / a2, 2.0 * x.z / b2,
            );

            let delta = jacobian.lu().solve(&(-residual)).ok_or_else(|| {
                SarError::Processing("Singular range-Doppler Jacobian".to_string())
            })?;
            x += delta;
            correction = delta.norm();
            if correction < self.config.ground_tolerance_meters {
                log::debug!("Range-Doppler intersection converged in {} iterations", iteration);
                return Ok(x);
            }
        }

        Err(SarError::NonConvergence {
            iterations: self.config.ground_max_iterations,
            residual: correction,
        })
    }

    /// Ground coordinates of the five scene corners, in record order
    pub fn scene_corners(&self, height: f64) -> SarResult<[GeoPoint; 5]> {
        let d = &self.derived;
        Ok([
            self.ground_point_at(d.t0, d.near_range_m, height)?,
            self.ground_point_at(d.t0, d.far_range_m, height)?,
            self.ground_point_at(d.t1, d.far_range_m, height)?,
            self.ground_point_at(d.t1, d.near_range_m, height)?,
            self.ground_point_at(d.mid_time(), d.center_range_m, height)?,
        ])
    }

    /// Look angle at the satellite (radians) for a target at height `z`.
    ///
    /// Uses the interpolated satellite radius at `time` and the scene-center
    /// earth radius. `None` when `time` or `range_m` is outside the image.
    pub fn look_angle_at(&self, time: f64, range_m: f64, z: f64) -> Option<f64> {
        if !self.is_time_in_image(time) || !self.is_range_in_image(range_m) {
            log::debug!("Look angle requested outside image: t={:.4} s, R={:.1} m", time, range_m);
            return None;
        }
        let sat_radius = self.satellite_radius(time)?;
        let target_radius = self.derived.earth_radius_m + z;
        let cos_look = (range_m * range_m + sat_radius * sat_radius - target_radius * target_radius)
            / (2.0 * sat_radius * range_m);
        Some(cos_look.clamp(-1.0, 1.0).acos())
    }

    /// Incidence angle in degrees at the target for a time and slant range
    pub fn incidence_angle_at(&self, time: f64, range_m: f64, z: f64) -> Option<f64> {
        let look = self.look_angle_at(time, range_m, z)?;
        let sat_radius = self.satellite_radius(time)?;
        Some(incidence_from_look(look, sat_radius, self.derived.earth_radius_m + z))
    }

    /// Nominal look angle (radians) from header range and altitude
    pub fn nominal_look_angle(&self) -> f64 {
        let altitude = self.record.satellite_altitude_m();
        let range = self.derived.center_range_m;
        let re = self.derived.earth_radius_m;
        let cos_look = (range * range + 2.0 * altitude * re + altitude * altitude)
            / (2.0 * range * (re + altitude));
        cos_look.clamp(-1.0, 1.0).acos()
    }

    /// Nominal center incidence angle in degrees
    pub fn nominal_incidence_angle(&self) -> f64 {
        let re = self.derived.earth_radius_m;
        incidence_from_look(self.nominal_look_angle(), re + self.record.satellite_altitude_m(), re)
    }

    /// Center look angle (radians) using the true satellite radius at mid-scene
    pub fn actual_look_angle(&self) -> Option<f64> {
        self.look_angle_at(self.derived.mid_time(), self.derived.center_range_m, 0.0)
    }

    /// Center incidence angle in degrees using the true satellite radius at mid-scene
    pub fn actual_incidence_angle(&self) -> Option<f64> {
        self.incidence_angle_at(self.derived.mid_time(), self.derived.center_range_m, 0.0)
    }

    /// Tabulated state vectors: time, position and velocity per line
    pub fn state_table(&self) -> String {
        let mut table = format!(
            "{} {} {}\n",
            self.record.state_vector_start,
            self.record.state_vector_interval,
            self.record.state_vector_count()
        );
        for sv in &self.record.state_vectors {
            table.push_str(&format!(
                "{:10.4} {:8.1} {:8.1} {:8.1} {:8.1} {:8.1} {:8.1}\n",
                sv.time,
                sv.position[0], sv.position[1], sv.position[2],
                sv.velocity[0], sv.velocity[1], sv.velocity[2]
            ));
        }
        table
    }
}

/// Convert a look angle to incidence via the law of sines
fn incidence_from_look(look_rad: f64, sat_radius: f64, target_radius: f64) -> f64 {
    (sat_radius / target_radius * look_rad.sin())
        .clamp(-1.0, 1.0)
        .asin()
        .to_degrees()
}
