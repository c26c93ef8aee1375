//! Time interpolation of orbit state vectors.
//!
//! Each of the six state components (x, y, z, vx, vy, vz) gets its own cubic
//! spline over the state-vector time grid. Splines use not-a-knot end
//! conditions and are undefined outside the grid: queries there return
//! `None` instead of extrapolating.

use crate::types::{SarError, SarResult, StateVector};
use nalgebra::{DMatrix, DVector, Vector3};

/// Interpolating cubic spline with not-a-knot end conditions
#[derive(Debug, Clone)]
pub struct CubicSpline {
    knots: Vec<f64>,
    values: Vec<f64>,
    /// Second derivative at each knot
    curvature: Vec<f64>,
}

impl CubicSpline {
    /// Fit a spline through `(knots[i], values[i])`.
    ///
    /// Knots must be strictly increasing. Two knots give a straight line and
    /// three a parabola; four or more give a true not-a-knot cubic.
    pub fn new(knots: &[f64], values: &[f64]) -> SarResult<Self> {
        let n = knots.len();
        if n < 2 {
            return Err(SarError::Processing(format!(
                "Spline needs at least 2 knots, got {}", n
            )));
        }
        if values.len() != n {
            return Err(SarError::Processing(format!(
                "Spline knot/value length mismatch: {} vs {}", n, values.len()
            )));
        }
        if knots.windows(2).any(|w| !(w[1] > w[0])) {
            return Err(SarError::Processing(
                "Spline knots must be strictly increasing".to_string(),
            ));
        }

        let curvature = if n == 2 {
            vec![0.0; 2]
        } else {
            Self::solve_curvature(knots, values)?
        };

        Ok(Self {
            knots: knots.to_vec(),
            values: values.to_vec(),
            curvature,
        })
    }

    fn solve_curvature(knots: &[f64], values: &[f64]) -> SarResult<Vec<f64>> {
        let n = knots.len();
        let h: Vec<f64> = knots.windows(2).map(|w| w[1] - w[0]).collect();
        let mut system = DMatrix::<f64>::zeros(n, n);
        let mut rhs = DVector::<f64>::zeros(n);

        // Continuity of the first derivative at interior knots
        for i in 1..n - 1 {
            system[(i, i - 1)] = h[i - 1];
            system[(i, i)] = 2.0 * (h[i - 1] + h[i]);
            system[(i, i + 1)] = h[i];
            rhs[i] = 6.0 * ((values[i + 1] - values[i]) / h[i] - (values[i] - values[i - 1]) / h[i - 1]);
        }

        if n == 3 {
            // Not-a-knot on three points collapses to a single parabola
            system[(0, 0)] = 1.0;
            system[(0, 1)] = -1.0;
            system[(2, 1)] = 1.0;
            system[(2, 2)] = -1.0;
        } else {
            // Third derivative continuous across the second and second-to-last knots
            system[(0, 0)] = -h[1];
            system[(0, 1)] = h[0] + h[1];
            system[(0, 2)] = -h[0];
            system[(n - 1, n - 3)] = -h[n - 2];
            system[(n - 1, n - 2)] = h[n - 3] + h[n - 2];
            system[(n - 1, n - 1)] = -h[n - 3];
        }

        let solution = system
            .lu()
            .solve(&rhs)
            .ok_or_else(|| SarError::Processing("Singular spline system".to_string()))?;

        Ok(solution.iter().copied().collect())
    }

    /// Time domain `[first knot, last knot]`
    pub fn domain(&self) -> (f64, f64) {
        (self.knots[0], self.knots[self.knots.len() - 1])
    }

    /// Evaluate the spline; `None` outside the knot domain or for NaN input
    pub fn evaluate(&self, t: f64) -> Option<f64> {
        let (start, end) = self.domain();
        if !(t >= start && t <= end) {
            return None;
        }

        // Segment containing t; the last knot belongs to the final segment
        let segment = self.knots.partition_point(|&k| k <= t).saturating_sub(1);
        let i = segment.min(self.knots.len() - 2);

        let h = self.knots[i + 1] - self.knots[i];
        let left = self.knots[i + 1] - t;
        let right = t - self.knots[i];
        let (m0, m1) = (self.curvature[i], self.curvature[i + 1]);
        let (y0, y1) = (self.values[i], self.values[i + 1]);

        Some(
            m0 * left.powi(3) / (6.0 * h)
                + m1 * right.powi(3) / (6.0 * h)
                + (y0 / h - m0 * h / 6.0) * left
                + (y1 / h - m1 * h / 6.0) * right,
        )
    }
}

/// Six-component orbit interpolator built from a state-vector time series
#[derive(Debug, Clone)]
pub struct OrbitInterpolator {
    position: [CubicSpline; 3],
    velocity: [CubicSpline; 3],
}

impl OrbitInterpolator {
    /// Build one spline per position and velocity axis
    pub fn from_state_vectors(state_vectors: &[StateVector]) -> SarResult<Self> {
        let times: Vec<f64> = state_vectors.iter().map(|sv| sv.time).collect();
        let axis = |select: fn(&StateVector) -> f64| -> SarResult<CubicSpline> {
            let values: Vec<f64> = state_vectors.iter().map(select).collect();
            CubicSpline::new(&times, &values)
        };

        let position = [
            axis(|sv| sv.position[0])?,
            axis(|sv| sv.position[1])?,
            axis(|sv| sv.position[2])?,
        ];
        let velocity = [
            axis(|sv| sv.velocity[0])?,
            axis(|sv| sv.velocity[1])?,
            axis(|sv| sv.velocity[2])?,
        ];

        log::debug!(
            "Built orbit interpolator over {} state vectors, t=[{:.3}, {:.3}] s",
            state_vectors.len(),
            times[0],
            times[times.len() - 1]
        );

        Ok(Self { position, velocity })
    }

    /// State-vector time window
    pub fn time_window(&self) -> (f64, f64) {
        self.position[0].domain()
    }

    /// Interpolated ECEF position in meters, `None` outside the window
    pub fn position(&self, t: f64) -> Option<Vector3<f64>> {
        Self::evaluate_axes(&self.position, t)
    }

    /// Interpolated ECEF velocity in m/s, `None` outside the window
    pub fn velocity(&self, t: f64) -> Option<Vector3<f64>> {
        Self::evaluate_axes(&self.velocity, t)
    }

    /// Position and velocity together
    pub fn state(&self, t: f64) -> Option<(Vector3<f64>, Vector3<f64>)> {
        Some((self.position(t)?, self.velocity(t)?))
    }

    fn evaluate_axes(axes: &[CubicSpline; 3], t: f64) -> Option<Vector3<f64>> {
        Some(Vector3::new(
            axes[0].evaluate(t)?,
            axes[1].evaluate(t)?,
            axes[2].evaluate(t)?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_spline_reproduces_cubic() {
        // A not-a-knot spline is exact for any cubic polynomial
        let f = |t: f64| 0.5 * t.powi(3) - 2.0 * t * t + 3.0 * t - 7.0;
        let knots: Vec<f64> = (0..6).map(|i| i as f64 * 10.0).collect();
        let values: Vec<f64> = knots.iter().map(|&t| f(t)).collect();
        let spline = CubicSpline::new(&knots, &values).unwrap();

        for t in [0.0, 3.3, 12.5, 27.0, 41.9, 50.0] {
            assert_abs_diff_eq!(spline.evaluate(t).unwrap(), f(t), epsilon = 1e-8 * f(t).abs().max(1.0));
        }
    }

    #[test]
    fn test_spline_short_grids() {
        let linear = CubicSpline::new(&[0.0, 10.0], &[1.0, 3.0]).unwrap();
        assert_abs_diff_eq!(linear.evaluate(5.0).unwrap(), 2.0, epsilon = 1e-12);

        let parabola = CubicSpline::new(&[0.0, 1.0, 2.0], &[0.0, 1.0, 4.0]).unwrap();
        assert_abs_diff_eq!(parabola.evaluate(1.5).unwrap(), 2.25, epsilon = 1e-12);
    }

    #[test]
    fn test_spline_outside_domain() {
        let spline = CubicSpline::new(&[0.0, 1.0, 2.0, 3.0], &[0.0, 1.0, 8.0, 27.0]).unwrap();
        assert!(spline.evaluate(-1e-9).is_none());
        assert!(spline.evaluate(3.0 + 1e-9).is_none());
        assert!(spline.evaluate(f64::NAN).is_none());
        assert!(spline.evaluate(0.0).is_some());
        assert!(spline.evaluate(3.0).is_some());
    }

    #[test]
    fn test_spline_rejects_bad_knots() {
        assert!(CubicSpline::new(&[0.0], &[1.0]).is_err());
        assert!(CubicSpline::new(&[0.0, 0.0, 1.0], &[1.0, 2.0, 3.0]).is_err());
        assert!(CubicSpline::new(&[0.0, 1.0], &[1.0]).is_err());
    }
}
