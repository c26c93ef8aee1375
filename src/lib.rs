//! geodat: Sentinel-1 scene geometry records and orbit-state-vector geocoding
//!
//! This library reads and writes the legacy geodat metadata format, rebuilds
//! the satellite orbit from its state vectors, and converts between ground
//! coordinates and single-look radar (range, azimuth) coordinates.

pub mod types;
pub mod io;
pub mod core;

// Re-export main types and functions for easier access
pub use types::{
    Corner, GeoPoint, ImageSize, LookDirection, PassDirection, RadarCoordinate, SarError,
    SarResult, SceneGeometryRecord, StateVector,
};

pub use io::{GeodatReader, GeodatWriter};
pub use crate::core::{GeocodingConfig, GeocodingEngine};

#[cfg(feature = "python")]
mod python {
    use crate::core::unwrapped;
    use crate::{GeoPoint, GeocodingEngine, GeodatReader, GeodatWriter, SarError};
    use numpy::{PyArray1, PyReadonlyArray1};
    use pyo3::exceptions::{PyFileNotFoundError, PyRuntimeError, PyValueError};
    use pyo3::prelude::*;

    fn to_py_err(err: SarError) -> PyErr {
        match err {
            SarError::RecordNotFound(_) => PyErr::new::<PyFileNotFoundError, _>(format!("{}", err)),
            SarError::MalformedRecord { .. }
            | SarError::GeometryConfiguration(_)
            | SarError::InvalidFormat(_) => PyErr::new::<PyValueError, _>(format!("{}", err)),
            _ => PyErr::new::<PyRuntimeError, _>(format!("{}", err)),
        }
    }

    /// Python module definition
    #[pymodule]
    fn _core(_py: Python, m: &PyModule) -> PyResult<()> {
        m.add_class::<PyGeodat>()?;
        m.add_function(wrap_pyfunction!(convert_unwrapped, m)?)?;
        Ok(())
    }

    /// Convert `<unw>` plus `<unw>.conncomp` to masked big-endian phase; returns the output path
    #[pyfunction]
    fn convert_unwrapped(unw_path: String, geodat_path: String) -> PyResult<String> {
        unwrapped::convert_unwrapped(&unw_path, &geodat_path)
            .map(|p| p.to_string_lossy().into_owned())
            .map_err(to_py_err)
    }

    /// Python wrapper for a geocoding engine over one geodat record
    #[pyclass(name = "Geodat")]
    struct PyGeodat {
        inner: GeocodingEngine,
    }

    #[pymethods]
    impl PyGeodat {
        #[new]
        fn new(path: String) -> PyResult<Self> {
            Self::from_file(path)
        }

        #[staticmethod]
        fn from_file(path: String) -> PyResult<Self> {
            let record = GeodatReader::read_file(&path).map_err(to_py_err)?;
            let inner = GeocodingEngine::new(record).map_err(to_py_err)?;
            Ok(PyGeodat { inner })
        }

        #[staticmethod]
        fn from_text(text: &str) -> PyResult<Self> {
            let record = GeodatReader::parse_str(text).map_err(to_py_err)?;
            let inner = GeocodingEngine::new(record).map_err(to_py_err)?;
            Ok(PyGeodat { inner })
        }

        fn to_text(&self) -> String {
            GeodatWriter::render(self.inner.record())
        }

        #[getter]
        fn nr(&self) -> usize {
            self.inner.record().image.range_samples
        }

        #[getter]
        fn na(&self) -> usize {
            self.inner.record().image.azimuth_lines
        }

        #[getter]
        fn nlr(&self) -> usize {
            self.inner.record().image.range_looks
        }

        #[getter]
        fn nla(&self) -> usize {
            self.inner.record().image.azimuth_looks
        }

        #[getter]
        fn prf(&self) -> f64 {
            self.inner.record().prf
        }

        #[getter]
        fn wavelength(&self) -> f64 {
            self.inner.record().wavelength
        }

        #[getter]
        fn near_range(&self) -> f64 {
            self.inner.near_range_m()
        }

        #[getter]
        fn far_range(&self) -> f64 {
            self.inner.far_range_m()
        }

        #[getter]
        fn center_range(&self) -> f64 {
            self.inner.derived().center_range_m
        }

        #[getter]
        fn t0(&self) -> f64 {
            self.inner.derived().t0
        }

        #[getter]
        fn t1(&self) -> f64 {
            self.inner.derived().t1
        }

        #[getter]
        fn earth_radius(&self) -> f64 {
            self.inner.earth_radius_m()
        }

        #[getter]
        fn start_time(&self) -> String {
            self.inner.record().start_time.to_string()
        }

        /// Ground point to (range pixel, azimuth line, azimuth time)
        #[pyo3(signature = (lat, lon, height = 0.0, initial_time = None))]
        fn llz_to_ra(
            &self,
            lat: f64,
            lon: f64,
            height: f64,
            initial_time: Option<f64>,
        ) -> PyResult<(f64, f64, f64)> {
            let rc = self
                .inner
                .solve_range_azimuth(&GeoPoint::new(lat, lon, height), initial_time)
                .map_err(to_py_err)?;
            Ok((rc.range_pixel, rc.azimuth_line, rc.azimuth_time))
        }

        /// Vectorized ground-to-radar solve; failed points come back as NaN
        fn llz_to_ra_array<'py>(
            &self,
            py: Python<'py>,
            lat: PyReadonlyArray1<f64>,
            lon: PyReadonlyArray1<f64>,
            height: PyReadonlyArray1<f64>,
        ) -> PyResult<(&'py PyArray1<f64>, &'py PyArray1<f64>)> {
            let (lat, lon, height) = (lat.as_array(), lon.as_array(), height.as_array());
            if lat.len() != lon.len() || lat.len() != height.len() {
                return Err(PyErr::new::<PyValueError, _>("lat, lon and height must have equal length"));
            }

            let points: Vec<GeoPoint> = (0..lat.len())
                .map(|i| GeoPoint::new(lat[i], lon[i], height[i]))
                .collect();
            let results = py.allow_threads(|| self.inner.geocode_points(&points));

            let (range, azimuth): (Vec<f64>, Vec<f64>) = results
                .into_iter()
                .map(|r| r.map_or((f64::NAN, f64::NAN), |rc| (rc.range_pixel, rc.azimuth_line)))
                .unzip();
            Ok((PyArray1::from_vec(py, range), PyArray1::from_vec(py, azimuth)))
        }

        /// Radar coordinate to (lat, lon, height)
        #[pyo3(signature = (range_pixel, azimuth_line, height = 0.0))]
        fn ra_to_llz(&self, range_pixel: f64, azimuth_line: f64, height: f64) -> PyResult<(f64, f64, f64)> {
            let point = self
                .inner
                .solve_ground_point(range_pixel, azimuth_line, height)
                .map_err(to_py_err)?;
            Ok((point.latitude, point.longitude, point.height))
        }

        #[pyo3(signature = (time, range_m, z = 0.0))]
        fn incidence_at(&self, time: f64, range_m: f64, z: f64) -> Option<f64> {
            self.inner.incidence_angle_at(time, range_m, z)
        }

        fn nominal_incidence(&self) -> f64 {
            self.inner.nominal_incidence_angle()
        }

        fn actual_incidence(&self) -> Option<f64> {
            self.inner.actual_incidence_angle()
        }

        fn is_time_in_image(&self, t: f64) -> bool {
            self.inner.is_time_in_image(t)
        }

        fn is_range_in_image(&self, range_m: f64) -> bool {
            self.inner.is_range_in_image(range_m)
        }

        fn is_ascending(&self) -> PyResult<bool> {
            self.inner.record().is_ascending().map_err(to_py_err)
        }

        fn is_descending(&self) -> PyResult<bool> {
            self.inner.record().is_descending().map_err(to_py_err)
        }

        fn is_right_looking(&self) -> PyResult<bool> {
            self.inner.record().is_right_looking().map_err(to_py_err)
        }

        fn is_south(&self) -> bool {
            self.inner.record().is_south()
        }

        fn state_table(&self) -> String {
            self.inner.state_table()
        }

        fn __repr__(&self) -> String {
            let record = self.inner.record();
            format!(
                "Geodat(nr={}, na={}, looks={}x{}, start='{}')",
                record.image.range_samples,
                record.image.azimuth_lines,
                record.image.range_looks,
                record.image.azimuth_looks,
                record.start_time
            )
        }
    }
}
