//! Conversion of interleaved unwrapped-phase rasters to masked big-endian phase.

use crate::io::geodat::GeodatReader;
use crate::io::raster::{read_image, write_image, ByteOrder};
use crate::types::{SarError, SarResult};
use ndarray::{s, Array2, Zip};
use std::path::{Path, PathBuf};

/// Value written to pixels outside every connected component
pub const NO_DATA: f32 = -2.0e9;

/// Phase half (columns `range_samples..2*range_samples`) of an interleaved
/// magnitude/phase raster
pub fn extract_phase(unw: &Array2<f32>, range_samples: usize) -> SarResult<Array2<f32>> {
    if unw.ncols() != 2 * range_samples {
        return Err(SarError::InvalidFormat(format!(
            "Unwrapped raster has {} columns, expected {} for {} range samples",
            unw.ncols(),
            2 * range_samples,
            range_samples
        )));
    }
    Ok(unw.slice(s![.., range_samples..]).to_owned())
}

/// Set pixels with connected-component label 0 to [`NO_DATA`].
///
/// Returns the number of pixels masked.
pub fn mask_phase(phase: &mut Array2<f32>, conncomp: &Array2<u8>) -> SarResult<usize> {
    if phase.dim() != conncomp.dim() {
        return Err(SarError::InvalidFormat(format!(
            "Phase shape {:?} does not match connected-component shape {:?}",
            phase.dim(),
            conncomp.dim()
        )));
    }

    let zip = Zip::from(phase).and(conncomp);
    let apply = |value: &mut f32, &label: &u8| {
        if label == 0 {
            *value = NO_DATA;
        }
    };
    #[cfg(feature = "parallel")]
    zip.par_for_each(apply);
    #[cfg(not(feature = "parallel"))]
    zip.for_each(apply);

    Ok(conncomp.iter().filter(|&&label| label == 0).count())
}

/// Output path for a converted raster: the first `unw` in the file name becomes `uw`
pub fn converted_path(unw_path: &Path) -> PathBuf {
    let name = unw_path
        .file_name()
        .map(|n| n.to_string_lossy().replacen("unw", "uw", 1))
        .unwrap_or_default();
    unw_path.with_file_name(name)
}

/// Convert an interleaved little-endian unwrapped raster to masked big-endian phase.
///
/// The raster size comes from the geodat record and the mask from the
/// `<unw>.conncomp` byte raster beside it.
pub fn convert_unwrapped<P: AsRef<Path>, Q: AsRef<Path>>(unw_path: P, geodat_path: Q) -> SarResult<PathBuf> {
    let unw_path = unw_path.as_ref();
    let record = GeodatReader::read_file(geodat_path)?;
    let (nr, na) = (record.image.range_samples, record.image.azimuth_lines);
    log::info!("Converting unwrapped phase {} ({} x {})", unw_path.display(), nr, na);

    let mut conncomp_name = unw_path.as_os_str().to_owned();
    conncomp_name.push(".conncomp");
    let conncomp: Array2<u8> = read_image(PathBuf::from(conncomp_name), nr, na, ByteOrder::Native)?;
    let unw: Array2<f32> = read_image(unw_path, 2 * nr, na, ByteOrder::Little)?;

    let mut phase = extract_phase(&unw, nr)?;
    let masked = mask_phase(&mut phase, &conncomp)?;
    log::debug!("Masked {} of {} pixels", masked, phase.len());

    let output = converted_path(unw_path);
    if output == unw_path {
        return Err(SarError::Processing(format!(
            "Output path would overwrite input: {}",
            unw_path.display()
        )));
    }
    write_image(&output, &phase, ByteOrder::Big)?;
    log::info!("Unwrapped phase written to: {}", output.display());
    Ok(output)
}
