//! Reader and writer for geodat scene records.
//!
//! A geodat file mixes `;` comment lines with data lines in a fixed order.
//! Only three comments carry data: the image name, the image date (the
//! midnight reference for every time in the record) and the skew/squint
//! line. Data lines are consumed by an explicit slot machine, so a line
//! that does not fit the slot being filled is rejected instead of guessed.

use crate::core::geocoding::DerivedGeometry;
use crate::types::{
    CenterGeometry, Ellipsoid, GeoPoint, ImageSize, LookDirection, PassDirection, PixelSpacing,
    SarError, SarResult, SceneGeometryRecord, SkewSquint, StateVector,
};
use chrono::{NaiveDate, NaiveTime, Timelike};
use regex::Regex;
use std::fs;
use std::io::BufRead;
use std::path::Path;

/// Ellipsoid axes below this are taken to be kilometres
const KM_AXIS_THRESHOLD: f64 = 1.0e5;

/// Data-line slots in file order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    ImageSize,
    EllipsoidGeometry,
    Corner(usize),
    PixelSpacing,
    PassDirection,
    LookDirection,
    StateMarker,
    StartTime,
    Prf,
    Wavelength,
    StateVectorCount,
    StateVectorStart,
    StateVectorInterval,
    Position(usize),
    Velocity(usize),
    Trailer,
    Done,
}

impl Slot {
    /// Slots that may be skipped when the line does not match them
    fn is_optional(self) -> bool {
        matches!(self, Slot::PassDirection | Slot::LookDirection | Slot::StateMarker)
    }

    fn describe(self) -> String {
        match self {
            Slot::ImageSize => "image size (4 integers)".to_string(),
            Slot::EllipsoidGeometry => "ellipsoid/center geometry (5 or 6 numbers)".to_string(),
            Slot::Corner(i) => format!("corner {} (lat lon)", i + 1),
            Slot::PixelSpacing => "single-look pixel spacing (2 numbers)".to_string(),
            Slot::PassDirection => "pass direction keyword".to_string(),
            Slot::LookDirection => "look direction keyword".to_string(),
            Slot::StateMarker => "'state' marker".to_string(),
            Slot::StartTime => "start time (hour minute seconds)".to_string(),
            Slot::Prf => "PRF".to_string(),
            Slot::Wavelength => "wavelength".to_string(),
            Slot::StateVectorCount => "state vector count".to_string(),
            Slot::StateVectorStart => "state vector start time".to_string(),
            Slot::StateVectorInterval => "state vector interval".to_string(),
            Slot::Position(i) => format!("position of state vector {}", i + 1),
            Slot::Velocity(i) => format!("velocity of state vector {}", i + 1),
            Slot::Trailer => "optional deltaT line".to_string(),
            Slot::Done => "end of record".to_string(),
        }
    }
}

/// Fields collected while walking the slots
#[derive(Debug, Default)]
struct PartialRecord {
    image_name: Option<String>,
    image_date: Option<NaiveDate>,
    skew: Option<SkewSquint>,
    image: Option<ImageSize>,
    ellipsoid: Option<Ellipsoid>,
    center: Option<CenterGeometry>,
    corners: Vec<GeoPoint>,
    pixel_spacing: Option<PixelSpacing>,
    pass_direction: Option<PassDirection>,
    look_direction: Option<LookDirection>,
    time_of_day: Option<NaiveTime>,
    prf: Option<f64>,
    wavelength: Option<f64>,
    state_vector_count: usize,
    state_vector_start: Option<f64>,
    state_vector_interval: Option<f64>,
    positions: Vec<[f64; 3]>,
    velocities: Vec<[f64; 3]>,
    delta_t: Option<f64>,
}

/// Outcome of offering a line to a slot
enum Offer {
    Taken(Slot),
    Declined,
}

/// Geodat record reader
pub struct GeodatReader;

impl GeodatReader {
    /// Read and parse a geodat file
    pub fn read_file<P: AsRef<Path>>(path: P) -> SarResult<SceneGeometryRecord> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SarError::RecordNotFound(path.to_path_buf()));
        }
        log::info!("Reading geodat file: {}", path.display());
        let content = fs::read_to_string(path)?;
        Self::parse_str(&content)
    }

    /// Parse geodat text from any buffered reader
    pub fn parse<R: BufRead>(reader: R) -> SarResult<SceneGeometryRecord> {
        let lines = reader.lines().collect::<Result<Vec<_>, _>>()?;
        Self::parse_lines(lines.iter().map(String::as_str))
    }

    /// Parse geodat text held in memory
    pub fn parse_str(content: &str) -> SarResult<SceneGeometryRecord> {
        Self::parse_lines(content.lines())
    }

    fn parse_lines<'a, I: Iterator<Item = &'a str>>(lines: I) -> SarResult<SceneGeometryRecord> {
        let date_pattern = Regex::new(r"Image date\s*:\s*(\d{1,2})\s+([A-Za-z]{3})[A-Za-z]*\s+(\d{4})")
            .map_err(|e| SarError::Processing(format!("Regex error: {}", e)))?;

        let mut partial = PartialRecord::default();
        let mut slot = Slot::ImageSize;

        for (index, raw) in lines.enumerate() {
            let line_no = index + 1;
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }

            if line.contains(';') {
                Self::parse_comment(line, line_no, &date_pattern, &mut partial)?;
                continue;
            }

            let tokens: Vec<&str> = line.split_whitespace().collect();
            loop {
                match Self::offer(slot, &tokens, line_no, &mut partial)? {
                    Offer::Taken(next) => {
                        slot = next;
                        break;
                    }
                    Offer::Declined if slot.is_optional() => {
                        slot = Self::skip(slot);
                    }
                    Offer::Declined => {
                        return Err(SarError::MalformedRecord {
                            line: line_no,
                            reason: format!("expected {}, found '{}'", slot.describe(), line),
                        });
                    }
                }
            }
        }

        if !matches!(slot, Slot::Trailer | Slot::Done) {
            return Err(SarError::MalformedRecord {
                line: 0,
                reason: format!("record ended while expecting {}", slot.describe()),
            });
        }

        Self::finish(partial)
    }

    fn parse_comment(
        line: &str,
        line_no: usize,
        date_pattern: &Regex,
        partial: &mut PartialRecord,
    ) -> SarResult<()> {
        if line.contains("Image date") {
            let captures = date_pattern.captures(line).ok_or_else(|| SarError::MalformedRecord {
                line: line_no,
                reason: format!("unreadable image date: '{}'", line),
            })?;
            let month = &captures[2];
            let normalized = format!(
                "{} {}{} {}",
                &captures[1],
                month[..1].to_ascii_uppercase(),
                month[1..].to_ascii_lowercase(),
                &captures[3]
            );
            let date = NaiveDate::parse_from_str(&normalized, "%d %b %Y").map_err(|e| {
                SarError::MalformedRecord {
                    line: line_no,
                    reason: format!("invalid image date '{}': {}", normalized, e),
                }
            })?;
            log::debug!("Image date {}", date);
            partial.image_date = Some(date);
        } else if line.contains("Image name") {
            if let Some((_, name)) = line.split_once(':') {
                let name = name.trim();
                if !name.is_empty() {
                    partial.image_name = Some(name.to_string());
                }
            }
        } else if line.contains("Skew") {
            let columns: Vec<&str> = line.split_whitespace().collect();
            let values: Option<Vec<f64>> = columns
                .get(7..9)
                .map(|pair| pair.iter().filter_map(|v| v.parse().ok()).collect());
            match values.as_deref() {
                Some(&[skew_seconds, squint_deg]) => {
                    log::debug!("Skew {} s, squint {} deg", skew_seconds, squint_deg);
                    partial.skew = Some(SkewSquint { skew_seconds, squint_deg });
                }
                _ => {
                    return Err(SarError::MalformedRecord {
                        line: line_no,
                        reason: format!("unreadable skew/squint line: '{}'", line),
                    })
                }
            }
        }
        Ok(())
    }

    /// Slot that follows a skipped optional slot
    fn skip(slot: Slot) -> Slot {
        match slot {
            Slot::PassDirection => Slot::LookDirection,
            Slot::LookDirection => Slot::StateMarker,
            Slot::StateMarker => Slot::StartTime,
            other => other,
        }
    }

    /// Offer a data line to `slot`; on success return the next slot
    fn offer(
        slot: Slot,
        tokens: &[&str],
        line_no: usize,
        partial: &mut PartialRecord,
    ) -> SarResult<Offer> {
        let malformed = |reason: String| SarError::MalformedRecord { line: line_no, reason };

        let next = match slot {
            Slot::ImageSize => {
                let Some(values) = integers(tokens, 4) else { return Ok(Offer::Declined) };
                if values.iter().any(|&v| v == 0) {
                    return Err(malformed(format!("image size values must be positive: {:?}", values)));
                }
                if values[0] < 2 || values[1] < 2 {
                    return Err(malformed(format!(
                        "image needs at least 2 range samples and 2 azimuth lines: {:?}",
                        values
                    )));
                }
                let image = ImageSize {
                    range_samples: values[0],
                    azimuth_lines: values[1],
                    range_looks: values[2],
                    azimuth_looks: values[3],
                };
                log::debug!("nr,na,nlr,nla {:?}", image);
                partial.image = Some(image);
                Slot::EllipsoidGeometry
            }
            Slot::EllipsoidGeometry => {
                let Some(values) = floats(tokens, 5).or_else(|| floats(tokens, 6)) else {
                    return Ok(Offer::Declined);
                };
                let to_meters = |axis: f64| if axis < KM_AXIS_THRESHOLD { axis * 1000.0 } else { axis };
                let ellipsoid = Ellipsoid::new(to_meters(values[0]), to_meters(values[1]))
                    .map_err(|e| malformed(e.to_string()))?;
                let center = CenterGeometry {
                    slant_range_km: values[2],
                    incidence_deg: values[3],
                    altitude_km: values[4],
                    range_skew_seconds: values.get(5).copied(),
                };
                log::debug!("Ellipsoid {:?}, center {:?}", ellipsoid, center);
                partial.ellipsoid = Some(ellipsoid);
                partial.center = Some(center);
                Slot::Corner(0)
            }
            Slot::Corner(i) => {
                let Some(values) = floats(tokens, 2) else { return Ok(Offer::Declined) };
                partial.corners.push(GeoPoint::surface(values[0], values[1]));
                if i + 1 < 5 {
                    Slot::Corner(i + 1)
                } else {
                    log::debug!("Corners {:?}", partial.corners);
                    Slot::PixelSpacing
                }
            }
            Slot::PixelSpacing => {
                let Some(values) = floats(tokens, 2) else { return Ok(Offer::Declined) };
                if !(values[0] > 0.0 && values[1] > 0.0) {
                    return Err(malformed(format!("pixel spacing must be positive: {:?}", values)));
                }
                log::debug!("Single look pixel size (r, a) {} {}", values[0], values[1]);
                partial.pixel_spacing = Some(PixelSpacing { range: values[0], azimuth: values[1] });
                Slot::PassDirection
            }
            Slot::PassDirection => {
                let Some(pass) = keyword(tokens).and_then(PassDirection::from_keyword) else {
                    return Ok(Offer::Declined);
                };
                log::debug!("Pass direction {}", pass);
                partial.pass_direction = Some(pass);
                Slot::LookDirection
            }
            Slot::LookDirection => {
                let Some(look) = keyword(tokens).and_then(LookDirection::from_keyword) else {
                    return Ok(Offer::Declined);
                };
                log::debug!("Look direction {}", look);
                partial.look_direction = Some(look);
                Slot::StateMarker
            }
            Slot::StateMarker => {
                if keyword(tokens) != Some("state") {
                    return Ok(Offer::Declined);
                }
                Slot::StartTime
            }
            Slot::StartTime => {
                let Some(values) = floats(tokens, 3) else { return Ok(Offer::Declined) };
                let time = time_of_day(values[0], values[1], values[2]).map_err(malformed)?;
                log::debug!("Start time of day {}", time);
                partial.time_of_day = Some(time);
                Slot::Prf
            }
            Slot::Prf => {
                partial.prf = Some(positive_scalar(tokens, "PRF").map_err(malformed)?);
                Slot::Wavelength
            }
            Slot::Wavelength => {
                partial.wavelength = Some(positive_scalar(tokens, "wavelength").map_err(malformed)?);
                Slot::StateVectorCount
            }
            Slot::StateVectorCount => {
                let Some(values) = integers(tokens, 1) else { return Ok(Offer::Declined) };
                if values[0] < 2 {
                    return Err(malformed(format!(
                        "at least 2 state vectors are required, found {}", values[0]
                    )));
                }
                partial.state_vector_count = values[0];
                log::debug!("nState {}", values[0]);
                Slot::StateVectorStart
            }
            Slot::StateVectorStart => {
                let Some(values) = floats(tokens, 1) else { return Ok(Offer::Declined) };
                partial.state_vector_start = Some(values[0]);
                Slot::StateVectorInterval
            }
            Slot::StateVectorInterval => {
                partial.state_vector_interval =
                    Some(positive_scalar(tokens, "state vector interval").map_err(malformed)?);
                Slot::Position(0)
            }
            Slot::Position(i) => {
                let Some(values) = floats(tokens, 3) else { return Ok(Offer::Declined) };
                partial.positions.push([values[0], values[1], values[2]]);
                Slot::Velocity(i)
            }
            Slot::Velocity(i) => {
                let Some(values) = floats(tokens, 3) else { return Ok(Offer::Declined) };
                partial.velocities.push([values[0], values[1], values[2]]);
                if i + 1 < partial.state_vector_count {
                    Slot::Position(i + 1)
                } else {
                    Slot::Trailer
                }
            }
            Slot::Trailer => {
                if tokens.len() != 2 || tokens[0] != "deltaT" {
                    return Ok(Offer::Declined);
                }
                let value = tokens[1]
                    .parse::<f64>()
                    .map_err(|_| malformed(format!("invalid deltaT value '{}'", tokens[1])))?;
                log::debug!("deltaT {}", value);
                partial.delta_t = Some(value);
                Slot::Done
            }
            Slot::Done => return Ok(Offer::Declined),
        };

        Ok(Offer::Taken(next))
    }

    fn finish(partial: PartialRecord) -> SarResult<SceneGeometryRecord> {
        let missing = |what: &str| SarError::MalformedRecord {
            line: 0,
            reason: format!("missing {}", what),
        };

        let image_date = partial.image_date.ok_or_else(|| missing("'; Image date' comment"))?;
        let time_of_day = partial.time_of_day.ok_or_else(|| missing("start time"))?;
        let corners: [GeoPoint; 5] = partial
            .corners
            .try_into()
            .map_err(|c: Vec<GeoPoint>| missing(&format!("corners (found {} of 5)", c.len())))?;
        let state_vector_start = partial.state_vector_start.ok_or_else(|| missing("state vector start"))?;
        let state_vector_interval = partial
            .state_vector_interval
            .ok_or_else(|| missing("state vector interval"))?;

        if partial.positions.len() != partial.state_vector_count
            || partial.velocities.len() != partial.state_vector_count
        {
            return Err(missing(&format!(
                "state vectors ({} positions and {} velocities for {} declared)",
                partial.positions.len(),
                partial.velocities.len(),
                partial.state_vector_count
            )));
        }

        let state_vectors = partial
            .positions
            .iter()
            .zip(&partial.velocities)
            .enumerate()
            .map(|(i, (position, velocity))| StateVector {
                time: state_vector_start + i as f64 * state_vector_interval,
                position: *position,
                velocity: *velocity,
            })
            .collect();

        let start_time = image_date.and_time(time_of_day);
        let start_seconds =
            time_of_day.num_seconds_from_midnight() as f64 + time_of_day.nanosecond() as f64 * 1e-9;

        let record = SceneGeometryRecord {
            image_name: partial.image_name,
            image: partial.image.ok_or_else(|| missing("image size"))?,
            ellipsoid: partial.ellipsoid.ok_or_else(|| missing("ellipsoid"))?,
            center: partial.center.ok_or_else(|| missing("center geometry"))?,
            corners,
            pixel_spacing: partial.pixel_spacing.ok_or_else(|| missing("pixel spacing"))?,
            pass_direction: partial.pass_direction,
            look_direction: partial.look_direction,
            skew: partial.skew,
            image_date,
            start_time,
            start_seconds,
            prf: partial.prf.ok_or_else(|| missing("PRF"))?,
            wavelength: partial.wavelength.ok_or_else(|| missing("wavelength"))?,
            state_vector_start,
            state_vector_interval,
            state_vectors,
            delta_t: partial.delta_t,
        };

        log::info!(
            "Parsed geodat record: {}x{} pixels, {} state vectors, start {}",
            record.image.range_samples,
            record.image.azimuth_lines,
            record.state_vector_count(),
            record.start_time
        );
        Ok(record)
    }
}

/// Exactly `count` numeric tokens
fn floats(tokens: &[&str], count: usize) -> Option<Vec<f64>> {
    if tokens.len() != count {
        return None;
    }
    tokens.iter().map(|t| t.parse::<f64>().ok()).collect()
}

/// Exactly `count` non-negative integer tokens
fn integers(tokens: &[&str], count: usize) -> Option<Vec<usize>> {
    if tokens.len() != count {
        return None;
    }
    tokens.iter().map(|t| t.parse::<usize>().ok()).collect()
}

fn keyword<'a>(tokens: &[&'a str]) -> Option<&'a str> {
    match tokens {
        [word] => Some(word),
        _ => None,
    }
}

/// Single positive number; a mismatch here is an error because the slot is mandatory
fn positive_scalar(tokens: &[&str], what: &str) -> Result<f64, String> {
    match floats(tokens, 1) {
        Some(values) if values[0] > 0.0 => Ok(values[0]),
        Some(values) => Err(format!("{} must be positive, found {}", what, values[0])),
        None => Err(format!("expected {}, found '{}'", what, tokens.join(" "))),
    }
}

/// Build a time of day from hour, minute and fractional seconds.
///
/// Skew/squint corrections can push the start time past midnight; any hour
/// above 23 is clamped to 23:59:59.999999 rather than rolled into the next day.
fn time_of_day(hour: f64, minute: f64, seconds: f64) -> Result<NaiveTime, String> {
    if hour.fract() != 0.0
        || minute.fract() != 0.0
        || hour < 0.0
        || !(0.0..60.0).contains(&minute)
        || !(0.0..61.0).contains(&seconds)
    {
        return Err(format!("invalid start time {} {} {}", hour, minute, seconds));
    }

    let clamped = || {
        log::warn!(
            "Start time {} {} {} is past midnight; clamping to 23:59:59.999999",
            hour, minute, seconds
        );
        NaiveTime::from_hms_micro_opt(23, 59, 59, 999_999)
            .ok_or_else(|| "clamped start time out of range".to_string())
    };
    if hour > 23.0 {
        return clamped();
    }

    // hour <= 23, minute < 60 and seconds < 61 keep every cast in range
    let whole_seconds = hour as u64 * 3600 + minute as u64 * 60;
    let micros_of_day = whole_seconds
        .checked_mul(1_000_000)
        .and_then(|m| m.checked_add((seconds * 1e6).round() as u64))
        .ok_or_else(|| format!("invalid start time {} {} {}", hour, minute, seconds))?;
    if micros_of_day >= 86_400 * 1_000_000 {
        return clamped();
    }

    let (secs, micros) = (micros_of_day / 1_000_000, micros_of_day % 1_000_000);
    NaiveTime::from_num_seconds_from_midnight_opt(secs as u32, micros as u32 * 1000)
        .ok_or_else(|| format!("invalid start time {} {} {}", hour, minute, seconds))
}

fn comment<T: AsRef<str>>(text: T) -> String {
    format!("; {}", text.as_ref())
}

/// Section header framed by bare `;` lines
fn banner(text: &str) -> [String; 3] {
    [";".to_string(), comment(text), ";".to_string()]
}

/// Geodat record writer producing the legacy text layout
pub struct GeodatWriter;

impl GeodatWriter {
    /// Render a record as geodat text
    pub fn render(record: &SceneGeometryRecord) -> String {
        let image = &record.image;
        let derived = DerivedGeometry::build(record);
        let time = record.start_time.time();
        let seconds = time.second() as f64 + time.nanosecond() as f64 * 1e-9;
        let time_line = format!("{} {} {}", time.hour(), time.minute(), seconds);

        // Header comments; only image name, date and skew are read back
        let mut lines = vec![
            comment(&format!("Image name: {}", record.image_name.as_deref().unwrap_or(""))),
            comment(&format!("Image date: {}", record.image_date.format("%-d %b %Y").to_string().to_uppercase())),
            comment(&format!("Image time: {}", time_line)),
            comment(&format!("S/C altitude: {}", record.satellite_altitude_m())),
            comment(&format!("PRF :   {}", record.prf)),
            comment(&format!(
                "near/cen/far range : {} {} {}",
                derived.near_range_m, derived.center_range_m, derived.far_range_m
            )),
            comment(&format!("Range pixel spacing :   {}", record.pixel_spacing.range * image.range_looks as f64)),
            comment(&format!("Number of looks (rg,az) :   {} {}", image.range_looks, image.azimuth_looks)),
            comment(&format!(
                "Azimuth pixel spacing :   {}",
                record.pixel_spacing.azimuth * image.azimuth_looks as f64
            )),
            comment(&format!("Number of pixels (rg,az) :  {} {}", image.range_samples, image.azimuth_lines)),
            comment(&format!("Number of state vectors :   {}", record.state_vector_count())),
            comment(&format!("Start time of state vectors :   {}", record.state_vector_start)),
            comment(&format!("Interval between 2 state vectors :   {}", record.state_vector_interval)),
        ];
        if let Some(skew) = record.skew {
            lines.push(comment(&format!(
                "Skew offset (s), squint (deg) : {}  {}",
                skew.skew_seconds, skew.squint_deg
            )));
        }

        lines.extend(banner("rangesize,azimuthsize,nrangelooks,nazimuthlooks"));
        lines.push(format!(
            "{}  {}  {}  {}",
            image.range_samples, image.azimuth_lines, image.range_looks, image.azimuth_looks
        ));

        lines.extend(banner("ReMajor, ReMinor, Rc, phic, h"));
        let mut geometry = format!(
            "{}    {}   {}  {}   {}",
            record.ellipsoid.semi_major / 1000.0,
            record.ellipsoid.semi_minor / 1000.0,
            record.center.slant_range_km,
            record.center.incidence_deg,
            record.center.altitude_km
        );
        if let Some(range_skew) = record.center.range_skew_seconds {
            geometry.push_str(&format!("   {}", range_skew));
        }
        lines.push(geometry);

        lines.extend(banner("corners (early near, early far, late far, late near, center)"));
        lines.extend(record.corners.iter().map(|c| format!("{} {}", c.latitude, c.longitude)));

        lines.extend(banner("Range/azimuth single look pixel sizes"));
        lines.push(format!("{}  {}", record.pixel_spacing.range, record.pixel_spacing.azimuth));
        if let Some(pass) = record.pass_direction {
            lines.push(";".to_string());
            lines.push(pass.to_string());
        }
        if let Some(look) = record.look_direction {
            lines.extend(banner("Look direction"));
            lines.push(look.to_string());
        }

        lines.extend(banner("Flag to indicate state vectors and associated data"));
        lines.push("state".to_string());
        lines.push(comment("time after squint and skew corrections"));
        lines.push(time_line);
        lines.push(comment("prf"));
        lines.push(record.prf.to_string());
        lines.push(comment("wavelength"));
        lines.push(record.wavelength.to_string());
        lines.push(comment("number of state vectors"));
        lines.push(record.state_vector_count().to_string());
        lines.push(comment("time of first vector"));
        lines.push(record.state_vector_start.to_string());
        lines.push(comment("state vector interval"));
        lines.push(record.state_vector_interval.to_string());
        lines.push(comment("state vectors"));
        for sv in &record.state_vectors {
            lines.push(format!("{} {} {}", sv.position[0], sv.position[1], sv.position[2]));
            lines.push(format!("{} {} {}", sv.velocity[0], sv.velocity[1], sv.velocity[2]));
        }
        if let Some(delta_t) = record.delta_t {
            lines.push(format!("deltaT {}", delta_t));
        }

        let mut out = lines.join("\n");
        out.push('\n');
        out
    }

    /// Write a record to `path` as geodat text
    pub fn write_file<P: AsRef<Path>>(path: P, record: &SceneGeometryRecord) -> SarResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, Self::render(record))?;
        log::info!("Geodat record written to: {}", path.display());
        Ok(())
    }

    /// Conventional file name, e.g. `geodat10x2.in`
    pub fn file_name(record: &SceneGeometryRecord) -> String {
        format!("geodat{}x{}.in", record.image.range_looks, record.image.azimuth_looks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_of_day_clamps_past_midnight() {
        let time = time_of_day(24.0, 0.0, 1.5).unwrap();
        assert_eq!(time, NaiveTime::from_hms_micro_opt(23, 59, 59, 999_999).unwrap());
    }

    #[test]
    fn test_time_of_day_clamps_huge_hour() {
        let time = time_of_day(1.0e15, 0.0, 0.0).unwrap();
        assert_eq!(time, NaiveTime::from_hms_micro_opt(23, 59, 59, 999_999).unwrap());
    }

    #[test]
    fn test_time_of_day_keeps_microseconds() {
        let time = time_of_day(17.0, 8.0, 15.123456).unwrap();
        assert_eq!(time, NaiveTime::from_hms_micro_opt(17, 8, 15, 123_456).unwrap());
    }

    #[test]
    fn test_time_of_day_rejects_fractional_hour() {
        assert!(time_of_day(1.5, 0.0, 0.0).is_err());
        assert!(time_of_day(1.0, 75.0, 0.0).is_err());
    }

    #[test]
    fn test_time_of_day_carries_rounded_seconds() {
        let time = time_of_day(10.0, 59.0, 59.9999996).unwrap();
        assert_eq!(time, NaiveTime::from_hms_opt(11, 0, 0).unwrap());
    }

    #[test]
    fn test_token_helpers() {
        assert_eq!(integers(&["1", "2"], 2), Some(vec![1, 2]));
        assert_eq!(integers(&["1", "2.5"], 2), None);
        assert_eq!(floats(&["1", "2.5"], 3), None);
        assert_eq!(keyword(&["state"]), Some("state"));
        assert!(positive_scalar(&["-1.0"], "PRF").is_err());
    }
}
