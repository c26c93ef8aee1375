mod common;

use approx::assert_abs_diff_eq;
use chrono::{NaiveDate, NaiveTime};
use geodat::types::{LookDirection, PassDirection, SarError};
use geodat::{GeocodingEngine, GeodatReader, GeodatWriter};
use std::fs;
use tempfile::TempDir;

/// 1-based line number of the first line equal to `needle`
fn line_of(text: &str, needle: &str) -> usize {
    text.lines().position(|l| l.trim() == needle).expect("line present in fixture") + 1
}

#[test]
fn test_reference_scenario() {
    common::init_logging();
    let record = GeodatReader::parse_str(&common::scenario_text()).expect("Failed to parse scenario");

    assert_eq!(record.image.range_samples, 1000);
    assert_eq!(record.image.azimuth_lines, 2000);
    assert_eq!(record.image.range_looks, 2);
    assert_eq!(record.image.azimuth_looks, 4);
    assert_eq!(record.ellipsoid.semi_major, 6_378_137.0);
    assert_eq!(record.ellipsoid.semi_minor, 6_356_752.0);
    assert_eq!(record.pixel_spacing.range, 2.33);
    assert_eq!(record.pixel_spacing.azimuth, 13.89);
    assert_eq!(record.pass_direction, Some(PassDirection::Ascending));
    assert_eq!(record.look_direction, Some(LookDirection::Right));
    assert_eq!(record.prf, 1717.13);
    assert_eq!(record.wavelength, 0.055465);
    assert_eq!(record.state_vector_count(), 4);
    assert_eq!(record.corners[4].latitude, 69.6);
    assert_eq!(record.corners[4].longitude, -49.85);
    assert_eq!(record.image_name.as_deref(), Some("S1B_IW_SLC__1SDV_20181115T101532"));
    assert_eq!(record.image_date, NaiveDate::from_ymd_opt(2018, 11, 15).unwrap());
    assert_eq!(
        record.start_time.time(),
        NaiveTime::from_hms_micro_opt(10, 15, 32, 123_456).unwrap()
    );
    assert_abs_diff_eq!(record.start_seconds, common::SCENARIO_T0, epsilon = 1e-6);
    assert!(record.is_ascending().unwrap());
    assert!(!record.is_descending().unwrap());
    assert!(record.is_right_looking().unwrap());
    assert!(!record.is_south());

    let engine = GeocodingEngine::new(record).expect("Failed to build engine");
    let (t0, t1) = engine.image_window();
    println!("near {:.3} m, far {:.3} m, t0 {:.6}, t1 {:.6}", engine.near_range_m(), engine.far_range_m(), t0, t1);

    assert!(engine.near_range_m() < 850_000.0);
    assert!(engine.far_range_m() > 850_000.0);
    assert!(engine.is_time_in_image(t0));
    assert!(!engine.is_time_in_image(t1 + 1.0));
    assert_abs_diff_eq!(t1 - t0, 1999.0 * 4.0 / 1717.13, epsilon = 1e-9);
}

#[test]
fn test_parsing_is_idempotent() {
    let text = common::scenario_text();
    let first = GeodatReader::parse_str(&text).unwrap();
    let second = GeodatReader::parse_str(&text).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_state_vector_grid() {
    let record = GeodatReader::parse_str(&common::scenario_text()).unwrap();
    let times: Vec<f64> = record.state_vectors.iter().map(|sv| sv.time).collect();
    assert_eq!(times, vec![36_920.0, 36_930.0, 36_940.0, 36_950.0]);
    assert_eq!(record.state_vector_interval, 10.0);
    assert!(record.validate().is_ok());
}

#[test]
fn test_read_file_and_missing_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("geodat2x4.in");
    fs::write(&path, common::scenario_text()).unwrap();

    let record = GeodatReader::read_file(&path).expect("Failed to read geodat file");
    assert_eq!(record.image.range_samples, 1000);

    let missing = temp_dir.path().join("nope.in");
    match GeodatReader::read_file(&missing) {
        Err(SarError::RecordNotFound(p)) => assert_eq!(p, missing),
        other => panic!("expected RecordNotFound, got {:?}", other),
    }
}

#[test]
fn test_optional_keywords_may_be_absent() {
    let text = common::scenario_text()
        .replace("\nascending\n", "\n")
        .replace("\nright\n", "\n")
        .replace("\nstate\n", "\n");
    let record = GeodatReader::parse_str(&text).expect("keywords are optional");

    assert_eq!(record.pass_direction, None);
    assert_eq!(record.look_direction, None);
    assert!(matches!(record.is_ascending(), Err(SarError::GeometryConfiguration(_))));
    assert!(matches!(record.is_right_looking(), Err(SarError::GeometryConfiguration(_))));
}

#[test]
fn test_descending_left_keywords_ignore_case() {
    let text = common::scenario_text()
        .replace("\nascending\n", "\nDescending\n")
        .replace("\nright\n", "\nLEFT\n");
    let record = GeodatReader::parse_str(&text).unwrap();
    assert!(record.is_descending().unwrap());
    assert!(!record.is_right_looking().unwrap());
}

#[test]
fn test_range_skew_kilometre_axes_and_delta_t() {
    let text = common::scenario_text()
        .replace(
            "6378137.0    6356752.0   850.0  35.0   700.0",
            "6378.137    6356.752   850.0  35.0   700.0  0.0012",
        )
        + "deltaT -0.25\n";
    let record = GeodatReader::parse_str(&text).unwrap();

    assert_abs_diff_eq!(record.ellipsoid.semi_major, 6_378_137.0, epsilon = 1e-6);
    assert_abs_diff_eq!(record.ellipsoid.semi_minor, 6_356_752.0, epsilon = 1e-6);
    assert_eq!(record.center.range_skew_seconds, Some(0.0012));
    assert_eq!(record.delta_t, Some(-0.25));
}

#[test]
fn test_skew_comment() {
    let text = common::scenario_text().replace(
        "; Skew offset (s), squint (deg) : 0.000000  0.000000",
        "; Skew offset (s), squint (deg) : 0.125  -0.5",
    );
    let record = GeodatReader::parse_str(&text).unwrap();
    let skew = record.skew.expect("skew parsed");
    assert_eq!(skew.skew_seconds, 0.125);
    assert_eq!(skew.squint_deg, -0.5);
}

#[test]
fn test_start_time_past_midnight_is_clamped() {
    let text = common::scenario_text().replace("\n10 15 32.123456\n", "\n24 0 1.5\n");
    let record = GeodatReader::parse_str(&text).unwrap();

    assert_eq!(record.start_time.date(), NaiveDate::from_ymd_opt(2018, 11, 15).unwrap());
    assert_eq!(
        record.start_time.time(),
        NaiveTime::from_hms_micro_opt(23, 59, 59, 999_999).unwrap()
    );
    assert_abs_diff_eq!(record.start_seconds, 86_399.999_999, epsilon = 1e-6);
}

#[test]
fn test_huge_start_hour_is_clamped() {
    let text = common::scenario_text().replace("\n10 15 32.123456\n", "\n1e15 0 0\n");
    let record = GeodatReader::parse_str(&text).expect("huge hour clamps instead of failing");

    assert_eq!(
        record.start_time.time(),
        NaiveTime::from_hms_micro_opt(23, 59, 59, 999_999).unwrap()
    );
}

#[test]
fn test_missing_image_date() {
    let text = common::scenario_text().replace("; Image date: 15 NOV 2018\n", "");
    match GeodatReader::parse_str(&text) {
        Err(SarError::MalformedRecord { line, reason }) => {
            assert_eq!(line, 0);
            assert!(reason.contains("Image date"), "{}", reason);
        }
        other => panic!("expected MalformedRecord, got {:?}", other),
    }
}

#[test]
fn test_line_that_fits_no_slot() {
    let text = common::scenario_text().replace("\n70.1 -49.5\n", "\n70.1 -49.5 12.0\n");
    let expected_line = line_of(&text, "70.1 -49.5 12.0");
    match GeodatReader::parse_str(&text) {
        Err(SarError::MalformedRecord { line, reason }) => {
            assert_eq!(line, expected_line);
            assert!(reason.contains("corner 3"), "{}", reason);
        }
        other => panic!("expected MalformedRecord, got {:?}", other),
    }
}

#[test]
fn test_unknown_keyword_is_rejected() {
    let text = common::scenario_text().replace("\nascending\n", "\nsideways\n");
    let expected_line = line_of(&text, "sideways");
    match GeodatReader::parse_str(&text) {
        Err(SarError::MalformedRecord { line, .. }) => assert_eq!(line, expected_line),
        other => panic!("expected MalformedRecord, got {:?}", other),
    }
}

#[test]
fn test_truncated_state_vectors() {
    let text = common::scenario_text();
    let lines: Vec<&str> = text.lines().collect();
    // Drop the last velocity line
    let truncated = lines[..lines.len() - 1].join("\n");

    match GeodatReader::parse_str(&truncated) {
        Err(SarError::MalformedRecord { line, reason }) => {
            assert_eq!(line, 0);
            assert!(reason.contains("velocity of state vector 4"), "{}", reason);
        }
        other => panic!("expected MalformedRecord, got {:?}", other),
    }
}

#[test]
fn test_too_few_state_vectors() {
    let text = common::scenario_text().replace("; number of state vectors\n4\n", "; number of state vectors\n1\n");
    assert!(matches!(
        GeodatReader::parse_str(&text),
        Err(SarError::MalformedRecord { .. })
    ));
}

#[test]
fn test_extra_data_after_record() {
    let text = common::scenario_text() + "1.0 2.0 3.0\n";
    assert!(matches!(
        GeodatReader::parse_str(&text),
        Err(SarError::MalformedRecord { .. })
    ));
}

#[test]
fn test_writer_round_trip() {
    common::init_logging();
    let text = common::scenario_text().replace(
        "; Skew offset (s), squint (deg) : 0.000000  0.000000",
        "; Skew offset (s), squint (deg) : 0.125  -0.5",
    ) + "deltaT 0.5\n";
    let record = GeodatReader::parse_str(&text).unwrap();

    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("out").join(GeodatWriter::file_name(&record));
    GeodatWriter::write_file(&path, &record).expect("Failed to write geodat file");
    assert!(path.ends_with("geodat2x4.in"));

    let written = fs::read_to_string(&path).unwrap();
    assert!(written.contains("; Image date: 15 NOV 2018"));
    assert!(written.contains("6378.137"));

    let mut reread = GeodatReader::read_file(&path).expect("Failed to re-read geodat file");
    // Axes pass through kilometres on disk
    assert_abs_diff_eq!(reread.ellipsoid.semi_major, record.ellipsoid.semi_major, epsilon = 1e-6);
    assert_abs_diff_eq!(reread.ellipsoid.semi_minor, record.ellipsoid.semi_minor, epsilon = 1e-6);
    reread.ellipsoid = record.ellipsoid;
    assert_eq!(reread, record);
}

#[test]
fn test_writer_range_header_matches_engine() {
    let record = GeodatReader::parse_str(&common::scenario_text()).unwrap();
    let engine = GeocodingEngine::new(record.clone()).expect("Failed to build engine");

    let text = GeodatWriter::render(&record);
    let header = text
        .lines()
        .find_map(|l| l.strip_prefix("; near/cen/far range : "))
        .expect("range header present");
    let ranges: Vec<f64> = header.split_whitespace().map(|v| v.parse().unwrap()).collect();

    assert_eq!(ranges.len(), 3);
    assert_eq!(ranges[0], engine.near_range_m());
    assert_eq!(ranges[1], record.center_range_m());
    assert_eq!(ranges[2], engine.far_range_m());
    assert!(text.ends_with("\n"));
    assert!(!text.ends_with("\n\n"));
}

#[test]
fn test_single_azimuth_line_is_rejected() {
    let text = common::scenario_text().replace("1000  2000  2  4", "1000  1  2  4");
    let expected_line = line_of(&text, "1000  1  2  4");
    match GeodatReader::parse_str(&text) {
        Err(SarError::MalformedRecord { line, reason }) => {
            assert_eq!(line, expected_line);
            assert!(reason.contains("azimuth lines"), "{}", reason);
        }
        other => panic!("expected MalformedRecord, got {:?}", other),
    }
}
