use chrono::{Duration, NaiveDate};
use prodrisk_core::{Curve, TimeSeries};
use prodrisk_ts::{curve_to_frame, read_frame, series_from_frame, series_to_frame, write_frame};
use tempfile::tempdir;

#[test]
fn series_survives_a_csv_round_trip() {
    let start = NaiveDate::from_ymd_opt(2022, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let series = TimeSeries::new(
        "energy_price",
        vec![(start, 30.0), (start + Duration::hours(24), 35.5)],
    );

    let dir = tempdir().unwrap();
    let path = dir.path().join("out").join("price.csv");
    let mut df = series_to_frame(&series).unwrap();
    write_frame(&mut df, &path).unwrap();

    let read = read_frame(&path).unwrap();
    assert_eq!(read.height(), 2);
    let back = series_from_frame(&read, "time", "energy_price").unwrap();
    assert_eq!(back, series);
}

#[test]
fn curve_frame_keeps_point_order() {
    let curve = Curve::new(0.0, vec![(2.0, 1.0), (0.0, 3.0)]);
    let df = curve_to_frame(&curve).unwrap();
    let xs: Vec<Option<f64>> = df.column("x").unwrap().f64().unwrap().into_iter().collect();
    assert_eq!(xs, vec![Some(2.0), Some(0.0)]);
}

#[test]
fn missing_file_reports_path() {
    let err = read_frame("/nonexistent/prices.csv").unwrap_err();
    assert!(format!("{err:#}").contains("/nonexistent/prices.csv"));
}
