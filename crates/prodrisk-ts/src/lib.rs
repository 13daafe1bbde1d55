//! Tabular views of attribute values.
//!
//! Curves and series convert to polars frames with a `time` column in unix
//! seconds (Int64) where a time axis exists. Frames are read and written as
//! CSV.

use std::fs::{self, File};
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, NaiveDateTime};
use polars::prelude::*;
use prodrisk_core::{Curve, StochasticSeries, TimeSeries, TimedCurve};

pub const TIME_COLUMN: &str = "time";

/// Keep only the first of each run of equal consecutive values. The first
/// point is always kept.
pub fn remove_consecutive_duplicates(series: &TimeSeries) -> TimeSeries {
    let mut points: Vec<(NaiveDateTime, f64)> = Vec::with_capacity(series.len());
    for &(time, value) in &series.points {
        if points.last().map_or(true, |&(_, previous)| previous != value) {
            points.push((time, value));
        }
    }
    TimeSeries::new(series.name.clone(), points)
}

/// Keep only rows where at least one scenario differs from the previous row.
pub fn remove_consecutive_duplicate_rows(series: &StochasticSeries) -> StochasticSeries {
    let mut index = Vec::new();
    let mut rows: Vec<Vec<f64>> = Vec::new();
    for (time, row) in series.index.iter().zip(&series.rows) {
        if rows.last().map_or(true, |previous| previous != row) {
            index.push(*time);
            rows.push(row.clone());
        }
    }
    StochasticSeries::new(series.name.clone(), index, rows)
}

fn unix_seconds(times: impl Iterator<Item = NaiveDateTime>) -> Vec<i64> {
    times.map(|t| t.and_utc().timestamp()).collect()
}

/// Columns `x` and `y`.
pub fn curve_to_frame(curve: &Curve) -> Result<DataFrame> {
    DataFrame::new(vec![
        Series::new("x", curve.xs()),
        Series::new("y", curve.ys()),
    ])
    .context("building curve frame")
}

/// Columns `time` and the series name.
pub fn series_to_frame(series: &TimeSeries) -> Result<DataFrame> {
    let name = if series.name.is_empty() { "value" } else { series.name.as_str() };
    DataFrame::new(vec![
        Series::new(TIME_COLUMN, unix_seconds(series.index().into_iter())),
        Series::new(name, series.values()),
    ])
    .context("building series frame")
}

/// Column `time` followed by one `scenario_<n>` column per scenario.
pub fn stochastic_to_frame(series: &StochasticSeries) -> Result<DataFrame> {
    let mut columns = vec![Series::new(
        TIME_COLUMN,
        unix_seconds(series.index.iter().copied()),
    )];
    for scenario in 0..series.n_scenarios() {
        let values = series
            .scenario(scenario)
            .ok_or_else(|| anyhow!("scenario {scenario} has missing values"))?;
        columns.push(Series::new(&format!("scenario_{scenario}"), values));
    }
    DataFrame::new(columns).context("building stochastic frame")
}

/// Long format: one row per curve point with columns `time`, `x` and `y`.
pub fn xyt_to_frame(curves: &[TimedCurve]) -> Result<DataFrame> {
    let mut times = Vec::new();
    let mut xs = Vec::new();
    let mut ys = Vec::new();
    for curve in curves {
        let time = curve.time.and_utc().timestamp();
        for &(x, y) in &curve.points {
            times.push(time);
            xs.push(x);
            ys.push(y);
        }
    }
    DataFrame::new(vec![
        Series::new(TIME_COLUMN, times),
        Series::new("x", xs),
        Series::new("y", ys),
    ])
    .context("building xyt frame")
}

/// Build a series from a unix-seconds time column and a value column.
/// Rows with a null time or value are skipped.
pub fn series_from_frame(df: &DataFrame, time_column: &str, value_column: &str) -> Result<TimeSeries> {
    let times = df
        .column(time_column)?
        .cast(&DataType::Int64)
        .context("casting time column to Int64")?;
    let values = df
        .column(value_column)?
        .cast(&DataType::Float64)
        .context("casting value column to Float64")?;

    let mut points = Vec::with_capacity(df.height());
    for (time, value) in times.i64()?.into_iter().zip(values.f64()?.into_iter()) {
        if let (Some(time), Some(value)) = (time, value) {
            let time = DateTime::from_timestamp(time, 0)
                .ok_or_else(|| anyhow!("timestamp {time} out of range"))?
                .naive_utc();
            points.push((time, value));
        }
    }
    Ok(TimeSeries::new(value_column, points))
}

pub fn read_frame(path: impl AsRef<Path>) -> Result<DataFrame> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    CsvReader::new(file)
        .has_header(true)
        .finish()
        .with_context(|| format!("reading CSV file {}", path.display()))
}

pub fn write_frame(df: &mut DataFrame, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    CsvWriter::new(&mut file)
        .finish(df)
        .with_context(|| format!("writing CSV file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn hour(h: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2022, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + Duration::hours(h)
    }

    #[test]
    fn consecutive_duplicates_collapse_to_first() {
        let series = TimeSeries::new(
            "price",
            vec![
                (hour(0), 1.0),
                (hour(1), 1.0),
                (hour(2), 2.0),
                (hour(3), 1.0),
                (hour(4), 1.0),
            ],
        );
        let compressed = remove_consecutive_duplicates(&series);
        assert_eq!(
            compressed.points,
            vec![(hour(0), 1.0), (hour(2), 2.0), (hour(3), 1.0)]
        );
    }

    #[test]
    fn rows_are_kept_when_any_scenario_changes() {
        let series = StochasticSeries::new(
            "inflow",
            vec![hour(0), hour(1), hour(2)],
            vec![vec![1.0, 2.0], vec![1.0, 2.0], vec![1.0, 3.0]],
        );
        let compressed = remove_consecutive_duplicate_rows(&series);
        assert_eq!(compressed.index, vec![hour(0), hour(2)]);
        assert_eq!(compressed.rows, vec![vec![1.0, 2.0], vec![1.0, 3.0]]);
    }

    #[test]
    fn stochastic_frame_has_a_column_per_scenario() {
        let series = StochasticSeries::new(
            "inflow",
            vec![hour(0), hour(1)],
            vec![vec![1.0, 10.0], vec![2.0, 20.0]],
        );
        let df = stochastic_to_frame(&series).unwrap();
        assert_eq!(df.get_column_names(), vec!["time", "scenario_0", "scenario_1"]);
        let second = df.column("scenario_1").unwrap().f64().unwrap();
        assert_eq!(second.get(1), Some(20.0));
    }

    #[test]
    fn xyt_frame_is_long_format() {
        let curves = vec![
            TimedCurve {
                time: hour(0),
                points: vec![(0.0, 1.0), (1.0, 2.0)],
            },
            TimedCurve {
                time: hour(1),
                points: vec![(0.0, 3.0)],
            },
        ];
        let df = xyt_to_frame(&curves).unwrap();
        assert_eq!(df.height(), 3);
        let times = df.column("time").unwrap().i64().unwrap();
        assert_eq!(times.get(2), Some(hour(1).and_utc().timestamp()));
    }

    #[test]
    fn series_frame_converts_back() {
        let series = TimeSeries::new("price", vec![(hour(0), 30.0), (hour(5), 31.5)]);
        let df = series_to_frame(&series).unwrap();
        let back = series_from_frame(&df, "time", "price").unwrap();
        assert_eq!(back, series);
    }
}
