//! Host → engine value conversion.

use chrono::NaiveDateTime;
use prodrisk_core::{parse_api_time, Curve, Datatype, ProdriskError, ProdriskResult, Value};
use tracing::debug;

use crate::engine::{AttributeKey, Engine};
use crate::horizon::get_time_resolution;

const MILLIS_PER_HOUR: i64 = 3_600_000;
/// Largest distance from the hour grid still accepted (1/3600 hour).
const HOUR_GRID_TOLERANCE_MS: i64 = 1_000;

/// Write one attribute value to the engine.
///
/// The value is coerced to the attribute's datatype: scalars are promoted
/// to one-element arrays, integers are widened to doubles and a constant is
/// broadcast over the horizon for time series. `xyt` attributes and
/// unrecognised datatypes cannot be written and are silently skipped.
pub fn set_attribute(
    engine: &dyn Engine,
    key: &AttributeKey<'_>,
    datatype: &Datatype,
    value: Value,
) -> ProdriskResult<()> {
    debug!(attribute = %key, %datatype, kind = value.kind(), "set attribute");

    match datatype {
        Datatype::Int => engine.set_int_value(key, to_int(datatype, value)?),
        Datatype::IntArray => {
            let values = match value {
                Value::IntArray(values) => values,
                other => vec![to_int(datatype, other)?],
            };
            engine.set_int_array(key, &values)
        }
        Datatype::Double => engine.set_double_value(key, to_double(datatype, value)?),
        Datatype::DoubleArray => {
            let values = match value {
                Value::DoubleArray(values) => values,
                Value::IntArray(values) => values.into_iter().map(|v| v as f64).collect(),
                other => vec![to_double(datatype, other)?],
            };
            engine.set_double_array(key, &values)
        }
        Datatype::String => match value {
            Value::String(text) => engine.set_string_value(key, &text),
            other => Err(mismatch(datatype, &other)),
        },
        Datatype::StringArray => match value {
            Value::StringArray(values) => engine.set_string_array(key, &values),
            Value::String(text) => engine.set_string_array(key, &[text]),
            other => Err(mismatch(datatype, &other)),
        },
        Datatype::Xy => match value {
            Value::Xy(curve) => engine.set_xy_curve(key, curve.reference, &curve.xs(), &curve.ys()),
            other => Err(mismatch(datatype, &other)),
        },
        Datatype::Sy => match value {
            Value::Sy(curve) => engine.set_sy_curve(key, &curve.labels(), &curve.ys()),
            other => Err(mismatch(datatype, &other)),
        },
        Datatype::XyArray => match value {
            Value::XyArray(curves) => write_xy_array(engine, key, &curves),
            Value::Xy(curve) => write_xy_array(engine, key, &[curve]),
            other => Err(mismatch(datatype, &other)),
        },
        Datatype::Xyt => {
            debug!(attribute = %key, "xyt attributes cannot be set, ignoring value");
            Ok(())
        }
        Datatype::Txy | Datatype::TxyStochastic => write_txy(engine, key, datatype, value),
        Datatype::Unknown(tag) => {
            debug!(attribute = %key, tag = %tag, "unsupported datatype, ignoring value");
            Ok(())
        }
    }
}

fn mismatch(datatype: &Datatype, value: &Value) -> ProdriskError {
    ProdriskError::TypeMismatch {
        datatype: datatype.to_string(),
        found: value.kind().to_string(),
    }
}

fn to_int(datatype: &Datatype, value: Value) -> ProdriskResult<i64> {
    match value {
        Value::Int(v) => Ok(v),
        Value::Double(v) if v.is_finite() && v.fract() == 0.0 => Ok(v as i64),
        other => Err(mismatch(datatype, &other)),
    }
}

fn to_double(datatype: &Datatype, value: Value) -> ProdriskResult<f64> {
    match value {
        Value::Double(v) => Ok(v),
        Value::Int(v) => Ok(v as f64),
        other => Err(mismatch(datatype, &other)),
    }
}

fn write_xy_array(engine: &dyn Engine, key: &AttributeKey<'_>, curves: &[Curve]) -> ProdriskResult<()> {
    if curves.is_empty() {
        return Ok(());
    }
    let references: Vec<f64> = curves.iter().map(|c| c.reference).collect();
    let n_points: Vec<usize> = curves.iter().map(Curve::len).collect();
    let x: Vec<f64> = curves.iter().flat_map(|c| c.points.iter().map(|p| p.0)).collect();
    let y: Vec<f64> = curves.iter().flat_map(|c| c.points.iter().map(|p| p.1)).collect();
    engine.set_xy_curve_array(key, &references, &n_points, &x, &y)
}

fn write_txy(
    engine: &dyn Engine,
    key: &AttributeKey<'_>,
    datatype: &Datatype,
    value: Value,
) -> ProdriskResult<()> {
    // Series are anchored at the horizon start, which is forwarded verbatim.
    let start_text = engine.start_time()?;
    let start = parse_api_time(&start_text)?;

    let (index, values) = match value {
        Value::Txy(series) => (series.index(), series.values()),
        Value::TxyStochastic(series) => {
            let flat = series.to_column_major()?;
            (series.index, flat)
        }
        Value::Double(constant) => constant_over_horizon(engine, constant)?,
        Value::Int(constant) => constant_over_horizon(engine, constant as f64)?,
        other => return Err(mismatch(datatype, &other)),
    };

    let offsets = hour_offsets(start, &index)?;
    engine.set_txy_series(key, &start_text, &offsets, &values)
}

/// One value per native time step of the horizon.
fn constant_over_horizon(
    engine: &dyn Engine,
    constant: f64,
) -> ProdriskResult<(Vec<NaiveDateTime>, Vec<f64>)> {
    let grid = get_time_resolution(engine)?.grid();
    let values = vec![constant; grid.len()];
    Ok((grid, values))
}

/// Whole-hour offsets of `index` from `start`.
///
/// Every timestamp must lie on the hour grid (within one second) and, for
/// more than one timestamp, the offsets must be strictly increasing.
pub fn hour_offsets(start: NaiveDateTime, index: &[NaiveDateTime]) -> ProdriskResult<Vec<i64>> {
    if index.is_empty() {
        return Err(ProdriskError::precondition(
            "TXY series must contain at least one timestamp",
        ));
    }

    let mut offsets = Vec::with_capacity(index.len());
    for time in index {
        let millis = (*time - start).num_milliseconds();
        if millis.rem_euclid(MILLIS_PER_HOUR) >= HOUR_GRID_TOLERANCE_MS {
            return Err(ProdriskError::precondition(format!(
                "all time intervals must be given in full hours; {time} is not on the hour grid from {start}"
            )));
        }
        offsets.push(millis.div_euclid(MILLIS_PER_HOUR));
    }

    if offsets.windows(2).any(|pair| pair[1] <= pair[0]) {
        return Err(ProdriskError::precondition(
            "non-positive time interval in TXY series",
        ));
    }
    Ok(offsets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2022, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn hour_aligned_series_converts_to_offsets() {
        let index = [
            start(),
            start() + Duration::minutes(60),
            start() + Duration::hours(49),
        ];
        assert_eq!(hour_offsets(start(), &index).unwrap(), vec![0, 1, 49]);
    }

    #[test]
    fn off_grid_timestamps_are_rejected_not_rounded() {
        for minutes in [15, 30] {
            let index = [start(), start() + Duration::minutes(minutes), start() + Duration::minutes(60)];
            assert!(matches!(
                hour_offsets(start(), &index),
                Err(ProdriskError::Precondition(_))
            ));
        }
    }

    #[test]
    fn sub_second_jitter_is_tolerated() {
        let index = [start() + Duration::hours(2) + Duration::milliseconds(500)];
        assert_eq!(hour_offsets(start(), &index).unwrap(), vec![2]);
    }

    #[test]
    fn repeated_or_reversed_timestamps_are_rejected() {
        let repeated = [start(), start() + Duration::hours(1), start() + Duration::hours(1)];
        assert!(hour_offsets(start(), &repeated).is_err());
        let reversed = [start() + Duration::hours(2), start()];
        assert!(hour_offsets(start(), &reversed).is_err());
    }

    #[test]
    fn timestamps_before_start_give_negative_offsets() {
        let index = [start() - Duration::hours(3), start()];
        assert_eq!(hour_offsets(start(), &index).unwrap(), vec![-3, 0]);
    }

    #[test]
    fn empty_series_is_rejected() {
        assert!(hour_offsets(start(), &[]).is_err());
    }
}
