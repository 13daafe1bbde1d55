//! Engine → host value conversion.

use chrono::Duration;
use prodrisk_core::sentinel::{double_or_unset, int_or_unset};
use prodrisk_core::{
    parse_api_time, Curve, Datatype, LabelledCurve, ProdriskError, ProdriskResult,
    StochasticSeries, TimeSeries, TimeUnit, Value,
};
use tracing::debug;

use crate::engine::{AttributeKey, Engine};
use crate::xyt::get_xyt_attribute;

/// Read one attribute and convert it to its host representation.
///
/// Unset attributes (sentinel scalars, empty arrays, empty curves, series
/// without a start time) and attributes of unrecognised datatypes read as
/// `None`.
pub fn get_attribute_value(
    engine: &dyn Engine,
    key: &AttributeKey<'_>,
    datatype: &Datatype,
) -> ProdriskResult<Option<Value>> {
    debug!(attribute = %key, %datatype, "get attribute");

    let value = match datatype {
        Datatype::Int => int_or_unset(engine.get_int_value(key)?).map(Value::Int),
        Datatype::IntArray => non_empty(engine.get_int_array(key)?).map(Value::IntArray),
        Datatype::Double => double_or_unset(engine.get_double_value(key)?).map(Value::Double),
        Datatype::DoubleArray => non_empty(engine.get_double_array(key)?).map(Value::DoubleArray),
        Datatype::String => Some(Value::String(engine.get_string_value(key)?)),
        Datatype::StringArray => non_empty(engine.get_string_array(key)?).map(Value::StringArray),
        Datatype::Xy => read_xy(engine, key)?.map(Value::Xy),
        Datatype::Sy => read_sy(engine, key)?.map(Value::Sy),
        Datatype::XyArray => read_xy_array(engine, key)?.map(Value::XyArray),
        Datatype::Xyt => {
            let start = parse_api_time(&engine.start_time()?)?;
            let end = parse_api_time(&engine.end_time()?)?;
            get_xyt_attribute(engine, key, start, end)?.map(Value::Xyt)
        }
        Datatype::Txy | Datatype::TxyStochastic => read_txy(engine, key)?,
        Datatype::Unknown(tag) => {
            debug!(attribute = %key, tag = %tag, "unsupported datatype, reading as absent");
            None
        }
    };
    Ok(value)
}

fn non_empty<T>(values: Vec<T>) -> Option<Vec<T>> {
    (!values.is_empty()).then_some(values)
}

fn read_xy(engine: &dyn Engine, key: &AttributeKey<'_>) -> ProdriskResult<Option<Curve>> {
    let reference = engine.get_xy_curve_reference(key)?;
    let x = engine.get_xy_curve_x(key)?;
    let y = engine.get_xy_curve_y(key)?;
    if x.is_empty() {
        return Ok(None);
    }
    Curve::from_xy(reference, &x, &y).map(Some)
}

fn read_sy(engine: &dyn Engine, key: &AttributeKey<'_>) -> ProdriskResult<Option<LabelledCurve>> {
    let s = engine.get_sy_curve_s(key)?;
    let y = engine.get_sy_curve_y(key)?;
    if s.is_empty() {
        return Ok(None);
    }
    LabelledCurve::from_parts(s, &y).map(Some)
}

fn read_xy_array(engine: &dyn Engine, key: &AttributeKey<'_>) -> ProdriskResult<Option<Vec<Curve>>> {
    let references = engine.get_xy_curve_array_references(key)?;
    let n_points = engine.get_xy_curve_array_n_points(key)?;
    let x = engine.get_xy_curve_array_x(key)?;
    let y = engine.get_xy_curve_array_y(key)?;
    if n_points.is_empty() {
        return Ok(None);
    }
    if references.len() != n_points.len() {
        return Err(ProdriskError::Shape(format!(
            "{} curve references but {} point counts",
            references.len(),
            n_points.len()
        )));
    }

    let curves = split_points(&n_points, &x, &y)?
        .into_iter()
        .zip(references)
        .map(|(points, reference)| Curve::new(reference, points))
        .collect();
    Ok(Some(curves))
}

/// Split concatenated x/y arrays into one point list per entry of `counts`.
///
/// `counts = [2, 3]` yields points `[0, 2)` and `[2, 5)`.
pub(crate) fn split_points(
    counts: &[usize],
    x: &[f64],
    y: &[f64],
) -> ProdriskResult<Vec<Vec<(f64, f64)>>> {
    let total: usize = counts.iter().sum();
    if total != x.len() || total != y.len() {
        return Err(ProdriskError::Shape(format!(
            "point counts sum to {total} but got {} x and {} y values",
            x.len(),
            y.len()
        )));
    }

    let mut offset = 0;
    let mut curves = Vec::with_capacity(counts.len());
    for &count in counts {
        let range = offset..offset + count;
        curves.push(
            x[range.clone()]
                .iter()
                .copied()
                .zip(y[range].iter().copied())
                .collect(),
        );
        offset += count;
    }
    Ok(curves)
}

fn read_txy(engine: &dyn Engine, key: &AttributeKey<'_>) -> ProdriskResult<Option<Value>> {
    let start = engine.get_txy_series_start_time(key)?;
    if start.trim().is_empty() {
        return Ok(None);
    }
    let start = parse_api_time(&start)?;
    let t = engine.get_txy_series_t(key)?;
    let y = engine.get_txy_series_y(key)?;

    let unit = engine.time_unit()?;
    if !matches!(TimeUnit::parse(&unit), Ok(TimeUnit::Hour)) {
        return Err(ProdriskError::UnexpectedTimeUnit(unit));
    }
    if t.is_empty() {
        return Ok(None);
    }

    let index = t
        .iter()
        .map(|&hours| {
            Duration::try_hours(hours)
                .and_then(|offset| start.checked_add_signed(offset))
                .ok_or_else(|| {
                    ProdriskError::Shape(format!(
                        "offset of {hours} hours from {start} is out of range"
                    ))
                })
        })
        .collect::<ProdriskResult<Vec<_>>>()?;
    if y.len() > t.len() {
        StochasticSeries::from_column_major(key.attribute, index, &y)
            .map(|series| Some(Value::TxyStochastic(series)))
    } else {
        TimeSeries::from_parts(key.attribute, index, &y).map(|series| Some(Value::Txy(series)))
    }
}
