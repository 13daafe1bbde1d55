//! Retrieval of time-windowed curve series (`xyt` attributes).
//!
//! The engine stores one xy curve per time step. A request covers an
//! inclusive `[start, end]` window which is mapped to step indices and
//! clamped into the optimization horizon before lookup. The horizon end is
//! exclusive, so the last retrievable step is one before it.

use chrono::{Duration, NaiveDateTime};
use prodrisk_core::{
    format_api_time, parse_api_time, ProdriskError, ProdriskResult, TimeUnit, TimedCurve,
};
use tracing::{debug, warn};

use crate::engine::{AttributeKey, Engine};
use crate::reader::split_points;

/// Inclusive range of step indices to retrieve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XytWindow {
    pub min_index: i64,
    pub max_index: i64,
}

impl XytWindow {
    /// Map a requested `[start, end]` window onto step indices of length
    /// `step`, clamped to `[0, steps_in_horizon - 1]`.
    pub fn resolve(
        start: NaiveDateTime,
        end: NaiveDateTime,
        horizon_start: NaiveDateTime,
        horizon_end: NaiveDateTime,
        step: Duration,
    ) -> Self {
        let max_possible_index = steps_between(horizon_start, horizon_end, step) - 1;
        Self {
            min_index: steps_between(horizon_start, start, step).max(0),
            max_index: steps_between(horizon_start, end, step).min(max_possible_index),
        }
    }

    pub fn contains(&self, index: i64) -> bool {
        self.min_index <= index && index <= self.max_index
    }

    pub fn is_empty(&self) -> bool {
        self.max_index < self.min_index
    }
}

/// Whole steps from `from` to `to`, rounded towards negative infinity.
fn steps_between(from: NaiveDateTime, to: NaiveDateTime, step: Duration) -> i64 {
    (to - from)
        .num_milliseconds()
        .div_euclid(step.num_milliseconds().max(1))
}

/// Length of one xyt time step: `resolution` time units.
pub fn step_duration(resolution: f64, unit: TimeUnit) -> ProdriskResult<Duration> {
    let millis = (resolution * (unit.seconds() * 1000) as f64).round() as i64;
    if millis <= 0 {
        return Err(ProdriskError::Engine(format!(
            "non-positive time resolution {resolution} {unit}"
        )));
    }
    Ok(Duration::milliseconds(millis))
}

/// Time step length used for xyt series: the first resolution entry.
pub(crate) fn xyt_step(engine: &dyn Engine) -> ProdriskResult<(TimeUnit, Duration)> {
    let unit = TimeUnit::parse(&engine.time_unit()?)?;
    let resolution = engine
        .time_resolution_y()?
        .first()
        .copied()
        .ok_or_else(|| ProdriskError::Engine("engine reported no time resolution".into()))?;
    Ok((unit, step_duration(resolution, unit)?))
}

/// Read the xyt curves of one attribute within `[start, end]`.
///
/// Returns `None` when no time step in the window holds a curve.
pub fn get_xyt_attribute(
    engine: &dyn Engine,
    key: &AttributeKey<'_>,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> ProdriskResult<Option<Vec<TimedCurve>>> {
    let (unit, step) = xyt_step(engine)?;
    if unit == TimeUnit::Second {
        warn!(
            attribute = %key,
            "xyt series are not supported when the time unit is \"second\"; \
             this will likely not work as intended"
        );
    }

    let horizon_start = parse_api_time(&engine.start_time()?)?;
    let horizon_end = parse_api_time(&engine.end_time()?)?;
    let window = XytWindow::resolve(start, end, horizon_start, horizon_end, step);
    debug!(
        attribute = %key,
        min_index = window.min_index,
        max_index = window.max_index,
        "resolved xyt window"
    );

    let times: Vec<NaiveDateTime> = engine
        .get_xyt_curve_times(key)?
        .into_iter()
        .filter(|index| window.contains(*index))
        .map(|index| horizon_start + Duration::milliseconds(step.num_milliseconds() * index))
        .collect();

    let (start_text, end_text) = (format_api_time(&start), format_api_time(&end));
    let x = engine.get_xyt_curve_x(key, &start_text, &end_text)?;
    let y = engine.get_xyt_curve_y(key, &start_text, &end_text)?;
    let n = engine.get_xyt_curve_n(key, &start_text, &end_text)?;
    if n.is_empty() {
        return Ok(None);
    }

    let curves: Vec<TimedCurve> = split_points(&n, &x, &y)?
        .into_iter()
        .zip(times)
        .map(|(points, time)| TimedCurve { time, points })
        .collect();

    Ok((!curves.is_empty()).then_some(curves))
}
