//! The engine's optimization horizon and its native time grid.

use chrono::{Duration, NaiveDateTime};
use prodrisk_core::{parse_api_time, ProdriskError, ProdriskResult, TimeUnit};

use crate::engine::Engine;

/// Horizon and time resolution as configured in the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeResolution {
    pub start: NaiveDateTime,
    /// Exclusive end of the horizon.
    pub end: NaiveDateTime,
    pub unit: TimeUnit,
    /// `(breakpoint, step)` pairs in time units; each step length applies
    /// from its breakpoint up to the next one.
    pub breakpoints: Vec<(i64, f64)>,
}

/// Read the horizon and time resolution from the engine.
pub fn get_time_resolution(engine: &dyn Engine) -> ProdriskResult<TimeResolution> {
    let start = parse_api_time(&engine.start_time()?)?;
    let end = parse_api_time(&engine.end_time()?)?;
    let unit = TimeUnit::parse(&engine.time_unit()?)?;
    let t = engine.time_resolution_t()?;
    let y = engine.time_resolution_y()?;
    if t.len() != y.len() {
        return Err(ProdriskError::Shape(format!(
            "time resolution has {} breakpoints but {} step lengths",
            t.len(),
            y.len()
        )));
    }
    Ok(TimeResolution {
        start,
        end,
        unit,
        breakpoints: t.into_iter().zip(y).collect(),
    })
}

impl TimeResolution {
    /// Horizon length in whole time units.
    pub fn horizon_units(&self) -> i64 {
        let unit_ms = self.unit.seconds() * 1000;
        (self.end - self.start).num_milliseconds().div_euclid(unit_ms)
    }

    /// Offsets (in time units) of every native time step in `[start, end)`.
    pub fn grid_offsets(&self) -> Vec<f64> {
        let total = self.horizon_units() as f64;
        let mut offsets = Vec::new();
        for (i, &(breakpoint, step)) in self.breakpoints.iter().enumerate() {
            if step <= 0.0 {
                continue;
            }
            let segment_end = self
                .breakpoints
                .get(i + 1)
                .map(|&(next, _)| next as f64)
                .unwrap_or(total)
                .min(total);
            let mut offset = breakpoint as f64;
            while offset < segment_end {
                offsets.push(offset);
                offset += step;
            }
        }
        offsets
    }

    /// Timestamps of every native time step in `[start, end)`.
    pub fn grid(&self) -> Vec<NaiveDateTime> {
        let unit_ms = (self.unit.seconds() * 1000) as f64;
        self.grid_offsets()
            .into_iter()
            .map(|offset| self.start + Duration::milliseconds((offset * unit_ms).round() as i64))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn resolution(unit: TimeUnit, breakpoints: Vec<(i64, f64)>) -> TimeResolution {
        let day = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
        TimeResolution {
            start: day.and_hms_opt(0, 0, 0).unwrap(),
            end: day.and_hms_opt(3, 0, 0).unwrap(),
            unit,
            breakpoints,
        }
    }

    #[test]
    fn grid_follows_changing_step_lengths() {
        let res = resolution(TimeUnit::Minute, vec![(0, 15.0), (60, 60.0)]);
        assert_eq!(res.horizon_units(), 180);
        assert_eq!(
            res.grid_offsets(),
            vec![0.0, 15.0, 30.0, 45.0, 60.0, 120.0]
        );
        let grid = res.grid();
        assert_eq!(grid.len(), 6);
        assert_eq!(grid[5] - grid[0], Duration::minutes(120));
    }

    #[test]
    fn hourly_grid_excludes_horizon_end() {
        let res = resolution(TimeUnit::Hour, vec![(0, 1.0)]);
        assert_eq!(res.grid_offsets(), vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn zero_step_segments_are_skipped() {
        let res = resolution(TimeUnit::Hour, vec![(0, 0.0), (1, 1.0)]);
        assert_eq!(res.grid_offsets(), vec![1.0, 2.0]);
    }
}
