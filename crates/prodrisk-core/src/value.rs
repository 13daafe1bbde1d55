//! Host-side representation of attribute values.
//!
//! Values never carry the engine's "not set" sentinels; an absent value is
//! `Option::None` around a [`Value`].

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{ProdriskError, ProdriskResult};

/// Ordered (x, y) points tagged with a numeric reference.
///
/// The engine's point order is kept as delivered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    pub reference: f64,
    pub points: Vec<(f64, f64)>,
}

impl Curve {
    pub fn new(reference: f64, points: Vec<(f64, f64)>) -> Self {
        Self { reference, points }
    }

    /// Build a curve from parallel x and y arrays.
    pub fn from_xy(reference: f64, x: &[f64], y: &[f64]) -> ProdriskResult<Self> {
        if x.len() != y.len() {
            return Err(ProdriskError::Shape(format!(
                "curve has {} x values but {} y values",
                x.len(),
                y.len()
            )));
        }
        Ok(Self::new(reference, zip_points(x, y)))
    }

    pub fn xs(&self) -> Vec<f64> {
        self.points.iter().map(|(x, _)| *x).collect()
    }

    pub fn ys(&self) -> Vec<f64> {
        self.points.iter().map(|(_, y)| *y).collect()
    }

    /// The y value stored for exactly this x, if any.
    pub fn y_at(&self, x: f64) -> Option<f64> {
        self.points.iter().find(|(px, _)| *px == x).map(|(_, y)| *y)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Structured `{ref, xy: [[x, y], ...]}` form of a curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XyRecord {
    #[serde(rename = "ref")]
    pub reference: f64,
    pub xy: Vec<[f64; 2]>,
}

impl From<XyRecord> for Curve {
    fn from(record: XyRecord) -> Self {
        Curve::new(
            record.reference,
            record.xy.into_iter().map(|[x, y]| (x, y)).collect(),
        )
    }
}

impl From<&Curve> for XyRecord {
    fn from(curve: &Curve) -> Self {
        XyRecord {
            reference: curve.reference,
            xy: curve.points.iter().map(|&(x, y)| [x, y]).collect(),
        }
    }
}

/// Curve whose first axis is a string label (`sy` attributes).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LabelledCurve {
    pub points: Vec<(String, f64)>,
}

impl LabelledCurve {
    pub fn from_parts(labels: Vec<String>, y: &[f64]) -> ProdriskResult<Self> {
        if labels.len() != y.len() {
            return Err(ProdriskError::Shape(format!(
                "curve has {} labels but {} y values",
                labels.len(),
                y.len()
            )));
        }
        Ok(Self {
            points: labels.into_iter().zip(y.iter().copied()).collect(),
        })
    }

    pub fn labels(&self) -> Vec<String> {
        self.points.iter().map(|(s, _)| s.clone()).collect()
    }

    pub fn ys(&self) -> Vec<f64> {
        self.points.iter().map(|(_, y)| *y).collect()
    }
}

/// xy curve valid for one time step of the horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedCurve {
    pub time: NaiveDateTime,
    pub points: Vec<(f64, f64)>,
}

/// Time series with one value per timestamp.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TimeSeries {
    pub name: String,
    pub points: Vec<(NaiveDateTime, f64)>,
}

impl TimeSeries {
    pub fn new(name: impl Into<String>, points: Vec<(NaiveDateTime, f64)>) -> Self {
        Self {
            name: name.into(),
            points,
        }
    }

    pub fn from_parts(
        name: impl Into<String>,
        index: Vec<NaiveDateTime>,
        values: &[f64],
    ) -> ProdriskResult<Self> {
        if index.len() != values.len() {
            return Err(ProdriskError::Shape(format!(
                "series has {} timestamps but {} values",
                index.len(),
                values.len()
            )));
        }
        Ok(Self::new(
            name,
            index.into_iter().zip(values.iter().copied()).collect(),
        ))
    }

    pub fn index(&self) -> Vec<NaiveDateTime> {
        self.points.iter().map(|(t, _)| *t).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|(_, v)| *v).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Time series with one row per timestamp and one column per scenario.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StochasticSeries {
    pub name: String,
    pub index: Vec<NaiveDateTime>,
    pub rows: Vec<Vec<f64>>,
}

impl StochasticSeries {
    pub fn new(name: impl Into<String>, index: Vec<NaiveDateTime>, rows: Vec<Vec<f64>>) -> Self {
        Self {
            name: name.into(),
            index,
            rows,
        }
    }

    /// Rebuild rows from the engine's flat layout, where all timestamps of
    /// scenario 0 come first, then scenario 1, and so on.
    pub fn from_column_major(
        name: impl Into<String>,
        index: Vec<NaiveDateTime>,
        values: &[f64],
    ) -> ProdriskResult<Self> {
        let n_times = index.len();
        if n_times == 0 || values.len() % n_times != 0 {
            return Err(ProdriskError::Shape(format!(
                "{} values cannot be split over {} timestamps",
                values.len(),
                n_times
            )));
        }
        let n_scenarios = values.len() / n_times;
        let rows = (0..n_times)
            .map(|t| (0..n_scenarios).map(|s| values[s * n_times + t]).collect())
            .collect();
        Ok(Self::new(name, index, rows))
    }

    /// Flatten to the engine's scenario-by-scenario layout.
    ///
    /// Every row must have the same number of scenarios.
    pub fn to_column_major(&self) -> ProdriskResult<Vec<f64>> {
        if self.rows.len() != self.index.len() {
            return Err(ProdriskError::Shape(format!(
                "series has {} timestamps but {} rows",
                self.index.len(),
                self.rows.len()
            )));
        }
        let width = self.n_scenarios();
        if let Some(row) = self.rows.iter().position(|row| row.len() != width) {
            return Err(ProdriskError::precondition(format!(
                "row {row} has {} scenarios, expected {width}",
                self.rows[row].len()
            )));
        }
        let mut flat = Vec::with_capacity(width * self.rows.len());
        for scenario in 0..width {
            flat.extend(self.rows.iter().map(|row| row[scenario]));
        }
        Ok(flat)
    }

    pub fn n_scenarios(&self) -> usize {
        self.rows.first().map(Vec::len).unwrap_or(0)
    }

    /// Values of one scenario across all timestamps.
    pub fn scenario(&self, scenario: usize) -> Option<Vec<f64>> {
        self.rows
            .iter()
            .map(|row| row.get(scenario).copied())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

impl From<TimeSeries> for StochasticSeries {
    fn from(series: TimeSeries) -> Self {
        let (index, rows) = series.points.into_iter().map(|(t, v)| (t, vec![v])).unzip();
        StochasticSeries::new(series.name, index, rows)
    }
}

/// Attribute value in host representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    Int(i64),
    IntArray(Vec<i64>),
    Double(f64),
    DoubleArray(Vec<f64>),
    String(String),
    StringArray(Vec<String>),
    Xy(Curve),
    XyArray(Vec<Curve>),
    Sy(LabelledCurve),
    Xyt(Vec<TimedCurve>),
    Txy(TimeSeries),
    TxyStochastic(StochasticSeries),
}

impl Value {
    /// Short name of the value kind, used in type mismatch errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::IntArray(_) => "int_array",
            Value::Double(_) => "double",
            Value::DoubleArray(_) => "double_array",
            Value::String(_) => "string",
            Value::StringArray(_) => "string_array",
            Value::Xy(_) => "xy",
            Value::XyArray(_) => "xy_array",
            Value::Sy(_) => "sy",
            Value::Xyt(_) => "xyt",
            Value::Txy(_) => "txy",
            Value::TxyStochastic(_) => "txy_stochastic",
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_curve(&self) -> Option<&Curve> {
        match self {
            Value::Xy(curve) => Some(curve),
            _ => None,
        }
    }

    pub fn as_curves(&self) -> Option<&[Curve]> {
        match self {
            Value::XyArray(curves) => Some(curves),
            _ => None,
        }
    }

    pub fn as_timed_curves(&self) -> Option<&[TimedCurve]> {
        match self {
            Value::Xyt(curves) => Some(curves),
            _ => None,
        }
    }

    pub fn as_series(&self) -> Option<&TimeSeries> {
        match self {
            Value::Txy(series) => Some(series),
            _ => None,
        }
    }

    pub fn as_stochastic(&self) -> Option<&StochasticSeries> {
        match self {
            Value::TxyStochastic(series) => Some(series),
            _ => None,
        }
    }
}

pub(crate) fn zip_points(x: &[f64], y: &[f64]) -> Vec<(f64, f64)> {
    x.iter().copied().zip(y.iter().copied()).collect()
}

macro_rules! value_from {
    ($($source:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$source> for Value {
                fn from(value: $source) -> Self {
                    Value::$variant(value.into())
                }
            }
        )*
    };
}

value_from! {
    i64 => Int,
    i32 => Int,
    f64 => Double,
    String => String,
    &str => String,
    Vec<i64> => IntArray,
    Vec<f64> => DoubleArray,
    Vec<String> => StringArray,
    Curve => Xy,
    XyRecord => Xy,
    Vec<Curve> => XyArray,
    LabelledCurve => Sy,
    Vec<TimedCurve> => Xyt,
    TimeSeries => Txy,
    StochasticSeries => TxyStochastic,
}

impl From<Vec<XyRecord>> for Value {
    fn from(records: Vec<XyRecord>) -> Self {
        Value::XyArray(records.into_iter().map(Curve::from).collect())
    }
}
