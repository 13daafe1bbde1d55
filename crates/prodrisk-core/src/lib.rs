//! # prodrisk-core: value model for the ProdRisk engine facade
//!
//! The engine exposes its data as flat, type-tagged arrays. This crate holds
//! the host-side shapes those arrays are marshalled into, the closed set of
//! datatype tags, the engine's "not set" sentinels, engine time strings and
//! the error type shared by the other crates in the workspace.
//!
//! | Tag | Host value |
//! |-----|------------|
//! | `int`, `double`, `string` | scalar |
//! | `int_array`, `double_array`, `string_array` | `Vec` |
//! | `xy` | [`Curve`] |
//! | `xy_array` | `Vec<Curve>` |
//! | `sy` | [`LabelledCurve`] |
//! | `xyt` | `Vec<TimedCurve>` |
//! | `txy` | [`TimeSeries`] |
//! | `txy_stochastic` | [`StochasticSeries`] |

pub mod datatype;
pub mod error;
pub mod sentinel;
pub mod time;
pub mod value;

pub use datatype::Datatype;
pub use error::{ProdriskError, ProdriskResult};
pub use time::{format_api_time, parse_api_time, TimeUnit};
pub use value::{
    Curve, LabelledCurve, StochasticSeries, TimeSeries, TimedCurve, Value, XyRecord,
};
