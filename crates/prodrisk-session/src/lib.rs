//! # prodrisk-session: engine session lifecycle
//!
//! [`ProdriskSession`] owns one engine instance. Opening a session loads the
//! logging setup, exports the license environment, creates the engine
//! through a caller-supplied factory and builds the model snapshot.

pub mod config;
pub mod logging;
mod session;

pub use config::{LicenseConfig, LoggingConfig, SessionConfig, SolverConfig};
pub use session::{camel_to_snake, session_id_at, OptimizationPeriod, ProdriskSession};
