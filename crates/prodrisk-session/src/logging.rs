//! Log output for a session.

use std::fs::OpenOptions;
use std::io;
use std::sync::Mutex;

use prodrisk_core::ProdriskResult;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Level used when `RUST_LOG` is not set.
pub fn default_level(config: &LoggingConfig) -> LevelFilter {
    if config.suppress_log {
        LevelFilter::OFF
    } else if config.silent {
        LevelFilter::WARN
    } else {
        LevelFilter::INFO
    }
}

/// Filter for the session subscriber.
///
/// `RUST_LOG` is honoured unless output is suppressed. Attribute reads are
/// logged at debug level only for sessions that are neither silent nor
/// suppressed.
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    let level = default_level(config);
    if level == LevelFilter::OFF {
        return EnvFilter::builder()
            .with_default_directive(LevelFilter::OFF.into())
            .parse_lossy("");
    }
    let mut filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    if config.log_gets && !config.silent {
        if let Ok(directive) = "prodrisk_api::reader=debug".parse() {
            filter = filter.add_directive(directive);
        }
    }
    filter
}

/// Install the global subscriber. Returns `false` when one was already
/// installed, in which case the existing one stays in place.
pub fn init(config: &LoggingConfig) -> ProdriskResult<bool> {
    let builder = tracing_subscriber::fmt().with_env_filter(env_filter(config));
    let installed = match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
                .is_ok()
        }
        None => builder.with_writer(io::stderr).try_init().is_ok(),
    };
    Ok(installed)
}
