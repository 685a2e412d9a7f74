//! Structured logging initialisation.
//!
//! [`LogFormat::Human`] prints readable lines for development and
//! [`LogFormat::Json`] prints newline-delimited JSON for log collectors.
//! `RUST_LOG` overrides the caller-supplied level when it is set.

use std::fmt as stdfmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Selects the output format for structured logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Human,
    Json,
}

impl stdfmt::Display for LogFormat {
    fn fmt(&self, f: &mut stdfmt::Formatter<'_>) -> stdfmt::Result {
        match self {
            LogFormat::Human => write!(f, "human"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "human" | "text" => Ok(LogFormat::Human),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format: {other}")),
        }
    }
}

fn filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Install the global tracing subscriber.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init_logging(format: LogFormat, level: &str) {
    if let Err(e) = try_init_logging(format, level) {
        panic!("failed to initialise logging: {e}");
    }
}

/// Like [`init_logging`], but reports an already-installed subscriber as an
/// error instead of panicking. Useful in tests and embedding hosts.
pub fn try_init_logging(format: LogFormat, level: &str) -> Result<(), TryInitError> {
    match format {
        LogFormat::Human => tracing_subscriber::registry()
            .with(filter(level))
            .with(fmt::layer().with_target(true).with_thread_ids(true))
            .try_init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter(level))
            .with(fmt::layer().json().with_target(true).with_thread_ids(true))
            .try_init(),
    }
}
