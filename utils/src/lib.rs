//! Shared utilities for the satoshi-bound asset wallet.

pub mod logging;
pub mod time;

pub use logging::{init_logging, try_init_logging, LogFormat};
pub use time::{format_duration, now_millis};
