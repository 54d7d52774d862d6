//! Core types: wire time values, tracing setup

pub mod time;
pub mod tracing;

pub use self::time::{EventTime, to_utc_iso8601};
pub use self::tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
