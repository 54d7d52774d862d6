//! Command-line client for the calendar aggregation API.
//!
//! This crate provides the `calagg` binary: it loads `config.toml`, builds a
//! [`calagg_api::Client`] and prints each response as JSON on stdout.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod secret;

pub use cli::Cli;
pub use error::{CliError, CliResult};
