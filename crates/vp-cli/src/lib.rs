//! Voice channel presence CLI library.
//!
//! This crate provides the CLI interface, the relay message source, and the
//! CSV and timeline sinks around `vp-core`.

mod cli;
pub mod commands;
mod config;
pub mod source;

pub use cli::{Cli, Commands, QueryArgs};
pub use config::{Config, DEFAULT_RELAY_AUTHOR_ID};
