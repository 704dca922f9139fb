//! CLI subcommand implementations.

pub mod csv;
pub mod plot;
pub mod util;
