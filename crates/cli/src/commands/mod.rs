//! CLI subcommands.

pub mod geocode;
