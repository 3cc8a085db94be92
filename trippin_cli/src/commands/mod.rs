//! CLI subcommand implementations, one per demonstration.

pub mod batch;
pub mod people;
pub mod trips;
