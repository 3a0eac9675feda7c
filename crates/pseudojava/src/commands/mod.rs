//! CLI command implementations - one command per file.

pub mod check;
pub mod compile;
