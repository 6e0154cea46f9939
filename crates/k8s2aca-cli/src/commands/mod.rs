//! CLI commands

pub mod convert;
pub mod validate;
