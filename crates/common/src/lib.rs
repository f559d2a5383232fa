//! Shared runtime helpers: logging setup and filesystem sanity checks.

pub mod utils;
pub mod env;
