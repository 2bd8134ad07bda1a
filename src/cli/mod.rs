//! Command-line interface.

mod args;

pub use args::{BuildArgs, CategoryArg, Cli, Commands};
