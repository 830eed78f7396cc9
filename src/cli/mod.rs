//! Command-line front end for the `flatpages` binary.

mod commands;
pub mod handlers;

pub use commands::{Cli, Commands};
