//! Command-line front end.

pub mod cli;
pub mod commands;
pub mod context;

pub use cli::{Cli, Command};
pub use context::{AppContext, AppPaths};
