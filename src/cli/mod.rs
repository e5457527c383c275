//! Command-line interface of the `infection-clusters` binary

pub mod args;

pub use args::{Args, Command, USAGE, help_text};
