//! # garden-cli
//!
//! Argument parsing and upload loading for the `garden` binary.

pub mod cli;
pub mod upload;

pub use cli::{Cli, Commands};
pub use upload::{guess_content_type, read_upload};
