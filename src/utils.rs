//! Miscellaneous utility functions for ferrule.
//!
//! This module holds the [helpers] submodule, which provides commonly used utilities such as:
//! - Shell quoting for macro expansion
//! - Home directory expansion and abbreviation
//! - `$PATH` command search for the shell highlighter
//! - Color parsing
//!
//! [cli] parses the command line and [logging] installs the tracing subscriber.

pub mod cli;
pub mod helpers;
pub mod logging;

pub use helpers::{
    copy_recursive, expand_home_path, extension, get_home, last_segment, parse_color, quote,
    remove_ext, resolve_path, search_commands, shorten_home_path,
};
