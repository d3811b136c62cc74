//! Core runtime logic for ferrule.
//!
//! This module contains the non-UI pieces used by the application:
//! - [fm]: directory listing, sorting and filtering.
//! - [macros]: `%`-macro expansion and command-line tokenizing.
//! - [spawn]: launching external commands, in the background or with the screen suspended.
//! - [worker]: the file-operation worker and its tasks.
//! - [message]: the messenger channel and the transient message line.
//! - [terminal]: terminal setup/teardown and the input producer.
//! - [error]: the crate error type.

pub mod error;
pub mod fm;
pub mod macros;
pub mod message;
pub mod spawn;
pub mod terminal;
pub mod worker;

pub use error::{Error, Result};
pub use fm::{FileEntry, browse_dir};
