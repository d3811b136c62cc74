//! Error type shared by the ferrule engine.
//!
//! Every fallible engine operation returns [Result]. None of these errors are fatal to the
//! interaction loop: they are reported through the message surface and the loop keeps going.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Io(#[from] io::Error),

    #[error("no {0} launcher is configured")]
    EmptyLauncher(&'static str),

    #[error("{command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("invalid regexp: {0}")]
    Regex(#[from] regex::Error),

    #[error("invalid mode bits `{0}' (octal expected)")]
    InvalidMode(String),

    #[error("input must be like `regexp/replacement'")]
    MissingSeparator,

    #[error("{}: encloses the current directory", .0.display())]
    EnclosingDir(PathBuf),

    #[error("shortcut `{0}' not found")]
    ShortcutNotFound(String),

    #[error("config: {0}")]
    Config(#[from] toml::de::Error),
}

impl Error {
    pub(crate) fn spawn(command: impl Into<String>, source: io::Error) -> Self {
        Error::Spawn {
            command: command.into(),
            source,
        }
    }
}

/// Parses an octal permission string such as `755` or `0644`.
pub(crate) fn parse_mode(text: &str) -> Result<u32> {
    let trimmed = text.trim();
    u32::from_str_radix(trimmed, 8)
        .ok()
        .filter(|bits| *bits <= 0o7777)
        .ok_or_else(|| Error::InvalidMode(trimmed.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_mode_accepts_octal() -> Result<()> {
        assert_eq!(parse_mode("755")?, 0o755);
        assert_eq!(parse_mode("0644")?, 0o644);
        assert_eq!(parse_mode(" 1777 ")?, 0o1777);
        Ok(())
    }

    #[test]
    fn parse_mode_rejects_garbage() {
        assert!(matches!(parse_mode("rwx"), Err(Error::InvalidMode(_))));
        assert!(matches!(parse_mode("999"), Err(Error::InvalidMode(_))));
        assert!(matches!(parse_mode("77777"), Err(Error::InvalidMode(_))));
        assert!(matches!(parse_mode(""), Err(Error::InvalidMode(_))));
    }
}
