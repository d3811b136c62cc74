//! The general configuration settings for ferrule.
//!
//! This module defines the [General] struct for deserializing the `[general]` table of
//! ferrule.toml and the [InternalGeneral] struct with resolved paths for internal use.

use crate::core::fm::ListOptions;
use crate::utils::expand_home_path;

use serde::Deserialize;

use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_MESSAGE_SECONDS: u64 = 5;

#[derive(Deserialize, Debug)]
#[serde(default)]
pub(crate) struct General {
    dirs_first: bool,
    show_hidden: bool,
    case_insensitive: bool,
    message_seconds: u64,
    move_to_trash: bool,
    custom_commands: String,
    bookmarks: String,
    log_file: String,
}

impl Default for General {
    fn default() -> Self {
        General {
            dirs_first: true,
            show_hidden: false,
            case_insensitive: true,
            message_seconds: DEFAULT_MESSAGE_SECONDS,
            move_to_trash: false,
            custom_commands: "~/.ferrule/commands".into(),
            bookmarks: "~/.ferrule/bookmarks".into(),
            log_file: "~/.ferrule/ferrule.log".into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct InternalGeneral {
    dirs_first: bool,
    show_hidden: bool,
    case_insensitive: bool,
    message_ttl: Duration,
    move_to_trash: bool,
    custom_commands: PathBuf,
    bookmarks: PathBuf,
    log_file: Option<PathBuf>,
}

impl From<General> for InternalGeneral {
    fn from(g: General) -> Self {
        let log_file = g.log_file.trim();
        Self {
            dirs_first: g.dirs_first,
            show_hidden: g.show_hidden,
            case_insensitive: g.case_insensitive,
            message_ttl: Duration::from_secs(g.message_seconds.max(1)),
            move_to_trash: g.move_to_trash,
            custom_commands: expand_home_path(&g.custom_commands),
            bookmarks: expand_home_path(&g.bookmarks),
            log_file: (!log_file.is_empty()).then(|| expand_home_path(log_file)),
        }
    }
}

impl InternalGeneral {
    #[inline]
    pub fn dirs_first(&self) -> bool {
        self.dirs_first
    }

    #[inline]
    pub fn show_hidden(&self) -> bool {
        self.show_hidden
    }

    #[inline]
    pub fn case_insensitive(&self) -> bool {
        self.case_insensitive
    }

    #[inline]
    pub fn message_ttl(&self) -> Duration {
        self.message_ttl
    }

    #[inline]
    pub fn move_to_trash(&self) -> bool {
        self.move_to_trash
    }

    #[inline]
    pub fn custom_commands(&self) -> &Path {
        &self.custom_commands
    }

    #[inline]
    pub fn bookmarks(&self) -> &Path {
        &self.bookmarks
    }

    /// None when file logging is disabled.
    #[inline]
    pub fn log_file(&self) -> Option<&Path> {
        self.log_file.as_deref()
    }

    pub fn list_options(&self) -> ListOptions {
        ListOptions {
            dirs_first: self.dirs_first,
            show_hidden: self.show_hidden,
            case_insensitive: self.case_insensitive,
        }
    }

    /// Points both persisted lists into `dir`. Used to keep tests off the real home.
    pub fn with_list_dir(mut self, dir: &Path) -> Self {
        self.custom_commands = dir.join("commands");
        self.bookmarks = dir.join("bookmarks");
        self
    }
}
