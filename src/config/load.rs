//! The main config loading module for ferrule.
//!
//! Handles loading and deserializing settings from `ferrule.toml`.
//!
//! Provides and manages the main [Config] struct, as well as the internal [RawConfig] used for
//! parsing and processing. Also writes the default config for `fe --init`.

use crate::config::{General, InternalGeneral, Keys, LauncherConfig, Theme};
use crate::core::error::Result;
use crate::utils::get_home;

use serde::Deserialize;
use std::{fs, io, path::Path, path::PathBuf};

pub const CONFIG_ENV: &str = "FERRULE_CONFIG";

/// Raw configuration as read from the toml file
/// It uses owned types and is then converted into the main [Config] struct.
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub(crate) struct RawConfig {
    general: General,
    launcher: LauncherConfig,
    theme: Theme,
    keys: Keys,
}

/// Main configuration struct for ferrule
/// This struct holds the processed configuration options.
#[derive(Debug, Clone)]
pub struct Config {
    general: InternalGeneral,
    launcher: LauncherConfig,
    theme: Theme,
    keys: Keys,
}

/// Conversion from RawConfig to Config
impl From<RawConfig> for Config {
    fn from(raw: RawConfig) -> Self {
        Self {
            general: InternalGeneral::from(raw.general),
            launcher: raw.launcher,
            theme: raw.theme,
            keys: raw.keys,
        }
    }
}

impl Config {
    /// Load configuration from the default path
    /// If the file does not exist or fails to parse, returns the default configuration.
    ///
    /// Called by entry point to load config at startup.
    pub fn load() -> Self {
        let path = Self::default_path();

        if !path.exists() {
            eprintln!(
                "No ferrule.toml config file found. Using internal defaults. (Tip: run 'fe --init' to generate a config file.)"
            );
            return Self::default();
        }

        match Self::from_file(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(content)?;
        Ok(raw.into())
    }

    // Getters

    #[inline]
    pub fn general(&self) -> &InternalGeneral {
        &self.general
    }

    #[inline]
    pub fn launcher(&self) -> &LauncherConfig {
        &self.launcher
    }

    #[inline]
    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    #[inline]
    pub fn keys(&self) -> &Keys {
        &self.keys
    }

    /// Keeps the persisted lists under `dir`.
    pub fn with_list_dir(mut self, dir: &Path) -> Self {
        self.general = self.general.with_list_dir(dir);
        self
    }

    /// Determine the default configuration file path.
    /// Checks the FERRULE_CONFIG environment variable first,
    /// Checks for XDG_CONFIG_HOME after,
    /// then defaults to ~/.config/ferrule/ferrule.toml,
    pub fn default_path() -> PathBuf {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return PathBuf::from(path);
        }

        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg_config).join("ferrule/ferrule.toml");
        }

        if let Some(home) = get_home() {
            return home.join(".config/ferrule/ferrule.toml");
        }
        PathBuf::from("ferrule.toml")
    }

    /// Generate a default configuration file at the specified path.
    /// If the file already exists, returns an error.
    pub fn generate_default(path: &Path) -> io::Result<()> {
        if path.exists() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("Config file already exists at {}", path.display()),
            ));
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, DEFAULT_TOML)?;
        println!("Default config generated at {}", path.display());
        Ok(())
    }
}

/// Default configuration options
impl Default for Config {
    fn default() -> Self {
        RawConfig::default().into()
    }
}

pub(crate) const DEFAULT_TOML: &str = r##"# ferrule.toml - default configuration for ferrule

# Note:
# Commented values are the internal defaults of ferrule
# Use hex codes (eg. "#RRGGBB") or terminal colors ("cyan")

[general]
dirs_first = true
show_hidden = false
# case_insensitive = true
# message_seconds = 5
# move_to_trash = false
# custom_commands = "~/.ferrule/commands"
# bookmarks = "~/.ferrule/bookmarks"
# log_file = "~/.ferrule/ferrule.log"   # "" disables the log file

# [launcher]
# "{cmd}" is replaced by the expanded command line.
# shell = ["bash", "-c", "{cmd}"]
# terminal = ["gnome-terminal", "--", "bash", "-c", "{cmd};read -p \"HIT ENTER KEY\""]
# opener = "xdg-open %f %&"

# [theme.directory]
# fg = "blue"
# [theme.marked]
# fg = "yellow"
# [theme.selection]
# bg = "#303030"
# [theme.prompt]
# fg = "cyan"
# [theme.command_word]
# fg = "green"
# [theme.macro_word]
# fg = "yellow"
# [theme.option_word]
# fg = "cyan"
# [theme.error_message]
# fg = "red"

# [keys]
# cursor_down = ["j", "Down", "Ctrl+n"]
# cursor_up = ["k", "Up", "Ctrl+p"]
# open = ["Enter", "l", "Right"]
# go_parent = ["h", "Left", "Backspace"]
# toggle_mark = ["space"]
# copy = ["c"]
# move_file = ["m"]
# remove = ["d", "Delete"]
# shell = [";"]
# shell_suspend = [":"]
# command_menu = ["x"]
# custom_menu = ["e"]
# bookmark_menu = ["b"]
# quit = ["q"]
"##;
