//! Theme configuration options for ferrule
//!
//! The `[theme]` table is the look table of the whole UI: listing entries, the command line
//! and its highlighter, and the message line. Every colour pair falls back to the internal
//! default when left at `"default"`.
//!
//! # Examples
//! ```toml
//! [theme.directory]
//! fg = "cyan"
//! [theme.macro_word]
//! fg = "#ffaf00"
//! ```

use crate::utils::parse_color;

use ratatui::style::{Color, Modifier, Style};
use serde::Deserialize;

use std::sync::LazyLock;

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Theme {
    entry: ColorPair,
    directory: ColorPair,
    symlink: ColorPair,
    executable: ColorPair,
    marked: ColorPair,
    selection: ColorPair,
    border: ColorPair,
    title: ColorPair,
    tab_active: ColorPair,
    tab_inactive: ColorPair,
    prompt: ColorPair,
    cmdline: ColorPair,
    command_word: ColorPair,
    macro_word: ColorPair,
    option_word: ColorPair,
    info_message: ColorPair,
    error_message: ColorPair,
    info_line: ColorPair,
}

impl Default for Theme {
    fn default() -> Self {
        let fg = |fg: Color| ColorPair {
            fg,
            ..ColorPair::default()
        };
        Theme {
            entry: ColorPair::default(),
            directory: fg(Color::Blue),
            symlink: fg(Color::Magenta),
            executable: fg(Color::Green),
            marked: fg(Color::Yellow),
            selection: ColorPair {
                bg: Color::Indexed(236),
                ..ColorPair::default()
            },
            border: fg(Color::Indexed(238)),
            title: fg(Color::Magenta),
            tab_active: ColorPair {
                fg: Color::Black,
                bg: Color::Cyan,
            },
            tab_inactive: fg(Color::Gray),
            prompt: fg(Color::Cyan),
            cmdline: ColorPair::default(),
            command_word: fg(Color::Green),
            macro_word: fg(Color::Yellow),
            option_word: fg(Color::Cyan),
            info_message: fg(Color::Green),
            error_message: fg(Color::Red),
            info_line: fg(Color::Gray),
        }
    }
}

macro_rules! style_getter {
    ($($name:ident => $field:ident),+ $(,)?) => {
        impl Theme {
            $(
                pub fn $name(&self) -> Style {
                    self.$field.style_or(&Theme::internal_defaults().$field)
                }
            )+
        }
    };
}

style_getter!(
    entry_style => entry,
    directory_style => directory,
    symlink_style => symlink,
    executable_style => executable,
    border_style => border,
    tab_inactive_style => tab_inactive,
    prompt_style => prompt,
    cmdline_style => cmdline,
    command_style => command_word,
    macro_style => macro_word,
    option_style => option_word,
    info_message_style => info_message,
    error_message_style => error_message,
    info_line_style => info_line,
);

impl Theme {
    /// Get internal default theme reference
    /// Used for fallback when a color is set to Reset
    pub fn internal_defaults() -> &'static Self {
        static DEFAULT: LazyLock<Theme> = LazyLock::new(Theme::default);
        &DEFAULT
    }

    pub fn selection_style(&self) -> Style {
        self.selection
            .style_or(&Theme::internal_defaults().selection)
    }

    pub fn marked_style(&self) -> Style {
        self.marked
            .style_or(&Theme::internal_defaults().marked)
            .add_modifier(Modifier::BOLD)
    }

    pub fn title_style(&self) -> Style {
        self.title
            .style_or(&Theme::internal_defaults().title)
            .add_modifier(Modifier::BOLD)
    }

    pub fn tab_active_style(&self) -> Style {
        self.tab_active
            .style_or(&Theme::internal_defaults().tab_active)
            .add_modifier(Modifier::BOLD)
    }
}

/// ColorPair struct to hold foreground and background colors.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorPair {
    #[serde(default, deserialize_with = "deserialize_color_field")]
    fg: Color,
    #[serde(default, deserialize_with = "deserialize_color_field")]
    bg: Color,
}

/// Default implementation for ColorPair
impl Default for ColorPair {
    fn default() -> Self {
        Self {
            fg: Color::Reset,
            bg: Color::Reset,
        }
    }
}

impl ColorPair {
    /// Resolves the ColorPair by replacing Reset colors with those from another ColorPair.
    pub fn resolve(&self, other: &ColorPair) -> Self {
        let pick = |mine: Color, theirs: Color| if mine == Color::Reset { theirs } else { mine };
        Self {
            fg: pick(self.fg, other.fg),
            bg: pick(self.bg, other.bg),
        }
    }

    /// Converts the ColorPair to a Style, falling back to the provided pair for Reset colors.
    pub fn style_or(&self, fallback: &ColorPair) -> Style {
        let resolved = self.resolve(fallback);
        Style::default().fg(resolved.fg).bg(resolved.bg)
    }
}

fn deserialize_color_field<'de, D>(deserializer: D) -> Result<Color, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    Ok(parse_color(&s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_colour_overrides_default() -> Result<(), Box<dyn std::error::Error>> {
        let theme: Theme = toml::from_str(
            r##"
            [macro_word]
            fg = "#ff0000"
            "##,
        )?;
        assert_eq!(theme.macro_style().fg, Some(Color::Rgb(255, 0, 0)));
        assert_eq!(theme.command_style().fg, Some(Color::Green));
        Ok(())
    }

    #[test]
    fn default_keyword_falls_back() -> Result<(), Box<dyn std::error::Error>> {
        let theme: Theme = toml::from_str(
            r#"
            [directory]
            fg = "default"
            "#,
        )?;
        assert_eq!(theme.directory_style().fg, Some(Color::Blue));
        Ok(())
    }
}
