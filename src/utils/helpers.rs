//! Helpers for ferrule.
//!
//! Small utilities used throughout the crate:
//! - Shell quoting of names and paths for macro expansion
//! - Expanding and abbreviating the home directory ("~")
//! - Splitting file names into stem and extension
//! - Collecting the command names found in `$PATH`
//! - Color parsing from strings or hex codes
//! - Recursive copying for the file-operation worker

use ratatui::style::Color;
use std::collections::HashSet;
use std::path::{MAIN_SEPARATOR, Path, PathBuf};
use std::{env, fs, io};

/// Wraps `s` so that a POSIX shell reads it back as exactly one word.
///
/// Embedded single quotes are closed, escaped and reopened: `it's` -> `'it'\''s'`.
#[cfg(not(windows))]
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        if c == '\'' {
            out.push_str(r"'\''");
        } else {
            out.push(c);
        }
    }
    out.push('\'');
    out
}

/// Wraps `s` in PowerShell single quotes, doubling embedded quotes.
#[cfg(windows)]
pub fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// Returns the name without its extension.
///
/// Dot files keep their name: `.bashrc` has no extension, and neither does `..`.
pub fn remove_ext(name: &str) -> &str {
    match split_ext(name) {
        Some(idx) => &name[..idx],
        None => name,
    }
}

/// Returns the extension of `name` including the leading dot, or an empty string.
pub fn extension(name: &str) -> &str {
    match split_ext(name) {
        Some(idx) => &name[idx..],
        None => "",
    }
}

fn split_ext(name: &str) -> Option<usize> {
    let base_start = name.rfind(['/', '\\']).map_or(0, |i| i + 1);
    let idx = name.rfind('.')?;
    if idx < base_start || name[base_start..idx].chars().all(|c| c == '.') {
        return None;
    }
    Some(idx)
}

/// Returns the last `/` or `\` separated segment of `text`, trimmed.
///
/// Used to seed a display name from a path or a command template.
pub fn last_segment(text: &str) -> &str {
    let trimmed = text.trim().trim_end_matches(['/', '\\']);
    trimmed
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(trimmed)
        .trim()
}

pub fn get_home() -> Option<PathBuf> {
    dirs::home_dir()
}

/// Expands a leading "~" to the home directory.
pub fn expand_home_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix('~')
        && let Some(home) = get_home()
    {
        let rest = rest.trim_start_matches(['/', '\\']);
        if rest.is_empty() {
            return home;
        }
        return home.join(rest);
    }
    PathBuf::from(path)
}

/// Resolves `input` against `base` after home expansion.
pub fn resolve_path(base: &Path, input: &str) -> PathBuf {
    let expanded = expand_home_path(input.trim());
    if expanded.is_absolute() {
        expanded
    } else {
        base.join(expanded)
    }
}

/// Util function to shorten home directory to ~.
/// Used by the pane titles and the info line.
pub fn shorten_home_path<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();
    if let Some(home_dir) = get_home()
        && let Ok(stripped) = path.strip_prefix(&home_dir)
    {
        if stripped.as_os_str().is_empty() {
            return "~".to_string();
        } else {
            let mut short = stripped.display().to_string();
            if short.starts_with(MAIN_SEPARATOR) {
                short.remove(0);
            }
            return format!("~{}{}", MAIN_SEPARATOR, short);
        }
    }
    path.display().to_string()
}

/// Collects every file name found in the `$PATH` directories.
///
/// Missing directories are skipped. On Windows `.exe` names are also added without extension.
pub fn search_commands() -> io::Result<HashSet<String>> {
    let mut results = HashSet::new();
    let Some(paths) = env::var_os("PATH") else {
        return Ok(results);
    };
    for dir in env::split_paths(&paths) {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied => continue,
            Err(e) => return Err(e),
        };
        for entry in entries.flatten() {
            let name = entry.file_name().to_string_lossy().into_owned();
            #[cfg(windows)]
            if let Some(stem) = name.strip_suffix(".exe") {
                results.insert(stem.to_string());
            }
            results.insert(name);
        }
    }
    Ok(results)
}

/// Parses a string (color name or hex) into a ratatui::style::color
///
/// Supports standard names (red, green, etc.) as well as hex values (#RRGGBB or #RGB)
pub fn parse_color(s: &str) -> Color {
    match s.to_lowercase().as_str() {
        "default" | "reset" => Color::Reset,
        "yellow" => Color::Yellow,
        "red" => Color::Red,
        "blue" => Color::Blue,
        "green" => Color::Green,
        "magenta" => Color::Magenta,
        "cyan" => Color::Cyan,
        "white" => Color::White,
        "black" => Color::Black,
        "gray" => Color::Gray,
        "darkgray" => Color::DarkGray,
        "lightred" => Color::LightRed,
        "lightgreen" => Color::LightGreen,
        "lightyellow" => Color::LightYellow,
        "lightblue" => Color::LightBlue,
        "lightmagenta" => Color::LightMagenta,
        "lightcyan" => Color::LightCyan,
        _ => {
            if let Some(color) = s.strip_prefix('#') {
                let expanded = match color.len() {
                    6 => color.to_string(),
                    3 => color.chars().flat_map(|c| [c, c]).collect(),
                    _ => return Color::Reset,
                };
                if let Ok(rgb) = u32::from_str_radix(&expanded, 16) {
                    return Color::Rgb(
                        ((rgb >> 16) & 0xFF) as u8,
                        ((rgb >> 8) & 0xFF) as u8,
                        (rgb & 0xFF) as u8,
                    );
                }
            }
            // fallback
            Color::Reset
        }
    }
}

/// Recursively copies files and directories from `src` to `dest`.
///
/// If `src` is a directory, it creates the directory at `dest` and copies all its contents recursively.
pub fn copy_recursive(src: &Path, dest: &Path) -> io::Result<()> {
    if src.is_dir() {
        fs::create_dir_all(dest)?;
        for entry in fs::read_dir(src)? {
            let entry = entry?;
            let entry_path = entry.path();
            let dest_path = dest.join(entry.file_name());
            copy_recursive(&entry_path, &dest_path)?;
        }
    } else {
        fs::copy(src, dest)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(windows))]
    fn quote_wraps_and_escapes() {
        assert_eq!(quote("foo"), "'foo'");
        assert_eq!(quote("a b"), "'a b'");
        assert_eq!(quote("it's"), r"'it'\''s'");
        assert_eq!(quote(""), "''");
    }

    #[test]
    fn extension_split() {
        assert_eq!(remove_ext("archive.tar.gz"), "archive.tar");
        assert_eq!(extension("archive.tar.gz"), ".gz");
        assert_eq!(remove_ext(".bashrc"), ".bashrc");
        assert_eq!(extension(".bashrc"), "");
        assert_eq!(remove_ext(".."), "..");
        assert_eq!(remove_ext("/home/me/.config"), "/home/me/.config");
        assert_eq!(remove_ext("/tmp/notes.txt"), "/tmp/notes");
        assert_eq!(extension("Makefile"), "");
    }

    #[test]
    fn last_segment_of_paths_and_commands() {
        assert_eq!(last_segment("/home/me/projects/"), "projects");
        assert_eq!(last_segment("~/music"), "music");
        assert_eq!(last_segment("xdg-open %F"), "xdg-open %F");
        assert_eq!(last_segment(" '/usr/bin/gimp' %F "), "gimp' %F");
        assert_eq!(last_segment("plain"), "plain");
    }

    #[test]
    fn resolve_relative_and_absolute() {
        let base = Path::new("/srv/data");
        assert_eq!(resolve_path(base, "sub"), PathBuf::from("/srv/data/sub"));
        assert_eq!(resolve_path(base, "/etc"), PathBuf::from("/etc"));
    }

    #[test]
    fn parse_color_hex_and_names() {
        assert_eq!(parse_color("Red"), Color::Red);
        assert_eq!(parse_color("#ff8000"), Color::Rgb(255, 128, 0));
        assert_eq!(parse_color("#fff"), Color::Rgb(255, 255, 255));
        assert_eq!(parse_color("#12"), Color::Reset);
        assert_eq!(parse_color("nonsense"), Color::Reset);
    }

    #[test]
    fn copy_recursive_copies_tree() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let src = dir.path().join("src");
        fs::create_dir_all(src.join("nested"))?;
        fs::write(src.join("nested/a.txt"), "alpha")?;
        let dest = dir.path().join("dest");
        copy_recursive(&src, &dest)?;
        assert_eq!(fs::read_to_string(dest.join("nested/a.txt"))?, "alpha");
        Ok(())
    }
}
