//! Persisted custom-command and bookmark lists.
//!
//! One record per line: `<shortcut> <||> <name> <||> <command>`. Lines with fewer than three
//! fields are skipped on load so hand-edited files stay usable. Every operation opens, changes
//! and closes the file in one go.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

pub const SEPARATOR: &str = " <||> ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub shortcut: String,
    pub name: String,
    pub command: String,
}

impl Record {
    pub fn new(
        shortcut: impl Into<String>,
        name: impl Into<String>,
        command: impl Into<String>,
    ) -> Self {
        Self {
            shortcut: shortcut.into(),
            name: name.into(),
            command: command.into(),
        }
    }

    pub fn parse(line: &str) -> Option<Self> {
        let mut fields = line.splitn(3, SEPARATOR);
        let shortcut = fields.next()?;
        let name = fields.next()?;
        let command = fields.next()?;
        Some(Self::new(shortcut, name, command))
    }

    pub fn line(&self) -> String {
        [self.shortcut.as_str(), &self.name, &self.command].join(SEPARATOR)
    }
}

/// Reads every well-formed record. A missing file is an empty list.
pub fn load(path: &Path) -> io::Result<Vec<Record>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(content.lines().filter_map(Record::parse).collect()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e),
    }
}

/// Appends `record`, creating the file and its directory when needed.
pub fn append(path: &Path, record: &Record) -> io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{}", record.line())
}

/// Rewrites the file without the lines recorded under `shortcut`. Returns how many went.
pub fn remove(path: &Path, shortcut: &str) -> io::Result<usize> {
    let content = fs::read_to_string(path)?;
    let prefix = format!("{shortcut}{SEPARATOR}");
    let mut kept = String::with_capacity(content.len());
    let mut removed = 0;
    for line in content.lines() {
        if line.starts_with(&prefix) {
            removed += 1;
        } else {
            kept.push_str(line);
            kept.push('\n');
        }
    }
    fs::write(path, kept)?;
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn short_lines_are_skipped() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("commands");
        fs::write(
            &path,
            "o <||> Open <||> open %f\nbroken line\nx <||> only two\n\ng <||> Grep <||> grep -n <||> %f\n",
        )?;
        let records = load(&path)?;
        assert_eq!(
            records,
            [
                Record::new("o", "Open", "open %f"),
                Record::new("g", "Grep", "grep -n <||> %f"),
            ]
        );
        Ok(())
    }

    #[test]
    fn missing_file_is_empty() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        assert!(load(&dir.path().join("nope"))?.is_empty());
        assert!(remove(&dir.path().join("nope"), "a").is_err());
        Ok(())
    }

    #[test]
    fn append_then_remove_by_shortcut() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("nested/bookmarks");
        append(&path, &Record::new("d", "docs", "~/docs"))?;
        append(&path, &Record::new("dl", "downloads", "~/Downloads"))?;
        assert_eq!(
            fs::read_to_string(&path)?,
            "d <||> docs <||> ~/docs\ndl <||> downloads <||> ~/Downloads\n"
        );

        assert_eq!(remove(&path, "d")?, 1);
        assert_eq!(load(&path)?, [Record::new("dl", "downloads", "~/Downloads")]);
        assert_eq!(remove(&path, "d")?, 0);
        Ok(())
    }
}
