//! File and directory browsing logic for ferrule.
//!
//! Provides the [FileEntry] struct which is used by the listing panes, the [ListOptions] that
//! sort and filter a listing according to the `[general]` config, and [glob_dir] for the
//! recursive glob search.

use crate::utils::extension;

use std::cmp::Ordering;
use std::fs::{self, Metadata};
use std::io;
use std::path::Path;
use std::time::SystemTime;

/// Name of the entry that heads every listing and leads to the parent directory.
pub const PARENT_NAME: &str = "..";

/// Represents a single entry in a directory listing.
///
/// `name` is relative to the listed directory; for glob-dir results it can contain separators.
#[derive(Debug, Clone, PartialEq)]
pub struct FileEntry {
    name: String,
    flags: u8,
    size: u64,
    modified: Option<SystemTime>,
    mode: u32,
}

impl FileEntry {
    // Flag bit definitions
    pub(crate) const IS_DIR: u8 = 1 << 0;
    pub(crate) const IS_HIDDEN: u8 = 1 << 1;
    pub(crate) const IS_SYMLINK: u8 = 1 << 2;
    pub(crate) const IS_EXECUTABLE: u8 = 1 << 3;

    #[cfg(unix)]
    const EXEC_FLAG: u32 = 0o111;

    pub fn new(name: impl Into<String>, flags: u8) -> Self {
        FileEntry {
            name: name.into(),
            flags,
            size: 0,
            modified: None,
            mode: 0,
        }
    }

    /// The `..` entry.
    pub fn parent() -> Self {
        Self::new(PARENT_NAME, Self::IS_DIR)
    }

    /// Reads `dir/name` without following a final symlink for the flags.
    pub fn from_path(dir: &Path, name: &str) -> io::Result<Self> {
        let path = dir.join(name);
        let lmd = fs::symlink_metadata(&path)?;
        let mut flags = 0u8;
        if lmd.file_type().is_symlink() {
            flags |= Self::IS_SYMLINK;
        }
        let md = if flags & Self::IS_SYMLINK != 0 {
            fs::metadata(&path).unwrap_or(lmd)
        } else {
            lmd
        };
        if md.is_dir() {
            flags |= Self::IS_DIR;
        }
        let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
        if base.starts_with('.') {
            flags |= Self::IS_HIDDEN;
        }
        let mode = mode_bits(&md);
        #[cfg(unix)]
        {
            if !md.is_dir() && mode & Self::EXEC_FLAG != 0 {
                flags |= Self::IS_EXECUTABLE;
            }
        }
        Ok(FileEntry {
            name: name.to_string(),
            flags,
            size: md.len(),
            modified: md.modified().ok(),
            mode,
        })
    }

    // Accessors

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn is_dir(&self) -> bool {
        self.flags & Self::IS_DIR != 0
    }

    #[inline]
    pub fn is_hidden(&self) -> bool {
        self.flags & Self::IS_HIDDEN != 0
    }

    #[inline]
    pub fn is_symlink(&self) -> bool {
        self.flags & Self::IS_SYMLINK != 0
    }

    #[inline]
    pub fn is_executable(&self) -> bool {
        self.flags & Self::IS_EXECUTABLE != 0
    }

    #[inline]
    pub fn is_parent(&self) -> bool {
        self.name == PARENT_NAME
    }

    #[inline]
    pub fn size(&self) -> u64 {
        self.size
    }

    #[inline]
    pub fn modified(&self) -> Option<SystemTime> {
        self.modified
    }

    #[inline]
    pub fn mode(&self) -> u32 {
        self.mode
    }
}

#[cfg(unix)]
fn mode_bits(md: &Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    md.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn mode_bits(md: &Metadata) -> u32 {
    if md.permissions().readonly() { 0o444 } else { 0o666 }
}

/// Reads the contents of the provided directory.
///
/// Unreadable entries are skipped. The `..` entry is not included.
pub fn browse_dir(path: &Path) -> io::Result<Vec<FileEntry>> {
    let mut entries = Vec::with_capacity(256);
    for entry in fs::read_dir(path)? {
        let Ok(entry) = entry else {
            continue;
        };
        let name = entry.file_name().to_string_lossy().into_owned();
        if let Ok(fe) = FileEntry::from_path(path, &name) {
            entries.push(fe);
        }
    }
    Ok(entries)
}

/// Recursively collects entries under `base` whose base name matches `pattern`.
///
/// Names in the result are relative to `base`. Hidden directories are not descended into
/// unless `show_hidden` is set.
pub fn glob_dir(base: &Path, pattern: &glob::Pattern, show_hidden: bool) -> io::Result<Vec<FileEntry>> {
    let mut found = Vec::new();
    let mut stack = vec![String::new()];
    while let Some(rel) = stack.pop() {
        let dir = if rel.is_empty() {
            base.to_path_buf()
        } else {
            base.join(&rel)
        };
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if rel.is_empty() => return Err(e),
            Err(_) => continue,
        };
        for entry in entries.flatten() {
            let name = entry.file_name().to_string_lossy().into_owned();
            if !show_hidden && name.starts_with('.') {
                continue;
            }
            let rel_name = if rel.is_empty() {
                name.clone()
            } else {
                format!("{rel}/{name}")
            };
            let is_real_dir = entry.file_type().is_ok_and(|ft| ft.is_dir());
            if pattern.matches(&name)
                && let Ok(fe) = FileEntry::from_path(base, &rel_name)
            {
                found.push(fe);
            }
            if is_real_dir {
                stack.push(rel_name);
            }
        }
    }
    Ok(found)
}

/// Sort keys offered by the sort menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Name,
    NameDesc,
    Size,
    SizeDesc,
    Mtime,
    MtimeDesc,
    Ext,
    ExtDesc,
}

/// Rules for sorting and filtering a listing, taken from the `[general]` config.
#[derive(Debug, Clone, Copy)]
pub struct ListOptions {
    pub dirs_first: bool,
    pub show_hidden: bool,
    pub case_insensitive: bool,
}

impl ListOptions {
    /// Drops hidden entries unless they are shown.
    pub fn filter_entries(&self, entries: &mut Vec<FileEntry>) {
        if !self.show_hidden {
            entries.retain(|e| !e.is_hidden() || e.is_parent());
        }
    }

    /// Sorts in place. `..` always stays first.
    pub fn sort_entries(&self, entries: &mut [FileEntry], key: SortKey) {
        entries.sort_by(|a, b| {
            match (a.is_parent(), b.is_parent()) {
                (true, false) => return Ordering::Less,
                (false, true) => return Ordering::Greater,
                _ => {}
            }
            if self.dirs_first {
                match (a.is_dir(), b.is_dir()) {
                    (true, false) => return Ordering::Less,
                    (false, true) => return Ordering::Greater,
                    _ => {}
                }
            }
            let by_name = || self.compare_names(a.name(), b.name());
            match key {
                SortKey::Name => by_name(),
                SortKey::NameDesc => by_name().reverse(),
                SortKey::Size => a.size.cmp(&b.size).then_with(by_name),
                SortKey::SizeDesc => b.size.cmp(&a.size).then_with(by_name),
                SortKey::Mtime => a.modified.cmp(&b.modified).then_with(by_name),
                SortKey::MtimeDesc => b.modified.cmp(&a.modified).then_with(by_name),
                SortKey::Ext => extension(a.name())
                    .cmp(extension(b.name()))
                    .then_with(by_name),
                SortKey::ExtDesc => extension(b.name())
                    .cmp(extension(a.name()))
                    .then_with(by_name),
            }
        });
    }

    fn compare_names(&self, a: &str, b: &str) -> Ordering {
        if self.case_insensitive {
            a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b))
        } else {
            a.cmp(b)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn names(entries: &[FileEntry]) -> Vec<&str> {
        entries.iter().map(FileEntry::name).collect()
    }

    #[test]
    fn file_entry_flags() {
        let fe_file = FileEntry::new("file.txt", 0);
        assert!(!fe_file.is_dir());
        assert_eq!(fe_file.name(), "file.txt");

        let fe_dir = FileEntry::new(".hidden_folder", FileEntry::IS_DIR | FileEntry::IS_HIDDEN);
        assert!(fe_dir.is_dir());
        assert!(fe_dir.is_hidden());
        assert!(!fe_dir.is_symlink());
        assert!(FileEntry::parent().is_parent());
    }

    #[test]
    fn browse_reads_flags() -> Result<(), Box<dyn std::error::Error>> {
        let tmp = TempDir::new()?;
        File::create(tmp.path().join(".dot"))?;
        fs::create_dir(tmp.path().join("sub"))?;
        fs::write(tmp.path().join("data.bin"), [0u8; 10])?;

        let mut entries = browse_dir(tmp.path())?;
        entries.sort_by(|a, b| a.name().cmp(b.name()));
        assert_eq!(names(&entries), [".dot", "data.bin", "sub"]);
        assert!(entries[0].is_hidden());
        assert_eq!(entries[1].size(), 10);
        assert!(entries[2].is_dir());
        Ok(())
    }

    #[test]
    fn browse_nonexistent() {
        assert!(browse_dir(&PathBuf::from("/path/does/not/exist")).is_err());
    }

    #[test]
    fn sort_dirs_first_and_parent_on_top() {
        let opts = ListOptions {
            dirs_first: true,
            show_hidden: false,
            case_insensitive: true,
        };
        let mut entries = vec![
            FileEntry::new("b.txt", 0),
            FileEntry::new("Zeta", FileEntry::IS_DIR),
            FileEntry::new(".secret", FileEntry::IS_HIDDEN),
            FileEntry::new("a.md", 0),
            FileEntry::parent(),
            FileEntry::new("alpha", FileEntry::IS_DIR),
        ];
        opts.filter_entries(&mut entries);
        opts.sort_entries(&mut entries, SortKey::Name);
        assert_eq!(names(&entries), ["..", "alpha", "Zeta", "a.md", "b.txt"]);

        opts.sort_entries(&mut entries, SortKey::NameDesc);
        assert_eq!(names(&entries), ["..", "Zeta", "alpha", "b.txt", "a.md"]);

        opts.sort_entries(&mut entries, SortKey::Ext);
        assert_eq!(names(&entries)[3..], ["a.md", "b.txt"]);
    }

    #[test]
    fn glob_dir_walks_subdirectories() -> Result<(), Box<dyn std::error::Error>> {
        let tmp = TempDir::new()?;
        fs::create_dir_all(tmp.path().join("src/nested"))?;
        fs::create_dir_all(tmp.path().join(".git"))?;
        File::create(tmp.path().join("top.rs"))?;
        File::create(tmp.path().join("src/lib.rs"))?;
        File::create(tmp.path().join("src/nested/deep.rs"))?;
        File::create(tmp.path().join("src/readme.md"))?;
        File::create(tmp.path().join(".git/hook.rs"))?;

        let pattern = glob::Pattern::new("*.rs")?;
        let mut found = glob_dir(tmp.path(), &pattern, false)?;
        found.sort_by(|a, b| a.name().cmp(b.name()));
        assert_eq!(names(&found), ["src/lib.rs", "src/nested/deep.rs", "top.rs"]);
        Ok(())
    }
}
