//! Listing provider for ferrule.
//!
//! A [Filer] holds workspaces (shown as tabs). Each [Workspace] holds at least two [Pane]s; the
//! focused pane is the current directory and the next one is its neighbor. A pane owns its
//! listing, cursor, marks and optional glob filter.
//!
//! Every listing starts with the `..` entry, so a pane always has a cursor file once loaded.

use crate::core::fm::{FileEntry, ListOptions, SortKey, browse_dir, glob_dir};
use crate::core::macros::MacroContext;
use crate::utils::resolve_path;

use chrono::Local;
use std::collections::HashSet;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Minimum number of panes in a workspace.
const MIN_PANES: usize = 2;

/// Lexically resolves `.` and `..` components.
pub(crate) fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    if out.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        out
    }
}

fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[derive(Debug, Clone)]
pub enum Filter {
    Glob(glob::Pattern),
    GlobDir(glob::Pattern),
}

impl Filter {
    pub fn pattern(&self) -> &str {
        match self {
            Filter::Glob(p) | Filter::GlobDir(p) => p.as_str(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Pane {
    path: PathBuf,
    entries: Vec<FileEntry>,
    cursor: usize,
    marks: HashSet<String>,
    filter: Option<Filter>,
    sort: SortKey,
}

impl Pane {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path: normalize(&path),
            entries: Vec::new(),
            cursor: 0,
            marks: HashSet::new(),
            filter: None,
            sort: SortKey::default(),
        }
    }

    // Accessors

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[inline]
    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[inline]
    pub fn filter(&self) -> Option<&Filter> {
        self.filter.as_ref()
    }

    #[inline]
    pub fn sort(&self) -> SortKey {
        self.sort
    }

    pub fn dir_name(&self) -> String {
        base_name(&self.path)
    }

    /// Re-reads the directory, keeping the cursor on the same name when it still exists.
    pub fn reload(&mut self, opts: ListOptions) -> io::Result<()> {
        let focus = self.current().map(|e| e.name().to_string());
        let mut entries = match &self.filter {
            None => browse_dir(&self.path)?,
            Some(Filter::Glob(pattern)) => {
                let mut entries = browse_dir(&self.path)?;
                entries.retain(|e| pattern.matches(e.name()));
                entries
            }
            Some(Filter::GlobDir(pattern)) => glob_dir(&self.path, pattern, opts.show_hidden)?,
        };
        opts.filter_entries(&mut entries);
        entries.push(FileEntry::parent());
        opts.sort_entries(&mut entries, self.sort);
        self.entries = entries;

        let present: HashSet<&str> = self.entries.iter().map(FileEntry::name).collect();
        self.marks.retain(|m| present.contains(m.as_str()));
        match focus {
            Some(name) => self.focus_name(&name),
            None => self.cursor = 0,
        }
        Ok(())
    }

    pub fn current(&self) -> Option<&FileEntry> {
        self.entries.get(self.cursor)
    }

    /// Name of the cursor file, empty before the first load.
    pub fn file_name(&self) -> String {
        self.current().map(|e| e.name().to_string()).unwrap_or_default()
    }

    pub fn file_path(&self) -> PathBuf {
        normalize(&self.path.join(self.file_name()))
    }

    /// Puts the cursor on `name`, or clamps it when absent.
    pub fn focus_name(&mut self, name: &str) {
        if let Some(idx) = self.entries.iter().position(|e| e.name() == name) {
            self.cursor = idx;
        } else {
            self.cursor = self.cursor.min(self.entries.len().saturating_sub(1));
        }
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let last = self.entries.len().saturating_sub(1);
        self.cursor = self.cursor.saturating_add_signed(delta).min(last);
    }

    pub fn move_top(&mut self) {
        self.cursor = 0;
    }

    pub fn move_bottom(&mut self) {
        self.cursor = self.entries.len().saturating_sub(1);
    }

    // Marks

    pub fn is_marked(&self, name: &str) -> bool {
        self.marks.contains(name)
    }

    pub fn has_marks(&self) -> bool {
        !self.marks.is_empty()
    }

    pub fn mark_count(&self) -> usize {
        self.marks.len()
    }

    /// Toggles the cursor file's mark and advances the cursor. `..` cannot be marked.
    pub fn toggle_mark(&mut self) {
        if let Some(entry) = self.current()
            && !entry.is_parent()
        {
            let name = entry.name().to_string();
            if !self.marks.remove(&name) {
                self.marks.insert(name);
            }
        }
        self.move_cursor(1);
    }

    pub fn invert_marks(&mut self) {
        for entry in &self.entries {
            if entry.is_parent() {
                continue;
            }
            let name = entry.name();
            if !self.marks.remove(name) {
                self.marks.insert(name.to_string());
            }
        }
    }

    pub fn clear_marks(&mut self) {
        self.marks.clear();
    }

    /// Marked names in listing order, or the cursor file when nothing is marked.
    pub fn marked_names(&self) -> Vec<String> {
        if self.marks.is_empty() {
            return self
                .current()
                .map(|e| vec![e.name().to_string()])
                .unwrap_or_default();
        }
        self.entries
            .iter()
            .filter(|e| self.marks.contains(e.name()))
            .map(|e| e.name().to_string())
            .collect()
    }

    pub fn marked_paths(&self) -> Vec<PathBuf> {
        self.marked_names()
            .iter()
            .map(|name| normalize(&self.path.join(name)))
            .collect()
    }

    // Directory changes

    /// Changes to `input`, resolved against this pane with `~` expansion.
    pub fn chdir(&mut self, input: &str, opts: ListOptions) -> io::Result<()> {
        let target = normalize(&resolve_path(&self.path, input));
        if !target.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotADirectory,
                format!("{}: not a directory", target.display()),
            ));
        }
        let previous = std::mem::replace(&mut self.path, target);
        self.marks.clear();
        self.filter = None;
        self.entries.clear();
        self.cursor = 0;
        if let Err(e) = self.reload(opts) {
            self.path = previous;
            self.reload(opts)?;
            return Err(e);
        }
        if previous.parent() == Some(self.path.as_path()) {
            self.focus_name(&base_name(&previous));
        }
        Ok(())
    }

    /// Enters the cursor directory. Returns false when the cursor is on a file.
    pub fn enter(&mut self, opts: ListOptions) -> io::Result<bool> {
        match self.current() {
            Some(entry) if entry.is_dir() => {
                let name = entry.name().to_string();
                self.chdir(&name, opts)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    pub fn set_filter(&mut self, filter: Filter, opts: ListOptions) -> io::Result<()> {
        self.filter = Some(filter);
        self.cursor = 0;
        self.marks.clear();
        self.reload(opts)
    }

    /// Clears marks and any filter.
    pub fn reset(&mut self, opts: ListOptions) -> io::Result<()> {
        self.marks.clear();
        self.filter = None;
        self.reload(opts)
    }

    pub fn set_sort(&mut self, sort: SortKey, opts: ListOptions) -> io::Result<()> {
        self.sort = sort;
        self.reload(opts)
    }
}

#[derive(Debug, Clone)]
pub struct Workspace {
    title: String,
    panes: Vec<Pane>,
    focus: usize,
}

impl Workspace {
    pub fn new(title: impl Into<String>, path: &Path) -> Self {
        Self {
            title: title.into(),
            panes: (0..MIN_PANES).map(|_| Pane::new(path.to_path_buf())).collect(),
            focus: 0,
        }
    }

    #[inline]
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    #[inline]
    pub fn panes(&self) -> &[Pane] {
        &self.panes
    }

    #[inline]
    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn current(&self) -> &Pane {
        &self.panes[self.focus]
    }

    pub fn current_mut(&mut self) -> &mut Pane {
        &mut self.panes[self.focus]
    }

    fn neighbor_index(&self) -> usize {
        (self.focus + 1) % self.panes.len()
    }

    pub fn neighbor(&self) -> &Pane {
        &self.panes[self.neighbor_index()]
    }

    pub fn move_focus(&mut self, delta: isize) {
        let len = self.panes.len() as isize;
        self.focus = (self.focus as isize + delta).rem_euclid(len) as usize;
    }

    /// Adds a pane next to the focused one, showing the same directory.
    pub fn open_pane(&mut self, opts: ListOptions) -> io::Result<()> {
        let mut pane = Pane::new(self.current().path().to_path_buf());
        pane.reload(opts)?;
        self.panes.insert(self.focus + 1, pane);
        self.focus += 1;
        Ok(())
    }

    /// Closes the focused pane unless only the minimum remain.
    pub fn close_pane(&mut self) -> bool {
        if self.panes.len() <= MIN_PANES {
            return false;
        }
        self.panes.remove(self.focus);
        self.focus = self.focus.min(self.panes.len() - 1);
        true
    }

    /// Changes the neighbor pane to this pane's directory.
    pub fn sync_neighbor(&mut self, opts: ListOptions) -> io::Result<()> {
        let path = self.current().path().display().to_string();
        let idx = self.neighbor_index();
        self.panes[idx].chdir(&path, opts)
    }

    pub fn reload_all(&mut self, opts: ListOptions) -> io::Result<()> {
        let mut first_err = None;
        for pane in &mut self.panes {
            if let Err(e) = pane.reload(opts) {
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}

#[derive(Debug, Clone)]
pub struct Filer {
    workspaces: Vec<Workspace>,
    current: usize,
}

impl Filer {
    pub fn new(path: &Path) -> Self {
        Self {
            workspaces: vec![Workspace::new("1", path)],
            current: 0,
        }
    }

    #[inline]
    pub fn workspaces(&self) -> &[Workspace] {
        &self.workspaces
    }

    #[inline]
    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspaces[self.current]
    }

    pub fn workspace_mut(&mut self) -> &mut Workspace {
        &mut self.workspaces[self.current]
    }

    pub fn pane(&self) -> &Pane {
        self.workspace().current()
    }

    pub fn pane_mut(&mut self) -> &mut Pane {
        self.workspace_mut().current_mut()
    }

    pub fn neighbor(&self) -> &Pane {
        self.workspace().neighbor()
    }

    /// Opens a workspace on the current directory and switches to it.
    pub fn new_workspace(&mut self, opts: ListOptions) -> io::Result<()> {
        let title = (self.workspaces.len() + 1).to_string();
        let mut ws = Workspace::new(title, self.pane().path());
        ws.reload_all(opts)?;
        self.workspaces.push(ws);
        self.current = self.workspaces.len() - 1;
        Ok(())
    }

    /// Closes the current workspace unless it is the last one.
    pub fn close_workspace(&mut self) -> bool {
        if self.workspaces.len() <= 1 {
            return false;
        }
        self.workspaces.remove(self.current);
        self.current = self.current.min(self.workspaces.len() - 1);
        true
    }

    pub fn move_workspace(&mut self, delta: isize) {
        let len = self.workspaces.len() as isize;
        self.current = (self.current as isize + delta).rem_euclid(len) as usize;
    }

    /// Snapshot of the listing for macro expansion.
    pub fn macro_context(&self) -> MacroContext {
        let pane = self.pane();
        let neighbor = self.neighbor();
        let path_string = |p: &Path| p.display().to_string();
        MacroContext {
            file_name: pane.file_name(),
            file_path: path_string(&pane.file_path()),
            marked_names: pane.marked_names(),
            marked_paths: pane.marked_paths().iter().map(|p| path_string(p)).collect(),
            dir_name: pane.dir_name(),
            dir_path: path_string(pane.path()),
            next_dir_name: neighbor.dir_name(),
            next_dir_path: path_string(neighbor.path()),
            now: Local::now(),
        }
    }
}
