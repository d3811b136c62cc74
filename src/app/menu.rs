//! Menu registry and the menu widget.
//!
//! [Menus] is owned by the app and holds one item list per [MenuId]. An item is an accelerator,
//! a label and a [MenuAction]. The custom-command and bookmark menus start with the `+` (add)
//! and `-` (delete) entries, followed by the records of their list files.
//!
//! [MenuView] lives in the widget slot while a menu is open. Running an item closes the menu
//! first, so an action that opens a mode simply takes the slot over.

use crate::app::App;
use crate::app::keymap::{Action, FileAction, NavAction, SystemAction, WorkspaceAction};
use crate::app::listfile::{self, Record};
use crate::config::InternalGeneral;
use crate::core::fm::SortKey;
use crate::core::message::Messenger;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::{HashMap, HashSet};
use std::path::Path;

pub const ADD_ACCEL: &str = "+";
pub const DELETE_ACCEL: &str = "-";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuId {
    Command,
    Custom,
    Bookmark,
    Tab,
    Sort,
}

impl MenuId {
    pub fn title(self) -> &'static str {
        match self {
            MenuId::Command => "command",
            MenuId::Custom => "custom",
            MenuId::Bookmark => "bookmark",
            MenuId::Tab => "tab",
            MenuId::Sort => "sort",
        }
    }
}

/// The persisted lists backing the custom-command and bookmark menus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    CustomCommand,
    Bookmark,
}

impl ListKind {
    pub fn menu(self) -> MenuId {
        match self {
            ListKind::CustomCommand => MenuId::Custom,
            ListKind::Bookmark => MenuId::Bookmark,
        }
    }

    pub fn path(self, general: &InternalGeneral) -> &Path {
        match self {
            ListKind::CustomCommand => general.custom_commands(),
            ListKind::Bookmark => general.bookmarks(),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ListKind::CustomCommand => "custom command",
            ListKind::Bookmark => "bookmark",
        }
    }

    /// What running a record of this list does.
    pub fn action(self, record: &Record) -> MenuAction {
        match self {
            ListKind::CustomCommand => MenuAction::Spawn(record.command.clone()),
            ListKind::Bookmark => MenuAction::Chdir(record.command.clone()),
        }
    }

    fn from_menu(id: MenuId) -> Option<Self> {
        match id {
            MenuId::Custom => Some(ListKind::CustomCommand),
            MenuId::Bookmark => Some(ListKind::Bookmark),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MenuAction {
    Run(Action),
    /// Expand and spawn a command template.
    Spawn(String),
    /// Change the focused pane to a path, `~` allowed.
    Chdir(String),
    /// Open the shell prompt pre-filled, with a cursor offset from the end.
    Shell(String, isize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MenuItem {
    accel: String,
    label: String,
    action: MenuAction,
}

impl MenuItem {
    pub fn new(accel: impl Into<String>, label: impl Into<String>, action: MenuAction) -> Self {
        Self {
            accel: accel.into(),
            label: label.into(),
            action,
        }
    }

    #[inline]
    pub fn accel(&self) -> &str {
        &self.accel
    }

    #[inline]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[inline]
    pub fn action(&self) -> &MenuAction {
        &self.action
    }
}

#[derive(Debug, Default)]
pub struct Menus {
    menus: HashMap<MenuId, Vec<MenuItem>>,
    builtin: HashSet<(MenuId, String)>,
}

impl Menus {
    /// The built-in menus.
    pub fn defaults() -> Self {
        use Action::{File, Nav, Workspace};
        use MenuAction::{Chdir, Run};

        let mut menus = Self::default();
        let items = |list: Vec<(&str, &str, MenuAction)>| {
            list.into_iter()
                .map(|(accel, label, action)| MenuItem::new(accel, label, action))
                .collect::<Vec<_>>()
        };

        menus.menus.insert(
            MenuId::Command,
            items(vec![
                ("c", "copy", Run(File(FileAction::Copy))),
                ("m", "move", Run(File(FileAction::Move))),
                ("D", "delete", Run(File(FileAction::Remove))),
                ("k", "mkdir", Run(File(FileAction::Mkdir))),
                ("n", "new file", Run(File(FileAction::Touch))),
                ("M", "chmod", Run(File(FileAction::Chmod))),
                ("r", "rename", Run(File(FileAction::Rename))),
                ("R", "bulk rename", Run(File(FileAction::BulkRename))),
                ("d", "chdir", Run(Nav(NavAction::Chdir))),
                ("g", "glob", Run(Nav(NavAction::Glob))),
                ("G", "globdir", Run(Nav(NavAction::Globdir))),
                ("x", "copy %m to %D2 (shell)", MenuAction::Shell(copy_shell().into(), -7)),
            ]),
        );

        menus.menus.insert(
            MenuId::Tab,
            items(vec![
                ("n", "new tab", Run(Workspace(WorkspaceAction::New))),
                ("c", "close tab", Run(Workspace(WorkspaceAction::Close))),
                ("t", "change title", Run(Workspace(WorkspaceAction::ChangeTitle))),
                ("f", "forward tab", Run(Workspace(WorkspaceAction::Next))),
                ("b", "backward tab", Run(Workspace(WorkspaceAction::Prev))),
                ("r", "reload all", Run(Nav(NavAction::Reload))),
                ("o", "open new pane", Run(Workspace(WorkspaceAction::OpenPane))),
                ("O", "close pane", Run(Workspace(WorkspaceAction::ClosePane))),
                ("s", "sync next pane here", Run(Workspace(WorkspaceAction::SyncNeighbor))),
            ]),
        );

        menus.menus.insert(
            MenuId::Sort,
            items(vec![
                ("n", "sort name", Run(Action::Sort(SortKey::Name))),
                ("N", "sort name descending", Run(Action::Sort(SortKey::NameDesc))),
                ("s", "sort size", Run(Action::Sort(SortKey::Size))),
                ("S", "sort size descending", Run(Action::Sort(SortKey::SizeDesc))),
                ("t", "sort time", Run(Action::Sort(SortKey::Mtime))),
                ("T", "sort time descending", Run(Action::Sort(SortKey::MtimeDesc))),
                ("e", "sort ext", Run(Action::Sort(SortKey::Ext))),
                ("E", "sort ext descending", Run(Action::Sort(SortKey::ExtDesc))),
            ]),
        );

        menus.menus.insert(
            MenuId::Custom,
            items(vec![
                (ADD_ACCEL, "add custom command", Run(Action::System(SystemAction::AddCustomCommand))),
                (DELETE_ACCEL, "delete custom command", Run(Action::System(SystemAction::DeleteCustomCommand))),
            ]),
        );

        let mut bookmarks = items(vec![
            (ADD_ACCEL, "add bookmark", Run(Action::System(SystemAction::AddBookmark))),
            (DELETE_ACCEL, "delete bookmark", Run(Action::System(SystemAction::DeleteBookmark))),
            ("h", "~/", Chdir("~".into())),
            ("k", "~/Desktop", Chdir("~/Desktop".into())),
            ("c", "~/Documents", Chdir("~/Documents".into())),
            ("l", "~/Downloads", Chdir("~/Downloads".into())),
        ]);
        bookmarks.extend(platform_bookmarks());
        menus.menus.insert(MenuId::Bookmark, bookmarks);

        menus.builtin = menus
            .menus
            .iter()
            .flat_map(|(id, items)| items.iter().map(|item| (*id, item.accel.clone())))
            .collect();
        menus
    }

    /// True when `accel` belongs to a built-in entry of menu `id`.
    pub fn is_builtin(&self, id: MenuId, accel: &str) -> bool {
        self.builtin.contains(&(id, accel.to_string()))
    }

    /// Registers the records of both list files. Unreadable files are reported, not fatal.
    pub fn load_lists(&mut self, general: &InternalGeneral, messenger: &Messenger) {
        for kind in [ListKind::CustomCommand, ListKind::Bookmark] {
            let path = kind.path(general);
            match listfile::load(path) {
                Ok(records) => {
                    tracing::debug!(count = records.len(), "loaded {}", path.display());
                    for record in &records {
                        self.add_record(kind, record);
                    }
                }
                Err(e) => messenger.error(format!("{}: {e}", path.display())),
            }
        }
    }

    pub fn items(&self, id: MenuId) -> &[MenuItem] {
        self.menus.get(&id).map_or(&[], Vec::as_slice)
    }

    pub fn find(&self, id: MenuId, accel: &str) -> Option<&MenuItem> {
        self.items(id).iter().find(|item| item.accel == accel)
    }

    /// Adds an item, replacing one with the same accelerator.
    pub fn add(&mut self, id: MenuId, item: MenuItem) {
        let items = self.menus.entry(id).or_default();
        match items.iter_mut().find(|i| i.accel == item.accel) {
            Some(existing) => *existing = item,
            None => items.push(item),
        }
    }

    /// Registers a list record. Records shadowing a built-in entry are skipped.
    pub fn add_record(&mut self, kind: ListKind, record: &Record) {
        if self.is_builtin(kind.menu(), &record.shortcut) {
            tracing::warn!(
                shortcut = %record.shortcut,
                "{} '{}' skipped, the shortcut is built in",
                kind.label(),
                record.name
            );
            return;
        }
        let item = MenuItem::new(&record.shortcut, &record.name, kind.action(record));
        self.add(kind.menu(), item);
    }

    /// Removes the item under `accel`. Returns whether there was one.
    pub fn remove(&mut self, id: MenuId, accel: &str) -> bool {
        let Some(items) = self.menus.get_mut(&id) else {
            return false;
        };
        let before = items.len();
        items.retain(|item| item.accel != accel);
        items.len() != before
    }
}

#[cfg(target_os = "macos")]
fn platform_bookmarks() -> Vec<MenuItem> {
    vec![MenuItem::new("a", "/Applications", MenuAction::Chdir("/Applications".into()))]
}

#[cfg(windows)]
fn platform_bookmarks() -> Vec<MenuItem> {
    ["C", "D"]
        .iter()
        .map(|d| MenuItem::new(*d, format!("{d}:/"), MenuAction::Chdir(format!("{d}:/"))))
        .collect()
}

#[cfg(not(any(windows, target_os = "macos")))]
fn platform_bookmarks() -> Vec<MenuItem> {
    ["/etc", "/usr", "/media"]
        .iter()
        .zip(["e", "u", "x"])
        .map(|(path, accel)| MenuItem::new(accel, *path, MenuAction::Chdir(path.to_string())))
        .collect()
}

fn copy_shell() -> &'static str {
    if cfg!(windows) {
        "Copy-Item -Recurse %M %D2"
    } else {
        "cp -r -v %M %D2"
    }
}

/// The open menu: which registry list it shows and its cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuView {
    id: MenuId,
    cursor: usize,
}

impl MenuView {
    pub fn new(id: MenuId) -> Self {
        Self { id, cursor: 0 }
    }

    #[inline]
    pub fn id(&self) -> MenuId {
        self.id
    }

    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Handles one key. Returns false once the menu is closed.
    pub fn input(&mut self, key: KeyEvent, app: &mut App) -> bool {
        let len = app.menus.items(self.id).len();
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => return false,
            KeyCode::Char('g') | KeyCode::Char('c') if ctrl => return false,
            KeyCode::Down => self.move_cursor(1, len),
            KeyCode::Char('n') if ctrl => self.move_cursor(1, len),
            KeyCode::Up => self.move_cursor(-1, len),
            KeyCode::Char('p') if ctrl => self.move_cursor(-1, len),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = len.saturating_sub(1),
            KeyCode::Enter => {
                let action = app.menus.items(self.id).get(self.cursor).map(|i| i.action.clone());
                if let Some(action) = action {
                    app.run_menu_action(action);
                }
                return false;
            }
            KeyCode::Delete => return self.delete_under_cursor(app),
            KeyCode::Char(c) if !ctrl => {
                let accel = c.to_string();
                let action = app.menus.find(self.id, &accel).map(|i| i.action.clone());
                if let Some(action) = action {
                    app.run_menu_action(action);
                    return false;
                }
            }
            _ => {}
        }
        true
    }

    fn move_cursor(&mut self, delta: isize, len: usize) {
        self.cursor = self
            .cursor
            .saturating_add_signed(delta)
            .min(len.saturating_sub(1));
    }

    /// Forgets the record under the cursor from its list file and the menu.
    fn delete_under_cursor(&mut self, app: &mut App) -> bool {
        let Some(kind) = ListKind::from_menu(self.id) else {
            app.messenger.error("Built-in menu entries cannot be removed");
            return true;
        };
        let Some(accel) = app.menus.items(self.id).get(self.cursor).map(|i| i.accel.clone()) else {
            return true;
        };
        if app.menus.is_builtin(self.id, &accel) {
            app.messenger.error("Built-in menu entries cannot be removed");
            return true;
        }
        app.forget_record(kind, &accel);
        false
    }
}
