//! Idle browser handlers for ferrule.
//!
//! This module implements the [App] methods that run when no widget is open: keymap lookup,
//! action dispatch, and the actions behind menu items.

use crate::app::keymap::{Action, FileAction, NavAction, SystemAction, WorkspaceAction};
use crate::app::menu::{MenuAction, MenuView};
use crate::app::state::{App, Widget};

use crossterm::event::KeyEvent;
use std::io;

impl App {
    /// Looks `key` up in the keymap and runs the bound action.
    pub(super) fn handle_idle_key(&mut self, key: KeyEvent) {
        match self.keymap.lookup(key) {
            Some(action) => self.run_action(action),
            None => tracing::trace!(?key, "unbound key"),
        }
    }

    pub fn run_action(&mut self, action: Action) {
        let result = match action {
            Action::Nav(nav) => self.handle_nav(nav),
            Action::File(file) => {
                self.handle_file(file);
                Ok(())
            }
            Action::Workspace(ws) => self.handle_workspace(ws),
            Action::Menu(id) => {
                self.set_next(Widget::Menu(MenuView::new(id)));
                Ok(())
            }
            Action::Sort(key) => {
                let opts = self.config.general().list_options();
                self.filer.pane_mut().set_sort(key, opts)
            }
            Action::System(sys) => {
                self.handle_system(sys);
                Ok(())
            }
        };
        if let Err(e) = result {
            self.messenger.error(e);
        }
    }

    /// Runs the action of a menu item. The menu has already left the widget slot.
    pub fn run_menu_action(&mut self, action: MenuAction) {
        match action {
            MenuAction::Run(action) => self.run_action(action),
            MenuAction::Spawn(template) => self.spawn(&template),
            MenuAction::Chdir(path) => {
                let opts = self.config.general().list_options();
                if let Err(e) = self.filer.pane_mut().chdir(&path, opts) {
                    self.messenger.error(format!("{path}: {e}"));
                }
            }
            MenuAction::Shell(cmd, offset) => self.shell(&cmd, Some(offset)),
        }
    }

    fn handle_nav(&mut self, action: NavAction) -> io::Result<()> {
        let opts = self.config.general().list_options();
        let page = self.page_height() as isize;
        let pane = self.filer.pane_mut();
        match action {
            NavAction::CursorDown => pane.move_cursor(1),
            NavAction::CursorUp => pane.move_cursor(-1),
            NavAction::PageDown => pane.move_cursor(page),
            NavAction::PageUp => pane.move_cursor(-page),
            NavAction::GoToTop => pane.move_top(),
            NavAction::GoToBottom => pane.move_bottom(),
            NavAction::GoParent => pane.chdir("..", opts)?,
            NavAction::GoHome => pane.chdir("~", opts)?,
            NavAction::GoRoot => pane.chdir("/", opts)?,
            NavAction::Open => self.open()?,
            NavAction::ToggleMark => pane.toggle_mark(),
            NavAction::InvertMarks => pane.invert_marks(),
            NavAction::Reset => pane.reset(opts)?,
            NavAction::Reload => self.reload_all(),
            NavAction::Chdir => self.chdir(),
            NavAction::Glob => self.glob(),
            NavAction::Globdir => self.globdir(),
        }
        Ok(())
    }

    /// Enters the directory under the cursor, or hands the file to the configured opener.
    fn open(&mut self) -> io::Result<()> {
        let opts = self.config.general().list_options();
        if !self.filer.pane_mut().enter(opts)? {
            let opener = self.config.launcher().opener().to_string();
            self.spawn(&opener);
        }
        Ok(())
    }

    fn handle_file(&mut self, action: FileAction) {
        match action {
            FileAction::Copy => self.copy(),
            FileAction::Move => self.move_files(),
            FileAction::Rename => self.rename(),
            FileAction::BulkRename => self.bulk_rename(),
            FileAction::Remove => self.remove(),
            FileAction::Mkdir => self.mkdir(),
            FileAction::Touch => self.touch(),
            FileAction::Chmod => self.chmod(),
        }
    }

    fn handle_workspace(&mut self, action: WorkspaceAction) -> io::Result<()> {
        let opts = self.config.general().list_options();
        match action {
            WorkspaceAction::FocusNext => self.filer.workspace_mut().move_focus(1),
            WorkspaceAction::FocusPrev => self.filer.workspace_mut().move_focus(-1),
            WorkspaceAction::New => self.filer.new_workspace(opts)?,
            WorkspaceAction::Close => {
                if !self.filer.close_workspace() {
                    self.messenger.error("Cannot close the last workspace");
                }
            }
            WorkspaceAction::Next => self.filer.move_workspace(1),
            WorkspaceAction::Prev => self.filer.move_workspace(-1),
            WorkspaceAction::ChangeTitle => self.change_title(),
            WorkspaceAction::OpenPane => self.filer.workspace_mut().open_pane(opts)?,
            WorkspaceAction::ClosePane => {
                if !self.filer.workspace_mut().close_pane() {
                    self.messenger.error("A workspace keeps at least two panes");
                }
            }
            WorkspaceAction::SyncNeighbor => self.filer.workspace_mut().sync_neighbor(opts)?,
        }
        Ok(())
    }

    fn handle_system(&mut self, action: SystemAction) {
        match action {
            SystemAction::Shell => self.shell("", None),
            SystemAction::ShellSuspend => self.shell_suspend("", None),
            SystemAction::AddCustomCommand => self.add_custom_command(),
            SystemAction::DeleteCustomCommand => self.delete_custom_command(),
            SystemAction::AddBookmark => self.add_bookmark(),
            SystemAction::DeleteBookmark => self.delete_bookmark(),
            SystemAction::Quit => self.quit(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::app::App;
    use crate::app::keymap::{Action, NavAction, WorkspaceAction};
    use crate::app::menu::MenuAction;
    use crate::config::Config;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn open_enters_directories() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        fs::create_dir(dir.path().join("sub"))?;
        let (mut app, _tasks) = App::headless(Config::default(), dir.path());

        app.run_action(Action::Nav(NavAction::CursorDown));
        assert_eq!(app.filer().pane().file_name(), "sub");
        app.run_action(Action::Nav(NavAction::Open));
        assert_eq!(app.filer().pane().path(), dir.path().join("sub"));

        app.run_action(Action::Nav(NavAction::GoParent));
        assert_eq!(app.filer().pane().path(), dir.path());
        assert_eq!(app.filer().pane().file_name(), "sub");
        Ok(())
    }

    #[test]
    fn bookmark_chdir_failure_is_reported() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let (mut app, _tasks) = App::headless(Config::default(), dir.path());
        app.run_menu_action(MenuAction::Chdir(
            dir.path().join("missing").display().to_string(),
        ));
        assert_eq!(app.filer().pane().path(), dir.path());
        Ok(())
    }

    #[test]
    fn the_last_workspace_stays() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let (mut app, _tasks) = App::headless(Config::default(), dir.path());
        app.run_action(Action::Workspace(WorkspaceAction::New));
        assert_eq!(app.filer().workspaces().len(), 2);
        app.run_action(Action::Workspace(WorkspaceAction::Close));
        app.run_action(Action::Workspace(WorkspaceAction::Close));
        assert_eq!(app.filer().workspaces().len(), 1);
        Ok(())
    }
}
