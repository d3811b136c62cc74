//! Application layer for ferrule.
//!
//! - [state]: the [App] struct and its interaction loop.
//! - [filer]: workspaces, panes and their listings.
//! - [cmdline]: the line editor and the [Cmdline] widget.
//! - [modes]: every prompting operation as a [Mode].
//! - [menu]: the menu registry and the [MenuView] widget.
//! - [keymap]: key bindings for the idle browser.
//! - [listfile]: the persisted custom-command and bookmark lists.
//! - [handlers]: idle key dispatch.

pub mod cmdline;
pub mod filer;
pub mod handlers;
pub mod keymap;
pub mod listfile;
pub mod menu;
pub mod modes;
pub mod state;

pub use cmdline::Cmdline;
pub use filer::{Filer, Pane, Workspace};
pub use menu::{MenuView, Menus};
pub use modes::Mode;
pub use state::{App, Callback, Widget};
