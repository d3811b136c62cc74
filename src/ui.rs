//! Terminal UI for ferrule.
//!
//! Pure rendering: reads the [App](crate::app::App) and the theme and produces ratatui
//! widgets. Nothing in here mutates state.

mod panes;
mod render;
mod widgets;

pub(crate) use render::render;
