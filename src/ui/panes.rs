//! Pane drawing for ferrule.
//!
//! One bordered list per pane: the title is the home-shortened path plus the active filter,
//! rows are colored by file kind and marked rows carry a marker.

use crate::app::{App, Pane};
use crate::config::Theme;
use crate::core::FileEntry;
use crate::utils::shorten_home_path;

use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
};

const MARKER: &str = "*";

/// Styles used for rendering rows of a pane.
struct PaneStyles {
    entry: Style,
    dir: Style,
    symlink: Style,
    executable: Style,
    marked: Style,
    selection: Style,
}

impl PaneStyles {
    fn from_theme(theme: &Theme) -> Self {
        Self {
            entry: theme.entry_style(),
            dir: theme.directory_style(),
            symlink: theme.symlink_style(),
            executable: theme.executable_style(),
            marked: theme.marked_style(),
            selection: theme.selection_style(),
        }
    }

    fn for_entry(&self, entry: &FileEntry, marked: bool) -> Style {
        if marked {
            self.marked
        } else if entry.is_symlink() {
            self.symlink
        } else if entry.is_dir() {
            self.dir
        } else if entry.is_executable() {
            self.executable
        } else {
            self.entry
        }
    }
}

fn pane_title(pane: &Pane) -> String {
    let path = shorten_home_path(pane.path());
    match pane.filter() {
        Some(filter) => format!(" {path} [{}] ", filter.pattern()),
        None => format!(" {path} "),
    }
}

/// Draws one pane. Only the focused pane highlights its cursor row.
pub(super) fn draw_pane(frame: &mut Frame, area: Rect, app: &App, pane: &Pane, focused: bool) {
    let theme = app.config().theme();
    let styles = PaneStyles::from_theme(theme);

    let title_style = if focused {
        theme.title_style()
    } else {
        theme.border_style()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border_style())
        .title(Span::styled(pane_title(pane), title_style));

    let items: Vec<ListItem> = pane
        .entries()
        .iter()
        .map(|entry| {
            let marked = pane.is_marked(entry.name());
            let style = styles.for_entry(entry, marked);
            let mut spans = Vec::with_capacity(3);
            spans.push(Span::raw(if marked { MARKER } else { " " }));
            spans.push(Span::styled(entry.name(), style));
            if entry.is_dir() && !entry.is_parent() {
                spans.push(Span::styled("/", style));
            } else if entry.is_symlink() {
                spans.push(Span::styled("@", style));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let mut state = ListState::default();
    state.select(Some(pane.cursor()));
    let highlight = if focused {
        styles.selection
    } else {
        Style::default()
    };

    frame.render_stateful_widget(
        List::new(items).block(block).highlight_style(highlight),
        area,
        &mut state,
    );
}
