//! Single-line widgets and the menu popup.

use crate::app::{App, Cmdline, MenuView};
use crate::core::FileEntry;
use crate::core::message::Level;

use chrono::{DateTime, Local};
use humansize::{DECIMAL, format_size};
use ratatui::{
    Frame,
    layout::{Position, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};
use unicode_width::UnicodeWidthStr;

/// Workspace titles, the current one highlighted.
pub(super) fn draw_tab_line(frame: &mut Frame, area: Rect, app: &App) {
    let theme = app.config().theme();
    let filer = app.filer();
    let spans: Vec<Span> = filer
        .workspaces()
        .iter()
        .enumerate()
        .map(|(idx, ws)| {
            let style = if idx == filer.current_index() {
                theme.tab_active_style()
            } else {
                theme.tab_inactive_style()
            };
            Span::styled(format!(" {}:{} ", idx + 1, ws.title()), style)
        })
        .collect();
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// `ls -l` style permission string.
fn mode_string(entry: &FileEntry) -> String {
    let kind = if entry.is_symlink() {
        'l'
    } else if entry.is_dir() {
        'd'
    } else {
        '-'
    };
    let mode = entry.mode();
    let mut out = String::with_capacity(10);
    out.push(kind);
    for shift in [6, 3, 0] {
        let bits = (mode >> shift) & 0o7;
        out.push(if bits & 0o4 != 0 { 'r' } else { '-' });
        out.push(if bits & 0o2 != 0 { 'w' } else { '-' });
        out.push(if bits & 0o1 != 0 { 'x' } else { '-' });
    }
    out
}

/// Details of the entry under the cursor and the position in the listing.
pub(super) fn draw_info_line(frame: &mut Frame, area: Rect, app: &App) {
    let pane = app.filer().pane();
    let mut parts = Vec::with_capacity(5);
    if let Some(entry) = pane.current().filter(|e| !e.is_parent()) {
        parts.push(mode_string(entry));
        parts.push(format_size(entry.size(), DECIMAL));
        if let Some(modified) = entry.modified() {
            let time: DateTime<Local> = modified.into();
            parts.push(time.format("%Y-%m-%d %H:%M").to_string());
        }
    }
    if pane.has_marks() {
        parts.push(format!("marked {}", pane.mark_count()));
    }
    parts.push(format!("{}/{}", pane.cursor() + 1, pane.entries().len()));

    let style = app.config().theme().info_line_style();
    frame.render_widget(Paragraph::new(Span::styled(parts.join("  "), style)), area);
}

pub(super) fn draw_message_line(frame: &mut Frame, area: Rect, app: &App) {
    let Some(message) = app.message_line().current() else {
        return;
    };
    let theme = app.config().theme();
    let style = match message.level() {
        Level::Info => theme.info_message_style(),
        Level::Error => theme.error_message_style(),
    };
    frame.render_widget(Paragraph::new(Span::styled(message.text(), style)), area);
}

/// Prompt and highlighted buffer, with the terminal cursor placed in the buffer.
pub(super) fn draw_cmdline(frame: &mut Frame, area: Rect, app: &App, cmdline: &Cmdline) {
    let theme = app.config().theme();
    let prompt = cmdline.mode().prompt(app);
    let buffer = cmdline.buffer();

    let column = prompt.width() + buffer.cursor_column();
    let mut spans = vec![Span::styled(prompt, theme.prompt_style())];
    spans.extend(cmdline.mode().draw(buffer.text(), theme));
    frame.render_widget(Paragraph::new(Line::from(spans)), area);

    let max = usize::from(area.width.saturating_sub(1));
    let x = area.x + column.min(max) as u16;
    frame.set_cursor_position(Position::new(x, area.y));
}

/// The open menu as a popup docked to the bottom of `area`.
pub(super) fn draw_menu(frame: &mut Frame, area: Rect, app: &App, menu: &MenuView) {
    let theme = app.config().theme();
    let items = app.menus().items(menu.id());

    let width = items
        .iter()
        .map(|item| item.accel().width() + item.label().width() + 3)
        .chain([menu.id().title().width() + 4])
        .max()
        .unwrap_or(0)
        .saturating_add(2)
        .min(usize::from(area.width)) as u16;
    let height = (items.len() + 2).min(usize::from(area.height)) as u16;
    let popup = Rect {
        x: area.x,
        y: area.y + area.height - height,
        width,
        height,
    };

    let rows: Vec<ListItem> = items
        .iter()
        .map(|item| {
            ListItem::new(Line::from(vec![
                Span::styled(item.accel(), theme.title_style()),
                Span::raw("  "),
                Span::styled(item.label(), theme.entry_style()),
            ]))
        })
        .collect();
    let mut state = ListState::default();
    state.select(Some(menu.cursor()));

    frame.render_widget(Clear, popup);
    frame.render_stateful_widget(
        List::new(rows)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(theme.border_style())
                    .title(format!(" {} ", menu.id().title())),
            )
            .highlight_style(theme.selection_style())
            .style(Style::default()),
        popup,
        &mut state,
    );
}
