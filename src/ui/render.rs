//! UI renderer implementation.
//!
//! Contains the top-level [render] entry point used by the display and the layout that splits
//! the screen into the tab line, the panes of the current workspace, the info line and the
//! bottom line.

use crate::app::{App, Widget};
use crate::ui::{panes, widgets};

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
};

/// Renders one frame of the whole UI.
pub(crate) fn render(frame: &mut Frame, app: &App) {
    let [tabs, body, info, bottom] = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(frame.area());

    widgets::draw_tab_line(frame, tabs, app);
    draw_panes(frame, body, app);
    widgets::draw_info_line(frame, info, app);

    match app.next() {
        Some(Widget::Cmdline(cmdline)) => widgets::draw_cmdline(frame, bottom, app, cmdline),
        Some(Widget::Menu(menu)) => {
            widgets::draw_message_line(frame, bottom, app);
            widgets::draw_menu(frame, body, app, menu);
        }
        None => widgets::draw_message_line(frame, bottom, app),
    }
}

fn draw_panes(frame: &mut Frame, area: Rect, app: &App) {
    let workspace = app.filer().workspace();
    let count = workspace.panes().len().max(1) as u32;
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints((0..count).map(|_| Constraint::Ratio(1, count)))
        .split(area);

    for (idx, (pane, chunk)) in workspace.panes().iter().zip(chunks.iter()).enumerate() {
        panes::draw_pane(frame, *chunk, app, pane, idx == workspace.focus());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use ratatui::{Terminal, backend::TestBackend};
    use std::fs;
    use tempfile::tempdir;

    fn screen(app: &App) -> Result<String, Box<dyn std::error::Error>> {
        let mut terminal = Terminal::new(TestBackend::new(80, 20))?;
        terminal.draw(|f| render(f, app))?;
        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        Ok(text)
    }

    #[test]
    fn panes_and_prompt_are_drawn() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        fs::write(dir.path().join("alpha.txt"), "a")?;
        fs::create_dir(dir.path().join("beta"))?;
        let config = Config::default().with_list_dir(dir.path());
        let (mut app, _tasks) = App::headless(config, dir.path());

        let idle = screen(&app)?;
        assert!(idle.contains("alpha.txt"));
        assert!(idle.contains("beta/"));

        app.chdir();
        assert!(screen(&app)?.contains("Chdir to "));
        Ok(())
    }

    #[test]
    fn menu_lists_its_items() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let config = Config::default().with_list_dir(dir.path());
        let (mut app, _tasks) = App::headless(config, dir.path());
        app.set_next(Widget::Menu(crate::app::MenuView::new(
            crate::app::menu::MenuId::Sort,
        )));
        let text = screen(&app)?;
        assert!(text.contains("sort size descending"));
        Ok(())
    }
}
