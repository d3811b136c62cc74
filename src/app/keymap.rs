//! Key mapping for the idle browser.
//!
//! Maps keys to an [Action], parsing bindings from the `[keys]` config table, and defines the
//! action enums shared with the menus.

use crate::app::menu::MenuId;
use crate::core::fm::SortKey;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;

/// Represents any action in the app: navigation, file, workspace, menu or system.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Action {
    Nav(NavAction),
    File(FileAction),
    Workspace(WorkspaceAction),
    Menu(MenuId),
    Sort(SortKey),
    System(SystemAction),
}

/// Cursor, directory and mark actions on the focused pane.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum NavAction {
    CursorDown,
    CursorUp,
    PageDown,
    PageUp,
    GoToTop,
    GoToBottom,
    GoParent,
    GoHome,
    GoRoot,
    Open,
    ToggleMark,
    InvertMarks,
    Reset,
    Reload,
    Chdir,
    Glob,
    Globdir,
}

/// Actions that enter a file-operation mode.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum FileAction {
    Copy,
    Move,
    Rename,
    BulkRename,
    Remove,
    Mkdir,
    Touch,
    Chmod,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum WorkspaceAction {
    FocusNext,
    FocusPrev,
    New,
    Close,
    Next,
    Prev,
    ChangeTitle,
    OpenPane,
    ClosePane,
    SyncNeighbor,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum SystemAction {
    Shell,
    ShellSuspend,
    AddCustomCommand,
    DeleteCustomCommand,
    AddBookmark,
    DeleteBookmark,
    Quit,
}

/// Key + modifiers as used in keybind/keymap
#[derive(Hash, Eq, PartialEq, Copy, Clone, Debug)]
pub struct Key {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

/// Stores the mapping from Key to action, which is built in the config
#[derive(Debug)]
pub struct Keymap {
    map: HashMap<Key, Action>,
}

impl Keymap {
    /// Builds the keymap from the config
    #[rustfmt::skip]
    pub fn from_config(config: &crate::config::Config) -> Self {
        let mut map = HashMap::new();
        let keys = config.keys();

        macro_rules! bind {
            ($keys:expr, $action:expr) => {
                bind($keys, $action, &mut map);
            };
        }

        use NavAction as N;
        use FileAction as F;
        use WorkspaceAction as W;
        use SystemAction as S;

        // NavActions
        bind!(keys.cursor_down(),       Action::Nav(N::CursorDown));
        bind!(keys.cursor_up(),         Action::Nav(N::CursorUp));
        bind!(keys.page_down(),         Action::Nav(N::PageDown));
        bind!(keys.page_up(),           Action::Nav(N::PageUp));
        bind!(keys.go_to_top(),         Action::Nav(N::GoToTop));
        bind!(keys.go_to_bottom(),      Action::Nav(N::GoToBottom));
        bind!(keys.go_parent(),         Action::Nav(N::GoParent));
        bind!(keys.go_home(),           Action::Nav(N::GoHome));
        bind!(keys.go_root(),           Action::Nav(N::GoRoot));
        bind!(keys.open(),              Action::Nav(N::Open));
        bind!(keys.toggle_mark(),       Action::Nav(N::ToggleMark));
        bind!(keys.invert_marks(),      Action::Nav(N::InvertMarks));
        bind!(keys.reset(),             Action::Nav(N::Reset));
        bind!(keys.reload(),            Action::Nav(N::Reload));
        bind!(keys.chdir(),             Action::Nav(N::Chdir));
        bind!(keys.glob(),              Action::Nav(N::Glob));
        bind!(keys.globdir(),           Action::Nav(N::Globdir));

        // FileActions
        bind!(keys.copy(),              Action::File(F::Copy));
        bind!(keys.move_file(),         Action::File(F::Move));
        bind!(keys.rename(),            Action::File(F::Rename));
        bind!(keys.bulk_rename(),       Action::File(F::BulkRename));
        bind!(keys.remove(),            Action::File(F::Remove));
        bind!(keys.mkdir(),             Action::File(F::Mkdir));
        bind!(keys.touch(),             Action::File(F::Touch));
        bind!(keys.chmod(),             Action::File(F::Chmod));

        // WorkspaceActions
        bind!(keys.focus_next(),        Action::Workspace(W::FocusNext));
        bind!(keys.focus_prev(),        Action::Workspace(W::FocusPrev));
        bind!(keys.new_workspace(),     Action::Workspace(W::New));
        bind!(keys.close_workspace(),   Action::Workspace(W::Close));
        bind!(keys.next_workspace(),    Action::Workspace(W::Next));
        bind!(keys.prev_workspace(),    Action::Workspace(W::Prev));

        // Menus
        bind!(keys.command_menu(),      Action::Menu(MenuId::Command));
        bind!(keys.custom_menu(),       Action::Menu(MenuId::Custom));
        bind!(keys.bookmark_menu(),     Action::Menu(MenuId::Bookmark));
        bind!(keys.tab_menu(),          Action::Menu(MenuId::Tab));
        bind!(keys.sort_menu(),         Action::Menu(MenuId::Sort));

        // SystemActions
        bind!(keys.shell(),             Action::System(S::Shell));
        bind!(keys.shell_suspend(),     Action::System(S::ShellSuspend));
        bind!(keys.quit(),              Action::System(S::Quit));

        Keymap { map }
    }

    /// Looks up the action for a given key event
    pub fn lookup(&self, key: KeyEvent) -> Option<Action> {
        let k = Key {
            code: key.code,
            modifiers: key.modifiers,
        };

        if let Some(action) = self.map.get(&k).copied() {
            return Some(action);
        }

        if matches!(key.code, KeyCode::Char(_)) && key.modifiers.contains(KeyModifiers::SHIFT) {
            let k2 = Key {
                code: key.code,
                modifiers: key.modifiers - KeyModifiers::SHIFT,
            };
            return self.map.get(&k2).copied();
        }
        None
    }

    /// Bindings sorted for the `--keybinds` listing.
    pub fn describe(&self) -> Vec<(String, Action)> {
        let mut out: Vec<_> = self
            .map
            .iter()
            .map(|(key, action)| (describe_key(key), *action))
            .collect();
        out.sort_by(|a, b| format!("{:?}", a.1).cmp(&format!("{:?}", b.1)).then(a.0.cmp(&b.0)));
        out
    }
}

fn describe_key(key: &Key) -> String {
    let mut parts = Vec::new();
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        parts.push("Ctrl".to_string());
    }
    if key.modifiers.contains(KeyModifiers::ALT) {
        parts.push("Alt".to_string());
    }
    if key.modifiers.contains(KeyModifiers::SHIFT) {
        parts.push("Shift".to_string());
    }
    parts.push(match key.code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::F(n) => format!("F{n}"),
        other => format!("{other:?}"),
    });
    parts.join("+")
}

pub(crate) fn parse_key(s: &str) -> Option<Key> {
    let mut modifiers = KeyModifiers::NONE;
    let mut code: Option<KeyCode> = None;

    let is_bracketed = s.starts_with('<') && s.ends_with('>') && s.len() > 2;
    let mut input = if is_bracketed {
        s[1..s.len() - 1].to_string()
    } else {
        s.to_string()
    };

    if is_bracketed && input.contains('-') {
        let parts: Vec<&str> = input.split('-').collect();

        for &prefix in parts.iter().take(parts.len().saturating_sub(1)) {
            match prefix.to_lowercase().as_str() {
                "c" | "ctrl" => modifiers |= KeyModifiers::CONTROL,
                "a" | "m" | "alt" => modifiers |= KeyModifiers::ALT,
                "s" | "shift" => modifiers |= KeyModifiers::SHIFT,
                _ => return None,
            }
        }
        input = parts.last()?.to_string();
    }

    // a lone separator character is a key of its own
    if input.chars().count() == 1 {
        let c = input.chars().next()?;
        return Some(Key {
            code: KeyCode::Char(c),
            modifiers,
        });
    }

    for part in input.split('+') {
        let p_low = part.to_lowercase();
        match p_low.as_str() {
            "ctrl" | "control" => modifiers |= KeyModifiers::CONTROL,
            "alt" | "meta" => modifiers |= KeyModifiers::ALT,
            "shift" => modifiers |= KeyModifiers::SHIFT,

            "up" => code = Some(KeyCode::Up),
            "down" => code = Some(KeyCode::Down),
            "left" => code = Some(KeyCode::Left),
            "right" => code = Some(KeyCode::Right),
            "enter" => code = Some(KeyCode::Enter),
            "esc" => code = Some(KeyCode::Esc),
            "backspace" | "back" => code = Some(KeyCode::Backspace),
            "tab" => code = Some(KeyCode::Tab),
            "space" | "spc" => code = Some(KeyCode::Char(' ')),
            "pagedown" | "pgdn" => code = Some(KeyCode::PageDown),
            "pageup" | "pgup" => code = Some(KeyCode::PageUp),
            "home" => code = Some(KeyCode::Home),
            "end" => code = Some(KeyCode::End),
            "delete" | "del" => code = Some(KeyCode::Delete),
            "insert" | "ins" => code = Some(KeyCode::Insert),

            _ => {
                if part.chars().count() == 1 {
                    let mut c = part.chars().next()?;
                    if modifiers.contains(KeyModifiers::SHIFT) {
                        c = c.to_ascii_uppercase();
                    }
                    code = Some(KeyCode::Char(c));
                } else if p_low.starts_with('f')
                    && p_low.len() > 1
                    && p_low[1..].chars().all(|c| c.is_ascii_digit())
                {
                    let n = p_low[1..].parse().ok()?;
                    code = Some(KeyCode::F(n));
                } else if part.is_empty() {
                    // "ctrl++" binds the plus key
                    code = Some(KeyCode::Char('+'));
                } else {
                    return None;
                }
            }
        }
    }

    Some(Key {
        code: code?,
        modifiers,
    })
}

fn bind(key_list: &[String], action: Action, map: &mut HashMap<Key, Action>) {
    for k in key_list {
        match parse_key(k) {
            Some(key) => {
                map.insert(key, action);
            }
            None => tracing::warn!("ignoring unknown key binding `{k}'"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> Key {
        Key { code, modifiers }
    }

    #[test]
    fn parses_key_syntaxes() {
        assert_eq!(parse_key("j"), Some(key(KeyCode::Char('j'), KeyModifiers::NONE)));
        assert_eq!(parse_key("<c-n>"), Some(key(KeyCode::Char('n'), KeyModifiers::CONTROL)));
        assert_eq!(parse_key("Ctrl+n"), Some(key(KeyCode::Char('n'), KeyModifiers::CONTROL)));
        assert_eq!(
            parse_key("Ctrl+Alt+w"),
            Some(key(KeyCode::Char('w'), KeyModifiers::CONTROL | KeyModifiers::ALT))
        );
        assert_eq!(parse_key("PageDown"), Some(key(KeyCode::PageDown, KeyModifiers::NONE)));
        assert_eq!(parse_key("space"), Some(key(KeyCode::Char(' '), KeyModifiers::NONE)));
        assert_eq!(parse_key("F5"), Some(key(KeyCode::F(5), KeyModifiers::NONE)));
        assert_eq!(parse_key("-"), Some(key(KeyCode::Char('-'), KeyModifiers::NONE)));
        assert_eq!(parse_key("+"), Some(key(KeyCode::Char('+'), KeyModifiers::NONE)));
        assert_eq!(parse_key("Shift+x"), Some(key(KeyCode::Char('X'), KeyModifiers::SHIFT)));
        assert_eq!(parse_key("nonsense"), None);
    }

    #[test]
    fn default_bindings_resolve() {
        let keymap = Keymap::from_config(&Config::default());
        let plain = |c| KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE);

        assert_eq!(keymap.lookup(plain('c')), Some(Action::File(FileAction::Copy)));
        assert_eq!(keymap.lookup(plain(';')), Some(Action::System(SystemAction::Shell)));
        assert_eq!(keymap.lookup(plain('x')), Some(Action::Menu(MenuId::Command)));
        assert_eq!(
            keymap.lookup(KeyEvent::new(KeyCode::Char('R'), KeyModifiers::SHIFT)),
            Some(Action::File(FileAction::BulkRename))
        );
        assert_eq!(
            keymap.lookup(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)),
            Some(Action::Nav(NavAction::Open))
        );
        assert_eq!(keymap.lookup(plain('Z')), None);
    }
}
