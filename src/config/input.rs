//! Input configuration options for ferrule
//!
//! This module defines the `[keys]` table of ferrule.toml: the idle-browser bindings. Each
//! action takes a list of keys in the syntax understood by the keymap (`"j"`, `"ctrl+n"`,
//! `"<c-n>"`, `"space"`, ...).

use serde::Deserialize;

/// Input configuration options of all actions
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Keys {
    cursor_down: Vec<String>,
    cursor_up: Vec<String>,
    page_down: Vec<String>,
    page_up: Vec<String>,
    go_to_top: Vec<String>,
    go_to_bottom: Vec<String>,
    go_parent: Vec<String>,
    go_home: Vec<String>,
    go_root: Vec<String>,
    open: Vec<String>,
    toggle_mark: Vec<String>,
    invert_marks: Vec<String>,
    reset: Vec<String>,
    reload: Vec<String>,
    focus_next: Vec<String>,
    focus_prev: Vec<String>,
    new_workspace: Vec<String>,
    close_workspace: Vec<String>,
    next_workspace: Vec<String>,
    prev_workspace: Vec<String>,

    copy: Vec<String>,
    move_file: Vec<String>,
    rename: Vec<String>,
    bulk_rename: Vec<String>,
    remove: Vec<String>,
    mkdir: Vec<String>,
    touch: Vec<String>,
    chmod: Vec<String>,
    chdir: Vec<String>,
    glob: Vec<String>,
    globdir: Vec<String>,
    shell: Vec<String>,
    shell_suspend: Vec<String>,

    command_menu: Vec<String>,
    custom_menu: Vec<String>,
    bookmark_menu: Vec<String>,
    tab_menu: Vec<String>,
    sort_menu: Vec<String>,

    quit: Vec<String>,
}

macro_rules! accessor {
    ($($name:ident),+ $(,)?) => {
        impl Keys {
            $(
                #[inline]
                pub fn $name(&self) -> &[String] {
                    &self.$name
                }
            )+
        }
    };
}

accessor!(
    cursor_down,
    cursor_up,
    page_down,
    page_up,
    go_to_top,
    go_to_bottom,
    go_parent,
    go_home,
    go_root,
    open,
    toggle_mark,
    invert_marks,
    reset,
    reload,
    focus_next,
    focus_prev,
    new_workspace,
    close_workspace,
    next_workspace,
    prev_workspace,
    copy,
    move_file,
    rename,
    bulk_rename,
    remove,
    mkdir,
    touch,
    chmod,
    chdir,
    glob,
    globdir,
    shell,
    shell_suspend,
    command_menu,
    custom_menu,
    bookmark_menu,
    tab_menu,
    sort_menu,
    quit,
);

fn keys(list: &[&str]) -> Vec<String> {
    list.iter().map(|k| k.to_string()).collect()
}

/// Default input configuration options
impl Default for Keys {
    fn default() -> Self {
        Keys {
            cursor_down: keys(&["j", "Down", "Ctrl+n"]),
            cursor_up: keys(&["k", "Up", "Ctrl+p"]),
            page_down: keys(&["PageDown", "Ctrl+v", "Ctrl+d"]),
            page_up: keys(&["PageUp", "Alt+v", "Ctrl+u"]),
            go_to_top: keys(&["Home", "^"]),
            go_to_bottom: keys(&["End", "$"]),
            go_parent: keys(&["h", "Left", "Backspace"]),
            go_home: keys(&["~"]),
            go_root: keys(&["\\"]),
            open: keys(&["Enter", "l", "Right"]),
            toggle_mark: keys(&["space"]),
            invert_marks: keys(&["`"]),
            reset: keys(&["Ctrl+g", "Esc"]),
            reload: keys(&["Ctrl+l"]),
            focus_next: keys(&["Tab", "Ctrl+f"]),
            focus_prev: keys(&["Ctrl+b"]),
            new_workspace: keys(&["Ctrl+t"]),
            close_workspace: keys(&["Ctrl+Alt+w"]),
            next_workspace: keys(&["t"]),
            prev_workspace: keys(&["Alt+t"]),

            copy: keys(&["c"]),
            move_file: keys(&["m"]),
            rename: keys(&["r"]),
            bulk_rename: keys(&["R"]),
            remove: keys(&["d", "Delete"]),
            mkdir: keys(&["K"]),
            touch: keys(&["n"]),
            chmod: keys(&["M"]),
            chdir: keys(&["D"]),
            glob: keys(&["g"]),
            globdir: keys(&["G"]),
            shell: keys(&[";"]),
            shell_suspend: keys(&[":"]),

            command_menu: keys(&["x"]),
            custom_menu: keys(&["e"]),
            bookmark_menu: keys(&["b"]),
            tab_menu: keys(&["T"]),
            sort_menu: keys(&["s"]),

            quit: keys(&["q"]),
        }
    }
}
