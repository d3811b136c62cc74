//! Command-line argument parsing and help for ferrule.
//!
//! This module handles the flags used for config initialization and help.
//!
//! When invoked with no args/flags (fe), ferrule simply launches the TUI in the current
//! directory.

use crate::app::keymap::Keymap;
use crate::config::Config;

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum CliAction {
    RunApp,
    RunAppAtPath(String),
    Exit,
}

pub(crate) fn handle_args() -> CliAction {
    let args: Vec<String> = std::env::args().skip(1).collect();
    parse_args(&args)
}

fn parse_args(args: &[String]) -> CliAction {
    let arg = match args {
        [] => return CliAction::RunApp,
        [arg] => arg.as_str(),
        _ => {
            eprintln!("Error: ferrule accepts only one argument at a time.");
            eprintln!("Usage: fe [PATH] or fe [OPTION]");
            return CliAction::Exit;
        }
    };

    match arg {
        "--version" | "-v" => {
            print_version();
            CliAction::Exit
        }
        "-h" | "--help" => {
            print_help();
            CliAction::Exit
        }
        "--config-help" => {
            print_config_help();
            CliAction::Exit
        }
        "--keybinds" | "--keybind" | "--key" => {
            print_keybinds();
            CliAction::Exit
        }
        "--init" => {
            let path = Config::default_path();
            match Config::generate_default(&path) {
                Ok(()) => println!("Wrote {}", path.display()),
                Err(e) => eprintln!("Error: {}", e),
            }
            CliAction::Exit
        }
        arg if !arg.starts_with('-') && !arg.trim().is_empty() => {
            CliAction::RunAppAtPath(arg.to_string())
        }
        arg => {
            eprintln!("Unknown argument: {}", arg);
            eprintln!("Try --help for available options");
            CliAction::Exit
        }
    }
}

fn print_version() {
    println!("ferrule {}", env!("CARGO_PKG_VERSION"));
}

fn print_help() {
    println!(
        r#"ferrule - A keyboard-driven terminal file shell

USAGE:
  fe [PATH]

PATH:
  Directory to open (defaults to current directory)

OPTIONS:
      --init              Generate the default configuration
      --config-help       Display all the configuration options
      --keybinds          Display the effective keybinds
  -h, --help              Print help information
  -v, --version           Display the current installed version of ferrule

ENVIRONMENT:
  FERRULE_CONFIG          Override the default config path
  FERRULE_LOG             Log filter, e.g. "debug" or "ferrule=trace"
"#
    );
}

/// Prints the bindings of the loaded configuration, one action per line.
fn print_keybinds() {
    let config = Config::load();
    let keymap = Keymap::from_config(&config);
    let mut last = String::new();
    let mut line = String::new();
    for (key, action) in keymap.describe() {
        let name = format!("{action:?}");
        if name != last {
            if !line.is_empty() {
                println!("{line}");
            }
            line = format!("  {name:<40}{key}");
            last = name;
        } else {
            line.push_str(", ");
            line.push_str(&key);
        }
    }
    if !line.is_empty() {
        println!("{line}");
    }
}

fn print_config_help() {
    let help_text = r##"
ferrule - Configuration Guide (ferrule.toml)

=========================
 General Settings
=========================
[general]
  dirs_first                 Sort directories before files [default: true]
  show_hidden                Show hidden files (dotfiles)
  case_insensitive           Ignore case when sorting by name [default: true]
  message_seconds            How long a message stays on the message line [default: 5]
  move_to_trash              Move files to the trash bin instead of deleting them
  custom_commands            Custom command list file [default: ~/.ferrule/commands]
  bookmarks                  Bookmark list file [default: ~/.ferrule/bookmarks]
  log_file                   Log file, empty to disable [default: ~/.ferrule/ferrule.log]

=========================
 Launcher
=========================
[launcher]
  shell                      Argv template for shell commands, "{cmd}" is the command
  terminal                   Argv template for commands ending in %&
  opener                     Command run by Enter on a file [default: xdg-open %f %&]

=========================
 Theme Configuration
=========================
Each sub-table supports fg/bg colors ("Red", "Blue", hex "#RRGGBB", or "default"):

[theme.entry]                Normal entries
[theme.directory]            Directory entries
[theme.symlink]              Symlinks
[theme.executable]           Executable files
[theme.marked]               Marked entries
[theme.selection]            Cursor row of the focused pane
[theme.border]               Pane borders
[theme.title]                Focused pane title and menu accelerators
[theme.tab_active]           Current workspace on the tab line
[theme.tab_inactive]         Other workspaces
[theme.prompt]               Command line prompt
[theme.cmdline]              Command line text
[theme.command_word]         Known commands in the shell prompt
[theme.macro_word]           Macros like %f in the shell prompt
[theme.option_word]          Options like -r in the shell prompt
[theme.info_message]         Info messages
[theme.error_message]        Error messages
[theme.info_line]            File details under the panes

=========================
 Keys
=========================
[keys]
  Every action takes a list of keys, e.g. copy = ["c", "Ctrl+y"].
  Run `fe --keybinds` to list the actions and their current keys.

  Syntax Reference:
    Modifiers: <c-x> (Ctrl), <m-x>/<a-x> (Alt/Meta), <s-x> (Shift)
    Standard:  ctrl+x, alt+x, shift+x, meta+x
    Special:   " ", "space", "back", "enter", "esc", "tab", "delete", "pageup", "f1"
"##;

    println!("{}", help_text);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn paths_and_flags() {
        assert_eq!(parse_args(&[]), CliAction::RunApp);
        assert_eq!(
            parse_args(&args(&["/tmp"])),
            CliAction::RunAppAtPath("/tmp".into())
        );
        assert_eq!(parse_args(&args(&["--bogus"])), CliAction::Exit);
        assert_eq!(parse_args(&args(&["a", "b"])), CliAction::Exit);
    }
}
