//! Launcher configuration for ferrule.
//!
//! The `[launcher]` table holds the argv templates used to run commands and the opener used
//! when Enter is pressed on a file. Templates use `{cmd}` as the placeholder for the
//! expanded command.
//!
//! ```toml
//! [launcher]
//! shell = ["bash", "-c", "{cmd}"]
//! terminal = ["tmux", "new-window", "-n", "{cmd}", "{cmd};read -p \"HIT ENTER KEY\""]
//! opener = "xdg-open %f %&"
//! ```

use crate::core::spawn::Launcher;

use serde::Deserialize;

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct LauncherConfig {
    shell: Vec<String>,
    terminal: Vec<String>,
    opener: String,
}

fn strings(args: &[&str]) -> Vec<String> {
    args.iter().map(|s| s.to_string()).collect()
}

/// `bash` when installed, else the POSIX `sh`.
fn posix_shell() -> &'static str {
    if which::which("bash").is_ok() {
        "bash"
    } else {
        "sh"
    }
}

/// True when running inside tmux or screen.
fn in_multiplexer() -> bool {
    std::env::var_os("TMUX").is_some()
        || std::env::var("TERM").is_ok_and(|term| term.contains("screen"))
}

impl Default for LauncherConfig {
    fn default() -> Self {
        if cfg!(windows) {
            LauncherConfig {
                shell: strings(&["powershell", "-Command", "{cmd}"]),
                terminal: strings(&["powershell", "-Command", "{cmd}"]),
                opener: "explorer '%~f' %&".into(),
            }
        } else if cfg!(target_os = "macos") {
            LauncherConfig {
                shell: strings(&["zsh", "-c", "{cmd}"]),
                terminal: strings(&["zsh", "-c", "{cmd}"]),
                opener: "open %f %&".into(),
            }
        } else {
            const TAIL: &str = ";read -p \"HIT ENTER KEY\"";
            let terminal = if in_multiplexer() {
                vec![
                    "tmux".into(),
                    "new-window".into(),
                    "-n".into(),
                    "{cmd}".into(),
                    format!("{{cmd}}{TAIL}"),
                ]
            } else {
                vec![
                    "gnome-terminal".into(),
                    "--".into(),
                    posix_shell().into(),
                    "-c".into(),
                    format!("echo -n '\\033]0;{{cmd}}\\007';{{cmd}}{TAIL}"),
                ]
            };
            LauncherConfig {
                shell: strings(&[posix_shell(), "-c", "{cmd}"]),
                terminal,
                opener: "xdg-open %f %&".into(),
            }
        }
    }
}

impl LauncherConfig {
    pub fn launcher(&self) -> Launcher {
        Launcher::new(self.shell.clone(), self.terminal.clone())
    }

    #[inline]
    pub fn opener(&self) -> &str {
        &self.opener
    }
}
