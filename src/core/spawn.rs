//! Process runner for ferrule.
//!
//! External commands are started in one of two ways:
//! - [spawn]: the child runs detached from the terminal with its output captured. A short-lived
//!   thread waits for it and reports the outcome through the [Messenger] exactly once.
//! - [spawn_suspend]: the screen is torn down, the child inherits the real standard streams and
//!   runs to completion, then the screen is restored no matter how the child ended.
//!
//! Which argv is used for a command is decided by the [Launcher].

use crate::core::error::{Error, Result};
use crate::core::message::Messenger;

use std::io;
use std::process::{Child, Command, Stdio};
use std::thread;

/// Placeholder replaced by the command string in launcher templates.
pub const CMD_PLACEHOLDER: &str = "{cmd}";

/// Maps a command string to an argv vector.
///
/// The shell template runs background commands (`%&`), the terminal template runs everything else.
#[derive(Debug, Clone)]
pub struct Launcher {
    shell: Vec<String>,
    terminal: Vec<String>,
}

impl Launcher {
    pub fn new(shell: Vec<String>, terminal: Vec<String>) -> Self {
        Self { shell, terminal }
    }

    pub fn shell(&self, cmd: &str) -> Result<Vec<String>> {
        fill(&self.shell, cmd, "shell")
    }

    pub fn terminal(&self, cmd: &str) -> Result<Vec<String>> {
        fill(&self.terminal, cmd, "terminal")
    }

    pub fn argv(&self, cmd: &str, background: bool) -> Result<Vec<String>> {
        if background {
            self.shell(cmd)
        } else {
            self.terminal(cmd)
        }
    }
}

fn fill(template: &[String], cmd: &str, which: &'static str) -> Result<Vec<String>> {
    if template.is_empty() {
        return Err(Error::EmptyLauncher(which));
    }
    let mut placed = false;
    let mut argv: Vec<String> = template
        .iter()
        .map(|arg| {
            if arg.contains(CMD_PLACEHOLDER) {
                placed = true;
                arg.replace(CMD_PLACEHOLDER, cmd)
            } else {
                arg.clone()
            }
        })
        .collect();
    if !placed {
        argv.push(cmd.to_string());
    }
    Ok(argv)
}

/// How a captured process ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Exit status zero, with whatever the child printed on stdout.
    Succeeded(String),
    /// Non-zero exit or a failed wait, with a description built from stderr.
    Failed(String),
}

/// A started child whose output is being captured.
#[derive(Debug)]
pub struct PendingProcess {
    command: String,
    child: Child,
}

impl PendingProcess {
    /// Starts `argv` with stdout and stderr piped and stdin closed.
    pub fn start(argv: &[String]) -> Result<Self> {
        let command = argv.join(" ");
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| Error::spawn("", io::Error::from(io::ErrorKind::InvalidInput)))?;
        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::spawn(command.as_str(), e))?;
        tracing::debug!(pid = child.id(), "started `{command}'");
        Ok(Self { command, child })
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// Blocks until the child exits.
    pub fn wait(self) -> Outcome {
        let Self { command, child } = self;
        match child.wait_with_output() {
            Ok(output) if output.status.success() => {
                Outcome::Succeeded(String::from_utf8_lossy(&output.stdout).trim_end().to_string())
            }
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                let detail = stderr.trim_end();
                if detail.is_empty() {
                    Outcome::Failed(format!("{command}: {}", output.status))
                } else {
                    Outcome::Failed(format!("{command}: {detail}"))
                }
            }
            Err(e) => Outcome::Failed(format!("{command}: {e}")),
        }
    }

    /// Waits and posts the result: errors always, stdout only when non-empty.
    pub fn report(self, messenger: &Messenger) {
        match self.wait() {
            Outcome::Succeeded(out) if out.is_empty() => {}
            Outcome::Succeeded(out) => messenger.info(out),
            Outcome::Failed(err) => messenger.error(err),
        }
    }
}

/// Starts `argv` without blocking.
///
/// The command line is posted as info before starting. A start failure is returned to the
/// caller; everything after that is reported asynchronously.
pub fn spawn(argv: &[String], messenger: &Messenger) -> Result<()> {
    messenger.info(argv.join(" "));
    let pending = PendingProcess::start(argv)?;
    let messenger = messenger.clone();
    thread::Builder::new()
        .name("ferrule-wait".into())
        .spawn(move || pending.report(&messenger))?;
    Ok(())
}

/// Something that can hand the terminal over to a child process and take it back.
pub trait Suspend {
    fn suspend(&mut self) -> io::Result<()>;
    fn resume(&mut self) -> io::Result<()>;
}

/// Runs `argv` in the foreground with the screen suspended.
///
/// The screen is resumed even if the child could not be started or exited abnormally.
pub fn spawn_suspend<S: Suspend + ?Sized>(
    argv: &[String],
    screen: &mut S,
    messenger: &Messenger,
) -> Result<()> {
    let command = argv.join(" ");
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| Error::spawn("", io::Error::from(io::ErrorKind::InvalidInput)))?;

    screen.suspend()?;
    let status = Command::new(program).args(args).status();
    let resumed = screen.resume();

    messenger.info(command.as_str());
    match status {
        Ok(status) if !status.success() => {
            tracing::warn!("`{command}' exited with {status}");
        }
        Ok(_) => {}
        Err(e) => return Err(Error::spawn(command, e)),
    }
    resumed?;
    Ok(())
}
