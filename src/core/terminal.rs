//! Terminal setup/teardown and the input producer for ferrule.
//!
//! [TerminalDisplay] owns the raw-mode alternate screen and draws the app with ratatui. The
//! input producer is a plain thread that polls crossterm and pushes every event into the app's
//! event channel. While the screen is suspended for a foreground child the producer stops
//! reading, so the child gets the keyboard. [InputGate::pause] returns only once the producer
//! is out of `poll`/`read`.

use crate::app::App;
use crate::core::spawn::Suspend;
use crate::ui;

use crossbeam_channel::{Receiver, Sender, TryRecvError, bounded, select};
use crossterm::{
    cursor::{Hide, Show},
    event::{self, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use std::io::{self, Stdout};
use std::thread;
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A screen the app can render to.
pub trait Display: Suspend {
    fn render(&mut self, app: &App) -> io::Result<()>;
    fn size(&self) -> io::Result<(u16, u16)>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputControl {
    Pause,
    Resume,
}

/// Stops and restarts the input producer over a rendezvous channel.
#[derive(Debug, Clone)]
pub struct InputGate {
    control: Sender<InputControl>,
}

impl InputGate {
    /// Creates the gate and the receiving end for [spawn_input].
    pub fn channel() -> (Self, Receiver<InputControl>) {
        let (control, rx) = bounded(0);
        (Self { control }, rx)
    }

    /// Blocks until the producer has stopped reading input.
    pub fn pause(&self) {
        if self.control.send(InputControl::Pause).is_err() {
            tracing::debug!("input producer already gone");
        }
    }

    pub fn resume(&self) {
        if self.control.send(InputControl::Resume).is_err() {
            tracing::debug!("input producer already gone");
        }
    }
}

pub struct TerminalDisplay {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    gate: InputGate,
    active: bool,
}

impl TerminalDisplay {
    /// Enters raw mode and the alternate screen.
    pub fn new(gate: InputGate) -> io::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, Hide)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(Self {
            terminal,
            gate,
            active: true,
        })
    }

    fn enter(&mut self) -> io::Result<()> {
        enable_raw_mode()?;
        execute!(self.terminal.backend_mut(), EnterAlternateScreen, Hide)?;
        self.active = true;
        self.terminal.clear()
    }

    fn leave(&mut self) -> io::Result<()> {
        if self.active {
            self.active = false;
            disable_raw_mode()?;
            execute!(self.terminal.backend_mut(), LeaveAlternateScreen, Show)?;
        }
        Ok(())
    }
}

impl Suspend for TerminalDisplay {
    fn suspend(&mut self) -> io::Result<()> {
        self.gate.pause();
        self.leave()
    }

    fn resume(&mut self) -> io::Result<()> {
        let entered = self.enter();
        self.gate.resume();
        entered
    }
}

impl Display for TerminalDisplay {
    fn render(&mut self, app: &App) -> io::Result<()> {
        self.terminal.draw(|frame| ui::render(frame, app))?;
        Ok(())
    }

    fn size(&self) -> io::Result<(u16, u16)> {
        let size = self.terminal.size()?;
        Ok((size.width, size.height))
    }
}

impl Drop for TerminalDisplay {
    fn drop(&mut self) {
        if let Err(e) = self.leave() {
            tracing::error!("failed to restore the terminal: {e}");
        }
    }
}

/// Blocks until the gate resumes. False when the gate is gone.
fn wait_resume(control: &Receiver<InputControl>) -> bool {
    loop {
        match control.recv() {
            Ok(InputControl::Resume) => return true,
            Ok(InputControl::Pause) => {}
            Err(_) => return false,
        }
    }
}

/// Hands `event` to the app while still answering the gate. False when either side is gone.
fn forward(event: Event, tx: &Sender<Event>, control: &Receiver<InputControl>) -> bool {
    loop {
        select! {
            send(tx, event.clone()) -> sent => return sent.is_ok(),
            recv(control) -> cmd => match cmd {
                Ok(InputControl::Pause) => {
                    if !wait_resume(control) {
                        return false;
                    }
                }
                Ok(InputControl::Resume) => {}
                Err(_) => return false,
            },
        }
    }
}

/// The producer loop. `read` waits up to the given timeout for one event.
fn produce<F>(mut read: F, tx: &Sender<Event>, control: &Receiver<InputControl>) -> io::Result<()>
where
    F: FnMut(Duration) -> io::Result<Option<Event>>,
{
    loop {
        match control.try_recv() {
            Ok(InputControl::Pause) => {
                if !wait_resume(control) {
                    return Ok(());
                }
                continue;
            }
            Ok(InputControl::Resume) | Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => return Ok(()),
        }
        let Some(event) = read(POLL_INTERVAL)? else {
            continue;
        };
        if !forward(event, tx, control) {
            return Ok(());
        }
    }
}

/// Starts the input producer.
///
/// The thread ends when the app drops its receiver, the gate is dropped, or the terminal stops
/// delivering events.
pub fn spawn_input(tx: Sender<Event>, control: Receiver<InputControl>) -> io::Result<()> {
    thread::Builder::new()
        .name("ferrule-input".into())
        .spawn(move || {
            let read = |timeout: Duration| -> io::Result<Option<Event>> {
                if event::poll(timeout)? {
                    event::read().map(Some)
                } else {
                    Ok(None)
                }
            };
            if let Err(e) = produce(read, &tx, &control) {
                tracing::error!("input producer stopped: {e}");
            }
        })?;
    Ok(())
}

/// Takes over the terminal and runs `app` until it quits.
///
/// The terminal is restored when the display is dropped, also on error.
pub fn run_terminal(mut app: App) -> io::Result<()> {
    let (gate, control) = InputGate::channel();
    let display = TerminalDisplay::new(gate)?;
    app.attach_display(Box::new(display));
    spawn_input(app.event_sender(), control)?;
    app.run()
}
