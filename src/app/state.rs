//! Application state and interaction loop for ferrule.
//!
//! [App] owns everything the loop touches: the configuration, the listing ([Filer]), the menu
//! registry, the message line, the file worker handle and the one active widget slot.
//!
//! Three sources feed the loop:
//! - input events from the producer thread (capacity 1),
//! - suspend/resume signals sent in pairs around a blocking dialog (capacity 2),
//! - deferred callbacks from the file worker (rendezvous).
//!
//! Messages posted through the [Messenger] are drained before every draw. All UI state is
//! mutated on the loop thread only.

use crate::app::cmdline::Cmdline;
use crate::app::filer::Filer;
use crate::app::keymap::Keymap;
use crate::app::menu::{MenuView, Menus};
use crate::app::modes::{DialogMode, Mode};
use crate::config::Config;
use crate::core::macros::expand;
use crate::core::message::{Message, MessageLine, Messenger};
use crate::core::spawn::{self, Launcher, Suspend};
use crate::core::terminal::Display;
use crate::core::worker::{FileTask, Workers};

use crossbeam_channel::{Receiver, Sender, bounded, select};
use crossterm::event::{Event, KeyEvent, KeyEventKind};

use std::io;
use std::path::Path;
use std::time::Duration;

/// Work shipped to the loop thread and run there with full access to the app.
pub type Callback = Box<dyn FnOnce(&mut App) + Send>;

/// How long the loop waits when there is no message to expire.
const IDLE_TICK: Duration = Duration::from_millis(500);

/// The single modal widget slot.
#[derive(Debug)]
pub enum Widget {
    Cmdline(Cmdline),
    Menu(MenuView),
}

/// Stand-in screen for headless runs.
struct NoScreen;

impl Suspend for NoScreen {
    fn suspend(&mut self) -> io::Result<()> {
        Ok(())
    }
    fn resume(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Main struct which holds the central application state of ferrule.
pub struct App {
    pub(crate) config: Config,
    pub(crate) keymap: Keymap,
    pub(crate) launcher: Launcher,
    pub(crate) filer: Filer,
    pub(crate) menus: Menus,
    pub(crate) next: Option<Widget>,

    pub(crate) messenger: Messenger,
    messages: Receiver<Message>,
    pub(crate) message_line: MessageLine,

    pub(crate) workers: Workers,
    display: Option<Box<dyn Display>>,
    size: (u16, u16),

    pub(crate) exit: bool,
    pub(crate) dialog_result: Option<String>,

    event_tx: Sender<Event>,
    event_rx: Receiver<Event>,
    interrupt_tx: Sender<()>,
    interrupt_rx: Receiver<()>,
    callback_rx: Receiver<Callback>,
}

impl App {
    /// Creates the app with a running file worker.
    pub fn new(config: Config, path: &Path) -> Self {
        Self::build(config, path, Workers::spawn)
    }

    /// Creates an app without a display and whose file tasks are only queued.
    ///
    /// The returned receiver yields every task the modes submit.
    pub fn headless(config: Config, path: &Path) -> (Self, Receiver<FileTask>) {
        let (workers, tasks) = Workers::detached();
        (Self::build(config, path, move |_, _| workers), tasks)
    }

    fn build(
        config: Config,
        path: &Path,
        workers: impl FnOnce(Sender<Callback>, Messenger) -> Workers,
    ) -> Self {
        let (event_tx, event_rx) = bounded::<Event>(1);
        let (interrupt_tx, interrupt_rx) = bounded::<()>(2);
        let (callback_tx, callback_rx) = bounded::<Callback>(0);
        let (messenger, messages) = Messenger::channel();

        let workers = workers(callback_tx, messenger.clone());
        let mut menus = Menus::defaults();
        menus.load_lists(config.general(), &messenger);

        let mut app = Self {
            keymap: Keymap::from_config(&config),
            launcher: config.launcher().launcher(),
            message_line: MessageLine::new(config.general().message_ttl()),
            filer: Filer::new(path),
            menus,
            next: None,
            messenger,
            messages,
            workers,
            display: None,
            size: (80, 24),
            exit: false,
            dialog_result: None,
            event_tx,
            event_rx,
            interrupt_tx,
            interrupt_rx,
            callback_rx,
            config,
        };
        app.reload_all();
        app
    }

    // Getters / accessors

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[inline]
    pub fn filer(&self) -> &Filer {
        &self.filer
    }

    #[inline]
    pub fn filer_mut(&mut self) -> &mut Filer {
        &mut self.filer
    }

    #[inline]
    pub fn menus(&self) -> &Menus {
        &self.menus
    }

    #[inline]
    pub fn next(&self) -> Option<&Widget> {
        self.next.as_ref()
    }

    /// The active command line, if that is what the widget slot holds.
    pub fn cmdline(&self) -> Option<&Cmdline> {
        match &self.next {
            Some(Widget::Cmdline(c)) => Some(c),
            _ => None,
        }
    }

    #[inline]
    pub fn message_line(&self) -> &MessageLine {
        &self.message_line
    }

    #[inline]
    pub fn messenger(&self) -> &Messenger {
        &self.messenger
    }

    #[inline]
    pub fn should_exit(&self) -> bool {
        self.exit
    }

    #[inline]
    pub fn size(&self) -> (u16, u16) {
        self.size
    }

    /// Sender for the input producer.
    pub fn event_sender(&self) -> Sender<Event> {
        self.event_tx.clone()
    }

    pub fn attach_display(&mut self, display: Box<dyn Display>) {
        if let Ok(size) = display.size() {
            self.size = size;
        }
        self.display = Some(display);
    }

    /// Installs `widget` in the slot, replacing whatever was there.
    pub fn set_next(&mut self, widget: Widget) {
        self.next = Some(widget);
    }

    pub fn set_cmdline(&mut self, cmdline: Cmdline) {
        tracing::debug!(mode = cmdline.mode().name(), "entering mode");
        self.set_next(Widget::Cmdline(cmdline));
    }

    /// Rows available to a pane listing.
    pub(crate) fn page_height(&self) -> usize {
        usize::from(self.size.1.saturating_sub(6)).max(1)
    }

    // Loop

    /// Runs the interaction loop until quit.
    pub fn run(&mut self) -> io::Result<()> {
        self.messenger.info("Welcome to ferrule");
        self.reload_all();

        let events = self.event_rx.clone();
        let interrupts = self.interrupt_rx.clone();
        let callbacks = self.callback_rx.clone();
        let messages = self.messages.clone();

        while !self.exit {
            self.draw()?;
            let timeout = self.message_line.remaining().unwrap_or(IDLE_TICK);
            select! {
                recv(events) -> event => match event {
                    Ok(event) => self.handle_event(event),
                    Err(_) => self.exit = true,
                },
                recv(interrupts) -> _ => {
                    // second half of the pair sent when the dialog resumes
                    let _ = interrupts.recv();
                }
                recv(callbacks) -> callback => {
                    if let Ok(callback) = callback {
                        callback(self);
                    }
                }
                recv(messages) -> message => {
                    if let Ok(message) = message {
                        self.message_line.show(message);
                    }
                }
                default(timeout) => {
                    self.message_line.expire();
                }
            }
        }
        tracing::info!("quit");
        Ok(())
    }

    fn drain_messages(&mut self) {
        while let Ok(message) = self.messages.try_recv() {
            self.message_line.show(message);
        }
        self.message_line.expire();
    }

    /// Redraws the frame. A no-op without a display.
    pub fn draw(&mut self) -> io::Result<()> {
        self.drain_messages();
        if let Some(mut display) = self.display.take() {
            let result = display.render(self);
            self.display = Some(display);
            result?;
        }
        Ok(())
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.input(key),
            Event::Resize(width, height) => self.size = (width, height),
            _ => {}
        }
    }

    /// Forwards a key to the active widget, or to the browser when idle.
    ///
    /// The widget is taken out of the slot while it runs and put back only if it wants to stay
    /// and did not install a successor.
    pub fn input(&mut self, key: KeyEvent) {
        match self.next.take() {
            Some(Widget::Cmdline(mut cmdline)) => {
                if cmdline.input(key, self) && self.next.is_none() {
                    self.next = Some(Widget::Cmdline(cmdline));
                }
            }
            Some(Widget::Menu(mut menu)) => {
                if menu.input(key, self) && self.next.is_none() {
                    self.next = Some(Widget::Menu(menu));
                }
            }
            None => self.handle_idle_key(key),
        }
    }

    /// Asks `message` on the command line and blocks until one of `options` is entered.
    ///
    /// Runs a private draw and dispatch cycle over the same event channel. The outer loop is
    /// told to skip a turn through the interrupt pair. Returns an empty string when aborted.
    pub fn dialog(&mut self, message: &str, options: &[&str]) -> String {
        let _ = self.interrupt_tx.try_send(());
        let saved = self.next.take();
        self.dialog_result = None;
        self.set_cmdline(Cmdline::new(Mode::Dialog(DialogMode::new(message, options))));

        let events = self.event_rx.clone();
        while self.next.is_some() {
            if let Err(e) = self.draw() {
                tracing::error!("dialog redraw failed: {e}");
                break;
            }
            match events.recv() {
                Ok(event) => self.handle_event(event),
                Err(_) => break,
            }
        }

        self.next = saved;
        let _ = self.interrupt_tx.try_send(());
        self.dialog_result.take().unwrap_or_default()
    }

    // Collaborator helpers used by modes, menus and the browser

    /// Re-reads every pane of the current workspace.
    pub fn reload_all(&mut self) {
        let opts = self.config.general().list_options();
        if let Err(e) = self.filer.workspace_mut().reload_all(opts) {
            self.messenger.error(e);
        }
    }

    /// Expands `template` and starts it without blocking.
    pub fn spawn(&mut self, template: &str) {
        let (cmd, background) = expand(template, &self.filer.macro_context());
        let started = self
            .launcher
            .argv(&cmd, background)
            .and_then(|argv| spawn::spawn(&argv, &self.messenger));
        if let Err(e) = started {
            self.messenger.error(e);
        }
    }

    /// Expands `template` and runs it in the foreground with the screen suspended.
    pub fn spawn_suspend(&mut self, template: &str) {
        let (cmd, _) = expand(template, &self.filer.macro_context());
        let argv = match self.launcher.shell(&cmd) {
            Ok(argv) => argv,
            Err(e) => {
                self.messenger.error(e);
                return;
            }
        };
        let result = match self.display.as_mut() {
            Some(display) => spawn::spawn_suspend(&argv, display.as_mut(), &self.messenger),
            None => spawn::spawn_suspend(&argv, &mut NoScreen, &self.messenger),
        };
        if let Err(e) = result {
            self.messenger.error(e);
        }
        self.reload_all();
    }

    pub fn submit(&self, task: FileTask) {
        self.workers.submit(task);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};
    use std::thread;
    use tempfile::tempdir;

    fn press(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn headless(dir: &Path) -> App {
        let config = Config::default().with_list_dir(dir);
        App::headless(config, dir).0
    }

    #[test]
    fn fresh_app_is_idle_on_parent_entry() -> Result<(), Box<dyn std::error::Error>> {
        let temp = tempdir()?;
        let app = headless(temp.path());
        assert!(app.next().is_none());
        assert_eq!(app.filer().pane().file_name(), "..");
        assert!(!app.should_exit());
        Ok(())
    }

    #[test]
    fn dialog_returns_a_listed_option() -> Result<(), Box<dyn std::error::Error>> {
        let temp = tempdir()?;
        let mut app = headless(temp.path());
        let events = app.event_sender();

        let feeder = thread::spawn(move || {
            for code in [
                KeyCode::Char('x'),
                KeyCode::Enter, // not an option: buffer is cleared
                KeyCode::Char('Y'),
                KeyCode::Enter,
            ] {
                if events.send(press(code)).is_err() {
                    break;
                }
            }
        });

        let answer = app.dialog("Overwrite? /tmp/a", &["y", "n", "Y", "N", "c"]);
        feeder.join().map_err(|_| "feeder panicked")?;

        assert_eq!(answer, "Y");
        assert!(app.next().is_none());
        // one signal on entry and one on exit
        assert_eq!(app.interrupt_rx.len(), 2);
        Ok(())
    }

    #[test]
    fn dialog_restores_previous_widget() -> Result<(), Box<dyn std::error::Error>> {
        let temp = tempdir()?;
        let mut app = headless(temp.path());
        app.chdir();
        let events = app.event_sender();
        let feeder = thread::spawn(move || {
            let _ = events.send(press(KeyCode::Esc));
        });

        assert_eq!(app.dialog("Really?", &["y", "n"]), "");
        feeder.join().map_err(|_| "feeder panicked")?;
        assert_eq!(app.cmdline().map(|c| c.mode().name()), Some("chdir"));
        Ok(())
    }

    #[test]
    fn callbacks_run_against_the_app() -> Result<(), Box<dyn std::error::Error>> {
        let temp = tempdir()?;
        let mut app = headless(temp.path());
        let callback: Callback = Box::new(|app: &mut App| app.exit = true);
        callback(&mut app);
        assert!(app.should_exit());
        Ok(())
    }
}
