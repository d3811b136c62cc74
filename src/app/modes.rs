//! Command-line modes for ferrule.
//!
//! Every prompting operation is a [Mode] living in a [Cmdline]. A mode owns only the partial
//! state it needs between submits (a source path, a chosen shortcut, ...). On submit it either
//! stays for another round or exits back to the browser; a mode that needs a follow-up prompt
//! does so by changing its own phase, or by installing a new widget in the app's slot.
//!
//! The `impl App` block at the bottom holds the entry points the keymap and menus call.

use crate::app::App;
use crate::app::cmdline::{Cmdline, EditBuffer};
use crate::app::filer::{Filer, Filter, normalize};
use crate::app::listfile::{self, Record};
use crate::app::menu::{ADD_ACCEL, DELETE_ACCEL, ListKind};
use crate::config::Theme;
use crate::core::error::{Error, Result, parse_mode};
use crate::core::fm::{FileEntry, PARENT_NAME};
use crate::core::macros::{TokenKind, tokenize};
use crate::core::worker::FileTask;
use crate::utils::{extension, last_segment, quote, resolve_path, search_commands};

use ratatui::text::Span;
use regex::Regex;

use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Maximum number of list entries shown in a delete prompt.
const MAX_CHOICES: usize = 10;
const ONE_CHARACTER: &str = "(type one character, please)";
const RESERVED: &str = "(+ and - are reserved)";
const BUILT_IN: &str = "(taken by a built-in entry)";

/// What the command line does after a submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Stay,
    Exit,
}

/// The capabilities every mode provides.
pub trait CommandMode {
    fn name(&self) -> &'static str;

    fn prompt(&self, app: &App) -> String;

    /// Styles the buffer text for display.
    fn draw<'a>(&self, text: &'a str, theme: &Theme) -> Vec<Span<'a>> {
        vec![Span::styled(text, theme.cmdline_style())]
    }

    fn on_submit(&mut self, buffer: &mut EditBuffer, app: &mut App) -> Transition;
}

#[derive(Debug)]
pub enum Mode {
    Shell(ShellMode),
    ShellSuspend(ShellMode),
    Dialog(DialogMode),
    Quit(QuitMode),
    Copy(TransferMode),
    Move(TransferMode),
    Rename(RenameMode),
    BulkRename(BulkRenameMode),
    Remove(RemoveMode),
    Mkdir(CreateMode),
    Touch(CreateMode),
    Chmod(ChmodMode),
    ChangeTitle(TextMode),
    Chdir(TextMode),
    Glob(TextMode),
    Globdir(TextMode),
    AddCustomCommand(AddEntryMode),
    AddBookmark(AddEntryMode),
    DeleteCustomCommand(DeleteEntryMode),
    DeleteBookmark(DeleteEntryMode),
}

macro_rules! with_mode {
    ($mode:expr, $m:ident => $body:expr) => {
        match $mode {
            Mode::Shell($m) | Mode::ShellSuspend($m) => $body,
            Mode::Dialog($m) => $body,
            Mode::Quit($m) => $body,
            Mode::Copy($m) | Mode::Move($m) => $body,
            Mode::Rename($m) => $body,
            Mode::BulkRename($m) => $body,
            Mode::Remove($m) => $body,
            Mode::Mkdir($m) | Mode::Touch($m) => $body,
            Mode::Chmod($m) => $body,
            Mode::ChangeTitle($m) | Mode::Chdir($m) | Mode::Glob($m) | Mode::Globdir($m) => $body,
            Mode::AddCustomCommand($m) | Mode::AddBookmark($m) => $body,
            Mode::DeleteCustomCommand($m) | Mode::DeleteBookmark($m) => $body,
        }
    };
}

impl CommandMode for Mode {
    fn name(&self) -> &'static str {
        with_mode!(self, m => m.name())
    }

    fn prompt(&self, app: &App) -> String {
        with_mode!(self, m => m.prompt(app))
    }

    fn draw<'a>(&self, text: &'a str, theme: &Theme) -> Vec<Span<'a>> {
        with_mode!(self, m => m.draw(text, theme))
    }

    fn on_submit(&mut self, buffer: &mut EditBuffer, app: &mut App) -> Transition {
        let name = self.name();
        let transition = with_mode!(self, m => m.on_submit(buffer, app));
        tracing::trace!(mode = name, ?transition, "submit");
        transition
    }
}

impl Mode {
    pub fn name(&self) -> &'static str {
        CommandMode::name(self)
    }

    pub fn prompt(&self, app: &App) -> String {
        CommandMode::prompt(self, app)
    }

    pub fn draw<'a>(&self, text: &'a str, theme: &Theme) -> Vec<Span<'a>> {
        CommandMode::draw(self, text, theme)
    }

    pub fn on_submit(&mut self, buffer: &mut EditBuffer, app: &mut App) -> Transition {
        CommandMode::on_submit(self, buffer, app)
    }
}

/// Resolves `input` against the focused pane.
fn resolve(filer: &Filer, input: &str) -> PathBuf {
    normalize(&resolve_path(filer.pane().path(), input))
}

/// Resolves a single operation source, refusing the pane's own directory and its ancestors.
fn resolve_source(filer: &Filer, input: &str) -> Result<PathBuf> {
    let path = resolve(filer, input);
    if filer.pane().path().starts_with(&path) {
        return Err(Error::EnclosingDir(path));
    }
    Ok(path)
}

fn is_yes(text: &str) -> bool {
    matches!(text, "y" | "Y" | "")
}

fn is_no(text: &str) -> bool {
    matches!(text, "n" | "N")
}

// Shell

#[derive(Debug)]
pub struct ShellMode {
    commands: HashSet<String>,
    suspend: bool,
}

impl CommandMode for ShellMode {
    fn name(&self) -> &'static str {
        if self.suspend { "shellsuspend" } else { "shell" }
    }

    fn prompt(&self, _app: &App) -> String {
        if self.suspend {
            "Suspend $ ".into()
        } else {
            "$ ".into()
        }
    }

    fn draw<'a>(&self, text: &'a str, theme: &Theme) -> Vec<Span<'a>> {
        tokenize(text, &self.commands)
            .into_iter()
            .map(|token| {
                let style = match token.kind {
                    TokenKind::Command => theme.command_style(),
                    TokenKind::Macro => theme.macro_style(),
                    TokenKind::Option => theme.option_style(),
                    TokenKind::Text | TokenKind::Separator | TokenKind::Space => {
                        theme.cmdline_style()
                    }
                };
                Span::styled(token.text, style)
            })
            .collect()
    }

    fn on_submit(&mut self, buffer: &mut EditBuffer, app: &mut App) -> Transition {
        let cmd = buffer.text();
        if cmd.trim().is_empty() {
            return Transition::Exit;
        }
        if self.suspend {
            app.spawn_suspend(cmd);
        } else {
            app.spawn(cmd);
        }
        Transition::Exit
    }
}

// Dialog

#[derive(Debug)]
pub struct DialogMode {
    message: String,
    options: Vec<String>,
}

impl DialogMode {
    pub fn new(message: &str, options: &[&str]) -> Self {
        Self {
            message: message.to_string(),
            options: options.iter().map(|o| o.to_string()).collect(),
        }
    }
}

impl CommandMode for DialogMode {
    fn name(&self) -> &'static str {
        "dialog"
    }

    fn prompt(&self, _app: &App) -> String {
        format!("{} [{}] ", self.message, self.options.join("/"))
    }

    fn on_submit(&mut self, buffer: &mut EditBuffer, app: &mut App) -> Transition {
        if self.options.iter().any(|o| o == buffer.text()) {
            app.dialog_result = Some(buffer.text().to_string());
            Transition::Exit
        } else {
            buffer.clear();
            Transition::Stay
        }
    }
}

// Quit

#[derive(Debug, Default)]
pub struct QuitMode;

impl CommandMode for QuitMode {
    fn name(&self) -> &'static str {
        "quit"
    }

    fn prompt(&self, _app: &App) -> String {
        "Quit? [Y/n] ".into()
    }

    fn on_submit(&mut self, buffer: &mut EditBuffer, app: &mut App) -> Transition {
        if is_yes(buffer.text()) || buffer.text() == "q" {
            app.exit = true;
        }
        Transition::Exit
    }
}

// Copy and move

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transfer {
    Copy,
    Move,
}

#[derive(Debug)]
pub struct TransferMode {
    kind: Transfer,
    src: Option<PathBuf>,
}

impl TransferMode {
    fn verb(&self) -> &'static str {
        match self.kind {
            Transfer::Copy => "Copy",
            Transfer::Move => "Move",
        }
    }

    fn task(&self, srcs: Vec<PathBuf>, dest: PathBuf) -> FileTask {
        match self.kind {
            Transfer::Copy => FileTask::Copy { srcs, dest },
            Transfer::Move => FileTask::Move { srcs, dest },
        }
    }
}

impl CommandMode for TransferMode {
    fn name(&self) -> &'static str {
        match self.kind {
            Transfer::Copy => "copy",
            Transfer::Move => "move",
        }
    }

    fn prompt(&self, app: &App) -> String {
        let pane = app.filer.pane();
        if pane.has_marks() {
            format!("{} {} files -> ", self.verb(), pane.mark_count())
        } else if self.src.is_some() {
            format!("{} -> ", self.verb())
        } else {
            format!("{}: ", self.verb())
        }
    }

    fn on_submit(&mut self, buffer: &mut EditBuffer, app: &mut App) -> Transition {
        let text = buffer.text();
        if text.is_empty() {
            return Transition::Stay;
        }
        let pane = app.filer.pane();
        if pane.has_marks() {
            let task = self.task(pane.marked_paths(), resolve(&app.filer, text));
            app.submit(task);
            return Transition::Exit;
        }
        match &self.src {
            Some(src) => {
                let task = self.task(vec![src.clone()], resolve(&app.filer, text));
                app.submit(task);
                Transition::Exit
            }
            None => match resolve_source(&app.filer, text) {
                Ok(src) => {
                    self.src = Some(src);
                    buffer.set_text(app.filer.neighbor().path().display().to_string());
                    Transition::Stay
                }
                Err(e) => {
                    app.messenger.error(e);
                    buffer.clear();
                    Transition::Stay
                }
            },
        }
    }
}

// Rename

#[derive(Debug)]
pub struct RenameMode {
    src: String,
}

impl CommandMode for RenameMode {
    fn name(&self) -> &'static str {
        "rename"
    }

    fn prompt(&self, _app: &App) -> String {
        "Rename -> ".into()
    }

    fn on_submit(&mut self, buffer: &mut EditBuffer, app: &mut App) -> Transition {
        let dst = buffer.text();
        if dst.is_empty() {
            return Transition::Stay;
        }
        app.submit(FileTask::Rename {
            from: resolve(&app.filer, &self.src),
            to: resolve(&app.filer, dst),
        });
        Transition::Exit
    }
}

// Bulk rename

#[derive(Debug, Default)]
pub struct BulkRenameMode;

impl CommandMode for BulkRenameMode {
    fn name(&self) -> &'static str {
        "bulkrename"
    }

    fn prompt(&self, _app: &App) -> String {
        "Rename by regexp (pattern/replacement): ".into()
    }

    fn on_submit(&mut self, buffer: &mut EditBuffer, app: &mut App) -> Transition {
        let mut parts = buffer.text().split('/');
        let (Some(pattern), Some(replacement)) = (parts.next(), parts.next()) else {
            app.messenger.error(Error::MissingSeparator);
            return Transition::Stay;
        };
        let pattern = match Regex::new(pattern) {
            Ok(re) => re,
            Err(e) => {
                app.messenger.error(Error::from(e));
                return Transition::Stay;
            }
        };
        let pane = app.filer.pane();
        let names: Vec<String> = pane
            .marked_names()
            .into_iter()
            .filter(|n| n != PARENT_NAME)
            .collect();
        app.submit(FileTask::BulkRename {
            dir: pane.path().to_path_buf(),
            pattern,
            replacement: replacement.to_string(),
            names,
        });
        Transition::Exit
    }
}

// Remove

#[derive(Debug, Default)]
pub struct RemoveMode {
    src: Option<String>,
}

impl CommandMode for RemoveMode {
    fn name(&self) -> &'static str {
        "remove"
    }

    fn prompt(&self, app: &App) -> String {
        let verb = if app.config.general().move_to_trash() {
            "Move to trash"
        } else {
            "Remove permanently"
        };
        let pane = app.filer.pane();
        if pane.has_marks() {
            format!("{verb}? {} files [Y/n] ", pane.mark_count())
        } else if let Some(src) = &self.src {
            format!("{verb}? {src} [Y/n] ")
        } else {
            format!("{verb}: ")
        }
    }

    fn on_submit(&mut self, buffer: &mut EditBuffer, app: &mut App) -> Transition {
        let marked = app.filer.pane().has_marks();
        if !marked && self.src.is_none() {
            let text = buffer.text();
            if !text.is_empty() {
                match resolve_source(&app.filer, text) {
                    Ok(_) => self.src = Some(text.to_string()),
                    Err(e) => app.messenger.error(e),
                }
            }
            buffer.clear();
            return Transition::Stay;
        }

        let answer = buffer.text();
        if is_yes(answer) {
            let paths = match &self.src {
                Some(src) if !marked => vec![resolve(&app.filer, src)],
                _ => app.filer.pane().marked_paths(),
            };
            let trash = app.config.general().move_to_trash();
            app.submit(FileTask::Remove { paths, trash });
            Transition::Exit
        } else if is_no(answer) {
            Transition::Exit
        } else {
            buffer.clear();
            Transition::Stay
        }
    }
}

// Mkdir and touch

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Create {
    Dir,
    File,
}

#[derive(Debug)]
pub struct CreateMode {
    kind: Create,
    path: Option<String>,
}

impl CreateMode {
    fn default_mode(&self) -> u32 {
        match self.kind {
            Create::Dir => 0o755,
            Create::File => 0o644,
        }
    }
}

fn make_dir(path: &Path, mode: u32) -> io::Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = mode;
    builder.create(path)
}

fn touch(path: &Path, mode: u32) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.create(true).append(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = mode;
    options.open(path)?.set_modified(SystemTime::now())
}

impl CommandMode for CreateMode {
    fn name(&self) -> &'static str {
        match self.kind {
            Create::Dir => "mkdir",
            Create::File => "touch",
        }
    }

    fn prompt(&self, _app: &App) -> String {
        match (self.kind, &self.path) {
            (_, Some(_)) => format!("Mode (default {:o}): ", self.default_mode()),
            (Create::Dir, None) => "Make directory: ".into(),
            (Create::File, None) => "Touch file: ".into(),
        }
    }

    fn on_submit(&mut self, buffer: &mut EditBuffer, app: &mut App) -> Transition {
        let Some(name) = &self.path else {
            if !buffer.text().is_empty() {
                self.path = Some(buffer.text().to_string());
            }
            buffer.clear();
            return Transition::Stay;
        };

        let mode = match buffer.text() {
            "" => self.default_mode(),
            text => match parse_mode(text) {
                Ok(mode) => mode,
                Err(e) => {
                    app.messenger.error(e);
                    return Transition::Exit;
                }
            },
        };
        let path = resolve(&app.filer, name);
        let made = match self.kind {
            Create::Dir => make_dir(&path, mode).map(|_| "Made directory"),
            Create::File => touch(&path, mode).map(|_| "Touched"),
        };
        match made {
            Ok(verb) => app.messenger.info(format!("{verb} {}", path.display())),
            Err(e) => app.messenger.error(format!("{}: {e}", path.display())),
        }
        app.reload_all();
        app.filer.pane_mut().focus_name(name);
        Transition::Exit
    }
}

// Chmod

#[derive(Debug, Default)]
pub struct ChmodMode {
    target: Option<(PathBuf, u32)>,
}

impl CommandMode for ChmodMode {
    fn name(&self) -> &'static str {
        "chmod"
    }

    fn prompt(&self, app: &App) -> String {
        let pane = app.filer.pane();
        if pane.has_marks() {
            format!("Chmod {} files -> ", pane.mark_count())
        } else if let Some((path, mode)) = &self.target {
            let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
            format!("Chmod {name} {mode:o} -> ")
        } else {
            "Chmod: ".into()
        }
    }

    fn on_submit(&mut self, buffer: &mut EditBuffer, app: &mut App) -> Transition {
        let marked = app.filer.pane().has_marks();
        if !marked && self.target.is_none() {
            let text = buffer.text();
            if text.is_empty() {
                return Transition::Exit;
            }
            let path = match resolve_source(&app.filer, text) {
                Ok(path) => path,
                Err(e) => {
                    app.messenger.error(e);
                    return Transition::Exit;
                }
            };
            match FileEntry::from_path(app.filer.pane().path(), text) {
                Ok(entry) => {
                    self.target = Some((path, entry.mode()));
                    buffer.clear();
                    Transition::Stay
                }
                Err(e) => {
                    app.messenger.error(format!("{text}: {e}"));
                    Transition::Exit
                }
            }
        } else {
            if buffer.text().is_empty() {
                return Transition::Exit;
            }
            let mode = match parse_mode(buffer.text()) {
                Ok(mode) => mode,
                Err(e) => {
                    app.messenger.error(e);
                    buffer.clear();
                    return Transition::Stay;
                }
            };
            let paths = match &self.target {
                Some((path, _)) if !marked => vec![path.clone()],
                _ => app.filer.pane().marked_paths(),
            };
            app.submit(FileTask::Chmod { paths, mode });
            Transition::Exit
        }
    }
}

// Free text: title, chdir, glob, globdir

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextTarget {
    Title,
    Chdir,
    Glob,
    Globdir,
}

#[derive(Debug)]
pub struct TextMode {
    target: TextTarget,
}

impl CommandMode for TextMode {
    fn name(&self) -> &'static str {
        match self.target {
            TextTarget::Title => "changetitle",
            TextTarget::Chdir => "chdir",
            TextTarget::Glob => "glob",
            TextTarget::Globdir => "globdir",
        }
    }

    fn prompt(&self, _app: &App) -> String {
        match self.target {
            TextTarget::Title => "Change tab title: ",
            TextTarget::Chdir => "Chdir to ",
            TextTarget::Glob => "Glob pattern: ",
            TextTarget::Globdir => "Globdir pattern: ",
        }
        .into()
    }

    fn on_submit(&mut self, buffer: &mut EditBuffer, app: &mut App) -> Transition {
        let text = buffer.text();
        if text.is_empty() {
            return Transition::Exit;
        }
        let opts = app.config.general().list_options();
        let result = match self.target {
            TextTarget::Title => {
                app.filer.workspace_mut().set_title(text);
                Ok(())
            }
            TextTarget::Chdir => app.filer.pane_mut().chdir(text, opts),
            TextTarget::Glob | TextTarget::Globdir => match glob::Pattern::new(text) {
                Ok(pattern) => {
                    let filter = if self.target == TextTarget::Glob {
                        Filter::Glob(pattern)
                    } else {
                        Filter::GlobDir(pattern)
                    };
                    app.filer.pane_mut().set_filter(filter, opts)
                }
                Err(e) => Err(io::Error::new(io::ErrorKind::InvalidInput, e.to_string())),
            },
        };
        if let Err(e) = result {
            app.messenger.error(e);
        }
        Transition::Exit
    }
}

// Custom commands and bookmarks

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AddPhase {
    Template,
    Name,
    Shortcut,
}

#[derive(Debug)]
pub struct AddEntryMode {
    kind: ListKind,
    phase: AddPhase,
    template: String,
    name: String,
    hint: Option<&'static str>,
}

impl AddEntryMode {
    fn new(kind: ListKind) -> Self {
        Self {
            kind,
            phase: AddPhase::Template,
            template: String::new(),
            name: String::new(),
            hint: None,
        }
    }
}

/// A display name guessed from a command template or a path.
///
/// For commands the program is the first quoted word, or else the first word.
pub(crate) fn suggest_name(kind: ListKind, template: &str) -> String {
    let subject = match kind {
        ListKind::Bookmark => template,
        ListKind::CustomCommand => {
            let mut quoted = template.split(['\'', '"']);
            match (quoted.next(), quoted.next()) {
                (Some(_), Some(inner)) if !inner.trim().is_empty() => inner,
                _ => template.split_whitespace().next().unwrap_or(template),
            }
        }
    };
    last_segment(subject).to_string()
}

/// Platform launcher prefix for the custom-command seed.
fn open_prefix() -> &'static str {
    if cfg!(windows) {
        "start "
    } else if cfg!(target_os = "macos") {
        "open -a "
    } else {
        ""
    }
}

impl CommandMode for AddEntryMode {
    fn name(&self) -> &'static str {
        match self.kind {
            ListKind::CustomCommand => "addcustomcommand",
            ListKind::Bookmark => "addbookmark",
        }
    }

    fn prompt(&self, _app: &App) -> String {
        match self.phase {
            AddPhase::Template => format!("Add {}: ", self.kind.label()),
            AddPhase::Name => "Name: ".into(),
            AddPhase::Shortcut => match self.hint {
                Some(hint) => format!("Shortcut for '{}' {hint}: ", self.name),
                None => format!("Shortcut for '{}': ", self.name),
            },
        }
    }

    fn on_submit(&mut self, buffer: &mut EditBuffer, app: &mut App) -> Transition {
        let text = buffer.text();
        match self.phase {
            AddPhase::Template => {
                if text.trim().is_empty() {
                    return Transition::Stay;
                }
                self.template = text.to_string();
                let name = suggest_name(self.kind, text);
                buffer.set_text(name);
                self.phase = AddPhase::Name;
                Transition::Stay
            }
            AddPhase::Name => {
                if text.trim().is_empty() {
                    return Transition::Stay;
                }
                self.name = text.to_string();
                buffer.clear();
                self.phase = AddPhase::Shortcut;
                Transition::Stay
            }
            AddPhase::Shortcut => {
                if text.chars().count() != 1 {
                    self.hint = Some(ONE_CHARACTER);
                    buffer.clear();
                    return Transition::Stay;
                }
                if text == ADD_ACCEL || text == DELETE_ACCEL {
                    self.hint = Some(RESERVED);
                    buffer.clear();
                    return Transition::Stay;
                }
                if app.menus.is_builtin(self.kind.menu(), text) {
                    self.hint = Some(BUILT_IN);
                    buffer.clear();
                    return Transition::Stay;
                }
                let record = Record::new(text, &self.name, &self.template);
                app.register_record(self.kind, record);
                Transition::Exit
            }
        }
    }
}

#[derive(Debug)]
pub struct DeleteEntryMode {
    kind: ListKind,
    records: Vec<Record>,
    target: Option<Record>,
    error: Option<String>,
}

/// `s:name` choices, at most [MAX_CHOICES] with the last replaced by an ellipsis when cut.
fn choices(records: &[Record]) -> String {
    let mut shown: Vec<String> = records
        .iter()
        .map(|r| format!("{}:{}", r.shortcut, r.name))
        .collect();
    if shown.len() > MAX_CHOICES {
        shown.truncate(MAX_CHOICES - 1);
        shown.push("…".into());
    }
    shown.join(", ")
}

impl CommandMode for DeleteEntryMode {
    fn name(&self) -> &'static str {
        match self.kind {
            ListKind::CustomCommand => "deletecustomcommand",
            ListKind::Bookmark => "deletebookmark",
        }
    }

    fn prompt(&self, _app: &App) -> String {
        match (&self.target, &self.error) {
            (Some(record), _) => {
                format!("Delete '{}' ({})? [Y/n] ", record.name, record.shortcut)
            }
            (None, Some(error)) => format!(
                "Delete {} [{}] {error}: ",
                self.kind.label(),
                choices(&self.records)
            ),
            (None, None) => format!("Delete {} [{}]: ", self.kind.label(), choices(&self.records)),
        }
    }

    fn on_submit(&mut self, buffer: &mut EditBuffer, app: &mut App) -> Transition {
        let text = buffer.text();
        match &self.target {
            None => {
                if text.is_empty() {
                    return Transition::Exit;
                }
                match self.records.iter().find(|r| r.shortcut == text) {
                    Some(record) => {
                        self.target = Some(record.clone());
                        self.error = None;
                    }
                    None => {
                        let error = Error::ShortcutNotFound(text.to_string());
                        tracing::debug!("{error}");
                        self.error = Some(error.to_string());
                    }
                }
                buffer.clear();
                Transition::Stay
            }
            Some(record) => {
                if is_yes(text) {
                    app.forget_record(self.kind, &record.shortcut);
                    Transition::Exit
                } else if is_no(text) {
                    Transition::Exit
                } else {
                    buffer.clear();
                    Transition::Stay
                }
            }
        }
    }
}

// Entry points

impl App {
    /// Opens the shell prompt with `cmd`, the cursor moved by `offset` from the end.
    pub fn shell(&mut self, cmd: &str, offset: Option<isize>) {
        self.open_shell(cmd, offset, false);
    }

    /// Like [App::shell], but the command runs with the screen suspended.
    pub fn shell_suspend(&mut self, cmd: &str, offset: Option<isize>) {
        self.open_shell(cmd, offset, true);
    }

    fn open_shell(&mut self, cmd: &str, offset: Option<isize>, suspend: bool) {
        let commands = search_commands().unwrap_or_else(|e| {
            self.messenger.error(e);
            HashSet::new()
        });
        let shell = ShellMode { commands, suspend };
        let mode = if suspend {
            Mode::ShellSuspend(shell)
        } else {
            Mode::Shell(shell)
        };
        let mut cmdline = Cmdline::with_text(mode, cmd);
        if let Some(offset) = offset {
            cmdline.buffer_mut().move_cursor(offset);
        }
        self.set_cmdline(cmdline);
    }

    pub fn quit(&mut self) {
        self.set_cmdline(Cmdline::new(Mode::Quit(QuitMode)));
    }

    /// False, with an error reported, when the cursor is on `..` and nothing is marked.
    fn source_allowed(&self) -> bool {
        let pane = self.filer.pane();
        if pane.has_marks() || !pane.current().is_some_and(FileEntry::is_parent) {
            return true;
        }
        self.messenger
            .error(Error::EnclosingDir(resolve(&self.filer, PARENT_NAME)));
        false
    }

    fn transfer(&mut self, kind: Transfer) {
        if !self.source_allowed() {
            return;
        }
        let pane = self.filer.pane();
        let text = if pane.has_marks() {
            self.filer.neighbor().path().display().to_string()
        } else {
            pane.file_name()
        };
        let mode = TransferMode { kind, src: None };
        let mode = match kind {
            Transfer::Copy => Mode::Copy(mode),
            Transfer::Move => Mode::Move(mode),
        };
        self.set_cmdline(Cmdline::with_text(mode, text));
    }

    pub fn copy(&mut self) {
        self.transfer(Transfer::Copy);
    }

    pub fn move_files(&mut self) {
        self.transfer(Transfer::Move);
    }

    /// Opens the rename prompt with the cursor just before the extension.
    pub fn rename(&mut self) {
        if !self.source_allowed() {
            return;
        }
        let src = self.filer.pane().file_name();
        let ext_len = extension(&src).chars().count() as isize;
        let mut cmdline = Cmdline::with_text(Mode::Rename(RenameMode { src: src.clone() }), src);
        cmdline.buffer_mut().move_cursor(-ext_len);
        self.set_cmdline(cmdline);
    }

    pub fn bulk_rename(&mut self) {
        self.set_cmdline(Cmdline::new(Mode::BulkRename(BulkRenameMode)));
    }

    pub fn remove(&mut self) {
        if !self.source_allowed() {
            return;
        }
        let mode = Mode::Remove(RemoveMode::default());
        let cmdline = if self.filer.pane().has_marks() {
            Cmdline::new(mode)
        } else {
            Cmdline::with_text(mode, self.filer.pane().file_name())
        };
        self.set_cmdline(cmdline);
    }

    pub fn mkdir(&mut self) {
        let mode = CreateMode {
            kind: Create::Dir,
            path: None,
        };
        self.set_cmdline(Cmdline::new(Mode::Mkdir(mode)));
    }

    pub fn touch(&mut self) {
        let mode = CreateMode {
            kind: Create::File,
            path: None,
        };
        self.set_cmdline(Cmdline::new(Mode::Touch(mode)));
    }

    pub fn chmod(&mut self) {
        if !self.source_allowed() {
            return;
        }
        let mode = Mode::Chmod(ChmodMode::default());
        let cmdline = if self.filer.pane().has_marks() {
            Cmdline::new(mode)
        } else {
            Cmdline::with_text(mode, self.filer.pane().file_name())
        };
        self.set_cmdline(cmdline);
    }

    pub fn change_title(&mut self) {
        let mode = TextMode {
            target: TextTarget::Title,
        };
        self.set_cmdline(Cmdline::new(Mode::ChangeTitle(mode)));
    }

    pub fn chdir(&mut self) {
        let mode = TextMode {
            target: TextTarget::Chdir,
        };
        self.set_cmdline(Cmdline::new(Mode::Chdir(mode)));
    }

    pub fn glob(&mut self) {
        let mode = TextMode {
            target: TextTarget::Glob,
        };
        self.set_cmdline(Cmdline::new(Mode::Glob(mode)));
    }

    pub fn globdir(&mut self) {
        let mode = TextMode {
            target: TextTarget::Globdir,
        };
        self.set_cmdline(Cmdline::new(Mode::Globdir(mode)));
    }

    /// Starts registering a custom command, seeded with an opener for the cursor file.
    pub fn add_custom_command(&mut self) {
        let path = self.filer.pane().file_path().display().to_string();
        let seed = format!("{}{} %F", open_prefix(), quote(&path));
        let mode = Mode::AddCustomCommand(AddEntryMode::new(ListKind::CustomCommand));
        self.set_cmdline(Cmdline::with_text(mode, seed));
    }

    /// Starts registering a bookmark, seeded with the current directory.
    pub fn add_bookmark(&mut self) {
        let seed = self.filer.pane().path().display().to_string();
        let mode = Mode::AddBookmark(AddEntryMode::new(ListKind::Bookmark));
        self.set_cmdline(Cmdline::with_text(mode, seed));
    }

    pub fn delete_custom_command(&mut self) {
        self.delete_entry(ListKind::CustomCommand);
    }

    pub fn delete_bookmark(&mut self) {
        self.delete_entry(ListKind::Bookmark);
    }

    fn delete_entry(&mut self, kind: ListKind) {
        let path = kind.path(self.config.general());
        let records = match listfile::load(path) {
            Ok(records) => records,
            Err(e) => {
                self.messenger.error(format!("{}: {e}", path.display()));
                return;
            }
        };
        let mode = DeleteEntryMode {
            kind,
            records,
            target: None,
            error: None,
        };
        let mode = match kind {
            ListKind::CustomCommand => Mode::DeleteCustomCommand(mode),
            ListKind::Bookmark => Mode::DeleteBookmark(mode),
        };
        self.set_cmdline(Cmdline::new(mode));
    }

    /// Appends `record` to its list file and registers it in the live menu.
    pub(crate) fn register_record(&mut self, kind: ListKind, record: Record) {
        let path = kind.path(self.config.general());
        if let Err(e) = listfile::append(path, &record) {
            self.messenger.error(format!("{}: {e}", path.display()));
        }
        self.menus.add_record(kind, &record);
        self.messenger
            .info(format!("Added {} '{}' on {}", kind.label(), record.name, record.shortcut));
    }

    /// Removes `shortcut` from its list file and the live menu.
    pub(crate) fn forget_record(&mut self, kind: ListKind, shortcut: &str) {
        let path = kind.path(self.config.general());
        if let Err(e) = listfile::remove(path, shortcut) {
            self.messenger.error(format!("{}: {e}", path.display()));
        }
        if self.menus.remove(kind.menu(), shortcut) {
            self.messenger.info(format!("Deleted {} {shortcut}", kind.label()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_suggested_from_templates() {
        assert_eq!(suggest_name(ListKind::CustomCommand, "'/usr/bin/gimp' %F"), "gimp");
        assert_eq!(
            suggest_name(ListKind::CustomCommand, "open -a '/Applications/Preview.app' %F"),
            "Preview.app"
        );
        assert_eq!(suggest_name(ListKind::CustomCommand, "code %f %&"), "code");
        assert_eq!(suggest_name(ListKind::Bookmark, "/home/me/projects/"), "projects");
    }

    #[test]
    fn long_lists_are_cut_with_an_ellipsis() {
        let records: Vec<Record> = (0..12)
            .map(|i| Record::new(i.to_string(), format!("n{i}"), "x"))
            .collect();
        let shown = choices(&records);
        assert_eq!(shown.split(", ").count(), MAX_CHOICES);
        assert!(shown.ends_with("8:n8, …"));

        assert_eq!(choices(&records[..2]), "0:n0, 1:n1");
    }
}
