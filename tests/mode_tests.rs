//! Command-line mode tests for ferrule
//!
//! These tests drive a headless [App] with key events, the way the interaction loop does, and
//! check the prompts, the submitted file tasks and the persisted lists.
//!
//! Every test works inside a temporary directory which also holds the list files.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ferrule::app::App;
use ferrule::app::keymap::{Action, NavAction};
use ferrule::app::menu::{MenuAction, MenuId};
use ferrule::config::Config;
use ferrule::core::worker::FileTask;
use std::error;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

type TestResult = Result<(), Box<dyn error::Error>>;

fn app_in(dir: &Path) -> (App, crossbeam_channel::Receiver<FileTask>) {
    let config = Config::default().with_list_dir(dir);
    App::headless(config, dir)
}

fn key(app: &mut App, code: KeyCode) {
    app.input(KeyEvent::new(code, KeyModifiers::NONE));
}

fn ctrl(app: &mut App, c: char) {
    app.input(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL));
}

fn type_line(app: &mut App, text: &str) {
    for c in text.chars() {
        key(app, KeyCode::Char(c));
    }
    key(app, KeyCode::Enter);
}

/// Clears the prefilled buffer and submits `text`.
fn replace_line(app: &mut App, text: &str) {
    ctrl(app, 'u');
    type_line(app, text);
}

fn prompt(app: &App) -> Option<String> {
    app.cmdline().map(|c| c.mode().prompt(app))
}

fn buffer(app: &App) -> Option<String> {
    app.cmdline().map(|c| c.buffer().text().to_string())
}

fn focus(app: &mut App, name: &str) {
    app.run_action(Action::Nav(NavAction::GoToTop));
    while app.filer().pane().file_name() != name {
        let before = app.filer().pane().cursor();
        app.run_action(Action::Nav(NavAction::CursorDown));
        assert_ne!(before, app.filer().pane().cursor(), "{name} not listed");
    }
}

#[test]
fn test_copy_asks_source_then_destination() -> TestResult {
    let dir = tempdir()?;
    fs::write(dir.path().join("a.txt"), "a")?;
    let (mut app, tasks) = app_in(dir.path());
    focus(&mut app, "a.txt");

    app.copy();
    assert_eq!(prompt(&app).as_deref(), Some("Copy: "));
    assert_eq!(buffer(&app).as_deref(), Some("a.txt"));

    key(&mut app, KeyCode::Enter);
    assert_eq!(prompt(&app).as_deref(), Some("Copy -> "));
    assert_eq!(
        buffer(&app),
        Some(app.filer().neighbor().path().display().to_string())
    );

    replace_line(&mut app, "backup");
    assert!(app.next().is_none());
    match tasks.try_recv()? {
        FileTask::Copy { srcs, dest } => {
            assert_eq!(srcs, [dir.path().join("a.txt")]);
            assert_eq!(dest, dir.path().join("backup"));
        }
        other => panic!("unexpected task {other:?}"),
    }
    assert!(tasks.try_recv().is_err());
    Ok(())
}

#[test]
fn test_move_with_marks_is_one_prompt() -> TestResult {
    let dir = tempdir()?;
    fs::write(dir.path().join("a"), "")?;
    fs::write(dir.path().join("b"), "")?;
    let (mut app, tasks) = app_in(dir.path());
    focus(&mut app, "a");
    app.run_action(Action::Nav(NavAction::ToggleMark));
    app.run_action(Action::Nav(NavAction::ToggleMark));

    app.move_files();
    assert_eq!(prompt(&app).as_deref(), Some("Move 2 files -> "));
    replace_line(&mut app, "/elsewhere");
    match tasks.try_recv()? {
        FileTask::Move { srcs, dest } => {
            assert_eq!(srcs.len(), 2);
            assert_eq!(dest, Path::new("/elsewhere"));
        }
        other => panic!("unexpected task {other:?}"),
    }
    Ok(())
}

#[test]
fn test_remove_confirmation_retries_on_other_answers() -> TestResult {
    let dir = tempdir()?;
    fs::write(dir.path().join("junk"), "")?;
    let (mut app, tasks) = app_in(dir.path());
    focus(&mut app, "junk");

    app.remove();
    key(&mut app, KeyCode::Enter);
    assert!(prompt(&app).is_some_and(|p| p.contains("junk") && p.ends_with("[Y/n] ")));

    type_line(&mut app, "maybe");
    assert_eq!(buffer(&app).as_deref(), Some(""));
    assert!(tasks.try_recv().is_err());

    type_line(&mut app, "y");
    assert!(app.next().is_none());
    match tasks.try_recv()? {
        FileTask::Remove { paths, trash } => {
            assert_eq!(paths, [dir.path().join("junk")]);
            assert!(!trash);
        }
        other => panic!("unexpected task {other:?}"),
    }
    Ok(())
}

#[test]
fn test_remove_default_and_capital_answers() -> TestResult {
    let dir = tempdir()?;
    fs::write(dir.path().join("junk"), "")?;
    let (mut app, tasks) = app_in(dir.path());

    for (answer, removes) in [("", true), ("Y", true), ("N", false)] {
        focus(&mut app, "junk");
        app.remove();
        key(&mut app, KeyCode::Enter);
        type_line(&mut app, answer);
        assert!(app.next().is_none(), "answer {answer:?}");
        match tasks.try_recv() {
            Ok(FileTask::Remove { paths, .. }) => {
                assert!(removes, "answer {answer:?} removed");
                assert_eq!(paths, [dir.path().join("junk")]);
            }
            Ok(other) => panic!("unexpected task {other:?}"),
            Err(_) => assert!(!removes, "answer {answer:?} kept"),
        }
    }
    Ok(())
}

#[test]
fn test_remove_refuses_parent_entry() -> TestResult {
    let dir = tempdir()?;
    let work = dir.path().join("work");
    fs::create_dir(&work)?;
    let (mut app, tasks) = app_in(&work);
    focus(&mut app, "..");

    app.remove();
    assert!(app.next().is_none());
    key(&mut app, KeyCode::Enter);
    key(&mut app, KeyCode::Enter);
    assert!(tasks.try_recv().is_err());
    assert!(work.is_dir());
    Ok(())
}

#[test]
fn test_typed_sources_must_not_enclose_the_pane() -> TestResult {
    let dir = tempdir()?;
    let work = dir.path().join("work");
    fs::create_dir(&work)?;
    fs::write(work.join("file"), "")?;
    let (mut app, tasks) = app_in(&work);
    focus(&mut app, "file");

    app.remove();
    replace_line(&mut app, "..");
    assert!(prompt(&app).is_some_and(|p| p.ends_with(": ")));
    replace_line(&mut app, ".");
    key(&mut app, KeyCode::Enter);
    assert_eq!(app.cmdline().map(|c| c.mode().name()), Some("remove"));
    key(&mut app, KeyCode::Esc);

    focus(&mut app, "file");
    app.copy();
    replace_line(&mut app, &dir.path().display().to_string());
    assert_eq!(prompt(&app).as_deref(), Some("Copy: "));
    key(&mut app, KeyCode::Esc);

    focus(&mut app, "file");
    app.chmod();
    replace_line(&mut app, "..");
    assert!(app.next().is_none());

    let entries: [fn(&mut App); 4] = [App::copy, App::move_files, App::rename, App::chmod];
    for entry in entries {
        focus(&mut app, "..");
        entry(&mut app);
        assert!(app.next().is_none());
    }
    assert!(tasks.try_recv().is_err());
    Ok(())
}

#[test]
fn test_chmod_reprompts_on_invalid_bits() -> TestResult {
    let dir = tempdir()?;
    let file = dir.path().join("script");
    fs::write(&file, "")?;
    let (mut app, tasks) = app_in(dir.path());
    focus(&mut app, "script");

    app.chmod();
    key(&mut app, KeyCode::Enter);
    assert!(prompt(&app).is_some_and(|p| p.starts_with("Chmod script ")));

    type_line(&mut app, "9x");
    assert_eq!(app.cmdline().map(|c| c.mode().name()), Some("chmod"));
    assert_eq!(buffer(&app).as_deref(), Some(""));
    assert!(tasks.try_recv().is_err());

    type_line(&mut app, "700");
    assert!(app.next().is_none());
    match tasks.try_recv()? {
        FileTask::Chmod { paths, mode } => {
            assert_eq!(paths, [file.clone()]);
            assert_eq!(mode, 0o700);
        }
        other => panic!("unexpected task {other:?}"),
    }

    focus(&mut app, "script");
    app.chmod();
    key(&mut app, KeyCode::Enter);
    key(&mut app, KeyCode::Enter);
    assert!(app.next().is_none());
    assert!(tasks.try_recv().is_err());
    Ok(())
}

#[test]
fn test_remove_declined() -> TestResult {
    let dir = tempdir()?;
    fs::write(dir.path().join("keep"), "")?;
    let (mut app, tasks) = app_in(dir.path());
    focus(&mut app, "keep");

    app.remove();
    key(&mut app, KeyCode::Enter);
    type_line(&mut app, "n");
    assert!(app.next().is_none());
    assert!(tasks.try_recv().is_err());
    Ok(())
}

#[test]
fn test_rename_places_cursor_before_extension() -> TestResult {
    let dir = tempdir()?;
    fs::write(dir.path().join("notes.txt"), "")?;
    let (mut app, tasks) = app_in(dir.path());
    focus(&mut app, "notes.txt");

    app.rename();
    assert_eq!(app.cmdline().map(|c| c.buffer().cursor()), Some(5));

    type_line(&mut app, "-old");
    match tasks.try_recv()? {
        FileTask::Rename { from, to } => {
            assert_eq!(from, dir.path().join("notes.txt"));
            assert_eq!(to, dir.path().join("notes-old.txt"));
        }
        other => panic!("unexpected task {other:?}"),
    }
    Ok(())
}

#[test]
fn test_bulk_rename_needs_a_separator() -> TestResult {
    let dir = tempdir()?;
    fs::write(dir.path().join("img1.png"), "")?;
    let (mut app, tasks) = app_in(dir.path());
    focus(&mut app, "img1.png");

    app.bulk_rename();
    type_line(&mut app, "img");
    assert!(app.cmdline().is_some());
    assert!(tasks.try_recv().is_err());

    replace_line(&mut app, "img(\\d)/photo$1");
    assert!(app.next().is_none());
    match tasks.try_recv()? {
        FileTask::BulkRename { names, replacement, .. } => {
            assert_eq!(names, ["img1.png"]);
            assert_eq!(replacement, "photo$1");
        }
        other => panic!("unexpected task {other:?}"),
    }
    Ok(())
}

#[test]
fn test_mkdir_uses_default_mode_and_focuses() -> TestResult {
    let dir = tempdir()?;
    let (mut app, _tasks) = app_in(dir.path());

    app.mkdir();
    type_line(&mut app, "fresh");
    assert_eq!(prompt(&app).as_deref(), Some("Mode (default 755): "));
    key(&mut app, KeyCode::Enter);

    assert!(app.next().is_none());
    assert!(dir.path().join("fresh").is_dir());
    assert_eq!(app.filer().pane().file_name(), "fresh");
    Ok(())
}

#[test]
fn test_touch_with_invalid_mode_creates_nothing() -> TestResult {
    let dir = tempdir()?;
    let (mut app, _tasks) = app_in(dir.path());

    app.touch();
    type_line(&mut app, "file");
    type_line(&mut app, "9x");
    assert!(app.next().is_none());
    assert!(!dir.path().join("file").exists());
    Ok(())
}

#[test]
fn test_chdir_and_quit() -> TestResult {
    let dir = tempdir()?;
    fs::create_dir(dir.path().join("inner"))?;
    let (mut app, _tasks) = app_in(dir.path());

    app.chdir();
    type_line(&mut app, "inner");
    assert_eq!(app.filer().pane().path(), dir.path().join("inner"));

    app.quit();
    type_line(&mut app, "n");
    assert!(!app.should_exit());
    app.quit();
    key(&mut app, KeyCode::Enter);
    assert!(app.should_exit());
    Ok(())
}

#[test]
fn test_add_custom_command_persists_and_registers() -> TestResult {
    let dir = tempdir()?;
    let (mut app, _tasks) = app_in(dir.path());

    app.add_custom_command();
    replace_line(&mut app, "open %f");
    assert_eq!(buffer(&app).as_deref(), Some("open"));
    replace_line(&mut app, "Open");

    type_line(&mut app, "oo");
    assert!(prompt(&app).is_some_and(|p| p.contains("(type one character, please)")));
    type_line(&mut app, "o");

    assert!(app.next().is_none());
    assert_eq!(
        fs::read_to_string(dir.path().join("commands"))?,
        "o <||> Open <||> open %f\n"
    );
    let item = app.menus().find(MenuId::Custom, "o").ok_or("no menu item")?;
    assert_eq!(item.action(), &MenuAction::Spawn("open %f".into()));
    Ok(())
}

#[test]
fn test_delete_missing_bookmark_stays() -> TestResult {
    let dir = tempdir()?;
    fs::write(dir.path().join("bookmarks"), "p <||> projects <||> ~/src\n")?;
    let (mut app, _tasks) = app_in(dir.path());
    assert!(app.menus().find(MenuId::Bookmark, "p").is_some());

    app.delete_bookmark();
    type_line(&mut app, "d");
    assert!(prompt(&app).is_some_and(|p| p.contains("not found")));
    assert_eq!(buffer(&app).as_deref(), Some(""));
    assert_eq!(app.cmdline().map(|c| c.mode().name()), Some("deletebookmark"));

    type_line(&mut app, "p");
    assert!(prompt(&app).is_some_and(|p| p.contains("projects")));
    key(&mut app, KeyCode::Enter);

    assert!(app.next().is_none());
    assert_eq!(fs::read_to_string(dir.path().join("bookmarks"))?, "");
    assert!(app.menus().find(MenuId::Bookmark, "p").is_none());
    Ok(())
}

#[test]
fn test_add_bookmark_refuses_builtin_shortcuts() -> TestResult {
    let dir = tempdir()?;
    let (mut app, _tasks) = app_in(dir.path());
    let here = dir.path().display().to_string();

    app.add_bookmark();
    assert_eq!(buffer(&app), Some(here.clone()));
    key(&mut app, KeyCode::Enter);
    replace_line(&mut app, "scratch");

    type_line(&mut app, "h");
    assert!(prompt(&app).is_some_and(|p| p.contains("built-in")));
    assert_eq!(app.cmdline().map(|c| c.mode().name()), Some("addbookmark"));
    type_line(&mut app, "w");

    assert!(app.next().is_none());
    assert_eq!(
        fs::read_to_string(dir.path().join("bookmarks"))?,
        format!("w <||> scratch <||> {here}\n")
    );
    let item = app.menus().find(MenuId::Bookmark, "w").ok_or("no menu item")?;
    assert_eq!(item.action(), &MenuAction::Chdir(here));
    let home = app.menus().find(MenuId::Bookmark, "h").ok_or("no home item")?;
    assert_eq!(home.action(), &MenuAction::Chdir("~".into()));
    Ok(())
}

#[test]
fn test_delete_custom_command() -> TestResult {
    let dir = tempdir()?;
    fs::write(
        dir.path().join("commands"),
        "o <||> Open <||> open %f\nz <||> Zip <||> zip -r %~x.zip %m\n",
    )?;
    let (mut app, _tasks) = app_in(dir.path());

    app.delete_custom_command();
    assert!(prompt(&app).is_some_and(|p| p.contains("o:Open, z:Zip")));
    type_line(&mut app, "o");
    assert!(prompt(&app).is_some_and(|p| p.contains("'Open'")));
    type_line(&mut app, "Y");

    assert!(app.next().is_none());
    assert_eq!(
        fs::read_to_string(dir.path().join("commands"))?,
        "z <||> Zip <||> zip -r %~x.zip %m\n"
    );
    assert!(app.menus().find(MenuId::Custom, "o").is_none());
    assert!(app.menus().find(MenuId::Custom, "z").is_some());
    Ok(())
}
