//! File-operation worker for ferrule.
//!
//! Copy, move, remove, rename, bulk rename and chmod run on one dedicated thread so the
//! interaction loop never blocks on disk I/O. Requests [FileTask] arrive over a crossbeam
//! channel; the worker never touches UI state directly. Anything that has to happen on the
//! loop (asking whether to overwrite, reloading the listing) is shipped back as a
//! [Callback] over the loop's rendezvous channel. Failures go to the [Messenger].
//!
//! # Caution:
//! The overwrite prompt blocks this thread until the loop has answered, so a single task is
//! in flight at any time. Tasks queued behind it wait.

use crate::app::{App, Callback};
use crate::core::message::Messenger;
use crate::utils::copy_recursive;

use crossbeam_channel::{Receiver, Sender, bounded, unbounded};
use regex::Regex;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::thread;

/// Answers accepted by the overwrite dialog.
pub const OVERWRITE_OPTIONS: [&str; 5] = ["y", "n", "Y", "N", "c"];

/// Operations the worker can perform.
#[derive(Debug)]
pub enum FileTask {
    Copy {
        srcs: Vec<PathBuf>,
        dest: PathBuf,
    },
    Move {
        srcs: Vec<PathBuf>,
        dest: PathBuf,
    },
    Remove {
        paths: Vec<PathBuf>,
        trash: bool,
    },
    Rename {
        from: PathBuf,
        to: PathBuf,
    },
    BulkRename {
        dir: PathBuf,
        pattern: Regex,
        replacement: String,
        names: Vec<String>,
    },
    Chmod {
        paths: Vec<PathBuf>,
        mode: u32,
    },
}

/// Handle to the worker thread.
pub struct Workers {
    fileop_tx: Sender<FileTask>,
}

impl Workers {
    /// Spawns the file-operation thread.
    ///
    /// `callback_tx` is the loop's rendezvous channel.
    pub fn spawn(callback_tx: Sender<Callback>, messenger: Messenger) -> Self {
        let (fileop_tx, fileop_rx) = unbounded::<FileTask>();
        start_fileop_worker(fileop_rx, callback_tx, messenger);
        Self { fileop_tx }
    }

    /// A handle whose tasks are only queued, for driving the app without threads.
    pub fn detached() -> (Self, Receiver<FileTask>) {
        let (fileop_tx, fileop_rx) = unbounded::<FileTask>();
        (Self { fileop_tx }, fileop_rx)
    }

    /// Accessor for the file operation task sender.
    pub fn fileop_tx(&self) -> &Sender<FileTask> {
        &self.fileop_tx
    }

    pub fn submit(&self, task: FileTask) {
        tracing::debug!(?task, "file task queued");
        if self.fileop_tx.send(task).is_err() {
            tracing::error!("file worker is gone, task dropped");
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Overwrite {
    Ask,
    All,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Decision {
    Write,
    Skip,
    Cancel,
}

/// Per-task state shared by every target of one copy or move.
struct Conflicts<'a> {
    policy: Overwrite,
    callback_tx: &'a Sender<Callback>,
}

impl Conflicts<'_> {
    fn decide(&mut self, target: &Path) -> Decision {
        if fs::symlink_metadata(target).is_err() {
            return Decision::Write;
        }
        match self.policy {
            Overwrite::All => return Decision::Write,
            Overwrite::None => return Decision::Skip,
            Overwrite::Ask => {}
        }

        let (reply_tx, reply_rx) = bounded::<String>(1);
        let question = format!("Overwrite? {}", target.display());
        let ask: Callback = Box::new(move |app: &mut App| {
            let answer = app.dialog(&question, &OVERWRITE_OPTIONS);
            let _ = reply_tx.send(answer);
        });
        if self.callback_tx.send(ask).is_err() {
            return Decision::Cancel;
        }
        let answer = reply_rx.recv().unwrap_or_default();
        match answer.as_str() {
            "y" => Decision::Write,
            "n" => Decision::Skip,
            "Y" => {
                self.policy = Overwrite::All;
                Decision::Write
            }
            "N" => {
                self.policy = Overwrite::None;
                Decision::Skip
            }
            _ => Decision::Cancel,
        }
    }
}

/// Where `src` lands: inside `dest` when it is a directory, otherwise `dest` itself.
fn target_for(src: &Path, dest: &Path, many: bool) -> Option<PathBuf> {
    if many || dest.is_dir() {
        src.file_name().map(|name| dest.join(name))
    } else {
        Some(dest.to_path_buf())
    }
}

fn remove_any(path: &Path) -> io::Result<()> {
    let md = fs::symlink_metadata(path)?;
    if md.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

fn copy_one(src: &Path, target: &Path) -> io::Result<()> {
    if src.is_dir() {
        if target.starts_with(src) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "cannot copy a directory into itself",
            ));
        }
        copy_recursive(src, target)
    } else {
        fs::copy(src, target).map(|_| ())
    }
}

fn move_one(src: &Path, target: &Path, replace: bool) -> io::Result<()> {
    if replace && fs::symlink_metadata(target).is_ok() {
        remove_any(target)?;
    }
    match fs::rename(src, target) {
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            copy_one(src, target)?;
            remove_any(src)
        }
        res => res,
    }
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn set_mode(path: &Path, mode: u32) -> io::Result<()> {
    let mut perms = fs::metadata(path)?.permissions();
    perms.set_readonly(mode & 0o200 == 0);
    fs::set_permissions(path, perms)
}

fn transfer(
    srcs: Vec<PathBuf>,
    dest: &Path,
    moving: bool,
    callback_tx: &Sender<Callback>,
    messenger: &Messenger,
) -> usize {
    let mut conflicts = Conflicts {
        policy: Overwrite::Ask,
        callback_tx,
    };
    let many = srcs.len() > 1;
    let mut done = 0;

    for src in srcs {
        let Some(target) = target_for(&src, dest, many) else {
            messenger.error(format!("{}: no file name", src.display()));
            continue;
        };
        if target == src {
            messenger.error(format!("{}: source and destination are the same", src.display()));
            continue;
        }
        let existed = fs::symlink_metadata(&target).is_ok();
        match conflicts.decide(&target) {
            Decision::Cancel => break,
            Decision::Skip => continue,
            Decision::Write => {}
        }
        let res = if moving {
            move_one(&src, &target, existed)
        } else {
            copy_one(&src, &target)
        };
        match res {
            Ok(()) => done += 1,
            Err(e) => messenger.error(format!("{}: {e}", src.display())),
        }
    }
    done
}

fn bulk_rename(
    dir: &Path,
    pattern: &Regex,
    replacement: &str,
    names: &[String],
    messenger: &Messenger,
) -> usize {
    let mut done = 0;
    for name in names {
        let renamed = pattern.replace_all(name, replacement);
        if renamed == name.as_str() || renamed.is_empty() {
            continue;
        }
        let target = dir.join(renamed.as_ref());
        if fs::symlink_metadata(&target).is_ok() {
            messenger.error(format!("{}: already exists", target.display()));
            continue;
        }
        match fs::rename(dir.join(name), &target) {
            Ok(()) => done += 1,
            Err(e) => messenger.error(format!("{name}: {e}")),
        }
    }
    done
}

fn run_task(task: FileTask, callback_tx: &Sender<Callback>, messenger: &Messenger) {
    match task {
        FileTask::Copy { srcs, dest } => {
            let done = transfer(srcs, &dest, false, callback_tx, messenger);
            messenger.info(format!("Copied {done} file(s) to {}", dest.display()));
        }
        FileTask::Move { srcs, dest } => {
            let done = transfer(srcs, &dest, true, callback_tx, messenger);
            messenger.info(format!("Moved {done} file(s) to {}", dest.display()));
        }
        FileTask::Remove { paths, trash } => {
            let mut done = 0;
            for path in paths {
                let res = if trash {
                    trash::delete(&path).map_err(|e| io::Error::other(e.to_string()))
                } else {
                    remove_any(&path)
                };
                match res {
                    Ok(()) => done += 1,
                    Err(e) => messenger.error(format!("{}: {e}", path.display())),
                }
            }
            let verb = if trash { "Trashed" } else { "Removed" };
            messenger.info(format!("{verb} {done} file(s)"));
        }
        FileTask::Rename { from, to } => {
            if fs::symlink_metadata(&to).is_ok() {
                messenger.error(format!("{}: already exists", to.display()));
            } else {
                match fs::rename(&from, &to) {
                    Ok(()) => messenger.info(format!("Renamed to {}", to.display())),
                    Err(e) => messenger.error(format!("{}: {e}", from.display())),
                }
            }
        }
        FileTask::BulkRename {
            dir,
            pattern,
            replacement,
            names,
        } => {
            let done = bulk_rename(&dir, &pattern, &replacement, &names, messenger);
            messenger.info(format!("Renamed {done} file(s)"));
        }
        FileTask::Chmod { paths, mode } => {
            for path in paths {
                if let Err(e) = set_mode(&path, mode) {
                    messenger.error(format!("{}: {e}", path.display()));
                }
            }
        }
    }
}

/// Starts the file operation worker thread
///
/// # Arguments
/// * `task_rx` - Receiver channel for incoming tasks
/// * `callback_tx` - Rendezvous channel into the interaction loop
fn start_fileop_worker(
    task_rx: Receiver<FileTask>,
    callback_tx: Sender<Callback>,
    messenger: Messenger,
) {
    let spawned = thread::Builder::new()
        .name("ferrule-fileop".into())
        .spawn(move || {
            while let Ok(task) = task_rx.recv() {
                run_task(task, &callback_tx, &messenger);
                let reload: Callback = Box::new(|app: &mut App| app.reload_all());
                if callback_tx.send(reload).is_err() {
                    break;
                }
            }
        });
    if let Err(e) = spawned {
        tracing::error!("cannot start file worker: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message::Message;
    use std::time::Duration;
    use tempfile::tempdir;

    fn worker() -> (Workers, Receiver<Callback>, Receiver<Message>) {
        let (callback_tx, callback_rx) = bounded::<Callback>(0);
        let (messenger, messages) = Messenger::channel();
        (Workers::spawn(callback_tx, messenger), callback_rx, messages)
    }

    fn wait_done(callbacks: &Receiver<Callback>) -> Result<(), Box<dyn std::error::Error>> {
        // the reload callback marks the end of a task
        let _reload = callbacks.recv_timeout(Duration::from_secs(5))?;
        Ok(())
    }

    #[test]
    fn copy_into_directory() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let src = dir.path().join("a.txt");
        let dest = dir.path().join("out");
        fs::write(&src, "alpha")?;
        fs::create_dir(&dest)?;

        let (workers, callbacks, messages) = worker();
        workers.submit(FileTask::Copy {
            srcs: vec![src.clone()],
            dest: dest.clone(),
        });
        wait_done(&callbacks)?;

        assert_eq!(fs::read_to_string(dest.join("a.txt"))?, "alpha");
        assert!(src.exists());
        assert_eq!(messages.try_recv()?.text(), format!("Copied 1 file(s) to {}", dest.display()));
        Ok(())
    }

    #[test]
    fn move_to_new_name() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let src = dir.path().join("old.txt");
        let dest = dir.path().join("new.txt");
        fs::write(&src, "beta")?;

        let (workers, callbacks, _messages) = worker();
        workers.submit(FileTask::Move {
            srcs: vec![src.clone()],
            dest: dest.clone(),
        });
        wait_done(&callbacks)?;

        assert!(!src.exists());
        assert_eq!(fs::read_to_string(&dest)?, "beta");
        Ok(())
    }

    #[test]
    fn remove_files_and_directories() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let file = dir.path().join("f");
        let sub = dir.path().join("sub");
        fs::write(&file, "x")?;
        fs::create_dir_all(sub.join("deep"))?;

        let (workers, callbacks, messages) = worker();
        workers.submit(FileTask::Remove {
            paths: vec![file.clone(), sub.clone(), dir.path().join("missing")],
            trash: false,
        });
        wait_done(&callbacks)?;

        assert!(!file.exists());
        assert!(!sub.exists());
        let texts: Vec<_> = messages.try_iter().map(|m| (m.level(), m.text().to_string())).collect();
        assert!(texts.iter().any(|(l, t)| *l == crate::core::message::Level::Error && t.contains("missing")));
        assert!(texts.iter().any(|(_, t)| t == "Removed 2 file(s)"));
        Ok(())
    }

    #[test]
    fn bulk_rename_by_regex() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        for name in ["img_1.png", "img_2.png", "keep.txt"] {
            fs::write(dir.path().join(name), name)?;
        }

        let (workers, callbacks, _messages) = worker();
        workers.submit(FileTask::BulkRename {
            dir: dir.path().to_path_buf(),
            pattern: Regex::new(r"^img_(\d)")?,
            replacement: "photo-$1".into(),
            names: vec!["img_1.png".into(), "img_2.png".into(), "keep.txt".into()],
        });
        wait_done(&callbacks)?;

        assert!(dir.path().join("photo-1.png").exists());
        assert!(dir.path().join("photo-2.png").exists());
        assert!(dir.path().join("keep.txt").exists());
        assert!(!dir.path().join("img_1.png").exists());
        Ok(())
    }

    #[test]
    #[cfg(unix)]
    fn chmod_sets_bits() -> Result<(), Box<dyn std::error::Error>> {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempdir()?;
        let file = dir.path().join("script.sh");
        fs::write(&file, "#!/bin/sh")?;

        let (workers, callbacks, _messages) = worker();
        workers.submit(FileTask::Chmod {
            paths: vec![file.clone()],
            mode: 0o750,
        });
        wait_done(&callbacks)?;

        assert_eq!(fs::metadata(&file)?.permissions().mode() & 0o7777, 0o750);
        Ok(())
    }

    #[test]
    fn copy_conflict_goes_through_the_loop() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let src = dir.path().join("same.txt");
        let dest = dir.path().join("out");
        fs::write(&src, "new")?;
        fs::create_dir(&dest)?;
        fs::write(dest.join("same.txt"), "old")?;

        let (workers, callbacks, _messages) = worker();
        workers.submit(FileTask::Copy {
            srcs: vec![src],
            dest: dest.clone(),
        });

        // the first callback is the overwrite question; nothing is written before it is answered
        let _ask = callbacks.recv_timeout(Duration::from_secs(5))?;
        assert_eq!(fs::read_to_string(dest.join("same.txt"))?, "old");
        Ok(())
    }

    #[test]
    fn detached_handle_queues_tasks() -> Result<(), Box<dyn std::error::Error>> {
        let (workers, rx) = Workers::detached();
        workers.submit(FileTask::Remove {
            paths: vec![PathBuf::from("x")],
            trash: true,
        });
        assert!(matches!(rx.try_recv()?, FileTask::Remove { trash: true, .. }));
        Ok(())
    }
}
