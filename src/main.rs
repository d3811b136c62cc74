//! main.rs
//! Entry point for ferrule

pub(crate) mod app;
pub(crate) mod config;
pub(crate) mod core;
pub(crate) mod ui;
pub(crate) mod utils;

use crate::app::App;
use crate::config::Config;
use crate::core::terminal;
use crate::utils::cli::{CliAction, handle_args};
use crate::utils::logging::init_logging;
use crate::utils::resolve_path;

fn main() -> std::io::Result<()> {
    std::panic::set_hook(Box::new(|info| {
        let _ = crossterm::terminal::disable_raw_mode();
        let mut stdout = std::io::stdout();
        let _ = crossterm::execute!(
            stdout,
            crossterm::terminal::LeaveAlternateScreen,
            crossterm::cursor::Show
        );

        eprintln!("\n[ferrule] Error occurred: {}", info);
        tracing::error!("panic: {info}");

        #[cfg(debug_assertions)]
        {
            let bt = std::backtrace::Backtrace::force_capture();
            eprintln!("\nStack Backtrace:\n{}", bt);
        }
    }));

    let action = handle_args();

    if let CliAction::Exit = action {
        return Ok(());
    }

    let config = Config::load();
    if let Some(log_file) = config.general().log_file()
        && let Err(e) = init_logging(log_file)
    {
        eprintln!("[ferrule] Logging disabled: {}: {}", log_file.display(), e);
    }

    let cwd = std::env::current_dir()?;
    let start = match action {
        CliAction::RunAppAtPath(path_arg) => {
            let target = resolve_path(&cwd, &path_arg);
            if !target.is_dir() {
                eprintln!("\n[ferrule] Error: Path '{}' cannot be opened.", path_arg);
                std::process::exit(1);
            }
            target
        }
        _ => cwd,
    };

    tracing::info!(path = %start.display(), "starting");
    terminal::run_terminal(App::new(config, &start))
}
