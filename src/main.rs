use clap::Parser;
use kilo_editor::{Editor, StdinRawMode};
use std::env;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::exit;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "kilo")]
#[command(version)]
#[command(about = "A minimal screen-oriented text editor for Unix-like systems")]
#[command(after_help = "Keymaps:
    Ctrl-S : Save to file
    Ctrl-Q : Quit (press repeatedly to discard unsaved changes)")]
struct Cli {
    /// File to edit (opens an empty buffer if omitted)
    file: Option<PathBuf>,
}

// Logs go to a file since terminal is occupied by the editor screen
fn init_logging() -> io::Result<()> {
    let path = match env::var_os("KILO_LOG") {
        Some(path) => path,
        None => return Ok(()),
    };
    let file = File::create(path)?;
    let filter =
        EnvFilter::try_from_env("KILO_LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new("debug"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
    Ok(())
}

fn edit(file: Option<&Path>) -> kilo_editor::Result<()> {
    // Raw mode is restored when `input` is dropped, even on error
    let mut input = StdinRawMode::new()?.input_keys();
    let window_size = input.query_window_size(io::stdout())?;
    let mut editor = Editor::open(input, io::stdout(), window_size, file)?;
    editor.edit()
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = init_logging() {
        eprintln!("Error: could not open log file: {}", err);
        exit(1);
    }

    if let Err(err) = edit(cli.file.as_deref()) {
        tracing::error!(%err, "fatal error");
        let mut stdout = io::stdout();
        let _ = stdout.write_all(b"\x1b[2J\x1b[H");
        let _ = stdout.flush();
        eprintln!("Error: {}", err);
        exit(1);
    }
}
