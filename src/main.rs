//! Command-line front end: script-file mode, `-e` one-liner mode, and an
//! interactive REPL that drives the kernel on its worker thread.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use plotscript::{Interpreter, Kernel};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;
use tracing_subscriber::EnvFilter;

const START_COMMAND: &str = "%start";
const STOP_COMMAND: &str = "%stop";
const RESET_COMMAND: &str = "%reset";
const EXIT_COMMAND: &str = "%exit";

#[derive(Parser, Debug)]
#[command(
    name = "plotscript",
    about = "Interpreter for the plotscript plotting language"
)]
struct Args {
    /// Script file to evaluate.
    file: Option<PathBuf>,

    /// Evaluate a single expression given on the command line.
    #[arg(short = 'e', value_name = "EXPRESSION", conflicts_with = "file")]
    expression: Option<String>,
}

fn main() -> Result<()> {
    install_tracing();
    let args = Args::parse();

    if let Some(expression) = args.expression {
        return run_text(&expression);
    }
    if let Some(file) = args.file {
        let text = match std::fs::read_to_string(&file) {
            Ok(text) => text,
            Err(_) => {
                eprintln!("Error: Could not open file for reading.");
                std::process::exit(1);
            }
        };
        return run_text(&text);
    }
    repl()
}

/// Evaluate one program and print its result, or its error on stderr with
/// a nonzero exit.
fn run_text(text: &str) -> Result<()> {
    let mut interp = Interpreter::new();
    match interp.run(text) {
        Ok(result) => {
            println!("{result}");
            Ok(())
        }
        Err(message) => {
            eprintln!("{message}");
            std::process::exit(1);
        }
    }
}

fn repl() -> Result<()> {
    // Rustyline only sees Ctrl-C while a prompt is open; a SIGINT landing
    // while a program is being evaluated is relayed through this flag.
    let sigint = Arc::new(AtomicBool::new(false));
    {
        let sigint = Arc::clone(&sigint);
        ctrlc::set_handler(move || sigint.store(true, Ordering::SeqCst))
            .context("could not install the interrupt handler")?;
    }

    let mut editor = Editor::<(), DefaultHistory>::new()
        .context("could not initialize the line editor")?;
    let mut kernel = Some(Kernel::start());

    loop {
        match editor.readline("plotscript> ") {
            Ok(line) => {
                let line = line.trim().to_string();
                if line.is_empty() {
                    continue;
                }
                let _ = editor.add_history_entry(line.as_str());
                match line.as_str() {
                    START_COMMAND => {
                        if kernel.is_none() {
                            kernel = Some(Kernel::start());
                        }
                    }
                    STOP_COMMAND => {
                        if let Some(kernel) = kernel.take() {
                            kernel.stop();
                        }
                    }
                    RESET_COMMAND => {
                        if let Some(kernel) = kernel.take() {
                            kernel.stop();
                        }
                        kernel = Some(Kernel::start());
                    }
                    EXIT_COMMAND => break,
                    _ => match &kernel {
                        Some(kernel) => {
                            sigint.store(false, Ordering::SeqCst);
                            kernel.submit(&line);
                            await_reply(kernel, &sigint);
                        }
                        None => eprintln!("Error: interpreter kernel not running"),
                    },
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl-C cancels whatever the kernel is still chewing on
                if let Some(kernel) = &kernel {
                    kernel.interrupt();
                }
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("readline error: {err}");
                break;
            }
        }
    }
    Ok(())
}

/// Poll both outbound queues until the reply for the submitted program
/// arrives. A Ctrl-C received while waiting cancels the evaluation in
/// flight; its error then arrives on the error queue like any other.
fn await_reply(kernel: &Kernel, sigint: &AtomicBool) {
    loop {
        if sigint.swap(false, Ordering::SeqCst) {
            kernel.interrupt();
        }
        if let Some(result) = kernel.try_result() {
            println!("{result}");
            return;
        }
        if let Some(message) = kernel.try_error() {
            eprintln!("{message}");
            return;
        }
        thread::sleep(Duration::from_millis(1));
    }
}

fn install_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
