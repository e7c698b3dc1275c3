use crate::error::AppError;
use std::fmt::Display;
use std::io::{BufRead, Write};
use tokio::sync::mpsc;
use tracing::{debug, warn};

pub mod command;
pub mod report;

pub const COMMAND_QUEUE_DEPTH: usize = 16;

/// Line-oriented operator console output.
#[derive(Debug)]
pub struct Console<W> {
    out: W,
}

impl<W: Write> Console<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn line(&mut self, text: impl Display) -> Result<(), AppError> {
        writeln!(self.out, "{text}")?;
        self.out.flush()?;
        Ok(())
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }
}

/// Forward whole lines from stdin to the control loop on a detached OS thread.
/// The loop drains them without blocking. The thread is never joined, so a
/// pending stdin read does not hold up process exit.
pub fn spawn_line_reader(tx: mpsc::Sender<String>) -> std::io::Result<()> {
    std::thread::Builder::new()
        .name("console-reader".to_string())
        .spawn(move || forward_lines(std::io::stdin().lock(), &tx))?;
    Ok(())
}

/// Send each line of `input` until it ends, fails, or the receiver is gone.
/// Blocks the calling thread; do not call from inside the async runtime.
pub fn forward_lines<R: BufRead>(input: R, tx: &mpsc::Sender<String>) {
    for line in input.lines() {
        match line {
            Ok(line) => {
                if tx.blocking_send(line).is_err() {
                    debug!("Command receiver dropped, console reader stopping");
                    return;
                }
            }
            Err(err) => {
                warn!(error = %err, "Console read failed");
                return;
            }
        }
    }
    debug!("Console input closed");
}
