//! The read loop around [`Interpreter`].
//!
//! Input is expanded (`$NAME`, `${NAME}`) here, before the interpreter sees
//! it. Failures are printed as `minish: <error>` and never end the session.

use crate::error::ShellError;
use crate::expand::expand_vars;
use crate::interpreter::Interpreter;
use crate::signal::{InterruptControl, SystemInterrupts};
use anyhow::{Context, Result};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::BufRead;

pub const DEFAULT_PROMPT: &str = "minish> ";

pub struct Repl<C: InterruptControl = SystemInterrupts> {
    interpreter: Interpreter<C>,
}

impl<C: InterruptControl> Repl<C> {
    pub fn new(interpreter: Interpreter<C>) -> Self {
        Self { interpreter }
    }

    /// Expand and dispatch one raw input line.
    pub fn process_line(&mut self, raw: &str) -> Result<(), ShellError> {
        let line = expand_vars(raw, self.interpreter.env());
        self.interpreter.execute(&line)
    }

    /// Process a line and report a failure on stderr. Returns the exit status.
    pub fn run_line(&mut self, raw: &str) -> i32 {
        match self.process_line(raw) {
            Ok(()) => 0,
            Err(err) => {
                tracing::debug!(kind = ?err.kind(), "command failed");
                eprintln!("minish: {err}");
                err.exit_status()
            }
        }
    }

    /// Non-interactive mode: run the first non-empty line of `input`, then stop.
    ///
    /// Empty lines before it are skipped and later lines are left unread.
    /// Returns 0 when the input holds no such line.
    pub fn run_first_line<R: BufRead>(&mut self, mut input: R) -> Result<i32> {
        let mut line = String::new();
        loop {
            line.clear();
            let read = input
                .read_line(&mut line)
                .context("failed to read from stdin")?;
            if read == 0 {
                return Ok(0);
            }
            let content = line.trim_end_matches(['\n', '\r']);
            if !content.is_empty() {
                return Ok(self.run_line(content));
            }
        }
    }

    /// Interactive mode: prompt, read, run, until end of input.
    pub fn run_interactive(&mut self, prompt: &str) -> Result<()> {
        let mut rl = DefaultEditor::new().context("failed to initialize line editor")?;

        loop {
            match rl.readline(prompt) {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    if let Err(err) = rl.add_history_entry(line.as_str()) {
                        tracing::warn!("Failed to add history entry: {}", err);
                    }
                    self.run_line(&line);
                }
                // Ctrl-C at the prompt only discards the current input.
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => {
                    println!();
                    return Ok(());
                }
                Err(err) => return Err(err).context("failed to read input line"),
            }
        }
    }
}
