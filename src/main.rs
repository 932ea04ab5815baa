//! minish entry point.
//!
//! Usage:
//!   minish                  # interactive when stdin is a terminal, else run the first line
//!   minish -c <line>        # run one line and exit

use argh::FromArgs;
use minish::Interpreter;
use minish::repl::{DEFAULT_PROMPT, Repl};
use std::io::IsTerminal;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(FromArgs)]
/// A minimal command interpreter with pipes, redirections and && / || chains.
struct Args {
    #[argh(option, short = 'c')]
    /// run this line and exit
    command: Option<String>,

    #[argh(option, default = "DEFAULT_PROMPT.to_string()")]
    /// prompt shown in interactive mode
    prompt: String,
}

fn main() -> ExitCode {
    // RUST_LOG overrides the default level
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args: Args = argh::from_env();
    match run(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("minish: {e:?}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> anyhow::Result<ExitCode> {
    let mut repl = Repl::new(Interpreter::default());

    if let Some(line) = args.command {
        return Ok(exit_code(repl.run_line(&line)));
    }

    let stdin = std::io::stdin();
    if stdin.is_terminal() {
        repl.run_interactive(&args.prompt)?;
        Ok(ExitCode::SUCCESS)
    } else {
        let status = repl.run_first_line(stdin.lock())?;
        Ok(exit_code(status))
    }
}

fn exit_code(status: i32) -> ExitCode {
    ExitCode::from(u8::try_from(status).unwrap_or(1))
}
