use crate::env::Environment;
use crate::error::ShellResult;
use std::io::Write;

/// A plain command as typed: the full segment text plus its tokens.
///
/// Most commands only look at `name` and `args`; `echo` needs the raw text.
#[derive(Debug, Clone, Copy)]
pub struct Invocation<'a> {
    pub text: &'a str,
    pub name: &'a str,
    pub args: &'a [String],
}

impl<'a> Invocation<'a> {
    /// Split `argv` into name and arguments. Returns `None` for an empty argv.
    pub fn new(text: &'a str, argv: &'a [String]) -> Option<Self> {
        let (name, args) = argv.split_first()?;
        Some(Self {
            text,
            name: name.as_str(),
            args,
        })
    }
}

/// Object-safe trait for anything the dispatch table can run.
///
/// Built-ins write to `stdout`; external programs inherit the interpreter's
/// streams and ignore it.
pub trait ExecutableCommand {
    fn execute(self: Box<Self>, stdout: &mut dyn Write, env: &mut Environment) -> ShellResult<()>;
}

/// One entry of the dispatch table.
///
/// Returns `None` when the factory does not recognize the invocation, letting
/// the next entry try.
pub trait CommandFactory {
    fn try_create(
        &self,
        env: &Environment,
        invocation: &Invocation<'_>,
    ) -> Option<Box<dyn ExecutableCommand>>;
}
