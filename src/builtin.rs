use crate::command::{CommandFactory, ExecutableCommand, Invocation};
use crate::env::Environment;
use crate::error::{ShellError, ShellResult};
use crate::interpreter::Factory;
use crate::lexer::rest_after_first_token;
use crate::process::ProcessSpec;
use argh::{EarlyExit, FromArgs};
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use std::env;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

/// Built-in commands known to the shell at compile time.
///
/// Builtins run in-process, before any external resolution.
pub(crate) trait BuiltinCommand: Sized {
    /// Canonical name of the command, e.g. "echo" or "cd".
    fn name() -> &'static str;

    /// Build the command from its invocation. Argh-style early exits (usage
    /// errors and `--help`) are reported through [`EarlyExit`].
    fn parse(invocation: &Invocation<'_>) -> Result<Self, EarlyExit>;

    fn execute(self, stdout: &mut dyn Write, env: &mut Environment) -> ShellResult<()>;
}

/// Parse a builtin's arguments with argh.
fn from_argh<T: FromArgs>(invocation: &Invocation<'_>) -> Result<T, EarlyExit> {
    let args: Vec<&str> = invocation.args.iter().map(String::as_str).collect();
    T::from_args(&[invocation.name], &args)
}

impl<T: BuiltinCommand> ExecutableCommand for T {
    fn execute(self: Box<Self>, stdout: &mut dyn Write, env: &mut Environment) -> ShellResult<()> {
        T::execute(*self, stdout, env)
    }
}

/// Stand-in produced when argument parsing stopped early.
struct InvalidArgs {
    output: String,
    is_error: bool,
}

impl ExecutableCommand for InvalidArgs {
    fn execute(self: Box<Self>, stdout: &mut dyn Write, _env: &mut Environment) -> ShellResult<()> {
        if self.is_error {
            return Err(ShellError::Argument(self.output.trim_end().to_string()));
        }
        stdout.write_all(self.output.as_bytes())?;
        Ok(())
    }
}

impl<T: BuiltinCommand + 'static> CommandFactory for Factory<T> {
    fn try_create(
        &self,
        _env: &Environment,
        invocation: &Invocation<'_>,
    ) -> Option<Box<dyn ExecutableCommand>> {
        if invocation.name != T::name() {
            return None;
        }
        let cmd: Box<dyn ExecutableCommand> = match T::parse(invocation) {
            Ok(cmd) => Box::new(cmd),
            Err(EarlyExit { output, status }) => Box::new(InvalidArgs {
                output,
                is_error: status.is_err(),
            }),
        };
        Some(cmd)
    }
}

#[derive(FromArgs)]
/// Print the current working directory to standard output.
pub struct Pwd {
    #[argh(positional, greedy)]
    /// extra arguments; accepted and ignored.
    pub ignored: Vec<String>,
}

impl BuiltinCommand for Pwd {
    fn name() -> &'static str {
        "pwd"
    }

    fn parse(invocation: &Invocation<'_>) -> Result<Self, EarlyExit> {
        from_argh(invocation)
    }

    fn execute(self, stdout: &mut dyn Write, env: &mut Environment) -> ShellResult<()> {
        writeln!(stdout, "{}", env.current_dir.to_string_lossy())?;
        Ok(())
    }
}

#[derive(FromArgs)]
/// Change the current working directory.
/// If no target is provided, changes to the directory specified by the HOME environment variable.
/// Only the first positional is used; anything after it is ignored.
pub struct Cd {
    #[argh(positional, greedy)]
    /// directory to switch to; absolute or relative to the current directory. Defaults to $HOME when omitted.
    pub args: Vec<String>,
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    fn parse(invocation: &Invocation<'_>) -> Result<Self, EarlyExit> {
        from_argh(invocation)
    }

    fn execute(self, _stdout: &mut dyn Write, env: &mut Environment) -> ShellResult<()> {
        let target = match self.args.into_iter().next() {
            Some(t) if !t.is_empty() => PathBuf::from(t),
            _ => match env.get_var("HOME") {
                Some(home) => PathBuf::from(home),
                None => {
                    return Err(ShellError::Directory {
                        path: PathBuf::from("~"),
                        source: std::io::Error::new(
                            std::io::ErrorKind::NotFound,
                            "no target and HOME not set",
                        ),
                    });
                }
            },
        };

        let new_dir = env.resolve(&target);
        let canonical = fs::canonicalize(&new_dir).map_err(|source| ShellError::Directory {
            path: target.clone(),
            source,
        })?;
        env::set_current_dir(&canonical).map_err(|source| ShellError::Directory {
            path: target,
            source,
        })?;
        tracing::debug!(dir = %canonical.display(), "changed directory");
        env.current_dir = canonical;
        Ok(())
    }
}

/// Print the rest of the line after `echo `, spacing included.
pub struct Echo {
    pub text: String,
}

impl BuiltinCommand for Echo {
    fn name() -> &'static str {
        "echo"
    }

    fn parse(invocation: &Invocation<'_>) -> Result<Self, EarlyExit> {
        Ok(Self {
            text: rest_after_first_token(invocation.text).to_owned(),
        })
    }

    fn execute(self, stdout: &mut dyn Write, _env: &mut Environment) -> ShellResult<()> {
        writeln!(stdout, "{}", self.text)?;
        Ok(())
    }
}

#[derive(FromArgs)]
/// Send SIGTERM to a process.
pub struct Kill {
    #[argh(positional)]
    /// numeric id of the process to terminate.
    pub pid: Option<String>,
}

impl Kill {
    fn target(&self) -> ShellResult<Pid> {
        let raw = self
            .pid
            .as_deref()
            .ok_or_else(|| ShellError::Argument("kill: no pid".to_string()))?;
        match raw.parse::<i32>() {
            // 0 and negative ids address process groups
            Ok(pid) if pid > 0 => Ok(Pid::from_raw(pid)),
            _ => Err(ShellError::Argument(format!("kill: invalid pid: {raw}"))),
        }
    }
}

impl BuiltinCommand for Kill {
    fn name() -> &'static str {
        "kill"
    }

    fn parse(invocation: &Invocation<'_>) -> Result<Self, EarlyExit> {
        from_argh(invocation)
    }

    fn execute(self, _stdout: &mut dyn Write, _env: &mut Environment) -> ShellResult<()> {
        let pid = self.target()?;
        tracing::debug!(%pid, "sending SIGTERM");
        signal::kill(pid, Signal::SIGTERM).map_err(|source| ShellError::Process {
            pid: pid.as_raw(),
            source,
        })
    }
}

/// List processes by delegating to the system `ps`.
pub struct Ps {
    pub args: Vec<String>,
}

impl BuiltinCommand for Ps {
    fn name() -> &'static str {
        "ps"
    }

    fn parse(invocation: &Invocation<'_>) -> Result<Self, EarlyExit> {
        let args = if invocation.args.is_empty() {
            vec!["aux".to_string()]
        } else {
            invocation.args.to_vec()
        };
        Ok(Self { args })
    }

    fn execute(self, _stdout: &mut dyn Write, env: &mut Environment) -> ShellResult<()> {
        let argv: Vec<String> = std::iter::once("ps".to_string()).chain(self.args).collect();
        ProcessSpec::build(&argv, env)?.run(env)
    }
}
