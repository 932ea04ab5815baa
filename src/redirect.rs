//! Running a command with one standard stream bound to a file.

use crate::env::Environment;
use crate::error::{ShellError, ShellResult};
use crate::parser::{Redirect, RedirectMode};
use crate::process::{ProcessSpec, Stream};
use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;

impl RedirectMode {
    fn open(self, path: &Path) -> io::Result<File> {
        match self {
            RedirectMode::Truncate => File::create(path),
            RedirectMode::Append => OpenOptions::new().append(true).create(true).open(path),
            RedirectMode::Read => File::open(path),
        }
    }
}

/// Open the target, bind it, and run the inner command in the foreground.
///
/// The inner command is always an external program. The file handle moves
/// into the child's stream binding and is closed on every return path.
#[tracing::instrument(level = "debug", skip_all, fields(path = %redirect.target.display(), mode = ?redirect.mode))]
pub fn run(redirect: &Redirect, env: &Environment) -> ShellResult<()> {
    if redirect.target.as_os_str().is_empty() {
        return Err(ShellError::Argument(
            "missing redirection target".to_string(),
        ));
    }
    let path = env.resolve(&redirect.target);
    let file = redirect
        .mode
        .open(&path)
        .map_err(|source| ShellError::File {
            path: redirect.target.clone(),
            source,
        })?;

    if redirect.command.is_empty() {
        return Ok(());
    }

    let mut spec = ProcessSpec::build(&redirect.command.argv, env)?;
    match redirect.mode {
        RedirectMode::Read => spec.stdin = Stream::File(file),
        RedirectMode::Truncate | RedirectMode::Append => spec.stdout = Stream::File(file),
    }
    spec.run(env)
}
