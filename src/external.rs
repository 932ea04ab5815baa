use crate::command::{CommandFactory, ExecutableCommand, Invocation};
use crate::env::Environment;
use crate::error::ShellResult;
use crate::interpreter::Factory;
use crate::process::ProcessSpec;
use std::borrow::Cow;
use std::ffi::OsStr;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Command that is not a builtin: a program run in the foreground with the
/// interpreter's streams.
pub struct ExternalCommand {
    argv: Vec<String>,
}

impl ExternalCommand {
    pub fn new(argv: Vec<String>) -> Self {
        Self { argv }
    }
}

/// The launcher accepts every name; resolution failures surface as
/// `LaunchError` when the command runs. It belongs at the end of the table.
impl CommandFactory for Factory<ExternalCommand> {
    fn try_create(
        &self,
        _env: &Environment,
        invocation: &Invocation<'_>,
    ) -> Option<Box<dyn ExecutableCommand>> {
        let argv = std::iter::once(invocation.name.to_owned())
            .chain(invocation.args.iter().cloned())
            .collect();
        Some(Box::new(ExternalCommand::new(argv)))
    }
}

impl ExecutableCommand for ExternalCommand {
    fn execute(self: Box<Self>, _stdout: &mut dyn Write, env: &mut Environment) -> ShellResult<()> {
        ProcessSpec::build(&self.argv, env)?.run(env)
    }
}

/// Resolve a command path the way a typical shell would.
///
/// Behavior:
/// - Absolute path: returns it if it exists.
/// - `./foo`, or a relative path with several components (e.g. `bin/sh`):
///   returns it, joined onto `current_dir`, if it exists.
/// - Single path component (no separators): search each directory in
///   `search_paths` (PATH) and return the first existing match.
/// - Empty path: returns `None`.
pub fn find_command_path<'a>(
    search_paths: &OsStr,
    current_dir: &Path,
    path: &'a Path,
) -> Option<Cow<'a, Path>> {
    if path.is_absolute() {
        return find_by_path(path).map(Cow::Borrowed);
    }

    if path.starts_with("./") {
        return find_by_path(&current_dir.join(path)).map(|p| Cow::Owned(p.to_owned()));
    }

    let mut components = path.components();
    let first = components.next();
    let second = components.next();
    match (first, second) {
        (None, None) => None,
        (Some(x), None) => find_in_path(search_paths, x.as_os_str()).map(Cow::Owned),
        _ => find_by_path(&current_dir.join(path)).map(|p| Cow::Owned(p.to_owned())),
    }
}

fn find_in_path(search_paths: &OsStr, cmd: &OsStr) -> Option<PathBuf> {
    std::env::split_paths(search_paths)
        .map(|dir| dir.join(cmd))
        .find(|candidate| candidate.is_file())
}

fn find_by_path(path: &Path) -> Option<&Path> {
    if path.exists() { Some(path) } else { None }
}
