//! Descriptors for processes about to be launched.

use crate::env::Environment;
use crate::error::{ShellError, ShellResult};
use crate::external::find_command_path;
use std::ffi::OsString;
use std::fs::File;
use std::io::{PipeReader, PipeWriter};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};

/// Where one standard stream of a child process points.
#[derive(Debug, Default)]
pub enum Stream {
    /// Shared with the interpreter.
    #[default]
    Inherit,
    /// Read end of an anonymous pipe.
    PipeIn(PipeReader),
    /// Write end of an anonymous pipe.
    PipeOut(PipeWriter),
    File(File),
}

impl From<Stream> for Stdio {
    fn from(stream: Stream) -> Self {
        match stream {
            Stream::Inherit => Stdio::inherit(),
            Stream::PipeIn(reader) => reader.into(),
            Stream::PipeOut(writer) => writer.into(),
            Stream::File(file) => file.into(),
        }
    }
}

/// A resolved program, its arguments and its stream bindings.
///
/// Consumed by [`ProcessSpec::spawn`]; every handle it owns is closed in the
/// parent once the child has been started.
#[derive(Debug)]
pub struct ProcessSpec {
    pub name: String,
    pub program: PathBuf,
    pub args: Vec<OsString>,
    pub stdin: Stream,
    pub stdout: Stream,
    pub stderr: Stream,
}

impl ProcessSpec {
    /// Resolve `argv[0]` and build a spec with all streams inherited.
    pub fn build(argv: &[String], env: &Environment) -> ShellResult<Self> {
        let (name, args) = argv
            .split_first()
            .ok_or_else(|| ShellError::Argument("empty command".to_string()))?;
        let search_paths = env.search_paths();
        let program = find_command_path(&search_paths, &env.current_dir, Path::new(name))
            .ok_or_else(|| ShellError::not_found(name.as_str()))?
            .into_owned();
        Ok(Self {
            name: name.clone(),
            program,
            args: args.iter().map(OsString::from).collect(),
            stdin: Stream::Inherit,
            stdout: Stream::Inherit,
            stderr: Stream::Inherit,
        })
    }

    /// Start the process without waiting for it.
    pub fn spawn(self, env: &Environment) -> ShellResult<Child> {
        let ProcessSpec {
            name,
            program,
            args,
            stdin,
            stdout,
            stderr,
        } = self;
        tracing::debug!(program = %program.display(), args = ?args, "spawning");
        let mut command = Command::new(&program);
        command
            .args(&args)
            .stdin(stdin)
            .stdout(stdout)
            .stderr(stderr)
            .envs(env.vars.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .current_dir(&env.current_dir);
        // `command` owns the parent's copies of the stream handles and is
        // dropped on return, so pipe ends close as soon as the child exists.
        command.spawn().map_err(|source| ShellError::Launch {
            program: name,
            source,
        })
    }

    /// Run in the foreground: start, wait, and check the exit status.
    pub fn run(self, env: &Environment) -> ShellResult<()> {
        let name = self.name.clone();
        let mut child = self.spawn(env)?;
        let status = child.wait().map_err(|source| ShellError::Wait {
            program: name.clone(),
            source,
        })?;
        check_status(name, status)
    }
}

/// Turn an unsuccessful exit into [`ShellError::NonZeroExit`].
pub fn check_status(program: String, status: ExitStatus) -> ShellResult<()> {
    if status.success() {
        Ok(())
    } else {
        Err(ShellError::NonZeroExit { program, status })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::collections::HashMap;
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn test_env(dir: &Path) -> Environment {
        let mut vars = HashMap::new();
        vars.insert("PATH".to_string(), "/usr/bin:/bin".to_string());
        Environment {
            vars,
            current_dir: dir.to_path_buf(),
        }
    }

    fn make_unique_temp_dir(tag: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let p = std::env::temp_dir().join(format!("minish_{tag}_{}_{nanos}", std::process::id()));
        fs::create_dir_all(&p).unwrap();
        p
    }

    fn argv(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    #[cfg(unix)]
    fn build_resolves_through_path() {
        let env = test_env(Path::new("/"));
        let spec = ProcessSpec::build(&argv(&["sh", "-c", "exit", "0"]), &env).unwrap();
        assert!(spec.program.ends_with("sh"));
        assert_eq!(spec.args, vec!["-c", "exit", "0"]);
        assert!(matches!(spec.stdin, Stream::Inherit));
        assert!(matches!(spec.stdout, Stream::Inherit));
        assert!(matches!(spec.stderr, Stream::Inherit));
    }

    #[test]
    fn build_rejects_unknown_program() {
        let env = test_env(Path::new("/"));
        let err = ProcessSpec::build(&argv(&["minish-no-such-program"]), &env).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Launch);
    }

    #[test]
    fn build_rejects_empty_argv() {
        let env = test_env(Path::new("/"));
        let err = ProcessSpec::build(&[], &env).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Argument);
    }

    #[test]
    #[cfg(unix)]
    fn run_reports_non_zero_exit() {
        let env = test_env(Path::new("/"));
        ProcessSpec::build(&argv(&["true"]), &env)
            .unwrap()
            .run(&env)
            .unwrap();
        let err = ProcessSpec::build(&argv(&["false"]), &env)
            .unwrap()
            .run(&env)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NonZeroExit);
    }

    #[test]
    #[cfg(unix)]
    fn run_with_file_stdout_and_current_dir() {
        let dir = make_unique_temp_dir("process");
        let env = test_env(&dir);
        let out = dir.join("pwd.txt");
        let mut spec = ProcessSpec::build(&argv(&["pwd"]), &env).unwrap();
        spec.stdout = Stream::File(File::create(&out).unwrap());
        spec.run(&env).unwrap();

        let printed = fs::read_to_string(&out).unwrap();
        assert_eq!(
            fs::canonicalize(printed.trim()).unwrap(),
            fs::canonicalize(&dir).unwrap()
        );
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    #[cfg(unix)]
    fn spawn_failure_is_launch_error() {
        use std::os::unix::fs::PermissionsExt;
        let dir = make_unique_temp_dir("noexec");
        let script = dir.join("not-executable");
        fs::write(&script, "#!/bin/sh\n").unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o644)).unwrap();

        let env = test_env(&dir);
        let spec = ProcessSpec::build(&argv(&[script.to_str().unwrap()]), &env).unwrap();
        let err = spec.run(&env).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Launch);
        let _ = fs::remove_dir_all(dir);
    }
}
