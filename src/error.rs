use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use nix::errno::Errno;
use thiserror::Error;

/// Result type used throughout the execution engine.
pub type ShellResult<T> = Result<T, ShellError>;

/// Classification of a [`ShellError`], independent of its message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Argument,
    Directory,
    File,
    Launch,
    Process,
    NonZeroExit,
    Pipeline,
    Io,
}

/// Every way a dispatched line can fail.
///
/// Handlers return these unchanged to their caller; the read loop prints the
/// message and keeps going.
#[derive(Debug, Error)]
pub enum ShellError {
    /// A command was given arguments it cannot use.
    #[error("{0}")]
    Argument(String),

    /// `cd` could not switch to the requested directory.
    #[error("cd: {}: {source}", path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A redirection target could not be opened.
    #[error("{}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The program could not be resolved or started.
    #[error("{program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },

    /// Signalling a process failed (no such process, not permitted).
    #[error("kill: ({pid}): {source}")]
    Process {
        pid: i32,
        #[source]
        source: Errno,
    },

    /// Waiting on a started process failed.
    #[error("{program}: wait failed: {source}")]
    Wait {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The program ran but did not exit successfully.
    #[error("{program}: {status}")]
    NonZeroExit { program: String, status: ExitStatus },

    /// A pipeline stage failed; `stage` is its zero-based position.
    #[error("pipeline stage {stage}: {source}")]
    Pipeline {
        stage: usize,
        #[source]
        source: Box<ShellError>,
    },

    /// The operating system refused to create an inter-stage pipe.
    #[error("cannot create pipe: {0}")]
    PipeSetup(#[source] io::Error),

    /// Writing a built-in's output failed.
    #[error("write error: {0}")]
    Io(#[from] io::Error),
}

impl ShellError {
    /// Wrap `source` as the failure of pipeline stage `stage`.
    pub fn pipeline(stage: usize, source: ShellError) -> Self {
        ShellError::Pipeline {
            stage,
            source: Box::new(source),
        }
    }

    /// Error for a program that was not found in `PATH` or on disk.
    pub fn not_found(program: impl Into<String>) -> Self {
        ShellError::Launch {
            program: program.into(),
            source: io::Error::new(io::ErrorKind::NotFound, "command not found"),
        }
    }

    /// Exit status a shell would report for this failure: the child's own
    /// status for unsuccessful exits (through pipelines), 1 otherwise.
    pub fn exit_status(&self) -> i32 {
        match self {
            ShellError::NonZeroExit { status, .. } => exit_code(*status),
            ShellError::Pipeline { source, .. } => source.exit_status(),
            _ => 1,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ShellError::Argument(_) => ErrorKind::Argument,
            ShellError::Directory { .. } => ErrorKind::Directory,
            ShellError::File { .. } => ErrorKind::File,
            ShellError::Launch { .. } => ErrorKind::Launch,
            ShellError::Process { .. } | ShellError::Wait { .. } => ErrorKind::Process,
            ShellError::NonZeroExit { .. } => ErrorKind::NonZeroExit,
            ShellError::Pipeline { .. } | ShellError::PipeSetup(_) => ErrorKind::Pipeline,
            ShellError::Io(_) => ErrorKind::Io,
        }
    }
}

/// Conventional shell exit code for a finished process.
///
/// Processes killed by a signal map to `128 + signal`, as POSIX shells report them.
#[cfg(unix)]
pub fn exit_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    match (status.code(), status.signal()) {
        (Some(code), _) => code,
        (None, Some(signal)) => 128 + signal,
        (None, None) => -1,
    }
}

#[cfg(not(unix))]
pub fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}
