//! Running `a | b | c`: every stage is an external process, all of them run
//! at once, connected by anonymous pipes.

use crate::env::Environment;
use crate::error::{ShellError, ShellResult};
use crate::parser::CommandLine;
use crate::process::{check_status, ProcessSpec, Stream};
use std::io;
use std::process::Child;

struct Stage {
    index: usize,
    name: String,
    child: Child,
}

/// The started children of one pipeline.
///
/// [`RunningStages::wait_all`] reaps each child exactly once. Anything still
/// held when the set is dropped (an early return after a failed start) is
/// killed and reaped there, so no pipeline leaves a process behind.
pub(crate) struct RunningStages {
    stages: Vec<Stage>,
}

impl RunningStages {
    pub(crate) fn with_capacity(n: usize) -> Self {
        Self {
            stages: Vec::with_capacity(n),
        }
    }

    pub(crate) fn push(&mut self, index: usize, name: String, child: Child) {
        self.stages.push(Stage { index, name, child });
    }

    pub(crate) fn len(&self) -> usize {
        self.stages.len()
    }

    /// Wait on every stage in order. Returns the first failure, after all
    /// stages have been reaped.
    pub(crate) fn wait_all(&mut self) -> ShellResult<()> {
        let mut first_error = None;
        for Stage {
            index,
            name,
            mut child,
        } in self.stages.drain(..)
        {
            let outcome = match child.wait() {
                Ok(status) => check_status(name, status),
                Err(source) => Err(ShellError::Wait {
                    program: name,
                    source,
                }),
            };
            if let Err(err) = outcome {
                tracing::debug!(stage = index, error = %err, "pipeline stage failed");
                if first_error.is_none() {
                    first_error = Some(ShellError::pipeline(index, err));
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

impl Drop for RunningStages {
    fn drop(&mut self) {
        for stage in &mut self.stages {
            tracing::debug!(stage = stage.index, pid = stage.child.id(), "killing unfinished stage");
            let _ = stage.child.kill();
            let _ = stage.child.wait();
        }
    }
}

/// Build, wire, start, then wait on every stage of the pipeline.
#[tracing::instrument(level = "debug", skip_all, fields(stages = stages.len()))]
pub fn run(stages: &[CommandLine], env: &Environment) -> ShellResult<()> {
    let mut specs = stages
        .iter()
        .enumerate()
        .map(|(index, stage)| {
            if stage.is_empty() {
                let err = ShellError::Argument("empty command in pipeline".to_string());
                return Err(ShellError::pipeline(index, err));
            }
            ProcessSpec::build(&stage.argv, env).map_err(|err| ShellError::pipeline(index, err))
        })
        .collect::<ShellResult<Vec<_>>>()?;

    connect(&mut specs).map_err(ShellError::PipeSetup)?;

    let mut running = RunningStages::with_capacity(specs.len());
    for (index, spec) in specs.into_iter().enumerate() {
        let name = spec.name.clone();
        let child = spec
            .spawn(env)
            .map_err(|err| ShellError::pipeline(index, err))?;
        running.push(index, name, child);
    }
    tracing::debug!(started = running.len(), "pipeline running");
    running.wait_all()
}

/// Point each stage's stdout at the next stage's stdin.
fn connect(specs: &mut [ProcessSpec]) -> io::Result<()> {
    for i in 1..specs.len() {
        let (reader, writer) = io::pipe()?;
        specs[i - 1].stdout = Stream::PipeOut(writer);
        specs[i].stdin = Stream::PipeIn(reader);
    }
    Ok(())
}
