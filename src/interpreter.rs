use crate::command::{CommandFactory, Invocation};
use crate::conditional;
use crate::env::Environment;
use crate::error::{ShellError, ShellResult};
use crate::parser::{self, CommandLine, Node};
use crate::pipeline;
use crate::redirect;
use crate::signal::{InterruptControl, SignalGovernor, SystemInterrupts};

/// Factory allows creating instances of ExecutableCommand.
///
/// Only supports commands defined in this crate: the builtins and ExternalCommand.
pub(crate) struct Factory<T> {
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

/// Runs parsed lines: owns the environment and the dispatch table.
pub struct Executor {
    env: Environment,
    commands: Vec<Box<dyn CommandFactory>>,
}

impl Executor {
    pub fn new(env: Environment, commands: Vec<Box<dyn CommandFactory>>) -> Self {
        Self { env, commands }
    }

    /// The default dispatch table: `cd`, `pwd`, `echo`, `kill`, `ps`, then
    /// the external program launcher.
    pub fn default_commands() -> Vec<Box<dyn CommandFactory>> {
        use crate::builtin::*;
        use crate::external::ExternalCommand;
        vec![
            Box::new(Factory::<Cd>::default()),
            Box::new(Factory::<Pwd>::default()),
            Box::new(Factory::<Echo>::default()),
            Box::new(Factory::<Kill>::default()),
            Box::new(Factory::<Ps>::default()),
            Box::new(Factory::<ExternalCommand>::default()),
        ]
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// Execute one node of the tree. Conditional alternatives come back here.
    pub fn run(&mut self, node: &Node) -> ShellResult<()> {
        tracing::debug!(kind = node.kind_name(), "dispatch");
        match node {
            Node::Command(line) => self.run_command(line),
            Node::Redirect(r) => redirect::run(r, &self.env),
            Node::Pipeline(stages) => pipeline::run(stages, &self.env),
            Node::Conditional(groups) => conditional::evaluate(groups, |alt| self.run(alt)),
        }
    }

    /// Run a plain command through the dispatch table. No tokens, no work.
    fn run_command(&mut self, line: &CommandLine) -> ShellResult<()> {
        let Some(invocation) = Invocation::new(&line.text, &line.argv) else {
            return Ok(());
        };
        let command = self
            .commands
            .iter()
            .find_map(|factory| factory.try_create(&self.env, &invocation))
            .ok_or_else(|| ShellError::not_found(invocation.name))?;
        command.execute(&mut std::io::stdout().lock(), &mut self.env)
    }
}

/// The dispatcher: parses a line once, then runs it with SIGINT exposed.
///
/// Example
/// ```no_run
/// use minish::Interpreter;
/// let mut sh = Interpreter::default();
/// sh.execute("echo hello && pwd").unwrap();
/// ```
pub struct Interpreter<C: InterruptControl = SystemInterrupts> {
    executor: Executor,
    governor: SignalGovernor<C>,
}

impl<C: InterruptControl> Interpreter<C> {
    /// Create an interpreter with a custom dispatch table and interrupt control.
    pub fn new(env: Environment, commands: Vec<Box<dyn CommandFactory>>, control: C) -> Self {
        Self {
            executor: Executor::new(env, commands),
            governor: SignalGovernor::new(control),
        }
    }

    pub fn env(&self) -> &Environment {
        self.executor.env()
    }

    pub fn governor(&self) -> &SignalGovernor<C> {
        &self.governor
    }

    /// Dispatch one expanded line. Blank lines do nothing and do not touch
    /// the interrupt disposition.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn execute(&mut self, line: &str) -> ShellResult<()> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(());
        }
        let node = parser::parse_line(line);
        let _exposed = self.governor.expose();
        self.executor.run(&node)
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new(
            Environment::new(),
            Executor::default_commands(),
            SystemInterrupts,
        )
    }
}
