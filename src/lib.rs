//! A minimal interactive command interpreter.
//!
//! One already-expanded line is classified into a plain command, a
//! redirection (`>`, `>>`, `<`), a pipeline (`|`) or an AND/OR chain
//! (`&&`, `||`) and executed as OS processes with their standard streams
//! wired accordingly. Built-ins (`cd`, `pwd`, `echo`, `kill`, `ps`) come from
//! a pluggable dispatch table that ends with the external program launcher.
//!
//! The main entry point is [`Interpreter`]. [`repl`] provides the read loop
//! used by the `minish` binary, including environment-variable expansion.

mod builtin;
pub mod command;
mod conditional;
pub mod env;
pub mod error;
pub mod expand;
mod external;
mod interpreter;
mod lexer;
pub mod parser;
mod pipeline;
pub mod process;
mod redirect;
pub mod repl;
pub mod signal;

pub use error::{ErrorKind, ShellError, ShellResult};
pub use interpreter::{Executor, Interpreter};
