//! Classification of one input line into a tagged tree.
//!
//! The grammar knows four operators and no precedence beyond a fixed scan
//! order over the raw text:
//!
//! 1. `&&` or `||` anywhere makes the line a conditional chain,
//! 2. otherwise `>` or `<` makes it a redirection,
//! 3. otherwise `|` makes it a pipeline,
//! 4. otherwise it is a plain command.
//!
//! Conditional alternatives are classified again with the same rules, once,
//! when the tree is built.

use crate::lexer::split_into_tokens;
use std::path::PathBuf;

/// One command segment: its trimmed source text and its tokens.
///
/// `argv` may be empty; what that means is up to the handler that runs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub text: String,
    pub argv: Vec<String>,
}

impl CommandLine {
    pub fn new(text: &str) -> Self {
        let text = text.trim();
        Self {
            text: text.to_owned(),
            argv: split_into_tokens(text),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.argv.is_empty()
    }
}

/// How a redirection target is opened and which stream it replaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectMode {
    /// `>`: create or truncate, bound to stdout.
    Truncate,
    /// `>>`: create or append, bound to stdout.
    Append,
    /// `<`: open an existing file, bound to stdin.
    Read,
}

/// Operators in the order they are looked for; `>>` must win over `>`.
const REDIRECT_OPERATORS: [(&str, RedirectMode); 3] = [
    (">>", RedirectMode::Append),
    (">", RedirectMode::Truncate),
    ("<", RedirectMode::Read),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub command: CommandLine,
    pub target: PathBuf,
    pub mode: RedirectMode,
}

/// One `&&`-separated link of a conditional chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AndGroup {
    /// The non-empty `||` alternatives, already classified.
    pub alternatives: Vec<Node>,
}

/// The parsed form of a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Command(CommandLine),
    Redirect(Redirect),
    /// Stages in order; always at least one.
    Pipeline(Vec<CommandLine>),
    Conditional(Vec<AndGroup>),
}

impl Node {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Command(_) => "command",
            Node::Redirect(_) => "redirect",
            Node::Pipeline(_) => "pipeline",
            Node::Conditional(_) => "conditional",
        }
    }
}

/// Build the tree for one line. Parsing never fails; malformed pieces such
/// as empty pipeline segments are rejected when they are executed.
pub fn parse_line(line: &str) -> Node {
    let line = line.trim();
    if line.contains("&&") || line.contains("||") {
        return Node::Conditional(parse_conditional(line));
    }
    if let Some(redirect) = parse_redirect(line) {
        return Node::Redirect(redirect);
    }
    if line.contains('|') {
        return Node::Pipeline(line.split('|').map(CommandLine::new).collect());
    }
    Node::Command(CommandLine::new(line))
}

fn parse_conditional(line: &str) -> Vec<AndGroup> {
    line.split("&&")
        .map(|group| AndGroup {
            alternatives: group
                .split("||")
                .map(str::trim)
                .filter(|alternative| !alternative.is_empty())
                .map(parse_line)
                .collect(),
        })
        .collect()
}

fn parse_redirect(line: &str) -> Option<Redirect> {
    REDIRECT_OPERATORS.iter().find_map(|(op, mode)| {
        line.split_once(op).map(|(command, target)| Redirect {
            command: CommandLine::new(command),
            target: PathBuf::from(target.trim()),
            mode: *mode,
        })
    })
}
