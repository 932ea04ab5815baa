//! Environment-variable expansion applied by the read loop before dispatch.
//!
//! Supported forms are `$NAME` and `${NAME}`. Unset variables expand to the
//! empty string. A digit or one of `*#$@!?-` after `$` is a one-character
//! name, so `$$` and `$1` usually expand to nothing. A `$` that does not start
//! a name is kept as-is, `${}` disappears, and an unterminated `${` is dropped
//! while the text after it is expanded as usual.

use crate::env::Environment;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExpandState {
    Text,
    Dollar,
    Name,
    Braced,
}

struct Expander<'a> {
    env: &'a Environment,
    state: ExpandState,
    out: String,
    name: String,
}

impl<'a> Expander<'a> {
    fn new(env: &'a Environment, capacity: usize) -> Self {
        Self {
            env,
            state: ExpandState::Text,
            out: String::with_capacity(capacity),
            name: String::new(),
        }
    }

    fn feed(&mut self, ch: char) {
        match self.state {
            ExpandState::Text => self.handle_text(ch),
            ExpandState::Dollar => self.handle_dollar(ch),
            ExpandState::Name => self.handle_name(ch),
            ExpandState::Braced => self.handle_braced(ch),
        }
    }

    fn handle_text(&mut self, ch: char) {
        if ch == '$' {
            self.state = ExpandState::Dollar;
        } else {
            self.out.push(ch);
        }
    }

    fn handle_dollar(&mut self, ch: char) {
        match ch {
            '{' => self.state = ExpandState::Braced,
            c if is_special_name(c) => {
                self.name.push(c);
                self.substitute();
                self.state = ExpandState::Text;
            }
            c if is_name_char(c) => {
                self.name.push(c);
                self.state = ExpandState::Name;
            }
            c => {
                self.out.push('$');
                self.state = ExpandState::Text;
                self.handle_text(c);
            }
        }
    }

    fn handle_name(&mut self, ch: char) {
        if is_name_char(ch) {
            self.name.push(ch);
        } else {
            self.substitute();
            self.state = ExpandState::Text;
            self.handle_text(ch);
        }
    }

    fn handle_braced(&mut self, ch: char) {
        if ch == '}' {
            self.substitute();
            self.state = ExpandState::Text;
        } else {
            self.name.push(ch);
        }
    }

    fn substitute(&mut self) {
        let name = std::mem::take(&mut self.name);
        if name.is_empty() {
            return;
        }
        if let Some(value) = self.env.get_var(&name) {
            self.out.push_str(&value);
        }
    }

    fn finish(mut self) -> String {
        loop {
            match self.state {
                ExpandState::Text => break,
                ExpandState::Dollar => {
                    self.out.push('$');
                    break;
                }
                ExpandState::Name => {
                    self.substitute();
                    break;
                }
                // No closing brace: drop `${` and rescan what followed it.
                ExpandState::Braced => {
                    let rest = std::mem::take(&mut self.name);
                    self.state = ExpandState::Text;
                    rest.chars().for_each(|ch| self.feed(ch));
                }
            }
        }
        self.out
    }
}

fn is_special_name(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, '*' | '#' | '$' | '@' | '!' | '?' | '-')
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Replace variable references in `line` with their values from `env`.
pub fn expand_vars(line: &str, env: &Environment) -> String {
    let mut expander = Expander::new(env, line.len());
    for ch in line.chars() {
        expander.feed(ch);
    }
    expander.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn env_with(vars: &[(&str, &str)]) -> Environment {
        Environment {
            vars: vars
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<HashMap<_, _>>(),
            current_dir: PathBuf::from("/"),
        }
    }

    #[test]
    fn expands_plain_and_braced_names() {
        let env = env_with(&[("GREETING", "hi"), ("WHO", "there")]);
        assert_eq!(expand_vars("echo $GREETING ${WHO}!", &env), "echo hi there!");
        assert_eq!(expand_vars("${GREETING}x", &env), "hix");
        assert_eq!(expand_vars("$GREETING/sub", &env), "hi/sub");
    }

    #[test]
    fn unset_variables_expand_to_nothing() {
        let env = env_with(&[]);
        assert_eq!(
            expand_vars("a${MINISH_UNSET_FOR_TEST_1}b$MINISH_UNSET_FOR_TEST_2", &env),
            "ab"
        );
    }

    #[test]
    fn lone_dollar_is_kept() {
        let env = env_with(&[]);
        assert_eq!(expand_vars("cost $ 5", &env), "cost $ 5");
        assert_eq!(expand_vars("end$", &env), "end$");
        assert_eq!(expand_vars("a$/b", &env), "a$/b");
    }

    #[test]
    fn special_names_are_one_character() {
        let env = env_with(&[("1", "one")]);
        assert_eq!(expand_vars("pid=$$.", &env), "pid=.");
        assert_eq!(expand_vars("$1abc", &env), "oneabc");
        assert_eq!(expand_vars("${1}", &env), "one");
    }

    #[test]
    fn malformed_braces() {
        let env = env_with(&[("X", "1")]);
        assert_eq!(expand_vars("a${}b", &env), "ab");
        assert_eq!(expand_vars("a${X", &env), "aX");
        assert_eq!(expand_vars("${X $X", &env), "X 1");
    }
}
