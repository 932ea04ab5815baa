use std::collections::HashMap;
use std::env as stdenv;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// The interpreter's view of the process environment.
///
/// Every spawned process receives `vars` and starts in `current_dir`.
/// `cd` is the only command that mutates it, and it also moves the real
/// process working directory so both views stay in step.
#[derive(Debug, Clone)]
pub struct Environment {
    /// Variables exported to executed commands (PATH, HOME, ...).
    pub vars: HashMap<String, String>,
    /// Working directory for command execution and relative redirection targets.
    pub current_dir: PathBuf,
}

impl Environment {
    /// Capture the current process state.
    pub fn new() -> Self {
        let vars = stdenv::vars().collect();
        let current_dir = stdenv::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self { vars, current_dir }
    }

    /// Look up a variable, falling back to the live process environment.
    pub fn get_var(&self, key: &str) -> Option<String> {
        self.vars
            .get(key)
            .cloned()
            .or_else(|| stdenv::var(key).ok())
    }

    pub fn set_var(&mut self, key: impl Into<String>, val: impl Into<String>) {
        self.vars.insert(key.into(), val.into());
    }

    /// Search path used to resolve bare program names.
    pub fn search_paths(&self) -> OsString {
        self.get_var("PATH").map(OsString::from).unwrap_or_default()
    }

    /// Make `path` absolute relative to [`Environment::current_dir`].
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.current_dir.join(path)
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_set_and_get_var() {
        let mut env = Environment {
            vars: HashMap::new(),
            current_dir: stdenv::current_dir().unwrap(),
        };

        assert_eq!(env.get_var("MINISH_SURELY_UNSET_VAR_12345"), None);

        env.set_var("KEY", "VALUE");

        assert_eq!(env.get_var("KEY"), Some("VALUE".to_string()));
    }

    #[test]
    fn test_env_reads_from_process_env() {
        let env = Environment::new();
        assert!(env.get_var("PATH").is_some());
        assert!(!env.search_paths().is_empty());
    }

    #[test]
    fn test_resolve_relative_against_current_dir() {
        let env = Environment {
            vars: HashMap::new(),
            current_dir: PathBuf::from("/srv/work"),
        };
        assert_eq!(env.resolve("out.txt"), PathBuf::from("/srv/work/out.txt"));
        assert_eq!(env.resolve("/tmp/x"), PathBuf::from("/tmp/x"));
    }
}
