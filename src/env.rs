use std::collections::HashMap;
use std::env as stdenv;
use std::ffi::OsString;

/// The interpreter's view of the process environment.
///
/// `vars` is captured once from the process at startup and is what external
/// commands see. Lookups fall back to the live process environment so an
/// explicitly empty `Environment` still behaves like the host.
///
/// Note: fields are public so tests can build an environment by hand with a
/// controlled `PATH` or `HOME`.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    /// Key-value store of environment variables (e.g., PATH, HOME).
    pub vars: HashMap<String, String>,
}

impl Environment {
    /// Capture the current process environment.
    pub fn new() -> Self {
        Self {
            vars: stdenv::vars().collect(),
        }
    }

    /// Get the value of an environment variable.
    ///
    /// Looks up the key in `self.vars` first, falling back to `std::env::var`.
    pub fn get_var(&self, key: &str) -> Option<String> {
        self.vars
            .get(key)
            .cloned()
            .or_else(|| stdenv::var(key).ok())
    }

    /// Set or override an environment variable in `self.vars`.
    pub fn set_var(&mut self, key: impl Into<String>, val: impl Into<String>) {
        self.vars.insert(key.into(), val.into());
    }

    /// The raw search path list, read fresh on every call.
    pub fn search_paths(&self) -> Option<OsString> {
        self.get_var("PATH").map(OsString::from)
    }

    pub fn home(&self) -> Option<String> {
        self.get_var("HOME")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_set_and_get_var() {
        let mut env = Environment::default();

        // initially absent
        assert_eq!(env.get_var("SOME_RANDOM_ENV_VAR_12345"), None);

        env.set_var("KEY", "VALUE");

        assert_eq!(env.get_var("KEY"), Some("VALUE".to_string()));
    }

    #[test]
    fn test_env_reads_from_process_env() {
        let env = Environment::new();
        assert!(env.get_var("PATH").is_some());
    }

    #[test]
    fn test_override_shadows_process_env() {
        let mut env = Environment::default();
        env.set_var("PATH", "/nowhere");
        assert_eq!(env.search_paths(), Some(OsString::from("/nowhere")));
    }
}
