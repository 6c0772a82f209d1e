use crate::env::Environment;
use crate::history::History;
use argh::FromArgs;
use std::path::{Path, PathBuf};

/// Environment variable holding the log filter, e.g. `MSH_LOG=debug`.
pub const LOG_ENV: &str = "MSH_LOG";

/// Log filter used when `MSH_LOG` is unset or invalid.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Name of the history log inside `$HOME`.
pub const HISTORY_FILE_NAME: &str = ".msh_history";

#[derive(FromArgs, Debug)]
/// A small interactive shell: builtins, external programs and pipelines.
pub struct Args {
    /// history file to use instead of $HOME/.msh_history
    #[argh(option)]
    pub history_file: Option<PathBuf>,

    /// keep history in memory only, never touching a file
    #[argh(switch)]
    pub no_history: bool,
}

/// Settings resolved from the command line and the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Where history is persisted; `None` keeps it in memory.
    pub history_file: Option<PathBuf>,
}

impl Config {
    pub fn from_args(args: Args, env: &Environment) -> Self {
        if args.no_history {
            return Self { history_file: None };
        }
        let history_file = args
            .history_file
            .or_else(|| env.home().map(|home| Path::new(&home).join(HISTORY_FILE_NAME)));
        if history_file.is_none() {
            tracing::warn!("HOME is not set; history will not be saved");
        }
        Self { history_file }
    }

    /// Open the configured history, falling back to memory if the file
    /// can't be used.
    pub fn open_history(&self) -> History {
        let Some(path) = &self.history_file else {
            return History::in_memory();
        };
        History::open(path).unwrap_or_else(|err| {
            tracing::warn!("{:#}; history will not be saved", err);
            History::in_memory()
        })
    }
}
