//! A small interactive command interpreter.
//!
//! Each input line is either a single command or a `|`-separated pipeline.
//! Single commands are looked up in a fixed set of builtins first (`echo`,
//! `exit`, `type`, `pwd`, `cd`, plus the special `history` listing) and
//! otherwise resolved to an external program and run with the shell's
//! standard streams. Pipelines always run external programs, wired output to
//! input.
//!
//! There is no shell grammar: words are split on single spaces, and quoting,
//! expansion, redirection and job control are not supported.
//!
//! The main entry point is [`Interpreter`]. Process creation sits behind the
//! [`Launcher`] trait and line input behind [`LineSource`], so both can be
//! replaced in tests.

pub mod builtin;
pub mod command;
pub mod config;
pub mod env;
pub mod error;
pub mod external;
pub mod history;
pub mod input;
mod interpreter;
pub mod io_adapters;
pub mod pipeline;
pub mod resolve;
pub mod signal;

pub use command::{ExitCode, Flow, Stage};
pub use error::ShellError;
pub use external::{Launcher, StageStatus, SystemLauncher};
pub use input::{EditorSource, LineSource, PlainSource, PROMPT};
pub use interpreter::Interpreter;
pub use io_adapters::MemWriter;
