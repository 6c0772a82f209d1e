use std::io;
use std::path::PathBuf;

use rustyline::error::ReadlineError;
use thiserror::Error;

use crate::external::StageStatus;

/// Every failure the shell knows how to report.
///
/// None of these ever reach the read-eval loop as a failure: the interpreter
/// renders them as one diagnostic line on standard output and keeps going.
/// `CommandNotFound` and `CommandFailed` are distinct kinds but print the
/// same text, so callers can tell them apart without changing the output.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("{line}: command not found")]
    CommandNotFound { line: String },

    #[error("{line}: command not found")]
    CommandFailed { line: String, status: StageStatus },

    #[error("{line}: Command not found")]
    PipelineNotStarted { line: String },

    #[error("Invalid number of Arguments.")]
    InvalidArguments { builtin: &'static str },

    #[error("{}: No such file or directory", .path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("end of input")]
    InputTerminated,

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Readline(#[from] ReadlineError),
}
