use crate::builtin::{Builtins, Context, run_builtin};
use crate::command::{ExitCode, Flow, Stage};
use crate::env::Environment;
use crate::error::ShellError;
use crate::external::{Launcher, StageStatus, SystemLauncher};
use crate::history::History;
use crate::input::{LineSource, PROMPT};
use crate::pipeline::{self, Pipeline};
use crate::resolve::find_command_path;
use std::io::{self, Write};

/// The shell: builtin registry, process launcher and history wired together.
///
/// Everything that used to be process-wide state lives here, so several
/// interpreters can coexist in one process (tests rely on this).
///
/// Example
/// ```
/// use msh::{Flow, Interpreter, MemWriter};
/// let out = MemWriter::new();
/// let mut sh = Interpreter::default().with_stdout(Box::new(out.clone()));
/// assert_eq!(sh.eval("echo hello world"), Flow::Continue);
/// assert_eq!(sh.eval("exit 7"), Flow::Exit(7));
/// assert_eq!(out.contents(), "hello world\n");
/// ```
pub struct Interpreter {
    env: Environment,
    builtins: Builtins,
    launcher: Box<dyn Launcher>,
    history: History,
    stdout: Box<dyn Write>,
}

impl Interpreter {
    /// Create an interpreter over the process environment, writing to the
    /// process's standard output.
    pub fn new(builtins: Builtins, launcher: Box<dyn Launcher>, history: History) -> Self {
        Self {
            env: Environment::new(),
            builtins,
            launcher,
            history,
            stdout: Box::new(io::stdout()),
        }
    }

    pub fn with_env(mut self, env: Environment) -> Self {
        self.env = env;
        self
    }

    /// Redirect the shell's own output (builtins and diagnostics).
    /// External programs keep writing to the real standard output.
    pub fn with_stdout(mut self, stdout: Box<dyn Write>) -> Self {
        self.stdout = stdout;
        self
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Prompt, read, evaluate, repeat.
    ///
    /// Returns the status the process should exit with: the `exit` builtin's
    /// code, or 1 once input ends or can't be read.
    pub fn repl(&mut self, input: &mut dyn LineSource) -> ExitCode {
        loop {
            let line = match input.read_line(PROMPT) {
                Ok(line) => line,
                Err(err) => {
                    tracing::debug!(%err, "input terminated");
                    return 1;
                }
            };
            if let Flow::Exit(code) = self.eval(&line) {
                return code;
            }
        }
    }

    /// Evaluate one input line.
    ///
    /// Lines containing `|` go to the pipeline executor, everything else to
    /// the single-command dispatcher. Failures are printed here and never
    /// stop the shell.
    ///
    /// Whitespace-only lines are skipped outright: they are neither recorded
    /// in history nor dispatched.
    pub fn eval(&mut self, line: &str) -> Flow {
        if line.trim().is_empty() {
            return Flow::Continue;
        }
        self.history.append(line);

        let result = if line.contains('|') {
            self.run_pipeline(line)
        } else {
            self.dispatch(line)
        };
        let flow = match result {
            Ok(flow) => flow,
            Err(err) => {
                self.report(&err);
                Flow::Continue
            }
        };
        if let Err(err) = self.stdout.flush() {
            tracing::warn!(%err, "failed to flush output");
        }
        flow
    }

    fn dispatch(&mut self, line: &str) -> Result<Flow, ShellError> {
        let Stage { program, args } = Stage::parse(line);

        if program == "history" {
            self.history.replay(&mut *self.stdout)?;
            return Ok(Flow::Continue);
        }

        if let Some(builtin) = self.builtins.lookup(&program) {
            let mut ctx = Context {
                env: &self.env,
                builtins: &self.builtins,
                stdout: &mut *self.stdout,
            };
            return Ok(run_builtin(builtin, &args, &mut ctx)?);
        }

        let Some(path) = find_command_path(&program, &self.env) else {
            return Err(ShellError::CommandNotFound {
                line: line.to_owned(),
            });
        };

        self.stdout.flush()?;
        let status = self
            .launcher
            .run(&path, &args, &self.env)
            .unwrap_or_else(|err| {
                tracing::debug!(program = %path.display(), "{:#}", err);
                StageStatus::NotStarted
            });
        if !status.success() {
            return Err(ShellError::CommandFailed {
                line: line.to_owned(),
                status,
            });
        }
        Ok(Flow::Continue)
    }

    fn run_pipeline(&mut self, line: &str) -> Result<Flow, ShellError> {
        let pipeline = Pipeline::parse(line);
        self.stdout.flush()?;
        let statuses = self.launcher.run_pipeline(&pipeline.stages, &self.env);
        pipeline::check(line, &statuses)?;
        Ok(Flow::Continue)
    }

    fn report(&mut self, err: &ShellError) {
        match err {
            ShellError::CommandFailed { status, .. } => {
                tracing::debug!(?status, "command ran but did not succeed")
            }
            _ => tracing::debug!(?err, "command failed"),
        }
        if let Err(io_err) = writeln!(self.stdout, "{}", err) {
            tracing::warn!(err = %io_err, "failed to write diagnostic");
        }
    }
}

impl Default for Interpreter {
    /// The standard builtins, real processes and in-memory history.
    fn default() -> Self {
        Self::new(
            Builtins::standard(),
            Box::new(SystemLauncher),
            History::in_memory(),
        )
    }
}
