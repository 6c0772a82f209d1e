use crate::command::{ExitCode, Stage};
use crate::env::Environment;
use crate::pipeline;
use anyhow::Result;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};

/// How one external process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    Exited(ExitCode),
    Signaled(i32),
    /// The process was never started, or its status could not be determined.
    NotStarted,
}

impl StageStatus {
    pub fn success(self) -> bool {
        self == StageStatus::Exited(0)
    }
}

impl From<ExitStatus> for StageStatus {
    fn from(status: ExitStatus) -> Self {
        match status.code() {
            Some(code) => StageStatus::Exited(code),
            None => terminated_by_signal(status),
        }
    }
}

#[cfg(unix)]
fn terminated_by_signal(status: ExitStatus) -> StageStatus {
    use std::os::unix::process::ExitStatusExt;
    match status.signal() {
        Some(signal) => StageStatus::Signaled(signal),
        None => StageStatus::NotStarted,
    }
}

#[cfg(not(unix))]
fn terminated_by_signal(_status: ExitStatus) -> StageStatus {
    StageStatus::NotStarted
}

/// Everything the interpreter needs from the operating system's process API.
///
/// The shell itself only ever talks to this trait, so tests can swap in a
/// launcher that records invocations instead of spawning anything.
pub trait Launcher {
    /// Run one already-resolved program to completion.
    ///
    /// Standard input, output and error are inherited from the shell.
    fn run(&mut self, program: &Path, args: &[String], env: &Environment) -> Result<StageStatus>;

    /// Run a pipeline, returning one status per stage in stage order.
    fn run_pipeline(&mut self, stages: &[Stage], env: &Environment) -> Vec<StageStatus>;
}

/// Spawns real child processes.
#[derive(Debug, Default)]
pub struct SystemLauncher;

impl SystemLauncher {
    pub(crate) fn command(program: &Path, args: &[String], env: &Environment) -> Command {
        let mut cmd = Command::new(program);
        cmd.args(args)
            .envs(env.vars.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stderr(Stdio::inherit());
        cmd
    }
}

impl Launcher for SystemLauncher {
    fn run(&mut self, program: &Path, args: &[String], env: &Environment) -> Result<StageStatus> {
        tracing::debug!(program = %program.display(), ?args, "spawning");
        let mut child = Self::command(program, args, env)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .spawn()?;
        let status = StageStatus::from(child.wait()?);
        tracing::debug!(program = %program.display(), ?status, "finished");
        Ok(status)
    }

    fn run_pipeline(&mut self, stages: &[Stage], env: &Environment) -> Vec<StageStatus> {
        pipeline::spawn_and_wait(stages, env)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(unix)]
    fn run_reports_exit_codes() {
        let env = Environment::new();
        let mut launcher = SystemLauncher;
        let sh = Path::new("/bin/sh");

        let ok = launcher.run(sh, &["-c".into(), "exit 0".into()], &env).unwrap();
        assert!(ok.success());

        let failed = launcher.run(sh, &["-c".into(), "exit 3".into()], &env).unwrap();
        assert_eq!(failed, StageStatus::Exited(3));
    }

    #[test]
    #[cfg(unix)]
    fn run_reports_signals() {
        let env = Environment::new();
        let mut launcher = SystemLauncher;
        let status = launcher
            .run(Path::new("/bin/sh"), &["-c".into(), "kill -9 $$".into()], &env)
            .unwrap();
        assert_eq!(status, StageStatus::Signaled(9));
        assert!(!status.success());
    }

    #[test]
    fn run_fails_to_spawn_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        let env = Environment::new();
        assert!(SystemLauncher.run(dir.path(), &[], &env).is_err());
    }
}
