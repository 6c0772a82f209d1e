//! Direct multi-process pipelines.
//!
//! Every stage is an external program, builtins included: `echo hi | wc`
//! runs the system `echo`. Stage *i*'s standard output feeds stage *i + 1*'s
//! standard input, the first stage reads from the null device, only the last
//! stage writes to the shell's standard output, and every stage shares the
//! shell's standard error.

use std::process::{Child, ChildStdout, Stdio};

use crate::command::Stage;
use crate::env::Environment;
use crate::error::ShellError;
use crate::external::{StageStatus, SystemLauncher};
use crate::resolve::find_command_path;

/// A line split on `|` into stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
    pub stages: Vec<Stage>,
}

impl Pipeline {
    pub fn parse(line: &str) -> Self {
        Self {
            stages: line.trim().split('|').map(Stage::parse).collect(),
        }
    }
}

/// Turn the per-stage statuses into the single diagnostic a pipeline can
/// produce.
///
/// A stage has no usable exit code when it never started or was killed by a
/// signal; either one triggers the diagnostic. Non-zero exit codes of stages
/// that did run are not reported.
pub fn check(line: &str, statuses: &[StageStatus]) -> Result<(), ShellError> {
    let indeterminate = statuses
        .iter()
        .any(|s| matches!(s, StageStatus::NotStarted | StageStatus::Signaled(_)));
    if indeterminate {
        return Err(ShellError::PipelineNotStarted {
            line: line.to_owned(),
        });
    }
    Ok(())
}

/// Start every stage left to right, then wait for each in the same order.
///
/// A stage whose program cannot be resolved or spawned is reported as
/// [`StageStatus::NotStarted`]; the pipe feeding it is closed and the stage
/// after it reads from the null device.
pub(crate) fn spawn_and_wait(stages: &[Stage], env: &Environment) -> Vec<StageStatus> {
    let mut children: Vec<Option<Child>> = Vec::with_capacity(stages.len());
    let mut upstream: Option<ChildStdout> = None;

    for (i, stage) in stages.iter().enumerate() {
        let is_last = i + 1 == stages.len();
        let stdin = match upstream.take() {
            Some(out) => Stdio::from(out),
            None => Stdio::null(),
        };

        let Some(program) = find_command_path(&stage.program, env) else {
            tracing::debug!(stage = i, program = %stage.program, "stage not resolved");
            children.push(None);
            continue;
        };

        let mut cmd = SystemLauncher::command(&program, &stage.args, env);
        cmd.stdin(stdin);
        cmd.stdout(if is_last { Stdio::inherit() } else { Stdio::piped() });

        match cmd.spawn() {
            Ok(mut child) => {
                tracing::debug!(stage = i, program = %program.display(), pid = child.id(), "stage started");
                upstream = child.stdout.take();
                children.push(Some(child));
            }
            Err(err) => {
                tracing::debug!(stage = i, program = %program.display(), %err, "stage failed to spawn");
                children.push(None);
            }
        }
    }

    children
        .into_iter()
        .enumerate()
        .map(|(i, child)| {
            let status = match child {
                Some(mut child) => child
                    .wait()
                    .map(StageStatus::from)
                    .unwrap_or(StageStatus::NotStarted),
                None => StageStatus::NotStarted,
            };
            tracing::debug!(stage = i, ?status, "stage finished");
            status
        })
        .collect()
}
