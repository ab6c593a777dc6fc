use crate::domain::model::{CommandSpec, RunResult};
use crate::domain::ports::CommandRunner;
use crate::utils::error::{CheckError, Result};
use std::io::ErrorKind;
use std::process::{Command, Stdio};
use std::time::Instant;

/// Spawns `<program> <email>` and blocks until it exits.
///
/// No timeout is applied: a tool that never exits blocks the caller.
/// A non-zero exit status is logged but not treated as a failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&self, spec: &CommandSpec) -> Result<RunResult> {
        tracing::debug!("Spawning {} {}", spec.program, spec.email);

        let start = Instant::now();
        let output = Command::new(&spec.program)
            .arg(spec.email.as_str())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => CheckError::ToolNotFound {
                    command: spec.program.clone(),
                },
                _ => CheckError::ExecutionError {
                    command: spec.program.clone(),
                    source: e,
                },
            })?;
        let elapsed = start.elapsed();

        if !output.status.success() {
            tracing::warn!("{} exited with {}", spec.program, output.status);
        }
        if !output.stderr.is_empty() {
            tracing::debug!(
                "{} stderr: {}",
                spec.program,
                String::from_utf8_lossy(&output.stderr).trim_end()
            );
        }

        let stdout = match String::from_utf8(output.stdout) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("{} wrote non UTF-8 output, replacing invalid bytes", spec.program);
                String::from_utf8_lossy(e.as_bytes()).into_owned()
            }
        };

        tracing::debug!("{} finished in {:?} ({} bytes)", spec.program, elapsed, stdout.len());
        Ok(RunResult::from_stdout(stdout, elapsed))
    }
}
