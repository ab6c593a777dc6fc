use crate::domain::model::{CheckReport, CommandSpec, EmailAddress, ExportFormat, Outcome, RunResult};
use crate::utils::error::Result;

/// Runs the external reconnaissance tool once and waits for it to exit.
pub trait CommandRunner {
    fn run(&self, spec: &CommandSpec) -> Result<RunResult>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn run(&self, spec: &CommandSpec) -> Result<RunResult> {
        (**self).run(spec)
    }
}

pub trait Storage {
    fn write_file(&self, path: &str, data: &[u8]) -> Result<()>;
}

impl<S: Storage + ?Sized> Storage for &S {
    fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        (**self).write_file(path, data)
    }
}

pub trait ConfigProvider {
    fn command(&self) -> &str;
    fn output_path(&self) -> &str;
    fn formats(&self) -> &[ExportFormat];
    fn archive(&self) -> bool;
}

pub trait Pipeline {
    fn extract(&self, email: &EmailAddress, command: Option<&str>) -> Result<RunResult>;
    fn transform(&self, run: &RunResult) -> Outcome;
    fn load(&self, report: &CheckReport) -> Result<Vec<String>>;
}
