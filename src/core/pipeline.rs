use crate::core::export::{archive_filename, bundle_archive};
use crate::core::summarize::summarize;
use crate::core::{CheckReport, CommandRunner, ConfigProvider, Pipeline, Storage};
use crate::domain::model::{CommandSpec, EmailAddress, Outcome, RunResult};
use crate::utils::error::Result;

/// Runs holehe (or a stand-in), summarizes its output and stores the downloads.
pub struct HolehePipeline<R: CommandRunner, S: Storage, C: ConfigProvider> {
    runner: R,
    storage: S,
    config: C,
}

impl<R: CommandRunner, S: Storage, C: ConfigProvider> HolehePipeline<R, S, C> {
    pub fn new(runner: R, storage: S, config: C) -> Self {
        Self {
            runner,
            storage,
            config,
        }
    }

    pub fn config(&self) -> &C {
        &self.config
    }
}

impl<R: CommandRunner, S: Storage, C: ConfigProvider> Pipeline for HolehePipeline<R, S, C> {
    fn extract(&self, email: &EmailAddress, command: Option<&str>) -> Result<RunResult> {
        let program = command.unwrap_or_else(|| self.config.command());
        let spec = CommandSpec::new(program, email.clone());
        self.runner.run(&spec)
    }

    fn transform(&self, run: &RunResult) -> Outcome {
        summarize(&run.raw_output)
    }

    fn load(&self, report: &CheckReport) -> Result<Vec<String>> {
        let mut downloads = report.downloads(self.config.formats())?;

        if self.config.archive() {
            let archive = bundle_archive(&downloads, &archive_filename(&report.email))?;
            downloads = vec![archive];
        }

        let mut stored = Vec::with_capacity(downloads.len());
        for download in downloads {
            tracing::debug!(
                "Writing {} ({} bytes, {})",
                download.filename,
                download.bytes.len(),
                download.mime_type
            );
            self.storage.write_file(&download.filename, &download.bytes)?;
            stored.push(download.filename);
        }

        Ok(stored)
    }
}
