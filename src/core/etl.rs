use crate::core::Pipeline;
use crate::domain::model::{CheckReport, CheckRequest, EmailAddress};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

/// Drives one check: validate, run the tool, summarize, then store downloads.
pub struct CheckEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> CheckEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    /// Validates the address before anything is spawned.
    pub fn check(&self, request: &CheckRequest) -> Result<CheckReport> {
        let email = EmailAddress::parse(&request.email)?;
        tracing::info!("🔎 Checking accounts for email: {}", email);

        let run = self.pipeline.extract(&email, request.command.as_deref())?;
        tracing::info!("✅ Completed in {:.2} seconds!", run.elapsed_seconds());
        self.monitor.log_stats("Extract");

        let outcome = self.pipeline.transform(&run);
        match outcome.summary() {
            Some(summary) => tracing::info!("Parsed {} service records", summary.total_found),
            None => tracing::warn!("Tool output could not be parsed as JSON, keeping raw text"),
        }
        self.monitor.log_stats("Transform");

        Ok(CheckReport {
            email,
            run,
            outcome,
            filter: request.filter.clone(),
            checked_at: chrono::Utc::now(),
        })
    }

    /// `check` followed by storing the downloads. Returns the stored names.
    pub fn run(&self, request: &CheckRequest) -> Result<(CheckReport, Vec<String>)> {
        let report = self.check(request)?;

        let stored = self.pipeline.load(&report)?;
        tracing::info!("📁 Stored {} download(s)", stored.len());
        self.monitor.log_stats("Load");
        self.monitor.log_final_stats();

        Ok((report, stored))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{CommandSpec, Outcome, RunResult, ServiceFilter};
    use crate::utils::error::CheckError;
    use std::cell::Cell;
    use std::time::Duration;

    struct StubPipeline {
        stdout: &'static str,
        extracted: Cell<usize>,
        loaded: Cell<usize>,
    }

    impl StubPipeline {
        fn new(stdout: &'static str) -> Self {
            Self {
                stdout,
                extracted: Cell::new(0),
                loaded: Cell::new(0),
            }
        }
    }

    impl Pipeline for StubPipeline {
        fn extract(&self, email: &EmailAddress, command: Option<&str>) -> Result<RunResult> {
            self.extracted.set(self.extracted.get() + 1);
            let spec = CommandSpec::new(command.unwrap_or("holehe"), email.clone());
            assert_eq!(spec.email.as_str(), "user@example.com");
            Ok(RunResult::from_stdout(self.stdout.to_string(), Duration::from_millis(10)))
        }

        fn transform(&self, run: &RunResult) -> Outcome {
            crate::core::summarize::summarize(&run.raw_output)
        }

        fn load(&self, _report: &CheckReport) -> Result<Vec<String>> {
            self.loaded.set(self.loaded.get() + 1);
            Ok(vec!["stored".to_string()])
        }
    }

    #[test]
    fn test_invalid_email_never_reaches_the_tool() {
        let engine = CheckEngine::new(StubPipeline::new("[]"));
        let err = engine.check(&CheckRequest::new("not-an-email")).unwrap_err();

        assert!(matches!(err, CheckError::InvalidEmailFormat { .. }));
        assert_eq!(engine.pipeline().extracted.get(), 0);
    }

    #[test]
    fn test_check_does_not_load() {
        let engine = CheckEngine::new(StubPipeline::new(r#"[{"name":"twitter"}]"#));
        let request = CheckRequest::new("user@example.com").with_filter(ServiceFilter::from("twitter"));

        let report = engine.check(&request).unwrap();
        assert_eq!(report.outcome.summary().unwrap().total_found, 1);
        assert_eq!(report.filter, ServiceFilter::Named("twitter".to_string()));
        assert_eq!(engine.pipeline().loaded.get(), 0);
    }

    #[test]
    fn test_run_loads_after_check() {
        let engine = CheckEngine::new(StubPipeline::new("garbage"));
        let (report, stored) = engine.run(&CheckRequest::new("user@example.com")).unwrap();

        assert_eq!(report.outcome, Outcome::Unparsed);
        assert_eq!(stored, vec!["stored"]);
        assert_eq!(engine.pipeline().loaded.get(), 1);
    }
}
