//! Sequential probe runner

use crate::core::probe::{self, ProbeReport, ProbeSpec};
use crate::core::report::Reporter;
use std::io::{self, Write};

/// Runs probes one after another and renders each result as it arrives
pub struct Runner<W: Write> {
    reporter: Reporter<W>,
}

impl<W: Write> Runner<W> {
    /// Create a runner writing through `reporter`
    pub fn new(reporter: Reporter<W>) -> Self {
        Self { reporter }
    }

    /// Run a single probe.
    ///
    /// Probe failures end up in the report; only errors writing the output
    /// are returned.
    pub async fn run_one(&mut self, spec: ProbeSpec) -> io::Result<ProbeReport> {
        self.reporter.announce(spec.protocol())?;
        let report = probe::execute(spec).await;
        self.reporter.render(&report)?;
        Ok(report)
    }

    /// Run every probe of a plan in order. A failing probe never stops the
    /// ones after it.
    pub async fn run_plan(&mut self, plan: &[ProbeSpec]) -> io::Result<Vec<ProbeReport>> {
        tracing::info!(probes = plan.len(), "running plan");
        let mut reports = Vec::with_capacity(plan.len());
        for spec in plan {
            reports.push(self.run_one(spec.clone()).await?);
        }
        let failed = reports.iter().filter(|r| !r.outcome.is_success()).count();
        tracing::info!(failed, "plan finished");
        Ok(reports)
    }

    /// Take back the reporter
    pub fn into_reporter(self) -> Reporter<W> {
        self.reporter
    }
}
