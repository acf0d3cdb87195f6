use crate::core::coverage::evaluate;
use crate::core::Pipeline;
use crate::domain::model::CoverageReport;
use crate::utils::error::Result;

pub struct CoverageEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> CoverageEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    pub async fn run(&self) -> Result<CoverageReport> {
        tracing::info!("Starting rule coverage check");

        let missing = self.pipeline.preflight().await?;
        if !missing.is_empty() {
            tracing::warn!("Preflight failed, skipping scan ({} problem(s))", missing.len());
            return Ok(CoverageReport::aborted(missing));
        }

        tracing::info!("Collecting rules...");
        let catalog = self.pipeline.collect_rules().await?;
        tracing::info!(
            "Loaded {} rule definitions from {} files",
            catalog.rules.len(),
            catalog.files_scanned
        );

        tracing::info!("Scanning rule samples...");
        let samples = self.pipeline.collect_samples().await?;
        tracing::info!(
            "Found {} sample annotations in {} files",
            samples.annotations.len(),
            samples.files_scanned
        );

        let report = evaluate(catalog, samples, self.pipeline.strict());
        tracing::info!(
            "Covered {}/{} active rules, {} problem(s), {} warning(s)",
            report.covered_rules,
            report.active_rules,
            report.problems.len(),
            report.warnings.len()
        );

        Ok(report)
    }
}
