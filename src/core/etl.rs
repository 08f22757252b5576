use crate::domain::ports::Pipeline;
use crate::utils::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EtlReport {
    pub output_path: String,
    pub records_written: usize,
    pub rows_failed: usize,
}

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    /// Runs extract → transform → load. Only input, setup or write errors
    /// abort; per-row generation failures are reported in the result.
    pub async fn run(&self) -> Result<EtlReport> {
        tracing::info!("Starting content generation run...");

        tracing::info!("📥 Reading product list...");
        let rows = self.pipeline.extract().await?;
        tracing::info!("Read {} products", rows.len());

        tracing::info!("✍️ Generating content...");
        let report = self.pipeline.transform(rows).await?;
        tracing::info!(
            "Generated {} of {} records in {}s",
            report.records.len(),
            report.rows_seen(),
            report.elapsed().num_seconds()
        );
        for failure in &report.failures {
            tracing::warn!(
                "Skipped row {} ({}): {}",
                failure.index + 1,
                failure.name,
                failure.error
            );
        }

        tracing::info!("💾 Saving results...");
        let output_path = self.pipeline.load(&report).await?;
        tracing::info!("Output saved to: {}", output_path);

        Ok(EtlReport {
            output_path,
            records_written: report.records.len(),
            rows_failed: report.failures.len(),
        })
    }
}
