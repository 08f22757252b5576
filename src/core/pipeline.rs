use crate::core::flavor::FlavorProfile;
use crate::core::input::read_input;
use crate::core::runner::BatchRunner;
use crate::domain::model::{BatchReport, ExtractedFields, ProductRow};
use crate::domain::ports::{CompletionClient, ConfigProvider, Pipeline, Storage};
use crate::utils::error::{EtlError, Result};
use serde::Serialize;

pub struct ContentPipeline<S: Storage, C: CompletionClient, P: ConfigProvider> {
    storage: S,
    client: C,
    config: P,
    profile: FlavorProfile,
}

impl<S: Storage, C: CompletionClient, P: ConfigProvider> ContentPipeline<S, C, P> {
    pub fn new(storage: S, client: C, config: P, profile: FlavorProfile) -> Self {
        Self {
            storage,
            client,
            config,
            profile,
        }
    }

    pub fn profile(&self) -> &FlavorProfile {
        &self.profile
    }
}

/// Pretty JSON array with four-space indentation.
pub fn render_records(records: &[ExtractedFields]) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    records.serialize(&mut serializer)?;
    Ok(buffer)
}

#[async_trait::async_trait]
impl<S: Storage, C: CompletionClient, P: ConfigProvider> Pipeline for ContentPipeline<S, C, P> {
    async fn extract(&self) -> Result<Vec<ProductRow>> {
        let path = self.config.input_path();
        tracing::debug!("Reading product list from: {}", path);

        let data = self
            .storage
            .read_file(path)
            .await
            .map_err(|e| EtlError::InputError {
                path: path.to_string(),
                message: e.to_string(),
            })?;

        let mut rows = read_input(path, &data, self.config.name_column())?;
        if let Some(max_rows) = self.config.max_rows() {
            if rows.len() > max_rows {
                tracing::info!("Limiting run to the first {} of {} rows", max_rows, rows.len());
                rows.truncate(max_rows);
            }
        }

        Ok(rows)
    }

    async fn transform(&self, rows: Vec<ProductRow>) -> Result<BatchReport> {
        let runner = BatchRunner::new(&self.client, &self.profile);
        if self.config.send_primer() {
            runner.prime().await;
        }
        Ok(runner.run(&rows).await)
    }

    async fn load(&self, report: &BatchReport) -> Result<String> {
        let output_path = self.config.output_path();
        let data = render_records(&report.records)?;

        tracing::debug!(
            "Writing {} records ({} bytes) to storage",
            report.records.len(),
            data.len()
        );
        self.storage.write_file(output_path, &data).await?;

        Ok(output_path.to_string())
    }
}
