//! Sequential batch over product rows.
//!
//! Each row is one prompt → completion → extraction cycle. A failing row is
//! recorded in the report and dropped from the output; the batch always runs
//! to the end.

use crate::core::flavor::FlavorProfile;
use crate::domain::model::{BatchReport, ExtractedFields, ProductRow, RowFailure};
use crate::domain::ports::CompletionClient;
use crate::utils::error::Result;
use chrono::Utc;

pub struct BatchRunner<'a, C: CompletionClient + ?Sized> {
    client: &'a C,
    profile: &'a FlavorProfile,
}

impl<'a, C: CompletionClient + ?Sized> BatchRunner<'a, C> {
    pub fn new(client: &'a C, profile: &'a FlavorProfile) -> Self {
        Self { client, profile }
    }

    /// Sends the flavor's primer once. The reply is discarded and a failure
    /// only produces a warning.
    pub async fn prime(&self) {
        let Some(request) = self.profile.primer_request() else {
            tracing::debug!("Flavor '{}' has no primer", self.profile.name);
            return;
        };

        match self.client.complete(&request).await {
            Ok(_) => tracing::info!("🧭 Primer sent to {}", self.client.model_name()),
            Err(e) => tracing::warn!("⚠️ Primer request failed, continuing without it: {}", e),
        }
    }

    pub async fn process_row(&self, row: &ProductRow) -> Result<ExtractedFields> {
        let request = self.profile.row_request(&row.name);
        let text = self.client.complete(&request).await?;
        tracing::debug!("Completion for '{}':\n{}", row.name, text);
        Ok(self.profile.shape_response(&row.name, &text))
    }

    pub async fn run(&self, rows: &[ProductRow]) -> BatchReport {
        let started_at = Utc::now();
        let mut records = Vec::with_capacity(rows.len());
        let mut failures = Vec::new();

        tracing::info!(
            "Generating {} content for {} products",
            self.profile.name,
            rows.len()
        );

        for row in rows {
            match self.process_row(row).await {
                Ok(record) => {
                    tracing::info!(
                        "✅ [{}/{}] Generated {} content for {} ({} of {} fields filled)",
                        row.index + 1,
                        rows.len(),
                        self.profile.name,
                        row.name,
                        record.filled(),
                        record.len()
                    );
                    records.push(record);
                }
                Err(e) => {
                    tracing::warn!(
                        "❌ [{}/{}] Failed to generate content for {}: {}",
                        row.index + 1,
                        rows.len(),
                        row.name,
                        e
                    );
                    failures.push(RowFailure {
                        index: row.index,
                        name: row.name.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        BatchReport {
            records,
            failures,
            started_at,
            finished_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::CompletionRequest;
    use crate::utils::error::EtlError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Answers every prompt with a canned reply, failing for names in `fail_on`.
    struct StubClient {
        reply: String,
        fail_on: Vec<String>,
        fail_primer: bool,
        calls: Mutex<Vec<CompletionRequest>>,
    }

    impl StubClient {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                fail_on: Vec::new(),
                fail_primer: false,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing_on(mut self, name: &str) -> Self {
            self.fail_on.push(format!("'{}'", name));
            self
        }

        fn calls(&self) -> Vec<CompletionRequest> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CompletionClient for StubClient {
        async fn complete(&self, request: &CompletionRequest) -> Result<String> {
            self.calls.lock().unwrap().push(request.clone());
            if self.fail_primer && request.temperature.is_none() {
                return Err(EtlError::EmptyCompletion);
            }
            if self.fail_on.iter().any(|n| request.user.contains(n.as_str())) {
                return Err(EtlError::CompletionError {
                    status: 500,
                    message: "server error".to_string(),
                });
            }
            Ok(self.reply.clone())
        }

        fn model_name(&self) -> &str {
            "stub"
        }
    }

    fn rows(names: &[&str]) -> Vec<ProductRow> {
        names
            .iter()
            .enumerate()
            .map(|(i, n)| ProductRow::new(i, *n))
            .collect()
    }

    #[tokio::test]
    async fn test_single_row_matches_expected_record() {
        let client = StubClient::new(
            "Product Name: Hydrating Serum\nInfographic Point 1 (Main Benefit): Deep hydration\n",
        );
        let profile = FlavorProfile::infographic();
        let report = BatchRunner::new(&client, &profile)
            .run(&rows(&["Hydrating Serum"]))
            .await;

        assert!(report.failures.is_empty());
        let json = serde_json::to_value(&report.records).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{
                "product_name": "Hydrating Serum",
                "infographic_point_1": "Deep hydration",
                "infographic_point_2": "",
                "infographic_point_3": "",
                "infographic_point_4": "",
                "infographic_point_5": ""
            }])
        );
    }

    #[tokio::test]
    async fn test_failed_row_is_skipped_and_order_kept() {
        let client = StubClient::new("Product Name: whatever").failing_on("Clay Mask");
        let profile = FlavorProfile::infographic();
        let input = rows(&["Hydrating Serum", "Clay Mask", "Rose Toner", "Night Cream"]);

        let report = BatchRunner::new(&client, &profile).run(&input).await;

        let names: Vec<_> = report
            .records
            .iter()
            .map(|r| r.get("product_name").unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["Hydrating Serum", "Rose Toner", "Night Cream"]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].index, 1);
        assert_eq!(report.failures[0].name, "Clay Mask");
        assert!(report.failures[0].error.contains("500"));
        assert_eq!(report.rows_seen(), 4);
    }

    #[tokio::test]
    async fn test_rows_are_requested_in_input_order() {
        let client = StubClient::new("");
        let profile = FlavorProfile::blog();
        BatchRunner::new(&client, &profile)
            .run(&rows(&["B", "A", "C"]))
            .await;

        let users: Vec<_> = client.calls().into_iter().map(|c| c.user).collect();
        assert_eq!(users.len(), 3);
        assert!(users[0].contains("'B'"));
        assert!(users[1].contains("'A'"));
        assert!(users[2].contains("'C'"));
    }

    #[tokio::test]
    async fn test_every_row_failing_yields_empty_output() {
        let client = StubClient::new("x").failing_on("A").failing_on("B");
        let profile = FlavorProfile::infographic();
        let report = BatchRunner::new(&client, &profile)
            .run(&rows(&["A", "B"]))
            .await;
        assert!(report.records.is_empty());
        assert_eq!(report.failures.len(), 2);
    }

    #[tokio::test]
    async fn test_prime_sends_primer_once() {
        let client = StubClient::new("Understood.");
        let profile = FlavorProfile::infographic();
        BatchRunner::new(&client, &profile).prime().await;

        let calls = client.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].max_tokens, 150);
        assert_eq!(calls[0].user, profile.primer.clone().unwrap());
    }

    #[tokio::test]
    async fn test_primer_failure_does_not_stop_batch() {
        let mut client = StubClient::new("Product Name: ok");
        client.fail_primer = true;
        let profile = FlavorProfile::infographic();
        let runner = BatchRunner::new(&client, &profile);

        runner.prime().await;
        let report = runner.run(&rows(&["Hydrating Serum"])).await;
        assert_eq!(report.records.len(), 1);
    }
}
