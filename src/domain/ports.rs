use crate::domain::model::{BatchReport, ProductRow};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn input_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn name_column(&self) -> &str;
    fn send_primer(&self) -> bool;
    fn max_rows(&self) -> Option<usize>;
}

/// One chat-style completion call: a system message, a user message and a budget.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    pub max_tokens: u32,
    pub temperature: Option<f32>,
}

/// Remote text generation. Implementations own transport and credentials.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;

    fn model_name(&self) -> &str;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<ProductRow>>;
    async fn transform(&self, rows: Vec<ProductRow>) -> Result<BatchReport>;
    async fn load(&self, report: &BatchReport) -> Result<String>;
}
