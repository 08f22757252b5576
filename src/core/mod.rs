pub mod client;
pub mod etl;
pub mod extractor;
pub mod flavor;
pub mod input;
pub mod pipeline;
pub mod prompt;
pub mod runner;

pub use crate::domain::model::{BatchReport, ExtractedFields, ProductRow, RowFailure};
pub use crate::domain::ports::{
    CompletionClient, CompletionRequest, ConfigProvider, Pipeline, Storage,
};
pub use crate::utils::error::Result;
