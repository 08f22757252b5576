pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{toml_config::TomlConfig, LocalStorage};

pub use core::{
    client::{LlmSettings, OpenAiClient},
    etl::{EtlEngine, EtlReport},
    extractor::{extract, FieldSpec, Trigger},
    flavor::{ContentFlavor, FlavorProfile},
    pipeline::ContentPipeline,
    runner::BatchRunner,
};
pub use utils::error::{EtlError, Result};
