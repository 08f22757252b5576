use crate::core::client::{LlmSettings, DEFAULT_API_BASE, DEFAULT_MODEL};
use crate::core::flavor::{ContentFlavor, DEFAULT_NAME_KEY};
use crate::core::input::INPUT_EXTENSIONS;
use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_file_extension, validate_non_empty_string, validate_path,
    validate_positive_number, validate_required_field, validate_url, Validate,
};
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "product-content-etl")]
#[command(about = "Generate product marketing copy from a product list with an LLM")]
pub struct CliConfig {
    /// Kind of content to generate
    #[arg(long, value_enum, default_value_t = ContentFlavor::Infographic)]
    pub flavor: ContentFlavor,

    /// Product sheet: Excel/OpenDocument workbook or CSV
    #[arg(long, default_value = "data/products.xlsx")]
    pub input: String,

    /// Output JSON file (defaults to the flavor's file under output/)
    #[arg(long)]
    pub output: Option<String>,

    /// Header of the column holding product names
    #[arg(long, default_value = DEFAULT_NAME_KEY)]
    pub name_column: String,

    #[arg(long, default_value = DEFAULT_MODEL)]
    pub model: String,

    #[arg(long, default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(long)]
    pub timeout_seconds: Option<u64>,

    /// Only process the first N products
    #[arg(long)]
    pub max_rows: Option<usize>,

    /// Skip the context-setting primer request
    #[arg(long)]
    pub no_primer: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliConfig {
    pub fn llm_settings(&self) -> Result<LlmSettings> {
        let api_key = validate_required_field("api_key", &self.api_key)?;
        Ok(LlmSettings {
            api_key: api_key.clone(),
            model: self.model.clone(),
            api_base: self.api_base.clone(),
            timeout_seconds: self.timeout_seconds,
        })
    }
}

impl ConfigProvider for CliConfig {
    fn input_path(&self) -> &str {
        &self.input
    }

    fn output_path(&self) -> &str {
        self.output
            .as_deref()
            .unwrap_or_else(|| self.flavor.default_output())
    }

    fn name_column(&self) -> &str {
        &self.name_column
    }

    fn send_primer(&self) -> bool {
        !self.no_primer
    }

    fn max_rows(&self) -> Option<usize> {
        self.max_rows
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("input", &self.input)?;
        validate_file_extension("input", &self.input, INPUT_EXTENSIONS)?;
        validate_path("output", self.output_path())?;
        validate_non_empty_string("name_column", &self.name_column)?;
        validate_url("api_base", &self.api_base)?;
        if let Some(max_rows) = self.max_rows {
            validate_positive_number("max_rows", max_rows, 1)?;
        }
        if let Some(timeout) = self.timeout_seconds {
            validate_positive_number("timeout_seconds", timeout as usize, 1)?;
        }
        self.llm_settings()?.validate()
    }
}
