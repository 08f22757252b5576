use crate::core::client::{LlmSettings, DEFAULT_API_BASE, DEFAULT_MODEL};
use crate::core::extractor::{FieldSpec, Trigger};
use crate::core::flavor::{ContentFlavor, FlavorProfile, ResponseShape, DEFAULT_NAME_KEY};
use crate::core::input::INPUT_EXTENSIONS;
use crate::core::prompt::PromptBuilder;
use crate::core::ConfigProvider;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{
    validate_file_extension, validate_non_empty_string, validate_path, validate_positive_number,
    validate_range, validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

const CUSTOM_OUTPUT: &str = "output/content.json";
const CUSTOM_MAX_TOKENS: u32 = 400;
const CUSTOM_TEMPERATURE: f32 = 0.7;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub job: JobConfig,
    pub source: SourceConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub content: ContentConfig,
    #[serde(default)]
    pub load: LoadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub input_path: String,
    pub name_column: Option<String>,
    pub max_rows: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub api_base: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentConfig {
    pub flavor: Option<ContentFlavor>,
    pub send_primer: Option<bool>,
    pub role_prompt: Option<String>,
    pub primer: Option<String>,
    pub template: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    #[serde(default)]
    pub fields: Vec<FieldConfig>,
}

/// One output field. Prefix triggers are tried before substring triggers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldConfig {
    pub key: String,
    #[serde(default)]
    pub prefixes: Vec<String>,
    #[serde(default)]
    pub contains: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: Option<String>,
}

fn env_placeholder() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("placeholder pattern is valid"))
}

impl TomlConfig {
    /// Loads a job file from disk.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the variable's value. Unset variables are left as-is.
    fn substitute_env_vars(content: &str) -> String {
        env_placeholder()
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn is_custom(&self) -> bool {
        self.content.flavor.is_none()
    }

    /// Builds the flavor profile: a built-in flavor with any overrides applied,
    /// or a fully custom one when no flavor is named.
    pub fn profile(&self) -> Result<FlavorProfile> {
        let content = &self.content;

        let mut profile = match content.flavor {
            Some(flavor) => flavor.profile(),
            None => {
                let (Some(role), Some(template)) = (&content.role_prompt, &content.template) else {
                    return Err(EtlError::ConfigValidationError {
                        field: "content".to_string(),
                        message: "either 'flavor' or both 'role_prompt' and 'template' must be set"
                            .to_string(),
                    });
                };
                if content.fields.is_empty() {
                    return Err(EtlError::ConfigValidationError {
                        field: "content.fields".to_string(),
                        message: "custom content needs at least one [[content.fields]] entry"
                            .to_string(),
                    });
                }
                FlavorProfile {
                    name: "custom".to_string(),
                    prompts: PromptBuilder::new(role.as_str(), template.as_str()),
                    primer: None,
                    max_tokens: CUSTOM_MAX_TOKENS,
                    temperature: Some(CUSTOM_TEMPERATURE),
                    name_key: DEFAULT_NAME_KEY.to_string(),
                    shape: ResponseShape::Fields(FieldSpec::new()),
                    default_output: CUSTOM_OUTPUT.to_string(),
                }
            }
        };

        if content.role_prompt.is_some() || content.template.is_some() {
            let role = content
                .role_prompt
                .clone()
                .unwrap_or_else(|| profile.prompts.role_prompt().to_string());
            let template = content
                .template
                .clone()
                .unwrap_or_else(|| profile.prompts.template().to_string());
            profile.prompts = PromptBuilder::new(role, template);
        }
        if let Some(primer) = &content.primer {
            profile.primer = Some(primer.clone());
        }
        if let Some(max_tokens) = content.max_tokens {
            profile.max_tokens = max_tokens;
        }
        if let Some(temperature) = content.temperature {
            profile.temperature = Some(temperature);
        }
        if !content.fields.is_empty() {
            profile.shape = ResponseShape::Fields(self.field_spec());
        }

        Ok(profile)
    }

    fn field_spec(&self) -> FieldSpec {
        self.content
            .fields
            .iter()
            .fold(FieldSpec::new(), |spec, field| {
                let triggers = field
                    .prefixes
                    .iter()
                    .map(Trigger::prefix)
                    .chain(field.contains.iter().map(Trigger::contains))
                    .collect();
                spec.field(field.key.clone(), triggers)
            })
    }

    fn configured_api_key(&self) -> Option<&str> {
        self.llm
            .api_key
            .as_deref()
            .filter(|key| !env_placeholder().is_match(key))
    }

    /// The `llm.api_key` value, falling back to `OPENAI_API_KEY`. A placeholder
    /// that was never substituted counts as missing.
    pub fn llm_settings(&self) -> Result<LlmSettings> {
        let api_key = self
            .configured_api_key()
            .map(str::to_string)
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .ok_or_else(|| EtlError::MissingConfigError {
                field: "llm.api_key".to_string(),
            })?;

        Ok(LlmSettings {
            api_key,
            model: self.llm.model.clone().unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_base: self
                .llm
                .api_base
                .clone()
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            timeout_seconds: self.llm.timeout_seconds,
        })
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_non_empty_string("job.name", &self.job.name)?;
        validate_path("source.input_path", &self.source.input_path)?;
        validate_file_extension("source.input_path", &self.source.input_path, INPUT_EXTENSIONS)?;
        validate_non_empty_string("source.name_column", self.name_column())?;
        validate_path("load.output_path", self.output_path())?;

        if let Some(max_rows) = self.source.max_rows {
            validate_positive_number("source.max_rows", max_rows, 1)?;
        }
        if let Some(api_base) = &self.llm.api_base {
            validate_url("llm.api_base", api_base)?;
        }
        if let Some(timeout) = self.llm.timeout_seconds {
            validate_positive_number("llm.timeout_seconds", timeout as usize, 1)?;
        }
        // Without a key in the file the run may still pick one up from the
        // environment, and dry runs need none at all.
        if self.configured_api_key().is_some() {
            self.llm_settings()?.validate()?;
        }
        if let Some(max_tokens) = self.content.max_tokens {
            validate_positive_number("content.max_tokens", max_tokens as usize, 1)?;
        }
        if let Some(temperature) = self.content.temperature {
            validate_range("content.temperature", temperature, 0.0, 2.0)?;
        }
        for field in &self.content.fields {
            validate_non_empty_string("content.fields.key", &field.key)?;
            if field.prefixes.is_empty() && field.contains.is_empty() {
                return Err(EtlError::ConfigValidationError {
                    field: format!("content.fields.{}", field.key),
                    message: "field needs at least one prefix or contains trigger".to_string(),
                });
            }
        }

        self.profile()?;
        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn input_path(&self) -> &str {
        &self.source.input_path
    }

    fn output_path(&self) -> &str {
        match (&self.load.output_path, self.content.flavor) {
            (Some(path), _) => path.as_str(),
            (None, Some(flavor)) => flavor.default_output(),
            (None, None) => CUSTOM_OUTPUT,
        }
    }

    fn name_column(&self) -> &str {
        self.source.name_column.as_deref().unwrap_or(DEFAULT_NAME_KEY)
    }

    fn send_primer(&self) -> bool {
        self.content.send_primer.unwrap_or(true)
    }

    fn max_rows(&self) -> Option<usize> {
        self.source.max_rows
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
