use crate::domain::ports::CompletionRequest;

/// Placeholder replaced by the row's product name.
pub const NAME_PLACEHOLDER: &str = "{product_name}";

/// Substitutes `name` into every placeholder of `template`. The name is not
/// validated; empty or odd names pass straight through.
pub fn build(name: &str, template: &str) -> String {
    template.replace(NAME_PLACEHOLDER, name)
}

#[derive(Debug, Clone, PartialEq)]
pub struct PromptBuilder {
    role_prompt: String,
    template: String,
}

impl PromptBuilder {
    pub fn new(role_prompt: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            role_prompt: role_prompt.into(),
            template: template.into(),
        }
    }

    pub fn role_prompt(&self) -> &str {
        &self.role_prompt
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn user_message(&self, name: &str) -> String {
        build(name, &self.template)
    }

    pub fn request(&self, name: &str, max_tokens: u32, temperature: Option<f32>) -> CompletionRequest {
        CompletionRequest {
            system: self.role_prompt.clone(),
            user: self.user_message(name),
            max_tokens,
            temperature,
        }
    }

    /// Same system message, arbitrary user text. Used for the primer call.
    pub fn raw_request(&self, user: &str, max_tokens: u32) -> CompletionRequest {
        CompletionRequest {
            system: self.role_prompt.clone(),
            user: user.to_string(),
            max_tokens,
            temperature: None,
        }
    }
}
