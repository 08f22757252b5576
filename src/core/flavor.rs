//! Built-in content flavors and the profile every run is driven by.

use crate::core::extractor::{FieldSpec, Trigger};
use crate::core::prompt::PromptBuilder;
use crate::domain::model::ExtractedFields;
use crate::domain::ports::CompletionRequest;
use serde::{Deserialize, Serialize};

pub const DEFAULT_NAME_KEY: &str = "product_name";
pub const PRIMER_MAX_TOKENS: u32 = 150;

const INFOGRAPHIC_ROLE: &str = "Assume the role of an expert content and product description writer with years of experience creating structured, impactful content for skincare products.
You are skilled at writing concise, engaging infographics that highlight key benefits and features in a professional tone.";

const INFOGRAPHIC_PRIMER: &str = "Your task is to create infographic content for skincare products. Each content should include:
- Product Name (title case)
- Infographic Point 1: Main Benefit (short and impactful)
- Infographic Point 2: Key Ingredient(s) and their benefit(s)
- Infographic Point 3: Suitable Skin Types or Conditions
- Infographic Point 4: Recommended Usage or Frequency
- Infographic Point 5: Caution/Note (if any, such as allergy or conflict with other ingredients)
Ensure each point is concise, informative, and relevant for skincare infographics.";

const INFOGRAPHIC_TEMPLATE: &str = "Write structured infographic content for the skincare product '{product_name}' with the following points:
- Product Name:
- Infographic Point 1 (Main Benefit):
- Infographic Point 2 (Key Ingredient(s) and Benefit(s)):
- Infographic Point 3 (Suitable Skin Types/Conditions):
- Infographic Point 4 (Recommended Usage/Frequency):
- Infographic Point 5 (Caution/Note):";

const BLOG_ROLE: &str = "Assume the role of an expert SEO and content writer with extensive knowledge of crafting high-ranking blog articles.
You are skilled in writing engaging, informative, and SEO-optimized content that follows best practices to outrank competitors.
You have a strong understanding of SEO factors, including keyword density, focus keywords, meta tags, schema data, and readability.
You understand how to write content that resonates with readers, encouraging engagement, while also meeting all SEO guidelines.";

const BLOG_PRIMER: &str = "Your task is to write a comprehensive, professional, SEO-ready blog for each skincare product. Each blog should include:
- **Title/Hook**: A compelling title with a focus keyword that is engaging and relatable.
- **Introduction**: Brief introduction that connects with the audience and introduces the product.
- **Key Benefits**: Describe the top benefits, focusing on what makes this product unique.
- **Ingredients & Their Benefits**: Detail important ingredients and their specific skincare benefits.
- **How to Use**: Clear instructions on usage and recommendations.
- **Who Should Use It**: Ideal audience and skin types.
- **Comparison with Competitors**: Mention any unique points that make this product stand out.
- **User Testimonials**: Hypothetical positive feedback that enhances credibility.
- **SEO Elements**:
    - **Focus Keyword**: Choose the main keyword for the product.
    - **Keyword Density**: Maintain appropriate density throughout the blog (1-2%).
    - **Meta Title**: Short and optimized with focus keyword.
    - **Meta Description**: Engaging meta description within 155 characters.
    - **Schema Markup**: JSON-LD format with structured data for better indexing.
- **Conclusion**: Encouraging closing statement that includes a call to action.
Each section should be clearly labeled and written in a professional tone that adheres to SEO best practices. Aim for readability and relatability while maintaining SEO guidelines.";

const BLOG_TEMPLATE: &str = "Write a comprehensive, SEO-ready blog for the skincare product called '{product_name}'. Follow the structure below:
- Title/Hook (with focus keyword)
- Introduction
- Key Benefits
- Ingredients & Their Benefits
- How to Use
- Who Should Use It
- Comparison with Competitors
- Hypothetical User Testimonials
- SEO Elements:
    - Focus Keyword
    - Keyword Density (1-2%)
    - Meta Title
    - Meta Description
    - Schema Markup (JSON-LD format)
- Conclusion with Call to Action
Make sure each section is concise, engaging, and SEO-optimized for maximum search engine ranking.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum ContentFlavor {
    /// Product name plus five short infographic points
    Infographic,
    /// One long SEO blog article per product
    Blog,
}

impl ContentFlavor {
    pub fn profile(self) -> FlavorProfile {
        match self {
            ContentFlavor::Infographic => FlavorProfile::infographic(),
            ContentFlavor::Blog => FlavorProfile::blog(),
        }
    }

    pub fn default_output(self) -> &'static str {
        match self {
            ContentFlavor::Infographic => "output/infographic_content.json",
            ContentFlavor::Blog => "output/product_blogs.json",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ContentFlavor::Infographic => "infographic",
            ContentFlavor::Blog => "blog",
        }
    }
}

impl std::fmt::Display for ContentFlavor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a completion turns into output fields.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseShape {
    /// Pick labelled lines out of the text.
    Fields(FieldSpec),
    /// Store the whole trimmed text under one key.
    Verbatim { key: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlavorProfile {
    pub name: String,
    pub prompts: PromptBuilder,
    pub primer: Option<String>,
    pub max_tokens: u32,
    pub temperature: Option<f32>,
    pub name_key: String,
    pub shape: ResponseShape,
    pub default_output: String,
}

impl FlavorProfile {
    pub fn infographic() -> Self {
        let mut spec = FieldSpec::new().field(DEFAULT_NAME_KEY, vec![Trigger::prefix("product name:")]);
        let points = [
            "main benefit",
            "key ingredient",
            "suitable skin",
            "recommended usage",
            "caution",
        ];
        for (i, keyword) in points.iter().enumerate() {
            let n = i + 1;
            spec = spec.field(
                format!("infographic_point_{}", n),
                vec![
                    Trigger::prefix(format!("infographic point {}", n)),
                    Trigger::contains(keyword),
                ],
            );
        }

        Self {
            name: ContentFlavor::Infographic.to_string(),
            prompts: PromptBuilder::new(INFOGRAPHIC_ROLE, INFOGRAPHIC_TEMPLATE),
            primer: Some(INFOGRAPHIC_PRIMER.to_string()),
            max_tokens: 400,
            temperature: Some(0.7),
            name_key: DEFAULT_NAME_KEY.to_string(),
            shape: ResponseShape::Fields(spec),
            default_output: ContentFlavor::Infographic.default_output().to_string(),
        }
    }

    pub fn blog() -> Self {
        Self {
            name: ContentFlavor::Blog.to_string(),
            prompts: PromptBuilder::new(BLOG_ROLE, BLOG_TEMPLATE),
            primer: Some(BLOG_PRIMER.to_string()),
            max_tokens: 3000,
            temperature: Some(0.7),
            name_key: DEFAULT_NAME_KEY.to_string(),
            shape: ResponseShape::Verbatim {
                key: "blog_content".to_string(),
            },
            default_output: ContentFlavor::Blog.default_output().to_string(),
        }
    }

    /// Output keys in order. The name key always comes first.
    pub fn output_keys(&self) -> Vec<String> {
        let mut keys = vec![self.name_key.clone()];
        match &self.shape {
            ResponseShape::Fields(spec) => keys.extend(spec.keys().map(str::to_string)),
            ResponseShape::Verbatim { key } => keys.push(key.clone()),
        }
        let mut seen = std::collections::HashSet::new();
        keys.retain(|k| seen.insert(k.clone()));
        keys
    }

    pub fn row_request(&self, name: &str) -> CompletionRequest {
        self.prompts.request(name, self.max_tokens, self.temperature)
    }

    pub fn primer_request(&self) -> Option<CompletionRequest> {
        self.primer
            .as_deref()
            .map(|primer| self.prompts.raw_request(primer, PRIMER_MAX_TOKENS))
    }

    /// Turns raw completion text into a full record for the given product name.
    pub fn shape_response(&self, name: &str, text: &str) -> ExtractedFields {
        let mut record = ExtractedFields::with_keys(self.output_keys());
        match &self.shape {
            ResponseShape::Fields(spec) => {
                for (key, value) in spec.extract(text).iter() {
                    record.set(key, value);
                }
            }
            ResponseShape::Verbatim { key } => {
                record.set(key, text.trim());
            }
        }
        record.set(&self.name_key, name);
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infographic_keys() {
        let profile = FlavorProfile::infographic();
        assert_eq!(
            profile.output_keys(),
            vec![
                "product_name",
                "infographic_point_1",
                "infographic_point_2",
                "infographic_point_3",
                "infographic_point_4",
                "infographic_point_5",
            ]
        );
    }

    #[test]
    fn test_blog_keys_and_verbatim_body() {
        let profile = FlavorProfile::blog();
        assert_eq!(profile.output_keys(), vec!["product_name", "blog_content"]);

        let record = profile.shape_response("Clay Mask", "\n# Detox Your Skin\n\nBody text.\n");
        assert_eq!(record.get("product_name"), Some("Clay Mask"));
        assert_eq!(record.get("blog_content"), Some("# Detox Your Skin\n\nBody text."));
    }

    #[test]
    fn test_input_name_overrides_extracted_name() {
        let profile = FlavorProfile::infographic();
        let text = "Product Name: Hydrating Serum (50ml)\nInfographic Point 5 (Caution/Note): Patch test first";
        let record = profile.shape_response("hydrating serum", text);
        assert_eq!(record.get("product_name"), Some("hydrating serum"));
        assert_eq!(record.get("infographic_point_5"), Some("Patch test first"));
    }

    #[test]
    fn test_row_request_uses_flavor_budget() {
        let request = FlavorProfile::blog().row_request("Clay Mask");
        assert_eq!(request.max_tokens, 3000);
        assert_eq!(request.temperature, Some(0.7));
        assert!(request.user.contains("'Clay Mask'"));
        assert!(request.system.starts_with("Assume the role of an expert SEO"));
    }

    #[test]
    fn test_primer_request_has_no_temperature() {
        let request = FlavorProfile::infographic().primer_request().unwrap();
        assert_eq!(request.max_tokens, PRIMER_MAX_TOKENS);
        assert_eq!(request.temperature, None);
        assert!(request.user.starts_with("Your task is to create infographic content"));
    }

    #[test]
    fn test_flavor_deserializes_lowercase() {
        #[derive(Deserialize)]
        struct Wrapper {
            flavor: ContentFlavor,
        }
        let parsed: Wrapper = toml::from_str("flavor = \"blog\"").unwrap();
        assert_eq!(parsed.flavor, ContentFlavor::Blog);
    }
}
