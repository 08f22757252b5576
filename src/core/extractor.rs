//! Line-oriented extraction of labelled fields from free-form completion text.
//!
//! A [`FieldSpec`] lists output keys in priority order, each with one or more
//! case-insensitive [`Trigger`]s. Every line of the text is trimmed and checked
//! against the rules in order; the first rule that matches claims the line and
//! receives whatever follows the line's first colon.

use crate::domain::model::ExtractedFields;

/// Line boundaries recognised in completion text. `\r\n` splits into a line
/// and an empty one, which is skipped.
const LINE_BREAKS: [char; 10] = [
    '\n', '\r', '\u{0b}', '\u{0c}', '\u{1c}', '\u{1d}', '\u{1e}', '\u{85}', '\u{2028}', '\u{2029}',
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// Line starts with the pattern.
    Prefix(String),
    /// Line contains the pattern anywhere.
    Contains(String),
}

impl Trigger {
    pub fn prefix(pattern: impl AsRef<str>) -> Self {
        Trigger::Prefix(pattern.as_ref().to_lowercase())
    }

    pub fn contains(pattern: impl AsRef<str>) -> Self {
        Trigger::Contains(pattern.as_ref().to_lowercase())
    }

    /// `lowered` must already be lower-cased.
    fn matches(&self, lowered: &str) -> bool {
        match self {
            Trigger::Prefix(p) => lowered.starts_with(p.as_str()),
            Trigger::Contains(p) => lowered.contains(p.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRule {
    pub key: String,
    pub triggers: Vec<Trigger>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSpec {
    rules: Vec<FieldRule>,
}

impl FieldSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, key: impl Into<String>, triggers: Vec<Trigger>) -> Self {
        self.rules.push(FieldRule {
            key: key.into(),
            triggers,
        });
        self
    }

    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.key.as_str())
    }

    pub fn empty_fields(&self) -> ExtractedFields {
        ExtractedFields::with_keys(self.keys())
    }

    /// First rule, in declaration order, with a trigger matching `lowered`.
    fn claim(&self, lowered: &str) -> Option<&FieldRule> {
        self.rules
            .iter()
            .find(|rule| rule.triggers.iter().any(|t| t.matches(lowered)))
    }

    pub fn extract(&self, text: &str) -> ExtractedFields {
        let mut fields = self.empty_fields();

        for line in text.split(LINE_BREAKS) {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let lowered = line.to_lowercase();
            let Some(rule) = self.claim(&lowered) else {
                continue;
            };

            // A claimed line without a colon carries no value; the field keeps
            // whatever it had and the line is not offered to later rules.
            match line.split_once(':') {
                Some((_, value)) => {
                    fields.set(&rule.key, value.trim());
                }
                None => {
                    tracing::debug!(field = %rule.key, line, "matched line has no ':' delimiter, skipping");
                }
            }
        }

        fields
    }
}

pub fn extract(text: &str, spec: &FieldSpec) -> ExtractedFields {
    spec.extract(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points_spec() -> FieldSpec {
        FieldSpec::new()
            .field("product_name", vec![Trigger::prefix("product name:")])
            .field(
                "infographic_point_1",
                vec![Trigger::prefix("infographic point 1"), Trigger::contains("main benefit")],
            )
            .field(
                "infographic_point_2",
                vec![Trigger::prefix("infographic point 2"), Trigger::contains("key ingredient")],
            )
    }

    #[test]
    fn test_empty_text_yields_every_key_empty() {
        let fields = extract("", &points_spec());
        assert_eq!(fields.len(), 3);
        for key in ["product_name", "infographic_point_1", "infographic_point_2"] {
            assert_eq!(fields.get(key), Some(""));
        }
    }

    #[test]
    fn test_prefix_match_trims_and_keeps_case() {
        let fields = extract("intro line\n   Product Name:   Foo Bar  \n", &points_spec());
        assert_eq!(fields.get("product_name"), Some("Foo Bar"));
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let fields = extract("PRODUCT NAME: Glow Drops", &points_spec());
        assert_eq!(fields.get("product_name"), Some("Glow Drops"));
    }

    #[test]
    fn test_substring_trigger() {
        let text = "- Main Benefit: Brighter skin in a week";
        let fields = extract(text, &points_spec());
        assert_eq!(fields.get("infographic_point_1"), Some("Brighter skin in a week"));
    }

    #[test]
    fn test_splits_on_first_colon_only() {
        let text = "Infographic Point 2 (Key Ingredient(s)): Niacinamide: evens tone";
        let fields = extract(text, &points_spec());
        assert_eq!(fields.get("infographic_point_2"), Some("Niacinamide: evens tone"));
    }

    #[test]
    fn test_line_without_colon_is_skipped() {
        let text = "Infographic Point 1 - no delimiter here\nKey ingredient is niacinamide";
        let fields = extract(text, &points_spec());
        assert_eq!(fields.get("infographic_point_1"), Some(""));
        assert_eq!(fields.get("infographic_point_2"), Some(""));
    }

    #[test]
    fn test_line_without_colon_keeps_earlier_value() {
        let text = "Infographic Point 1: Deep hydration\nInfographic Point 1 pending";
        let fields = extract(text, &points_spec());
        assert_eq!(fields.get("infographic_point_1"), Some("Deep hydration"));
    }

    #[test]
    fn test_earlier_declared_rule_wins() {
        // Prefix of point 2 and substring of point 1 both match this line.
        let text = "Infographic Point 2: the main benefit is hydration";
        let fields = extract(text, &points_spec());
        assert_eq!(fields.get("infographic_point_1"), Some("the main benefit is hydration"));
        assert_eq!(fields.get("infographic_point_2"), Some(""));
    }

    #[test]
    fn test_line_claims_at_most_one_field() {
        let spec = FieldSpec::new()
            .field("first", vec![Trigger::contains("shared")])
            .field("second", vec![Trigger::contains("shared")]);
        let fields = extract("shared: value", &spec);
        assert_eq!(fields.get("first"), Some("value"));
        assert_eq!(fields.get("second"), Some(""));
    }

    #[test]
    fn test_later_line_overwrites_same_field() {
        let text = "Product Name: Draft\nProduct Name: Final";
        let fields = extract(text, &points_spec());
        assert_eq!(fields.get("product_name"), Some("Final"));
    }

    #[test]
    fn test_unmatched_lines_are_ignored() {
        let text = "Here is your content:\n\nThanks!";
        let fields = extract(text, &points_spec());
        assert_eq!(fields.filled(), 0);
    }

    #[test]
    fn test_uppercase_patterns_are_normalized() {
        let spec = FieldSpec::new().field("headline", vec![Trigger::prefix("HEADLINE:")]);
        let fields = extract("headline: Calm skin, fast", &spec);
        assert_eq!(fields.get("headline"), Some("Calm skin, fast"));
    }

    #[test]
    fn test_lone_carriage_returns_and_unicode_separators_split_lines() {
        let text = "Infographic Point 1: Deep hydration\rInfographic Point 2: Plumps skin\u{2028}Product Name: Serum\r\n";
        let fields = extract(text, &points_spec());
        assert_eq!(fields.get("infographic_point_1"), Some("Deep hydration"));
        assert_eq!(fields.get("infographic_point_2"), Some("Plumps skin"));
        assert_eq!(fields.get("product_name"), Some("Serum"));
    }
}
