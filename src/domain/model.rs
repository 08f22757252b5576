use chrono::{DateTime, Utc};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// One product read from the input sheet. `index` is the zero-based data row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRow {
    pub index: usize,
    pub name: String,
}

impl ProductRow {
    pub fn new(index: usize, name: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
        }
    }
}

/// Ordered key → value mapping produced for one row.
///
/// Every declared key is present from construction on; values start empty and
/// are only ever replaced, never removed. Serializes as a JSON object whose keys
/// keep their declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedFields {
    entries: Vec<(String, String)>,
}

impl ExtractedFields {
    pub fn with_keys<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        let mut fields = Self::default();
        for key in keys {
            let key = key.into();
            if fields.get(&key).is_none() {
                fields.entries.push((key, String::new()));
            }
        }
        fields
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Replaces the value of a declared key. Returns false for unknown keys.
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> bool {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, slot)) => {
                *slot = value.into();
                true
            }
            None => false,
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of keys holding a non-empty value.
    pub fn filled(&self) -> usize {
        self.entries.iter().filter(|(_, v)| !v.is_empty()).count()
    }
}

impl Serialize for ExtractedFields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// A row that was dropped from the output because generation failed.
#[derive(Debug, Clone)]
pub struct RowFailure {
    pub index: usize,
    pub name: String,
    pub error: String,
}

#[derive(Debug, Clone)]
pub struct BatchReport {
    pub records: Vec<ExtractedFields>,
    pub failures: Vec<RowFailure>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl BatchReport {
    pub fn rows_seen(&self) -> usize {
        self.records.len() + self.failures.len()
    }

    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_keys_starts_empty_and_keeps_order() {
        let fields = ExtractedFields::with_keys(["product_name", "blog_content"]);
        assert_eq!(fields.keys().collect::<Vec<_>>(), vec!["product_name", "blog_content"]);
        assert_eq!(fields.get("product_name"), Some(""));
        assert_eq!(fields.filled(), 0);
    }

    #[test]
    fn test_set_ignores_undeclared_keys() {
        let mut fields = ExtractedFields::with_keys(["product_name"]);
        assert!(fields.set("product_name", "Night Cream"));
        assert!(!fields.set("price", "12.00"));
        assert_eq!(fields.len(), 1);
        assert_eq!(fields.get("product_name"), Some("Night Cream"));
    }

    #[test]
    fn test_serializes_in_declaration_order() {
        let mut fields = ExtractedFields::with_keys(["zeta", "alpha"]);
        fields.set("alpha", "a");
        let json = serde_json::to_string(&fields).unwrap();
        assert_eq!(json, r#"{"zeta":"","alpha":"a"}"#);
    }
}
