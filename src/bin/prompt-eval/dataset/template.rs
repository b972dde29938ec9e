use std::borrow::Cow;

use regex::{Captures, Regex};
use serde_json::Value;

use super::error::DatasetError;
use super::rows::Row;

const PLACEHOLDER_PATTERN: &str = r"\{\{([^}]+)\}\}";

/// Placeholder name to dataset column.
pub type PlaceholderMap = Vec<(String, String)>;

/// A prompt template with `{{name}}` placeholders.
#[derive(Debug, Clone)]
pub struct Template {
    text: String,
    pattern: Regex,
}

impl Template {
    pub fn parse(text: impl Into<String>) -> Result<Self, DatasetError> {
        Ok(Self {
            text: text.into(),
            pattern: Regex::new(PLACEHOLDER_PATTERN)?,
        })
    }

    /// Placeholder names in first-seen order, without duplicates.
    pub fn placeholders(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for caps in self.pattern.captures_iter(&self.text) {
            let name = &caps[1];
            if !names.iter().any(|seen| seen == name) {
                names.push(name.to_string());
            }
        }
        names
    }

    /// Maps every placeholder to the column of the same name.
    pub fn identity_mapping(&self) -> PlaceholderMap {
        self.placeholders()
            .into_iter()
            .map(|name| (name.clone(), name))
            .collect()
    }

    /// Substitutes mapped placeholders with the row's values. Placeholders
    /// that are unmapped, or whose column the row lacks, are left untouched;
    /// null values become empty.
    pub fn render(&self, row: &Row, mapping: &PlaceholderMap) -> String {
        self.pattern
            .replace_all(&self.text, |caps: &Captures<'_>| {
                let name = &caps[1];
                mapping
                    .iter()
                    .find(|(placeholder, _)| placeholder == name)
                    .and_then(|(_, column)| row.get(column))
                    .map(|value| render_value(value).into_owned())
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }
}

fn render_value(value: &Value) -> Cow<'_, str> {
    match value {
        Value::Null => Cow::Borrowed(""),
        Value::String(text) => Cow::Borrowed(text.as_str()),
        other => Cow::Owned(other.to_string()),
    }
}
