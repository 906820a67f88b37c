//! Field validation for task payloads

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

const DEFAULT_MIN_NAME_LEN: usize = 3;
const DEFAULT_MAX_NAME_LEN: usize = 255;

/// Field-level validation failures, keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Error)]
#[serde(transparent)]
#[error("{}", self.summary())]
pub struct ValidationErrors {
    fields: BTreeMap<String, String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure for `field`, keeping the first reason reported
    pub fn add(&mut self, field: impl Into<String>, reason: impl Into<String>) {
        self.fields.entry(field.into()).or_insert_with(|| reason.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `field: reason` pairs joined by `; `
    fn summary(&self) -> String {
        self.fields()
            .map(|(field, reason)| format!("{}: {}", field, reason))
            .collect::<Vec<_>>()
            .join("; ")
    }

    fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

/// Validation rules for task payloads
///
/// Built once at startup and shared through application state.
#[derive(Debug, Clone)]
pub struct TaskValidator {
    min_name_len: usize,
    max_name_len: usize,
}

impl Default for TaskValidator {
    fn default() -> Self {
        Self {
            min_name_len: DEFAULT_MIN_NAME_LEN,
            max_name_len: DEFAULT_MAX_NAME_LEN,
        }
    }
}

impl TaskValidator {
    /// Create a validator with custom name length bounds (inclusive)
    pub fn with_name_bounds(min_name_len: usize, max_name_len: usize) -> Self {
        Self {
            min_name_len,
            max_name_len: max_name_len.max(min_name_len),
        }
    }

    /// Check a task name against the length rules
    ///
    /// Length is counted in characters, not bytes.
    pub fn validate_name(&self, name: &str) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let len = name.chars().count();

        if len == 0 {
            errors.add("name", "name is required");
        } else if len < self.min_name_len || len > self.max_name_len {
            errors.add(
                "name",
                format!(
                    "name must be between {} and {} characters",
                    self.min_name_len, self.max_name_len
                ),
            );
        }

        errors.into_result()
    }
}
