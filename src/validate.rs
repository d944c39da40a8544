//! Payload checks and markup stripping.
//!
//! Checks collect every problem in a payload before failing, so a client
//! sees all missing or malformed fields at once.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::{AppError, AppResult};

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag pattern"));

/// Removes anything that looks like a markup tag and trims the result.
pub fn strip_tags(input: &str) -> String {
    TAG.replace_all(input, "").trim().to_owned()
}

pub trait GetField {
    /// A required, non-empty string field, tag-stripped and trimmed.
    fn text_field(&self, field: &str, errors: &mut Vec<String>) -> Option<String>;

    /// A required string field whose value must be one of `allowed`.
    fn choice_field<'a>(
        &self,
        field: &str,
        allowed: &[&'a str],
        errors: &mut Vec<String>,
    ) -> Option<&'a str>;
}

impl GetField for Value {
    fn text_field(&self, field: &str, errors: &mut Vec<String>) -> Option<String> {
        let raw = match self.get(field) {
            None | Some(Value::Null) => {
                errors.push(format!("\"{field}\" is required"));
                return None;
            }
            Some(Value::String(raw)) => raw,
            Some(_) => {
                errors.push(format!("\"{field}\" must be a string"));
                return None;
            }
        };

        let clean = strip_tags(raw);
        if clean.is_empty() {
            errors.push(format!("\"{field}\" is not allowed to be empty"));
            return None;
        }
        Some(clean)
    }

    fn choice_field<'a>(
        &self,
        field: &str,
        allowed: &[&'a str],
        errors: &mut Vec<String>,
    ) -> Option<&'a str> {
        let raw = match self.get(field) {
            None | Some(Value::Null) => {
                errors.push(format!("\"{field}\" is required"));
                return None;
            }
            Some(Value::String(raw)) => raw,
            Some(_) => {
                errors.push(format!("\"{field}\" must be a string"));
                return None;
            }
        };

        let found = allowed.iter().find(|choice| **choice == raw.as_str()).copied();
        if found.is_none() {
            errors.push(format!("\"{field}\" must be one of [{}]", allowed.join(", ")));
        }
        found
    }
}

/// Rejects anything that is not a JSON object before field checks run.
pub fn require_object(body: &Value) -> AppResult<()> {
    if body.is_object() {
        Ok(())
    } else {
        Err(AppError::invalid("\"value\" must be of type object"))
    }
}
