use common::{MediaStore, ResourceType};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{AppError, FieldErrors};

pub const REQUIRED: &str = "This field is required.";
pub const BLANK: &str = "This field may not be blank.";
pub const NULL: &str = "This field may not be null.";

/// Serde helper for PATCH semantics on nullable fields.
///
/// * JSON field absent  => `None`          (don't update)
/// * JSON field = null  => `Some(None)`    (set to NULL)
/// * JSON field = value => `Some(Some(v))` (set to value)
pub fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Some(Option::deserialize(deserializer)?))
}

/// Render a stored media reference for clients.
///
/// Absolute URLs are passed through untouched so a value that already went
/// through the media store is never prefixed a second time. Relative paths
/// are resolved against the store's delivery root; empty values become `None`.
pub fn resolve_media_url(
    stored: &str,
    store: &dyn MediaStore,
    resource_type: ResourceType,
) -> Option<String> {
    let stored = stored.trim();
    if stored.is_empty() {
        None
    } else if stored.starts_with("http") {
        Some(stored.to_string())
    } else {
        Some(store.delivery_url(stored, resource_type))
    }
}

/// Collects per-field validation messages.
#[derive(Default)]
pub struct Validator {
    errors: FieldErrors,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Flag a missing value unless the update is partial.
    pub fn require<T>(&mut self, field: &str, value: &Option<T>, partial: bool) {
        if value.is_none() && !partial {
            self.error(field, REQUIRED);
        }
    }

    /// Validate a non-nullable text value: not blank, at most `max` characters.
    pub fn text(&mut self, field: &str, value: Option<&str>, max: Option<usize>) {
        let Some(value) = value else { return };
        if value.trim().is_empty() {
            self.error(field, BLANK);
        }
        self.max_chars(field, Some(value), max);
    }

    pub fn max_chars(&mut self, field: &str, value: Option<&str>, max: Option<usize>) {
        if let (Some(value), Some(max)) = (value, max)
            && value.chars().count() > max
        {
            self.error(
                field,
                format!("Ensure this field has no more than {max} characters."),
            );
        }
    }

    pub fn finish(self) -> Result<(), AppError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::InvalidFields(self.errors))
        }
    }
}

/// Read an integer sent either natively or as a numeric string (multipart).
pub fn coerce_i64(value: &Value) -> Result<Option<i64>, &'static str> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => n.as_i64().map(Some).ok_or("A valid integer is required."),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| "A valid integer is required."),
        _ => Err("A valid integer is required."),
    }
}

/// Read a JSON document sent either natively or as a JSON-encoded string (multipart).
pub fn coerce_json(value: &Value) -> Result<Value, &'static str> {
    match value {
        Value::String(s) => serde_json::from_str(s).map_err(|_| "Value must be valid JSON."),
        other => Ok(other.clone()),
    }
}

/// Minimal shape check for e-mail addresses.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.trim().split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
}
