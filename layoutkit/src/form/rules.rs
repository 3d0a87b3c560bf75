use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::model::FieldSchema;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap_or_else(|e| panic!("email pattern: {e}"))
});

/// A single validation constraint on a field value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "rule", rename_all = "camelCase")]
pub enum ValidationRule {
    Required { message: String },
    Email { message: String },
    MinLength { min: f64, message: String },
    MaxLength { max: f64, message: String },
    Min { min: f64, message: String },
    Max { max: f64, message: String },
}

/// Derive the rules implied by a field's schema.
///
/// `required` adds a non-empty rule; an `email` key in the properties adds an
/// email format rule; numeric `minLength`/`maxLength`/`min`/`max` properties
/// add the matching bounds.
pub fn rules_for(field: &FieldSchema) -> Vec<ValidationRule> {
    let mut rules = Vec::new();
    let label = &field.label;

    if field.required {
        rules.push(ValidationRule::Required {
            message: format!("{label} is required"),
        });
    }

    let Some(props) = &field.properties else {
        return rules;
    };

    if props.contains_key("email") {
        rules.push(ValidationRule::Email {
            message: "Enter a valid email".to_string(),
        });
    }

    if let Some(min) = props.get("minLength").and_then(Value::as_f64) {
        rules.push(ValidationRule::MinLength {
            min,
            message: format!("{label} must be at least {min} characters"),
        });
    }

    if let Some(max) = props.get("maxLength").and_then(Value::as_f64) {
        rules.push(ValidationRule::MaxLength {
            max,
            message: format!("{label} must be at most {max} characters"),
        });
    }

    if let Some(min) = props.get("min").and_then(Value::as_f64) {
        rules.push(ValidationRule::Min {
            min,
            message: format!("{label} must be ≥ {min}"),
        });
    }

    if let Some(max) = props.get("max").and_then(Value::as_f64) {
        rules.push(ValidationRule::Max {
            max,
            message: format!("{label} must be ≤ {max}"),
        });
    }

    rules
}

/// Null, empty strings and empty lists count as no value.
pub fn is_empty_value(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Array(a)) => a.is_empty(),
        Some(_) => false,
    }
}

fn length_of(value: &Value) -> Option<f64> {
    match value {
        Value::String(s) => Some(s.chars().count() as f64),
        Value::Array(a) => Some(a.len() as f64),
        _ => None,
    }
}

impl ValidationRule {
    pub fn message(&self) -> &str {
        match self {
            ValidationRule::Required { message }
            | ValidationRule::Email { message }
            | ValidationRule::MinLength { message, .. }
            | ValidationRule::MaxLength { message, .. }
            | ValidationRule::Min { message, .. }
            | ValidationRule::Max { message, .. } => message,
        }
    }

    /// Check `value` against this rule.
    ///
    /// Only `Required` looks at empty values; every other rule passes when the
    /// value is empty.
    pub fn check(&self, value: Option<&Value>) -> Result<(), &str> {
        if let ValidationRule::Required { message } = self {
            return if is_empty_value(value) { Err(message) } else { Ok(()) };
        }
        let Some(value) = value.filter(|v| !is_empty_value(Some(v))) else {
            return Ok(());
        };

        let ok = match self {
            ValidationRule::Required { .. } => true,
            ValidationRule::Email { .. } => value.as_str().is_some_and(|s| EMAIL.is_match(s)),
            ValidationRule::MinLength { min, .. } => length_of(value).is_some_and(|l| l >= *min),
            ValidationRule::MaxLength { max, .. } => length_of(value).is_some_and(|l| l <= *max),
            ValidationRule::Min { min, .. } => value.as_f64().is_some_and(|n| n >= *min),
            ValidationRule::Max { max, .. } => value.as_f64().is_some_and(|n| n <= *max),
        };
        if ok { Ok(()) } else { Err(self.message()) }
    }
}
