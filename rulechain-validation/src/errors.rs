// Validation failures and engine faults

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single rule violation reported for one property of a record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Field name the failing chain was declared for
    pub property: String,

    /// Override message of the chain, or the rule's generated default
    pub message: String,

    /// Rule that failed, e.g. `required` or `not:equal`
    pub constraint: String,

    /// String form of the offending value, when the field was present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl ValidationError {
    /// Create a new validation error
    pub fn new(property: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            message: message.into(),
            constraint: "custom".to_string(),
            value: None,
        }
    }

    /// Set the constraint name
    pub fn with_constraint(mut self, constraint: impl Into<String>) -> Self {
        self.constraint = constraint.into();
        self
    }

    /// Set the invalid value
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.property, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Ordered collection of validation errors.
///
/// An empty collection means the record is valid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    pub errors: Vec<ValidationError>,
}

impl ValidationErrors {
    /// Create a new validation errors collection
    pub fn new(errors: Vec<ValidationError>) -> Self {
        Self { errors }
    }

    /// Check if there are any errors
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get the number of errors
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Add an error
    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Append every error of another collection, keeping order
    pub fn extend(&mut self, errors: impl IntoIterator<Item = ValidationError>) {
        self.errors.extend(errors);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.errors.iter()
    }

    /// Get errors for a specific field
    pub fn get_field_errors(&self, field: &str) -> Vec<&ValidationError> {
        self.errors.iter().filter(|e| e.property == field).collect()
    }

    /// Distinct properties with at least one error, in first-seen order
    pub fn fields(&self) -> Vec<&str> {
        let mut fields: Vec<&str> = Vec::new();
        for error in &self.errors {
            if !fields.contains(&error.property.as_str()) {
                fields.push(&error.property);
            }
        }
        fields
    }

    /// Messages only, in order
    pub fn messages(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.message.as_str()).collect()
    }

    pub fn into_inner(self) -> Vec<ValidationError> {
        self.errors
    }

    /// Convert to JSON representation
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "errors": self.errors.iter().map(|e| {
                serde_json::json!({
                    "property": e.property,
                    "message": e.message,
                    "constraint": e.constraint,
                    "value": e.value,
                })
            }).collect::<Vec<_>>()
        })
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for error in &self.errors {
            writeln!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl From<Vec<ValidationError>> for ValidationErrors {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self::new(errors)
    }
}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

/// Faults raised by the engine itself.
///
/// Rule violations are data ([`ValidationError`]); a `RuleError` means either
/// a chain was evaluated outside its declared precondition or a caller asked
/// for a pass/fail answer through [`RuleSet::check`](crate::RuleSet::check).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RuleError {
    /// A value-dependent rule ran against an absent or null field.
    ///
    /// Guard the chain with `required()` or `when_not_blank()` first.
    #[error("precondition violated: `{rule}` on field `{field}` requires {expected}")]
    PreconditionViolated {
        field: String,
        rule: &'static str,
        expected: &'static str,
    },

    #[error("validation failed with {} error(s)", .0.len())]
    Invalid(ValidationErrors),
}

impl RuleError {
    /// Validation errors carried by [`RuleError::Invalid`]
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            RuleError::Invalid(errors) => Some(errors),
            RuleError::PreconditionViolated { .. } => None,
        }
    }
}
