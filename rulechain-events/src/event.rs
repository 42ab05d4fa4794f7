//! Event definitions and handler traits

use crate::bus::FieldNotifier;
use chrono::{DateTime, Utc};
use rulechain_validation::{Record, RuleError, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Base event metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventMetadata {
    /// Unique event ID
    pub id: Uuid,

    /// Event name/type
    pub name: String,

    /// Timestamp when event was created
    pub timestamp: DateTime<Utc>,

    /// Optional correlation ID, e.g. the edit session that caused the update
    pub correlation_id: Option<Uuid>,

    /// Custom metadata
    pub metadata: serde_json::Value,
}

impl EventMetadata {
    /// Create new event metadata
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            timestamp: Utc::now(),
            correlation_id: None,
            metadata: serde_json::Value::Object(serde_json::Map::new()),
        }
    }

    /// Set correlation ID
    pub fn with_correlation_id(mut self, id: Uuid) -> Self {
        self.correlation_id = Some(id);
        self
    }
}

/// A field of a record was changed by its host.
///
/// Carries the notifier the update arrived on, so handlers can publish
/// without holding a reference to the bus.
#[derive(Clone, Copy)]
pub struct FieldUpdate<'a> {
    pub field: &'a str,
    pub record: &'a dyn Record,
    pub notifier: &'a dyn FieldNotifier,
}

/// Validation errors for one field, published after re-validation.
///
/// An empty `errors` list means the field is valid again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldErrorEvent {
    #[serde(flatten)]
    pub metadata: EventMetadata,

    pub field: String,

    pub errors: Vec<ValidationError>,
}

impl FieldErrorEvent {
    pub const NAME: &'static str = "field_errors";

    pub fn new(field: impl Into<String>, errors: Vec<ValidationError>) -> Self {
        Self {
            metadata: EventMetadata::new(Self::NAME),
            field: field.into(),
            errors,
        }
    }

    /// Whether the event clears previously published errors
    pub fn is_cleared(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn messages(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.message.as_str()).collect()
    }
}

/// Handler for field updates
pub trait UpdateHandler: Send + Sync {
    fn handle(&self, update: &FieldUpdate<'_>) -> Result<(), EventHandlerError>;
}

impl<F> UpdateHandler for F
where
    F: Fn(&FieldUpdate<'_>) -> Result<(), EventHandlerError> + Send + Sync,
{
    fn handle(&self, update: &FieldUpdate<'_>) -> Result<(), EventHandlerError> {
        self(update)
    }
}

/// Handler for published field errors
pub trait ErrorHandler: Send + Sync {
    fn handle(&self, event: &FieldErrorEvent) -> Result<(), EventHandlerError>;
}

impl<F> ErrorHandler for F
where
    F: Fn(&FieldErrorEvent) -> Result<(), EventHandlerError> + Send + Sync,
{
    fn handle(&self, event: &FieldErrorEvent) -> Result<(), EventHandlerError> {
        self(event)
    }
}

/// Event handler error
#[derive(Debug, thiserror::Error)]
pub enum EventHandlerError {
    #[error("Handler failed: {0}")]
    HandlerFailed(String),

    #[error("Re-validation failed: {0}")]
    Validation(#[from] RuleError),

    #[error("Publishing field errors failed: {0}")]
    PublishFailed(String),
}
