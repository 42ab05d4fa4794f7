//! Field event bus implementation

use crate::event::{ErrorHandler, EventHandlerError, FieldErrorEvent, FieldUpdate, UpdateHandler};
use dashmap::DashMap;
use rulechain_validation::Record;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Error handlers registered under this key receive events for every field
pub const ALL_FIELDS: &str = "*";

/// Subscribe/publish contract of a record host, keyed by field name
pub trait FieldNotifier: Send + Sync {
    /// Subscribe to updates of `field`
    fn on_update(&self, field: &str, handler: Arc<dyn UpdateHandler>);

    /// Subscribe to error events for `field`, or [`ALL_FIELDS`]
    fn on_error(&self, field: &str, handler: Arc<dyn ErrorHandler>);

    /// Deliver a field error event to its subscribers
    fn publish_errors(&self, event: FieldErrorEvent) -> Result<(), EventBusError>;
}

/// In-process bus for field updates and field error events
#[derive(Clone)]
pub struct FieldEventBus {
    /// Update handlers registered for each field
    update_handlers: Arc<DashMap<String, Vec<Arc<dyn UpdateHandler>>>>,

    /// Error handlers registered for each field
    error_handlers: Arc<DashMap<String, Vec<Arc<dyn ErrorHandler>>>>,

    /// Configuration
    config: Arc<EventBusConfig>,
}

/// Event bus configuration
#[derive(Debug, Clone)]
pub struct EventBusConfig {
    /// Continue on handler error
    pub continue_on_error: bool,

    /// Enable event logging
    pub enable_logging: bool,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            continue_on_error: true,
            enable_logging: true,
        }
    }
}

impl FieldEventBus {
    /// Create new event bus
    pub fn new() -> Self {
        Self::with_config(EventBusConfig::default())
    }

    /// Create event bus with custom config
    pub fn with_config(config: EventBusConfig) -> Self {
        Self {
            update_handlers: Arc::new(DashMap::new()),
            error_handlers: Arc::new(DashMap::new()),
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &EventBusConfig {
        &self.config
    }

    /// Announce that the host changed `field` of `record`.
    ///
    /// Every update handler of the field runs synchronously, in subscription
    /// order. A handler that changes the same field again re-enters this
    /// method; avoiding that loop is up to the host.
    ///
    /// # Examples
    ///
    /// ```
    /// use rulechain_events::{EventHandlerError, FieldEventBus, FieldNotifier, FieldUpdate};
    /// use rulechain_validation::MapRecord;
    /// use std::sync::Arc;
    ///
    /// let bus = FieldEventBus::new();
    /// bus.on_update(
    ///     "first",
    ///     Arc::new(|update: &FieldUpdate<'_>| -> Result<(), EventHandlerError> {
    ///         assert_eq!(update.field, "first");
    ///         Ok(())
    ///     }),
    /// );
    ///
    /// let record = MapRecord::new().with("first", "Nathan");
    /// bus.field_updated(&record, "first").unwrap();
    /// ```
    pub fn field_updated(&self, record: &dyn Record, field: &str) -> Result<(), EventBusError> {
        // Clone the list out of the map so handlers may subscribe or publish
        let handlers = match self.update_handlers.get(field) {
            Some(handlers) => handlers.clone(),
            None => {
                if self.config.enable_logging {
                    debug!("No update handlers registered for field: {}", field);
                }
                return Ok(());
            }
        };

        let update = FieldUpdate {
            field,
            record,
            notifier: self,
        };

        let errors = self.dispatch(handlers.iter().map(|handler| handler.handle(&update)));

        if self.config.enable_logging {
            debug!(
                field,
                handlers = handlers.len(),
                failed = errors.len(),
                "Field update dispatched"
            );
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(EventBusError::HandlersFailed(errors))
        }
    }

    /// Run handler results in order, collecting failures
    fn dispatch(
        &self,
        results: impl Iterator<Item = Result<(), EventHandlerError>>,
    ) -> Vec<EventHandlerError> {
        let mut errors = Vec::new();
        for result in results {
            if let Err(e) = result {
                error!("Handler failed: {}", e);
                errors.push(e);
                if !self.config.continue_on_error {
                    break;
                }
            }
        }
        errors
    }

    /// Unsubscribe all handlers for a field
    pub fn unsubscribe(&self, field: &str) {
        self.update_handlers.remove(field);
        self.error_handlers.remove(field);

        if self.config.enable_logging {
            debug!("Unsubscribed all handlers for field: {}", field);
        }
    }

    /// Clear all handlers
    pub fn clear(&self) {
        self.update_handlers.clear();
        self.error_handlers.clear();
        if self.config.enable_logging {
            info!("Cleared all field handlers");
        }
    }

    /// Get update handler count for a field
    pub fn update_handler_count(&self, field: &str) -> usize {
        self.update_handlers.get(field).map(|h| h.len()).unwrap_or(0)
    }

    /// Get error handler count for a field, wildcard handlers excluded
    pub fn error_handler_count(&self, field: &str) -> usize {
        self.error_handlers.get(field).map(|h| h.len()).unwrap_or(0)
    }

    /// Fields with at least one update handler
    pub fn subscribed_fields(&self) -> Vec<String> {
        let mut fields: Vec<String> = self
            .update_handlers
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        fields.sort();
        fields
    }
}

impl FieldNotifier for FieldEventBus {
    fn on_update(&self, field: &str, handler: Arc<dyn UpdateHandler>) {
        self.update_handlers
            .entry(field.to_string())
            .or_default()
            .push(handler);

        if self.config.enable_logging {
            debug!("Subscribed update handler for field: {}", field);
        }
    }

    fn on_error(&self, field: &str, handler: Arc<dyn ErrorHandler>) {
        self.error_handlers
            .entry(field.to_string())
            .or_default()
            .push(handler);

        if self.config.enable_logging {
            debug!("Subscribed error handler for field: {}", field);
        }
    }

    /// Field handlers run first, then [`ALL_FIELDS`] handlers
    fn publish_errors(&self, event: FieldErrorEvent) -> Result<(), EventBusError> {
        let mut handlers = Vec::new();
        for key in [event.field.as_str(), ALL_FIELDS] {
            if let Some(registered) = self.error_handlers.get(key) {
                handlers.extend(registered.iter().cloned());
            }
        }

        if handlers.is_empty() {
            if self.config.enable_logging {
                debug!("No error handlers registered for field: {}", event.field);
            }
            return Ok(());
        }

        if self.config.enable_logging {
            info!(
                "Publishing {} error(s) for field: {} (id: {})",
                event.errors.len(),
                event.field,
                event.metadata.id
            );
        }

        let errors = self.dispatch(handlers.iter().map(|handler| handler.handle(&event)));

        if errors.is_empty() {
            Ok(())
        } else {
            Err(EventBusError::HandlersFailed(errors))
        }
    }
}

impl Default for FieldEventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Event bus errors
#[derive(Debug, thiserror::Error)]
pub enum EventBusError {
    #[error("{} handler(s) failed", .0.len())]
    HandlersFailed(Vec<EventHandlerError>),
}

impl EventBusError {
    /// Handler failures carried by the error
    pub fn handler_errors(&self) -> &[EventHandlerError] {
        match self {
            EventBusError::HandlersFailed(errors) => errors,
        }
    }
}

/// Event bus builder
pub struct EventBusBuilder {
    config: EventBusConfig,
}

impl EventBusBuilder {
    /// Create new event bus builder
    pub fn new() -> Self {
        Self {
            config: EventBusConfig::default(),
        }
    }

    /// Enable/disable continue on error
    pub fn continue_on_error(mut self, enabled: bool) -> Self {
        self.config.continue_on_error = enabled;
        self
    }

    /// Enable/disable logging
    pub fn enable_logging(mut self, enabled: bool) -> Self {
        self.config.enable_logging = enabled;
        self
    }

    /// Build the event bus
    pub fn build(self) -> FieldEventBus {
        FieldEventBus::with_config(self.config)
    }
}

impl Default for EventBusBuilder {
    fn default() -> Self {
        Self::new()
    }
}
