//! Field events and live validation for rulechain
//!
//! This crate provides an in-process bus keyed by field name and a hook that
//! re-validates a record whenever one of its fields changes.
//!
//! ## Features
//!
//! - **Field Event Bus** - Subscribe/publish keyed by field name
//! - **Live Validation** - Re-run the chains of a changed field
//! - **Error Events** - One event per field with failures, serializable
//! - **Synchronous** - Handlers run in the caller's thread, in order
//!
//! ## Quick Start
//!
//! ```
//! use rulechain_events::*;
//! use rulechain_validation::{MapRecord, RuleSet};
//! use std::sync::{Arc, Mutex};
//!
//! let bus = FieldEventBus::new();
//! let rules = RuleSet::declare(|rule_for| {
//!     vec![
//!         rule_for("zip").when_not_blank().is_numeric().length(5),
//!         rule_for("first").required(),
//!     ]
//! });
//! LiveValidation::attach(&bus, rules, LiveConfig::new());
//!
//! // Collect every published error event
//! let events = Arc::new(Mutex::new(Vec::new()));
//! let sink = events.clone();
//! bus.on_error(
//!     ALL_FIELDS,
//!     Arc::new(move |event: &FieldErrorEvent| -> Result<(), EventHandlerError> {
//!         sink.lock().unwrap().push(event.clone());
//!         Ok(())
//!     }),
//! );
//!
//! let mut record = MapRecord::new().with("first", "Ann");
//! record.set("zip", "123");
//! bus.field_updated(&record, "zip").unwrap();
//!
//! let events = events.lock().unwrap();
//! assert_eq!(events.len(), 1);
//! assert_eq!(events[0].field, "zip");
//! ```
//!
//! ## Configuration
//!
//! ```
//! use rulechain_events::{EventBusBuilder, LiveConfig, SubscriptionPolicy};
//!
//! let bus = EventBusBuilder::new()
//!     .continue_on_error(true)        // Don't stop on handler errors
//!     .enable_logging(true)           // Log dispatches
//!     .build();
//!
//! let config = LiveConfig::new()
//!     .policy(SubscriptionPolicy::AllReadFields) // Re-run on dependency changes
//!     .publish_cleared(true);                    // Publish empty events when fixed
//! # let _ = (bus, config);
//! ```
//!
//! ## Error Handling
//!
//! ```
//! use rulechain_events::*;
//! use rulechain_validation::{MapRecord, RuleSet};
//!
//! let bus = FieldEventBus::new();
//! let rules = RuleSet::declare(|rule_for| vec![rule_for("zip").length(5)]);
//! LiveValidation::attach(&bus, rules, LiveConfig::new());
//!
//! match bus.field_updated(&MapRecord::new(), "zip") {
//!     Ok(()) => unreachable!("zip is absent"),
//!     Err(EventBusError::HandlersFailed(errors)) => {
//!         assert!(matches!(errors[0], EventHandlerError::Validation(_)));
//!     }
//! }
//! ```

pub mod bus;
pub mod event;
pub mod live;

pub use bus::{ALL_FIELDS, EventBusBuilder, EventBusConfig, EventBusError, FieldEventBus, FieldNotifier};
pub use event::{
    ErrorHandler, EventHandlerError, EventMetadata, FieldErrorEvent, FieldUpdate, UpdateHandler,
};
pub use live::{LiveConfig, LiveValidation, SubscriptionPolicy};
