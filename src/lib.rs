// Rulechain - fluent per-field validation for records
//
// This library re-exports the rule chain engine and, behind features, the
// field event bus with live re-validation and the logging setup.

// Re-export core functionality
pub use rulechain_validation::*;

// Re-export optional crates
#[cfg(feature = "live")]
pub use rulechain_events;

#[cfg(feature = "logging")]
pub use rulechain_log;

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        Bound,
        MapRecord,
        Record,
        RuleChain,
        RuleError,
        RuleFactory,
        RuleSet,
        Validate,
        ValidationError,
        ValidationErrors,
        Value,
        rule_for,
        validate,
    };

    #[cfg(feature = "live")]
    pub use crate::rulechain_events::{
        ALL_FIELDS,
        FieldErrorEvent,
        FieldEventBus,
        FieldNotifier,
        LiveConfig,
        LiveValidation,
        SubscriptionPolicy,
    };
}
