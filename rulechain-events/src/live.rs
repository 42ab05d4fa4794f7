//! Live re-validation on field updates

use crate::bus::FieldNotifier;
use crate::event::{EventHandlerError, FieldErrorEvent, FieldUpdate, UpdateHandler};
use rulechain_validation::{Record, RuleError, RuleSet, ValidationError};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Which field updates re-run a chain
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SubscriptionPolicy {
    /// A chain re-runs only when its own field changes
    #[default]
    PrimaryField,

    /// A chain also re-runs when any field it reads changes, see
    /// [`RuleChain::fields`](rulechain_validation::RuleChain::fields)
    AllReadFields,
}

/// Live validation configuration
#[derive(Debug, Clone)]
pub struct LiveConfig {
    pub policy: SubscriptionPolicy,

    /// Publish an empty event when a re-run finds no errors for a field
    pub publish_cleared: bool,

    /// Log re-validation results
    pub enable_logging: bool,
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            policy: SubscriptionPolicy::PrimaryField,
            publish_cleared: false,
            enable_logging: true,
        }
    }
}

impl LiveConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn policy(mut self, policy: SubscriptionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn publish_cleared(mut self, enabled: bool) -> Self {
        self.publish_cleared = enabled;
        self
    }

    /// Enable/disable logging
    pub fn enable_logging(mut self, enabled: bool) -> Self {
        self.enable_logging = enabled;
        self
    }
}

/// Rule set attached to a [`FieldNotifier`].
///
/// On an update of a field, the chains subscribed to it are evaluated against
/// the current record and one [`FieldErrorEvent`] is published per chain
/// property with failures.
///
/// # Examples
///
/// ```
/// use rulechain_events::{
///     EventHandlerError, FieldErrorEvent, FieldEventBus, FieldNotifier, LiveConfig,
///     LiveValidation,
/// };
/// use rulechain_validation::{MapRecord, RuleSet};
/// use std::sync::{Arc, Mutex};
///
/// let bus = FieldEventBus::new();
/// let rules = RuleSet::declare(|rule_for| vec![rule_for("first").required()]);
/// LiveValidation::attach(&bus, rules, LiveConfig::new());
///
/// let published = Arc::new(Mutex::new(Vec::<String>::new()));
/// let sink = published.clone();
/// bus.on_error(
///     "first",
///     Arc::new(move |event: &FieldErrorEvent| -> Result<(), EventHandlerError> {
///         sink.lock().unwrap().extend(event.messages().into_iter().map(String::from));
///         Ok(())
///     }),
/// );
///
/// let record = MapRecord::new().with("first", "");
/// bus.field_updated(&record, "first").unwrap();
/// assert_eq!(*published.lock().unwrap(), vec!["first is required"]);
/// ```
#[derive(Clone)]
pub struct LiveValidation {
    rules: Arc<RuleSet>,
    subscriptions: Arc<BTreeMap<String, Vec<usize>>>,
    config: Arc<LiveConfig>,
}

impl LiveValidation {
    /// Subscribe `rules` to updates on `notifier`
    pub fn attach(notifier: &dyn FieldNotifier, rules: RuleSet, config: LiveConfig) -> Self {
        let mut subscriptions: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (index, chain) in rules.chains().iter().enumerate() {
            let fields = match config.policy {
                SubscriptionPolicy::PrimaryField => vec![chain.field()],
                SubscriptionPolicy::AllReadFields => chain.fields(),
            };
            for field in fields {
                subscriptions.entry(field.to_string()).or_default().push(index);
            }
        }

        let live = Self {
            rules: Arc::new(rules),
            subscriptions: Arc::new(subscriptions),
            config: Arc::new(config),
        };

        for field in live.subscriptions.keys() {
            notifier.on_update(
                field,
                Arc::new(Revalidate {
                    live: live.clone(),
                    field: field.clone(),
                }),
            );
        }

        if live.config.enable_logging {
            debug!(
                chains = live.rules.len(),
                fields = live.subscriptions.len(),
                policy = ?live.config.policy,
                "Live validation attached"
            );
        }

        live
    }

    /// Fields with a subscription, sorted
    pub fn fields(&self) -> Vec<&str> {
        self.subscriptions.keys().map(String::as_str).collect()
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn config(&self) -> &LiveConfig {
        &self.config
    }

    /// Evaluate the chains subscribed to `field` and build the events to
    /// publish, in chain order.
    pub fn revalidate(
        &self,
        record: &dyn Record,
        field: &str,
    ) -> Result<Vec<FieldErrorEvent>, RuleError> {
        let Some(indices) = self.subscriptions.get(field) else {
            return Ok(Vec::new());
        };

        // Property order follows the first chain that reports it
        let mut grouped: Vec<(String, Vec<ValidationError>)> = Vec::new();
        for &index in indices {
            let chain = &self.rules.chains()[index];
            let errors = chain.evaluate(record)?;

            let slot = match grouped.iter().position(|(property, _)| property == chain.field()) {
                Some(slot) => slot,
                None => {
                    grouped.push((chain.field().to_string(), Vec::new()));
                    grouped.len() - 1
                }
            };
            grouped[slot].1.extend(errors);
        }

        let events: Vec<FieldErrorEvent> = grouped
            .into_iter()
            .filter(|(_, errors)| self.config.publish_cleared || !errors.is_empty())
            .map(|(property, errors)| FieldErrorEvent::new(property, errors))
            .collect();

        if self.config.enable_logging {
            debug!(
                field,
                chains = indices.len(),
                events = events.len(),
                "Field re-validated"
            );
        }

        Ok(events)
    }
}

/// Update handler registered for one subscribed field
struct Revalidate {
    live: LiveValidation,
    field: String,
}

impl UpdateHandler for Revalidate {
    fn handle(&self, update: &FieldUpdate<'_>) -> Result<(), EventHandlerError> {
        for event in self.live.revalidate(update.record, &self.field)? {
            update
                .notifier
                .publish_errors(event)
                .map_err(|e| EventHandlerError::PublishFailed(e.to_string()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FieldEventBus;
    use rulechain_validation::{MapRecord, rule_for};

    fn rules() -> RuleSet {
        RuleSet::new()
            .rule(rule_for("first").required())
            .rule(rule_for("first").when_not_blank().min_length(3))
            .rule(rule_for("end").is_after_date("start"))
    }

    #[test]
    fn test_primary_field_subscriptions() {
        let bus = FieldEventBus::new();
        let live = LiveValidation::attach(&bus, rules(), LiveConfig::new());

        assert_eq!(live.fields(), vec!["end", "first"]);
        assert_eq!(bus.update_handler_count("first"), 1);
        assert_eq!(bus.update_handler_count("start"), 0);
    }

    #[test]
    fn test_all_read_fields_subscriptions() {
        let bus = FieldEventBus::new();
        let config = LiveConfig::new().policy(SubscriptionPolicy::AllReadFields);
        let live = LiveValidation::attach(&bus, rules(), config);

        assert_eq!(live.fields(), vec!["end", "first", "start"]);
        assert_eq!(bus.update_handler_count("start"), 1);
    }

    #[test]
    fn test_revalidate_groups_by_property() {
        let bus = FieldEventBus::new();
        let live = LiveValidation::attach(&bus, rules(), LiveConfig::new());

        let record = MapRecord::new().with("first", "Al");
        let events = live.revalidate(&record, "first").unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].field, "first");
        assert_eq!(events[0].messages(), vec!["first must be at least 3 characters"]);

        let record = MapRecord::new().with("first", "Alice");
        assert!(live.revalidate(&record, "first").unwrap().is_empty());
        assert!(live.revalidate(&record, "unknown").unwrap().is_empty());
    }

    #[test]
    fn test_publish_cleared() {
        let bus = FieldEventBus::new();
        let live = LiveValidation::attach(
            &bus,
            rules(),
            LiveConfig::new().publish_cleared(true).enable_logging(false),
        );

        let record = MapRecord::new().with("first", "Alice");
        let events = live.revalidate(&record, "first").unwrap();
        assert_eq!(events.len(), 1);
        assert!(events[0].is_cleared());
    }

    #[test]
    fn test_fault_becomes_handler_error() {
        let bus = FieldEventBus::new();
        let rules = RuleSet::new().rule(rule_for("zip").length(5));
        LiveValidation::attach(&bus, rules, LiveConfig::new());

        let err = bus.field_updated(&MapRecord::new(), "zip").unwrap_err();
        assert!(matches!(
            err.handler_errors(),
            [EventHandlerError::Validation(RuleError::PreconditionViolated { .. })]
        ));
    }

    #[test]
    fn test_default_config() {
        let config = LiveConfig::default();
        assert_eq!(config.policy, SubscriptionPolicy::PrimaryField);
        assert!(!config.publish_cleared);
        assert!(config.enable_logging);
    }
}
