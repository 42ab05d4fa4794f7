//! Integration tests for common rulechain workflows.
//!
//! These tests verify that the most common use cases work correctly.

use rulechain::prelude::*;

// =============================================================================
// Host Model
// =============================================================================

/// Signup form as a host would model it
struct Signup {
    first: String,
    email: String,
    zip: Option<String>,
    age: Option<u32>,
    persisted: bool,
}

impl Signup {
    fn draft() -> Self {
        Self {
            first: String::new(),
            email: String::new(),
            zip: None,
            age: None,
            persisted: false,
        }
    }
}

impl Record for Signup {
    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "first" => Some(Value::from(self.first.as_str())),
            "email" => Some(Value::from(self.email.as_str())),
            "zip" => self.zip.as_deref().map(Value::from),
            "age" => self.age.map(Value::from),
            _ => None,
        }
    }

    fn is_new(&self) -> bool {
        !self.persisted
    }
}

impl Validate for Signup {
    fn rules(rule_for: RuleFactory) -> Vec<RuleChain> {
        vec![
            rule_for("first").required().message("Tell us your name"),
            rule_for("email").when_not_blank().email_address(),
            rule_for("email").on_create().required(),
            rule_for("zip").when_not_blank().is_numeric().length(5),
            rule_for("age").when_not_blank().between(18, 120),
        ]
    }
}

// =============================================================================
// Declarative Validation
// =============================================================================

#[test]
fn test_draft_signup_reports_every_field() {
    let signup = Signup::draft();
    let errors = signup.validate().unwrap();

    assert_eq!(errors.fields(), vec!["first", "email"]);
    assert_eq!(errors.get_field_errors("first")[0].message, "Tell us your name");
    assert_eq!(errors.get_field_errors("email")[0].message, "email is required");
}

#[test]
fn test_persisted_signup_skips_create_rules() {
    let signup = Signup {
        first: "Nathan".to_string(),
        persisted: true,
        ..Signup::draft()
    };
    assert!(signup.is_valid().unwrap());
}

#[test]
fn test_optional_fields_validate_when_filled() {
    let signup = Signup {
        first: "Nathan".to_string(),
        email: "nathan@example.com".to_string(),
        zip: Some("abcde".to_string()),
        age: Some(12),
        persisted: false,
    };
    let errors = signup.validate().unwrap();

    let constraints: Vec<&str> = errors.iter().map(|e| e.constraint.as_str()).collect();
    assert_eq!(constraints, vec!["isNumeric", "between"]);
    assert_eq!(errors.to_json()["errors"][0]["value"], "abcde");
}

#[test]
fn test_free_function_and_rule_set_agree() {
    let chains = Signup::rules(|field: &str| RuleChain::rule_for(field));
    let signup = Signup::draft();

    let listed = validate(&signup, &chains).unwrap();
    let collected = RuleSet::from(chains).validate(&signup).unwrap();
    assert_eq!(ValidationErrors::from(listed), collected);
}

#[test]
fn test_check_with_json_payload() {
    let rules = RuleSet::declare(|rule_for| {
        vec![
            rule_for("start").is_date().is_before_date("end"),
            rule_for("seats").greater_than(0).less_than_or_equal(Bound::field("capacity")),
        ]
    });

    let payload = serde_json::json!({
        "start": "2024-05-01",
        "end": "2024-04-01",
        "seats": 12,
        "capacity": "10"
    });

    match rules.check(&payload) {
        Err(RuleError::Invalid(errors)) => {
            assert_eq!(
                errors.messages(),
                vec![
                    "start must be before end",
                    "seats must be less than or equal to 10"
                ]
            );
        }
        other => panic!("expected invalid payload, got {:?}", other),
    }
}

#[test]
fn test_custom_predicates_read_the_record() {
    let rules = RuleSet::new().rule(
        rule_for("ends_at")
            .when(|record: &dyn Record| record.field("all_day") != Some(Value::from(true)))
            .required()
            .is_after_or_equal_to_date("starts_at"),
    );

    let all_day = MapRecord::new().with("all_day", true);
    assert!(rules.validate(&all_day).unwrap().is_empty());

    let timed = MapRecord::new()
        .with("starts_at", "2024-05-01T10:00:00")
        .with("ends_at", "2024-05-01T09:00:00");
    assert_eq!(rules.validate(&timed).unwrap().len(), 1);
}

#[test]
fn test_past_dates() {
    let yesterday = chrono::Local::now().date_naive() - chrono::Duration::days(1);
    let rules = RuleSet::new().rule(rule_for("born").is_date().is_in_past());

    let record = MapRecord::new().with("born", yesterday);
    assert!(rules.validate(&record).unwrap().is_empty());
}

// =============================================================================
// Live Validation
// =============================================================================

#[cfg(feature = "live")]
mod live {
    use super::*;
    use rulechain::rulechain_events::EventHandlerError;
    use std::sync::{Arc, Mutex};

    /// Host that announces every field change on its bus
    struct Form {
        values: MapRecord,
        bus: FieldEventBus,
    }

    impl Form {
        fn set(&mut self, field: &str, value: impl Into<Value>) {
            self.values.set(field, value);
            self.bus.field_updated(&self.values, field).unwrap();
        }
    }

    fn form_with(rules: RuleSet, config: LiveConfig) -> (Form, Arc<Mutex<Vec<FieldErrorEvent>>>) {
        let bus = FieldEventBus::new();
        LiveValidation::attach(&bus, rules, config);

        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        bus.on_error(
            ALL_FIELDS,
            Arc::new(move |event: &FieldErrorEvent| -> Result<(), EventHandlerError> {
                sink.lock().unwrap().push(event.clone());
                Ok(())
            }),
        );

        let form = Form {
            values: MapRecord::new(),
            bus,
        };
        (form, events)
    }

    #[test]
    fn test_typing_into_a_form() {
        let (mut form, events) = form_with(Signup::rule_set(), LiveConfig::new().publish_cleared(true));

        form.set("zip", "12");
        form.set("zip", "12345");

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].messages(), vec!["zip must be 5 characters"]);
        assert!(events[1].is_cleared());
    }

    #[test]
    fn test_dependent_fields_rerun() {
        let rules = RuleSet::declare(|rule_for| {
            vec![rule_for("start").is_before_date("end")]
        });
        let (mut form, events) = form_with(
            rules,
            LiveConfig::new().policy(SubscriptionPolicy::AllReadFields),
        );

        form.set("start", "2024-05-01");
        form.set("end", "2024-04-01");

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].field, "start");
    }
}
