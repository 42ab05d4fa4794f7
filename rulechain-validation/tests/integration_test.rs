//! Integration tests for rulechain-validation

use chrono::{Duration, Local, NaiveDate};
use rulechain_validation::*;

fn person(first: &str) -> MapRecord {
    MapRecord::new().with("first", first)
}

#[test]
fn test_empty_rules_produce_no_errors() {
    assert!(validate(&person(""), &[]).unwrap().is_empty());
}

#[test]
fn test_required() {
    let rules = [rule_for("first").required()];

    let errors = validate(&person(""), &rules).unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].property, "first");

    let errors = validate(&MapRecord::new(), &rules).unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].property, "first");

    assert!(validate(&person("Nathan"), &rules).unwrap().is_empty());
}

#[test]
fn test_equal() {
    let rules = [rule_for("first").equal("Nathan")];
    assert_eq!(validate(&person("Eric"), &rules).unwrap().len(), 1);
    assert!(validate(&person("Nathan"), &rules).unwrap().is_empty());
}

#[test]
fn test_not_only_inverts_next_validator() {
    let rules = [rule_for("first").not().equal("Nathan").length(6)];

    let errors = validate(&person("Nathan"), &rules).unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].constraint, "not:equal");

    // length(6) still runs un-inverted
    let errors = validate(&person("Eric"), &rules).unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].constraint, "length");
}

#[test]
fn test_when_not_blank_guards_chain() {
    let rules = [rule_for("first").when_not_blank().equal("Nathan")];
    assert!(validate(&person(""), &rules).unwrap().is_empty());
    assert!(validate(&MapRecord::new(), &rules).unwrap().is_empty());
    assert_eq!(validate(&person("Eric"), &rules).unwrap().len(), 1);
}

#[test]
fn test_inverted_on_create() {
    let rules = [rule_for("first")
        .when_not()
        .on_create()
        .it_should()
        .equal("Nathan")];

    let persisted = person("");
    assert_eq!(validate(&persisted, &rules).unwrap().len(), 1);

    let fresh = person("").with_new(true);
    assert!(validate(&fresh, &rules).unwrap().is_empty());
}

#[test]
fn test_is_numeric() {
    let rules = [rule_for("count").is_numeric()];
    for accepted in ["1", "1.1", "-2", "1a"] {
        let record = MapRecord::new().with("count", accepted);
        assert!(validate(&record, &rules).unwrap().is_empty(), "{accepted}");
    }
    let record = MapRecord::new().with("count", "abc");
    assert_eq!(validate(&record, &rules).unwrap().len(), 1);
}

#[test]
fn test_email_address() {
    let rules = [rule_for("email").email_address()];
    let bad = MapRecord::new().with("email", "none");
    let good = MapRecord::new().with("email", "test@example.com");
    assert_eq!(validate(&bad, &rules).unwrap().len(), 1);
    assert!(validate(&good, &rules).unwrap().is_empty());

    for host in ["a@b", "user@localhost"] {
        let record = MapRecord::new().with("email", host);
        assert_eq!(validate(&record, &rules).unwrap().len(), 1, "{host}");
    }
    let literal = MapRecord::new().with("email", "user@[192.168.0.1]");
    assert!(validate(&literal, &rules).unwrap().is_empty());
}

#[test]
fn test_date_pairs_match_direct_comparison() {
    let base = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
    let offsets = [-3i64, 0, 3];

    for offset in offsets {
        let start = base + Duration::days(offset);
        let record = MapRecord::new().with("start", start).with("end", base);
        let passes = |chain: RuleChain| validate(&record, &[chain]).unwrap().is_empty();

        assert_eq!(passes(rule_for("start").is_before_date("end")), start < base);
        assert_eq!(passes(rule_for("start").is_after_date("end")), start > base);
        assert_eq!(
            passes(rule_for("start").is_before_or_equal_to_date("end")),
            start <= base
        );
        assert_eq!(
            passes(rule_for("start").is_after_or_equal_to_date("end")),
            start >= base
        );
        assert_eq!(passes(rule_for("start").is_equal_to_date("end")), start == base);
    }
}

#[test]
fn test_date_pairs_skip_absent_side() {
    let only_start = MapRecord::new().with("start", "2024-03-10");
    let only_end = MapRecord::new().with("end", "2024-03-10");
    let rules = [
        rule_for("start").is_before_date("end"),
        rule_for("start").is_after_date("end"),
        rule_for("start").is_equal_to_date("end"),
    ];
    assert!(validate(&only_start, &rules).unwrap().is_empty());
    assert!(validate(&only_end, &rules).unwrap().is_empty());
}

#[test]
fn test_past_and_future_on_strings() {
    let tomorrow = (Local::now().date_naive() + Duration::days(1))
        .format("%Y-%m-%d")
        .to_string();
    let record = MapRecord::new().with("due", tomorrow.as_str());

    assert_eq!(
        validate(&record, &[rule_for("due").is_in_past()]).unwrap().len(),
        1
    );
    assert!(
        validate(&record, &[rule_for("due").is_in_future()])
            .unwrap()
            .is_empty()
    );
}

#[test]
fn test_message_applies_anywhere_in_chain() {
    let before = [rule_for("first")
        .message("custom text")
        .required()
        .min_length(3)];
    let after = [rule_for("first")
        .required()
        .min_length(3)
        .message("custom text")];

    for rules in [before, after] {
        let errors = validate(&person(""), &rules).unwrap();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| e.message == "custom text"));
    }
}

#[test]
fn test_validation_is_repeatable() {
    let rules = RuleSet::declare(|rule_for| {
        vec![
            rule_for("first").required().not().equal("root"),
            rule_for("age").greater_than_or_equal(18),
            rule_for("zip").when_not_blank().length(5),
        ]
    });
    let record = MapRecord::new()
        .with("first", "root")
        .with("age", 12)
        .with("zip", "123");

    let first = rules.validate(&record).unwrap();
    let second = rules.validate(&record).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), 3);
}

#[test]
fn test_precondition_fault() {
    let rules = [rule_for("first").required(), rule_for("zip").max_length(5)];
    match validate(&person("Nathan"), &rules) {
        Err(RuleError::PreconditionViolated { field, rule, .. }) => {
            assert_eq!(field, "zip");
            assert_eq!(rule, "maxLength");
        }
        other => panic!("expected precondition fault, got {:?}", other),
    }
}

#[test]
fn test_cross_field_rules() {
    let rules = RuleSet::declare(|rule_for| {
        vec![
            rule_for("password_confirmation")
                .must(|value: Option<&Value>, record: &dyn Record| {
                    value.cloned() == record.field("password")
                })
                .depends_on("password")
                .message("passwords do not match"),
            rule_for("min").less_than_or_equal(Bound::field("max")),
        ]
    });

    let record = MapRecord::new()
        .with("password", "hunter2")
        .with("password_confirmation", "hunter3")
        .with("min", 5)
        .with("max", 3);

    let errors = rules.validate(&record).unwrap();
    assert_eq!(
        errors.messages(),
        vec!["passwords do not match", "min must be less than or equal to 3"]
    );
    assert_eq!(
        rules.chains()[0].fields(),
        vec!["password_confirmation", "password"]
    );
}

#[test]
fn test_json_records() {
    let rules = RuleSet::declare(|rule_for| {
        vec![
            rule_for("name").on_create().required(),
            rule_for("site").when_not_blank().is_url(),
        ]
    });

    let draft = serde_json::json!({ "name": "", "site": "example", "isNew": true });
    let errors = rules.validate(&draft).unwrap();
    assert_eq!(errors.fields(), vec!["name", "site"]);

    let json = serde_json::to_value(&errors).unwrap();
    assert_eq!(json[1]["constraint"], "isUrl");
    assert_eq!(json[1]["value"], "example");
}

#[test]
fn test_check_returns_invalid() {
    let rules = RuleSet::new().rule(rule_for("first").required());
    let err = rules.check(&MapRecord::new()).unwrap_err();
    assert_eq!(err.to_string(), "validation failed with 1 error(s)");
    assert_eq!(
        err.validation_errors().unwrap().messages(),
        vec!["first is required"]
    );
}
