// Validation traits

use crate::{Record, RuleChain, RuleError, RuleFactory, RuleSet, ValidationErrors};

/// Trait for record types that declare their own rules.
///
/// # Examples
///
/// ```
/// use rulechain_validation::{Record, RuleChain, RuleFactory, Validate, Value};
///
/// struct Signup {
///     first: String,
///     zip: String,
/// }
///
/// impl Record for Signup {
///     fn field(&self, name: &str) -> Option<Value> {
///         match name {
///             "first" => Some(Value::from(self.first.as_str())),
///             "zip" => Some(Value::from(self.zip.as_str())),
///             _ => None,
///         }
///     }
/// }
///
/// impl Validate for Signup {
///     fn rules(rule_for: RuleFactory) -> Vec<RuleChain> {
///         vec![
///             rule_for("first").required(),
///             rule_for("zip").when_not_blank().is_numeric().length(5),
///         ]
///     }
/// }
///
/// let signup = Signup { first: "Ann".into(), zip: "1234".into() };
/// assert!(!signup.is_valid().unwrap());
/// assert_eq!(signup.validate().unwrap().messages(), vec!["zip must be 5 characters"]);
/// ```
pub trait Validate: Record + Sized {
    /// Declare the chains for this type
    fn rules(rule_for: RuleFactory) -> Vec<RuleChain>;

    /// Rule set built from [`Validate::rules`]
    fn rule_set() -> RuleSet {
        RuleSet::declare(Self::rules)
    }

    /// Validate the value and return every failure
    fn validate(&self) -> Result<ValidationErrors, RuleError> {
        Self::rule_set().validate(self)
    }

    fn is_valid(&self) -> Result<bool, RuleError> {
        Ok(self.validate()?.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Value;

    struct Account {
        name: Option<String>,
        created: bool,
    }

    impl Record for Account {
        fn field(&self, name: &str) -> Option<Value> {
            match name {
                "name" => self.name.as_deref().map(Value::from),
                _ => None,
            }
        }

        fn is_new(&self) -> bool {
            !self.created
        }
    }

    impl Validate for Account {
        fn rules(rule_for: RuleFactory) -> Vec<RuleChain> {
            vec![rule_for("name").on_create().required()]
        }
    }

    #[test]
    fn test_rules_run_against_self() {
        let fresh = Account {
            name: None,
            created: false,
        };
        assert_eq!(fresh.validate().unwrap().len(), 1);
        assert!(!fresh.is_valid().unwrap());

        let stored = Account {
            name: None,
            created: true,
        };
        assert!(stored.is_valid().unwrap());
    }

    #[test]
    fn test_rule_set_from_rules() {
        assert_eq!(Account::rule_set().len(), 1);
    }
}
