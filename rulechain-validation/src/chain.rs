// Rule chain builder

use crate::{Record, RuleError, ValidationError, Value};
use std::fmt;
use std::sync::Arc;
use tracing::trace;

pub(crate) type ConditionFn = Arc<dyn Fn(&dyn Record) -> bool + Send + Sync>;
pub(crate) type CheckFn = Arc<dyn Fn(&Subject<'_>) -> Result<Verdict, RuleError> + Send + Sync>;

/// The field under validation, read once per chain evaluation.
pub(crate) struct Subject<'a> {
    pub(crate) field: &'a str,
    pub(crate) value: Option<&'a Value>,
    pub(crate) record: &'a dyn Record,
}

impl<'a> Subject<'a> {
    /// Present, non-null value, or a precondition fault naming `rule`.
    pub(crate) fn require(&self, rule: &'static str) -> Result<&'a Value, RuleError> {
        match self.value {
            Some(value) if !value.is_null() => Ok(value),
            _ => Err(RuleError::PreconditionViolated {
                field: self.field.to_string(),
                rule,
                expected: "a present, non-null value",
            }),
        }
    }

    /// Value unless absent or null.
    pub(crate) fn defined(&self) -> Option<&'a Value> {
        self.value.filter(|value| !value.is_null())
    }
}

/// Outcome of the un-inverted rule
pub(crate) enum Verdict {
    Pass,
    Fail(String),
}

#[derive(Clone)]
struct Guard {
    test: ConditionFn,
    inverted: bool,
}

impl Guard {
    fn passes(&self, record: &dyn Record) -> bool {
        (self.test)(record) != self.inverted
    }
}

#[derive(Clone)]
struct Rule {
    constraint: &'static str,
    check: CheckFn,
    inverted: bool,
}

impl Rule {
    fn apply(
        &self,
        subject: &Subject<'_>,
        message: Option<&str>,
    ) -> Result<Option<ValidationError>, RuleError> {
        let failure = match ((self.check)(subject)?, self.inverted) {
            (Verdict::Pass, false) | (Verdict::Fail(_), true) => return Ok(None),
            (Verdict::Fail(default), false) => message.map_or(default, str::to_string),
            (Verdict::Pass, true) => message
                .map(str::to_string)
                .unwrap_or_else(|| format!("{} failed validation", subject.field)),
        };

        let constraint = if self.inverted {
            format!("not:{}", self.constraint)
        } else {
            self.constraint.to_string()
        };
        let mut error = ValidationError::new(subject.field, failure).with_constraint(constraint);
        if let Some(value) = subject.value {
            error = error.with_value(value.to_text());
        }
        Ok(Some(error))
    }
}

/// Fluent, per-field chain of guard conditions and validators.
///
/// Every method consumes the chain and returns it, so a chain is declared in
/// one expression and never mutated after it has been handed to a
/// [`RuleSet`](crate::RuleSet).
///
/// # Examples
///
/// ```
/// use rulechain_validation::{rule_for, validate, MapRecord};
///
/// let rules = vec![
///     rule_for("zip").when_not_blank().is_numeric().length(5),
///     rule_for("first").not().equal("admin").message("pick another name"),
/// ];
///
/// let record = MapRecord::new().with("zip", "123").with("first", "admin");
/// let errors = validate(&record, &rules).unwrap();
///
/// assert_eq!(errors.len(), 2);
/// assert_eq!(errors[0].property, "zip");
/// assert_eq!(errors[1].message, "pick another name");
/// ```
#[derive(Clone)]
pub struct RuleChain {
    field: String,
    conditions: Vec<Guard>,
    validators: Vec<Rule>,
    message: Option<String>,
    reads: Vec<String>,
    invert_next: bool,
}

/// Start a chain for `field`
pub fn rule_for(field: impl Into<String>) -> RuleChain {
    RuleChain::rule_for(field)
}

impl RuleChain {
    /// Start a chain for `field`
    pub fn rule_for(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            conditions: Vec::new(),
            validators: Vec::new(),
            message: None,
            reads: Vec::new(),
            invert_next: false,
        }
    }

    /// Field this chain reports failures for
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Override message applied to every failing validator, if set
    pub fn message_override(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn condition_count(&self) -> usize {
        self.conditions.len()
    }

    pub fn validator_count(&self) -> usize {
        self.validators.len()
    }

    /// Primary field followed by every other field the chain reads
    pub fn fields(&self) -> Vec<&str> {
        std::iter::once(self.field.as_str())
            .chain(self.reads.iter().map(String::as_str))
            .collect()
    }

    // ------------------------------------------------------------------
    // Conditions
    // ------------------------------------------------------------------

    /// Only run the validators when `predicate` holds for the record
    pub fn when<F>(self, predicate: F) -> Self
    where
        F: Fn(&dyn Record) -> bool + Send + Sync + 'static,
    {
        self.guard(predicate)
    }

    /// Only run the validators for new records
    pub fn on_create(self) -> Self {
        self.guard(|record: &dyn Record| record.is_new())
    }

    /// Only run the validators for records that have been persisted
    pub fn when_not_new(self) -> Self {
        self.guard(|record: &dyn Record| !record.is_new())
    }

    /// Only run the validators when the field is present and non-empty
    pub fn when_not_blank(self) -> Self {
        let field = self.field.clone();
        self.guard(move |record: &dyn Record| {
            record
                .field(&field)
                .is_some_and(|value| !value.is_null() && value.text_len() > 0)
        })
    }

    // ------------------------------------------------------------------
    // Inversion
    //
    // Arming is single-shot and idempotent: `not().not()` inverts once.
    // ------------------------------------------------------------------

    /// Invert the next condition or validator
    #[allow(clippy::should_implement_trait)]
    pub fn not(mut self) -> Self {
        self.invert_next = true;
        self
    }

    /// Same as [`RuleChain::not`], reads better before a condition
    pub fn when_not(self) -> Self {
        self.not()
    }

    /// Same as [`RuleChain::not`]
    pub fn will_not_be(self) -> Self {
        self.not()
    }

    /// Same as [`RuleChain::not`]
    pub fn dont_run(self) -> Self {
        self.not()
    }

    // ------------------------------------------------------------------
    // Connectives. These never touch builder state.
    // ------------------------------------------------------------------

    #[allow(clippy::should_implement_trait)]
    pub fn and(self) -> Self {
        self
    }

    pub fn also(self) -> Self {
        self
    }

    pub fn it_should(self) -> Self {
        self
    }

    pub fn it_should_be(self) -> Self {
        self
    }

    pub fn it(self) -> Self {
        self
    }

    pub fn it_is(self) -> Self {
        self
    }

    pub fn and_it(self) -> Self {
        self
    }

    // ------------------------------------------------------------------
    // Chain settings
    // ------------------------------------------------------------------

    /// Replace the failure text of every validator in this chain.
    ///
    /// The slot is shared by the whole chain: the last call wins, wherever it
    /// appears relative to the validators.
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Declare another field read by this chain's closures.
    ///
    /// Live validation can subscribe the chain to it as well.
    pub fn depends_on(mut self, field: impl Into<String>) -> Self {
        self.read(field.into());
        self
    }

    // ------------------------------------------------------------------
    // Evaluation
    // ------------------------------------------------------------------

    /// Whether every condition of the chain holds for `record`
    pub fn applies_to(&self, record: &dyn Record) -> bool {
        self.conditions.iter().all(|guard| guard.passes(record))
    }

    /// Evaluate the chain against `record`.
    ///
    /// Returns no errors when a condition does not hold. Otherwise every
    /// validator runs in declaration order and each failure is reported.
    pub fn evaluate(&self, record: &dyn Record) -> Result<Vec<ValidationError>, RuleError> {
        if !self.applies_to(record) {
            trace!(field = %self.field, "conditions not met, chain skipped");
            return Ok(Vec::new());
        }

        let value = record.field(&self.field);
        let subject = Subject {
            field: &self.field,
            value: value.as_ref(),
            record,
        };

        let mut errors = Vec::new();
        for rule in &self.validators {
            if let Some(error) = rule.apply(&subject, self.message.as_deref())? {
                errors.push(error);
            }
        }

        trace!(
            field = %self.field,
            validators = self.validators.len(),
            failures = errors.len(),
            "chain evaluated"
        );
        Ok(errors)
    }

    // ------------------------------------------------------------------
    // Step appenders
    // ------------------------------------------------------------------

    fn guard<F>(mut self, test: F) -> Self
    where
        F: Fn(&dyn Record) -> bool + Send + Sync + 'static,
    {
        let inverted = std::mem::take(&mut self.invert_next);
        self.conditions.push(Guard {
            test: Arc::new(test),
            inverted,
        });
        self
    }

    pub(crate) fn rule<F>(mut self, constraint: &'static str, check: F) -> Self
    where
        F: Fn(&Subject<'_>) -> Result<Verdict, RuleError> + Send + Sync + 'static,
    {
        let inverted = std::mem::take(&mut self.invert_next);
        self.validators.push(Rule {
            constraint,
            check: Arc::new(check),
            inverted,
        });
        self
    }

    pub(crate) fn read(&mut self, field: String) {
        if field != self.field && !self.reads.contains(&field) {
            self.reads.push(field);
        }
    }
}

impl fmt::Debug for RuleChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleChain")
            .field("field", &self.field)
            .field("conditions", &self.conditions.len())
            .field(
                "validators",
                &self
                    .validators
                    .iter()
                    .map(|rule| {
                        if rule.inverted {
                            format!("not:{}", rule.constraint)
                        } else {
                            rule.constraint.to_string()
                        }
                    })
                    .collect::<Vec<_>>(),
            )
            .field("message", &self.message)
            .field("reads", &self.reads)
            .finish()
    }
}
