// Built-in validators

use crate::chain::{Subject, Verdict};
use crate::{Record, RuleChain, RuleError, Value};
use chrono::Local;
use once_cell::sync::Lazy;
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// Country code and generic top-level domains accepted by `email_address`
const EMAIL_TLDS: &[&str] = &[
    "af|ax|al|dz|as|ad|ao|ai|aq|ag|ar|am|aw|au|at|az|bs|bh|bd|bb|by|be|bz|",
    "bj|bm|bt|bo|ba|bw|bv|br|io|bn|bg|bf|bi|kh|cm|ca|cv|ky|cf|td|cl|cn|cx|",
    "cc|co|km|cg|cd|ck|cr|ci|hr|cu|cy|cz|dk|dj|dm|do|ec|eg|sv|gq|er|ee|et|",
    "fk|fo|fj|fi|fr|gf|pf|tf|ga|gm|ge|de|gh|gi|gr|gl|gd|gp|gu|gt|gg|gn|gw|",
    "gy|ht|hm|va|hn|hk|hu|is|in|id|ir|iq|ie|im|il|it|jm|jp|je|jo|kz|ke|ki|",
    "kp|kr|kw|kg|la|lv|lb|ls|lr|ly|li|lt|lu|mo|mk|mg|mw|my|mv|ml|mt|mh|mq|",
    "mr|mu|yt|mx|fm|md|mc|mn|ms|ma|mz|mm|na|nr|np|nl|an|nc|nz|ni|ne|ng|nu|",
    "nf|mp|no|om|pk|pw|ps|pa|pg|py|pe|ph|pn|pl|pt|pr|qa|re|ro|ru|rw|sh|kn|",
    "lc|pm|vc|ws|sm|st|sa|sn|cs|sc|sl|sg|sk|si|sb|so|za|gs|es|lk|sd|sr|sj|",
    "sz|se|ch|sy|tw|tj|tz|th|tl|tg|tk|to|tt|tn|tr|tm|tc|tv|ug|ua|ae|gb|us|",
    "um|uy|uz|vu|ve|vn|vg|vi|wf|eh|ye|zm|zw|com|edu|gov|int|mil|net|org|",
    "biz|info|name|pro|aero|coop|museum|arpa",
];

/// Dotted host ending in a known top-level domain, or an IPv4 literal with or
/// without brackets
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    let atom = r"[a-z0-9!#$%&'*+\-/=?^_`{|}~]+";
    let label = r"[a-z0-9][a-z0-9\-]{0,61}[a-z0-9]";
    let ipv4 = r"(?:[0-9]{1,3}\.){3}[0-9]{1,3}";
    let tlds = EMAIL_TLDS.concat();
    Regex::new(&format!(
        r"(?i)^{atom}(?:\.{atom})*@(?:(?:{label}\.)+(?:{tlds})|{ipv4}|\[{ipv4}\])$"
    ))
    .unwrap()
});

// Common regex patterns
static URL_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^https?://[^\s/$.?#].[^\s]*$").unwrap());

static UUID_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$").unwrap()
});

static ALPHANUMERIC_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9]+$").unwrap());

// Search patterns: a value passes when any part of its text matches
static ALPHA_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-zA-Z]+").unwrap());

static NUMERIC_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]+").unwrap());

type BoundFn = Arc<dyn Fn(&dyn Record) -> Value + Send + Sync>;

/// Right-hand side of a numeric comparison.
///
/// Computed bounds are coerced with [`Value::parse_int`], so a bound that is
/// not a number compares as 0.
#[derive(Clone)]
pub enum Bound {
    Fixed(f64),
    /// Another field of the same record
    Field(String),
    Computed(BoundFn),
}

impl Bound {
    pub fn field(name: impl Into<String>) -> Self {
        Bound::Field(name.into())
    }

    pub fn computed<F>(compute: F) -> Self
    where
        F: Fn(&dyn Record) -> Value + Send + Sync + 'static,
    {
        Bound::Computed(Arc::new(compute))
    }

    /// Resolve the bound against `record`
    pub fn resolve(&self, record: &dyn Record) -> f64 {
        match self {
            Bound::Fixed(limit) => *limit,
            Bound::Field(name) => record.field(name).map_or(0.0, |value| value.parse_int()),
            Bound::Computed(compute) => compute(record).parse_int(),
        }
    }
}

impl fmt::Debug for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::Fixed(limit) => f.debug_tuple("Fixed").field(limit).finish(),
            Bound::Field(name) => f.debug_tuple("Field").field(name).finish(),
            Bound::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

impl From<f64> for Bound {
    fn from(limit: f64) -> Self {
        Bound::Fixed(limit)
    }
}

impl From<i32> for Bound {
    fn from(limit: i32) -> Self {
        Bound::Fixed(f64::from(limit))
    }
}

impl From<u32> for Bound {
    fn from(limit: u32) -> Self {
        Bound::Fixed(f64::from(limit))
    }
}

impl From<i64> for Bound {
    fn from(limit: i64) -> Self {
        Bound::Fixed(limit as f64)
    }
}

fn verdict(passes: bool, message: impl FnOnce() -> String) -> Verdict {
    if passes {
        Verdict::Pass
    } else {
        Verdict::Fail(message())
    }
}

/// Rules that need a present value report a precondition fault otherwise.
fn text_length(subject: &Subject<'_>, rule: &'static str) -> Result<usize, RuleError> {
    Ok(subject.require(rule)?.text_len())
}

impl RuleChain {
    // ------------------------------------------------------------------
    // Standard validators
    // ------------------------------------------------------------------

    /// Field must be present, non-null and not an empty string
    pub fn required(self) -> Self {
        self.rule("required", |subject| {
            let missing = match subject.value {
                None | Some(Value::Null) => true,
                Some(Value::String(s)) => s.is_empty(),
                Some(_) => false,
            };
            Ok(verdict(!missing, || format!("{} is required", subject.field)))
        })
    }

    /// Strict equality: `"1"` does not equal `1`, and an absent field equals nothing
    pub fn equal(self, expected: impl Into<Value>) -> Self {
        let expected = expected.into();
        self.rule("equal", move |subject| {
            Ok(verdict(subject.value == Some(&expected), || {
                format!("{} must equal {}", subject.field, expected)
            }))
        })
    }

    pub fn not_equal(self, unexpected: impl Into<Value>) -> Self {
        let unexpected = unexpected.into();
        self.rule("notEqual", move |subject| {
            Ok(verdict(subject.value != Some(&unexpected), || {
                format!("{} must not equal {}", subject.field, unexpected)
            }))
        })
    }

    // ------------------------------------------------------------------
    // Length validators
    //
    // These measure the value's text and fault on an absent or null field;
    // guard the chain with `required()` or `when_not_blank()`.
    // ------------------------------------------------------------------

    pub fn length(self, length: usize) -> Self {
        self.rule("length", move |subject| {
            let actual = text_length(subject, "length")?;
            Ok(verdict(actual == length, || {
                format!("{} must be {} characters", subject.field, length)
            }))
        })
    }

    pub fn min_length(self, length: usize) -> Self {
        self.rule("minLength", move |subject| {
            let actual = text_length(subject, "minLength")?;
            Ok(verdict(actual >= length, || {
                format!("{} must be at least {} characters", subject.field, length)
            }))
        })
    }

    pub fn max_length(self, length: usize) -> Self {
        self.rule("maxLength", move |subject| {
            let actual = text_length(subject, "maxLength")?;
            Ok(verdict(actual <= length, || {
                format!("{} must be at most {} characters", subject.field, length)
            }))
        })
    }

    // ------------------------------------------------------------------
    // Numeric validators
    // ------------------------------------------------------------------

    /// Field, read as a number, must be below `bound`.
    ///
    /// A field that does not read as a number never fails a comparison.
    ///
    /// # Examples
    ///
    /// ```
    /// use rulechain_validation::{rule_for, validate, Bound, MapRecord};
    ///
    /// let rules = vec![rule_for("min").less_than(Bound::field("max"))];
    ///
    /// let ok = MapRecord::new().with("min", 1).with("max", "10");
    /// let bad = MapRecord::new().with("min", 12).with("max", "10");
    /// assert!(validate(&ok, &rules).unwrap().is_empty());
    /// assert_eq!(validate(&bad, &rules).unwrap()[0].message, "min must be less than 10");
    /// ```
    pub fn less_than(self, bound: impl Into<Bound>) -> Self {
        self.compare("lessThan", bound.into(), |actual, limit| actual >= limit, "less than")
    }

    pub fn less_than_or_equal(self, bound: impl Into<Bound>) -> Self {
        self.compare(
            "lessThanOrEqual",
            bound.into(),
            |actual, limit| actual > limit,
            "less than or equal to",
        )
    }

    pub fn greater_than(self, bound: impl Into<Bound>) -> Self {
        self.compare(
            "greaterThan",
            bound.into(),
            |actual, limit| actual <= limit,
            "greater than",
        )
    }

    pub fn greater_than_or_equal(self, bound: impl Into<Bound>) -> Self {
        self.compare(
            "greaterThanOrEqual",
            bound.into(),
            |actual, limit| actual < limit,
            "greater than or equal to",
        )
    }

    /// Inclusive range check; skipped when the field is absent or null
    pub fn between(self, min: impl Into<f64>, max: impl Into<f64>) -> Self {
        let (min, max) = (min.into(), max.into());
        self.rule("between", move |subject| {
            let Some(value) = subject.defined() else {
                return Ok(Verdict::Pass);
            };
            let actual = value.to_number();
            Ok(verdict(!(actual < min || actual > max), || {
                format!(
                    "{} is not between {} and {}",
                    subject.field,
                    Value::Number(min),
                    Value::Number(max)
                )
            }))
        })
    }

    fn compare(
        mut self,
        constraint: &'static str,
        bound: Bound,
        fails: fn(f64, f64) -> bool,
        relation: &'static str,
    ) -> Self {
        if let Bound::Field(name) = &bound {
            self.read(name.clone());
        }
        self.rule(constraint, move |subject| {
            let limit = bound.resolve(subject.record);
            let actual = subject.value.map_or(f64::NAN, Value::to_number);
            Ok(verdict(!fails(actual, limit), || {
                format!(
                    "{} must be {} {}",
                    subject.field,
                    relation,
                    Value::Number(limit)
                )
            }))
        })
    }

    // ------------------------------------------------------------------
    // Presence validators
    // ------------------------------------------------------------------

    pub fn not_null(self) -> Self {
        self.rule("notNull", |subject| {
            Ok(verdict(subject.defined().is_some(), || {
                format!("{} must not be null", subject.field)
            }))
        })
    }

    /// Text must not be empty; skipped when the field is absent or null
    pub fn not_empty(self) -> Self {
        self.rule("notEmpty", |subject| {
            let Some(value) = subject.defined() else {
                return Ok(Verdict::Pass);
            };
            Ok(verdict(value.text_len() > 0, || {
                format!("{} must not be blank", subject.field)
            }))
        })
    }

    // ------------------------------------------------------------------
    // Pattern validators
    // ------------------------------------------------------------------

    /// Text must contain a match for `regex`.
    ///
    /// Faults on an absent or null field, like the length rules.
    pub fn matches(self, regex: Regex) -> Self {
        self.rule("matches", move |subject| {
            let text = subject.require("matches")?.to_text();
            Ok(verdict(regex.is_match(&text), || {
                format!("{} does not match required pattern", subject.field)
            }))
        })
    }

    /// Text containing at least one ASCII letter
    pub fn is_alpha(self) -> Self {
        self.pattern("isAlpha", &ALPHA_REGEX, "must contain letters")
    }

    pub fn is_alphanumeric(self) -> Self {
        self.pattern(
            "isAlphanumeric",
            &ALPHANUMERIC_REGEX,
            "must contain only letters and numbers",
        )
    }

    /// Text containing at least one digit, so `"1"`, `"1.1"` and `"-2"` pass
    /// while purely alphabetic text fails
    pub fn is_numeric(self) -> Self {
        self.pattern("isNumeric", &NUMERIC_REGEX, "must be numeric")
    }

    pub fn email_address(self) -> Self {
        self.pattern("isEmail", &EMAIL_REGEX, "must be a valid email")
    }

    pub fn is_url(self) -> Self {
        self.pattern("isUrl", &URL_REGEX, "must be a valid URL")
    }

    pub fn is_uuid(self) -> Self {
        self.pattern("isUuid", &UUID_REGEX, "must be a valid UUID")
    }

    /// Skips absent and null fields
    fn pattern(self, constraint: &'static str, regex: &'static Regex, expectation: &'static str) -> Self {
        self.rule(constraint, move |subject| {
            let Some(value) = subject.defined() else {
                return Ok(Verdict::Pass);
            };
            Ok(verdict(regex.is_match(&value.to_text()), || {
                format!("{} {}", subject.field, expectation)
            }))
        })
    }

    // ------------------------------------------------------------------
    // Predicate validators
    // ------------------------------------------------------------------

    /// Custom predicate over the field value and the whole record.
    ///
    /// # Examples
    ///
    /// ```
    /// use rulechain_validation::{rule_for, validate, MapRecord, Record, Value};
    ///
    /// let rules = vec![rule_for("first")
    ///     .must(|value: Option<&Value>, record: &dyn Record| {
    ///         value.cloned() == record.field("last")
    ///     })
    ///     .depends_on("last")
    ///     .message("first and last names must match")];
    ///
    /// let record = MapRecord::new().with("first", "Ann").with("last", "Palmer");
    /// let errors = validate(&record, &rules).unwrap();
    /// assert_eq!(errors[0].message, "first and last names must match");
    /// ```
    pub fn must<F>(self, predicate: F) -> Self
    where
        F: Fn(Option<&Value>, &dyn Record) -> bool + Send + Sync + 'static,
    {
        self.rule("must", move |subject| {
            Ok(verdict(predicate(subject.value, subject.record), || {
                format!("{} failed validation", subject.field)
            }))
        })
    }

    // ------------------------------------------------------------------
    // Date validators
    //
    // Absent, null or unparseable values are skipped; `is_date()` is the
    // rule that rejects text that is not a date.
    // ------------------------------------------------------------------

    pub fn is_date(self) -> Self {
        self.rule("isDate", |subject| {
            let Some(value) = subject.defined() else {
                return Ok(Verdict::Pass);
            };
            Ok(verdict(value.to_date().is_some(), || {
                format!("{} must be a valid date", subject.field)
            }))
        })
    }

    /// Day of the date must not be after today; today passes
    pub fn is_in_past(self) -> Self {
        self.rule("isInPast", |subject| {
            let Some(date) = subject.defined().and_then(Value::to_date) else {
                return Ok(Verdict::Pass);
            };
            let today = Local::now().date_naive();
            Ok(verdict(date.date() <= today, || {
                format!("{} cannot be in the future", subject.field)
            }))
        })
    }

    /// Day of the date must not be before today; today passes
    pub fn is_in_future(self) -> Self {
        self.rule("isInFuture", |subject| {
            let Some(date) = subject.defined().and_then(Value::to_date) else {
                return Ok(Verdict::Pass);
            };
            let today = Local::now().date_naive();
            Ok(verdict(date.date() >= today, || {
                format!("{} cannot be in the past", subject.field)
            }))
        })
    }

    pub fn is_before_date(self, other: impl Into<String>) -> Self {
        self.date_pair("isBeforeDate", other.into(), |o| o != Ordering::Less, "before")
    }

    pub fn is_after_date(self, other: impl Into<String>) -> Self {
        self.date_pair("isAfterDate", other.into(), |o| o != Ordering::Greater, "after")
    }

    pub fn is_before_or_equal_to_date(self, other: impl Into<String>) -> Self {
        self.date_pair(
            "isBeforeOrEqualToDate",
            other.into(),
            |o| o == Ordering::Greater,
            "on or before",
        )
    }

    pub fn is_after_or_equal_to_date(self, other: impl Into<String>) -> Self {
        self.date_pair(
            "isAfterOrEqualToDate",
            other.into(),
            |o| o == Ordering::Less,
            "on or after",
        )
    }

    pub fn is_equal_to_date(self, other: impl Into<String>) -> Self {
        self.date_pair(
            "isEqualToDate",
            other.into(),
            |o| o != Ordering::Equal,
            "the same date as",
        )
    }

    /// Compares this field's date with field `other` of the same record.
    /// The comparison field is recorded as a read of the chain.
    fn date_pair(
        mut self,
        constraint: &'static str,
        other: String,
        fails: fn(Ordering) -> bool,
        relation: &'static str,
    ) -> Self {
        self.read(other.clone());
        self.rule(constraint, move |subject| {
            let Some(mine) = subject.defined().and_then(Value::to_date) else {
                return Ok(Verdict::Pass);
            };
            let Some(theirs) = subject
                .record
                .field(&other)
                .filter(|value| !value.is_null())
                .and_then(|value| value.to_date())
            else {
                return Ok(Verdict::Pass);
            };
            Ok(verdict(!fails(mine.cmp(&theirs)), || {
                format!("{} must be {} {}", subject.field, relation, other)
            }))
        })
    }
}
