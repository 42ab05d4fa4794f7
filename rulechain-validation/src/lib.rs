//! Fluent rule chains for validating records field by field
//!
//! A rule chain is declared once per field before any record exists. It holds
//! guard conditions, validators, a one-shot `not()` modifier and a single
//! message override. The orchestrator binds chains to a record at validate
//! time and returns every failure as data.
//!
//! # Examples
//!
//! ## Declaring rules
//!
//! ```
//! use rulechain_validation::{MapRecord, RuleSet};
//!
//! let rules = RuleSet::declare(|rule_for| {
//!     vec![
//!         rule_for("first").required(),
//!         rule_for("first").when_not_blank().it_should().equal("Nathan"),
//!         rule_for("age").when_not_blank().between(18, 120),
//!     ]
//! });
//!
//! let record = MapRecord::new().with("first", "Eric").with("age", 16);
//! let errors = rules.validate(&record).unwrap();
//!
//! assert_eq!(
//!     errors.messages(),
//!     vec!["first must equal Nathan", "age is not between 18 and 120"]
//! );
//! ```
//!
//! ## Inversion and messages
//!
//! `not()` flips only the next condition or validator. The message override
//! applies to every validator of the chain, wherever it is set.
//!
//! ```
//! use rulechain_validation::{rule_for, validate, MapRecord};
//!
//! let chain = rule_for("first")
//!     .not()
//!     .equal("Nathan")
//!     .length(6)
//!     .message("choose another name");
//!
//! let errors = validate(&MapRecord::new().with("first", "Nathan"), &[chain]).unwrap();
//! assert_eq!(errors.len(), 1);
//! assert_eq!(errors[0].constraint, "not:equal");
//! assert_eq!(errors[0].message, "choose another name");
//! ```
//!
//! ## Preconditions
//!
//! Length and pattern rules need a value. Running them against an absent
//! field is a fault, not a validation failure:
//!
//! ```
//! use rulechain_validation::{rule_for, validate, MapRecord, RuleError};
//!
//! let result = validate(&MapRecord::new(), &[rule_for("zip").length(5)]);
//! assert!(matches!(result, Err(RuleError::PreconditionViolated { .. })));
//!
//! let guarded = validate(&MapRecord::new(), &[rule_for("zip").when_not_blank().length(5)]);
//! assert!(guarded.unwrap().is_empty());
//! ```

mod chain;
mod config;
mod errors;
mod record;
mod rules;
mod traits;
mod validators;
mod value;

pub use chain::{RuleChain, rule_for};
pub use config::ValidationConfig;
pub use errors::*;
pub use record::{MapRecord, Record};
pub use rules::{RuleFactory, RuleSet, validate};
pub use traits::Validate;
pub use validators::Bound;
pub use value::Value;

// Re-exported for `RuleChain::matches`
pub use regex::Regex;
