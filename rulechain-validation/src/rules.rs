// Rule sets and the orchestrator

use crate::{Record, RuleChain, RuleError, ValidationConfig, ValidationError, ValidationErrors};
use tracing::debug;

/// Chain constructor handed to rule declarations
pub type RuleFactory = fn(&str) -> RuleChain;

fn start_chain(field: &str) -> RuleChain {
    RuleChain::rule_for(field)
}

/// Evaluate `chains` against `record` in order.
///
/// Failures are concatenated in chain order, then validator order. Evaluation
/// stops only at a precondition fault, which is returned as `Err`.
pub fn validate(
    record: &dyn Record,
    chains: &[RuleChain],
) -> Result<Vec<ValidationError>, RuleError> {
    let mut errors = Vec::new();
    for chain in chains {
        errors.extend(chain.evaluate(record)?);
    }
    Ok(errors)
}

/// Ordered collection of rule chains; a field may appear in several chains.
///
/// # Examples
///
/// ```
/// use rulechain_validation::{MapRecord, RuleSet};
///
/// let rules = RuleSet::declare(|rule_for| {
///     vec![
///         rule_for("first").required(),
///         rule_for("email").when_not_blank().email_address(),
///     ]
/// });
///
/// let record = MapRecord::new().with("first", "").with("email", "none");
/// let errors = rules.validate(&record).unwrap();
///
/// assert_eq!(errors.fields(), vec!["first", "email"]);
/// assert!(rules.check(&record).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    chains: Vec<RuleChain>,
    config: ValidationConfig,
}

impl RuleSet {
    /// Create an empty rule set
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty rule set with custom config
    pub fn with_config(config: ValidationConfig) -> Self {
        Self {
            chains: Vec::new(),
            config,
        }
    }

    /// Build a rule set from a declaration function
    pub fn declare<F>(declare: F) -> Self
    where
        F: FnOnce(RuleFactory) -> Vec<RuleChain>,
    {
        Self::from(declare(start_chain))
    }

    /// Append a chain
    pub fn rule(mut self, chain: RuleChain) -> Self {
        self.chains.push(chain);
        self
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    pub fn chains(&self) -> &[RuleChain] {
        &self.chains
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Chains declared for `field`, in declaration order
    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a RuleChain> + 'a {
        self.chains.iter().filter(move |chain| chain.field() == field)
    }

    /// Validate `record` against every chain
    pub fn validate(&self, record: &dyn Record) -> Result<ValidationErrors, RuleError> {
        let errors = ValidationErrors::new(validate(record, &self.chains)?);

        if self.config.enable_logging {
            debug!(
                chains = self.chains.len(),
                errors = errors.len(),
                "rule set evaluated"
            );
        }

        Ok(errors)
    }

    /// Like [`RuleSet::validate`], but failures become [`RuleError::Invalid`]
    pub fn check(&self, record: &dyn Record) -> Result<(), RuleError> {
        let errors = self.validate(record)?;
        if errors.is_empty() {
            Ok(())
        } else {
            Err(RuleError::Invalid(errors))
        }
    }
}

impl From<Vec<RuleChain>> for RuleSet {
    fn from(chains: Vec<RuleChain>) -> Self {
        Self {
            chains,
            config: ValidationConfig::default(),
        }
    }
}

impl FromIterator<RuleChain> for RuleSet {
    fn from_iter<I: IntoIterator<Item = RuleChain>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}

impl Extend<RuleChain> for RuleSet {
    fn extend<I: IntoIterator<Item = RuleChain>>(&mut self, iter: I) {
        self.chains.extend(iter);
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a RuleChain;
    type IntoIter = std::slice::Iter<'a, RuleChain>;

    fn into_iter(self) -> Self::IntoIter {
        self.chains.iter()
    }
}
