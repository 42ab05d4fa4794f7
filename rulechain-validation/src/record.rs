// Record contract consumed by rule chains

use crate::Value;
use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

/// Read access to a host record.
///
/// The engine only ever reads through this trait. `field` returns `None`
/// for absent fields; a field explicitly set to null is `Some(Value::Null)`.
pub trait Record {
    /// Read a named field
    fn field(&self, name: &str) -> Option<Value>;

    /// Whether the record has not been persisted yet
    fn is_new(&self) -> bool {
        false
    }
}

/// Map-backed record for callers without their own host model.
///
/// # Examples
///
/// ```
/// use rulechain_validation::{MapRecord, Record, Value};
///
/// let record = MapRecord::new().with("first", "Nathan").with_new(true);
/// assert_eq!(record.field("first"), Some(Value::from("Nathan")));
/// assert_eq!(record.field("last"), None);
/// assert!(record.is_new());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapRecord {
    fields: HashMap<String, Value>,
    new_record: bool,
}

impl MapRecord {
    /// Create an empty, persisted record
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field (builder style)
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Mark the record as new (builder style)
    pub fn with_new(mut self, new_record: bool) -> Self {
        self.new_record = new_record;
        self
    }

    /// Set a field, returning the previous value
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(name.into(), value.into())
    }

    /// Remove a field so it reads as absent
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.fields.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn set_new(&mut self, new_record: bool) {
        self.new_record = new_record;
    }
}

impl Record for MapRecord {
    fn field(&self, name: &str) -> Option<Value> {
        self.fields.get(name).cloned()
    }

    fn is_new(&self) -> bool {
        self.new_record
    }
}

impl<S: BuildHasher> Record for HashMap<String, Value, S> {
    fn field(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}

impl Record for BTreeMap<String, Value> {
    fn field(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}

/// JSON objects are records; any other JSON value has no fields.
///
/// A boolean `newRecord` or `isNew` key answers [`Record::is_new`].
impl Record for serde_json::Value {
    fn field(&self, name: &str) -> Option<Value> {
        self.as_object()?.get(name).cloned().map(Value::from)
    }

    fn is_new(&self) -> bool {
        ["newRecord", "isNew"]
            .iter()
            .find_map(|key| self.get(key).and_then(serde_json::Value::as_bool))
            .unwrap_or(false)
    }
}

impl<R: Record + ?Sized> Record for &R {
    fn field(&self, name: &str) -> Option<Value> {
        (**self).field(name)
    }

    fn is_new(&self) -> bool {
        (**self).is_new()
    }
}
