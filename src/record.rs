//! Access to the record that owns an attachment.
//!
//! The record framework itself lives elsewhere; attachforge only needs to
//! read and write a few attributes and to know the record's identity.

use attachforge_common::template::scalar_text;
use attachforge_common::AttributeSource;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What the attachment manager needs from an owning record.
pub trait RecordAccess {
    /// Current value of an attribute.
    fn get_attribute(&self, name: &str) -> Option<Value>;

    /// Store a value in an attribute.
    fn set_attribute(&mut self, name: &str, value: Value);

    /// Whether the record's schema declares the attribute.
    fn has_field(&self, name: &str) -> bool;

    /// Type name of the record, bound to `:model`.
    fn type_name(&self) -> &str;

    /// Primary key, bound to `:id`.
    fn primary_key(&self) -> Option<Value>;

    /// Whether the record has not been saved before.
    fn is_new_record(&self) -> bool;

    /// Clear the new-record flag once the record has been stored.
    fn mark_saved(&mut self);
}

/// Text form of an attribute, empty when missing or not a scalar.
pub fn attribute_text(record: &dyn RecordAccess, name: &str) -> String {
    record
        .get_attribute(name)
        .as_ref()
        .and_then(scalar_text)
        .unwrap_or_default()
}

/// Adapter that lets `:{a.b}` template paths start at a record.
pub(crate) struct RecordRoot<'a>(pub &'a dyn RecordAccess);

impl AttributeSource for RecordRoot<'_> {
    fn attribute(&self, name: &str) -> Option<Value> {
        self.0.get_attribute(name)
    }
}

/// A record held in memory, serializable as JSON.
///
/// Every key in `fields` is a declared field, even when its value is null.
///
/// ```
/// use attachforge::{MemoryRecord, RecordAccess};
/// use serde_json::json;
///
/// let record = MemoryRecord::new("Post", json!(5))
///     .with_field("filename", json!(null))
///     .with_field("file_size", json!(null));
/// assert!(record.has_field("file_size"));
/// assert!(!record.has_field("file_type"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecord {
    #[serde(rename = "type")]
    pub type_name: String,

    #[serde(default)]
    pub id: Value,

    #[serde(default)]
    pub new: bool,

    #[serde(default)]
    pub fields: IndexMap<String, Value>,
}

impl MemoryRecord {
    /// Create a saved record with no fields.
    pub fn new(type_name: impl Into<String>, id: Value) -> Self {
        Self {
            type_name: type_name.into(),
            id,
            new: false,
            fields: IndexMap::new(),
        }
    }

    /// Declare a field with an initial value.
    pub fn with_field(mut self, name: impl Into<String>, value: Value) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    /// Mark the record as not yet saved.
    pub fn new_record(mut self) -> Self {
        self.new = true;
        self
    }
}

impl RecordAccess for MemoryRecord {
    fn get_attribute(&self, name: &str) -> Option<Value> {
        self.fields.get(name).cloned()
    }

    fn set_attribute(&mut self, name: &str, value: Value) {
        self.fields.insert(name.to_string(), value);
    }

    fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn primary_key(&self) -> Option<Value> {
        match &self.id {
            Value::Null => None,
            id => Some(id.clone()),
        }
    }

    fn is_new_record(&self) -> bool {
        self.new
    }

    fn mark_saved(&mut self) {
        self.new = false;
    }
}
