//! Per-call field context merged into log lines

use serde_json::{Map, Value};

/// Ad-hoc key/value pairs attached to a single log call.
///
/// Keys are not validated and keep their insertion order in the rendered
/// line. Values are converted to JSON at insertion time, so callers never
/// pre-serialize anything.
///
/// # Examples
///
/// ```
/// use cw_api::logging::FieldContext;
///
/// let fields = FieldContext::new()
///     .with("app_name", "cw-api")
///     .with("duration_ms", 120)
///     .with("cached", false);
///
/// assert_eq!(fields.len(), 3);
/// assert_eq!(fields.get("duration_ms"), Some(&serde_json::json!(120)));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldContext(Map<String, Value>);

impl FieldContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert. A repeated key replaces the earlier value.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Interpret an arbitrary auxiliary value as field context.
    ///
    /// Only JSON objects qualify; anything else yields `None` and is dropped.
    pub fn from_value(value: &Value) -> Option<Self> {
        value.as_object().map(|map| Self(map.clone()))
    }

    /// Overlay these fields onto `target`, replacing existing keys.
    pub(crate) fn merge_into(&self, target: &mut Map<String, Value>) {
        for (key, value) in &self.0 {
            target.insert(key.clone(), value.clone());
        }
    }
}

impl From<Map<String, Value>> for FieldContext {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<FieldContext> for Value {
    fn from(fields: FieldContext) -> Self {
        Value::Object(fields.0)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for FieldContext {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
