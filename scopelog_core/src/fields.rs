//! Key/value metadata attached to records.

use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

pub const SERVICE_NAME: &str = "service_name";
pub const SERVICE_VERSION: &str = "service_version";
pub const TRACE_ID: &str = "trace_id";
pub const FUNCTION: &str = "function";

/// Accumulated fields for one logical logging context
///
/// Extending a `FieldSet` always produces a new value; the original is
/// never touched, so sets can be shared freely across threads and
/// contexts. Clones share storage until one of them is extended.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FieldSet {
    entries: Arc<BTreeMap<String, Value>>,
}

impl FieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Base set carrying the service identity
    pub fn service(name: &str, version: &str) -> Self {
        Self::new()
            .with_field(SERVICE_NAME, name)
            .with_field(SERVICE_VERSION, version)
    }

    /// Copy of this set plus `key`; an existing value for `key` is replaced
    pub fn with_field(&self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut entries = self.entries.clone();
        Arc::make_mut(&mut entries).insert(key.into(), value.into());
        Self { entries }
    }

    /// Copy of this set plus every pair in `fields`
    pub fn with_fields<K, V, I>(&self, fields: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut entries = self.entries.clone();
        let map = Arc::make_mut(&mut entries);
        for (key, value) in fields {
            map.insert(key.into(), value.into());
        }
        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_service_fields() {
        let fields = FieldSet::service("svc", "1.0.0");
        assert_eq!(fields.len(), 2);
        assert_eq!(fields.get(SERVICE_NAME), Some(&json!("svc")));
        assert_eq!(fields.get(SERVICE_VERSION), Some(&json!("1.0.0")));
    }

    #[test]
    fn test_with_field_leaves_original_untouched() {
        let base = FieldSet::service("svc", "1.0.0");
        let traced = base.with_field(TRACE_ID, "T1");

        assert!(!base.contains_key(TRACE_ID));
        assert_eq!(traced.get(TRACE_ID), Some(&json!("T1")));
        assert_eq!(traced.len(), 3);
    }

    #[test]
    fn test_siblings_see_only_their_own_field() {
        let base = FieldSet::service("svc", "1.0.0");
        let left = base.with_field("left", 1);
        let right = base.with_field("right", 2);

        assert!(left.contains_key("left"));
        assert!(!left.contains_key("right"));
        assert!(right.contains_key("right"));
        assert!(!right.contains_key("left"));
        assert_eq!(base.len(), 2);
    }

    #[test]
    fn test_last_write_wins() {
        let fields = FieldSet::new()
            .with_field(FUNCTION, "first")
            .with_field(FUNCTION, "second");
        assert_eq!(fields.len(), 1);
        assert_eq!(fields.get(FUNCTION), Some(&json!("second")));
    }

    #[test]
    fn test_with_fields_merges_payload() {
        let base = FieldSet::service("svc", "1.0.0");
        let extended = base.with_fields([("test", json!("hello")), ("count", json!(3))]);

        assert_eq!(extended.len(), 4);
        assert_eq!(extended.get("count"), Some(&json!(3)));
        assert_eq!(base.len(), 2);
    }
}
