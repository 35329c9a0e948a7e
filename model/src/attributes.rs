/*!

The `attributes` module flattens an attribute tree into the dotted paths used to address
individual values, e.g. `spec.0.listener.0.port_mapping.0.port`.

- A list (or block list) at `path` contributes `path.#` with its length and its elements at
  `path.0`, `path.1`, ...
- A map at `path` contributes `path.%` with its length and its entries at `path.<key>`.
- Nulls are omitted, so an absent optional attribute has no key at all.

!*/

use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A flattened attribute tree.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Attributes(BTreeMap<String, String>);

impl Attributes {
    /// Flatten `value`. The root is expected to be an object whose fields are top-level attributes.
    pub fn from_value(value: &Value) -> Self {
        let mut attributes = BTreeMap::new();
        match value {
            Value::Object(fields) => flatten_fields(&mut attributes, None, fields),
            other => flatten_value(&mut attributes, String::new(), other),
        }
        Self(attributes)
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.0.get(path).map(String::as_str)
    }

    /// The number of elements of the list or map at `path`, zero when it is absent.
    pub fn count(&self, path: &str) -> usize {
        self.get(&format!("{}.#", path))
            .or_else(|| self.get(&format!("{}.%", path)))
            .and_then(|count| count.parse().ok())
            .unwrap_or(0)
    }

    /// Whether any element of the set addressed by `pattern` (a path ending in `.*`) equals
    /// `value`.
    pub fn contains_element(&self, pattern: &str, value: &str) -> bool {
        let prefix = pattern.trim_end_matches('*');
        self.0.iter().any(|(key, v)| {
            key.strip_prefix(prefix)
                .map(|rest| rest.parse::<usize>().is_ok())
                .unwrap_or(false)
                && v == value
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// The keys whose values differ between `self` and `other`, including keys present on only one
    /// side.
    pub fn diff(&self, other: &Attributes) -> Vec<String> {
        let mut keys: Vec<String> = self
            .0
            .iter()
            .filter(|(k, v)| other.0.get(*k) != Some(*v))
            .map(|(k, _)| k.clone())
            .collect();
        keys.extend(
            other
                .0
                .keys()
                .filter(|k| !self.0.contains_key(*k))
                .cloned(),
        );
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Strip list indices and count markers from a flattened key so that it can be compared with
/// schema paths: `spec.0.listener.1.tls.#` becomes `spec.listener.tls`.
pub fn normalize(key: &str) -> String {
    key.split('.')
        .filter(|segment| {
            !(segment.is_empty()
                || *segment == "#"
                || *segment == "%"
                || segment.chars().all(|c| c.is_ascii_digit()))
        })
        .collect::<Vec<_>>()
        .join(".")
}

fn join(prefix: Option<&str>, name: &str) -> String {
    match prefix {
        Some(prefix) => format!("{}.{}", prefix, name),
        None => name.to_string(),
    }
}

fn flatten_fields(out: &mut BTreeMap<String, String>, prefix: Option<&str>, fields: &Map<String, Value>) {
    for (name, value) in fields {
        flatten_value(out, join(prefix, name), value);
    }
}

fn flatten_value(out: &mut BTreeMap<String, String>, path: String, value: &Value) {
    match value {
        Value::Null => {}
        Value::Bool(b) => {
            out.insert(path, b.to_string());
        }
        Value::Number(n) => {
            out.insert(path, n.to_string());
        }
        Value::String(s) => {
            out.insert(path, s.clone());
        }
        Value::Array(items) => {
            out.insert(format!("{}.#", path), items.len().to_string());
            for (i, item) in items.iter().enumerate() {
                let item_path = format!("{}.{}", path, i);
                match item {
                    // Block list elements are objects whose fields are nested attributes.
                    Value::Object(fields) => flatten_fields(out, Some(&item_path), fields),
                    other => flatten_value(out, item_path, other),
                }
            }
        }
        Value::Object(entries) => {
            out.insert(format!("{}.%", path), entries.len().to_string());
            for (key, entry) in entries {
                flatten_value(out, format!("{}.{}", path, key), entry);
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::{normalize, Attributes};
    use serde_json::json;

    #[test]
    fn blocks_lists_and_maps() {
        let attributes = Attributes::from_value(&json!({
            "name": "gw",
            "spec": [{
                "listener": [{
                    "port_mapping": [{"port": 8080, "protocol": "http"}],
                    "tls": []
                }]
            }],
            "tags": {"Name": "gw"},
            "arn": null
        }));
        assert_eq!(attributes.get("name"), Some("gw"));
        assert_eq!(attributes.count("spec"), 1);
        assert_eq!(
            attributes.get("spec.0.listener.0.port_mapping.0.port"),
            Some("8080")
        );
        assert_eq!(attributes.get("spec.0.listener.0.tls.#"), Some("0"));
        assert_eq!(attributes.get("tags.%"), Some("1"));
        assert_eq!(attributes.get("tags.Name"), Some("gw"));
        assert_eq!(attributes.get("arn"), None);
    }

    #[test]
    fn set_elements() {
        let attributes = Attributes::from_value(&json!({ "ports": [443, 8443] }));
        assert!(attributes.contains_element("ports.*", "443"));
        assert!(attributes.contains_element("ports.*", "8443"));
        assert!(!attributes.contains_element("ports.*", "80"));
        assert_eq!(attributes.count("ports"), 2);
    }

    #[test]
    fn diff_reports_both_sides() {
        let a = Attributes::from_value(&json!({ "a": 1, "b": [1] }));
        let b = Attributes::from_value(&json!({ "a": 2, "c": true }));
        assert_eq!(a.diff(&b), vec!["a", "b.#", "b.0", "c"]);
    }

    #[test]
    fn normalized_keys() {
        assert_eq!(normalize("spec.0.listener.1.tls.#"), "spec.listener.tls");
        assert_eq!(normalize("tags.%"), "tags");
        assert_eq!(normalize("name"), "name");
    }
}
