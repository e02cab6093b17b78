//! Intersphinx targets
//!
//! Links external documentation projects to their base URL and object
//! inventory so cross-project references can be resolved.

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, SerializeTuple, Serializer};

/// Default name of a Sphinx object inventory below the base URL.
pub const INVENTORY_FILE: &str = "objects.inv";

/// One external project: base URL plus an optional explicit inventory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntersphinxTarget {
    pub base_url: String,
    /// `None` means `<base_url>/objects.inv`.
    pub inventory: Option<String>,
}

impl IntersphinxTarget {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            inventory: None,
        }
    }

    pub fn with_inventory(mut self, inventory: impl Into<String>) -> Self {
        self.inventory = Some(inventory.into());
        self
    }

    /// Location of the object inventory for this target.
    pub fn inventory_url(&self) -> String {
        match &self.inventory {
            Some(inventory) => inventory.clone(),
            None => format!(
                "{}/{}",
                self.base_url.trim_end_matches('/'),
                INVENTORY_FILE
            ),
        }
    }

    fn has_valid_scheme(&self) -> bool {
        is_http_url(&self.base_url)
    }
}

/// Whether `value` is an absolute http(s) URL rather than a local path.
pub fn is_http_url(value: &str) -> bool {
    value.starts_with("https://") || value.starts_with("http://")
}

// Serialized as the builder expects: `[base_url, inventory-or-null]`.
impl Serialize for IntersphinxTarget {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut pair = serializer.serialize_tuple(2)?;
        pair.serialize_element(&self.base_url)?;
        pair.serialize_element(&self.inventory)?;
        pair.end()
    }
}

/// Ordered mapping of project name to target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntersphinxMapping {
    targets: IndexMap<String, IntersphinxTarget>,
}

impl IntersphinxMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// The projects the XBR documentation links into.
    pub fn xbr_defaults() -> Self {
        let mut mapping = Self::new();
        mapping.insert("python", IntersphinxTarget::new("https://docs.python.org/3"));
        mapping.insert(
            "twisted",
            IntersphinxTarget::new("https://docs.twisted.org/en/stable/"),
        );
        mapping.insert(
            "txaio",
            IntersphinxTarget::new("https://txaio.readthedocs.io/en/latest/"),
        );
        mapping.insert(
            "autobahn",
            IntersphinxTarget::new("https://autobahn.readthedocs.io/en/latest/"),
        );
        mapping
    }

    /// Add or replace a target. Returns the replaced target, if any.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        target: IntersphinxTarget,
    ) -> Option<IntersphinxTarget> {
        self.targets.insert(name.into(), target)
    }

    pub fn get(&self, name: &str) -> Option<&IntersphinxTarget> {
        self.targets.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.targets.keys().map(|s| s.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &IntersphinxTarget)> {
        self.targets.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Inventory URL for a named project.
    pub fn inventory_url(&self, name: &str) -> Option<String> {
        self.get(name).map(IntersphinxTarget::inventory_url)
    }

    /// Returns one message per target whose base URL is not http(s).
    pub fn validate(&self) -> Vec<String> {
        self.iter()
            .filter(|(_, target)| !target.has_valid_scheme())
            .map(|(name, target)| {
                format!(
                    "intersphinx target '{}' has a non-http base URL '{}'",
                    name, target.base_url
                )
            })
            .collect()
    }
}

impl Serialize for IntersphinxMapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.targets.len()))?;
        for (name, target) in &self.targets {
            map.serialize_entry(name, target)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xbr_defaults_projects() {
        let mapping = IntersphinxMapping::xbr_defaults();
        let names: Vec<&str> = mapping.names().collect();
        assert_eq!(names, vec!["python", "twisted", "txaio", "autobahn"]);
        assert!(mapping.iter().all(|(_, t)| t.inventory.is_none()));
    }

    #[test]
    fn test_serializes_as_pairs() {
        let mapping = IntersphinxMapping::xbr_defaults();
        let value = serde_json::to_value(&mapping).unwrap();

        assert_eq!(
            value["python"],
            serde_json::json!(["https://docs.python.org/3", null])
        );
        for (_, pair) in value.as_object().unwrap() {
            assert_eq!(pair.as_array().unwrap().len(), 2);
        }
    }

    #[test]
    fn test_inventory_url() {
        let mapping = IntersphinxMapping::xbr_defaults();
        assert_eq!(
            mapping.inventory_url("python").unwrap(),
            "https://docs.python.org/3/objects.inv"
        );
        assert_eq!(
            mapping.inventory_url("twisted").unwrap(),
            "https://docs.twisted.org/en/stable/objects.inv"
        );
        assert!(mapping.inventory_url("numpy").is_none());

        let explicit = IntersphinxTarget::new("https://example.org/").with_inventory("local.inv");
        assert_eq!(explicit.inventory_url(), "local.inv");
    }

    #[test]
    fn test_is_http_url() {
        assert!(is_http_url("https://docs.python.org/3"));
        assert!(is_http_url("http://localhost:8000/"));
        assert!(!is_http_url("file:///srv/docs"));
        assert!(!is_http_url("_static/img/xbr.svg"));
    }

    #[test]
    fn test_insert_replaces() {
        let mut mapping = IntersphinxMapping::xbr_defaults();
        let previous = mapping.insert("python", IntersphinxTarget::new("https://docs.python.org/3.12"));
        assert!(previous.is_some());
        assert_eq!(mapping.len(), 4);
    }

    #[test]
    fn test_validate_rejects_non_http() {
        let mut mapping = IntersphinxMapping::xbr_defaults();
        assert!(mapping.validate().is_empty());

        mapping.insert("local", IntersphinxTarget::new("file:///srv/docs"));
        let problems = mapping.validate();
        assert_eq!(problems.len(), 1);
        assert!(problems[0].contains("local"));
    }
}
