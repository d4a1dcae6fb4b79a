//! Asset data
//!
//! [`AssetData`] is the per-call result of a repository read: the asset's
//! identity plus whatever attributes were requested. It is never cached.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::id::AssetId;
use crate::value::AttributeValue;

/// Named attributes of one asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetData {
    /// The asset these attributes belong to
    id: AssetId,
    /// Attribute values by name
    attributes: BTreeMap<String, AttributeValue>,
}

impl AssetData {
    /// Create asset data with no attributes
    pub fn new(id: AssetId) -> Self {
        Self {
            id,
            attributes: BTreeMap::new(),
        }
    }

    /// Add an attribute (builder style)
    pub fn with(mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Set an attribute, replacing any previous value
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<AttributeValue>) {
        self.attributes.insert(name.into(), value.into());
    }

    /// The asset id
    pub fn id(&self) -> &AssetId {
        &self.id
    }

    /// Look up an attribute by name
    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    /// Whether the attribute is present
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Names of all present attributes, in sorted order
    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(String::as_str)
    }

    /// Iterate over `(name, value)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Copy of this data restricted to the named attributes
    ///
    /// Names without a value are skipped.
    pub fn project<S: AsRef<str>>(&self, names: &[S]) -> AssetData {
        let attributes = names
            .iter()
            .filter_map(|n| {
                let n = n.as_ref();
                self.attributes
                    .get(n)
                    .map(|v| (n.to_string(), v.clone()))
            })
            .collect();
        AssetData {
            id: self.id.clone(),
            attributes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> AssetData {
        AssetData::new(AssetId::new("Page", 1))
            .with("name", "home")
            .with("h1title", "Welcome")
            .with("path", "/home")
    }

    #[test]
    fn test_attribute_lookup() {
        let data = page();
        assert_eq!(data.id(), &AssetId::new("Page", 1));
        assert_eq!(data.attribute("name"), Some(&AttributeValue::from("home")));
        assert!(data.attribute("missing").is_none());
        assert!(data.has_attribute("path"));
    }

    #[test]
    fn test_attribute_names_sorted() {
        let data = page();
        let names: Vec<_> = data.attribute_names().collect();
        assert_eq!(names, vec!["h1title", "name", "path"]);
    }

    #[test]
    fn test_project_keeps_only_requested() {
        let projected = page().project(&["name", "nonexistent"]);
        assert_eq!(projected.attribute_names().count(), 1);
        assert!(projected.has_attribute("name"));
        assert_eq!(projected.id(), &AssetId::new("Page", 1));
    }
}
