//! Asset queries
//!
//! A [`Query`] selects assets of one type by a conjunction of attribute
//! conditions, and names the attributes each result should carry.

use serde::{Deserialize, Serialize};

use crate::data::AssetData;
use crate::value::AttributeValue;

/// Comparison applied by a [`Condition`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    /// Exact match
    Equals,
    /// Anything but an exact match (absent attributes match)
    NotEquals,
    /// SQL-style pattern match, `%` matching any run of characters
    Like,
}

/// A single attribute filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Attribute to compare
    pub attribute: String,
    /// Comparison operator
    pub op: Operator,
    /// Value to compare against
    pub value: AttributeValue,
}

impl Condition {
    /// Create a new condition
    pub fn new(attribute: impl Into<String>, op: Operator, value: impl Into<AttributeValue>) -> Self {
        Self {
            attribute: attribute.into(),
            op,
            value: value.into(),
        }
    }

    /// Shorthand for an `Equals` condition
    pub fn equals(attribute: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        Self::new(attribute, Operator::Equals, value)
    }

    /// Evaluate the condition against one asset
    pub fn matches(&self, data: &AssetData) -> bool {
        let actual = data.attribute(&self.attribute);
        match self.op {
            Operator::Equals => actual == Some(&self.value),
            Operator::NotEquals => actual != Some(&self.value),
            Operator::Like => match (actual, &self.value) {
                (Some(AttributeValue::String(s)), AttributeValue::String(pattern)) => {
                    like(s, pattern)
                }
                _ => false,
            },
        }
    }
}

/// Case-sensitive `%` wildcard match
fn like(text: &str, pattern: &str) -> bool {
    let parts: Vec<&str> = pattern.split('%').collect();
    if parts.len() == 1 {
        return text == pattern;
    }

    let first = parts[0];
    let last = parts[parts.len() - 1];
    if !text.starts_with(first) || text.len() < first.len() + last.len() || !text.ends_with(last) {
        return false;
    }

    let mut rest = &text[first.len()..text.len() - last.len()];
    for part in &parts[1..parts.len() - 1] {
        match rest.find(part) {
            Some(pos) => rest = &rest[pos + part.len()..],
            None => return false,
        }
    }
    true
}

/// An `(asset type, conditions, requested attributes)` triple
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    /// Asset type to search
    pub asset_type: String,
    /// Optional subtype restriction
    pub subtype: Option<String>,
    /// Conditions, all of which must hold
    pub conditions: Vec<Condition>,
    /// Attributes to return on each result; empty means all
    pub attributes: Vec<String>,
    /// Ask the backend for its cheap index-only search path
    pub basic_search: bool,
}

impl Query {
    /// Create a query over every asset of a type
    pub fn new(asset_type: impl Into<String>) -> Self {
        Self {
            asset_type: asset_type.into(),
            subtype: None,
            conditions: Vec::new(),
            attributes: Vec::new(),
            basic_search: false,
        }
    }

    /// Restrict to a subtype
    pub fn with_subtype(mut self, subtype: impl Into<String>) -> Self {
        self.subtype = Some(subtype.into());
        self
    }

    /// Add a condition
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Set the attributes to return
    pub fn with_attributes<S: Into<String>>(mut self, attributes: impl IntoIterator<Item = S>) -> Self {
        self.attributes = attributes.into_iter().map(Into::into).collect();
        self
    }

    /// Request the basic-search path
    pub fn basic_search(mut self, enabled: bool) -> Self {
        self.basic_search = enabled;
        self
    }

    /// Whether an asset satisfies every condition of this query
    ///
    /// The asset type and subtype are checked as well; subtype is read from
    /// the `subtype` attribute.
    pub fn matches(&self, data: &AssetData) -> bool {
        if data.id().asset_type() != self.asset_type {
            return false;
        }
        if let Some(subtype) = &self.subtype {
            let actual = data.attribute("subtype");
            if actual != Some(&AttributeValue::String(subtype.clone())) {
                return false;
            }
        }
        self.conditions.iter().all(|c| c.matches(data))
    }
}
