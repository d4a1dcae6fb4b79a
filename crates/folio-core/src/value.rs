//! Raw attribute values
//!
//! The repository hands back attribute values without a static type.
//! Callers coerce them into the shape they need (see the attribute helpers
//! in `folio-access`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::AssetId;

/// An untyped attribute value as stored by the repository
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    /// Text value
    String(String),
    /// Integer value
    Integer(i64),
    /// Point in time
    Date(DateTime<Utc>),
    /// Reference to another asset
    AssetId(AssetId),
    /// Multi-valued attribute
    List(Vec<AttributeValue>),
}

impl AttributeValue {
    /// The first scalar of a value
    ///
    /// Scalars are returned as-is; lists yield their first element, or
    /// `None` when empty.
    pub fn first(&self) -> Option<&AttributeValue> {
        match self {
            AttributeValue::List(values) => values.first().and_then(AttributeValue::first),
            scalar => Some(scalar),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        AttributeValue::String(s.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        AttributeValue::String(s)
    }
}

impl From<i64> for AttributeValue {
    fn from(n: i64) -> Self {
        AttributeValue::Integer(n)
    }
}

impl From<DateTime<Utc>> for AttributeValue {
    fn from(d: DateTime<Utc>) -> Self {
        AttributeValue::Date(d)
    }
}

impl From<AssetId> for AttributeValue {
    fn from(id: AssetId) -> Self {
        AttributeValue::AssetId(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_of_scalar_and_list() {
        let scalar = AttributeValue::from("hello");
        assert_eq!(scalar.first(), Some(&scalar));

        let list = AttributeValue::List(vec![AttributeValue::from(1i64), AttributeValue::from(2i64)]);
        assert_eq!(list.first(), Some(&AttributeValue::Integer(1)));

        let empty = AttributeValue::List(vec![]);
        assert_eq!(empty.first(), None);
    }

    #[test]
    fn test_serde_roundtrip_keeps_variant() {
        let value = AttributeValue::AssetId(AssetId::new("Page", 3));
        let json = serde_json::to_string(&value).unwrap();
        let back: AttributeValue = serde_json::from_str(&json).unwrap();
        assert_eq!(back, value);
    }
}
