//! Attribute coercion helpers
//!
//! Repository attributes arrive untyped. These helpers turn a raw
//! [`AttributeValue`] into a string, date, number or asset id, and pick the
//! first usable value out of several candidate attributes.
//!
//! Multi-valued attributes coerce through their first element.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use folio_core::{AssetData, AssetId, AttributeValue, FormatError};

/// Timestamp layouts accepted for string-valued dates, after RFC 3339
const DATE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"];

/// Whether a string is present and non-blank
pub fn is_good(s: Option<&str>) -> bool {
    s.is_some_and(|s| !s.trim().is_empty())
}

/// Coerce a value to text
///
/// Dates render as RFC 3339, asset ids as `type:id`.
pub fn as_string(value: Option<&AttributeValue>) -> Option<String> {
    match value?.first()? {
        AttributeValue::String(s) => Some(s.clone()),
        AttributeValue::Integer(n) => Some(n.to_string()),
        AttributeValue::Date(d) => Some(d.to_rfc3339()),
        AttributeValue::AssetId(id) => Some(id.to_string()),
        AttributeValue::List(_) => None,
    }
}

/// Coerce a value to a point in time
///
/// Blank strings are absent. Other strings must be RFC 3339 or
/// `YYYY-MM-DD HH:MM:SS[.fff]` (taken as UTC) or a bare `YYYY-MM-DD`.
///
/// # Errors
///
/// Returns [`FormatError::InvalidDate`] for a non-blank string in none of
/// those layouts, and for integers and asset ids.
pub fn as_date(value: Option<&AttributeValue>) -> Result<Option<DateTime<Utc>>, FormatError> {
    let Some(value) = value.and_then(AttributeValue::first) else {
        return Ok(None);
    };
    match value {
        AttributeValue::Date(d) => Ok(Some(*d)),
        AttributeValue::String(s) if s.trim().is_empty() => Ok(None),
        AttributeValue::String(s) => parse_date(s.trim()).map(Some),
        other => Err(FormatError::InvalidDate(format!("{:?}", other))),
    }
}

fn parse_date(s: &str) -> Result<DateTime<Utc>, FormatError> {
    if let Ok(d) = DateTime::parse_from_rfc3339(s) {
        return Ok(d.with_timezone(&Utc));
    }
    for format in DATE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| FormatError::InvalidDate(s.to_string()))
}

/// Coerce a value to an integer
///
/// # Errors
///
/// Returns [`FormatError::InvalidNumericId`] for a non-numeric string.
pub fn as_long(value: Option<&AttributeValue>) -> Result<Option<i64>, FormatError> {
    let Some(value) = value.and_then(AttributeValue::first) else {
        return Ok(None);
    };
    match value {
        AttributeValue::Integer(n) => Ok(Some(*n)),
        AttributeValue::String(s) if s.trim().is_empty() => Ok(None),
        AttributeValue::String(s) => folio_core::parse_numeric_id(s.trim()).map(Some),
        AttributeValue::AssetId(id) => Ok(Some(id.id())),
        other => Err(FormatError::InvalidNumericId(format!("{:?}", other))),
    }
}

/// Coerce a value to an asset reference
///
/// Strings must use the `type:id` form.
///
/// # Errors
///
/// Returns [`FormatError::InvalidAssetId`] for anything that is not an
/// asset id or a well-formed `type:id` string.
pub fn as_asset_id(value: Option<&AttributeValue>) -> Result<Option<AssetId>, FormatError> {
    let Some(value) = value.and_then(AttributeValue::first) else {
        return Ok(None);
    };
    match value {
        AttributeValue::AssetId(id) => Ok(Some(id.clone())),
        AttributeValue::String(s) if s.trim().is_empty() => Ok(None),
        AttributeValue::String(s) => s.trim().parse().map(Some),
        other => Err(FormatError::InvalidAssetId(format!("{:?}", other))),
    }
}

/// First non-blank string among the named attributes, in order
///
/// Returns the value as stored; the blank check trims, the result does not.
pub fn get_with_fallback(data: &AssetData, names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| as_string(data.attribute(name)))
        .find(|s| is_good(Some(s.as_str())))
}

/// Text of one attribute
pub fn string_of(data: &AssetData, name: &str) -> Option<String> {
    as_string(data.attribute(name))
}
