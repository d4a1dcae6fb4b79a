//! Asset identity
//!
//! An [`AssetId`] names exactly one content item in the repository by its
//! asset type and numeric id. Ids are immutable once built.

use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FormatError;

/// Identity of one content item: `(asset type, numeric id)`
///
/// Equality, ordering and hashing are by type first, then id.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AssetId {
    /// The asset type, e.g. `"Page"` or `"GSTAlias"`
    asset_type: String,
    /// The numeric id, unique within the repository
    id: i64,
}

impl AssetId {
    /// Create a new asset id
    pub fn new(asset_type: impl Into<String>, id: i64) -> Self {
        Self {
            asset_type: asset_type.into(),
            id,
        }
    }

    /// Create an asset id from a type and a numeric id given as text
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::InvalidNumericId`] when `cid` is not a
    /// base-10 64-bit integer.
    pub fn parse(asset_type: impl Into<String>, cid: &str) -> Result<Self, FormatError> {
        let id = parse_numeric_id(cid)?;
        Ok(Self::new(asset_type, id))
    }

    /// The asset type
    pub fn asset_type(&self) -> &str {
        &self.asset_type
    }

    /// The numeric id
    pub fn id(&self) -> i64 {
        self.id
    }
}

impl Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.asset_type, self.id)
    }
}

/// Parses the `type:id` form produced by [`Display`]
impl FromStr for AssetId {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (asset_type, cid) = s
            .rsplit_once(':')
            .ok_or_else(|| FormatError::InvalidAssetId(s.to_string()))?;
        if asset_type.is_empty() {
            return Err(FormatError::InvalidAssetId(s.to_string()));
        }
        Self::parse(asset_type, cid)
    }
}

/// Parse a caller-supplied numeric id
///
/// Surrounding whitespace is not stripped; `" 1 "` is rejected.
pub fn parse_numeric_id(cid: &str) -> Result<i64, FormatError> {
    cid.parse::<i64>()
        .map_err(|_| FormatError::InvalidNumericId(cid.to_string()))
}
