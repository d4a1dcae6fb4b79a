//! Error types for Folio

use thiserror::Error;

use crate::id::AssetId;

/// Top-level error type for Folio
#[derive(Debug, Error)]
pub enum FolioError {
    #[error("Repository access error: {0}")]
    RepositoryAccess(#[from] RepositoryAccessError),

    #[error("Invalid alias: {0}")]
    InvalidAlias(#[from] InvalidAliasError),

    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
}

impl FolioError {
    /// Whether the failure came from the backing repository rather than
    /// from the content itself
    ///
    /// Backend failures may go away on a later call; every other kind is
    /// deterministic for the same input.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            FolioError::RepositoryAccess(
                RepositoryAccessError::Backend(_) | RepositoryAccessError::ManagerUnavailable(_)
            )
        )
    }
}

/// Failures reported by the backing repository during a read
///
/// Never retried by Folio.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryAccessError {
    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Invalid attribute '{attribute}' for asset type {asset_type}")]
    InvalidAttribute {
        asset_type: String,
        attribute: String,
    },

    #[error("Asset not found: {0}")]
    NotFound(AssetId),

    #[error("Read manager unavailable: {0}")]
    ManagerUnavailable(String),
}

impl RepositoryAccessError {
    /// Create a new Backend error
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }

    /// Create a new InvalidAttribute error
    pub fn invalid_attribute(asset_type: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self::InvalidAttribute {
            asset_type: asset_type.into(),
            attribute: attribute.into(),
        }
    }
}

/// The alias record is structurally invalid
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidAliasError {
    #[error("Asset {0} has neither a target_url attribute nor a target association")]
    NoTarget(AssetId),

    #[error("Alias {alias} refers to target {target}, which is not web-referenceable")]
    TargetNotWebReferenceable { alias: AssetId, target: AssetId },
}

/// A caller-supplied value could not be parsed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("Not a numeric id: '{0}'")]
    InvalidNumericId(String),

    #[error("Not an asset id: '{0}'")]
    InvalidAssetId(String),

    #[error("Not a date: '{0}'")]
    InvalidDate(String),
}

/// A component was assembled without a required dependency
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("A repository session is required")]
    MissingSession,

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_error_mentions_asset() {
        let err = RepositoryAccessError::NotFound(AssetId::new("Page", 7));
        assert!(err.to_string().contains("Page:7"));
    }

    #[test]
    fn test_invalid_attribute_error() {
        let err = RepositoryAccessError::invalid_attribute("Page", "bogus");
        assert!(matches!(err, RepositoryAccessError::InvalidAttribute { .. }));
        assert!(err.to_string().contains("bogus"));
    }

    #[test]
    fn test_transient_classification() {
        let backend: FolioError = RepositoryAccessError::backend("timeout").into();
        assert!(backend.is_transient());

        let missing: FolioError = RepositoryAccessError::NotFound(AssetId::new("Page", 1)).into();
        assert!(!missing.is_transient());

        let alias: FolioError = InvalidAliasError::NoTarget(AssetId::new("GSTAlias", 1)).into();
        assert!(!alias.is_transient());

        let format: FolioError = FormatError::InvalidNumericId("x".into()).into();
        assert!(!format.is_transient());
    }
}
