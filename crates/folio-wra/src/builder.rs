//! Assembly of resolvers from a session
//!
//! Resolvers can be built directly from a `&dyn Session`. The builder exists
//! for callers that wire components from configuration, where a missing
//! session or a bad association name must surface as an error rather than a
//! panic.

use folio_access::AssetAccessTemplate;
use folio_core::{ConfigurationError, Session};

use crate::alias::{AliasResolver, DEFAULT_TARGET_ASSOCIATION};
use crate::site::SiteOwnershipResolver;
use crate::wra::{CoreFieldWraResolver, WebReferenceableAssetResolver};

/// Builder for templates and resolvers sharing one session
#[derive(Clone)]
pub struct ResolverBuilder<'s> {
    session: Option<&'s dyn Session>,
    target_association: String,
}

impl Default for ResolverBuilder<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'s> ResolverBuilder<'s> {
    pub fn new() -> Self {
        Self {
            session: None,
            target_association: DEFAULT_TARGET_ASSOCIATION.to_string(),
        }
    }

    /// Set the repository session
    pub fn session(mut self, session: &'s dyn Session) -> Self {
        self.session = Some(session);
        self
    }

    /// Set the association name aliases use for their target
    pub fn target_association(mut self, name: impl Into<String>) -> Self {
        self.target_association = name.into();
        self
    }

    fn require_session(&self) -> Result<&'s dyn Session, ConfigurationError> {
        self.session.ok_or(ConfigurationError::MissingSession)
    }

    fn require_association(&self) -> Result<&str, ConfigurationError> {
        let name = self.target_association.trim();
        if name.is_empty() {
            return Err(ConfigurationError::Invalid(
                "target association name must not be blank".to_string(),
            ));
        }
        Ok(name)
    }

    pub fn build_template(&self) -> Result<AssetAccessTemplate<'s>, ConfigurationError> {
        Ok(AssetAccessTemplate::new(self.require_session()?))
    }

    pub fn build_wra_resolver(&self) -> Result<CoreFieldWraResolver<'s>, ConfigurationError> {
        Ok(CoreFieldWraResolver::new(self.require_session()?))
    }

    /// Build an alias resolver using [`CoreFieldWraResolver`] for targets
    pub fn build_alias_resolver(&self) -> Result<AliasResolver<'s>, ConfigurationError> {
        self.build_alias_resolver_with(self.build_wra_resolver()?)
    }

    /// Build an alias resolver with a custom target resolver
    pub fn build_alias_resolver_with<W: WebReferenceableAssetResolver>(
        &self,
        wra: W,
    ) -> Result<AliasResolver<'s, W>, ConfigurationError> {
        let session = self.require_session()?;
        let association = self.require_association()?;
        Ok(AliasResolver::with_wra_resolver(session, wra).with_target_association(association))
    }

    pub fn build_site_resolver(&self) -> Result<SiteOwnershipResolver<'s>, ConfigurationError> {
        Ok(SiteOwnershipResolver::new(self.require_session()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_storage::InMemoryRepository;

    #[test]
    fn test_missing_session() {
        let builder = ResolverBuilder::new();
        assert!(matches!(
            builder.build_template(),
            Err(ConfigurationError::MissingSession)
        ));
        assert!(matches!(
            builder.build_alias_resolver(),
            Err(ConfigurationError::MissingSession)
        ));
        assert!(matches!(
            builder.build_site_resolver(),
            Err(ConfigurationError::MissingSession)
        ));
    }

    #[test]
    fn test_blank_association_rejected() {
        let repo = InMemoryRepository::new();
        let builder = ResolverBuilder::new().session(&repo).target_association("  ");
        assert!(matches!(
            builder.build_alias_resolver(),
            Err(ConfigurationError::Invalid(_))
        ));
        assert!(builder.build_site_resolver().is_ok());
    }

    #[test]
    fn test_association_carried_to_resolver() {
        let repo = InMemoryRepository::new();
        let resolver = ResolverBuilder::new()
            .session(&repo)
            .target_association("points_to")
            .build_alias_resolver()
            .unwrap();
        assert_eq!(resolver.target_association(), "points_to");

        let default = ResolverBuilder::default()
            .session(&repo)
            .build_alias_resolver()
            .unwrap();
        assert_eq!(default.target_association(), DEFAULT_TARGET_ASSOCIATION);
    }
}
