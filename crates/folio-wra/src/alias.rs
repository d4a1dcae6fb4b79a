//! Alias resolution
//!
//! An alias is a lightweight asset that stands in for something renderable.
//! It resolves in one of two modes:
//!
//! - **External**: no target association; the alias points at `target_url`
//!   and every field comes from the alias itself.
//! - **Delegated**: a `target` association names a web-referenceable asset;
//!   display fields the alias leaves blank are taken from the target.
//!
//! An alias with neither a target association nor a `target_url` is
//! invalid, as is one whose target is not web-referenceable.

use folio_access::AssetAccessTemplate;
use folio_access::attribute::{as_asset_id, get_with_fallback, string_of};
use folio_core::{
    AssetData, AssetId, AssociationLookup, FolioError, InvalidAliasError, RepositoryAccessError,
    Session,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::wra::{CoreFields, CoreFieldWraResolver, WebReferenceableAssetResolver};

/// Attributes read for an alias
pub const ALIAS_ATTRIBUTES: &[&str] = &[
    "metatitle",
    "metadescription",
    "metakeyword",
    "h1title",
    "linktext",
    "path",
    "template",
    "id",
    "name",
    "description",
    "subtype",
    "startdate",
    "enddate",
    "status",
    "target",
    "target_url",
    "popup",
    "linkimage",
];

/// Default name of the association linking an alias to its target
pub const DEFAULT_TARGET_ASSOCIATION: &str = "target";

/// Alias pointing at a URL outside the repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalAlias {
    pub id: AssetId,
    pub fields: CoreFields,
    pub target_url: String,
    pub popup: Option<String>,
    pub link_image: Option<AssetId>,
}

/// Alias standing in for another web-referenceable asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegatedAlias {
    pub id: AssetId,
    /// Alias fields with blanks filled from the target
    pub fields: CoreFields,
    /// The associated target asset
    pub target: AssetId,
    pub popup: Option<String>,
    pub link_image: Option<AssetId>,
}

/// A resolved alias
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Alias {
    External(ExternalAlias),
    Delegated(DelegatedAlias),
}

impl Alias {
    /// The alias asset's own id
    pub fn id(&self) -> &AssetId {
        match self {
            Alias::External(a) => &a.id,
            Alias::Delegated(a) => &a.id,
        }
    }

    /// The resolved display fields
    pub fn fields(&self) -> &CoreFields {
        match self {
            Alias::External(a) => &a.fields,
            Alias::Delegated(a) => &a.fields,
        }
    }

    pub fn popup(&self) -> Option<&str> {
        match self {
            Alias::External(a) => a.popup.as_deref(),
            Alias::Delegated(a) => a.popup.as_deref(),
        }
    }

    pub fn link_image(&self) -> Option<&AssetId> {
        match self {
            Alias::External(a) => a.link_image.as_ref(),
            Alias::Delegated(a) => a.link_image.as_ref(),
        }
    }

    /// The external URL, for external aliases
    pub fn target_url(&self) -> Option<&str> {
        match self {
            Alias::External(a) => Some(&a.target_url),
            Alias::Delegated(_) => None,
        }
    }

    /// The target asset, for delegated aliases
    pub fn target(&self) -> Option<&AssetId> {
        match self {
            Alias::External(_) => None,
            Alias::Delegated(a) => Some(&a.target),
        }
    }

    pub fn is_external(&self) -> bool {
        matches!(self, Alias::External(_))
    }
}

/// Outcome of probing whether an asset is an alias
///
/// Separates "this asset is not a valid alias" from "the question could not
/// be answered", which a plain boolean would conflate.
///
/// The split is only as sharp as the target check. A delegated target is
/// tested with [`WebReferenceableAssetResolver::is_web_referenceable`],
/// which answers `false` on any error, so a repository failure while
/// reading the target shows up as
/// `NotAlias(InvalidAliasError::TargetNotWebReferenceable { .. })`, not as
/// `Failed`. Failures reading the alias itself do land in `Failed`.
#[derive(Debug)]
pub enum AliasProbe {
    /// The asset resolved as an alias
    Alias(Alias),
    /// The asset is not a valid alias
    NotAlias(InvalidAliasError),
    /// Resolution failed for another reason
    Failed(FolioError),
}

impl AliasProbe {
    pub fn is_alias(&self) -> bool {
        matches!(self, AliasProbe::Alias(_))
    }
}

/// Resolves alias assets
///
/// Holds no state of its own beyond borrowed collaborators; every call
/// re-reads the repository.
pub struct AliasResolver<'s, W = CoreFieldWraResolver<'s>> {
    template: AssetAccessTemplate<'s>,
    wra: W,
    target_association: String,
}

impl<'s> AliasResolver<'s> {
    /// Create a resolver using [`CoreFieldWraResolver`] for targets
    pub fn new(session: &'s dyn Session) -> Self {
        Self::with_wra_resolver(session, CoreFieldWraResolver::new(session))
    }
}

impl<'s, W: WebReferenceableAssetResolver> AliasResolver<'s, W> {
    /// Create a resolver with a custom target resolver
    pub fn with_wra_resolver(session: &'s dyn Session, wra: W) -> Self {
        Self {
            template: AssetAccessTemplate::new(session),
            wra,
            target_association: DEFAULT_TARGET_ASSOCIATION.to_string(),
        }
    }

    /// Use a different association name to find targets
    pub fn with_target_association(mut self, name: impl Into<String>) -> Self {
        self.target_association = name.into();
        self
    }

    pub fn target_association(&self) -> &str {
        &self.target_association
    }

    /// The alias's own data, restricted to [`ALIAS_ATTRIBUTES`]
    ///
    /// # Errors
    ///
    /// Fails with `NotFound` when the asset does not exist, and with any
    /// error the repository reports.
    pub fn get_as_asset_data(&self, id: &AssetId) -> Result<AssetData, RepositoryAccessError> {
        self.template
            .read_one_projected_mapped(id, ALIAS_ATTRIBUTES, |data| data)
    }

    /// Resolve an alias
    ///
    /// # Errors
    ///
    /// - [`FolioError::InvalidAlias`] when the alias has neither a target
    ///   association nor a `target_url`, or its target is not
    ///   web-referenceable
    /// - [`FolioError::RepositoryAccess`] when a read fails
    /// - [`FolioError::Format`] when a date or asset reference attribute is
    ///   malformed
    pub fn get_alias(&self, id: &AssetId) -> Result<Alias, FolioError> {
        let data = self.get_as_asset_data(id)?;
        let target = self
            .template
            .session()
            .single_association(id, &self.target_association)?;

        match target {
            None => self.external(id, &data),
            Some(target) => self.delegated(id, &data, target),
        }
    }

    fn external(&self, id: &AssetId, data: &AssetData) -> Result<Alias, FolioError> {
        let target_url = get_with_fallback(data, &["target_url"])
            .ok_or_else(|| InvalidAliasError::NoTarget(id.clone()))?;
        trace!(alias = %id, target_url = %target_url, "Alias refers to an external URL");

        Ok(Alias::External(ExternalAlias {
            id: id.clone(),
            fields: CoreFields::from_asset_data(data)?,
            target_url,
            popup: string_of(data, "popup"),
            link_image: as_asset_id(data.attribute("linkimage"))?,
        }))
    }

    fn delegated(&self, id: &AssetId, data: &AssetData, target: AssetId) -> Result<Alias, FolioError> {
        if !self.wra.is_web_referenceable(&target) {
            return Err(InvalidAliasError::TargetNotWebReferenceable {
                alias: id.clone(),
                target,
            }
            .into());
        }
        let wra = self.wra.get_wra(&target)?;
        trace!(alias = %id, target = %target, "Alias refers to another web-referenceable asset");

        Ok(Alias::Delegated(DelegatedAlias {
            id: id.clone(),
            fields: CoreFields::from_asset_data(data)?.inherit_from(&wra.fields),
            target,
            popup: string_of(data, "popup"),
            link_image: as_asset_id(data.attribute("linkimage"))?,
        }))
    }

    /// Classify an asset as alias, non-alias, or unresolvable
    pub fn probe(&self, id: &AssetId) -> AliasProbe {
        match self.get_alias(id) {
            Ok(alias) => AliasProbe::Alias(alias),
            Err(FolioError::InvalidAlias(e)) => AliasProbe::NotAlias(e),
            Err(e) => AliasProbe::Failed(e),
        }
    }

    /// Whether an asset resolves as a valid alias
    ///
    /// Any failure answers `false`, including backend failures that say
    /// nothing about the asset itself. Those are logged at warn level; use
    /// [`probe`](Self::probe) to tell them apart.
    pub fn is_alias(&self, id: &AssetId) -> bool {
        match self.probe(id) {
            AliasProbe::Alias(_) => true,
            AliasProbe::NotAlias(e) => {
                debug!(asset = %id, reason = %e, "Asset is not an alias");
                false
            }
            AliasProbe::Failed(e) if e.is_transient() => {
                warn!(asset = %id, error = %e, "Alias check failed on a repository error; reporting not-an-alias");
                false
            }
            AliasProbe::Failed(e) => {
                debug!(asset = %id, error = %e, "Alias could not be resolved");
                false
            }
        }
    }
}
