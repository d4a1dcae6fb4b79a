//! # Folio WRA
//!
//! Resolution of web-referenceable assets, aliases and site ownership on top
//! of [`folio_access`].
//!
//! ## Modules
//!
//! - [`wra`]: The normalized renderable view of an asset and its resolver
//! - [`alias`]: External and delegated aliases
//! - [`site`]: Which publication owns an asset
//! - [`builder`]: Assembly of resolvers over one session
//!
//! ## Example
//!
//! ```rust,ignore
//! use folio_core::AssetId;
//! use folio_wra::{AliasResolver, SiteOwnershipResolver};
//!
//! let aliases = AliasResolver::new(&session);
//! let alias = aliases.get_alias(&AssetId::new("GSTAlias", 42))?;
//! println!("{:?}", alias.fields().link_text);
//!
//! let sites = SiteOwnershipResolver::new(&session);
//! let site = sites.resolve_site("Page", "1001")?;
//! ```

pub mod alias;
pub mod builder;
pub mod site;
pub mod wra;

pub use alias::{
    ALIAS_ATTRIBUTES, Alias, AliasProbe, AliasResolver, DEFAULT_TARGET_ASSOCIATION, DelegatedAlias,
    ExternalAlias,
};
pub use builder::ResolverBuilder;
pub use site::{ASSET_PUBLICATION_STATEMENT, SiteOwnershipResolver, asset_publication_statement};
pub use wra::{
    CoreFieldWraResolver, CoreFields, WRA_ATTRIBUTES, WebReferenceableAsset,
    WebReferenceableAssetResolver,
};
