//! # Folio Access
//!
//! Read-only access to repository assets.
//!
//! This crate isolates callers from the repository's native read API. All
//! reads go through [`AssetAccessTemplate`], which wraps every repository
//! failure in a single [`RepositoryAccessError`](folio_core::RepositoryAccessError)
//! and never retries.
//!
//! ## Modules
//!
//! - [`attribute`]: Coercion of raw attribute values to strings, dates,
//!   numbers and asset ids, plus first-non-blank fallback lookup
//! - [`template`]: The access template and its lazy result stream
//! - [`scattered`]: Map-style asset views and a template that produces them
//!
//! ## Example
//!
//! ```rust,ignore
//! use folio_access::AssetAccessTemplate;
//! use folio_core::{AssetId, Query};
//!
//! let template = AssetAccessTemplate::new(&session);
//!
//! // Single read, null-safe
//! if let Some(page) = template.read_one(&AssetId::new("Page", 1))? {
//!     println!("{:?}", page.attribute("name"));
//! }
//!
//! // Batch read, transformed
//! let names = template.read_many_mapped(&Query::new("Page"), |d| d.id().clone())?;
//! ```

pub mod attribute;
pub mod scattered;
pub mod template;

pub use scattered::{ScatteredAsset, ScatteredAssetAccessTemplate};
pub use template::{AssetAccessTemplate, AssetStream};
