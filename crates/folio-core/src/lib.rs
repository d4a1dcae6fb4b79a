//! # Folio Core
//!
//! Core types, errors, and collaborator traits for the Folio content-asset
//! access layer.
//!
//! Folio sits in front of a remote content repository and offers read-only
//! access to its assets. This crate holds the vocabulary every other Folio
//! crate shares, plus the traits a repository backend must implement.
//!
//! ## Key Traits
//!
//! - [`Session`]: A connection to the repository, supplying the read manager,
//!   association lookups and parameterized SQL
//! - [`AssetDataManager`]: Batch and projected asset reads, by id and by query
//! - [`AssociationLookup`]: Single-valued named association lookup
//! - [`SqlExecutor`]: Parameterized select with row iteration
//!
//! ## Key Types
//!
//! - [`AssetId`]: Identity of one content item, `(type, numeric id)`
//! - [`AssetData`]: An untyped bag of attributes for one asset
//! - [`AttributeValue`]: A raw attribute value awaiting coercion
//! - [`Query`]: Asset type, filter conditions and requested attributes

pub mod data;
pub mod error;
pub mod id;
pub mod query;
pub mod sql;
pub mod traits;
pub mod value;

// Re-export main types
pub use data::*;
pub use error::*;
pub use id::*;
pub use query::*;
pub use sql::*;
pub use traits::*;
pub use value::*;
