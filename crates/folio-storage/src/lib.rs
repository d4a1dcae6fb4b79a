//! # Folio Storage
//!
//! Repository backends for Folio.
//!
//! Folio never talks to a repository directly; it goes through the
//! collaborator traits in `folio-core`. This crate provides a backend that
//! keeps everything in memory, suitable for tests, simulations and
//! embedding small content sets.
//!
//! ## Features
//!
//! - **InMemoryRepository**: Implements [`Session`], [`AssociationLookup`]
//!   and [`SqlExecutor`], and hands out an [`AssetDataManager`]
//! - **Type definitions**: Assets are validated against their type's
//!   attribute set, so projections with unknown names fail like a real
//!   repository would
//! - **Fault injection**: Reads, manager acquisition, queries and SQL can be
//!   made to fail on demand
//!
//! ## Example
//!
//! ```rust,ignore
//! use folio_core::{AssetData, AssetId, Session};
//! use folio_storage::InMemoryRepository;
//!
//! let repo = InMemoryRepository::new();
//! repo.define_type("Page", ["name", "path"]);
//! repo.insert(AssetData::new(AssetId::new("Page", 1)).with("name", "home"))
//!     .unwrap();
//!
//! let manager = repo.asset_data_manager().unwrap();
//! let found = manager.read(&[AssetId::new("Page", 1)]).unwrap();
//! assert_eq!(found.len(), 1);
//! ```

pub mod memory;

pub use memory::{InMemoryDataManager, InMemoryRepository};

// Re-export the collaborator traits for convenience
pub use folio_core::{AssetDataManager, AssociationLookup, Session, SqlExecutor};
