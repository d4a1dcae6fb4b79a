//! Repository collaborator traits
//!
//! Folio consumes these traits and never implements them outside of test
//! backends. A real deployment supplies a [`Session`] bound to its
//! repository connection; the session outlives every Folio component
//! that borrows it.
//!
//! All traits are synchronous: each call is one bounded round trip to the
//! backing repository. Timeouts, if any, belong to the connection.

use std::sync::Arc;

use crate::data::AssetData;
use crate::error::RepositoryAccessError;
use crate::id::AssetId;
use crate::query::Query;
use crate::sql::{RowIter, SqlParam, Statement};

/// Lazy sequence of query results, in repository order
///
/// A failed item ends the sequence for well-behaved consumers; see
/// `AssetStream` in `folio-access`.
pub type AssetIter<'a> = Box<dyn Iterator<Item = Result<AssetData, RepositoryAccessError>> + 'a>;

/// The repository's native read API
pub trait AssetDataManager {
    /// Read every listed asset with all of its attributes
    ///
    /// Ids with no backing data are skipped, so the result may be shorter
    /// than the input. Order follows the backend.
    fn read(&self, ids: &[AssetId]) -> Result<Vec<AssetData>, RepositoryAccessError>;

    /// Read one asset restricted to the named attributes
    ///
    /// Returns `Ok(None)` when the asset does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryAccessError::InvalidAttribute`] when any name is
    /// not an attribute of the asset's type.
    fn read_attributes(
        &self,
        id: &AssetId,
        attributes: &[&str],
    ) -> Result<Option<AssetData>, RepositoryAccessError>;

    /// Run a query, yielding matches lazily
    fn query<'a>(&'a self, query: &Query) -> Result<AssetIter<'a>, RepositoryAccessError>;
}

/// Named single-valued association lookup
pub trait AssociationLookup {
    /// The asset linked from `id` under `name`, if any
    fn single_association(
        &self,
        id: &AssetId,
        name: &str,
    ) -> Result<Option<AssetId>, RepositoryAccessError>;
}

/// Parameterized select over repository tables
pub trait SqlExecutor {
    /// Execute a select, yielding rows in backend order
    fn select<'a>(
        &'a self,
        statement: &Statement,
        params: &[SqlParam],
    ) -> Result<RowIter<'a>, RepositoryAccessError>;
}

/// A connection to the content repository
pub trait Session: AssociationLookup + SqlExecutor {
    /// Acquire the read manager for this session
    fn asset_data_manager(&self) -> Result<Arc<dyn AssetDataManager>, RepositoryAccessError>;
}
