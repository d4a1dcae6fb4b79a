//! Read-only asset access template
//!
//! [`AssetAccessTemplate`] is the single entry point for reading assets.
//! It hides the repository's native read API behind a small set of
//! operations: read one asset, read the results of a query, with or without
//! an attribute projection, and with an optional mapper or closure applied
//! to each result.
//!
//! Mappers are plain closures `FnOnce(AssetData) -> T` (or `FnMut` for
//! batches); closures are `FnMut(AssetData)` consumers.
//!
//! # Concurrency
//!
//! A template borrows its session and lazily acquires the session's read
//! manager on first use, keeping it for the template's lifetime. The
//! manager slot is a [`std::cell::OnceCell`], so a template is `!Sync`: it
//! cannot be shared between threads, and concurrent callers must each build
//! their own template over their own session.

use std::cell::OnceCell;
use std::iter::FusedIterator;
use std::slice;
use std::sync::Arc;

use folio_core::{
    AssetData, AssetDataManager, AssetId, AssetIter, Condition, FolioError, FormatError, Query,
    RepositoryAccessError, Session,
};
use tracing::{debug, trace};

/// Lazy sequence of query results
///
/// Yields results in repository order. After the first error the stream
/// ends; a failed read never yields partial data afterwards. Not
/// restartable.
pub struct AssetStream<'a> {
    inner: AssetIter<'a>,
    done: bool,
}

impl<'a> AssetStream<'a> {
    fn new(inner: AssetIter<'a>) -> Self {
        Self { inner, done: false }
    }
}

impl Iterator for AssetStream<'_> {
    type Item = Result<AssetData, RepositoryAccessError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.inner.next() {
            Some(Ok(data)) => Some(Ok(data)),
            Some(Err(e)) => {
                self.done = true;
                Some(Err(e))
            }
            None => {
                self.done = true;
                None
            }
        }
    }
}

impl FusedIterator for AssetStream<'_> {}

/// One-stop read-only access to asset data
pub struct AssetAccessTemplate<'s> {
    /// The caller's repository connection
    session: &'s dyn Session,
    /// Read manager, acquired on first use
    manager: OnceCell<Arc<dyn AssetDataManager>>,
}

impl<'s> AssetAccessTemplate<'s> {
    /// Create a template over a session
    ///
    /// No repository call is made until the first read.
    pub fn new(session: &'s dyn Session) -> Self {
        Self {
            session,
            manager: OnceCell::new(),
        }
    }

    /// The session this template reads through
    pub fn session(&self) -> &'s dyn Session {
        self.session
    }

    /// Build an asset id from a type and a textual numeric id
    pub fn create_asset_id(asset_type: &str, cid: &str) -> Result<AssetId, FormatError> {
        AssetId::parse(asset_type, cid)
    }

    /// Query selecting assets of a type by name, returning only their ids
    ///
    /// Uses the backend's basic-search path.
    pub fn build_name_query(asset_type: &str, name: &str) -> Query {
        Query::new(asset_type)
            .with_condition(Condition::equals("name", name))
            .with_attributes(["id"])
            .basic_search(true)
    }

    fn manager(&self) -> Result<&dyn AssetDataManager, RepositoryAccessError> {
        if let Some(manager) = self.manager.get() {
            return Ok(manager.as_ref());
        }
        let manager = self.session.asset_data_manager()?;
        debug!("Acquired asset data manager");
        Ok(self.manager.get_or_init(|| manager).as_ref())
    }

    /// Read one asset with all of its attributes
    ///
    /// Returns `Ok(None)` when nothing is found. Should the repository
    /// return several results, the first is kept and the rest discarded.
    pub fn read_one(&self, id: &AssetId) -> Result<Option<AssetData>, RepositoryAccessError> {
        let found = self.manager()?.read(slice::from_ref(id))?;
        if found.is_empty() {
            debug!(asset = %id, "No asset data found");
        }
        Ok(found.into_iter().next())
    }

    /// Read one asset restricted to the named attributes
    ///
    /// # Errors
    ///
    /// Fails with [`RepositoryAccessError::InvalidAttribute`] when a name
    /// is not an attribute of the asset's type.
    pub fn read_one_projected(
        &self,
        id: &AssetId,
        attributes: &[&str],
    ) -> Result<Option<AssetData>, RepositoryAccessError> {
        let found = self.manager()?.read_attributes(id, attributes)?;
        if found.is_none() {
            debug!(asset = %id, "No asset data found");
        }
        Ok(found)
    }

    /// Read one asset and transform it
    ///
    /// Equivalent to `read_one(id)?.map(mapper)`.
    pub fn read_one_mapped<T>(
        &self,
        id: &AssetId,
        mapper: impl FnOnce(AssetData) -> T,
    ) -> Result<Option<T>, RepositoryAccessError> {
        Ok(self.read_one(id)?.map(mapper))
    }

    /// [`read_one_mapped`](Self::read_one_mapped) addressed by type and
    /// textual numeric id
    ///
    /// # Errors
    ///
    /// Fails with [`FormatError::InvalidNumericId`] before any repository
    /// call when `cid` is not numeric.
    pub fn read_one_mapped_by<T>(
        &self,
        asset_type: &str,
        cid: &str,
        mapper: impl FnOnce(AssetData) -> T,
    ) -> Result<Option<T>, FolioError> {
        let id = Self::create_asset_id(asset_type, cid)?;
        Ok(self.read_one_mapped(&id, mapper)?)
    }

    /// Read one asset restricted to the named attributes and transform it
    ///
    /// Unlike the other single reads, a missing asset is an error here.
    ///
    /// # Errors
    ///
    /// Fails with [`RepositoryAccessError::NotFound`] when the asset does
    /// not exist, and with any error the projected read reports.
    pub fn read_one_projected_mapped<T>(
        &self,
        id: &AssetId,
        attributes: &[&str],
        mapper: impl FnOnce(AssetData) -> T,
    ) -> Result<T, RepositoryAccessError> {
        let data = self
            .manager()?
            .read_attributes(id, attributes)?
            .ok_or_else(|| RepositoryAccessError::NotFound(id.clone()))?;
        Ok(mapper(data))
    }

    /// Hand each result for `id` to a closure
    ///
    /// The closure runs zero or one times for a well-behaved repository,
    /// and once per result otherwise.
    pub fn read_one_with(
        &self,
        id: &AssetId,
        mut closure: impl FnMut(AssetData),
    ) -> Result<(), RepositoryAccessError> {
        for data in self.manager()?.read(slice::from_ref(id))? {
            closure(data);
        }
        Ok(())
    }

    /// Lazily read every asset matching a query
    ///
    /// Results come in repository order; there is no ordering guarantee
    /// beyond what the backend provides.
    pub fn read_many(&self, query: &Query) -> Result<AssetStream<'_>, RepositoryAccessError> {
        trace!(asset_type = %query.asset_type, conditions = query.conditions.len(), "Reading assets");
        let inner = self.manager()?.query(query)?;
        Ok(AssetStream::new(inner))
    }

    /// Hand each asset matching a query to a closure, in repository order
    ///
    /// Stops at the first failed item; the closure has already seen every
    /// item before it.
    pub fn read_many_with(
        &self,
        query: &Query,
        mut closure: impl FnMut(AssetData),
    ) -> Result<(), RepositoryAccessError> {
        for data in self.read_many(query)? {
            closure(data?);
        }
        Ok(())
    }

    /// Read and transform every asset matching a query
    ///
    /// Materializes all results, preserving repository order. Nothing is
    /// returned if any item fails.
    pub fn read_many_mapped<T>(
        &self,
        query: &Query,
        mut mapper: impl FnMut(AssetData) -> T,
    ) -> Result<Vec<T>, RepositoryAccessError> {
        self.read_many(query)?
            .map(|item| item.map(&mut mapper))
            .collect()
    }

    /// Find the id of an asset by type and name
    ///
    /// Names are not unique in the repository. When several assets share
    /// the name, the first one the repository returns wins.
    pub fn find_id_by_name(
        &self,
        asset_type: &str,
        name: &str,
    ) -> Result<Option<AssetId>, RepositoryAccessError> {
        let query = Self::build_name_query(asset_type, name);
        let first = self.read_many(&query)?.next().transpose()?;
        Ok(first.map(|data| data.id().clone()))
    }
}
