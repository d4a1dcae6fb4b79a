//! In-memory repository backend
//!
//! This module provides an in-memory implementation of the repository
//! collaborator traits, suitable for testing and simulation environments.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use folio_core::{
    AssetData, AssetDataManager, AssetId, AssetIter, AssociationLookup, AttributeValue,
    Query, RepositoryAccessError, Row, RowIter, Session, SqlExecutor, SqlParam, Statement,
};
use parking_lot::RwLock;
use tracing::{debug, trace};

/// Attributes every asset type carries without declaring them
pub const BASIC_ATTRIBUTES: &[&str] = &[
    "id",
    "name",
    "description",
    "subtype",
    "status",
    "startdate",
    "enddate",
];

/// Canned SQL results keyed by statement name and bound parameters
type RowKey = (String, Vec<SqlParam>);

/// Failures to inject into subsequent calls
#[derive(Debug, Default)]
struct Faults {
    /// Fail every asset read and association lookup
    read: Option<String>,
    /// Fail read manager acquisition
    manager: Option<String>,
    /// Fail query iteration after yielding this many items
    query_after: Option<(usize, String)>,
    /// Fail every SQL select
    sql: Option<String>,
}

#[derive(Debug, Default)]
struct RepositoryState {
    /// Declared attributes per asset type
    types: HashMap<String, BTreeSet<String>>,
    /// Assets in ascending id order
    assets: BTreeMap<AssetId, AssetData>,
    /// Named single-valued associations
    associations: HashMap<(AssetId, String), AssetId>,
    /// Canned select results
    rows: HashMap<RowKey, Vec<Row>>,
    faults: Faults,
}

impl RepositoryState {
    fn check_read(&self) -> Result<(), RepositoryAccessError> {
        match &self.faults.read {
            Some(message) => Err(RepositoryAccessError::backend(message.clone())),
            None => Ok(()),
        }
    }

    fn validate_attributes<S: AsRef<str>>(
        &self,
        asset_type: &str,
        attributes: &[S],
    ) -> Result<(), RepositoryAccessError> {
        let declared = self.types.get(asset_type).ok_or_else(|| {
            RepositoryAccessError::backend(format!("Unknown asset type: {}", asset_type))
        })?;

        for attribute in attributes {
            let attribute = attribute.as_ref();
            if !declared.contains(attribute) {
                return Err(RepositoryAccessError::invalid_attribute(asset_type, attribute));
            }
        }
        Ok(())
    }
}

/// In-memory implementation of [`Session`]
///
/// Cloning is cheap and yields a handle onto the same content. Mutators
/// take `&self` so fixtures can be adjusted while components hold a
/// borrowed session.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    state: Arc<RwLock<RepositoryState>>,
    /// Number of read managers handed out
    manager_acquisitions: Arc<AtomicUsize>,
}

impl InMemoryRepository {
    /// Create an empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an asset type and its attributes
    ///
    /// [`BASIC_ATTRIBUTES`] are always included. Redefining a type adds to
    /// its attribute set.
    pub fn define_type<'a>(&self, asset_type: &str, attributes: impl IntoIterator<Item = &'a str>) {
        let mut state = self.state.write();
        let declared = state.types.entry(asset_type.to_string()).or_default();
        declared.extend(BASIC_ATTRIBUTES.iter().map(|a| a.to_string()));
        declared.extend(attributes.into_iter().map(str::to_string));
        debug!(asset_type, attributes = declared.len(), "Defined asset type");
    }

    /// Store an asset, replacing any previous data for the same id
    ///
    /// The `id` attribute is filled in from the asset id when absent.
    ///
    /// # Errors
    ///
    /// Fails when the asset's type is undefined or the data carries an
    /// attribute the type does not declare.
    pub fn insert(&self, mut data: AssetData) -> Result<(), RepositoryAccessError> {
        let mut state = self.state.write();
        let names: Vec<String> = data.attribute_names().map(str::to_string).collect();
        state.validate_attributes(data.id().asset_type(), &names)?;

        if !data.has_attribute("id") {
            let id = data.id().id();
            data.set("id", AttributeValue::Integer(id));
        }

        trace!(asset = %data.id(), "Storing asset");
        state.assets.insert(data.id().clone(), data);
        Ok(())
    }

    /// Remove an asset and any associations from it
    pub fn remove(&self, id: &AssetId) -> Option<AssetData> {
        let mut state = self.state.write();
        state.associations.retain(|(from, _), _| from != id);
        state.assets.remove(id)
    }

    /// Link `from` to `to` under a named single-valued association
    pub fn associate(&self, from: &AssetId, name: &str, to: &AssetId) {
        trace!(from = %from, name, to = %to, "Adding association");
        self.state
            .write()
            .associations
            .insert((from.clone(), name.to_string()), to.clone());
    }

    /// Register the rows a statement returns for the given parameters
    ///
    /// Rows come back in the order given. Unregistered parameter sets
    /// select nothing.
    pub fn register_rows(&self, statement_name: &str, params: Vec<SqlParam>, rows: Vec<Row>) {
        self.state
            .write()
            .rows
            .insert((statement_name.to_string(), params), rows);
    }

    /// Make every asset read and association lookup fail
    pub fn fail_reads(&self, message: impl Into<String>) {
        self.state.write().faults.read = Some(message.into());
    }

    /// Make read manager acquisition fail
    pub fn fail_manager(&self, message: impl Into<String>) {
        self.state.write().faults.manager = Some(message.into());
    }

    /// Make query iteration fail after yielding `count` results
    pub fn fail_query_after(&self, count: usize, message: impl Into<String>) {
        self.state.write().faults.query_after = Some((count, message.into()));
    }

    /// Make every select fail
    pub fn fail_sql(&self, message: impl Into<String>) {
        self.state.write().faults.sql = Some(message.into());
    }

    /// Remove all injected faults
    pub fn clear_faults(&self) {
        self.state.write().faults = Faults::default();
    }

    /// Number of stored assets
    pub fn len(&self) -> usize {
        self.state.read().assets.len()
    }

    /// Whether no assets are stored
    pub fn is_empty(&self) -> bool {
        self.state.read().assets.is_empty()
    }

    /// Number of read managers handed out so far
    pub fn manager_acquisitions(&self) -> usize {
        self.manager_acquisitions.load(Ordering::SeqCst)
    }
}

impl AssociationLookup for InMemoryRepository {
    fn single_association(
        &self,
        id: &AssetId,
        name: &str,
    ) -> Result<Option<AssetId>, RepositoryAccessError> {
        let state = self.state.read();
        state.check_read()?;
        Ok(state
            .associations
            .get(&(id.clone(), name.to_string()))
            .cloned())
    }
}

impl SqlExecutor for InMemoryRepository {
    fn select<'a>(
        &'a self,
        statement: &Statement,
        params: &[SqlParam],
    ) -> Result<RowIter<'a>, RepositoryAccessError> {
        let state = self.state.read();
        if let Some(message) = &state.faults.sql {
            return Err(RepositoryAccessError::backend(message.clone()));
        }

        let expected = statement.placeholder_count();
        if params.len() != expected {
            return Err(RepositoryAccessError::backend(format!(
                "Statement {} expects {} parameters, got {}",
                statement.name,
                expected,
                params.len()
            )));
        }

        let rows = state
            .rows
            .get(&(statement.name.clone(), params.to_vec()))
            .cloned()
            .unwrap_or_default();
        trace!(statement = %statement.name, rows = rows.len(), "Executed select");
        Ok(Box::new(rows.into_iter().map(Ok)))
    }
}

impl Session for InMemoryRepository {
    fn asset_data_manager(&self) -> Result<Arc<dyn AssetDataManager>, RepositoryAccessError> {
        if let Some(message) = &self.state.read().faults.manager {
            return Err(RepositoryAccessError::ManagerUnavailable(message.clone()));
        }
        self.manager_acquisitions.fetch_add(1, Ordering::SeqCst);
        debug!("Handing out in-memory read manager");
        Ok(Arc::new(InMemoryDataManager {
            state: Arc::clone(&self.state),
        }))
    }
}

/// Read manager over an [`InMemoryRepository`]
///
/// Sees later changes to the repository it came from.
#[derive(Debug)]
pub struct InMemoryDataManager {
    state: Arc<RwLock<RepositoryState>>,
}

impl AssetDataManager for InMemoryDataManager {
    fn read(&self, ids: &[AssetId]) -> Result<Vec<AssetData>, RepositoryAccessError> {
        let state = self.state.read();
        state.check_read()?;
        let found: Vec<AssetData> = ids
            .iter()
            .filter_map(|id| state.assets.get(id).cloned())
            .collect();
        trace!(requested = ids.len(), found = found.len(), "Read assets");
        Ok(found)
    }

    fn read_attributes(
        &self,
        id: &AssetId,
        attributes: &[&str],
    ) -> Result<Option<AssetData>, RepositoryAccessError> {
        let state = self.state.read();
        state.check_read()?;
        state.validate_attributes(id.asset_type(), attributes)?;
        Ok(state.assets.get(id).map(|data| data.project(attributes)))
    }

    fn query<'a>(&'a self, query: &Query) -> Result<AssetIter<'a>, RepositoryAccessError> {
        let state = self.state.read();
        state.check_read()?;
        state.validate_attributes(&query.asset_type, &query.attributes)?;

        // Snapshot candidate ids; the data itself is read as the caller pulls.
        let candidates: Vec<AssetId> = state
            .assets
            .keys()
            .filter(|id| id.asset_type() == query.asset_type)
            .cloned()
            .collect();
        let fail_after = state.faults.query_after.clone();
        drop(state);

        trace!(asset_type = %query.asset_type, candidates = candidates.len(), "Running query");
        Ok(Box::new(QueryCursor {
            state: &self.state,
            query: query.clone(),
            candidates: candidates.into_iter(),
            yielded: 0,
            fail_after,
        }))
    }
}

/// Lazy evaluation of one query
struct QueryCursor<'a> {
    state: &'a RwLock<RepositoryState>,
    query: Query,
    candidates: std::vec::IntoIter<AssetId>,
    yielded: usize,
    fail_after: Option<(usize, String)>,
}

impl Iterator for QueryCursor<'_> {
    type Item = Result<AssetData, RepositoryAccessError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some((after, message)) = &self.fail_after
            && self.yielded >= *after
        {
            return Some(Err(RepositoryAccessError::backend(message.clone())));
        }

        for id in self.candidates.by_ref() {
            let state = self.state.read();
            let Some(data) = state.assets.get(&id) else {
                continue;
            };
            if !self.query.matches(data) {
                continue;
            }
            self.yielded += 1;
            let result = if self.query.attributes.is_empty() {
                data.clone()
            } else {
                data.project(&self.query.attributes)
            };
            return Some(Ok(result));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::Condition;

    fn repo_with_pages() -> InMemoryRepository {
        let repo = InMemoryRepository::new();
        repo.define_type("Page", ["path", "h1title"]);
        for (id, name) in [(3, "contact"), (1, "home"), (2, "about")] {
            repo.insert(
                AssetData::new(AssetId::new("Page", id))
                    .with("name", name)
                    .with("path", format!("/{}", name)),
            )
            .unwrap();
        }
        repo
    }

    #[test]
    fn test_insert_fills_id_attribute() {
        let repo = repo_with_pages();
        let manager = repo.asset_data_manager().unwrap();
        let data = manager.read(&[AssetId::new("Page", 1)]).unwrap();
        assert_eq!(data[0].attribute("id"), Some(&AttributeValue::Integer(1)));
    }

    #[test]
    fn test_insert_rejects_undeclared_attribute() {
        let repo = repo_with_pages();
        let err = repo
            .insert(AssetData::new(AssetId::new("Page", 9)).with("bogus", "x"))
            .unwrap_err();
        assert!(matches!(err, RepositoryAccessError::InvalidAttribute { .. }));
    }

    #[test]
    fn test_insert_rejects_unknown_type() {
        let repo = InMemoryRepository::new();
        let err = repo
            .insert(AssetData::new(AssetId::new("Nope", 1)))
            .unwrap_err();
        assert!(matches!(err, RepositoryAccessError::Backend(_)));
    }

    #[test]
    fn test_read_skips_missing_ids() {
        let repo = repo_with_pages();
        let manager = repo.asset_data_manager().unwrap();
        let data = manager
            .read(&[AssetId::new("Page", 2), AssetId::new("Page", 99)])
            .unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0].id(), &AssetId::new("Page", 2));
    }

    #[test]
    fn test_read_attributes_projects() {
        let repo = repo_with_pages();
        let manager = repo.asset_data_manager().unwrap();
        let data = manager
            .read_attributes(&AssetId::new("Page", 1), &["name"])
            .unwrap()
            .unwrap();
        assert!(data.has_attribute("name"));
        assert!(!data.has_attribute("path"));
    }

    #[test]
    fn test_read_attributes_invalid_name_fails_even_when_missing() {
        let repo = repo_with_pages();
        let manager = repo.asset_data_manager().unwrap();
        let err = manager
            .read_attributes(&AssetId::new("Page", 404), &["name", "bogus"])
            .unwrap_err();
        assert_eq!(err, RepositoryAccessError::invalid_attribute("Page", "bogus"));
    }

    #[test]
    fn test_query_returns_ascending_id_order() {
        let repo = repo_with_pages();
        let manager = repo.asset_data_manager().unwrap();
        let ids: Vec<i64> = manager
            .query(&Query::new("Page"))
            .unwrap()
            .map(|r| r.unwrap().id().id())
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_query_applies_conditions_and_projection() {
        let repo = repo_with_pages();
        let manager = repo.asset_data_manager().unwrap();
        let query = Query::new("Page")
            .with_condition(Condition::equals("name", "about"))
            .with_attributes(["id"]);
        let results: Vec<_> = manager.query(&query).unwrap().collect();
        assert_eq!(results.len(), 1);
        let data = results[0].as_ref().unwrap();
        assert_eq!(data.id(), &AssetId::new("Page", 2));
        assert!(!data.has_attribute("name"));
    }

    #[test]
    fn test_query_fault_after_items() {
        let repo = repo_with_pages();
        repo.fail_query_after(1, "connection reset");
        let manager = repo.asset_data_manager().unwrap();
        let mut iter = manager.query(&Query::new("Page")).unwrap();
        assert!(iter.next().unwrap().is_ok());
        assert!(iter.next().unwrap().is_err());
    }

    #[test]
    fn test_manager_sees_later_inserts() {
        let repo = repo_with_pages();
        let manager = repo.asset_data_manager().unwrap();
        repo.insert(AssetData::new(AssetId::new("Page", 4)).with("name", "blog"))
            .unwrap();
        assert_eq!(manager.read(&[AssetId::new("Page", 4)]).unwrap().len(), 1);
    }

    #[test]
    fn test_associations() {
        let repo = repo_with_pages();
        let alias = AssetId::new("GSTAlias", 10);
        let target = AssetId::new("Page", 1);
        repo.associate(&alias, "target", &target);

        assert_eq!(repo.single_association(&alias, "target").unwrap(), Some(target));
        assert_eq!(repo.single_association(&alias, "other").unwrap(), None);
    }

    #[test]
    fn test_read_fault() {
        let repo = repo_with_pages();
        repo.fail_reads("down");
        let manager = repo.asset_data_manager().unwrap();
        assert!(manager.read(&[AssetId::new("Page", 1)]).is_err());
        assert!(repo.single_association(&AssetId::new("Page", 1), "x").is_err());

        repo.clear_faults();
        assert!(manager.read(&[AssetId::new("Page", 1)]).is_ok());
    }

    #[test]
    fn test_manager_fault_and_counter() {
        let repo = repo_with_pages();
        repo.fail_manager("no manager");
        assert!(matches!(
            repo.asset_data_manager(),
            Err(RepositoryAccessError::ManagerUnavailable(_))
        ));
        assert_eq!(repo.manager_acquisitions(), 0);

        repo.clear_faults();
        repo.asset_data_manager().unwrap();
        assert_eq!(repo.manager_acquisitions(), 1);
    }

    #[test]
    fn test_select_registered_rows() {
        let repo = InMemoryRepository::new();
        let stmt = Statement::new("pubs", "SELECT name FROM t WHERE a = ? AND b = ?", ["t"]);
        let params = vec![SqlParam::Text("Page".into()), SqlParam::Long(1)];
        repo.register_rows("pubs", params.clone(), vec![Row::new().with("name", "Site1")]);

        let rows: Vec<_> = repo.select(&stmt, &params).unwrap().collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].as_ref().unwrap().get_string("name"), Some("Site1"));

        let other = vec![SqlParam::Text("Page".into()), SqlParam::Long(2)];
        assert_eq!(repo.select(&stmt, &other).unwrap().count(), 0);
    }

    #[test]
    fn test_select_checks_parameter_count() {
        let repo = InMemoryRepository::new();
        let stmt = Statement::new("pubs", "SELECT name FROM t WHERE a = ?", ["t"]);
        assert!(repo.select(&stmt, &[]).is_err());
    }
}
