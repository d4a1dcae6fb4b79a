//! Map-style asset views
//!
//! A [`ScatteredAsset`] wraps one asset's data with typed getters, for
//! callers that want to poke at attributes by name without writing a
//! mapper. [`ScatteredAssetAccessTemplate`] reads assets straight into that
//! view.

use chrono::{DateTime, Utc};
use folio_core::{AssetData, AssetId, AttributeValue, FolioError, FormatError, Session};

use crate::attribute;
use crate::template::AssetAccessTemplate;

/// One asset's attributes with typed accessors
#[derive(Debug, Clone, PartialEq)]
pub struct ScatteredAsset {
    data: AssetData,
}

impl ScatteredAsset {
    /// Wrap asset data
    pub fn new(data: AssetData) -> Self {
        Self { data }
    }

    /// The asset id
    pub fn id(&self) -> &AssetId {
        self.data.id()
    }

    /// The raw value of an attribute
    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.data.attribute(name)
    }

    /// An attribute as text
    pub fn get_string(&self, name: &str) -> Option<String> {
        attribute::as_string(self.get(name))
    }

    /// An attribute as a date
    pub fn get_date(&self, name: &str) -> Result<Option<DateTime<Utc>>, FormatError> {
        attribute::as_date(self.get(name))
    }

    /// An attribute as an integer
    pub fn get_long(&self, name: &str) -> Result<Option<i64>, FormatError> {
        attribute::as_long(self.get(name))
    }

    /// An attribute as an asset reference
    pub fn get_asset_id(&self, name: &str) -> Result<Option<AssetId>, FormatError> {
        attribute::as_asset_id(self.get(name))
    }

    /// Names of the attributes present
    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.data.attribute_names()
    }

    /// Unwrap into the underlying data
    pub fn into_inner(self) -> AssetData {
        self.data
    }
}

impl From<AssetData> for ScatteredAsset {
    fn from(data: AssetData) -> Self {
        Self::new(data)
    }
}

/// Access template whose reads produce [`ScatteredAsset`]s
pub struct ScatteredAssetAccessTemplate<'s> {
    template: AssetAccessTemplate<'s>,
}

impl<'s> ScatteredAssetAccessTemplate<'s> {
    /// Create a template over a session
    pub fn new(session: &'s dyn Session) -> Self {
        Self {
            template: AssetAccessTemplate::new(session),
        }
    }

    /// Read one asset with all attributes
    pub fn read(&self, id: &AssetId) -> Result<Option<ScatteredAsset>, FolioError> {
        Ok(self.template.read_one_mapped(id, ScatteredAsset::new)?)
    }

    /// Read one asset by textual id, restricted to the named attributes
    ///
    /// # Errors
    ///
    /// Fails with a format error for a non-numeric `cid`, and with
    /// `NotFound` when the asset does not exist.
    pub fn read_current(
        &self,
        asset_type: &str,
        cid: &str,
        attributes: &[&str],
    ) -> Result<ScatteredAsset, FolioError> {
        let id = AssetAccessTemplate::create_asset_id(asset_type, cid)?;
        Ok(self
            .template
            .read_one_projected_mapped(&id, attributes, ScatteredAsset::new)?)
    }

    /// The underlying general-purpose template
    pub fn template(&self) -> &AssetAccessTemplate<'s> {
        &self.template
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::RepositoryAccessError;
    use folio_storage::InMemoryRepository;

    fn repo() -> InMemoryRepository {
        let repo = InMemoryRepository::new();
        repo.define_type("Article", ["headline", "byline", "related"]);
        repo.insert(
            AssetData::new(AssetId::new("Article", 5))
                .with("name", "launch")
                .with("headline", "We launched")
                .with("startdate", "2011-01-02 03:04:05")
                .with("related", AssetId::new("Article", 6)),
        )
        .unwrap();
        repo
    }

    #[test]
    fn test_read_typed_getters() {
        let repo = repo();
        let template = ScatteredAssetAccessTemplate::new(&repo);
        let asset = template.read(&AssetId::new("Article", 5)).unwrap().unwrap();

        assert_eq!(asset.get_string("headline").as_deref(), Some("We launched"));
        assert_eq!(asset.get_long("id").unwrap(), Some(5));
        assert!(asset.get_date("startdate").unwrap().is_some());
        assert_eq!(
            asset.get_asset_id("related").unwrap(),
            Some(AssetId::new("Article", 6))
        );
        assert!(asset.get("byline").is_none());
    }

    #[test]
    fn test_read_missing_is_none() {
        let repo = repo();
        let template = ScatteredAssetAccessTemplate::new(&repo);
        assert!(template.read(&AssetId::new("Article", 404)).unwrap().is_none());
    }

    #[test]
    fn test_read_current_projects() {
        let repo = repo();
        let template = ScatteredAssetAccessTemplate::new(&repo);
        let asset = template
            .read_current("Article", "5", &["headline"])
            .unwrap();
        let names: Vec<_> = asset.attribute_names().collect();
        assert_eq!(names, vec!["headline"]);
    }

    #[test]
    fn test_read_current_errors() {
        let repo = repo();
        let template = ScatteredAssetAccessTemplate::new(&repo);

        assert!(matches!(
            template.read_current("Article", "five", &["headline"]),
            Err(FolioError::Format(_))
        ));
        assert!(matches!(
            template.read_current("Article", "404", &["headline"]),
            Err(FolioError::RepositoryAccess(RepositoryAccessError::NotFound(_)))
        ));
    }
}
