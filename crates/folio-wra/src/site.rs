//! Site ownership
//!
//! Every non-alias asset belongs to a publication (site). Ownership lives in
//! the `AssetPublication` table, joined here to `Publication` for the site
//! name.
//!
//! An asset should belong to exactly one publication; aliases are the
//! sanctioned way to share content across sites. Direct multi-ownership is
//! tolerated with a warning, and the publication with the lowest id wins.

use folio_core::{
    AssetId, FolioError, Session, SqlExecutor, SqlParam, Statement, parse_numeric_id,
};
use tracing::{trace, warn};

/// Name under which the ownership statement is prepared
pub const ASSET_PUBLICATION_STATEMENT: &str = "AssetPublication.site";

/// Site names owning an asset, lowest publication id first
const ASSET_PUBLICATION_SQL: &str = "SELECT p.name FROM Publication p, AssetPublication ap \
     WHERE ap.assettype = ? AND ap.assetid = ? AND ap.pubid = p.id \
     ORDER BY p.id";

/// The prepared ownership statement
pub fn asset_publication_statement() -> Statement {
    Statement::new(
        ASSET_PUBLICATION_STATEMENT,
        ASSET_PUBLICATION_SQL,
        ["AssetPublication", "Publication"],
    )
}

/// Maps an asset to the site that owns it
pub struct SiteOwnershipResolver<'s> {
    session: &'s dyn Session,
    statement: Statement,
}

impl<'s> SiteOwnershipResolver<'s> {
    /// Create a resolver over a session
    pub fn new(session: &'s dyn Session) -> Self {
        Self {
            session,
            statement: asset_publication_statement(),
        }
    }

    /// Name of the site owning an asset
    ///
    /// Returns `Ok(None)` when the asset belongs to no publication. When it
    /// belongs to several, logs one warning and returns the first.
    ///
    /// # Errors
    ///
    /// Fails with a format error when `asset_id` is not numeric, and with a
    /// repository error when the select fails.
    pub fn resolve_site(&self, asset_type: &str, asset_id: &str) -> Result<Option<String>, FolioError> {
        let id = parse_numeric_id(asset_id)?;
        let params = [SqlParam::Text(asset_type.to_string()), SqlParam::Long(id)];
        let mut rows = self.session.select(&self.statement, &params)?;

        let Some(first) = rows.next().transpose()? else {
            trace!(asset_type, asset_id = id, "Asset belongs to no publication");
            return Ok(None);
        };
        let site = first.get_string("name").map(str::to_string);

        let mut additional = 0usize;
        for row in rows {
            row?;
            additional += 1;
        }
        if additional > 0 {
            warn!(
                asset_type,
                asset_id = id,
                site = ?site,
                additional,
                "Asset found in more than one publication; it should not be shared, aliases are for cross-site sharing. Using first site found"
            );
        }

        Ok(site)
    }

    /// Name of the site owning an asset
    pub fn resolve_site_of(&self, id: &AssetId) -> Result<Option<String>, FolioError> {
        self.resolve_site(id.asset_type(), &id.id().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::{FormatError, Row};
    use folio_storage::InMemoryRepository;

    fn owned_by(repo: &InMemoryRepository, asset_type: &str, id: i64, sites: &[&str]) {
        repo.register_rows(
            ASSET_PUBLICATION_STATEMENT,
            vec![SqlParam::Text(asset_type.to_string()), SqlParam::Long(id)],
            sites.iter().map(|s| Row::new().with("name", *s)).collect(),
        );
    }

    #[test]
    fn test_statement_shape() {
        let stmt = asset_publication_statement();
        assert_eq!(stmt.placeholder_count(), 2);
        assert!(stmt.sql.contains("ORDER BY p.id"));
    }

    #[test]
    fn test_single_owner() {
        let repo = InMemoryRepository::new();
        owned_by(&repo, "Page", 10, &["Site1"]);
        let resolver = SiteOwnershipResolver::new(&repo);
        assert_eq!(resolver.resolve_site("Page", "10").unwrap().as_deref(), Some("Site1"));
        assert_eq!(
            resolver.resolve_site_of(&AssetId::new("Page", 10)).unwrap().as_deref(),
            Some("Site1")
        );
    }

    #[test]
    fn test_no_owner() {
        let repo = InMemoryRepository::new();
        let resolver = SiteOwnershipResolver::new(&repo);
        assert_eq!(resolver.resolve_site("Page", "11").unwrap(), None);
    }

    #[test]
    fn test_non_numeric_id() {
        let repo = InMemoryRepository::new();
        let resolver = SiteOwnershipResolver::new(&repo);
        assert!(matches!(
            resolver.resolve_site("Page", "abc"),
            Err(FolioError::Format(FormatError::InvalidNumericId(_)))
        ));
    }

    #[test]
    fn test_select_failure_propagates() {
        let repo = InMemoryRepository::new();
        repo.fail_sql("db down");
        let resolver = SiteOwnershipResolver::new(&repo);
        assert!(matches!(
            resolver.resolve_site("Page", "1"),
            Err(FolioError::RepositoryAccess(_))
        ));
    }
}
