//! End-to-end resolution of aliases, web-referenceable assets and site
//! ownership over an in-memory repository

use folio_core::{AssetData, AssetId, FolioError, FormatError, InvalidAliasError, Row, SqlParam};
use folio_logging::EventCounterLayer;
use folio_storage::InMemoryRepository;
use folio_wra::{
    ASSET_PUBLICATION_STATEMENT, AliasProbe, AliasResolver, CoreFieldWraResolver, ResolverBuilder,
    SiteOwnershipResolver, WebReferenceableAssetResolver,
};
use tracing_subscriber::layer::SubscriberExt;

// ============================================================================
// Fixtures
// ============================================================================

const WRA_FIELDS: [&str; 7] = [
    "metatitle",
    "metadescription",
    "metakeyword",
    "h1title",
    "linktext",
    "path",
    "template",
];

fn site() -> InMemoryRepository {
    let repo = InMemoryRepository::new();
    repo.define_type("Page", WRA_FIELDS);
    repo.define_type(
        "GSTAlias",
        WRA_FIELDS
            .into_iter()
            .chain(["target", "target_url", "popup", "linkimage"]),
    );
    repo.define_type("Media", ["url"]);

    repo.insert(
        AssetData::new(AssetId::new("Page", 1))
            .with("name", "about")
            .with("description", "About us")
            .with("status", "PL")
            .with("metatitle", "Target Title")
            .with("h1title", "About Us")
            .with("path", "/about")
            .with("template", "Layout")
            .with("startdate", "2010-07-21 00:00:00"),
    )
    .unwrap();
    repo.insert(AssetData::new(AssetId::new("Media", 5)).with("url", "/logo.png"))
        .unwrap();
    repo
}

fn alias(repo: &InMemoryRepository, id: i64, build: impl FnOnce(AssetData) -> AssetData) -> AssetId {
    let alias_id = AssetId::new("GSTAlias", id);
    repo.insert(build(AssetData::new(alias_id.clone()))).unwrap();
    alias_id
}

fn with_counter<T>(counter: &EventCounterLayer, f: impl FnOnce() -> T) -> T {
    let subscriber = tracing_subscriber::registry().with(counter.clone());
    tracing::subscriber::with_default(subscriber, f)
}

// ============================================================================
// Web-referenceable assets
// ============================================================================

#[test]
fn test_link_text_falls_back_to_h1_title() {
    let repo = site();
    let id = alias(&repo, 10, |d| {
        d.with("target_url", "https://example.com")
            .with("linktext", "")
            .with("h1title", "Welcome")
    });

    let alias = AliasResolver::new(&repo).get_alias(&id).unwrap();
    assert_eq!(alias.fields().link_text.as_deref(), Some("Welcome"));

    let wra = CoreFieldWraResolver::new(&repo)
        .get_wra(&AssetId::new("Page", 1))
        .unwrap();
    assert_eq!(wra.fields.link_text.as_deref(), Some("About Us"));
    assert_eq!(wra.fields.description.as_deref(), Some("About us"));
}

#[test]
fn test_wra_of_non_renderable_asset() {
    let repo = site();
    let resolver = CoreFieldWraResolver::new(&repo);
    assert!(!resolver.is_web_referenceable(&AssetId::new("Media", 5)));
    assert!(resolver.get_wra(&AssetId::new("Media", 5)).is_err());
}

// ============================================================================
// Aliases
// ============================================================================

#[test]
fn test_delegated_alias_inherits_blank_fields() {
    let repo = site();
    let id = alias(&repo, 20, |d| d.with("name", "about-alias").with("metatitle", ""));
    repo.associate(&id, "target", &AssetId::new("Page", 1));

    let alias = AliasResolver::new(&repo).get_alias(&id).unwrap();
    assert!(!alias.is_external());
    assert_eq!(alias.target(), Some(&AssetId::new("Page", 1)));
    assert_eq!(alias.target_url(), None);

    let fields = alias.fields();
    assert_eq!(fields.meta_title.as_deref(), Some("Target Title"));
    assert_eq!(fields.path.as_deref(), Some("/about"));
    assert_eq!(fields.template.as_deref(), Some("Layout"));
    assert!(fields.start_date.is_some());
    // identity fields stay the alias's own
    assert_eq!(fields.name.as_deref(), Some("about-alias"));
    assert_eq!(fields.description, None);
    assert_eq!(fields.status, None);
}

#[test]
fn test_delegated_alias_own_field_wins() {
    let repo = site();
    let id = alias(&repo, 21, |d| d.with("metatitle", "Alias Title"));
    repo.associate(&id, "target", &AssetId::new("Page", 1));

    let alias = AliasResolver::new(&repo).get_alias(&id).unwrap();
    assert_eq!(alias.fields().meta_title.as_deref(), Some("Alias Title"));
    assert_eq!(alias.fields().h1_title.as_deref(), Some("About Us"));
}

#[test]
fn test_target_association_beats_target_url() {
    let repo = site();
    let id = alias(&repo, 22, |d| d.with("target_url", "https://example.com"));
    repo.associate(&id, "target", &AssetId::new("Page", 1));

    let alias = AliasResolver::new(&repo).get_alias(&id).unwrap();
    assert!(!alias.is_external());
}

#[test]
fn test_alias_without_any_target_is_invalid() {
    let repo = site();
    let id = alias(&repo, 30, |d| d.with("name", "dangling"));
    let resolver = AliasResolver::new(&repo);

    assert!(matches!(
        resolver.get_alias(&id),
        Err(FolioError::InvalidAlias(InvalidAliasError::NoTarget(_)))
    ));
    assert!(!resolver.is_alias(&id));
}

#[test]
fn test_alias_to_non_wra_target_is_invalid() {
    let repo = site();
    let id = alias(&repo, 31, |d| d);
    repo.associate(&id, "target", &AssetId::new("Media", 5));
    let resolver = AliasResolver::new(&repo);

    let err = resolver.get_alias(&id).unwrap_err();
    assert!(matches!(
        err,
        FolioError::InvalidAlias(InvalidAliasError::TargetNotWebReferenceable { ref target, .. })
            if *target == AssetId::new("Media", 5)
    ));
    assert!(matches!(resolver.probe(&id), AliasProbe::NotAlias(_)));
    assert!(!resolver.is_alias(&id));
}

#[test]
fn test_is_alias_agrees_with_get_alias() {
    let repo = site();
    let external = alias(&repo, 40, |d| d.with("target_url", "https://example.com"));
    let delegated = alias(&repo, 41, |d| d);
    repo.associate(&delegated, "target", &AssetId::new("Page", 1));
    let invalid = alias(&repo, 42, |d| d);

    let resolver = AliasResolver::new(&repo);
    for id in [external, delegated, invalid, AssetId::new("GSTAlias", 404)] {
        assert_eq!(resolver.is_alias(&id), resolver.get_alias(&id).is_ok(), "{}", id);
    }
}

#[test]
fn test_is_alias_warns_on_backend_failure() {
    let repo = site();
    let id = alias(&repo, 50, |d| d.with("target_url", "https://example.com"));
    let resolver = AliasResolver::new(&repo);
    repo.fail_reads("connection reset");

    let counter = EventCounterLayer::for_target("folio_wra");
    let answer = with_counter(&counter, || resolver.is_alias(&id));

    assert!(!answer);
    assert_eq!(counter.warnings(), 1);
    assert!(matches!(resolver.probe(&id), AliasProbe::Failed(ref e) if e.is_transient()));
}

#[test]
fn test_target_read_failure_reports_not_web_referenceable() {
    let repo = site();
    let id = alias(&repo, 52, |d| d);
    repo.associate(&id, "target", &AssetId::new("Page", 1));

    let targets = site();
    targets.fail_reads("connection reset");
    let resolver = AliasResolver::with_wra_resolver(&repo, CoreFieldWraResolver::new(&targets));

    assert!(matches!(
        resolver.probe(&id),
        AliasProbe::NotAlias(InvalidAliasError::TargetNotWebReferenceable { ref target, .. })
            if *target == AssetId::new("Page", 1)
    ));
    assert!(!resolver.is_alias(&id));
}

#[test]
fn test_is_alias_invalid_alias_does_not_warn() {
    let repo = site();
    let id = alias(&repo, 51, |d| d);
    let resolver = AliasResolver::new(&repo);

    let counter = EventCounterLayer::for_target("folio_wra");
    assert!(!with_counter(&counter, || resolver.is_alias(&id)));
    assert_eq!(counter.warnings(), 0);
}

// ============================================================================
// Site ownership
// ============================================================================

fn owned_by(repo: &InMemoryRepository, id: i64, sites: &[&str]) {
    repo.register_rows(
        ASSET_PUBLICATION_STATEMENT,
        vec![SqlParam::Text("Page".to_string()), SqlParam::Long(id)],
        sites.iter().map(|s| Row::new().with("name", *s)).collect(),
    );
}

#[test]
fn test_site_of_single_publication() {
    let repo = site();
    owned_by(&repo, 1, &["Site1"]);
    let resolver = SiteOwnershipResolver::new(&repo);

    let counter = EventCounterLayer::new();
    let found = with_counter(&counter, || resolver.resolve_site("Page", "1").unwrap());
    assert_eq!(found.as_deref(), Some("Site1"));
    assert_eq!(counter.warnings(), 0);
}

#[test]
fn test_site_of_unpublished_asset() {
    let repo = site();
    let resolver = SiteOwnershipResolver::new(&repo);
    assert_eq!(resolver.resolve_site("Page", "1").unwrap(), None);
}

#[test]
fn test_site_of_shared_asset_warns_once() {
    let repo = site();
    owned_by(&repo, 1, &["Site1", "Site2", "Site3"]);
    let resolver = SiteOwnershipResolver::new(&repo);

    let counter = EventCounterLayer::new();
    let found = with_counter(&counter, || resolver.resolve_site("Page", "1").unwrap());
    assert_eq!(found.as_deref(), Some("Site1"));
    assert_eq!(counter.warnings(), 1);
}

#[test]
fn test_site_of_non_numeric_id() {
    let repo = site();
    let resolver = SiteOwnershipResolver::new(&repo);
    assert!(matches!(
        resolver.resolve_site("Page", "abc"),
        Err(FolioError::Format(FormatError::InvalidNumericId(_)))
    ));
}

#[test]
fn test_site_of_padded_id_is_rejected() {
    let repo = site();
    owned_by(&repo, 1, &["Site1"]);
    let resolver = SiteOwnershipResolver::new(&repo);
    assert!(matches!(
        resolver.resolve_site("Page", " 1 "),
        Err(FolioError::Format(FormatError::InvalidNumericId(ref s))) if s == " 1 "
    ));
}

// ============================================================================
// Assembly
// ============================================================================

#[test]
fn test_builder_wires_shared_session() {
    let repo = site();
    owned_by(&repo, 1, &["Site1"]);
    let id = alias(&repo, 60, |d| d);
    repo.associate(&id, "points_to", &AssetId::new("Page", 1));

    let builder = ResolverBuilder::new()
        .session(&repo)
        .target_association("points_to");
    let aliases = builder.build_alias_resolver().unwrap();
    let sites = builder.build_site_resolver().unwrap();

    let alias = aliases.get_alias(&id).unwrap();
    let target = alias.target().unwrap();
    assert_eq!(sites.resolve_site_of(target).unwrap().as_deref(), Some("Site1"));
}

#[test]
fn test_alias_serializes_with_variant_tag() {
    let repo = site();
    let id = alias(&repo, 70, |d| d.with("target_url", "https://example.com"));
    let alias = AliasResolver::new(&repo).get_alias(&id).unwrap();

    let json = serde_json::to_value(&alias).unwrap();
    assert_eq!(json["External"]["target_url"], "https://example.com");
}
