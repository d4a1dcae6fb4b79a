//! Web-referenceable assets
//!
//! A web-referenceable asset (WRA) is any asset that can be rendered as a
//! page: it carries a path, a template and a fixed set of title and meta
//! fields. [`WebReferenceableAssetResolver`] turns an asset id into that
//! normalized view.

use chrono::{DateTime, Utc};
use folio_access::AssetAccessTemplate;
use folio_access::attribute::{as_date, get_with_fallback, string_of};
use folio_core::{AssetData, AssetId, FolioError, FormatError, Session};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Attributes read for a web-referenceable asset
pub const WRA_ATTRIBUTES: &[&str] = &[
    "metatitle",
    "metadescription",
    "metakeyword",
    "h1title",
    "linktext",
    "path",
    "template",
    "id",
    "name",
    "description",
    "subtype",
    "startdate",
    "enddate",
    "status",
];

/// Renderable fields shared by web-referenceable assets and aliases
///
/// Blank strings are normalized to `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreFields {
    pub name: Option<String>,
    pub description: Option<String>,
    pub subtype: Option<String>,
    pub status: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_keyword: Option<String>,
    pub h1_title: Option<String>,
    /// Falls back to `h1_title` when the asset has no link text of its own
    pub link_text: Option<String>,
    pub path: Option<String>,
    pub template: Option<String>,
}

impl CoreFields {
    /// Read the core fields of one asset
    ///
    /// # Errors
    ///
    /// Fails when `startdate` or `enddate` holds something that is not a date.
    pub fn from_asset_data(data: &AssetData) -> Result<Self, FormatError> {
        Ok(Self {
            name: get_with_fallback(data, &["name"]),
            description: non_blank(string_of(data, "description")),
            subtype: non_blank(string_of(data, "subtype")),
            status: non_blank(string_of(data, "status")),
            start_date: as_date(data.attribute("startdate"))?,
            end_date: as_date(data.attribute("enddate"))?,
            meta_title: get_with_fallback(data, &["metatitle"]),
            meta_description: get_with_fallback(data, &["metadescription"]),
            meta_keyword: get_with_fallback(data, &["metakeyword"]),
            h1_title: get_with_fallback(data, &["h1title"]),
            link_text: get_with_fallback(data, &["linktext", "h1title"]),
            path: get_with_fallback(data, &["path"]),
            template: get_with_fallback(data, &["template"]),
        })
    }

    /// Fill display fields this record lacks from another record
    ///
    /// Dates, meta fields, titles, link text, path and template are
    /// inherited; name, description, subtype and status never are.
    pub fn inherit_from(mut self, target: &CoreFields) -> Self {
        fn inherit<T: Clone>(own: &mut Option<T>, target: &Option<T>) {
            if own.is_none() {
                own.clone_from(target);
            }
        }

        inherit(&mut self.start_date, &target.start_date);
        inherit(&mut self.end_date, &target.end_date);
        inherit(&mut self.meta_title, &target.meta_title);
        inherit(&mut self.meta_description, &target.meta_description);
        inherit(&mut self.meta_keyword, &target.meta_keyword);
        inherit(&mut self.h1_title, &target.h1_title);
        inherit(&mut self.link_text, &target.link_text);
        inherit(&mut self.path, &target.path);
        inherit(&mut self.template, &target.template);
        self
    }
}

fn non_blank(s: Option<String>) -> Option<String> {
    s.filter(|s| !s.trim().is_empty())
}

/// An asset normalized to its renderable fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebReferenceableAsset {
    pub id: AssetId,
    pub fields: CoreFields,
}

/// Resolves assets into their web-referenceable view
pub trait WebReferenceableAssetResolver {
    /// The web-referenceable view of an asset
    ///
    /// # Errors
    ///
    /// Fails when the asset cannot be read or is not web-referenceable.
    fn get_wra(&self, id: &AssetId) -> Result<WebReferenceableAsset, FolioError>;

    /// Whether an asset can be resolved by [`get_wra`](Self::get_wra)
    ///
    /// Never fails; any uncertainty answers `false`.
    fn is_web_referenceable(&self, id: &AssetId) -> bool;
}

/// Resolver reading the core WRA attributes through an access template
///
/// An asset is web-referenceable when it exists and its type declares
/// every attribute in [`WRA_ATTRIBUTES`].
pub struct CoreFieldWraResolver<'s> {
    template: AssetAccessTemplate<'s>,
}

impl<'s> CoreFieldWraResolver<'s> {
    /// Create a resolver over a session
    pub fn new(session: &'s dyn Session) -> Self {
        Self {
            template: AssetAccessTemplate::new(session),
        }
    }
}

impl WebReferenceableAssetResolver for CoreFieldWraResolver<'_> {
    fn get_wra(&self, id: &AssetId) -> Result<WebReferenceableAsset, FolioError> {
        let data = self
            .template
            .read_one_projected_mapped(id, WRA_ATTRIBUTES, |data| data)?;
        Ok(WebReferenceableAsset {
            id: id.clone(),
            fields: CoreFields::from_asset_data(&data)?,
        })
    }

    fn is_web_referenceable(&self, id: &AssetId) -> bool {
        match self.template.read_one_projected(id, WRA_ATTRIBUTES) {
            Ok(found) => found.is_some(),
            Err(e) => {
                debug!(asset = %id, error = %e, "Asset is not web-referenceable");
                false
            }
        }
    }
}
