//! Site directory
//!
//! Static lookup tables that address a remote workbook:
//! brand → SharePoint site, store code → directory segment.
//!
//! ```json
//! {
//!   "path_template": "Promotions/{segment}/Promotions.xlsx",
//!   "brands": {
//!     "acme": "acme.sharepoint.com:/sites/AcmePromotions",
//!     "globex": { "site_id": "globex.sharepoint.com,1111,2222" }
//!   },
//!   "stores": {
//!     "US": "United States",
//!     "AE": { "segment": "UAE", "worksheet_id": "{00000000-0001}" }
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default file path template, `{segment}` is replaced by the store segment
pub const DEFAULT_PATH_TEMPLATE: &str = "Promotions/{segment}/Promotions.xlsx";

/// How a brand maps to a site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SiteRef {
    /// Site id known up front, no lookup needed
    Direct { site_id: String },
    /// Site addressed by `hostname:/server-relative-path`
    UrlKey(String),
}

/// How a store code maps to a workbook location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoreLocation {
    /// Plain directory segment
    Segment(String),
    /// Segment plus an optional worksheet pinned for this store
    Descriptor {
        segment: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        worksheet_id: Option<String>,
    },
}

impl StoreLocation {
    pub fn segment(&self) -> &str {
        match self {
            StoreLocation::Segment(segment) => segment,
            StoreLocation::Descriptor { segment, .. } => segment,
        }
    }

    pub fn worksheet_override(&self) -> Option<&str> {
        match self {
            StoreLocation::Segment(_) => None,
            StoreLocation::Descriptor { worksheet_id, .. } => worksheet_id.as_deref(),
        }
    }
}

/// Brand and store lookup tables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteDirectory {
    #[serde(default = "default_path_template")]
    pub path_template: String,
    #[serde(default)]
    pub brands: HashMap<String, SiteRef>,
    #[serde(default)]
    pub stores: HashMap<String, StoreLocation>,
}

fn default_path_template() -> String {
    DEFAULT_PATH_TEMPLATE.to_string()
}

impl Default for SiteDirectory {
    fn default() -> Self {
        Self {
            path_template: default_path_template(),
            brands: HashMap::new(),
            stores: HashMap::new(),
        }
    }
}

impl SiteDirectory {
    /// Parse a directory from its JSON representation
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn with_path_template(mut self, template: impl Into<String>) -> Self {
        self.path_template = template.into();
        self
    }

    pub fn with_brand(mut self, brand: impl Into<String>, site: SiteRef) -> Self {
        self.brands.insert(brand.into(), site);
        self
    }

    pub fn with_store(mut self, store_code: impl Into<String>, location: StoreLocation) -> Self {
        self.stores.insert(store_code.into(), location);
        self
    }

    /// Site reference for a brand
    pub fn site_for_brand(&self, brand: &str) -> Option<&SiteRef> {
        self.brands.get(brand)
    }

    /// Workbook location for a store code
    pub fn store(&self, store_code: &str) -> Option<&StoreLocation> {
        self.stores.get(store_code)
    }

    /// Drive-relative file path for a store code
    pub fn file_path(&self, store_code: &str) -> Option<String> {
        self.store(store_code)
            .map(|location| self.path_template.replace("{segment}", location.segment()))
    }
}
