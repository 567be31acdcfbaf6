//! Endpoint selection.
//!
//! [`EndpointCatalog`] is an immutable table built once at gateway
//! construction: one management base URL plus one base URL per
//! [`DataCenter`] for the regional import/export service.

use std::collections::HashMap;

use crate::domain::DataCenter;
use crate::error::GatewayError;

/// Base URL of the management API.
pub const MANAGEMENT_URL: &str = "https://management.core.windows.net:8443";

/// Production regional endpoints of the import/export service.
pub const REGIONAL_ENDPOINTS: [(DataCenter, &str); 13] = [
    (
        DataCenter::EastAsia,
        "https://hkgprod-dacsvc.azure.com/DACWebService.svc",
    ),
    (
        DataCenter::SoutheastAsia,
        "https://sg1prod-dacsvc.azure.com/DACWebService.svc",
    ),
    (
        DataCenter::JapanWest,
        "https://os1-1prod-dacsvc.azure.com/dacwebservice.svc",
    ),
    (
        DataCenter::JapanEast,
        "https://kw1-1prod-dacsvc.azure.com/dacwebservice.svc",
    ),
    (
        DataCenter::CentralUs,
        "https://dm1-1prod-dacsvc.azure.com/dacwebservice.svc",
    ),
    (
        DataCenter::NorthCentralUs,
        "https://ch1prod-dacsvc.azure.com/DACWebService.svc",
    ),
    (
        DataCenter::SouthCentralUs,
        "https://sn1prod-dacsvc.azure.com/DACWebService.svc",
    ),
    (
        DataCenter::WestUs,
        "https://by1prod-dacsvc.azure.com/DACWebService.svc",
    ),
    (
        DataCenter::EastUs,
        "https://bl2prod-dacsvc.azure.com/DACWebService.svc",
    ),
    (
        DataCenter::EastUs2,
        "https://bn1prod-dacsvc.azure.com/dacwebservice.svc",
    ),
    (
        DataCenter::NorthEurope,
        "https://db3prod-dacsvc.azure.com/DACWebService.svc",
    ),
    (
        DataCenter::WestEurope,
        "https://am1prod-dacsvc.azure.com/DACWebService.svc",
    ),
    (
        DataCenter::BrazilSouth,
        "https://cq1-1prod-dacsvc.azure.com/dacwebservice.svc",
    ),
];

/// Immutable mapping from request scope to base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointCatalog {
    management: String,
    regions: HashMap<DataCenter, String>,
}

impl EndpointCatalog {
    /// Creates a catalogue with the given management URL and no regions.
    #[must_use]
    pub fn new(management: impl Into<String>) -> Self {
        Self {
            management: management.into(),
            regions: HashMap::new(),
        }
    }

    /// Sets the base URL for one region.
    #[must_use]
    pub fn with_region(mut self, region: DataCenter, url: impl Into<String>) -> Self {
        self.regions.insert(region, url.into());
        self
    }

    /// Removes one region from the catalogue.
    #[must_use]
    pub fn without_region(mut self, region: DataCenter) -> Self {
        self.regions.remove(&region);
        self
    }

    /// Replaces the management URL, keeping the regional table.
    #[must_use]
    pub fn with_management(mut self, url: impl Into<String>) -> Self {
        self.management = url.into();
        self
    }

    /// Returns the management base URL.
    #[must_use]
    pub fn management(&self) -> &str {
        &self.management
    }

    /// Selects the base URL for a request.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::UnconfiguredRegion`] if `region` has no entry.
    pub fn select_base(&self, region: Option<DataCenter>) -> Result<&str, GatewayError> {
        match region {
            None => Ok(&self.management),
            Some(dc) => self
                .regions
                .get(&dc)
                .map(String::as_str)
                .ok_or(GatewayError::UnconfiguredRegion(dc)),
        }
    }
}

impl Default for EndpointCatalog {
    fn default() -> Self {
        REGIONAL_ENDPOINTS
            .into_iter()
            .fold(Self::new(MANAGEMENT_URL), |catalog, (dc, url)| {
                catalog.with_region(dc, url)
            })
    }
}

/// Joins a base URL and a relative path with exactly one `/`.
#[must_use]
pub fn join(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        return base.to_string();
    }
    format!("{base}/{path}")
}
