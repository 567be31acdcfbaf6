//! Region identifiers for region-scoped operations.
//!
//! [`DataCenter`] names a geographic deployment zone. Only the regional
//! import/export operations carry one; everything else targets the
//! management endpoint.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Geographic deployment zone.
///
/// The wire form is the display name with spaces (`"East US 2"`), both in
/// XML bodies and in serde output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DataCenter {
    /// East Asia (Hong Kong).
    #[serde(rename = "East Asia")]
    EastAsia,
    /// Southeast Asia (Singapore).
    #[serde(rename = "Southeast Asia")]
    SoutheastAsia,
    /// Japan West (Osaka).
    #[serde(rename = "Japan West")]
    JapanWest,
    /// Japan East (Tokyo).
    #[serde(rename = "Japan East")]
    JapanEast,
    /// Central US (Iowa).
    #[serde(rename = "Central US")]
    CentralUs,
    /// North Central US (Illinois).
    #[serde(rename = "North Central US")]
    NorthCentralUs,
    /// South Central US (Texas).
    #[serde(rename = "South Central US")]
    SouthCentralUs,
    /// West US (California).
    #[serde(rename = "West US")]
    WestUs,
    /// East US (Virginia).
    #[serde(rename = "East US")]
    EastUs,
    /// East US 2 (Virginia).
    #[serde(rename = "East US 2")]
    EastUs2,
    /// North Europe (Ireland).
    #[serde(rename = "North Europe")]
    NorthEurope,
    /// West Europe (Netherlands).
    #[serde(rename = "West Europe")]
    WestEurope,
    /// Brazil South (Sao Paulo State).
    #[serde(rename = "Brazil South")]
    BrazilSouth,
}

impl DataCenter {
    /// Every supported region, in catalogue order.
    pub const ALL: [Self; 13] = [
        Self::EastAsia,
        Self::SoutheastAsia,
        Self::JapanWest,
        Self::JapanEast,
        Self::CentralUs,
        Self::NorthCentralUs,
        Self::SouthCentralUs,
        Self::WestUs,
        Self::EastUs,
        Self::EastUs2,
        Self::NorthEurope,
        Self::WestEurope,
        Self::BrazilSouth,
    ];

    /// Returns the wire name of the region.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::EastAsia => "East Asia",
            Self::SoutheastAsia => "Southeast Asia",
            Self::JapanWest => "Japan West",
            Self::JapanEast => "Japan East",
            Self::CentralUs => "Central US",
            Self::NorthCentralUs => "North Central US",
            Self::SouthCentralUs => "South Central US",
            Self::WestUs => "West US",
            Self::EastUs => "East US",
            Self::EastUs2 => "East US 2",
            Self::NorthEurope => "North Europe",
            Self::WestEurope => "West Europe",
            Self::BrazilSouth => "Brazil South",
        }
    }
}

impl fmt::Display for DataCenter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataCenter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|dc| dc.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("unknown region: {wanted}"))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trips_every_region() {
        for dc in DataCenter::ALL {
            assert_eq!(dc.as_str().parse::<DataCenter>(), Ok(dc));
        }
    }

    #[test]
    fn parse_ignores_case_and_padding() {
        assert_eq!(" east us 2 ".parse::<DataCenter>(), Ok(DataCenter::EastUs2));
    }

    #[test]
    fn parse_rejects_unknown() {
        assert!("Mars North".parse::<DataCenter>().is_err());
    }

    #[test]
    fn serde_uses_wire_name() {
        let Ok(json) = serde_json::to_string(&DataCenter::NorthCentralUs) else {
            panic!("serialization failed");
        };
        assert_eq!(json, "\"North Central US\"");
    }
}
