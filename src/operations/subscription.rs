//! Subscription metadata: quotas and the server versions, editions and
//! service objectives available to a subscription.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::resource::{ResourceHeader, resource_schema};
use super::{Operation, subscription_params};
use crate::codec::{Field, Record, Schema, WireMessage};
use crate::domain::Verb;
use crate::error::GatewayError;
use crate::routing::PathParams;

/// Fetches the metadata of a subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetSubscriptionMetadata {
    /// Subscription id.
    pub subscription_id: String,
}

impl Operation for GetSubscriptionMetadata {
    type Response = SubscriptionMetadata;
    const NAME: &'static str = "GetSubscriptionMetadata";
    const VERB: Verb = Verb::Get;
    const ROUTE: &'static str = "/{SubscriptionId}/services/sqlservers/subscriptioninfo";

    fn path_params(&self) -> PathParams {
        subscription_params(&self.subscription_id)
    }
}

/// Size limit offered by a service objective.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaxSize {
    /// Magnitude.
    pub value: i64,
    /// Unit, e.g. `Gigabytes`.
    pub unit: String,
    /// Whether this is the default size.
    pub is_default: bool,
}

/// Performance level of a service objective.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceLevel {
    /// Magnitude.
    pub value: i64,
    /// Unit, e.g. `DTU`.
    pub unit: String,
}

/// A service level objective within an edition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceLevelObjective {
    /// Objective name, e.g. `S1`.
    pub name: String,
    /// Whether this is the edition's default.
    pub is_default: bool,
    /// Objective id.
    pub id: Uuid,
    /// Available maximum sizes.
    pub max_sizes: Vec<MaxSize>,
    /// Performance level, when reported.
    pub performance_level: Option<PerformanceLevel>,
}

/// A database edition within a server version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edition {
    /// Edition name, e.g. `Standard`.
    pub name: String,
    /// Whether this is the version's default.
    pub is_default: bool,
    /// Objectives offered by the edition.
    pub service_level_objectives: Vec<ServiceLevelObjective>,
}

/// A server version available to the subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerVersion {
    /// Version name, e.g. `12.0`.
    pub name: String,
    /// Whether new servers get this version by default.
    pub is_default: bool,
    /// Editions offered by the version.
    pub editions: Vec<Edition>,
}

/// Reply of [`GetSubscriptionMetadata`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionMetadata {
    /// Common resource fields.
    #[serde(flatten)]
    pub header: ResourceHeader,
    /// Maximum databases per server.
    pub database_quota: i64,
    /// Subscription id.
    pub id: Uuid,
    /// Maximum servers per subscription.
    pub server_quota: i64,
    /// Whether a free database is still available.
    pub has_free_database: bool,
    /// Comma-separated locations the subscription may deploy to.
    pub locations: Option<String>,
    /// Server versions.
    pub versions: Vec<ServerVersion>,
}

static MAX_SIZE: Schema = Schema {
    root: "MaxSize",
    namespace: None,
    fields: &[
        Field::required("Value"),
        Field::required("Unit"),
        Field::required("IsDefault"),
    ],
};

static PERFORMANCE_LEVEL: Schema = Schema {
    root: "PerformanceLevel",
    namespace: None,
    fields: &[Field::required("Value"), Field::required("Unit")],
};

static OBJECTIVE: Schema = Schema {
    root: "ServiceLevelObjective",
    namespace: None,
    fields: &[
        Field::required("Name"),
        Field::required("IsDefault"),
        Field::required("ID"),
        Field::array("MaxSizes", "MaxSize", &MAX_SIZE),
        Field::nested("PerformanceLevel", &PERFORMANCE_LEVEL).or_absent(),
    ],
};

static EDITION: Schema = Schema {
    root: "Edition",
    namespace: None,
    fields: &[
        Field::required("Name"),
        Field::required("IsDefault"),
        Field::array("ServiceLevelObjectives", "ServiceLevelObjective", &OBJECTIVE),
    ],
};

static VERSION: Schema = Schema {
    root: "Version",
    namespace: None,
    fields: &[
        Field::required("Name"),
        Field::required("IsDefault"),
        Field::array("Editions", "Edition", &EDITION),
    ],
};

static METADATA: Schema = resource_schema![
    Field::required("DatabaseQuota"),
    Field::required("Id"),
    Field::required("ServerQuota"),
    Field::required("HasFreeDatabase"),
    Field::optional("Locations"),
    Field::array("Versions", "Version", &VERSION),
];

impl MaxSize {
    fn read(record: &Record) -> Result<Self, GatewayError> {
        Ok(Self {
            value: record.get_as("Value")?,
            unit: record.get_as("Unit")?,
            is_default: record.get_as("IsDefault")?,
        })
    }

    fn write(&self) -> Record {
        Record::new()
            .with("Value", &self.value)
            .with("Unit", &self.unit)
            .with("IsDefault", &self.is_default)
    }
}

impl ServiceLevelObjective {
    fn read(record: &Record) -> Result<Self, GatewayError> {
        let performance_level = match record.get("PerformanceLevel") {
            Some(_) => {
                let level = record.record("PerformanceLevel")?;
                Some(PerformanceLevel {
                    value: level.get_as("Value")?,
                    unit: level.get_as("Unit")?,
                })
            }
            None => None,
        };
        Ok(Self {
            name: record.get_as("Name")?,
            is_default: record.get_as("IsDefault")?,
            id: record.get_as("ID")?,
            max_sizes: record.list_of("MaxSizes", MaxSize::read)?,
            performance_level,
        })
    }

    fn write(&self) -> Record {
        let mut record = Record::new()
            .with("Name", &self.name)
            .with("IsDefault", &self.is_default)
            .with("ID", &self.id);
        record.set_list("MaxSizes", self.max_sizes.iter().map(MaxSize::write).collect());
        if let Some(level) = &self.performance_level {
            record.set_record(
                "PerformanceLevel",
                Record::new()
                    .with("Value", &level.value)
                    .with("Unit", &level.unit),
            );
        }
        record
    }
}

impl Edition {
    fn read(record: &Record) -> Result<Self, GatewayError> {
        Ok(Self {
            name: record.get_as("Name")?,
            is_default: record.get_as("IsDefault")?,
            service_level_objectives: record
                .list_of("ServiceLevelObjectives", ServiceLevelObjective::read)?,
        })
    }

    fn write(&self) -> Record {
        let mut record = Record::new()
            .with("Name", &self.name)
            .with("IsDefault", &self.is_default);
        record.set_list(
            "ServiceLevelObjectives",
            self.service_level_objectives
                .iter()
                .map(ServiceLevelObjective::write)
                .collect(),
        );
        record
    }
}

impl ServerVersion {
    fn read(record: &Record) -> Result<Self, GatewayError> {
        Ok(Self {
            name: record.get_as("Name")?,
            is_default: record.get_as("IsDefault")?,
            editions: record.list_of("Editions", Edition::read)?,
        })
    }

    fn write(&self) -> Record {
        let mut record = Record::new()
            .with("Name", &self.name)
            .with("IsDefault", &self.is_default);
        record.set_list("Editions", self.editions.iter().map(Edition::write).collect());
        record
    }
}

impl SubscriptionMetadata {
    /// Returns the default server version, if one is flagged.
    #[must_use]
    pub fn default_version(&self) -> Option<&ServerVersion> {
        self.versions.iter().find(|v| v.is_default)
    }
}

impl WireMessage for SubscriptionMetadata {
    fn schema() -> &'static Schema {
        &METADATA
    }

    fn to_record(&self) -> Record {
        let mut record = Record::new();
        self.header.write(&mut record);
        record.set("DatabaseQuota", &self.database_quota);
        record.set("Id", &self.id);
        record.set("ServerQuota", &self.server_quota);
        record.set("HasFreeDatabase", &self.has_free_database);
        record.set_opt("Locations", self.locations.as_ref());
        record.set_list(
            "Versions",
            self.versions.iter().map(ServerVersion::write).collect(),
        );
        record
    }

    fn from_record(record: &Record) -> Result<Self, GatewayError> {
        Ok(Self {
            header: ResourceHeader::read(record)?,
            database_quota: record.get_as("DatabaseQuota")?,
            id: record.get_as("Id")?,
            server_quota: record.get_as("ServerQuota")?,
            has_free_database: record.get_as("HasFreeDatabase")?,
            locations: record.get_opt("Locations")?,
            versions: record.list_of("Versions", ServerVersion::read)?,
        })
    }
}
