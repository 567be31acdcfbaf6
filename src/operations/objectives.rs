//! Service objectives (performance levels) and their dimension settings.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::resource::{ResourceHeader, resource_list_schema, resource_schema};
use super::{Operation, server_params};
use crate::codec::{Field, Record, Schema, WireMessage};
use crate::domain::Verb;
use crate::error::GatewayError;
use crate::routing::PathParams;

/// One dimension of a service objective.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionSetting {
    /// Common resource fields.
    #[serde(flatten)]
    pub header: ResourceHeader,
    /// Dimension id.
    pub id: Uuid,
    /// Description.
    pub description: Option<String>,
    /// Position among the objective's dimensions.
    pub ordinal: i32,
    /// Whether this is the default setting.
    pub is_default: bool,
}

impl DimensionSetting {
    fn read(record: &Record) -> Result<Self, GatewayError> {
        Ok(Self {
            header: ResourceHeader::read(record)?,
            id: record.get_as("Id")?,
            description: record.get_opt("Description")?,
            ordinal: record.get_as("Ordinal")?,
            is_default: record.get_as("IsDefault")?,
        })
    }

    fn write(&self) -> Record {
        let mut record = Record::new();
        self.header.write(&mut record);
        record.set("Id", &self.id);
        record.set_opt("Description", self.description.as_ref());
        record.set("Ordinal", &self.ordinal);
        record.set("IsDefault", &self.is_default);
        record
    }
}

/// A performance level a database can be assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceObjective {
    /// Common resource fields.
    #[serde(flatten)]
    pub header: ResourceHeader,
    /// Objective id, as used in `ServiceObjectiveId`.
    pub id: Uuid,
    /// Whether new databases get this objective by default.
    pub is_default: bool,
    /// Whether the objective is reserved for system use.
    pub is_system: bool,
    /// Description.
    pub description: Option<String>,
    /// Whether the objective can be assigned.
    pub enabled: bool,
    /// Dimensions of the objective.
    pub dimension_settings: Vec<DimensionSetting>,
}

impl ServiceObjective {
    fn read(record: &Record) -> Result<Self, GatewayError> {
        Ok(Self {
            header: ResourceHeader::read(record)?,
            id: record.get_as("Id")?,
            is_default: record.get_as("IsDefault")?,
            is_system: record.get_as("IsSystem")?,
            description: record.get_opt("Description")?,
            enabled: record.get_as("Enabled")?,
            dimension_settings: record.list_of("DimensionSettings", DimensionSetting::read)?,
        })
    }

    fn write(&self) -> Record {
        let mut record = Record::new();
        self.header.write(&mut record);
        record.set("Id", &self.id);
        record.set("IsDefault", &self.is_default);
        record.set("IsSystem", &self.is_system);
        record.set_opt("Description", self.description.as_ref());
        record.set("Enabled", &self.enabled);
        record.set_list(
            "DimensionSettings",
            self.dimension_settings
                .iter()
                .map(DimensionSetting::write)
                .collect(),
        );
        record
    }
}

static DIMENSION_SETTING: Schema = resource_schema![
    Field::required("Id"),
    Field::optional("Description"),
    Field::required("Ordinal"),
    Field::required("IsDefault"),
];

static DIMENSION_SETTINGS: Schema = resource_list_schema!(&DIMENSION_SETTING);

static SERVICE_OBJECTIVE: Schema = resource_schema![
    Field::required("Id"),
    Field::required("IsDefault"),
    Field::required("IsSystem"),
    Field::optional("Description"),
    Field::required("Enabled"),
    Field::array("DimensionSettings", "ServiceResource", &DIMENSION_SETTING),
];

static SERVICE_OBJECTIVES: Schema = resource_list_schema!(&SERVICE_OBJECTIVE);

impl WireMessage for DimensionSetting {
    fn schema() -> &'static Schema {
        &DIMENSION_SETTING
    }

    fn to_record(&self) -> Record {
        self.write()
    }

    fn from_record(record: &Record) -> Result<Self, GatewayError> {
        Self::read(record)
    }
}

/// Reply of [`ListDimensionSettings`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionSettings {
    /// Settings in service order.
    pub settings: Vec<DimensionSetting>,
}

impl WireMessage for DimensionSettings {
    fn schema() -> &'static Schema {
        &DIMENSION_SETTINGS
    }

    fn to_record(&self) -> Record {
        let mut record = Record::new();
        record.set_list(
            "ServiceResource",
            self.settings.iter().map(DimensionSetting::write).collect(),
        );
        record
    }

    fn from_record(record: &Record) -> Result<Self, GatewayError> {
        Ok(Self {
            settings: record.list_of("ServiceResource", DimensionSetting::read)?,
        })
    }
}

impl WireMessage for ServiceObjective {
    fn schema() -> &'static Schema {
        &SERVICE_OBJECTIVE
    }

    fn to_record(&self) -> Record {
        self.write()
    }

    fn from_record(record: &Record) -> Result<Self, GatewayError> {
        Self::read(record)
    }
}

/// Reply of [`ListServiceObjectives`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceObjectives {
    /// Objectives in service order.
    pub objectives: Vec<ServiceObjective>,
}

impl ServiceObjectives {
    /// Finds an objective by its display name, e.g. `S1`.
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<&ServiceObjective> {
        self.objectives.iter().find(|o| o.header.name == name)
    }
}

impl WireMessage for ServiceObjectives {
    fn schema() -> &'static Schema {
        &SERVICE_OBJECTIVES
    }

    fn to_record(&self) -> Record {
        let mut record = Record::new();
        record.set_list(
            "ServiceResource",
            self.objectives.iter().map(ServiceObjective::write).collect(),
        );
        record
    }

    fn from_record(record: &Record) -> Result<Self, GatewayError> {
        Ok(Self {
            objectives: record.list_of("ServiceResource", ServiceObjective::read)?,
        })
    }
}

/// Fetches one service objective of a server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetServiceObjective {
    /// Subscription id.
    pub subscription_id: String,
    /// Server name.
    pub server_name: String,
    /// Objective id.
    pub service_objective_id: Uuid,
}

impl Operation for GetServiceObjective {
    type Response = ServiceObjective;
    const NAME: &'static str = "GetServiceObjective";
    const VERB: Verb = Verb::Get;
    const ROUTE: &'static str =
        "/{SubscriptionId}/services/sqlservers/servers/{ServerName}/serviceobjectives/{ServiceObjectiveId}";

    fn path_params(&self) -> PathParams {
        server_params(&self.subscription_id, &self.server_name)
            .with("ServiceObjectiveId", self.service_objective_id.to_string())
    }
}

/// Lists the service objectives a server offers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListServiceObjectives {
    /// Subscription id.
    pub subscription_id: String,
    /// Server name.
    pub server_name: String,
}

impl Operation for ListServiceObjectives {
    type Response = ServiceObjectives;
    const NAME: &'static str = "ListServiceObjectives";
    const VERB: Verb = Verb::Get;
    const ROUTE: &'static str =
        "/{SubscriptionId}/services/sqlservers/servers/{ServerName}/serviceobjectives";

    fn path_params(&self) -> PathParams {
        server_params(&self.subscription_id, &self.server_name)
    }
}

/// Fetches one dimension setting of a server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetDimensionSetting {
    /// Subscription id.
    pub subscription_id: String,
    /// Server name.
    pub server_name: String,
    /// Dimension setting id.
    pub dimension_setting_id: Uuid,
}

impl Operation for GetDimensionSetting {
    type Response = DimensionSetting;
    const NAME: &'static str = "GetDimensionSetting";
    const VERB: Verb = Verb::Get;
    const ROUTE: &'static str =
        "/{SubscriptionId}/services/sqlservers/servers/{ServerName}/dimensionsettings/{DimensionSettingId}";

    fn path_params(&self) -> PathParams {
        server_params(&self.subscription_id, &self.server_name)
            .with("DimensionSettingId", self.dimension_setting_id.to_string())
    }
}

/// Lists the dimension settings of a server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListDimensionSettings {
    /// Subscription id.
    pub subscription_id: String,
    /// Server name.
    pub server_name: String,
}

impl Operation for ListDimensionSettings {
    type Response = DimensionSettings;
    const NAME: &'static str = "ListDimensionSettings";
    const VERB: Verb = Verb::Get;
    const ROUTE: &'static str =
        "/{SubscriptionId}/services/sqlservers/servers/{ServerName}/dimensionsettings";

    fn path_params(&self) -> PathParams {
        server_params(&self.subscription_id, &self.server_name)
    }
}
