//! Server quotas.

use serde::{Deserialize, Serialize};

use super::resource::{ResourceHeader, resource_list_schema, resource_schema};
use super::{Operation, server_params};
use crate::codec::{Field, Record, Schema, WireMessage};
use crate::domain::Verb;
use crate::error::GatewayError;
use crate::routing::PathParams;

/// A named quota and its value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quota {
    /// Common resource fields; the name is the quota name.
    #[serde(flatten)]
    pub header: ResourceHeader,
    /// Quota value.
    pub value: i64,
}

static QUOTA: Schema = resource_schema![Field::required("Value")];

static QUOTAS: Schema = resource_list_schema!(&QUOTA);

impl Quota {
    fn read(record: &Record) -> Result<Self, GatewayError> {
        Ok(Self {
            header: ResourceHeader::read(record)?,
            value: record.get_as("Value")?,
        })
    }

    fn write(&self) -> Record {
        let mut record = Record::new();
        self.header.write(&mut record);
        record.set("Value", &self.value);
        record
    }
}

impl WireMessage for Quota {
    fn schema() -> &'static Schema {
        &QUOTA
    }

    fn to_record(&self) -> Record {
        self.write()
    }

    fn from_record(record: &Record) -> Result<Self, GatewayError> {
        Self::read(record)
    }
}

/// Reply of [`ListQuotas`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quotas {
    /// Quotas in service order.
    pub quotas: Vec<Quota>,
}

impl Quotas {
    /// Returns the value of the quota named `name`.
    #[must_use]
    pub fn value_of(&self, name: &str) -> Option<i64> {
        self.quotas
            .iter()
            .find(|q| q.header.name == name)
            .map(|q| q.value)
    }
}

impl WireMessage for Quotas {
    fn schema() -> &'static Schema {
        &QUOTAS
    }

    fn to_record(&self) -> Record {
        let mut record = Record::new();
        record.set_list(
            "ServiceResource",
            self.quotas.iter().map(Quota::write).collect(),
        );
        record
    }

    fn from_record(record: &Record) -> Result<Self, GatewayError> {
        Ok(Self {
            quotas: record.list_of("ServiceResource", Quota::read)?,
        })
    }
}

/// Fetches one quota of a server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetQuota {
    /// Subscription id.
    pub subscription_id: String,
    /// Server name.
    pub server_name: String,
    /// Quota name, e.g. `Premium_Databases`.
    pub quota_name: String,
}

impl Operation for GetQuota {
    type Response = Quota;
    const NAME: &'static str = "GetQuota";
    const VERB: Verb = Verb::Get;
    const ROUTE: &'static str =
        "/{SubscriptionId}/services/sqlservers/servers/{ServerName}/serverquotas/{QuotaName}";

    fn path_params(&self) -> PathParams {
        server_params(&self.subscription_id, &self.server_name)
            .with("QuotaName", self.quota_name.as_str())
    }
}

/// Lists the quotas of a server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuotas {
    /// Subscription id.
    pub subscription_id: String,
    /// Server name.
    pub server_name: String,
}

impl Operation for ListQuotas {
    type Response = Quotas;
    const NAME: &'static str = "ListQuotas";
    const VERB: Verb = Verb::Get;
    const ROUTE: &'static str =
        "/{SubscriptionId}/services/sqlservers/servers/{ServerName}/serverquotas";

    fn path_params(&self) -> PathParams {
        server_params(&self.subscription_id, &self.server_name)
    }
}
