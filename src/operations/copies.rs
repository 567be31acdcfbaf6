//! Database copies: one-off and continuous copies between servers.
//!
//! A copy is addressed by its link id, the `Name` of the copy resource as
//! returned by [`StartDatabaseCopy`], [`GetDatabaseCopy`] or
//! [`ListDatabaseCopies`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::resource::{ResourceHeader, resource_list_schema, resource_schema};
use super::{Body, MANAGEMENT_NS, Operation, server_params};
use crate::codec::{Field, NoContent, Record, Schema, WireMessage};
use crate::domain::Verb;
use crate::error::GatewayError;
use crate::routing::PathParams;

/// A copy relationship as reported by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseCopy {
    /// Common resource fields; `name` is the link id.
    #[serde(flatten)]
    pub header: ResourceHeader,
    /// Server of the source database.
    pub source_server_name: String,
    /// Source database.
    pub source_database_name: String,
    /// Server of the copy.
    pub destination_server_name: String,
    /// The copy.
    pub destination_database_name: String,
    /// Whether commits keep flowing to the copy.
    pub is_continuous: bool,
    /// Whether the copy is an offline secondary.
    pub is_offline_secondary: bool,
    /// Whether the relationship may be terminated.
    pub is_termination_allowed: bool,
    /// Start of the copy.
    pub start_date: Option<DateTime<Utc>>,
    /// Last change of the relationship.
    pub modify_date: Option<DateTime<Utc>>,
    /// Seeding progress.
    pub percent_complete: i32,
    /// 0 pending, 1 seeding, 2 catch-up, 4 terminated.
    pub replication_state: i32,
    /// Description of `replication_state`.
    pub replication_state_description: Option<String>,
    /// Id of the local database in `sys.databases`.
    pub location_database_id: i64,
    /// Whether the local database is the copy.
    pub is_local_database_replication_target: bool,
    /// Whether the interlink is connected.
    pub is_interlink_connected: bool,
}

impl DatabaseCopy {
    /// Returns `true` once the relationship is terminated.
    #[must_use]
    pub const fn is_terminated(&self) -> bool {
        self.replication_state == 4
    }

    fn read(record: &Record) -> Result<Self, GatewayError> {
        Ok(Self {
            header: ResourceHeader::read(record)?,
            source_server_name: record.get_as("SourceServerName")?,
            source_database_name: record.get_as("SourceDatabaseName")?,
            destination_server_name: record.get_as("DestinationServerName")?,
            destination_database_name: record.get_as("DestinationDatabaseName")?,
            is_continuous: record.get_as("IsContinuous")?,
            is_offline_secondary: record.get_as("IsOfflineSecondary")?,
            is_termination_allowed: record.get_as("IsTerminationAllowed")?,
            start_date: record.get_opt("StartDate")?,
            modify_date: record.get_opt("ModifyDate")?,
            percent_complete: record.get_as("PercentComplete")?,
            replication_state: record.get_as("ReplicationState")?,
            replication_state_description: record.get_opt("ReplicationStateDescription")?,
            location_database_id: record.get_as("LocationDatabaseId")?,
            is_local_database_replication_target: record
                .get_as("IsLocalDatabaseReplicationTarget")?,
            is_interlink_connected: record.get_as("IsInterlinkConnected")?,
        })
    }

    fn write(&self) -> Record {
        let mut record = Record::new();
        self.header.write(&mut record);
        record.set("SourceServerName", &self.source_server_name);
        record.set("SourceDatabaseName", &self.source_database_name);
        record.set("DestinationServerName", &self.destination_server_name);
        record.set("DestinationDatabaseName", &self.destination_database_name);
        record.set("IsContinuous", &self.is_continuous);
        record.set("IsOfflineSecondary", &self.is_offline_secondary);
        record.set("IsTerminationAllowed", &self.is_termination_allowed);
        record.set_opt("StartDate", self.start_date.as_ref());
        record.set_opt("ModifyDate", self.modify_date.as_ref());
        record.set("PercentComplete", &self.percent_complete);
        record.set("ReplicationState", &self.replication_state);
        record.set_opt(
            "ReplicationStateDescription",
            self.replication_state_description.as_ref(),
        );
        record.set("LocationDatabaseId", &self.location_database_id);
        record.set(
            "IsLocalDatabaseReplicationTarget",
            &self.is_local_database_replication_target,
        );
        record.set("IsInterlinkConnected", &self.is_interlink_connected);
        record
    }
}

static DATABASE_COPY: Schema = resource_schema![
    Field::required("SourceServerName"),
    Field::required("SourceDatabaseName"),
    Field::required("DestinationServerName"),
    Field::required("DestinationDatabaseName"),
    Field::required("IsContinuous"),
    Field::required("IsOfflineSecondary"),
    Field::required("IsTerminationAllowed"),
    Field::optional("StartDate"),
    Field::optional("ModifyDate"),
    Field::required("PercentComplete"),
    Field::required("ReplicationState"),
    Field::optional("ReplicationStateDescription"),
    Field::required("LocationDatabaseId"),
    Field::required("IsLocalDatabaseReplicationTarget"),
    Field::required("IsInterlinkConnected"),
];

static DATABASE_COPIES: Schema = resource_list_schema!(&DATABASE_COPY);

impl WireMessage for DatabaseCopy {
    fn schema() -> &'static Schema {
        &DATABASE_COPY
    }

    fn to_record(&self) -> Record {
        self.write()
    }

    fn from_record(record: &Record) -> Result<Self, GatewayError> {
        Self::read(record)
    }
}

/// Reply of [`ListDatabaseCopies`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseCopies {
    /// Copies in service order.
    pub copies: Vec<DatabaseCopy>,
}

impl WireMessage for DatabaseCopies {
    fn schema() -> &'static Schema {
        &DATABASE_COPIES
    }

    fn to_record(&self) -> Record {
        let mut record = Record::new();
        record.set_list(
            "ServiceResource",
            self.copies.iter().map(DatabaseCopy::write).collect(),
        );
        record
    }

    fn from_record(record: &Record) -> Result<Self, GatewayError> {
        Ok(Self {
            copies: record.list_of("ServiceResource", DatabaseCopy::read)?,
        })
    }
}

/// Body of [`StartDatabaseCopy`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopySpec {
    /// Server to copy to.
    pub destination_server_name: String,
    /// Name of the copy.
    pub destination_database_name: String,
    /// Keep replicating after seeding.
    pub is_continuous: Option<bool>,
    /// Create the copy as an offline secondary.
    pub is_offline_secondary: Option<bool>,
}

static COPY_SPEC: Schema = Schema {
    root: "ServiceResource",
    namespace: Some(MANAGEMENT_NS),
    fields: &[
        Field::required("DestinationServerName"),
        Field::required("DestinationDatabaseName"),
        Field::optional("IsContinuous"),
        Field::optional("IsOfflineSecondary"),
    ],
};

impl WireMessage for CopySpec {
    fn schema() -> &'static Schema {
        &COPY_SPEC
    }

    fn to_record(&self) -> Record {
        let mut record = Record::new()
            .with("DestinationServerName", &self.destination_server_name)
            .with("DestinationDatabaseName", &self.destination_database_name);
        record.set_opt("IsContinuous", self.is_continuous.as_ref());
        record.set_opt("IsOfflineSecondary", self.is_offline_secondary.as_ref());
        record
    }

    fn from_record(record: &Record) -> Result<Self, GatewayError> {
        Ok(Self {
            destination_server_name: record.get_as("DestinationServerName")?,
            destination_database_name: record.get_as("DestinationDatabaseName")?,
            is_continuous: record.get_opt("IsContinuous")?,
            is_offline_secondary: record.get_opt("IsOfflineSecondary")?,
        })
    }
}

/// Body of [`UpdateDatabaseCopy`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyUpdate {
    /// Terminate a continuous copy without waiting for catch-up.
    pub is_forced_terminate: Option<bool>,
}

static COPY_UPDATE: Schema = Schema {
    root: "ServiceResource",
    namespace: Some(MANAGEMENT_NS),
    fields: &[Field::optional("IsForcedTerminate")],
};

impl WireMessage for CopyUpdate {
    fn schema() -> &'static Schema {
        &COPY_UPDATE
    }

    fn to_record(&self) -> Record {
        let mut record = Record::new();
        record.set_opt("IsForcedTerminate", self.is_forced_terminate.as_ref());
        record
    }

    fn from_record(record: &Record) -> Result<Self, GatewayError> {
        Ok(Self {
            is_forced_terminate: record.get_opt("IsForcedTerminate")?,
        })
    }
}

fn copy_params(subscription_id: &str, server_name: &str, database_name: &str) -> PathParams {
    server_params(subscription_id, server_name).with("DatabaseName", database_name)
}

/// Fetches one copy relationship of a database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetDatabaseCopy {
    /// Subscription id.
    pub subscription_id: String,
    /// Hosting server.
    pub server_name: String,
    /// Source or destination database.
    pub database_name: String,
    /// Link id of the copy.
    pub link_id: String,
}

impl Operation for GetDatabaseCopy {
    type Response = DatabaseCopy;
    const NAME: &'static str = "GetDatabaseCopy";
    const VERB: Verb = Verb::Get;
    const ROUTE: &'static str = "/{SubscriptionId}/services/sqlservers/servers/{ServerName}/databases/{DatabaseName}/databasecopies/{LinkID}";

    fn path_params(&self) -> PathParams {
        copy_params(&self.subscription_id, &self.server_name, &self.database_name)
            .with("LinkID", self.link_id.as_str())
    }
}

/// Lists the copy relationships of a database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListDatabaseCopies {
    /// Subscription id.
    pub subscription_id: String,
    /// Hosting server.
    pub server_name: String,
    /// Source or destination database.
    pub database_name: String,
}

impl Operation for ListDatabaseCopies {
    type Response = DatabaseCopies;
    const NAME: &'static str = "ListDatabaseCopies";
    const VERB: Verb = Verb::Get;
    const ROUTE: &'static str = "/{SubscriptionId}/services/sqlservers/servers/{ServerName}/databases/{DatabaseName}/databasecopies";

    fn path_params(&self) -> PathParams {
        copy_params(&self.subscription_id, &self.server_name, &self.database_name)
    }
}

/// Starts copying a database to another server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartDatabaseCopy {
    /// Subscription id.
    pub subscription_id: String,
    /// Server of the source database.
    pub server_name: String,
    /// Source database.
    pub database_name: String,
    /// Destination of the copy.
    pub copy: CopySpec,
}

impl Operation for StartDatabaseCopy {
    type Response = DatabaseCopy;
    const NAME: &'static str = "StartDatabaseCopy";
    const VERB: Verb = Verb::Post;
    const ROUTE: &'static str = "/{SubscriptionId}/services/sqlservers/servers/{ServerName}/databases/{DatabaseName}/databasecopies";

    fn path_params(&self) -> PathParams {
        copy_params(&self.subscription_id, &self.server_name, &self.database_name)
    }

    fn body(&self) -> Option<Body> {
        Some(Body::of(&self.copy))
    }
}

/// Changes a copy relationship, e.g. to force termination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateDatabaseCopy {
    /// Subscription id.
    pub subscription_id: String,
    /// Hosting server.
    pub server_name: String,
    /// Source or destination database.
    pub database_name: String,
    /// Link id of the copy.
    pub link_id: String,
    /// New settings.
    pub update: CopyUpdate,
}

impl Operation for UpdateDatabaseCopy {
    type Response = DatabaseCopy;
    const NAME: &'static str = "UpdateDatabaseCopy";
    const VERB: Verb = Verb::Put;
    const ROUTE: &'static str = "/{SubscriptionId}/services/sqlservers/servers/{ServerName}/databases/{DatabaseName}/databasecopies/{LinkID}";

    fn path_params(&self) -> PathParams {
        copy_params(&self.subscription_id, &self.server_name, &self.database_name)
            .with("LinkID", self.link_id.as_str())
    }

    fn body(&self) -> Option<Body> {
        Some(Body::of(&self.update))
    }
}

/// Stops a copy and removes the relationship.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopDatabaseCopy {
    /// Subscription id.
    pub subscription_id: String,
    /// Hosting server.
    pub server_name: String,
    /// Source or destination database.
    pub database_name: String,
    /// Link id of the copy.
    pub link_id: String,
}

impl Operation for StopDatabaseCopy {
    type Response = NoContent;
    const NAME: &'static str = "StopDatabaseCopy";
    const VERB: Verb = Verb::Delete;
    const ROUTE: &'static str = "/{SubscriptionId}/services/sqlservers/servers/{ServerName}/databases/{DatabaseName}/databasecopies/{LinkID}";

    fn path_params(&self) -> PathParams {
        copy_params(&self.subscription_id, &self.server_name, &self.database_name)
            .with("LinkID", self.link_id.as_str())
    }
}
