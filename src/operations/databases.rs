//! Database operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::resource::{ResourceHeader, resource_list_schema, resource_schema};
use super::{Body, MANAGEMENT_NS, Operation, server_params};
use crate::codec::{Field, NoContent, Record, Schema, WireMessage};
use crate::domain::Verb;
use crate::error::GatewayError;
use crate::routing::PathParams;

/// Body of [`CreateDatabase`] and [`UpdateDatabase`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSpec {
    /// Database name. On update, the new name.
    pub name: String,
    /// Edition, e.g. `Standard`.
    pub edition: Option<String>,
    /// Collation; only honoured on create.
    pub collation_name: Option<String>,
    /// Size cap in bytes.
    pub max_size_bytes: Option<i64>,
    /// Performance level to assign.
    pub service_objective_id: Option<Uuid>,
}

static DATABASE_SPEC: Schema = Schema {
    root: "ServiceResource",
    namespace: Some(MANAGEMENT_NS),
    fields: &[
        Field::required("Name"),
        Field::optional("Edition"),
        Field::optional("CollationName"),
        Field::optional("MaxSizeBytes"),
        Field::optional("ServiceObjectiveId"),
    ],
};

impl DatabaseSpec {
    /// A definition carrying only a name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl WireMessage for DatabaseSpec {
    fn schema() -> &'static Schema {
        &DATABASE_SPEC
    }

    fn to_record(&self) -> Record {
        let mut record = Record::new().with("Name", &self.name);
        record.set_opt("Edition", self.edition.as_ref());
        record.set_opt("CollationName", self.collation_name.as_ref());
        record.set_opt("MaxSizeBytes", self.max_size_bytes.as_ref());
        record.set_opt("ServiceObjectiveId", self.service_objective_id.as_ref());
        record
    }

    fn from_record(record: &Record) -> Result<Self, GatewayError> {
        Ok(Self {
            name: record.get_as("Name")?,
            edition: record.get_opt("Edition")?,
            collation_name: record.get_opt("CollationName")?,
            max_size_bytes: record.get_opt("MaxSizeBytes")?,
            service_objective_id: record.get_opt("ServiceObjectiveId")?,
        })
    }
}

/// A database as reported by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Database {
    /// Common resource fields.
    #[serde(flatten)]
    pub header: ResourceHeader,
    /// Numeric database id.
    pub id: i64,
    /// Edition.
    pub edition: String,
    /// Size cap in gigabytes.
    pub max_size_gb: i64,
    /// Collation.
    pub collation_name: String,
    /// Creation time.
    pub creation_date: DateTime<Utc>,
    /// Whether the database is a federation root.
    pub is_federation_root: bool,
    /// Whether this is a system database such as `master`.
    pub is_system_object: bool,
    /// Current size in megabytes.
    pub size_mb: Option<String>,
    /// Size cap in bytes.
    pub max_size_bytes: Option<i64>,
    /// Requested performance level.
    pub service_objective_id: Option<Uuid>,
    /// Performance level currently in effect.
    pub assigned_service_objective_id: Option<Uuid>,
    /// Progress of the last objective assignment.
    pub service_objective_assignment_state: Option<i32>,
    /// Description of the assignment state.
    pub service_objective_assignment_state_description: Option<String>,
    /// Completion time of the last successful assignment.
    pub service_objective_assignment_success_date: Option<DateTime<Utc>>,
    /// Earliest restore point.
    pub recovery_period_start_date: Option<DateTime<Utc>>,
}

static DATABASE: Schema = resource_schema![
    Field::required("Id"),
    Field::required("Edition"),
    Field::required("MaxSizeGB"),
    Field::required("CollationName"),
    Field::required("CreationDate"),
    Field::required("IsFederationRoot"),
    Field::required("IsSystemObject"),
    Field::optional("SizeMB"),
    Field::optional("MaxSizeBytes"),
    Field::optional("ServiceObjectiveId"),
    Field::optional("AssignedServiceObjectiveId"),
    Field::optional("ServiceObjectiveAssignmentState"),
    Field::optional("ServiceObjectiveAssignmentStateDescription"),
    Field::optional("ServiceObjectiveAssignmentSuccessDate"),
    Field::optional("RecoveryPeriodStartDate"),
];

static DATABASES: Schema = resource_list_schema!(&DATABASE);

impl Database {
    fn read(record: &Record) -> Result<Self, GatewayError> {
        Ok(Self {
            header: ResourceHeader::read(record)?,
            id: record.get_as("Id")?,
            edition: record.get_as("Edition")?,
            max_size_gb: record.get_as("MaxSizeGB")?,
            collation_name: record.get_as("CollationName")?,
            creation_date: record.get_as("CreationDate")?,
            is_federation_root: record.get_as("IsFederationRoot")?,
            is_system_object: record.get_as("IsSystemObject")?,
            size_mb: record.get_opt("SizeMB")?,
            max_size_bytes: record.get_opt("MaxSizeBytes")?,
            service_objective_id: record.get_opt("ServiceObjectiveId")?,
            assigned_service_objective_id: record.get_opt("AssignedServiceObjectiveId")?,
            service_objective_assignment_state: record
                .get_opt("ServiceObjectiveAssignmentState")?,
            service_objective_assignment_state_description: record
                .get_opt("ServiceObjectiveAssignmentStateDescription")?,
            service_objective_assignment_success_date: record
                .get_opt("ServiceObjectiveAssignmentSuccessDate")?,
            recovery_period_start_date: record.get_opt("RecoveryPeriodStartDate")?,
        })
    }

    fn write(&self) -> Record {
        let mut record = Record::new();
        self.header.write(&mut record);
        record.set("Id", &self.id);
        record.set("Edition", &self.edition);
        record.set("MaxSizeGB", &self.max_size_gb);
        record.set("CollationName", &self.collation_name);
        record.set("CreationDate", &self.creation_date);
        record.set("IsFederationRoot", &self.is_federation_root);
        record.set("IsSystemObject", &self.is_system_object);
        record.set_opt("SizeMB", self.size_mb.as_ref());
        record.set_opt("MaxSizeBytes", self.max_size_bytes.as_ref());
        record.set_opt("ServiceObjectiveId", self.service_objective_id.as_ref());
        record.set_opt(
            "AssignedServiceObjectiveId",
            self.assigned_service_objective_id.as_ref(),
        );
        record.set_opt(
            "ServiceObjectiveAssignmentState",
            self.service_objective_assignment_state.as_ref(),
        );
        record.set_opt(
            "ServiceObjectiveAssignmentStateDescription",
            self.service_objective_assignment_state_description.as_ref(),
        );
        record.set_opt(
            "ServiceObjectiveAssignmentSuccessDate",
            self.service_objective_assignment_success_date.as_ref(),
        );
        record.set_opt(
            "RecoveryPeriodStartDate",
            self.recovery_period_start_date.as_ref(),
        );
        record
    }
}

impl WireMessage for Database {
    fn schema() -> &'static Schema {
        &DATABASE
    }

    fn to_record(&self) -> Record {
        self.write()
    }

    fn from_record(record: &Record) -> Result<Self, GatewayError> {
        Self::read(record)
    }
}

/// Reply of [`ListDatabases`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Databases {
    /// Databases in service order.
    pub databases: Vec<Database>,
}

impl WireMessage for Databases {
    fn schema() -> &'static Schema {
        &DATABASES
    }

    fn to_record(&self) -> Record {
        let mut record = Record::new();
        record.set_list(
            "ServiceResource",
            self.databases.iter().map(Database::write).collect(),
        );
        record
    }

    fn from_record(record: &Record) -> Result<Self, GatewayError> {
        Ok(Self {
            databases: record.list_of("ServiceResource", Database::read)?,
        })
    }
}

/// Creates a database on a server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateDatabase {
    /// Subscription id.
    pub subscription_id: String,
    /// Hosting server.
    pub server_name: String,
    /// Database definition.
    pub database: DatabaseSpec,
}

impl Operation for CreateDatabase {
    type Response = Database;
    const NAME: &'static str = "CreateDatabase";
    const VERB: Verb = Verb::Post;
    const ROUTE: &'static str = "/{SubscriptionId}/services/sqlservers/servers/{ServerName}/databases";

    fn path_params(&self) -> PathParams {
        server_params(&self.subscription_id, &self.server_name)
    }

    fn body(&self) -> Option<Body> {
        Some(Body::of(&self.database))
    }
}

/// Fetches one database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetDatabase {
    /// Subscription id.
    pub subscription_id: String,
    /// Hosting server.
    pub server_name: String,
    /// Database name.
    pub database_name: String,
}

impl Operation for GetDatabase {
    type Response = Database;
    const NAME: &'static str = "GetDatabase";
    const VERB: Verb = Verb::Get;
    const ROUTE: &'static str =
        "/{SubscriptionId}/services/sqlservers/servers/{ServerName}/databases/{DatabaseName}";

    fn path_params(&self) -> PathParams {
        server_params(&self.subscription_id, &self.server_name)
            .with("DatabaseName", self.database_name.as_str())
    }
}

/// Lists the databases of a server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListDatabases {
    /// Subscription id.
    pub subscription_id: String,
    /// Hosting server.
    pub server_name: String,
}

impl Operation for ListDatabases {
    type Response = Databases;
    const NAME: &'static str = "ListDatabases";
    const VERB: Verb = Verb::Get;
    const ROUTE: &'static str =
        "/{SubscriptionId}/services/sqlservers/servers/{ServerName}/databases?contentview=generic";

    fn path_params(&self) -> PathParams {
        server_params(&self.subscription_id, &self.server_name)
    }
}

/// Changes a database's name, edition, size or performance level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateDatabase {
    /// Subscription id.
    pub subscription_id: String,
    /// Hosting server.
    pub server_name: String,
    /// Current database name.
    pub database_name: String,
    /// New settings.
    pub database: DatabaseSpec,
}

impl Operation for UpdateDatabase {
    type Response = Database;
    const NAME: &'static str = "UpdateDatabase";
    const VERB: Verb = Verb::Put;
    const ROUTE: &'static str =
        "/{SubscriptionId}/services/sqlservers/servers/{ServerName}/databases/{DatabaseName}";

    fn path_params(&self) -> PathParams {
        server_params(&self.subscription_id, &self.server_name)
            .with("DatabaseName", self.database_name.as_str())
    }

    fn body(&self) -> Option<Body> {
        Some(Body::of(&self.database))
    }
}

/// Deletes a database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteDatabase {
    /// Subscription id.
    pub subscription_id: String,
    /// Hosting server.
    pub server_name: String,
    /// Database name.
    pub database_name: String,
}

impl Operation for DeleteDatabase {
    type Response = NoContent;
    const NAME: &'static str = "DeleteDatabase";
    const VERB: Verb = Verb::Delete;
    const ROUTE: &'static str =
        "/{SubscriptionId}/services/sqlservers/servers/{ServerName}/databases/{DatabaseName}";

    fn path_params(&self) -> PathParams {
        server_params(&self.subscription_id, &self.server_name)
            .with("DatabaseName", self.database_name.as_str())
    }
}

/// Body of [`RestoreDatabase`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoreSpec {
    /// Database to restore from.
    pub source_database_name: String,
    /// Deletion time, when restoring a dropped database.
    pub source_database_deletion_date: Option<DateTime<Utc>>,
    /// Name of the restored database.
    pub target_database_name: String,
    /// Point in time to restore to; latest when absent.
    pub target_utc_point_in_time: Option<DateTime<Utc>>,
}

static RESTORE_SPEC: Schema = Schema {
    root: "ServiceResource",
    namespace: Some(MANAGEMENT_NS),
    fields: &[
        Field::required("SourceDatabaseName"),
        Field::optional("SourceDatabaseDeletionDate"),
        Field::required("TargetDatabaseName"),
        Field::optional("TargetUtcPointInTime"),
    ],
};

impl WireMessage for RestoreSpec {
    fn schema() -> &'static Schema {
        &RESTORE_SPEC
    }

    fn to_record(&self) -> Record {
        let mut record = Record::new();
        record.set("SourceDatabaseName", &self.source_database_name);
        record.set_opt(
            "SourceDatabaseDeletionDate",
            self.source_database_deletion_date.as_ref(),
        );
        record.set("TargetDatabaseName", &self.target_database_name);
        record.set_opt("TargetUtcPointInTime", self.target_utc_point_in_time.as_ref());
        record
    }

    fn from_record(record: &Record) -> Result<Self, GatewayError> {
        Ok(Self {
            source_database_name: record.get_as("SourceDatabaseName")?,
            source_database_deletion_date: record.get_opt("SourceDatabaseDeletionDate")?,
            target_database_name: record.get_as("TargetDatabaseName")?,
            target_utc_point_in_time: record.get_opt("TargetUtcPointInTime")?,
        })
    }
}

/// Starts a point-in-time restore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreDatabase {
    /// Subscription id.
    pub subscription_id: String,
    /// Server hosting source and target.
    pub server_name: String,
    /// Restore parameters.
    pub restore: RestoreSpec,
}

impl Operation for RestoreDatabase {
    type Response = DatabaseRestore;
    const NAME: &'static str = "RestoreDatabase";
    const VERB: Verb = Verb::Post;
    const ROUTE: &'static str =
        "/{SubscriptionId}/services/sqlservers/servers/{ServerName}/restoredatabaseoperations";

    fn path_params(&self) -> PathParams {
        server_params(&self.subscription_id, &self.server_name)
    }

    fn body(&self) -> Option<Body> {
        Some(Body::of(&self.restore))
    }
}

/// Reply of [`RestoreDatabase`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseRestore {
    /// Common resource fields.
    #[serde(flatten)]
    pub header: ResourceHeader,
    /// Restore request id.
    pub request_id: Uuid,
    /// Source database.
    pub source_database_name: String,
    /// Deletion time of the source, for dropped databases.
    pub source_database_deletion_date: Option<DateTime<Utc>>,
    /// Restored database.
    pub target_database_name: String,
    /// Restore point.
    pub target_utc_point_in_time: Option<DateTime<Utc>>,
}

static DATABASE_RESTORE: Schema = resource_schema![
    Field::required("RequestID"),
    Field::required("SourceDatabaseName"),
    Field::optional("SourceDatabaseDeletionDate"),
    Field::required("TargetDatabaseName"),
    Field::optional("TargetUtcPointInTime"),
];

impl WireMessage for DatabaseRestore {
    fn schema() -> &'static Schema {
        &DATABASE_RESTORE
    }

    fn to_record(&self) -> Record {
        let mut record = Record::new();
        self.header.write(&mut record);
        record.set("RequestID", &self.request_id);
        record.set("SourceDatabaseName", &self.source_database_name);
        record.set_opt(
            "SourceDatabaseDeletionDate",
            self.source_database_deletion_date.as_ref(),
        );
        record.set("TargetDatabaseName", &self.target_database_name);
        record.set_opt("TargetUtcPointInTime", self.target_utc_point_in_time.as_ref());
        record
    }

    fn from_record(record: &Record) -> Result<Self, GatewayError> {
        Ok(Self {
            header: ResourceHeader::read(record)?,
            request_id: record.get_as("RequestID")?,
            source_database_name: record.get_as("SourceDatabaseName")?,
            source_database_deletion_date: record.get_opt("SourceDatabaseDeletionDate")?,
            target_database_name: record.get_as("TargetDatabaseName")?,
            target_utc_point_in_time: record.get_opt("TargetUtcPointInTime")?,
        })
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
pub(crate) mod tests {
    use super::*;
    use crate::codec::Reply;
    use crate::operations::tests::{body_text, path_of, round_trip};

    pub(crate) const DATABASE_XML: &str = r#"<ServiceResource xmlns="http://schemas.microsoft.com/windowsazure" xmlns:i="http://www.w3.org/2001/XMLSchema-instance">
  <Name>orders</Name>
  <Type>Microsoft.SqlAzure.Database</Type>
  <State>Normal</State>
  <SelfLink>https://management.core.windows.net/sub/services/sqlservers/servers/abc123/databases/orders</SelfLink>
  <ParentLink>https://management.core.windows.net/sub/services/sqlservers/servers/abc123</ParentLink>
  <Id>4</Id>
  <Edition>Standard</Edition>
  <MaxSizeGB>250</MaxSizeGB>
  <CollationName>SQL_Latin1_General_CP1_CI_AS</CollationName>
  <CreationDate>2015-06-01T10:20:30.123</CreationDate>
  <IsFederationRoot>false</IsFederationRoot>
  <IsSystemObject>false</IsSystemObject>
  <SizeMB i:nil="true"/>
  <MaxSizeBytes>268435456000</MaxSizeBytes>
  <ServiceObjectiveId>1b1ebd4d-d903-4baa-97f9-4ea675f5e928</ServiceObjectiveId>
  <AssignedServiceObjectiveId>1b1ebd4d-d903-4baa-97f9-4ea675f5e928</AssignedServiceObjectiveId>
  <ServiceObjectiveAssignmentState>1</ServiceObjectiveAssignmentState>
  <ServiceObjectiveAssignmentStateDescription>Complete</ServiceObjectiveAssignmentStateDescription>
  <ServiceObjectiveAssignmentErrorCode i:nil="true"/>
  <RecoveryPeriodStartDate>2015-06-01T10:25:00Z</RecoveryPeriodStartDate>
</ServiceResource>"#;

    fn database() -> Database {
        match Database::from_body(DATABASE_XML.as_bytes()) {
            Ok(db) => db,
            Err(err) => panic!("decode: {err}"),
        }
    }

    #[test]
    fn decodes_database() {
        let db = database();
        assert_eq!(db.header.name, "orders");
        assert_eq!(db.id, 4);
        assert_eq!(db.max_size_gb, 250);
        assert_eq!(db.max_size_bytes, Some(268_435_456_000));
        assert_eq!(db.size_mb, None);
        assert_eq!(db.creation_date.to_rfc3339(), "2015-06-01T10:20:30.123+00:00");
        assert_eq!(db.service_objective_assignment_success_date, None);
        assert_eq!(round_trip(&db), db);
    }

    #[test]
    fn list_decodes_every_resource() {
        let inner = DATABASE_XML
            .replace(r#" xmlns="http://schemas.microsoft.com/windowsazure""#, "")
            .replace(r#" xmlns:i="http://www.w3.org/2001/XMLSchema-instance""#, "")
            .replace("<SizeMB i:nil=\"true\"/>", "")
            .replace("<ServiceObjectiveAssignmentErrorCode i:nil=\"true\"/>", "");
        let xml = format!(
            r#"<ServiceResources xmlns="http://schemas.microsoft.com/windowsazure">{inner}{inner}</ServiceResources>"#
        );
        let Ok(list) = Databases::from_xml(xml.as_bytes()) else {
            panic!("list should decode");
        };
        assert_eq!(list.databases.len(), 2);
        assert_eq!(round_trip(&list), list);
    }

    #[test]
    fn missing_required_field_is_malformed() {
        let xml = DATABASE_XML.replace("<Edition>Standard</Edition>", "");
        assert!(matches!(
            Database::from_xml(xml.as_bytes()),
            Err(GatewayError::MalformedPayload(_))
        ));
    }

    #[test]
    fn create_body_skips_unset_options() {
        let op = CreateDatabase {
            subscription_id: "s".to_string(),
            server_name: "srv".to_string(),
            database: DatabaseSpec {
                edition: Some("Basic".to_string()),
                ..DatabaseSpec::named("orders")
            },
        };
        assert_eq!(path_of(&op), "/s/services/sqlservers/servers/srv/databases");
        let body = body_text(&op);
        assert!(body.contains("<Name>orders</Name><Edition>Basic</Edition>"));
        assert!(!body.contains("CollationName"));
        assert!(!body.contains("MaxSizeBytes"));
    }

    #[test]
    fn database_routes() {
        let get = GetDatabase {
            subscription_id: "s".to_string(),
            server_name: "srv".to_string(),
            database_name: "my db".to_string(),
        };
        assert_eq!(
            path_of(&get),
            "/s/services/sqlservers/servers/srv/databases/my%20db"
        );

        let list = ListDatabases {
            subscription_id: "s".to_string(),
            server_name: "srv".to_string(),
        };
        assert_eq!(
            path_of(&list),
            "/s/services/sqlservers/servers/srv/databases?contentview=generic"
        );

        let update = UpdateDatabase {
            subscription_id: "s".to_string(),
            server_name: "srv".to_string(),
            database_name: "orders".to_string(),
            database: DatabaseSpec::named("orders2"),
        };
        assert_eq!(UpdateDatabase::VERB, Verb::Put);
        assert!(body_text(&update).contains("<Name>orders2</Name>"));
    }

    #[test]
    fn restore_spec_round_trips() {
        let Ok(when) = "2015-06-02T00:00:00Z".parse::<DateTime<Utc>>() else {
            panic!("valid timestamp");
        };
        let spec = RestoreSpec {
            source_database_name: "orders".to_string(),
            source_database_deletion_date: None,
            target_database_name: "orders-restored".to_string(),
            target_utc_point_in_time: Some(when),
        };
        assert_eq!(round_trip(&spec), spec);

        let op = RestoreDatabase {
            subscription_id: "s".to_string(),
            server_name: "srv".to_string(),
            restore: spec,
        };
        let body = body_text(&op);
        assert!(body.contains("<TargetUtcPointInTime>2015-06-02T00:00:00Z</TargetUtcPointInTime>"));
        assert!(!body.contains("SourceDatabaseDeletionDate"));
    }
}
