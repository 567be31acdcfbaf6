//! Status of long-running database operations such as creates, copies and
//! objective changes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::resource::{ResourceHeader, resource_list_schema, resource_schema};
use super::{Operation, server_params};
use crate::codec::{Field, Record, Schema, WireMessage};
use crate::domain::Verb;
use crate::error::GatewayError;
use crate::routing::{PathParams, QueryParams};

/// Progress of one database operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseOperation {
    /// Common resource fields; `name` is the operation kind.
    #[serde(flatten)]
    pub header: ResourceHeader,
    /// Operation id.
    pub id: Uuid,
    /// 0 pending, 1 in progress, 2 completed, 3 failed.
    pub state_id: i32,
    /// Activity id of the session that started the operation.
    pub session_activity_id: Uuid,
    /// Target database.
    pub database_name: String,
    /// Progress in percent.
    pub percent_complete: i32,
    /// Error code of a failed operation.
    pub error_code: Option<i32>,
    /// Error message of a failed operation.
    pub error: Option<String>,
    /// Severity of the error.
    pub error_severity: Option<i32>,
    /// State of the error.
    pub error_state: Option<i32>,
    /// Start time.
    pub start_time: Option<DateTime<Utc>>,
    /// Last progress update.
    pub last_modify_time: Option<DateTime<Utc>>,
}

impl DatabaseOperation {
    /// Returns `true` once the operation completed or failed.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        matches!(self.state_id, 2 | 3)
    }

    fn read(record: &Record) -> Result<Self, GatewayError> {
        Ok(Self {
            header: ResourceHeader::read(record)?,
            id: record.get_as("Id")?,
            state_id: record.get_as("StateId")?,
            session_activity_id: record.get_as("SessionActivityId")?,
            database_name: record.get_as("DatabaseName")?,
            percent_complete: record.get_as("PercentComplete")?,
            error_code: record.get_opt("ErrorCode")?,
            error: record.get_opt("Error")?,
            error_severity: record.get_opt("ErrorSeverity")?,
            error_state: record.get_opt("ErrorState")?,
            start_time: record.get_opt("StartTime")?,
            last_modify_time: record.get_opt("LastModifyTime")?,
        })
    }

    fn write(&self) -> Record {
        let mut record = Record::new();
        self.header.write(&mut record);
        record.set("Id", &self.id);
        record.set("StateId", &self.state_id);
        record.set("SessionActivityId", &self.session_activity_id);
        record.set("DatabaseName", &self.database_name);
        record.set("PercentComplete", &self.percent_complete);
        record.set_opt("ErrorCode", self.error_code.as_ref());
        record.set_opt("Error", self.error.as_ref());
        record.set_opt("ErrorSeverity", self.error_severity.as_ref());
        record.set_opt("ErrorState", self.error_state.as_ref());
        record.set_opt("StartTime", self.start_time.as_ref());
        record.set_opt("LastModifyTime", self.last_modify_time.as_ref());
        record
    }
}

static DATABASE_OPERATION: Schema = resource_schema![
    Field::required("Id"),
    Field::required("StateId"),
    Field::required("SessionActivityId"),
    Field::required("DatabaseName"),
    Field::required("PercentComplete"),
    Field::optional("ErrorCode"),
    Field::optional("Error"),
    Field::optional("ErrorSeverity"),
    Field::optional("ErrorState"),
    Field::optional("StartTime"),
    Field::optional("LastModifyTime"),
];

static DATABASE_OPERATIONS: Schema = resource_list_schema!(&DATABASE_OPERATION);

impl WireMessage for DatabaseOperation {
    fn schema() -> &'static Schema {
        &DATABASE_OPERATION
    }

    fn to_record(&self) -> Record {
        self.write()
    }

    fn from_record(record: &Record) -> Result<Self, GatewayError> {
        Self::read(record)
    }
}

/// Reply of the database operation listings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseOperations {
    /// Operations in service order.
    pub operations: Vec<DatabaseOperation>,
}

impl WireMessage for DatabaseOperations {
    fn schema() -> &'static Schema {
        &DATABASE_OPERATIONS
    }

    fn to_record(&self) -> Record {
        let mut record = Record::new();
        record.set_list(
            "ServiceResource",
            self.operations.iter().map(DatabaseOperation::write).collect(),
        );
        record
    }

    fn from_record(record: &Record) -> Result<Self, GatewayError> {
        Ok(Self {
            operations: record.list_of("ServiceResource", DatabaseOperation::read)?,
        })
    }
}

/// Fetches the status of one database operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetDatabaseOperation {
    /// Subscription id.
    pub subscription_id: String,
    /// Server name.
    pub server_name: String,
    /// Operation id.
    pub operation_id: Uuid,
}

impl Operation for GetDatabaseOperation {
    type Response = DatabaseOperation;
    const NAME: &'static str = "GetDatabaseOperation";
    const VERB: Verb = Verb::Get;
    const ROUTE: &'static str =
        "/{SubscriptionId}/services/sqlservers/servers/{ServerName}/databaseoperations/{OperationGuid}";

    fn path_params(&self) -> PathParams {
        server_params(&self.subscription_id, &self.server_name)
            .with("OperationGuid", self.operation_id.to_string())
    }
}

/// Lists recent operations on one database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListDatabaseOperations {
    /// Subscription id.
    pub subscription_id: String,
    /// Server name.
    pub server_name: String,
    /// Database to report on.
    pub database_name: String,
}

impl Operation for ListDatabaseOperations {
    type Response = DatabaseOperations;
    const NAME: &'static str = "ListDatabaseOperations";
    const VERB: Verb = Verb::Get;
    const ROUTE: &'static str =
        "/{SubscriptionId}/services/sqlservers/servers/{ServerName}/databaseoperations";

    fn path_params(&self) -> PathParams {
        server_params(&self.subscription_id, &self.server_name)
    }

    fn query(&self) -> QueryParams {
        vec![("databaseName", self.database_name.clone())]
    }
}

/// Lists recent operations on every database of a server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListServerDatabaseOperations {
    /// Subscription id.
    pub subscription_id: String,
    /// Server name.
    pub server_name: String,
}

impl Operation for ListServerDatabaseOperations {
    type Response = DatabaseOperations;
    const NAME: &'static str = "ListServerDatabaseOperations";
    const VERB: Verb = Verb::Get;
    const ROUTE: &'static str =
        "/{SubscriptionId}/services/sqlservers/servers/{ServerName}/databaseoperations?contentview=generic";

    fn path_params(&self) -> PathParams {
        server_params(&self.subscription_id, &self.server_name)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::operations::tests::{path_of, round_trip};

    const OPERATION_XML: &str = r#"<ServiceResource xmlns="http://schemas.microsoft.com/windowsazure" xmlns:i="http://www.w3.org/2001/XMLSchema-instance">
  <Name>CREATE DATABASE</Name>
  <Type>Microsoft.SqlAzure.DatabaseOperation</Type>
  <State>FAILED</State>
  <Id>0a9c4b3e-1f2d-4e5a-8b7c-6d5e4f3a2b1c</Id>
  <StateId>3</StateId>
  <SessionActivityId>9e8d7c6b-5a4f-4e3d-2c1b-0a9f8e7d6c5b</SessionActivityId>
  <DatabaseName>orders</DatabaseName>
  <PercentComplete>0</PercentComplete>
  <ErrorCode>40544</ErrorCode>
  <Error>The database has reached its size quota.</Error>
  <ErrorSeverity>16</ErrorSeverity>
  <ErrorState>1</ErrorState>
  <StartTime>2015-06-01T10:00:00.4</StartTime>
  <LastModifyTime i:nil="true"/>
</ServiceResource>"#;

    #[test]
    fn failed_operation_decodes() {
        let Ok(op) = DatabaseOperation::from_xml(OPERATION_XML.as_bytes()) else {
            panic!("operation should decode");
        };
        assert!(op.is_finished());
        assert_eq!(op.error_code, Some(40544));
        assert_eq!(op.last_modify_time, None);
        assert_eq!(op.header.name, "CREATE DATABASE");
        assert_eq!(round_trip(&op), op);
    }

    #[test]
    fn listing_routes() {
        let per_database = ListDatabaseOperations {
            subscription_id: "s".to_string(),
            server_name: "srv".to_string(),
            database_name: "order lines".to_string(),
        };
        assert_eq!(
            path_of(&per_database),
            "/s/services/sqlservers/servers/srv/databaseoperations?databaseName=order%20lines"
        );
        let per_server = ListServerDatabaseOperations {
            subscription_id: "s".to_string(),
            server_name: "srv".to_string(),
        };
        assert_eq!(
            path_of(&per_server),
            "/s/services/sqlservers/servers/srv/databaseoperations?contentview=generic"
        );
        let one = GetDatabaseOperation {
            subscription_id: "s".to_string(),
            server_name: "srv".to_string(),
            operation_id: Uuid::nil(),
        };
        assert!(path_of(&one).ends_with(&format!("/databaseoperations/{}", Uuid::nil())));
    }
}
