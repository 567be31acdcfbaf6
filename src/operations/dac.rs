//! Regional import/export operations.
//!
//! These target the import/export service of one region rather than the
//! management endpoint, and use that service's own namespace.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Body, DAC_NS, Operation};
use crate::codec::{Field, Record, Schema, WireMessage};
use crate::domain::{DataCenter, Verb};
use crate::error::GatewayError;
use crate::routing::PathParams;

/// DNS suffix every database server name carries.
pub const SERVER_SUFFIX: &str = ".database.windows.net";

/// Appends [`SERVER_SUFFIX`] unless the name already ends with it
/// (case-insensitive).
#[must_use]
pub fn qualify_server_name(name: &str) -> String {
    let lower = name.to_ascii_lowercase();
    if lower.ends_with(SERVER_SUFFIX) {
        name.to_string()
    } else {
        format!("{name}{SERVER_SUFFIX}")
    }
}

/// Storage account access for a BACPAC blob.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobCredentials {
    /// Blob URI.
    pub uri: String,
    /// Storage account key.
    pub storage_access_key: String,
}

impl std::fmt::Debug for BlobCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlobCredentials")
            .field("uri", &self.uri)
            .finish_non_exhaustive()
    }
}

/// Database connection used by the import/export service.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionInfo {
    server_name: String,
    /// Database name.
    pub database_name: String,
    /// SQL login.
    pub user_name: String,
    /// SQL password.
    pub password: String,
}

impl ConnectionInfo {
    /// Creates connection info; the server name is qualified with
    /// [`SERVER_SUFFIX`].
    #[must_use]
    pub fn new(
        server_name: &str,
        database_name: impl Into<String>,
        user_name: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            server_name: qualify_server_name(server_name),
            database_name: database_name.into(),
            user_name: user_name.into(),
            password: password.into(),
        }
    }

    /// Fully qualified server name.
    #[must_use]
    pub fn server_name(&self) -> &str {
        &self.server_name
    }

    fn read(record: &Record) -> Result<Self, GatewayError> {
        let server_name: String = record.get_as("ServerName")?;
        Ok(Self::new(
            &server_name,
            record.get_as::<String>("DatabaseName")?,
            record.get_as::<String>("UserName")?,
            record.get_as::<String>("Password")?,
        ))
    }

    fn write(&self) -> Record {
        Record::new()
            .with("ServerName", &self.server_name)
            .with("DatabaseName", &self.database_name)
            .with("Password", &self.password)
            .with("UserName", &self.user_name)
    }
}

impl std::fmt::Debug for ConnectionInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionInfo")
            .field("server_name", &self.server_name)
            .field("database_name", &self.database_name)
            .field("user_name", &self.user_name)
            .finish_non_exhaustive()
    }
}

static BLOB_CREDENTIALS: Schema = Schema {
    root: "BlobCredentials",
    namespace: None,
    fields: &[Field::required("URI"), Field::required("StorageAccessKey")],
};

static CONNECTION_INFO: Schema = Schema {
    root: "ConnectionInfo",
    namespace: None,
    fields: &[
        Field::required("ServerName"),
        Field::required("DatabaseName"),
        Field::required("Password"),
        Field::required("UserName"),
    ],
};

impl BlobCredentials {
    fn read(record: &Record) -> Result<Self, GatewayError> {
        Ok(Self {
            uri: record.get_as("URI")?,
            storage_access_key: record.get_as("StorageAccessKey")?,
        })
    }

    fn write(&self) -> Record {
        Record::new()
            .with("URI", &self.uri)
            .with("StorageAccessKey", &self.storage_access_key)
    }
}

/// Body of [`ExportDatabase`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportInput {
    /// Destination blob.
    pub blob_credentials: BlobCredentials,
    /// Database to export.
    pub connection_info: ConnectionInfo,
}

static EXPORT_INPUT: Schema = Schema {
    root: "ExportInput",
    namespace: Some(DAC_NS),
    fields: &[
        Field::nested("BlobCredentials", &BLOB_CREDENTIALS),
        Field::nested("ConnectionInfo", &CONNECTION_INFO),
    ],
};

impl WireMessage for ExportInput {
    fn schema() -> &'static Schema {
        &EXPORT_INPUT
    }

    fn to_record(&self) -> Record {
        let mut record = Record::new();
        record.set_record("BlobCredentials", self.blob_credentials.write());
        record.set_record("ConnectionInfo", self.connection_info.write());
        record
    }

    fn from_record(record: &Record) -> Result<Self, GatewayError> {
        Ok(Self {
            blob_credentials: BlobCredentials::read(record.record("BlobCredentials")?)?,
            connection_info: ConnectionInfo::read(record.record("ConnectionInfo")?)?,
        })
    }
}

/// Exports a database to a BACPAC blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportDatabase {
    /// Region of the database's server.
    pub data_center: DataCenter,
    /// Export parameters.
    pub input: ExportInput,
}

impl Operation for ExportDatabase {
    type Response = OperationStatusGuid;
    const NAME: &'static str = "ExportDatabase";
    const VERB: Verb = Verb::Post;
    const ROUTE: &'static str = "/Export";

    fn path_params(&self) -> PathParams {
        PathParams::new()
    }

    fn region(&self) -> Option<DataCenter> {
        Some(self.data_center)
    }

    fn body(&self) -> Option<Body> {
        Some(Body::of(&self.input))
    }
}

/// Body of [`ImportDatabase`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportInput {
    /// Edition of the new database, e.g. `Standard`.
    pub azure_edition: String,
    /// Source blob.
    pub blob_credentials: BlobCredentials,
    /// Database to create.
    pub connection_info: ConnectionInfo,
    /// Size cap of the new database.
    pub database_size_in_gb: i32,
}

static IMPORT_INPUT: Schema = Schema {
    root: "ImportInput",
    namespace: Some(DAC_NS),
    fields: &[
        Field::required("AzureEdition"),
        Field::nested("BlobCredentials", &BLOB_CREDENTIALS),
        Field::nested("ConnectionInfo", &CONNECTION_INFO),
        Field::required("DatabaseSizeInGB"),
    ],
};

impl WireMessage for ImportInput {
    fn schema() -> &'static Schema {
        &IMPORT_INPUT
    }

    fn to_record(&self) -> Record {
        let mut record = Record::new().with("AzureEdition", &self.azure_edition);
        record.set_record("BlobCredentials", self.blob_credentials.write());
        record.set_record("ConnectionInfo", self.connection_info.write());
        record.set("DatabaseSizeInGB", &self.database_size_in_gb);
        record
    }

    fn from_record(record: &Record) -> Result<Self, GatewayError> {
        Ok(Self {
            azure_edition: record.get_as("AzureEdition")?,
            blob_credentials: BlobCredentials::read(record.record("BlobCredentials")?)?,
            connection_info: ConnectionInfo::read(record.record("ConnectionInfo")?)?,
            database_size_in_gb: record.get_as("DatabaseSizeInGB")?,
        })
    }
}

/// Imports a BACPAC blob into a new database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDatabase {
    /// Region of the target server.
    pub data_center: DataCenter,
    /// Import parameters.
    pub input: ImportInput,
}

impl Operation for ImportDatabase {
    type Response = OperationStatusGuid;
    const NAME: &'static str = "ImportDatabase";
    const VERB: Verb = Verb::Post;
    const ROUTE: &'static str = "/Import";

    fn path_params(&self) -> PathParams {
        PathParams::new()
    }

    fn region(&self) -> Option<DataCenter> {
        Some(self.data_center)
    }

    fn body(&self) -> Option<Body> {
        Some(Body::of(&self.input))
    }
}

/// Reply of [`ExportDatabase`] and [`ImportDatabase`]: the id to poll
/// with [`GetImportExportStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationStatusGuid {
    /// Request id.
    pub guid: Uuid,
}

static OPERATION_GUID: Schema = Schema {
    root: "guid",
    namespace: Some("http://schemas.microsoft.com/2003/10/Serialization/"),
    fields: &[Field::text("Guid")],
};

impl WireMessage for OperationStatusGuid {
    fn schema() -> &'static Schema {
        &OPERATION_GUID
    }

    fn to_record(&self) -> Record {
        Record::new().with("Guid", &self.guid)
    }

    fn from_record(record: &Record) -> Result<Self, GatewayError> {
        Ok(Self {
            guid: record.get_as("Guid")?,
        })
    }
}

/// Body of [`GetImportExportStatus`].
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusInput {
    /// Request id returned by export or import.
    pub request_id: Uuid,
    server_name: String,
    /// SQL login.
    pub user_name: String,
    /// SQL password.
    pub password: String,
}

impl StatusInput {
    /// Creates a status query; the server name is qualified with
    /// [`SERVER_SUFFIX`].
    #[must_use]
    pub fn new(
        request_id: Uuid,
        server_name: &str,
        user_name: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            request_id,
            server_name: qualify_server_name(server_name),
            user_name: user_name.into(),
            password: password.into(),
        }
    }

    /// Fully qualified server name.
    #[must_use]
    pub fn server_name(&self) -> &str {
        &self.server_name
    }
}

impl std::fmt::Debug for StatusInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusInput")
            .field("request_id", &self.request_id)
            .field("server_name", &self.server_name)
            .field("user_name", &self.user_name)
            .finish_non_exhaustive()
    }
}

static STATUS_INPUT: Schema = Schema {
    root: "StatusInput",
    namespace: Some(DAC_NS),
    fields: &[
        Field::required("RequestId"),
        Field::required("ServerName"),
        Field::required("UserName"),
        Field::required("Password"),
    ],
};

impl WireMessage for StatusInput {
    fn schema() -> &'static Schema {
        &STATUS_INPUT
    }

    fn to_record(&self) -> Record {
        Record::new()
            .with("RequestId", &self.request_id)
            .with("ServerName", &self.server_name)
            .with("UserName", &self.user_name)
            .with("Password", &self.password)
    }

    fn from_record(record: &Record) -> Result<Self, GatewayError> {
        let server_name: String = record.get_as("ServerName")?;
        Ok(Self::new(
            record.get_as("RequestId")?,
            &server_name,
            record.get_as::<String>("UserName")?,
            record.get_as::<String>("Password")?,
        ))
    }
}

/// Polls the status of an export or import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetImportExportStatus {
    /// Region the request was sent to.
    pub data_center: DataCenter,
    /// Query parameters.
    pub input: StatusInput,
}

impl Operation for GetImportExportStatus {
    type Response = StatusInfos;
    const NAME: &'static str = "GetImportExportStatus";
    const VERB: Verb = Verb::Post;
    const ROUTE: &'static str = "/Status";

    fn path_params(&self) -> PathParams {
        PathParams::new()
    }

    fn region(&self) -> Option<DataCenter> {
        Some(self.data_center)
    }

    fn body(&self) -> Option<Body> {
        Some(Body::of(&self.input))
    }
}

/// Progress of one import or export request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusInfo {
    /// Blob involved.
    pub blob_uri: String,
    /// Database involved.
    pub database_name: String,
    /// Failure description, when failed.
    pub error_message: Option<String>,
    /// Last status change.
    pub last_modified_time: DateTime<Utc>,
    /// Submission time.
    pub queued_time: DateTime<Utc>,
    /// Request id.
    pub request_id: Uuid,
    /// `Import` or `Export`.
    pub request_type: String,
    /// Fully qualified server name.
    pub server_name: String,
    /// Status text, e.g. `Completed` or `Running, Progress = 40%`.
    pub status: String,
}

impl StatusInfo {
    /// Returns `true` once the service reports completion.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status.eq_ignore_ascii_case("completed")
    }

    fn read(record: &Record) -> Result<Self, GatewayError> {
        let server_name: String = record.get_as("ServerName")?;
        Ok(Self {
            blob_uri: record.get_as("BlobUri")?,
            database_name: record.get_as("DatabaseName")?,
            error_message: record.get_opt("ErrorMessage")?,
            last_modified_time: record.get_as("LastModifiedTime")?,
            queued_time: record.get_as("QueuedTime")?,
            request_id: record.get_as("RequestId")?,
            request_type: record.get_as("RequestType")?,
            server_name: qualify_server_name(&server_name),
            status: record.get_as("Status")?,
        })
    }

    fn write(&self) -> Record {
        let mut record = Record::new()
            .with("BlobUri", &self.blob_uri)
            .with("DatabaseName", &self.database_name);
        record.set_opt("ErrorMessage", self.error_message.as_ref());
        record.set("LastModifiedTime", &self.last_modified_time);
        record.set("QueuedTime", &self.queued_time);
        record.set("RequestId", &self.request_id);
        record.set("RequestType", &self.request_type);
        record.set("ServerName", &self.server_name);
        record.set("Status", &self.status);
        record
    }
}

static STATUS_INFO: Schema = Schema {
    root: "StatusInfo",
    namespace: None,
    fields: &[
        Field::required("BlobUri"),
        Field::required("DatabaseName"),
        Field::optional("ErrorMessage"),
        Field::required("LastModifiedTime"),
        Field::required("QueuedTime"),
        Field::required("RequestId"),
        Field::required("RequestType"),
        Field::required("ServerName"),
        Field::required("Status"),
    ],
};

static STATUS_INFOS: Schema = Schema {
    root: "ArrayOfStatusInfo",
    namespace: Some(DAC_NS),
    fields: &[Field::repeated("StatusInfo", &STATUS_INFO)],
};

/// Reply of [`GetImportExportStatus`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusInfos {
    /// Status entries.
    pub statuses: Vec<StatusInfo>,
}

impl WireMessage for StatusInfos {
    fn schema() -> &'static Schema {
        &STATUS_INFOS
    }

    fn to_record(&self) -> Record {
        let mut record = Record::new();
        record.set_list(
            "StatusInfo",
            self.statuses.iter().map(StatusInfo::write).collect(),
        );
        record
    }

    fn from_record(record: &Record) -> Result<Self, GatewayError> {
        Ok(Self {
            statuses: record.list_of("StatusInfo", StatusInfo::read)?,
        })
    }
}
