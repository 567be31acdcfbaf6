//! Recoverable databases and geo-recovery.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::resource::{ResourceHeader, resource_list_schema, resource_schema};
use super::{Body, MANAGEMENT_NS, Operation, server_params};
use crate::codec::{Field, Record, Schema, WireMessage};
use crate::domain::Verb;
use crate::error::GatewayError;
use crate::routing::PathParams;

/// System databases that can be neither recovered nor recovered into.
pub const RESERVED_DATABASE_NAMES: [&str; 4] = ["master", "tempdb", "model", "msdb"];

/// A database with a geo-replicated backup that can be recovered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoverableDatabase {
    /// Common resource fields.
    #[serde(flatten)]
    pub header: ResourceHeader,
    /// Numeric database id.
    pub id: i64,
    /// Edition.
    pub edition: String,
    /// Size cap in gigabytes.
    pub max_size_gb: i64,
    /// Creation time of the source database.
    pub creation_date: DateTime<Utc>,
    /// Time of the newest backup a recovery would restore.
    pub last_available_backup_date: DateTime<Utc>,
}

impl RecoverableDatabase {
    fn read(record: &Record) -> Result<Self, GatewayError> {
        Ok(Self {
            header: ResourceHeader::read(record)?,
            id: record.get_as("Id")?,
            edition: record.get_as("Edition")?,
            max_size_gb: record.get_as("MaxSizeGB")?,
            creation_date: record.get_as("CreationDate")?,
            last_available_backup_date: record.get_as("LastAvailableBackupDate")?,
        })
    }

    fn write(&self) -> Record {
        let mut record = Record::new();
        self.header.write(&mut record);
        record.set("Id", &self.id);
        record.set("Edition", &self.edition);
        record.set("MaxSizeGB", &self.max_size_gb);
        record.set("CreationDate", &self.creation_date);
        record.set("LastAvailableBackupDate", &self.last_available_backup_date);
        record
    }
}

static RECOVERABLE_DATABASE: Schema = resource_schema![
    Field::required("Id"),
    Field::required("Edition"),
    Field::required("MaxSizeGB"),
    Field::required("CreationDate"),
    Field::required("LastAvailableBackupDate"),
];

static RECOVERABLE_DATABASES: Schema = resource_list_schema!(&RECOVERABLE_DATABASE);

impl WireMessage for RecoverableDatabase {
    fn schema() -> &'static Schema {
        &RECOVERABLE_DATABASE
    }

    fn to_record(&self) -> Record {
        self.write()
    }

    fn from_record(record: &Record) -> Result<Self, GatewayError> {
        Self::read(record)
    }
}

/// Reply of [`ListRecoverableDatabases`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoverableDatabases {
    /// Databases in service order.
    pub databases: Vec<RecoverableDatabase>,
}

impl WireMessage for RecoverableDatabases {
    fn schema() -> &'static Schema {
        &RECOVERABLE_DATABASES
    }

    fn to_record(&self) -> Record {
        let mut record = Record::new();
        record.set_list(
            "ServiceResource",
            self.databases.iter().map(RecoverableDatabase::write).collect(),
        );
        record
    }

    fn from_record(record: &Record) -> Result<Self, GatewayError> {
        Ok(Self {
            databases: record.list_of("ServiceResource", RecoverableDatabase::read)?,
        })
    }
}

/// Body of [`RecoverDatabase`].
///
/// Built through [`RecoverySpec::new`], which rejects system database
/// names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecoverySpec {
    source_database_name: String,
    source_server_name: Option<String>,
    target_database_name: String,
}

impl RecoverySpec {
    /// Recovers `source_database_name` as `target_database_name`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Configuration`] if either name is one of
    /// [`RESERVED_DATABASE_NAMES`].
    pub fn new(
        source_database_name: impl Into<String>,
        target_database_name: impl Into<String>,
    ) -> Result<Self, GatewayError> {
        let source_database_name = source_database_name.into();
        let target_database_name = target_database_name.into();
        reject_reserved("source", &source_database_name)?;
        reject_reserved("target", &target_database_name)?;
        Ok(Self {
            source_database_name,
            source_server_name: None,
            target_database_name,
        })
    }

    /// Names the server that held the source database when it differs
    /// from the server in the route.
    #[must_use]
    pub fn with_source_server(mut self, server_name: impl Into<String>) -> Self {
        self.source_server_name = Some(server_name.into());
        self
    }

    /// Database to recover.
    #[must_use]
    pub fn source_database_name(&self) -> &str {
        &self.source_database_name
    }

    /// Name of the recovered database.
    #[must_use]
    pub fn target_database_name(&self) -> &str {
        &self.target_database_name
    }
}

fn reject_reserved(role: &str, name: &str) -> Result<(), GatewayError> {
    if RESERVED_DATABASE_NAMES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(name))
    {
        return Err(GatewayError::Configuration(format!(
            "{role} database name {name} is reserved ({})",
            RESERVED_DATABASE_NAMES.join(",")
        )));
    }
    Ok(())
}

static RECOVERY_SPEC: Schema = Schema {
    root: "ServiceResource",
    namespace: Some(MANAGEMENT_NS),
    fields: &[
        Field::required("SourceDatabaseName"),
        Field::optional("SourceServerName"),
        Field::required("TargetDatabaseName"),
    ],
};

impl WireMessage for RecoverySpec {
    fn schema() -> &'static Schema {
        &RECOVERY_SPEC
    }

    fn to_record(&self) -> Record {
        let mut record = Record::new().with("SourceDatabaseName", &self.source_database_name);
        record.set_opt("SourceServerName", self.source_server_name.as_ref());
        record.set("TargetDatabaseName", &self.target_database_name);
        record
    }

    fn from_record(record: &Record) -> Result<Self, GatewayError> {
        let spec = Self::new(
            record.get_as::<String>("SourceDatabaseName")?,
            record.get_as::<String>("TargetDatabaseName")?,
        )?;
        Ok(match record.get_opt::<String>("SourceServerName")? {
            Some(server) => spec.with_source_server(server),
            None => spec,
        })
    }
}

/// Reply of [`RecoverDatabase`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseRecovery {
    /// Common resource fields.
    #[serde(flatten)]
    pub header: ResourceHeader,
    /// Database being recovered.
    pub source_database_name: String,
    /// Server that held the source database.
    pub source_server_name: Option<String>,
    /// Name of the recovered database.
    pub target_database_name: String,
}

static DATABASE_RECOVERY: Schema = resource_schema![
    Field::required("SourceDatabaseName"),
    Field::optional("SourceServerName"),
    Field::required("TargetDatabaseName"),
];

impl WireMessage for DatabaseRecovery {
    fn schema() -> &'static Schema {
        &DATABASE_RECOVERY
    }

    fn to_record(&self) -> Record {
        let mut record = Record::new();
        self.header.write(&mut record);
        record.set("SourceDatabaseName", &self.source_database_name);
        record.set_opt("SourceServerName", self.source_server_name.as_ref());
        record.set("TargetDatabaseName", &self.target_database_name);
        record
    }

    fn from_record(record: &Record) -> Result<Self, GatewayError> {
        Ok(Self {
            header: ResourceHeader::read(record)?,
            source_database_name: record.get_as("SourceDatabaseName")?,
            source_server_name: record.get_opt("SourceServerName")?,
            target_database_name: record.get_as("TargetDatabaseName")?,
        })
    }
}

/// Fetches one recoverable database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetRecoverableDatabase {
    /// Subscription id.
    pub subscription_id: String,
    /// Server that held the database.
    pub server_name: String,
    /// Database name.
    pub database_name: String,
}

impl Operation for GetRecoverableDatabase {
    type Response = RecoverableDatabase;
    const NAME: &'static str = "GetRecoverableDatabase";
    const VERB: Verb = Verb::Get;
    const ROUTE: &'static str =
        "/{SubscriptionId}/services/sqlservers/servers/{ServerName}/recoverabledatabases/{DatabaseName}";

    fn path_params(&self) -> PathParams {
        server_params(&self.subscription_id, &self.server_name)
            .with("DatabaseName", self.database_name.as_str())
    }
}

/// Lists the recoverable databases of a server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRecoverableDatabases {
    /// Subscription id.
    pub subscription_id: String,
    /// Server name.
    pub server_name: String,
}

impl Operation for ListRecoverableDatabases {
    type Response = RecoverableDatabases;
    const NAME: &'static str = "ListRecoverableDatabases";
    const VERB: Verb = Verb::Get;
    const ROUTE: &'static str =
        "/{SubscriptionId}/services/sqlservers/servers/{ServerName}/recoverabledatabases?contentview=generic";

    fn path_params(&self) -> PathParams {
        server_params(&self.subscription_id, &self.server_name)
    }
}

/// Recovers a database from its geo-replicated backup onto a server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoverDatabase {
    /// Subscription id.
    pub subscription_id: String,
    /// Server that receives the recovered database.
    pub server_name: String,
    /// What to recover.
    pub recovery: RecoverySpec,
}

impl Operation for RecoverDatabase {
    type Response = DatabaseRecovery;
    const NAME: &'static str = "RecoverDatabase";
    const VERB: Verb = Verb::Post;
    const ROUTE: &'static str =
        "/{SubscriptionId}/services/sqlservers/servers/{ServerName}/recoverdatabaseoperations";

    fn path_params(&self) -> PathParams {
        server_params(&self.subscription_id, &self.server_name)
    }

    fn body(&self) -> Option<Body> {
        Some(Body::of(&self.recovery))
    }
}
