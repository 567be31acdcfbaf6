//! Operation catalogue.
//!
//! Every remote operation is a request type implementing [`Operation`]:
//! a route template, a verb, optional region and body, and the typed
//! response. The gateway consumes these generically and knows nothing
//! about individual operations.
//!
//! | Module           | Endpoint   | Operations |
//! |------------------|------------|------------|
//! | [`subscription`]        | management | `GetSubscriptionMetadata` |
//! | [`servers`]             | management | create, list, generic list, delete, change subscription, reset password |
//! | [`databases`]           | management | create, get, list, update, delete, restore |
//! | [`database_operations`] | management | operation status, per database and per server |
//! | [`copies`]              | management | start, get, list, update, stop copies |
//! | [`recovery`]            | management | get, list recoverable databases, recover |
//! | [`objectives`]          | management | service objectives, dimension settings |
//! | [`events`]              | management | server and database event logs |
//! | [`firewall`]            | management | create, set, get, list, delete rules |
//! | [`quotas`]              | management | get, list |
//! | [`dac`]                 | regional   | export, import, status |

pub mod copies;
pub mod dac;
pub mod database_operations;
pub mod databases;
pub mod events;
pub mod firewall;
pub mod objectives;
pub mod quotas;
pub mod recovery;
pub mod resource;
pub mod servers;
pub mod subscription;

pub use copies::{
    CopySpec, CopyUpdate, DatabaseCopies, DatabaseCopy, GetDatabaseCopy, ListDatabaseCopies,
    StartDatabaseCopy, StopDatabaseCopy, UpdateDatabaseCopy,
};
pub use dac::{
    BlobCredentials, ConnectionInfo, ExportDatabase, ExportInput, GetImportExportStatus,
    ImportDatabase, ImportInput, OperationStatusGuid, StatusInfo, StatusInfos, StatusInput,
};
pub use database_operations::{
    DatabaseOperation, DatabaseOperations, GetDatabaseOperation, ListDatabaseOperations,
    ListServerDatabaseOperations,
};
pub use databases::{
    CreateDatabase, Database, DatabaseRestore, DatabaseSpec, Databases, DeleteDatabase,
    GetDatabase, ListDatabases, RestoreDatabase, RestoreSpec, UpdateDatabase,
};
pub use events::{EventLog, EventLogs, GetDatabaseEventLogs, GetServerEventLogs};
pub use firewall::{
    CreateFirewallRule, DeleteFirewallRule, FirewallRule, FirewallRuleSpec, FirewallRules,
    GetFirewallRule, ListFirewallRules, SetFirewallRule,
};
pub use objectives::{
    DimensionSetting, DimensionSettings, GetDimensionSetting, GetServiceObjective,
    ListDimensionSettings, ListServiceObjectives, ServiceObjective, ServiceObjectives,
};
pub use quotas::{GetQuota, ListQuotas, Quota, Quotas};
pub use recovery::{
    DatabaseRecovery, GetRecoverableDatabase, ListRecoverableDatabases, RESERVED_DATABASE_NAMES,
    RecoverDatabase, RecoverableDatabase, RecoverableDatabases, RecoverySpec,
};
pub use resource::ResourceHeader;
pub use servers::{
    AdministratorPassword, ChangeAllServersSubscription, ChangeServerSubscription, CreateServer,
    DeleteServer, GenericServer, GenericServers, ListGenericServers, ListServers, NewServer,
    ResetServerPassword, Server, ServerName, Servers, TargetSubscription,
};
pub use subscription::{
    Edition, GetSubscriptionMetadata, MaxSize, PerformanceLevel, ServerVersion,
    ServiceLevelObjective, SubscriptionMetadata,
};

use std::fmt;

use crate::codec::{Record, Reply, Schema, WireMessage};
use crate::domain::{DataCenter, Verb};
use crate::routing::{PathParams, QueryParams};

/// Namespace of management API documents.
pub const MANAGEMENT_NS: &str = "http://schemas.microsoft.com/windowsazure";

/// Namespace of import/export service documents.
pub const DAC_NS: &str =
    "http://schemas.datacontract.org/2004/07/Microsoft.SqlServer.Management.Dac.ServiceTypes";

/// Encoded-to-be request body: a record and the schema it follows.
#[derive(Debug, Clone)]
pub struct Body {
    /// Wire schema of the body.
    pub schema: &'static Schema,
    /// Body content.
    pub record: Record,
}

impl Body {
    /// Builds the body of a typed message.
    #[must_use]
    pub fn of<M: WireMessage>(message: &M) -> Self {
        Self {
            schema: M::schema(),
            record: message.to_record(),
        }
    }
}

/// A remote operation the gateway can execute.
pub trait Operation: fmt::Debug + Sync {
    /// Typed reply of a successful call.
    type Response: Reply;

    /// Operation name, used in logs.
    const NAME: &'static str;

    /// Default verb used by [`crate::service::Gateway::send`].
    const VERB: Verb;

    /// Route template with `{Name}` placeholders.
    const ROUTE: &'static str;

    /// Values for the route's placeholders.
    fn path_params(&self) -> PathParams;

    /// Extra query-string pairs.
    fn query(&self) -> QueryParams {
        Vec::new()
    }

    /// Region of a regional operation; `None` targets the management
    /// endpoint.
    fn region(&self) -> Option<DataCenter> {
        None
    }

    /// Request body. Only sent when the effective verb carries one.
    fn body(&self) -> Option<Body> {
        None
    }
}

/// Placeholder values shared by every management route.
pub(crate) fn subscription_params(subscription_id: &str) -> PathParams {
    PathParams::new().with("SubscriptionId", subscription_id)
}

/// [`subscription_params`] plus the server name.
pub(crate) fn server_params(subscription_id: &str, server_name: &str) -> PathParams {
    subscription_params(subscription_id).with("ServerName", server_name)
}
