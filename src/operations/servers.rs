//! Server operations.

use serde::{Deserialize, Serialize};

use super::resource::{ResourceHeader, resource_list_schema, resource_schema};
use super::{Body, MANAGEMENT_NS, Operation, server_params, subscription_params};
use crate::codec::{Field, NoContent, Record, Schema, WireMessage};
use crate::domain::{DataCenter, Verb};
use crate::error::GatewayError;
use crate::routing::PathParams;

/// Body of [`CreateServer`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewServer {
    /// Administrator login for the new server.
    pub administrator_login: String,
    /// Administrator password for the new server.
    pub administrator_password: String,
    /// Region to deploy the server in.
    pub location: DataCenter,
}

static NEW_SERVER: Schema = Schema {
    root: "Server",
    namespace: Some(MANAGEMENT_NS),
    fields: &[
        Field::required("AdministratorLogin"),
        Field::required("AdministratorPassword"),
        Field::required("Location"),
    ],
};

impl WireMessage for NewServer {
    fn schema() -> &'static Schema {
        &NEW_SERVER
    }

    fn to_record(&self) -> Record {
        Record::new()
            .with("AdministratorLogin", &self.administrator_login)
            .with("AdministratorPassword", &self.administrator_password)
            .with("Location", &self.location)
    }

    fn from_record(record: &Record) -> Result<Self, GatewayError> {
        Ok(Self {
            administrator_login: record.get_as("AdministratorLogin")?,
            administrator_password: record.get_as("AdministratorPassword")?,
            location: record.get_as("Location")?,
        })
    }
}

/// Creates a server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateServer {
    /// Subscription id.
    pub subscription_id: String,
    /// Server definition.
    pub server: NewServer,
}

impl Operation for CreateServer {
    type Response = ServerName;
    const NAME: &'static str = "CreateServer";
    const VERB: Verb = Verb::Post;
    const ROUTE: &'static str = "/{SubscriptionId}/services/sqlservers/servers";

    fn path_params(&self) -> PathParams {
        subscription_params(&self.subscription_id)
    }

    fn body(&self) -> Option<Body> {
        Some(Body::of(&self.server))
    }
}

/// Reply of [`CreateServer`]: the generated server name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerName {
    /// Generated name, e.g. `x1y2z3w4q5`.
    pub name: String,
    /// DNS name, e.g. `x1y2z3w4q5.database.windows.net`.
    pub fully_qualified_domain_name: Option<String>,
}

static SERVER_NAME: Schema = Schema {
    root: "ServerName",
    namespace: Some(MANAGEMENT_NS),
    fields: &[
        Field::attribute("FullyQualifiedDomainName"),
        Field::text("Name"),
    ],
};

impl WireMessage for ServerName {
    fn schema() -> &'static Schema {
        &SERVER_NAME
    }

    fn to_record(&self) -> Record {
        let mut record = Record::new().with("Name", &self.name);
        record.set_opt(
            "FullyQualifiedDomainName",
            self.fully_qualified_domain_name.as_ref(),
        );
        record
    }

    fn from_record(record: &Record) -> Result<Self, GatewayError> {
        Ok(Self {
            name: record.get_as("Name")?,
            fully_qualified_domain_name: record.get_opt("FullyQualifiedDomainName")?,
        })
    }
}

/// Lists the servers of a subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListServers {
    /// Subscription id.
    pub subscription_id: String,
}

impl Operation for ListServers {
    type Response = Servers;
    const NAME: &'static str = "ListServers";
    const VERB: Verb = Verb::Get;
    const ROUTE: &'static str = "/{SubscriptionId}/services/sqlservers/servers";

    fn path_params(&self) -> PathParams {
        subscription_params(&self.subscription_id)
    }
}

/// A server as listed by [`ListServers`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    /// Server name.
    pub name: String,
    /// Administrator login.
    pub administrator_login: String,
    /// Region name as reported by the service.
    pub location: String,
    /// Paired region for geo-replication.
    pub geo_paired_region: Option<String>,
    /// DNS name.
    pub fully_qualified_domain_name: Option<String>,
    /// Server version, e.g. `12.0`.
    pub version: Option<String>,
}

impl Server {
    /// Parses the reported location as a [`DataCenter`].
    #[must_use]
    pub fn data_center(&self) -> Option<DataCenter> {
        self.location.parse().ok()
    }

    fn read(record: &Record) -> Result<Self, GatewayError> {
        Ok(Self {
            name: record.get_as("Name")?,
            administrator_login: record.get_as("AdministratorLogin")?,
            location: record.get_as("Location")?,
            geo_paired_region: record.get_opt("GeoPairedRegion")?,
            fully_qualified_domain_name: record.get_opt("FullyQualifiedDomainName")?,
            version: record.get_opt("Version")?,
        })
    }

    fn write(&self) -> Record {
        let mut record = Record::new()
            .with("Name", &self.name)
            .with("AdministratorLogin", &self.administrator_login)
            .with("Location", &self.location);
        record.set_opt("GeoPairedRegion", self.geo_paired_region.as_ref());
        record.set_opt(
            "FullyQualifiedDomainName",
            self.fully_qualified_domain_name.as_ref(),
        );
        record.set_opt("Version", self.version.as_ref());
        record
    }
}

static SERVER: Schema = Schema {
    root: "Server",
    namespace: None,
    fields: &[
        Field::required("Name"),
        Field::required("AdministratorLogin"),
        Field::required("Location"),
        Field::optional("GeoPairedRegion"),
        Field::optional("FullyQualifiedDomainName"),
        Field::optional("Version"),
    ],
};

static SERVERS: Schema = Schema {
    root: "Servers",
    namespace: Some(MANAGEMENT_NS),
    fields: &[Field::repeated("Server", &SERVER)],
};

/// Reply of [`ListServers`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Servers {
    /// Servers in service order.
    pub servers: Vec<Server>,
}

impl WireMessage for Servers {
    fn schema() -> &'static Schema {
        &SERVERS
    }

    fn to_record(&self) -> Record {
        let mut record = Record::new();
        record.set_list("Server", self.servers.iter().map(Server::write).collect());
        record
    }

    fn from_record(record: &Record) -> Result<Self, GatewayError> {
        Ok(Self {
            servers: record.list_of("Server", Server::read)?,
        })
    }
}

/// Lists the servers of a subscription in the generic resource view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListGenericServers {
    /// Subscription id.
    pub subscription_id: String,
}

impl Operation for ListGenericServers {
    type Response = GenericServers;
    const NAME: &'static str = "ListGenericServers";
    const VERB: Verb = Verb::Get;
    const ROUTE: &'static str = "/{SubscriptionId}/services/sqlservers/servers?contentview=generic";

    fn path_params(&self) -> PathParams {
        subscription_params(&self.subscription_id)
    }
}

/// A server in the generic resource view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericServer {
    /// Common resource fields.
    #[serde(flatten)]
    pub header: ResourceHeader,
    /// DNS name, carried as an attribute.
    pub fully_qualified_domain_name: Option<String>,
}

static GENERIC_SERVER: Schema = resource_schema![Field::attribute("FullyQualifiedDomainName")];

static GENERIC_SERVERS: Schema = resource_list_schema!(&GENERIC_SERVER);

impl GenericServer {
    fn read(record: &Record) -> Result<Self, GatewayError> {
        Ok(Self {
            header: ResourceHeader::read(record)?,
            fully_qualified_domain_name: record.get_opt("FullyQualifiedDomainName")?,
        })
    }

    fn write(&self) -> Record {
        let mut record = Record::new();
        self.header.write(&mut record);
        record.set_opt(
            "FullyQualifiedDomainName",
            self.fully_qualified_domain_name.as_ref(),
        );
        record
    }
}

/// Reply of [`ListGenericServers`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericServers {
    /// Servers in service order.
    pub servers: Vec<GenericServer>,
}

impl WireMessage for GenericServers {
    fn schema() -> &'static Schema {
        &GENERIC_SERVERS
    }

    fn to_record(&self) -> Record {
        let mut record = Record::new();
        record.set_list(
            "ServiceResource",
            self.servers.iter().map(GenericServer::write).collect(),
        );
        record
    }

    fn from_record(record: &Record) -> Result<Self, GatewayError> {
        Ok(Self {
            servers: record.list_of("ServiceResource", GenericServer::read)?,
        })
    }
}

/// Deletes a server and all its databases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteServer {
    /// Subscription id.
    pub subscription_id: String,
    /// Server to delete.
    pub server_name: String,
}

impl Operation for DeleteServer {
    type Response = NoContent;
    const NAME: &'static str = "DeleteServer";
    const VERB: Verb = Verb::Delete;
    const ROUTE: &'static str = "/{SubscriptionId}/services/sqlservers/servers/{ServerName}";

    fn path_params(&self) -> PathParams {
        server_params(&self.subscription_id, &self.server_name)
    }
}

/// Inline-text body naming the destination subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSubscription {
    /// Destination subscription id.
    pub subscription_id: String,
}

static TARGET_SUBSCRIPTION: Schema = Schema {
    root: "TargetSubscriptionId",
    namespace: Some(MANAGEMENT_NS),
    fields: &[Field::text("TargetSubscriptionId")],
};

impl WireMessage for TargetSubscription {
    fn schema() -> &'static Schema {
        &TARGET_SUBSCRIPTION
    }

    fn to_record(&self) -> Record {
        Record::new().with("TargetSubscriptionId", &self.subscription_id)
    }

    fn from_record(record: &Record) -> Result<Self, GatewayError> {
        Ok(Self {
            subscription_id: record.get_as("TargetSubscriptionId")?,
        })
    }
}

/// Moves a server to another subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeServerSubscription {
    /// Current subscription id.
    pub subscription_id: String,
    /// Server to move.
    pub server_name: String,
    /// Destination.
    pub target: TargetSubscription,
}

impl Operation for ChangeServerSubscription {
    type Response = NoContent;
    const NAME: &'static str = "ChangeServerSubscription";
    const VERB: Verb = Verb::Post;
    const ROUTE: &'static str =
        "/{SubscriptionId}/services/sqlservers/servers/{ServerName}?op=ChangeSubscription";

    fn path_params(&self) -> PathParams {
        server_params(&self.subscription_id, &self.server_name)
    }

    fn body(&self) -> Option<Body> {
        Some(Body::of(&self.target))
    }
}

/// Moves every server of a subscription to another subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeAllServersSubscription {
    /// Current subscription id.
    pub subscription_id: String,
    /// Destination.
    pub target: TargetSubscription,
}

impl Operation for ChangeAllServersSubscription {
    type Response = NoContent;
    const NAME: &'static str = "ChangeAllServersSubscription";
    const VERB: Verb = Verb::Post;
    const ROUTE: &'static str = "/{SubscriptionId}/services/sqlservers/servers?op=ChangeSubscription";

    fn path_params(&self) -> PathParams {
        subscription_params(&self.subscription_id)
    }

    fn body(&self) -> Option<Body> {
        Some(Body::of(&self.target))
    }
}

/// Inline-text body carrying a new administrator password.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdministratorPassword {
    /// New password.
    pub password: String,
}

impl std::fmt::Debug for AdministratorPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdministratorPassword").finish_non_exhaustive()
    }
}

static ADMINISTRATOR_PASSWORD: Schema = Schema {
    root: "AdministratorLoginPassword",
    namespace: Some(MANAGEMENT_NS),
    fields: &[Field::text("AdministratorLoginPassword")],
};

impl WireMessage for AdministratorPassword {
    fn schema() -> &'static Schema {
        &ADMINISTRATOR_PASSWORD
    }

    fn to_record(&self) -> Record {
        Record::new().with("AdministratorLoginPassword", &self.password)
    }

    fn from_record(record: &Record) -> Result<Self, GatewayError> {
        Ok(Self {
            password: record.get_as("AdministratorLoginPassword")?,
        })
    }
}

/// Resets the administrator password of a server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetServerPassword {
    /// Subscription id.
    pub subscription_id: String,
    /// Server whose password changes.
    pub server_name: String,
    /// New password.
    pub password: AdministratorPassword,
}

impl Operation for ResetServerPassword {
    type Response = NoContent;
    const NAME: &'static str = "ResetServerPassword";
    const VERB: Verb = Verb::Post;
    const ROUTE: &'static str =
        "/{SubscriptionId}/services/sqlservers/servers/{ServerName}?op=ResetPassword";

    fn path_params(&self) -> PathParams {
        server_params(&self.subscription_id, &self.server_name)
    }

    fn body(&self) -> Option<Body> {
        Some(Body::of(&self.password))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::operations::tests::{body_text, path_of, round_trip};

    fn create() -> CreateServer {
        CreateServer {
            subscription_id: "sub-1".to_string(),
            server: NewServer {
                administrator_login: "admin".to_string(),
                administrator_password: "p@ss<word>".to_string(),
                location: DataCenter::EastUs2,
            },
        }
    }

    #[test]
    fn create_body_omits_path_fields() {
        let op = create();
        assert_eq!(path_of(&op), "/sub-1/services/sqlservers/servers");

        let body = body_text(&op);
        assert!(body.contains(r#"<Server xmlns="http://schemas.microsoft.com/windowsazure">"#));
        assert!(body.contains("<Location>East US 2</Location>"));
        assert!(body.contains("<AdministratorPassword>p@ss&lt;word&gt;</AdministratorPassword>"));
        assert!(!body.contains("sub-1"));
    }

    #[test]
    fn new_server_round_trips() {
        let server = create().server;
        assert_eq!(round_trip(&server), server);
    }

    #[test]
    fn server_name_reads_attribute_and_text() {
        let xml = br#"<ServerName FullyQualifiedDomainName="abc123.database.windows.net" xmlns="http://schemas.microsoft.com/windowsazure">abc123</ServerName>"#;
        let Ok(name) = ServerName::from_xml(xml) else {
            panic!("ServerName should decode");
        };
        assert_eq!(name.name, "abc123");
        assert_eq!(
            name.fully_qualified_domain_name.as_deref(),
            Some("abc123.database.windows.net")
        );
        assert_eq!(round_trip(&name), name);
    }

    #[test]
    fn servers_decode_from_repeated_elements() {
        let xml = br#"<Servers xmlns="http://schemas.microsoft.com/windowsazure">
            <Server><Name>a1</Name><AdministratorLogin>admin</AdministratorLogin><Location>West Europe</Location><Version>12.0</Version></Server>
            <Server><Name>b2</Name><AdministratorLogin>root</AdministratorLogin><Location>Somewhere New</Location></Server>
        </Servers>"#;
        let Ok(servers) = Servers::from_xml(xml) else {
            panic!("Servers should decode");
        };
        assert_eq!(servers.servers.len(), 2);
        let Some(first) = servers.servers.first() else {
            panic!("two servers");
        };
        assert_eq!(first.data_center(), Some(DataCenter::WestEurope));
        assert_eq!(first.version.as_deref(), Some("12.0"));
        assert_eq!(servers.servers.get(1).and_then(Server::data_center), None);
        assert_eq!(round_trip(&servers), servers);
    }

    #[test]
    fn empty_server_list_decodes() {
        let Ok(servers) = Servers::from_xml(b"<Servers/>") else {
            panic!("empty list should decode");
        };
        assert!(servers.servers.is_empty());
    }

    #[test]
    fn query_routes_keep_their_op() {
        let change = ChangeServerSubscription {
            subscription_id: "s".to_string(),
            server_name: "srv".to_string(),
            target: TargetSubscription {
                subscription_id: "t".to_string(),
            },
        };
        assert_eq!(
            path_of(&change),
            "/s/services/sqlservers/servers/srv?op=ChangeSubscription"
        );
        assert!(body_text(&change).contains(">t</TargetSubscriptionId>"));

        let reset = ResetServerPassword {
            subscription_id: "s".to_string(),
            server_name: "srv".to_string(),
            password: AdministratorPassword {
                password: "n3w".to_string(),
            },
        };
        assert_eq!(
            path_of(&reset),
            "/s/services/sqlservers/servers/srv?op=ResetPassword"
        );
        assert!(body_text(&reset).contains(">n3w</AdministratorLoginPassword>"));
        assert!(!format!("{reset:?}").contains("n3w"));
    }

    #[test]
    fn change_all_servers_targets_the_collection() {
        let op = ChangeAllServersSubscription {
            subscription_id: "s".to_string(),
            target: TargetSubscription {
                subscription_id: "t".to_string(),
            },
        };
        assert_eq!(path_of(&op), "/s/services/sqlservers/servers?op=ChangeSubscription");
        assert!(body_text(&op).contains(">t</TargetSubscriptionId>"));
    }

    #[test]
    fn generic_servers_read_attribute_and_header() {
        let op = ListGenericServers {
            subscription_id: "s".to_string(),
        };
        assert_eq!(path_of(&op), "/s/services/sqlservers/servers?contentview=generic");

        let xml = br#"<ServiceResources xmlns="http://schemas.microsoft.com/windowsazure">
  <ServiceResource FullyQualifiedDomainName="abc123.database.windows.net">
    <Name>abc123</Name><Type>Microsoft.SqlAzure.Server</Type><State>Ready</State>
  </ServiceResource>
</ServiceResources>"#;
        let Ok(servers) = GenericServers::from_xml(xml) else {
            panic!("generic servers should decode");
        };
        let Some(server) = servers.servers.first() else {
            panic!("one server expected");
        };
        assert_eq!(server.header.name, "abc123");
        assert_eq!(server.header.state.as_deref(), Some("Ready"));
        assert_eq!(
            server.fully_qualified_domain_name.as_deref(),
            Some("abc123.database.windows.net")
        );
        assert_eq!(round_trip(&servers), servers);
    }

    #[test]
    fn delete_has_no_body() {
        let op = DeleteServer {
            subscription_id: "s".to_string(),
            server_name: "srv".to_string(),
        };
        assert_eq!(path_of(&op), "/s/services/sqlservers/servers/srv");
        assert!(op.body().is_none());
    }
}
