//! Server firewall rules.

use serde::{Deserialize, Serialize};

use super::resource::{ResourceHeader, resource_list_schema, resource_schema};
use super::{Body, MANAGEMENT_NS, Operation, server_params};
use crate::codec::{Field, NoContent, Record, Schema, WireMessage};
use crate::domain::Verb;
use crate::error::GatewayError;
use crate::routing::PathParams;

/// Body of [`CreateFirewallRule`] and [`SetFirewallRule`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirewallRuleSpec {
    /// Rule name.
    pub name: String,
    /// First address of the allowed range.
    pub start_ip_address: String,
    /// Last address of the allowed range.
    pub end_ip_address: String,
}

static FIREWALL_RULE_SPEC: Schema = Schema {
    root: "ServiceResource",
    namespace: Some(MANAGEMENT_NS),
    fields: &[
        Field::required("Name"),
        Field::required("StartIPAddress"),
        Field::required("EndIPAddress"),
    ],
};

impl WireMessage for FirewallRuleSpec {
    fn schema() -> &'static Schema {
        &FIREWALL_RULE_SPEC
    }

    fn to_record(&self) -> Record {
        Record::new()
            .with("Name", &self.name)
            .with("StartIPAddress", &self.start_ip_address)
            .with("EndIPAddress", &self.end_ip_address)
    }

    fn from_record(record: &Record) -> Result<Self, GatewayError> {
        Ok(Self {
            name: record.get_as("Name")?,
            start_ip_address: record.get_as("StartIPAddress")?,
            end_ip_address: record.get_as("EndIPAddress")?,
        })
    }
}

/// A firewall rule as reported by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirewallRule {
    /// Common resource fields.
    #[serde(flatten)]
    pub header: ResourceHeader,
    /// First allowed address.
    pub start_ip_address: String,
    /// Last allowed address.
    pub end_ip_address: String,
}

static FIREWALL_RULE: Schema = resource_schema![
    Field::required("StartIPAddress"),
    Field::required("EndIPAddress"),
];

static FIREWALL_RULES: Schema = resource_list_schema!(&FIREWALL_RULE);

impl FirewallRule {
    fn read(record: &Record) -> Result<Self, GatewayError> {
        Ok(Self {
            header: ResourceHeader::read(record)?,
            start_ip_address: record.get_as("StartIPAddress")?,
            end_ip_address: record.get_as("EndIPAddress")?,
        })
    }

    fn write(&self) -> Record {
        let mut record = Record::new();
        self.header.write(&mut record);
        record.set("StartIPAddress", &self.start_ip_address);
        record.set("EndIPAddress", &self.end_ip_address);
        record
    }
}

impl WireMessage for FirewallRule {
    fn schema() -> &'static Schema {
        &FIREWALL_RULE
    }

    fn to_record(&self) -> Record {
        self.write()
    }

    fn from_record(record: &Record) -> Result<Self, GatewayError> {
        Self::read(record)
    }
}

/// Reply of [`ListFirewallRules`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirewallRules {
    /// Rules in service order.
    pub rules: Vec<FirewallRule>,
}

impl WireMessage for FirewallRules {
    fn schema() -> &'static Schema {
        &FIREWALL_RULES
    }

    fn to_record(&self) -> Record {
        let mut record = Record::new();
        record.set_list(
            "ServiceResource",
            self.rules.iter().map(FirewallRule::write).collect(),
        );
        record
    }

    fn from_record(record: &Record) -> Result<Self, GatewayError> {
        Ok(Self {
            rules: record.list_of("ServiceResource", FirewallRule::read)?,
        })
    }
}

/// Creates a firewall rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateFirewallRule {
    /// Subscription id.
    pub subscription_id: String,
    /// Server the rule protects.
    pub server_name: String,
    /// Rule definition.
    pub rule: FirewallRuleSpec,
}

impl Operation for CreateFirewallRule {
    type Response = FirewallRule;
    const NAME: &'static str = "CreateFirewallRule";
    const VERB: Verb = Verb::Post;
    const ROUTE: &'static str =
        "/{SubscriptionId}/services/sqlservers/servers/{ServerName}/firewallrules";

    fn path_params(&self) -> PathParams {
        server_params(&self.subscription_id, &self.server_name)
    }

    fn body(&self) -> Option<Body> {
        Some(Body::of(&self.rule))
    }
}

/// Creates or replaces the rule named in the path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetFirewallRule {
    /// Subscription id.
    pub subscription_id: String,
    /// Server the rule protects.
    pub server_name: String,
    /// Name of the rule to update.
    pub rule_name: String,
    /// New definition.
    pub rule: FirewallRuleSpec,
}

impl Operation for SetFirewallRule {
    type Response = FirewallRule;
    const NAME: &'static str = "SetFirewallRule";
    const VERB: Verb = Verb::Put;
    const ROUTE: &'static str =
        "/{SubscriptionId}/services/sqlservers/servers/{ServerName}/firewallrules/{FirewallRuleName}";

    fn path_params(&self) -> PathParams {
        server_params(&self.subscription_id, &self.server_name)
            .with("FirewallRuleName", self.rule_name.as_str())
    }

    fn body(&self) -> Option<Body> {
        Some(Body::of(&self.rule))
    }
}

/// Fetches one firewall rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetFirewallRule {
    /// Subscription id.
    pub subscription_id: String,
    /// Server the rule protects.
    pub server_name: String,
    /// Rule name.
    pub rule_name: String,
}

impl Operation for GetFirewallRule {
    type Response = FirewallRule;
    const NAME: &'static str = "GetFirewallRule";
    const VERB: Verb = Verb::Get;
    const ROUTE: &'static str =
        "/{SubscriptionId}/services/sqlservers/servers/{ServerName}/firewallrules/{FirewallRuleName}";

    fn path_params(&self) -> PathParams {
        server_params(&self.subscription_id, &self.server_name)
            .with("FirewallRuleName", self.rule_name.as_str())
    }
}

/// Lists the firewall rules of a server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListFirewallRules {
    /// Subscription id.
    pub subscription_id: String,
    /// Server name.
    pub server_name: String,
}

impl Operation for ListFirewallRules {
    type Response = FirewallRules;
    const NAME: &'static str = "ListFirewallRules";
    const VERB: Verb = Verb::Get;
    const ROUTE: &'static str =
        "/{SubscriptionId}/services/sqlservers/servers/{ServerName}/firewallrules";

    fn path_params(&self) -> PathParams {
        server_params(&self.subscription_id, &self.server_name)
    }
}

/// Deletes a firewall rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteFirewallRule {
    /// Subscription id.
    pub subscription_id: String,
    /// Server the rule protects.
    pub server_name: String,
    /// Rule name.
    pub rule_name: String,
}

impl Operation for DeleteFirewallRule {
    type Response = NoContent;
    const NAME: &'static str = "DeleteFirewallRule";
    const VERB: Verb = Verb::Delete;
    const ROUTE: &'static str =
        "/{SubscriptionId}/services/sqlservers/servers/{ServerName}/firewallrules/{FirewallRuleName}";

    fn path_params(&self) -> PathParams {
        server_params(&self.subscription_id, &self.server_name)
            .with("FirewallRuleName", self.rule_name.as_str())
    }
}
