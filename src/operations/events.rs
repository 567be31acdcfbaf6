//! Server and database event logs: connection, deadlock and throttling
//! statistics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::resource::{ResourceHeader, resource_list_schema, resource_schema};
use super::{Operation, server_params};
use crate::codec::{Field, Record, Schema, WireMessage, WireScalar};
use crate::domain::Verb;
use crate::error::GatewayError;
use crate::routing::{PathParams, QueryParams};

/// Fetches event statistics for a server.
///
/// Filters are sent as query parameters and only when set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetServerEventLogs {
    /// Subscription id.
    pub subscription_id: String,
    /// Server name.
    pub server_name: String,
    /// Start of the reporting window.
    pub start_date: Option<DateTime<Utc>>,
    /// Aggregation interval: 5, 60 or 1440 minutes.
    pub interval_size_in_minutes: Option<u32>,
    /// Event types to include, e.g. `deadlock`; all when empty.
    pub event_types: Vec<String>,
}

impl Operation for GetServerEventLogs {
    type Response = EventLogs;
    const NAME: &'static str = "GetServerEventLogs";
    const VERB: Verb = Verb::Get;
    const ROUTE: &'static str = "/{SubscriptionId}/services/sqlservers/servers/{ServerName}/events";

    fn path_params(&self) -> PathParams {
        server_params(&self.subscription_id, &self.server_name)
    }

    fn query(&self) -> QueryParams {
        event_filters(
            self.start_date.as_ref(),
            self.interval_size_in_minutes,
            &self.event_types,
        )
    }
}

/// Fetches event statistics for one database.
///
/// Same filters as [`GetServerEventLogs`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetDatabaseEventLogs {
    /// Subscription id.
    pub subscription_id: String,
    /// Hosting server.
    pub server_name: String,
    /// Database name.
    pub database_name: String,
    /// Start of the reporting window.
    pub start_date: Option<DateTime<Utc>>,
    /// Aggregation interval: 5, 60 or 1440 minutes.
    pub interval_size_in_minutes: Option<u32>,
    /// Event types to include; all when empty.
    pub event_types: Vec<String>,
}

impl Operation for GetDatabaseEventLogs {
    type Response = EventLogs;
    const NAME: &'static str = "GetDatabaseEventLogs";
    const VERB: Verb = Verb::Get;
    const ROUTE: &'static str =
        "/{SubscriptionId}/services/sqlservers/servers/{ServerName}/databases/{DatabaseName}/events";

    fn path_params(&self) -> PathParams {
        server_params(&self.subscription_id, &self.server_name)
            .with("DatabaseName", self.database_name.as_str())
    }

    fn query(&self) -> QueryParams {
        event_filters(
            self.start_date.as_ref(),
            self.interval_size_in_minutes,
            &self.event_types,
        )
    }
}

fn event_filters(
    start_date: Option<&DateTime<Utc>>,
    interval_size_in_minutes: Option<u32>,
    event_types: &[String],
) -> QueryParams {
    let mut query = Vec::new();
    if let Some(start) = start_date {
        query.push(("startDate", start.to_wire()));
    }
    if let Some(interval) = interval_size_in_minutes {
        query.push(("intervalSizeInMinutes", interval.to_string()));
    }
    if !event_types.is_empty() {
        query.push(("eventTypes", event_types.join(",")));
    }
    query
}

/// One aggregated event bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLog {
    /// Common resource fields.
    #[serde(flatten)]
    pub header: ResourceHeader,
    /// Database the events belong to.
    pub database_name: String,
    /// Start of the bucket.
    pub start_time_utc: DateTime<Utc>,
    /// Bucket length.
    pub interval_size_in_minutes: i32,
    /// Category, e.g. `connectivity`.
    pub event_category: String,
    /// Type, e.g. `connection_failed`.
    pub event_type: String,
    /// Subtype code.
    pub event_subtype: Option<i32>,
    /// Subtype description.
    pub event_subtype_description: Option<String>,
    /// Events in the bucket.
    pub number_of_events: i64,
    /// Severity level.
    pub severity: i32,
    /// Description.
    pub description: String,
    /// Extra detail, e.g. a deadlock graph.
    pub additional_data: Option<String>,
}

static EVENT_LOG: Schema = resource_schema![
    Field::required("DatabaseName"),
    Field::required("StartTimeUtc"),
    Field::required("IntervalSizeInMinutes"),
    Field::required("EventCategory"),
    Field::required("EventType"),
    Field::optional("EventSubtype"),
    Field::optional("EventSubtypeDescription"),
    Field::required("NumberOfEvents"),
    Field::required("Severity"),
    Field::required("Description"),
    Field::optional("AdditionalData"),
];

static EVENT_LOGS: Schema = resource_list_schema!(&EVENT_LOG);

impl EventLog {
    fn read(record: &Record) -> Result<Self, GatewayError> {
        Ok(Self {
            header: ResourceHeader::read(record)?,
            database_name: record.get_as("DatabaseName")?,
            start_time_utc: record.get_as("StartTimeUtc")?,
            interval_size_in_minutes: record.get_as("IntervalSizeInMinutes")?,
            event_category: record.get_as("EventCategory")?,
            event_type: record.get_as("EventType")?,
            event_subtype: record.get_opt("EventSubtype")?,
            event_subtype_description: record.get_opt("EventSubtypeDescription")?,
            number_of_events: record.get_as("NumberOfEvents")?,
            severity: record.get_as("Severity")?,
            description: record.get_as("Description")?,
            additional_data: record.get_opt("AdditionalData")?,
        })
    }

    fn write(&self) -> Record {
        let mut record = Record::new();
        self.header.write(&mut record);
        record.set("DatabaseName", &self.database_name);
        record.set("StartTimeUtc", &self.start_time_utc);
        record.set("IntervalSizeInMinutes", &self.interval_size_in_minutes);
        record.set("EventCategory", &self.event_category);
        record.set("EventType", &self.event_type);
        record.set_opt("EventSubtype", self.event_subtype.as_ref());
        record.set_opt(
            "EventSubtypeDescription",
            self.event_subtype_description.as_ref(),
        );
        record.set("NumberOfEvents", &self.number_of_events);
        record.set("Severity", &self.severity);
        record.set("Description", &self.description);
        record.set_opt("AdditionalData", self.additional_data.as_ref());
        record
    }
}

/// Reply of [`GetServerEventLogs`] and [`GetDatabaseEventLogs`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLogs {
    /// Event buckets in service order.
    pub events: Vec<EventLog>,
}

impl EventLogs {
    /// Total events across all buckets.
    #[must_use]
    pub fn total(&self) -> i64 {
        self.events.iter().map(|e| e.number_of_events).sum()
    }
}

impl WireMessage for EventLogs {
    fn schema() -> &'static Schema {
        &EVENT_LOGS
    }

    fn to_record(&self) -> Record {
        let mut record = Record::new();
        record.set_list(
            "ServiceResource",
            self.events.iter().map(EventLog::write).collect(),
        );
        record
    }

    fn from_record(record: &Record) -> Result<Self, GatewayError> {
        Ok(Self {
            events: record.list_of("ServiceResource", EventLog::read)?,
        })
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::operations::tests::{path_of, round_trip};

    fn event(kind: &str, count: i64) -> String {
        format!(
            "<ServiceResource><Name>{kind}</Name><DatabaseName>orders</DatabaseName>\
             <StartTimeUtc>2015-06-01T00:00:00</StartTimeUtc>\
             <IntervalSizeInMinutes>60</IntervalSizeInMinutes>\
             <EventCategory>connectivity</EventCategory><EventType>{kind}</EventType>\
             <EventSubtype>0</EventSubtype><NumberOfEvents>{count}</NumberOfEvents>\
             <Severity>2</Severity><Description>Failed connections</Description>\
             <AdditionalData i:nil=\"true\" xmlns:i=\"http://www.w3.org/2001/XMLSchema-instance\"/>\
             </ServiceResource>"
        )
    }

    #[test]
    fn filters_become_query_parameters() {
        let Ok(start) = "2015-06-01T00:00:00Z".parse::<DateTime<Utc>>() else {
            panic!("valid timestamp");
        };
        let op = GetServerEventLogs {
            subscription_id: "s".to_string(),
            server_name: "srv".to_string(),
            start_date: Some(start),
            interval_size_in_minutes: Some(60),
            event_types: vec!["deadlock".to_string(), "throttling".to_string()],
        };
        assert_eq!(
            path_of(&op),
            "/s/services/sqlservers/servers/srv/events\
             ?startDate=2015-06-01T00%3A00%3A00Z&intervalSizeInMinutes=60&eventTypes=deadlock%2Cthrottling"
        );
    }

    #[test]
    fn no_filters_no_query() {
        let op = GetServerEventLogs {
            subscription_id: "s".to_string(),
            server_name: "srv".to_string(),
            ..GetServerEventLogs::default()
        };
        assert_eq!(path_of(&op), "/s/services/sqlservers/servers/srv/events");
    }

    #[test]
    fn database_events_scope_the_route() {
        let op = GetDatabaseEventLogs {
            subscription_id: "s".to_string(),
            server_name: "srv".to_string(),
            database_name: "orders".to_string(),
            interval_size_in_minutes: Some(5),
            ..GetDatabaseEventLogs::default()
        };
        assert_eq!(
            path_of(&op),
            "/s/services/sqlservers/servers/srv/databases/orders/events?intervalSizeInMinutes=5"
        );
    }

    #[test]
    fn decodes_buckets() {
        let xml = format!(
            "<ServiceResources>{}{}</ServiceResources>",
            event("connection_failed", 3),
            event("deadlock", 1)
        );
        let Ok(logs) = EventLogs::from_xml(xml.as_bytes()) else {
            panic!("event logs should decode");
        };
        assert_eq!(logs.events.len(), 2);
        assert_eq!(logs.total(), 4);
        assert_eq!(logs.events.first().and_then(|e| e.additional_data.clone()), None);
        assert_eq!(round_trip(&logs), logs);
    }
}
