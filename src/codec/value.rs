//! Generic records exchanged between typed DTOs and the XML engine.
//!
//! A [`Record`] maps wire names to [`Value`]s. Typed requests build one
//! with the `set*` helpers; typed responses read one back with `get*`,
//! where "absent" is always distinguishable from an empty or zero value.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use uuid::Uuid;

use crate::domain::DataCenter;
use crate::error::GatewayError;

/// A single wire value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Text of an element, attribute, or inline content.
    Text(String),
    /// A nested record.
    Record(Record),
    /// Repeated records (wrapped array or unwrapped repetition).
    List(Vec<Record>),
}

/// Field values keyed by wire name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: BTreeMap<&'static str, Value>,
}

impl Record {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a raw value.
    pub fn insert(&mut self, name: &'static str, value: Value) {
        self.fields.insert(name, value);
    }

    /// Returns the raw value for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Returns `true` if `name` has a value.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Number of fields present.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if no field is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Builder-style [`Record::set`].
    #[must_use]
    pub fn with<T: WireScalar>(mut self, name: &'static str, value: &T) -> Self {
        self.set(name, value);
        self
    }

    /// Stores a scalar as text.
    pub fn set<T: WireScalar>(&mut self, name: &'static str, value: &T) {
        self.insert(name, Value::Text(value.to_wire()));
    }

    /// Stores a scalar when present; `None` leaves the field absent.
    pub fn set_opt<T: WireScalar>(&mut self, name: &'static str, value: Option<&T>) {
        if let Some(value) = value {
            self.set(name, value);
        }
    }

    /// Stores a nested record.
    pub fn set_record(&mut self, name: &'static str, record: Record) {
        self.insert(name, Value::Record(record));
    }

    /// Stores a list of records.
    pub fn set_list(&mut self, name: &'static str, records: Vec<Record>) {
        self.insert(name, Value::List(records));
    }

    /// Returns the text of `name`, if it is present as text.
    #[must_use]
    pub fn text(&self, name: &str) -> Option<&str> {
        match self.fields.get(name) {
            Some(Value::Text(text)) => Some(text),
            _ => None,
        }
    }

    /// Reads a required scalar.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::MalformedPayload`] if the field is absent or
    /// its text does not parse as `T`.
    pub fn get_as<T: WireScalar>(&self, name: &str) -> Result<T, GatewayError> {
        self.get_opt(name)?
            .ok_or_else(|| GatewayError::malformed(format!("missing field {name}")))
    }

    /// Reads an optional scalar; absent yields `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::MalformedPayload`] if the field is present but
    /// does not parse as `T`.
    pub fn get_opt<T: WireScalar>(&self, name: &str) -> Result<Option<T>, GatewayError> {
        match self.fields.get(name) {
            None => Ok(None),
            Some(Value::Text(text)) => T::from_wire(text)
                .map(Some)
                .map_err(|reason| GatewayError::malformed(format!("field {name}: {reason}"))),
            Some(_) => Err(GatewayError::malformed(format!(
                "field {name} is not a scalar"
            ))),
        }
    }

    /// Reads a required nested record.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::MalformedPayload`] if the field is absent or
    /// not a record.
    pub fn record(&self, name: &str) -> Result<&Record, GatewayError> {
        match self.fields.get(name) {
            Some(Value::Record(record)) => Ok(record),
            Some(_) => Err(GatewayError::malformed(format!(
                "field {name} is not a record"
            ))),
            None => Err(GatewayError::malformed(format!("missing field {name}"))),
        }
    }

    /// Returns the records of a list field; absent yields an empty slice.
    #[must_use]
    pub fn list(&self, name: &str) -> &[Record] {
        match self.fields.get(name) {
            Some(Value::List(records)) => records,
            _ => &[],
        }
    }

    /// Converts every record of a list field with `convert`.
    ///
    /// # Errors
    ///
    /// Propagates the first conversion error.
    pub fn list_of<T>(
        &self,
        name: &str,
        convert: impl Fn(&Record) -> Result<T, GatewayError>,
    ) -> Result<Vec<T>, GatewayError> {
        self.list(name).iter().map(convert).collect()
    }

    pub(crate) fn list_mut(&mut self, name: &'static str) -> Option<&mut Vec<Record>> {
        let entry = self
            .fields
            .entry(name)
            .or_insert_with(|| Value::List(Vec::new()));
        match entry {
            Value::List(records) => Some(records),
            _ => None,
        }
    }
}

/// Scalar types with a textual wire form.
pub trait WireScalar: Sized {
    /// Renders the value as element or attribute text.
    fn to_wire(&self) -> String;

    /// Parses element or attribute text.
    ///
    /// # Errors
    ///
    /// Returns a description of why `text` is not a valid value.
    fn from_wire(text: &str) -> Result<Self, String>;
}

impl WireScalar for String {
    fn to_wire(&self) -> String {
        self.clone()
    }

    fn from_wire(text: &str) -> Result<Self, String> {
        Ok(text.to_string())
    }
}

macro_rules! numeric_scalar {
    ($($ty:ty),*) => {
        $(
            impl WireScalar for $ty {
                fn to_wire(&self) -> String {
                    self.to_string()
                }

                fn from_wire(text: &str) -> Result<Self, String> {
                    text.trim().parse().map_err(|e| format!("{e}: {text:?}"))
                }
            }
        )*
    };
}

numeric_scalar!(i32, i64, u32, u64);

impl WireScalar for bool {
    fn to_wire(&self) -> String {
        self.to_string()
    }

    fn from_wire(text: &str) -> Result<Self, String> {
        match text.trim() {
            "true" | "True" | "1" => Ok(true),
            "false" | "False" | "0" => Ok(false),
            other => Err(format!("not a boolean: {other:?}")),
        }
    }
}

impl WireScalar for Uuid {
    fn to_wire(&self) -> String {
        self.to_string()
    }

    fn from_wire(text: &str) -> Result<Self, String> {
        Uuid::parse_str(text.trim()).map_err(|e| e.to_string())
    }
}

impl WireScalar for DateTime<Utc> {
    fn to_wire(&self) -> String {
        self.to_rfc3339_opts(chrono::SecondsFormat::AutoSi, true)
    }

    /// Accepts RFC 3339 and the offset-less `xs:dateTime` form the service
    /// uses for UTC values.
    fn from_wire(text: &str) -> Result<Self, String> {
        let text = text.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Ok(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| naive.and_utc())
            .map_err(|e| format!("{e}: {text:?}"))
    }
}

impl WireScalar for DataCenter {
    fn to_wire(&self) -> String {
        self.as_str().to_string()
    }

    fn from_wire(text: &str) -> Result<Self, String> {
        text.parse()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn absent_is_not_zero() {
        let record = Record::new().with("Present", &0_i32);
        assert_eq!(record.get_opt::<i32>("Present").ok(), Some(Some(0)));
        assert_eq!(record.get_opt::<i32>("Absent").ok(), Some(None));
    }

    #[test]
    fn required_absent_is_malformed() {
        let record = Record::new();
        assert!(matches!(
            record.get_as::<String>("Name"),
            Err(GatewayError::MalformedPayload(_))
        ));
    }

    #[test]
    fn unparseable_scalar_is_malformed() {
        let record = Record::new().with("Size", &"large".to_string());
        assert!(matches!(
            record.get_opt::<i64>("Size"),
            Err(GatewayError::MalformedPayload(_))
        ));
    }

    #[test]
    fn set_opt_none_leaves_field_absent() {
        let mut record = Record::new();
        record.set_opt::<String>("Edition", None);
        assert!(record.is_empty());
        record.set_opt("Edition", Some(&"Basic".to_string()));
        assert_eq!(record.text("Edition"), Some("Basic"));
    }

    #[test]
    fn datetime_accepts_offsetless_form() {
        let Ok(dt) = DateTime::<Utc>::from_wire("2015-01-02T03:04:05.123") else {
            panic!("valid timestamp");
        };
        assert_eq!(dt.to_wire(), "2015-01-02T03:04:05.123Z");
    }

    #[test]
    fn datetime_round_trips() {
        let Ok(dt) = DateTime::<Utc>::from_wire("2015-06-01T00:00:00Z") else {
            panic!("valid timestamp");
        };
        assert_eq!(DateTime::<Utc>::from_wire(&dt.to_wire()), Ok(dt));
    }

    #[test]
    fn booleans_accept_dotnet_casing() {
        assert_eq!(bool::from_wire("True"), Ok(true));
        assert_eq!(bool::from_wire("0"), Ok(false));
        assert!(bool::from_wire("yes").is_err());
    }

    #[test]
    fn list_of_absent_field_is_empty() {
        let record = Record::new();
        let Ok(names) = record.list_of("Items", |r| r.get_as::<String>("Name")) else {
            panic!("empty list converts");
        };
        assert!(names.is_empty());
    }
}
