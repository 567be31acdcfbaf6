//! Typed messages on top of records.
//!
//! A [`WireMessage`] ties a Rust type to its [`Schema`] and converts to and
//! from a [`Record`]. Every `WireMessage` is also a [`Reply`], i.e. it can
//! be decoded from a successful response body. [`NoContent`] is the reply of
//! operations whose success body carries nothing of interest.

use super::schema::Schema;
use super::value::Record;
use super::xml;
use crate::error::GatewayError;

/// A type with a declared wire shape.
pub trait WireMessage: Sized {
    /// Wire schema of this type.
    fn schema() -> &'static Schema;

    /// Converts the value into a record. Path-only fields are not part of
    /// the record.
    fn to_record(&self) -> Record;

    /// Builds the value from a decoded record.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::MalformedPayload`] when a field is missing or
    /// does not parse.
    fn from_record(record: &Record) -> Result<Self, GatewayError>;

    /// Encodes the value as an XML document.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Encoding`] if the record does not satisfy the
    /// schema.
    fn to_xml(&self) -> Result<Vec<u8>, GatewayError> {
        xml::encode(&self.to_record(), Self::schema())
    }

    /// Decodes the value from an XML document.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::MalformedPayload`] if the document does not
    /// match the schema.
    fn from_xml(bytes: &[u8]) -> Result<Self, GatewayError> {
        Self::from_record(&xml::decode(bytes, Self::schema())?)
    }
}

/// A value decodable from a successful response body.
pub trait Reply: Sized {
    /// Decodes the body.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::MalformedPayload`] if the body does not match
    /// the expected shape.
    fn from_body(body: &[u8]) -> Result<Self, GatewayError>;
}

impl<T: WireMessage> Reply for T {
    fn from_body(body: &[u8]) -> Result<Self, GatewayError> {
        T::from_xml(body)
    }
}

/// Reply of operations that return no payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoContent;

impl Reply for NoContent {
    fn from_body(_body: &[u8]) -> Result<Self, GatewayError> {
        Ok(Self)
    }
}
