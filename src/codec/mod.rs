//! Serialization codec: explicit schemas and schema-driven XML.
//!
//! Each request or response kind declares a [`Schema`]. Typed values
//! convert to and from a generic [`Record`], which [`encode`] and
//! [`decode`] map onto XML. The engine knows nothing about individual
//! operations.

pub mod message;
pub mod schema;
pub mod value;
pub mod xml;

pub use message::{NoContent, Reply, WireMessage};
pub use schema::{Field, FieldKind, Schema};
pub use value::{Record, Value, WireScalar};
pub use xml::{decode, encode};
