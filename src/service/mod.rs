//! Service layer: call orchestration.
//!
//! [`Gateway`] coordinates routing, credentials, the codec and the
//! transport for every operation in [`crate::operations`].

pub mod gateway;

pub use gateway::Gateway;
