//! # sqlmgmt-gateway
//!
//! Typed mutual-TLS gateway for the region-partitioned SQL database
//! management API.
//!
//! Every remote operation is a typed request value implementing
//! [`operations::Operation`]. The [`Gateway`] turns it into exactly one
//! authenticated HTTPS exchange: it resolves the route template, selects
//! the global or regional endpoint, loads the client certificate by
//! thumbprint, encodes the body as XML, and decodes the reply into the
//! operation's typed response (or a structured [`error::DomainError`]).
//!
//! ## Architecture
//!
//! ```text
//! Caller (typed operation)
//!     │
//!     ├── Gateway (service/)
//!     │
//!     ├── Route resolver + EndpointCatalog (routing/)
//!     ├── CredentialProvider → CertificateStore (credentials/)
//!     ├── Schema-driven XML codec (codec/)
//!     │
//!     └── Transport: HTTPS + client certificate (transport/)
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use sqlmgmt_gateway::{Gateway, GatewayConfig, GatewayError};
//! use sqlmgmt_gateway::operations::ListServers;
//!
//! # async fn run() -> Result<(), GatewayError> {
//! let config = GatewayConfig::from_env()?;
//! let gateway = Gateway::new(&config);
//! let servers = gateway
//!     .send(&ListServers { subscription_id: "my-subscription".to_string() })
//!     .await?;
//! for server in &servers.servers {
//!     println!("{}", server.name);
//! }
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod config;
pub mod credentials;
pub mod domain;
pub mod error;
pub mod operations;
pub mod routing;
pub mod service;
pub mod transport;

pub use config::GatewayConfig;
pub use domain::{DataCenter, Thumbprint, Verb};
pub use error::{DomainError, ErrorClass, GatewayError, Lookup};
pub use service::Gateway;
