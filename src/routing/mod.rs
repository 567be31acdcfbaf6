//! Routing: concrete paths from templates and base URLs from scope.

pub mod endpoint;
pub mod route;

pub use endpoint::{EndpointCatalog, MANAGEMENT_URL, join};
pub use route::{PathParams, QueryParams, resolve};
