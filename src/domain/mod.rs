//! Domain layer: region identifiers, credential references, and verbs.
//!
//! These are the small value types every other layer is keyed on. None of
//! them perform I/O.

pub mod region;
pub mod thumbprint;
pub mod verb;

pub use region::DataCenter;
pub use thumbprint::Thumbprint;
pub use verb::Verb;
