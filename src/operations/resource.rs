//! Fields common to every management resource.

use serde::{Deserialize, Serialize};

use crate::codec::Record;
use crate::error::GatewayError;

/// Declares a management `ServiceResource` schema: the common header
/// fields followed by the resource's own fields.
macro_rules! resource_schema {
    ($($field:expr),* $(,)?) => {
        $crate::codec::Schema {
            root: "ServiceResource",
            namespace: Some($crate::operations::MANAGEMENT_NS),
            fields: &[
                $crate::codec::Field::required("Name"),
                $crate::codec::Field::optional("Type"),
                $crate::codec::Field::optional("State"),
                $crate::codec::Field::optional("SelfLink"),
                $crate::codec::Field::optional("ParentLink"),
                $($field),*
            ],
        }
    };
}

/// Declares a `ServiceResources` list schema over an item schema.
macro_rules! resource_list_schema {
    ($item:expr) => {
        $crate::codec::Schema {
            root: "ServiceResources",
            namespace: Some($crate::operations::MANAGEMENT_NS),
            fields: &[$crate::codec::Field::repeated("ServiceResource", $item)],
        }
    };
}

pub(crate) use {resource_list_schema, resource_schema};

/// Name, type, state and links carried by every resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceHeader {
    /// Resource name.
    pub name: String,
    /// Resource type, e.g. `Microsoft.SqlAzure.Database`.
    pub kind: Option<String>,
    /// Provisioning state.
    pub state: Option<String>,
    /// Link to the resource itself.
    pub self_link: Option<String>,
    /// Link to the parent resource.
    pub parent_link: Option<String>,
}

impl ResourceHeader {
    /// Creates a header carrying only a name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub(crate) fn read(record: &Record) -> Result<Self, GatewayError> {
        Ok(Self {
            name: record.get_as("Name")?,
            kind: record.get_opt("Type")?,
            state: record.get_opt("State")?,
            self_link: record.get_opt("SelfLink")?,
            parent_link: record.get_opt("ParentLink")?,
        })
    }

    pub(crate) fn write(&self, record: &mut Record) {
        record.set("Name", &self.name);
        record.set_opt("Type", self.kind.as_ref());
        record.set_opt("State", self.state.as_ref());
        record.set_opt("SelfLink", self.self_link.as_ref());
        record.set_opt("ParentLink", self.parent_link.as_ref());
    }
}
