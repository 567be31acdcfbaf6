//! Explicit wire schemas.
//!
//! A [`Schema`] declares, for one request or response kind, the root
//! element name and how each field maps onto XML. Schemas are plain
//! `static` data so they can reference each other for nesting.

/// How a field is laid out on the wire.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    /// Child element holding text: `<Name>value</Name>`.
    Element,
    /// Attribute on the record's own element.
    Attribute,
    /// Inline text of the record's own element.
    Text,
    /// Child element holding a nested record.
    Nested(&'static Schema),
    /// Wrapper element containing repeated `item` records:
    /// `<Versions><Version>..</Version></Versions>`.
    Array {
        /// Element name of each item.
        item: &'static str,
        /// Schema of each item.
        schema: &'static Schema,
    },
    /// Records repeated directly under the parent, without a wrapper.
    Repeated(&'static Schema),
}

/// One field of a [`Schema`].
#[derive(Debug, Clone, Copy)]
pub struct Field {
    /// Wire name (element or attribute name).
    pub name: &'static str,
    /// Layout on the wire.
    pub kind: FieldKind,
    /// Whether the field must be present.
    pub required: bool,
}

impl Field {
    /// Required text element.
    #[must_use]
    pub const fn required(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Element,
            required: true,
        }
    }

    /// Optional text element.
    #[must_use]
    pub const fn optional(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Element,
            required: false,
        }
    }

    /// Optional attribute.
    #[must_use]
    pub const fn attribute(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Attribute,
            required: false,
        }
    }

    /// Required inline text. The name only keys the value in a record.
    #[must_use]
    pub const fn text(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Text,
            required: true,
        }
    }

    /// Required nested record.
    #[must_use]
    pub const fn nested(name: &'static str, schema: &'static Schema) -> Self {
        Self {
            name,
            kind: FieldKind::Nested(schema),
            required: true,
        }
    }

    /// Wrapped array of records; an absent wrapper decodes as empty.
    #[must_use]
    pub const fn array(name: &'static str, item: &'static str, schema: &'static Schema) -> Self {
        Self {
            name,
            kind: FieldKind::Array { item, schema },
            required: false,
        }
    }

    /// Unwrapped repetition of records named `name`.
    #[must_use]
    pub const fn repeated(name: &'static str, schema: &'static Schema) -> Self {
        Self {
            name,
            kind: FieldKind::Repeated(schema),
            required: false,
        }
    }

    /// Marks the field optional.
    #[must_use]
    pub const fn or_absent(self) -> Self {
        Self {
            required: false,
            ..self
        }
    }

    /// Returns `true` for kinds that hold a list of records.
    #[must_use]
    pub const fn is_list(&self) -> bool {
        matches!(self.kind, FieldKind::Array { .. } | FieldKind::Repeated(_))
    }
}

/// Wire shape of one request or response kind.
///
/// Declared as `static` struct literals so the field slices live for the
/// whole program:
///
/// ```
/// use sqlmgmt_gateway::codec::{Field, Schema};
///
/// static QUOTA: Schema = Schema {
///     root: "ServiceResource",
///     namespace: None,
///     fields: &[Field::required("Name"), Field::optional("Value")],
/// };
/// assert!(QUOTA.child(b"Value").is_some());
/// ```
#[derive(Debug)]
pub struct Schema {
    /// Root element name.
    pub root: &'static str,
    /// Default namespace written on the root element when encoding.
    pub namespace: Option<&'static str>,
    /// Fields in wire order.
    pub fields: &'static [Field],
}

impl Schema {
    /// Finds the field mapped to a child element name.
    #[must_use]
    pub fn child(&self, element: &[u8]) -> Option<&Field> {
        self.fields.iter().find(|f| {
            !matches!(f.kind, FieldKind::Attribute | FieldKind::Text)
                && f.name.as_bytes() == element
        })
    }

    /// Finds the field mapped to an attribute name.
    #[must_use]
    pub fn attribute(&self, name: &[u8]) -> Option<&Field> {
        self.fields
            .iter()
            .find(|f| matches!(f.kind, FieldKind::Attribute) && f.name.as_bytes() == name)
    }

    /// Returns the inline-text field, if the schema declares one.
    #[must_use]
    pub fn text_field(&self) -> Option<&Field> {
        self.fields.iter().find(|f| matches!(f.kind, FieldKind::Text))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    static ITEM: Schema = Schema {
        root: "Item",
        namespace: None,
        fields: &[Field::required("Name")],
    };
    static SHAPE: Schema = Schema {
        root: "Shape",
        namespace: None,
        fields: &[
            Field::attribute("Id"),
            Field::text("Value"),
            Field::optional("Name"),
            Field::array("Items", "Item", &ITEM),
        ],
    };

    #[test]
    fn lookups_respect_kind() {
        assert!(SHAPE.child(b"Name").is_some());
        assert!(SHAPE.child(b"Items").is_some());
        assert!(SHAPE.child(b"Id").is_none());
        assert!(SHAPE.child(b"Value").is_none());
        assert!(SHAPE.attribute(b"Id").is_some());
        assert!(SHAPE.attribute(b"Name").is_none());
        assert_eq!(SHAPE.text_field().map(|f| f.name), Some("Value"));
    }

    #[test]
    fn list_kinds_are_optional() {
        let Some(items) = SHAPE.child(b"Items") else {
            panic!("Items field missing");
        };
        assert!(items.is_list());
        assert!(!items.required);
        assert!(!Field::required("X").or_absent().required);
    }
}
