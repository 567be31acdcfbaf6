//! Schema-driven XML encoding and decoding over `quick-xml` events.

use std::borrow::Cow;

use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use super::schema::{Field, FieldKind, Schema};
use super::value::{Record, Value};
use crate::error::GatewayError;

type XmlWriter = Writer<Vec<u8>>;

/// Encodes `record` as an XML document shaped by `schema`.
///
/// Absent optional fields are omitted. Fields present in the record but
/// unknown to the schema are ignored.
///
/// # Errors
///
/// Returns [`GatewayError::Encoding`] if a required field is absent or a
/// value does not match its field kind.
pub fn encode(record: &Record, schema: &Schema) -> Result<Vec<u8>, GatewayError> {
    let mut writer = Writer::new(Vec::new());
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
        .map_err(encoding)?;
    write_record(&mut writer, schema.root, record, schema, schema.namespace)?;
    Ok(writer.into_inner())
}

fn write_record(
    writer: &mut XmlWriter,
    element: &str,
    record: &Record,
    schema: &Schema,
    namespace: Option<&str>,
) -> Result<(), GatewayError> {
    let mut start = BytesStart::new(element);
    if let Some(ns) = namespace {
        start.push_attribute(("xmlns", ns));
    }
    for field in schema
        .fields
        .iter()
        .filter(|f| matches!(f.kind, FieldKind::Attribute))
    {
        if let Some(text) = scalar(record, field, element)? {
            start.push_attribute((field.name, text));
        }
    }
    writer.write_event(Event::Start(start)).map_err(encoding)?;

    for field in schema.fields {
        match field.kind {
            FieldKind::Attribute => {}
            FieldKind::Text => {
                if let Some(text) = scalar(record, field, element)? {
                    writer
                        .write_event(Event::Text(BytesText::new(text)))
                        .map_err(encoding)?;
                }
            }
            FieldKind::Element => {
                if let Some(text) = scalar(record, field, element)? {
                    writer
                        .create_element(field.name)
                        .write_text_content(BytesText::new(text))
                        .map_err(encoding)?;
                }
            }
            FieldKind::Nested(nested) => match record.get(field.name) {
                Some(Value::Record(child)) => {
                    write_record(writer, field.name, child, nested, None)?;
                }
                Some(_) => return Err(mismatch(element, field, "a record")),
                None if field.required => return Err(missing(element, field)),
                None => {}
            },
            FieldKind::Array { item, schema: items } => match record.get(field.name) {
                Some(Value::List(records)) => {
                    writer
                        .write_event(Event::Start(BytesStart::new(field.name)))
                        .map_err(encoding)?;
                    for child in records {
                        write_record(writer, item, child, items, None)?;
                    }
                    writer
                        .write_event(Event::End(BytesEnd::new(field.name)))
                        .map_err(encoding)?;
                }
                Some(_) => return Err(mismatch(element, field, "a list")),
                None => {}
            },
            FieldKind::Repeated(items) => {
                for child in list(record, field, element)? {
                    write_record(writer, field.name, child, items, None)?;
                }
            }
        }
    }

    writer
        .write_event(Event::End(BytesEnd::new(element)))
        .map_err(encoding)?;
    Ok(())
}

fn scalar<'r>(
    record: &'r Record,
    field: &Field,
    element: &str,
) -> Result<Option<&'r str>, GatewayError> {
    match record.get(field.name) {
        Some(Value::Text(text)) => Ok(Some(text)),
        Some(_) => Err(mismatch(element, field, "text")),
        None if field.required => Err(missing(element, field)),
        None => Ok(None),
    }
}

fn list<'r>(
    record: &'r Record,
    field: &Field,
    element: &str,
) -> Result<&'r [Record], GatewayError> {
    match record.get(field.name) {
        Some(Value::List(records)) => Ok(records),
        Some(_) => Err(mismatch(element, field, "a list")),
        None => Ok(&[]),
    }
}

fn encoding(err: impl std::fmt::Display) -> GatewayError {
    GatewayError::Encoding(err.to_string())
}

fn missing(element: &str, field: &Field) -> GatewayError {
    GatewayError::Encoding(format!("{element}: required field {} is absent", field.name))
}

fn mismatch(element: &str, field: &Field, expected: &str) -> GatewayError {
    GatewayError::Encoding(format!(
        "{element}: field {} should hold {expected}",
        field.name
    ))
}

/// Decodes an XML document into a record shaped by `schema`.
///
/// Namespaces are ignored, elements unknown to the schema are skipped, and
/// elements marked `nil="true"` decode as absent. Text is kept verbatim;
/// only whitespace between child elements is dropped.
///
/// # Errors
///
/// Returns [`GatewayError::MalformedPayload`] if the bytes are not UTF-8 or
/// well-formed XML, the root element differs from `schema.root`, or a
/// required field is absent.
pub fn decode(bytes: &[u8], schema: &Schema) -> Result<Record, GatewayError> {
    let text = std::str::from_utf8(bytes).map_err(GatewayError::malformed)?;
    let mut reader = Reader::from_str(text);

    loop {
        match reader.read_event().map_err(GatewayError::malformed)? {
            Event::Start(start) => {
                expect_root(&start, schema)?;
                return read_record(&mut reader, &start, schema, false);
            }
            Event::Empty(start) => {
                expect_root(&start, schema)?;
                return read_record(&mut reader, &start, schema, true);
            }
            Event::Eof => return Err(GatewayError::malformed("document has no root element")),
            _ => {}
        }
    }
}

fn expect_root(start: &BytesStart<'_>, schema: &Schema) -> Result<(), GatewayError> {
    let name = start.local_name();
    if name.as_ref() == schema.root.as_bytes() {
        Ok(())
    } else {
        Err(GatewayError::malformed(format!(
            "expected root <{}>, found <{}>",
            schema.root,
            String::from_utf8_lossy(name.as_ref())
        )))
    }
}

fn read_record(
    reader: &mut Reader<&[u8]>,
    start: &BytesStart<'_>,
    schema: &Schema,
    empty: bool,
) -> Result<Record, GatewayError> {
    let mut record = Record::new();

    for attr in start.attributes() {
        let attr = attr.map_err(GatewayError::malformed)?;
        if let Some(field) = schema.attribute(attr.key.local_name().as_ref()) {
            let value = attr.unescape_value().map_err(GatewayError::malformed)?;
            record.insert(field.name, Value::Text(value.into_owned()));
        }
    }

    let mut text = String::new();
    if !empty {
        let mut saw_child = false;
        loop {
            match reader.read_event().map_err(GatewayError::malformed)? {
                Event::Start(child) => {
                    saw_child = true;
                    let field = schema.child(child.local_name().as_ref()).copied();
                    match field {
                        Some(field) => read_field(reader, &child, &field, &mut record, false)?,
                        None => {
                            reader
                                .read_to_end(child.name())
                                .map_err(GatewayError::malformed)?;
                        }
                    }
                }
                Event::Empty(child) => {
                    saw_child = true;
                    if let Some(field) = schema.child(child.local_name().as_ref()).copied() {
                        read_field(reader, &child, &field, &mut record, true)?;
                    }
                }
                Event::Text(t) => text.push_str(&t.unescape().map_err(GatewayError::malformed)?),
                Event::CData(c) => text.push_str(&cdata(&c)?),
                Event::End(_) => break,
                Event::Eof => {
                    return Err(GatewayError::malformed(format!(
                        "unexpected end of document inside <{}>",
                        schema.root
                    )));
                }
                _ => {}
            }
        }
        if saw_child && text.trim().is_empty() {
            text.clear();
        }
    }
    if let Some(field) = schema.text_field() {
        record.insert(field.name, Value::Text(text));
    }

    for field in schema.fields.iter().filter(|f| f.required) {
        if !record.contains(field.name) {
            return Err(GatewayError::malformed(format!(
                "<{}> is missing required field {}",
                schema.root, field.name
            )));
        }
    }
    Ok(record)
}

fn read_field(
    reader: &mut Reader<&[u8]>,
    start: &BytesStart<'_>,
    field: &Field,
    record: &mut Record,
    empty: bool,
) -> Result<(), GatewayError> {
    match field.kind {
        FieldKind::Element => {
            if is_nil(start) {
                if !empty {
                    reader
                        .read_to_end(start.name())
                        .map_err(GatewayError::malformed)?;
                }
                return Ok(());
            }
            let text = if empty {
                String::new()
            } else {
                read_text(reader)?
            };
            record.insert(field.name, Value::Text(text));
        }
        FieldKind::Nested(schema) => {
            if is_nil(start) {
                if !empty {
                    reader
                        .read_to_end(start.name())
                        .map_err(GatewayError::malformed)?;
                }
                return Ok(());
            }
            let child = read_record(reader, start, schema, empty)?;
            record.insert(field.name, Value::Record(child));
        }
        FieldKind::Array { item, schema } => {
            let mut items = Vec::new();
            if !empty {
                loop {
                    match reader.read_event().map_err(GatewayError::malformed)? {
                        Event::Start(child) if child.local_name().as_ref() == item.as_bytes() => {
                            items.push(read_record(reader, &child, schema, false)?);
                        }
                        Event::Empty(child) if child.local_name().as_ref() == item.as_bytes() => {
                            items.push(read_record(reader, &child, schema, true)?);
                        }
                        Event::Start(child) => {
                            reader
                                .read_to_end(child.name())
                                .map_err(GatewayError::malformed)?;
                        }
                        Event::End(_) => break,
                        Event::Eof => {
                            return Err(GatewayError::malformed(format!(
                                "unexpected end of document inside <{}>",
                                field.name
                            )));
                        }
                        _ => {}
                    }
                }
            }
            record.set_list(field.name, items);
        }
        FieldKind::Repeated(schema) => {
            let child = read_record(reader, start, schema, empty)?;
            if let Some(items) = record.list_mut(field.name) {
                items.push(child);
            }
        }
        FieldKind::Attribute | FieldKind::Text => {}
    }
    Ok(())
}

/// Collects the text content of the current element up to its end tag,
/// skipping any nested markup.
fn read_text(reader: &mut Reader<&[u8]>) -> Result<String, GatewayError> {
    let mut text = String::new();
    loop {
        match reader.read_event().map_err(GatewayError::malformed)? {
            Event::Text(t) => text.push_str(&t.unescape().map_err(GatewayError::malformed)?),
            Event::CData(c) => text.push_str(&cdata(&c)?),
            Event::Start(child) => {
                reader
                    .read_to_end(child.name())
                    .map_err(GatewayError::malformed)?;
            }
            Event::End(_) => return Ok(text),
            Event::Eof => return Err(GatewayError::malformed("unexpected end of document")),
            _ => {}
        }
    }
}

fn cdata<'a>(c: &'a quick_xml::events::BytesCData<'_>) -> Result<Cow<'a, str>, GatewayError> {
    std::str::from_utf8(c)
        .map(Cow::Borrowed)
        .map_err(GatewayError::malformed)
}

fn is_nil(start: &BytesStart<'_>) -> bool {
    start.attributes().flatten().any(|attr| {
        attr.key.local_name().as_ref() == b"nil" && attr.value.as_ref() == b"true"
    })
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    static EDITION: Schema = Schema {
        root: "Edition",
        namespace: None,
        fields: &[Field::required("Name"), Field::optional("IsDefault")],
    };

    static VERSION: Schema = Schema {
        root: "Version",
        namespace: None,
        fields: &[
            Field::required("Name"),
            Field::array("Editions", "Edition", &EDITION),
        ],
    };

    static METADATA: Schema = Schema {
        root: "ServiceResource",
        namespace: Some("http://schemas.microsoft.com/windowsazure"),
        fields: &[
            Field::required("Name"),
            Field::optional("SizeMB"),
            Field::array("Versions", "Version", &VERSION),
        ],
    };

    static SERVER_NAME: Schema = Schema {
        root: "ServerName",
        namespace: None,
        fields: &[
            Field::attribute("FullyQualifiedDomainName"),
            Field::text("Name"),
        ],
    };

    static RULE: Schema = Schema {
        root: "ServiceResource",
        namespace: None,
        fields: &[Field::required("Name")],
    };

    static RULES: Schema = Schema {
        root: "ServiceResources",
        namespace: None,
        fields: &[Field::repeated("ServiceResource", &RULE)],
    };

    fn decode_str(xml: &str, schema: &Schema) -> Record {
        match decode(xml.as_bytes(), schema) {
            Ok(record) => record,
            Err(err) => panic!("decode failed: {err}"),
        }
    }

    fn encode_str(record: &Record, schema: &Schema) -> String {
        match encode(record, schema) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(err) => panic!("encode failed: {err}"),
        }
    }

    fn metadata_record() -> Record {
        let edition = Record::new()
            .with("Name", &"Basic".to_string())
            .with("IsDefault", &true);
        let mut version = Record::new().with("Name", &"12.0".to_string());
        version.set_list("Editions", vec![edition]);
        let mut record = Record::new().with("Name", &"sub".to_string());
        record.set_list("Versions", vec![version]);
        record
    }

    #[test]
    fn encodes_namespace_and_nested_arrays() {
        let xml = encode_str(&metadata_record(), &METADATA);
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
        assert!(xml.contains(
            "<ServiceResource xmlns=\"http://schemas.microsoft.com/windowsazure\">"
        ));
        assert!(xml.contains(
            "<Versions><Version><Name>12.0</Name><Editions><Edition><Name>Basic</Name>\
             <IsDefault>true</IsDefault></Edition></Editions></Version></Versions>"
        ));
    }

    #[test]
    fn absent_optional_is_omitted() {
        let xml = encode_str(&metadata_record(), &METADATA);
        assert!(!xml.contains("SizeMB"));
    }

    #[test]
    fn round_trip_preserves_record() {
        let record = metadata_record();
        let xml = encode_str(&record, &METADATA);
        assert_eq!(decode_str(&xml, &METADATA), record);
    }

    #[test]
    fn round_trip_attribute_and_text() {
        let record = Record::new()
            .with("FullyQualifiedDomainName", &"abc.database.windows.net".to_string())
            .with("Name", &"abc".to_string());
        let xml = encode_str(&record, &SERVER_NAME);
        assert!(xml.contains(
            "<ServerName FullyQualifiedDomainName=\"abc.database.windows.net\">abc</ServerName>"
        ));
        assert_eq!(decode_str(&xml, &SERVER_NAME), record);
    }

    #[test]
    fn text_is_escaped() {
        let record = Record::new().with("Name", &"a<b&c".to_string());
        let xml = encode_str(&record, &RULE);
        assert!(xml.contains("<Name>a&lt;b&amp;c</Name>"));
        assert_eq!(decode_str(&xml, &RULE).text("Name"), Some("a<b&c"));
    }

    #[test]
    fn missing_required_fails_encoding() {
        assert!(matches!(
            encode(&Record::new(), &RULE),
            Err(GatewayError::Encoding(_))
        ));
    }

    #[test]
    fn decodes_repeated_without_wrapper() {
        let record = decode_str(
            "<ServiceResources xmlns=\"http://schemas.microsoft.com/windowsazure\">\
               <ServiceResource><Name>a</Name></ServiceResource>\
               <ServiceResource><Name>b</Name><Extra><Deep/></Extra></ServiceResource>\
             </ServiceResources>",
            &RULES,
        );
        let names: Vec<_> = record
            .list("ServiceResource")
            .iter()
            .filter_map(|r| r.text("Name"))
            .collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn empty_list_document_decodes() {
        let record = decode_str("<ServiceResources/>", &RULES);
        assert!(record.list("ServiceResource").is_empty());
    }

    #[test]
    fn nil_element_is_absent() {
        let record = decode_str(
            "<ServiceResource xmlns:i=\"http://www.w3.org/2001/XMLSchema-instance\">\
               <Name>db</Name><SizeMB i:nil=\"true\"/>\
             </ServiceResource>",
            &METADATA,
        );
        assert!(!record.contains("SizeMB"));
        assert!(record.list("Versions").is_empty());
    }

    #[test]
    fn empty_element_is_empty_text() {
        let record = decode_str(
            "<ServiceResource><Name>db</Name><SizeMB></SizeMB></ServiceResource>",
            &METADATA,
        );
        assert_eq!(record.text("SizeMB"), Some(""));
    }

    #[test]
    fn round_trip_keeps_edge_whitespace() {
        let record = Record::new()
            .with("Name", &"  db  ".to_string())
            .with("SizeMB", &"\n 10 \t".to_string());
        let xml = encode_str(&record, &METADATA);
        assert!(xml.contains("<Name>  db  </Name>"));
        assert_eq!(decode_str(&xml, &METADATA), record);

        let name = Record::new()
            .with("FullyQualifiedDomainName", &"x".to_string())
            .with("Name", &" abc ".to_string());
        assert_eq!(decode_str(&encode_str(&name, &SERVER_NAME), &SERVER_NAME), name);
    }

    #[test]
    fn indentation_between_children_is_ignored() {
        let record = decode_str(
            "<ServiceResource>\n  <Name>db</Name>\n  <SizeMB>5</SizeMB>\n</ServiceResource>",
            &METADATA,
        );
        assert_eq!(record.text("Name"), Some("db"));
        assert_eq!(record.text("SizeMB"), Some("5"));
    }

    #[test]
    fn empty_inline_text_round_trips() {
        let record = Record::new()
            .with("FullyQualifiedDomainName", &"x".to_string())
            .with("Name", &String::new());
        let xml = encode_str(&record, &SERVER_NAME);
        assert_eq!(decode_str(&xml, &SERVER_NAME), record);

        let self_closing = decode_str("<ServerName FullyQualifiedDomainName=\"x\"/>", &SERVER_NAME);
        assert_eq!(self_closing.text("Name"), Some(""));
    }

    #[test]
    fn wrong_root_is_malformed() {
        assert!(matches!(
            decode(b"<Servers/>", &RULES),
            Err(GatewayError::MalformedPayload(_))
        ));
    }

    #[test]
    fn missing_required_is_malformed() {
        assert!(matches!(
            decode(b"<ServiceResource><State>Normal</State></ServiceResource>", &RULE),
            Err(GatewayError::MalformedPayload(_))
        ));
    }

    #[test]
    fn truncated_document_is_malformed() {
        assert!(matches!(
            decode(b"<ServiceResource><Name>x</Name>", &RULE),
            Err(GatewayError::MalformedPayload(_))
        ));
    }

    #[test]
    fn empty_body_is_malformed() {
        assert!(matches!(
            decode(b"", &RULE),
            Err(GatewayError::MalformedPayload(_))
        ));
    }
}
