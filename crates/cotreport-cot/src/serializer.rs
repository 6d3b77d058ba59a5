//! XML serialization for CoT events

use crate::event::CotEvent;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("XML write error: {0}")]
    Xml(String),

    #[error("Serialized event is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Builds the XML document for one position event.
///
/// Values are inserted verbatim; only the escaping quick-xml applies to
/// attribute values (`&`, `<`, `>`, quotes) is performed.
pub fn build_event_message(
    now_z: &str,
    stale_z: &str,
    uid: &str,
    lat: &str,
    lon: &str,
) -> Result<String, BuildError> {
    serialize_event(&CotEvent::new(now_z, stale_z, uid, lat, lon))
}

/// Serializes an event to a standalone XML document.
///
/// ```text
/// <?xml version="1.0" standalone="yes"?>
/// <event version="2.0" type="a-G" uid=".." how="m-g" time=".." start=".." stale="..">
///     <point lat=".." lon=".." hae="0" ce="5" le="5"/>
/// </event>
/// ```
pub fn serialize_event(event: &CotEvent) -> Result<String, BuildError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b'\t', 1);

    write(
        &mut writer,
        Event::Decl(BytesDecl::new("1.0", None, Some("yes"))),
    )?;

    let mut root = BytesStart::new("event");
    root.push_attribute(("version", event.version.as_str()));
    root.push_attribute(("type", event.event_type.as_str()));
    root.push_attribute(("uid", event.uid.as_str()));
    root.push_attribute(("how", event.how.as_str()));
    root.push_attribute(("time", event.time.as_str()));
    root.push_attribute(("start", event.start.as_str()));
    root.push_attribute(("stale", event.stale.as_str()));
    write(&mut writer, Event::Start(root))?;

    let mut point = BytesStart::new("point");
    point.push_attribute(("lat", event.point.lat.as_str()));
    point.push_attribute(("lon", event.point.lon.as_str()));
    point.push_attribute(("hae", event.point.hae.as_str()));
    point.push_attribute(("ce", event.point.ce.as_str()));
    point.push_attribute(("le", event.point.le.as_str()));
    write(&mut writer, Event::Empty(point))?;

    write(&mut writer, Event::End(BytesEnd::new("event")))?;

    let mut xml = String::from_utf8(writer.into_inner())?;
    xml.push('\n');
    Ok(xml)
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), BuildError> {
    writer
        .write_event(event)
        .map_err(|e| BuildError::Xml(e.to_string()))
}
