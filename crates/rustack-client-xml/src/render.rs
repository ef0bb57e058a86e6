//! Depth-first rendering of a [`Document`] into XML bytes.
//!
//! Per element: the element's own namespace declaration first, then declarations carried by
//! attribute children, then attributes in insertion order, then escaped text, then element
//! children in insertion order. Text and attribute values go through quick-xml's full escape
//! (`<`, `>`, `&`, `'`, `"`).

use std::io::Write;

use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

use crate::error::XmlError;
use crate::node::Location;
use crate::writer::{Document, NodeId, ROOT};

pub(crate) fn render(doc: &Document) -> Result<Vec<u8>, XmlError> {
    let mut buf = Vec::with_capacity(512);
    let root = doc.node(ROOT);
    if root.detached {
        return Ok(buf);
    }
    if root.info.location == Location::Attribute {
        return Err(XmlError::InvalidNode(format!(
            "attribute `{}` cannot be the document root",
            root.info.name
        )));
    }

    let mut writer = Writer::new(&mut buf);
    write_element(&mut writer, doc, ROOT)?;
    Ok(buf)
}

fn write_element<W: Write>(
    writer: &mut Writer<W>,
    doc: &Document,
    id: NodeId,
) -> Result<(), XmlError> {
    let node = doc.node(id);
    check_name(&node.info.name)?;

    let mut start = BytesStart::new(node.info.name.as_str());
    let mut declared: Vec<(&str, &str)> = Vec::new();

    if let Some(ns) = &node.info.namespace {
        let decl = ns.declaration_name();
        start.push_attribute((decl.as_str(), ns.uri.as_str()));
        declared.push((ns.prefix.as_str(), ns.uri.as_str()));
    }

    let (attributes, elements): (Vec<NodeId>, Vec<NodeId>) = node
        .children
        .iter()
        .copied()
        .filter(|&c| !doc.node(c).detached)
        .partition(|&c| doc.node(c).info.location == Location::Attribute);

    for &attr_id in &attributes {
        let attr = doc.node(attr_id);
        let Some(ns) = &attr.info.namespace else {
            continue;
        };
        match declared.iter().find(|(prefix, _)| *prefix == ns.prefix) {
            Some((_, uri)) if *uri == ns.uri => {}
            Some((prefix, uri)) => {
                return Err(XmlError::InvalidNode(format!(
                    "attribute `{}` binds prefix `{prefix}` to `{}`, already bound to `{uri}`",
                    attr.info.name, ns.uri
                )));
            }
            None => {
                let decl = ns.declaration_name();
                start.push_attribute((decl.as_str(), ns.uri.as_str()));
                declared.push((ns.prefix.as_str(), ns.uri.as_str()));
            }
        }
    }

    for &attr_id in &attributes {
        let attr = doc.node(attr_id);
        check_name(&attr.info.name)?;
        if !attr.children.is_empty() {
            return Err(XmlError::InvalidNode(format!(
                "attribute `{}` cannot have children",
                attr.info.name
            )));
        }
        start.push_attribute((attr.info.name.as_str(), attr.content.as_str()));
    }

    if node.content.is_empty() && elements.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    if !node.content.is_empty() {
        writer.write_event(Event::Text(BytesText::new(&node.content)))?;
    }
    for child in elements {
        write_element(writer, doc, child)?;
    }
    writer.write_event(Event::End(BytesEnd::new(node.info.name.as_str())))?;
    Ok(())
}

fn check_name(name: &str) -> Result<(), XmlError> {
    if name.is_empty() {
        return Err(XmlError::InvalidNode("node name must not be empty".to_owned()));
    }
    Ok(())
}
