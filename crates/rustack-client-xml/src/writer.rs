//! The node tree and the writer handles used to populate it.
//!
//! A [`Document`] owns every node in a flat arena; parents own their children by index, and
//! the parent index on each node is only used to address siblings (flattened lists and maps).
//! A [`Writer`] is a mutable borrow of the document plus the index of the node it writes to,
//! so handing out child writers never creates a second owner.
//!
//! Generated operation code drives the tree the same way for every shape:
//!
//! ```
//! use rustack_client_xml::{Document, NodeInfo, XmlError};
//!
//! # fn main() -> Result<(), XmlError> {
//! let mut doc = Document::new(NodeInfo::new("test"));
//! let mut root = doc.root();
//! root.child("a").write("a")?;
//! root.child(NodeInfo::new("b").attribute()).write("b")?;
//! assert_eq!(doc.to_xml()?, b"<test b=\"b\"><a>a</a></test>");
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, Utc};

use crate::error::XmlError;
use crate::node::NodeInfo;
use crate::value::{TimestampFormat, XmlValue, encode_blob};

pub(crate) type NodeId = usize;

pub(crate) const ROOT: NodeId = 0;

#[derive(Debug)]
pub(crate) struct Node {
    pub(crate) info: NodeInfo,
    pub(crate) content: String,
    pub(crate) children: Vec<NodeId>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) detached: bool,
}

/// An in-memory XML node tree rooted at a single element.
#[derive(Debug)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Document {
    /// Create a document whose root node is described by `root`.
    ///
    /// Root validity (non-empty name, element location) is checked when rendering.
    #[must_use]
    pub fn new(root: impl Into<NodeInfo>) -> Self {
        Self {
            nodes: vec![Node {
                info: root.into(),
                content: String::new(),
                children: Vec::new(),
                parent: None,
                detached: false,
            }],
        }
    }

    /// A writer for the root node.
    pub fn root(&mut self) -> Writer<'_> {
        Writer {
            doc: self,
            id: ROOT,
        }
    }

    /// Render the tree as UTF-8 XML without a declaration.
    ///
    /// Rendering does not modify the tree, so rendering twice yields identical bytes.
    ///
    /// # Errors
    ///
    /// Returns `XmlError::InvalidNode` if the tree breaks a structural rule, or an I/O error
    /// from the underlying quick-xml writer.
    pub fn to_xml(&self) -> Result<Vec<u8>, XmlError> {
        crate::render::render(self)
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    fn push(&mut self, info: NodeInfo, parent: NodeId) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node {
            info,
            content: String::new(),
            children: Vec::new(),
            parent: Some(parent),
            detached: false,
        });
        self.nodes[parent].children.push(id);
        id
    }
}

/// Trait for shapes that know how to write themselves into a [`Writer`].
///
/// Implementors write their members as children (or attributes) of the writer's node. The
/// node itself has already been created by the caller.
pub trait XmlSerialize {
    /// Write this value's members into `writer`.
    ///
    /// # Errors
    ///
    /// Returns `XmlError` if a member cannot be represented.
    fn serialize_xml(&self, writer: &mut Writer<'_>) -> Result<(), XmlError>;
}

/// Node names used for map entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapNodeInfo {
    /// The wrapper around each key/value pair (ignored for flattened maps).
    pub entry: NodeInfo,
    /// The key node.
    pub key: NodeInfo,
    /// The value node.
    pub value: NodeInfo,
}

impl Default for MapNodeInfo {
    fn default() -> Self {
        Self {
            entry: NodeInfo::new("entry"),
            key: NodeInfo::new("key"),
            value: NodeInfo::new("value"),
        }
    }
}

/// A handle to one node of a [`Document`].
#[derive(Debug)]
pub struct Writer<'d> {
    doc: &'d mut Document,
    id: NodeId,
}

impl Writer<'_> {
    /// The descriptor of the node this writer targets.
    #[must_use]
    pub fn node_info(&self) -> &NodeInfo {
        &self.doc.node(self.id).info
    }

    /// Whether this node has been detached from the tree.
    #[must_use]
    pub fn is_detached(&self) -> bool {
        self.doc.node(self.id).detached
    }

    /// A writer for the child described by `info`, created if no such child exists yet.
    ///
    /// Repeated calls with an equal descriptor return the same node, so a later scalar write
    /// overwrites the earlier one.
    pub fn child(&mut self, info: impl Into<NodeInfo>) -> Writer<'_> {
        let info = info.into();
        let existing = self
            .doc
            .node(self.id)
            .children
            .iter()
            .copied()
            .find(|&c| self.doc.node(c).info == info);
        let id = match existing {
            Some(id) => id,
            None => self.doc.push(info, self.id),
        };
        Writer {
            doc: &mut *self.doc,
            id,
        }
    }

    /// A writer for a new child described by `info`, even if an equal child already exists.
    pub fn append(&mut self, info: impl Into<NodeInfo>) -> Writer<'_> {
        let id = self.doc.push(info.into(), self.id);
        Writer {
            doc: &mut *self.doc,
            id,
        }
    }

    /// Remove this node and its subtree from the rendered output.
    pub fn detach(&mut self) {
        let node = &mut self.doc.nodes[self.id];
        node.detached = true;
        if let Some(parent) = node.parent {
            let id = self.id;
            self.doc.nodes[parent].children.retain(|&c| c != id);
        }
    }

    /// Replace this node's raw text content. Escaping happens at render time.
    pub fn set_content(&mut self, text: impl Into<String>) {
        self.doc.nodes[self.id].content = text.into();
    }

    /// Write a scalar as this node's content; an absent value detaches the node.
    ///
    /// # Errors
    ///
    /// Infallible for the built-in scalar types; the `Result` keeps call sites uniform.
    pub fn write<V: XmlValue>(&mut self, value: V) -> Result<(), XmlError> {
        match value.xml_text() {
            Some(text) => self.set_content(text),
            None => self.detach(),
        }
        Ok(())
    }

    /// Write a timestamp in the given format; `None` detaches the node.
    ///
    /// # Errors
    ///
    /// Infallible; see [`Writer::write`].
    pub fn write_timestamp(
        &mut self,
        value: Option<&DateTime<Utc>>,
        format: TimestampFormat,
    ) -> Result<(), XmlError> {
        match value {
            Some(dt) => self.set_content(format.format(dt)),
            None => self.detach(),
        }
        Ok(())
    }

    /// Write binary data as base64; `None` detaches the node.
    ///
    /// # Errors
    ///
    /// Infallible; see [`Writer::write`].
    pub fn write_blob(&mut self, value: Option<&[u8]>) -> Result<(), XmlError> {
        match value {
            Some(data) => self.set_content(encode_blob(data)),
            None => self.detach(),
        }
        Ok(())
    }

    /// Write a structure's members into this node; `None` detaches the node.
    ///
    /// # Errors
    ///
    /// Propagates any error raised by the structure's [`XmlSerialize`] implementation.
    pub fn write_structure<T: XmlSerialize + ?Sized>(
        &mut self,
        value: Option<&T>,
    ) -> Result<(), XmlError> {
        match value {
            Some(v) => v.serialize_xml(self),
            None => {
                self.detach();
                Ok(())
            }
        }
    }

    /// Write a list; `None` detaches the node.
    ///
    /// A wrapped list writes each member as a new `member` child of this node. A flattened
    /// list writes each member as a sibling named after this node and then detaches this
    /// node.
    ///
    /// # Errors
    ///
    /// Returns `XmlError::InvalidNode` for a flattened list on the root node, or any error
    /// raised by `write_member`.
    pub fn write_list<T, F>(
        &mut self,
        values: Option<&[T]>,
        member: &NodeInfo,
        flattened: bool,
        mut write_member: F,
    ) -> Result<(), XmlError>
    where
        F: FnMut(&T, &mut Writer<'_>) -> Result<(), XmlError>,
    {
        let Some(values) = values else {
            self.detach();
            return Ok(());
        };

        if flattened {
            let parent = self.flattening_parent()?;
            let info = self.node_info().clone();
            for value in values {
                let id = self.doc.push(info.clone(), parent);
                let mut sibling = Writer {
                    doc: &mut *self.doc,
                    id,
                };
                write_member(value, &mut sibling)?;
            }
            self.detach();
        } else {
            for value in values {
                let mut child = self.append(member.clone());
                write_member(value, &mut child)?;
            }
        }
        Ok(())
    }

    /// Write a map from its entries in iteration order; `None` detaches the node.
    ///
    /// Wrapped maps nest each pair in an `entry` node; flattened maps write each pair as a
    /// sibling named after this node and then detach this node.
    ///
    /// # Errors
    ///
    /// Returns `XmlError::InvalidNode` for a flattened map on the root node, or any error
    /// raised by `write_value`.
    pub fn write_map<K, V, I, F>(
        &mut self,
        entries: Option<I>,
        names: &MapNodeInfo,
        flattened: bool,
        mut write_value: F,
    ) -> Result<(), XmlError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: XmlValue,
        F: FnMut(V, &mut Writer<'_>) -> Result<(), XmlError>,
    {
        let Some(entries) = entries else {
            self.detach();
            return Ok(());
        };

        let parent = if flattened {
            Some((self.flattening_parent()?, self.node_info().clone()))
        } else {
            None
        };

        for (key, value) in entries {
            let id = match &parent {
                Some((parent, info)) => self.doc.push(info.clone(), *parent),
                None => self.doc.push(names.entry.clone(), self.id),
            };
            let mut entry = Writer {
                doc: &mut *self.doc,
                id,
            };
            entry.child(names.key.clone()).write(key)?;
            write_value(value, &mut entry.child(names.value.clone()))?;
        }

        if flattened {
            self.detach();
        }
        Ok(())
    }

    fn flattening_parent(&self) -> Result<NodeId, XmlError> {
        self.doc.node(self.id).parent.ok_or_else(|| {
            XmlError::InvalidNode(format!(
                "flattened collection `{}` needs a parent element",
                self.node_info().name
            ))
        })
    }
}

/// Build a document rooted at `root`, populate it with `write`, and render it.
///
/// The closure is invoked exactly once. This is the entry point generated operation code
/// uses to turn a typed input into a request body.
///
/// # Errors
///
/// Returns the first error raised by `write`, or any rendering error.
pub fn write_document<T, F>(root: NodeInfo, value: &T, write: F) -> Result<Vec<u8>, XmlError>
where
    T: ?Sized,
    F: FnOnce(&T, &mut Writer<'_>) -> Result<(), XmlError>,
{
    let mut doc = Document::new(root);
    write(value, &mut doc.root())?;
    let xml = doc.to_xml()?;
    tracing::trace!(bytes = xml.len(), "rendered XML document");
    Ok(xml)
}
