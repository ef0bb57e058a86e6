//! Node descriptors used to address positions in a document tree.

/// Where a node renders relative to its parent element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Location {
    /// A child element.
    #[default]
    Element,
    /// An inline `name="value"` pair on the parent element.
    Attribute,
}

/// An XML namespace binding.
///
/// An empty prefix declares the default namespace (`xmlns="..."`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Namespace {
    /// Namespace prefix; empty for the default namespace.
    pub prefix: String,
    /// Namespace URI.
    pub uri: String,
}

impl Namespace {
    /// Create a namespace binding.
    #[must_use]
    pub fn new(prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            uri: uri.into(),
        }
    }

    /// Whether this binding declares the default namespace.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.prefix.is_empty()
    }

    /// The attribute name used to declare this namespace.
    #[must_use]
    pub fn declaration_name(&self) -> String {
        if self.is_default() {
            "xmlns".to_owned()
        } else {
            format!("xmlns:{}", self.prefix)
        }
    }
}

/// Describes a node: its name, location, and optional namespace.
///
/// Two descriptors are equal when all three parts match; writers use that equality to find
/// an existing child before creating a new one.
///
/// # Examples
///
/// ```
/// use rustack_client_xml::{Location, NodeInfo};
///
/// let info = NodeInfo::new("b").attribute();
/// assert_eq!(info.location, Location::Attribute);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeInfo {
    /// Node name, including any prefix the caller wants rendered.
    pub name: String,
    /// Element or attribute.
    pub location: Location,
    /// Namespace declared on this node, if any.
    pub namespace: Option<Namespace>,
}

impl NodeInfo {
    /// Create an element descriptor with no namespace.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: Location::Element,
            namespace: None,
        }
    }

    /// Turn this descriptor into an attribute descriptor.
    #[must_use]
    pub fn attribute(mut self) -> Self {
        self.location = Location::Attribute;
        self
    }

    /// Attach a namespace declaration to this descriptor.
    #[must_use]
    pub fn with_namespace(mut self, prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        self.namespace = Some(Namespace::new(prefix, uri));
        self
    }

    /// Whether this descriptor addresses an attribute.
    #[must_use]
    pub fn is_attribute(&self) -> bool {
        self.location == Location::Attribute
    }
}

impl From<&str> for NodeInfo {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for NodeInfo {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}
