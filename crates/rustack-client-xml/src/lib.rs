//! XML wire format for the Rustack client runtime.
//!
//! This crate provides the document-building side of the RestXml protocol: generated
//! operation code populates an in-memory node tree through [`Writer`] handles, and the tree
//! is rendered into canonical UTF-8 markup for a request body. It also provides the first
//! decoding pass for error responses via [`RestXmlError`].
//!
//! # Key components
//!
//! - [`NodeInfo`] describes a node: name, element/attribute [`Location`], optional [`Namespace`]
//! - [`Document`] owns the node tree; [`Writer`] is a borrowed handle to one node of it
//! - [`XmlSerialize`] trait and [`write_document`] for one-shot document rendering
//! - [`RestXmlError`] for parsing `<Error>` envelopes out of error response bodies
//!
//! # Rendering conventions
//!
//! - No XML declaration is emitted
//! - Booleans: lowercase `true`/`false`
//! - Floats: `NaN`, `Infinity`, `-Infinity` for non-finite values
//! - Text and attribute values escape `<`, `>`, `&`, `'`, `"`
//! - Attributes and child elements render in insertion order

mod envelope;
pub mod error;
mod node;
mod render;
pub mod value;
pub mod writer;

pub use envelope::RestXmlError;
pub use error::XmlError;
pub use node::{Location, Namespace, NodeInfo};
pub use value::{TimestampFormat, XmlValue};
pub use writer::{Document, MapNodeInfo, Writer, XmlSerialize, write_document};
