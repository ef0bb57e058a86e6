//! RestXml error envelope parsing.
//!
//! Error responses arrive either wrapped (`<ErrorResponse><Error>..</Error><RequestId>..`)
//! or bare (`<Error>..</Error>`, the `noErrorWrapping` form). Both are reduced to the same
//! [`RestXmlError`], which is the first of the two passes error decoding makes over a body.

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::error::XmlError;

/// Protocol-level fields of a RestXml error body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestXmlError {
    /// The error code, e.g. `NoSuchBucket`.
    pub code: Option<String>,
    /// Human-readable message.
    pub message: Option<String>,
    /// Server-assigned request id.
    pub request_id: Option<String>,
}

impl RestXmlError {
    /// Parse the envelope fields out of an error body.
    ///
    /// Unknown elements are skipped, so shape-specific members do not disturb this pass.
    ///
    /// # Errors
    ///
    /// Returns `XmlError::MissingElement` if the body has no root element, or a parse error if
    /// the XML is malformed.
    pub fn parse(body: &[u8]) -> Result<Self, XmlError> {
        // Text is not trimmed: entity references split text into several events, and
        // trimming each piece would eat the spaces around them.
        let mut reader = Reader::from_reader(body);

        let mut envelope = Self::default();
        let mut saw_root = false;

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    saw_root = true;
                    let name = e.name();
                    let tag_name = std::str::from_utf8(name.as_ref())
                        .map_err(|e| XmlError::ParseError(e.to_string()))?;
                    match tag_name {
                        "Code" => envelope.code = Some(read_text_content(&mut reader)?),
                        "Message" => envelope.message = Some(read_text_content(&mut reader)?),
                        "RequestId" => {
                            envelope.request_id = Some(read_text_content(&mut reader)?);
                        }
                        _ => {}
                    }
                }
                Event::Empty(_) => saw_root = true,
                Event::Eof => break,
                _ => {}
            }
        }

        if !saw_root {
            return Err(XmlError::MissingElement("root element".to_owned()));
        }
        Ok(envelope)
    }
}

/// Read the text content of the current element and consume its end tag.
///
/// Expects the reader to be positioned right after a `Start` event.
fn read_text_content(reader: &mut Reader<&[u8]>) -> Result<String, XmlError> {
    let mut text = String::new();
    loop {
        match reader.read_event()? {
            Event::Text(e) => {
                let decoded = e
                    .decode()
                    .map_err(|err| XmlError::ParseError(err.to_string()))?;
                let unescaped = quick_xml::escape::unescape(&decoded)
                    .map_err(|err| XmlError::ParseError(err.to_string()))?;
                text.push_str(&unescaped);
            }
            Event::CData(e) => {
                let decoded = e
                    .decode()
                    .map_err(|err| XmlError::ParseError(err.to_string()))?;
                text.push_str(&decoded);
            }
            Event::GeneralRef(e) => {
                let name = e
                    .decode()
                    .map_err(|err| XmlError::ParseError(err.to_string()))?;
                if let Some(ch) = e
                    .resolve_char_ref()
                    .map_err(|err| XmlError::ParseError(err.to_string()))?
                {
                    text.push(ch);
                } else if let Some(resolved) = quick_xml::escape::resolve_predefined_entity(&name)
                {
                    text.push_str(resolved);
                } else {
                    return Err(XmlError::ParseError(format!("unknown entity &{name};")));
                }
            }
            Event::End(_) => return Ok(text),
            Event::Eof => {
                return Err(XmlError::UnexpectedElement(
                    "unexpected EOF while reading text content".to_owned(),
                ));
            }
            _ => {}
        }
    }
}
