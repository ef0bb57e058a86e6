//! Built-in middlewares for RestXml operations.

mod binding;
mod content_length;
mod deserialize;
mod endpoint;
mod logger;
mod xml_body;

pub use binding::{HeaderMiddleware, QueryItemMiddleware, UrlPathMiddleware};
pub use content_length::ContentLengthMiddleware;
pub use deserialize::{DeserializeMiddleware, UnknownServiceError, rest_xml_envelope};
pub use endpoint::EndpointMiddleware;
pub use logger::LoggerMiddleware;
pub use xml_body::XmlBodyMiddleware;

use crate::error::ClientError;
use crate::middleware::Position;
use crate::stack::OperationStack;

/// Install the protocol-independent middlewares every operation needs.
///
/// Endpoint resolution goes into build, body framing into finalize, and `deserialize` into the
/// deserialize step with the logger inside it, so the logger sees the raw response before it
/// is decoded. Serialize middlewares are operation-specific and are left to the caller.
///
/// # Errors
///
/// `DuplicateStep` if any of these ids is already registered.
pub fn add_default_middlewares<I, O>(
    stack: &mut OperationStack<I, O>,
    deserialize: DeserializeMiddleware<O>,
) -> Result<(), ClientError>
where
    I: Send + 'static,
    O: Send + 'static,
{
    stack.build.intercept(Position::Last, EndpointMiddleware::new())?;
    stack
        .finalize
        .intercept(Position::Last, ContentLengthMiddleware::new())?;
    stack.deserialize.intercept(Position::Last, deserialize)?;
    stack
        .deserialize
        .intercept(Position::after("Deserialize"), LoggerMiddleware::new())?;
    Ok(())
}
