use serde_json::Value;

use crate::registry::Direction;
use crate::shape::ShapeError;
use crate::types::Position;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A second descriptor was registered under an already-taken method name.
    #[error("method {0:?} is already registered")]
    DuplicateMethod(String),

    /// The method name is not present in the registry.
    #[error("method {0:?} is not registered")]
    MethodNotFound(String),

    /// The method exists but is registered with the opposite direction.
    #[error("method {name:?} is a {actual}, not a {expected}")]
    WrongDirection {
        name: String,
        expected: Direction,
        actual: Direction,
    },

    /// A value does not conform to its declared shape.
    #[error(transparent)]
    Shape(#[from] ShapeError),

    /// A reply payload matched both the result shape and the error shape, so
    /// the outcome of the request cannot be determined.
    #[error("ambiguous reply for method {method:?}: matches both the result and error shape")]
    ProtocolViolation { method: String, wire: Value },

    /// `start` comes after `end` under (line, character) order.
    #[error("range start {start} is after its end {end}")]
    ReversedRange { start: Position, end: Position },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
