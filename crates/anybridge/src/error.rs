//! Error types for value marshaling

use thiserror::Error;

use crate::any::Any;

/// Main error type for bridge operations.
///
/// Every variant carries enough of the offending runtime type to produce a
/// readable message on the host side.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BridgeError {
    /// No converter is registered for the value's type, in either direction
    #[error("Unsupported value type: {type_name}")]
    UnsupportedType {
        /// Printable name of the unconvertible type
        type_name: String,
    },

    /// A mapping key was not a string during host→native conversion
    #[error("Keys must be of type string, not {type_name}")]
    KeyTypeError {
        /// Printable name of the key's type
        type_name: String,
    },

    /// A host integer fits none of the native integer widths
    #[error("Failed to convert host int {value} to a native integer")]
    IntegerOverflow {
        /// The integer that could not be represented
        value: i128,
    },

    /// The resolved value's tag is not the one the caller asked for
    #[error("Expected {expected}; got {got} instead")]
    TypeMismatch {
        /// What the caller expected
        expected: String,
        /// What the value actually resolved to
        got: String,
    },

    /// The container behind a proxy or stamp has been destroyed
    #[error("Underlying native container has been destroyed")]
    ContainerInvalidated,

    /// The container changed while an iterator was walking it
    #[error("Container mutated during iteration")]
    MutatedDuringIteration,

    /// Dictionary lookup miss
    #[error("Key not found: {key}")]
    KeyNotFound {
        /// The missing key
        key: String,
    },

    /// Vector index outside `0..len`
    #[error("Index out of range: index {index}, len {len}")]
    IndexOutOfRange {
        /// The requested index
        index: i64,
        /// The length of the vector
        len: usize,
    },

    /// Host value nests deeper than the configured limit
    #[error("Conversion depth exceeded (max {max})")]
    DepthExceeded {
        /// The configured maximum depth
        max: usize,
    },
}

/// Result type alias for bridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Get a printable type name for a dynamic value (for error messages).
pub fn type_name(value: &Any) -> &'static str {
    value.tag().name()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_mismatch_message() {
        let err = BridgeError::TypeMismatch {
            expected: "an AnyDictionary (i.e. metadata)".to_string(),
            got: "f64".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Expected an AnyDictionary (i.e. metadata); got f64 instead"
        );
    }

    #[test]
    fn test_key_type_message() {
        let err = BridgeError::KeyTypeError {
            type_name: "int".to_string(),
        };
        assert_eq!(err.to_string(), "Keys must be of type string, not int");
    }

    #[test]
    fn test_type_name_uses_tag() {
        assert_eq!(type_name(&Any::None), "none");
        assert_eq!(type_name(&Any::Int64(3)), "i64");
    }
}
