//! Error types shared by every layer of the engine facade.
//!
//! Lookup failures (unknown object types, objects, attributes, relation types
//! and settings) are grouped by [`ProdriskError::is_not_found`] so callers can
//! probe the live catalogue without matching on individual variants.
//!
//! # Example
//!
//! ```ignore
//! use prodrisk_core::{ProdriskError, ProdriskResult};
//!
//! fn max_prod(model: &ModelBuilder) -> ProdriskResult<Option<Value>> {
//!     let plant = model.get("plant")?.get("Plant1")?;
//!     plant.attribute("max_prod")?.get()
//! }
//! ```

use thiserror::Error;

/// Unified error type for engine access and value marshalling.
#[derive(Error, Debug)]
pub enum ProdriskError {
    /// The object type is not part of the engine catalogue.
    #[error("Unknown object type: \"{0}\"")]
    UnknownObjectType(String),

    /// No object with this name exists for the object type.
    #[error("Unknown object: \"{name}\" ({object_type})")]
    UnknownObject { object_type: String, name: String },

    /// The attribute is not defined for the object type.
    #[error("Unknown attribute: \"{attribute}\" for \"{object}\" ({object_type})")]
    UnknownAttribute {
        object_type: String,
        object: String,
        attribute: String,
    },

    /// An explicit relation type that cannot be mapped to an engine relation.
    #[error(
        "Unknown connection type: \"{0}\". Default connection types are used if none are \
         provided; explicit values can be \"spill\", \"bypass\" or \"standard\""
    )]
    UnknownRelationType(String),

    /// Relation direction other than both/input/output.
    #[error("Unknown direction: \"{0}\"; possible values are \"both\", \"input\" and \"output\"")]
    UnknownDirection(String),

    /// Session setting that the engine's setting object does not define.
    #[error("Unknown setting: \"{0}\"")]
    UnknownSetting(String),

    /// The engine reported a time unit this operation cannot handle.
    #[error("Unexpected time unit encountered: \"{0}\"")]
    UnexpectedTimeUnit(String),

    /// Engine time string that does not follow `YYYYMMDD[HH[MM[SS[mmm]]]]`.
    #[error("Invalid engine time string: \"{0}\"")]
    InvalidTime(String),

    /// A write-side invariant was violated (off-grid timestamps, ordering, ...).
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// The supplied value kind cannot be written to an attribute of this datatype.
    #[error("Cannot write a {found} value to a \"{datatype}\" attribute")]
    TypeMismatch { datatype: String, found: String },

    /// Parallel engine arrays disagree in length.
    #[error("Shape error: {0}")]
    Shape(String),

    /// Failure reported by the engine itself.
    #[error("Engine error: {0}")]
    Engine(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Parsing/deserialization errors
    #[error("Parse error: {0}")]
    Parse(String),

    /// I/O errors (log files, configuration files)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProdriskError {
    /// True for failed catalogue lookups, which callers may treat as "absent".
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ProdriskError::UnknownObjectType(_)
                | ProdriskError::UnknownObject { .. }
                | ProdriskError::UnknownAttribute { .. }
                | ProdriskError::UnknownRelationType(_)
                | ProdriskError::UnknownDirection(_)
                | ProdriskError::UnknownSetting(_)
        )
    }

    pub fn precondition(message: impl Into<String>) -> Self {
        ProdriskError::Precondition(message.into())
    }
}

/// Convenience type alias for Results using ProdriskError.
pub type ProdriskResult<T> = Result<T, ProdriskError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_errors_are_not_found() {
        let err = ProdriskError::UnknownObject {
            object_type: "plant".into(),
            name: "Nowhere".into(),
        };
        assert!(err.is_not_found());
        assert!(err.to_string().contains("Nowhere"));
        assert!(ProdriskError::UnknownSetting("x".into()).is_not_found());
    }

    #[test]
    fn invariant_errors_are_not_lookup_errors() {
        let err = ProdriskError::precondition("non-positive time interval in TXY series");
        assert!(!err.is_not_found());
        assert!(err.to_string().starts_with("Precondition failed"));
    }

    #[test]
    fn io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: ProdriskError = io_err.into();
        assert!(matches!(err, ProdriskError::Io(_)));
    }
}
