//! Error types shared by the store, the document facade and the codec.

use crate::constituency::TreeParseError;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, NafError>;

/// Error type for document operations.
#[derive(Debug, thiserror::Error)]
pub enum NafError {
    /// Structurally invalid serialized document.
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// A span target, relation endpoint or link endpoint could not be found.
    #[error("Unresolved reference: {id} (while loading {element})")]
    UnresolvedReference {
        /// Element being built when the lookup failed.
        element: String,
        /// Identifier that was not found.
        id: String,
    },

    /// An id generator was fed an identifier it cannot parse.
    #[error("Inconsistent id state for layer '{layer}': identifiers no longer follow '{prefix}<n>'")]
    InconsistentIdState {
        /// Layer whose generator is broken.
        layer: String,
        /// Prefix the generator expects.
        prefix: String,
    },

    /// Removal requested on a layer without removal semantics.
    #[error("Annotations of layer '{layer}' cannot be removed")]
    UnsupportedRemoval {
        /// Layer of the annotation.
        layer: String,
    },

    /// A copy step found a target without a remapped counterpart.
    #[error("Dangling reference: {id} has no copy in the target document")]
    DanglingReference {
        /// Identifier of the missing target.
        id: String,
    },

    /// Constituency bracket parsing failed.
    #[error(transparent)]
    Tree(#[from] TreeParseError),

    /// Invalid value handed to a factory or setter.
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue {
        /// Field being set.
        field: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// XML tokenizer error.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// I/O error while reading or writing a document.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl NafError {
    /// Create a malformed-input error.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedInput(msg.into())
    }

    /// Create an unresolved-reference error.
    pub fn unresolved(element: impl Into<String>, id: impl Into<String>) -> Self {
        Self::UnresolvedReference {
            element: element.into(),
            id: id.into(),
        }
    }

    /// Create an unsupported-removal error.
    pub fn unsupported_removal(layer: impl Into<String>) -> Self {
        Self::UnsupportedRemoval { layer: layer.into() }
    }

    /// Create a dangling-reference error.
    pub fn dangling(id: impl Into<String>) -> Self {
        Self::DanglingReference { id: id.into() }
    }

    /// Whether this error leaves the document usable (per-sentence or local failures).
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedRemoval { .. }
                | Self::DanglingReference { .. }
                | Self::Tree(_)
                | Self::InvalidValue { .. }
        )
    }
}
