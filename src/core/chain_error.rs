use crate::events::event_handler::HandlerError;

/// Everything a chain, the registry or a dispatch pass can fail with
///
/// Every error is returned to the caller of the operation that detected it.
/// Nothing is logged and swallowed inside the chain.
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    /// Empty or duplicate node name
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Name or node handle does not resolve to a node of this chain
    #[error("Not found: {0}")]
    NotFound(String),

    /// The operation needs at least one node
    #[error("Chain for {category} is empty")]
    EmptyChain { category: &'static str },

    /// A delivered event is not an instance of the chain's category
    #[error("{found} is not an instance of {expected}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// Two distinct categories share one registry identifier
    #[error("Category `{name}` is already registered for {registered}, not {requested}")]
    TypeConflict {
        name: &'static str,
        registered: &'static str,
        requested: &'static str,
    },

    /// A handler or middleware failed; the rest of the pass was skipped
    #[error("Handler `{node}` failed: {source}")]
    Handler {
        node: String,
        #[source]
        source: HandlerError,
    },
}

impl ChainError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ChainError::NotFound(_))
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, ChainError::InvalidArgument(_))
    }

    pub fn is_empty_chain(&self) -> bool {
        matches!(self, ChainError::EmptyChain { .. })
    }
}

pub type Result<T> = std::result::Result<T, ChainError>;
