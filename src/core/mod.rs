/// Error kinds shared by chains and the registry
pub mod chain_error;

/// Nodes and node handles
pub mod chain_node;

/// Chain structure and mutation API
pub mod handler_chain;

/// Traversal and middleware invocation
pub mod dispatch;

/// Result of a dispatch pass
pub mod dispatch_outcome;
