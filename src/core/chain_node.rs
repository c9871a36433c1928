use std::fmt;
use std::sync::Arc;

use crate::events::event_handler::EventHandler;

/// Shared handle to a handler stored in a chain
pub type Handler<E> = Arc<dyn EventHandler<E>>;

/// Stable handle to a node of one specific chain
///
/// Handles are never reused: once a node is removed or replaced its handle
/// resolves to nothing, and a handle from another chain never resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    pub(crate) chain: u64,
    pub(crate) slot: u32,
    pub(crate) generation: u32,
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}.{}@{}", self.slot, self.generation, self.chain)
    }
}

/// A named position in a handler chain
///
/// Nodes are created and linked by the owning chain only. The name is fixed
/// for the node's lifetime; the handler changes only through the chain's
/// replace operations, which swap in a whole new node.
pub struct ChainNode<E> {
    pub(crate) id: NodeId,
    pub(crate) name: String,
    pub(crate) handler: Handler<E>,
    pub(crate) next: Option<u32>,
    pub(crate) prev: Option<u32>,
}

impl<E> ChainNode<E> {
    pub(crate) fn new(id: NodeId, name: String, handler: Handler<E>) -> Self {
        Self {
            id,
            name,
            handler,
            next: None,
            prev: None,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn handler(&self) -> &Handler<E> {
        &self.handler
    }
}

impl<E> fmt::Debug for ChainNode<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainNode")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("next", &self.next)
            .field("prev", &self.prev)
            .finish_non_exhaustive()
    }
}
